use std::{collections::HashMap, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::{
    Price, Shares,
    market::{Market, PriceSelector},
    model::Model,
    symbol::{Symbol, Symbols},
};

/// Snapshot of cash and positions. Transformations return new portfolios.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Portfolio {
    cash: Price,
    #[serde(default)]
    positions: HashMap<Symbol, Shares>,
}

impl Portfolio {
    pub fn new<I, S>(cash: Price, positions: I) -> Self
    where
        I: IntoIterator<Item = (S, Shares)>,
        S: Into<Symbol>,
    {
        Self {
            cash,
            positions: positions.into_iter().map(|(s, p)| (s.into(), p)).collect(),
        }
    }

    pub fn from_cash(cash: Price) -> Self {
        Self {
            cash,
            positions: HashMap::new(),
        }
    }

    /// Loads a `{cash, positions}` snapshot, YAML for `.yml`/`.yaml` and JSON
    /// otherwise.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open file {path:?}"))?;
        let portfolio: Portfolio = match path.extension().and_then(|e| e.to_str()) {
            Some("yml" | "yaml") => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse portfolio {path:?}"))?,
            _ => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse portfolio {path:?}"))?,
        };
        debug!(?portfolio, "loaded portfolio");
        Ok(portfolio)
    }

    pub fn symbols(&self) -> Symbols {
        self.positions.keys().cloned().collect()
    }

    pub fn position(&self, s: &Symbol) -> Shares {
        self.positions.get(s).copied().unwrap_or(0.0)
    }

    pub fn cash_amount(&self) -> Price {
        self.cash
    }

    pub fn positions(&self) -> impl Iterator<Item = (&Symbol, Shares)> {
        self.positions.iter().map(|(s, &p)| (s, p))
    }

    /// Value of all positions, excluding cash.
    pub fn total_value<M: Market + ?Sized>(&self, market: &M, selector: PriceSelector) -> Price {
        self.positions
            .iter()
            .map(|(s, p)| selector.price(market, s) * p)
            .sum()
    }

    /// Keeps only the positions in `symbols`. Cash is unchanged.
    pub fn select(&self, symbols: &Symbols) -> Portfolio {
        Portfolio {
            cash: self.cash,
            positions: self
                .positions
                .iter()
                .filter(|(s, _)| symbols.contains(s))
                .map(|(s, &p)| (s.clone(), p))
                .collect(),
        }
    }

    /// Folds every held equivalent into its parent asset, converting the
    /// equivalent's position into parent shares of the same value.
    pub fn aggregate_equivalents<M: Market + ?Sized>(
        &self,
        market: &M,
        model: &Model,
        selector: PriceSelector,
    ) -> Portfolio {
        let mut positions = self.positions.clone();
        for (parent, asset) in model.assets() {
            for e in &asset.equivalents {
                let Some(held) = positions.remove(e) else {
                    continue;
                };
                let converted =
                    held * selector.price(market, e) / selector.price(market, parent);
                debug!(%parent, equivalent = %e, held, converted, "aggregating equivalent");
                *positions.entry(parent.clone()).or_insert(0.0) += converted;
            }
        }
        Portfolio {
            cash: self.cash,
            positions,
        }
    }
}
