use std::{collections::HashMap, io::Read, path::Path};

use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::{Price, symbol::Symbol};

/// Price source for a set of symbols. Unknown symbols are priced at 0.
pub trait Market {
    fn last(&self, s: &Symbol) -> Price;
    fn bid(&self, s: &Symbol) -> Price;
    fn ask(&self, s: &Symbol) -> Price;
}

/// Which of the market's quotes to use when pricing a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PriceSelector {
    #[default]
    Last,
    Bid,
    Ask,
}

impl PriceSelector {
    pub fn price<M: Market + ?Sized>(self, market: &M, s: &Symbol) -> Price {
        match self {
            PriceSelector::Last => market.last(s),
            PriceSelector::Bid => market.bid(s),
            PriceSelector::Ask => market.ask(s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct MarketPrice {
    pub last: Price,
    pub bid: Price,
    pub ask: Price,
}

impl MarketPrice {
    /// Same price on every side of the book.
    pub fn flat(price: Price) -> Self {
        Self {
            last: price,
            bid: price,
            ask: price,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PriceRow {
    symbol: Symbol,
    last: Price,
    bid: Price,
    ask: Price,
}

/// Fixed snapshot of quotes.
#[derive(Debug, Clone, Default)]
pub struct StaticMarket {
    prices: HashMap<Symbol, MarketPrice>,
}

impl StaticMarket {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let file =
            std::fs::File::open(path).with_context(|| format!("Failed to open file {path:?}"))?;
        Self::from_csv(file).with_context(|| format!("Failed to parse prices from {path:?}"))
    }

    /// Reads rows of `Symbol,Last,Bid,Ask`.
    pub fn from_csv<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut prices = HashMap::new();
        for row in csv_reader.deserialize() {
            let row: PriceRow = row?;
            debug!(?row, "parsed price row");
            anyhow::ensure!(
                row.last >= 0.0 && row.bid >= 0.0 && row.ask >= 0.0,
                "Negative price for {}",
                row.symbol
            );
            prices.insert(
                row.symbol,
                MarketPrice {
                    last: row.last,
                    bid: row.bid,
                    ask: row.ask,
                },
            );
        }
        Ok(Self { prices })
    }

    pub fn get(&self, s: &Symbol) -> Option<&MarketPrice> {
        self.prices.get(s)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(Symbol, MarketPrice)> for StaticMarket {
    fn from_iter<T: IntoIterator<Item = (Symbol, MarketPrice)>>(iter: T) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

impl Market for StaticMarket {
    fn last(&self, s: &Symbol) -> Price {
        self.get(s).map_or(0.0, |p| p.last)
    }

    fn bid(&self, s: &Symbol) -> Price {
        self.get(s).map_or(0.0, |p| p.bid)
    }

    fn ask(&self, s: &Symbol) -> Price {
        self.get(s).map_or(0.0, |p| p.ask)
    }
}
