use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use crate::{
    Weight,
    symbol::{Symbol, Symbols},
};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model is empty")]
    EmptyModel,

    #[error("model contains non-positive weight {weight} for {symbol}")]
    NonPositiveWeight { symbol: Symbol, weight: Weight },

    #[error("equivalent {symbol} is also declared as an asset in the model")]
    EquivalentAlsoPrimary { symbol: Symbol },

    #[error("equivalent {symbol} is linked to more than one asset ({first} and {second})")]
    DuplicateEquivalentOwnership {
        symbol: Symbol,
        first: Symbol,
        second: Symbol,
    },

    #[error("failed to read model file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse model YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One entry of a model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelAsset {
    pub weight: Weight,
    /// Symbols treated as the same holding as this asset. An equivalent
    /// may not be an asset of the model by itself.
    #[serde(default)]
    pub equivalents: Vec<Symbol>,
}

impl ModelAsset {
    pub fn new(weight: Weight) -> Self {
        Self {
            weight,
            equivalents: Vec::new(),
        }
    }

    pub fn with_equivalents<I, S>(mut self, equivalents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.equivalents = equivalents.into_iter().map(Into::into).collect();
        self
    }
}

/// Validated, immutable target allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    assets: BTreeMap<Symbol, ModelAsset>,
}

impl Model {
    pub fn new<I, S>(assets: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (S, ModelAsset)>,
        S: Into<Symbol>,
    {
        ModelBuilder {
            assets: assets.into_iter().map(|(s, a)| (s.into(), a)).collect(),
        }
        .build()
    }

    /// Loads a model definition, picking YAML for `.yml`/`.yaml` and JSON
    /// for anything else.
    pub fn load_from_file(path: &Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml" | "yaml") => Self::from_yaml(&contents),
            _ => Self::from_json(&contents),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let builder: ModelBuilder = serde_json::from_str(json)?;
        builder.build()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ModelError> {
        let builder: ModelBuilder = serde_yaml::from_str(yaml)?;
        builder.build()
    }

    /// Primary assets of the model.
    pub fn symbols(&self) -> Symbols {
        self.assets.keys().cloned().collect()
    }

    pub fn target_proportion(&self, s: &Symbol) -> f64 {
        let total = self.total_weight();
        match self.assets.get(s) {
            Some(asset) if total > 0.0 => asset.weight / total,
            _ => 0.0,
        }
    }

    pub fn total_weight(&self) -> Weight {
        self.assets.values().map(|a| a.weight).sum()
    }

    pub fn equivalents(&self, s: &Symbol) -> Symbols {
        self.assets
            .get(s)
            .map(|a| a.equivalents.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, s: &Symbol) -> bool {
        self.assets.contains_key(s)
    }

    /// True for primary assets and their equivalents.
    pub fn is_relevant(&self, s: &Symbol) -> bool {
        self.relevant_symbols().contains(s)
    }

    pub fn relevant_symbols(&self) -> Symbols {
        self.symbols().union(&self.equivalent_symbols())
    }

    pub fn equivalent_symbols(&self) -> Symbols {
        self.assets
            .values()
            .flat_map(|a| a.equivalents.iter().cloned())
            .collect()
    }

    pub fn assets(&self) -> impl Iterator<Item = (&Symbol, &ModelAsset)> {
        self.assets.iter()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_assets(&self.assets)
    }
}

#[derive(Debug, Deserialize)]
struct ModelBuilder {
    assets: BTreeMap<Symbol, ModelAsset>,
}

impl TryFrom<ModelBuilder> for Model {
    type Error = ModelError;

    fn try_from(builder: ModelBuilder) -> Result<Self, Self::Error> {
        validate_assets(&builder.assets)?;
        debug!(assets = builder.assets.len(), "validated model");
        Ok(Model {
            assets: builder.assets,
        })
    }
}

impl ModelBuilder {
    fn build(self) -> Result<Model, ModelError> {
        self.try_into()
    }
}

/// Checks run in order; the first failure wins.
fn validate_assets(assets: &BTreeMap<Symbol, ModelAsset>) -> Result<(), ModelError> {
    check_not_empty(assets)?;
    check_weights(assets)?;
    check_no_primary_equivalent(assets)?;
    check_equivalent_owners(assets)?;
    Ok(())
}

fn check_not_empty(assets: &BTreeMap<Symbol, ModelAsset>) -> Result<(), ModelError> {
    if assets.is_empty() {
        return Err(ModelError::EmptyModel);
    }
    Ok(())
}

fn check_weights(assets: &BTreeMap<Symbol, ModelAsset>) -> Result<(), ModelError> {
    match assets
        .iter()
        .find(|(_, a)| a.weight.is_nan() || a.weight < 0.0)
    {
        Some((symbol, a)) => Err(ModelError::NonPositiveWeight {
            symbol: symbol.clone(),
            weight: a.weight,
        }),
        None => Ok(()),
    }
}

fn check_no_primary_equivalent(assets: &BTreeMap<Symbol, ModelAsset>) -> Result<(), ModelError> {
    for asset in assets.values() {
        if let Some(e) = asset.equivalents.iter().find(|e| assets.contains_key(*e)) {
            return Err(ModelError::EquivalentAlsoPrimary { symbol: e.clone() });
        }
    }
    Ok(())
}

fn check_equivalent_owners(assets: &BTreeMap<Symbol, ModelAsset>) -> Result<(), ModelError> {
    let mut owners: BTreeMap<&Symbol, &Symbol> = BTreeMap::new();
    for (parent, asset) in assets {
        for e in &asset.equivalents {
            if let Some(first) = owners.insert(e, parent) {
                return Err(ModelError::DuplicateEquivalentOwnership {
                    symbol: e.clone(),
                    first: first.clone(),
                    second: parent.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_json() -> &'static str {
        r#"{
            "assets": {
                "VOO": { "weight": 30, "equivalents": ["CSPX"] },
                "TLT": { "weight": 50 },
                "GLD": { "weight": 20, "equivalents": [] }
            }
        }"#
    }

    #[test]
    fn parse_valid_model() {
        let model = Model::from_json(core_json()).unwrap();
        assert_eq!(model.symbols().len(), 3);
        assert_eq!(model.total_weight(), 100.0);
        assert!((model.target_proportion(&"TLT".into()) - 0.5).abs() < 1e-12);
        assert_eq!(model.target_proportion(&"XLK".into()), 0.0);
    }

    #[test]
    fn proportions_sum_to_one() {
        let model = Model::new([
            ("A", ModelAsset::new(1.0)),
            ("B", ModelAsset::new(2.5)),
            ("C", ModelAsset::new(0.0)),
            ("D", ModelAsset::new(7.3)),
        ])
        .unwrap();
        let sum: f64 = model
            .symbols()
            .iter()
            .map(|s| model.target_proportion(s))
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_weight_gives_zero_proportion() {
        let model = Model::new([("A", ModelAsset::new(0.0))]).unwrap();
        assert_eq!(model.target_proportion(&"A".into()), 0.0);
    }

    #[test]
    fn membership() {
        let model = Model::from_json(core_json()).unwrap();
        let voo = Symbol::from("VOO");
        let cspx = Symbol::from("CSPX");

        assert!(model.contains(&voo));
        assert!(!model.contains(&cspx));
        assert!(model.is_relevant(&cspx));
        assert!(!model.is_relevant(&"XLK".into()));
        assert_eq!(model.equivalents(&voo), Symbols::new().add(["CSPX"]));
        assert!(model.equivalents(&"TLT".into()).is_empty());
        assert!(model.equivalents(&cspx).is_empty());
        assert_eq!(model.equivalent_symbols().len(), 1);
        assert_eq!(model.relevant_symbols().len(), 4);
    }

    #[test]
    fn parse_yaml() {
        let yaml = "assets:\n  VOO:\n    weight: 1\n    equivalents: [CSPX]\n  \
                    TLT:\n    weight: 1\n";
        let model = Model::from_yaml(yaml).unwrap();
        assert!(model.is_relevant(&"CSPX".into()));
    }

    #[test]
    fn reject_empty_model() {
        let err = Model::from_json(r#"{"assets": {}}"#).unwrap_err();
        assert!(matches!(err, ModelError::EmptyModel));
    }

    #[test]
    fn reject_negative_weight() {
        let err = Model::new([("A", ModelAsset::new(1.0)), ("B", ModelAsset::new(-0.5))])
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonPositiveWeight { ref symbol, .. } if symbol.as_str() == "B"
        ));
    }

    #[test]
    fn reject_equivalent_declared_as_primary() {
        let err = Model::new([
            ("A", ModelAsset::new(1.0).with_equivalents(["B"])),
            ("B", ModelAsset::new(1.0)),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::EquivalentAlsoPrimary { ref symbol } if symbol.as_str() == "B"
        ));
    }

    #[test]
    fn reject_shared_equivalent() {
        let err = Model::new([
            ("A", ModelAsset::new(1.0).with_equivalents(["B"])),
            ("C", ModelAsset::new(1.0).with_equivalents(["B"])),
        ])
        .unwrap_err();
        match err {
            ModelError::DuplicateEquivalentOwnership {
                symbol,
                first,
                second,
            } => {
                assert_eq!(symbol.as_str(), "B");
                assert_eq!(first.as_str(), "A");
                assert_eq!(second.as_str(), "C");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn weight_check_runs_before_equivalent_checks() {
        let err = Model::new([
            ("A", ModelAsset::new(-1.0).with_equivalents(["B"])),
            ("B", ModelAsset::new(1.0)),
            ("C", ModelAsset::new(1.0).with_equivalents(["B"])),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::NonPositiveWeight { .. }));
    }

    #[test]
    fn primary_check_runs_before_ownership_check() {
        let err = Model::new([
            ("A", ModelAsset::new(1.0).with_equivalents(["B"])),
            ("B", ModelAsset::new(1.0)),
            ("C", ModelAsset::new(1.0).with_equivalents(["B"])),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::EquivalentAlsoPrimary { .. }));
    }

    #[test]
    fn reject_nan_weight() {
        let err = Model::new([("A", ModelAsset::new(f64::NAN))]).unwrap_err();
        assert!(matches!(err, ModelError::NonPositiveWeight { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = Model::from_json(r#"{"assets": {"A": {"weight": "lots"}}}"#).unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }

    #[test]
    fn validate_on_built_model() {
        let model = Model::from_json(core_json()).unwrap();
        assert!(model.validate().is_ok());
    }
}
