use std::collections::HashSet;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Ticker identifier of a tradable asset.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unordered set of symbols. Every operation returns a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols(HashSet<Symbol>);

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I>(&self, symbols: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        let mut set = self.0.clone();
        set.extend(symbols.into_iter().map(Into::into));
        Self(set)
    }

    pub fn contains(&self, s: &Symbol) -> bool {
        self.0.contains(s)
    }

    pub fn union(&self, other: &Symbols) -> Self {
        self.add(other.iter().cloned())
    }

    /// Members in no particular order.
    pub fn to_vec(&self) -> Vec<Symbol> {
        self.0.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<Symbol>> FromIterator<S> for Symbols {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
