//! Instrument universe: the set of names eligible for signal generation.
//!
//! Instruments with a position limit but outside the universe are always
//! assigned a flat position.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The standard tradeable instruments.
pub const INSTRUMENT_UNIVERSE: [&str; 8] = [
    "Fintech Token",
    "Fun Drink",
    "Red Pens",
    "Thrifted jeans",
    "UQ Dollar",
    "Coffee Beans",
    "Goober Eats",
    "Milk",
];

/// A set of instrument names. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    names: BTreeSet<String>,
}

impl Universe {
    /// The universe built from [`INSTRUMENT_UNIVERSE`].
    pub fn standard() -> Self {
        Self::from_names(INSTRUMENT_UNIVERSE)
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, instrument: &str) -> bool {
        self.names.contains(instrument)
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::standard()
    }
}
