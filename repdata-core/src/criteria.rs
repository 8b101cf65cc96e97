//! Typed filter selections for one session.
//!
//! Every UI input maps onto one field of [`FilterCriteria`]. The setters return
//! whether the value actually changed so callers can skip recomputation.

use crate::store::DatasetStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Vocabulary sentinel meaning "no restriction on this column".
pub const ALL: &str = "All";

/// Single-select criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    pub fn from_input(input: &str) -> Self {
        if input == ALL {
            Choice::All
        } else {
            Choice::Only(input.to_string())
        }
    }

    pub fn as_input(&self) -> &str {
        match self {
            Choice::All => ALL,
            Choice::Only(v) => v,
        }
    }
}

/// Multi-select criterion. An empty selection is normalized to `All`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MultiChoice {
    #[default]
    All,
    AnyOf(BTreeSet<String>),
}

impl MultiChoice {
    pub fn from_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = inputs.into_iter().map(Into::into).collect();
        if set.is_empty() || set.contains(ALL) {
            MultiChoice::All
        } else {
            MultiChoice::AnyOf(set)
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        match self {
            MultiChoice::All => value == ALL,
            MultiChoice::AnyOf(set) => set.contains(value),
        }
    }

    /// Toggles one value the way a multi-select picker does: picking `All`
    /// clears the set, picking anything else adds or removes it.
    pub fn toggled(&self, value: &str) -> Self {
        if value == ALL {
            return MultiChoice::All;
        }
        let mut set = match self {
            MultiChoice::All => BTreeSet::new(),
            MultiChoice::AnyOf(set) => set.clone(),
        };
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        Self::from_inputs(set)
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            MultiChoice::All => vec![ALL],
            MultiChoice::AnyOf(set) => set.iter().map(String::as_str).collect(),
        }
    }
}

/// Closed, inclusive publication-year interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub const UNBOUNDED: YearRange = YearRange { min: i32::MIN, max: i32::MAX };

    /// Builds a range, swapping the bounds if given out of order.
    pub fn new(a: i32, b: i32) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::UNBOUNDED
    }

    /// Parses `MIN..MAX`, `MIN-MAX`, `MIN..` or `..MAX`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (lo, hi) = s
            .split_once("..")
            .or_else(|| s.split_once('-'))
            .ok_or_else(|| format!("expected MIN..MAX, got '{s}'"))?;
        let bound = |t: &str, default: i32| -> Result<i32, String> {
            let t = t.trim();
            if t.is_empty() {
                Ok(default)
            } else {
                t.parse::<i32>().map_err(|_| format!("not a year: '{t}'"))
            }
        };
        Ok(Self::new(bound(lo, i32::MIN)?, bound(hi, i32::MAX)?))
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |y: i32| {
            if y == i32::MIN || y == i32::MAX {
                String::new()
            } else {
                y.to_string()
            }
        };
        write!(f, "{}..{}", show(self.min), show(self.max))
    }
}

/// Free-text query. `Off` is the "no text filter" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextQuery {
    #[default]
    Off,
    Contains(String),
}

impl TextQuery {
    /// Empty input and the UI placeholder both mean "no filter".
    pub fn from_input(input: &str, placeholder: &str) -> Self {
        if input.is_empty() || input == placeholder {
            TextQuery::Off
        } else {
            TextQuery::Contains(input.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TextQuery::Off => "",
            TextQuery::Contains(q) => q,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub resource_type: Choice,
    pub theme: Choice,
    pub regions: MultiChoice,
    pub languages: MultiChoice,
    pub pub_years: YearRange,
    pub free_text: TextQuery,
}

impl FilterCriteria {
    /// Session defaults: every column unrestricted, year range spanning the store.
    pub fn for_store(store: &DatasetStore) -> Self {
        Self {
            pub_years: store.year_bounds().unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn set_resource_type(&mut self, input: &str) -> bool {
        replace(&mut self.resource_type, Choice::from_input(input))
    }

    pub fn set_theme(&mut self, input: &str) -> bool {
        replace(&mut self.theme, Choice::from_input(input))
    }

    pub fn set_regions<I, S>(&mut self, inputs: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        replace(&mut self.regions, MultiChoice::from_inputs(inputs))
    }

    pub fn set_languages<I, S>(&mut self, inputs: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        replace(&mut self.languages, MultiChoice::from_inputs(inputs))
    }

    pub fn set_pub_years(&mut self, min: i32, max: i32) -> bool {
        replace(&mut self.pub_years, YearRange::new(min, max))
    }

    pub fn set_free_text(&mut self, input: &str, placeholder: &str) -> bool {
        replace(&mut self.free_text, TextQuery::from_input(input, placeholder))
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
