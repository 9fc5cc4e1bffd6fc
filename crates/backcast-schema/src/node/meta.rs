use crate::value::Literal;
use serde::Serialize;
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// MetaKey
///
/// Fixed allow-list of recognized field metadata keys. Anything outside this
/// list is rejected at extraction time.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum MetaKey {
    Alias,
    AllowInfNan,
    DecimalPlaces,
    Description,
    Exclude,
    Ge,
    Gt,
    Include,
    Le,
    Lt,
    MaxDigits,
    MaxItems,
    MaxLength,
    MinItems,
    MinLength,
    MultipleOf,
    Regex,
    Repr,
    Title,
    UniqueItems,
}

impl MetaKey {
    pub const ALL: [Self; 20] = [
        Self::Alias,
        Self::AllowInfNan,
        Self::DecimalPlaces,
        Self::Description,
        Self::Exclude,
        Self::Ge,
        Self::Gt,
        Self::Include,
        Self::Le,
        Self::Lt,
        Self::MaxDigits,
        Self::MaxItems,
        Self::MaxLength,
        Self::MinItems,
        Self::MinLength,
        Self::MultipleOf,
        Self::Regex,
        Self::Repr,
        Self::Title,
        Self::UniqueItems,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::AllowInfNan => "allow_inf_nan",
            Self::DecimalPlaces => "decimal_places",
            Self::Description => "description",
            Self::Exclude => "exclude",
            Self::Ge => "ge",
            Self::Gt => "gt",
            Self::Include => "include",
            Self::Le => "le",
            Self::Lt => "lt",
            Self::MaxDigits => "max_digits",
            Self::MaxItems => "max_items",
            Self::MaxLength => "max_length",
            Self::MinItems => "min_items",
            Self::MinLength => "min_length",
            Self::MultipleOf => "multiple_of",
            Self::Regex => "regex",
            Self::Repr => "repr",
            Self::Title => "title",
            Self::UniqueItems => "unique_items",
        }
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ParseMetaKeyError
///

#[derive(Debug, ThisError)]
#[error("'{key}' is not a recognized field metadata key")]
pub struct ParseMetaKeyError {
    pub key: String,
}

impl FromStr for MetaKey {
    type Err = ParseMetaKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParseMetaKeyError { key: s.to_string() })
    }
}

///
/// MetaMap
///
/// Insertion-ordered metadata entries. Overwriting an existing key keeps its
/// original position; new keys append. Rendering walks entries in order, so
/// identical edit sequences always produce identical output.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetaMap {
    entries: Vec<(MetaKey, Literal)>,
}

impl MetaMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self, key: MetaKey) -> Option<&Literal> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: MetaKey, value: Literal) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetaKey, &Literal)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<(MetaKey, Literal)> for MetaMap {
    fn from_iter<I: IntoIterator<Item = (MetaKey, Literal)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_round_trips_through_as_str() {
        for key in MetaKey::ALL {
            assert_eq!(key.as_str().parse::<MetaKey>().expect("parse key"), key);
        }
    }

    #[test]
    fn overwrite_preserves_position() {
        let mut map = MetaMap::new();
        map.insert(MetaKey::Title, "t".into());
        map.insert(MetaKey::Alias, "a".into());
        map.insert(MetaKey::Title, "t2".into());

        let keys: Vec<MetaKey> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![MetaKey::Title, MetaKey::Alias]);
        assert_eq!(map.get(MetaKey::Title), Some(&Literal::from("t2")));
    }
}
