use crate::{instruction::Instruction, StructureError};
use serde::Serialize;
use time::Date;

///
/// VersionChange
///
/// A named, ordered batch of instructions applied at one version boundary.
/// The list is built once and passed by value; nothing accumulates through
/// side effects.
///

#[derive(Clone, Debug, Serialize)]
pub struct VersionChange {
    pub description: String,
    pub instructions: Vec<Instruction>,
}

impl VersionChange {
    #[must_use]
    pub fn new(description: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            description: description.into(),
            instructions,
        }
    }
}

///
/// Version
///
/// A dated point in the chain. The change (if any) transforms this
/// version's snapshot into the snapshot of the next-older version.
///

#[derive(Clone, Debug, Serialize)]
pub struct Version {
    pub date: Date,
    pub change: Option<VersionChange>,
}

impl Version {
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self { date, change: None }
    }

    #[must_use]
    pub const fn changed(date: Date, change: VersionChange) -> Self {
        Self {
            date,
            change: Some(change),
        }
    }

    /// Deterministic module/tree name for this version's date.
    #[must_use]
    pub fn module_name(&self) -> String {
        format!(
            "v{:04}_{:02}_{:02}",
            self.date.year(),
            u8::from(self.date.month()),
            self.date.day()
        )
    }
}

///
/// VersionBundle
///
/// The full chronological chain, ordered strictly newest-first. The oldest
/// version never carries a change: there is no older snapshot left for it
/// to produce.
///

#[derive(Clone, Debug, Serialize)]
pub struct VersionBundle {
    versions: Vec<Version>,
}

impl VersionBundle {
    pub fn new(versions: Vec<Version>) -> Result<Self, StructureError> {
        let Some(last) = versions.last() else {
            return Err(StructureError::EmptyBundle);
        };

        if last.change.is_some() {
            return Err(StructureError::TrailingChange { date: last.date });
        }

        for pair in versions.windows(2) {
            if pair[1].date >= pair[0].date {
                return Err(StructureError::UnorderedVersions {
                    newer: pair[0].date,
                    older: pair[1].date,
                });
            }
        }

        Ok(Self { versions })
    }

    #[must_use]
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn module_name_is_a_deterministic_date_function() {
        let version = Version::new(date!(2001 - 01 - 01));
        assert_eq!(version.module_name(), "v2001_01_01");

        let version = Version::new(date!(1999 - 12 - 31));
        assert_eq!(version.module_name(), "v1999_12_31");
    }

    #[test]
    fn rejects_unordered_dates() {
        let err = VersionBundle::new(vec![
            Version::changed(
                date!(2000 - 01 - 01),
                VersionChange::new("backwards", vec![]),
            ),
            Version::new(date!(2001 - 01 - 01)),
        ])
        .expect_err("dates must decrease");

        assert!(matches!(err, StructureError::UnorderedVersions { .. }));
    }

    #[test]
    fn rejects_equal_dates() {
        let err = VersionBundle::new(vec![
            Version::changed(date!(2001 - 01 - 01), VersionChange::new("dup", vec![])),
            Version::new(date!(2001 - 01 - 01)),
        ])
        .expect_err("equal dates");

        assert!(matches!(err, StructureError::UnorderedVersions { .. }));
    }

    #[test]
    fn rejects_empty_bundle_and_trailing_change() {
        assert!(matches!(
            VersionBundle::new(vec![]).expect_err("empty"),
            StructureError::EmptyBundle
        ));

        let err = VersionBundle::new(vec![Version::changed(
            date!(2000 - 01 - 01),
            VersionChange::new("unreachable", vec![]),
        )])
        .expect_err("trailing change");
        assert!(matches!(err, StructureError::TrailingChange { .. }));
    }
}
