// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Snapshot schedule validation

use super::error::{ProjectError, ProjectResult};
use super::model::SnapshotElement;
use serde::{Deserialize, Serialize};

/// Validated automatic snapshot schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSchedule {
    /// One of `s`, `m`, `h`
    pub frequency_unit: String,
    pub frequency_value: i64,
    pub retain: i64,
    pub path: String,
    pub prefix: String,
}

impl SnapshotElement {
    /// Check every setting, echoing the offending value on failure
    pub fn validate(&self) -> ProjectResult<SnapshotSchedule> {
        let frequency = self.frequency.as_str();
        let unit = match frequency.chars().last() {
            Some(c @ ('s' | 'm' | 'h')) => c,
            _ => return Err(ProjectError::SnapshotFrequencyUnit(frequency.to_string())),
        };

        let value_text = &frequency[..frequency.len() - 1];
        let frequency_value = value_text
            .parse::<u32>()
            .map_err(|_| ProjectError::SnapshotFrequencyValue(value_text.to_string()))?;

        let prefix = self.prefix.clone().unwrap_or_default();
        if prefix.is_empty() {
            return Err(ProjectError::SnapshotPrefixMissing(prefix));
        }
        if prefix.contains('-') || prefix.contains(',') {
            return Err(ProjectError::SnapshotPrefixInvalid(prefix));
        }

        let path = self.path.clone().unwrap_or_default();
        if path.is_empty() {
            return Err(ProjectError::SnapshotPath(path));
        }

        let retain = self.retain.ok_or(ProjectError::SnapshotRetainMissing)?;
        if retain < 1 {
            return Err(ProjectError::SnapshotRetain(retain));
        }

        Ok(SnapshotSchedule {
            frequency_unit: unit.to_string(),
            frequency_value: i64::from(frequency_value),
            retain,
            path,
            prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(frequency: &str, retain: Option<i64>, path: &str, prefix: &str) -> SnapshotElement {
        SnapshotElement {
            frequency: frequency.to_string(),
            retain,
            path: Some(path.to_string()),
            prefix: Some(prefix.to_string()),
        }
    }

    #[test]
    fn test_valid_schedule() {
        let schedule = settings("30m", Some(2), "/var/snap", "nightly")
            .validate()
            .unwrap();
        assert_eq!(schedule.frequency_unit, "m");
        assert_eq!(schedule.frequency_value, 30);
        assert_eq!(schedule.retain, 2);
    }

    #[test]
    fn test_bad_unit_mentions_allowed_units() {
        let err = settings("10x", Some(1), "/p", "x").validate().unwrap_err();
        assert!(err.to_string().contains("[s, m, h]"));
        assert!(err.to_string().contains("10x"));
    }

    #[test]
    fn test_non_integer_and_negative_frequency() {
        let err = settings("abc s", Some(1), "/p", "x").validate().unwrap_err();
        assert!(matches!(err, ProjectError::SnapshotFrequencyValue(ref v) if v == "abc "));

        let err = settings("-5h", Some(1), "/p", "x").validate().unwrap_err();
        assert!(matches!(err, ProjectError::SnapshotFrequencyValue(_)));
    }

    #[test]
    fn test_prefix_path_and_retain_rules() {
        assert!(matches!(
            settings("1s", Some(1), "/p", "").validate(),
            Err(ProjectError::SnapshotPrefixMissing(_))
        ));
        assert!(matches!(
            settings("1s", Some(1), "/p", "a-b").validate(),
            Err(ProjectError::SnapshotPrefixInvalid(_))
        ));
        assert!(matches!(
            settings("1s", Some(1), "/p", "a,b").validate(),
            Err(ProjectError::SnapshotPrefixInvalid(_))
        ));
        assert!(matches!(
            settings("1s", Some(1), "", "a").validate(),
            Err(ProjectError::SnapshotPath(_))
        ));
        assert!(matches!(
            settings("1s", None, "/p", "a").validate(),
            Err(ProjectError::SnapshotRetainMissing)
        ));

        let err = settings("1s", Some(0), "/p", "a").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Snapshot retain value 0 is not a valid value. Must be 1 or greater."
        );
    }
}
