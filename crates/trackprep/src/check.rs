//! Verification of one-hot indicator groups in a processed CSV file.
//!
//! A group is every `<source>_<level>` column for a configured source that
//! also has a `<source>_nan` column. Each row of a group must have exactly
//! one indicator set, with the `nan` indicator set only when no level is.
//!
//! Columns under a longer configured source (`Sex_at_birth_*` when both
//! `Sex` and `Sex_at_birth` are configured) belong to that source only.
//! Prefixed columns holding no indicator value at all, such as a numeric
//! `Sex_confidence`, are left out of the group and listed as ignored.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{self, indicator_name, INDICATOR_SEPARATOR, NAN_LEVEL};
use crate::error::Result;
use crate::frame::{Frame, Value};
use crate::ingest::read_csv;
use crate::pipeline::encode::check_row;

/// Most violations recorded per group.
const MAX_VIOLATIONS: usize = 20;

/// A row that broke the encoding rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Zero-based data row index.
    pub row: usize,
    /// What was wrong.
    pub reason: String,
}

/// Result of checking one indicator group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCheck {
    /// Source column name.
    pub source: String,
    /// Level indicator columns found, in file order, excluding `nan`.
    pub levels: Vec<String>,
    /// Levels present in the file but not in the feature catalog.
    pub undocumented: Vec<String>,
    /// Prefixed columns left out because none of their cells is an indicator.
    pub ignored: Vec<String>,
    /// Total number of bad rows.
    pub violation_count: usize,
    /// The first bad rows.
    pub violations: Vec<Violation>,
}

impl GroupCheck {
    /// Check whether the group passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violation_count == 0
    }
}

/// Result of checking a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Number of data rows.
    pub rows: usize,
    /// Checked groups.
    pub groups: Vec<GroupCheck>,
    /// Configured sources without a `nan` indicator in the file.
    pub missing_groups: Vec<String>,
}

impl CheckReport {
    /// Check whether every group passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.groups.iter().all(GroupCheck::is_valid)
    }
}

/// Parse an indicator cell.
#[must_use]
pub fn parse_indicator(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Text(s) => match s.as_str() {
            "true" | "True" | "TRUE" | "1" | "1.0" => Some(true),
            "false" | "False" | "FALSE" | "0" | "0.0" => Some(false),
            _ => None,
        },
        Value::Number(n) if *n == 1.0 => Some(true),
        Value::Number(n) if *n == 0.0 => Some(false),
        _ => None,
    }
}

/// Check a processed CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn check_file(path: impl AsRef<Path>, sources: &[String]) -> Result<CheckReport> {
    let frame = read_csv(path.as_ref())?;
    Ok(check_frame(&frame, sources))
}

/// Check the indicator groups of an in-memory frame.
#[must_use]
pub fn check_frame(frame: &Frame, sources: &[String]) -> CheckReport {
    let mut groups = Vec::new();
    let mut missing_groups = Vec::new();

    for source in sources {
        let nan_name = indicator_name(source, NAN_LEVEL);
        let Some(nan_column) = frame.column(&nan_name) else {
            warn!("No '{nan_name}' column; skipping group '{source}'");
            missing_groups.push(source.clone());
            continue;
        };

        let prefix = format!("{source}{INDICATOR_SEPARATOR}");
        let nested: Vec<String> = sources
            .iter()
            .filter(|other| other.starts_with(&prefix))
            .map(|other| format!("{other}{INDICATOR_SEPARATOR}"))
            .collect();
        let (level_columns, ignored): (Vec<_>, Vec<_>) = frame
            .columns()
            .iter()
            .filter(|c| c.name.starts_with(&prefix) && c.name != nan_name)
            .filter(|c| !nested.iter().any(|n| c.name.starts_with(n.as_str())))
            .partition(|c| c.values.iter().any(|v| parse_indicator(v).is_some()));
        for column in &ignored {
            warn!(
                "Column '{}' holds no indicator values; not part of group '{source}'",
                column.name
            );
        }

        let mut check = GroupCheck {
            source: source.clone(),
            levels: level_columns
                .iter()
                .map(|c| c.name[prefix.len()..].to_string())
                .collect(),
            undocumented: level_columns
                .iter()
                .filter(|c| catalog::describe(&c.name).is_none())
                .map(|c| c.name[prefix.len()..].to_string())
                .collect(),
            ignored: ignored.iter().map(|c| c.name.clone()).collect(),
            violation_count: 0,
            violations: Vec::new(),
        };

        for row in 0..frame.height() {
            let reason = match level_columns
                .iter()
                .map(|c| parse_indicator(&c.values[row]))
                .collect::<Option<Vec<bool>>>()
                .zip(parse_indicator(&nan_column.values[row]))
            {
                Some((levels, nan)) => check_row(&levels, nan),
                None => Some("non-boolean indicator value".to_string()),
            };
            if let Some(reason) = reason {
                check.violation_count += 1;
                if check.violations.len() < MAX_VIOLATIONS {
                    check.violations.push(Violation { row, reason });
                }
            }
        }

        debug!(
            "Group '{source}': {} level(s), {} violation(s)",
            check.levels.len(),
            check.violation_count
        );
        groups.push(check);
    }

    CheckReport {
        rows: frame.height(),
        groups,
        missing_groups,
    }
}
