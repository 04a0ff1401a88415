//! One-hot encoding of categorical columns and verification of the encoded
//! indicator groups.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{indicator_name, NAN_LEVEL};
use crate::error::{Error, Result};
use crate::frame::{Frame, Value};

/// The indicator columns produced from one source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorGroup {
    /// Source column name.
    pub source: String,
    /// Observed levels in sorted order, excluding `nan`.
    pub levels: Vec<String>,
}

impl IndicatorGroup {
    /// Indicator column names: one per level, then the `nan` indicator.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        self.levels
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(NAN_LEVEL))
            .map(|level| indicator_name(&self.source, level))
            .collect()
    }

    /// Name of the `nan` indicator column.
    #[must_use]
    pub fn nan_column(&self) -> String {
        indicator_name(&self.source, NAN_LEVEL)
    }
}

/// Replace each of `sources` present in the frame with boolean indicator
/// columns.
///
/// Indicators are appended after the remaining columns, grouped in `sources`
/// order, with levels sorted and the `nan` indicator last. Absent sources are
/// skipped. The result is checked with [`verify_group`].
///
/// # Errors
///
/// Returns an error if an indicator column cannot be added or the encoded
/// group breaks the one-hot rules.
pub fn one_hot(frame: &mut Frame, sources: &[String]) -> Result<Vec<IndicatorGroup>> {
    let mut pending = Vec::new();
    for source in sources {
        if let Some(column) = frame.drop_column(source) {
            pending.push(column);
        }
    }

    let mut groups = Vec::with_capacity(pending.len());
    for column in pending {
        let keys: Vec<Option<String>> = column
            .values
            .iter()
            .map(|v| (!v.is_missing()).then(|| v.to_string()))
            .collect();
        let levels: Vec<String> = keys
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let group = IndicatorGroup {
            source: column.name,
            levels,
        };

        for level in &group.levels {
            let indicators = keys
                .iter()
                .map(|key| Value::Bool(key.as_deref() == Some(level.as_str())))
                .collect();
            frame.set_column(&indicator_name(&group.source, level), indicators)?;
        }
        let nan = keys.iter().map(|key| Value::Bool(key.is_none())).collect();
        frame.set_column(&group.nan_column(), nan)?;

        verify_group(frame, &group)?;
        debug!(
            "Encoded '{}' into {} indicator column(s)",
            group.source,
            group.levels.len() + 1
        );
        groups.push(group);
    }

    Ok(groups)
}

/// Check one row of an indicator group.
///
/// `substantive` holds the level indicators, `nan` the missing indicator.
/// Returns a description of the problem, or `None` if the row is valid.
#[must_use]
pub fn check_row(substantive: &[bool], nan: bool) -> Option<String> {
    let set = substantive.iter().filter(|&&b| b).count();
    match (set, nan) {
        (0, true) | (1, false) => None,
        (0, false) => Some("no indicator set".to_string()),
        (n, true) => Some(format!("nan indicator set together with {n} level(s)")),
        (n, false) => Some(format!("{n} level indicators set")),
    }
}

/// Verify that every row of the group has exactly one indicator set, and
/// that the `nan` indicator is set exactly when no level indicator is.
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] if an indicator column is absent and
/// [`Error::OneHotViolation`] for the first bad row.
pub fn verify_group(frame: &Frame, group: &IndicatorGroup) -> Result<()> {
    let level_columns = group
        .levels
        .iter()
        .map(|level| {
            let name = indicator_name(&group.source, level);
            frame
                .column(&name)
                .map(|c| &c.values)
                .ok_or(Error::MissingColumn(name))
        })
        .collect::<Result<Vec<_>>>()?;
    let nan_name = group.nan_column();
    let nan_column = &frame
        .column(&nan_name)
        .ok_or(Error::MissingColumn(nan_name))?
        .values;

    for row in 0..frame.height() {
        let substantive: Vec<bool> = level_columns
            .iter()
            .map(|values| values[row].as_bool().unwrap_or(false))
            .collect();
        let nan = nan_column[row].as_bool().unwrap_or(false);
        if let Some(reason) = check_row(&substantive, nan) {
            return Err(Error::one_hot_violation(&group.source, row, reason));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn bools(frame: &Frame, name: &str) -> Vec<bool> {
        frame
            .column(name)
            .unwrap()
            .values
            .iter()
            .map(|v| v.as_bool().unwrap())
            .collect()
    }

    fn sources(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_check_row() {
        assert_eq!(check_row(&[true, false], false), None);
        assert_eq!(check_row(&[false, false], true), None);
        assert_eq!(check_row(&[], true), None);
        assert!(check_row(&[false, false], false).is_some());
        assert!(check_row(&[true, true], false).is_some());
        assert!(check_row(&[true, false], true).unwrap().contains("nan"));
    }

    #[test]
    fn test_one_hot_basic() {
        let mut frame = Frame::new();
        frame
            .set_column("BirdId", vec![text("1"), text("2"), text("3")])
            .unwrap();
        frame
            .set_column("Sex", vec![text("male"), Value::Missing, text("female")])
            .unwrap();

        let groups = one_hot(&mut frame, &sources(&["Sex"])).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].levels, vec!["female", "male"]);
        assert_eq!(
            frame.column_names(),
            vec!["BirdId", "Sex_female", "Sex_male", "Sex_nan"]
        );
        assert_eq!(bools(&frame, "Sex_female"), vec![false, false, true]);
        assert_eq!(bools(&frame, "Sex_male"), vec![true, false, false]);
        assert_eq!(bools(&frame, "Sex_nan"), vec![false, true, false]);
    }

    #[test]
    fn test_one_hot_groups_follow_source_order() {
        let mut frame = Frame::new();
        frame.set_column("Age", vec![text("adult")]).unwrap();
        frame.set_column("Latitude", vec![Value::Number(-62.0)]).unwrap();
        frame.set_column("Sex", vec![text("unknown")]).unwrap();

        one_hot(&mut frame, &sources(&["Sex", "Age", "Breed Stage"])).unwrap();
        assert_eq!(
            frame.column_names(),
            vec!["Latitude", "Sex_unknown", "Sex_nan", "Age_adult", "Age_nan"]
        );
    }

    #[test]
    fn test_one_hot_nan_column_always_present() {
        let mut frame = Frame::new();
        frame
            .set_column("Breed Stage", vec![text("creche"), text("incubation")])
            .unwrap();

        let groups = one_hot(&mut frame, &sources(&["Breed Stage"])).unwrap();
        assert_eq!(
            groups[0].columns(),
            vec![
                "Breed Stage_creche",
                "Breed Stage_incubation",
                "Breed Stage_nan"
            ]
        );
        assert_eq!(bools(&frame, "Breed Stage_nan"), vec![false, false]);
    }

    #[test]
    fn test_one_hot_numeric_like_levels() {
        let mut frame = Frame::new();
        frame
            .set_column("ArgosQuality", vec![text("3"), text("A"), text("0")])
            .unwrap();

        let groups = one_hot(&mut frame, &sources(&["ArgosQuality"])).unwrap();
        assert_eq!(groups[0].levels, vec!["0", "3", "A"]);
        assert_eq!(bools(&frame, "ArgosQuality_3"), vec![true, false, false]);
    }

    #[test]
    fn test_verify_group_detects_violation() {
        let mut frame = Frame::new();
        frame
            .set_column("Age_adult", vec![Value::Bool(true), Value::Bool(true)])
            .unwrap();
        frame
            .set_column("Age_nan", vec![Value::Bool(false), Value::Bool(true)])
            .unwrap();
        let group = IndicatorGroup {
            source: "Age".to_string(),
            levels: vec!["adult".to_string()],
        };

        let err = verify_group(&frame, &group).unwrap_err();
        assert!(matches!(err, Error::OneHotViolation { row: 1, .. }));
    }

    #[test]
    fn test_verify_group_missing_column() {
        let frame = Frame::new();
        let group = IndicatorGroup {
            source: "Age".to_string(),
            levels: Vec::new(),
        };
        let err = verify_group(&frame, &group).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(name) if name == "Age_nan"));
    }
}
