//! In-memory tabular data for tracking records.
//!
//! A [`Frame`] is an ordered set of named columns of equal length. Cells are
//! [`Value`]s, which keep raw CSV text until a pipeline step converts them
//! to a typed representation.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Tokens treated as a missing value when reading raw text.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value.
    Missing,
    /// Unparsed or categorical text.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// A boolean indicator.
    Bool(bool),
    /// A calendar date.
    Date(NaiveDate),
    /// A date with time of day.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Build a value from raw CSV text, mapping NA tokens to [`Value::Missing`].
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NA_TOKENS.contains(&trimmed) {
            Self::Missing
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// Check if this is a missing cell.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Get the text content, if this is a text cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric content, if this is a number cell.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean content, if this is a bool cell.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the timestamp content, if this is a timestamp cell.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Coerce to a number: numbers pass through, text is parsed, anything
    /// else yields `None`.
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            other => serializer.collect_str(other),
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Cells, one per row.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of missing cells.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }
}

/// An ordered collection of equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    height: usize,
}

impl Frame {
    /// Create an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame with the given (empty) columns.
    #[must_use]
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names
                .into_iter()
                .map(|name| Column::new(name, Vec::new()))
                .collect(),
            height: 0,
        }
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row width differs from the frame width.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ShapeMismatch {
                column: "<row>".to_string(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.values.push(value);
        }
        self.height += 1;
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Check whether the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Check whether a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column by name, mutably.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Replace the column's values, or append a new column.
    ///
    /// # Errors
    ///
    /// Returns an error if the value count differs from the frame height.
    /// A frame without columns adopts the length of its first column.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if self.columns.is_empty() {
            self.height = values.len();
        } else if values.len() != self.height {
            return Err(Error::ShapeMismatch {
                column: name.to_string(),
                expected: self.height,
                actual: values.len(),
            });
        }
        match self.column_mut(name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        Ok(())
    }

    /// Remove a column, returning it if it existed.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(index))
    }

    /// Cells of one row, in column order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        (index < self.height).then(|| self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Concatenate frames vertically.
    ///
    /// The result has the union of all column names in first-seen order;
    /// cells for columns a frame lacks are [`Value::Missing`].
    #[must_use]
    pub fn concat(frames: Vec<Frame>) -> Frame {
        let mut names: Vec<String> = Vec::new();
        for frame in &frames {
            for column in &frame.columns {
                if !names.contains(&column.name) {
                    names.push(column.name.clone());
                }
            }
        }

        let mut out: Vec<Column> = names
            .iter()
            .map(|name| Column::new(name.clone(), Vec::new()))
            .collect();
        let mut height = 0;

        for mut frame in frames {
            for column in &mut out {
                match frame.drop_column(&column.name) {
                    Some(source) => column.values.extend(source.values),
                    None => column
                        .values
                        .extend(std::iter::repeat(Value::Missing).take(frame.height)),
                }
            }
            height += frame.height;
        }

        Frame {
            columns: out,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn sample_frame() -> Frame {
        let mut frame = Frame::with_columns(["Sex", "Latitude"]);
        frame.push_row(vec![text("female"), text("-62.2")]).unwrap();
        frame.push_row(vec![Value::Missing, text("-61.9")]).unwrap();
        frame
    }

    #[test]
    fn test_from_raw_na_tokens() {
        for token in ["", "  ", "NA", "NaN", "nan", "NULL", "None", "<NA>"] {
            assert!(Value::from_raw(token).is_missing(), "token {token:?}");
        }
        assert_eq!(Value::from_raw(" male "), text("male"));
        assert_eq!(Value::from_raw("0"), text("0"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-62.21).to_string(), "-62.21");
        assert_eq!(Value::Bool(true).to_string(), "true");
        let date = NaiveDate::from_ymd_opt(2019, 1, 5).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2019-01-05");
        let ts = date.and_hms_opt(7, 8, 9).unwrap();
        assert_eq!(Value::Timestamp(ts).to_string(), "2019-01-05 07:08:09");
    }

    #[test]
    fn test_to_number() {
        assert_eq!(text("-58.42").to_number(), Some(-58.42));
        assert_eq!(Value::Number(1.5).to_number(), Some(1.5));
        assert_eq!(text("north").to_number(), None);
        assert_eq!(Value::Missing.to_number(), None);
    }

    #[test]
    fn test_value_serialize() {
        let json = serde_json::to_string(&vec![
            Value::Missing,
            Value::Number(2.5),
            Value::Bool(false),
            text("creche"),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,2.5,false,"creche"]"#);
    }

    #[test]
    fn test_push_row_and_lookup() {
        let frame = sample_frame();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.column_names(), vec!["Sex", "Latitude"]);
        assert_eq!(frame.column("Sex").unwrap().missing_count(), 1);
        assert!(frame.column("Age").is_none());
        assert_eq!(frame.row(0).unwrap(), vec![&text("female"), &text("-62.2")]);
        assert!(frame.row(2).is_none());
    }

    #[test]
    fn test_push_row_wrong_width() {
        let mut frame = Frame::with_columns(["a", "b"]);
        let err = frame.push_row(vec![Value::Missing]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(frame.height(), 0);
    }

    #[test]
    fn test_set_column_replace_and_append() {
        let mut frame = sample_frame();
        frame
            .set_column("Sex", vec![text("male"), text("male")])
            .unwrap();
        frame
            .set_column("month", vec![Value::Number(1.0), Value::Number(2.0)])
            .unwrap();
        assert_eq!(frame.column_names(), vec!["Sex", "Latitude", "month"]);
        assert_eq!(frame.column("Sex").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_set_column_length_mismatch() {
        let mut frame = sample_frame();
        let err = frame.set_column("month", vec![Value::Missing]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_set_column_on_empty_frame() {
        let mut frame = Frame::new();
        frame.set_column("x", vec![Value::Missing; 3]).unwrap();
        assert_eq!(frame.height(), 3);
    }

    #[test]
    fn test_drop_column() {
        let mut frame = sample_frame();
        assert!(frame.drop_column("Sex").is_some());
        assert!(frame.drop_column("Sex").is_none());
        assert_eq!(frame.column_names(), vec!["Latitude"]);
    }

    #[test]
    fn test_concat_union_of_columns() {
        let first = sample_frame();
        let mut second = Frame::with_columns(["Latitude", "Age"]);
        second.push_row(vec![text("-60.0"), text("adult")]).unwrap();

        let merged = Frame::concat(vec![first, second]);
        assert_eq!(merged.height(), 3);
        assert_eq!(merged.column_names(), vec!["Sex", "Latitude", "Age"]);
        assert_eq!(merged.column("Sex").unwrap().values[2], Value::Missing);
        assert_eq!(merged.column("Age").unwrap().values[0], Value::Missing);
        assert_eq!(merged.column("Age").unwrap().values[2], text("adult"));
        assert_eq!(merged.column("Latitude").unwrap().values[2], text("-60.0"));
    }

    #[test]
    fn test_concat_empty() {
        let merged = Frame::concat(Vec::new());
        assert!(merged.is_empty());
        assert_eq!(merged.width(), 0);
    }
}
