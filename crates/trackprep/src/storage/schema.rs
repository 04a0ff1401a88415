//! `SQLite` schema definitions for trackprep.
//!
//! The processed table has one column per frame column, so its DDL is
//! generated from the frame. Only the metadata table is fixed.

use std::collections::HashSet;

use crate::frame::{Column, Frame, Value};

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Storage class for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// Floating-point values.
    Real,
    /// Booleans stored as 0/1.
    Integer,
    /// Anything else.
    Text,
}

impl Affinity {
    /// SQL type name.
    #[must_use]
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Real => "REAL",
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }

    /// Infer the affinity from a column's non-missing cells.
    ///
    /// A column of only numbers is `REAL`, only booleans is `INTEGER`;
    /// mixed or textual columns are `TEXT`. An all-missing column is `TEXT`.
    #[must_use]
    pub fn infer(column: &Column) -> Self {
        let mut present = column.values.iter().filter(|v| !v.is_missing()).peekable();
        if present.peek().is_none() {
            return Self::Text;
        }
        let mut all_numbers = true;
        let mut all_bools = true;
        for value in present {
            all_numbers &= matches!(value, Value::Number(_));
            all_bools &= matches!(value, Value::Bool(_));
        }
        if all_numbers {
            Self::Real
        } else if all_bools {
            Self::Integer
        } else {
            Self::Text
        }
    }
}

/// Quote an identifier for use in SQL.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Table column names for a frame, one per frame column in order.
///
/// `SQLite` compares identifiers without regard to ASCII case, so
/// `Sex_Male` and `Sex_male` cannot share a table. Later columns that
/// collide with an earlier name get a `__2`, `__3`, ... suffix.
#[must_use]
pub fn sql_column_names(frame: &Frame) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    frame
        .columns()
        .iter()
        .map(|c| {
            let mut name = c.name.clone();
            let mut suffix = 2;
            while !taken.insert(name.to_ascii_lowercase()) {
                name = format!("{}__{suffix}", c.name);
                suffix += 1;
            }
            name
        })
        .collect()
}

/// `CREATE TABLE` statement for a frame.
#[must_use]
pub fn create_table_sql(table: &str, frame: &Frame) -> String {
    let columns: Vec<String> = frame
        .columns()
        .iter()
        .zip(sql_column_names(frame))
        .map(|(c, name)| format!("{} {}", quote_ident(&name), Affinity::infer(c).sql_type()))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table), columns.join(", "))
}

/// Parameterised `INSERT` statement for a frame.
#[must_use]
pub fn insert_sql(table: &str, frame: &Frame) -> String {
    let names: Vec<String> = sql_column_names(frame)
        .iter()
        .map(|n| quote_ident(n))
        .collect();
    let placeholders: Vec<String> = (1..=frame.width()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }

    #[test]
    fn test_infer_affinity() {
        let real = Column::new("a", vec![Value::Number(1.0), Value::Missing]);
        let int = Column::new("b", vec![Value::Bool(true), Value::Bool(false)]);
        let mixed = Column::new("c", vec![Value::Number(1.0), Value::Text("x".into())]);
        let empty = Column::new("d", vec![Value::Missing]);

        assert_eq!(Affinity::infer(&real), Affinity::Real);
        assert_eq!(Affinity::infer(&int), Affinity::Integer);
        assert_eq!(Affinity::infer(&mixed), Affinity::Text);
        assert_eq!(Affinity::infer(&empty), Affinity::Text);
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Breed Stage_creche"), "\"Breed Stage_creche\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_generated_sql() {
        let mut frame = Frame::new();
        frame.set_column("Latitude", vec![Value::Number(-62.0)]).unwrap();
        frame.set_column("Sex_nan", vec![Value::Bool(false)]).unwrap();

        assert_eq!(
            create_table_sql("observations", &frame),
            r#"CREATE TABLE "observations" ("Latitude" REAL, "Sex_nan" INTEGER)"#
        );
        assert_eq!(
            insert_sql("observations", &frame),
            r#"INSERT INTO "observations" ("Latitude", "Sex_nan") VALUES (?1, ?2)"#
        );
    }

    #[test]
    fn test_case_colliding_columns_get_suffix() {
        let mut frame = Frame::new();
        frame.set_column("Sex_Male", vec![Value::Bool(true)]).unwrap();
        frame.set_column("Sex_female", vec![Value::Bool(false)]).unwrap();
        frame.set_column("Sex_male", vec![Value::Bool(false)]).unwrap();
        frame.set_column("SEX_MALE", vec![Value::Bool(false)]).unwrap();

        assert_eq!(
            sql_column_names(&frame),
            vec!["Sex_Male", "Sex_female", "Sex_male__2", "SEX_MALE__3"]
        );
        assert!(create_table_sql("t", &frame).contains(r#""Sex_male__2" INTEGER"#));
        assert!(insert_sql("t", &frame).contains(r#""SEX_MALE__3""#));
    }
}
