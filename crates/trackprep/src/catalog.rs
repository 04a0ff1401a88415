//! Documented meaning of the one-hot encoded feature columns.
//!
//! Every categorical column the pipeline encodes becomes a group of boolean
//! indicator columns named `<source>_<level>`. This module holds the
//! human-readable description of those indicators so the `columns` command
//! and the checker can explain what a column means.

use serde::Serialize;

/// Level name of the missing-value indicator.
pub const NAN_LEVEL: &str = "nan";

/// Separator between source column and level in indicator names.
pub const INDICATOR_SEPARATOR: char = '_';

/// One documented level of a categorical feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureLevel {
    /// Value as it appears in the raw data.
    pub value: &'static str,
    /// What the indicator means when set.
    pub meaning: &'static str,
}

/// A documented categorical feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCategory {
    /// Human-facing category name.
    pub label: &'static str,
    /// Column name in the raw data.
    pub source_column: &'static str,
    /// Documented levels, including the `nan` indicator.
    pub levels: Vec<FeatureLevel>,
}

impl FeatureCategory {
    /// Indicator column names for the documented levels.
    #[must_use]
    pub fn indicator_columns(&self) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| indicator_name(self.source_column, level.value))
            .collect()
    }
}

/// A terminology note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    /// The term.
    pub term: &'static str,
    /// Its explanation.
    pub definition: &'static str,
}

const fn level(value: &'static str, meaning: &'static str) -> FeatureLevel {
    FeatureLevel { value, meaning }
}

const MISSING_MEANING: &str = "Value was missing in the raw data";

/// The documented categorical features.
#[must_use]
pub fn catalog() -> Vec<FeatureCategory> {
    vec![
        FeatureCategory {
            label: "Sex",
            source_column: "Sex",
            levels: vec![
                level("female", "Female bird"),
                level("male", "Male bird"),
                level("unknown", "Sex could not be determined"),
                level(NAN_LEVEL, MISSING_MEANING),
            ],
        },
        FeatureCategory {
            label: "Age",
            source_column: "Age",
            levels: vec![
                level("adult", "Adult bird"),
                level(NAN_LEVEL, MISSING_MEANING),
            ],
        },
        FeatureCategory {
            label: "Breed Stage",
            source_column: "Breed Stage",
            levels: vec![
                level("brood-guard", "Chicks are brooded and guarded at the nest"),
                level("creche", "Creche phase: chicks gather in groups"),
                level("incubation", "Eggs are being incubated"),
                level("winter", "Non-breeding winter period"),
                level(NAN_LEVEL, MISSING_MEANING),
            ],
        },
        FeatureCategory {
            label: "Data Quality",
            source_column: "ArgosQuality",
            levels: vec![
                level("3", "Argos quality 3: highest accuracy, deviation below 250 m"),
                level(NAN_LEVEL, MISSING_MEANING),
            ],
        },
    ]
}

/// Terminology used in the feature descriptions.
#[must_use]
pub fn glossary() -> Vec<GlossaryEntry> {
    vec![
        GlossaryEntry {
            term: "Creche Phase",
            definition: "Breeding stage in which chicks gather in groups, \
                         so that both parents are free to forage.",
        },
        GlossaryEntry {
            term: "Argos Quality 3",
            definition: "Best Argos satellite positional accuracy class, \
                         with a deviation of less than 250 metres.",
        },
    ]
}

/// Name of the indicator column for a source column and level.
#[must_use]
pub fn indicator_name(source: &str, value: &str) -> String {
    format!("{source}{INDICATOR_SEPARATOR}{value}")
}

/// Documented meaning of an indicator column, if it is documented.
#[must_use]
pub fn describe(column: &str) -> Option<&'static str> {
    catalog().into_iter().find_map(|category| {
        category
            .levels
            .iter()
            .find(|level| indicator_name(category.source_column, level.value) == column)
            .map(|level| level.meaning)
    })
}

/// Render the catalog as a Markdown table followed by the glossary.
#[must_use]
pub fn render_markdown() -> String {
    let mut out = String::from("| Category | Column | Meaning |\n|---|---|---|\n");
    for category in catalog() {
        for level in &category.levels {
            out.push_str(&format!(
                "| {} | `{}` | {} |\n",
                category.label,
                indicator_name(category.source_column, level.value),
                level.meaning
            ));
        }
    }
    out.push('\n');
    for entry in glossary() {
        out.push_str(&format!("- **{}**: {}\n", entry.term, entry.definition));
    }
    out
}
