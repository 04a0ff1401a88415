//! The processing pipeline that turns raw tracking records into model-ready
//! features.
//!
//! Steps run in a fixed order:
//! 1. Parse `DateGMT`/`TimeGMT` into dates and a combined `Timestamp`
//! 2. Coerce `Latitude`/`Longitude` to numbers
//! 3. Fill missing categorical values with the column mode
//! 4. Fill missing positions by k-nearest-neighbours
//! 5. Add `distance_to_colony_km`
//! 6. Add `hour_of_day`, `month` and `season`
//! 7. One-hot encode the categorical columns
//! 8. Standardise the scaled numeric columns

pub mod encode;
pub mod geo;
pub mod impute;
pub mod scale;
pub mod temporal;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::frame::{Frame, Value};

pub use encode::IndicatorGroup;
pub use scale::ScaleParams;
pub use temporal::Season;

/// Latitude column.
pub const LATITUDE_COLUMN: &str = "Latitude";
/// Longitude column.
pub const LONGITUDE_COLUMN: &str = "Longitude";
/// Distance feature column.
pub const DISTANCE_COLUMN: &str = "distance_to_colony_km";

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    /// Rows in the input frame.
    pub input_rows: usize,
    /// Columns in the input frame.
    pub input_columns: usize,
    /// Rows in the output frame.
    pub output_rows: usize,
    /// Columns in the output frame.
    pub output_columns: usize,
    /// Non-missing dates that did not match the date format.
    pub unparsed_dates: usize,
    /// Cells filled with the column mode, by column.
    pub mode_filled: BTreeMap<String, usize>,
    /// Cells filled by KNN imputation, by column.
    pub knn_filled: BTreeMap<String, usize>,
    /// Encoded indicator groups.
    pub encoded: Vec<IndicatorGroup>,
    /// Standardisation parameters, by column.
    pub scaled: BTreeMap<String, ScaleParams>,
}

/// Feature engineering over a loaded frame.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ProcessingConfig,
}

impl Pipeline {
    /// Create a pipeline with the given settings.
    #[must_use]
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Run every step over `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error if a derived column cannot be added or the encoded
    /// indicator groups fail verification.
    pub fn run(&self, mut frame: Frame) -> Result<(Frame, ProcessReport)> {
        let mut report = ProcessReport {
            input_rows: frame.height(),
            input_columns: frame.width(),
            ..ProcessReport::default()
        };

        report.unparsed_dates = temporal::parse_timestamps(&mut frame, &self.config.date_format)?;

        for column in [LATITUDE_COLUMN, LONGITUDE_COLUMN] {
            coerce_numeric(&mut frame, column)?;
        }

        for column in &self.config.categorical_columns {
            let filled = impute::fill_mode(&mut frame, column)?;
            if filled > 0 {
                report.mode_filled.insert(column.clone(), filled);
            }
        }

        let positions = [LATITUDE_COLUMN, LONGITUDE_COLUMN];
        if let Some(filled) = impute::fill_knn(&mut frame, &positions, self.config.knn_neighbors)? {
            for (column, count) in positions.iter().zip(filled) {
                if count > 0 {
                    report.knn_filled.insert((*column).to_string(), count);
                }
            }
        } else {
            warn!("Position columns not found; skipping position imputation and distance");
        }

        self.add_distance(&mut frame)?;
        temporal::add_time_features(&mut frame)?;

        report.encoded = encode::one_hot(&mut frame, &self.config.categorical_columns)?;

        for column in &self.config.scale_columns {
            if let Some(params) = scale::standardize(&mut frame, column)? {
                report.scaled.insert(column.clone(), params);
            } else {
                debug!("Scale column '{column}' not present");
            }
        }

        report.output_rows = frame.height();
        report.output_columns = frame.width();
        info!(
            "Processed data: {} rows and {} columns",
            report.output_rows, report.output_columns
        );
        Ok((frame, report))
    }

    fn add_distance(&self, frame: &mut Frame) -> Result<()> {
        let (Some(lat), Some(lon)) = (
            frame.column(LATITUDE_COLUMN),
            frame.column(LONGITUDE_COLUMN),
        ) else {
            return Ok(());
        };

        let colony = self.config.colony;
        let distances = lat
            .values
            .iter()
            .zip(&lon.values)
            .map(|(lat, lon)| match (lat.as_number(), lon.as_number()) {
                (Some(lat), Some(lon)) => Value::Number(geo::geodesic_km(
                    lat,
                    lon,
                    colony.latitude,
                    colony.longitude,
                )),
                _ => Value::Missing,
            })
            .collect();
        frame.set_column(DISTANCE_COLUMN, distances)
    }
}

/// Parse a column's cells as numbers; unparseable cells become missing.
///
/// # Errors
///
/// Returns an error if the column cannot be written back.
pub fn coerce_numeric(frame: &mut Frame, column: &str) -> Result<()> {
    let Some(col) = frame.column_mut(column) else {
        return Ok(());
    };
    let mut failed = 0usize;
    for value in &mut col.values {
        if value.is_missing() {
            continue;
        }
        *value = value.to_number().map_or_else(
            || {
                failed += 1;
                Value::Missing
            },
            Value::Number,
        );
    }
    if failed > 0 {
        warn!("{failed} '{column}' value(s) were not numeric");
    }
    Ok(())
}
