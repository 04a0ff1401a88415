//! Standardisation of numeric features.

use serde::Serialize;

use crate::error::Result;
use crate::frame::{Frame, Value};

/// Fitted parameters of a standardised column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleParams {
    /// Mean of the input.
    pub mean: f64,
    /// Divisor applied after centring; 1 when the input is constant.
    pub scale: f64,
}

impl ScaleParams {
    /// Fit mean and population standard deviation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                scale: 1.0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };
        Self { mean, scale }
    }

    /// Apply the transformation to one value.
    #[must_use]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// Standardise a column in place: missing cells become 0 before fitting.
///
/// Returns `None` if the column does not exist.
///
/// # Errors
///
/// Returns an error if the scaled column cannot be written back.
pub fn standardize(frame: &mut Frame, column: &str) -> Result<Option<ScaleParams>> {
    let Some(col) = frame.column(column) else {
        return Ok(None);
    };

    let raw: Vec<f64> = col
        .values
        .iter()
        .map(|v| v.to_number().unwrap_or(0.0))
        .collect();
    let params = ScaleParams::fit(&raw);
    let scaled = raw
        .into_iter()
        .map(|v| Value::Number(params.transform(v)))
        .collect();
    frame.set_column(column, scaled)?;
    Ok(Some(params))
}
