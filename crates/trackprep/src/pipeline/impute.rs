//! Missing-value imputation.
//!
//! Categorical columns are filled with their most frequent value. Positions
//! are filled with a k-nearest-neighbours estimate computed over the other
//! coordinates of the same row.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::{Frame, Value};

/// Most frequent non-missing value of a column.
///
/// Ties resolve to the lexicographically smallest rendering. Returns `None`
/// when every cell is missing.
#[must_use]
pub fn mode(values: &[Value]) -> Option<Value> {
    let mut counts: BTreeMap<String, (usize, &Value)> = BTreeMap::new();
    for value in values.iter().filter(|v| !v.is_missing()) {
        counts.entry(value.to_string()).or_insert((0, value)).0 += 1;
    }

    // BTreeMap iterates in key order, so the first maximum is the smallest key.
    let mut best: Option<(usize, &Value)> = None;
    for (count, value) in counts.into_values() {
        if best.map_or(true, |(best_count, _)| count > best_count) {
            best = Some((count, value));
        }
    }
    best.map(|(_, value)| value.clone())
}

/// Fill missing cells of `column` with its mode.
///
/// Returns the number of cells filled. A missing column, a column without
/// gaps, or a column without any observed value is left unchanged.
///
/// # Errors
///
/// Returns an error if the filled column cannot be written back.
pub fn fill_mode(frame: &mut Frame, column: &str) -> Result<usize> {
    let Some(col) = frame.column_mut(column) else {
        return Ok(0);
    };
    let missing = col.missing_count();
    if missing == 0 {
        return Ok(0);
    }

    let Some(fill) = mode(&col.values) else {
        warn!("Column '{column}' has no observed values; leaving {missing} cell(s) missing");
        return Ok(0);
    };

    debug!("Filling {missing} missing '{column}' value(s) with {fill}");
    for value in col.values.iter_mut().filter(|v| v.is_missing()) {
        *value = fill.clone();
    }
    Ok(missing)
}

/// NaN-aware Euclidean distance between two rows.
///
/// Only coordinates present in both rows contribute, and the sum is scaled
/// up by `n_features / n_present`. Returns `None` when no coordinate is
/// shared.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn nan_euclidean(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    let mut present = 0usize;
    for (x, y) in a.iter().zip(b) {
        if let (Some(x), Some(y)) = (x, y) {
            sum += (x - y).powi(2);
            present += 1;
        }
    }
    (present > 0).then(|| (sum * a.len() as f64 / present as f64).sqrt())
}

/// Impute missing cells of a row-major matrix with the mean of the `k`
/// nearest donor rows.
///
/// Donors for a feature are rows where that feature is observed. Distances
/// use [`nan_euclidean`] on the original (unimputed) rows; ties keep row
/// order. A row with no comparable donor receives the feature's mean. A
/// feature with no observed value stays missing.
///
/// Returns the number of cells filled per feature.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn knn_impute(rows: &mut [Vec<Option<f64>>], k: usize) -> Vec<usize> {
    let width = rows.first().map_or(0, Vec::len);
    let original: Vec<Vec<Option<f64>>> = rows.to_vec();
    let mut filled = vec![0; width];

    for feature in 0..width {
        let donors: Vec<usize> = (0..original.len())
            .filter(|&i| original[i][feature].is_some())
            .collect();
        if donors.is_empty() {
            continue;
        }
        let mean = donors
            .iter()
            .filter_map(|&i| original[i][feature])
            .sum::<f64>()
            / donors.len() as f64;

        for (receiver, row) in rows.iter_mut().enumerate() {
            if original[receiver][feature].is_some() {
                continue;
            }

            let mut neighbours: Vec<(f64, usize)> = donors
                .iter()
                .filter_map(|&d| {
                    nan_euclidean(&original[receiver], &original[d]).map(|dist| (dist, d))
                })
                .collect();

            let estimate = if neighbours.is_empty() {
                mean
            } else {
                neighbours.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                let nearest = &neighbours[..k.min(neighbours.len())];
                nearest
                    .iter()
                    .filter_map(|&(_, d)| original[d][feature])
                    .sum::<f64>()
                    / nearest.len() as f64
            };

            row[feature] = Some(estimate);
            filled[feature] += 1;
        }
    }

    filled
}

/// KNN-impute the given numeric columns of a frame in place.
///
/// All columns must be present and already numeric; cells that are not
/// numbers are treated as missing. Returns the number of cells filled per
/// column, in `columns` order, or `None` when a column is absent.
///
/// # Errors
///
/// Returns an error if the imputed columns cannot be written back.
pub fn fill_knn(frame: &mut Frame, columns: &[&str], k: usize) -> Result<Option<Vec<usize>>> {
    if !columns.iter().all(|c| frame.has_column(c)) {
        return Ok(None);
    }

    let mut rows: Vec<Vec<Option<f64>>> = (0..frame.height())
        .map(|i| {
            columns
                .iter()
                .map(|c| frame.column(c).and_then(|col| col.values[i].as_number()))
                .collect()
        })
        .collect();

    if rows.iter().all(|row| row.iter().all(Option::is_some)) {
        return Ok(Some(vec![0; columns.len()]));
    }

    let filled = knn_impute(&mut rows, k);
    for (j, column) in columns.iter().enumerate() {
        if rows.iter().any(|row| row[j].is_none()) {
            warn!("Column '{column}' has no observed values; it stays missing");
        }
        let values = rows
            .iter()
            .map(|row| row[j].map_or(Value::Missing, Value::Number))
            .collect();
        frame.set_column(column, values)?;
    }

    debug!("KNN imputation (k={k}) filled {filled:?} cell(s) in {columns:?}");
    Ok(Some(filled))
}
