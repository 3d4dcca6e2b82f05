//! Global-mean checks between the geographic and tidally-locked states.

use serde::Serialize;
use tl_common::{MeanMode, State, TlResult};

/// Area-weighted global means of one variable in both frames.
///
/// Means carry the variable's leading dimensions, flattened row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanComparison {
    pub variable: String,
    pub earth: Vec<f64>,
    pub tidally_locked: Vec<f64>,
}

impl MeanComparison {
    /// Largest relative difference between the two frames, ignoring
    /// entries where either mean is NaN.
    pub fn max_relative_difference(&self) -> f64 {
        self.earth
            .iter()
            .zip(&self.tidally_locked)
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .map(|(a, b)| {
                let scale = a.abs().max(b.abs());
                if scale == 0.0 {
                    0.0
                } else {
                    (a - b).abs() / scale
                }
            })
            .fold(0.0, f64::max)
    }
}

/// Compare global means of every variable present in both states.
pub fn compare_global_means(
    earth: &State,
    tidally_locked: &State,
    earth_mode: MeanMode,
    tl_mode: MeanMode,
) -> TlResult<Vec<MeanComparison>> {
    let mut comparisons = Vec::new();
    for name in tidally_locked.field_names() {
        if !earth.has_field(name) {
            continue;
        }
        comparisons.push(MeanComparison {
            variable: name.to_string(),
            earth: earth.global_mean(name, earth_mode)?.iter().copied().collect(),
            tidally_locked: tidally_locked
                .global_mean(name, tl_mode)?
                .iter()
                .copied()
                .collect(),
        });
    }
    Ok(comparisons)
}
