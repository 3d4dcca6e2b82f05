//! Pipeline behind the `tl-transform` command.
//!
//! Loads a state document, optionally averages it over its last time steps
//! (dropping length-1 leading dimensions),
//! regrids it into tidally-locked coordinates and writes the result with
//! provenance.

use std::path::PathBuf;

use anyhow::{Context, Result};
use grid_processor::{compare_global_means, transform_with_config, MeanComparison, TransformConfig, VariableRoles};
use serde::Serialize;
use tl_common::{normalize_longitude, State, StateDocument};
use tracing::info;

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Variables to transform; `None` takes every field of the input.
    pub vars: Option<Vec<String>>,
    /// Average over the last N time steps before regridding.
    pub time_mean_last: Option<usize>,
    pub config: TransformConfig,
}

/// What a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub output: PathBuf,
    pub source_shape: (usize, usize),
    pub target_shape: (usize, usize),
    pub variables: Vec<String>,
    pub means: Vec<MeanComparison>,
}

/// Run the whole pipeline.
pub fn run(options: &RunOptions) -> Result<RunReport> {
    options.config.validate().context("Invalid transform configuration")?;

    let document = StateDocument::read(&options.input)
        .with_context(|| format!("Failed to read state document {}", options.input.display()))?;
    let mut source = document
        .into_state()
        .with_context(|| format!("Invalid state in {}", options.input.display()))?;
    info!(
        input = %options.input.display(),
        shape = ?source.shape(),
        fields = source.field_names().count(),
        "Loaded source state"
    );

    if let Some(last) = options.time_mean_last {
        let averaged = source
            .average_time(last)
            .context("Failed to average over time")?;
        source.squeeze_fields();
        info!(steps = last, fields = ?averaged, "Averaged source over time");
    }

    let roles = select_roles(&source, options.vars.as_deref());
    let target = transform_with_config(&source, &roles, &options.config)
        .context("Failed to transform state")?;

    let means = compare_global_means(
        &source,
        &target,
        options.config.earth_mean_mode,
        options.config.tl_mean_mode,
    )
    .context("Failed to compute global means")?;

    StateDocument::from_state(&target)
        .with_provenance(normalize_longitude(options.config.lon_ss))
        .write(&options.output)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;
    info!(output = %options.output.display(), "Wrote tidally-locked state");

    Ok(RunReport {
        output: options.output.clone(),
        source_shape: source.shape(),
        target_shape: target.shape(),
        variables: target.field_names().map(str::to_string).collect(),
        means,
    })
}

/// Variable roles for a run: the requested names, or every field.
pub fn select_roles(source: &State, vars: Option<&[String]>) -> VariableRoles {
    match vars {
        Some(names) => VariableRoles::from_names(names.iter().cloned()),
        None => VariableRoles::from_names(source.field_names()),
    }
}

/// Human-readable table of global means.
pub fn format_means(means: &[MeanComparison]) -> String {
    let mut out = format!("{:<16} {:>16} {:>16}\n", "variable", "earth", "tidally-locked");
    for cmp in means {
        for (k, (earth, tl)) in cmp.earth.iter().zip(&cmp.tidally_locked).enumerate() {
            let label = if cmp.earth.len() > 1 {
                format!("{}[{}]", cmp.variable, k)
            } else {
                cmp.variable.clone()
            };
            out.push_str(&format!("{:<16} {:>16.6} {:>16.6}\n", label, earth, tl));
        }
    }
    out
}
