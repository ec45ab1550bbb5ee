use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use spadl_pipeline::{TableStore, compute_stored};

use super::PipelineArg;
use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ComputeArg {
    /// Directory holding the action tables written by `convert`
    #[arg(long)]
    out: PathBuf,
}

pub(crate) fn run(pipeline_arg: &PipelineArg, arg: &ComputeArg) -> anyhow::Result<ExitCode> {
    let pipeline = pipeline_arg.pipeline()?;
    let store = TableStore::create(&arg.out)
        .with_context(|| format!("Failed to open table directory: {}", arg.out.display()))?;

    tracing::info!(columns = pipeline.feature_columns().len(), "computing features and labels");
    let report = compute_stored(&pipeline, &store, pipeline_arg.jobs())
        .context("Failed to read the games index")?;
    Ok(util::finish(&report))
}
