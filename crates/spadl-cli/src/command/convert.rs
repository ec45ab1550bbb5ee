use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use spadl_pipeline::{MatchCollection, TableStore, convert_matches};

use super::PipelineArg;
use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConvertArg {
    /// Match collection file (JSON)
    events: PathBuf,
    /// Output directory of the action tables
    #[arg(long)]
    out: PathBuf,
}

pub(crate) fn run(pipeline_arg: &PipelineArg, arg: &ConvertArg) -> anyhow::Result<ExitCode> {
    let pipeline = pipeline_arg.pipeline()?;
    let matches: MatchCollection = util::read_json_file("match collection", &arg.events)?;
    let store = TableStore::create(&arg.out)
        .with_context(|| format!("Failed to create output directory: {}", arg.out.display()))?;

    tracing::info!(games = matches.games.len(), "converting");
    let report = convert_matches(&pipeline, &store, &matches.games, pipeline_arg.jobs())
        .context("Failed to write the games index")?;
    Ok(util::finish(&report))
}
