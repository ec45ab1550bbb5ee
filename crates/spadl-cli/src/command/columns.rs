use std::{
    io::{self, Write as _},
    process::ExitCode,
};

use anyhow::Context as _;
use spadl_vaep::{FeatureFunction as _, all_feature_functions};

use super::PipelineArg;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ColumnsArg {
    /// List the available feature functions instead
    #[arg(long)]
    available: bool,
    /// Print a JSON array
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(pipeline_arg: &PipelineArg, arg: &ColumnsArg) -> anyhow::Result<ExitCode> {
    let lines: Vec<String> = if arg.available {
        all_feature_functions()
            .iter()
            .map(|function| format!("{}\t{}", function.id(), function.name()))
            .collect()
    } else {
        pipeline_arg.pipeline()?.feature_columns()
    };

    let mut stdout = io::stdout().lock();
    if arg.json {
        serde_json::to_writer_pretty(&mut stdout, &lines).context("Failed to write JSON to stdout")?;
        writeln!(stdout).context("Failed to write to stdout")?;
    } else {
        for line in &lines {
            writeln!(stdout, "{line}").context("Failed to write to stdout")?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
