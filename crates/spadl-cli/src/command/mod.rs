use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use spadl_pipeline::{Pipeline, PipelineConfig};

use self::{columns::ColumnsArg, compute::ComputeArg, convert::ConvertArg, run::RunArg};

mod columns;
mod compute;
mod convert;
mod run;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(flatten)]
    pipeline: PipelineArg,
    #[command(subcommand)]
    mode: Mode,
}

/// Settings shared by every subcommand, overriding the configuration file.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PipelineArg {
    /// Pipeline configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Number of actions in each gamestate
    #[arg(long, global = true)]
    nb_prev_actions: Option<NonZeroUsize>,
    /// Number of actions the scores/concedes labels look ahead
    #[arg(long, global = true)]
    label_window: Option<NonZeroUsize>,
    /// Time horizon of the scores/concedes labels, in seconds
    #[arg(long, global = true)]
    label_seconds: Option<f64>,
    /// Worker threads for per-game processing [default: all cores]
    #[arg(long, global = true)]
    jobs: Option<NonZeroUsize>,
}

impl PipelineArg {
    pub(crate) fn jobs(&self) -> Option<NonZeroUsize> {
        self.jobs
    }

    pub(crate) fn load_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(nb_prev_actions) = self.nb_prev_actions {
            config.nb_prev_actions = nb_prev_actions;
        }
        if let Some(nr_actions) = self.label_window {
            config.labels.nr_actions = nr_actions;
        }
        if let Some(seconds) = self.label_seconds {
            anyhow::ensure!(
                seconds.is_finite() && seconds >= 0.0,
                "--label-seconds must be a non-negative number, got {seconds}"
            );
            config.labels.max_seconds = Some(seconds);
        }
        Ok(config)
    }

    pub(crate) fn pipeline(&self) -> anyhow::Result<Pipeline> {
        let config = self.load_config()?;
        Pipeline::new(&config).context("Failed to set up the pipeline")
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Convert raw events into SPADL action tables
    Convert(#[clap(flatten)] ConvertArg),
    /// Compute features and labels from stored action tables
    Compute(#[clap(flatten)] ComputeArg),
    /// Convert raw events and compute features and labels in one pass
    Run(#[clap(flatten)] RunArg),
    /// Print the feature columns of the configured feature set
    Columns(#[clap(flatten)] ColumnsArg),
}

pub fn run() -> anyhow::Result<ExitCode> {
    let args = CommandArgs::parse();
    crate::util::init_tracing(&args.log_level);
    match &args.mode {
        Mode::Convert(arg) => convert::run(&args.pipeline, arg),
        Mode::Compute(arg) => compute::run(&args.pipeline, arg),
        Mode::Run(arg) => run::run(&args.pipeline, arg),
        Mode::Columns(arg) => columns::run(&args.pipeline, arg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandArgs {
        CommandArgs::try_parse_from(std::iter::once("spadl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&["columns", "--nb-prev-actions", "2", "--label-window", "5", "--label-seconds", "12.5"]);
        let config = args.pipeline.load_config().unwrap();
        assert_eq!(config.nb_prev_actions.get(), 2);
        assert_eq!(config.labels.nr_actions.get(), 5);
        assert_eq!(config.labels.max_seconds, Some(12.5));
        assert_eq!(config.features, PipelineConfig::default().features);
    }

    #[test]
    fn test_invalid_flags() {
        let zero = std::iter::once("spadl").chain(["columns", "--nb-prev-actions", "0"]);
        assert!(CommandArgs::try_parse_from(zero).is_err());

        let args = parse(&["columns", "--label-seconds=-1"]);
        assert!(args.pipeline.load_config().is_err());
    }

    #[test]
    fn test_subcommands() {
        let args = parse(&["run", "events.json", "--out", "tables", "--jobs", "4"]);
        assert!(matches!(args.mode, Mode::Run(_)));
        assert_eq!(args.pipeline.jobs().map(NonZeroUsize::get), Some(4));
        assert!(matches!(parse(&["compute", "--out", "tables"]).mode, Mode::Compute(_)));
        assert!(CommandArgs::try_parse_from(["spadl", "convert"]).is_err());
    }
}
