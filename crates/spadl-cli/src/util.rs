use std::{fs::File, io, path::Path, process::ExitCode};

use anyhow::Context as _;
use spadl_pipeline::BatchReport;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reports failed games and maps the batch outcome to the exit status.
pub fn finish(report: &BatchReport) -> ExitCode {
    for failure in &report.failed {
        tracing::error!("{failure}");
    }
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        tracing::error!(
            "{} of {} games failed",
            report.failed.len(),
            report.failed.len() + report.completed.len()
        );
        ExitCode::FAILURE
    }
}
