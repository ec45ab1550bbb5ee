use std::process::ExitCode;

mod command;
mod util;

fn main() -> anyhow::Result<ExitCode> {
    command::run()
}
