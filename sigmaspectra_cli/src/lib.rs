#![allow(clippy::missing_errors_doc)]
#![allow(missing_docs)]

mod helpers;
mod read;
mod search;

use anyhow::Result;
use clap::Parser;
use enum_dispatch::enum_dispatch;
use std::process::ExitCode;

#[derive(Parser)]
pub struct GlobalConfiguration {
    /// Suppress the progress and log output on stderr.
    #[arg(global = true, long)]
    pub quiet: bool,
}

#[enum_dispatch]
pub trait Subcommand {
    fn run(&self, cfg: &GlobalConfiguration) -> Result<ExitCode>;
}

#[enum_dispatch(Subcommand)]
#[derive(Parser)]
pub enum SubcommandEnum {
    Read(read::Opts),
    Search(search::Opts),
}

/// Selects and scales suites of recorded ground motions to match a target
/// response spectrum and its dispersion.
#[derive(Parser)]
#[command(arg_required_else_help = true, disable_help_subcommand = true, version)]
pub struct Opts {
    #[command(flatten)]
    pub configuration: GlobalConfiguration,
    #[command(subcommand)]
    pub subcommand: SubcommandEnum,
}
