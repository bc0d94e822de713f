use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{open_repo, pathspec};

#[derive(Args)]
pub struct AddArgs {
    /// Files to add; directories are added recursively
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

pub fn run(args: &AddArgs) -> Result<i32> {
    let repo = open_repo()?;
    let spec = pathspec(&repo, &args.paths)?;
    let staged = repo.add(&spec)?;
    tracing::debug!(staged, "add finished");
    Ok(0)
}
