use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{open_repo, pathspec};

#[derive(Args)]
pub struct RestoreArgs {
    /// Restore the index from HEAD instead of the working tree from the index
    #[arg(long = "staged", short = 'S')]
    staged: bool,

    /// Paths to restore
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

pub fn run(args: &RestoreArgs) -> Result<i32> {
    let repo = open_repo()?;
    let spec = pathspec(&repo, &args.paths)?;
    let restored = if args.staged {
        repo.restore_staged(&spec)?
    } else {
        repo.restore_worktree(&spec)?
    };
    tracing::debug!(restored, staged = args.staged, "restore finished");
    Ok(0)
}
