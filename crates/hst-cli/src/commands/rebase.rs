use anyhow::Result;
use clap::Args;
use hst_merge::{rebase, RebaseOutcome};

use super::open_repo;

#[derive(Args)]
pub struct RebaseArgs {
    /// Commit to replay the branch onto
    upstream: String,

    /// Branch to rebase (default: the current branch)
    branch: Option<String>,
}

pub fn run(args: &RebaseArgs) -> Result<i32> {
    let repo = open_repo()?;
    match rebase(&repo, &args.upstream, args.branch.as_deref())? {
        RebaseOutcome::UpToDate => println!("Current branch is up to date."),
        RebaseOutcome::FastForward { to } => {
            println!("Fast-forwarded to {}.", to.short_hex());
        }
        RebaseOutcome::Rebased { tip, replayed } => {
            println!(
                "Successfully rebased {replayed} commit(s) onto {}; now at {}.",
                args.upstream,
                tip.short_hex()
            );
        }
    }
    Ok(0)
}
