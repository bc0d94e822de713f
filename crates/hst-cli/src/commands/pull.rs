use anyhow::Result;
use clap::Args;
use hst_transfer::{pull, PullOutcome};

use super::open_repo;

#[derive(Args)]
pub struct PullArgs {
    /// Remote to pull from
    #[arg(default_value = "origin")]
    remote: String,

    /// Remote branch to pull (default: the current branch's name)
    branch: Option<String>,
}

pub fn run(args: &PullArgs) -> Result<i32> {
    let repo = open_repo()?;
    match pull(&repo, &args.remote, args.branch.as_deref())? {
        PullOutcome::UpToDate => println!("Already up to date."),
        PullOutcome::FastForward { from: Some(from), to } => {
            println!("Updating {}..{}", from.short_hex(), to.short_hex());
            println!("Fast-forward");
        }
        PullOutcome::FastForward { from: None, to } => {
            println!("Fast-forward to {}", to.short_hex());
        }
    }
    Ok(0)
}
