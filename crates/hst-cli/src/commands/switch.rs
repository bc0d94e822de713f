use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct SwitchArgs {
    /// Create the branch at HEAD before switching to it
    #[arg(short = 'c', long = "create")]
    create: bool,

    /// Branch to switch to
    branch: String,
}

pub fn run(args: &SwitchArgs) -> Result<i32> {
    let repo = open_repo()?;
    if repo.current_branch()?.as_deref() == Some(args.branch.as_str()) && !args.create {
        println!("Already on '{}'", args.branch);
        return Ok(0);
    }
    repo.switch(&args.branch, args.create)?;
    if args.create {
        println!("Switched to a new branch '{}'", args.branch);
    } else {
        println!("Switched to branch '{}'", args.branch);
    }
    Ok(0)
}
