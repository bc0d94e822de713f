use anyhow::Result;
use clap::{Args, Subcommand};

use super::open_repo;

#[derive(Args)]
pub struct RemoteArgs {
    /// Show remote URLs after the names
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    action: Option<RemoteAction>,
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Add a remote named <name> for the repository at <url>
    Add { name: String, url: String },
    /// Remove the remote named <name> and its remote-tracking branches
    #[command(visible_alias = "rm")]
    Remove { name: String },
}

pub fn run(args: &RemoteArgs) -> Result<i32> {
    let mut repo = open_repo()?;
    match &args.action {
        Some(RemoteAction::Add { name, url }) => repo.add_remote(name, url)?,
        Some(RemoteAction::Remove { name }) => repo.remove_remote(name)?,
        None => {
            for (name, url) in repo.config().remotes() {
                if args.verbose {
                    println!("{name}\t{url} (fetch)");
                    println!("{name}\t{url} (push)");
                } else {
                    println!("{name}");
                }
            }
        }
    }
    Ok(0)
}
