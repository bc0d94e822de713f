use anyhow::Result;
use clap::Args;
use hst_transfer::push;

use super::{open_repo, Refused};

#[derive(Args)]
pub struct PushArgs {
    /// Remote to push to
    #[arg(default_value = "origin")]
    remote: String,

    /// Branch to push, or <src>:<dst> (default: the current branch)
    target: Option<String>,

    /// Update the remote branch even if it is not an ancestor
    #[arg(short = 'f', long)]
    force: bool,
}

pub fn run(args: &PushArgs) -> Result<i32> {
    let repo = open_repo()?;
    let (source, dest) = match args.target.as_deref() {
        Some(spec) => match spec.split_once(':') {
            Some((src, dst)) if !src.is_empty() && !dst.is_empty() => (src.to_string(), dst.to_string()),
            Some(_) => anyhow::bail!("invalid refspec '{spec}'"),
            None => (spec.to_string(), spec.to_string()),
        },
        None => {
            let branch = repo
                .current_branch()?
                .ok_or_else(|| Refused("you are not currently on a branch".into()))?;
            (branch.clone(), branch)
        }
    };

    let outcome = push(&repo, &args.remote, &source, &dest, args.force)?;
    if outcome.is_up_to_date() {
        println!("Everything up-to-date");
        return Ok(0);
    }
    let url = repo.remote_url(&args.remote).unwrap_or(args.remote.as_str());
    println!("To {url}");
    let range = match outcome.old {
        Some(old) if args.force => format!("+ {}...{}", old.short_hex(), outcome.new.short_hex()),
        Some(old) => format!("{}..{}", old.short_hex(), outcome.new.short_hex()),
        None => "* [new branch]".to_string(),
    };
    println!("   {range}  {source} -> {dest}");
    Ok(0)
}
