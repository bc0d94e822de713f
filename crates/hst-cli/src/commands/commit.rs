use anyhow::{bail, Result};
use clap::Args;
use hst_odb::ObjectStoreExt;

use super::open_repo;

#[derive(Args)]
pub struct CommitArgs {
    /// Use the given message as the commit message
    #[arg(short = 'm', long = "message")]
    message: Option<String>,

    /// Replace the tip of the current branch with a new commit
    #[arg(long)]
    amend: bool,
}

pub fn run(args: &CommitArgs) -> Result<i32> {
    let repo = open_repo()?;

    let message = match &args.message {
        Some(m) if m.trim().is_empty() => bail!("aborting commit due to empty commit message"),
        Some(m) if m.ends_with('\n') => Some(m.clone()),
        Some(m) => Some(format!("{m}\n")),
        None if args.amend => None,
        None => bail!("no commit message given (use -m <msg>)"),
    };

    let oid = if args.amend {
        repo.amend(message.as_deref())?
    } else {
        repo.commit(message.as_deref().unwrap_or_default())?
    };

    let commit = repo.odb().read_commit(&oid)?;
    let branch = repo
        .current_branch()?
        .unwrap_or_else(|| "detached HEAD".to_string());
    let root = if commit.is_root() { " (root-commit)" } else { "" };
    println!("[{branch}{root} {}] {}", oid.short_hex(), commit.summary());
    Ok(0)
}
