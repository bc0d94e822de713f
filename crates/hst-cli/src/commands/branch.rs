use anyhow::Result;
use clap::Args;
use hst_revwalk::is_ancestor;

use super::{open_repo, Refused};

#[derive(Args)]
pub struct BranchArgs {
    /// Delete a fully merged branch
    #[arg(short = 'd', long = "delete", value_name = "branch", conflicts_with_all = ["force_delete", "name"])]
    delete: Option<String>,

    /// Delete a branch even if it is not merged
    #[arg(short = 'D', value_name = "branch", conflicts_with = "name")]
    force_delete: Option<String>,

    /// List remote-tracking branches too
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Create a branch with this name at HEAD
    name: Option<String>,
}

pub fn run(args: &BranchArgs) -> Result<i32> {
    let repo = open_repo()?;

    if let Some(name) = &args.delete {
        let head = repo.head_oid()?;
        if let (Some(tip), Some(head)) = (repo.branches()?.into_iter().find(|(b, _)| b == name), head) {
            if !is_ancestor(repo.odb(), &tip.1, &head)? {
                return Err(Refused(format!(
                    "the branch '{name}' is not fully merged (use -D to delete it anyway)"
                ))
                .into());
            }
        }
        return delete(&repo, name);
    }
    if let Some(name) = &args.force_delete {
        return delete(&repo, name);
    }

    if let Some(name) = &args.name {
        let head = repo.head_commit()?;
        repo.create_branch(name, &head)?;
        return Ok(0);
    }

    let current = repo.current_branch()?;
    for (name, _) in repo.branches()? {
        let marker = if current.as_deref() == Some(name.as_str()) { '*' } else { ' ' };
        println!("{marker} {name}");
    }
    if args.all {
        for (name, _) in repo.remote_branches()? {
            println!("  remotes/{name}");
        }
    }
    Ok(0)
}

fn delete(repo: &hst_repository::Repository, name: &str) -> Result<i32> {
    let oid = repo.delete_branch(name)?;
    println!("Deleted branch {name} (was {}).", oid.short_hex());
    Ok(0)
}
