use anyhow::Result;
use clap::Args;
use hst_revwalk::{is_ancestor, merge_base};

use super::open_repo;

#[derive(Args)]
pub struct MergeBaseArgs {
    /// Exit 0 if the first commit is an ancestor of the second, 1 otherwise
    #[arg(long)]
    is_ancestor: bool,

    first: String,
    second: String,
}

pub fn run(args: &MergeBaseArgs) -> Result<i32> {
    let repo = open_repo()?;
    let a = repo.resolve(&args.first)?;
    let b = repo.resolve(&args.second)?;

    if args.is_ancestor {
        return Ok(if is_ancestor(repo.odb(), &a, &b)? { 0 } else { 1 });
    }
    match merge_base(repo.odb(), &a, &b)? {
        Some(base) => {
            println!("{base}");
            Ok(0)
        }
        None => Ok(1),
    }
}
