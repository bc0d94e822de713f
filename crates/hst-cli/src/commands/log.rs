use anyhow::Result;
use bstr::ByteSlice;
use clap::Args;
use hst_revwalk::{history, history_multi};

use super::open_repo;

#[derive(Args)]
pub struct LogArgs {
    /// One line per commit: abbreviated id and summary
    #[arg(long)]
    oneline: bool,

    /// Show at most <n> commits
    #[arg(short = 'n', long = "max-count", value_name = "n")]
    max_count: Option<usize>,

    /// Commits to start from (default: HEAD)
    revisions: Vec<String>,
}

pub fn run(args: &LogArgs) -> Result<i32> {
    let repo = open_repo()?;
    let commits = match args.revisions.as_slice() {
        [] => match repo.head_oid()? {
            Some(head) => history(repo.odb(), &head, args.max_count)?,
            None => {
                let branch = repo.current_branch()?.unwrap_or_default();
                anyhow::bail!("your current branch '{branch}' does not have any commits yet");
            }
        },
        [one] => history(repo.odb(), &repo.resolve(one)?, args.max_count)?,
        many => {
            let starts = many
                .iter()
                .map(|rev| repo.resolve(rev))
                .collect::<Result<Vec<_>, _>>()?;
            history_multi(repo.odb(), &starts, args.max_count)?
        }
    };

    for (i, (oid, commit)) in commits.iter().enumerate() {
        if args.oneline {
            println!("{} {}", oid.short_hex(), commit.summary());
            continue;
        }
        if i > 0 {
            println!();
        }
        println!("commit {oid}");
        if commit.is_merge() {
            let parents: Vec<String> = commit.parents.iter().map(|p| p.short_hex()).collect();
            println!("Merge: {}", parents.join(" "));
        }
        println!("Author: {}", commit.author.identity);
        println!("Date:   {}", commit.author.date.to_display());
        println!();
        for line in commit.message.trim_end().lines() {
            println!("    {}", line.as_bstr());
        }
    }
    Ok(0)
}
