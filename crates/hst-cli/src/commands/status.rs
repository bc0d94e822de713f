use anyhow::Result;
use clap::Args;
use hst_diff::Change;
use hst_repository::Head;

use super::open_repo;

#[derive(Args)]
pub struct StatusArgs {}

pub fn run(_args: &StatusArgs) -> Result<i32> {
    let repo = open_repo()?;
    match repo.head()? {
        Head::Branch { name, .. } => println!("On branch {name}"),
        Head::Detached(oid) => println!("HEAD detached at {}", oid.short_hex()),
    }
    if hst_merge::MergeState::load(repo.hst_dir())?.is_in_progress() {
        println!("You have unmerged paths.");
        println!("  (fix conflicts and run \"hst merge --continue\")");
    }

    let status = repo.status()?;
    print_changes("Changes to be committed:", &status.to_commit);
    print_changes("Changes not staged for commit:", &status.to_stage);
    if !status.untracked.is_empty() {
        println!("\nUntracked files:");
        for path in &status.untracked {
            println!("\t{path}");
        }
    }
    if status.is_clean() {
        println!("nothing to commit, working tree clean");
    }
    Ok(0)
}

fn print_changes(title: &str, changes: &[Change]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title}");
    for change in changes {
        println!("\t{:<10}  {}", format!("{}:", change.kind), change.path);
    }
}
