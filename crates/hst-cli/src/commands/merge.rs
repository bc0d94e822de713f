use anyhow::Result;
use clap::Args;
use hst_merge::{abort_merge, continue_merge, merge, MergeOptions, MergeOutcome, MergeState};

use super::open_repo;

#[derive(Args)]
pub struct MergeArgs {
    /// Conclude a merge after resolving its conflicts
    #[arg(long = "continue", conflicts_with_all = ["abort", "target"])]
    cont: bool,

    /// Abandon the merge in progress and restore the pre-merge state
    #[arg(long, conflicts_with = "target")]
    abort: bool,

    /// Refuse to merge unless the current branch can be fast-forwarded
    #[arg(long)]
    ff_only: bool,

    /// Branch or commit to merge into the current branch
    #[arg(required_unless_present_any = ["cont", "abort"])]
    target: Option<String>,
}

pub fn run(args: &MergeArgs) -> Result<i32> {
    let repo = open_repo()?;

    if args.abort {
        abort_merge(&repo)?;
        println!("Merge aborted.");
        return Ok(0);
    }
    if args.cont {
        if let MergeState::Resolved(commit) = continue_merge(&repo)? {
            println!("Merge commit {} created.", commit.short_hex());
        }
        return Ok(0);
    }

    let Some(target) = args.target.as_deref() else {
        anyhow::bail!("no commit specified to merge");
    };
    let options = MergeOptions {
        fast_forward_only: args.ff_only,
    };
    match merge(&repo, target, &options)? {
        MergeOutcome::UpToDate => println!("Already up to date."),
        MergeOutcome::FastForward { from, to } => {
            println!("Updating {}..{}", from.short_hex(), to.short_hex());
            println!("Fast-forward");
        }
        MergeOutcome::Merged { commit } => {
            println!("Merge made by the three-way strategy.");
            println!("Merge commit {} created.", commit.short_hex());
        }
        MergeOutcome::Conflicted { conflicts } => {
            for path in &conflicts {
                println!("CONFLICT (content): Merge conflict in {path}");
            }
            println!("Automatic merge failed; fix conflicts and then run \"hst merge --continue\".");
            return Ok(1);
        }
    }
    Ok(0)
}
