use std::io::{self, Write};

use anyhow::{bail, Result};
use bstr::ByteSlice;
use clap::Args;
use hst_diff::unified::{render_patch, Side};
use hst_diff::{diff_maps, flatten_commit, PathMap};
use hst_odb::ObjectStoreExt;
use hst_repository::Repository;

use super::open_repo;

#[derive(Args)]
pub struct DiffArgs {
    /// Compare the index with HEAD
    #[arg(long = "staged", visible_alias = "cached")]
    staged: bool,

    /// Zero, one or two commits to compare
    #[arg(num_args = 0..=2)]
    commits: Vec<String>,
}

/// Where a snapshot's content comes from.
enum Source {
    Store,
    WorkTree,
}

pub fn run(args: &DiffArgs) -> Result<i32> {
    let repo = open_repo()?;
    if args.staged && !args.commits.is_empty() {
        bail!("--staged cannot be combined with commits");
    }

    let (old, new, new_source) = match args.commits.as_slice() {
        [] if args.staged => (repo.head_tree()?, repo.index()?.into_map(), Source::Store),
        [] => {
            let index = repo.index()?.into_map();
            let live = tracked_live(&repo, &index)?;
            (index, live, Source::WorkTree)
        }
        [commit] => {
            let old = flatten_commit(repo.odb(), &repo.resolve(commit)?)?;
            let mut tracked = repo.index()?.into_map();
            tracked.extend(old.iter().map(|(p, o)| (p.clone(), *o)));
            let live = tracked_live(&repo, &tracked)?;
            (old, live, Source::WorkTree)
        }
        [a, b, ..] => (
            flatten_commit(repo.odb(), &repo.resolve(a)?)?,
            flatten_commit(repo.odb(), &repo.resolve(b)?)?,
            Source::Store,
        ),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for change in diff_maps(&old, &new) {
        let path = change.path.as_bstr();
        let old_data = match old.get(&change.path) {
            Some(oid) => Some((*oid, repo.odb().read_blob(oid)?.data)),
            None => None,
        };
        let new_data = match (new.get(&change.path), &new_source) {
            (Some(oid), Source::Store) => Some((*oid, repo.odb().read_blob(oid)?.data)),
            (Some(oid), Source::WorkTree) => repo.read_worktree_file(path)?.map(|data| (*oid, data)),
            (None, _) => None,
        };
        let patch = render_patch(
            path,
            old_data.as_ref().map(|(oid, data)| Side::new(*oid, data)),
            new_data.as_ref().map(|(oid, data)| Side::new(*oid, data)),
        );
        out.write_all(patch.as_bytes())?;
    }
    Ok(0)
}

/// Live files restricted to `tracked` paths.
fn tracked_live(repo: &Repository, tracked: &PathMap) -> Result<PathMap> {
    let mut live = repo.scan_worktree()?;
    live.retain(|path, _| tracked.contains_key(path));
    Ok(live)
}
