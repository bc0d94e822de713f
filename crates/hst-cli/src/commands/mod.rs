pub mod add;
pub mod branch;
pub mod cat_file;
pub mod clone;
pub mod commit;
pub mod diff;
pub mod fetch;
pub mod init;
pub mod log;
pub mod merge;
pub mod merge_base;
pub mod pull;
pub mod push;
pub mod rebase;
pub mod remote;
pub mod restore;
pub mod rev_parse;
pub mod status;
pub mod switch;

use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use bstr::BString;
use clap::Subcommand;
use hst_index::Pathspec;
use hst_merge::MergeError;
use hst_repository::{RepoError, Repository};
use hst_transfer::TransferError;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository
    Init(init::InitArgs),
    /// Add file contents to the index
    Add(add::AddArgs),
    /// Record changes to the repository
    Commit(commit::CommitArgs),
    /// Show the working tree status
    Status(status::StatusArgs),
    /// Show commit logs
    Log(log::LogArgs),
    /// List, create, or delete branches
    Branch(branch::BranchArgs),
    /// Switch branches
    Switch(switch::SwitchArgs),
    /// Restore working tree files or unstage them
    Restore(restore::RestoreArgs),
    /// Show changes between commits, the index and the working tree
    Diff(diff::DiffArgs),
    /// Join two development histories together
    Merge(merge::MergeArgs),
    /// Reapply commits on top of another base
    Rebase(rebase::RebaseArgs),
    /// Manage the set of tracked repositories
    Remote(remote::RemoteArgs),
    /// Download objects and refs from another repository
    Fetch(fetch::FetchArgs),
    /// Fetch from another repository and fast-forward the current branch
    Pull(pull::PullArgs),
    /// Update remote refs along with their objects
    Push(push::PushArgs),
    /// Clone a repository into a new directory
    Clone(clone::CloneArgs),
    /// Show the content or type of a repository object
    CatFile(cat_file::CatFileArgs),
    /// Resolve revision names to object ids
    RevParse(rev_parse::RevParseArgs),
    /// Find a common ancestor of two commits
    MergeBase(merge_base::MergeBaseArgs),
}

pub fn open_repo() -> Result<Repository> {
    Ok(Repository::discover(".")?)
}

pub fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Add(args) => add::run(args),
        Commands::Commit(args) => commit::run(args),
        Commands::Status(args) => status::run(args),
        Commands::Log(args) => log::run(args),
        Commands::Branch(args) => branch::run(args),
        Commands::Switch(args) => switch::run(args),
        Commands::Restore(args) => restore::run(args),
        Commands::Diff(args) => diff::run(args),
        Commands::Merge(args) => merge::run(args),
        Commands::Rebase(args) => rebase::run(args),
        Commands::Remote(args) => remote::run(args),
        Commands::Fetch(args) => fetch::run(args),
        Commands::Pull(args) => pull::run(args),
        Commands::Push(args) => push::run(args),
        Commands::Clone(args) => clone::run(args),
        Commands::CatFile(args) => cat_file::run(args),
        Commands::RevParse(args) => rev_parse::run(args),
        Commands::MergeBase(args) => merge_base::run(args),
    }
}

/// An operation declined to protect repository state.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Refused(pub String);

/// Whether `err` is a refusal (exit status 1) rather than a hard failure.
pub fn is_refusal(err: &anyhow::Error) -> bool {
    if err.downcast_ref::<Refused>().is_some() {
        return true;
    }
    let repo_refusal = |e: &RepoError| {
        matches!(
            e,
            RepoError::LocalChanges(_)
                | RepoError::MergeInProgress(_)
                | RepoError::NothingToCommit
                | RepoError::CannotDeleteCurrentBranch(_)
        )
    };
    if let Some(e) = err.downcast_ref::<RepoError>() {
        return repo_refusal(e);
    }
    if let Some(e) = err.downcast_ref::<MergeError>() {
        return match e {
            MergeError::Repo(inner) => repo_refusal(inner),
            MergeError::MergeInProgress
            | MergeError::UnresolvedConflicts(_)
            | MergeError::Diverged { .. }
            | MergeError::NoMergeBase => true,
            _ => false,
        };
    }
    if let Some(e) = err.downcast_ref::<TransferError>() {
        return match e {
            TransferError::Repo(inner) => repo_refusal(inner),
            TransferError::Merge(MergeError::MergeInProgress) => true,
            TransferError::NotFastForward(_) | TransferError::Diverged { .. } => true,
            _ => false,
        };
    }
    false
}

/// Turn command-line paths (relative to the current directory) into a
/// pathspec relative to the work tree root.
pub fn pathspec(repo: &Repository, paths: &[PathBuf]) -> Result<Pathspec> {
    let cwd = std::env::current_dir()?.canonicalize()?;
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        out.push(repo_relative(repo.work_tree(), &cwd, path)?);
    }
    Ok(Pathspec::new(out))
}

fn repo_relative(root: &Path, cwd: &Path, path: &Path) -> Result<BString> {
    let joined = cwd.join(path);
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(part) => parts.push(part),
            Component::RootDir | Component::Prefix(_) => parts.clear(),
        }
    }
    let normalized: PathBuf = std::iter::once(Component::RootDir.as_os_str())
        .chain(parts)
        .collect();
    let rel = normalized
        .strip_prefix(root)
        .map_err(|_| anyhow::anyhow!("'{}' is outside repository at '{}'", path.display(), root.display()))?;

    let mut out = BString::default();
    for (i, part) in rel.components().enumerate() {
        let part = part
            .as_os_str()
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("path is not valid UTF-8: {}", path.display()))?;
        if i > 0 {
            out.push(b'/');
        }
        out.extend_from_slice(part.as_bytes());
    }
    if out.is_empty() {
        out.push(b'.');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_made_relative_to_the_root() {
        let root = Path::new("/work/repo");
        let rel = |cwd: &str, p: &str| repo_relative(root, Path::new(cwd), Path::new(p)).unwrap();
        assert_eq!(rel("/work/repo", "a.txt"), "a.txt");
        assert_eq!(rel("/work/repo/src", "main.rs"), "src/main.rs");
        assert_eq!(rel("/work/repo/src", "../README"), "README");
        assert_eq!(rel("/work/repo/src", "."), "src");
        assert_eq!(rel("/work/repo", "."), ".");
        assert_eq!(rel("/elsewhere", "/work/repo/x/./y"), "x/y");
        assert!(repo_relative(root, Path::new("/work/repo"), Path::new("../other")).is_err());
    }
}
