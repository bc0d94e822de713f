//! Repository discovery, initialization, and central access for all hst subsystems.
//!
//! A repository is a work tree root holding a `.hst/` directory with the
//! object store, refs, the staging index and the config file. [`Repository`]
//! ties those together and implements the porcelain-level operations that the
//! command line drives: staging, committing, status, restore, branches and
//! switching.

mod branch;
mod commit;
mod discover;
mod error;
mod init;
mod remote;
mod stage;
mod worktree;

pub use error::RepoError;

use std::path::{Path, PathBuf};

use hst_config::ConfigFile;
use hst_diff::{flatten_commit, PathMap};
use hst_hash::ObjectId;
use hst_index::Index;
use hst_loose::LooseObjectStore;
use hst_ref::{FilesRefStore, RefName, RefStore, Reference};
use hst_utils::date::{GitDate, Signature};

/// Name of the metadata directory inside the work tree.
pub const HST_DIR: &str = ".hst";

/// Present in the `.hst` directory while a conflicted merge awaits
/// `--continue` or `--abort`.
pub const MERGE_HEAD: &str = "MERGE_HEAD";

/// Branch HEAD names in a fresh repository.
pub const DEFAULT_BRANCH: &str = "main";

/// Where HEAD points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// On a branch, which has no commit yet when `oid` is `None`.
    Branch { name: String, oid: Option<ObjectId> },
    /// Directly at a commit.
    Detached(ObjectId),
}

impl Head {
    pub fn oid(&self) -> Option<ObjectId> {
        match self {
            Head::Branch { oid, .. } => *oid,
            Head::Detached(oid) => Some(*oid),
        }
    }

    pub fn branch(&self) -> Option<&str> {
        match self {
            Head::Branch { name, .. } => Some(name),
            Head::Detached(_) => None,
        }
    }
}

/// The central repository struct tying all subsystems together.
pub struct Repository {
    /// Root of the working tree.
    work_tree: PathBuf,
    /// Path to the `.hst` directory.
    hst_dir: PathBuf,
    odb: LooseObjectStore,
    refs: FilesRefStore,
    config: ConfigFile,
    index_path: PathBuf,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("work_tree", &self.work_tree)
            .field("hst_dir", &self.hst_dir)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open the repository whose work tree root is `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        if !discover::is_work_tree(path) {
            return Err(RepoError::NotFound(path.to_path_buf()));
        }
        let work_tree = std::fs::canonicalize(path)?;
        Self::from_work_tree(work_tree)
    }

    /// Find the repository containing `start`, walking up through parents.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_tree = discover::discover_work_tree(start.as_ref())?;
        Self::from_work_tree(work_tree)
    }

    /// Initialize a new repository at `path`. Fails if one already exists.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let work_tree = init::init_repository(path.as_ref())?;
        Self::from_work_tree(std::fs::canonicalize(work_tree)?)
    }

    fn from_work_tree(work_tree: PathBuf) -> Result<Self, RepoError> {
        let hst_dir = work_tree.join(HST_DIR);
        let odb = LooseObjectStore::open(hst_dir.join("objects"));
        let refs = FilesRefStore::new(&hst_dir);
        let config = ConfigFile::load(&hst_dir.join("config"))?;
        let index_path = hst_dir.join("index");
        tracing::debug!(path = %work_tree.display(), "opened repository");

        Ok(Repository {
            work_tree,
            hst_dir,
            odb,
            refs,
            config,
            index_path,
        })
    }

    // --- Path accessors ---

    /// Root of the working tree.
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Path to the `.hst` directory.
    pub fn hst_dir(&self) -> &Path {
        &self.hst_dir
    }

    /// Whether a conflicted merge is waiting to be continued or aborted.
    pub fn merge_in_progress(&self) -> bool {
        self.hst_dir.join(MERGE_HEAD).is_file()
    }

    fn refuse_during_merge(&self, operation: &'static str) -> Result<(), RepoError> {
        if self.merge_in_progress() {
            return Err(RepoError::MergeInProgress(operation));
        }
        Ok(())
    }

    // --- Subsystem accessors ---

    pub fn odb(&self) -> &LooseObjectStore {
        &self.odb
    }

    pub fn refs(&self) -> &FilesRefStore {
        &self.refs
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Write the in-memory config back to `.hst/config`.
    pub fn save_config(&self) -> Result<(), RepoError> {
        self.config.save(&self.hst_dir.join("config"))?;
        Ok(())
    }

    /// Read the staging index from disk.
    pub fn index(&self) -> Result<Index, RepoError> {
        Ok(Index::load(&self.index_path)?)
    }

    pub fn write_index(&self, index: &Index) -> Result<(), RepoError> {
        index.write(&self.index_path)?;
        Ok(())
    }

    // --- HEAD ---

    pub fn head(&self) -> Result<Head, RepoError> {
        match self.refs.resolve(&RefName::head())? {
            Some(Reference::Symbolic { target, .. }) => {
                let name = target
                    .as_str()
                    .strip_prefix("refs/heads/")
                    .ok_or_else(|| RepoError::InvalidHead(format!("points outside refs/heads: {target}")))?
                    .to_string();
                let oid = self.refs.resolve_to_oid(&target)?;
                Ok(Head::Branch { name, oid })
            }
            Some(Reference::Direct { target, .. }) => Ok(Head::Detached(target)),
            None => Err(RepoError::InvalidHead("missing".into())),
        }
    }

    /// The commit HEAD points at, `None` on an unborn branch.
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.head()?.oid())
    }

    /// Like [`Repository::head_oid`], but an unborn branch is an error.
    pub fn head_commit(&self) -> Result<ObjectId, RepoError> {
        self.head_oid()?.ok_or(RepoError::UnbornHead)
    }

    /// The checked-out branch name, `None` when detached.
    pub fn current_branch(&self) -> Result<Option<String>, RepoError> {
        Ok(self.head()?.branch().map(str::to_string))
    }

    pub fn is_unborn(&self) -> Result<bool, RepoError> {
        Ok(self.head_oid()?.is_none())
    }

    /// Move the checked-out branch to `oid`, or HEAD itself when detached.
    pub fn update_head(&self, oid: &ObjectId) -> Result<(), RepoError> {
        match self.head()? {
            Head::Branch { name, .. } => {
                self.refs.write_ref(&RefName::branch(&name)?, oid)?;
                tracing::debug!(branch = %name, %oid, "moved branch");
            }
            Head::Detached(_) => {
                self.refs.write_ref(&RefName::head(), oid)?;
                tracing::debug!(%oid, "moved detached HEAD");
            }
        }
        Ok(())
    }

    /// Point HEAD at `refs/heads/<name>`.
    pub fn set_head_branch(&self, name: &str) -> Result<(), RepoError> {
        self.refs
            .write_symbolic_ref(&RefName::head(), &RefName::branch(name)?)?;
        Ok(())
    }

    /// Point HEAD directly at `oid`.
    pub fn detach_head(&self, oid: &ObjectId) -> Result<(), RepoError> {
        self.refs.write_ref(&RefName::head(), oid)?;
        Ok(())
    }

    /// Flat snapshot of HEAD's tree; empty on an unborn branch.
    pub fn head_tree(&self) -> Result<PathMap, RepoError> {
        match self.head_oid()? {
            Some(oid) => Ok(flatten_commit(&self.odb, &oid)?),
            None => Ok(PathMap::new()),
        }
    }

    // --- Names and identity ---

    /// Resolve a user-supplied name to a commit id.
    pub fn resolve(&self, rev: &str) -> Result<ObjectId, RepoError> {
        Ok(hst_revwalk::resolve_commit(&self.odb, &self.refs, rev)?)
    }

    /// Author/committer signature for a commit made now.
    pub fn signature(&self) -> Signature {
        Signature::new(hst_config::identity(&self.config), GitDate::now())
    }
}
