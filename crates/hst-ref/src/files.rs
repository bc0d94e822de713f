use std::fs;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use hst_hash::ObjectId;
use hst_utils::lockfile::write_atomic;

use crate::error::RefError;
use crate::name::RefName;
use crate::store::RefStore;
use crate::Reference;

/// Refs stored as files under a repository directory.
///
/// `refs/heads/main` lives at `<dir>/refs/heads/main`; `HEAD` at `<dir>/HEAD`.
/// A file holds either `<40-hex>\n` or `ref: <target>\n`. Writes go through a
/// lock file and rename.
#[derive(Debug, Clone)]
pub struct FilesRefStore {
    dir: PathBuf,
}

impl FilesRefStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, name: &RefName) -> PathBuf {
        self.dir.join(name.as_str())
    }

    /// A file standing where a directory is needed, or the reverse.
    fn check_dir_file_conflict(&self, name: &RefName) -> Result<(), RefError> {
        let target = self.path_of(name);
        let mut current = self.dir.clone();
        for component in name.as_str().split('/') {
            current.push(component);
            if current == target {
                break;
            }
            if current.is_file() {
                return Err(RefError::DirectoryConflict {
                    name: name.to_string(),
                    conflict: current
                        .strip_prefix(&self.dir)
                        .unwrap_or(&current)
                        .display()
                        .to_string(),
                });
            }
        }
        if target.is_dir() {
            return Err(RefError::DirectoryConflict {
                name: name.to_string(),
                conflict: format!("{name} (is a directory)"),
            });
        }
        Ok(())
    }

    fn write_contents(&self, name: &RefName, contents: &str) -> Result<(), RefError> {
        self.check_dir_file_conflict(name)?;
        write_atomic(self.path_of(name), contents.as_bytes())?;
        Ok(())
    }

    fn collect(&self, dir: &Path, out: &mut Vec<Reference>) -> Result<(), RefError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(RefError::IoPath {
                    path: dir.to_path_buf(),
                    source: e,
                })
            }
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.collect(&path, out)?;
                continue;
            }
            let Ok(rel) = path.strip_prefix(&self.dir) else {
                continue;
            };
            let rel = rel.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/");
            // Lock files and other debris are not refs.
            let Ok(name) = RefName::new(rel) else {
                continue;
            };
            if let Some(reference) = self.resolve(&name)? {
                out.push(reference);
            }
        }
        Ok(())
    }
}

impl RefStore for FilesRefStore {
    fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        let path = self.path_of(name);
        let contents = match fs::read(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) if path.is_dir() => {
                tracing::debug!(ref_name = %name, error = %e, "ref path is a directory");
                return Ok(None);
            }
            Err(e) => return Err(RefError::IoPath { path, source: e }),
        };
        parse_ref_file(name, contents.trim()).map(Some)
    }

    fn iter(&self, prefix: Option<&str>) -> Result<Vec<Reference>, RefError> {
        let mut refs = Vec::new();
        self.collect(&self.dir.join("refs"), &mut refs)?;
        if let Some(prefix) = prefix {
            refs.retain(|r| r.name().as_str().starts_with(prefix));
        }
        refs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(refs)
    }

    fn write_ref(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        self.write_contents(name, &format!("{}\n", oid.to_hex()))?;
        tracing::debug!(ref_name = %name, %oid, "updated ref");
        Ok(())
    }

    fn write_symbolic_ref(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        self.write_contents(name, &format!("ref: {target}\n"))?;
        tracing::debug!(ref_name = %name, %target, "updated symbolic ref");
        Ok(())
    }

    fn delete_ref(&self, name: &RefName) -> Result<bool, RefError> {
        let path = self.path_of(name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(RefError::IoPath { path, source: e }),
        }

        // Prune directories emptied by the removal, keeping refs/heads and refs/remotes.
        let refs_dir = self.dir.join("refs");
        let mut dir = path.parent().map(Path::to_path_buf);
        while let Some(d) = dir {
            if !d.starts_with(&refs_dir) || d.parent() == Some(refs_dir.as_path()) {
                break;
            }
            if fs::remove_dir(&d).is_err() {
                break;
            }
            dir = d.parent().map(Path::to_path_buf);
        }
        tracing::debug!(ref_name = %name, "deleted ref");
        Ok(true)
    }
}

fn parse_ref_file(name: &RefName, contents: &[u8]) -> Result<Reference, RefError> {
    let parse_err = |reason: &str| RefError::Parse {
        name: name.to_string(),
        reason: reason.into(),
    };

    if let Some(target) = contents.strip_prefix(b"ref:") {
        let target = target
            .trim()
            .to_str()
            .map_err(|_| parse_err("symbolic target is not UTF-8"))?;
        return Ok(Reference::Symbolic {
            name: name.clone(),
            target: RefName::new(target)?,
        });
    }

    let hex = contents
        .to_str()
        .map_err(|_| parse_err("object id is not UTF-8"))?;
    let target = ObjectId::from_hex(hex).map_err(|e| parse_err(&e.to_string()))?;
    Ok(Reference::Direct {
        name: name.clone(),
        target,
    })
}
