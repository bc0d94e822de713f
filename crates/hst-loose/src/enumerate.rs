use std::fs;
use std::path::{Path, PathBuf};

use hst_hash::ObjectId;

use crate::LooseError;

/// Iterator over the ids in an `objects/` directory.
///
/// Walks the two-character fan-out directories in order and yields each file
/// whose name completes a valid id. Temporary and foreign files are skipped.
pub struct LooseObjectIter {
    dirs: Vec<(String, PathBuf)>,
    dir_index: usize,
    current: Vec<String>,
    entry_index: usize,
    prefix: String,
}

impl LooseObjectIter {
    pub(crate) fn new(objects_dir: &Path) -> Result<Self, LooseError> {
        let mut dirs = Vec::new();
        if objects_dir.is_dir() {
            for entry in fs::read_dir(objects_dir)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().to_lowercase();
                if name.len() == 2
                    && name.chars().all(|c| c.is_ascii_hexdigit())
                    && entry.file_type()?.is_dir()
                {
                    dirs.push((name, entry.path()));
                }
            }
        }
        dirs.sort();

        Ok(Self {
            dirs,
            dir_index: 0,
            current: Vec::new(),
            entry_index: 0,
            prefix: String::new(),
        })
    }

    fn advance_dir(&mut self) -> Result<bool, LooseError> {
        while self.dir_index < self.dirs.len() {
            let (prefix, path) = &self.dirs[self.dir_index];
            self.dir_index += 1;

            let mut names = Vec::new();
            for entry in fs::read_dir(path)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            names.sort();

            if !names.is_empty() {
                self.prefix = prefix.clone();
                self.current = names;
                self.entry_index = 0;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Iterator for LooseObjectIter {
    type Item = Result<ObjectId, LooseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(name) = self.current.get(self.entry_index) {
                self.entry_index += 1;
                if let Ok(oid) = ObjectId::from_hex(&format!("{}{name}", self.prefix)) {
                    return Some(Ok(oid));
                }
                continue;
            }

            match self.advance_dir() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
