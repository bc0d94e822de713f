use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use flate2::write::ZlibEncoder;
use hst_hash::{Hasher, ObjectId};
use hst_object::{header, Object, ObjectType};

use crate::{LooseError, LooseObjectStore};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl LooseObjectStore {
    pub fn write(&self, obj: &Object) -> Result<ObjectId, LooseError> {
        self.write_raw(obj.object_type(), &obj.serialize_content())
    }

    /// Store `content` as an object of kind `kind` and return its id.
    ///
    /// A no-op when the object is already present. The file is written to a
    /// temporary name in `objects/` and renamed into place.
    pub fn write_raw(&self, kind: ObjectType, content: &[u8]) -> Result<ObjectId, LooseError> {
        let hdr = header::write_header(kind, content.len());
        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(content);
            hasher.finalize()?
        };

        if self.contains(&oid) {
            return Ok(oid);
        }

        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = write_to_temp(&self.objects_dir, &hdr, content, self.compression_level)?;
        finalize_object(&tmp, &final_path)?;
        tracing::trace!(%oid, %kind, size = content.len(), "wrote loose object");
        Ok(oid)
    }
}

fn write_to_temp(
    objects_dir: &Path,
    hdr: &[u8],
    content: &[u8],
    level: flate2::Compression,
) -> Result<PathBuf, LooseError> {
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_path = objects_dir.join(format!("tmp_obj_{}_{seq}", std::process::id()));

    let file = fs::File::create(&tmp_path)?;
    let mut encoder = ZlibEncoder::new(file, level);
    encoder.write_all(hdr)?;
    encoder.write_all(content)?;
    encoder.finish()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o444))?;
    }

    Ok(tmp_path)
}

/// Move the temp file into place. Losing a race to another writer of the same
/// object counts as success.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), LooseError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(LooseError::Io(e))
        }
    }
}
