use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use hst_transfer::clone;

#[derive(Args)]
pub struct CloneArgs {
    /// Repository to clone
    source: PathBuf,

    /// Directory to clone into (default: the source's directory name)
    directory: Option<PathBuf>,
}

pub fn run(args: &CloneArgs) -> Result<i32> {
    let dest = match &args.directory {
        Some(dir) => dir.clone(),
        None => {
            let source = args.source.canonicalize().with_context(|| {
                format!("repository '{}' does not exist", args.source.display())
            })?;
            let name = source
                .file_name()
                .with_context(|| format!("cannot derive a directory name from '{}'", source.display()))?;
            std::env::current_dir()?.join(name)
        }
    };
    println!("Cloning into '{}'...", dest.display());
    clone(&args.source, &dest)?;
    Ok(0)
}
