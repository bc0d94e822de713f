use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use hst_repository::Repository;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to create the repository in
    directory: Option<PathBuf>,
}

pub fn run(args: &InitArgs) -> Result<i32> {
    let target = match &args.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&target)?;
    let repo = Repository::init(&target)?;
    println!(
        "Initialized empty hst repository in {}/",
        repo.hst_dir().display()
    );
    Ok(0)
}
