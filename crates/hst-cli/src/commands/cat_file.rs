use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use hst_object::Object;
use hst_odb::ObjectStoreExt;
use hst_revwalk::resolve;

use super::open_repo;

#[derive(Args)]
pub struct CatFileArgs {
    /// Show the object type
    #[arg(short = 't', conflicts_with = "pretty", required_unless_present = "pretty")]
    type_only: bool,

    /// Pretty-print the object content
    #[arg(short = 'p')]
    pretty: bool,

    /// Object to show
    object: String,
}

pub fn run(args: &CatFileArgs) -> Result<i32> {
    let repo = open_repo()?;
    let oid = resolve(repo.odb(), repo.refs(), &args.object)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.type_only {
        writeln!(out, "{}", repo.odb().kind_of(&oid)?.as_str())?;
        return Ok(0);
    }

    match repo.odb().read_object(&oid)? {
        Object::Tree(tree) => {
            for entry in tree.iter() {
                let kind = if entry.mode.is_tree() { "tree" } else { "blob" };
                writeln!(
                    out,
                    "{:0>6} {kind} {}\t{}",
                    String::from_utf8_lossy(entry.mode.as_bytes()),
                    entry.oid,
                    entry.name
                )?;
            }
        }
        other => out.write_all(&other.serialize_content())?,
    }
    Ok(0)
}
