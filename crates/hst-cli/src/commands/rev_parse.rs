use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct RevParseArgs {
    /// Print the abbreviated id
    #[arg(long)]
    short: bool,

    /// Revisions to resolve
    #[arg(required = true)]
    revisions: Vec<String>,
}

pub fn run(args: &RevParseArgs) -> Result<i32> {
    let repo = open_repo()?;
    for rev in &args.revisions {
        let oid = repo.resolve(rev)?;
        if args.short {
            println!("{}", oid.short_hex());
        } else {
            println!("{oid}");
        }
    }
    Ok(0)
}
