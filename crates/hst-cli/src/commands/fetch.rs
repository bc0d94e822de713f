use anyhow::Result;
use clap::Args;
use hst_transfer::{fetch, open_remote, Refspec};

use super::open_repo;

#[derive(Args)]
pub struct FetchArgs {
    /// Remote to fetch from
    #[arg(default_value = "origin")]
    remote: String,

    /// Refspecs to fetch (default: the remote's configured refspecs)
    refspecs: Vec<String>,
}

pub fn run(args: &FetchArgs) -> Result<i32> {
    let repo = open_repo()?;
    let refspecs = args
        .refspecs
        .iter()
        .map(|s| Refspec::parse(s))
        .collect::<Result<Vec<_>, _>>()?;
    let updates = fetch(&repo, &args.remote, &refspecs)?;

    if updates.is_empty() {
        println!("Already up to date.");
        return Ok(0);
    }
    let (url, _) = open_remote(&repo, &args.remote)?;
    println!("From {url}");
    for update in &updates {
        let range = match update.old {
            Some(old) => format!("{}..{}", old.short_hex(), update.new.short_hex()),
            None => format!("* {}", update.new.short_hex()),
        };
        let short = |name: &str| {
            name.strip_prefix("refs/heads/")
                .or_else(|| name.strip_prefix("refs/remotes/"))
                .unwrap_or(name)
                .to_string()
        };
        println!(
            "   {range}  {} -> {}",
            short(&update.source),
            short(&update.destination)
        );
    }
    Ok(0)
}
