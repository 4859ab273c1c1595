mod activity;
mod catalog;
mod cli;
mod page;
mod server;
mod store;
mod types;

#[allow(unused_imports)]
pub(crate) use activity::*;
#[allow(unused_imports)]
pub(crate) use catalog::*;
#[allow(unused_imports)]
pub(crate) use cli::*;
#[allow(unused_imports)]
pub(crate) use page::*;
#[allow(unused_imports)]
pub(crate) use server::*;
#[allow(unused_imports)]
pub(crate) use store::*;
#[allow(unused_imports)]
pub(crate) use types::*;

use std::fs;

use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The catalog must be present and well-formed before we serve anything.
    let races = match load_races(&cli.races) {
        Ok(races) => races,
        Err(e) => {
            eprintln!("Cannot load race catalog: {e}");
            std::process::exit(2);
        }
    };

    let store = EmbedStore::new(cli.embeds.clone());
    if let Some(parent) = store.path().parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Cannot create data directory {}: {e}", parent.display());
            std::process::exit(2);
        }
    }
    // An existing but unreadable store is a startup error, not something to
    // discover on the first save. A missing file is fine.
    let embeds = match store.load() {
        Ok(embeds) => embeds,
        Err(e) => {
            eprintln!("Cannot load embed store: {e}");
            std::process::exit(2);
        }
    };

    println!("Strava Embed Collector");
    println!("  Server:       http://{}:{}", cli.bind, cli.port);
    println!(
        "  Race catalog: {} ({} races awaiting embed codes)",
        cli.races.display(),
        races.len()
    );
    println!(
        "  Embed store:  {} ({} embeds saved)",
        store.path().display(),
        embeds.len()
    );
    println!("  Open the URL above, paste embed codes per race, Ctrl+C to stop.");

    run_server(&cli.bind, cli.port, &cli.races, &store)
}
