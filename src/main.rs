mod cli;
mod client;
mod config;
mod driver;
mod form;
mod pages;
mod payload;
mod preview;
mod schema;
mod storage;
mod tui;

use std::path::Path;
use std::process;

use clap::Parser;

use config::Config;
use storage::Storage;

fn main() {
    let args = cli::Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let root = config
        .storage_root
        .clone()
        .or_else(Storage::default_root)
        .unwrap_or_else(|| {
            eprintln!("Could not determine home directory.");
            process::exit(1);
        });

    let storage = match Storage::new(&root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&root) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let result = match args.command {
        Some(command) => cli::run(command, &config, &storage),
        None => tui::run(&config, &storage).map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs to a file under the storage root; the TUI owns the terminal.
fn init_logging(root: &Path) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {message}",
                jiff::Zoned::now().strftime("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target()
            ));
        })
        .level(log::LevelFilter::Info)
        .chain(fern::log_file(root.join("depot.log"))?)
        .apply()?;
    Ok(())
}
