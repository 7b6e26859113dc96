//! CLI interface.
//!
//! Designed for scripts and humans alike to drive the connector forms
//! without the TUI. Each subcommand is non-interactive: arguments in,
//! structured output out.
//!
//! Field values are supplied with repeatable flags: `--set key=value` for
//! base fields and `--line "key=value,key=value"` once per line item.

use clap::{Parser, Subcommand};

use crate::client::HttpTransport;
use crate::config::Config;
use crate::driver;
use crate::form::FormState;
use crate::pages::{self, PageSpec};
use crate::payload::BuildContext;
use crate::preview;
use crate::storage::Storage;

/// Depot — build and push connector test documents.
#[derive(Debug, Parser)]
#[command(name = "depot", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Run a subcommand; with none, the interactive UI starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

const WORKFLOW_HELP: &str = r#"Workflow: pushing an allocation inbound order
  1. depot page list
     → shows every page and its fields
  2. depot preview allocation-in --set entryOrderCode=EO123 \
       --set warehouseCode=WH01 --line "itemCode=SKU1,actualQty=5"
  3. depot submit allocation-in --set entryOrderCode=EO123 \
       --set warehouseCode=WH01 --line "itemCode=SKU1,actualQty=5"
  4. depot history allocation-in

Drafts autosaved by the interactive UI can be reused:
  depot submit allocation-in --from-draft"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect the available pages.
    Page {
        #[command(subcommand)]
        command: PageCommand,
    },

    /// Render a page's JSON document without submitting.
    ///
    /// Pure read, no side effects, repeatable. Blank required fields show
    /// up as empty strings in the document.
    Preview {
        /// Page name (see `depot page list`).
        page: String,

        /// Base field value, `key=value`. Repeatable.
        #[arg(long = "set")]
        set: Vec<String>,

        /// Line item as comma-separated `key=value` pairs. Repeatable,
        /// one flag per line.
        #[arg(long = "line")]
        line: Vec<String>,

        /// Start from the autosaved draft, then apply `--set`/`--line`.
        #[arg(long)]
        from_draft: bool,
    },

    /// Validate, build, and push a page's document to the backend.
    ///
    /// Successful submissions are recorded in the page's history.
    Submit {
        /// Page name (see `depot page list`).
        page: String,

        /// Base field value, `key=value`. Repeatable.
        #[arg(long = "set")]
        set: Vec<String>,

        /// Line item as comma-separated `key=value` pairs. Repeatable.
        #[arg(long = "line")]
        line: Vec<String>,

        /// Start from the autosaved draft, then apply `--set`/`--line`.
        #[arg(long)]
        from_draft: bool,
    },

    /// Show a page's recent submissions, newest first.
    History {
        /// Page name (see `depot page list`).
        page: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum PageCommand {
    /// List all pages with their fields and line bounds.
    List,
}

/// Run a parsed command, returning an error message on failure.
pub fn run(command: Command, config: &Config, storage: &Storage) -> Result<(), String> {
    match command {
        Command::Page { command } => match command {
            PageCommand::List => cmd_page_list(),
        },
        Command::Preview {
            page,
            set,
            line,
            from_draft,
        } => {
            let page = resolve_page(&page)?;
            let state = assemble_state(page, storage, &set, &line, from_draft)?;
            cmd_preview(page, &state)
        }
        Command::Submit {
            page,
            set,
            line,
            from_draft,
        } => {
            let page = resolve_page(&page)?;
            let state = assemble_state(page, storage, &set, &line, from_draft)?;
            cmd_submit(config, storage, page, &state)
        }
        Command::History { page } => {
            let page = resolve_page(&page)?;
            cmd_history(storage, page)
        }
    }
}

fn resolve_page(name: &str) -> Result<&'static PageSpec, String> {
    pages::find(name).ok_or_else(|| {
        let known: Vec<&str> = pages::ALL.iter().map(|p| p.name).collect();
        format!("unknown page '{name}' — known pages: {}", known.join(", "))
    })
}

/// Splits `key=value`, rejecting pairs without an equals sign.
fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

/// Builds form state from the draft (optional) plus `--set`/`--line` flags.
fn assemble_state(
    page: &PageSpec,
    storage: &Storage,
    set: &[String],
    line: &[String],
    from_draft: bool,
) -> Result<FormState, String> {
    let mut state = if from_draft {
        storage
            .load_draft(page.name)
            .map_err(|e| format!("failed to load draft: {e}"))?
            .ok_or_else(|| format!("no draft saved for {}", page.name))?
    } else {
        FormState::default()
    };

    if state.base.is_empty() {
        for field in page.base_fields {
            if !field.default.is_empty() {
                state
                    .base
                    .insert(field.key.to_string(), field.default.to_string());
            }
        }
    }

    for raw in set {
        let (key, value) = parse_pair(raw)?;
        if !page.base_fields.iter().any(|f| f.key == key) {
            return Err(format!("page {} has no base field '{key}'", page.name));
        }
        state.base.insert(key, value);
    }

    if !line.is_empty() {
        if line.len() > page.max_items {
            return Err(format!(
                "page {} allows at most {} line(s)",
                page.name, page.max_items
            ));
        }
        state.items.clear();
        for raw_line in line {
            let mut values = std::collections::BTreeMap::new();
            for raw in raw_line.split(',') {
                let (key, value) = parse_pair(raw)?;
                if !page.item_fields.iter().any(|f| f.key == key) {
                    return Err(format!("page {} has no line field '{key}'", page.name));
                }
                values.insert(key, value);
            }
            state.items.push(values);
        }
    }

    while state.items.len() < page.min_items {
        state.items.push(std::collections::BTreeMap::new());
    }

    Ok(state)
}

fn cmd_page_list() -> Result<(), String> {
    for page in pages::ALL {
        println!("{}  — {}", page.name, page.title);
        let base: Vec<&str> = page.base_fields.iter().map(|f| f.key).collect();
        println!("  base:  {}", base.join(", "));
        if page.item_fields.is_empty() {
            println!("  lines: none");
        } else {
            let item: Vec<&str> = page.item_fields.iter().map(|f| f.key).collect();
            println!(
                "  lines: {} ({}..={} items)",
                item.join(", "),
                page.min_items,
                page.max_items
            );
        }
    }
    Ok(())
}

fn cmd_preview(page: &PageSpec, state: &FormState) -> Result<(), String> {
    let ctx = BuildContext::capture();
    println!("{}", preview::render(page, state, &ctx));
    Ok(())
}

fn cmd_submit(
    config: &Config,
    storage: &Storage,
    page: &PageSpec,
    state: &FormState,
) -> Result<(), String> {
    let transport =
        HttpTransport::new(&config.backend_url).map_err(|e| format!("transport setup: {e}"))?;
    let reply = driver::submit(page, state, storage, &transport).map_err(|e| e.to_string())?;

    if reply.message.is_empty() {
        eprintln!("Submitted {}", page.name);
    } else {
        eprintln!("Submitted {}: {}", page.name, reply.message);
    }
    Ok(())
}

fn cmd_history(storage: &Storage, page: &PageSpec) -> Result<(), String> {
    let records = storage
        .load_history(page.name)
        .map_err(|e| format!("failed to load history: {e}"))?;

    if records.is_empty() {
        println!("No submissions for {}", page.name);
        return Ok(());
    }

    for record in &records {
        let short_id = &record.id.to_string()[..8];
        let summary: Vec<String> = record
            .base
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!(
            "{short_id}  {}  [{} line(s)]  {}",
            record.submitted_at.strftime("%Y-%m-%d %H:%M:%S"),
            record.line_count,
            summary.join(" ")
        );
    }
    Ok(())
}
