use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::app::{App, NEW_BLOCK_TITLE, NEW_BLOCK_X, NEW_BLOCK_Y};
use crate::board::RecordPatch;
use crate::config::{NotizConfig, CONFIG_FILE};
use crate::entity::{random_color, Record};
use crate::error::{NotizError, Result};

use super::commands::Cli;

/// Merge the config file with command line overrides.
pub fn resolve_config(cli: &Cli) -> Result<NotizConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = match &cli.config {
        Some(_) if !path.exists() => {
            return Err(NotizError::Config(format!(
                "config file not found: {}",
                path.display()
            )))
        }
        _ => NotizConfig::load_or_default(&path)?,
    };

    if let Some(policy) = &cli.policy {
        config.policy = policy.parse()?;
    }
    if let Some(base) = &cli.api_base {
        config.api_base = Some(base.clone());
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

async fn open_app(config: &NotizConfig) -> Result<App> {
    // One-shot process: detached requests would die with it
    let sync = config.build_reconciler(false)?;
    let app = App::start(sync).await;
    debug!(source = %app.source(), "board loaded");
    Ok(app)
}

async fn finish(app: App) {
    if let Some(report) = app.close().await {
        debug!(?report, "session finalized");
    }
}

/// Find a block by exact id or unique prefix
fn resolve_id(app: &App, query: &str) -> Result<String> {
    if app.board().get(query).is_some() {
        return Ok(query.to_string());
    }
    let matches: Vec<&Record> = app
        .records()
        .iter()
        .filter(|r| r.id.starts_with(query))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(NotizError::RecordNotFound(query.to_string())),
        _ => Err(NotizError::AmbiguousId(query.to_string())),
    }
}

fn print_record(record: &Record, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!(
            "Created block {} - {} at ({}, {})",
            record.id,
            record.display_title(),
            record.x,
            record.y
        );
    }
    Ok(())
}

pub async fn handle_list(config: &NotizConfig, json: bool) -> Result<()> {
    let app = open_app(config).await?;
    let view = app.board().view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if view.is_empty() {
        println!("No blocks.");
    } else {
        for block in &view {
            let marker = if block.selected { "*" } else { " " };
            println!(
                "{} {}  ({:>6.0}, {:>6.0})  {}  {}",
                marker, block.id, block.x, block.y, block.color, block.title
            );
            if !block.excerpt.is_empty() {
                println!("      {}", block.excerpt.replace('\n', " "));
            }
        }
    }

    finish(app).await;
    Ok(())
}

pub async fn handle_add(
    config: &NotizConfig,
    title: Option<String>,
    note: Option<String>,
    color: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut app = open_app(config).await?;

    let record = Record::new(
        x.unwrap_or(NEW_BLOCK_X),
        y.unwrap_or(NEW_BLOCK_Y),
        title.unwrap_or_else(|| NEW_BLOCK_TITLE.to_string()),
        note.unwrap_or_default(),
        color.unwrap_or_else(random_color),
    );
    let id = app.add_record(record);
    if let Some(record) = app.board().get(&id) {
        print_record(record, json)?;
    }

    finish(app).await;
    Ok(())
}

pub async fn handle_edit(
    config: &NotizConfig,
    id: String,
    title: Option<String>,
    note: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let mut app = open_app(config).await?;
    let id = resolve_id(&app, &id)?;

    app.select(Some(&id));
    let patch = RecordPatch { title, note, color };
    if app.patch(patch) {
        println!("Updated block {}", id);
    } else {
        println!("Nothing to update for block {}", id);
    }

    finish(app).await;
    Ok(())
}

pub async fn handle_move(config: &NotizConfig, id: String, x: f64, y: f64) -> Result<()> {
    let mut app = open_app(config).await?;
    let id = resolve_id(&app, &id)?;

    // Grab the block at its origin and drop it at the target
    let (from_x, from_y) = match app.board().get(&id) {
        Some(record) => (record.x, record.y),
        None => return Err(NotizError::RecordNotFound(id)),
    };
    app.pointer_down(&id, from_x, from_y);
    app.pointer_move(x, y);
    app.pointer_up();
    println!("Moved block {} to ({}, {})", id, x, y);

    finish(app).await;
    Ok(())
}

pub async fn handle_delete(config: &NotizConfig, id: String) -> Result<()> {
    let mut app = open_app(config).await?;
    let id = resolve_id(&app, &id)?;

    app.delete(&id);
    println!("Deleted block {}", id);

    finish(app).await;
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn handle_reset(config: &NotizConfig, yes: bool) -> Result<()> {
    let mut app = open_app(config).await?;

    let confirmed = yes || confirm("Reset the whole board?")?;
    app.reset(confirmed)?;
    println!("Board reset to {} default blocks", app.records().len());

    finish(app).await;
    Ok(())
}

pub async fn handle_export(config: &NotizConfig, output: Option<PathBuf>) -> Result<()> {
    let app = open_app(config).await?;
    let text = app.export()?;

    match output {
        Some(path) => {
            fs::write(&path, &text)?;
            eprintln!("Backup saved to {}", path.display());
        }
        None => println!("{}", text),
    }

    finish(app).await;
    Ok(())
}

pub async fn handle_import(config: &NotizConfig, path: &Path) -> Result<()> {
    let mut app = open_app(config).await?;

    let text = fs::read_to_string(path)?;
    let count = app.import_text(&text)?;
    println!("Imported {} blocks from {}", count, path.display());

    finish(app).await;
    Ok(())
}
