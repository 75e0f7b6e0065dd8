use clap::Parser;
use notiz::cli::{
    handle_add, handle_delete, handle_edit, handle_export, handle_import, handle_list,
    handle_move, handle_reset, resolve_config, Cli, Commands,
};
use notiz::NotizError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("NOTIZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match resolve_config(&cli) {
        Ok(config) => match cli.command {
            Commands::List { json } => handle_list(&config, json).await,
            Commands::Add {
                title,
                note,
                color,
                x,
                y,
                json,
            } => handle_add(&config, title, note, color, x, y, json).await,
            Commands::Edit {
                id,
                title,
                note,
                color,
            } => handle_edit(&config, id, title, note, color).await,
            Commands::Move { id, x, y } => handle_move(&config, id, x, y).await,
            Commands::Delete { id } => handle_delete(&config, id).await,
            Commands::Reset { yes } => handle_reset(&config, yes).await,
            Commands::Export { output } => handle_export(&config, output).await,
            Commands::Import { path } => handle_import(&config, &path).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) | Err(NotizError::UserAborted) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
