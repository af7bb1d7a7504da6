//! Backgammon Backend Binary
//!
//! Runs the unified auth + game-hosting server on `BIND_ADDR`, with CLI
//! flags overriding the environment variables of the same shape.

use clap::Parser;

/// Overrides `BIND_ADDR`/`DB_URL`/`WORKER_THREADS` for this run.
#[derive(Parser)]
#[command(name = "backend", about = "Backgammon backend server")]
struct Cli {
    #[arg(long)]
    bind: Option<String>,
    #[arg(long)]
    db_url: Option<String>,
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() {
    bg_core::log();
    bg_core::kys();
    bg_core::brb();

    let cli = Cli::parse();
    bg_server::run(bg_server::Config { bind: cli.bind, db_url: cli.db_url, workers: cli.workers })
        .await
        .unwrap();
}
