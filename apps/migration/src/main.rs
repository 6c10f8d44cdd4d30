//! Migration CLI tool.
//!
//! `run_cli` loads `.env`, reads `DATABASE_URL` and installs its own tracing
//! subscriber.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(migration::Migrator).await;
}
