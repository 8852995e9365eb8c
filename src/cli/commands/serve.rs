//! Serve command implementation.

use super::build_scanner;
use crate::models::config::Config;
use crate::server::{self, AppState};
use crate::Result;
use colored::Colorize;
use std::sync::Arc;

/// Start the HTTP API server.
pub async fn serve(config: &Config, bind: Option<&str>) -> Result<()> {
    let (drive, scanner) = build_scanner(config)?;
    let state = Arc::new(AppState::new(scanner, drive));
    let bind = bind.unwrap_or(&config.server.bind);

    println!(
        "{} {}",
        "Serving library on".bold().cyan(),
        format!("http://{}", bind).bold()
    );

    server::run(state, bind).await
}
