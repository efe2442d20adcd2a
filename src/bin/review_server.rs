// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Year-in-Review Server Binary
//!
//! Serves the session, OAuth and review endpoints for the web frontend.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use year_in_review::{
    config::{Config, ReviewConfig},
    logging,
    routes::ReviewRoutes,
    session::SessionStore,
};

#[derive(Parser)]
#[command(name = "year-in-review-server")]
#[command(about = "HTTP server for the Strava year-in-review frontend")]
pub struct Args {
    /// Port to listen on (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Aggregation rules file (TOML)
    #[arg(short, long)]
    review_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;

    let args = Args::parse();

    let config = Config::load(args.config)?;
    let review = ReviewConfig::load(args.review_config)?;
    let port = args.port.unwrap_or(config.server.port);

    if config.strava.is_none() {
        warn!("Strava credentials missing: OAuth endpoints will return errors");
    }

    info!("Starting year-in-review server on port {}", port);
    info!("Redirecting to frontend at {}", config.server.frontend_url);

    let routes = ReviewRoutes::new(&config, review, SessionStore::new());
    if let Err(e) = routes.serve(port, &config.server.allowed_origin).await {
        error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
