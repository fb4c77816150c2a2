use std::sync::Arc;

use anyhow::{Context, Result};
use churn_dashboard::config::Args;
use churn_dashboard::ui::server::{self, AppState};
use churn_dashboard::{load_file, Controller};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let dataset = match load_file(&args.data) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load {}: {e}", args.data.display());
            return Err(e).with_context(|| format!("loading {}", args.data.display()));
        }
    };
    log::info!(
        "Loaded {} customers from {} ({} dropped); genders {:?}, contracts {:?}, payment methods {:?}",
        dataset.len(),
        args.data.display(),
        dataset.dropped_rows(),
        dataset.options().genders,
        dataset.options().contracts,
        dataset.options().payment_methods,
    );

    let controller = Controller::start(Arc::new(dataset));
    let state = AppState::new(controller).context("rendering dashboard page")?;
    server::serve(args.bind_addr(), state)
        .await
        .context("running HTTP server")
}
