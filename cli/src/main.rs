//! NumRelay terminal client entry point

mod output;
mod settings;
mod wizard;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use nr_core::services::purchase::PurchaseFlow;
use nr_infra::{ApiClient, EnvTokenProvider};

use crate::output::TerminalSink;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load()?;
    tracing::info!(
        event = "startup",
        base_url = %settings.api.base_url,
        "starting numrelay"
    );

    let token = Arc::new(EnvTokenProvider::new("NUMRELAY_API_TOKEN"));
    let client = Arc::new(ApiClient::new(settings.api, token)?);
    let sink = Arc::new(TerminalSink::new());

    let flow = PurchaseFlow::new(client.clone(), client, sink, settings.flow.into());
    wizard::run(&flow).await
}
