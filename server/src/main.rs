// server/src/main.rs

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use notifications::{Dispatcher, EmailSender, HttpEmailSender, HttpSmsSender, SmsSender};
use rest_api::{load_server_config, AppState};
use storage::importer::load_locations_from_path;
use storage::SledLocationStorage;

const DEFAULT_SMS_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Builds the SMS sender from the environment, when credentials are set.
fn sms_sender_from_env() -> Option<Arc<dyn SmsSender>> {
    let account_sid = std::env::var("ANC_SMS_ACCOUNT_SID").ok()?;
    let auth_token = std::env::var("ANC_SMS_AUTH_TOKEN").ok()?;
    let from_number = std::env::var("ANC_SMS_FROM_NUMBER").ok()?;
    let base_url =
        std::env::var("ANC_SMS_BASE_URL").unwrap_or_else(|_| DEFAULT_SMS_BASE_URL.to_string());
    Some(Arc::new(HttpSmsSender::new(
        base_url,
        account_sid,
        auth_token,
        from_number,
    )))
}

/// Builds the email sender from the environment, when credentials are set.
fn email_sender_from_env() -> Option<Arc<dyn EmailSender>> {
    let endpoint = std::env::var("ANC_EMAIL_ENDPOINT").ok()?;
    let api_key = std::env::var("ANC_EMAIL_API_KEY").ok()?;
    let from_address = std::env::var("ANC_EMAIL_FROM").ok()?;
    Some(Arc::new(HttpEmailSender::new(endpoint, api_key, from_address)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_server_config(config_path)?;

    let db = sled::open(&config.data_directory)
        .with_context(|| format!("failed to open data directory {}", config.data_directory))?;

    // one-off location seed, driven by the environment so the loader stays
    // out of the request path
    if let Ok(sheet) = std::env::var("ANC_LOCATIONS_CSV") {
        let locations = SledLocationStorage::new(&db)?;
        let loaded = load_locations_from_path(&locations, &PathBuf::from(&sheet)).await?;
        info!(rows = loaded, sheet = %sheet, "location hierarchy loaded");
    }

    let jwt_secret = match std::env::var("ANC_JWT_SECRET") {
        Ok(secret) => secret.into_bytes(),
        Err(_) => {
            warn!("ANC_JWT_SECRET not set, using an insecure development secret");
            b"anc-track-development-secret".to_vec()
        }
    };

    let dispatcher = Dispatcher::start(sms_sender_from_env(), email_sender_from_env());
    let state = AppState::new(&db, dispatcher, jwt_secret)?;
    let app = rest_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    info!(%addr, "ANC Track REST API server starting");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
