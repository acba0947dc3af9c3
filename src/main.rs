use anyhow::{Context, Result};
use lis_loader::{config::Config, fetch, load};
use reqwest::Client;
use std::fs;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure dirs ───────────────────────────────────────────
    let config = Config::from_env()?;
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // ─── 3) fetch raw files ──────────────────────────────────────────
    if config.skip_fetch {
        match fetch::read_manifest(&config.data_dir).await {
            Ok(manifest) => info!(
                session = %manifest.session,
                fetched_at = %manifest.fetched_at,
                "skipping fetch, using cached files"
            ),
            Err(e) => warn!(error = %e, "skipping fetch, no usable manifest"),
        }
    } else {
        let client = Client::new();
        let session = match &config.session {
            Some(session) => session.clone(),
            None => fetch::discover_session(&client).await?,
        };
        let start = Instant::now();
        let manifest = fetch::download_all(&client, &session, &config.data_dir).await?;
        info!(
            session = %manifest.session,
            files = manifest.files.len(),
            elapsed = ?start.elapsed(),
            "fetched"
        );
    }

    // ─── 4) load, on the blocking pool ───────────────────────────────
    let summary = tokio::task::spawn_blocking(move || load::run(&config)).await??;

    info!(summary = %serde_json::to_string(&summary)?, "all done");
    Ok(())
}
