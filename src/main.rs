use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ratecontrol::application::IntervalStore;
use ratecontrol::application::usecases::{RateGate, ResolveIntervalUseCase, SetIntervalUseCase};
use ratecontrol::infrastructure::{
    clock::TokioClock, log_sink::LogSink, memory_store::InMemoryIntervalStore,
    sqlite_store::SqliteIntervalStore,
};
use ratecontrol::interfaces::config::Config;
use ratecontrol::interfaces::http_api::{ApiState, build_router};

#[derive(Parser, Debug)]
#[command(name = "ratecontrol")]
struct Args {
    /// Path to config.yaml
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Listen address, overrides `bind` from the config file
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ratecontrol=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }
    let args = Args::parse();

    // 1) load config
    let cfg = match Config::load_from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config {}: {}", args.config, e);
            std::process::exit(1);
        }
    };
    let policy = cfg.policy()?;

    // 2) build infra
    let store: Arc<dyn IntervalStore> = match cfg.database_url.as_deref() {
        Some(url) => Arc::new(SqliteIntervalStore::new(url).await?),
        None => {
            tracing::warn!("database_url not set, overrides will not survive a restart");
            Arc::new(InMemoryIntervalStore::new())
        }
    };

    // 3) usecases
    let resolver = ResolveIntervalUseCase::new(Arc::clone(&store), policy);
    let gate = Arc::new(RateGate::new(
        resolver.clone(),
        Arc::new(TokioClock::new()),
        Arc::new(LogSink::new()),
    ));
    let set_interval = Arc::new(SetIntervalUseCase::new(Arc::clone(&store), cfg.admins()));

    // 4) serve
    let bind = args.bind.unwrap_or_else(|| cfg.bind_addr().to_string());
    let app = build_router(ApiState {
        gate: Arc::clone(&gate),
        resolver,
        set_interval,
    });

    tracing::info!(
        bind = %bind,
        global_interval_ms = policy.global.as_millis(),
        admins = cfg.admin_allow_list.len(),
        "rate control listening"
    );
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    gate.shutdown();
    Ok(())
}
