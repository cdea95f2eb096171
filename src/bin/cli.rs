//! NIFTY Alerts CLI
//!
//! Runs one acquisition → evaluation → dispatch cycle. Takes no arguments;
//! meant to be triggered by an external scheduler (cron, CI schedule).
//!
//! Environment: `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`, optional
//! `ALERT_MODE` (threshold | ranked) and `RUST_LOG`. A `.env` file is read
//! when present.

use std::fs;

use tracing_subscriber::EnvFilter;

use nifty_alerts::prelude::*;

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("NIFTY Option Alert Engine");

    // The scheduler always sees a clean exit; the log carries the outcome
    match build_engine() {
        Ok(engine) => report(engine.run_cycle()),
        Err(e) => tracing::error!("Engine setup failed: {}", e),
    }
}

fn build_engine() -> AlertResult<Engine> {
    let config = EngineConfig::from_env()?;
    let credentials = Credentials::from_env()?;

    fs::create_dir_all(&config.cache_dir)?;
    fs::create_dir_all(&config.logs_dir)?;

    tracing::info!(
        "Mode: {}, cache TTL: {} min, T = {:.4}y, r = {:.2}",
        config.mode,
        config.cache_ttl_minutes,
        config.time_to_expiry_years,
        config.risk_free_rate
    );

    let acquirer = SnapshotAcquirer::new(
        Box::new(NseClient::new()?),
        Box::new(FileCache::new(&config.cache_dir)?),
        &config.symbol,
        config.cache_ttl_minutes,
    );
    let dispatcher = Dispatcher::new(
        Box::new(TelegramSink::from_credentials(&credentials)?),
        &credentials.chat_id,
    )
    .with_max_chunk_chars(config.max_chunk_chars);
    let history = HistoryLog::new(&config.logs_dir, config.history_depth);

    Ok(Engine::new(acquirer, config.mode.evaluator(&config), dispatcher).with_history(history))
}

fn report(outcome: CycleOutcome) {
    match outcome {
        CycleOutcome::Delivered(report) => {
            tracing::info!("📨 Telegram alert sent ({} chunk(s))", report.delivered)
        }
        CycleOutcome::NothingToSend { contracts } => {
            tracing::info!("✅ No actionable alerts found across {} contracts", contracts)
        }
        CycleOutcome::AcquisitionFailed(e) => {
            tracing::error!("❌ Failed to fetch live data: {}", e)
        }
        CycleOutcome::DispatchFailed(e) => tracing::error!("❌ Telegram alert failed: {}", e),
    }
}
