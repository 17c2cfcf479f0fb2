// bin/tempmon.rs

#![warn(clippy::large_futures)]

use std::sync::Arc;

use log::*;
use tempmon::*;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Hello.");
    info!("Starting up tempmon v{FW_VERSION}");

    let data_dir = option_env!("DATA_DIR").unwrap_or(".tempmon");
    let storage = match Storage::open(data_dir) {
        Ok(s) => {
            info!("Got storage directory {data_dir:?}");
            s
        }
        Err(e) => {
            error!("Could not open storage {data_dir}: {e:?}");
            error!("Running without persistence, saving is disabled.");
            Storage::unavailable()
        }
    };

    #[cfg(feature = "reset_settings")]
    let config = {
        let c = MonitorConfig::default();
        if let Err(e) = c.to_storage(&storage) {
            warn!("Could not save default config: {e:?}");
        }
        c
    };

    #[cfg(not(feature = "reset_settings"))]
    let config = match MonitorConfig::from_storage(&storage) {
        None => {
            error!("Could not read stored config, using defaults");
            let c = MonitorConfig::default();
            match c.to_storage(&storage) {
                Ok(_) => info!("Successfully saved default config."),
                Err(e) => warn!("Could not save default config: {e:?}"),
            }
            c
        }

        // using settings saved earlier if we could find them
        Some(c) => c,
    };
    info!("My config:\n{config:#?}");

    let shared_state = Arc::new(MonitorState::new(config, storage));

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(Box::pin(async move {
            info!("Entering main loop...");
            tokio::select! {
                _ = Box::pin(run_poller(shared_state.clone())) => { error!("run_poller() ended."); }
                _ = Box::pin(history_reporter(shared_state.clone())) => { error!("history_reporter() ended."); }
                _ = Box::pin(tokio::signal::ctrl_c()) => { info!("Shutdown requested."); }
            };
        }));

    info!("main() finished.");
    Ok(())
}

/// Prints fresh statistics every time a reading lands in the history.
async fn history_reporter(state: Arc<MonitorState>) -> anyhow::Result<()> {
    let mut rev = state.history.subscribe();
    loop {
        rev.changed().await?;

        let records = state.history.get_all().await;
        let stats = calc_stats(&records);
        info!(
            "History: {count} readings, mean {mean:.1} C, max {max:.1} C, min {min:.1} C",
            count = stats.count,
            mean = stats.mean,
            max = stats.max,
            min = stats.min
        );
        if let Some(last) = records.last() {
            info!(
                "Last recorded: {v:.1} C ({band}) at {date} {time}",
                v = last.value,
                band = TempBand::classify(last.value).label(),
                date = last.date,
                time = last.time
            );
        }
    }
}

// EOF
