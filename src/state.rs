// state.rs

use crate::*;

use tokio::sync::Notify;

pub struct MonitorState {
    pub config: RwLock<MonitorConfig>,
    pub current: RwLock<CurrentReading>,
    pub poll_cnt: AtomicU64,
    pub refresh: Notify,
    pub history: HistoryStore,
}

impl MonitorState {
    pub fn new(config: MonitorConfig, storage: Storage) -> Self {
        MonitorState {
            config: RwLock::new(config),
            current: RwLock::new(CurrentReading::new()),
            poll_cnt: AtomicU64::new(0),
            refresh: Notify::new(),
            history: HistoryStore::new(storage),
        }
    }

    /// Ask the poller for one immediate fetch outside the schedule.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    pub async fn snapshot(&self) -> CurrentReading {
        self.current.read().await.clone()
    }

    /// The save action: append the current reading to the history. Refused
    /// while there is no reading yet or the storage medium is down.
    pub async fn record_current(&self) -> anyhow::Result<TempRecord> {
        let value = self.current.read().await.value;
        if !value.is_finite() || value <= NO_TEMP {
            bail!("no reading to record yet");
        }
        if !self.history.is_available().await {
            bail!("storage is unavailable, recording disabled");
        }
        Ok(self.history.append(value).await?)
    }
}


// EOF
