// lib.rs
#![warn(clippy::large_futures)]

pub use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub use anyhow::bail;
pub use chrono::*;
pub use log::*;
pub use serde::{Deserialize, Serialize};
pub use tokio::{
    sync::RwLock,
    time::{Duration, sleep},
};

mod config;
pub use config::*;

mod storage;
pub use storage::*;

mod history;
pub use history::*;

mod stats;
pub use stats::*;

mod state;
pub use state::*;

mod poller;
pub use poller::*;

pub const FW_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NO_TEMP: f32 = -1000.0;

/// The latest fetched value plus the flags the poller maintains around it.
#[derive(Clone, Debug, Serialize)]
pub struct CurrentReading {
    pub value: f32,
    pub fetching: bool,
    pub connected: bool,
    pub last_update: String,
    pub timestamp: i64,
    pub notice: String,
}

impl CurrentReading {
    pub fn new() -> Self {
        CurrentReading {
            value: NO_TEMP,
            fetching: false,
            connected: false,
            last_update: "-".to_string(),
            timestamp: 0,
            notice: String::new(),
        }
    }
}

impl Default for CurrentReading {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply shape of the sensor endpoint. Unknown extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct SensorResponse {
    pub temperatura: f32,
    pub timestamp: Option<String>,
    pub status: Option<String>,
}

// EOF
