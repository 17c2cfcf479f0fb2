// config.rs

use anyhow::bail;
use crc::{Crc, CRC_32_ISCSI};
use log::*;
use serde::{Deserialize, Serialize};

use crate::storage::Storage;

pub const CFG_BUF_SIZE: usize = 256;

const DEFAULT_SENSOR_HOST: &str = "192.168.1.100";
const DEFAULT_SENSOR_PORT: u16 = 80;
const DEFAULT_POLL_MS: u64 = 5000;

pub const POLL_MS_MIN: u64 = 1000;
pub const POLL_MS_MAX: u64 = 60_000;

const CONFIG_NAME: &str = "cfg";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub host: String,
    pub port: u16,

    /// Poll interval in milliseconds, kept within 1..=60 seconds.
    pub poll_ms: u64,

    /// Skip the network and generate readings locally.
    pub use_simulated: bool,
    /// Append every polled reading to the history automatically.
    pub auto_record: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: option_env!("SENSOR_HOST")
                .unwrap_or(DEFAULT_SENSOR_HOST)
                .into(),
            port: option_env!("SENSOR_PORT")
                .unwrap_or("-")
                .parse()
                .unwrap_or(DEFAULT_SENSOR_PORT),
            poll_ms: DEFAULT_POLL_MS,

            use_simulated: false,
            auto_record: false,
        }
    }
}

impl MonitorConfig {
    pub fn from_storage(storage: &Storage) -> Option<Self> {
        info!("Reading up to {sz} bytes of stored config...", sz = CFG_BUF_SIZE);
        let b = match storage.get_raw(CONFIG_NAME) {
            Err(e) => {
                error!("Config read error {e:?}");
                return None;
            }
            Ok(Some(b)) => b,
            _ => {
                error!("Config key not found");
                return None;
            }
        };
        if b.len() > CFG_BUF_SIZE {
            error!("Stored config too large: {sz} bytes", sz = b.len());
            return None;
        }
        info!("Got {sz} bytes of config. Parsing...", sz = b.len());

        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        match postcard::from_bytes_crc32::<MonitorConfig>(&b, digest) {
            Ok(c) => {
                info!("Successfully parsed stored config.");
                Some(c.sanitize())
            }
            Err(e) => {
                error!("Cannot parse stored config: {e:?}");
                None
            }
        }
    }

    pub fn to_storage(&self, storage: &Storage) -> anyhow::Result<()> {
        let mut buf = [0u8; CFG_BUF_SIZE];
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        let data = match postcard::to_slice_crc32(self, &mut buf, digest) {
            Ok(d) => d,
            Err(e) => {
                let estr = format!("Cannot encode config to buffer {e:?}");
                bail!("{estr}");
            }
        };
        info!("Encoded config to {sz} bytes. Saving...", sz = data.len());

        match storage.set_raw(CONFIG_NAME, data) {
            Ok(_) => {
                info!("Config saved.");
                Ok(())
            }
            Err(e) => {
                let estr = format!("Cannot save config: {e:?}");
                bail!("{estr}");
            }
        }
    }

    /// Out-of-range intervals from an old or hand-edited blob are clamped,
    /// not rejected.
    pub fn sanitize(mut self) -> Self {
        self.poll_ms = self.poll_ms.clamp(POLL_MS_MIN, POLL_MS_MAX);
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://{h}:{p}", h = self.host, p = self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tempmon-config-{tag}-{pid}", pid = std::process::id()))
    }

    #[test]
    fn defaults_are_sane() {
        let c = MonitorConfig::default();
        assert!(!c.host.is_empty());
        assert!(c.port > 0);
        assert!((POLL_MS_MIN..=POLL_MS_MAX).contains(&c.poll_ms));
        assert!(!c.use_simulated);
        assert!(!c.auto_record);
    }

    #[test]
    fn storage_roundtrip() {
        let dir = scratch("roundtrip");
        let _ = std::fs::remove_dir_all(&dir);
        let storage = Storage::open(&dir).unwrap();

        let mut c = MonitorConfig::default();
        c.host = "10.0.0.42".into();
        c.port = 8080;
        c.poll_ms = 2500;
        c.auto_record = true;
        c.to_storage(&storage).unwrap();

        let back = MonitorConfig::from_storage(&storage).unwrap();
        assert_eq!(back.host, "10.0.0.42");
        assert_eq!(back.port, 8080);
        assert_eq!(back.poll_ms, 2500);
        assert!(back.auto_record);
        assert!(!back.use_simulated);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_blob_reads_as_none() {
        let dir = scratch("corrupt");
        let _ = std::fs::remove_dir_all(&dir);
        let storage = Storage::open(&dir).unwrap();

        storage.set_raw("cfg", b"definitely not postcard").unwrap();
        assert!(MonitorConfig::from_storage(&storage).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_blob_reads_as_none() {
        let dir = scratch("missing");
        let _ = std::fs::remove_dir_all(&dir);
        let storage = Storage::open(&dir).unwrap();

        assert!(MonitorConfig::from_storage(&storage).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sanitize_clamps_interval() {
        let mut c = MonitorConfig::default();
        c.poll_ms = 10;
        assert_eq!(c.sanitize().poll_ms, POLL_MS_MIN);

        let mut c = MonitorConfig::default();
        c.poll_ms = 600_000;
        assert_eq!(c.sanitize().poll_ms, POLL_MS_MAX);

        let mut c = MonitorConfig::default();
        c.poll_ms = 3000;
        assert_eq!(c.sanitize().poll_ms, 3000);
    }

    #[test]
    fn base_url_formats_endpoint() {
        let mut c = MonitorConfig::default();
        c.host = "192.168.1.7".into();
        c.port = 8266;
        assert_eq!(c.base_url(), "http://192.168.1.7:8266");
    }
}

// EOF
