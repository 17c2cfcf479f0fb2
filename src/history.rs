// history.rs

use tokio::sync::watch;

use crate::*;

/// The whole history lives as one JSON array under this key.
const HISTORY_KEY: &str = "temperatures";

/// One recorded reading. Immutable once created; the derived date parts
/// are frozen at capture time so the history reads the same regardless of
/// the clock state later on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TempRecord {
    pub value: f32,
    pub date: String,
    pub time: String,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    /// Capture instant, epoch milliseconds.
    pub timestamp: i64,
}

impl TempRecord {
    pub fn new(value: f32, at: DateTime<Local>) -> Self {
        TempRecord {
            value,
            date: at.format("%d/%m/%Y").to_string(),
            time: at.format("%H:%M:%S").to_string(),
            day: at.day(),
            month: at.month(),
            year: at.year(),
            timestamp: at.timestamp_millis(),
        }
    }
}

/// Append-only record store over the storage medium. The list only ever
/// grows, except for `clear` which replaces it with an empty one.
pub struct HistoryStore {
    storage: RwLock<Storage>,
    rev: watch::Sender<u64>,
}

impl HistoryStore {
    pub fn new(storage: Storage) -> Self {
        let (rev, _) = watch::channel(0);
        HistoryStore {
            storage: RwLock::new(storage),
            rev,
        }
    }

    pub async fn is_available(&self) -> bool {
        self.storage.read().await.is_available()
    }

    /// Observers see a bumped revision after every successful append and can
    /// reload without holding a reference back into the caller.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rev.subscribe()
    }

    /// Stamps `value` with the current local time and appends it. The write
    /// replaces the whole blob; on rejection the stored list is unchanged
    /// and the error goes to the caller, no retry.
    pub async fn append(&self, value: f32) -> Result<TempRecord, StoreError> {
        let record = TempRecord::new(value, Local::now());

        let storage = self.storage.write().await;
        let mut records = read_records(&storage);
        records.push(record.clone());

        let blob = serde_json::to_vec(&records).map_err(StoreError::Encode)?;
        storage.set_raw(HISTORY_KEY, &blob)?;
        drop(storage);

        debug!(
            "Recorded {v}, {n} records total",
            v = record.value,
            n = records.len()
        );
        self.rev.send_modify(|r| *r += 1);
        Ok(record)
    }

    /// The stored list in append order, oldest first. Missing or corrupt
    /// data reads as empty.
    pub async fn get_all(&self) -> Vec<TempRecord> {
        read_records(&*self.storage.read().await)
    }

    pub async fn last(&self) -> Option<TempRecord> {
        self.get_all().await.pop()
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let storage = self.storage.write().await;
        storage.set_raw(HISTORY_KEY, b"[]")?;
        info!("History cleared");
        Ok(())
    }
}

fn read_records(storage: &Storage) -> Vec<TempRecord> {
    let blob = match storage.get_raw(HISTORY_KEY) {
        Ok(Some(b)) => b,
        Ok(None) => return Vec::new(),
        Err(e) => {
            error!("History read error: {e}");
            return Vec::new();
        }
    };
    match serde_json::from_slice(&blob) {
        Ok(records) => records,
        Err(e) => {
            error!("Cannot parse stored history, treating it as empty: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tempmon-history-{tag}-{pid}", pid = std::process::id()))
    }

    fn open_store(tag: &str) -> (HistoryStore, PathBuf) {
        let dir = scratch(tag);
        let _ = fs::remove_dir_all(&dir);
        let store = HistoryStore::new(Storage::open(&dir).unwrap());
        (store, dir)
    }

    #[tokio::test]
    async fn append_then_get_all() {
        let (store, dir) = open_store("append");

        let before = Local::now().timestamp_millis();
        store.append(22.5).await.unwrap();
        let after = Local::now().timestamp_millis();

        let records = store.get_all().await;
        assert_eq!(records.len(), 1);
        let last = records.last().unwrap();
        assert_eq!(last.value, 22.5);
        assert!(last.timestamp >= before && last.timestamp <= after);
        assert!(!last.date.is_empty());
        assert!(!last.time.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn last_returns_newest() {
        let (store, dir) = open_store("last");

        assert!(store.last().await.is_none());
        store.append(20.0).await.unwrap();
        store.append(21.5).await.unwrap();
        assert_eq!(store.last().await.unwrap().value, 21.5);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let (store, dir) = open_store("clear");

        store.append(20.0).await.unwrap();
        store.append(30.0).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get_all().await.is_empty());

        // clearing an already empty history is a no-op, not an error
        store.clear().await.unwrap();
        assert!(store.get_all().await.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn corrupt_blob_reads_as_empty() {
        let (store, dir) = open_store("corrupt");

        store.append(25.0).await.unwrap();
        Storage::open(&dir)
            .unwrap()
            .set_raw("temperatures", b"{ not json ]")
            .unwrap();
        assert!(store.get_all().await.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn subscriber_sees_append() {
        let (store, dir) = open_store("notify");

        let mut rev = store.subscribe();
        store.append(24.0).await.unwrap();
        rev.changed().await.unwrap();
        assert_eq!(*rev.borrow_and_update(), 1);

        store.append(24.5).await.unwrap();
        rev.changed().await.unwrap();
        assert_eq!(*rev.borrow_and_update(), 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn rejected_write_leaves_history_unchanged() {
        let (store, dir) = open_store("rejected");

        store.append(20.0).await.unwrap();

        // block the scratch file the medium writes first
        fs::create_dir_all(dir.join("temperatures.tmp")).unwrap();
        match store.append(25.0).await {
            Err(StoreError::Write(_)) => {}
            other => panic!("expected Write error, got {other:?}"),
        }
        fs::remove_dir_all(dir.join("temperatures.tmp")).unwrap();

        let records = store.get_all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 20.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unavailable_medium_degrades() {
        let store = HistoryStore::new(Storage::unavailable());

        assert!(!store.is_available().await);
        assert!(store.get_all().await.is_empty());
        assert!(matches!(
            store.append(22.0).await,
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn stored_scenario_statistics() {
        let (store, dir) = open_store("scenario");

        store.append(20.0).await.unwrap();
        store.append(25.0).await.unwrap();
        store.append(30.0).await.unwrap();

        let stats = calc_stats(&store.get_all().await);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 25.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.min, 20.0);

        let _ = fs::remove_dir_all(&dir);
    }
}

// EOF
