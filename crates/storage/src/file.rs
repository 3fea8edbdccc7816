//! Append-only JSON lines store
//!
//! One [`StoredBalanceRow`] per line. The file is replayed into a
//! [`MemoryBalanceStore`] on open; queries never touch the disk.
//!
//! Only the final line may be unterminated. If it parses it is kept and
//! terminated, otherwise it is a torn append and is cut off. A failed
//! `save` truncates the file back to its length before the write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use log::{debug, error, info, warn};
use tally_core::StoredBalanceRow;
use tally_ports::{BalanceStore, BucketSize, Clock, StoreError, StoreResult};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::memory::MemoryBalanceStore;

pub struct FileBalanceStore {
    path: PathBuf,
    /// Serializes appends so concurrent saves never interleave lines
    file: Mutex<File>,
    index: MemoryBalanceStore,
}

impl FileBalanceStore {
    /// Open (or create) the store at `path`, replaying existing rows
    ///
    /// A terminated line that does not parse fails the open with its
    /// 1-based number.
    pub async fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let index = MemoryBalanceStore::new(clock);

        let replayed = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let replayed = replay(&content)?;
                index.insert(&replayed.rows);
                info!(
                    "[STORE] Replayed {} rows from {}",
                    replayed.rows.len(),
                    path.display()
                );
                Some(replayed)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("[STORE] Creating {}", path.display());
                None
            }
            Err(e) => return Err(e.into()),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if let Some(replayed) = replayed {
            if let Some(len) = replayed.truncate_to {
                file.set_len(len).await?;
            }
            if replayed.unterminated {
                file.write_all(b"\n").await?;
                file.flush().await?;
            }
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
            index,
        })
    }
}

/// Rows recovered from an existing file, plus the repair it needs
#[derive(Debug)]
struct Replay {
    rows: Vec<StoredBalanceRow>,
    /// Cut the file to this many bytes (drops a torn final line)
    truncate_to: Option<u64>,
    /// The last kept row has no trailing newline
    unterminated: bool,
}

fn replay(content: &str) -> StoreResult<Replay> {
    let complete_len = content.rfind('\n').map_or(0, |i| i + 1);
    let (complete, tail) = content.split_at(complete_len);
    let mut rows = parse_lines(complete)?;

    if tail.trim().is_empty() {
        return Ok(Replay {
            rows,
            truncate_to: (!tail.is_empty()).then_some(complete_len as u64),
            unterminated: false,
        });
    }

    match serde_json::from_str(tail) {
        Ok(row) => {
            rows.push(row);
            Ok(Replay {
                rows,
                truncate_to: None,
                unterminated: true,
            })
        }
        Err(e) => {
            warn!(
                "[STORE] Dropping torn final line {}: {}",
                complete.lines().count() + 1,
                e
            );
            Ok(Replay {
                rows,
                truncate_to: Some(complete_len as u64),
                unterminated: false,
            })
        }
    }
}

fn parse_lines(content: &str) -> StoreResult<Vec<StoredBalanceRow>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

async fn append(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

fn encode_lines(rows: &[StoredBalanceRow]) -> StoreResult<String> {
    let mut buf = String::new();
    for row in rows {
        let line =
            serde_json::to_string(row).map_err(|e| StoreError::Serialization(e.to_string()))?;
        buf.push_str(&line);
        buf.push('\n');
    }
    Ok(buf)
}

#[async_trait]
impl BalanceStore for FileBalanceStore {
    async fn save(&self, rows: &[StoredBalanceRow]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let buf = encode_lines(rows)?;

        let mut file = self.file.lock().await;
        let len_before = file.metadata().await?.len();
        if let Err(e) = append(&mut file, buf.as_bytes()).await {
            // Never leave part of a batch behind
            if let Err(rollback) = file.set_len(len_before).await {
                error!(
                    "[STORE] Could not roll back {} to {} bytes: {}",
                    self.path.display(),
                    len_before,
                    rollback
                );
            }
            return Err(e.into());
        }
        // Index only what reached the file
        self.index.insert(rows);

        debug!("[STORE] Appended {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    async fn fetch_window(
        &self,
        currency: &str,
        back: Duration,
    ) -> StoreResult<Vec<StoredBalanceRow>> {
        self.index.fetch_window(currency, back).await
    }

    async fn fetch_bucketed(
        &self,
        currency: &str,
        back: Duration,
        bucket: BucketSize,
    ) -> StoreResult<Vec<StoredBalanceRow>> {
        self.index.fetch_bucketed(currency, back, bucket).await
    }

    async fn fetch_all(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>> {
        self.index.fetch_all(currency).await
    }

    async fn active_currencies(&self) -> StoreResult<Vec<StoredBalanceRow>> {
        self.index.active_currencies().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn row(currency: &str) -> StoredBalanceRow {
        StoredBalanceRow {
            exchange: "bittrex".to_string(),
            currency: currency.to_string(),
            amount: dec!(1000),
            base_unit_amount: dec!(1000),
            base_unit_rate: dec!(1),
            stable_unit_amount: dec!(7.69),
            time: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_encode_then_parse() {
        let rows = vec![row("total"), row("BTC")];
        let encoded = encode_lines(&rows).unwrap();
        assert_eq!(encoded.lines().count(), 2);
        assert_eq!(parse_lines(&encoded).unwrap(), rows);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let encoded = encode_lines(&[row("BTC")]).unwrap();
        let content = format!("\n{}\n\n", encoded);
        assert_eq!(parse_lines(&content).unwrap().len(), 1);
    }

    #[test]
    fn test_replay_keeps_unterminated_row() {
        let encoded = encode_lines(&[row("total"), row("BTC")]).unwrap();
        let replayed = replay(encoded.trim_end()).unwrap();
        assert_eq!(replayed.rows.len(), 2);
        assert_eq!(replayed.truncate_to, None);
        assert!(replayed.unterminated);
    }

    #[test]
    fn test_replay_cuts_torn_final_line() {
        let encoded = encode_lines(&[row("BTC")]).unwrap();
        let content = format!("{}{{\"exchange\":\"bitt", encoded);
        let replayed = replay(&content).unwrap();
        assert_eq!(replayed.rows.len(), 1);
        assert_eq!(replayed.truncate_to, Some(encoded.len() as u64));
        assert!(!replayed.unterminated);
    }

    #[test]
    fn test_replay_clean_file_needs_no_repair() {
        let encoded = encode_lines(&[row("BTC")]).unwrap();
        let replayed = replay(&encoded).unwrap();
        assert_eq!(replayed.rows.len(), 1);
        assert_eq!(replayed.truncate_to, None);
        assert!(!replayed.unterminated);

        let empty = replay("").unwrap();
        assert!(empty.rows.is_empty());
        assert_eq!(empty.truncate_to, None);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_file_and_index_untouched() {
        let path = std::env::temp_dir().join(format!(
            "tally-storage-{}-failed-save.jsonl",
            std::process::id()
        ));
        let encoded = encode_lines(&[row("BTC")]).unwrap();
        std::fs::write(&path, &encoded).unwrap();

        // A read-only handle makes every append fail
        let index = MemoryBalanceStore::new(Arc::new(tally_clock::ManualClock::frozen_now()));
        let store = FileBalanceStore {
            path: path.clone(),
            file: Mutex::new(OpenOptions::new().read(true).open(&path).await.unwrap()),
            index,
        };

        assert!(matches!(
            store.save(&[row("CUR1")]).await,
            Err(StoreError::Io(_))
        ));
        assert!(store.fetch_all("CUR1").await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), encoded);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_line_reports_position() {
        let encoded = encode_lines(&[row("BTC")]).unwrap();
        let content = format!("{}{{\"currency\": 3\n", encoded);
        match parse_lines(&content) {
            Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt line, got {:?}", other),
        }
    }
}
