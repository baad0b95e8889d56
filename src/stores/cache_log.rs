use crate::models::assignment::WellKnownGame;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One mutation of the assignment id cache, persisted as a JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CacheOperation {
    Set {
        scope: String,
        game: WellKnownGame,
        assignment_id: String,
    },
    /// Both well-known slots of a scope replaced in one record
    Replace {
        scope: String,
        entries: BTreeMap<String, String>,
    },
    Clear {
        scope: String,
    },
}

/// Append-only operation log, replayed on startup and compacted into a
/// snapshot afterwards.
pub struct CacheLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl CacheLog {
    pub fn open(path: PathBuf) -> Result<Self> {
        let file = open_append(&path)?;

        Ok(CacheLog {
            file: Mutex::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, op: &CacheOperation) -> Result<()> {
        let line = serde_json::to_string(op).context("Failed to encode cache operation")?;
        let mut file = self.file.lock().map_err(|_| anyhow!("Cache log lock poisoned"))?;
        writeln!(file, "{}", line).context("Failed to write to cache log")?;
        file.flush().context("Failed to flush cache log")?;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<CacheOperation>> {
        let file = File::open(&self.path).context("Failed to open cache log for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from cache log")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<CacheOperation>(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse cache log line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }

    /// Replace the log contents with `snapshot`. The new contents are written
    /// to a sibling file and renamed over the log, so a crash leaves either
    /// the old or the new log.
    pub fn rewrite(&self, snapshot: &[CacheOperation]) -> Result<()> {
        let mut file = self.file.lock().map_err(|_| anyhow!("Cache log lock poisoned"))?;

        let tmp_path = self.path.with_extension("compact");
        {
            let mut tmp = File::create(&tmp_path).context("Failed to create compacted cache log")?;
            for op in snapshot {
                let line = serde_json::to_string(op).context("Failed to encode cache operation")?;
                writeln!(tmp, "{}", line).context("Failed to write compacted cache log")?;
            }
            tmp.sync_all().context("Failed to sync compacted cache log")?;
        }

        fs::rename(&tmp_path, &self.path).context("Failed to replace cache log")?;
        *file = open_append(&self.path)?;
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open cache log file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(scope: &str, game: WellKnownGame, id: &str) -> CacheOperation {
        CacheOperation::Set {
            scope: scope.to_string(),
            game,
            assignment_id: id.to_string(),
        }
    }

    #[test]
    fn test_operation_line_format() {
        let line = serde_json::to_string(&set("u1", WellKnownGame::GameJump, "a1")).unwrap();
        assert_eq!(line, r#"{"op":"set","scope":"u1","game":"GameJump","assignment_id":"a1"}"#);
    }

    #[test]
    fn test_append_and_replay() {
        let temp_dir = TempDir::new().unwrap();
        let log = CacheLog::open(temp_dir.path().join("cache.log")).unwrap();

        let mut entries = BTreeMap::new();
        entries.insert("QJ_1-1".to_string(), "a2".to_string());

        log.append(&set("u1", WellKnownGame::GameJump, "a1")).unwrap();
        log.append(&CacheOperation::Replace {
            scope: "u1".to_string(),
            entries: entries.clone(),
        })
        .unwrap();
        log.append(&CacheOperation::Clear { scope: "u2".to_string() }).unwrap();

        let operations = log.replay().unwrap();
        assert_eq!(operations.len(), 3);
        assert_eq!(operations[0], set("u1", WellKnownGame::GameJump, "a1"));
        assert_eq!(
            operations[1],
            CacheOperation::Replace {
                scope: "u1".to_string(),
                entries
            }
        );
    }

    #[test]
    fn test_replay_skips_invalid_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.log");
        fs::write(
            &path,
            "garbage\n{\"op\":\"clear\",\"scope\":\"u1\"}\n{\"op\":\"set\",\"scope\":\"u1\"}\n",
        )
        .unwrap();

        let log = CacheLog::open(path).unwrap();
        let operations = log.replay().unwrap();
        assert_eq!(operations, vec![CacheOperation::Clear { scope: "u1".to_string() }]);
    }

    #[test]
    fn test_rewrite_then_append() {
        let temp_dir = TempDir::new().unwrap();
        let log = CacheLog::open(temp_dir.path().join("cache.log")).unwrap();

        for i in 0..5 {
            log.append(&set("u1", WellKnownGame::GameJump, &format!("a{}", i))).unwrap();
        }

        log.rewrite(&[set("u1", WellKnownGame::GameJump, "a4")]).unwrap();
        log.append(&set("u1", WellKnownGame::RioSplash, "b1")).unwrap();

        let operations = log.replay().unwrap();
        assert_eq!(
            operations,
            vec![
                set("u1", WellKnownGame::GameJump, "a4"),
                set("u1", WellKnownGame::RioSplash, "b1"),
            ]
        );
    }
}
