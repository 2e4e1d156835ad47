use super::LearnerStore;
use crate::edit_log::EditLog;
use crate::error::KaResult;
use crate::geometry::HitboxSet;
use crate::stats::KeyStatSet;
use crate::KeyboardHash;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const KEY_STATS_DIR: &str = "key_stats";
const HITBOXES_DIR: &str = "hitboxes";
const PENDING_DIR: &str = "pending";
const LOG_PREFIX: &str = "log-";
const LOG_SUFFIX: &str = ".json";

/// Directory-backed store, one JSON document per record:
///
/// ```text
/// <root>/key_stats/<hash>.json
/// <root>/hitboxes/<hash>.json
/// <root>/pending/log-<seq>.json
/// ```
///
/// Every write goes through a temp file in the target directory and is
/// renamed into place, so readers never observe a half-written record.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn open<P: AsRef<Path>>(root: P) -> KaResult<Self> {
        let root = root.as_ref().to_path_buf();
        for dir in [KEY_STATS_DIR, HITBOXES_DIR, PENDING_DIR] {
            fs::create_dir_all(root.join(dir))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, dir: &str, keyboard_hash: KeyboardHash) -> PathBuf {
        self.root.join(dir).join(format!("{}.json", keyboard_hash))
    }

    fn pending_files(&self) -> KaResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(self.root.join(PENDING_DIR))? {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_SUFFIX))
                .unwrap_or(false);
            if is_log {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn next_log_seq(&self) -> KaResult<u64> {
        let last = self.pending_files()?.iter().filter_map(|p| log_seq(p)).max();
        Ok(last.map(|s| s + 1).unwrap_or(0))
    }
}

fn log_seq(path: &Path) -> Option<u64> {
    path.file_name()?
        .to_str()?
        .strip_prefix(LOG_PREFIX)?
        .strip_suffix(LOG_SUFFIX)?
        .parse()
        .ok()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> KaResult<Option<T>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(Some(value))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> KaResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let temp_file = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    Ok(())
}

impl LearnerStore for JsonStore {
    fn load_key_stat_set(&self, keyboard_hash: KeyboardHash) -> KaResult<KeyStatSet> {
        let path = self.record_path(KEY_STATS_DIR, keyboard_hash);
        Ok(read_json(&path)?.unwrap_or_else(|| KeyStatSet::new(keyboard_hash)))
    }

    fn save_key_stat_set(&mut self, stats: &KeyStatSet) -> KaResult<()> {
        let path = self.record_path(KEY_STATS_DIR, stats.keyboard_hash());
        write_json_atomic(&path, stats)
    }

    fn load_hitbox_set(&self, keyboard_hash: KeyboardHash) -> KaResult<Option<HitboxSet>> {
        read_json(&self.record_path(HITBOXES_DIR, keyboard_hash))
    }

    fn save_hitbox_set(&mut self, hitboxes: &HitboxSet) -> KaResult<()> {
        let path = self.record_path(HITBOXES_DIR, hitboxes.keyboard_hash());
        write_json_atomic(&path, hitboxes)
    }

    /// Reads every queued log before removing any file. A file that cannot be
    /// removed is logged and left behind; the logs already read are returned.
    fn drain_pending_logs(&mut self) -> KaResult<Vec<EditLog>> {
        let files = self.pending_files()?;
        let mut logs = Vec::with_capacity(files.len());

        for path in &files {
            match read_json::<EditLog>(path) {
                Ok(Some(log)) => logs.push(log),
                Ok(None) => {}
                Err(e) => warn!("Dropping unreadable log {}: {}", path.display(), e),
            }
        }

        for path in &files {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove drained log {}: {}", path.display(), e);
            }
        }

        debug!("Drained {} pending logs from {}", logs.len(), self.root.display());
        Ok(logs)
    }

    fn enqueue_log(&mut self, log: &EditLog) -> KaResult<()> {
        let seq = self.next_log_seq()?;
        let path = self
            .root
            .join(PENDING_DIR)
            .join(format!("{}{:010}{}", LOG_PREFIX, seq, LOG_SUFFIX));
        write_json_atomic(&path, log)
    }
}
