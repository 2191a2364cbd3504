// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Append-only history of rule enable/disable changes.
//!
//! One JSON object per line. Entries are never edited or deleted; the
//! repository writes them and compliance tooling replays them with
//! [`read_history`].

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use astrolabe_observability::failure_tags;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AuditError;

/// One operator change to one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    /// Identity of the caller, e.g. the originating UI action tag
    pub source: String,
    pub rule_id: String,
    pub old_enabled: bool,
    pub new_enabled: bool,
}

/// Durable destination for audit entries.
///
/// `append` returns only after the entry is durable, or fails having
/// recorded nothing.
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Line-delimited JSON audit log on the local filesystem.
pub struct JsonlAuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditLog {
    /// Open (creating if needed) the log at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let io_error = |source: std::io::Error| AuditError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut line =
            serde_json::to_string(entry).map_err(|e| AuditError::Serialize(e.to_string()))?;
        line.push('\n');

        let mut file = self.file.lock();
        let io_error = |source: std::io::Error| AuditError::Io {
            path: self.path.clone(),
            source,
        };
        let length_before = file.metadata().map_err(io_error)?.len();

        if let Err(err) = file.write_all(line.as_bytes()) {
            error!(
                target: "astrolabe-incident-rules",
                "{} Appending audit entry for rule '{}' to {} failed: {}",
                failure_tags::AUDIT_WRITE_FAILED,
                entry.rule_id,
                self.path.display(),
                err
            );
            truncate_to(&file, length_before, &self.path);
            return Err(io_error(err));
        }
        if let Err(err) = file.sync_data() {
            error!(
                target: "astrolabe-incident-rules",
                "{} Syncing audit entry for rule '{}' to {} failed: {}",
                failure_tags::AUDIT_FLUSH_FAILED,
                entry.rule_id,
                self.path.display(),
                err
            );
            truncate_to(&file, length_before, &self.path);
            return Err(io_error(err));
        }
        Ok(())
    }
}

/// Remove a partially written entry so the log only holds committed changes.
fn truncate_to(file: &File, length: u64, path: &Path) {
    if let Err(err) = file.set_len(length) {
        error!(
            target: "astrolabe-incident-rules",
            "{} Could not remove partial audit entry from {}: {}",
            failure_tags::AUDIT_WRITE_FAILED,
            path.display(),
            err
        );
    }
}

/// Replay the full history at `path`, oldest first. A missing log is empty.
pub fn read_history(path: impl AsRef<Path>) -> Result<Vec<AuditEntry>, AuditError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(AuditError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut entries = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| AuditError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|e| AuditError::Corrupt {
            line: index + 1,
            reason: e.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
