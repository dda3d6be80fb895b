//! Append-only JSON-lines audit store
//!
//! Each record is written as a single JSON line and flushed immediately.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::audit::{AuditRecord, NewAuditRecord};
use crate::error::{AuditError, AuditResult};
use crate::models::AuditRecordId;

use super::AuditStore;

/// Writes audit records to a line-delimited JSON file
pub struct JsonlStore {
    log_path: PathBuf,
    // Serializes appends from concurrent handlers so lines never interleave
    write_lock: Mutex<()>,
}

impl JsonlStore {
    /// Create a store that appends to the given path
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Read every record back, oldest first
    pub fn read_all(&self) -> AuditResult<Vec<AuditRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| AuditError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                AuditError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let record: AuditRecord = serde_json::from_str(&line).map_err(|e| {
                AuditError::Json(format!(
                    "Failed to parse audit record at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            records.push(record);
        }

        Ok(records)
    }

    /// Get the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn append_line(&self, line: &str) -> AuditResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AuditError::WriteFailure(format!("Audit log lock poisoned: {}", e)))?;

        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuditError::WriteFailure(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| AuditError::WriteFailure(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", line)
            .map_err(|e| AuditError::WriteFailure(format!("Failed to write audit record: {}", e)))?;

        file.flush()
            .map_err(|e| AuditError::WriteFailure(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }
}

impl AuditStore for JsonlStore {
    fn append(&self, record: NewAuditRecord) -> AuditResult<AuditRecord> {
        let record = record.into_record(AuditRecordId::new());

        let json = serde_json::to_string(&record).map_err(|e| {
            AuditError::WriteFailure(format!("Failed to serialize audit record: {}", e))
        })?;

        self.append_line(&json)?;
        Ok(record)
    }
}
