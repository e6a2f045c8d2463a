//! JSON Lines 파일 스토어
//!
//! 저장되는 레코드마다 JSON 한 줄을 파일 끝에 추가합니다. 같은 ID가 여러 번
//! 기록되면 마지막 줄이 유효한 값입니다 ([`JsonLinesStore::read_latest`]).
//!
//! 병합된 이력 범위는 레코드의 `affected_software`에 이미 반영되어 저장되므로
//! `merge_historical_range`는 병합 횟수만 집계합니다.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StoreError;
use crate::store::VulnerabilityStore;
use crate::types::{AffectedSoftware, VulnerabilityRecord};

/// JSON Lines 파일 스토어
pub struct JsonLinesStore {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    written: AtomicU64,
    merged: AtomicU64,
}

impl JsonLinesStore {
    /// 파일을 추가 모드로 열거나 새로 만듭니다.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!(path = %path.display(), "jsonl store opened");

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            written: AtomicU64::new(0),
            merged: AtomicU64::new(0),
        })
    }

    /// 스토어 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 이번 실행에서 기록한 레코드 수
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// 이번 실행에서 병합한 이력 범위 수
    pub fn merged(&self) -> u64 {
        self.merged.load(Ordering::Relaxed)
    }

    /// 버퍼에 남은 내용을 파일로 내보냅니다.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .flush()?;
        Ok(())
    }

    /// 파일을 읽어 ID별 마지막 레코드를 반환합니다.
    pub fn read_latest(path: &Path) -> Result<BTreeMap<String, VulnerabilityRecord>, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut latest = BTreeMap::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: VulnerabilityRecord = serde_json::from_str(&line)?;
            latest.insert(record.id.clone(), record);
        }

        Ok(latest)
    }
}

impl VulnerabilityStore for JsonLinesStore {
    fn merge_historical_range(
        &self,
        cve_id: &str,
        software: &AffectedSoftware,
    ) -> Result<(), StoreError> {
        self.merged.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            cve_id,
            cpe = %software.cpe,
            previous_version = software.previous_version.as_deref().unwrap_or("-"),
            "historical range merged"
        );
        Ok(())
    }

    fn persist(&self, record: &VulnerabilityRecord) -> Result<(), StoreError> {
        if record.id.is_empty() {
            return Err(StoreError::Rejected {
                id: String::new(),
                reason: "empty vulnerability id".to_owned(),
            });
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(&line)?;
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Drop for JsonLinesStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "jsonl store flush on drop failed");
        }
    }
}
