//! 프로세스 내 스토어와 인덱스

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::error::{IndexError, StoreError};
use crate::store::{SearchIndex, VulnerabilityStore};
use crate::types::{AffectedSoftware, VulnerabilityRecord};

/// 메모리 기반 취약점 스토어
///
/// 저장된 레코드와 병합 호출 기록을 조회할 수 있습니다.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<String, VulnerabilityRecord>>,
    merges: Mutex<Vec<(String, AffectedSoftware)>>,
}

impl MemoryStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// ID로 저장된 레코드를 조회합니다.
    pub fn get(&self, id: &str) -> Option<VulnerabilityRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    /// 저장된 레코드 수
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// 저장된 레코드가 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 저장된 모든 레코드 (ID 오름차순)
    pub fn records(&self) -> Vec<VulnerabilityRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// `merge_historical_range` 호출 기록 (호출 순서)
    pub fn merges(&self) -> Vec<(String, AffectedSoftware)> {
        self.merges.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl VulnerabilityStore for MemoryStore {
    fn merge_historical_range(
        &self,
        cve_id: &str,
        software: &AffectedSoftware,
    ) -> Result<(), StoreError> {
        self.merges
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((cve_id.to_owned(), software.clone()));
        Ok(())
    }

    fn persist(&self, record: &VulnerabilityRecord) -> Result<(), StoreError> {
        if record.id.is_empty() {
            return Err(StoreError::Rejected {
                id: String::new(),
                reason: "empty vulnerability id".to_owned(),
            });
        }
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id.clone(), record.clone());
        Ok(())
    }
}

/// 인덱스 항목 -- 검색 인덱스가 질의하는 (vendor, product) 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// 원본 CPE 문자열
    pub cpe: String,
    /// 벤더 (정규화됨)
    pub vendor: String,
    /// 제품 (정규화됨)
    pub product: String,
    /// upsert 호출 횟수
    pub upserts: u64,
}

/// 메모리 기반 검색 인덱스
#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: Mutex<BTreeMap<String, IndexEntry>>,
}

impl MemoryIndex {
    /// 빈 인덱스를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 인덱스 항목 수 (고유 CPE 기준)
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// 인덱스가 비었는지 여부
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// CPE로 인덱스 항목을 조회합니다.
    pub fn get(&self, cpe: &str) -> Option<IndexEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(cpe)
            .cloned()
    }

    /// CPE에 대한 upsert 호출 횟수 (없으면 0)
    pub fn upsert_count(&self, cpe: &str) -> u64 {
        self.get(cpe).map(|entry| entry.upserts).unwrap_or(0)
    }

    /// 전체 인덱스 항목 (CPE 오름차순)
    pub fn entries(&self) -> Vec<IndexEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    /// 인덱스 내용을 JSON 배열로 파일에 기록합니다.
    pub fn save_to(&self, path: &Path) -> Result<(), IndexError> {
        let entries = self.entries();
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &entries)?;
        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            "cpe index saved"
        );
        Ok(())
    }
}

impl SearchIndex for MemoryIndex {
    fn upsert_identifier(&self, software: &AffectedSoftware) -> Result<(), IndexError> {
        let uri = software
            .parse_cpe()
            .map_err(|e| IndexError::InvalidIdentifier {
                identifier: software.cpe.clone(),
                reason: e.to_string(),
            })?;
        let (vendor, product) = uri.index_key();

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(software.cpe.clone())
            .and_modify(|entry| entry.upserts += 1)
            .or_insert_with(|| IndexEntry {
                cpe: software.cpe.clone(),
                vendor,
                product,
                upserts: 1,
            });
        Ok(())
    }
}
