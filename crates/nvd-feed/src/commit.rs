//! 커밋 파이프라인 -- 완성된 엔트리를 외부 협력자에 기록
//!
//! 엔트리가 닫힐 때 동기적으로 호출되며, 다음 순서로 진행합니다.
//!
//! ```text
//! record ──> (store 없음?) ──> no-op
//!   │
//!   ├─ 1. HistoricalVersionIndex 조회 → store.merge_historical_range → record 갱신
//!   ├─ 2. index.upsert_identifier (원본 + 병합된 모든 식별자)
//!   └─ 3. store.persist (같은 ID 덮어쓰기)
//! ```
//!
//! 어느 단계든 실패하면 그 자리에서 [`CommitError`]로 중단합니다.
//! 2-3단계는 트랜잭션이 아니므로 앞서 성공한 쓰기는 그대로 남습니다.

use std::sync::Arc;
use std::time::Instant;

use vulnfeed_core::metrics as m;

use crate::error::CommitError;
use crate::history::HistoricalVersionIndex;
use crate::store::{SearchIndex, VulnerabilityStore};
use crate::types::VulnerabilityRecord;

/// 한 엔트리 커밋의 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// 이력 인덱스에서 병합된 식별자 수
    pub merged: usize,
    /// 검색 인덱스에 기록된 식별자 수
    pub indexed: usize,
    /// 스토어에 저장되었는지 여부 (store가 없으면 false)
    pub persisted: bool,
}

/// 스트림 전체의 커밋 누계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CommitTotals {
    /// 저장된 레코드 수
    pub persisted: u64,
    /// 병합된 이력 식별자 수
    pub merged: u64,
    /// 인덱스에 기록된 식별자 수
    pub indexed: u64,
}

impl CommitTotals {
    /// 커밋 결과 하나를 더합니다.
    pub fn add(&mut self, outcome: &CommitOutcome) {
        self.persisted += u64::from(outcome.persisted);
        self.merged += outcome.merged as u64;
        self.indexed += outcome.indexed as u64;
    }
}

/// 커밋 파이프라인
///
/// 스토어와 인덱스는 선택 사항입니다. 스토어가 없으면 인덱스가 있어도
/// 아무것도 기록하지 않습니다 (dry-run).
#[derive(Clone)]
pub struct CommitPipeline {
    store: Option<Arc<dyn VulnerabilityStore>>,
    index: Option<Arc<dyn SearchIndex>>,
    history: Arc<HistoricalVersionIndex>,
}

impl CommitPipeline {
    /// 아무 협력자도 없는 파이프라인 (모든 커밋이 no-op)
    pub fn dry_run() -> Self {
        CommitPipelineBuilder::new().build()
    }

    /// 빌더를 생성합니다.
    pub fn builder() -> CommitPipelineBuilder {
        CommitPipelineBuilder::new()
    }

    /// 스토어가 설정되어 있는지 여부
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// 검색 인덱스가 설정되어 있는지 여부
    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// 레코드 하나를 커밋합니다.
    pub fn commit(&self, mut record: VulnerabilityRecord) -> Result<CommitOutcome, CommitError> {
        let Some(store) = self.store.as_deref() else {
            tracing::trace!(cve_id = %record.id, "no store configured, commit skipped");
            return Ok(CommitOutcome::default());
        };

        let started = Instant::now();
        let result = self.commit_into(store, &mut record);
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(outcome) => {
                metrics::histogram!(m::NVD_COMMIT_DURATION_SECONDS, m::LABEL_RESULT => "success")
                    .record(elapsed);
                tracing::debug!(
                    cve_id = %record.id,
                    merged = outcome.merged,
                    indexed = outcome.indexed,
                    affected = record.affected_software_count(),
                    severity = ?record.severity(),
                    "entry committed"
                );
            }
            Err(e) => {
                metrics::histogram!(m::NVD_COMMIT_DURATION_SECONDS, m::LABEL_RESULT => "failure")
                    .record(elapsed);
                metrics::counter!(m::NVD_COMMIT_FAILURES_TOTAL, m::LABEL_STAGE => e.stage())
                    .increment(1);
                tracing::error!(cve_id = %record.id, stage = e.stage(), error = %e, "entry commit failed");
            }
        }

        result
    }

    fn commit_into(
        &self,
        store: &dyn VulnerabilityStore,
        record: &mut VulnerabilityRecord,
    ) -> Result<CommitOutcome, CommitError> {
        let mut outcome = CommitOutcome::default();

        for software in self.history.lookup(&record.id) {
            store
                .merge_historical_range(&record.id, software)
                .map_err(|source| CommitError::Merge {
                    cpe: software.cpe.clone(),
                    source,
                })?;
            record.update_affected_software(software.clone());
            outcome.merged += 1;
        }
        if outcome.merged > 0 {
            metrics::counter!(m::NVD_HISTORICAL_MERGES_TOTAL).increment(outcome.merged as u64);
        }

        if let Some(index) = self.index.as_deref() {
            for software in record.affected_software() {
                index
                    .upsert_identifier(software)
                    .map_err(|source| CommitError::Index {
                        cpe: software.cpe.clone(),
                        source,
                    })?;
                outcome.indexed += 1;
            }
        }

        store.persist(record).map_err(CommitError::Persist)?;
        outcome.persisted = true;

        Ok(outcome)
    }
}

impl std::fmt::Debug for CommitPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitPipeline")
            .field("store", &self.store.is_some())
            .field("index", &self.index.is_some())
            .field("history", &self.history.len())
            .finish()
    }
}

/// [`CommitPipeline`] 빌더
#[derive(Default)]
pub struct CommitPipelineBuilder {
    store: Option<Arc<dyn VulnerabilityStore>>,
    index: Option<Arc<dyn SearchIndex>>,
    history: Option<Arc<HistoricalVersionIndex>>,
}

impl CommitPipelineBuilder {
    /// 빈 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 취약점 스토어를 설정합니다.
    pub fn store(mut self, store: Arc<dyn VulnerabilityStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 검색 인덱스를 설정합니다.
    pub fn index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// 이력 버전 인덱스를 설정합니다.
    pub fn history(mut self, history: Arc<HistoricalVersionIndex>) -> Self {
        self.history = Some(history);
        self
    }

    /// 파이프라인을 빌드합니다.
    pub fn build(self) -> CommitPipeline {
        CommitPipeline {
            store: self.store,
            index: self.index,
            history: self
                .history
                .unwrap_or_else(|| Arc::new(HistoricalVersionIndex::empty())),
        }
    }
}
