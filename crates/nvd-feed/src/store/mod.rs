//! 외부 협력자 -- 취약점 레코드 스토어와 소프트웨어 식별자 검색 인덱스
//!
//! 커밋 파이프라인은 두 trait만 알고 있으며 실제 저장 형식은 모릅니다.
//! 모든 메서드는 피드를 읽는 스레드에서 동기적으로 호출되므로, 느린 쓰기는 곧
//! 피드 소비 속도를 늦춥니다.
//!
//! # 구현
//!
//! - [`MemoryStore`], [`MemoryIndex`] -- 프로세스 내 맵 (테스트, 색인 덤프)
//! - [`JsonLinesStore`] -- 레코드 하나를 JSON 한 줄로 추가 기록

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonLinesStore;
pub use memory::{IndexEntry, MemoryIndex, MemoryStore};

use crate::error::{IndexError, StoreError};
use crate::types::{AffectedSoftware, VulnerabilityRecord};

/// 취약점 레코드 스토어
///
/// 각 호출은 스토어 입장에서 원자적이어야 합니다. 호출 사이의 트랜잭션은
/// 보장하지 않습니다.
pub trait VulnerabilityStore: Send + Sync {
    /// 이력 인덱스의 버전 범위를 해당 취약점에 병합합니다.
    fn merge_historical_range(
        &self,
        cve_id: &str,
        software: &AffectedSoftware,
    ) -> Result<(), StoreError>;

    /// 완성된 레코드를 저장합니다. 같은 ID의 기존 레코드는 덮어씁니다.
    fn persist(&self, record: &VulnerabilityRecord) -> Result<(), StoreError>;
}

/// 소프트웨어 식별자 검색 인덱스
pub trait SearchIndex: Send + Sync {
    /// 식별자의 인덱스 항목을 기록하거나 갱신합니다.
    fn upsert_identifier(&self, software: &AffectedSoftware) -> Result<(), IndexError>;
}
