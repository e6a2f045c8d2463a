//! 이력 버전 인덱스
//!
//! 피드의 평탄한 CPE 문자열로는 표현되지 않는 취약 버전 범위를 별도 분석으로
//! 미리 계산해 둔 읽기 전용 스냅샷입니다. 커밋 시점에 엔트리마다 한 번 조회됩니다.
//!
//! # 파일 형식
//!
//! ```json
//! {
//!   "CVE-2013-0001": [
//!     { "cpe": "cpe:/a:vendor:product:2.0", "previous_version": "2.0" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::error::FeedError;
use crate::types::AffectedSoftware;

/// 취약점 ID → 이전에 기록된 영향 소프트웨어 목록
#[derive(Debug, Clone, Default)]
pub struct HistoricalVersionIndex {
    entries: HashMap<String, Vec<AffectedSoftware>>,
}

impl HistoricalVersionIndex {
    /// 빈 인덱스를 생성합니다.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `(취약점 ID, 목록)` 쌍에서 인덱스를 생성합니다.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<AffectedSoftware>)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(id, list)| (id.into(), list))
                .collect(),
        }
    }

    /// JSON 문자열에서 인덱스를 파싱합니다.
    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        let entries: HashMap<String, Vec<AffectedSoftware>> =
            serde_json::from_str(json).map_err(|e| FeedError::HistoryParse(e.to_string()))?;
        Ok(Self { entries })
    }

    /// 파일에서 인덱스를 읽어옵니다.
    ///
    /// 파일 크기가 `max_size`를 넘으면 읽기 전에 거부합니다.
    pub fn load_from_file(path: &Path, max_size: u64) -> Result<Self, FeedError> {
        let shown = path.display().to_string();

        let metadata = std::fs::metadata(path).map_err(|e| FeedError::HistoryLoad {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

        if metadata.len() > max_size {
            return Err(FeedError::HistoryLoad {
                path: shown,
                reason: format!(
                    "file size {} exceeds maximum {}",
                    metadata.len(),
                    max_size
                ),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| FeedError::HistoryLoad {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

        let index = Self::from_json(&content)?;
        tracing::info!(
            path = %shown,
            vulnerabilities = index.len(),
            "historical version index loaded"
        );
        Ok(index)
    }

    /// 취약점 ID로 이력 항목을 조회합니다. 없으면 빈 슬라이스입니다.
    pub fn lookup(&self, cve_id: &str) -> &[AffectedSoftware] {
        self.entries.get(cve_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 인덱스에 담긴 취약점 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 인덱스가 비었는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
