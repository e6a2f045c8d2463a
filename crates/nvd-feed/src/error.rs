//! NVD 피드 에러 타입
//!
//! [`FeedError`]는 피드 수집 중 발생할 수 있는 모든 치명적 에러를 나타냅니다.
//! `From<FeedError> for VulnFeedError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **스키마**: `SchemaVersion` (루트에서 한 번 검출, 엔트리 처리 전 중단)
//! - **커밋**: `Commit` ([`CommitError`] 래핑, 남은 스트림 중단)
//! - **토크나이저**: `Xml`
//! - **이력 인덱스**: `HistoryLoad`, `HistoryParse`
//! - **결과 기록**: `Output`
//! - **설정**: `Config`
//! - **파일 I/O**: `Io`
//!
//! [`NumericParseError`]는 치명적이지 않습니다. 점수 필드만 건너뛰고 로그로 남깁니다.

use vulnfeed_core::error::{IngestError, VulnFeedError};

/// 피드 수집 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// 루트 노드의 스키마 버전 불일치
    #[error("unsupported schema version: found {found}, expected {expected}")]
    SchemaVersion {
        /// 문서에 선언된 버전 (속성이 없으면 "absent")
        found: String,
        /// 지원하는 버전
        expected: &'static str,
    },

    /// 엔트리 커밋 실패
    #[error("commit failed for {cve_id}: {source}")]
    Commit {
        /// 커밋 중이던 취약점 ID
        cve_id: String,
        /// 원인
        #[source]
        source: CommitError,
    },

    /// XML 토크나이저 에러
    #[error("xml error at byte {position}: {reason}")]
    Xml {
        /// 에러 발생 위치 (바이트 오프셋)
        position: u64,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 이력 버전 인덱스 로딩 실패
    #[error("history index load error: {path}: {reason}")]
    HistoryLoad {
        /// 인덱스 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 이력 버전 인덱스 파싱 실패
    #[error("history index parse error: {0}")]
    HistoryParse(String),

    /// 수집 결과(스토어 flush, 인덱스 덤프) 기록 실패
    #[error("output error: {path}: {reason}")]
    Output {
        /// 출력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

/// 커밋 파이프라인 에러
///
/// 어느 단계에서 실패했는지와 협력자(collaborator)의 원인 에러를 보존합니다.
/// 커밋은 트랜잭션이 아니므로 실패 시점까지의 쓰기는 롤백되지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// 이력 버전 범위 병합 실패
    #[error("historical range merge failed for {cpe}: {source}")]
    Merge {
        /// 병합 중이던 CPE
        cpe: String,
        /// 원인
        #[source]
        source: StoreError,
    },

    /// 검색 인덱스 기록 실패
    #[error("index upsert failed for {cpe}: {source}")]
    Index {
        /// 기록 중이던 CPE
        cpe: String,
        /// 원인
        #[source]
        source: IndexError,
    },

    /// 레코드 저장 실패
    #[error("persist failed: {0}")]
    Persist(#[source] StoreError),
}

impl CommitError {
    /// 실패 단계 이름 (메트릭 레이블용)
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Merge { .. } => "merge",
            Self::Index { .. } => "index",
            Self::Persist(_) => "persist",
        }
    }
}

/// 소프트웨어 식별자 검색 인덱스 에러
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// 인덱스가 해석할 수 없는 식별자
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// 식별자 문자열
        identifier: String,
        /// 사유
        reason: String,
    },

    /// 인덱스 백엔드 사용 불가
    #[error("index unavailable: {0}")]
    Unavailable(String),

    /// I/O 에러
    #[error("index io error: {0}")]
    Io(#[from] std::io::Error),

    /// 직렬화 에러
    #[error("index serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 취약점 레코드 스토어 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 스토어 백엔드 사용 불가
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// 스토어가 레코드를 거부함
    #[error("store rejected {id}: {reason}")]
    Rejected {
        /// 취약점 ID
        id: String,
        /// 사유
        reason: String,
    },

    /// I/O 에러
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// 직렬화 에러
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// CVSS 점수 파싱 에러 (치명적이지 않음)
#[derive(Debug, thiserror::Error)]
pub enum NumericParseError {
    /// 숫자로 해석할 수 없음
    #[error("invalid cvss score '{value}': {source}")]
    Invalid {
        /// 원본 텍스트
        value: String,
        /// 원인
        source: std::num::ParseFloatError,
    },

    /// 0.0-10.0 범위를 벗어남
    #[error("cvss score {value} out of range 0.0-10.0")]
    OutOfRange {
        /// 파싱된 값
        value: f32,
    },
}

impl From<FeedError> for VulnFeedError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::SchemaVersion { .. } => {
                VulnFeedError::Ingest(IngestError::UnsupportedSchema(err.to_string()))
            }
            FeedError::Commit { .. } => {
                VulnFeedError::Ingest(IngestError::CommitFailed(err.to_string()))
            }
            FeedError::Xml { .. } => VulnFeedError::Ingest(IngestError::ParseFailed(err.to_string())),
            FeedError::Output { .. } => {
                VulnFeedError::Ingest(IngestError::CommitFailed(err.to_string()))
            }
            FeedError::HistoryLoad { .. } | FeedError::HistoryParse(_) => {
                VulnFeedError::Ingest(IngestError::History(err.to_string()))
            }
            FeedError::Config { field, reason } => VulnFeedError::Config(
                vulnfeed_core::error::ConfigError::InvalidValue { field, reason },
            ),
            FeedError::Io { source, .. } => VulnFeedError::Io(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn schema_version_error_display() {
        let err = FeedError::SchemaVersion {
            found: "1.2".to_owned(),
            expected: "2.0",
        };
        let msg = err.to_string();
        assert!(msg.contains("1.2"));
        assert!(msg.contains("2.0"));
    }

    #[test]
    fn commit_error_preserves_cause_chain() {
        let err = FeedError::Commit {
            cve_id: "CVE-2013-0001".to_owned(),
            source: CommitError::Persist(StoreError::Unavailable("db down".to_owned())),
        };
        assert!(err.to_string().contains("CVE-2013-0001"));

        let commit = err.source().expect("commit error has a source");
        assert!(commit.to_string().contains("persist failed"));
        let store = commit.source().expect("persist has a source");
        assert!(store.to_string().contains("db down"));
    }

    #[test]
    fn commit_error_stage_labels() {
        let merge = CommitError::Merge {
            cpe: "cpe:/a:x:y:1".to_owned(),
            source: StoreError::Unavailable("x".to_owned()),
        };
        let index = CommitError::Index {
            cpe: "cpe:/a:x:y:1".to_owned(),
            source: IndexError::Unavailable("x".to_owned()),
        };
        let persist = CommitError::Persist(StoreError::Unavailable("x".to_owned()));
        assert_eq!(merge.stage(), "merge");
        assert_eq!(index.stage(), "index");
        assert_eq!(persist.stage(), "persist");
    }

    #[test]
    fn numeric_parse_error_display() {
        let source = "abc".parse::<f32>().unwrap_err();
        let err = NumericParseError::Invalid {
            value: "abc".to_owned(),
            source,
        };
        assert!(err.to_string().contains("abc"));

        let err = NumericParseError::OutOfRange { value: 11.5 };
        assert!(err.to_string().contains("11.5"));
    }

    #[test]
    fn converts_schema_error_to_ingest() {
        let err = FeedError::SchemaVersion {
            found: "absent".to_owned(),
            expected: "2.0",
        };
        let top: VulnFeedError = err.into();
        assert!(matches!(
            top,
            VulnFeedError::Ingest(IngestError::UnsupportedSchema(_))
        ));
    }

    #[test]
    fn converts_commit_error_to_ingest() {
        let err = FeedError::Commit {
            cve_id: "CVE-1".to_owned(),
            source: CommitError::Persist(StoreError::Unavailable("down".to_owned())),
        };
        let top: VulnFeedError = err.into();
        assert!(matches!(
            top,
            VulnFeedError::Ingest(IngestError::CommitFailed(_))
        ));
    }

    #[test]
    fn converts_history_and_config_errors() {
        let top: VulnFeedError = FeedError::HistoryParse("bad json".to_owned()).into();
        assert!(matches!(top, VulnFeedError::Ingest(IngestError::History(_))));

        let top: VulnFeedError = FeedError::Config {
            field: "read_buffer_size".to_owned(),
            reason: "zero".to_owned(),
        }
        .into();
        assert!(matches!(top, VulnFeedError::Config(_)));
    }

    #[test]
    fn converts_io_error() {
        let err = FeedError::Io {
            path: "/tmp/feed.xml".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/tmp/feed.xml"));
        let top: VulnFeedError = err.into();
        assert!(matches!(top, VulnFeedError::Io(_)));
    }
}
