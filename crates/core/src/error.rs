//! 에러 타입 -- 도메인별 에러 정의

/// vulnfeed 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VulnFeedError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 피드 수집 에러
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 피드 수집 에러
///
/// 피드 파서 크레이트의 상세 에러가 이 분류로 접혀서 올라옵니다.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 지원하지 않는 스키마 버전
    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    /// 피드 문서 파싱 실패
    #[error("feed parse failed: {0}")]
    ParseFailed(String),

    /// 엔트리 커밋(인덱스/스토어 기록) 실패
    #[error("commit failed: {0}")]
    CommitFailed(String),

    /// 이력 버전 인덱스 로딩 실패
    #[error("history index error: {0}")]
    History(String),
}
