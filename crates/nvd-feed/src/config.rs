//! 피드 수집 설정
//!
//! [`NvdFeedConfig`]는 core의 [`FeedConfig`](vulnfeed_core::config::FeedConfig)에서
//! 파생되며, 수집기를 만들기 전에 한도와 경로를 검증합니다.
//!
//! # 사용 예시
//!
//! ```
//! use vulnfeed_nvd::NvdFeedConfigBuilder;
//!
//! let config = NvdFeedConfigBuilder::new()
//!     .feed_path("/var/lib/vulnfeed/nvdcve-2.0-2013.xml")
//!     .dry_run(true)
//!     .build()
//!     .unwrap();
//! assert!(config.store_path.is_none());
//! ```

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::reader::DEFAULT_BUFFER_SIZE;

/// 설정 상한값 상수
const MAX_HISTORY_SIZE: u64 = 1024 * 1024 * 1024; // 1 GB
const MAX_READ_BUFFER_SIZE: usize = 16 * 1024 * 1024; // 16 MB
const MAX_PATH_LEN: usize = 4096;

/// NVD 피드 수집 설정
///
/// # 필드
///
/// - **feed_path**: NVD CVE XML 2.0 피드 파일
/// - **history_path**: 이력 버전 인덱스(JSON), 없으면 병합 생략
/// - **store_path**: 레코드 스토어(JSON Lines), dry-run이 아니면 필수
/// - **index_path**: CPE 인덱스 덤프 경로, 없으면 인덱스를 만들지 않음
/// - **dry_run**: 스토어와 인덱스 없이 파싱과 카운트만 수행
/// - **max_history_size**: 이력 인덱스 파일 최대 크기 (바이트)
/// - **read_buffer_size**: 피드 읽기 버퍼 크기 (바이트)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvdFeedConfig {
    /// 피드 파일 경로
    pub feed_path: String,
    /// 이력 버전 인덱스 경로
    pub history_path: Option<String>,
    /// 레코드 스토어 경로
    pub store_path: Option<String>,
    /// CPE 인덱스 덤프 경로
    pub index_path: Option<String>,
    /// dry-run 모드
    pub dry_run: bool,
    /// 이력 인덱스 파일 최대 크기
    pub max_history_size: u64,
    /// 읽기 버퍼 크기
    pub read_buffer_size: usize,
}

impl Default for NvdFeedConfig {
    fn default() -> Self {
        Self {
            feed_path: "nvdcve-2.0-modified.xml".to_owned(),
            history_path: None,
            store_path: None,
            index_path: None,
            dry_run: true,
            max_history_size: 64 * 1024 * 1024, // 64 MB
            read_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl NvdFeedConfig {
    /// core의 `FeedConfig`에서 수집 설정을 생성합니다.
    pub fn from_core(core: &vulnfeed_core::config::FeedConfig) -> Self {
        Self {
            feed_path: core.feed_path.clone(),
            history_path: core.history_path.clone(),
            store_path: core.store_path.clone(),
            index_path: core.index_path.clone(),
            dry_run: core.dry_run,
            max_history_size: core.max_history_size,
            read_buffer_size: core.read_buffer_size,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `feed_path`: 비어 있으면 안 됨
    /// - `max_history_size`: 1-1073741824 (1GB)
    /// - `read_buffer_size`: 1-16777216 (16MB)
    /// - `store_path`: dry-run이 아니면 필수
    /// - 모든 경로: `..` 컴포넌트 금지, 4096자 이하
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.feed_path.is_empty() {
            return Err(config_error("feed_path", "must not be empty"));
        }

        if self.max_history_size == 0 || self.max_history_size > MAX_HISTORY_SIZE {
            return Err(config_error(
                "max_history_size",
                format!("must be 1-{MAX_HISTORY_SIZE}"),
            ));
        }

        if self.read_buffer_size == 0 || self.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(config_error(
                "read_buffer_size",
                format!("must be 1-{MAX_READ_BUFFER_SIZE}"),
            ));
        }

        if !self.dry_run && self.store_path.is_none() {
            return Err(config_error(
                "store_path",
                "store_path is required unless dry_run is set",
            ));
        }

        validate_path("feed_path", &self.feed_path)?;
        for (field, path) in [
            ("history_path", &self.history_path),
            ("store_path", &self.store_path),
            ("index_path", &self.index_path),
        ] {
            if let Some(path) = path {
                validate_path(field, path)?;
            }
        }

        Ok(())
    }
}

fn config_error(field: &str, reason: impl Into<String>) -> FeedError {
    FeedError::Config {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

fn validate_path(field: &str, path: &str) -> Result<(), FeedError> {
    if path.is_empty() {
        return Err(config_error(field, "path must not be empty"));
    }

    if path.len() > MAX_PATH_LEN {
        return Err(config_error(
            field,
            format!("path exceeds maximum length {MAX_PATH_LEN}"),
        ));
    }

    if Path::new(path)
        .components()
        .any(|c| c == Component::ParentDir)
    {
        return Err(config_error(
            field,
            format!("path '{path}' contains path traversal pattern '..'"),
        ));
    }

    Ok(())
}

/// [`NvdFeedConfig`] 빌더
#[derive(Default)]
pub struct NvdFeedConfigBuilder {
    config: NvdFeedConfig,
}

impl NvdFeedConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 피드 파일 경로를 설정합니다.
    pub fn feed_path(mut self, path: impl Into<String>) -> Self {
        self.config.feed_path = path.into();
        self
    }

    /// 이력 버전 인덱스 경로를 설정합니다.
    pub fn history_path(mut self, path: impl Into<String>) -> Self {
        self.config.history_path = Some(path.into());
        self
    }

    /// 레코드 스토어 경로를 설정합니다.
    pub fn store_path(mut self, path: impl Into<String>) -> Self {
        self.config.store_path = Some(path.into());
        self
    }

    /// CPE 인덱스 덤프 경로를 설정합니다.
    pub fn index_path(mut self, path: impl Into<String>) -> Self {
        self.config.index_path = Some(path.into());
        self
    }

    /// dry-run 여부를 설정합니다.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// 이력 인덱스 파일 최대 크기를 설정합니다.
    pub fn max_history_size(mut self, size: u64) -> Self {
        self.config.max_history_size = size;
        self
    }

    /// 읽기 버퍼 크기를 설정합니다.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `FeedError::Config` 반환
    pub fn build(self) -> Result<NvdFeedConfig, FeedError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: FeedError) -> String {
        match err {
            FeedError::Config { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        NvdFeedConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = vulnfeed_core::config::FeedConfig {
            feed_path: "/data/nvdcve-2.0-2013.xml".to_owned(),
            history_path: Some("/data/history.json".to_owned()),
            store_path: Some("/data/records.jsonl".to_owned()),
            index_path: None,
            dry_run: false,
            max_history_size: 1024,
            read_buffer_size: 4096,
        };
        let config = NvdFeedConfig::from_core(&core);
        assert_eq!(config.feed_path, "/data/nvdcve-2.0-2013.xml");
        assert_eq!(config.history_path.as_deref(), Some("/data/history.json"));
        assert!(!config.dry_run);
        assert_eq!(config.read_buffer_size, 4096);
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_feed_path() {
        let config = NvdFeedConfig {
            feed_path: String::new(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "feed_path");
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = NvdFeedConfig {
            max_history_size: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "max_history_size");

        let config = NvdFeedConfig {
            read_buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "read_buffer_size");
    }

    #[test]
    fn validate_rejects_too_large_buffer() {
        let config = NvdFeedConfig {
            read_buffer_size: 32 * 1024 * 1024,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_store_unless_dry_run() {
        let config = NvdFeedConfig {
            dry_run: false,
            store_path: None,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "store_path");
    }

    #[test]
    fn validate_rejects_path_traversal() {
        let config = NvdFeedConfig {
            history_path: Some("/var/lib/../../etc/passwd".to_owned()),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "history_path");

        let config = NvdFeedConfig {
            feed_path: "../feed.xml".to_owned(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "feed_path");
    }

    #[test]
    fn validate_allows_dots_inside_names() {
        let config = NvdFeedConfig {
            feed_path: "/data/nvdcve-2.0..modified.xml".to_owned(),
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_overlong_path() {
        let config = NvdFeedConfig {
            index_path: Some("a".repeat(5000)),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "index_path");
    }

    #[test]
    fn builder_all_setters() {
        let config = NvdFeedConfigBuilder::new()
            .feed_path("/data/feed.xml")
            .history_path("/data/history.json")
            .store_path("/data/records.jsonl")
            .index_path("/data/index.json")
            .dry_run(false)
            .max_history_size(1024)
            .read_buffer_size(8192)
            .build()
            .unwrap();

        assert_eq!(config.feed_path, "/data/feed.xml");
        assert_eq!(config.store_path.as_deref(), Some("/data/records.jsonl"));
        assert_eq!(config.index_path.as_deref(), Some("/data/index.json"));
        assert!(!config.dry_run);
        assert_eq!(config.max_history_size, 1024);
        assert_eq!(config.read_buffer_size, 8192);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = NvdFeedConfigBuilder::new().dry_run(false).build();
        assert!(result.is_err());
    }
}
