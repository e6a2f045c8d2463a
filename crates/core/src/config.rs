//! 설정 관리 -- vulnfeed.toml 파싱 및 런타임 설정
//!
//! [`VulnFeedConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`VULNFEED_FEED_DRY_RUN=true` 형식)
//! 3. 설정 파일 (`vulnfeed.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), vulnfeed_core::error::VulnFeedError> {
//! use vulnfeed_core::config::VulnFeedConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = VulnFeedConfig::load("vulnfeed.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VulnFeedConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VulnFeedError};

/// 이력 인덱스 파일 최대 크기 상한 (1 GB)
const MAX_HISTORY_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

/// 읽기 버퍼 크기 상한 (16 MB)
const MAX_READ_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// vulnfeed 통합 설정
///
/// `vulnfeed.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnFeedConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 피드 수집 설정
    #[serde(default)]
    pub feed: FeedConfig,
}

impl VulnFeedConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VulnFeedError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VulnFeedError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VulnFeedError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VulnFeedError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VulnFeedError> {
        toml::from_str(toml_str).map_err(|e| {
            VulnFeedError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VULNFEED_{SECTION}_{FIELD}`
    /// 예: `VULNFEED_FEED_HISTORY_PATH=/var/lib/vulnfeed/history.json`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VULNFEED_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VULNFEED_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "VULNFEED_GENERAL_DATA_DIR");

        // Feed
        override_string(&mut self.feed.feed_path, "VULNFEED_FEED_FEED_PATH");
        override_opt_string(&mut self.feed.history_path, "VULNFEED_FEED_HISTORY_PATH");
        override_opt_string(&mut self.feed.store_path, "VULNFEED_FEED_STORE_PATH");
        override_opt_string(&mut self.feed.index_path, "VULNFEED_FEED_INDEX_PATH");
        override_bool(&mut self.feed.dry_run, "VULNFEED_FEED_DRY_RUN");
        override_u64(
            &mut self.feed.max_history_size,
            "VULNFEED_FEED_MAX_HISTORY_SIZE",
        );
        override_usize(
            &mut self.feed.read_buffer_size,
            "VULNFEED_FEED_READ_BUFFER_SIZE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VulnFeedError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.feed.max_history_size == 0 || self.feed.max_history_size > MAX_HISTORY_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "feed.max_history_size".to_owned(),
                reason: format!("must be 1-{MAX_HISTORY_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.feed.read_buffer_size == 0 || self.feed.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "feed.read_buffer_size".to_owned(),
                reason: format!("must be 1-{MAX_READ_BUFFER_SIZE}"),
            }
            .into());
        }

        // dry-run이 아니면 레코드를 받을 스토어가 필요
        if !self.feed.dry_run && self.feed.store_path.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "feed.store_path".to_owned(),
                reason: "store_path is required unless dry_run is enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            data_dir: "/var/lib/vulnfeed".to_owned(),
        }
    }
}

/// 피드 수집 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// NVD CVE XML 피드 경로
    pub feed_path: String,
    /// 이력 버전 인덱스(JSON) 경로
    pub history_path: Option<String>,
    /// 레코드 스토어(JSON Lines) 경로
    pub store_path: Option<String>,
    /// 소프트웨어 식별자 인덱스 출력 경로
    pub index_path: Option<String>,
    /// dry-run 모드 (스토어 없이 파싱과 카운트만 수행)
    pub dry_run: bool,
    /// 이력 인덱스 파일 최대 크기 (바이트)
    pub max_history_size: u64,
    /// 피드 읽기 버퍼 크기 (바이트)
    pub read_buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_path: "nvdcve-2.0-modified.xml".to_owned(),
            history_path: None,
            store_path: None,
            index_path: None,
            dry_run: true,
            max_history_size: 64 * 1024 * 1024, // 64 MB
            read_buffer_size: 64 * 1024,        // 64 KB
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        // 빈 값은 해제로 취급
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = VulnFeedConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert!(config.feed.dry_run);
        assert!(config.feed.history_path.is_none());
        assert_eq!(config.feed.read_buffer_size, 64 * 1024);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = VulnFeedConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = VulnFeedConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.feed.feed_path, "nvdcve-2.0-modified.xml");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[feed]
dry_run = false
store_path = "/var/lib/vulnfeed/records.jsonl"
"#;
        let config = VulnFeedConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert!(!config.feed.dry_run);
        assert_eq!(
            config.feed.store_path.as_deref(),
            Some("/var/lib/vulnfeed/records.jsonl")
        );
        config.validate().unwrap();
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = VulnFeedConfig::parse("invalid = [[[toml");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            VulnFeedError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = VulnFeedConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = VulnFeedConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_read_buffer() {
        let mut config = VulnFeedConfig::default();
        config.feed.read_buffer_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("read_buffer_size"));
    }

    #[test]
    fn validate_rejects_oversized_history_limit() {
        let mut config = VulnFeedConfig::default();
        config.feed.max_history_size = MAX_HISTORY_SIZE_LIMIT + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_history_size"));
    }

    #[test]
    fn validate_requires_store_when_not_dry_run() {
        let mut config = VulnFeedConfig::default();
        config.feed.dry_run = false;
        config.feed.store_path = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store_path"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_VULNFEED_STR", "overridden") };
        override_string(&mut val, "TEST_VULNFEED_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_VULNFEED_STR") };
    }

    #[test]
    #[serial]
    fn env_override_opt_string_empty_clears() {
        let mut val = Some("/tmp/history.json".to_owned());
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_VULNFEED_OPT", "") };
        override_opt_string(&mut val, "TEST_VULNFEED_OPT");
        assert!(val.is_none());
        unsafe { std::env::remove_var("TEST_VULNFEED_OPT") };
    }

    #[test]
    #[serial]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_VULNFEED_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_VULNFEED_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_VULNFEED_BOOL_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_usize_and_u64() {
        let mut size = 1usize;
        let mut limit = 1u64;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe {
            std::env::set_var("TEST_VULNFEED_USIZE", "4096");
            std::env::set_var("TEST_VULNFEED_U64", "8192");
        }
        override_usize(&mut size, "TEST_VULNFEED_USIZE");
        override_u64(&mut limit, "TEST_VULNFEED_U64");
        assert_eq!(size, 4096);
        assert_eq!(limit, 8192);
        unsafe {
            std::env::remove_var("TEST_VULNFEED_USIZE");
            std::env::remove_var("TEST_VULNFEED_U64");
        }
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_VULNFEED_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = VulnFeedConfig::default();
        config.feed.history_path = Some("/data/history.json".to_owned());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = VulnFeedConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.feed.history_path, parsed.feed.history_path);
        assert_eq!(config.feed.read_buffer_size, parsed.feed.read_buffer_size);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = VulnFeedConfig::from_file("/nonexistent/path/vulnfeed.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            VulnFeedError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
