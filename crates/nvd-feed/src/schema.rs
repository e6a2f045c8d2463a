//! 스키마 가드 -- 루트 노드의 버전 속성 검증
//!
//! 루트가 열릴 때 한 번만 호출되며, 버전이 다르면 어떤 엔트리도 처리하기 전에
//! [`FeedError::SchemaVersion`]으로 즉시 중단합니다.

use crate::error::FeedError;

/// 지원하는 NVD XML 스키마 버전
pub const SUPPORTED_SCHEMA_VERSION: &str = "2.0";

/// 루트 노드의 버전 속성 이름
pub const VERSION_ATTRIBUTE: &str = "nvd_xml_version";

/// 버전 속성이 없을 때 에러에 기록되는 값
const ABSENT: &str = "absent";

/// 루트 스키마 버전 검증기
#[derive(Debug, Default)]
pub struct SchemaGuard {
    verified: bool,
}

impl SchemaGuard {
    /// 검증 전 상태의 가드를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 루트의 버전 속성 값을 검증합니다.
    ///
    /// 속성이 없으면 `found = "absent"`인 불일치로 취급합니다.
    pub fn verify(&mut self, version: Option<&str>) -> Result<(), FeedError> {
        match version {
            Some(SUPPORTED_SCHEMA_VERSION) => {
                self.verified = true;
                tracing::debug!(version = SUPPORTED_SCHEMA_VERSION, "feed schema verified");
                Ok(())
            }
            other => {
                let found = other.unwrap_or(ABSENT).to_owned();
                tracing::error!(
                    found = %found,
                    expected = SUPPORTED_SCHEMA_VERSION,
                    "unsupported feed schema version"
                );
                Err(FeedError::SchemaVersion {
                    found,
                    expected: SUPPORTED_SCHEMA_VERSION,
                })
            }
        }
    }

    /// 루트 검증이 끝났는지 여부
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// 검증이 끝나지 않았으면 에러를 반환합니다.
    ///
    /// 루트보다 엔트리가 먼저 나타나는 문서를 거부할 때 사용합니다.
    pub fn require_verified(&self) -> Result<(), FeedError> {
        if self.verified {
            Ok(())
        } else {
            Err(FeedError::SchemaVersion {
                found: ABSENT.to_owned(),
                expected: SUPPORTED_SCHEMA_VERSION,
            })
        }
    }
}
