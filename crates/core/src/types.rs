//! 공용 도메인 타입

use std::fmt;

use serde::{Deserialize, Serialize};

/// NVD CVSS v2 심각도 구간
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Low < Medium < High`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
}

impl Severity {
    /// CVSS v2 기본 점수를 NVD 심각도 구간으로 변환합니다.
    ///
    /// - `0.0 <= score < 4.0`: Low
    /// - `4.0 <= score < 7.0`: Medium
    /// - `7.0 <= score <= 10.0`: High
    ///
    /// CVSS v2에는 Critical 등급이 없습니다. 범위를 벗어나거나 NaN이면 `None`.
    pub fn from_cvss_v2(score: f32) -> Option<Self> {
        if !(0.0..=10.0).contains(&score) {
            return None;
        }
        Some(if score < 4.0 {
            Self::Low
        } else if score < 7.0 {
            Self::Medium
        } else {
            Self::High
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}
