//! 태그 분류기 -- 한정 이름(qualified name) → 노드 종류
//!
//! 순수 함수입니다. 모르는 태그는 [`NodeKind::Unclassified`]로 분류되고
//! 이후 모든 단계에서 무시됩니다 (확장 요소에 대한 전방 호환).

use crate::types::CvssFacet;

/// `nvd` 루트 요소
pub const NVD: &str = "nvd";
/// 취약점 엔트리
pub const ENTRY: &str = "entry";
/// 영향받는 제품 CPE
pub const VULN_PRODUCT: &str = "vuln:product";
/// 참조 그룹
pub const VULN_REFERENCES: &str = "vuln:references";
/// 참조 출처
pub const VULN_SOURCE: &str = "vuln:source";
/// 참조 항목
pub const VULN_REFERENCE: &str = "vuln:reference";
/// 요약 설명
pub const VULN_SUMMARY: &str = "vuln:summary";
/// CWE 분류
pub const VULN_CWE: &str = "vuln:cwe";
/// CVSS 점수
pub const CVSS_SCORE: &str = "cvss:score";
/// CVSS 공격 벡터
pub const CVSS_ACCESS_VECTOR: &str = "cvss:access-vector";
/// CVSS 공격 복잡도
pub const CVSS_ACCESS_COMPLEXITY: &str = "cvss:access-complexity";
/// CVSS 인증
pub const CVSS_AUTHENTICATION: &str = "cvss:authentication";
/// CVSS 기밀성 영향
pub const CVSS_CONFIDENTIALITY_IMPACT: &str = "cvss:confidentiality-impact";
/// CVSS 무결성 영향
pub const CVSS_INTEGRITY_IMPACT: &str = "cvss:integrity-impact";
/// CVSS 가용성 영향
pub const CVSS_AVAILABILITY_IMPACT: &str = "cvss:availability-impact";

/// 의미 있는 노드 종류 (닫힌 집합)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// 문서 루트
    Root,
    /// 취약점 엔트리
    Entry,
    /// 영향받는 제품 식별자
    Product,
    /// 참조 그룹
    ReferenceGroup,
    /// 참조 항목
    ReferenceItem,
    /// 참조 출처
    ReferenceSource,
    /// 요약 텍스트
    Summary,
    /// 약점 분류 코드
    WeaknessCode,
    /// CVSS 점수
    Score,
    /// CVSS 범주형 지표
    Cvss(CvssFacet),
    /// 그 외 모든 태그
    Unclassified,
}

impl NodeKind {
    /// 한정 태그 이름을 분류합니다. 실패하지 않습니다.
    pub fn classify(qualified_name: &str) -> Self {
        match qualified_name {
            NVD => Self::Root,
            ENTRY => Self::Entry,
            VULN_PRODUCT => Self::Product,
            VULN_REFERENCES => Self::ReferenceGroup,
            VULN_REFERENCE => Self::ReferenceItem,
            VULN_SOURCE => Self::ReferenceSource,
            VULN_SUMMARY => Self::Summary,
            VULN_CWE => Self::WeaknessCode,
            CVSS_SCORE => Self::Score,
            CVSS_ACCESS_VECTOR => Self::Cvss(CvssFacet::AccessVector),
            CVSS_ACCESS_COMPLEXITY => Self::Cvss(CvssFacet::AccessComplexity),
            CVSS_AUTHENTICATION => Self::Cvss(CvssFacet::Authentication),
            CVSS_CONFIDENTIALITY_IMPACT => Self::Cvss(CvssFacet::ConfidentialityImpact),
            CVSS_INTEGRITY_IMPACT => Self::Cvss(CvssFacet::IntegrityImpact),
            CVSS_AVAILABILITY_IMPACT => Self::Cvss(CvssFacet::AvailabilityImpact),
            _ => Self::Unclassified,
        }
    }

    /// 텍스트 버퍼 초기 용량 힌트
    ///
    /// 텍스트를 모으지 않는 노드는 0 입니다.
    pub fn text_capacity(&self) -> usize {
        match self {
            Self::Product => 100,
            Self::ReferenceItem => 130,
            Self::ReferenceSource => 30,
            Self::Summary => 500,
            Self::Score => 5,
            Self::Cvss(_) => 20,
            _ => 0,
        }
    }
}
