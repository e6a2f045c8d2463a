//! 도메인 타입 -- 피드에서 만들어지는 취약점 레코드
//!
//! [`VulnerabilityRecord`]는 `entry` 노드가 열릴 때 생성되어 자식 노드가 닫힐 때마다
//! 채워지고, `entry`가 닫히면 소유권째 커밋 파이프라인으로 넘어갑니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use vulnfeed_core::types::Severity;

use crate::cpe::{self, CpeParseError, CpeUri};

/// 외부 참조 (권고문, 패치, 메일링 리스트 등)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// 참조 URL (`href` 속성)
    pub url: String,
    /// 표시 이름
    pub name: String,
    /// 출처 레이블 (예: `BUGTRAQ`, `CONFIRM`)
    pub source: String,
}

/// 영향받는 소프트웨어 식별자
///
/// `previous_version`은 이력 버전 인덱스에서 병합된 항목에만 설정되며,
/// "이 버전까지의 모든 이전 버전도 취약함"을 뜻합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffectedSoftware {
    /// CPE URI 문자열
    pub cpe: String,
    /// 이전 버전 범위 상한 (있을 경우)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
}

impl AffectedSoftware {
    /// 피드에서 읽은 식별자를 생성합니다.
    pub fn new(cpe: impl Into<String>) -> Self {
        Self {
            cpe: cpe.into(),
            previous_version: None,
        }
    }

    /// 이전 버전 범위 정보를 붙입니다.
    pub fn with_previous_version(mut self, version: impl Into<String>) -> Self {
        self.previous_version = Some(version.into());
        self
    }

    /// 애플리케이션 CPE인지 여부
    pub fn is_application(&self) -> bool {
        cpe::is_application(&self.cpe)
    }

    /// CPE URI를 분해합니다.
    pub fn parse_cpe(&self) -> Result<CpeUri, CpeParseError> {
        CpeUri::parse(&self.cpe)
    }
}

impl fmt::Display for AffectedSoftware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.previous_version {
            Some(prev) => write!(f, "{} (<= {prev})", self.cpe),
            None => write!(f, "{}", self.cpe),
        }
    }
}

/// CVSS v2 범주형 지표 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CvssFacet {
    /// 공격 벡터
    AccessVector,
    /// 공격 복잡도
    AccessComplexity,
    /// 인증 요구
    Authentication,
    /// 기밀성 영향
    ConfidentialityImpact,
    /// 무결성 영향
    IntegrityImpact,
    /// 가용성 영향
    AvailabilityImpact,
}

impl CvssFacet {
    /// 스키마가 정의하는 코드 목록
    pub fn known_codes(&self) -> &'static [&'static str] {
        match self {
            Self::AccessVector => &["NETWORK", "ADJACENT_NETWORK", "LOCAL"],
            Self::AccessComplexity => &["LOW", "MEDIUM", "HIGH"],
            Self::Authentication => &["NONE", "SINGLE_INSTANCE", "MULTIPLE_INSTANCES"],
            Self::ConfidentialityImpact | Self::IntegrityImpact | Self::AvailabilityImpact => {
                &["NONE", "PARTIAL", "COMPLETE"]
            }
        }
    }

    /// 스키마가 정의한 코드인지 여부 (대소문자 구분)
    pub fn is_known_code(&self, code: &str) -> bool {
        self.known_codes().contains(&code)
    }

    /// 필드 이름 (로그용)
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccessVector => "access_vector",
            Self::AccessComplexity => "access_complexity",
            Self::Authentication => "authentication",
            Self::ConfidentialityImpact => "confidentiality_impact",
            Self::IntegrityImpact => "integrity_impact",
            Self::AvailabilityImpact => "availability_impact",
        }
    }
}

/// CVSS v2 범주형 지표
///
/// 값은 피드에 적힌 그대로 저장합니다. 새 코드가 추가되어도 수집이 깨지지 않도록
/// 파싱 시점에는 검증하지 않으며, [`CvssFacet::is_known_code`]로 확인만 할 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvssFacets {
    /// 공격 벡터
    pub access_vector: Option<String>,
    /// 공격 복잡도
    pub access_complexity: Option<String>,
    /// 인증 요구
    pub authentication: Option<String>,
    /// 기밀성 영향
    pub confidentiality_impact: Option<String>,
    /// 무결성 영향
    pub integrity_impact: Option<String>,
    /// 가용성 영향
    pub availability_impact: Option<String>,
}

impl CvssFacets {
    /// 지표 값을 설정합니다.
    pub fn set(&mut self, facet: CvssFacet, value: String) {
        *self.slot_mut(facet) = Some(value);
    }

    /// 지표 값을 조회합니다.
    pub fn get(&self, facet: CvssFacet) -> Option<&str> {
        match facet {
            CvssFacet::AccessVector => self.access_vector.as_deref(),
            CvssFacet::AccessComplexity => self.access_complexity.as_deref(),
            CvssFacet::Authentication => self.authentication.as_deref(),
            CvssFacet::ConfidentialityImpact => self.confidentiality_impact.as_deref(),
            CvssFacet::IntegrityImpact => self.integrity_impact.as_deref(),
            CvssFacet::AvailabilityImpact => self.availability_impact.as_deref(),
        }
    }

    fn slot_mut(&mut self, facet: CvssFacet) -> &mut Option<String> {
        match facet {
            CvssFacet::AccessVector => &mut self.access_vector,
            CvssFacet::AccessComplexity => &mut self.access_complexity,
            CvssFacet::Authentication => &mut self.authentication,
            CvssFacet::ConfidentialityImpact => &mut self.confidentiality_impact,
            CvssFacet::IntegrityImpact => &mut self.integrity_impact,
            CvssFacet::AvailabilityImpact => &mut self.availability_impact,
        }
    }
}

/// 취약점 레코드
///
/// 영향받는 소프트웨어는 CPE 문자열을 키로 한 맵에 보관하므로
/// 같은 CPE는 하나로 합쳐집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    /// 취약점 ID (예: `CVE-2013-0001`)
    pub id: String,
    /// 설명
    pub description: Option<String>,
    /// CWE 분류 코드
    pub cwe: Option<String>,
    /// CVSS v2 기본 점수 (0.0-10.0)
    pub cvss_score: Option<f32>,
    /// CVSS 범주형 지표
    #[serde(default)]
    pub cvss: CvssFacets,
    /// 참조 목록 (문서 순서 유지)
    #[serde(default)]
    pub references: Vec<Reference>,
    /// 영향받는 소프트웨어
    #[serde(default, with = "affected_list")]
    affected_software: BTreeMap<String, AffectedSoftware>,
}

impl VulnerabilityRecord {
    /// 빈 레코드를 생성합니다.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            cwe: None,
            cvss_score: None,
            cvss: CvssFacets::default(),
            references: Vec::new(),
            affected_software: BTreeMap::new(),
        }
    }

    /// 영향받는 소프트웨어를 추가합니다. 같은 CPE가 이미 있으면 무시합니다.
    pub fn add_affected_software(&mut self, software: AffectedSoftware) {
        self.affected_software
            .entry(software.cpe.clone())
            .or_insert(software);
    }

    /// 영향받는 소프트웨어를 갱신합니다. 같은 CPE가 있으면 교체하고 없으면 추가합니다.
    ///
    /// 이력 인덱스의 항목(이전 버전 범위 포함)을 병합할 때 사용합니다.
    pub fn update_affected_software(&mut self, software: AffectedSoftware) {
        self.affected_software.insert(software.cpe.clone(), software);
    }

    /// 영향받는 소프트웨어 목록 (CPE 오름차순)
    pub fn affected_software(&self) -> impl Iterator<Item = &AffectedSoftware> {
        self.affected_software.values()
    }

    /// CPE로 영향받는 소프트웨어를 조회합니다.
    pub fn find_affected_software(&self, cpe: &str) -> Option<&AffectedSoftware> {
        self.affected_software.get(cpe)
    }

    /// 영향받는 소프트웨어 수
    pub fn affected_software_count(&self) -> usize {
        self.affected_software.len()
    }

    /// CVSS 점수에서 파생한 심각도 (점수가 없으면 `None`)
    pub fn severity(&self) -> Option<Severity> {
        self.cvss_score.and_then(Severity::from_cvss_v2)
    }
}

impl fmt::Display for VulnerabilityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (score={}, cpes={}, refs={})",
            self.id,
            self.cvss_score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_owned()),
            self.affected_software.len(),
            self.references.len(),
        )
    }
}

/// 영향받는 소프트웨어 맵을 JSON 배열로 직렬화합니다.
mod affected_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::AffectedSoftware;

    pub fn serialize<S>(
        map: &BTreeMap<String, AffectedSoftware>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, AffectedSoftware>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<AffectedSoftware>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|sw| (sw.cpe.clone(), sw)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_affected_software_collapses_duplicates() {
        let mut record = VulnerabilityRecord::new("CVE-2013-0001");
        record.add_affected_software(AffectedSoftware::new("cpe:/a:vendor:product:1.0"));
        record.add_affected_software(AffectedSoftware::new("cpe:/a:vendor:product:1.0"));
        record.add_affected_software(AffectedSoftware::new("cpe:/a:vendor:product:1.1"));
        assert_eq!(record.affected_software_count(), 2);
    }

    #[test]
    fn update_affected_software_replaces_existing() {
        let mut record = VulnerabilityRecord::new("CVE-2013-0001");
        record.add_affected_software(AffectedSoftware::new("cpe:/a:vendor:product:2.0"));
        record.update_affected_software(
            AffectedSoftware::new("cpe:/a:vendor:product:2.0").with_previous_version("2.0"),
        );

        assert_eq!(record.affected_software_count(), 1);
        let sw = record
            .find_affected_software("cpe:/a:vendor:product:2.0")
            .unwrap();
        assert_eq!(sw.previous_version.as_deref(), Some("2.0"));
    }

    #[test]
    fn add_does_not_clobber_merged_entry() {
        let mut record = VulnerabilityRecord::new("CVE-2013-0001");
        record.update_affected_software(
            AffectedSoftware::new("cpe:/a:vendor:product:2.0").with_previous_version("2.0"),
        );
        record.add_affected_software(AffectedSoftware::new("cpe:/a:vendor:product:2.0"));
        let sw = record
            .find_affected_software("cpe:/a:vendor:product:2.0")
            .unwrap();
        assert!(sw.previous_version.is_some());
    }

    #[test]
    fn severity_derives_from_score() {
        let mut record = VulnerabilityRecord::new("CVE-2013-0001");
        assert_eq!(record.severity(), None);
        record.cvss_score = Some(7.5);
        assert_eq!(record.severity(), Some(Severity::High));
    }

    #[test]
    fn cvss_facets_set_and_get() {
        let mut facets = CvssFacets::default();
        facets.set(CvssFacet::AccessVector, "NETWORK".to_owned());
        facets.set(CvssFacet::IntegrityImpact, "PARTIAL".to_owned());
        assert_eq!(facets.get(CvssFacet::AccessVector), Some("NETWORK"));
        assert_eq!(facets.integrity_impact.as_deref(), Some("PARTIAL"));
        assert_eq!(facets.get(CvssFacet::Authentication), None);
    }

    #[test]
    fn cvss_facet_known_codes() {
        assert!(CvssFacet::AccessVector.is_known_code("ADJACENT_NETWORK"));
        assert!(!CvssFacet::AccessVector.is_known_code("PHYSICAL"));
        assert!(!CvssFacet::AccessComplexity.is_known_code("low"));
        assert!(CvssFacet::AvailabilityImpact.is_known_code("COMPLETE"));
    }

    #[test]
    fn record_json_lists_affected_software() {
        let mut record = VulnerabilityRecord::new("CVE-0001");
        record.description = Some("test".to_owned());
        record.add_affected_software(AffectedSoftware::new("cpe:/a:vendor:product:1.0"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "CVE-0001");
        assert_eq!(json["affected_software"][0]["cpe"], "cpe:/a:vendor:product:1.0");
        assert!(json["affected_software"][0].get("previous_version").is_none());

        let back: VulnerabilityRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_display() {
        let mut record = VulnerabilityRecord::new("CVE-0001");
        record.cvss_score = Some(5.0);
        assert_eq!(record.to_string(), "CVE-0001 (score=5.0, cpes=0, refs=0)");
    }

    #[test]
    fn affected_software_display() {
        let sw = AffectedSoftware::new("cpe:/a:v:p:2.0").with_previous_version("2.0");
        assert_eq!(sw.to_string(), "cpe:/a:v:p:2.0 (<= 2.0)");
        assert!(sw.is_application());
    }
}
