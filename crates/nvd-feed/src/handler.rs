//! 엔트리 빌더 -- 태그 이벤트로 구동되는 상태 기계
//!
//! [`NvdFeedHandler`]는 [`FeedEventSink`]를 구현하며, 한 번에 하나의 레코드와
//! 그 안의 참조 하나, 텍스트 버퍼 하나만 유지합니다. 피드 크기와 무관하게
//! 메모리 사용량은 엔트리 하나 분량입니다.
//!
//! ```text
//!          entry open                       entry close
//!  Idle ─────────────────> InEntry ──────────────────────> Idle
//!                            │  ▲                 │
//!            child open/close│  │                 ├─ counters.record_entry
//!                            └──┘                 └─ (relevant) pipeline.commit
//! ```
//!
//! 텍스트 버퍼는 자신을 연 노드 종류(owner)를 기억하고, 같은 종류의 노드가
//! 닫힐 때만 값을 내어준 뒤 비워집니다.

use tracing::{debug, trace, warn};

use crate::commit::{CommitPipeline, CommitTotals};
use crate::counters::Counters;
use crate::cpe;
use crate::error::{FeedError, NumericParseError};
use crate::reader::{Attributes, FeedEventSink};
use crate::schema::{SchemaGuard, VERSION_ATTRIBUTE};
use crate::tag::NodeKind;
use crate::types::{AffectedSoftware, Reference, VulnerabilityRecord};

/// 엔트리 ID 속성
pub const ID_ATTRIBUTE: &str = "id";
/// 참조 그룹 언어 속성
pub const LANG_ATTRIBUTE: &str = "xml:lang";
/// 참조 URL 속성
pub const HREF_ATTRIBUTE: &str = "href";
/// 받아들이는 참조 언어
pub const ACCEPTED_LANGUAGE: &str = "en";

/// CVSS 점수 허용 범위
const SCORE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=10.0;

/// CVSS 점수 텍스트를 파싱합니다. 앞뒤 공백은 무시합니다.
pub fn parse_score(text: &str) -> Result<f32, NumericParseError> {
    let trimmed = text.trim();
    let value: f32 = trimmed
        .parse()
        .map_err(|source| NumericParseError::Invalid {
            value: trimmed.to_owned(),
            source,
        })?;

    if !SCORE_RANGE.contains(&value) {
        return Err(NumericParseError::OutOfRange { value });
    }
    Ok(value)
}

/// 특정 노드가 소유한 텍스트 버퍼
#[derive(Debug)]
struct TextBuffer {
    owner: NodeKind,
    text: String,
}

/// 열린 엔트리의 상태
#[derive(Debug)]
struct EntryState {
    record: VulnerabilityRecord,
    /// 받아들인 언어의 참조 그룹 안에 있을 때만 `Some`
    pending_reference: Option<Reference>,
    has_application_cpe: bool,
    text: Option<TextBuffer>,
}

impl EntryState {
    fn new(id: &str) -> Self {
        Self {
            record: VulnerabilityRecord::new(id),
            pending_reference: None,
            has_application_cpe: false,
            text: None,
        }
    }

    fn begin_text(&mut self, owner: NodeKind) {
        self.text = Some(TextBuffer {
            owner,
            text: String::with_capacity(owner.text_capacity()),
        });
    }

    /// `kind`가 소유한 버퍼일 때만 텍스트를 꺼냅니다.
    fn take_text(&mut self, kind: NodeKind) -> Option<String> {
        if self.text.as_ref().is_some_and(|buffer| buffer.owner == kind) {
            self.text.take().map(|buffer| buffer.text)
        } else {
            None
        }
    }

    fn open(&mut self, kind: NodeKind, attributes: &Attributes) {
        match kind {
            NodeKind::Product
            | NodeKind::Summary
            | NodeKind::Score
            | NodeKind::Cvss(_) => self.begin_text(kind),
            NodeKind::ReferenceGroup => {
                self.pending_reference = (attributes.get(LANG_ATTRIBUTE)
                    == Some(ACCEPTED_LANGUAGE))
                .then(Reference::default);
            }
            NodeKind::ReferenceItem => {
                if let Some(reference) = self.pending_reference.as_mut() {
                    reference.url = attributes
                        .get(HREF_ATTRIBUTE)
                        .unwrap_or_default()
                        .to_owned();
                    self.begin_text(kind);
                }
            }
            NodeKind::ReferenceSource => {
                if self.pending_reference.is_some() {
                    self.begin_text(kind);
                }
            }
            NodeKind::WeaknessCode => {
                self.record.cwe = attributes.get(ID_ATTRIBUTE).map(str::to_owned);
            }
            NodeKind::Root | NodeKind::Entry | NodeKind::Unclassified => {}
        }
    }

    fn close(&mut self, kind: NodeKind) {
        match kind {
            NodeKind::Product => {
                let Some(text) = self.take_text(kind) else {
                    return;
                };
                let identifier = text.trim();
                if cpe::is_application(identifier) {
                    self.has_application_cpe = true;
                    self.record
                        .add_affected_software(AffectedSoftware::new(identifier));
                } else {
                    trace!(cve_id = %self.record.id, cpe = identifier, "non-application cpe dropped");
                }
            }
            NodeKind::ReferenceItem => {
                if let (Some(text), Some(reference)) =
                    (self.take_text(kind), self.pending_reference.as_mut())
                {
                    reference.name = text;
                }
            }
            NodeKind::ReferenceSource => {
                if let (Some(text), Some(reference)) =
                    (self.take_text(kind), self.pending_reference.as_mut())
                {
                    reference.source = text;
                }
            }
            NodeKind::ReferenceGroup => {
                if let Some(reference) = self.pending_reference.take() {
                    self.record.references.push(reference);
                }
            }
            NodeKind::Summary => {
                if let Some(text) = self.take_text(kind) {
                    self.record.description = Some(text);
                }
            }
            NodeKind::Score => {
                if let Some(text) = self.take_text(kind) {
                    match parse_score(&text) {
                        Ok(score) => self.record.cvss_score = Some(score),
                        Err(e) => {
                            metrics::counter!(
                                vulnfeed_core::metrics::NVD_SCORE_PARSE_ERRORS_TOTAL
                            )
                            .increment(1);
                            warn!(cve_id = %self.record.id, error = %e, "cvss score skipped");
                        }
                    }
                }
            }
            NodeKind::Cvss(facet) => {
                if let Some(text) = self.take_text(kind) {
                    if !facet.is_known_code(&text) {
                        debug!(
                            cve_id = %self.record.id,
                            facet = facet.name(),
                            value = %text,
                            "unknown cvss code stored as-is"
                        );
                    }
                    self.record.cvss.set(facet, text);
                }
            }
            NodeKind::WeaknessCode
            | NodeKind::Root
            | NodeKind::Entry
            | NodeKind::Unclassified => {}
        }
    }
}

/// 빌더 상태
///
/// 엔트리 안에서 다시 `entry`가 열리면 미완성 엔트리는 버려지며 카운터에 포함되지 않습니다.
#[derive(Debug)]
enum BuilderState {
    /// 엔트리 밖
    Idle,
    /// 엔트리 안
    InEntry(Box<EntryState>),
}

/// NVD 2.0 피드 이벤트 핸들러
///
/// 스키마 가드, 엔트리 빌더, 카운터, 커밋 파이프라인을 묶습니다.
/// 에러로 중단된 뒤에도 카운터는 중단 시점까지의 값을 유지합니다.
///
/// # 사용 예시
///
/// ```
/// use vulnfeed_nvd::{CommitPipeline, FeedReader, NvdFeedHandler};
///
/// let xml = r#"<nvd nvd_xml_version="2.0"><entry id="CVE-0001"/></nvd>"#;
/// let mut handler = NvdFeedHandler::new(CommitPipeline::dry_run());
/// FeedReader::from_str(xml).run(&mut handler).unwrap();
/// assert_eq!(handler.counters().total_entries, 1);
/// ```
#[derive(Debug)]
pub struct NvdFeedHandler {
    state: BuilderState,
    guard: SchemaGuard,
    counters: Counters,
    totals: CommitTotals,
    pipeline: CommitPipeline,
}

impl NvdFeedHandler {
    /// 커밋 파이프라인으로 핸들러를 생성합니다.
    pub fn new(pipeline: CommitPipeline) -> Self {
        Self {
            state: BuilderState::Idle,
            guard: SchemaGuard::new(),
            counters: Counters::default(),
            totals: CommitTotals::default(),
            pipeline,
        }
    }

    /// 현재 카운터
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// 현재 커밋 누계
    pub fn commit_totals(&self) -> CommitTotals {
        self.totals
    }

    /// 루트 스키마 검증이 끝났는지 여부
    pub fn schema_verified(&self) -> bool {
        self.guard.is_verified()
    }

    /// 엔트리가 열려 있는지 여부
    pub fn in_entry(&self) -> bool {
        matches!(self.state, BuilderState::InEntry(_))
    }

    fn open_entry(&mut self, attributes: &Attributes) -> Result<(), FeedError> {
        self.guard.require_verified()?;

        let id = attributes.get(ID_ATTRIBUTE).unwrap_or_default();
        let previous = std::mem::replace(
            &mut self.state,
            BuilderState::InEntry(Box::new(EntryState::new(id))),
        );
        if let BuilderState::InEntry(unfinished) = previous {
            warn!(
                cve_id = %unfinished.record.id,
                next = id,
                "entry opened before previous entry closed, discarding previous"
            );
        }
        Ok(())
    }

    fn close_entry(&mut self) -> Result<(), FeedError> {
        let BuilderState::InEntry(entry) = std::mem::replace(&mut self.state, BuilderState::Idle)
        else {
            debug!("entry close without open entry ignored");
            return Ok(());
        };
        let EntryState {
            record,
            has_application_cpe,
            ..
        } = *entry;

        self.counters.record_entry(has_application_cpe);

        if !has_application_cpe {
            trace!(cve_id = %record.id, "entry has no application cpe, not committed");
            return Ok(());
        }

        let cve_id = record.id.clone();
        let outcome = self
            .pipeline
            .commit(record)
            .map_err(|source| FeedError::Commit { cve_id, source })?;
        self.totals.add(&outcome);
        Ok(())
    }
}

impl FeedEventSink for NvdFeedHandler {
    fn on_open(&mut self, name: &str, attributes: &Attributes) -> Result<(), FeedError> {
        match NodeKind::classify(name) {
            NodeKind::Root => self.guard.verify(attributes.get(VERSION_ATTRIBUTE)),
            NodeKind::Entry => self.open_entry(attributes),
            NodeKind::Unclassified => Ok(()),
            kind => {
                if let BuilderState::InEntry(entry) = &mut self.state {
                    entry.open(kind, attributes);
                }
                Ok(())
            }
        }
    }

    fn on_text(&mut self, text: &str) {
        if let BuilderState::InEntry(entry) = &mut self.state {
            if let Some(buffer) = entry.text.as_mut() {
                buffer.text.push_str(text);
            }
        }
    }

    fn on_close(&mut self, name: &str) -> Result<(), FeedError> {
        match NodeKind::classify(name) {
            NodeKind::Entry => self.close_entry(),
            NodeKind::Root | NodeKind::Unclassified => Ok(()),
            kind => {
                if let BuilderState::InEntry(entry) = &mut self.state {
                    entry.close(kind);
                }
                Ok(())
            }
        }
    }
}
