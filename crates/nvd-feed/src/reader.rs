//! 피드 리더 -- quick-xml 이벤트를 [`FeedEventSink`]로 전달
//!
//! 토크나이저 이벤트를 문서 순서대로 한 번씩 전달합니다.
//!
//! - 빈 요소(`<a/>`)는 open + close 두 이벤트로 나눕니다.
//! - CDATA는 일반 텍스트로 전달합니다.
//! - 엔티티 참조는 전달 전에 해제합니다.
//!
//! sink가 에러를 반환하면 그 즉시 읽기를 멈추고 에러를 그대로 돌려줍니다.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::FeedError;

/// 기본 읽기 버퍼 크기 (64 KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// 요소의 속성 목록 (문서 순서)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// 빈 속성 목록을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 속성 값을 조회합니다. 같은 이름이 여러 번 나오면 첫 번째 값입니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 속성을 추가합니다.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// 속성 수
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// 속성이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 토크나이저 이벤트 수신자
pub trait FeedEventSink {
    /// 요소 시작 (속성 포함)
    fn on_open(&mut self, name: &str, attributes: &Attributes) -> Result<(), FeedError>;

    /// 문자 데이터. 한 텍스트 노드가 여러 번에 나뉘어 올 수 있습니다.
    fn on_text(&mut self, text: &str);

    /// 요소 끝
    fn on_close(&mut self, name: &str) -> Result<(), FeedError>;
}

/// 스트리밍 피드 리더
pub struct FeedReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> FeedReader<R> {
    /// 임의의 `BufRead` 위에 리더를 생성합니다.
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::with_capacity(8192),
        }
    }

    /// 지금까지 소비한 바이트 위치
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// 문서 끝까지 이벤트를 전달합니다.
    ///
    /// sink나 토크나이저의 첫 에러에서 멈춥니다.
    pub fn run<S: FeedEventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), FeedError> {
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| FeedError::Xml {
                    position: self.reader.buffer_position() as u64,
                    reason: e.to_string(),
                })?;

            match event {
                Event::Start(e) => {
                    let name = element_name(&e);
                    let attributes = collect_attributes(&e, self.reader.buffer_position())?;
                    sink.on_open(&name, &attributes)?;
                }
                Event::Empty(e) => {
                    let name = element_name(&e);
                    let attributes = collect_attributes(&e, self.reader.buffer_position())?;
                    sink.on_open(&name, &attributes)?;
                    sink.on_close(&name)?;
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    sink.on_close(&name)?;
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|err| FeedError::Xml {
                        position: self.reader.buffer_position() as u64,
                        reason: err.to_string(),
                    })?;
                    sink.on_text(&text);
                }
                Event::CData(e) => {
                    let raw = e.into_inner();
                    sink.on_text(&String::from_utf8_lossy(&raw));
                }
                Event::Eof => return Ok(()),
                // 선언, 주석, 처리 지시문, DOCTYPE
                _ => {}
            }
        }
    }
}

impl FeedReader<BufReader<File>> {
    /// 파일을 열어 리더를 생성합니다.
    pub fn from_path(path: &Path, buffer_size: usize) -> Result<Self, FeedError> {
        let file = File::open(path).map_err(|source| FeedError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufReader::with_capacity(buffer_size, file)))
    }
}

impl<'a> FeedReader<&'a [u8]> {
    /// 메모리 문자열에서 리더를 생성합니다.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn collect_attributes(e: &BytesStart<'_>, position: usize) -> Result<Attributes, FeedError> {
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| FeedError::Xml {
            position: position as u64,
            reason: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attr.unescape_value().map_err(|err| FeedError::Xml {
            position: position as u64,
            reason: err.to_string(),
        })?;
        attributes.push(key, value.into_owned());
    }
    Ok(attributes)
}
