//! 피드 수집기 -- 설정에서 협력자를 구성하고 피드 하나를 끝까지 처리
//!
//! # 내부 아키텍처
//!
//! ```text
//! feed.xml --> FeedReader (quick-xml) --> NvdFeedHandler --> CommitPipeline
//!                                             |                 |      |
//!                                         Counters     JsonLinesStore MemoryIndex
//!                                                              |        |
//!                                                      records.jsonl  index.json
//! ```
//!
//! 피드 하나는 하나의 스레드에서 동기적으로 처리됩니다. 여러 피드를 병렬로
//! 처리하려면 피드마다 별도의 [`FeedIngestor`]를 만들어야 합니다.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::commit::{CommitPipeline, CommitTotals};
use crate::config::NvdFeedConfig;
use crate::counters::Counters;
use crate::error::FeedError;
use crate::handler::NvdFeedHandler;
use crate::history::HistoricalVersionIndex;
use crate::reader::FeedReader;
use crate::store::{JsonLinesStore, MemoryIndex};

/// 수집 한 번의 결과
///
/// 중단된 경우에도 중단 시점까지의 카운터를 담습니다.
#[derive(Debug)]
pub struct IngestSummary {
    /// 처리한 피드 경로 (메모리 입력이면 `<memory>`)
    pub source: String,
    /// 엔트리 카운터
    pub counters: Counters,
    /// 커밋 누계
    pub totals: CommitTotals,
    /// 루트 스키마 검증 통과 여부
    pub schema_verified: bool,
    /// 소요 시간
    pub elapsed: Duration,
    /// 중단 원인 (성공이면 `None`)
    pub error: Option<FeedError>,
}

impl IngestSummary {
    /// 끝까지 처리했는지 여부
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// NVD 피드 수집기
pub struct FeedIngestor {
    config: NvdFeedConfig,
    pipeline: CommitPipeline,
    store: Option<Arc<JsonLinesStore>>,
    index: Option<Arc<MemoryIndex>>,
}

impl FeedIngestor {
    /// 설정으로 수집기를 생성합니다.
    ///
    /// 이력 인덱스를 읽고, dry-run이 아니면 스토어 파일을 엽니다.
    /// `index_path`가 있으면 메모리 인덱스를 만들고 수집이 끝난 뒤 덤프합니다.
    pub fn from_config(config: NvdFeedConfig) -> Result<Self, FeedError> {
        config.validate()?;

        let history = match &config.history_path {
            Some(path) => {
                HistoricalVersionIndex::load_from_file(Path::new(path), config.max_history_size)?
            }
            None => HistoricalVersionIndex::empty(),
        };

        let mut builder = CommitPipeline::builder().history(Arc::new(history));
        let mut store = None;
        let mut index = None;

        if config.dry_run {
            info!(feed = %config.feed_path, "dry run, no records will be written");
        } else if let Some(store_path) = &config.store_path {
            let opened = Arc::new(JsonLinesStore::open(store_path).map_err(|source| {
                FeedError::Io {
                    path: store_path.clone(),
                    source,
                }
            })?);
            builder = builder.store(opened.clone());
            store = Some(opened);

            if config.index_path.is_some() {
                let created = Arc::new(MemoryIndex::new());
                builder = builder.index(created.clone());
                index = Some(created);
            }
        }

        Ok(Self {
            config,
            pipeline: builder.build(),
            store,
            index,
        })
    }

    /// 이미 구성된 파이프라인으로 수집기를 생성합니다.
    ///
    /// 스토어 flush와 인덱스 덤프는 하지 않습니다.
    pub fn with_pipeline(config: NvdFeedConfig, pipeline: CommitPipeline) -> Self {
        Self {
            config,
            pipeline,
            store: None,
            index: None,
        }
    }

    /// 수집기 설정
    pub fn config(&self) -> &NvdFeedConfig {
        &self.config
    }

    /// 설정에서 연 JSON Lines 스토어
    pub fn store(&self) -> Option<&Arc<JsonLinesStore>> {
        self.store.as_ref()
    }

    /// 설정에서 만든 메모리 인덱스
    pub fn index(&self) -> Option<&Arc<MemoryIndex>> {
        self.index.as_ref()
    }

    /// 설정된 피드 파일을 처리합니다.
    pub fn run(&self) -> IngestSummary {
        let path = Path::new(&self.config.feed_path);
        match FeedReader::from_path(path, self.config.read_buffer_size) {
            Ok(mut reader) => self.ingest(&mut reader, self.config.feed_path.clone()),
            Err(e) => {
                error!(feed = %self.config.feed_path, error = %e, "failed to open feed");
                IngestSummary {
                    source: self.config.feed_path.clone(),
                    counters: Counters::default(),
                    totals: CommitTotals::default(),
                    schema_verified: false,
                    elapsed: Duration::ZERO,
                    error: Some(e),
                }
            }
        }
    }

    /// 메모리나 임의의 `BufRead`에서 피드를 처리합니다.
    pub fn run_reader<R: BufRead>(&self, source: R) -> IngestSummary {
        let mut reader = FeedReader::new(source);
        self.ingest(&mut reader, "<memory>".to_owned())
    }

    fn ingest<R: BufRead>(&self, reader: &mut FeedReader<R>, source: String) -> IngestSummary {
        let started = Instant::now();
        let mut handler = NvdFeedHandler::new(self.pipeline.clone());

        let mut result = reader.run(&mut handler);
        if let Err(e) = self.finish() {
            if result.is_ok() {
                result = Err(e);
            } else {
                warn!(error = %e, "output finalization failed after aborted ingest");
            }
        }

        let summary = IngestSummary {
            source,
            counters: handler.counters(),
            totals: handler.commit_totals(),
            schema_verified: handler.schema_verified(),
            elapsed: started.elapsed(),
            error: result.err(),
        };

        match &summary.error {
            None => info!(
                feed = %summary.source,
                total_entries = summary.counters.total_entries,
                relevant_entries = summary.counters.relevant_entries,
                persisted = summary.totals.persisted,
                merged = summary.totals.merged,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "feed ingest completed"
            ),
            Some(e) => error!(
                feed = %summary.source,
                total_entries = summary.counters.total_entries,
                relevant_entries = summary.counters.relevant_entries,
                position = reader.position(),
                error = %e,
                "feed ingest aborted"
            ),
        }

        summary
    }

    /// 스토어를 flush하고 인덱스를 덤프합니다.
    fn finish(&self) -> Result<(), FeedError> {
        if let Some(store) = &self.store {
            store.flush().map_err(|e| FeedError::Output {
                path: store.path().display().to_string(),
                reason: e.to_string(),
            })?;
        }

        if let (Some(index), Some(index_path)) = (&self.index, &self.config.index_path) {
            index
                .save_to(Path::new(index_path))
                .map_err(|e| FeedError::Output {
                    path: index_path.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(())
    }
}
