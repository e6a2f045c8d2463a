#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`FeedError`, `CommitError`, `StoreError`, `IndexError`)
//! - [`config`]: Ingest configuration (`NvdFeedConfig`, builder)
//! - [`types`]: Domain types (`VulnerabilityRecord`, `Reference`, `AffectedSoftware`, `CvssFacets`)
//! - [`cpe`]: CPE 2.2 URI parsing (`CpeUri`, `CpePart`)
//! - [`tag`]: Tag classifier (`NodeKind`)
//! - [`schema`]: Root schema version guard (`SchemaGuard`)
//! - [`handler`]: Entry builder state machine (`NvdFeedHandler`)
//! - [`commit`]: Commit pipeline (`CommitPipeline`, builder)
//! - [`counters`]: Entry counters (`Counters`)
//! - [`history`]: Historical version index (`HistoricalVersionIndex`)
//! - [`store`]: Collaborator traits and implementations (`VulnerabilityStore`, `SearchIndex`)
//! - [`reader`]: quick-xml event adapter (`FeedReader`, `FeedEventSink`)
//! - [`ingest`]: Orchestrator (`FeedIngestor`, `IngestSummary`)

pub mod commit;
pub mod config;
pub mod counters;
pub mod cpe;
pub mod error;
pub mod handler;
pub mod history;
pub mod ingest;
pub mod reader;
pub mod schema;
pub mod store;
pub mod tag;
pub mod types;

// --- Public API Re-exports ---

// Orchestrator
pub use ingest::{FeedIngestor, IngestSummary};

// Configuration
pub use config::{NvdFeedConfig, NvdFeedConfigBuilder};

// Error
pub use error::{CommitError, FeedError, IndexError, NumericParseError, StoreError};

// Types
pub use cpe::{CpeParseError, CpePart, CpeUri};
pub use types::{AffectedSoftware, CvssFacet, CvssFacets, Reference, VulnerabilityRecord};

// Parsing
pub use counters::Counters;
pub use handler::NvdFeedHandler;
pub use reader::{Attributes, FeedEventSink, FeedReader};
pub use schema::{SUPPORTED_SCHEMA_VERSION, SchemaGuard};
pub use tag::NodeKind;

// Commit
pub use commit::{CommitOutcome, CommitPipeline, CommitPipelineBuilder, CommitTotals};
pub use history::HistoricalVersionIndex;
pub use store::{IndexEntry, JsonLinesStore, MemoryIndex, MemoryStore, SearchIndex, VulnerabilityStore};
