//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `vulnfeed_`
//! - 모듈명: `nvd_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(vulnfeed_core::metrics::NVD_ENTRIES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 실패 단계 레이블 키 (merge, index, persist)
pub const LABEL_STAGE: &str = "stage";

// ─── NVD 피드 메트릭 ────────────────────────────────────────────────

/// NVD: 파싱된 전체 엔트리 수 (counter)
pub const NVD_ENTRIES_TOTAL: &str = "vulnfeed_nvd_entries_total";

/// NVD: 애플리케이션 CPE를 가진 엔트리 수 (counter)
pub const NVD_RELEVANT_ENTRIES_TOTAL: &str = "vulnfeed_nvd_relevant_entries_total";

/// NVD: CVSS 점수 파싱 실패 수 (counter)
pub const NVD_SCORE_PARSE_ERRORS_TOTAL: &str = "vulnfeed_nvd_score_parse_errors_total";

/// NVD: 커밋 실패 수 (counter, label: stage)
pub const NVD_COMMIT_FAILURES_TOTAL: &str = "vulnfeed_nvd_commit_failures_total";

/// NVD: 이력 인덱스에서 병합된 식별자 수 (counter)
pub const NVD_HISTORICAL_MERGES_TOTAL: &str = "vulnfeed_nvd_historical_merges_total";

/// NVD: 엔트리 커밋 소요 시간 (histogram, 초)
pub const NVD_COMMIT_DURATION_SECONDS: &str = "vulnfeed_nvd_commit_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(NVD_ENTRIES_TOTAL, "Total number of feed entries parsed");
    describe_counter!(
        NVD_RELEVANT_ENTRIES_TOTAL,
        "Entries carrying at least one application CPE"
    );
    describe_counter!(
        NVD_SCORE_PARSE_ERRORS_TOTAL,
        "CVSS score values that failed numeric parsing"
    );
    describe_counter!(
        NVD_COMMIT_FAILURES_TOTAL,
        "Entry commits aborted by an index or store failure"
    );
    describe_counter!(
        NVD_HISTORICAL_MERGES_TOTAL,
        "Affected-software identifiers merged from the historical version index"
    );
    describe_histogram!(
        NVD_COMMIT_DURATION_SECONDS,
        "Time spent committing one entry to the index and store"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_use_prefix() {
        let names = [
            NVD_ENTRIES_TOTAL,
            NVD_RELEVANT_ENTRIES_TOTAL,
            NVD_SCORE_PARSE_ERRORS_TOTAL,
            NVD_COMMIT_FAILURES_TOTAL,
            NVD_HISTORICAL_MERGES_TOTAL,
            NVD_COMMIT_DURATION_SECONDS,
        ];
        for name in names {
            assert!(name.starts_with("vulnfeed_nvd_"), "{name}");
        }
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        // 레코더가 없으면 no-op 이어야 함
        describe_all();
    }
}
