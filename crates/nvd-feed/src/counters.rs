//! 엔트리 카운터
//!
//! 엔트리가 닫힐 때마다 정확히 한 번 증가합니다. 스트림 도중에도 읽을 수 있지만
//! 스트림이 끝난 뒤의 값만 확정값입니다.

use serde::Serialize;

/// 전체/관련 엔트리 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// 닫힌 엔트리 수 (관련성 무관)
    pub total_entries: u64,
    /// 애플리케이션 CPE를 가진 엔트리 수
    pub relevant_entries: u64,
}

impl Counters {
    /// 엔트리 하나가 닫혔음을 기록합니다.
    pub fn record_entry(&mut self, relevant: bool) {
        self.total_entries += 1;
        metrics::counter!(vulnfeed_core::metrics::NVD_ENTRIES_TOTAL).increment(1);

        if relevant {
            self.relevant_entries += 1;
            metrics::counter!(vulnfeed_core::metrics::NVD_RELEVANT_ENTRIES_TOTAL).increment(1);
        }
    }

    /// 관련 없는 엔트리 수
    pub fn skipped_entries(&self) -> u64 {
        self.total_entries - self.relevant_entries
    }
}
