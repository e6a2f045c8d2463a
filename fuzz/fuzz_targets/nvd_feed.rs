#![no_main]

use libfuzzer_sys::fuzz_target;
use vulnfeed_nvd::{CommitPipeline, FeedReader, NvdFeedHandler};

fuzz_target!(|data: &[u8]| {
    let mut handler = NvdFeedHandler::new(CommitPipeline::dry_run());
    let _ = FeedReader::new(data).run(&mut handler);

    let counters = handler.counters();
    assert!(counters.relevant_entries <= counters.total_entries);
    // 루트 검증 전에는 엔트리가 집계되지 않아야 함
    if !handler.schema_verified() {
        assert_eq!(counters.total_entries, 0);
    }
});
