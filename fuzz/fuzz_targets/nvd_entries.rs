#![no_main]

use std::fmt::Write as _;
use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vulnfeed_nvd::{CommitPipeline, FeedReader, MemoryIndex, MemoryStore, NvdFeedHandler};

/// 퍼저용 구조적 입력: 스키마가 맞는 피드에 임의의 엔트리를 채움
#[derive(Arbitrary, Debug)]
struct FuzzEntry {
    id: String,
    products: Vec<String>,
    score: String,
    summary: String,
    english: bool,
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fuzz_target!(|entries: Vec<FuzzEntry>| {
    // 엔트리 수 제한
    if entries.len() > 32 {
        return;
    }

    let mut xml = String::from(r#"<nvd nvd_xml_version="2.0">"#);
    for entry in &entries {
        let _ = write!(xml, r#"<entry id="{}"><vuln:vulnerable-software-list>"#, escape(&entry.id));
        for product in entry.products.iter().take(8) {
            let _ = write!(xml, "<vuln:product>{}</vuln:product>", escape(product));
        }
        let lang = if entry.english { "en" } else { "fr" };
        let _ = write!(
            xml,
            r#"</vuln:vulnerable-software-list><cvss:score>{}</cvss:score><vuln:references xml:lang="{lang}"><vuln:source>S</vuln:source><vuln:reference href="http://x">r</vuln:reference></vuln:references><vuln:summary>{}</vuln:summary></entry>"#,
            escape(&entry.score),
            escape(&entry.summary),
        );
    }
    xml.push_str("</nvd>");

    let store = Arc::new(MemoryStore::new());
    let pipeline = CommitPipeline::builder()
        .store(store.clone())
        .index(Arc::new(MemoryIndex::new()))
        .build();
    let mut handler = NvdFeedHandler::new(pipeline);
    let result = FeedReader::from_str(&xml).run(&mut handler);

    let counters = handler.counters();
    if result.is_ok() {
        assert_eq!(counters.total_entries, entries.len() as u64);
    }
    assert!(counters.relevant_entries <= counters.total_entries);
    assert!(store.len() as u64 <= counters.relevant_entries);
});
