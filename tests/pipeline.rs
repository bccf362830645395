//! End-to-end tests for the wikitopics pipeline.
//!
//! Both upstream services are replaced by in-memory fakes, so these tests
//! run offline. Time is paused where the throttle would otherwise make a
//! test take seconds.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wikitopics::{
    enrich_stream, run_with_services, segment_pages, ArticleSource, EnrichmentProgressCallback,
    PipelineConfig, ServiceError, Services, Topic, TopicExtractor, WikiTopicsError,
};

// ── Fakes ────────────────────────────────────────────────────────────────────

struct FakeWikipedia {
    pages: HashMap<String, String>,
}

impl FakeWikipedia {
    fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl ArticleSource for FakeWikipedia {
    async fn fetch_html(&self, page: &str) -> Result<String, ServiceError> {
        self.pages.get(page).cloned().ok_or(ServiceError::Status {
            status: 404,
            body: format!("no page {page}"),
        })
    }
}

/// Returns a fixed concept list, fails for text containing "FAIL", and
/// records every call with its (tokio) start time.
#[derive(Default)]
struct FakeRosette {
    calls: Mutex<Vec<String>>,
    started: Mutex<Vec<tokio::time::Instant>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Option<Duration>,
}

#[async_trait]
impl TopicExtractor for FakeRosette {
    async fn extract_topics(&self, text: &str) -> Result<Vec<Topic>, ServiceError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(text.to_string());
        self.started.lock().unwrap().push(tokio::time::Instant::now());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if text.contains("FAIL") {
            return Err(ServiceError::Status {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(vec![
            Topic::new("Q1", 0.3),
            Topic::new("X9", 0.9),
            Topic::new("Q2", 0.7),
        ])
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Parsoid-style article: optional lead block plus one `h2` section per entry.
fn article(lead: Option<&str>, sections: &[(&str, &str)]) -> String {
    let mut html = String::from("<!DOCTYPE html><html><head></head><body>");
    if let Some(lead) = lead {
        html.push_str(&format!(
            r#"<section data-mw-section-id="0"><p>{lead}</p></section>"#
        ));
    }
    for (i, (title, body)) in sections.iter().enumerate() {
        html.push_str(&format!(
            r#"<section data-mw-section-id="{}"><h2 id="s{}">{}</h2><p>{}</p></section>"#,
            i + 1,
            i + 1,
            title,
            body
        ));
    }
    html.push_str("</body></html>");
    html
}

fn config(dir: &Path) -> PipelineConfig {
    config_with_delay(dir, 0)
}

fn config_with_delay(dir: &Path, delay_ms: u64) -> PipelineConfig {
    PipelineConfig::builder()
        .name("test")
        .output_dir(dir)
        .request_delay_ms(delay_ms)
        .build()
        .unwrap()
}

fn services(wiki: FakeWikipedia, rosette: Arc<FakeRosette>) -> Services {
    Services::new(Arc::new(wiki), rosette)
}

/// Gaps between consecutive request start times.
fn start_gaps(rosette: &FakeRosette) -> Vec<Duration> {
    rosette
        .started
        .lock()
        .unwrap()
        .windows(2)
        .map(|w| w[1] - w[0])
        .collect()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_pages_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let wiki = FakeWikipedia::new(&[
        ("Albert Einstein", article(None, &[("Life", "Born in Ulm.")])),
        ("Niels Bohr", article(None, &[("Career", "Copenhagen.")])),
    ]);
    let rosette = Arc::new(FakeRosette::default());

    let output = run_with_services(
        ["Albert Einstein", "Niels Bohr"],
        &config,
        &services(wiki, rosette.clone()),
    )
    .await
    .unwrap();

    let checkpoint = read_json(&config.checkpoint_path());
    for page in ["Albert Einstein", "Niels Bohr"] {
        let sections = checkpoint[page].as_array().unwrap();
        assert_eq!(sections.len(), 1, "{page}");
        assert_eq!(sections[0]["level"], 1);
        assert_eq!(sections[0]["page"], page);
        assert!(sections[0].get("topics").is_none());
    }
    assert_eq!(checkpoint["Albert Einstein"][0]["title"], "Life");
    assert_eq!(checkpoint["Albert Einstein"][0]["content"]["text"], "LifeBorn in Ulm.");

    let enriched = read_json(&config.enriched_path());
    for page in ["Albert Einstein", "Niels Bohr"] {
        let topics = &enriched[page][0]["topics"];
        assert_eq!(
            topics,
            &serde_json::json!([
                {"conceptId": "Q2", "salience": 0.7},
                {"conceptId": "Q1", "salience": 0.3}
            ])
        );
    }

    assert_eq!(output.stats.pages_fetched, 2);
    assert_eq!(output.stats.enrichment_requests, 2);
    assert_eq!(rosette.calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn one_failed_section_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let wiki = FakeWikipedia::new(&[(
        "Niels Bohr",
        article(None, &[("One", "ok"), ("Two", "FAIL"), ("Three", "ok")]),
    )]);
    let rosette = Arc::new(FakeRosette::default());

    let output = run_with_services(["Niels Bohr"], &config, &services(wiki, rosette))
        .await
        .unwrap();

    let sections = &output.sections["Niels Bohr"];
    assert_eq!(sections.len(), 3);
    assert!(sections[0].topics.is_some());
    assert!(sections[1].topics.is_none());
    assert!(sections[2].topics.is_some());

    assert_eq!(output.stats.enrichment_requests, 3);
    assert_eq!(output.stats.enrichment_failures, 1);

    let enriched = read_json(&config.enriched_path());
    assert!(enriched["Niels Bohr"][1].get("topics").is_none());
    assert_eq!(enriched["Niels Bohr"][1]["title"], "Two");
}

#[tokio::test(start_paused = true)]
async fn requests_are_serialised_and_throttled() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_delay(dir.path(), 1000);
    let wiki = FakeWikipedia::new(&[(
        "P",
        article(Some("lead"), &[("A", "FAIL"), ("B", "b")]),
    )]);
    let rosette = Arc::new(FakeRosette {
        latency: Some(Duration::from_millis(200)),
        ..Default::default()
    });

    let start = tokio::time::Instant::now();
    let output = run_with_services(["P"], &config, &services(wiki, rosette.clone()))
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(output.stats.enrichment_requests, 3);
    assert_eq!(output.stats.enrichment_failures, 1);
    assert_eq!(rosette.max_in_flight.load(Ordering::SeqCst), 1);

    // The first request waits out a full delay too.
    let first = rosette.started.lock().unwrap()[0];
    assert!(first - start >= Duration::from_millis(1000));

    // The request after the failed one ("B") is delayed like any other.
    let gaps = start_gaps(&rosette);
    assert_eq!(gaps.len(), 2);
    for gap in &gaps {
        assert!(*gap >= Duration::from_millis(1000), "gap {gap:?}");
    }

    // Three sections: 3 × (1000 ms delay + 200 ms latency).
    assert!(elapsed >= Duration::from_millis(3600), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn request_delay_comes_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let wiki = || FakeWikipedia::new(&[("P", article(Some("lead"), &[("A", "a"), ("B", "b")]))]);

    // No delay configured: injected services add none of their own.
    let rosette = Arc::new(FakeRosette::default());
    let start = tokio::time::Instant::now();
    run_with_services(
        ["P"],
        &config_with_delay(dir.path(), 0),
        &services(wiki(), rosette.clone()),
    )
    .await
    .unwrap();
    assert_eq!(rosette.calls.lock().unwrap().len(), 3);
    assert!(start.elapsed() < Duration::from_millis(1000));

    // A custom delay is used as-is.
    let rosette = Arc::new(FakeRosette::default());
    run_with_services(
        ["P"],
        &config_with_delay(dir.path(), 250),
        &services(wiki(), rosette.clone()),
    )
    .await
    .unwrap();
    for gap in start_gaps(&rosette) {
        assert!(gap >= Duration::from_millis(250), "gap {gap:?}");
        assert!(gap < Duration::from_millis(1000), "gap {gap:?}");
    }
}

#[tokio::test]
async fn sections_are_enriched_page_then_section() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let wiki = FakeWikipedia::new(&[
        ("B", article(Some("b0"), &[("B1", "b1")])),
        ("A", article(Some("a0"), &[("A1", "a1"), ("A2", "a2")])),
    ]);
    let rosette = Arc::new(FakeRosette::default());
    let services = services(wiki, rosette.clone());

    let (sections, _) = segment_pages(["B", "A"], &config, &services).await.unwrap();
    let order: Vec<(String, String, usize)> = enrich_stream(sections, &services, &config)
        .map(|e| (e.page.clone(), e.section.title.clone(), e.index))
        .collect()
        .await;

    assert_eq!(
        order,
        vec![
            ("B".into(), "__intro__".into(), 1),
            ("B".into(), "B1".into(), 2),
            ("A".into(), "__intro__".into(), 3),
            ("A".into(), "A1".into(), 4),
            ("A".into(), "A2".into(), 5),
        ]
    );
    let calls = rosette.calls.lock().unwrap();
    assert_eq!(calls[0], "b0");
    assert_eq!(calls[4], "A2a2");
}

#[tokio::test]
async fn oversized_sections_never_reach_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .name("test")
        .output_dir(dir.path())
        .request_delay_ms(0)
        .max_section_chars(20)
        .build()
        .unwrap();
    let long = "x".repeat(40);
    let wiki = FakeWikipedia::new(&[("P", article(Some("short"), &[("Long", long.as_str())]))]);
    let rosette = Arc::new(FakeRosette::default());

    let output = run_with_services(["P"], &config, &services(wiki, rosette.clone()))
        .await
        .unwrap();

    assert_eq!(output.stats.sections_segmented, 2);
    assert_eq!(output.stats.sections_oversized, 1);
    assert_eq!(output.sections["P"].len(), 1);
    assert_eq!(read_json(&config.checkpoint_path())["P"].as_array().unwrap().len(), 1);
    assert_eq!(rosette.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_page_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let wiki = FakeWikipedia::new(&[("Here", article(Some("lead"), &[]))]);

    let output = run_with_services(
        ["Here", "Gone", "Here"],
        &config,
        &services(wiki, Arc::new(FakeRosette::default())),
    )
    .await
    .unwrap();

    assert_eq!(output.stats.pages_requested, 2);
    assert_eq!(output.stats.pages_failed, 1);
    let checkpoint = read_json(&config.checkpoint_path());
    assert!(checkpoint.get("Here").is_some());
    assert!(checkpoint.get("Gone").is_none());
}

#[tokio::test]
async fn fatal_fetch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();

    let err = run_with_services(
        ["Gone"],
        &config(dir.path()),
        &services(FakeWikipedia::new(&[]), Arc::new(FakeRosette::default())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WikiTopicsError::AllPagesFailed { total: 1, .. }));

    let strict = PipelineConfig::builder()
        .name("test")
        .output_dir(dir.path())
        .strict_fetch(true)
        .build()
        .unwrap();
    let wiki = FakeWikipedia::new(&[("Here", article(Some("lead"), &[]))]);
    let err = run_with_services(
        ["Here", "Gone"],
        &strict,
        &services(wiki, Arc::new(FakeRosette::default())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WikiTopicsError::FetchFailed { .. }));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn segment_only_writes_checkpoint_alone() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .name("test")
        .output_dir(dir.path())
        .skip_enrichment(true)
        .build()
        .unwrap();
    let wiki = FakeWikipedia::new(&[("P", article(Some("lead"), &[("A", "a")]))]);
    let rosette = Arc::new(FakeRosette::default());

    let output = run_with_services(["P"], &config, &services(wiki, rosette.clone()))
        .await
        .unwrap();

    assert!(config.checkpoint_path().exists());
    assert!(!config.enriched_path().exists());
    assert_eq!(output.stats.enrichment_requests, 0);
    assert!(rosette.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn write_failure_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    // The output "directory" is a regular file, so every write fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let config = PipelineConfig::builder()
        .name("test")
        .output_dir(&blocker)
        .request_delay_ms(0)
        .build()
        .unwrap();
    let wiki = FakeWikipedia::new(&[("P", article(Some("lead"), &[]))]);

    let output = run_with_services(
        ["P"],
        &config,
        &services(wiki, Arc::new(FakeRosette::default())),
    )
    .await
    .unwrap();

    assert_eq!(output.stats.enrichment_requests, 1);
    assert!(output.sections["P"][0].topics.is_some());
}

#[tokio::test]
async fn progress_callback_sees_every_section() {
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl EnrichmentProgressCallback for Recorder {
        fn on_enrichment_start(&self, total: usize) {
            self.events.lock().unwrap().push(format!("start {total}"));
        }
        fn on_section_start(&self, _p: &str, title: &str, _l: u32, index: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("begin {title} {index}/{total}"));
        }
        fn on_section_complete(&self, _p: &str, title: &str, _l: u32, topics: usize) {
            self.events.lock().unwrap().push(format!("ok {title} {topics}"));
        }
        fn on_section_error(&self, _p: &str, title: &str, _l: u32, _e: &str) {
            self.events.lock().unwrap().push(format!("err {title}"));
        }
        fn on_enrichment_complete(&self, requests: usize, failures: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {requests} {failures}"));
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let recorder = Arc::new(Recorder::default());
    let config = PipelineConfig::builder()
        .name("test")
        .output_dir(dir.path())
        .request_delay_ms(0)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let wiki = FakeWikipedia::new(&[("P", article(Some("lead"), &[("Bad", "FAIL")]))]);

    run_with_services(
        ["P"],
        &config,
        &services(wiki, Arc::new(FakeRosette::default())),
    )
    .await
    .unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec![
            "start 2",
            "begin __intro__ 1/2",
            "ok __intro__ 2",
            "begin Bad 2/2",
            "err Bad",
            "done 2 1",
        ]
    );
}

/// Shared in-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn run_logs_progress_events() {
    let logs = LogBuffer::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let wiki = FakeWikipedia::new(&[(
        "Niels Bohr",
        article(Some("lead"), &[("Career", "FAIL"), ("Legacy", "ok")]),
    )]);

    run_with_services(
        ["Niels Bohr"],
        &config,
        &services(wiki, Arc::new(FakeRosette::default())),
    )
    .await
    .unwrap();

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(text.contains("Number of sections: 3"), "{text}");
    assert!(text.contains("Niels Bohr -> Legacy (level 1) -- Topics fetched: 2"));
    assert!(text.contains("Topic extraction failed (Niels Bohr)"));
    assert!(text.contains("Total requests to Rosette: 3"));
    assert!(text.contains("wikisections-test.json"));
    assert!(text.contains("sectionswithtopics-test.json"));
}
