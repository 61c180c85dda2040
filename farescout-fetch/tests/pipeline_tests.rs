//! Integration tests for adapters, the orchestrator and end-to-end search.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use url::Url;

use farescout_core::{
    AirportCode, AirportTable, FailureKind, FlightQuery, FlightRecord, InterpretError, Price,
    QueryInterpreter, ReportStatus, SourceId, SourceOutcome,
};
use farescout_fetch::{
    AdapterError, ExactSelector, Extractor, FetchContext, FetchSettings, FieldRules,
    FixtureResponse, FlightSearch, MemoryArtifacts, Orchestrator, ReadySignal, SiteAdapter,
    SourceAdapter, SourceSite, StaticRenderer, aggregate,
};

// ============================================================================
// Fixtures
// ============================================================================

fn query() -> FlightQuery {
    FlightQuery::new(
        AirportCode::new("DEL").unwrap(),
        AirportCode::new("BOM").unwrap(),
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        "from delhi to mumbai on 2 november",
    )
}

fn record(source: SourceId, price: u32) -> FlightRecord {
    FlightRecord {
        airline: "IndiGo".to_string(),
        flight_code: Some("6E-2134".to_string()),
        price: Price::from(price),
        departure_time: Some("06:05".parse().unwrap()),
        arrival_time: Some("08:10".parse().unwrap()),
        duration_minutes: Some(125),
        stop_count: 0,
        source,
        booking_reference: String::new(),
        departure_city: None,
        arrival_city: None,
        scraped_at: Utc::now(),
    }
}

const RESULTS_PAGE: &str = r#"
<html><body>
  <div class="card">IndiGo 6E-2134 06:05 08:10 2h 05m Non-stop ₹4,200</div>
  <div class="card">Air India AI-803 10:00 12:10 ₹5,350</div>
  <div class="card">Promo: flat ₹500 off</div>
</body></html>
"#;

struct TestSite {
    source: SourceId,
    extractor: Extractor,
}

impl TestSite {
    fn new(source: SourceId) -> Self {
        Self {
            source,
            extractor: Extractor::new(FieldRules::default(), 10)
                .with_strategy(ExactSelector::new("div.card")),
        }
    }
}

impl SourceSite for TestSite {
    fn source(&self) -> SourceId {
        self.source
    }

    fn request_url(&self, query: &FlightQuery, _airports: &AirportTable) -> Result<Url, AdapterError> {
        Url::parse(&format!(
            "https://{}.test/search?from={}&to={}",
            self.source.prefix(),
            query.origin,
            query.destination
        ))
        .map_err(|e| AdapterError::InvalidRequest(e.to_string()))
    }

    fn ready_signal(&self) -> ReadySignal {
        ReadySignal::Selector("div.card".to_string())
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn ready_timeout(&self) -> Duration {
        Duration::from_secs(15)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_secs(3)
    }

    fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    fn detect_block(&self, content: &str) -> Option<String> {
        content
            .contains("Access Denied")
            .then(|| "Access Denied page served".to_string())
    }
}

fn context(renderer: StaticRenderer) -> FetchContext {
    FetchContext::builder()
        .renderer(Arc::new(renderer))
        .settings(FetchSettings::default().without_settle())
        .build()
}

async fn fetch_with(renderer: StaticRenderer) -> SourceOutcome {
    let adapter = SiteAdapter::new(TestSite::new(SourceId::Cleartrip));
    adapter.fetch(&query(), &context(renderer)).await
}

// ============================================================================
// Site Adapter
// ============================================================================

#[tokio::test]
async fn test_adapter_extracts_records() {
    let renderer = StaticRenderer::new().page("https://cleartrip.test/", RESULTS_PAGE);
    let stats = renderer.stats();
    let outcome = fetch_with(renderer).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.records.len(), 2);
    let first = &outcome.records[0];
    assert_eq!(first.source, SourceId::Cleartrip);
    assert_eq!(first.price, Price::from(4200));
    assert_eq!(first.stop_count, 0);
    assert_eq!(first.duration_minutes, Some(125));
    assert_eq!(
        first.booking_reference,
        "https://cleartrip.test/search?from=DEL&to=BOM"
    );
    assert_eq!(stats.opened(), 1);
    assert_eq!(stats.closed(), 1);
}

#[tokio::test]
async fn test_adapter_failure_kinds() {
    let cases = [
        (FixtureResponse::NavigationTimeout, FailureKind::NavigationTimeout),
        (
            FixtureResponse::NavigationError("net::ERR_NAME_NOT_RESOLVED".into()),
            FailureKind::NavigationFailed,
        ),
        (
            FixtureResponse::NeverReady("<p>Loading…</p>".into()),
            FailureKind::ResultsWaitTimeout,
        ),
        (
            FixtureResponse::Page("<h1>Access Denied</h1>".into()),
            FailureKind::Blocked,
        ),
        (
            FixtureResponse::Page(r#"<div class="card">Sold out</div>"#.into()),
            FailureKind::NoRecordsExtracted,
        ),
    ];

    for (response, expected) in cases {
        let renderer = StaticRenderer::new().route("https://cleartrip.test/", response);
        let stats = renderer.stats();
        let outcome = fetch_with(renderer).await;

        assert!(!outcome.succeeded);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.failure_kind, Some(expected));
        assert!(outcome.error_entry().unwrap().starts_with("Cleartrip: "));
        assert_eq!(stats.closed(), 1, "session not released for {expected:?}");
    }
}

#[tokio::test]
async fn test_navigation_timeout_message() {
    let renderer =
        StaticRenderer::new().route("https://cleartrip.test/", FixtureResponse::NavigationTimeout);
    let outcome = fetch_with(renderer).await;
    assert_eq!(
        outcome.error_detail.as_deref(),
        Some("Timeout 60000ms exceeded navigating to https://cleartrip.test/search?from=DEL&to=BOM")
    );
}

#[tokio::test]
async fn test_release_failure_is_swallowed() {
    let renderer = StaticRenderer::new()
        .page("https://cleartrip.test/", RESULTS_PAGE)
        .failing_close();
    let outcome = fetch_with(renderer).await;
    assert!(outcome.succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_slow_release_is_bounded() {
    let renderer = StaticRenderer::new()
        .page("https://cleartrip.test/", RESULTS_PAGE)
        .slow_close(Duration::from_secs(60));
    let stats = renderer.stats();
    let ctx = FetchContext::builder()
        .renderer(Arc::new(renderer))
        .settings(
            FetchSettings::default()
                .without_settle()
                .with_release_timeout(Duration::from_secs(5)),
        )
        .build();

    let adapter = SiteAdapter::new(TestSite::new(SourceId::Cleartrip));
    let started = tokio::time::Instant::now();
    let outcome = adapter.fetch(&query(), &ctx).await;

    assert!(outcome.succeeded);
    assert!(started.elapsed() < Duration::from_secs(60));
    // The close never completed.
    assert_eq!(stats.closed(), 0);
}

#[tokio::test]
async fn test_panic_in_drive_releases_then_unwinds() {
    let renderer = StaticRenderer::new()
        .route("https://cleartrip.test/", FixtureResponse::Panic("renderer crashed".into()));
    let stats = renderer.stats();
    let ctx = context(renderer);

    let orchestrator =
        Orchestrator::with_adapters(vec![Box::new(SiteAdapter::new(TestSite::new(SourceId::Cleartrip)))]);
    let run = orchestrator.run(&query(), &ctx).await;

    assert_eq!(stats.closed(), 1);
    let outcome = &run.outcomes[0];
    assert_eq!(outcome.failure_kind, Some(FailureKind::UnexpectedAdapterFailure));
    assert_eq!(run.errors, vec!["Cleartrip: renderer crashed".to_string()]);
}

#[tokio::test]
async fn test_candidate_cap_override() {
    let renderer = StaticRenderer::new().page("https://cleartrip.test/", RESULTS_PAGE);
    let ctx = FetchContext::builder()
        .renderer(Arc::new(renderer))
        .settings(
            FetchSettings::default()
                .without_settle()
                .with_max_candidates(SourceId::Cleartrip, 1),
        )
        .build();
    let adapter = SiteAdapter::new(TestSite::new(SourceId::Cleartrip));
    let outcome = adapter.fetch(&query(), &ctx).await;
    assert_eq!(outcome.records.len(), 1);
}

#[tokio::test]
async fn test_debug_artifacts_written() {
    let sink = Arc::new(MemoryArtifacts::new());
    let ctx = FetchContext::builder()
        .renderer(Arc::new(
            StaticRenderer::new().page("https://cleartrip.test/", RESULTS_PAGE),
        ))
        .settings(FetchSettings::default().without_settle().with_debug_artifacts())
        .artifacts(sink.clone())
        .build();

    let adapter = SiteAdapter::new(TestSite::new(SourceId::Cleartrip));
    let outcome = adapter.fetch(&query(), &ctx).await;
    assert!(outcome.succeeded);

    let pages = sink.pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].0, SourceId::Cleartrip);
    assert!(pages[0].1.contains("6E-2134"));

    let dumps = sink.dumps();
    assert_eq!(dumps.len(), 1);
    assert_eq!(dumps[0].1.platform, "Cleartrip");
    assert_eq!(dumps[0].1.flights.len(), 2);
}

// ============================================================================
// Orchestrator
// ============================================================================

#[derive(Clone)]
enum Behaviour {
    Records(Vec<u32>),
    Fail(FailureKind, &'static str),
    Panic,
}

struct MockAdapter {
    source: SourceId,
    behaviour: Behaviour,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockAdapter {
    fn boxed(source: SourceId, behaviour: Behaviour, calls: &Arc<AtomicUsize>) -> Box<dyn SourceAdapter> {
        Box::new(Self {
            source,
            behaviour,
            delay: Duration::from_millis(5),
            calls: Arc::clone(calls),
        })
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn source(&self) -> SourceId {
        self.source
    }

    async fn fetch(&self, _query: &FlightQuery, _ctx: &FetchContext) -> SourceOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.behaviour {
            Behaviour::Records(prices) => SourceOutcome::success(
                self.source,
                prices.iter().map(|p| record(self.source, *p)).collect(),
            ),
            Behaviour::Fail(kind, detail) => SourceOutcome::failure(self.source, *kind, *detail),
            Behaviour::Panic => panic!("adapter exploded"),
        }
    }
}

fn orchestrator(behaviours: [Behaviour; 3], calls: &Arc<AtomicUsize>) -> Orchestrator {
    let [a, b, c] = behaviours;
    Orchestrator::with_adapters(vec![
        MockAdapter::boxed(SourceId::MakeMyTrip, a, calls),
        MockAdapter::boxed(SourceId::Cleartrip, b, calls),
        MockAdapter::boxed(SourceId::EaseMyTrip, c, calls),
    ])
}

#[tokio::test]
async fn test_panicking_adapter_is_isolated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orch = orchestrator(
        [
            Behaviour::Panic,
            Behaviour::Records(vec![4100]),
            Behaviour::Records(vec![3900]),
        ],
        &calls,
    );

    let run = orch.run(&query(), &FetchContext::new()).await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(run.outcomes.len(), 3);
    assert_eq!(
        run.outcomes[0].failure_kind,
        Some(FailureKind::UnexpectedAdapterFailure)
    );
    assert_eq!(run.outcomes[1].records[0].price, Price::from(4100));
    assert_eq!(run.errors, vec!["MMT: adapter exploded".to_string()]);
    assert_eq!(
        run.succeeded_sources(),
        vec![SourceId::Cleartrip, SourceId::EaseMyTrip]
    );
}

#[tokio::test]
async fn test_middle_adapter_panic_keeps_neighbours() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orch = orchestrator(
        [
            Behaviour::Records(vec![4800]),
            Behaviour::Panic,
            Behaviour::Records(vec![4300]),
        ],
        &calls,
    );

    let run = orch.run(&query(), &FetchContext::new()).await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        run.outcomes[1].failure_kind,
        Some(FailureKind::UnexpectedAdapterFailure)
    );
    assert_eq!(run.errors, vec!["Cleartrip: adapter exploded".to_string()]);

    let report = aggregate(&query(), &run);
    let prices: Vec<Price> = report.all_records.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![Price::from(4800), Price::from(4300)]);
    assert_eq!(
        report.sources_succeeded,
        vec![SourceId::MakeMyTrip, SourceId::EaseMyTrip]
    );
    assert_eq!(report.cheapest.map(|r| r.source), Some(SourceId::EaseMyTrip));
    assert_eq!(report.status, ReportStatus::Found);
}

#[tokio::test]
async fn test_error_log_follows_adapter_order_around_a_panic() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orch = orchestrator(
        [
            Behaviour::Fail(FailureKind::NavigationTimeout, "Timeout 100000ms exceeded"),
            Behaviour::Panic,
            Behaviour::Fail(FailureKind::ResultsWaitTimeout, "waited"),
        ],
        &calls,
    );

    let run = orch.run(&query(), &FetchContext::new()).await;

    assert_eq!(
        run.errors,
        vec![
            "MMT: Timeout 100000ms exceeded".to_string(),
            "Cleartrip: adapter exploded".to_string(),
            "EMT: waited".to_string(),
        ]
    );
    let report = aggregate(&query(), &run);
    assert_eq!(report.status, ReportStatus::AllSourcesFailed);
    assert_eq!(&report.errors[..3], &run.errors[..]);
}

#[tokio::test]
async fn test_adapters_run_sequentially_in_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let orch = orchestrator(
        [
            Behaviour::Records(vec![4200]),
            Behaviour::Fail(FailureKind::ResultsWaitTimeout, "waited"),
            Behaviour::Records(vec![5100]),
        ],
        &calls,
    );

    let run = orch.run(&query(), &FetchContext::new()).await;

    let sources: Vec<SourceId> = run.attempts.iter().map(|a| a.source).collect();
    assert_eq!(sources, SourceId::all().to_vec());
    for pair in run.attempts.windows(2) {
        assert!(pair[0].finished_at <= pair[1].started_at);
    }
    assert!(!run.attempts[1].succeeded);
    assert_eq!(run.attempts[2].record_count, 1);
}

// ============================================================================
// End-to-end search
// ============================================================================

struct FixedInterpreter {
    result: Result<FlightQuery, InterpretError>,
}

impl QueryInterpreter for FixedInterpreter {
    fn name(&self) -> &str {
        "fixed"
    }

    fn interpret(
        &self,
        _text: &str,
    ) -> impl std::future::Future<Output = Result<FlightQuery, InterpretError>> + Send {
        std::future::ready(self.result.clone())
    }
}

#[tokio::test]
async fn test_search_picks_cheapest_across_sources() {
    let calls = Arc::new(AtomicUsize::new(0));
    let search = FlightSearch::new(
        FixedInterpreter { result: Ok(query()) },
        orchestrator(
            [
                Behaviour::Records(vec![4200, 4800, 5600]),
                Behaviour::Records(vec![3900, 4400, 6100, 6900]),
                Behaviour::Records(vec![5100, 5300]),
            ],
            &calls,
        ),
    );

    let report = search.run("delhi to mumbai", &FetchContext::new()).await;

    assert_eq!(report.cheapest.as_ref().unwrap().price, Price::from(3900));
    assert_eq!(report.cheapest.as_ref().unwrap().source, SourceId::Cleartrip);
    assert_eq!(report.sources_succeeded.len(), 3);
    assert_eq!(report.total_results, 9);
    assert!(report.errors.is_empty());
    assert_eq!(report.status, ReportStatus::Found);
}

#[tokio::test]
async fn test_interpreter_failure_short_circuits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let search = FlightSearch::new(
        FixedInterpreter {
            result: Err(InterpretError::MissingDate("delhi to mumbai".into())),
        },
        orchestrator(
            [
                Behaviour::Records(vec![4200]),
                Behaviour::Records(vec![3900]),
                Behaviour::Records(vec![5100]),
            ],
            &calls,
        ),
    );

    let report = search.run("delhi to mumbai", &FetchContext::new()).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(report.cheapest.is_none());
    assert!(report.all_records.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Interpreter:"));
    assert_eq!(report.status, ReportStatus::InterpreterFailed);
}

#[tokio::test]
async fn test_one_timeout_two_successes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let search = FlightSearch::new(
        FixedInterpreter { result: Ok(query()) },
        orchestrator(
            [
                Behaviour::Fail(
                    FailureKind::NavigationTimeout,
                    "Timeout 100000ms exceeded navigating to https://www.makemytrip.com/",
                ),
                Behaviour::Records(vec![4400, 4100]),
                Behaviour::Records(vec![5000]),
            ],
            &calls,
        ),
    );

    let report = search.run("delhi to mumbai", &FetchContext::new()).await;

    assert_eq!(
        report.sources_succeeded,
        vec![SourceId::Cleartrip, SourceId::EaseMyTrip]
    );
    let timeouts: Vec<&String> = report
        .errors
        .iter()
        .filter(|e| e.contains("Timeout"))
        .collect();
    assert_eq!(timeouts.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.cheapest.unwrap().price, Price::from(4100));
}
