//! Prometheus metrics for the fact-checker bot.
//!
//! Exposes:
//! - `factcheck_bot_checks_total` (counter with kind and status)
//! - `factcheck_bot_check_duration_seconds` (histogram)
//! - `factcheck_bot_checks_inflight` (gauge)
//! - `factcheck_bot_rate_limited_total` (counter with scope)
//! - process metrics via `process` collector

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram_vec, register_int_counter_vec, register_int_gauge_vec,
    Encoder, HistogramVec, IntCounterVec, IntGaugeVec, TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

static CHECK_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    // Exponential buckets from 100ms up to ~100s (Gemini round-trips).
    let buckets =
        prometheus::exponential_buckets(0.1, 2.0, 10).expect("failed to create histogram buckets");
    register_histogram_vec!(
        "factcheck_bot_check_duration_seconds",
        "Fact-check duration in seconds",
        &["kind"],
        buckets
    )
    .expect("failed to register check duration histogram")
});

static CHECK_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "factcheck_bot_checks_total",
        "Total fact-checks by kind and status",
        &["kind", "status"]
    )
    .expect("failed to register check counter")
});

static CHECK_INFLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "factcheck_bot_checks_inflight",
        "Number of in-flight fact-checks",
        &["kind"]
    )
    .expect("failed to register inflight gauge")
});

static RATE_LIMITED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "factcheck_bot_rate_limited_total",
        "Requests refused by rate limiting, by scope",
        &["scope"]
    )
    .expect("failed to register rate limited counter")
});

/// Ensure collectors are registered.
fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&CHECK_DURATION);
    Lazy::force(&CHECK_TOTAL);
    Lazy::force(&CHECK_INFLIGHT);
    Lazy::force(&RATE_LIMITED);
}

/// Increment inflight gauge for a check kind.
pub fn record_check_start(kind: &'static str) {
    init_collectors();
    CHECK_INFLIGHT.with_label_values(&[kind]).inc();
}

/// Record check completion with duration and status.
pub fn record_check_result(kind: &'static str, duration: Duration, success: bool) {
    init_collectors();
    CHECK_INFLIGHT.with_label_values(&[kind]).dec();
    CHECK_DURATION
        .with_label_values(&[kind])
        .observe(duration.as_secs_f64());
    CHECK_TOTAL
        .with_label_values(&[kind, if success { "ok" } else { "error" }])
        .inc();
}

/// Record a request refused by a rate limiter ("user", "global", "cooldown").
pub fn record_rate_limited(scope: &'static str) {
    init_collectors();
    RATE_LIMITED.with_label_values(&[scope]).inc();
}

async fn metrics_response() -> Result<Response<Full<Bytes>>, Infallible> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", err);
        return Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::from("encode error"))
            .unwrap());
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, encoder.format_type())
        .body(Full::from(buffer))
        .unwrap())
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    match req.uri().path() {
        "/metrics" => metrics_response().await,
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::new()))
            .unwrap()),
    }
}

async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Prometheus metrics endpoint started");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service_fn(handle_request);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Spawn the metrics HTTP endpoint on the given address.
pub fn spawn_metrics_server(addr: SocketAddr) {
    init_collectors();
    tokio::spawn(async move {
        if let Err(err) = serve(addr).await {
            error!(%addr, "Metrics server failed: {}", err);
        }
    });
}
