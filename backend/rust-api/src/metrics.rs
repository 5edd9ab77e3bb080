use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref COURSES_CREATED_TOTAL: IntCounter = register_int_counter!(
        "courses_created_total",
        "Total number of courses created"
    )
    .unwrap();

    pub static ref PROBLEMS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "problems_created_total",
        "Total number of coding problems created"
    )
    .unwrap();

    pub static ref QUIZ_RESULTS_RECORDED_TOTAL: IntCounter = register_int_counter!(
        "quiz_results_recorded_total",
        "Total number of final quiz results recorded"
    )
    .unwrap();

    pub static ref SUBMISSIONS_RECORDED_TOTAL: IntCounter = register_int_counter!(
        "submissions_recorded_total",
        "Total number of problem submissions recorded"
    )
    .unwrap();

    // Chat relay metrics
    pub static ref CHAT_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "chat_requests_total",
        "Total number of chat relay requests",
        &["outcome"]
    )
    .unwrap();

    pub static ref CHAT_HISTORY_DROPPED_TOTAL: IntCounter = register_int_counter!(
        "chat_history_dropped_total",
        "Total number of malformed chat history entries dropped"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}
