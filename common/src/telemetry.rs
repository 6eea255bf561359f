// Telemetry module for structured logging, metrics, and tracing

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

/// Which kind of occurrence a skip was recorded for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceKind {
    Bundle,
    RecurringTask,
}

impl OccurrenceKind {
    fn as_str(&self) -> &'static str {
        match self {
            OccurrenceKind::Bundle => "bundle",
            OccurrenceKind::RecurringTask => "recurring_task",
        }
    }
}

/// Initialize structured logging with JSON formatting and trace context
///
/// Sets up the tracing subscriber with:
/// - JSON formatting for structured logs
/// - Trace context (span list) in all log entries
/// - Log levels from `RUST_LOG` or the configured level
/// - Optional OpenTelemetry export when an endpoint is configured
#[tracing::instrument(skip_all)]
pub fn init_logging(log_level: &str, tracing_endpoint: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let registry = tracing_subscriber::registry().with(json_layer);

    if let Some(endpoint) = tracing_endpoint {
        let tracer = init_tracer(endpoint)?;
        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        registry
            .with(telemetry_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    } else {
        registry
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    }

    tracing::info!(
        log_level = log_level,
        tracing_endpoint = tracing_endpoint,
        "Structured logging initialized"
    );

    Ok(())
}

/// Initialize OpenTelemetry tracer with OTLP exporter
#[tracing::instrument(skip_all)]
fn init_tracer(endpoint: &str) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry_sdk::runtime::Tokio;

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to build span exporter: {}", e))?;

    let tracer_provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "cadence"),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    let tracer = tracer_provider.tracer("cadence");

    tracing::info!(endpoint = endpoint, "OpenTelemetry tracer initialized");

    Ok(tracer)
}

/// Flush remaining spans on graceful shutdown
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

/// Initialize Prometheus metrics exporter and describe the engine metrics
#[tracing::instrument(skip_all)]
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    describe_counter!(
        "bundles_created_total",
        "Total number of bundles created by the daily run"
    );
    describe_counter!(
        "recurring_tasks_generated_total",
        "Total number of tasks generated from recurring configs"
    );
    describe_counter!(
        "template_tasks_instantiated_total",
        "Total number of tasks materialized from template definitions"
    );
    describe_counter!(
        "occurrences_skipped_total",
        "Occurrences skipped because they already existed"
    );
    describe_histogram!(
        "cron_run_duration_seconds",
        "Duration of a bundle auto-creation run in seconds"
    );

    tracing::info!(
        metrics_port = metrics_port,
        metrics_endpoint = format!("http://0.0.0.0:{}/metrics", metrics_port),
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

#[inline]
pub fn record_bundle_created(template_id: &Uuid) {
    counter!("bundles_created_total", "template_id" => template_id.to_string()).increment(1);
}

#[inline]
pub fn record_recurring_task_generated(config_id: &Uuid) {
    counter!("recurring_tasks_generated_total", "config_id" => config_id.to_string()).increment(1);
}

#[inline]
pub fn record_template_tasks_instantiated(template_id: &Uuid, count: usize) {
    counter!(
        "template_tasks_instantiated_total",
        "template_id" => template_id.to_string()
    )
    .increment(count as u64);
}

#[inline]
pub fn record_occurrence_skipped(kind: OccurrenceKind) {
    counter!("occurrences_skipped_total", "kind" => kind.as_str()).increment(1);
}

#[inline]
pub fn record_cron_run_duration(duration_seconds: f64) {
    histogram!("cron_run_duration_seconds").record(duration_seconds);
}
