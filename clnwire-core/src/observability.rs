//! OpenTelemetry and structured logging setup
//!
//! The client logs through `tracing` everywhere: request dispatch, response
//! correlation, discarded late responses and transport shutdown. This module
//! installs a subscriber for those events and, optionally, exports spans and
//! metrics to an OTLP collector.
//!
//! # Layers
//!
//! 1. **EnvFilter**: `RUST_LOG` wins, otherwise [`ObservabilityConfig::log_level`]
//! 2. **fmt**: JSON lines on stderr (stdout is left to the application)
//! 3. **OpenTelemetry** (traces enabled only): spans exported via OTLP/gRPC
//!
//! Metrics go through the global meter provider, so client instruments
//! created after initialization are exported automatically.
//!
//! # Usage
//!
//! ```rust,no_run
//! use clnwire_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::new("node-ops")
//!         .with_endpoint("http://localhost:4317")
//!         .with_log_level("clnwire_client=debug,info");
//!
//!     clnwire_core::init_observability(config).expect("Failed to init observability");
//!
//!     // ... talk to the daemon ...
//!
//!     clnwire_core::shutdown_observability();
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: collector endpoint
//! - `RUST_LOG`: log filter directives

use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type InitResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Observability configuration
///
/// # Defaults
///
/// - Service name: "clnwire"
/// - Service version: the crate version
/// - OTLP endpoint: `$OTEL_EXPORTER_OTLP_ENDPOINT` or "http://localhost:4317"
/// - Traces and metrics: disabled (a client library should not open
///   collector connections unless asked to)
/// - Logs: enabled
/// - Log level: `$RUST_LOG` or "info"
///
/// # Examples
///
/// ```rust
/// use clnwire_core::ObservabilityConfig;
///
/// let config = ObservabilityConfig::new("channel-manager")
///     .with_endpoint("http://collector:4317")
///     .with_traces(true)
///     .with_log_level("debug");
/// assert!(config.enable_traces);
/// ```
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to every span and metric
    pub service_name: String,

    /// Service version attached to every span and metric
    pub service_version: String,

    /// OTLP gRPC endpoint of the collector
    pub otlp_endpoint: String,

    /// Export spans to the collector
    pub enable_traces: bool,

    /// Export metrics to the collector
    pub enable_metrics: bool,

    /// Emit local JSON log lines
    pub enable_logs: bool,

    /// Filter directives used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "clnwire".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: false,
            enable_metrics: false,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Configuration with a custom service name and defaults elsewhere
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the log filter used when `RUST_LOG` is unset
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metrics export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable or disable local log output
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    fn resource(&self) -> opentelemetry_sdk::Resource {
        opentelemetry_sdk::Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Install the subscriber and any enabled OTLP exporters
///
/// Call once at startup. A second call leaves the first subscriber in place
/// and returns an error instead of panicking.
///
/// # Errors
///
/// - The filter directives do not parse
/// - An OTLP exporter cannot be built
/// - A global subscriber is already installed
pub fn init_observability(config: ObservabilityConfig) -> InitResult<()> {
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    if config.enable_metrics {
        init_metrics(&config)?;
    }

    init_tracing_subscriber(&config, tracer)?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "Observability initialized"
    );

    Ok(())
}

/// Batch span exporter over OTLP/gRPC, registered globally
fn init_tracer(config: &ObservabilityConfig) -> InitResult<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    // The tracer must be taken before the provider moves into the global slot
    let tracer = provider.tracer(config.service_name.clone());
    global::set_tracer_provider(provider);

    Ok(tracer)
}

/// Periodic (30s) metric exporter over OTLP/gRPC, registered globally
fn init_metrics(config: &ObservabilityConfig) -> InitResult<()> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(30))
        .build();

    let provider = opentelemetry_sdk::metrics::SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    global::set_meter_provider(provider);
    Ok(())
}

fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> InitResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    // `Option<Layer>` is itself a layer, so disabled pieces simply drop out
    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let fmt_layer = config.enable_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Flush and stop the exporters
///
/// Providers flush on drop in the 0.30 SDK; this marks the point in the
/// log stream where shutdown began and is safe to call repeatedly.
pub fn shutdown_observability() {
    tracing::info!("Shutting down observability");
}
