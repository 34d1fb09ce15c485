//! OpenTelemetry span export.
//!
//! With the `telemetry` feature and `[tracing] enabled = true`, every
//! `tracing` span is also exported to an OTLP/HTTP collector through a
//! `tracing_opentelemetry` layer stacked next to the fmt layer. Without the
//! feature no layer is built and the settings are only validated.

use std::time::Duration;

use balancer_core::config::TracingConfig;
use tracing::{debug, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;

/// How long shutdown waits for pending spans to reach the collector.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Handle to the span exporter. Must be shut down to flush pending spans.
#[must_use = "span export must be shut down to flush pending spans"]
pub struct Telemetry {
    #[cfg(feature = "telemetry")]
    provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
    /// Collector URL while exporting.
    endpoint: Option<String>,
    requested: bool,
}

impl Telemetry {
    pub fn is_exporting(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Report the export state. Call once the subscriber is installed.
    pub fn log_status(&self) {
        match &self.endpoint {
            Some(endpoint) => info!(%endpoint, "exporting spans over OTLP"),
            None if self.requested => warn!(
                "span export requested but balancerd was built without the `telemetry` feature"
            ),
            None => debug!("span export disabled"),
        }
    }

    /// Flush and stop the exporter, giving up after [`SHUTDOWN_TIMEOUT`].
    #[cfg(feature = "telemetry")]
    pub async fn shutdown(self) {
        let Some(provider) = self.provider else {
            return;
        };
        let flush = tokio::task::spawn_blocking(move || provider.shutdown());
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, flush).await {
            Ok(Ok(Ok(()))) => debug!("span exporter flushed"),
            Ok(Ok(Err(e))) => warn!(error = %e, "span exporter shutdown failed"),
            Ok(Err(e)) => warn!(error = %e, "span exporter shutdown task failed"),
            Err(_) => warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "span exporter shutdown timed out"
            ),
        }
    }

    #[cfg(not(feature = "telemetry"))]
    pub async fn shutdown(self) {}
}

/// Build the export layer for `config`, if export is enabled and compiled in.
#[cfg(feature = "telemetry")]
pub fn init<S>(config: &TracingConfig) -> anyhow::Result<(Option<BoxedLayer<S>>, Telemetry)>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static,
{
    use opentelemetry::KeyValue;
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::Resource;
    use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, Sampler, SdkTracerProvider};

    if !config.enabled {
        return Ok((None, Telemetry {
            provider: None,
            endpoint: None,
            requested: false,
        }));
    }

    let endpoint = config.traces_url();
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint.clone())
        .build()?;

    let processor = BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            BatchConfigBuilder::default()
                .with_scheduled_delay(config.batch_timeout())
                .with_max_export_batch_size(config.max_export_batch_size)
                .build(),
        )
        .build();

    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", config.service_version.clone()),
            KeyValue::new("deployment.environment", config.environment.clone()),
        ])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_span_processor(processor)
        .with_resource(resource)
        .with_sampler(Sampler::TraceIdRatioBased(config.sampling_ratio))
        .build();
    opentelemetry::global::set_tracer_provider(provider.clone());

    let tracer = provider.tracer("balancerd");
    let layer = tracing_opentelemetry::layer().with_tracer(tracer).boxed();

    Ok((
        Some(layer),
        Telemetry {
            provider: Some(provider),
            endpoint: Some(endpoint),
            requested: true,
        },
    ))
}

/// Build the export layer for `config`. Export is not compiled in, so
/// there is never a layer.
#[cfg(not(feature = "telemetry"))]
pub fn init<S>(config: &TracingConfig) -> anyhow::Result<(Option<BoxedLayer<S>>, Telemetry)>
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span> + Send + Sync + 'static,
{
    Ok((
        None,
        Telemetry {
            endpoint: None,
            requested: config.enabled,
        },
    ))
}
