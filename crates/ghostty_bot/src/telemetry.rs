//! Tracing setup and the error reporting sink.

use tracing::error;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Service name attached to exported spans.
pub const SERVICE_NAME: &str = "ghostty-bot";

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Logs are plain text
/// unless `json` is set. With the `observability` feature, spans are also
/// exported through OpenTelemetry to stdout.
pub fn init_tracing(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(fmt_layer);

    #[cfg(feature = "observability")]
    let registry = registry.with(otel::layer());

    registry.try_init()?;
    Ok(())
}

#[cfg(feature = "observability")]
mod otel {
    use super::SERVICE_NAME;
    use opentelemetry::{KeyValue, global, trace::TracerProvider};
    use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
    use opentelemetry_stdout::SpanExporter;
    use tracing::Subscriber;
    use tracing_subscriber::{Layer, registry::LookupSpan};

    pub(super) fn layer<S>() -> impl Layer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let resource = Resource::builder()
            .with_service_name(SERVICE_NAME)
            .with_attributes(vec![KeyValue::new(
                "service.version",
                env!("CARGO_PKG_VERSION"),
            )])
            .build();

        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(SpanExporter::default())
            .with_resource(resource)
            .build();
        global::set_tracer_provider(provider.clone());

        tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
    }
}

/// Report an error that escaped an event handler or command.
///
/// Emits one `error` event, inside the caller's current span, carrying the
/// full cause chain. The process keeps running.
pub fn report_error(context: &str, err: &anyhow::Error) {
    error!(context, error = %format!("{err:#}"), "Unhandled error in {}", context);
}
