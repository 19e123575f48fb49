use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::metric_names::{
    METRIC_EVICT_TOTAL, METRIC_EXTRACT_MS, METRIC_HIT_TOTAL, METRIC_MISS_TOTAL,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_HIT_TOTAL,
            Unit::Count,
            "Facet aggregations served from the cache."
        );
        describe_counter!(
            METRIC_MISS_TOTAL,
            Unit::Count,
            "Facet aggregations recomputed because no cache entry existed."
        );
        describe_counter!(
            METRIC_EVICT_TOTAL,
            Unit::Count,
            "Facet cache entries evicted due to capacity."
        );
        describe_histogram!(
            METRIC_EXTRACT_MS,
            Unit::Milliseconds,
            "Facet extraction latency on cache miss, in milliseconds."
        );
    });
}
