// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

use opentelemetry::{
    InstrumentationScope,
    metrics::{Counter, Histogram, MeterProvider},
};

const SCOPE: &str = "herdcache";
const SCOPE_VERSION: &str = env!("CARGO_PKG_VERSION");
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";

/// Counts every recorded group event.
pub(crate) const GROUP_EVENT_COUNT: &str = "group.event.count";
/// Seconds spent in timed operations (hits, peer fetches, local loads).
pub(crate) const GROUP_OPERATION_DURATION: &str = "group.operation.duration";

/// The instruments a group writes to.
#[derive(Clone, Debug)]
pub(crate) struct Instruments {
    pub events: Counter<u64>,
    pub durations: Histogram<f64>,
}

impl Instruments {
    pub fn new(provider: &dyn MeterProvider) -> Self {
        let scope = InstrumentationScope::builder(SCOPE)
            .with_version(SCOPE_VERSION)
            .with_schema_url(SCHEMA_URL)
            .build();
        let meter = provider.meter_with_scope(scope);

        Self {
            events: meter
                .u64_counter(GROUP_EVENT_COUNT)
                .with_description("Group events by operation and activity")
                .with_unit("{event}")
                .build(),
            durations: meter
                .f64_histogram(GROUP_OPERATION_DURATION)
                .with_description("Duration of timed group operations")
                .with_unit("s")
                .build(),
        }
    }
}
