// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Group telemetry: structured logs through `tracing` and metrics through OpenTelemetry.
//!
//! Logs require the `logs` feature (on by default) and metrics the `metrics` feature.
//! Without either, recording is a no-op.

use std::time::Duration;

#[cfg(any(feature = "logs", test))]
use opentelemetry::logs::Severity;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::{KeyValue, metrics::MeterProvider};

use crate::Error;

pub(crate) mod attributes;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Clone, Copy)]
pub(crate) enum GroupOperation {
    Get,
    PeerFetch,
    LocalLoad,
    Register,
    RegisterPeers,
}

impl GroupOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "group.get",
            Self::PeerFetch => "group.peer_fetch",
            Self::LocalLoad => "group.local_load",
            Self::Register => "group.register",
            Self::RegisterPeers => "group.register_peers",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum GroupActivity {
    Hit,
    Miss,
    Rejected,
    PeerHit,
    PeerFallback,
    Loaded,
    Error,
    Created,
    Replaced,
    PeersAttached,
}

impl GroupActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "group.hit",
            Self::Miss => "group.miss",
            Self::Rejected => "group.rejected",
            Self::PeerHit => "group.peer_hit",
            Self::PeerFallback => "group.peer_fallback",
            Self::Loaded => "group.loaded",
            Self::Error => "group.error",
            Self::Created => "group.created",
            Self::Replaced => "group.replaced",
            Self::PeersAttached => "group.peers_attached",
        }
    }

    #[cfg(any(feature = "logs", test))]
    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::PeerHit | Self::Loaded => Severity::Debug,
            Self::Created | Self::PeersAttached => Severity::Info,
            Self::Rejected | Self::PeerFallback | Self::Replaced => Severity::Warn,
            Self::Error => Severity::Error,
        }
    }
}

/// Telemetry settings collected by a group builder.
#[derive(Clone, Debug)]
pub(crate) struct TelemetryConfig {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    instruments: Option<metrics::Instruments>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            #[cfg(any(feature = "logs", test))]
            logs_enabled: true,
            #[cfg(any(feature = "metrics", test))]
            instruments: None,
        }
    }
}

impl TelemetryConfig {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        allow(unused_variables, unused_mut, reason = "no-op without the logs feature")
    )]
    pub(crate) fn with_logs(mut self, enabled: bool) -> Self {
        #[cfg(any(feature = "logs", test))]
        {
            self.logs_enabled = enabled;
        }
        self
    }

    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.instruments = Some(metrics::Instruments::new(provider));
        self
    }

    pub(crate) fn build(self) -> GroupTelemetry {
        GroupTelemetry {
            #[cfg(any(feature = "logs", test))]
            logs_enabled: self.logs_enabled,
            #[cfg(any(feature = "metrics", test))]
            instruments: self.instruments,
        }
    }
}

/// Records group events as logs and metrics.
#[derive(Clone, Debug)]
pub(crate) struct GroupTelemetry {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    instruments: Option<metrics::Instruments>,
}

/// A single event to record.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    not(any(feature = "logs", feature = "metrics", test)),
    allow(dead_code, reason = "fields are only read by telemetry features")
)]
pub(crate) struct GroupEvent<'a> {
    pub group: &'a str,
    pub operation: GroupOperation,
    pub activity: GroupActivity,
    pub duration: Option<Duration>,
    pub error: Option<&'a Error>,
}

impl<'a> GroupEvent<'a> {
    pub fn new(group: &'a str, operation: GroupOperation, activity: GroupActivity) -> Self {
        Self {
            group,
            operation,
            activity,
            duration: None,
            error: None,
        }
    }

    #[must_use]
    pub fn duration(self, duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..self
        }
    }

    #[must_use]
    pub fn error(self, error: &'a Error) -> Self {
        Self { error: Some(error), ..self }
    }
}

impl GroupTelemetry {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        allow(unused_variables, reason = "no-op without telemetry features")
    )]
    pub(crate) fn record(&self, event: GroupEvent<'_>) {
        #[cfg(any(feature = "metrics", test))]
        self.record_metrics(&event);

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            Self::emit(&event);
        }
    }

    #[cfg(any(feature = "metrics", test))]
    fn record_metrics(&self, event: &GroupEvent<'_>) {
        let Some(instruments) = &self.instruments else {
            return;
        };

        let attrs = [
            KeyValue::new(attributes::GROUP_NAME, event.group.to_owned()),
            KeyValue::new(attributes::GROUP_OPERATION_NAME, event.operation.as_str()),
            KeyValue::new(attributes::GROUP_ACTIVITY_NAME, event.activity.as_str()),
        ];

        instruments.events.add(1, &attrs);
        if let Some(duration) = event.duration {
            instruments.durations.record(duration.as_secs_f64(), &attrs);
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn emit(event: &GroupEvent<'_>) {
        let name = event.group;
        let op = event.operation.as_str();
        let ev = event.activity.as_str();
        let duration_ns = event.duration.map(|d| d.as_nanos());
        let error = event.error.map(tracing::field::display);

        // Tracing levels must be constant. Field names must match the constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    group.name = name,
                    group.operation = op,
                    group.activity = ev,
                    group.duration_ns = ?duration_ns,
                    group.error = error,
                    "group.event"
                )
            };
        }

        match event.activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Warn => emit_event!(warn),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
            _ => {}
        }
    }
}
