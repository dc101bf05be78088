//! Observability: process-local counters and the sink they flow through.
//!
//! Core DB logic records `MetricsEvent`s through `sink::record`; it never
//! touches the counter state directly.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport, EventState};
pub use sink::{ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
