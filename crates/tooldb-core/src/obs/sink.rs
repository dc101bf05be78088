//! Metrics sink boundary.
//!
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`. A
//! session may install its own sink for the duration of one call; otherwise
//! events land in the global thread-local counters.

use crate::obs::metrics::{self, EventReport, entity_entry};
use std::cell::Cell;

thread_local! {
    static SINK_OVERRIDE: Cell<Option<&'static dyn MetricsSink>> = const { Cell::new(None) };
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Save,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        entity_path: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        entity_path: &'static str,
        rows_touched: u64,
    },
    RelationValidation {
        entity_path: &'static str,
        checked: u64,
        dangling: u64,
    },
    UniqueViolation {
        entity_path: &'static str,
    },
    ConstraintViolation {
        entity_path: &'static str,
    },
    Commit {
        rows: u64,
        index_inserts: u64,
    },
    CommitRollback {
        rows: u64,
    },
    Resolve {
        group_hit: bool,
        found: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

///
/// GlobalMetricsSink
/// Default sink that writes into the thread-local counter state.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, entity_path } => metrics::with_state_mut(|m| {
                match kind {
                    ExecKind::Load => m.ops.load_calls = m.ops.load_calls.saturating_add(1),
                    ExecKind::Save => m.ops.save_calls = m.ops.save_calls.saturating_add(1),
                }

                let entry = entity_entry(m, entity_path);
                match kind {
                    ExecKind::Load => entry.load_calls = entry.load_calls.saturating_add(1),
                    ExecKind::Save => entry.save_calls = entry.save_calls.saturating_add(1),
                }
            }),

            MetricsEvent::ExecFinish {
                kind,
                entity_path,
                rows_touched,
            } => metrics::with_state_mut(|m| match kind {
                ExecKind::Load => {
                    m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows_touched);
                    let entry = entity_entry(m, entity_path);
                    entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                }
                ExecKind::Save => {
                    m.ops.rows_saved = m.ops.rows_saved.saturating_add(rows_touched);
                    let entry = entity_entry(m, entity_path);
                    entry.rows_saved = entry.rows_saved.saturating_add(rows_touched);
                }
            }),

            MetricsEvent::RelationValidation {
                entity_path,
                checked,
                dangling,
            } => metrics::with_state_mut(|m| {
                m.ops.relation_checks = m.ops.relation_checks.saturating_add(checked);
                m.ops.dangling_references = m.ops.dangling_references.saturating_add(dangling);
                let entry = entity_entry(m, entity_path);
                entry.relation_checks = entry.relation_checks.saturating_add(checked);
                entry.dangling_references = entry.dangling_references.saturating_add(dangling);
            }),

            MetricsEvent::UniqueViolation { entity_path } => metrics::with_state_mut(|m| {
                m.ops.unique_violations = m.ops.unique_violations.saturating_add(1);
                let entry = entity_entry(m, entity_path);
                entry.unique_violations = entry.unique_violations.saturating_add(1);
            }),

            MetricsEvent::ConstraintViolation { entity_path } => metrics::with_state_mut(|m| {
                m.ops.constraint_violations = m.ops.constraint_violations.saturating_add(1);
                let entry = entity_entry(m, entity_path);
                entry.constraint_violations = entry.constraint_violations.saturating_add(1);
            }),

            MetricsEvent::Commit {
                rows: _,
                index_inserts,
            } => metrics::with_state_mut(|m| {
                m.ops.commits = m.ops.commits.saturating_add(1);
                m.ops.index_inserts = m.ops.index_inserts.saturating_add(index_inserts);
            }),

            MetricsEvent::CommitRollback { rows: _ } => metrics::with_state_mut(|m| {
                m.ops.commit_rollbacks = m.ops.commit_rollbacks.saturating_add(1);
            }),

            MetricsEvent::Resolve { group_hit, found } => metrics::with_state_mut(|m| {
                m.ops.resolve_calls = m.ops.resolve_calls.saturating_add(1);
                if group_hit {
                    m.ops.resolve_group_hits = m.ops.resolve_group_hits.saturating_add(1);
                }
                if !found {
                    m.ops.resolve_misses = m.ops.resolve_misses.saturating_add(1);
                }
            }),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    match SINK_OVERRIDE.with(Cell::get) {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`), not
/// by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub(crate) fn with_metrics_sink<T>(sink: &'static dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<&'static dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| cell.set(self.0));
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.replace(Some(sink)));
    let _guard = Guard(prev);

    f()
}

///
/// Span
/// RAII guard that emits start/finish events for one session call, so
/// finish accounting happens on every exit path.
///

pub(crate) struct Span {
    kind: ExecKind,
    entity_path: &'static str,
    rows: u64,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: ExecKind, entity_path: &'static str) -> Self {
        record(MetricsEvent::ExecStart { kind, entity_path });

        Self {
            kind,
            entity_path,
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            entity_path: self.entity_path,
            rows_touched: self.rows,
        });
    }
}
