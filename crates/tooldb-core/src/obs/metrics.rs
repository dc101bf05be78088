use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters since `since_ms`.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            entities: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Session entrypoints
    pub load_calls: u64,
    pub save_calls: u64,
    pub resolve_calls: u64,

    // Rows touched
    pub rows_loaded: u64,
    pub rows_saved: u64,

    // Constraint layer
    pub relation_checks: u64,
    pub dangling_references: u64,
    pub unique_violations: u64,
    pub constraint_violations: u64,

    // Commit protocol
    pub commits: u64,
    pub commit_rollbacks: u64,
    pub index_inserts: u64,

    // Resolution
    pub resolve_group_hits: u64,
    pub resolve_misses: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityCounters {
    pub load_calls: u64,
    pub save_calls: u64,
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub relation_checks: u64,
    pub dangling_references: u64,
    pub unique_violations: u64,
    pub constraint_violations: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Borrow the per-entity counters for `path`, creating them on first use.
pub(crate) fn entity_entry<'a>(m: &'a mut EventState, path: &str) -> &'a mut EntityCounters {
    m.entities.entry(path.to_string()).or_default()
}

/// Reset all counters.
pub fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since_ms`.
    pub counters: Option<EventState>,
    /// Per-entity counters and averages.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub path: String,
    pub load_calls: u64,
    pub save_calls: u64,
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub avg_rows_per_load: f64,
    pub relation_checks: u64,
    pub dangling_references: u64,
    pub unique_violations: u64,
    pub constraint_violations: u64,
}

/// Build a report, dropping it entirely when the window started after
/// `window_start_ms`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if let Some(requested) = window_start_ms
        && requested > snap.since_ms
    {
        return EventReport::default();
    }

    let mut entity_counters: Vec<EntitySummary> = snap
        .entities
        .iter()
        .map(|(path, ops)| EntitySummary {
            path: path.clone(),
            load_calls: ops.load_calls,
            save_calls: ops.save_calls,
            rows_loaded: ops.rows_loaded,
            rows_saved: ops.rows_saved,
            avg_rows_per_load: if ops.load_calls > 0 {
                ops.rows_loaded as f64 / ops.load_calls as f64
            } else {
                0.0
            },
            relation_checks: ops.relation_checks,
            dangling_references: ops.dangling_references,
            unique_violations: ops.unique_violations,
            constraint_violations: ops.constraint_violations,
        })
        .collect();

    entity_counters.sort_by(|a, b| {
        b.rows_loaded
            .cmp(&a.rows_loaded)
            .then_with(|| b.save_calls.cmp(&a.save_calls))
            .then_with(|| a.path.cmp(&b.path))
    });

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_orders_entities_by_rows_loaded() {
        reset_all();
        with_state_mut(|m| {
            entity_entry(m, "tooldb::Tool").rows_loaded = 3;
            entity_entry(m, "tooldb::Tool").load_calls = 1;
            entity_entry(m, "tooldb::Pocket").rows_loaded = 12;
            entity_entry(m, "tooldb::Pocket").load_calls = 4;
        });

        let report = report_window_start(None);
        let paths: Vec<_> = report.entity_counters.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["tooldb::Pocket", "tooldb::Tool"]);
        assert!((report.entity_counters[0].avg_rows_per_load - 3.0).abs() < f64::EPSILON);
        reset_all();
    }

    #[test]
    fn future_window_yields_empty_report() {
        reset_all();
        let report = report_window_start(Some(u64::MAX));

        assert!(report.counters.is_none());
        assert!(report.entity_counters.is_empty());
    }
}
