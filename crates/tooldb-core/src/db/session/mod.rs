//! Handler facade: the only write surface callers use.
//!
//! Each `new_*` builds the primary record plus its dependents in one write
//! unit and commits it atomically. Reads and resolution go straight to the
//! committed stores.

#[cfg(test)]
mod tests;

use crate::{
    db::{
        Db,
        commit::{CommitReport, WriteUnit},
        resolve::{self, ResolvedOffset, ResolvedTool},
    },
    entity::{GeomGroup, Geometry, Magazine, Offset, Pocket, Spindle, Tool},
    error::InternalError,
    macros::unsupported_ops,
    model::EntityTag,
    obs::sink::{ExecKind, MetricsSink, Span, with_metrics_sink},
    traits::{EntityKind, EntityValue},
    types::{Id, Key},
};
use tooldb_config::StoreConfig;

///
/// DbSession
///
/// Session-scoped database handle with policy (debug, metrics). Owns its
/// `Db`, so `&mut self` on every write is the single-writer guarantee.
///

pub struct DbSession {
    db: Db,
    debug: bool,
    metrics: Option<&'static dyn MetricsSink>,
}

impl DbSession {
    #[must_use]
    pub const fn new(db: Db) -> Self {
        Self {
            db,
            debug: false,
            metrics: None,
        }
    }

    /// Open the database a store config selects.
    pub fn open(config: &StoreConfig) -> Result<Self, InternalError> {
        Ok(Self::new(Db::open_with_config(config)?))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Db::in_memory())
    }

    /// Log every committed record at debug level.
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub const fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn db(&self) -> &Db {
        &self.db
    }

    /// Persist and release the underlying database.
    pub fn close(self) -> Result<(), InternalError> {
        self.db.close()
    }

    fn with_metrics<T>(sink: Option<&'static dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
        if let Some(sink) = sink {
            with_metrics_sink(sink, f)
        } else {
            f()
        }
    }

    // Shared create path: stage `record` plus whatever `dependents` adds,
    // commit, then report.
    fn create<E: EntityValue>(
        &mut self,
        record: E,
        dependents: impl FnOnce(&mut WriteUnit<'_>, &E) -> Result<(), InternalError>,
    ) -> Result<Id<E>, InternalError> {
        let debug = self.debug;
        let db = &mut self.db;

        let result = Self::with_metrics(self.metrics, || {
            let mut span = Span::new(ExecKind::Save, E::PATH);
            let result = db.atomic(|unit| {
                let record = unit.insert(record)?;
                dependents(unit, &record)?;
                Ok(record)
            });
            if let Ok((_, report)) = &result {
                span.set_rows(report.rows);
            }

            result
        });

        match result {
            Ok((record, CommitReport { rows, .. })) => {
                tracing::info!(entity = E::PATH, id = %record.id(), rows, "record created");
                if debug {
                    tracing::debug!(entity = E::PATH, ?record, "committed record");
                }

                Ok(record.id())
            }
            Err(err) => {
                tracing::warn!(entity = E::PATH, error = %err.display_with_class(), "create rejected");

                Err(err)
            }
        }
    }

    fn unsupported(&self, operation: &str) -> InternalError {
        tracing::warn!(operation, backend = self.db.backend_name(), "unsupported operation");

        InternalError::session_unsupported(operation)
    }

    // ---------------------------------------------------------------------
    // Create
    // ---------------------------------------------------------------------

    /// Create a spindle together with its default offset.
    pub fn new_spindle(&mut self, spindle: Spindle) -> Result<Id<Spindle>, InternalError> {
        self.create(spindle, |unit, spindle| {
            unit.insert(Offset::for_spindle(
                Offset::SPINDLE_DEFAULT_DESCRIPTION,
                spindle.id,
            ))?;

            Ok(())
        })
    }

    pub fn new_magazine(&mut self, magazine: Magazine) -> Result<Id<Magazine>, InternalError> {
        self.create(magazine, |_, _| Ok(()))
    }

    /// Create a pocket; `slot_pos` must be free in its magazine and inside
    /// the magazine's pocket count.
    pub fn new_pocket(&mut self, pocket: Pocket) -> Result<Id<Pocket>, InternalError> {
        self.create(pocket, |_, _| Ok(()))
    }

    pub fn new_geometry(&mut self, geometry: Geometry) -> Result<Id<Geometry>, InternalError> {
        self.create(geometry, |_, _| Ok(()))
    }

    pub fn new_geom_group(&mut self, group: GeomGroup) -> Result<Id<GeomGroup>, InternalError> {
        self.create(group, |_, _| Ok(()))
    }

    pub fn new_offset(&mut self, offset: Offset) -> Result<Id<Offset>, InternalError> {
        self.create(offset, |_, _| Ok(()))
    }

    /// Create a tool together with its default offset. `number` must be
    /// unused.
    pub fn new_tool(&mut self, tool: Tool) -> Result<Id<Tool>, InternalError> {
        self.create(tool, |unit, tool| {
            unit.insert(Offset::for_tool(Offset::TOOL_DEFAULT_DESCRIPTION, tool.id))?;

            Ok(())
        })
    }

    /// Stage caller-composed records and commit them together.
    pub fn atomic<T>(
        &mut self,
        f: impl FnOnce(&mut WriteUnit<'_>) -> Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        let db = &mut self.db;
        let result = Self::with_metrics(self.metrics, || db.atomic(f));

        match result {
            Ok((value, report)) => {
                tracing::info!(rows = report.rows, "write unit committed");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err.display_with_class(), "write unit rejected");
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Edit / delete
    // ---------------------------------------------------------------------

    unsupported_ops! {
        Spindle => edit_spindle, delete_spindle;
        Magazine => edit_magazine, delete_magazine;
        Pocket => edit_pocket, delete_pocket;
        GeomGroup => edit_geom_group, delete_geom_group;
        Geometry => edit_geometry, delete_geometry;
        Offset => edit_offset, delete_offset;
        Tool => edit_tool, delete_tool;
    }

    // ---------------------------------------------------------------------
    // Read
    // ---------------------------------------------------------------------

    /// Load one record; `NotFound` when absent.
    pub fn get<E: EntityKind>(&self, id: Id<E>) -> Result<E, InternalError> {
        Self::with_metrics(self.metrics, || {
            let mut span = Span::new(ExecKind::Load, E::PATH);
            let entity = self.db.get(id)?;
            span.set_rows(1);

            Ok(entity)
        })
    }

    /// Load every record of one table matching `predicate`, in id order.
    pub fn list<E: EntityKind>(
        &self,
        predicate: impl FnMut(&E) -> bool,
    ) -> Result<Vec<E>, InternalError> {
        Self::with_metrics(self.metrics, || {
            let mut span = Span::new(ExecKind::Load, E::PATH);
            let rows = self.db.list(predicate)?;
            span.set_rows(rows.len() as u64);

            Ok(rows)
        })
    }

    #[must_use]
    pub fn contains<E: EntityKind>(&self, id: Id<E>) -> bool {
        self.db.contains(id)
    }

    #[must_use]
    pub fn count(&self, entity: EntityTag) -> usize {
        self.db.count(entity)
    }

    // ---------------------------------------------------------------------
    // Resolve
    // ---------------------------------------------------------------------

    /// Group-then-individual lookup of an offset/geometry id.
    pub fn resolve(&self, key: Key) -> Result<ResolvedOffset, InternalError> {
        Self::with_metrics(self.metrics, || resolve::resolve(self.db.stores(), key))
    }

    pub fn resolve_offset(&self, key: Key) -> Result<ResolvedOffset, InternalError> {
        Self::with_metrics(self.metrics, || resolve::resolve_offset(self.db.stores(), key))
    }

    pub fn resolve_geometry(&self, key: Key) -> Result<ResolvedOffset, InternalError> {
        Self::with_metrics(self.metrics, || {
            resolve::resolve_geometry(self.db.stores(), key)
        })
    }

    /// Compensated offset of the in-use tool called `number`.
    pub fn resolve_tool(&self, number: i64) -> Result<ResolvedTool, InternalError> {
        Self::with_metrics(self.metrics, || resolve::resolve_tool(self.db.stores(), number))
    }
}
