use crate::{
    db::store::{Stores, index_entry_for},
    entity::{AxisOffsets, Offset, OffsetOwner, Spindle, TOOL_NUMBER_INDEX, Tool},
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{MetricsEvent, record},
    traits::EntityKind,
};
use serde::{Deserialize, Serialize};

///
/// ResolvedTool
///
/// Compensated offset of one tool: everything the tool owns plus the
/// offsets of the spindle it runs on.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResolvedTool {
    pub tool: Tool,
    pub spindle: Option<Spindle>,
    pub tool_offsets: Vec<Offset>,
    pub spindle_offsets: Vec<Offset>,
    pub deltas: AxisOffsets,
    /// Sum of the tool's own offset diameters.
    pub diameter: f64,
}

/// Resolve the compensated offset of the in-use tool called `number`.
///
/// The spindle is the tool's own `spindles_id`, or else the lowest-id
/// active spindle. A tool with no spindle at all resolves with tool
/// offsets only.
pub fn resolve_tool(stores: &Stores, number: i64) -> Result<ResolvedTool, InternalError> {
    let result = resolve_tool_inner(stores, number);
    record(MetricsEvent::Resolve {
        group_hit: false,
        found: result.is_ok(),
    });

    result
}

fn resolve_tool_inner(stores: &Stores, number: i64) -> Result<ResolvedTool, InternalError> {
    let tool = tool_by_number(stores, number)?
        .filter(|tool| tool.in_use)
        .ok_or_else(|| {
            InternalError::new(
                ErrorClass::NotFound,
                ErrorOrigin::Resolve,
                format!("no tool in use with number {number}"),
            )
        })?;

    let spindle = match tool.spindles_id {
        Some(id) => Some(stores.get(id)?.ok_or_else(|| {
            InternalError::resolve_corruption(format!(
                "tool {} references missing spindle {id}",
                tool.id
            ))
        })?),
        None => stores.list::<Spindle>(|s| s.active)?.into_iter().next(),
    };

    let tool_id = tool.id;
    let tool_offsets = stores.list::<Offset>(|o| o.owner == OffsetOwner::Tool(tool_id))?;
    let spindle_offsets = match &spindle {
        Some(spindle) => {
            let spindle_id = spindle.id;
            stores.list::<Offset>(|o| o.owner == OffsetOwner::Spindle(spindle_id))?
        }
        None => Vec::new(),
    };

    let mut deltas = AxisOffsets::ZERO;
    for offset in tool_offsets.iter().chain(&spindle_offsets) {
        deltas += offset.deltas;
    }
    let diameter = tool_offsets.iter().map(|o| o.diameter).sum();

    Ok(ResolvedTool {
        tool,
        spindle,
        tool_offsets,
        spindle_offsets,
        deltas,
        diameter,
    })
}

// Point lookup through the unique number index.
fn tool_by_number(stores: &Stores, number: i64) -> Result<Option<Tool>, InternalError> {
    let index = Tool::MODEL
        .unique_indexes()
        .find(|index| index.name == TOOL_NUMBER_INDEX.name)
        .ok_or_else(|| InternalError::resolve_corruption("tool number index is not declared"))?;

    let Some(entry) = index_entry_for(index, &Tool::new("", number))? else {
        return Ok(None);
    };
    let Some(owner) = stores.index_owner(&entry.key) else {
        return Ok(None);
    };

    stores
        .row(&owner)
        .map(|row| row.try_decode_at::<Tool>(&owner))
        .transpose()
}
