use crate::CliError;
use serde::Serialize;
use tooldb_config::DefaultsConfig;
use tooldb_core::{
    db::session::DbSession,
    obs::metrics_report,
    prelude::*,
};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

/// Recreate the bootstrap inventory of a fresh controller in one write
/// unit.
pub fn seed(
    session: &mut DbSession,
    defaults: &DefaultsConfig,
    tools: u32,
) -> Result<(), CliError> {
    let existing = session.count(EntityTag::Tool);
    if existing > 0 {
        return Err(CliError::AlreadySeeded(existing));
    }

    session.atomic(|unit| {
        let geometry = unit.insert(Geometry::new("default geometry"))?.id;

        let magazine = unit
            .insert(Magazine::new(
                "Main magazine",
                MagazineKind::Linear,
                defaults.magazine_pockets,
            ))?
            .id;
        for slot in 1..=i64::from(defaults.magazine_pockets) {
            unit.insert(Pocket::new(magazine, slot))?;
        }

        let spindle = unit.insert(Spindle::new("Main spindle", true))?.id;
        unit.insert(Offset::for_spindle(
            Offset::SPINDLE_DEFAULT_DESCRIPTION,
            spindle,
        ))?;

        for number in 1..=i64::from(tools) {
            let tool = unit
                .insert(
                    Tool::new(format!("tool {number}"), number)
                        .in_magazine(magazine)
                        .with_geometry(geometry)
                        .with_max_rpm(defaults.tool_max_rpm),
                )?
                .id;
            unit.insert(Offset::for_tool(Offset::TOOL_DEFAULT_DESCRIPTION, tool))?;
        }

        Ok(())
    })?;

    tracing::info!(
        pockets = defaults.magazine_pockets,
        tools,
        "bootstrap inventory created"
    );

    Ok(())
}

fn list_table<E: EntityKind>(session: &DbSession) -> Result<(), CliError> {
    print_json(&session.list::<E>(|_| true)?)
}

/// Print all rows of the table called `table` (`tools`, `pockets`, ...).
pub fn list(session: &DbSession, table: &str) -> Result<(), CliError> {
    let tag = EntityTag::from_table_name(table)
        .ok_or_else(|| CliError::UnknownTable(table.to_string()))?;

    match tag {
        EntityTag::Spindle => list_table::<Spindle>(session),
        EntityTag::Magazine => list_table::<Magazine>(session),
        EntityTag::Pocket => list_table::<Pocket>(session),
        EntityTag::GeomGroup => list_table::<GeomGroup>(session),
        EntityTag::Geometry => list_table::<Geometry>(session),
        EntityTag::Offset => list_table::<Offset>(session),
        EntityTag::Tool => list_table::<Tool>(session),
    }
}

pub fn resolve(session: &DbSession, id: Key) -> Result<(), CliError> {
    print_json(&session.resolve(id)?)
}

pub fn tool_offset(session: &DbSession, number: i64) -> Result<(), CliError> {
    print_json(&session.resolve_tool(number)?)
}

pub fn print_metrics() -> Result<(), CliError> {
    eprintln!("{}", serde_json::to_string_pretty(&metrics_report(None))?);

    Ok(())
}
