//! Subsystem registration: one table of every plugin's command schema.
//!
//! Adding a new subsystem: append one entry to `SUBSYSTEMS`.

use crate::plugins::{gates, learnings, objectives, stats, topics};

pub(crate) struct Subsystem {
    pub name: &'static str,
    pub schema: fn() -> serde_json::Value,
}

pub(crate) const SUBSYSTEMS: &[Subsystem] = &[
    Subsystem { name: "topics", schema: topics::schema },
    Subsystem { name: "learnings", schema: learnings::schema },
    Subsystem { name: "objectives", schema: objectives::schema },
    Subsystem { name: "gates", schema: gates::schema },
    Subsystem { name: "stats", schema: stats::schema },
];

/// Schemas of all subsystems, optionally filtered by name.
pub(crate) fn schemas(filter: Option<&str>) -> Vec<serde_json::Value> {
    SUBSYSTEMS
        .iter()
        .filter(|sub| filter.is_none_or(|name| name == sub.name))
        .map(|sub| (sub.schema)())
        .collect()
}
