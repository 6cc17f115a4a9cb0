//! Document model for OpenLearn's single-file store.
//!
//! The `Store` is the sole root: four ordered collections plus the counters
//! that remember the last identifier issued per collection. It is serialized
//! as one JSON object and always handed out by value, so callers never alias
//! the engine's cached copy.

use crate::core::error::{OpenLearnError, Result};
use crate::core::schemas;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    /// Lowercased; unique within the collection.
    pub name: String,
    pub first_encountered: String,
    pub last_encountered: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learning {
    pub id: u64,
    pub timestamp: String,
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub what_learned: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistakes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveStatus {
    Active,
    Completed,
    Abandoned,
}

impl ObjectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveStatus::Active => "active",
            ObjectiveStatus::Completed => "completed",
            ObjectiveStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ObjectiveStatus::Active),
            "completed" => Some(ObjectiveStatus::Completed),
            "abandoned" => Some(ObjectiveStatus::Abandoned),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: u64,
    pub objective: String,
    pub status: ObjectiveStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub id: u64,
    pub timestamp: String,
    pub task_name: String,
    pub gate_name: String,
    /// 0..=100
    pub score: u8,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Topics,
    Learnings,
    Objectives,
    GateResults,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Topics => "topics",
            Collection::Learnings => "learnings",
            Collection::Objectives => "objectives",
            Collection::GateResults => "gate_results",
        }
    }
}

/// Last identifier issued per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub topics: u64,
    pub learnings: u64,
    pub objectives: u64,
    pub gate_results: u64,
}

impl Counters {
    pub fn get(&self, collection: Collection) -> u64 {
        match collection {
            Collection::Topics => self.topics,
            Collection::Learnings => self.learnings,
            Collection::Objectives => self.objectives,
            Collection::GateResults => self.gate_results,
        }
    }

    fn slot(&mut self, collection: Collection) -> &mut u64 {
        match collection {
            Collection::Topics => &mut self.topics,
            Collection::Learnings => &mut self.learnings,
            Collection::Objectives => &mut self.objectives,
            Collection::GateResults => &mut self.gate_results,
        }
    }

    /// Bump and return the next identifier for `collection`. A counter at
    /// `u64::MAX` (possible in a hand-edited document) is an error, never a wrap.
    pub fn allocate(&mut self, collection: Collection) -> Result<u64> {
        let slot = self.slot(collection);
        let next = slot.checked_add(1).ok_or_else(|| {
            OpenLearnError::CounterOverflow(format!("{} id counter", collection.as_str()))
        })?;
        *slot = next;
        Ok(next)
    }

    /// Raise every counter to at least the matching value in `floor`.
    pub fn raise_to(&mut self, floor: &Counters) {
        self.topics = self.topics.max(floor.topics);
        self.learnings = self.learnings.max(floor.learnings);
        self.objectives = self.objectives.max(floor.objectives);
        self.gate_results = self.gate_results.max(floor.gate_results);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub version: String,
    pub topics: Vec<Topic>,
    pub learnings: Vec<Learning>,
    pub objectives: Vec<Objective>,
    pub gate_results: Vec<GateResult>,
    pub counters: Counters,
}

impl Default for Store {
    fn default() -> Self {
        Self::empty()
    }
}

impl Store {
    pub fn empty() -> Self {
        Self {
            version: schemas::STORE_VERSION.to_string(),
            topics: Vec::new(),
            learnings: Vec::new(),
            objectives: Vec::new(),
            gate_results: Vec::new(),
            counters: Counters::default(),
        }
    }

    /// Highest id present in each collection.
    pub fn max_ids(&self) -> Counters {
        Counters {
            topics: self.topics.iter().map(|t| t.id).max().unwrap_or(0),
            learnings: self.learnings.iter().map(|l| l.id).max().unwrap_or(0),
            objectives: self.objectives.iter().map(|o| o.id).max().unwrap_or(0),
            gate_results: self.gate_results.iter().map(|g| g.id).max().unwrap_or(0),
        }
    }

    pub fn topic_by_name_mut(&mut self, name: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.name == name)
    }

    pub fn objective_mut(&mut self, id: u64) -> Option<&mut Objective> {
        self.objectives.iter_mut().find(|o| o.id == id)
    }
}
