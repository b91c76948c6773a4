//! Execution trace of a scheduler run

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// What happened to a task at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TraceKind {
    Started,
    Emitted {
        message: String,
    },
    Suspended {
        #[serde(rename = "resume-at-ms", with = "duration_ms")]
        resume_at: Duration,
    },
    Resumed,
    Blocked {
        #[serde(rename = "duration-ms", with = "duration_ms")]
        duration: Duration,
    },
    Completed,
}

/// A single trace entry. `at` is relative to the start of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    #[serde(rename = "at-ms", with = "duration_ms")]
    pub at: Duration,
    pub task: TaskId,
    pub name: String,
    #[serde(flatten)]
    pub kind: TraceKind,
}

/// Ordered list of trace events
///
/// A disabled trace drops everything but still answers queries (with empty
/// results), so callers never need to branch on whether tracing is on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    #[serde(skip)]
    enabled: bool,
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, at: Duration, task: TaskId, name: &str, kind: TraceKind) {
        if !self.enabled {
            return;
        }
        self.events.push(TraceEvent {
            at,
            task,
            name: name.to_string(),
            kind,
        });
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Tasks in the order they first started running
    pub fn start_order(&self) -> Vec<TaskId> {
        self.tasks_where(|kind| matches!(kind, TraceKind::Started))
    }

    /// Tasks in the order they completed
    pub fn completion_order(&self) -> Vec<TaskId> {
        self.tasks_where(|kind| matches!(kind, TraceKind::Completed))
    }

    /// Emitted messages, in emission order
    pub fn messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match &e.kind {
                TraceKind::Emitted { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All events for one task
    pub fn for_task(&self, task: TaskId) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.task == task)
    }

    fn tasks_where(&self, pred: impl Fn(&TraceKind) -> bool) -> Vec<TaskId> {
        self.events.iter().filter(|e| pred(&e.kind)).map(|e| e.task).collect()
    }
}

/// Serialize durations as fractional milliseconds
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(d)?;
        if !ms.is_finite() || ms < 0.0 {
            return Err(serde::de::Error::custom(format!("invalid duration: {}", ms)));
        }
        Ok(Duration::from_secs_f64(ms / 1000.0))
    }
}
