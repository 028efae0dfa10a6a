//! Shared pieces of the append-only history tables.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Lifecycle of a history row.
///
/// Rows are written once inside the unit of work that applies their effect,
/// so `Completed` is the only state ever persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    #[default]
    Completed,
}

impl HistoryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for HistoryStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::Validation(format!(
                "invalid history status: {other}"
            ))),
        }
    }
}
