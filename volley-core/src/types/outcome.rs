use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::OperationError;
use crate::types::ItemId;

#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub id: ItemId,
    pub value: T,
    /// 1-based attempt that produced this value.
    pub attempt: u32,
}

impl<T: Serialize> Serialize for Success<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Success", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("status", "fulfilled")?;
        s.serialize_field("value", &self.value)?;
        s.serialize_field("attempt", &self.attempt)?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub id: ItemId,
    pub reason: String,
    /// Remote status code, when the endpoint produced one.
    pub status: Option<u16>,
    pub is_network_error: bool,
    pub attempt: u32,
}

impl Failure {
    pub fn from_error(id: ItemId, err: &OperationError, attempt: u32) -> Self {
        Self {
            id,
            reason: err.message.clone(),
            status: err.status,
            is_network_error: err.network,
            attempt,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(Success<T>),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn id(&self) -> &ItemId {
        match self {
            Outcome::Success(s) => &s.id,
            Outcome::Failure(f) => &f.id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Aggregate of a batch run, in completion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<T> {
    pub successful: Vec<Success<T>>,
    pub failed: Vec<Failure>,
    /// The cancellation gate was observed before the run finished.
    pub cancelled: bool,
    /// Retry rounds that actually ran (0 when nothing was retried).
    pub rounds: u32,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
            cancelled: false,
            rounds: 0,
        }
    }
}

impl<T> BatchResult<T> {
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<&ItemId> {
        self.failed.iter().map(|f| &f.id).collect()
    }

    pub fn successful_ids(&self) -> Vec<&ItemId> {
        self.successful.iter().map(|s| &s.id).collect()
    }

    pub fn map_values<U>(self, mut f: impl FnMut(T) -> U) -> BatchResult<U> {
        BatchResult {
            successful: self
                .successful
                .into_iter()
                .map(|s| Success {
                    id: s.id,
                    value: f(s.value),
                    attempt: s.attempt,
                })
                .collect(),
            failed: self.failed,
            cancelled: self.cancelled,
            rounds: self.rounds,
        }
    }
}
