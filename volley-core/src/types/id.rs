use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque caller-chosen identifier of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(v) => write!(f, "{v}"),
            ItemId::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for ItemId {
    fn from(v: i64) -> Self {
        ItemId::Int(v)
    }
}

impl From<i32> for ItemId {
    fn from(v: i32) -> Self {
        ItemId::Int(v.into())
    }
}

impl From<u32> for ItemId {
    fn from(v: u32) -> Self {
        ItemId::Int(v.into())
    }
}

impl From<usize> for ItemId {
    fn from(v: usize) -> Self {
        // Values past i64::MAX fall back to their decimal string.
        i64::try_from(v)
            .map(ItemId::Int)
            .unwrap_or_else(|_| ItemId::Str(v.to_string()))
    }
}

impl From<String> for ItemId {
    fn from(v: String) -> Self {
        ItemId::Str(v)
    }
}

impl From<&str> for ItemId {
    fn from(v: &str) -> Self {
        ItemId::Str(v.to_string())
    }
}
