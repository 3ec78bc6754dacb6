//! Resource methods
//!
//! Thin wrappers that shape a JSON body or query map and hand it to
//! `Client::execute`. Option structs serialize with camelCase keys; unset
//! fields become `null` and are stripped by the executor.

pub mod assets;
pub mod batches;
pub mod documents;
pub mod logs;
pub mod models;
pub mod predictions;
pub mod secrets;
pub mod transitions;
pub mod users;
pub mod workflows;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub use assets::{AssetOptions, AssetUpdate};
pub use documents::{DocumentListOptions, DocumentOptions};
pub use predictions::PredictionOptions;
pub use transitions::{ExecutionListOptions, ExecutionUpdate, TransitionListOptions, TransitionOptions};
pub use users::UserOptions;
pub use workflows::{WorkflowExecutionListOptions, WorkflowOptions};

/// Paging for list endpoints.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    pub max_results: Option<u32>,
    pub next_token: Option<String>,
}

impl ListOptions {
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn next_token(mut self, next_token: impl Into<String>) -> Self {
        self.next_token = Some(next_token.into());
        self
    }
}

/// Optional name and description shared by several resources.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Described {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Described {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Serialize an options struct into a JSON object.
pub(crate) fn to_map<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::InvalidRequest(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(Error::InvalidRequest(format!("serializing options: {e}"))),
    }
}

/// Merge two option structs into one object. Non-null keys of `second` win.
pub(crate) fn merged<T: Serialize, U: Serialize>(first: &T, second: &U) -> Result<Map<String, Value>> {
    let mut map = to_map(first)?;
    map.extend(to_map(second)?.into_iter().filter(|(_, v)| !v.is_null()));
    Ok(map)
}
