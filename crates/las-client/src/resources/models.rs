//! Models: `/models`

use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::resources::{ListOptions, to_map};

impl Client {
    /// `GET /models`
    pub async fn list_models(&self, options: &ListOptions) -> Result<Value> {
        self.get("/models", Some(to_map(options)?)).await
    }
}
