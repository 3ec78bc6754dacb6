//! Logs: `/logs`

use serde_json::Value;

use crate::client::Client;
use crate::error::Result;

impl Client {
    /// `GET /logs/{logId}`
    pub async fn get_log(&self, log_id: &str) -> Result<Value> {
        self.get(&format!("/logs/{log_id}"), None).await
    }
}
