//! Secrets: `/secrets`

use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::resources::{Described, ListOptions, to_map};

impl Client {
    /// `POST /secrets`
    pub async fn create_secret(&self, data: Value, options: &Described) -> Result<Value> {
        let mut body = to_map(options)?;
        body.insert("data".into(), data);
        self.post("/secrets", Value::Object(body)).await
    }

    /// `GET /secrets`
    pub async fn list_secrets(&self, options: &ListOptions) -> Result<Value> {
        self.get("/secrets", Some(to_map(options)?)).await
    }

    /// `PATCH /secrets/{secretId}`
    pub async fn update_secret(&self, secret_id: &str, data: Option<Value>, options: &Described) -> Result<Value> {
        let mut body = to_map(options)?;
        body.insert("data".into(), data.unwrap_or(Value::Null));
        self.patch(&format!("/secrets/{secret_id}"), Value::Object(body)).await
    }
}
