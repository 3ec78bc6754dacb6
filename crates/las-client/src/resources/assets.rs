//! Assets: `/assets`

use serde_json::{Value, json};

use crate::client::Client;
use crate::content::Content;
use crate::error::Result;
use crate::resources::{Described, ListOptions, to_map};

/// Optional fields when creating an asset.
pub type AssetOptions = Described;

/// Fields to change on an existing asset.
#[derive(Debug, Default)]
pub struct AssetUpdate {
    pub content: Option<Content>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Client {
    /// `POST /assets`
    pub async fn create_asset(&self, content: impl Into<Content>, options: &AssetOptions) -> Result<Value> {
        let mut body = to_map(options)?;
        body.insert("content".into(), Value::String(content.into().into_base64().await?));
        self.post("/assets", Value::Object(body)).await
    }

    /// `GET /assets`
    pub async fn list_assets(&self, options: &ListOptions) -> Result<Value> {
        self.get("/assets", Some(to_map(options)?)).await
    }

    /// `GET /assets/{assetId}`
    pub async fn get_asset(&self, asset_id: &str) -> Result<Value> {
        self.get(&format!("/assets/{asset_id}"), None).await
    }

    /// `PATCH /assets/{assetId}`
    pub async fn update_asset(&self, asset_id: &str, update: AssetUpdate) -> Result<Value> {
        let content = match update.content {
            Some(content) => Some(content.into_base64().await?),
            None => None,
        };
        let body = json!({
            "content": content,
            "name": update.name,
            "description": update.description,
        });
        self.patch(&format!("/assets/{asset_id}"), body).await
    }
}
