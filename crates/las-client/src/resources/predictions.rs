//! Predictions: `/predictions`

use serde::Serialize;
use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::resources::{ListOptions, to_map};

/// Optional inference settings.
///
/// `auto_rotate: Some(false)` is indistinguishable from unset once empty
/// values are stripped; the API default applies in both cases.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOptions {
    pub max_pages: Option<u32>,
    pub auto_rotate: Option<bool>,
    /// `LOW` or `HIGH`
    pub image_quality: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePrediction<'a> {
    document_id: &'a str,
    model_id: &'a str,
    #[serde(flatten)]
    options: &'a PredictionOptions,
}

impl Client {
    /// `POST /predictions`
    pub async fn create_prediction(
        &self,
        document_id: &str,
        model_id: &str,
        options: &PredictionOptions,
    ) -> Result<Value> {
        let body = to_map(&CreatePrediction {
            document_id,
            model_id,
            options,
        })?;
        self.post("/predictions", Value::Object(body)).await
    }

    /// `GET /predictions`
    pub async fn list_predictions(&self, options: &ListOptions) -> Result<Value> {
        self.get("/predictions", Some(to_map(options)?)).await
    }
}
