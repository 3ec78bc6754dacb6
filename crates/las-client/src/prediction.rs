//! Prediction value objects and the predict / feedback / consent helpers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::Client;
use crate::content::Content;
use crate::error::{Error, Result};
use crate::resources::{DocumentOptions, PredictionOptions};

/// One labelled value, either predicted or supplied as ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    label: String,
    value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }
}

/// Result of running a model on one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    document_id: String,
    consent_id: String,
    model_id: String,
    fields: Vec<Field>,
}

impl Prediction {
    /// Build from a `POST /predictions` response; fields come from its
    /// `predictions` array.
    pub fn from_response(
        document_id: impl Into<String>,
        consent_id: impl Into<String>,
        model_id: impl Into<String>,
        response: &Value,
    ) -> Result<Self> {
        let predictions = response
            .get("predictions")
            .cloned()
            .ok_or_else(|| Error::Decode("prediction response has no predictions".into()))?;
        let fields: Vec<Field> = serde_json::from_value(predictions)
            .map_err(|e| Error::Decode(format!("parsing predictions: {e}")))?;
        Ok(Self {
            document_id: document_id.into(),
            consent_id: consent_id.into(),
            model_id: model_id.into(),
            fields,
        })
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn consent_id(&self) -> &str {
        &self.consent_id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl Client {
    /// Upload a document and run `model_id` on it.
    ///
    /// A fresh consent id is generated when none is given; it is returned on
    /// the `Prediction` so the documents can later be revoked.
    pub async fn predict(
        &self,
        content: impl Into<Content>,
        content_type: &str,
        model_id: &str,
        consent_id: Option<&str>,
    ) -> Result<Prediction> {
        let consent_id = consent_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let options = DocumentOptions {
            consent_id: Some(consent_id.clone()),
            ..Default::default()
        };
        let document = self.create_document(content, content_type, &options).await?;
        let document_id = document
            .get("documentId")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Decode("document response has no documentId".into()))?
            .to_string();

        let response = self
            .create_prediction(&document_id, model_id, &PredictionOptions::default())
            .await?;
        let prediction = Prediction::from_response(document_id, consent_id, model_id, &response)?;
        info!(
            document_id = %prediction.document_id(),
            model_id = %model_id,
            fields = prediction.fields().len(),
            "prediction complete"
        );
        Ok(prediction)
    }

    /// Record ground truth for a document.
    pub async fn send_feedback(&self, document_id: &str, fields: &[Field]) -> Result<Value> {
        self.update_document(document_id, fields).await
    }

    /// Delete every document stored under `consent_id`.
    pub async fn revoke_consent(&self, consent_id: &str) -> Result<Value> {
        self.delete_documents(Some(consent_id)).await
    }
}
