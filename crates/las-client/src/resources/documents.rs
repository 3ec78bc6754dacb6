//! Documents: `/documents`

use serde::Serialize;
use serde_json::{Value, json};

use crate::client::{Client, Params};
use crate::content::Content;
use crate::error::Result;
use crate::prediction::Field;
use crate::resources::to_map;

/// Optional fields when creating a document.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOptions {
    pub consent_id: Option<String>,
    pub batch_id: Option<String>,
    pub ground_truth: Option<Vec<Field>>,
}

/// Filters and paging for listing documents.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListOptions {
    pub batch_id: Option<String>,
    pub consent_id: Option<String>,
    pub max_results: Option<u32>,
    pub next_token: Option<String>,
}

impl Client {
    /// `POST /documents`
    pub async fn create_document(
        &self,
        content: impl Into<Content>,
        content_type: &str,
        options: &DocumentOptions,
    ) -> Result<Value> {
        let mut body = to_map(options)?;
        body.insert("content".into(), Value::String(content.into().into_base64().await?));
        body.insert("contentType".into(), Value::String(content_type.to_string()));
        self.post("/documents", Value::Object(body)).await
    }

    /// `GET /documents`
    pub async fn list_documents(&self, options: &DocumentListOptions) -> Result<Value> {
        self.get("/documents", Some(to_map(options)?)).await
    }

    /// `GET /documents/{documentId}`
    pub async fn get_document(&self, document_id: &str) -> Result<Value> {
        self.get(&format!("/documents/{document_id}"), None).await
    }

    /// `PATCH /documents/{documentId}` with new ground truth.
    pub async fn update_document(&self, document_id: &str, ground_truth: &[Field]) -> Result<Value> {
        self.patch(
            &format!("/documents/{document_id}"),
            json!({ "groundTruth": ground_truth }),
        )
        .await
    }

    /// `DELETE /documents`, optionally only those under `consent_id`.
    pub async fn delete_documents(&self, consent_id: Option<&str>) -> Result<Value> {
        let mut params = Params::new();
        if let Some(consent_id) = consent_id {
            params.insert("consentId".into(), Value::String(consent_id.to_string()));
        }
        self.delete("/documents", Some(params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn create_document_shapes_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .and(body_json(json!({
                "content": "aGVsbG8=",
                "contentType": "image/jpeg",
                "consentId": "c1",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documentId": "d1"})))
            .expect(1)
            .mount(&server)
            .await;

        let options = DocumentOptions {
            consent_id: Some("c1".into()),
            ..Default::default()
        };
        let value = test_client(&server)
            .create_document(b"hello".to_vec(), "image/jpeg", &options)
            .await
            .unwrap();
        assert_eq!(value["documentId"], "d1");
    }

    #[tokio::test]
    async fn create_document_with_ground_truth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents"))
            .and(body_json(json!({
                "content": "aGVsbG8=",
                "contentType": "application/pdf",
                "groundTruth": [{"label": "total_amount", "value": "120.00"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documentId": "d1"})))
            .expect(1)
            .mount(&server)
            .await;

        let options = DocumentOptions {
            ground_truth: Some(vec![Field::new("total_amount", "120.00")]),
            ..Default::default()
        };
        test_client(&server)
            .create_document(b"hello".to_vec(), "application/pdf", &options)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_documents_filters_by_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .and(query_param("batchId", "b1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": []})))
            .expect(1)
            .mount(&server)
            .await;

        let options = DocumentListOptions {
            batch_id: Some("b1".into()),
            ..Default::default()
        };
        test_client(&server).list_documents(&options).await.unwrap();
    }

    #[tokio::test]
    async fn get_and_update_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/d1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documentId": "d1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/documents/d1"))
            .and(body_json(json!({"groundTruth": [{"label": "date", "value": "2018-10-23"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documentId": "d1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.get_document("d1").await.unwrap();
        client
            .update_document("d1", &[Field::new("date", "2018-10-23")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_documents_by_consent() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/documents"))
            .and(query_param("consentId", "c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": []})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server).delete_documents(Some("c1")).await.unwrap();
    }
}
