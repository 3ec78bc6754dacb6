//! Batches: `/batches`

use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::resources::{Described, to_map};

impl Client {
    /// `POST /batches`
    pub async fn create_batch(&self, options: &Described) -> Result<Value> {
        self.post("/batches", Value::Object(to_map(options)?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn create_batch_posts_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/batches"))
            .and(body_json(json!({"description": "training set"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batchId": "las:batch:1"})))
            .expect(1)
            .mount(&server)
            .await;

        let value = test_client(&server)
            .create_batch(&Described::default().description("training set"))
            .await
            .unwrap();
        assert_eq!(value["batchId"], "las:batch:1");
    }

    #[tokio::test]
    async fn create_batch_without_options_sends_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/batches"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"batchId": "b"})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server).create_batch(&Described::default()).await.unwrap();
    }
}
