//! Transitions: `/transitions`, their executions and heartbeats

use serde::Serialize;
use serde_json::{Value, json};

use crate::client::Client;
use crate::error::Result;
use crate::resources::{merged, to_map};

/// Optional fields when creating a transition.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOptions {
    #[serde(rename = "inputJsonSchema")]
    pub in_schema: Option<Value>,
    #[serde(rename = "outputJsonSchema")]
    pub out_schema: Option<Value>,
    /// Type-specific parameters, e.g. `imageUrl` for docker transitions.
    pub parameters: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Filters and paging for listing transitions.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionListOptions {
    /// Repeated as `transitionType=a&transitionType=b`.
    pub transition_type: Vec<String>,
    pub max_results: Option<u32>,
    pub next_token: Option<String>,
}

/// Filters, ordering and paging for listing transition executions.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionListOptions {
    pub status: Vec<String>,
    pub execution_id: Vec<String>,
    pub max_results: Option<u32>,
    pub next_token: Option<String>,
    /// `ascending` or `descending`
    pub order: Option<String>,
    /// `startTime` or `endTime`
    pub sort_by: Option<String>,
}

/// Outcome reported when a transition execution ends.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionUpdate {
    pub output: Option<Value>,
    pub error: Option<Value>,
    pub start_time: Option<String>,
}

impl Client {
    /// `POST /transitions`
    pub async fn create_transition(&self, transition_type: &str, options: &TransitionOptions) -> Result<Value> {
        let body = merged(&json!({ "transitionType": transition_type }), options)?;
        self.post("/transitions", Value::Object(body)).await
    }

    /// `GET /transitions`
    pub async fn list_transitions(&self, options: &TransitionListOptions) -> Result<Value> {
        self.get("/transitions", Some(to_map(options)?)).await
    }

    /// `GET /transitions/{transitionId}`
    pub async fn get_transition(&self, transition_id: &str) -> Result<Value> {
        self.get(&format!("/transitions/{transition_id}"), None).await
    }

    /// `PATCH /transitions/{transitionId}`. Only schemas, name and description apply.
    pub async fn update_transition(&self, transition_id: &str, options: &TransitionOptions) -> Result<Value> {
        let mut body = to_map(options)?;
        body.remove("parameters");
        self.patch(&format!("/transitions/{transition_id}"), Value::Object(body))
            .await
    }

    /// `DELETE /transitions/{transitionId}`
    pub async fn delete_transition(&self, transition_id: &str) -> Result<Value> {
        self.delete(&format!("/transitions/{transition_id}"), None).await
    }

    /// `POST /transitions/{transitionId}/executions` to start a manual transition.
    pub async fn execute_transition(&self, transition_id: &str) -> Result<Value> {
        self.post(&format!("/transitions/{transition_id}/executions"), json!({}))
            .await
    }

    /// `GET /transitions/{transitionId}/executions`
    pub async fn list_transition_executions(
        &self,
        transition_id: &str,
        options: &ExecutionListOptions,
    ) -> Result<Value> {
        self.get(
            &format!("/transitions/{transition_id}/executions"),
            Some(to_map(options)?),
        )
        .await
    }

    /// `GET /transitions/{transitionId}/executions/{executionId}`
    pub async fn get_transition_execution(&self, transition_id: &str, execution_id: &str) -> Result<Value> {
        self.get(
            &format!("/transitions/{transition_id}/executions/{execution_id}"),
            None,
        )
        .await
    }

    /// `PATCH /transitions/{transitionId}/executions/{executionId}` to end an execution
    /// with `status` `succeeded` (and `output`) or `failed` (and `error`).
    pub async fn update_transition_execution(
        &self,
        transition_id: &str,
        execution_id: &str,
        status: &str,
        update: &ExecutionUpdate,
    ) -> Result<Value> {
        let body = merged(&json!({ "status": status }), update)?;
        self.patch(
            &format!("/transitions/{transition_id}/executions/{execution_id}"),
            Value::Object(body),
        )
        .await
    }

    /// `POST /transitions/{transitionId}/executions/{executionId}/heartbeats`.
    /// Manual executions time out without one at least every 60 seconds.
    pub async fn send_heartbeat(&self, transition_id: &str, execution_id: &str) -> Result<Value> {
        self.post(
            &format!("/transitions/{transition_id}/executions/{execution_id}/heartbeats"),
            json!({}),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok(body: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    #[tokio::test]
    async fn create_transition_maps_schema_keys() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transitions"))
            .and(body_json(json!({
                "transitionType": "docker",
                "inputJsonSchema": {"title": "in"},
                "parameters": {"imageUrl": "img"},
                "name": "ocr",
            })))
            .respond_with(ok(json!({"transitionId": "t1"})))
            .expect(1)
            .mount(&server)
            .await;

        let options = TransitionOptions {
            in_schema: Some(json!({"title": "in"})),
            parameters: Some(json!({"imageUrl": "img"})),
            name: Some("ocr".into()),
            ..Default::default()
        };
        test_client(&server)
            .create_transition("docker", &options)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_transitions_repeats_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transitions"))
            .respond_with(ok(json!({"transitions": []})))
            .mount(&server)
            .await;

        let options = TransitionListOptions {
            transition_type: vec!["docker".into(), "manual".into()],
            ..Default::default()
        };
        test_client(&server).list_transitions(&options).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.query(),
            Some("transitionType=docker&transitionType=manual")
        );
    }

    #[tokio::test]
    async fn update_transition_ignores_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/transitions/t1"))
            .and(body_json(json!({"outputJsonSchema": {"title": "out"}})))
            .respond_with(ok(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let options = TransitionOptions {
            out_schema: Some(json!({"title": "out"})),
            parameters: Some(json!({"ignored": true})),
            ..Default::default()
        };
        test_client(&server).update_transition("t1", &options).await.unwrap();
    }

    #[tokio::test]
    async fn execution_lifecycle_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transitions/t1/executions"))
            .and(body_json(json!({})))
            .respond_with(ok(json!({"executionId": "e1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/transitions/t1/executions/e1"))
            .respond_with(ok(json!({"status": "running"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/transitions/t1/executions/e1/heartbeats"))
            .respond_with(ok(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/transitions/t1/executions/e1"))
            .and(body_json(json!({"status": "succeeded", "output": {"total": "1"}})))
            .respond_with(ok(json!({"status": "succeeded"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/transitions/t1"))
            .respond_with(ok(json!({"transitionId": "t1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let started = client.execute_transition("t1").await.unwrap();
        assert_eq!(started["executionId"], "e1");
        client.get_transition_execution("t1", "e1").await.unwrap();
        client.send_heartbeat("t1", "e1").await.unwrap();
        let update = ExecutionUpdate {
            output: Some(json!({"total": "1"})),
            ..Default::default()
        };
        client
            .update_transition_execution("t1", "e1", "succeeded", &update)
            .await
            .unwrap();
        client.delete_transition("t1").await.unwrap();
    }

    #[tokio::test]
    async fn list_transition_executions_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transitions/t1/executions"))
            .respond_with(ok(json!({"executions": []})))
            .mount(&server)
            .await;

        let options = ExecutionListOptions {
            status: vec!["failed".into()],
            sort_by: Some("startTime".into()),
            order: Some("ascending".into()),
            ..Default::default()
        };
        test_client(&server)
            .list_transition_executions("t1", &options)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let mut pairs: Vec<(String, String)> = requests[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("order".to_string(), "ascending".to_string()),
                ("sortBy".to_string(), "startTime".to_string()),
                ("status".to_string(), "failed".to_string()),
            ]
        );
    }
}
