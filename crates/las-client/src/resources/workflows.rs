//! Workflows: `/workflows` and their executions

use serde::Serialize;
use serde_json::{Value, json};

use crate::client::Client;
use crate::error::Result;
use crate::resources::{Described, ListOptions, merged, to_map};

/// Optional fields when creating a workflow.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOptions {
    /// e.g. `{"email": "<error-recipient>"}`
    pub error_config: Option<Value>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Filters, ordering and paging for listing workflow executions.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowExecutionListOptions {
    pub status: Vec<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub max_results: Option<u32>,
    pub next_token: Option<String>,
}

impl Client {
    /// `POST /workflows`
    pub async fn create_workflow(&self, specification: Value, options: &WorkflowOptions) -> Result<Value> {
        let body = merged(&json!({ "specification": specification }), options)?;
        self.post("/workflows", Value::Object(body)).await
    }

    /// `GET /workflows`
    pub async fn list_workflows(&self, options: &ListOptions) -> Result<Value> {
        self.get("/workflows", Some(to_map(options)?)).await
    }

    /// `GET /workflows/{workflowId}`
    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Value> {
        self.get(&format!("/workflows/{workflow_id}"), None).await
    }

    /// `PATCH /workflows/{workflowId}`
    pub async fn update_workflow(&self, workflow_id: &str, options: &Described) -> Result<Value> {
        self.patch(&format!("/workflows/{workflow_id}"), Value::Object(to_map(options)?))
            .await
    }

    /// `DELETE /workflows/{workflowId}`
    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<Value> {
        self.delete(&format!("/workflows/{workflow_id}"), None).await
    }

    /// `POST /workflows/{workflowId}/executions` with `input`.
    pub async fn execute_workflow(&self, workflow_id: &str, input: Value) -> Result<Value> {
        self.post(
            &format!("/workflows/{workflow_id}/executions"),
            json!({ "input": input }),
        )
        .await
    }

    /// `GET /workflows/{workflowId}/executions`
    pub async fn list_workflow_executions(
        &self,
        workflow_id: &str,
        options: &WorkflowExecutionListOptions,
    ) -> Result<Value> {
        self.get(
            &format!("/workflows/{workflow_id}/executions"),
            Some(to_map(options)?),
        )
        .await
    }

    /// `DELETE /workflows/{workflowId}/executions/{executionId}`
    pub async fn delete_workflow_execution(&self, workflow_id: &str, execution_id: &str) -> Result<Value> {
        self.delete(
            &format!("/workflows/{workflow_id}/executions/{execution_id}"),
            None,
        )
        .await
    }
}
