//! Users: `/users`

use serde::Serialize;
use serde_json::{Value, json};

use crate::client::Client;
use crate::error::Result;
use crate::resources::{ListOptions, merged, to_map};

/// Optional profile fields of a user.
#[derive(Debug, Default, Clone, Serialize)]
pub struct UserOptions {
    pub name: Option<String>,
    /// Base64-encoded JPEG.
    pub avatar: Option<String>,
}

impl Client {
    /// `POST /users`
    pub async fn create_user(&self, email: &str, options: &UserOptions) -> Result<Value> {
        let body = merged(&json!({ "email": email }), options)?;
        self.post("/users", Value::Object(body)).await
    }

    /// `GET /users`
    pub async fn list_users(&self, options: &ListOptions) -> Result<Value> {
        self.get("/users", Some(to_map(options)?)).await
    }

    /// `GET /users/{userId}`
    pub async fn get_user(&self, user_id: &str) -> Result<Value> {
        self.get(&format!("/users/{user_id}"), None).await
    }

    /// `PATCH /users/{userId}`
    pub async fn update_user(&self, user_id: &str, options: &UserOptions) -> Result<Value> {
        self.patch(&format!("/users/{user_id}"), Value::Object(to_map(options)?))
            .await
    }

    /// `DELETE /users/{userId}`
    pub async fn delete_user(&self, user_id: &str) -> Result<Value> {
        self.delete(&format!("/users/{user_id}"), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn user_crud() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(json!({"email": "a@b.c", "name": "John Doe"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userId": "u1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("maxResults", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userId": "u1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/users/u1"))
            .and(body_json(json!({"avatar": "aGk="})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userId": "u1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/users/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userId": "u1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let created = client
            .create_user(
                "a@b.c",
                &UserOptions {
                    name: Some("John Doe".into()),
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created["userId"], "u1");
        client.list_users(&ListOptions::default().max_results(1)).await.unwrap();
        client.get_user("u1").await.unwrap();
        client
            .update_user(
                "u1",
                &UserOptions {
                    name: None,
                    avatar: Some("aGk=".into()),
                },
            )
            .await
            .unwrap();
        client.delete_user("u1").await.unwrap();
    }
}
