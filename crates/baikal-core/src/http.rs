use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::AuthApi;
use crate::chat::{ChatApi, ChatReply};
use crate::error::{Error, Result};
use crate::models::{Approval, ApprovalAction, LoginResponse, Notice, Schedule, Task, TaskStatus, User};
use crate::records::RecordsApi;
use crate::storage::{SessionStorage, TOKEN_KEY};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct ActionRequest<'a> {
    action: ApprovalAction,
    comment: &'a str,
}

#[derive(Serialize)]
struct StatusUpdate {
    status: TaskStatus,
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
    #[serde(default)]
    service: String,
}

/// Thin client over the groupware REST API.
///
/// The bearer token is read from session storage on every request, so a
/// login or logout takes effect without rebuilding the client.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    storage: Arc<SessionStorage>,
}

impl ApiClient {
    pub fn new(base_url: &str, storage: Arc<SessionStorage>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            storage,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "backend request");

        let builder = self.client.request(method, &url);
        match self.storage.get_item(TOKEN_KEY) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_raw(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "backend returned an error");
            return Err(Error::from_response_body(status.as_u16(), &body));
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let body = self.send_raw(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /health`; returns the service description.
    pub async fn health(&self) -> Result<String> {
        let health: HealthResponse = self.send(self.request(Method::GET, "/health")).await?;
        Ok(format!("{} ({})", health.service, health.status))
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        self.send(request).await
    }

    async fn me(&self) -> Result<User> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }
}

#[async_trait]
impl ChatApi for ApiClient {
    async fn chat(&self, message: &str) -> Result<ChatReply> {
        let request = self
            .request(Method::POST, "/chat")
            .json(&ChatRequest { message });
        self.send(request).await
    }
}

#[async_trait]
impl RecordsApi for ApiClient {
    async fn list_approvals(&self) -> Result<Vec<Approval>> {
        self.send(self.request(Method::GET, "/approvals")).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.send(self.request(Method::GET, "/tasks")).await
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        self.send(self.request(Method::GET, "/schedules")).await
    }

    async fn list_notices(&self) -> Result<Vec<Notice>> {
        self.send(self.request(Method::GET, "/notices")).await
    }

    async fn submit_approval(&self, id: &str) -> Result<()> {
        let path = format!("/approvals/{id}/submit");
        self.send_raw(self.request(Method::POST, &path)).await?;
        Ok(())
    }

    async fn act_on_approval(&self, id: &str, action: ApprovalAction, comment: &str) -> Result<()> {
        let path = format!("/approvals/{id}/action");
        let request = self
            .request(Method::POST, &path)
            .json(&ActionRequest { action, comment });
        self.send_raw(request).await?;
        Ok(())
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        let path = format!("/tasks/{id}");
        let request = self
            .request(Method::PATCH, &path)
            .json(&StatusUpdate { status });
        self.send_raw(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_attached_only_when_token_present() {
        let storage = Arc::new(SessionStorage::in_memory());
        let client = ApiClient::new("http://localhost:8000/api/", storage.clone());
        assert_eq!(client.base_url(), "http://localhost:8000/api");

        let anonymous = client.request(Method::GET, "/auth/me").build().unwrap();
        assert!(anonymous.headers().get("authorization").is_none());
        assert_eq!(anonymous.url().as_str(), "http://localhost:8000/api/auth/me");

        storage.set_item(TOKEN_KEY, "tok-123").unwrap();
        let authed = client.request(Method::GET, "/auth/me").build().unwrap();
        assert_eq!(
            authed.headers().get("authorization").unwrap(),
            "Bearer tok-123"
        );
    }

    #[test]
    fn test_transition_bodies() {
        let body = serde_json::to_value(ActionRequest {
            action: ApprovalAction::Rejected,
            comment: "예산 초과",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"action": "rejected", "comment": "예산 초과"}));

        let body = serde_json::to_value(StatusUpdate { status: TaskStatus::InProgress }).unwrap();
        assert_eq!(body, serde_json::json!({"status": "in_progress"}));
    }
}
