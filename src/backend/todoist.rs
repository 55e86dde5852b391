//! Blocking HTTP client for the Todoist REST and Sync APIs.
//!
//! Entity CRUD goes through the REST endpoints; the full-account read and
//! the restore command batch go through the sync endpoint. No retries and
//! no rate-limit handling: a throttled or failed call is surfaced to the
//! caller, and re-invocation is the recovery path.

use log::debug;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::{
    Backend, BackendError, CreateLabelArgs, CreateProjectArgs, CreateSectionArgs, CreateTaskArgs,
    Label, Project, Section, SyncCommand, SyncResponse, Task,
};
use crate::config::ApiConfig;

pub struct TodoistClient {
    http: Client,
    token: String,
    rest_url: String,
    sync_url: String,
}

impl TodoistClient {
    pub fn new(token: String, api: &ApiConfig) -> Self {
        Self {
            http: Client::new(),
            token,
            rest_url: api.rest_url.trim_end_matches('/').to_string(),
            sync_url: api.sync_url.clone(),
        }
    }

    fn get<T: DeserializeOwned>(&self, resource: &str) -> Result<T, BackendError> {
        let response = self
            .http
            .get(format!("{}/{}", self.rest_url, resource))
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Self::parse(response)
    }

    fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let response = self
            .http
            .post(format!("{}/{}", self.rest_url, resource))
            .bearer_auth(&self.token)
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .json(body)
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Self::parse(response)
    }

    fn sync(&self, params: &[(&str, &str)]) -> Result<String, BackendError> {
        let response = self
            .http
            .post(&self.sync_url)
            .bearer_auth(&self.token)
            .form(params)
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let response = Self::check(response)?;
        response
            .text()
            .map_err(|e| BackendError::Network(e.to_string()))
    }

    fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(BackendError::Auth(body));
        }
        Err(BackendError::Api {
            status: status.as_u16(),
            body,
        })
    }

    fn parse<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let response = Self::check(response)?;
        response
            .json()
            .map_err(|e| BackendError::InvalidData(e.to_string()))
    }
}

impl Backend for TodoistClient {
    fn projects(&self) -> Result<Vec<Project>, BackendError> {
        self.get("projects")
    }

    fn sections(&self) -> Result<Vec<Section>, BackendError> {
        self.get("sections")
    }

    fn labels(&self) -> Result<Vec<Label>, BackendError> {
        self.get("labels")
    }

    fn tasks(&self) -> Result<Vec<Task>, BackendError> {
        self.get("tasks")
    }

    fn create_project(&self, args: &CreateProjectArgs) -> Result<Project, BackendError> {
        self.post("projects", args)
    }

    fn create_section(&self, args: &CreateSectionArgs) -> Result<Section, BackendError> {
        self.post("sections", args)
    }

    fn create_label(&self, args: &CreateLabelArgs) -> Result<Label, BackendError> {
        self.post("labels", args)
    }

    fn create_task(&self, args: &CreateTaskArgs) -> Result<Task, BackendError> {
        self.post("tasks", args)
    }

    fn full_sync(&self) -> Result<String, BackendError> {
        let payload = self.sync(&[("sync_token", "*"), ("resource_types", r#"["all"]"#)])?;
        debug!("full sync returned {} bytes", payload.len());
        Ok(payload)
    }

    fn apply_commands(&self, commands: &[SyncCommand]) -> Result<SyncResponse, BackendError> {
        let batch =
            serde_json::to_string(commands).map_err(|e| BackendError::InvalidData(e.to_string()))?;
        let payload = self.sync(&[("commands", batch.as_str())])?;
        serde_json::from_str(&payload).map_err(|e| BackendError::InvalidData(e.to_string()))
    }
}
