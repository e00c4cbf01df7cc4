pub mod kw;

use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;

/// Server API actions used by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Projects,
    Modules,
    Views,
    CreateModule,
    UpdateModule,
    CreateView,
    UpdateView,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Projects => "projects",
            Action::Modules => "modules",
            Action::Views => "views",
            Action::CreateModule => "create_module",
            Action::UpdateModule => "update_module",
            Action::CreateView => "create_view",
            Action::UpdateView => "update_view",
        }
    }
}

/// One request to the server API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub action: Action,
    pub project: Option<String>,
    pub name: Option<String>,
    pub paths: Option<String>,
    pub query: Option<String>,
    pub tags: Option<String>,
    pub allow_all: Option<bool>,
}

impl ApiRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            project: None,
            name: None,
            paths: None,
            query: None,
            tags: None,
            allow_all: None,
        }
    }

    pub fn projects() -> Self {
        Self::new(Action::Projects)
    }

    pub fn for_project(action: Action, project: &str) -> Self {
        Self {
            project: Some(project.to_string()),
            ..Self::new(action)
        }
    }

    /// Form fields in the order they are sent
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("action", self.action.as_str().to_string())];
        let optional = [
            ("project", &self.project),
            ("name", &self.name),
            ("paths", &self.paths),
            ("query", &self.query),
            ("tags", &self.tags),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                fields.push((key, value.clone()));
            }
        }
        if let Some(allow_all) = self.allow_all {
            fields.push(("allow_all", allow_all.to_string()));
        }
        fields
    }
}

/// Raw server answer: an error message, or line-oriented JSON records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    pub error_msg: Option<String>,
    pub records: Vec<String>,
}

impl ApiResponse {
    pub fn ok(records: Vec<String>) -> Self {
        Self {
            error_msg: None,
            records,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error_msg: Some(msg.into()),
            records: Vec::new(),
        }
    }

    /// Turn a reported server error into a fatal transport error
    pub fn into_records(self) -> AppResult<Vec<String>> {
        match self.error_msg {
            Some(msg) if !msg.is_empty() => Err(AppError::transport(format!(
                "Error with server API: \"{}\"",
                msg
            ))),
            _ => Ok(self.records),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NamedRecord {
    name: String,
}

/// Extract the `name` field of every record
pub fn record_names(records: &[String]) -> AppResult<Vec<String>> {
    records
        .iter()
        .map(|record| {
            serde_json::from_str::<NamedRecord>(record.trim())
                .map(|r| r.name)
                .map_err(|e| {
                    AppError::transport(format!(
                        "Something wrong with json record \"{}\": {}",
                        record, e
                    ))
                })
        })
        .collect()
}

#[async_trait]
pub trait ServerApi: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> AppResult<ApiResponse>;
}

#[async_trait]
impl<'a, T: ServerApi + ?Sized> ServerApi for &'a T {
    async fn execute(&self, request: &ApiRequest) -> AppResult<ApiResponse> {
        (**self).execute(request).await
    }
}
