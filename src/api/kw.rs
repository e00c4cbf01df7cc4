use super::{ApiRequest, ApiResponse, ServerApi};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const API_PATH: &str = "review/api";

#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    message: Option<String>,
}

/// HTTP client for the analysis server's review API
pub struct KwApiClient {
    client: Client,
    endpoint: Url,
    user: String,
    ltoken: Option<String>,
}

impl KwApiClient {
    pub fn new(url: &str, user: &str, ltoken_file: Option<&Path>) -> AppResult<Self> {
        let base = Url::parse(url)
            .map_err(|e| AppError::config(format!("Invalid server URL \"{}\": {}", url, e)))?;
        let endpoint = api_endpoint(&base)?;

        let ltoken_path = ltoken_file
            .map(Path::to_path_buf)
            .or_else(default_ltoken_path);
        let ltoken = match ltoken_path {
            Some(path) => lookup_ltoken(&path, &base, user)?,
            None => None,
        };
        if ltoken.is_none() {
            tracing::debug!("No login token found for user \"{}\" on {}", user, base);
        }

        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("kwfilters/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            endpoint,
            user: user.to_string(),
            ltoken,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ServerApi for KwApiClient {
    async fn execute(&self, request: &ApiRequest) -> AppResult<ApiResponse> {
        let mut form = vec![("user", self.user.clone())];
        if let Some(token) = &self.ltoken {
            form.push(("ltoken", token.clone()));
        }
        form.extend(request.form_fields());

        tracing::trace!("POST {} action={}", self.endpoint, request.action.as_str());

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to reach {}: {}", self.endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read server response: {}", e)))?;

        if !status.is_success() {
            return Ok(ApiResponse::error(format!(
                "{} - {}",
                status,
                error_message(&body)
            )));
        }

        Ok(ApiResponse::ok(split_records(&body)))
    }
}

fn api_endpoint(base: &Url) -> AppResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(API_PATH)
        .map_err(|e| AppError::config(format!("Invalid server URL \"{}\": {}", base, e)))
}

/// Prefer the server's JSON `message`, fall back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ServerErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string())
}

fn split_records(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_ltoken_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".klocwork").join("ltoken"))
}

/// Find the token for `user` on the server's host and port
///
/// Each line of the token file reads `host;port;user;token`.
fn lookup_ltoken(path: &Path, server: &Url, user: &str) -> AppResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let host = server.host_str().unwrap_or_default();
    let port = server
        .port_or_known_default()
        .map(|p| p.to_string())
        .unwrap_or_default();

    Ok(content.lines().find_map(|line| {
        let fields: Vec<&str> = line.trim().split(';').collect();
        match fields.as_slice() {
            [h, p, u, token] if *h == host && *p == port && *u == user => {
                Some(token.to_string())
            }
            _ => None,
        }
    }))
}
