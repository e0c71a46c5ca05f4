use pilot_logging::pilot_info;
use serde::{Deserialize, Serialize};

use crate::config::{require, X_ACCESS_TOKEN};
use crate::http::{build_client, check_status, map_reqwest_error};
use crate::{EngineConfig, Receipt, ServiceError};

pub(crate) const SERVICE: &str = "X";

#[async_trait::async_trait]
pub trait MicroblogClient: Send + Sync {
    async fn post(&self, text: &str) -> Result<Receipt, ServiceError>;
}

#[derive(Debug, Serialize)]
struct CreatePost<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
    text: Option<String>,
}

pub fn status_url(id: &str) -> String {
    format!("https://x.com/i/status/{id}")
}

/// X API v2 client posting with an OAuth 2.0 user-context token.
pub struct XClient {
    access_token: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl XClient {
    pub fn new(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            access_token: config.credentials.x_access_token.clone(),
            base_url: config.endpoints.x.trim_end_matches('/').to_string(),
            client: build_client(SERVICE, &config.http)?,
        })
    }
}

#[async_trait::async_trait]
impl MicroblogClient for XClient {
    async fn post(&self, text: &str) -> Result<Receipt, ServiceError> {
        let token = require(&self.access_token, X_ACCESS_TOKEN)?;
        let response = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(token)
            .json(&CreatePost { text })
            .send()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;
        let response = check_status(SERVICE, response).await?;
        let created: CreatePostResponse = response
            .json()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;

        let permalink = status_url(&created.data.id);
        pilot_info!("Posted to X id={} url={}", created.data.id, permalink);
        Ok(Receipt {
            id: Some(created.data.id),
            permalink: Some(permalink),
            text: created.data.text,
        })
    }
}
