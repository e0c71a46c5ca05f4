use pilot_logging::{pilot_debug, pilot_info};
use serde::Deserialize;

use crate::config::{
    require, REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_PASSWORD, REDDIT_USERNAME,
};
use crate::http::{build_client, check_status, map_reqwest_error};
use crate::{Credentials, EngineConfig, Receipt, ServiceError};

pub(crate) const SERVICE: &str = "Reddit";

#[async_trait::async_trait]
pub trait ForumClient: Send + Sync {
    /// Submits a text post titled `title` to `board`.
    async fn post(&self, title: &str, body: &str, board: &str) -> Result<Receipt, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    json: SubmitJson,
}

#[derive(Debug, Deserialize)]
struct SubmitJson {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    id: Option<String>,
    url: Option<String>,
}

impl SubmitJson {
    fn into_receipt(self) -> Result<Receipt, ServiceError> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|error| {
                    error
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .collect::<Vec<_>>()
                        .join(": ")
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ServiceError::Rejected {
                service: SERVICE,
                message,
            });
        }
        let data = self.data.ok_or_else(|| ServiceError::Decode {
            service: SERVICE,
            message: "submit response has no data".to_string(),
        })?;
        Ok(Receipt {
            id: data.id,
            permalink: data.url,
            text: None,
        })
    }
}

/// Reddit script-app client: password grant, then `/api/submit`.
pub struct RedditClient {
    credentials: Credentials,
    auth_base_url: String,
    api_base_url: String,
    client: reqwest::Client,
}

impl RedditClient {
    pub fn new(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            credentials: config.credentials.clone(),
            auth_base_url: config.endpoints.reddit_auth.trim_end_matches('/').to_string(),
            api_base_url: config.endpoints.reddit_api.trim_end_matches('/').to_string(),
            client: build_client(SERVICE, &config.http)?,
        })
    }

    /// Reddit asks script apps to identify themselves with their username.
    fn user_agent(&self, username: &str) -> String {
        self.credentials
            .reddit_user_agent
            .clone()
            .unwrap_or_else(|| format!("postpilot:v{} (by u/{username})", env!("CARGO_PKG_VERSION")))
    }

    async fn access_token(&self, user_agent: &str) -> Result<String, ServiceError> {
        let client_id = require(&self.credentials.reddit_client_id, REDDIT_CLIENT_ID)?;
        let secret = require(&self.credentials.reddit_client_secret, REDDIT_CLIENT_SECRET)?;
        let username = require(&self.credentials.reddit_username, REDDIT_USERNAME)?;
        let password = require(&self.credentials.reddit_password, REDDIT_PASSWORD)?;

        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base_url))
            .basic_auth(client_id, Some(secret))
            .header(reqwest::header::USER_AGENT, user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;
        let response = check_status(SERVICE, response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;

        // A bad password still comes back as 200 with an `error` field.
        match (token.access_token, token.error) {
            (Some(token), None) => Ok(token),
            (_, Some(error)) => Err(ServiceError::Unauthorized {
                service: SERVICE,
                message: error,
            }),
            (None, None) => Err(ServiceError::Decode {
                service: SERVICE,
                message: "token response has no access_token".to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl ForumClient for RedditClient {
    async fn post(&self, title: &str, body: &str, board: &str) -> Result<Receipt, ServiceError> {
        let username = require(&self.credentials.reddit_username, REDDIT_USERNAME)?;
        let user_agent = self.user_agent(username);
        let token = self.access_token(&user_agent).await?;
        pilot_debug!("Reddit token acquired; submitting to r/{}", board);

        let response = self
            .client
            .post(format!("{}/api/submit", self.api_base_url))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, user_agent.as_str())
            .form(&[
                ("sr", board),
                ("kind", "self"),
                ("title", title),
                ("text", body),
                ("api_type", "json"),
            ])
            .send()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;
        let response = check_status(SERVICE, response).await?;
        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|err| map_reqwest_error(SERVICE, err))?;

        let receipt = submitted.json.into_receipt()?;
        pilot_info!(
            "Posted to r/{} permalink={}",
            board,
            receipt.permalink.as_deref().unwrap_or("-")
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_errors_are_joined() {
        let json: SubmitJson = serde_json::from_str(
            r#"{"errors":[["SUBREDDIT_NOEXIST","that subreddit doesn't exist","sr"]],"data":null}"#,
        )
        .unwrap();
        let err = json.into_receipt().unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                service: "Reddit",
                message: "SUBREDDIT_NOEXIST: that subreddit doesn't exist: sr".to_string()
            }
        );
    }

    #[test]
    fn submit_data_becomes_receipt() {
        let json: SubmitJson = serde_json::from_str(
            r#"{"errors":[],"data":{"id":"1abc","name":"t3_1abc","url":"https://www.reddit.com/r/test/comments/1abc/x/"}}"#,
        )
        .unwrap();
        let receipt = json.into_receipt().unwrap();
        assert_eq!(receipt.id.as_deref(), Some("1abc"));
        assert_eq!(
            receipt.permalink.as_deref(),
            Some("https://www.reddit.com/r/test/comments/1abc/x/")
        );
    }
}
