//! Posting API: the [`PostingApi`] seam and its X (Twitter) v2 client.
//!
//! Every failure of a create call is classified into a closed [`PostError`]
//! so the publisher decides continue/retry/abort with a plain `match` instead
//! of inspecting error text.
//!
//! # Status Mapping
//!
//! | Response | Result |
//! |----------|--------|
//! | 2xx with `data.id` | `Ok(id)` |
//! | 403 | [`PostError::Forbidden`] (duplicate content, policy rejection) |
//! | 429 | [`PostError::RateLimited`], reset from `x-rate-limit-reset` |
//! | anything else, transport errors | [`PostError::Other`] |

use crate::credentials::Credentials;
use crate::oauth;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

pub const DEFAULT_POST_ENDPOINT: &str = "https://api.twitter.com/2/tweets";

/// Why a create call did not produce a post.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PostError {
    /// The API refused this content. Waiting will not help.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The rate limit is spent until `reset_at` (when the API said so).
    #[error("rate limited: {detail}")]
    RateLimited {
        reset_at: Option<DateTime<Utc>>,
        detail: String,
    },
    /// Anything unclassified, including transport failures.
    #[error("{0}")]
    Other(String),
}

/// Something that can publish one message.
#[allow(async_fn_in_trait)]
pub trait PostingApi {
    /// Create one post, returning its external id.
    async fn create_post(&self, text: &str) -> Result<String, PostError>;
}

#[derive(Debug, Deserialize)]
struct CreatedEnvelope {
    data: CreatedPost,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProblemBody {
    detail: Option<String>,
    title: Option<String>,
}

/// Pull a readable reason out of an error response body.
///
/// Prefers the problem `detail`, then its `title`, then the raw body cut to
/// 200 characters.
fn problem_detail(body: &str) -> String {
    match serde_json::from_str::<ProblemBody>(body) {
        Ok(ProblemBody {
            detail: Some(detail),
            ..
        }) => detail,
        Ok(ProblemBody {
            title: Some(title), ..
        }) => title,
        _ => truncate_for_log(body.trim(), 200),
    }
}

fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    headers
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// X API v2 client signing each request with OAuth 1.0a.
pub struct XClient {
    client: Client,
    endpoint: Url,
    credentials: Credentials,
}

impl fmt::Debug for XClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl XClient {
    /// Create a client for the create-post endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the create-post endpoint
    /// * `credentials` - OAuth 1.0a user-context credentials used to sign every request
    ///
    /// # Returns
    ///
    /// The client, or an error if `endpoint` is not a valid URL or the HTTP
    /// client cannot be built.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let client = XClient::new(DEFAULT_POST_ENDPOINT, Credentials::from_env()?)?;
    /// let id = client.create_post("Hello").await?;
    /// ```
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: Url::parse(endpoint)?,
            credentials,
        })
    }
}

impl PostingApi for XClient {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint))]
    async fn create_post(&self, text: &str) -> Result<String, PostError> {
        let auth = oauth::authorization_header(
            "POST",
            self.endpoint.as_str(),
            &self.credentials,
            &oauth::nonce(),
            Utc::now().timestamp(),
        );

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, auth)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PostError::Other(format!("request failed: {}", e)))?;

        let status = resp.status();
        let reset_at = rate_limit_reset(resp.headers());
        let body = resp
            .text()
            .await
            .map_err(|e| PostError::Other(format!("reading response failed: {}", e)))?;
        debug!(%status, body = %truncate_for_log(&body, 300), "Create response");

        match status {
            s if s.is_success() => serde_json::from_str::<CreatedEnvelope>(&body)
                .map(|env| env.data.id)
                .map_err(|e| PostError::Other(format!("unexpected create response: {}", e))),
            StatusCode::FORBIDDEN => Err(PostError::Forbidden(problem_detail(&body))),
            StatusCode::TOO_MANY_REQUESTS => {
                if reset_at.is_none() {
                    warn!("429 without a usable x-rate-limit-reset header");
                }
                Err(PostError::RateLimited {
                    reset_at,
                    detail: problem_detail(&body),
                })
            }
            other => Err(PostError::Other(format!(
                "HTTP {}: {}",
                other.as_u16(),
                problem_detail(&body)
            ))),
        }
    }
}
