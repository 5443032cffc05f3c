use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::models::{comments_from_listing, items_from_listing, Comment, Listing, Post, SavedItem};
use super::{ItemSource, RedditError};
use crate::archiver::Mode;
use crate::config::Config;

/// Page size requested from listing endpoints.
const PAGE_LIMIT: &str = "100";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Authenticated client for the current user's listings.
#[derive(Debug, Clone)]
pub struct RedditClient {
    http: Client,
    api_base: String,
    username: String,
    access_token: String,
}

impl RedditClient {
    /// Log in with the password grant.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint is unreachable or rejects the
    /// credentials.
    pub async fn login(config: &Config) -> Result<Self, RedditError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()?;

        debug!(url = %config.reddit_auth_url, "Requesting access token");

        let response = http
            .post(&config.reddit_auth_url)
            .basic_auth(&config.reddit_client_id, Some(&config.reddit_client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", config.reddit_username.as_str()),
                ("password", config.reddit_password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RedditError::Auth {
                reason: format!("token endpoint returned {status}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        let access_token = match (token.access_token, token.error) {
            (Some(token), _) if !token.is_empty() => token,
            (_, Some(error)) => return Err(RedditError::Auth { reason: error }),
            _ => {
                return Err(RedditError::Auth {
                    reason: "no access token in response".to_string(),
                })
            }
        };

        info!(username = %config.reddit_username, "Authenticated with Reddit");

        Ok(Self {
            http,
            api_base: config.reddit_api_base.trim_end_matches('/').to_string(),
            username: config.reddit_username.clone(),
            access_token,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RedditError> {
        let url = format!("{}{endpoint}", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RedditError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| RedditError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Fetch every page of the user's saved or upvoted listing.
    ///
    /// # Errors
    ///
    /// Returns an error if any page fails to load.
    pub async fn listing(&self, mode: Mode) -> Result<Vec<SavedItem>, RedditError> {
        let endpoint = format!("/user/{}/{}", self.username, mode.as_str());
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let listing: Listing = {
                let mut query = vec![("limit", PAGE_LIMIT), ("raw_json", "1")];
                if let Some(cursor) = after.as_deref() {
                    query.push(("after", cursor));
                }
                self.get_json(&endpoint, &query).await?
            };
            let (page, next) = items_from_listing(listing);
            debug!(endpoint = %endpoint, count = page.len(), "Fetched listing page");
            items.extend(page);

            match next {
                Some(cursor) if !cursor.is_empty() => after = Some(cursor),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Fetch a post's comment tree with "load more" placeholders removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the comments endpoint fails.
    pub async fn comments(&self, post_id: &str) -> Result<Vec<Comment>, RedditError> {
        let endpoint = format!("/comments/{post_id}");
        let listings: Vec<Listing> = self.get_json(&endpoint, &[("raw_json", "1")]).await?;

        // The first listing holds the post itself.
        Ok(listings
            .into_iter()
            .nth(1)
            .map(comments_from_listing)
            .unwrap_or_default())
    }
}

#[async_trait]
impl ItemSource for RedditClient {
    async fn items(&self, mode: Mode) -> Result<Vec<SavedItem>> {
        Ok(self.listing(mode).await?)
    }

    async fn post_comments(&self, post: &Post) -> Result<Vec<Comment>> {
        Ok(self.comments(&post.id).await?)
    }
}
