pub mod error;
pub mod types;

pub use error::{RedditError, Result};
pub use types::{ListingPage, ListingResponse, RedditPost};

const BASE_URL: &str = "https://oauth.reddit.com";

/// Listings are capped server-side at 100 items per request.
pub const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_USER_AGENT: &str = "EntityTagger/0.1";

#[derive(Clone)]
pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RedditClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Fetch one page of `/r/{subreddit}/new`, continuing from `after` when given.
    pub async fn new_posts_page(
        &self,
        subreddit: &str,
        bearer_token: &str,
        after: Option<&str>,
        limit: u32,
    ) -> Result<ListingPage> {
        let url = format!("{}/r/{}/new", self.base_url, subreddit);
        let limit = limit.min(MAX_PAGE_SIZE).to_string();

        let mut query: Vec<(&str, &str)> = vec![("limit", limit.as_str())];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }

        let resp = self
            .client
            .get(&url)
            .bearer_auth(bearer_token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RedditError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let listing: ListingResponse = serde_json::from_str(&body)?;
        let page = ListingPage::from(listing);
        tracing::debug!(
            subreddit,
            count = page.posts.len(),
            has_next = page.after.is_some(),
            "Fetched listing page"
        );

        Ok(page)
    }
}
