use serde::Deserialize;

/// Top-level envelope of a listing response: `{"kind": "Listing", "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingResponse {
    pub data: ListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
    /// Cursor for the next page. `null` at the end of the listing.
    pub after: Option<String>,
}

/// A listing child. Only the `data` payload is read.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub data: RedditPost,
}

/// A single submission from a subreddit listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditPost {
    /// Fullname, e.g. `t3_abc123`. Unique across the site.
    pub name: String,
    #[serde(default)]
    pub title: String,
    /// Body of a self post. Empty for link posts.
    #[serde(default)]
    pub selftext: String,
    pub category: Option<String>,
    #[serde(default)]
    pub upvote_ratio: f64,
}

/// One page of a listing, flattened out of the response envelope.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub posts: Vec<RedditPost>,
    pub after: Option<String>,
}

impl From<ListingResponse> for ListingPage {
    fn from(resp: ListingResponse) -> Self {
        Self {
            posts: resp.data.children.into_iter().map(|t| t.data).collect(),
            after: resp.data.after.filter(|a| !a.is_empty()),
        }
    }
}
