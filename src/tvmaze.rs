use crate::models::{ShowImage, ShowRecord};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const TVMAZE_BASE: &str = "https://api.tvmaze.com";

#[async_trait]
pub trait ShowLookup: Send + Sync {
    async fn search_shows(&self, key: &str) -> Result<Vec<ShowRecord>>;
    async fn fetch_show(&self, id: u32) -> Result<ShowRecord>;
}

#[derive(Debug, Clone)]
pub struct TvMazeClient {
    client: Client,
    base_url: String,
}

impl TvMazeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("showshelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {} {}", url, status, text));
        }
        let parsed: T = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

#[async_trait]
impl ShowLookup for TvMazeClient {
    async fn search_shows(&self, key: &str) -> Result<Vec<ShowRecord>> {
        let url = format!(
            "{}/search/shows?q={}",
            self.base_url,
            urlencoding::encode(key)
        );
        let envelopes: Vec<SearchEnvelope> = self.get_json(&url).await?;
        debug!(key = %key, count = envelopes.len(), "TVMaze search returned");
        Ok(envelopes.into_iter().map(|e| e.show.into_record()).collect())
    }

    async fn fetch_show(&self, id: u32) -> Result<ShowRecord> {
        let url = format!("{}/shows/{id}?embed=cast", self.base_url);
        let show: WireShow = self
            .get_json(&url)
            .await
            .with_context(|| format!("fetching show {id}"))?;
        Ok(show.into_record())
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    show: WireShow,
}

#[derive(Debug, Deserialize)]
struct WireShow {
    id: u32,
    name: String,
    #[serde(default)]
    image: Option<WireImage>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(rename = "_embedded", default)]
    embedded: Option<Embedded>,
}

#[derive(Debug, Deserialize)]
struct WireImage {
    medium: Option<String>,
    original: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Embedded {
    #[serde(default)]
    cast: Vec<CastCredit>,
}

#[derive(Debug, Deserialize)]
struct CastCredit {
    person: Person,
}

#[derive(Debug, Deserialize)]
struct Person {
    name: String,
}

impl WireShow {
    fn into_record(self) -> ShowRecord {
        let image = self.image.and_then(|img| match (img.medium, img.original) {
            (Some(medium), Some(original)) => Some(ShowImage { medium, original }),
            (Some(one), None) | (None, Some(one)) => Some(ShowImage {
                medium: one.clone(),
                original: one,
            }),
            (None, None) => None,
        });
        let cast = self
            .embedded
            .map(|e| e.cast.into_iter().map(|c| c.person.name).collect())
            .unwrap_or_default();
        ShowRecord {
            id: self.id,
            name: self.name,
            image,
            summary: self.summary,
            cast,
        }
    }
}
