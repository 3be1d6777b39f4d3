// Run data repository backed by a JSON export on disk or over HTTP
use crate::application::run_repository::RunDataRepository;
use crate::domain::dataset::Dataset;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureSource {
    File(PathBuf),
    Http(String),
}

impl FixtureSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            FixtureSource::Http(source.to_string())
        } else {
            FixtureSource::File(PathBuf::from(source))
        }
    }
}

impl fmt::Display for FixtureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureSource::File(path) => write!(f, "{}", path.display()),
            FixtureSource::Http(url) => f.write_str(url),
        }
    }
}

/// Rewrite bare `NaN` values (`: NaN`) into `: null` so the export parses as JSON.
pub fn sanitize_nan(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(colon) = rest.find(':') {
        cleaned.push_str(&rest[..colon]);
        let after_colon = &rest[colon + 1..];
        match after_colon.trim_start().strip_prefix("NaN") {
            Some(tail) => {
                cleaned.push_str(": null");
                rest = tail;
            }
            None => {
                cleaned.push(':');
                rest = after_colon;
            }
        }
    }
    cleaned.push_str(rest);

    cleaned
}

pub struct FixtureRepository {
    source: FixtureSource,
    client: reqwest::Client,
    dataset: OnceCell<Arc<Dataset>>,
}

impl FixtureRepository {
    pub fn new(source: &str) -> Self {
        Self {
            source: FixtureSource::parse(source),
            client: reqwest::Client::new(),
            dataset: OnceCell::new(),
        }
    }

    async fn fetch_text(&self) -> Result<String> {
        match &self.source {
            FixtureSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read run data from {}", path.display())),
            FixtureSource::Http(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .context("Failed to send request for run data")?;

                if !response.status().is_success() {
                    anyhow::bail!("Run data request failed with status {}", response.status());
                }

                response.text().await.context("Failed to read run data response")
            }
        }
    }

    async fn fetch_dataset(&self) -> Result<Arc<Dataset>> {
        let text = self.fetch_text().await?;
        let dataset: Dataset =
            serde_json::from_str(&sanitize_nan(&text)).context("Failed to parse run data")?;

        tracing::info!("Loaded {} timesteps from {}", dataset.len(), self.source);
        Ok(Arc::new(dataset))
    }
}

#[async_trait]
impl RunDataRepository for FixtureRepository {
    async fn load_dataset(&self) -> Arc<Dataset> {
        // Failed loads are not cached, the next caller tries again
        match self.dataset.get_or_try_init(|| self.fetch_dataset()).await {
            Ok(dataset) => dataset.clone(),
            Err(e) => {
                tracing::error!("Failed to load run data: {:#}", e);
                Arc::new(Dataset::default())
            }
        }
    }
}
