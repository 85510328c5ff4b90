//! Pipeline collaborators backed by the real HTTP clients.

use std::time::Duration;

use anyhow::Context;
use shelfpost_bluesky::{BlueskyClient, CoverImage, Credentials};
use shelfpost_catalog::CatalogClient;
use shelfpost_core::{AppConfig, DetailRecord, IdentifierPattern, ThreadPlan};
use shelfpost_generator::{ChatClient, GeneratorSettings};

use crate::pipeline::{CandidateSource, TextGenerator, ThreadPublisher};

pub(crate) struct Catalog {
    client: CatalogClient,
    listing_url: String,
    pattern: IdentifierPattern,
}

impl Catalog {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = CatalogClient::new(
            config.http_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
        .context("failed to build catalog client")?;
        Ok(Self {
            client,
            listing_url: config.catalog_url.clone(),
            pattern: config.identifier_pattern.clone(),
        })
    }
}

impl CandidateSource for Catalog {
    async fn fetch_candidates(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.client.fetch_candidates(&self.listing_url).await?)
    }

    async fn fetch_detail(&self, reference: &str) -> anyhow::Result<DetailRecord> {
        Ok(self.client.fetch_detail(reference, &self.pattern).await?)
    }
}

pub(crate) struct Generator {
    client: ChatClient,
}

impl Generator {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let settings = GeneratorSettings {
            api_key: config.require_generator_api_key()?.to_string(),
            endpoint: config.generator_url.clone(),
            model: config.generator_model.clone(),
            max_tokens: config.generator_max_tokens,
            temperature: config.generator_temperature,
            timeout_secs: config.generator_timeout_secs,
        };
        let client = ChatClient::new(settings).context("failed to build generator client")?;
        Ok(Self { client })
    }
}

impl TextGenerator for Generator {
    async fn generate(&self, record: &DetailRecord) -> anyhow::Result<String> {
        match self.client.generate(record).await {
            Ok(text) => Ok(text),
            Err(e) => {
                if let Some(body) = e.body() {
                    tracing::error!(body, "generator response body");
                }
                Err(e.into())
            }
        }
    }
}

pub(crate) struct Publisher {
    client: BlueskyClient,
    credentials: Credentials,
}

impl Publisher {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let (handle, password) = config.bluesky_credentials()?;
        let client = BlueskyClient::new(&config.bluesky_service, config.http_timeout_secs)
            .context("failed to build Bluesky client")?
            .with_reply_delay(Duration::from_millis(config.reply_delay_ms));
        Ok(Self {
            client,
            credentials: Credentials::new(handle, password),
        })
    }
}

impl ThreadPublisher for Publisher {
    async fn publish(&self, plan: &ThreadPlan, record: &DetailRecord) -> anyhow::Result<String> {
        let cover = cover_image(record);
        let thread = self
            .client
            .publish_thread(&self.credentials, plan.messages(), cover.as_ref())
            .await?;
        Ok(thread.url)
    }
}

/// Dry runs never publish, so they get a publisher that refuses to.
pub(crate) struct NoPublish;

impl ThreadPublisher for NoPublish {
    async fn publish(&self, _plan: &ThreadPlan, _record: &DetailRecord) -> anyhow::Result<String> {
        anyhow::bail!("publishing is disabled for this run")
    }
}

fn cover_image(record: &DetailRecord) -> Option<CoverImage> {
    record.image_url.as_ref().map(|url| CoverImage {
        url: url.clone(),
        alt: format!("Book cover: {}", record.title),
    })
}
