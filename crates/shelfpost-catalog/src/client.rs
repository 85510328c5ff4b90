//! HTTP client for the bookstore's listing and product pages.

use std::time::Duration;

use reqwest::Client;
use shelfpost_core::{DetailRecord, IdentifierPattern};

use crate::error::CatalogError;
use crate::extract;
use crate::rate_limit::retry_with_backoff;

/// Fetches catalog pages as HTML.
///
/// Rate limiting (429) and network failures are retried with exponential
/// backoff; 404 and other non-2xx statuses surface as typed errors at once.
pub struct CatalogClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// Creates a client with the given timeout, `User-Agent`, and retry policy.
    ///
    /// `max_retries` counts attempts after the first; `0` disables retries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Product references linked from the listing page at `listing_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the listing cannot be fetched.
    pub async fn fetch_candidates(&self, listing_url: &str) -> Result<Vec<String>, CatalogError> {
        let page = self.fetch_page(listing_url).await?;
        let references = extract::listing_references(listing_url, &page);
        tracing::info!(
            listing_url,
            count = references.len(),
            "collected catalog references"
        );
        Ok(references)
    }

    /// Detail record for the product page at `reference`.
    ///
    /// The record may lack a title; callers check [`DetailRecord::is_complete`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the page cannot be fetched.
    pub async fn fetch_detail(
        &self,
        reference: &str,
        pattern: &IdentifierPattern,
    ) -> Result<DetailRecord, CatalogError> {
        let page = self.fetch_page(reference).await?;
        let record = extract::detail_record(reference, &page, pattern);
        tracing::info!(
            reference,
            title = %record.title,
            author = %record.author,
            has_image = record.image_url.is_some(),
            "extracted detail record"
        );
        Ok(record)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, CatalogError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "nb-NO,nb;q=0.9,no;q=0.8,en;q=0.5")
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(CatalogError::RateLimited {
                    url: url.to_owned(),
                    retry_after_secs,
                });
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(CatalogError::NotFound {
                    url: url.to_owned(),
                });
            }

            if !status.is_success() {
                return Err(CatalogError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }
}
