//! XRPC client covering login, blob upload, and post creation.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BlueskyError;
use crate::types::{
    CreateRecordRequest, CreateSessionRequest, EmbeddedImage, ImagesEmbed, PostRecord, ReplyRef,
    Session, StrongRef, UploadBlobResponse, IMAGES_EMBED_TYPE, POST_COLLECTION,
};

/// Largest image blob the service accepts.
pub const MAX_IMAGE_BYTES: usize = 1_000_000;

const CREATE_SESSION: &str = "com.atproto.server.createSession";
const UPLOAD_BLOB: &str = "com.atproto.repo.uploadBlob";
const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

#[derive(Clone)]
pub struct Credentials {
    pub handle: String,
    pub password: String,
}

impl Credentials {
    /// Trims surrounding whitespace from both values.
    #[must_use]
    pub fn new(handle: &str, password: &str) -> Self {
        Self {
            handle: handle.trim().to_string(),
            password: password.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("handle", &self.handle)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Image attached to the root post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub url: String,
    pub alt: String,
}

/// Where a published thread ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedThread {
    pub root_uri: String,
    /// Public web link to the root post.
    pub url: String,
    pub posts: usize,
}

pub struct BlueskyClient {
    client: Client,
    service: Url,
    reply_delay: Duration,
}

impl BlueskyClient {
    /// Creates a client for the PDS at `service_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BlueskyError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`BlueskyError::InvalidServiceUrl`] if `service_url` does not parse.
    pub fn new(service_url: &str, timeout_secs: u64) -> Result<Self, BlueskyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("shelfpost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // One trailing slash so `join("xrpc/...")` appends instead of replacing.
        let normalised = format!("{}/", service_url.trim_end_matches('/'));
        let service = Url::parse(&normalised).map_err(|e| BlueskyError::InvalidServiceUrl {
            url: service_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            service,
            reply_delay: Duration::from_secs(1),
        })
    }

    /// Pause between consecutive posts of a thread.
    #[must_use]
    pub fn with_reply_delay(mut self, reply_delay: Duration) -> Self {
        self.reply_delay = reply_delay;
        self
    }

    /// # Errors
    ///
    /// Returns [`BlueskyError`] if the session cannot be created.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, BlueskyError> {
        let request = CreateSessionRequest {
            identifier: &credentials.handle,
            password: &credentials.password,
        };
        let session: Session = self.post_json(CREATE_SESSION, None, &request).await?;
        tracing::info!(handle = %session.handle, did = %session.did, "logged in to Bluesky");
        Ok(session)
    }

    /// Uploads raw image bytes and returns the blob reference.
    ///
    /// # Errors
    ///
    /// Returns [`BlueskyError`] if the upload is rejected.
    pub async fn upload_blob(
        &self,
        session: &Session,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<serde_json::Value, BlueskyError> {
        let response = self
            .client
            .post(self.xrpc_url(UPLOAD_BLOB)?)
            .bearer_auth(&session.access_jwt)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadBlobResponse = Self::read_json(UPLOAD_BLOB, response).await?;
        Ok(uploaded.blob)
    }

    /// Creates one `app.bsky.feed.post` record.
    ///
    /// # Errors
    ///
    /// Returns [`BlueskyError`] if the record is rejected.
    pub async fn create_post(
        &self,
        session: &Session,
        text: &str,
        reply: Option<ReplyRef>,
        embed: Option<ImagesEmbed>,
    ) -> Result<StrongRef, BlueskyError> {
        let request = CreateRecordRequest {
            repo: &session.did,
            collection: POST_COLLECTION,
            record: PostRecord {
                kind: POST_COLLECTION,
                text,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                reply,
                embed,
            },
        };
        self.post_json(CREATE_RECORD, Some(session), &request).await
    }

    /// Downloads an image and returns its bytes and content type.
    ///
    /// # Errors
    ///
    /// Returns [`BlueskyError`] on network failure, a non-2xx status, or an
    /// image over [`MAX_IMAGE_BYTES`].
    pub async fn fetch_image(&self, url: &str) -> Result<(Vec<u8>, String), BlueskyError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BlueskyError::ImageStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(BlueskyError::ImageTooLarge {
                url: url.to_owned(),
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        Ok((bytes, mime_type))
    }

    /// Publishes `messages` as a thread: the first is the root, each later one
    /// replies to the previous with the first as thread root.
    ///
    /// A cover image that cannot be fetched or uploaded is logged and left out;
    /// the thread is still posted.
    ///
    /// # Errors
    ///
    /// Returns [`BlueskyError::EmptyThread`] for no messages, or the first
    /// login or post failure. Posts made before a failure stay published.
    pub async fn publish_thread(
        &self,
        credentials: &Credentials,
        messages: &[String],
        cover: Option<&CoverImage>,
    ) -> Result<PublishedThread, BlueskyError> {
        let Some((first, replies)) = messages.split_first() else {
            return Err(BlueskyError::EmptyThread);
        };

        let session = self.login(credentials).await?;

        let embed = match cover {
            Some(cover) => self.cover_embed(&session, cover).await,
            None => None,
        };

        let root = self.create_post(&session, first, None, embed).await?;
        tracing::info!(uri = %root.uri, "posted thread root");

        let mut parent = root.clone();
        for (i, text) in replies.iter().enumerate() {
            tokio::time::sleep(self.reply_delay).await;
            let reply = ReplyRef {
                root: root.clone(),
                parent: parent.clone(),
            };
            parent = self.create_post(&session, text, Some(reply), None).await?;
            tracing::debug!(position = i + 2, uri = %parent.uri, "posted reply");
        }

        let url = post_url(&session.handle, &root.uri);
        tracing::info!(posts = messages.len(), %url, "thread published");
        Ok(PublishedThread {
            root_uri: root.uri,
            url,
            posts: messages.len(),
        })
    }

    async fn cover_embed(&self, session: &Session, cover: &CoverImage) -> Option<ImagesEmbed> {
        let uploaded = async {
            let (bytes, mime_type) = self.fetch_image(&cover.url).await?;
            self.upload_blob(session, bytes, &mime_type).await
        }
        .await;

        match uploaded {
            Ok(blob) => {
                tracing::info!(url = %cover.url, "uploaded cover image");
                Some(ImagesEmbed {
                    kind: IMAGES_EMBED_TYPE,
                    images: vec![EmbeddedImage {
                        alt: cover.alt.clone(),
                        image: blob,
                    }],
                })
            }
            Err(e) => {
                tracing::warn!(url = %cover.url, error = %e, "could not attach cover image");
                None
            }
        }
    }

    fn xrpc_url(&self, method: &'static str) -> Result<Url, BlueskyError> {
        self.service
            .join(&format!("xrpc/{method}"))
            .map_err(|e| BlueskyError::InvalidServiceUrl {
                url: self.service.to_string(),
                reason: e.to_string(),
            })
    }

    async fn post_json<B, T>(
        &self,
        method: &'static str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, BlueskyError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.xrpc_url(method)?).json(body);
        if let Some(session) = session {
            request = request.bearer_auth(&session.access_jwt);
        }
        let response = request.send().await?;
        Self::read_json(method, response).await
    }

    async fn read_json<T: DeserializeOwned>(
        method: &'static str,
        response: reqwest::Response,
    ) -> Result<T, BlueskyError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BlueskyError::Status {
                method,
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|source| BlueskyError::Deserialize {
            method,
            body,
            source,
        })
    }
}

/// Public web link for the post at `uri` (`at://did/collection/rkey`).
#[must_use]
pub fn post_url(handle: &str, uri: &str) -> String {
    let rkey = uri.rsplit('/').next().unwrap_or(uri);
    format!("https://bsky.app/profile/{handle}/post/{rkey}")
}
