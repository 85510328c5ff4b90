//! XRPC request and response bodies. Field names follow the lexicons.

use serde::{Deserialize, Serialize};

pub const POST_COLLECTION: &str = "app.bsky.feed.post";
pub const IMAGES_EMBED_TYPE: &str = "app.bsky.embed.images";

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_jwt: String,
    pub did: String,
    pub handle: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_jwt", &"[redacted]")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish()
    }
}

/// The blob reference is passed back verbatim in the embed, so it stays
/// untyped.
#[derive(Debug, Deserialize)]
pub struct UploadBlobResponse {
    pub blob: serde_json::Value,
}

/// `com.atproto.repo.strongRef`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyRef {
    pub root: StrongRef,
    pub parent: StrongRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImagesEmbed {
    #[serde(rename = "$type")]
    pub kind: &'static str,
    pub images: Vec<EmbeddedImage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedImage {
    pub alt: String,
    pub image: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord<'a> {
    #[serde(rename = "$type")]
    pub kind: &'static str,
    pub text: &'a str,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<ImagesEmbed>,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordRequest<'a> {
    pub repo: &'a str,
    pub collection: &'static str,
    pub record: PostRecord<'a>,
}
