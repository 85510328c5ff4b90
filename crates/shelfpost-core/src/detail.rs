use serde::{Deserialize, Serialize};

use crate::identifier::CatalogIdentifier;

/// Everything the catalog knows about one item, as handed to text generation.
///
/// `identifier` is `None` when the reference did not embed a recognizable
/// code; the record is still publishable, it just cannot be deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub identifier: Option<CatalogIdentifier>,
    pub title: String,
    pub author: String,
    pub year: String,
    pub language: String,
    pub description: String,
    /// Reader reviews or other free text found next to the description.
    pub supplementary_text: String,
    pub source_url: String,
    pub image_url: Option<String>,
}

impl DetailRecord {
    /// A record without a title cannot be reviewed or attributed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
