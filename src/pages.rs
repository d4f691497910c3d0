//! Per-route data loaders.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;
use crate::http::ApiClient;

/// A CMS-managed content page (policies, terms, about).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CmsPage {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub html_content: String,
}

/// Fetch the page for `slug` without credentials. No caching, no retry.
pub async fn load_cms_page(api: &ApiClient, slug: &str) -> Result<CmsPage, ClientError> {
    debug!("Loading CMS page '{}'", slug);
    api.get_public_json(&["cms", slug]).await
}
