pub mod error;
pub mod fetch;
pub mod file_tree;
pub mod metadata;
pub mod page;
pub mod processors;
pub mod text;
pub mod utils;

mod dom;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use error::{ExtractError, FetchError};
pub use processors::{PageKind, Processor, ProcessorRegistry};

/// One row of a site's listing page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ListItem {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// One full post or document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ArticleContent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Inner HTML of the content container.
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

/// The page an extraction runs against: its address and its serialized markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub url: String,
    pub html: String,
}

impl PageContext {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Hostname of the page URL, `None` when the URL does not parse or has no host.
    pub fn host(&self) -> Option<String> {
        host_of(&self.url)
    }
}

pub(crate) fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
