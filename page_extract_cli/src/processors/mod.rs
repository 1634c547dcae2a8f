//! Site processors and the domain router that picks one for a page.
//!
//! A [`Processor`] knows the markup of a single site. The [`ProcessorRegistry`]
//! maps exact hostnames to processor names and names to instances; nothing
//! about the path or query of a page takes part in the lookup.

mod v2ex;

use std::collections::HashMap;
use std::sync::Arc;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::ExtractError;
use crate::{host_of, ArticleContent, ListItem, PageContext};

pub use v2ex::V2exProcessor;

/// Which extraction applies to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    List,
    Detail,
}

pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    /// Whether `url` is one of the site's listing pages.
    fn matches_list(&self, url: &str) -> bool;

    /// Whether `url` is a single-article page.
    fn matches_detail(&self, url: &str) -> bool;

    /// Summary rows of a listing page, in document order.
    fn extract_list(&self, doc: &Html) -> Result<Vec<ListItem>, ExtractError>;

    /// The article on a detail page. `Ok(None)` when the page carries no
    /// content container.
    fn extract_article(&self, doc: &Html, url: &str) -> Result<Option<ArticleContent>, ExtractError>;
}

#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Arc<dyn Processor>>,
    // domain -> processor name, kept in registration order
    domains: Vec<(String, String)>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in site processor mapped to its domains.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(V2exProcessor::new()));
        registry.map_domain("v2ex.com", V2exProcessor::NAME);
        registry.map_domain("www.v2ex.com", V2exProcessor::NAME);
        registry
    }

    pub fn register(&mut self, processor: Arc<dyn Processor>) {
        self.processors.insert(processor.name().to_string(), processor);
    }

    /// Routes `domain` to the processor called `name`. Re-mapping a domain
    /// keeps its original position.
    pub fn map_domain(&mut self, domain: &str, name: &str) {
        match self.domains.iter_mut().find(|(d, _)| d == domain) {
            Some(entry) => entry.1 = name.to_string(),
            None => self.domains.push((domain.to_string(), name.to_string())),
        }
    }

    pub fn supported_domains(&self) -> Vec<String> {
        self.domains.iter().map(|(d, _)| d.clone()).collect()
    }

    fn processor_name(&self, host: &str) -> Option<&str> {
        self.domains
            .iter()
            .find(|(d, _)| d == host)
            .map(|(_, name)| name.as_str())
    }

    pub fn processor_for(&self, url: &str) -> Option<Arc<dyn Processor>> {
        let host = host_of(url)?;
        let name = self.processor_name(&host)?;
        self.processors.get(name).cloned()
    }

    /// Classifies `url` with its processor. `None` when no processor handles
    /// the host or the processor recognizes neither shape.
    pub fn page_kind(&self, url: &str) -> Option<PageKind> {
        let processor = self.processor_for(url)?;
        if processor.matches_list(url) {
            Some(PageKind::List)
        } else if processor.matches_detail(url) {
            Some(PageKind::Detail)
        } else {
            None
        }
    }

    pub fn is_processor_available(&self, page: &PageContext) -> bool {
        page.host()
            .is_some_and(|host| self.processor_name(&host).is_some())
    }

    fn require_processor(&self, page: &PageContext) -> Result<Arc<dyn Processor>, ExtractError> {
        self.processor_for(&page.url)
            .ok_or_else(|| ExtractError::NoProcessor {
                host: page.host().unwrap_or_default(),
            })
    }

    pub fn try_extract_current_list(&self, page: &PageContext) -> Result<Vec<ListItem>, ExtractError> {
        let processor = self.require_processor(page)?;
        let doc = Html::parse_document(&page.html);
        processor.extract_list(&doc)
    }

    pub fn try_extract_current_article(
        &self,
        page: &PageContext,
    ) -> Result<Option<ArticleContent>, ExtractError> {
        let processor = self.require_processor(page)?;
        let doc = Html::parse_document(&page.html);
        processor.extract_article(&doc, &page.url)
    }

    /// Listing rows of the page, or an empty list when no processor handles
    /// it or extraction fails.
    pub fn extract_current_list(&self, page: &PageContext) -> Vec<ListItem> {
        match self.try_extract_current_list(page) {
            Ok(items) => items,
            Err(e) if e.is_no_processor() => {
                warn!(url = %page.url, "no list extractor available for current page");
                Vec::new()
            }
            Err(e) => {
                error!(url = %page.url, error = %e, "error extracting list");
                Vec::new()
            }
        }
    }

    pub fn extract_current_article(&self, page: &PageContext) -> Option<ArticleContent> {
        match self.try_extract_current_article(page) {
            Ok(article) => article,
            Err(e) if e.is_no_processor() => {
                warn!(url = %page.url, "no article extractor available for current page");
                None
            }
            Err(e) => {
                error!(url = %page.url, error = %e, "error extracting article");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Failing;

    impl Processor for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn matches_list(&self, _url: &str) -> bool {
            true
        }

        fn matches_detail(&self, _url: &str) -> bool {
            false
        }

        fn extract_list(&self, _doc: &Html) -> Result<Vec<ListItem>, ExtractError> {
            Err(ExtractError::Selector("[".into()))
        }

        fn extract_article(&self, _doc: &Html, _url: &str) -> Result<Option<ArticleContent>, ExtractError> {
            Err(ExtractError::Selector("[".into()))
        }
    }

    #[test]
    fn supported_domains_keep_registration_order() {
        let registry = ProcessorRegistry::with_defaults();
        assert_eq!(registry.supported_domains(), vec!["v2ex.com", "www.v2ex.com"]);
    }

    #[test]
    fn availability_is_exact_host_match() {
        let registry = ProcessorRegistry::with_defaults();
        let page = |url: &str| PageContext::new(url, "");

        assert!(registry.is_processor_available(&page("https://www.v2ex.com/t/1")));
        assert!(registry.is_processor_available(&page("https://v2ex.com/?tab=hot")));
        assert!(!registry.is_processor_available(&page("https://cdn.v2ex.com/")));
        assert!(!registry.is_processor_available(&page("https://example.com/")));
        assert!(!registry.is_processor_available(&page("not a url")));
    }

    #[test]
    fn missing_processor_is_distinguishable() {
        let registry = ProcessorRegistry::with_defaults();
        let page = PageContext::new("https://example.com/", "<p>hi</p>");

        let err = registry.try_extract_current_list(&page).unwrap_err();
        assert!(err.is_no_processor());
        assert!(registry.extract_current_list(&page).is_empty());
        assert!(registry.extract_current_article(&page).is_none());
    }

    #[test]
    fn extraction_failure_degrades_to_empty() {
        let mut registry = ProcessorRegistry::new();
        registry.register(Arc::new(Failing));
        registry.map_domain("broken.test", "failing");
        let page = PageContext::new("https://broken.test/", "");

        let err = registry.try_extract_current_list(&page).unwrap_err();
        assert!(!err.is_no_processor());
        assert!(registry.extract_current_list(&page).is_empty());
        assert!(registry.extract_current_article(&page).is_none());
    }

    #[test]
    fn page_kind_goes_through_the_host_processor() {
        let registry = ProcessorRegistry::with_defaults();

        assert_eq!(registry.page_kind("https://www.v2ex.com/"), Some(PageKind::List));
        assert_eq!(registry.page_kind("https://v2ex.com/t/42"), Some(PageKind::Detail));
        assert_eq!(registry.page_kind("https://www.v2ex.com/go/rust"), None);
        assert_eq!(registry.page_kind("https://example.com/t/42"), None);
    }

    #[test]
    fn domain_mapped_to_unknown_name_has_no_processor() {
        let mut registry = ProcessorRegistry::new();
        registry.map_domain("orphan.test", "missing");
        let page = PageContext::new("https://orphan.test/", "");

        assert!(registry.is_processor_available(&page));
        assert!(registry.processor_for(&page.url).is_none());
    }
}
