use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde_json::{Map, Value};
use url::Url;

use crate::dom::{attr, first, first_attr, first_in, first_text, selector, text_of};
use crate::error::ExtractError;
use crate::processors::Processor;
use crate::{ArticleContent, ListItem};

const ORIGIN: &str = "https://www.v2ex.com";
const DESCRIPTION_LIMIT: usize = 200;

const LIST_ITEM: &str = ".cell.item";
const ITEM_TITLE: &str = ".item_title a";
const ITEM_AUTHOR: &str = ".topic_info strong a";
const ITEM_NODE: &str = ".node";
const ITEM_REPLIES: &str = ".count_livid, .count_orange";
const ITEM_TIME: &str = ".topic_info span[title]";

const CONTENT: &str = ".topic_content";
const HEADER_TITLE: &str = ".header h1";
const HEADER_INFO: &str = ".header small.gray";
const HEADER_AUTHOR: &str = ".header small.gray a";
const HEADER_NODE: &str = r#".header a[href^="/go/"]"#;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("ISO_DATE should compile"));
static RELATIVE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\s*(?:minutes?|hours?|days?)\s+ago|\d+\s*(?:分钟|小时|天)前")
        .expect("RELATIVE_DATE should compile")
});

static LIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?v2ex\.com/(\?tab=\w+)?$").expect("LIST_URL should compile")
});
static DETAIL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?v2ex\.com/t/\d+").expect("DETAIL_URL should compile")
});

/// Processor for the V2EX forum: topic listings and topic pages.
#[derive(Debug, Clone, Default)]
pub struct V2exProcessor;

impl V2exProcessor {
    pub const NAME: &'static str = "v2ex";

    pub fn new() -> Self {
        Self
    }

    fn list_item(&self, el: ElementRef<'_>) -> Result<Option<ListItem>, ExtractError> {
        let Some(title_el) = first_in(el, ITEM_TITLE)? else {
            return Ok(None);
        };

        let title = text_of(title_el);
        let url = title_el
            .value()
            .attr("href")
            .map(absolutize)
            .unwrap_or_default();
        if title.is_empty() && url.is_empty() {
            return Ok(None);
        }

        let author = first_in(el, ITEM_AUTHOR)?.map(text_of);
        let node = first_in(el, ITEM_NODE)?.map(text_of);
        let replies = first_in(el, ITEM_REPLIES)?
            .map(text_of)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "0".to_string());
        let date = first_in(el, ITEM_TIME)?.and_then(|span| attr(span, "title"));

        let mut meta = Map::new();
        meta.insert("replies".into(), Value::String(replies));
        if let Some(node) = &node {
            meta.insert("node".into(), Value::String(node.clone()));
        }

        Ok(Some(ListItem {
            title,
            url,
            author,
            date,
            excerpt: None,
            tags: node.into_iter().collect(),
            meta,
        }))
    }
}

impl Processor for V2exProcessor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn matches_list(&self, url: &str) -> bool {
        LIST_URL.is_match(url)
    }

    fn matches_detail(&self, url: &str) -> bool {
        DETAIL_URL.is_match(url)
    }

    fn extract_list(&self, doc: &Html) -> Result<Vec<ListItem>, ExtractError> {
        let items = selector(LIST_ITEM)?;
        let mut out = Vec::new();
        for el in doc.select(&items) {
            if let Some(item) = self.list_item(el)? {
                out.push(item);
            }
        }
        Ok(out)
    }

    fn extract_article(&self, doc: &Html, url: &str) -> Result<Option<ArticleContent>, ExtractError> {
        let Some(content_el) = first(doc, CONTENT)? else {
            return Ok(None);
        };

        let title = match first_text(doc, HEADER_TITLE)? {
            Some(t) => t,
            None => first_text(doc, "title")?.unwrap_or_default(),
        };
        let author = first_text(doc, HEADER_AUTHOR)?;
        let node = first_text(doc, HEADER_NODE)?;
        let date = first(doc, HEADER_INFO)?
            .map(|el| el.text().collect::<String>())
            .and_then(|info| find_date(&info));
        let description = match first_attr(doc, r#"meta[name="description"]"#, "content")? {
            Some(d) => d,
            None => summarize(&text_of(content_el)),
        };

        let mut meta = Map::new();
        if let Some(node) = &node {
            meta.insert("node".into(), Value::String(node.clone()));
        }
        meta.insert("description".into(), Value::String(description));
        meta.insert("url".into(), Value::String(url.to_string()));

        Ok(Some(ArticleContent {
            title,
            author,
            date,
            content: content_el.inner_html(),
            tags: node.into_iter().collect(),
            meta,
        }))
    }
}

fn absolutize(href: &str) -> String {
    if href.is_empty() || href.starts_with("http") {
        return href.to_string();
    }
    Url::parse(ORIGIN)
        .and_then(|base| base.join(href))
        .map(String::from)
        .unwrap_or_else(|_| format!("{ORIGIN}{href}"))
}

/// First ISO date, else first relative-time phrase.
fn find_date(info: &str) -> Option<String> {
    ISO_DATE
        .find(info)
        .or_else(|| RELATIVE_DATE.find(info))
        .map(|m| m.as_str().to_string())
}

fn summarize(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_LIMIT {
        let head: String = text.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
