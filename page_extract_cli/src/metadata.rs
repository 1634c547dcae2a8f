//! Generic metadata scraping.
//!
//! Each field is resolved through an ordered chain of strategies; the first
//! one yielding a non-blank value wins. URL-valued fields are made absolute
//! against the page URL.

use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::dom::{first_attr, first_text};
use crate::error::ExtractError;

/// Fields recovered by [`scrape_metadata`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ScrapedMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub image: Option<String>,
    pub logo: Option<String>,
    pub publisher: Option<String>,
    pub url: Option<String>,
}

enum Rule {
    /// `content` of `<meta property=..>` or `<meta name=..>`.
    Meta(&'static str),
    Attr(&'static str, &'static str),
    Text(&'static str),
}

const TITLE: &[Rule] = &[
    Rule::Meta("og:title"),
    Rule::Meta("twitter:title"),
    Rule::Text("title"),
    Rule::Text("h1"),
];
const DESCRIPTION: &[Rule] = &[
    Rule::Meta("og:description"),
    Rule::Meta("description"),
    Rule::Meta("twitter:description"),
];
const AUTHOR: &[Rule] = &[
    Rule::Meta("author"),
    Rule::Meta("article:author"),
    Rule::Text(r#"[rel="author"]"#),
    Rule::Text(".author"),
];
const DATE: &[Rule] = &[
    Rule::Meta("article:published_time"),
    Rule::Meta("og:updated_time"),
    Rule::Meta("article:modified_time"),
    Rule::Attr("time[datetime]", "datetime"),
    Rule::Meta("date"),
];
const IMAGE: &[Rule] = &[
    Rule::Meta("og:image"),
    Rule::Meta("twitter:image"),
    Rule::Attr(r#"link[rel="image_src"]"#, "href"),
];
const LOGO: &[Rule] = &[
    Rule::Attr(r#"link[rel="apple-touch-icon"]"#, "href"),
    Rule::Attr(r#"link[rel="icon"]"#, "href"),
    Rule::Attr(r#"link[rel="shortcut icon"]"#, "href"),
];
const PUBLISHER: &[Rule] = &[
    Rule::Meta("og:site_name"),
    Rule::Meta("application-name"),
    Rule::Meta("twitter:site"),
];
const URL: &[Rule] = &[
    Rule::Meta("og:url"),
    Rule::Attr(r#"link[rel="canonical"]"#, "href"),
];

fn apply(doc: &Html, rule: &Rule) -> Result<Option<String>, ExtractError> {
    let value = match rule {
        Rule::Meta(key) => match first_attr(doc, &format!(r#"meta[property="{key}"]"#), "content")? {
            Some(v) => Some(v),
            None => first_attr(doc, &format!(r#"meta[name="{key}"]"#), "content")?,
        },
        Rule::Attr(css, name) => first_attr(doc, css, name)?,
        Rule::Text(css) => first_text(doc, css)?,
    };
    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

fn resolve(doc: &Html, rules: &[Rule]) -> Result<Option<String>, ExtractError> {
    for rule in rules {
        if let Some(v) = apply(doc, rule)? {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

fn absolute(base: &Url, value: Option<String>) -> Option<String> {
    value.map(|v| base.join(&v).map(String::from).unwrap_or(v))
}

pub fn scrape_metadata(html: &str, url: &str) -> Result<ScrapedMetadata, ExtractError> {
    let base = Url::parse(url).map_err(|source| ExtractError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    let doc = Html::parse_document(html);

    let logo = resolve(&doc, LOGO)?.or_else(|| Some("/favicon.ico".to_string()));
    let page_url = resolve(&doc, URL)?.or_else(|| Some(base.to_string()));

    Ok(ScrapedMetadata {
        title: resolve(&doc, TITLE)?,
        description: resolve(&doc, DESCRIPTION)?,
        author: resolve(&doc, AUTHOR)?,
        date: resolve(&doc, DATE)?,
        image: absolute(&base, resolve(&doc, IMAGE)?),
        logo: absolute(&base, logo),
        publisher: resolve(&doc, PUBLISHER)?,
        url: absolute(&base, page_url),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn og_tags_take_precedence() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Doc Title</title>
            <meta name="description" content="plain description">
            <meta property="og:site_name" content="Example News">
            <meta property="og:image" content="/img/cover.png">
        </head><body><h1>Heading</h1></body></html>"#;

        let meta = scrape_metadata(html, "https://example.com/a/b").unwrap();
        assert_eq!(meta.title.as_deref(), Some("OG Title"));
        assert_eq!(meta.description.as_deref(), Some("plain description"));
        assert_eq!(meta.publisher.as_deref(), Some("Example News"));
        assert_eq!(meta.image.as_deref(), Some("https://example.com/img/cover.png"));
    }

    #[test]
    fn falls_back_through_the_chain() {
        let html = r#"<html><head><title>  </title></head><body>
            <h1>Only heading</h1>
            <span class="author">Jane Doe</span>
            <time datetime="2024-03-04T10:00:00Z">March 4</time>
        </body></html>"#;

        let meta = scrape_metadata(html, "https://example.com/post").unwrap();
        assert_eq!(meta.title.as_deref(), Some("Only heading"));
        assert_eq!(meta.author.as_deref(), Some("Jane Doe"));
        assert_eq!(meta.date.as_deref(), Some("2024-03-04T10:00:00Z"));
        assert_eq!(meta.logo.as_deref(), Some("https://example.com/favicon.ico"));
        assert_eq!(meta.url.as_deref(), Some("https://example.com/post"));
    }

    #[test]
    fn canonical_link_supplies_url() {
        let html = r#"<html><head><link rel="canonical" href="/canonical"></head></html>"#;
        let meta = scrape_metadata(html, "https://example.com/post?utm=1").unwrap();
        assert_eq!(meta.url.as_deref(), Some("https://example.com/canonical"));
    }

    #[test]
    fn invalid_page_url_is_an_error() {
        let err = scrape_metadata("<html></html>", "::not a url::").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl { .. }));
    }
}
