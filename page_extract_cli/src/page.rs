//! Site-agnostic page analysis: metadata plus structural content.

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dom::{attr, first, first_attr, selector, text_of};
use crate::error::{ExtractError, FetchError};
use crate::fetch::PageFetcher;
use crate::metadata::scrape_metadata;
use crate::PageContext;

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robots: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Image {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FormInput {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub inputs: Vec<FormInput>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub inline: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub inline: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub metadata: PageMetadata,
    pub headings: Vec<Heading>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub forms: Vec<Form>,
    pub scripts: Vec<Script>,
    pub styles: Vec<Style>,
    pub text_content: String,
    pub word_count: usize,
    /// Estimated minutes, `ceil(word_count / 200)`.
    pub reading_time: usize,
}

/// Values read straight from the document head.
fn head_metadata(doc: &Html) -> Result<PageMetadata, ExtractError> {
    // raw attribute: present but empty content still yields one empty keyword
    let keywords: Vec<String> = first(doc, r#"meta[name="keywords"]"#)?
        .and_then(|el| el.value().attr("content"))
        .map(|k| k.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    Ok(PageMetadata {
        lang: first(doc, "html")?.and_then(|el| attr(el, "lang")),
        charset: first_attr(doc, "meta[charset]", "charset")?,
        viewport: first_attr(doc, r#"meta[name="viewport"]"#, "content")?,
        keywords,
        og_type: first_attr(doc, r#"meta[property="og:type"]"#, "content")?,
        twitter_card: first_attr(doc, r#"meta[name="twitter:card"]"#, "content")?,
        canonical: first_attr(doc, r#"link[rel="canonical"]"#, "href")?,
        robots: first_attr(doc, r#"meta[name="robots"]"#, "content")?,
        ..PageMetadata::default()
    })
}

fn try_extract_page_metadata(html: &str, url: &str) -> Result<PageMetadata, ExtractError> {
    let scraped = scrape_metadata(html, url)?;
    let head = head_metadata(&Html::parse_document(html))?;

    // scraped values are the base, head values override where present
    Ok(PageMetadata {
        title: scraped.title,
        description: scraped.description,
        author: scraped.author,
        date: scraped.date,
        image: scraped.image,
        logo: scraped.logo,
        publisher: scraped.publisher,
        url: scraped.url,
        ..head
    })
}

/// Metadata of a page. Scraping failures yield an empty record.
pub fn extract_page_metadata(html: &str, url: &str) -> PageMetadata {
    try_extract_page_metadata(html, url).unwrap_or_else(|e| {
        warn!(%url, error = %e, "error extracting metadata");
        PageMetadata::default()
    })
}

fn try_extract_page_content(html: &str) -> Result<PageContent, ExtractError> {
    let doc = Html::parse_document(html);

    let headings = doc
        .select(&selector("h1, h2, h3, h4, h5, h6")?)
        .map(|h| Heading {
            level: h.value().name()[1..].parse().unwrap_or(1),
            text: text_of(h),
            id: attr(h, "id"),
        })
        .collect();

    let links = doc
        .select(&selector("a[href]")?)
        .map(|a| Link {
            href: a.value().attr("href").unwrap_or_default().to_string(),
            text: text_of(a),
            title: attr(a, "title"),
            target: attr(a, "target"),
        })
        .collect();

    let images = doc
        .select(&selector("img")?)
        .map(|img| Image {
            src: img.value().attr("src").unwrap_or_default().to_string(),
            alt: attr(img, "alt"),
            title: attr(img, "title"),
            width: attr(img, "width"),
            height: attr(img, "height"),
        })
        .collect();

    let input_sel = selector("input, textarea, select")?;
    let forms = doc
        .select(&selector("form")?)
        .map(|form| Form {
            action: attr(form, "action"),
            method: attr(form, "method"),
            inputs: form
                .select(&input_sel)
                .map(|input| FormInput {
                    kind: attr(input, "type").unwrap_or_else(|| input.value().name().to_string()),
                    name: attr(input, "name"),
                    placeholder: attr(input, "placeholder"),
                    required: input.value().attr("required").is_some(),
                })
                .collect(),
        })
        .collect();

    let scripts = doc
        .select(&selector("script")?)
        .map(|script| {
            let src = attr(script, "src");
            Script {
                inline: src.is_none(),
                src,
                kind: attr(script, "type"),
            }
        })
        .collect();

    let styles = doc
        .select(&selector(r#"link[rel="stylesheet"], style"#)?)
        .map(|style| Style {
            href: attr(style, "href"),
            inline: style.value().name() == "style",
        })
        .collect();

    let text_content = first(&doc, "body")?.map(text_of).unwrap_or_default();
    let word_count = count_words(&text_content);

    Ok(PageContent {
        metadata: PageMetadata::default(),
        headings,
        links,
        images,
        forms,
        scripts,
        styles,
        word_count,
        reading_time: reading_time(word_count),
        text_content,
    })
}

/// Structural content of a page. `metadata` is left empty; see [`analyze_page`].
pub fn extract_page_content(html: &str, url: &str) -> PageContent {
    try_extract_page_content(html).unwrap_or_else(|e| {
        warn!(%url, error = %e, "error extracting page content");
        PageContent::default()
    })
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn reading_time(word_count: usize) -> usize {
    word_count.div_ceil(WORDS_PER_MINUTE)
}

/// Metadata and content of `page`, extracted side by side and merged.
pub async fn analyze_page(page: &PageContext) -> PageContent {
    let (metadata, content) = futures::join!(
        async { extract_page_metadata(&page.html, &page.url) },
        async { extract_page_content(&page.html, &page.url) },
    );
    PageContent { metadata, ..content }
}

/// Fetches `url` and analyzes the returned markup.
pub async fn analyze_url<F>(fetcher: &F, url: &str) -> Result<PageContent, FetchError>
where
    F: PageFetcher + ?Sized,
{
    let html = fetcher.fetch_html(url).await?;
    debug!(%url, bytes = html.len(), "analyzing fetched page");
    Ok(analyze_page(&PageContext::new(url, html)).await)
}
