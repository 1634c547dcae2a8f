use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

/// Concatenated descendant text, trimmed.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Attribute value, with empty strings treated as missing.
pub(crate) fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn first<'a>(doc: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(doc.select(&sel).next())
}

pub(crate) fn first_in<'a>(el: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(el.select(&sel).next())
}

pub(crate) fn first_attr(doc: &Html, css: &str, name: &str) -> Result<Option<String>, ExtractError> {
    Ok(first(doc, css)?.and_then(|el| attr(el, name)))
}

/// Text of the first match, `None` when missing or blank.
pub(crate) fn first_text(doc: &Html, css: &str) -> Result<Option<String>, ExtractError> {
    Ok(first(doc, css)?.map(text_of).filter(|t| !t.is_empty()))
}
