//! Presents extracted list items as a folder in a file explorer tree.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ListItem;

pub const LIST_FOLDER_NAME: &str = "pages";
pub const LIST_FOLDER_PATH: &str = "list";
/// Label under which older views stored the list folder.
pub const LEGACY_LIST_FOLDER_NAME: &str = "📋 pages";
const ANCHOR_FOLDER: &str = "src";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default)]
    pub size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}

impl FileItem {
    fn is_list_folder(&self) -> bool {
        self.name == LEGACY_LIST_FOLDER_NAME
            || (self.kind == FileKind::Folder
                && self.name == LIST_FOLDER_NAME
                && self.path == LIST_FOLDER_PATH)
    }
}

/// Parses the date formats forum listings and feeds commonly carry.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(raw) {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %:z") {
        return Some(d.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(d.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

pub fn convert_list_to_file_tree(items: &[ListItem]) -> Vec<FileItem> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut meta = Map::new();
            meta.insert("url".into(), Value::String(item.url.clone()));
            if let Some(author) = &item.author {
                meta.insert("author".into(), Value::String(author.clone()));
            }
            if let Some(excerpt) = &item.excerpt {
                meta.insert("excerpt".into(), Value::String(excerpt.clone()));
            }
            meta.insert(
                "tags".into(),
                Value::Array(item.tags.iter().cloned().map(Value::String).collect()),
            );
            meta.extend(item.meta.iter().map(|(k, v)| (k.clone(), v.clone())));

            FileItem {
                name: item.title.clone(),
                path: format!("{LIST_FOLDER_PATH}/{index}"),
                kind: FileKind::File,
                size: item.excerpt.as_ref().map_or(0, |e| e.chars().count()),
                last_modified: Some(
                    item.date
                        .as_deref()
                        .and_then(parse_date)
                        .unwrap_or_else(Utc::now),
                ),
                meta,
                children: None,
                is_expanded: None,
            }
        })
        .collect()
}

/// Returns a copy of `tree` with a fresh list folder placed after `src`, or
/// first when there is no `src`. Any earlier list folder is dropped.
pub fn insert_list_into_file_tree(tree: &[FileItem], items: &[ListItem]) -> Vec<FileItem> {
    let folder = FileItem {
        name: LIST_FOLDER_NAME.to_string(),
        path: LIST_FOLDER_PATH.to_string(),
        kind: FileKind::Folder,
        size: 0,
        last_modified: None,
        meta: Map::new(),
        children: Some(convert_list_to_file_tree(items)),
        is_expanded: Some(true),
    };

    let mut out = remove_list_from_file_tree(tree);
    match out.iter().position(|node| node.name == ANCHOR_FOLDER) {
        Some(src) => out.insert(src + 1, folder),
        None => out.insert(0, folder),
    }
    out
}

pub fn remove_list_from_file_tree(tree: &[FileItem]) -> Vec<FileItem> {
    tree.iter().filter(|node| !node.is_list_folder()).cloned().collect()
}
