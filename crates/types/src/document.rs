use serde::{Deserialize, Serialize};

/// A loosely-typed number as it arrives from callers: JSON integers, floats
/// and numeric strings are all accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// Coerces the value to an integer. Floats truncate toward zero; strings
    /// are parsed after trimming. Returns `None` for anything non-numeric.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            RawNumber::Int(i) => Some(*i),
            RawNumber::Float(f) => truncate(*f),
            RawNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(truncate))
            }
        }
    }
}

fn truncate(f: f64) -> Option<i64> {
    f.is_finite().then(|| f.trunc() as i64)
}

impl From<i64> for RawNumber {
    fn from(value: i64) -> Self {
        RawNumber::Int(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// A TOC entry exactly as supplied by the caller, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTocEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub page: Option<RawNumber>,
    #[serde(default)]
    pub level: Option<RawNumber>,
}

impl RawTocEntry {
    pub fn new(level: i64, title: impl Into<String>, page: i64) -> Self {
        Self {
            title: Some(title.into()),
            page: Some(RawNumber::Int(page)),
            level: Some(RawNumber::Int(level)),
        }
    }
}

/// A normalized entry in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Nesting depth, 1 for top-level entries.
    pub level: u32,
    /// Trimmed, non-empty title.
    pub title: String,
    /// 1-based page number in the document before any TOC pages are added.
    pub target_page: usize,
}

/// One node of a document outline (bookmark tree), flattened to its depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub level: u32,
    pub title: String,
    /// 1-based page number in the original document numbering.
    pub page: usize,
}

impl From<OutlineItem> for RawTocEntry {
    fn from(item: OutlineItem) -> Self {
        Self {
            title: Some(item.title),
            page: Some(RawNumber::Int(item.page as i64)),
            level: Some(RawNumber::Int(item.level as i64)),
        }
    }
}
