use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Whitespace separated keywords
    pub query: String,
    /// 1-based, only used together with `limit`
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Rendered HTML fragments
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchErrorKind {
    /// No usable keyword left after normalization
    InvalidQuery(String),
    /// Index has not been built yet, retry later
    IndexNotReady,
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchOutcome {
    Ok(Vec<SearchHit>),
    Failed(SearchErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub documents: usize,
    pub tokens: usize,
    pub generation: u64,
}
