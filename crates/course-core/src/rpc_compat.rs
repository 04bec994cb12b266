// course-core/src/rpc_compat.rs
//! RPC 适配层 - 将内部类型转换为 rpc crate 的线上类型

use rpc::navigation::{NavItem, NavigationPayload};
use rpc::search::{IndexSummary, SearchErrorKind, SearchHit, SearchOutcome, SearchRequest};

use crate::error::{CoreError, Result};
use crate::models::SearchResult;
use crate::navigation::{NavigationNode, NavigationTable};
use crate::registry::IndexStats;
use crate::CourseSite;

impl From<SearchResult> for SearchHit {
    fn from(result: SearchResult) -> Self {
        Self {
            title: result.title,
            url: result.url,
            snippets: result.snippets,
        }
    }
}

impl From<NavigationNode> for NavItem {
    fn from(node: NavigationNode) -> Self {
        match node {
            NavigationNode::Leaf { title, path } => NavItem::Page { title, url: path },
            NavigationNode::Folder { title, children } => NavItem::Section {
                title,
                children: children.into_iter().map(NavItem::from).collect(),
            },
        }
    }
}

impl From<NavigationTable> for NavigationPayload {
    fn from(table: NavigationTable) -> Self {
        Self {
            tree: table.tree.into(),
            flat: table.flat,
        }
    }
}

impl From<IndexStats> for IndexSummary {
    fn from(stats: IndexStats) -> Self {
        Self {
            documents: stats.documents,
            tokens: stats.tokens,
            generation: stats.generation,
        }
    }
}

impl From<&CoreError> for SearchErrorKind {
    fn from(error: &CoreError) -> Self {
        match error {
            CoreError::InvalidQuery(reason) => SearchErrorKind::InvalidQuery(reason.clone()),
            CoreError::IndexNotReady => SearchErrorKind::IndexNotReady,
            other => SearchErrorKind::Internal(other.to_string()),
        }
    }
}

/// 把查询结果包装为线上类型
pub fn to_outcome(result: Result<Vec<SearchResult>>) -> SearchOutcome {
    match result {
        Ok(results) => SearchOutcome::Ok(results.into_iter().map(SearchHit::from).collect()),
        Err(e) => {
            if e.is_client_error() {
                tracing::debug!("[搜索] 查询被拒绝: {}", e);
            } else {
                tracing::warn!("[搜索] 查询失败: {}", e);
            }
            SearchOutcome::Failed(SearchErrorKind::from(&e))
        }
    }
}

/// 执行 RPC 搜索请求
pub fn handle_search(site: &CourseSite, req: &SearchRequest) -> SearchOutcome {
    tracing::info!("[搜索] 查询: '{}' page={:?} limit={:?}", req.query, req.page, req.limit);
    to_outcome(site.search_page(&req.query, req.page, req.limit))
}
