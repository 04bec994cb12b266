// course-core/src/lib.rs
//! 课程站点核心库
//!
//! 把一个 markdown 教程目录变成可浏览、可搜索的站点：
//! - 目录遍历与文档解析（frontmatter + 正文）
//! - 导航树与 URL → 标题 查找表
//! - 文档级倒排索引与关键词查询（带片段高亮）
//! - 按 URL 渲染单个页面

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod models;
pub mod navigation;
pub mod pages;
pub mod registry;
pub mod render;
pub mod search;
pub mod text;
pub mod walker;

// RPC 适配层（可选功能）
#[cfg(feature = "rpc-compat")]
pub mod rpc_compat;

// 重导出核心类型
pub use config::{SearchSettings, SiteConfig, WalkerConfig};
pub use error::{CoreError, Result};
pub use extract::{document_paths, load_document, load_documents};
pub use indexer::{build_index, build_index_with_progress, SearchIndex};
pub use models::{ContentFile, Frontmatter, ParsedDocument, RenderedPage, SearchResult};
pub use navigation::{build_navigation, NavigationNode, NavigationTable};
pub use pages::PageStore;
pub use registry::{IndexHandle, IndexStats};
pub use render::{CommonMarkRenderer, MarkdownRenderer};
pub use walker::{content_files, walk_files};

/// 站点统一入口
///
/// 克隆开销很小，克隆后共享同一个索引。
#[derive(Clone)]
pub struct CourseSite {
    config: Arc<SiteConfig>,
    index: IndexHandle,
    renderer: Arc<dyn MarkdownRenderer>,
}

impl CourseSite {
    /// 使用默认的 CommonMark 渲染器
    pub fn new(config: SiteConfig) -> Self {
        let renderer = Arc::new(CommonMarkRenderer::new(config.search.hard_breaks));
        Self::with_renderer(config, renderer)
    }

    pub fn with_renderer(config: SiteConfig, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        Self {
            config: Arc::new(config),
            index: IndexHandle::new(),
            renderer,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    /// 导航数据，每次调用都重新扫描目录
    pub fn navigation(&self) -> NavigationTable {
        build_navigation(&self.config)
    }

    /// 所有文档的 URL
    pub fn document_paths(&self) -> Vec<String> {
        document_paths(&self.config)
    }

    /// 确保索引已构建
    pub fn build_index(&self) -> IndexStats {
        self.index.ensure_built(&self.config);
        self.index.stats()
    }

    /// 全量重建索引
    pub fn reindex(&self) -> IndexStats {
        self.reindex_with_progress(|_, _| {})
    }

    pub fn reindex_with_progress<F>(&self, progress_callback: F) -> IndexStats
    where
        F: Fn(usize, usize),
    {
        self.index.rebuild_with_progress(&self.config, progress_callback);
        self.index.stats()
    }

    /// 关键词查询；索引尚未构建时先阻塞构建一次
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        search::normalize_query(query, self.config.search.min_term_length)?;
        let index = self.index.ensure_built(&self.config);
        search::search(&index, query, &self.config.search, self.renderer.as_ref())
    }

    /// 分页查询，`page` 从 1 开始
    pub fn search_page(
        &self,
        query: &str,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        self.search(query)
            .map(|results| search::paginate(results, page, limit))
    }

    /// 在已发布的索引上查询，不触发构建
    pub fn search_published(&self, query: &str) -> Result<Vec<SearchResult>> {
        search::normalize_query(query, self.config.search.min_term_length)?;
        let index = self.index.snapshot()?;
        search::search(&index, query, &self.config.search, self.renderer.as_ref())
    }

    /// 按 URL 渲染页面
    pub fn page(&self, url: &str) -> Result<RenderedPage> {
        PageStore::new(&self.config, self.renderer.as_ref()).load(url)
    }
}

impl std::fmt::Debug for CourseSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseSite")
            .field("config", &self.config)
            .field("index", &self.index)
            .finish()
    }
}
