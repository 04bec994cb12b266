// course-core/src/indexer.rs
//! 索引模块 - 文档级倒排索引
//!
//! 索引只做整体重建：任何内容变化都需要重新扫描并构建一个新的 `SearchIndex`。

use std::collections::HashMap;

use crate::config::{SearchSettings, SiteConfig};
use crate::extract::load_documents_with_progress;
use crate::models::ParsedDocument;
use crate::text::{fold_case, terms};
use crate::walker::content_files;

/// 一个被索引的文档
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// 构建内单调递增
    pub id: u64,
    pub url: String,
    pub title: String,
    /// 原文正文，用于截取片段
    pub body: String,
    /// 与 `body` 逐字节对齐的小写形式
    folded: String,
}

impl IndexEntry {
    pub fn folded_body(&self) -> &str {
        &self.folded
    }
}

/// 倒排表：词 → 文档位置列表（同一文档只出现一次）
#[derive(Debug, Clone)]
pub struct Posting {
    pub token: String,
    pub documents: Vec<usize>,
}

/// 不可变的倒排索引和正文缓存
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
    /// 按首次出现的顺序保存
    vocabulary: Vec<Posting>,
    lookup: HashMap<String, usize>,
}

impl SearchIndex {
    /// 从已解析的文档构建索引；URL 重复的文档只保留第一个
    pub fn build(documents: Vec<ParsedDocument>, settings: &SearchSettings) -> Self {
        let mut index = SearchIndex::default();
        let mut seen_urls: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            if seen_urls.contains_key(&doc.url_path) {
                tracing::warn!("URL 重复，忽略 {:?}: {}", doc.source_path, doc.url_path);
                continue;
            }

            let position = index.entries.len();
            seen_urls.insert(doc.url_path.clone(), position);

            let folded = fold_case(&doc.body_text);
            for token in terms(&folded, settings.min_term_length) {
                index.add_posting(token, position);
            }

            index.entries.push(IndexEntry {
                id: position as u64,
                url: doc.url_path,
                title: doc.title,
                body: doc.body_text,
                folded,
            });
        }

        index
    }

    fn add_posting(&mut self, token: &str, position: usize) {
        let slot = match self.lookup.get(token) {
            Some(&slot) => slot,
            None => {
                let slot = self.vocabulary.len();
                self.vocabulary.push(Posting {
                    token: token.to_string(),
                    documents: Vec::new(),
                });
                self.lookup.insert(token.to_string(), slot);
                slot
            }
        };

        // 文档按顺序处理，重复只可能出现在末尾
        let documents = &mut self.vocabulary[slot].documents;
        if documents.last() != Some(&position) {
            documents.push(position);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn entry(&self, position: usize) -> Option<&IndexEntry> {
        self.entries.get(position)
    }

    /// 精确查找某个词的倒排表
    pub fn posting(&self, token: &str) -> Option<&Posting> {
        self.lookup.get(token).map(|&slot| &self.vocabulary[slot])
    }

    /// 所有与查询词匹配的倒排表，按词首次出现的顺序
    pub fn matching_postings<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Posting> + 'a {
        self.vocabulary
            .iter()
            .filter(move |posting| token_matches(&posting.token, term))
    }
}

/// 索引词与查询词是否匹配
///
/// 目前是子串包含：查询 `render` 会命中 `rendering`、`prerendered`。
// TODO: 收紧为前缀匹配，并同步更新依赖子串行为的排序测试
pub fn token_matches(indexed: &str, term: &str) -> bool {
    indexed.contains(term)
}

/// 冷启动：扫描内容根目录并构建完整索引
pub fn build_index(config: &SiteConfig) -> SearchIndex {
    build_index_with_progress(config, |_, _| {})
}

/// 冷启动构建（带进度回调）
pub fn build_index_with_progress<F>(config: &SiteConfig, progress_callback: F) -> SearchIndex
where
    F: Fn(usize, usize),
{
    let files = content_files(config);
    tracing::info!("正在扫描现有文件... (共 {} 个支持的文件)", files.len());

    let documents = load_documents_with_progress(&files, config, progress_callback);
    let index = SearchIndex::build(documents, &config.search);

    tracing::info!("索引构建完成: {} 个文档, {} 个词", index.len(), index.token_count());
    index
}
