// course-core/src/models.rs
//! 数据模型定义

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 文档头部元数据（只保留标量值）
pub type Frontmatter = BTreeMap<String, serde_json::Value>;

/// 遍历得到的内容文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub absolute_path: PathBuf,
    /// 相对于内容根目录的路径
    pub relative_path: PathBuf,
    /// 小写扩展名，不含点号
    pub extension: String,
}

/// 解析后的文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub source_path: PathBuf,
    /// 带挂载前缀的 URL 路径，例如 `/tutorial/shaders/vertex`
    pub url_path: String,
    pub title: String,
    pub frontmatter: Frontmatter,
    /// 去掉结构性标记后的正文
    pub body_text: String,
}

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// 已渲染为 HTML 的片段，按相关度排序
    pub snippets: Vec<String>,
}

/// 可直接展示的页面
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedPage {
    pub url: String,
    pub title: String,
    pub frontmatter: Frontmatter,
    pub html: String,
}
