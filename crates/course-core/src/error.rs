// course-core/src/error.rs
//! 错误类型

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// 内容根目录不存在或无法读取
    #[error("content directory unavailable: {path:?}: {source}")]
    FileSystemUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 单个文档无法解析
    #[error("failed to parse document {path:?}: {reason}")]
    DocumentParse { path: PathBuf, reason: String },

    /// 查询中没有可用的词
    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    /// 索引尚未构建
    #[error("search index is not built yet")]
    IndexNotReady,

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 由调用方输入引起的错误
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::InvalidQuery(_) | CoreError::DocumentNotFound(_))
    }

    /// 稍后重试可能成功
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::IndexNotReady)
    }
}
