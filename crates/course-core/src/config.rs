// course-core/src/config.rs
//! 配置模块

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// 站点配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// 教程内容根目录
    pub content_root: PathBuf,
    /// 对外挂载路径，所有文档 URL 都以它开头
    pub mount_path: String,
    pub walker: WalkerConfig,
    pub search: SearchSettings,
}

/// Walker 配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalkerConfig {
    pub use_ripgrep_walker: bool,
    pub skip_hidden: bool,
    pub follow_symlinks: bool,
    /// 0 表示不限制
    pub max_depth: usize,
    pub custom_ignore_patterns: Vec<String>,
    pub supported_extensions: Vec<String>,
}

/// 搜索配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// 短于该长度的词既不入索引也不参与查询
    pub min_term_length: usize,
    pub max_snippets: usize,
    /// 片段窗口总宽度（字符）
    pub snippet_length: usize,
    /// 渲染时把软换行当作 `<br />`
    pub hard_breaks: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("./tutorial"),
            mount_path: "/tutorial".to_string(),
            walker: WalkerConfig::default(),
            search: SearchSettings::default(),
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            use_ripgrep_walker: true,
            skip_hidden: true,
            follow_symlinks: false,
            max_depth: 0,
            custom_ignore_patterns: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "*.tmp".to_string(),
            ],
            supported_extensions: vec![
                "md".to_string(),
                "mdx".to_string(),
            ],
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_term_length: 3,
            max_snippets: 3,
            snippet_length: 150,
            hard_breaks: true,
        }
    }
}

impl SiteConfig {
    /// 以指定目录为内容根，其余取默认值
    pub fn with_root(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            ..Default::default()
        }
    }

    /// 从 TOML 文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CoreError::DocumentParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// 尝试加载配置，失败则使用默认值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("加载配置失败，使用默认值: {}", e);
                Self::default()
            }
        }
    }

    /// 规范化后的挂载路径：以单个 `/` 开头，不以 `/` 结尾
    ///
    /// 空字符串或 `/` 规范化为空前缀，文档 URL 即为 `/<相对路径>`。
    pub fn mount_prefix(&self) -> String {
        let trimmed = self.mount_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

impl WalkerConfig {
    /// 检查扩展名是否受支持（忽略大小写）
    pub fn is_supported_extension(&self, ext: &str) -> bool {
        self.supported_extensions
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(ext))
    }
}
