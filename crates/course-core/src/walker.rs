// course-core/src/walker.rs
//! 目录遍历模块
//!
//! 只保证一件事：目录本身不会被产出，只产出文件。
//! 同级条目的先后顺序取决于文件系统，调用方不能依赖它；
//! 导航需要的“目录在前、文件在后”分组由 `list_directory` 的调用方自行完成。

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{SiteConfig, WalkerConfig};
use crate::error::{CoreError, Result};
use crate::models::ContentFile;

/// 条目过滤器（隐藏文件 + 自定义忽略模式）
#[derive(Debug, Clone)]
pub struct EntryFilter {
    skip_hidden: bool,
    patterns: Vec<glob::Pattern>,
}

impl EntryFilter {
    pub fn new(config: &WalkerConfig) -> Self {
        let patterns = config
            .custom_ignore_patterns
            .iter()
            .filter_map(|raw| match glob::Pattern::new(raw) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("忽略无效的模式 '{}': {}", raw, e);
                    None
                }
            })
            .collect();

        Self {
            skip_hidden: config.skip_hidden,
            patterns,
        }
    }

    /// 条目名是否应当保留
    pub fn allows(&self, name: &str) -> bool {
        if self.skip_hidden && name.starts_with('.') {
            return false;
        }
        !self.patterns.iter().any(|p| p.matches(name))
    }
}

/// 单个目录的直接子条目，保持文件系统给出的顺序
#[derive(Debug, Default, Clone)]
pub struct DirListing {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// 列出单个目录的直接子条目，目录与文件分开存放
pub fn list_directory(dir: &Path, config: &WalkerConfig) -> Result<DirListing> {
    let filter = EntryFilter::new(config);
    let entries = fs::read_dir(dir).map_err(|source| CoreError::FileSystemUnavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut listing = DirListing::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("读取目录条目失败 {:?}: {}", dir, e);
                continue;
            }
        };

        let name = entry.file_name();
        if !filter.allows(&name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        let file_type = if config.follow_symlinks {
            fs::metadata(&path).map(|m| m.file_type())
        } else {
            entry.file_type()
        };

        match file_type {
            Ok(ft) if ft.is_dir() => listing.directories.push(path),
            Ok(ft) if ft.is_file() => listing.files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("无法读取文件类型 {:?}: {}", path, e),
        }
    }

    Ok(listing)
}

/// 根目录是否可用；不可用时记录警告
fn root_available(root: &Path) -> bool {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => true,
        Ok(_) => {
            tracing::warn!("内容根不是目录: {:?}", root);
            false
        }
        Err(e) => {
            tracing::warn!("目录 {:?} 不存在或无法访问: {}", root, e);
            false
        }
    }
}

/// 遍历根目录下的所有文件（深度优先，目录本身不产出）
///
/// 根目录不存在时返回空列表并记录警告，不会报错。
pub fn walk_files(root: &Path, config: &WalkerConfig) -> Vec<PathBuf> {
    if !root_available(root) {
        return Vec::new();
    }

    tracing::debug!("开始遍历目录: {:?}", root);
    let files = if config.use_ripgrep_walker {
        walk_with_ripgrep_walker(root, config)
    } else {
        walk_with_std_walker(root, config)
    };
    tracing::debug!("遍历完成: {:?}, 共 {} 个文件", root, files.len());
    files
}

fn walk_with_ripgrep_walker(root: &Path, config: &WalkerConfig) -> Vec<PathBuf> {
    let filter = EntryFilter::new(config);

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(config.skip_hidden)
        // 内容目录由配置明确指定，不受 .gitignore 影响
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(config.follow_symlinks)
        .filter_entry(move |entry| {
            entry.depth() == 0 || filter.allows(&entry.file_name().to_string_lossy())
        });

    if config.max_depth > 0 {
        builder.max_depth(Some(config.max_depth));
    }

    let mut files = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => tracing::warn!("遍历错误: {}", e),
        }
    }
    files
}

fn walk_with_std_walker(root: &Path, config: &WalkerConfig) -> Vec<PathBuf> {
    let filter = EntryFilter::new(config);

    let mut walker = walkdir::WalkDir::new(root).follow_links(config.follow_symlinks);
    if config.max_depth > 0 {
        walker = walker.max_depth(config.max_depth);
    }

    let mut files = Vec::new();
    let entries = walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || filter.allows(&entry.file_name().to_string_lossy()));
    for result in entries {
        match result {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(e) => tracing::warn!("遍历错误: {}", e),
        }
    }
    files
}

/// 扩展名受支持的文件
pub fn is_supported_file(path: &Path, config: &WalkerConfig) -> bool {
    path.extension()
        .map(|ext| config.is_supported_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

/// 将路径包装为 `ContentFile`；路径不在根目录下时返回 None
pub fn to_content_file(root: &Path, path: PathBuf) -> Option<ContentFile> {
    let relative_path = path.strip_prefix(root).ok()?.to_path_buf();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    Some(ContentFile {
        absolute_path: path,
        relative_path,
        extension,
    })
}

/// 内容根下所有受支持的文档文件
pub fn content_files(config: &SiteConfig) -> Vec<ContentFile> {
    let root = config.content_root.as_path();
    walk_files(root, &config.walker)
        .into_iter()
        .filter(|path| is_supported_file(path, &config.walker))
        .filter_map(|path| to_content_file(root, path))
        .collect()
}
