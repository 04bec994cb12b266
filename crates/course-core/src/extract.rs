// course-core/src/extract.rs
//! 文档加载模块：读取文件、拆分头部元数据、生成标题与 URL

use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SiteConfig;
use crate::error::{CoreError, Result};
use crate::models::{ContentFile, Frontmatter, ParsedDocument};
use crate::walker;

const FRONTMATTER_DELIMITER: &str = "---";

static FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(```|~~~).*$").unwrap());
static HEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+").unwrap());
static QUOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}>[ \t]?").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static HTML_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// 智能读取文本文件（自动检测编码）
fn read_text_with_encoding_detection(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;

    // 先尝试UTF-8
    if let Ok(text) = std::str::from_utf8(&bytes) {
        return Ok(text.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&bytes, true);
    let detected_encoding: &'static encoding_rs::Encoding = detector.guess(None, true);

    tracing::debug!("检测到文件编码 {:?}: {:?}", detected_encoding.name(), path);

    let (decoded, encoding_used, had_errors) = detected_encoding.decode(&bytes);
    if had_errors {
        tracing::warn!("文件 {:?} 使用 {} 解码时有部分错误，可能影响搜索准确性", path, encoding_used.name());
    }

    Ok(decoded.into_owned())
}

/// 拆分头部元数据与正文
///
/// 只有文件首行恰好是 `---` 时才视为带元数据；找不到闭合的 `---` 时整个文件都是正文。
pub fn split_frontmatter(raw: &str) -> std::result::Result<(Frontmatter, &str), String> {
    let source = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let Some(first_line_end) = source.find('\n') else {
        return Ok((Frontmatter::new(), source));
    };
    if source[..first_line_end].trim_end() != FRONTMATTER_DELIMITER {
        return Ok((Frontmatter::new(), source));
    }

    let block_start = first_line_end + 1;
    let mut cursor = block_start;
    while cursor <= source.len() {
        let line_end = source[cursor..]
            .find('\n')
            .map(|i| cursor + i)
            .unwrap_or(source.len());

        if source[cursor..line_end].trim_end() == FRONTMATTER_DELIMITER {
            let yaml = &source[block_start..cursor];
            let body = source.get(line_end + 1..).unwrap_or("");
            return Ok((parse_frontmatter(yaml)?, body));
        }

        if line_end == source.len() {
            break;
        }
        cursor = line_end + 1;
    }

    Ok((Frontmatter::new(), source))
}

/// 解析 YAML 元数据，只保留标量
fn parse_frontmatter(yaml: &str) -> std::result::Result<Frontmatter, String> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    let mapping = match value {
        serde_yaml::Value::Null => return Ok(Frontmatter::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        other => return Err(format!("frontmatter must be a mapping, got {:?}", other)),
    };

    let mut frontmatter = Frontmatter::new();
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        let scalar = match value {
            serde_yaml::Value::Null => serde_json::Value::Null,
            serde_yaml::Value::Bool(b) => serde_json::Value::Bool(b),
            serde_yaml::Value::String(s) => serde_json::Value::String(s),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    serde_json::Value::from(i)
                } else if let Some(u) = n.as_u64() {
                    serde_json::Value::from(u)
                } else {
                    n.as_f64()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            _ => {
                tracing::debug!("跳过非标量元数据字段: {}", key);
                continue;
            }
        };
        frontmatter.insert(key.to_string(), scalar);
    }

    Ok(frontmatter)
}

/// 从文件名生成显示标题
///
/// `-`/`_` 变为空格，去掉 `.md`/`.mdx` 后缀，每个单词首字母大写。
pub fn display_title(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("mdx") => stem,
        _ => file_name,
    };

    let mut title = String::with_capacity(stem.len());
    let mut in_word = false;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let is_word = c.is_alphanumeric();
        if is_word && !in_word {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        in_word = is_word;
    }
    title
}

/// 元数据中的 `title`；缺失、为空或不是标量时返回 None
pub fn frontmatter_title(frontmatter: &Frontmatter) -> Option<String> {
    match frontmatter.get("title")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// 相对路径 → 公开 URL：统一使用 `/`，去掉扩展名，加挂载前缀
pub fn url_path(relative_path: &Path, mount_prefix: &str) -> String {
    let without_ext = relative_path.with_extension("");
    let segments: Vec<String> = without_ext
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    format!("{}/{}", mount_prefix, segments.join("/"))
}

/// 去掉不携带内容的 markdown 结构标记
pub fn strip_markup(body: &str) -> String {
    let text = HTML_COMMENT.replace_all(body, "");
    let text = FENCE_LINE.replace_all(&text, "");
    let text = HEADING_MARKER.replace_all(&text, "");
    let text = QUOTE_MARKER.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    text.trim().to_string()
}

/// 原始 markdown 与元数据，未去除标记
pub(crate) fn read_markdown(path: &Path) -> Result<(Frontmatter, String)> {
    let raw = read_text_with_encoding_detection(path)?;
    let (frontmatter, body) = split_frontmatter(&raw).map_err(|reason| CoreError::DocumentParse {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok((frontmatter, body.to_string()))
}

/// 加载单个文档
pub fn load_document(file: &ContentFile, config: &SiteConfig) -> Result<ParsedDocument> {
    tracing::debug!("正在解析文件: {:?}", file.absolute_path);

    let (frontmatter, body) = read_markdown(&file.absolute_path)?;

    let title = frontmatter_title(&frontmatter).unwrap_or_else(|| {
        let file_name = file
            .absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        display_title(&file_name)
    });

    Ok(ParsedDocument {
        source_path: file.absolute_path.clone(),
        url_path: url_path(&file.relative_path, &config.mount_prefix()),
        title,
        frontmatter,
        body_text: strip_markup(&body),
    })
}

/// 加载全部文档；单个文件失败只记录日志并跳过
pub fn load_documents(files: &[ContentFile], config: &SiteConfig) -> Vec<ParsedDocument> {
    load_documents_with_progress(files, config, |_, _| {})
}

/// 加载全部文档（带进度回调）
pub fn load_documents_with_progress<F>(
    files: &[ContentFile],
    config: &SiteConfig,
    progress_callback: F,
) -> Vec<ParsedDocument>
where
    F: Fn(usize, usize),
{
    let total = files.len();
    let mut documents = Vec::with_capacity(total);

    for (i, file) in files.iter().enumerate() {
        match load_document(file, config) {
            Ok(doc) => documents.push(doc),
            Err(e) => tracing::error!("处理文件失败 {:?}: {}", file.absolute_path, e),
        }
        progress_callback(i + 1, total);
    }

    documents
}

/// 所有文档的 URL，不读取文件内容
pub fn document_paths(config: &SiteConfig) -> Vec<String> {
    let prefix = config.mount_prefix();
    walker::content_files(config)
        .iter()
        .map(|file| url_path(&file.relative_path, &prefix))
        .collect()
}
