// course-core/src/pages.rs
//! 页面模块 - 按 URL 找到源文件并渲染为 HTML

use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::{CoreError, Result};
use crate::extract::{display_title, frontmatter_title, read_markdown};
use crate::models::RenderedPage;
use crate::render::{sanitize_markdown, MarkdownRenderer};
use crate::walker::EntryFilter;

/// 去掉挂载前缀后的相对路径片段
///
/// 不在挂载路径下的 URL 视为相对路径；包含 `.`/`..` 的路径一律拒绝。
fn relative_segments<'a>(url: &'a str, mount_prefix: &str) -> Result<Vec<&'a str>> {
    let path = url.split(['?', '#']).next().unwrap_or_default();

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mount: Vec<&str> = mount_prefix.split('/').filter(|s| !s.is_empty()).collect();
    if !mount.is_empty() && segments.starts_with(&mount) {
        segments.drain(..mount.len());
    }

    if segments.iter().any(|s| *s == "." || *s == ".." || s.contains('\\')) {
        return Err(CoreError::DocumentNotFound(url.to_string()));
    }
    Ok(segments)
}

/// 页面解析与加载
pub struct PageStore<'a> {
    config: &'a SiteConfig,
    renderer: &'a dyn MarkdownRenderer,
}

impl<'a> PageStore<'a> {
    pub fn new(config: &'a SiteConfig, renderer: &'a dyn MarkdownRenderer) -> Self {
        Self { config, renderer }
    }

    /// URL → 源文件
    ///
    /// 依次尝试 `<path>.md`、`<path>.mdx`、`<path>/index.md`、`<path>/index.mdx`。
    /// 与遍历器使用同一套过滤规则：隐藏条目、忽略模式和深度限制之外的文件都不可见。
    pub fn resolve(&self, url: &str) -> Result<PathBuf> {
        let not_found = || CoreError::DocumentNotFound(url.to_string());

        let segments = relative_segments(url, &self.config.mount_prefix())?;
        let walker = &self.config.walker;
        let filter = EntryFilter::new(walker);
        if let Some(hidden) = segments.iter().find(|s| !filter.allows(s)) {
            tracing::debug!("页面路径 {} 中的 {:?} 被过滤", url, hidden);
            return Err(not_found());
        }

        let root = self.config.content_root.as_path();
        let dir: PathBuf = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));

        // (候选文件名, 所在目录, 文件深度)
        let mut candidates: Vec<(String, PathBuf, usize)> = Vec::with_capacity(4);
        if let Some((last, parents)) = segments.split_last() {
            let parent = parents.iter().fold(root.to_path_buf(), |p, s| p.join(s));
            for ext in &walker.supported_extensions {
                candidates.push((format!("{}.{}", last, ext), parent.clone(), segments.len()));
            }
        }
        for ext in &walker.supported_extensions {
            candidates.push((format!("index.{}", ext), dir.clone(), segments.len() + 1));
        }

        candidates
            .into_iter()
            .filter(|(name, _, depth)| {
                filter.allows(name) && (walker.max_depth == 0 || *depth <= walker.max_depth)
            })
            .map(|(name, parent, _)| parent.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(not_found)
    }

    /// 加载并渲染页面
    pub fn load(&self, url: &str) -> Result<RenderedPage> {
        let path = self.resolve(url)?;
        tracing::debug!("加载页面 {} -> {:?}", url, path);

        let (frontmatter, body) = read_markdown(&path)?;
        let title = frontmatter_title(&frontmatter).unwrap_or_else(|| fallback_title(&path));
        let html = self.renderer.render(&sanitize_markdown(&body));

        Ok(RenderedPage {
            url: self.canonical_url(url)?,
            title,
            frontmatter,
            html,
        })
    }

    fn canonical_url(&self, url: &str) -> Result<String> {
        let prefix = self.config.mount_prefix();
        let segments = relative_segments(url, &prefix)?;
        Ok(format!("{}/{}", prefix, segments.join("/")))
    }
}

fn fallback_title(path: &Path) -> String {
    path.file_name()
        .map(|n| display_title(&n.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CommonMarkRenderer;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("shaders/compute")).unwrap();
        fs::write(
            root.join("intro.md"),
            "---\ntitle: Introduction\n---\n# Welcome\nOpenGL rendering\n",
        )
        .unwrap();
        fs::write(root.join("shaders/vertex.mdx"), "Vertex shader H~2~O").unwrap();
        fs::write(root.join("shaders/compute/index.md"), "Compute overview").unwrap();
        dir
    }

    #[rstest]
    #[case("/tutorial/intro", "intro.md")]
    #[case("tutorial/intro", "intro.md")]
    #[case("/tutorial/shaders/vertex", "shaders/vertex.mdx")]
    #[case("/tutorial/shaders/compute", "shaders/compute/index.md")]
    #[case("/tutorial/shaders/compute/", "shaders/compute/index.md")]
    #[case("shaders/vertex", "shaders/vertex.mdx")]
    #[case("/tutorial/intro?x=1#top", "intro.md")]
    fn test_resolve(#[case] url: &str, #[case] expected: &str) {
        let dir = fixture();
        let config = SiteConfig::with_root(dir.path());
        let renderer = CommonMarkRenderer::default();
        let store = PageStore::new(&config, &renderer);
        assert_eq!(store.resolve(url).unwrap(), dir.path().join(expected));
    }

    #[rstest]
    #[case("/tutorial/missing")]
    #[case("/tutorial/../secret")]
    #[case("/tutorial/shaders/./vertex")]
    #[case("/tutorial")]
    #[case("/tutorial/.drafts/secret")]
    #[case("/tutorial/node_modules/pkg/readme")]
    fn test_resolve_not_found(#[case] url: &str) {
        let dir = fixture();
        let root = dir.path();
        fs::create_dir_all(root.join(".drafts")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join(".drafts/secret.md"), "unpublished").unwrap();
        fs::write(root.join("node_modules/pkg/readme.md"), "readme").unwrap();
        let config = SiteConfig::with_root(dir.path());
        let renderer = CommonMarkRenderer::default();
        let store = PageStore::new(&config, &renderer);
        assert!(matches!(store.resolve(url), Err(CoreError::DocumentNotFound(_))));
    }

    #[test]
    fn test_hidden_pages_match_navigation() {
        let dir = fixture();
        let root = dir.path();
        fs::create_dir_all(root.join(".drafts")).unwrap();
        fs::write(root.join(".drafts/secret.md"), "unpublished").unwrap();

        let config = SiteConfig::with_root(root);
        let renderer = CommonMarkRenderer::default();
        let store = PageStore::new(&config, &renderer);

        let nav = crate::navigation::build_navigation(&config);
        assert!(!nav.flat.contains_key("/tutorial/.drafts/secret"));
        assert!(matches!(
            store.load("/tutorial/.drafts/secret"),
            Err(CoreError::DocumentNotFound(_))
        ));
        for url in nav.flat.keys() {
            assert!(store.load(url).is_ok(), "{} should load", url);
        }
    }

    #[test]
    fn test_resolve_respects_max_depth() {
        let dir = fixture();
        let mut config = SiteConfig::with_root(dir.path());
        config.walker.max_depth = 1;
        let renderer = CommonMarkRenderer::default();
        let store = PageStore::new(&config, &renderer);

        assert!(store.resolve("/tutorial/intro").is_ok());
        assert!(matches!(
            store.resolve("/tutorial/shaders/vertex"),
            Err(CoreError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_load_renders_page() {
        let dir = fixture();
        let config = SiteConfig::with_root(dir.path());
        let renderer = CommonMarkRenderer::default();
        let store = PageStore::new(&config, &renderer);

        let page = store.load("tutorial/intro/").unwrap();
        assert_eq!(page.url, "/tutorial/intro");
        assert_eq!(page.title, "Introduction");
        assert!(page.html.contains("<h1>Welcome</h1>"));
        assert_eq!(
            page.frontmatter.get("title"),
            Some(&serde_json::Value::String("Introduction".into()))
        );

        let vertex = store.load("/tutorial/shaders/vertex").unwrap();
        assert_eq!(vertex.title, "Vertex");
        assert!(vertex.html.contains("H_2O"));
    }

    #[test]
    fn test_load_index_page_title() {
        let dir = fixture();
        let config = SiteConfig::with_root(dir.path());
        let renderer = CommonMarkRenderer::default();
        let store = PageStore::new(&config, &renderer);

        let page = store.load("/tutorial/shaders/compute").unwrap();
        assert_eq!(page.title, "Index");
        assert_eq!(page.url, "/tutorial/shaders/compute");
    }
}
