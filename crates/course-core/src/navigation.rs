// course-core/src/navigation.rs
//! 导航模块 - 把内容目录转换成导航树和 URL → 标题 查找表
//!
//! 每一层都先处理子目录，再处理文档文件；同组内保持文件系统给出的顺序。
//! 没有任何文档的目录不会出现在导航中。

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::extract::{display_title, load_document};
use crate::walker::{is_supported_file, list_directory, to_content_file};

/// 导航树节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavigationNode {
    Leaf { title: String, path: String },
    Folder { title: String, children: Vec<NavigationNode> },
}

impl NavigationNode {
    pub fn title(&self) -> &str {
        match self {
            NavigationNode::Leaf { title, .. } | NavigationNode::Folder { title, .. } => title,
        }
    }

    /// 先序遍历所有叶子节点
    pub fn leaves(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            NavigationNode::Leaf { title, path } => out.push((path.as_str(), title.as_str())),
            NavigationNode::Folder { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// 以标题为键的嵌套对象：叶子为 `{"path": ...}`，目录为子节点对象
    pub fn outline(&self) -> serde_json::Value {
        match self {
            NavigationNode::Leaf { path, .. } => serde_json::json!({ "path": path }),
            NavigationNode::Folder { children, .. } => {
                let map = children
                    .iter()
                    .map(|child| (child.title().to_string(), child.outline()))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(map)
            }
        }
    }
}

/// 同名（同标题）节点后写入者覆盖先写入者，位置不变
///
/// 与目录同名的文件会覆盖整个目录子树。
fn insert_child(children: &mut Vec<NavigationNode>, node: NavigationNode) {
    match children.iter_mut().find(|c| c.title() == node.title()) {
        Some(existing) => {
            tracing::warn!("导航标题重复，后者覆盖前者: {}", node.title());
            *existing = node;
        }
        None => children.push(node),
    }
}

/// 导航数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationTable {
    /// 根节点，总是 Folder
    pub tree: NavigationNode,
    /// URL → 标题，只包含叶子
    pub flat: BTreeMap<String, String>,
}

impl NavigationTable {
    fn from_tree(tree: NavigationNode) -> Self {
        let flat = tree
            .leaves()
            .into_iter()
            .map(|(path, title)| (path.to_string(), title.to_string()))
            .collect();
        Self { tree, flat }
    }

    pub fn title_for(&self, url: &str) -> Option<&str> {
        self.flat.get(url).map(String::as_str)
    }
}

/// 扫描内容根目录，构建导航
///
/// 每次调用都重新读取文件系统，没有缓存；文件系统不变时结果完全相同。
pub fn build_navigation(config: &SiteConfig) -> NavigationTable {
    let root = config.content_root.as_path();
    tracing::debug!("扫描教程目录: {:?}", root);

    let root_title = root
        .file_name()
        .map(|n| display_title(&n.to_string_lossy()))
        .unwrap_or_default();

    let children = if root.is_dir() {
        let mut ancestors = Vec::new();
        scan_directory(root, 0, config, &mut ancestors)
    } else {
        tracing::warn!("目录 {:?} 不存在", root);
        Vec::new()
    };

    let table = NavigationTable::from_tree(NavigationNode::Folder {
        title: root_title,
        children,
    });

    let top_level = match &table.tree {
        NavigationNode::Folder { children, .. } => children.len(),
        NavigationNode::Leaf { .. } => 1,
    };
    tracing::info!("导航构建完成: {} 个顶层条目, {} 个页面", top_level, table.flat.len());

    table
}

/// 目录的规范路径；失败时退回原路径
fn canonical_dir(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

/// 递归扫描 `dir`（深度 `depth`，根为 0）
///
/// 深度限制与 `walk_files` 一致：`max_depth > 0` 时只收录深度不超过它的文件。
/// `ancestors` 为当前路径上各目录的规范路径，用于发现符号链接环。
fn scan_directory(
    dir: &Path,
    depth: usize,
    config: &SiteConfig,
    ancestors: &mut Vec<PathBuf>,
) -> Vec<NavigationNode> {
    let canonical = canonical_dir(dir);
    if ancestors.contains(&canonical) {
        tracing::warn!("检测到目录环，跳过 {:?} -> {:?}", dir, canonical);
        return Vec::new();
    }

    let listing = match list_directory(dir, &config.walker) {
        Ok(listing) => listing,
        Err(e) => {
            tracing::error!("读取目录失败 {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let max_depth = config.walker.max_depth;
    let descend = max_depth == 0 || depth + 1 < max_depth;

    ancestors.push(canonical);
    let mut children = Vec::new();

    for sub_dir in listing.directories.iter().filter(|_| descend) {
        let sub_children = scan_directory(sub_dir, depth + 1, config, ancestors);
        if sub_children.is_empty() {
            continue;
        }
        let name = sub_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        insert_child(
            &mut children,
            NavigationNode::Folder {
                title: display_title(&name),
                children: sub_children,
            },
        );
    }
    ancestors.pop();

    let mut seen_urls = HashSet::new();
    for path in listing.files {
        if !is_supported_file(&path, &config.walker) {
            continue;
        }
        let Some(file) = to_content_file(&config.content_root, path) else {
            continue;
        };
        match load_document(&file, config) {
            Ok(doc) => {
                if !seen_urls.insert(doc.url_path.clone()) {
                    tracing::warn!("URL 重复，忽略 {:?}: {}", file.absolute_path, doc.url_path);
                    continue;
                }
                insert_child(
                    &mut children,
                    NavigationNode::Leaf {
                        title: doc.title,
                        path: doc.url_path,
                    },
                );
            }
            Err(e) => tracing::error!("处理文件失败 {:?}: {}", file.absolute_path, e),
        }
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn course_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("shaders")).unwrap();
        fs::write(
            root.join("intro.md"),
            "---\ntitle: Introduction\n---\nOpenGL rendering pipeline basics\n",
        )
        .unwrap();
        fs::write(root.join("shaders/vertex.md"), "Vertex shader transforms geometry").unwrap();
        dir
    }

    fn assert_bijection(table: &NavigationTable) {
        let leaves = table.tree.leaves();
        assert_eq!(leaves.len(), table.flat.len());
        for (path, title) in leaves {
            assert_eq!(table.flat.get(path).map(String::as_str), Some(title));
        }
    }

    #[test]
    fn test_course_example_tree() {
        let dir = course_fixture();
        let table = build_navigation(&SiteConfig::with_root(dir.path()));

        let expected = serde_json::json!({
            "Introduction": { "path": "/tutorial/intro" },
            "Shaders": { "Vertex": { "path": "/tutorial/shaders/vertex" } }
        });
        assert_eq!(table.tree.outline(), expected);
        assert_eq!(table.title_for("/tutorial/intro"), Some("Introduction"));
        assert_eq!(table.title_for("/tutorial/shaders/vertex"), Some("Vertex"));
        assert_eq!(table.title_for("/tutorial/shaders"), None);
        assert_bijection(&table);
    }

    #[test]
    fn test_directories_come_first() {
        let dir = course_fixture();
        let table = build_navigation(&SiteConfig::with_root(dir.path()));

        let NavigationNode::Folder { children, .. } = &table.tree else {
            panic!("root must be a folder");
        };
        assert!(matches!(children[0], NavigationNode::Folder { .. }));
        assert_eq!(children[0].title(), "Shaders");
        assert_eq!(children[1].title(), "Introduction");
    }

    #[test]
    fn test_empty_folders_are_omitted() {
        let dir = course_fixture();
        let root = dir.path();
        fs::create_dir_all(root.join("assets/images")).unwrap();
        fs::write(root.join("assets/images/logo.png"), [0u8; 4]).unwrap();
        fs::create_dir_all(root.join("empty/nested/deeper")).unwrap();

        let table = build_navigation(&SiteConfig::with_root(root));
        let outline = table.tree.outline();
        assert!(outline.get("Assets").is_none());
        assert!(outline.get("Empty").is_none());
        assert_eq!(outline.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_deep_nesting_flattens_every_leaf() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c/d")).unwrap();
        fs::write(root.join("a/one.md"), "1").unwrap();
        fs::write(root.join("a/b/two.md"), "2").unwrap();
        fs::write(root.join("a/b/c/d/three.mdx"), "3").unwrap();

        let table = build_navigation(&SiteConfig::with_root(root));
        assert_eq!(table.flat.len(), 3);
        assert!(table.flat.contains_key("/tutorial/a/b/c/d/three"));
        assert_bijection(&table);
    }

    #[test]
    fn test_navigation_is_idempotent() {
        let dir = course_fixture();
        fs::create_dir_all(dir.path().join("extra/more")).unwrap();
        fs::write(dir.path().join("extra/more/page.md"), "x").unwrap();

        let config = SiteConfig::with_root(dir.path());
        assert_eq!(build_navigation(&config), build_navigation(&config));
    }

    #[test]
    fn test_broken_file_does_not_hide_siblings() {
        let dir = course_fixture();
        fs::write(dir.path().join("broken.md"), "---\ntitle: [\n---\n").unwrap();

        let table = build_navigation(&SiteConfig::with_root(dir.path()));
        assert_eq!(table.flat.len(), 2);
        assert!(!table.flat.contains_key("/tutorial/broken"));
    }

    #[test]
    fn test_duplicate_url_keeps_one_leaf() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("page.md"), "---\ntitle: First\n---\n").unwrap();
        fs::write(dir.path().join("page.mdx"), "---\ntitle: Second\n---\n").unwrap();

        let table = build_navigation(&SiteConfig::with_root(dir.path()));
        assert_eq!(table.flat.len(), 1);
        assert_bijection(&table);
    }

    #[test]
    fn test_missing_root_gives_empty_table() {
        let dir = TempDir::new().unwrap();
        let table = build_navigation(&SiteConfig::with_root(dir.path().join("missing")));
        assert!(table.flat.is_empty());
        assert_eq!(table.tree.outline(), serde_json::json!({}));
    }

    fn index_urls(config: &SiteConfig) -> Vec<String> {
        let mut urls: Vec<String> = crate::indexer::build_index(config)
            .entries()
            .iter()
            .map(|e| e.url.clone())
            .collect();
        urls.sort();
        urls
    }

    #[rstest]
    #[case(1, vec!["/tutorial/top"])]
    #[case(2, vec!["/tutorial/a/one", "/tutorial/top"])]
    #[case(0, vec!["/tutorial/a/b/deep", "/tutorial/a/one", "/tutorial/top"])]
    fn test_max_depth_matches_index(#[case] max_depth: usize, #[case] expected: Vec<&str>) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("top.md"), "top").unwrap();
        fs::write(root.join("a/one.md"), "one").unwrap();
        fs::write(root.join("a/b/deep.md"), "deep").unwrap();

        let mut config = SiteConfig::with_root(root);
        config.walker.max_depth = max_depth;

        let table = build_navigation(&config);
        let nav_urls: Vec<&str> = table.flat.keys().map(String::as_str).collect();
        assert_eq!(nav_urls, expected);
        assert_eq!(index_urls(&config), expected);
        assert_bijection(&table);
    }

    #[cfg(unix)]
    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_symlink_loop_is_visited_once(#[case] ripgrep: bool) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("a/page.md"), "page").unwrap();
        std::os::unix::fs::symlink(root.join("a"), root.join("a/loop")).unwrap();

        let mut config = SiteConfig::with_root(root);
        config.walker.follow_symlinks = true;
        config.walker.use_ripgrep_walker = ripgrep;

        let table = build_navigation(&config);
        let nav_urls: Vec<&str> = table.flat.keys().map(String::as_str).collect();
        assert_eq!(nav_urls, vec!["/tutorial/a/page"]);
        assert_eq!(index_urls(&config), vec!["/tutorial/a/page"]);
    }

    #[test]
    fn test_file_titled_like_folder_replaces_it() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("shaders")).unwrap();
        fs::write(root.join("shaders/vertex.md"), "vertex").unwrap();
        fs::write(root.join("shaders.md"), "overview").unwrap();

        let table = build_navigation(&SiteConfig::with_root(root));
        assert_eq!(
            table.tree.outline(),
            serde_json::json!({ "Shaders": { "path": "/tutorial/shaders" } })
        );
        assert_bijection(&table);
    }

    #[test]
    fn test_serde_shape_is_tagged() {
        let node = NavigationNode::Leaf {
            title: "Vertex".into(),
            path: "/tutorial/shaders/vertex".into(),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "leaf", "title": "Vertex", "path": "/tutorial/shaders/vertex"})
        );
        let back: NavigationNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
