// course-core/src/render.rs
//! Markdown → HTML 渲染

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser};
use regex::Regex;

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(\w+)?").unwrap());
static SUBSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)~(\w+)~").unwrap());
static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\^(\w+)\^").unwrap());

/// 把 markdown 片段渲染为 HTML
///
/// 搜索片段和页面正文共用同一个实现。
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// 基于 pulldown-cmark 的 CommonMark 渲染器（启用表格和删除线）
#[derive(Debug, Clone)]
pub struct CommonMarkRenderer {
    options: Options,
    hard_breaks: bool,
}

impl CommonMarkRenderer {
    pub fn new(hard_breaks: bool) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options, hard_breaks }
    }
}

impl Default for CommonMarkRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let hard_breaks = self.hard_breaks;
        let parser = Parser::new_ext(markdown, self.options).map(move |event| match event {
            Event::SoftBreak if hard_breaks => Event::HardBreak,
            other => other,
        });

        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        pulldown_cmark::html::push_html(&mut html, parser);
        html
    }
}

/// 页面渲染前的预处理
///
/// 代码围栏独占一行；`H~2~O` 和 `x^2^` 这类上下标写法改写为普通文本。
pub fn sanitize_markdown(content: &str) -> String {
    let text = FENCE_OPEN.replace_all(content, "\n```${1}\n");
    let text = SUBSCRIPT.replace_all(&text, "${1}_${2}");
    let text = SUPERSCRIPT.replace_all(&text, "${1}^${2}");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paragraph() {
        let html = CommonMarkRenderer::default().render("Vertex shader transforms geometry");
        assert_eq!(html, "<p>Vertex shader transforms geometry</p>\n");
    }

    #[test]
    fn test_soft_breaks_follow_setting() {
        let hard = CommonMarkRenderer::new(true).render("line one\nline two");
        assert!(hard.contains("<br />"));

        let soft = CommonMarkRenderer::new(false).render("line one\nline two");
        assert!(!soft.contains("<br />"));
    }

    #[test]
    fn test_tables_and_strikethrough() {
        let renderer = CommonMarkRenderer::default();
        let table = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(table.contains("<table>"));
        assert!(renderer.render("~~old~~").contains("<del>old</del>"));
    }

    #[test]
    fn test_sanitize_markdown() {
        assert_eq!(sanitize_markdown("H~2~O and x^2^"), "H_2O and x^2");
        assert_eq!(
            sanitize_markdown("text ```glsl void main() {} ```"),
            "text \n```glsl\n void main() {} \n```\n"
        );
    }
}
