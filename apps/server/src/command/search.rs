use super::{run_blocking, Command};
use crate::config::Config;
use crate::error::{Result, WrapErr};
use course_core::CourseSite;

pub struct SearchCommand {
    config: Config,
    query: String,
    page: Option<usize>,
    limit: Option<usize>,
}

impl SearchCommand {
    pub fn new(cfg: Config, query: String, page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            config: cfg,
            query,
            page,
            limit,
        }
    }
}

#[async_trait::async_trait]
impl Command for SearchCommand {
    async fn execute(&self) -> Result<()> {
        let site = CourseSite::new(self.config.site.clone());
        let (query, page, limit) = (self.query.clone(), self.page, self.limit);

        let results = run_blocking(move || site.search_page(&query, page, limit))
            .await?
            .wrap_err_with(|| format!("搜索 '{}' 失败", self.query))?;

        if results.is_empty() {
            println!("没有找到与 '{}' 相关的内容", self.query);
            return Ok(());
        }

        for (i, result) in results.iter().enumerate() {
            println!("[{}] {}  {}", i + 1, result.title, result.url);
            for snippet in &result.snippets {
                println!("    {}", snippet.trim_end());
            }
        }
        Ok(())
    }
}
