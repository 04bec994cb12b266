use super::{run_blocking, Command};
use crate::config::Config;
use crate::error::Result;
use course_core::CourseSite;
use indicatif::{ProgressBar, ProgressStyle};

pub struct IndexCommand {
    config: Config,
}

impl IndexCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for IndexCommand {
    async fn execute(&self) -> Result<()> {
        let site = CourseSite::new(self.config.site.clone());
        println!("索引目录: {:?}", site.config().content_root);

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template("{spinner} 索引中 [{elapsed}] | 文件 {pos}/{len} ({percent}%)")?
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );

        let progress = pb.clone();
        let stats = run_blocking(move || {
            site.reindex_with_progress(|done, total| {
                progress.set_length(total as u64);
                progress.set_position(done as u64);
            })
        })
        .await?;
        pb.finish_and_clear();

        println!(
            "✓ 索引完成: {} 个文档, {} 个词",
            stats.documents, stats.tokens
        );
        Ok(())
    }
}
