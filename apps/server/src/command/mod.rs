pub mod index;
pub mod nav;
pub mod search;
pub mod serve;

use crate::error::Result;

pub use index::IndexCommand;
pub use nav::NavCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;

#[async_trait::async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// 在阻塞线程池上运行同步的站点操作
pub async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await?)
}
