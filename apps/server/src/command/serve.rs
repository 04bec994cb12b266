use super::{run_blocking, Command};
use crate::config::Config;
use crate::error::Result;
use futures::{future, prelude::*};
use std::fs;
use tracing::{error, info};

use course_core::{rpc_compat, CourseSite};
use rpc::{
    CourseService,
    navigation::{NavItem, NavigationPayload},
    search::{IndexSummary, SearchErrorKind, SearchOutcome, SearchRequest},
};
use tarpc::{
    context::Context,
    server::{self, Channel},
    tokio_serde::formats::Bincode,
};

async fn spawn(fut: impl Future<Output = ()> + Send + 'static) {
    tokio::spawn(fut);
}

#[derive(Clone)]
struct Server {
    site: CourseSite,
}

impl CourseService for Server {
    async fn ping(self, _c: Context) -> String {
        "Pong".to_string()
    }

    async fn navigation(self, _c: Context) -> NavigationPayload {
        let site = self.site.clone();
        match run_blocking(move || site.navigation()).await {
            Ok(table) => table.into(),
            Err(e) => {
                error!("构建导航失败: {}", e);
                NavigationPayload {
                    tree: NavItem::Section {
                        title: String::new(),
                        children: Vec::new(),
                    },
                    flat: Default::default(),
                }
            }
        }
    }

    async fn search(self, _c: Context, req: SearchRequest) -> SearchOutcome {
        let site = self.site.clone();
        match run_blocking(move || rpc_compat::handle_search(&site, &req)).await {
            Ok(outcome) => outcome,
            Err(e) => SearchOutcome::Failed(SearchErrorKind::Internal(e.to_string())),
        }
    }

    async fn reindex(self, _c: Context) -> IndexSummary {
        info!("收到重建索引请求");
        let site = self.site.clone();
        match run_blocking(move || site.reindex()).await {
            Ok(stats) => stats.into(),
            Err(e) => {
                error!("重建索引失败: {}", e);
                self.site.index().stats().into()
            }
        }
    }
}

pub struct ServeCommand {
    config: Config,
}

impl ServeCommand {
    pub fn new(cfg: Config) -> Self {
        Self { config: cfg }
    }
}

#[async_trait::async_trait]
impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let unix_socket_path = config::socket_path(&self.config.runtime_dir);

        if let Some(parent) = unix_socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if unix_socket_path.exists() {
            fs::remove_file(&unix_socket_path)?;
        }

        let site = CourseSite::new(self.config.site.clone());
        info!("教程目录: {:?}，挂载于 {}", site.config().content_root, site.config().mount_prefix());

        info!("正在构建索引...");
        let warmup = site.clone();
        let stats = run_blocking(move || warmup.build_index()).await?;
        info!("索引就绪: {} 个文档, {} 个词", stats.documents, stats.tokens);

        info!("监听 {:?}", unix_socket_path);

        let mut listener = tarpc::serde_transport::unix::listen(&unix_socket_path, Bincode::default).await?;
        listener.config_mut().max_frame_length(usize::MAX);

        let server = Server { site };

        listener
            .filter_map(|r| future::ready(r.ok()))
            .map(server::BaseChannel::with_defaults)
            .map(|channel| {
                let server = server.clone();
                channel.execute(server.serve()).for_each(spawn)
            })
            .buffer_unordered(10)
            .for_each(|_| async {})
            .await;

        Ok(())
    }
}
