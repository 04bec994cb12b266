//! 测试客户端 - 演示课程站点的 RPC 接口
//!
//! 运行方式:
//! 1. 先启动服务: cargo run -p server -- serve
//! 2. 运行客户端: cargo run -p server --example test_client -- [查询词]

use config::AppStrategy;
use rpc::{
    CourseServiceClient,
    navigation::NavItem,
    search::{SearchOutcome, SearchRequest},
};
use tarpc::{client, context, tokio_serde::formats::Bincode};

fn print_nav(item: &NavItem, depth: usize) {
    let indent = "  ".repeat(depth);
    match item {
        NavItem::Page { title, url } => println!("{}- {} ({})", indent, title, url),
        NavItem::Section { title, children } => {
            println!("{}+ {}", indent, title);
            for child in children {
                print_nav(child, depth + 1);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let query = if query.is_empty() { "shader".to_string() } else { query };

    // 获取 socket 路径
    let strategy = config::create_strategy()?;
    let runtime_dir = config::resolve_dir("RUNTIME_DIRECTORY", &strategy, |s| s.runtime_dir());
    let socket_path = config::socket_path(&runtime_dir);

    println!("连接到: {:?}", socket_path);

    let transport = tarpc::serde_transport::unix::connect(&socket_path, Bincode::default).await?;
    let client = CourseServiceClient::new(client::Config::default(), transport).spawn();

    println!("\n=== 测试 ping ===");
    let response = client.ping(context::current()).await?;
    println!("Ping 响应: {}", response);

    println!("\n=== 导航 ===");
    let nav = client.navigation(context::current()).await?;
    print_nav(&nav.tree, 0);
    println!("共 {} 个页面", nav.flat.len());

    println!("\n=== 搜索: {} ===", query);
    let req = SearchRequest {
        query: query.clone(),
        page: Some(1),
        limit: Some(10),
    };
    match client.search(context::current(), req).await? {
        SearchOutcome::Ok(hits) if hits.is_empty() => println!("没有结果"),
        SearchOutcome::Ok(hits) => {
            for (i, hit) in hits.iter().enumerate() {
                println!("  [{}] {} {}", i + 1, hit.title, hit.url);
                for snippet in &hit.snippets {
                    println!("      {}", snippet.trim_end());
                }
            }
        }
        SearchOutcome::Failed(kind) => println!("✗ 搜索失败: {:?}", kind),
    }

    println!("\n=== 重建索引 ===");
    let summary = client.reindex(context::current()).await?;
    println!(
        "✓ 第 {} 代: {} 个文档, {} 个词",
        summary.generation, summary.documents, summary.tokens
    );

    Ok(())
}
