use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// 覆盖配置文件中的教程目录
    #[arg(long, global = true)]
    pub content_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve navigation, search and reindex over a unix socket
    Serve,
    /// Build the search index once and print a summary
    Index,
    /// Run a keyword search and print the results
    Search {
        /// 查询关键词
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// 页码（从 1 开始），需要配合 --limit
        #[arg(long)]
        page: Option<usize>,
        /// 每页结果数
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the navigation as JSON
    Nav {
        /// 打印 URL → 标题 表而不是树
        #[arg(long)]
        flat: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_search_with_paging() {
        let cli = Cli::parse_from(["server", "-vv", "search", "render", "shader", "--page", "2", "--limit", "5"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Search { query, page, limit }) => {
                assert_eq!(query, vec!["render", "shader"]);
                assert_eq!(page, Some(2));
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn content_root_is_global() {
        let cli = Cli::parse_from(["server", "nav", "--flat", "--content-root", "/srv/course"]);
        assert_eq!(cli.content_root, Some(PathBuf::from("/srv/course")));
        assert!(matches!(cli.command, Some(Commands::Nav { flat: true })));
    }
}
