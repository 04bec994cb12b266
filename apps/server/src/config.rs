use crate::error::Result;
use course_core::SiteConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use config::{create_strategy, resolve_dir, AppStrategy};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default = "default_config", deny_unknown_fields)]
pub struct Config {
    pub runtime_dir: PathBuf,
    /// 教程目录、挂载路径、遍历与搜索参数
    pub site: SiteConfig,
}

fn default_config() -> Config {
    let runtime_dir = match create_strategy() {
        Ok(strategy) => resolve_dir("RUNTIME_DIRECTORY", &strategy, |s| s.runtime_dir()),
        Err(_) => std::env::temp_dir().join(config::constants::APP_NAME),
    };

    Config {
        runtime_dir,
        site: SiteConfig::default(),
    }
}

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        Ok(user_config)
    }

    pub fn load() -> Result<Config> {
        let strategy = create_strategy()?;
        let config_path = strategy.config_dir().join(config::constants::SERVER_CONFIG_FILE_NAME);

        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => Self::load_str(&user_config_str),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // 配置文件不存在，创建示例配置文件
                Self::create_example_config(&config_path)?;
                Self::load_str("")
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_example_config(config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let example_config = r#"# Server 配置文件
#
# 此文件在首次运行时自动创建
# 配置修改后重启服务生效

# 可选：自定义运行时目录（unix socket 所在位置）
# runtime-dir = "/custom/runtime/path"

[site]
# 教程 markdown 所在目录
content_root = "./tutorial"
# 文档 URL 的前缀
mount_path = "/tutorial"

# [site.walker]
# custom_ignore_patterns = ["node_modules", ".git", "*.tmp"]

# [site.search]
# min_term_length = 3
# max_snippets = 3
# snippet_length = 150
"#;

        std::fs::write(config_path, example_config)?;

        eprintln!("\n📝 已创建配置文件: {:?}", config_path);
        eprintln!("💡 请编辑配置文件，设置 [site] 中的 content_root");
        eprintln!("   然后运行: cargo run -p server -- index\n");

        Ok(())
    }
}
