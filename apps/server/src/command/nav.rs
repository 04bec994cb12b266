use super::{run_blocking, Command};
use crate::config::Config;
use crate::error::Result;
use course_core::{CourseSite, NavigationTable};

pub struct NavCommand {
    config: Config,
    flat: bool,
}

impl NavCommand {
    pub fn new(cfg: Config, flat: bool) -> Self {
        Self { config: cfg, flat }
    }
}

/// 树形输出以标题为键，叶子为 `{"path": ...}`；`flat` 时输出 URL → 标题
fn nav_json(table: &NavigationTable, flat: bool) -> Result<serde_json::Value> {
    if flat {
        Ok(serde_json::to_value(&table.flat)?)
    } else {
        Ok(table.tree.outline())
    }
}

#[async_trait::async_trait]
impl Command for NavCommand {
    async fn execute(&self) -> Result<()> {
        let site = CourseSite::new(self.config.site.clone());
        let table = run_blocking(move || site.navigation()).await?;

        let json = nav_json(&table, self.flat)?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::NavigationNode;
    use std::collections::BTreeMap;

    fn table() -> NavigationTable {
        let mut flat = BTreeMap::new();
        flat.insert("/tutorial/shaders/vertex".to_string(), "Vertex".to_string());
        NavigationTable {
            tree: NavigationNode::Folder {
                title: "Tutorial".into(),
                children: vec![NavigationNode::Folder {
                    title: "Shaders".into(),
                    children: vec![NavigationNode::Leaf {
                        title: "Vertex".into(),
                        path: "/tutorial/shaders/vertex".into(),
                    }],
                }],
            },
            flat,
        }
    }

    #[test]
    fn tree_json_is_keyed_by_title() {
        let json = nav_json(&table(), false).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "Shaders": { "Vertex": { "path": "/tutorial/shaders/vertex" } } })
        );
    }

    #[test]
    fn flat_json_maps_url_to_title() {
        let json = nav_json(&table(), true).unwrap();
        assert_eq!(json, serde_json::json!({ "/tutorial/shaders/vertex": "Vertex" }));
    }
}
