use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavItem {
    Page { title: String, url: String },
    Section { title: String, children: Vec<NavItem> },
}

impl NavItem {
    pub fn title(&self) -> &str {
        match self {
            NavItem::Page { title, .. } | NavItem::Section { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationPayload {
    /// Always a `Section`
    pub tree: NavItem,
    /// url -> title, leaves only
    pub flat: BTreeMap<String, String>,
}
