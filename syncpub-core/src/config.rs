//! Publisher configuration and the grouping extension point.

use crate::{GROUP_ITEM_TYPE, PublisherError, PublisherResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use syncpub_types::{ContentItem, ItemStatus};
use tracing::info;

/// Decides which items take part in grouping and cascading.
///
/// [`PublisherConfig`] is the stock implementation. Embedders with their own
/// settings source can implement this instead.
pub trait GroupingPolicy: Send + Sync {
    /// Whether items of this type may be grouped and cascaded.
    fn is_groupable_type(&self, item_type: &str) -> bool;

    /// Whether an item leaving this status may trigger a cascade.
    fn is_groupable_status(&self, status: &ItemStatus) -> bool;

    /// Whether an emptied group is hard-deleted after a cascade.
    fn delete_group_on_publish(&self) -> bool {
        false
    }

    /// Whether `item` may be placed into a group right now.
    fn can_be_grouped(&self, item: &ContentItem) -> bool {
        item.item_type != GROUP_ITEM_TYPE
            && self.is_groupable_type(&item.item_type)
            && self.is_groupable_status(&item.status)
    }
}

/// Settings for the publisher, usually loaded from a TOML file.
///
/// ```toml
/// groupable_types = ["post", "page"]
/// groupable_statuses = ["draft", "pending", "future"]
/// delete_group_on_publish = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub groupable_types: BTreeSet<String>,
    pub groupable_statuses: BTreeSet<ItemStatus>,
    pub delete_group_on_publish: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            groupable_types: ["post", "page"].into_iter().map(String::from).collect(),
            groupable_statuses: [ItemStatus::Draft, ItemStatus::Pending, ItemStatus::Future]
                .into_iter()
                .collect(),
            delete_group_on_publish: false,
        }
    }
}

impl PublisherConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> PublisherResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> PublisherResult<Self> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| PublisherError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

impl GroupingPolicy for PublisherConfig {
    fn is_groupable_type(&self, item_type: &str) -> bool {
        self.groupable_types.contains(item_type)
    }

    fn is_groupable_status(&self, status: &ItemStatus) -> bool {
        self.groupable_statuses.contains(status)
    }

    fn delete_group_on_publish(&self) -> bool {
        self.delete_group_on_publish
    }
}
