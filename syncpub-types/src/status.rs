use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Publication status of a content item.
///
/// Only [`ItemStatus::Published`] has meaning to the cascade. The other named
/// variants exist so configuration can refer to them; anything else a store
/// reports is carried opaquely in [`ItemStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemStatus {
    Draft,
    Pending,
    Future,
    Private,
    Published,
    Trash,
    Other(String),
}

impl ItemStatus {
    /// The stored string form (`"publish"` for [`ItemStatus::Published`]).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Future => "future",
            Self::Private => "private",
            Self::Published => "publish",
            Self::Trash => "trash",
            Self::Other(s) => s,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let status = match s.to_ascii_lowercase().as_str() {
            "" => return Err(crate::Error::InvalidStatus(s.to_string())),
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "future" => Self::Future,
            "private" => Self::Private,
            "publish" | "published" => Self::Published,
            "trash" => Self::Trash,
            _ => Self::Other(s.to_string()),
        };
        Ok(status)
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
