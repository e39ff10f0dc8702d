//! Library record model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::LibraryError;

/// Platform a library entry is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "PC")]
    Pc,
    PlayStation,
    Xbox,
    Switch,
    Mobile,
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Pc => "PC",
            Platform::PlayStation => "PlayStation",
            Platform::Xbox => "Xbox",
            Platform::Switch => "Switch",
            Platform::Mobile => "Mobile",
            Platform::Other => "Other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PC" => Ok(Platform::Pc),
            "PlayStation" => Ok(Platform::PlayStation),
            "Xbox" => Ok(Platform::Xbox),
            "Switch" => Ok(Platform::Switch),
            "Mobile" => Ok(Platform::Mobile),
            "Other" => Ok(Platform::Other),
            other => Err(LibraryError::UnknownValue {
                kind: "platform",
                value: other.to_string(),
            }),
        }
    }
}

/// Which list of the tracker an entry sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameList {
    /// Imported titles always start here
    #[default]
    Backlog,
    Playing,
    Completed,
    Dropped,
    Wishlist,
}

impl GameList {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameList::Backlog => "backlog",
            GameList::Playing => "playing",
            GameList::Completed => "completed",
            GameList::Dropped => "dropped",
            GameList::Wishlist => "wishlist",
        }
    }
}

impl FromStr for GameList {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(GameList::Backlog),
            "playing" => Ok(GameList::Playing),
            "completed" => Ok(GameList::Completed),
            "dropped" => Ok(GameList::Dropped),
            "wishlist" => Ok(GameList::Wishlist),
            other => Err(LibraryError::UnknownValue {
                kind: "list",
                value: other.to_string(),
            }),
        }
    }
}

/// How well a PC title is expected to run on a handheld
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityTier {
    Verified,
    Playable,
    Unsupported,
    Borked,
    #[default]
    Unknown,
}

impl CompatibilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityTier::Verified => "verified",
            CompatibilityTier::Playable => "playable",
            CompatibilityTier::Unsupported => "unsupported",
            CompatibilityTier::Borked => "borked",
            CompatibilityTier::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CompatibilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompatibilityTier {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verified" => Ok(CompatibilityTier::Verified),
            "playable" => Ok(CompatibilityTier::Playable),
            "unsupported" => Ok(CompatibilityTier::Unsupported),
            "borked" => Ok(CompatibilityTier::Borked),
            "unknown" => Ok(CompatibilityTier::Unknown),
            other => Err(LibraryError::UnknownValue {
                kind: "compatibility tier",
                value: other.to_string(),
            }),
        }
    }
}

/// A stored library entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRecord {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub platform: Platform,
    pub genres: Vec<String>,
    pub list: GameList,
    pub cover_image_url: Option<String>,
    pub release_date: Option<String>,
    pub estimated_playtime_hours: Option<u32>,
    pub external_app_id: Option<u32>,
    pub compatibility: CompatibilityTier,
}

/// A record about to be created; the partition assigns the ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLibraryRecord {
    pub title: String,
    pub platform: Platform,
    pub genres: Vec<String>,
    pub list: GameList,
    pub cover_image_url: Option<String>,
    pub release_date: Option<String>,
    pub estimated_playtime_hours: Option<u32>,
    pub external_app_id: Option<u32>,
    pub compatibility: CompatibilityTier,
}

impl NewLibraryRecord {
    /// Backlog entry with nothing but a title and platform
    pub fn new(title: impl Into<String>, platform: Platform) -> Self {
        Self {
            title: title.into(),
            platform,
            genres: Vec::new(),
            list: GameList::Backlog,
            cover_image_url: None,
            release_date: None,
            estimated_playtime_hours: None,
            external_app_id: None,
            compatibility: CompatibilityTier::Unknown,
        }
    }

    pub fn with_app_id(mut self, app_id: u32) -> Self {
        self.external_app_id = Some(app_id);
        self
    }
}
