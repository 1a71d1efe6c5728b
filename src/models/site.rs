// src/models/site.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'site_settings' table (key/value pairs such as site name or contact email).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SiteSetting {
    pub key: String,
    pub value: String,
}

/// Represents the 'homepage_content' table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct HomepageSection {
    pub id: String,

    /// Slot on the homepage, e.g. "hero" or "features".
    pub section: String,
    pub title: String,
    pub body: Option<String>,
    pub sort_order: i32,
}
