use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devmart_core::ProjectId;

/// Project difficulty tier shown in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A catalog item: one purchasable digital asset.
///
/// Read-mostly from the storefront's perspective; admins create and edit,
/// buyers browse. `downloads` is the aggregate counter bumped best-effort
/// after each purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    /// Price in the smallest currency unit.
    pub price: u64,
    pub description: String,
    pub long_description: String,
    pub category: String,
    pub tech_stack: Vec<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    /// License type sold with the project (e.g. "Commercial").
    pub license: String,
    pub difficulty: Difficulty,
    pub images: Vec<String>,
    pub rating: f64,
    pub downloads: u64,
    pub version: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an admin supplies when creating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub title: String,
    pub price: u64,
    pub description: String,
    pub long_description: String,
    pub category: String,
    pub tech_stack: Vec<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub license: String,
    pub difficulty: Difficulty,
    pub images: Vec<String>,
    pub version: String,
    #[serde(default)]
    pub featured: bool,
}

impl ProjectDraft {
    /// Materialize the draft into a full record with fresh id, zeroed
    /// counters, and current timestamps.
    pub fn into_project(self, now: DateTime<Utc>) -> Project {
        Project {
            id: ProjectId::new(),
            title: self.title,
            price: self.price,
            description: self.description,
            long_description: self.long_description,
            category: self.category,
            tech_stack: self.tech_stack,
            tags: self.tags,
            features: self.features,
            demo_url: self.demo_url,
            github_url: self.github_url,
            license: self.license,
            difficulty: self.difficulty,
            images: self.images,
            rating: 0.0,
            downloads: 0,
            version: self.version,
            featured: self.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update an admin applies to a project; `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
