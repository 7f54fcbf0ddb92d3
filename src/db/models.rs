//! Database Models - typed entities stored in the document collections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::normalize::{id_or_new, timestamp};
use super::repository::Entity;

/// Text keyed by language code (`en`, `hr`, `de`, ...). No language is required.
pub type Localized = BTreeMap<String, String>;

/// Freeform nested content (arbitrary multilingual structure).
pub type Content = Map<String, Value>;

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

fn default_true() -> bool {
    true
}

// ============================================================================
// Blog
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
        }
    }
}

pub const DEFAULT_AUTHOR: &str = "SyncBeds Team";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: Localized,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Localized,
    #[serde(default)]
    pub content: Localized,
    pub category: String,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: BlogStatus,
    pub author: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for BlogPost {
    const COLLECTION: &'static str = "blog_posts";
    const LABEL: &'static str = "Blog post";

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub section_type: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub content: Content,
}

/// Section as supplied by a client; `id` is optional.
#[derive(Debug, Deserialize)]
pub struct SectionInput {
    #[serde(default)]
    pub id: Option<String>,
    pub section_type: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub visible: bool,
    pub content: Content,
}

impl TryFrom<SectionInput> for Section {
    type Error = String;

    fn try_from(input: SectionInput) -> Result<Self, Self::Error> {
        let section_type = input.section_type.trim();
        if section_type.is_empty() {
            return Err("section_type must not be empty".to_string());
        }
        Ok(Section {
            id: id_or_new(input.id),
            section_type: section_type.to_string(),
            order: input.order,
            visible: input.visible,
            content: input.content,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub slug: String,
    pub title: Localized,
    #[serde(default)]
    pub meta_description: Option<Localized>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default)]
    pub is_system_page: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Page {
    const COLLECTION: &'static str = "pages";
    const LABEL: &'static str = "Page";

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

// ============================================================================
// Menus
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkTarget {
    #[default]
    #[serde(rename = "_self")]
    SameWindow,
    #[serde(rename = "_blank")]
    NewWindow,
}

/// Nesting depth and cycle-freedom of `children`/`parent_id` are the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: Localized,
    pub url: String,
    #[serde(default)]
    pub target: LinkTarget,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
pub struct MenuItemInput {
    #[serde(default)]
    pub id: Option<String>,
    pub label: Localized,
    pub url: String,
    #[serde(default)]
    pub target: LinkTarget,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuItemInput>,
}

impl From<MenuItemInput> for MenuItem {
    fn from(input: MenuItemInput) -> Self {
        MenuItem {
            id: id_or_new(input.id),
            label: input.label,
            url: input.url,
            target: input.target,
            order: input.order,
            visible: input.visible,
            parent_id: input.parent_id,
            children: input.children.into_iter().map(MenuItem::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Menu {
    const COLLECTION: &'static str = "menus";
    const LABEL: &'static str = "Menu";

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

// ============================================================================
// Testimonials & FAQs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub company: String,
    pub location: String,
    pub text: Localized,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Testimonial {
    const COLLECTION: &'static str = "testimonials";
    const LABEL: &'static str = "Testimonial";

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

pub const DEFAULT_FAQ_CATEGORY: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub id: String,
    pub question: Localized,
    pub answer: Localized,
    pub category: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Faq {
    const COLLECTION: &'static str = "faqs";
    const LABEL: &'static str = "FAQ";

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

// ============================================================================
// Generic CMS content
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Page,
    Section,
    Faq,
    Testimonial,
    Pricing,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Page => "page",
            ContentType::Section => "section",
            ContentType::Faq => "faq",
            ContentType::Testimonial => "testimonial",
            ContentType::Pricing => "pricing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsContent {
    pub id: String,
    pub content_type: ContentType,
    pub key: String,
    #[serde(default)]
    pub content: Content,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for CmsContent {
    const COLLECTION: &'static str = "cms_content";
    const LABEL: &'static str = "Content";

    fn last_updated(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_at)
    }
}

// ============================================================================
// Contact & newsletter
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Entity for ContactMessage {
    const COLLECTION: &'static str = "contact_messages";
    const LABEL: &'static str = "Message";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub id: String,
    pub email: String,
    #[serde(with = "timestamp")]
    pub subscribed_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Entity for NewsletterSubscription {
    const COLLECTION: &'static str = "newsletter_subscriptions";
    const LABEL: &'static str = "Email";
}
