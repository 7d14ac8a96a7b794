//! Resource types served by the podcast directory API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{Attribute, PrimaryKey, RelationField, Resource, ZERO_TIMESTAMP};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Podcast {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub feed: String,
    pub url: String,
    pub image_url: String,
    pub language: String,
    pub owner_name: String,
    pub owner_email: String,
    pub tags: String,
    pub published: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub latest_episode: Option<Box<Episode>>,
    pub episodes: Vec<Episode>,
}

impl Default for Podcast {
    fn default() -> Self {
        Self {
            uid: String::new(),
            title: String::new(),
            subtitle: String::new(),
            description: String::new(),
            feed: String::new(),
            url: String::new(),
            image_url: String::new(),
            language: String::new(),
            owner_name: String::new(),
            owner_email: String::new(),
            tags: String::new(),
            published: ZERO_TIMESTAMP,
            updated: None,
            latest_episode: None,
            episodes: Vec::new(),
        }
    }
}

impl Resource for Podcast {
    fn resource_type(&self) -> &str {
        "podcast"
    }

    fn primary_key(&self) -> PrimaryKey {
        self.uid.as_str().into()
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        vec![
            Attribute::new("title", &self.title),
            Attribute::new("subtitle", &self.subtitle).omit_if_empty(),
            Attribute::new("description", &self.description),
            Attribute::new("feed", &self.feed),
            Attribute::new("url", &self.url).omit_if_empty(),
            Attribute::new("image_url", &self.image_url).omit_if_empty(),
            Attribute::new("language", &self.language).omit_if_empty(),
            Attribute::new("owner_name", &self.owner_name).omit_if_empty(),
            Attribute::new("owner_email", &self.owner_email).omit_if_empty(),
            Attribute::new("tags", &self.tags).omit_if_empty(),
            Attribute::new("published", self.published),
            Attribute::new("updated", self.updated).omit_if_empty(),
        ]
    }

    fn relationships(&self) -> Vec<RelationField<'_>> {
        vec![
            RelationField::to_one("latest_episode", self.latest_episode.as_deref()),
            RelationField::to_many("episodes", &self.episodes),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub uid: String,
    pub podcast_uid: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub published: DateTime<Utc>,
}

impl Default for Episode {
    fn default() -> Self {
        Self {
            uid: String::new(),
            podcast_uid: String::new(),
            title: String::new(),
            description: String::new(),
            link: String::new(),
            author: String::new(),
            published: ZERO_TIMESTAMP,
        }
    }
}

impl Resource for Episode {
    fn resource_type(&self) -> &str {
        "episode"
    }

    fn primary_key(&self) -> PrimaryKey {
        self.uid.as_str().into()
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        vec![
            Attribute::new("title", &self.title),
            Attribute::new("link", &self.link),
            Attribute::new("description", &self.description),
            Attribute::new("author", &self.author).omit_if_empty(),
            Attribute::new("puid", &self.podcast_uid),
            Attribute::new("published", self.published),
        ]
    }
}

/// Response to a search query, with one related hit per match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub uid: String,
    pub count: i64,
    pub search_term: String,
    pub results: Vec<SearchHit>,
}

impl Resource for SearchResult {
    fn resource_type(&self) -> &str {
        "search"
    }

    fn primary_key(&self) -> PrimaryKey {
        self.uid.as_str().into()
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        vec![
            Attribute::new("count", self.count),
            Attribute::new("search_term", &self.search_term),
        ]
    }

    fn relationships(&self) -> Vec<RelationField<'_>> {
        vec![RelationField::to_many("results", &self.results)]
    }
}

/// Kind of resource a search hit points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    #[default]
    Podcast,
    Episode,
}

impl HitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitKind::Podcast => "podcast",
            HitKind::Episode => "episode",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub uid: String,
    pub kind: HitKind,
    pub title: String,
    pub description: String,
    pub url: String,
    pub feed: String,
    pub image_url: String,
    /// Relevance scaled to `0..=100`.
    pub score: i64,
    /// Publication time in epoch seconds, as stored by the search index.
    pub published: i64,
}

impl Resource for SearchHit {
    fn resource_type(&self) -> &str {
        "result"
    }

    fn primary_key(&self) -> PrimaryKey {
        self.uid.as_str().into()
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        vec![
            Attribute::new("kind", self.kind.as_str()),
            Attribute::new("title", &self.title),
            Attribute::new("description", &self.description),
            Attribute::new("url", &self.url),
            Attribute::new("feed", &self.feed),
            Attribute::new("image_url", &self.image_url),
            Attribute::new("score", self.score),
            Attribute::new("published", self.published),
        ]
    }
}

/// Index size statistics, keyed by backend version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStats {
    pub version: String,
    pub podcasts: u64,
    pub episodes: u64,
}

impl Resource for ApiStats {
    fn resource_type(&self) -> &str {
        "stats"
    }

    fn primary_key(&self) -> PrimaryKey {
        self.version.as_str().into()
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        vec![
            Attribute::new("podcasts", self.podcasts),
            Attribute::new("episodes", self.episodes),
        ]
    }
}
