//! Decoded Torznab documents.
//!
//! These mirror the wire shapes one to one. Typed access to extension
//! attributes goes through [`TorznabItem`](crate::TorznabItem).

use serde::{Deserialize, Serialize};

use crate::TorznabItem;

/// One `<torznab:attr name="..." value="..."/>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttr {
    pub name: String,
    pub value: String,
}

impl RawAttr {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The `<enclosure>` of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enclosure {
    pub url: String,
    pub length: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// The `<jackettindexer id="...">Name</jackettindexer>` element added by proxies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIndexer {
    pub id: String,
    pub name: String,
}

/// One decoded `<item>` of a result feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub guid: String,
    pub indexer: SourceIndexer,
    #[serde(rename = "type")]
    pub kind: String,
    pub comments: String,
    pub pub_date: String,
    pub size: String,
    pub files: String,
    pub grabs: String,
    pub description: String,
    pub link: String,
    /// RSS-level `<category>` values, in wire order.
    pub categories: Vec<String>,
    pub enclosure: Enclosure,
    /// Extension attributes, in wire order. Names may repeat.
    pub attrs: Vec<RawAttr>,
}

impl RawItem {
    /// Creates an item with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Appends an extension attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(RawAttr::new(name, value));
        self
    }

    /// Appends an RSS category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }
}

/// The `<channel>` of a result feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub title: String,
    pub description: String,
    pub link: String,
    /// `href` of the `<atom:link>` self reference, if present.
    pub atom_link: String,
    pub language: String,
    pub category: String,
    pub items: Vec<RawItem>,
}

/// A decoded `<rss>` result feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rss {
    pub version: String,
    pub channel: Channel,
}

impl Rss {
    /// Returns the raw items.
    pub fn items(&self) -> &[RawItem] {
        &self.channel.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.channel.items.len()
    }

    /// Returns true if the feed has no items.
    pub fn is_empty(&self) -> bool {
        self.channel.items.is_empty()
    }

    /// Wraps every item in a typed view.
    pub fn torznab_items(&self) -> Vec<TorznabItem> {
        self.channel.items.iter().cloned().map(TorznabItem::new).collect()
    }

    /// Consumes the feed, wrapping every item in a typed view.
    pub fn into_torznab_items(self) -> Vec<TorznabItem> {
        self.channel.items.into_iter().map(TorznabItem::new).collect()
    }
}

/// One `<indexer>` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indexer {
    pub id: String,
    pub configured: bool,
    pub title: String,
    pub description: String,
    pub link: String,
    pub language: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A decoded `<indexers>` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indexers {
    pub indexers: Vec<Indexer>,
}

impl Indexers {
    /// Returns the indexer records.
    pub fn items(&self) -> &[Indexer] {
        &self.indexers
    }

    /// Looks up an indexer by id.
    pub fn get(&self, id: &str) -> Option<&Indexer> {
        self.indexers.iter().find(|i| i.id == id)
    }

    /// Number of indexers.
    pub fn len(&self) -> usize {
        self.indexers.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.indexers.is_empty()
    }
}

/// `<server>` element of a capabilities document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub title: String,
    pub version: String,
}

/// `<limits>` element of a capabilities document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub default: Option<u32>,
    pub max: Option<u32>,
}

/// One search mode under `<searching>`, e.g. `<tv-search available="yes" .../>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMode {
    /// Element name: `search`, `tv-search`, `movie-search`, ...
    pub name: String,
    pub available: bool,
    pub supported_params: Vec<String>,
}

/// A `<category>` of a capabilities document, with its subcategories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsCategory {
    pub id: String,
    pub name: String,
    pub subcategories: Vec<CapsCategory>,
}

/// Result of a capability query.
///
/// Proxies answer with an `<indexers>` list; trackers answer with a
/// `<caps>` document. Whichever shape arrived is filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub indexers: Vec<Indexer>,
    pub server: Option<ServerInfo>,
    pub limits: Option<Limits>,
    pub searching: Vec<SearchMode>,
    pub categories: Vec<CapsCategory>,
}

impl Capabilities {
    /// Returns the search mode with the given element name.
    pub fn search_mode(&self, name: &str) -> Option<&SearchMode> {
        self.searching.iter().find(|m| m.name == name)
    }

    /// Returns true if the named search mode is advertised as available.
    pub fn supports(&self, name: &str) -> bool {
        self.search_mode(name).is_some_and(|m| m.available)
    }
}
