//! Typed access to Torznab extension attributes.
//!
//! Each result item carries an open list of `name=value` attributes, where
//! names may repeat (`tag`, `category`). [`AttributeIndex`] groups them by
//! name, keeping wire order, and [`TorznabItem`] layers typed accessors on
//! top. Missing or malformed attributes never produce errors: numeric
//! accessors fall back to zero and the volume factors to `1.0`.

use std::collections::HashMap;

use crate::models::{RawAttr, RawItem};

/// Attribute name to its values in wire order.
///
/// Every name present on the item has exactly one entry, and its value list
/// is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeIndex {
    values: HashMap<String, Vec<String>>,
}

impl AttributeIndex {
    /// Groups attributes by name.
    pub fn from_attrs(attrs: &[RawAttr]) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for attr in attrs {
            values
                .entry(attr.name.clone())
                .or_default()
                .push(attr.value.clone());
        }
        Self { values }
    }

    /// First value for `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values for `name`, empty if absent.
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over the distinct attribute names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the item has no attributes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read-only typed view over one decoded result item.
#[derive(Debug, Clone, PartialEq)]
pub struct TorznabItem {
    item: RawItem,
    attributes: AttributeIndex,
}

impl From<RawItem> for TorznabItem {
    fn from(item: RawItem) -> Self {
        Self::new(item)
    }
}

impl TorznabItem {
    /// Wraps a raw item, indexing its attributes.
    pub fn new(item: RawItem) -> Self {
        let attributes = AttributeIndex::from_attrs(&item.attrs);
        Self { item, attributes }
    }

    /// The underlying decoded item.
    pub fn raw(&self) -> &RawItem {
        &self.item
    }

    /// The attribute index.
    pub fn attributes(&self) -> &AttributeIndex {
        &self.attributes
    }

    // -- RSS fields --

    /// Item title.
    pub fn title(&self) -> &str {
        &self.item.title
    }

    /// Item GUID.
    pub fn guid(&self) -> &str {
        &self.item.guid
    }

    /// Download link.
    pub fn link(&self) -> &str {
        &self.item.link
    }

    /// Details page URL.
    pub fn comments(&self) -> &str {
        &self.item.comments
    }

    /// Publication date as sent (RFC 2822).
    pub fn pub_date(&self) -> &str {
        &self.item.pub_date
    }

    /// Item description.
    pub fn description(&self) -> &str {
        &self.item.description
    }

    /// The raw `<size>` text.
    pub fn size(&self) -> &str {
        &self.item.size
    }

    /// Enclosure URL, usually the .torrent download.
    pub fn enclosure_url(&self) -> &str {
        &self.item.enclosure.url
    }

    /// Id of the proxy indexer that produced the item.
    pub fn indexer_id(&self) -> &str {
        &self.item.indexer.id
    }

    /// Size in bytes from `<size>`, the `size` attribute or the enclosure
    /// length, whichever parses first.
    pub fn size_bytes(&self) -> i64 {
        [
            self.item.size.as_str(),
            self.attr("size"),
            self.item.enclosure.length.as_str(),
        ]
        .into_iter()
        .find_map(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0)
    }

    // -- generic accessors --

    /// First value of `name`, or `""`.
    pub fn attr(&self, name: &str) -> &str {
        self.attributes.first(name).unwrap_or("")
    }

    /// Every value of `name` in wire order.
    pub fn attr_values(&self, name: &str) -> &[String] {
        self.attributes.values(name)
    }

    /// First value of `name` as an `i32`, or 0.
    pub fn attr_int(&self, name: &str) -> i32 {
        self.parsed(name).unwrap_or(0)
    }

    /// First value of `name` as an `i64`, or 0.
    pub fn attr_i64(&self, name: &str) -> i64 {
        self.parsed(name).unwrap_or(0)
    }

    /// First value of `name` as an `f64`, or 0.0.
    pub fn attr_float(&self, name: &str) -> f64 {
        self.parsed(name).unwrap_or(0.0)
    }

    fn parsed<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.attributes.first(name)?.trim().parse().ok()
    }

    /// First non-empty value among `names`, checked in order.
    fn attr_fallback(&self, names: &[&str]) -> &str {
        names
            .iter()
            .map(|name| self.attr(name))
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    // -- peers --

    /// The `seeders` attribute, or 0.
    pub fn seeders(&self) -> i32 {
        self.attr_int("seeders")
    }

    /// The `leechers` attribute, or 0.
    pub fn leechers(&self) -> i32 {
        self.attr_int("leechers")
    }

    /// The `peers` attribute, or seeders + leechers when absent.
    pub fn peers(&self) -> i32 {
        if self.attributes.contains("peers") {
            return self.attr_int("peers");
        }
        self.seeders().saturating_add(self.leechers())
    }

    /// The `grabs` attribute, falling back to the RSS `<grabs>` field.
    pub fn grabs(&self) -> i32 {
        self.parsed("grabs")
            .or_else(|| self.item.grabs.trim().parse().ok())
            .unwrap_or(0)
    }

    /// The `files` attribute, falling back to the RSS `<files>` field.
    pub fn files(&self) -> i32 {
        self.parsed("files")
            .or_else(|| self.item.files.trim().parse().ok())
            .unwrap_or(0)
    }

    // -- torrent identity --

    /// Torrent info hash (`infohash`).
    pub fn info_hash(&self) -> &str {
        self.attr("infohash")
    }

    /// Magnet link (`magneturl`).
    pub fn magnet_url(&self) -> &str {
        self.attr("magneturl")
    }

    // -- tracker policy --

    /// Download volume factor; `1.0` when absent or unparseable.
    pub fn download_volume_factor(&self) -> f64 {
        self.parsed("downloadvolumefactor").unwrap_or(1.0)
    }

    /// Upload volume factor; `1.0` when absent or unparseable.
    pub fn upload_volume_factor(&self) -> f64 {
        self.parsed("uploadvolumefactor").unwrap_or(1.0)
    }

    /// True if downloads don't count against ratio.
    pub fn is_freeleech(&self) -> bool {
        let zero_factor = self
            .parsed::<f64>("downloadvolumefactor")
            .is_some_and(|f| f == 0.0);
        zero_factor || self.has_tag("freeleech")
    }

    /// Minimum ratio the tracker requires (`minimumratio`).
    pub fn minimum_ratio(&self) -> f64 {
        self.attr_float("minimumratio")
    }

    /// Minimum seed time in seconds.
    pub fn minimum_seed_time(&self) -> i64 {
        self.attr_i64("minimumseedtime")
    }

    // -- TV --

    /// TheTVDB id.
    pub fn tvdb_id(&self) -> &str {
        self.attr("tvdbid")
    }

    /// TVmaze id.
    pub fn tvmaze_id(&self) -> &str {
        self.attr("tvmazeid")
    }

    /// TVRage id (`rageid`).
    pub fn rage_id(&self) -> &str {
        self.attr("rageid")
    }

    /// Season number.
    pub fn season(&self) -> i32 {
        self.attr_int("season")
    }

    /// Episode number (`episode`).
    pub fn episode(&self) -> i32 {
        self.attr_int("episode")
    }

    // -- movies --

    /// IMDB id from `imdbid`, falling back to the legacy `imdb` name.
    pub fn imdb_id(&self) -> &str {
        self.attr_fallback(&["imdbid", "imdb"])
    }

    /// TMDb id.
    pub fn tmdb_id(&self) -> &str {
        self.attr("tmdbid")
    }

    /// Release year.
    pub fn year(&self) -> i32 {
        self.attr_int("year")
    }

    /// Genre.
    pub fn genre(&self) -> &str {
        self.attr("genre")
    }

    // -- media quality --

    /// Video resolution.
    pub fn resolution(&self) -> &str {
        self.attr("resolution")
    }

    /// Video codec.
    pub fn video(&self) -> &str {
        self.attr("video")
    }

    /// Audio codec.
    pub fn audio(&self) -> &str {
        self.attr("audio")
    }

    /// Spoken language.
    pub fn language(&self) -> &str {
        self.attr("language")
    }

    /// Subtitle languages (`subs`).
    pub fn subtitles(&self) -> &str {
        self.attr("subs")
    }

    /// Cover image URL (`coverurl`).
    pub fn cover_url(&self) -> &str {
        self.attr("coverurl")
    }

    // -- music --

    /// Artist.
    pub fn artist(&self) -> &str {
        self.attr("artist")
    }

    /// Album.
    pub fn album(&self) -> &str {
        self.attr("album")
    }

    /// Record label.
    pub fn label(&self) -> &str {
        self.attr("label")
    }

    // -- books --

    /// Author.
    pub fn author(&self) -> &str {
        self.attr("author")
    }

    /// Book title (`booktitle`).
    pub fn book_title(&self) -> &str {
        self.attr("booktitle")
    }

    /// Publisher.
    pub fn publisher(&self) -> &str {
        self.attr("publisher")
    }

    // -- tags and categories --

    /// Every `tag` value in wire order.
    pub fn tags(&self) -> &[String] {
        self.attr_values("tag")
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// `category` attribute values, or the RSS categories when there are none.
    pub fn categories(&self) -> &[String] {
        let from_attrs = self.attr_values("category");
        if from_attrs.is_empty() {
            &self.item.categories
        } else {
            from_attrs
        }
    }
}
