//! Typed Torznab search requests.
//!
//! Each search kind maps onto the protocol's `t=` discriminator and its own
//! set of wire keys. [`SearchRequest::to_params`] emits only the fields that
//! are set, plus `apikey` when one is configured.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SearchParams;

/// The protocol search function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Free-text search.
    #[default]
    Search,
    Tv,
    Movie,
    Music,
    Book,
}

impl SearchKind {
    /// Value of the `t` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Tv => "tvsearch",
            Self::Movie => "movie",
            Self::Music => "music",
            Self::Book => "book",
        }
    }

    /// Element name advertising this function in a `<caps>` document.
    pub fn caps_name(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Tv => "tv-search",
            Self::Movie => "movie-search",
            Self::Music => "music-search",
            Self::Book => "book-search",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Setters shared by every search kind.
macro_rules! common_setters {
    ($ty:ty) => {
        impl $ty {
            /// Restricts results to the given category ids.
            pub fn with_categories(mut self, categories: impl IntoIterator<Item = u32>) -> Self {
                self.categories = categories.into_iter().collect();
                self
            }

            /// Sets the maximum number of results.
            pub fn with_limit(mut self, limit: u32) -> Self {
                self.limit = Some(limit);
                self
            }

            /// Sets the result offset.
            pub fn with_offset(mut self, offset: u32) -> Self {
                self.offset = Some(offset);
                self
            }

            /// Asks for every extension attribute.
            pub fn with_extended(mut self, extended: bool) -> Self {
                self.extended = extended;
                self
            }
        }
    };
}

fn push_common(
    params: &mut SearchParams,
    query: &str,
    categories: &[u32],
    limit: Option<u32>,
    offset: Option<u32>,
    extended: bool,
) {
    params.insert_non_empty("q", query);
    if !categories.is_empty() {
        let cat = categories
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        params.insert("cat", cat);
    }
    params.insert_opt("limit", limit);
    params.insert_opt("offset", offset);
    if extended {
        params.insert("extended", "1");
    }
}

/// Free-text search (`t=search`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericSearch {
    /// Free-text query (`q`); omitted when empty.
    pub query: String,
    /// Category ids (`cat`, comma-joined).
    pub categories: Vec<u32>,
    /// Maximum number of results (`limit`).
    pub limit: Option<u32>,
    /// Result offset (`offset`).
    pub offset: Option<u32>,
    /// Request every attribute (`extended=1`).
    pub extended: bool,
}

impl GenericSearch {
    /// Creates a search for the given query; every other field is unset.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    fn write(&self, params: &mut SearchParams) {
        push_common(params, &self.query, &self.categories, self.limit, self.offset, self.extended);
    }
}

common_setters!(GenericSearch);

/// TV search (`t=tvsearch`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TvSearch {
    /// Free-text query (`q`); omitted when empty.
    pub query: String,
    /// TheTVDB id (`tvdbid`).
    pub tvdb_id: Option<String>,
    /// TVmaze id (`tvmazeid`).
    pub tvmaze_id: Option<String>,
    /// TVRage id (`rid`).
    pub rage_id: Option<String>,
    /// IMDb id (`imdbid`), e.g. "tt1160419".
    pub imdb_id: Option<String>,
    /// Season number (`season`).
    pub season: Option<u32>,
    /// Episode number (`ep`).
    pub episode: Option<u32>,
    /// Category ids (`cat`, comma-joined).
    pub categories: Vec<u32>,
    /// Maximum number of results (`limit`).
    pub limit: Option<u32>,
    /// Result offset (`offset`).
    pub offset: Option<u32>,
    /// Request every attribute (`extended=1`).
    pub extended: bool,
}

impl TvSearch {
    /// Creates a search for the given query; every other field is unset.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Sets the TheTVDB id.
    pub fn with_tvdb_id(mut self, id: impl Into<String>) -> Self {
        self.tvdb_id = Some(id.into());
        self
    }

    /// Sets the TVmaze id.
    pub fn with_tvmaze_id(mut self, id: impl Into<String>) -> Self {
        self.tvmaze_id = Some(id.into());
        self
    }

    /// Sets the TVRage id.
    pub fn with_rage_id(mut self, id: impl Into<String>) -> Self {
        self.rage_id = Some(id.into());
        self
    }

    /// Sets the IMDb id.
    pub fn with_imdb_id(mut self, id: impl Into<String>) -> Self {
        self.imdb_id = Some(id.into());
        self
    }

    /// Sets the season number.
    pub fn with_season(mut self, season: u32) -> Self {
        self.season = Some(season);
        self
    }

    /// Sets the episode number.
    pub fn with_episode(mut self, episode: u32) -> Self {
        self.episode = Some(episode);
        self
    }

    fn write(&self, params: &mut SearchParams) {
        push_common(params, &self.query, &self.categories, self.limit, self.offset, self.extended);
        params.insert_opt("tvdbid", self.tvdb_id.as_deref());
        params.insert_opt("tvmazeid", self.tvmaze_id.as_deref());
        params.insert_opt("rid", self.rage_id.as_deref());
        params.insert_opt("imdbid", self.imdb_id.as_deref());
        params.insert_opt("season", self.season);
        params.insert_opt("ep", self.episode);
    }
}

common_setters!(TvSearch);

/// Movie search (`t=movie`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieSearch {
    /// Free-text query (`q`); omitted when empty.
    pub query: String,
    /// IMDb id (`imdbid`), e.g. "tt1160419".
    pub imdb_id: Option<String>,
    /// TMDb id (`tmdbid`).
    pub tmdb_id: Option<String>,
    /// Genre (`genre`).
    pub genre: Option<String>,
    /// Release year (`year`).
    pub year: Option<u32>,
    /// Category ids (`cat`, comma-joined).
    pub categories: Vec<u32>,
    /// Maximum number of results (`limit`).
    pub limit: Option<u32>,
    /// Result offset (`offset`).
    pub offset: Option<u32>,
    /// Request every attribute (`extended=1`).
    pub extended: bool,
}

impl MovieSearch {
    /// Creates a search for the given query; every other field is unset.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Sets the IMDb id.
    pub fn with_imdb_id(mut self, id: impl Into<String>) -> Self {
        self.imdb_id = Some(id.into());
        self
    }

    /// Sets the TMDb id.
    pub fn with_tmdb_id(mut self, id: impl Into<String>) -> Self {
        self.tmdb_id = Some(id.into());
        self
    }

    /// Sets the genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Sets the release year.
    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    fn write(&self, params: &mut SearchParams) {
        push_common(params, &self.query, &self.categories, self.limit, self.offset, self.extended);
        params.insert_opt("imdbid", self.imdb_id.as_deref());
        params.insert_opt("tmdbid", self.tmdb_id.as_deref());
        params.insert_opt("genre", self.genre.as_deref());
        params.insert_opt("year", self.year);
    }
}

common_setters!(MovieSearch);

/// Music search (`t=music`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicSearch {
    /// Free-text query (`q`); omitted when empty.
    pub query: String,
    /// Artist name (`artist`).
    pub artist: Option<String>,
    /// Album title (`album`).
    pub album: Option<String>,
    /// Record label (`label`).
    pub label: Option<String>,
    /// Track title (`track`).
    pub track: Option<String>,
    /// Genre (`genre`).
    pub genre: Option<String>,
    /// Release year (`year`).
    pub year: Option<u32>,
    /// Category ids (`cat`, comma-joined).
    pub categories: Vec<u32>,
    /// Maximum number of results (`limit`).
    pub limit: Option<u32>,
    /// Result offset (`offset`).
    pub offset: Option<u32>,
    /// Request every attribute (`extended=1`).
    pub extended: bool,
}

impl MusicSearch {
    /// Creates a search for the given query; every other field is unset.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Sets the artist.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Sets the album.
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Sets the record label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the track title.
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    /// Sets the genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Sets the release year.
    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    fn write(&self, params: &mut SearchParams) {
        push_common(params, &self.query, &self.categories, self.limit, self.offset, self.extended);
        params.insert_opt("artist", self.artist.as_deref());
        params.insert_opt("album", self.album.as_deref());
        params.insert_opt("label", self.label.as_deref());
        params.insert_opt("track", self.track.as_deref());
        params.insert_opt("genre", self.genre.as_deref());
        params.insert_opt("year", self.year);
    }
}

common_setters!(MusicSearch);

/// Book search (`t=book`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSearch {
    /// Free-text query (`q`); omitted when empty.
    pub query: String,
    /// Author (`author`).
    pub author: Option<String>,
    /// Book title (`title`).
    pub title: Option<String>,
    /// Genre (`genre`).
    pub genre: Option<String>,
    /// Release year (`year`).
    pub year: Option<u32>,
    /// Category ids (`cat`, comma-joined).
    pub categories: Vec<u32>,
    /// Maximum number of results (`limit`).
    pub limit: Option<u32>,
    /// Result offset (`offset`).
    pub offset: Option<u32>,
    /// Request every attribute (`extended=1`).
    pub extended: bool,
}

impl BookSearch {
    /// Creates a search for the given query; every other field is unset.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the book title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Sets the release year.
    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }

    fn write(&self, params: &mut SearchParams) {
        push_common(params, &self.query, &self.categories, self.limit, self.offset, self.extended);
        params.insert_opt("author", self.author.as_deref());
        params.insert_opt("title", self.title.as_deref());
        params.insert_opt("genre", self.genre.as_deref());
        params.insert_opt("year", self.year);
    }
}

common_setters!(BookSearch);

/// A search of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchRequest {
    #[serde(rename = "search")]
    Generic(GenericSearch),
    Tv(TvSearch),
    Movie(MovieSearch),
    Music(MusicSearch),
    Book(BookSearch),
}

impl SearchRequest {
    /// The protocol function this request invokes.
    pub fn kind(&self) -> SearchKind {
        match self {
            Self::Generic(_) => SearchKind::Search,
            Self::Tv(_) => SearchKind::Tv,
            Self::Movie(_) => SearchKind::Movie,
            Self::Music(_) => SearchKind::Music,
            Self::Book(_) => SearchKind::Book,
        }
    }

    /// Builds the wire parameters. Unset fields are omitted.
    pub fn to_params(&self, api_key: Option<&str>) -> SearchParams {
        let mut params = SearchParams::new();
        params.insert("t", self.kind().as_str());

        match self {
            Self::Generic(s) => s.write(&mut params),
            Self::Tv(s) => s.write(&mut params),
            Self::Movie(s) => s.write(&mut params),
            Self::Music(s) => s.write(&mut params),
            Self::Book(s) => s.write(&mut params),
        }

        params.insert_opt("apikey", api_key);
        params
    }
}

impl From<GenericSearch> for SearchRequest {
    fn from(s: GenericSearch) -> Self {
        Self::Generic(s)
    }
}

impl From<TvSearch> for SearchRequest {
    fn from(s: TvSearch) -> Self {
        Self::Tv(s)
    }
}

impl From<MovieSearch> for SearchRequest {
    fn from(s: MovieSearch) -> Self {
        Self::Movie(s)
    }
}

impl From<MusicSearch> for SearchRequest {
    fn from(s: MusicSearch) -> Self {
        Self::Music(s)
    }
}

impl From<BookSearch> for SearchRequest {
    fn from(s: BookSearch) -> Self {
        Self::Book(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_kind_wire_values() {
        assert_eq!(SearchKind::Search.as_str(), "search");
        assert_eq!(SearchKind::Tv.as_str(), "tvsearch");
        assert_eq!(SearchKind::Movie.as_str(), "movie");
        assert_eq!(SearchKind::Music.as_str(), "music");
        assert_eq!(SearchKind::Book.as_str(), "book");
        assert_eq!(SearchKind::Tv.caps_name(), "tv-search");
        assert_eq!(SearchKind::default(), SearchKind::Search);
    }

    #[test]
    fn test_generic_minimal() {
        let params = SearchRequest::from(GenericSearch::new("ubuntu")).to_params(None);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("t"), Some("search"));
        assert_eq!(params.get("q"), Some("ubuntu"));
    }

    #[test]
    fn test_generic_common_fields() {
        let request = GenericSearch::new("ubuntu")
            .with_categories([5000, 5040])
            .with_limit(50)
            .with_offset(100)
            .with_extended(true);
        let params = SearchRequest::from(request).to_params(Some("key"));
        assert_eq!(params.get("cat"), Some("5000,5040"));
        assert_eq!(params.get("limit"), Some("50"));
        assert_eq!(params.get("offset"), Some("100"));
        assert_eq!(params.get("extended"), Some("1"));
        assert_eq!(params.get("apikey"), Some("key"));
    }

    #[test]
    fn test_empty_query_omitted() {
        let params = SearchRequest::from(TvSearch::new("").with_tvdb_id("280619")).to_params(None);
        assert!(!params.contains_key("q"));
        assert_eq!(params.get("tvdbid"), Some("280619"));
    }

    #[test]
    fn test_empty_api_key_omitted() {
        let params = SearchRequest::from(GenericSearch::new("x")).to_params(Some(""));
        assert!(!params.contains_key("apikey"));
    }

    #[test]
    fn test_tv_search_params() {
        let request = TvSearch::new("The Expanse")
            .with_tvdb_id("280619")
            .with_tvmaze_id("1825")
            .with_rage_id("35981")
            .with_imdb_id("tt3230854")
            .with_season(6)
            .with_episode(5)
            .with_categories([5000]);
        let params = SearchRequest::from(request).to_params(None);
        assert_eq!(params.get("t"), Some("tvsearch"));
        assert_eq!(params.get("q"), Some("The Expanse"));
        assert_eq!(params.get("tvdbid"), Some("280619"));
        assert_eq!(params.get("tvmazeid"), Some("1825"));
        assert_eq!(params.get("rid"), Some("35981"));
        assert_eq!(params.get("imdbid"), Some("tt3230854"));
        assert_eq!(params.get("season"), Some("6"));
        assert_eq!(params.get("ep"), Some("5"));
        assert_eq!(params.get("cat"), Some("5000"));
    }

    #[test]
    fn test_movie_search_params() {
        let request = MovieSearch::new("Dune")
            .with_imdb_id("tt1160419")
            .with_tmdb_id("438631")
            .with_genre("Sci-Fi")
            .with_year(2021);
        let params = SearchRequest::from(request).to_params(None);
        assert_eq!(params.get("t"), Some("movie"));
        assert_eq!(params.get("imdbid"), Some("tt1160419"));
        assert_eq!(params.get("tmdbid"), Some("438631"));
        assert_eq!(params.get("genre"), Some("Sci-Fi"));
        assert_eq!(params.get("year"), Some("2021"));
        assert!(!params.contains_key("season"));
    }

    #[test]
    fn test_music_search_params() {
        let request = MusicSearch::new("")
            .with_artist("Daft Punk")
            .with_album("Discovery")
            .with_label("Virgin")
            .with_track("One More Time")
            .with_year(2001);
        let params = SearchRequest::from(request).to_params(None);
        assert_eq!(params.get("t"), Some("music"));
        assert_eq!(params.get("artist"), Some("Daft Punk"));
        assert_eq!(params.get("album"), Some("Discovery"));
        assert_eq!(params.get("label"), Some("Virgin"));
        assert_eq!(params.get("track"), Some("One More Time"));
        assert_eq!(params.get("year"), Some("2001"));
    }

    #[test]
    fn test_book_search_params() {
        let request = BookSearch::new("dune")
            .with_author("Frank Herbert")
            .with_title("Dune");
        let params = SearchRequest::from(request).to_params(Some("abc"));
        assert_eq!(params.get("t"), Some("book"));
        assert_eq!(params.get("author"), Some("Frank Herbert"));
        assert_eq!(params.get("title"), Some("Dune"));
        assert_eq!(params.get("apikey"), Some("abc"));
        assert!(!params.contains_key("year"));
    }

    #[test]
    fn test_search_request_kind() {
        assert_eq!(SearchRequest::from(BookSearch::default()).kind(), SearchKind::Book);
        assert_eq!(SearchRequest::from(MovieSearch::default()).kind(), SearchKind::Movie);
    }

    #[test]
    fn test_search_request_deserialization() {
        let json = r#"{"kind":"tv","query":"The Expanse","season":6}"#;
        let request: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request,
            SearchRequest::Tv(TvSearch::new("The Expanse").with_season(6))
        );

        let json = r#"{"kind":"search","query":"ubuntu"}"#;
        let request: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind(), SearchKind::Search);
    }
}
