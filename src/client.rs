//! Consumer-facing Torznab client.

use std::sync::Arc;

use reqwest::{Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::address::{indexer_endpoint, redacted, resolve, API_KEY_PARAM, ALL_INDEXERS};
use crate::decode::{self, parse_api_error};
use crate::error::DecodeError;
use crate::{
    BookSearch, CallContext, Capabilities, ClientConfig, GenericSearch, Indexers, MovieSearch,
    MusicSearch, Result, RetryPolicy, Rss, SearchParams, SearchRequest, TorznabError, Transport,
    TransportFailure, TvSearch,
};

/// A Torznab client bound to one upstream.
///
/// Cheap to clone: clones share the configuration and connection pool.
///
/// Every operation has a `_ctx` variant taking a [`CallContext`]; the plain
/// variant runs without a deadline or cancellation.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    host: Url,
    transport: Transport,
}

impl Client {
    /// Validates the configuration and builds the HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let host = config.host_url()?;
        let transport = Transport::new(&config)?;

        debug!(
            "Created torznab client for {} ({} mode)",
            redacted(&host),
            if config.direct_mode { "direct" } else { "proxy" }
        );

        Ok(Self {
            config: Arc::new(config),
            host,
            transport,
        })
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.transport = self.transport.with_retry_policy(retry);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the validated host URL.
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Endpoint suffix for an indexer. Direct mode always addresses the root.
    fn endpoint_for(&self, indexer: &str) -> String {
        if self.config.direct_mode {
            String::new()
        } else {
            indexer_endpoint(indexer)
        }
    }

    fn url_for(&self, indexer: &str, params: &SearchParams) -> Result<Url> {
        resolve(
            &self.host,
            &self.endpoint_for(indexer),
            params,
            self.config.direct_mode,
        )
    }

    fn with_api_key(&self, mut params: SearchParams) -> SearchParams {
        if let Some(key) = self.config.api_key() {
            params.insert(API_KEY_PARAM, key);
        }
        params
    }

    async fn get_document(&self, ctx: &CallContext, url: Url) -> Result<String> {
        let response = self.transport.get(ctx, url.clone()).await?;
        read_document(ctx, &url, response).await
    }

    // -- indexers --

    /// Lists the configured indexers.
    pub async fn indexers(&self) -> Result<Indexers> {
        self.indexers_ctx(&CallContext::background()).await
    }

    /// [`indexers`](Self::indexers) under `ctx`.
    pub async fn indexers_ctx(&self, ctx: &CallContext) -> Result<Indexers> {
        let params = self.with_api_key(
            SearchParams::new()
                .with("t", "indexers")
                .with("configured", "true"),
        );
        let url = self.url_for(ALL_INDEXERS, &params)?;
        let body = self.get_document(ctx, url.clone()).await?;
        decode_with(&url, &body, decode::parse_indexers)
    }

    // -- raw parameter searches --

    /// Queries an indexer with caller-supplied parameters.
    ///
    /// The parameters are sent as-is, plus `apikey` when configured.
    pub async fn torrents(&self, indexer: &str, params: SearchParams) -> Result<Rss> {
        self.torrents_ctx(&CallContext::background(), indexer, params)
            .await
    }

    /// [`torrents`](Self::torrents) under `ctx`.
    pub async fn torrents_ctx(
        &self,
        ctx: &CallContext,
        indexer: &str,
        params: SearchParams,
    ) -> Result<Rss> {
        let params = self.with_api_key(params);
        let url = self.url_for(indexer, &params)?;
        debug!("Fetching torrents from {}", redacted(&url));
        let body = self.get_document(ctx, url.clone()).await?;
        decode_with(&url, &body, decode::parse_rss)
    }

    /// Like [`torrents`](Self::torrents) but sends the parameters as a POST
    /// form body.
    pub async fn torrents_form(&self, indexer: &str, params: SearchParams) -> Result<Rss> {
        self.torrents_form_ctx(&CallContext::background(), indexer, params)
            .await
    }

    /// [`torrents_form`](Self::torrents_form) under `ctx`.
    pub async fn torrents_form_ctx(
        &self,
        ctx: &CallContext,
        indexer: &str,
        params: SearchParams,
    ) -> Result<Rss> {
        let params = self.with_api_key(params);
        let url = self.url_for(indexer, &SearchParams::new())?;
        debug!("Posting search form to {}", redacted(&url));
        let response = self.transport.post_form(ctx, url.clone(), &params).await?;
        let body = read_document(ctx, &url, response).await?;
        decode_with(&url, &body, decode::parse_rss)
    }

    // -- typed searches --

    /// Runs a search against every indexer (proxy mode) or the tracker
    /// (direct mode).
    pub async fn search(&self, request: impl Into<SearchRequest>) -> Result<Rss> {
        self.search_ctx(&CallContext::background(), request).await
    }

    /// [`search`](Self::search) under `ctx`.
    pub async fn search_ctx(
        &self,
        ctx: &CallContext,
        request: impl Into<SearchRequest>,
    ) -> Result<Rss> {
        self.search_indexer_ctx(ctx, ALL_INDEXERS, request).await
    }

    /// Runs a search against a single indexer. Direct mode ignores `indexer`.
    pub async fn search_indexer(
        &self,
        indexer: &str,
        request: impl Into<SearchRequest>,
    ) -> Result<Rss> {
        self.search_indexer_ctx(&CallContext::background(), indexer, request)
            .await
    }

    /// [`search_indexer`](Self::search_indexer) under `ctx`.
    pub async fn search_indexer_ctx(
        &self,
        ctx: &CallContext,
        indexer: &str,
        request: impl Into<SearchRequest>,
    ) -> Result<Rss> {
        let request = request.into();
        debug!("Running {} search on {}", request.kind(), indexer);
        let params = request.to_params(self.config.api_key());
        self.torrents_ctx(ctx, indexer, params).await
    }

    /// Free-text search with extra raw parameters.
    ///
    /// `t` and `q` always reflect `query`; `extra` supplies everything else.
    pub async fn search_direct(&self, query: &str, extra: SearchParams) -> Result<Rss> {
        self.search_direct_ctx(&CallContext::background(), query, extra)
            .await
    }

    /// [`search_direct`](Self::search_direct) under `ctx`.
    pub async fn search_direct_ctx(
        &self,
        ctx: &CallContext,
        query: &str,
        mut extra: SearchParams,
    ) -> Result<Rss> {
        extra.insert("t", "search");
        extra.insert("q", query);
        self.torrents_ctx(ctx, ALL_INDEXERS, extra).await
    }

    /// TV search (`t=tvsearch`) against every indexer.
    pub async fn tv_search(&self, search: TvSearch) -> Result<Rss> {
        self.search(search).await
    }

    /// [`tv_search`](Self::tv_search) under `ctx`.
    pub async fn tv_search_ctx(&self, ctx: &CallContext, search: TvSearch) -> Result<Rss> {
        self.search_ctx(ctx, search).await
    }

    /// Movie search (`t=movie`) against every indexer.
    pub async fn movie_search(&self, search: MovieSearch) -> Result<Rss> {
        self.search(search).await
    }

    /// [`movie_search`](Self::movie_search) under `ctx`.
    pub async fn movie_search_ctx(&self, ctx: &CallContext, search: MovieSearch) -> Result<Rss> {
        self.search_ctx(ctx, search).await
    }

    /// Music search (`t=music`) against every indexer.
    pub async fn music_search(&self, search: MusicSearch) -> Result<Rss> {
        self.search(search).await
    }

    /// [`music_search`](Self::music_search) under `ctx`.
    pub async fn music_search_ctx(&self, ctx: &CallContext, search: MusicSearch) -> Result<Rss> {
        self.search_ctx(ctx, search).await
    }

    /// Book search (`t=book`) against every indexer.
    pub async fn book_search(&self, search: BookSearch) -> Result<Rss> {
        self.search(search).await
    }

    /// [`book_search`](Self::book_search) under `ctx`.
    pub async fn book_search_ctx(&self, ctx: &CallContext, search: BookSearch) -> Result<Rss> {
        self.search_ctx(ctx, search).await
    }

    /// Shorthand for a [`GenericSearch`].
    pub async fn query(&self, query: &str) -> Result<Rss> {
        self.search(GenericSearch::new(query)).await
    }

    // -- capabilities --

    /// Capability query against the aggregate endpoint or tracker root.
    pub async fn caps(&self) -> Result<Capabilities> {
        self.caps_ctx(&CallContext::background()).await
    }

    /// [`caps`](Self::caps) under `ctx`.
    pub async fn caps_ctx(&self, ctx: &CallContext) -> Result<Capabilities> {
        self.indexer_caps_ctx(ctx, ALL_INDEXERS).await
    }

    /// Capability query for one indexer.
    pub async fn indexer_caps(&self, indexer: &str) -> Result<Capabilities> {
        self.indexer_caps_ctx(&CallContext::background(), indexer)
            .await
    }

    /// [`indexer_caps`](Self::indexer_caps) under `ctx`.
    pub async fn indexer_caps_ctx(&self, ctx: &CallContext, indexer: &str) -> Result<Capabilities> {
        let params = self.with_api_key(SearchParams::new().with("t", "caps"));
        let url = self.url_for(indexer, &params)?;
        let body = self.get_document(ctx, url.clone()).await?;
        decode_with(&url, &body, decode::parse_capabilities)
    }

    // -- payloads --

    /// Downloads an enclosure (typically a `.torrent` file).
    ///
    /// `url` is used verbatim; only http(s) URLs are accepted.
    pub async fn enclosure(&self, url: &str) -> Result<Vec<u8>> {
        self.enclosure_ctx(&CallContext::background(), url).await
    }

    /// [`enclosure`](Self::enclosure) under `ctx`.
    pub async fn enclosure_ctx(&self, ctx: &CallContext, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TorznabError::Configuration(format!(
                "unsupported enclosure scheme: {}",
                url.scheme()
            )));
        }

        let response = self.transport.get(ctx, url.clone()).await?;
        let (status, body) = read_body(ctx, &url, response).await?;
        if !status.is_success() {
            return Err(TorznabError::UnexpectedStatus {
                url: redacted(&url),
                status: status.as_u16(),
            });
        }

        debug!("Downloaded {} bytes from {}", body.len(), redacted(&url));
        Ok(body)
    }
}

/// Reads a whole response body, racing the read against the context.
async fn read_body(ctx: &CallContext, url: &Url, response: Response) -> Result<(StatusCode, Vec<u8>)> {
    let status = response.status();
    match ctx.run(response.bytes()).await {
        Ok(Ok(body)) => Ok((status, body.to_vec())),
        Ok(Err(e)) => Err(TorznabError::Transport {
            url: redacted(url),
            attempts: 1,
            source: TransportFailure::Body(e.without_url()),
        }),
        Err(reason) => Err(TorznabError::Cancelled {
            url: redacted(url),
            reason,
        }),
    }
}

/// Reads an XML body, surfacing Torznab error documents and unexpected
/// statuses.
async fn read_document(ctx: &CallContext, url: &Url, response: Response) -> Result<String> {
    let (status, body) = read_body(ctx, url, response).await?;
    let text = match String::from_utf8(body) {
        Ok(text) => text,
        Err(_) if !status.is_success() => {
            return Err(TorznabError::UnexpectedStatus {
                url: redacted(url),
                status: status.as_u16(),
            });
        }
        Err(e) => {
            return Err(TorznabError::Decode {
                url: redacted(url),
                source: DecodeError::new(format!("response is not valid UTF-8: {}", e.utf8_error())),
            });
        }
    };

    if text.contains("<error") {
        if let Some(err) = parse_api_error(&text) {
            return Err(TorznabError::Api {
                url: redacted(url),
                code: err.code,
                description: err.description,
            });
        }
    }

    if !status.is_success() {
        return Err(TorznabError::UnexpectedStatus {
            url: redacted(url),
            status: status.as_u16(),
        });
    }

    Ok(text)
}

fn decode_with<T>(
    url: &Url,
    body: &str,
    parse: fn(&str) -> std::result::Result<T, DecodeError>,
) -> Result<T> {
    parse(body).map_err(|source| TorznabError::Decode {
        url: redacted(url),
        source,
    })
}
