//! Torznab CLI - query Jackett-style proxies and Torznab trackers.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use torznab_client::{
    categories, BookSearch, CallContext, Capabilities, Client, ClientConfig, GenericSearch,
    MovieSearch, MusicSearch, SearchRequest, TorznabItem, TvSearch, DEFAULT_TIMEOUT_SECS,
};

/// Torznab search client
#[derive(Parser)]
#[command(name = "torznab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Proxy base URL, or the tracker's Torznab API root with --direct
    #[arg(long, global = true, env = "TORZNAB_HOST", default_value = "http://localhost:9117")]
    host: String,

    /// API key
    #[arg(short = 'k', long, global = true, env = "TORZNAB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Talk to a single tracker instead of a proxy
    #[arg(long, global = true)]
    direct: bool,

    /// HTTP Basic username
    #[arg(long, global = true, env = "TORZNAB_USER")]
    user: Option<String>,

    /// HTTP Basic password
    #[arg(long, global = true, env = "TORZNAB_PASS", hide_env_values = true)]
    pass: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Per-request timeout in seconds
    #[arg(short, long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one or more indexers
    Search(SearchArgs),

    /// List configured indexers
    Indexers {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show capabilities
    Caps {
        /// Indexer id (proxy mode only)
        #[arg(short, long)]
        indexer: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Download an enclosure
    Download {
        /// Enclosure URL
        url: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    #[arg(default_value = "")]
    query: String,

    /// Search function
    #[arg(long, default_value = "search")]
    kind: KindArg,

    /// Indexers to search (comma-separated, proxy mode only)
    #[arg(short, long, value_delimiter = ',')]
    indexer: Option<Vec<String>>,

    /// Categories as ids or names, e.g. 5000,tv/hd
    #[arg(short, long, value_delimiter = ',')]
    cat: Vec<String>,

    /// Maximum number of results requested from the upstream
    #[arg(long)]
    limit: Option<u32>,

    /// Result offset
    #[arg(long)]
    offset: Option<u32>,

    /// Season number (tv)
    #[arg(long)]
    season: Option<u32>,

    /// Episode number (tv)
    #[arg(long)]
    episode: Option<u32>,

    /// TheTVDB id (tv)
    #[arg(long)]
    tvdbid: Option<String>,

    /// TVmaze id (tv)
    #[arg(long)]
    tvmazeid: Option<String>,

    /// TVRage id (tv)
    #[arg(long)]
    rid: Option<String>,

    /// IMDb id (tv, movie)
    #[arg(long)]
    imdbid: Option<String>,

    /// TMDb id (movie)
    #[arg(long)]
    tmdbid: Option<String>,

    /// Artist (music)
    #[arg(long)]
    artist: Option<String>,

    /// Album (music)
    #[arg(long)]
    album: Option<String>,

    /// Record label (music)
    #[arg(long)]
    label: Option<String>,

    /// Track title (music)
    #[arg(long)]
    track: Option<String>,

    /// Author (book)
    #[arg(long)]
    author: Option<String>,

    /// Book title (book)
    #[arg(long)]
    title: Option<String>,

    /// Genre (movie, music, book)
    #[arg(long)]
    genre: Option<String>,

    /// Release year (movie, music, book)
    #[arg(long)]
    year: Option<u32>,

    /// Maximum number of results to display
    #[arg(short = 'n', long, default_value = "20")]
    max: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Search,
    Tv,
    Movie,
    Music,
    Book,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

/// Serializable summary of one result.
#[derive(Serialize)]
struct ItemOutput<'a> {
    title: &'a str,
    indexer: &'a str,
    size: i64,
    seeders: i32,
    peers: i32,
    freeleech: bool,
    categories: &'a [String],
    link: &'a str,
    magnet: &'a str,
}

impl<'a> From<&'a TorznabItem> for ItemOutput<'a> {
    fn from(item: &'a TorznabItem) -> Self {
        Self {
            title: item.title(),
            indexer: &item.raw().indexer.name,
            size: item.size_bytes(),
            seeders: item.seeders(),
            peers: item.peers(),
            freeleech: item.is_freeleech(),
            categories: item.categories(),
            link: item.link(),
            magnet: item.magnet_url(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { "torznab_client=debug,info" } else { "warn" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = Client::new(build_config(&cli))?;

    match cli.command {
        Commands::Search(args) => run_search(&client, args).await,
        Commands::Indexers { format } => list_indexers(&client, format).await,
        Commands::Caps { indexer, format } => show_caps(&client, indexer.as_deref(), format).await,
        Commands::Download { url, output } => download(&client, &url, output).await,
    }
}

fn build_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::new(&cli.host)
        .with_direct_mode(cli.direct)
        .with_verify_tls(!cli.insecure)
        .with_timeout(cli.timeout);

    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key);
    }
    if let (Some(user), Some(pass)) = (&cli.user, &cli.pass) {
        config = config.with_basic_auth(user, pass);
    }
    config
}

fn build_request(args: &SearchArgs) -> Result<SearchRequest> {
    let categories = args
        .cat
        .iter()
        .map(|c| categories::parse(c).with_context(|| format!("Unknown category '{}'", c)))
        .collect::<Result<Vec<u32>>>()?;

    reject_unsupported_flags(args)?;

    let query = args.query.clone();
    let request: SearchRequest = match args.kind {
        KindArg::Search => GenericSearch::new(query).into(),
        KindArg::Tv => TvSearch {
            query,
            tvdb_id: args.tvdbid.clone(),
            tvmaze_id: args.tvmazeid.clone(),
            rage_id: args.rid.clone(),
            imdb_id: args.imdbid.clone(),
            season: args.season,
            episode: args.episode,
            ..Default::default()
        }
        .into(),
        KindArg::Movie => MovieSearch {
            query,
            imdb_id: args.imdbid.clone(),
            tmdb_id: args.tmdbid.clone(),
            genre: args.genre.clone(),
            year: args.year,
            ..Default::default()
        }
        .into(),
        KindArg::Music => MusicSearch {
            query,
            artist: args.artist.clone(),
            album: args.album.clone(),
            label: args.label.clone(),
            track: args.track.clone(),
            genre: args.genre.clone(),
            year: args.year,
            ..Default::default()
        }
        .into(),
        KindArg::Book => BookSearch {
            query,
            author: args.author.clone(),
            title: args.title.clone(),
            genre: args.genre.clone(),
            year: args.year,
            ..Default::default()
        }
        .into(),
    };

    Ok(with_paging(request, categories, args.limit, args.offset))
}

/// Fails when a field flag is set that the chosen kind does not send.
fn reject_unsupported_flags(args: &SearchArgs) -> Result<()> {
    let flags: [(&str, bool, &[KindArg]); 15] = [
        ("--season", args.season.is_some(), &[KindArg::Tv]),
        ("--episode", args.episode.is_some(), &[KindArg::Tv]),
        ("--tvdbid", args.tvdbid.is_some(), &[KindArg::Tv]),
        ("--tvmazeid", args.tvmazeid.is_some(), &[KindArg::Tv]),
        ("--rid", args.rid.is_some(), &[KindArg::Tv]),
        ("--imdbid", args.imdbid.is_some(), &[KindArg::Tv, KindArg::Movie]),
        ("--tmdbid", args.tmdbid.is_some(), &[KindArg::Movie]),
        ("--artist", args.artist.is_some(), &[KindArg::Music]),
        ("--album", args.album.is_some(), &[KindArg::Music]),
        ("--label", args.label.is_some(), &[KindArg::Music]),
        ("--track", args.track.is_some(), &[KindArg::Music]),
        ("--author", args.author.is_some(), &[KindArg::Book]),
        ("--title", args.title.is_some(), &[KindArg::Book]),
        ("--genre", args.genre.is_some(), &[KindArg::Movie, KindArg::Music, KindArg::Book]),
        ("--year", args.year.is_some(), &[KindArg::Movie, KindArg::Music, KindArg::Book]),
    ];

    let unsupported: Vec<&str> = flags
        .iter()
        .filter(|(_, set, kinds)| *set && !kinds.contains(&args.kind))
        .map(|(name, _, _)| *name)
        .collect();

    if !unsupported.is_empty() {
        bail!(
            "{} not supported by --kind {}",
            unsupported.join(", "),
            args.kind.to_possible_value().map_or("?".to_string(), |v| v.get_name().to_string())
        );
    }
    Ok(())
}

fn with_paging(
    request: SearchRequest,
    categories: Vec<u32>,
    limit: Option<u32>,
    offset: Option<u32>,
) -> SearchRequest {
    macro_rules! apply {
        ($s:ident) => {{
            $s.categories = categories;
            $s.limit = limit;
            $s.offset = offset;
        }};
    }

    let mut request = request;
    match &mut request {
        SearchRequest::Generic(s) => apply!(s),
        SearchRequest::Tv(s) => apply!(s),
        SearchRequest::Movie(s) => apply!(s),
        SearchRequest::Music(s) => apply!(s),
        SearchRequest::Book(s) => apply!(s),
    }
    request
}

async fn run_search(client: &Client, args: SearchArgs) -> Result<()> {
    let request = build_request(&args)?;
    let ctx = CallContext::background();

    let items: Vec<TorznabItem> = match &args.indexer {
        Some(indexers) if !indexers.is_empty() => {
            let futures = indexers.iter().map(|indexer| {
                let request = request.clone();
                let ctx = &ctx;
                async move {
                    match client.search_indexer_ctx(ctx, indexer, request).await {
                        Ok(rss) => Some(rss.into_torznab_items()),
                        Err(e) => {
                            warn!("Indexer {} failed: {}", indexer, e);
                            None
                        }
                    }
                }
            });
            join_all(futures).await.into_iter().flatten().flatten().collect()
        }
        _ => client.search_ctx(&ctx, request).await?.into_torznab_items(),
    };

    let shown: Vec<&TorznabItem> = items.iter().take(args.max).collect();

    match args.format {
        OutputFormat::Text => {
            println!(
                "\nSearch results for \"{}\" ({} results):\n",
                args.query,
                items.len()
            );

            for (i, item) in shown.iter().enumerate() {
                println!("{}. {}", i + 1, item.title());
                if !item.raw().indexer.name.is_empty() {
                    println!("   Indexer: {}", item.raw().indexer.name);
                }
                println!(
                    "   Size: {} | Seeders: {} | Peers: {}{}",
                    format_size(item.size_bytes()),
                    item.seeders(),
                    item.peers(),
                    if item.is_freeleech() { " | Freeleech" } else { "" }
                );
                let names: Vec<&str> = item
                    .categories()
                    .iter()
                    .map(|c| categories::name_of(c).unwrap_or(c.as_str()))
                    .collect();
                if !names.is_empty() {
                    println!("   Categories: {}", names.join(", "));
                }
                if !item.link().is_empty() {
                    println!("   Link: {}", item.link());
                }
                println!();
            }
        }
        OutputFormat::Json => {
            let output: Vec<ItemOutput> = shown.iter().map(|i| ItemOutput::from(*i)).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Compact => {
            for item in shown {
                println!("{}\t{}\t{}", item.seeders(), item.title(), item.link());
            }
        }
    }

    Ok(())
}

async fn list_indexers(client: &Client, format: OutputFormat) -> Result<()> {
    let indexers = client.indexers().await?;

    match format {
        OutputFormat::Text => {
            println!("Configured indexers:\n");
            for indexer in indexers.items() {
                println!("  {:<20} - {} ({})", indexer.id, indexer.title, indexer.kind);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&indexers)?),
        OutputFormat::Compact => {
            for indexer in indexers.items() {
                println!("{}\t{}", indexer.id, indexer.title);
            }
        }
    }

    Ok(())
}

async fn show_caps(client: &Client, indexer: Option<&str>, format: OutputFormat) -> Result<()> {
    let caps = match indexer {
        Some(indexer) => client.indexer_caps(indexer).await?,
        None => client.caps().await?,
    };

    match format {
        OutputFormat::Text => print_caps(&caps),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&caps)?),
        OutputFormat::Compact => {
            for mode in caps.searching.iter().filter(|m| m.available) {
                println!("{}\t{}", mode.name, mode.supported_params.join(","));
            }
            for indexer in &caps.indexers {
                println!("{}\t{}", indexer.id, indexer.title);
            }
        }
    }

    Ok(())
}

fn print_caps(caps: &Capabilities) {
    if let Some(server) = &caps.server {
        println!("Server: {} {}", server.title, server.version);
    }
    if let Some(limits) = &caps.limits {
        println!(
            "Limits: default {} / max {}",
            limits.default.map_or("-".to_string(), |v| v.to_string()),
            limits.max.map_or("-".to_string(), |v| v.to_string())
        );
    }
    if !caps.searching.is_empty() {
        println!("\nSearch functions:");
        for mode in &caps.searching {
            println!(
                "  {:<14} {:<4} {}",
                mode.name,
                if mode.available { "yes" } else { "no" },
                mode.supported_params.join(",")
            );
        }
    }
    if !caps.categories.is_empty() {
        println!("\nCategories:");
        for cat in &caps.categories {
            println!("  {:<6} {}", cat.id, cat.name);
            for sub in &cat.subcategories {
                println!("    {:<6} {}", sub.id, sub.name);
            }
        }
    }
    if !caps.indexers.is_empty() {
        println!("\nIndexers:");
        for indexer in &caps.indexers {
            println!("  {:<20} - {}", indexer.id, indexer.title);
        }
    }
}

async fn download(client: &Client, url: &str, output: Option<PathBuf>) -> Result<()> {
    let ctx = CallContext::with_timeout(Duration::from_secs(client.config().timeout.max(1) * 2));
    let body = client.enclosure_ctx(&ctx, url).await?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &body)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Saved {} bytes to {}", body.len(), path.display());
        }
        None => std::io::stdout().write_all(&body)?,
    }

    Ok(())
}

fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes.max(0) as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}
