//! kwcluster CLI
//!
//! Inspect and manage the keyword-cluster cache, and run the relay server.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kwcluster_cache::ClusterCache;
use kwcluster_core::constants::DEFAULT_RELAY_PORT;
use kwcluster_core::types::{keyword_count, normalize_domain, ClusterGroup};
use kwcluster_core::{keyword_signature, Clock, SystemClock};
use kwcluster_relay::{RelayConfig, RelayServer};
use kwcluster_store::FileStore;

/// kwcluster - keyword-cluster cache and dashboard relays
#[derive(Parser, Debug)]
#[command(name = "kwcluster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the durable cache
    #[arg(long, global = true, env = "KWCLUSTER_CACHE_DIR", default_value = ".kwcluster")]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the signature of a keyword set
    Signature {
        /// Keywords (order and case are ignored)
        #[arg(required = true)]
        keywords: Vec<String>,
    },

    /// Print cached clusters for a domain
    Get {
        /// Domain to look up
        domain: String,
        /// Signature the clusters must have been built from
        #[arg(short, long)]
        signature: String,
    },

    /// Store clusters for a domain
    Put {
        /// Domain to store under
        domain: String,
        /// JSON file containing an array of {parentId, childIds}
        #[arg(short, long)]
        file: PathBuf,
        /// Signature of the keyword set
        #[arg(short, long, required_unless_present = "keywords", conflicts_with = "keywords")]
        signature: Option<String>,
        /// Keywords to derive the signature from
        #[arg(short, long, num_args = 1.., value_delimiter = ',')]
        keywords: Option<Vec<String>>,
    },

    /// List live cache entries
    Inspect,

    /// Delete the whole cache
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the relay server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_RELAY_PORT)]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "kwcluster=debug,info"
    } else {
        "kwcluster=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    debug!(cache_dir = %cli.cache_dir.display(), "Using cache directory");

    match cli.command {
        Commands::Signature { keywords } => cmd_signature(&keywords),
        Commands::Get { domain, signature } => cmd_get(&cli.cache_dir, &domain, &signature),
        Commands::Put {
            domain,
            file,
            signature,
            keywords,
        } => cmd_put(&cli.cache_dir, &domain, &file, signature, keywords),
        Commands::Inspect => cmd_inspect(&cli.cache_dir),
        Commands::Clear { yes } => cmd_clear(&cli.cache_dir, yes),
        Commands::Serve { port, bind } => cmd_serve(&cli.cache_dir, port, &bind).await,
    }
}

fn open_cache(dir: &Path) -> ClusterCache<FileStore> {
    ClusterCache::new(FileStore::new(dir))
}

/// Compute a keyword-set signature
fn cmd_signature(keywords: &[String]) -> Result<()> {
    println!("{}", keyword_signature(keywords));
    Ok(())
}

/// Print cached clusters
fn cmd_get(dir: &Path, domain: &str, signature: &str) -> Result<()> {
    let domain = parse_domain(domain)?;
    match open_cache(dir).load(&domain, signature) {
        Some(clusters) => {
            println!("{}", serde_json::to_string_pretty(&clusters)?);
            Ok(())
        }
        None => bail!("No cached clusters for {}", domain),
    }
}

/// Store clusters
fn cmd_put(
    dir: &Path,
    domain: &str,
    file: &Path,
    signature: Option<String>,
    keywords: Option<Vec<String>>,
) -> Result<()> {
    let domain = parse_domain(domain)?;
    let signature = resolve_signature(signature, keywords)?;
    let clusters = read_clusters(file)?;

    let cache = open_cache(dir);
    let groups = clusters.len();
    let total = keyword_count(&clusters);
    cache.save(&domain, &signature, clusters);

    // The cache swallows write failures, so read back to report them.
    if cache.load(&domain, &signature).is_none() {
        bail!("cache did not accept the entry (see logs with --verbose)");
    }

    println!(
        "{} {} ({} groups, {} keywords)",
        "Cached".green().bold(),
        domain,
        groups,
        total
    );
    println!("   {} {}", "Signature:".dimmed(), signature);
    Ok(())
}

/// Cache keys are the trimmed, lowercased domain.
fn parse_domain(raw: &str) -> Result<String> {
    match normalize_domain(raw) {
        Some(domain) => Ok(domain),
        None => bail!("domain must not be empty"),
    }
}

fn resolve_signature(signature: Option<String>, keywords: Option<Vec<String>>) -> Result<String> {
    match (signature, keywords) {
        (Some(signature), _) => Ok(signature),
        (None, Some(keywords)) => Ok(keyword_signature(&keywords)),
        (None, None) => bail!("either --signature or --keywords is required"),
    }
}

fn read_clusters(file: &Path) -> Result<Vec<ClusterGroup>> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid cluster JSON in {}", file.display()))
}

/// List live entries
fn cmd_inspect(dir: &Path) -> Result<()> {
    let cache = open_cache(dir);
    let entries = cache.entries();
    let stats = cache.stats();

    println!(
        "{} {}/{} domains ({} expired)",
        "Cluster cache:".cyan().bold(),
        stats.live_entries,
        stats.capacity,
        stats.expired_entries
    );

    let now = SystemClock.now_ms();
    for (domain, entry) in entries {
        let cached_at = chrono::DateTime::from_timestamp_millis(entry.cached_at as i64)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| entry.cached_at.to_string());
        println!(
            "   {} {} groups, cached {} ({}m ago), sig {}",
            domain.green(),
            entry.clusters.len(),
            cached_at.dimmed(),
            entry.age_ms(now) / 60_000,
            short_signature(&entry.signature)
        );
    }
    Ok(())
}

fn short_signature(signature: &str) -> &str {
    signature.get(..12).unwrap_or(signature)
}

/// Delete the cache slot
fn cmd_clear(dir: &Path, yes: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!("Delete the cluster cache in {}?", dir.display()))
            .default(false)
            .interact()?;

    if !confirmed {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    open_cache(dir).clear();
    println!("{}", "Cluster cache cleared.".green());
    Ok(())
}

/// Run relay server
async fn cmd_serve(dir: &Path, port: u16, bind: &str) -> Result<()> {
    println!("{}", "Starting kwcluster relay...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let mut config = RelayConfig::from_env().context("Invalid relay configuration")?;
    config.cache_dir = dir.to_path_buf();

    let server = RelayServer::new(config).context("Failed to initialise relay")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    server.run(addr).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_put_requires_signature_or_keywords() {
        let result = Cli::try_parse_from(["kwcluster", "put", "example.com", "--file", "c.json"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "kwcluster", "put", "example.com", "--file", "c.json", "--keywords", "seo,rank tracker",
        ])
        .unwrap();
        match cli.command {
            Commands::Put { keywords, signature, .. } => {
                assert!(signature.is_none());
                assert_eq!(keywords.unwrap(), vec!["seo".to_string(), "rank tracker".to_string()]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_signature_from_keywords() {
        let sig = resolve_signature(None, Some(vec!["b".into(), "a".into()])).unwrap();
        assert_eq!(sig, keyword_signature(["a", "b"]));
        assert_eq!(resolve_signature(Some("given".into()), None).unwrap(), "given");
    }

    #[test]
    fn test_put_then_get_through_file_cache() {
        let dir = tempfile::tempdir().unwrap();
        let clusters_path = dir.path().join("clusters.json");
        std::fs::write(&clusters_path, r#"[{"parentId":1,"childIds":[2,3]}]"#).unwrap();

        let cache_dir = dir.path().join("cache");
        cmd_put(&cache_dir, "example.com", &clusters_path, Some("sig".into()), None).unwrap();

        let clusters = open_cache(&cache_dir).load("example.com", "sig").unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].child_ids.len(), 2);
    }

    #[test]
    fn test_get_miss_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_get(dir.path(), "example.com", "sig").unwrap_err();
        assert_eq!(err.to_string(), "No cached clusters for example.com");
    }

    #[test]
    fn test_domains_are_normalized_at_the_edge() {
        let dir = tempfile::tempdir().unwrap();
        let clusters_path = dir.path().join("clusters.json");
        std::fs::write(&clusters_path, r#"[{"parentId":"kw-1","childIds":[]}]"#).unwrap();

        let cache_dir = dir.path().join("cache");
        cmd_put(&cache_dir, "  Example.COM ", &clusters_path, Some("sig".into()), None).unwrap();

        assert!(open_cache(&cache_dir).load("example.com", "sig").is_some());
        cmd_get(&cache_dir, "EXAMPLE.com", "sig").unwrap();
    }

    #[test]
    fn test_blank_domain_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_get(dir.path(), "   ", "sig").is_err());
        assert!(parse_domain("").is_err());
    }

    #[test]
    fn test_read_clusters_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_clusters(&path).is_err());
    }

    #[test]
    fn test_short_signature() {
        assert_eq!(short_signature("abcdef0123456789"), "abcdef012345");
        assert_eq!(short_signature("abc"), "abc");
    }
}
