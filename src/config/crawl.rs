use crate::config::command::CrawlCommand;
use crate::config::types::Settings;
use crate::url::{domain_of, parse_seed};
use std::collections::HashSet;
use std::time::Duration;

/// Immutable configuration of one crawl run
///
/// Built once per invocation from the user settings and the parsed command.
/// Domain sets hold domain keys as produced by [`domain_of`].
#[derive(Debug, Clone)]
pub struct CrawlConfiguration {
    /// Domains crawled recursively
    pub root_domains: HashSet<String>,

    /// Domains whose pages are recorded but whose links are never followed
    pub allowed_domains: HashSet<String>,

    /// Path prefixes a root-domain URL must start with (empty = any path)
    pub allowed_paths: HashSet<String>,

    /// Maximum hops from a seed (`None` = unlimited)
    pub max_depth: Option<u32>,

    /// Maximum size of the visited set (`None` = unlimited)
    pub max_pages: Option<usize>,

    /// Number of concurrent workers
    pub max_workers: usize,

    pub ingest_pdf: bool,
    pub skip_get_params: bool,

    /// Lowercase, dot-prefixed suffixes that are never fetched
    pub skip_extensions: Vec<String>,

    pub follow_robots_txt: bool,

    /// Per-request timeout
    pub page_timeout: Duration,

    /// How long the engine waits for any completion before declaring a stall
    pub stall_timeout: Duration,

    pub use_rich_fetch: bool,
    pub rich_fetch_fallback: bool,

    /// Rendering wait used when retrying a page that yielded no links
    pub render_wait: Duration,

    pub user_agent: String,

    /// Minimum spacing between progress notifications
    pub notify_interval: Duration,
}

impl CrawlConfiguration {
    /// Builds the per-run configuration
    ///
    /// - Root domains: the domains of all seeds plus `allowed-extra-roots`
    /// - Allowed domains: the `--allow` domains that are not already roots
    /// - Allowed paths: the path (or `/`) of every seed
    pub fn from_command(settings: &Settings, command: &CrawlCommand) -> Self {
        let mut config = Self::from_settings(settings);

        for seed in &command.seeds {
            match parse_seed(seed) {
                Ok(url) => {
                    config.root_domains.insert(domain_of(url.as_str()));
                    let path = url.path();
                    let path = if path.is_empty() { "/" } else { path };
                    config.allowed_paths.insert(path.to_string());
                }
                Err(e) => {
                    tracing::debug!("Seed {} not used for scope: {}", seed, e);
                }
            }
        }

        for root in settings.extra_roots() {
            config.root_domains.insert(domain_of(&root));
        }

        for domain in &command.allowed {
            let domain = domain_of(domain);
            if !config.root_domains.contains(&domain) {
                config.allowed_domains.insert(domain);
            }
        }

        config
    }

    /// Builds a configuration with empty scope from user settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            root_domains: HashSet::new(),
            allowed_domains: HashSet::new(),
            allowed_paths: HashSet::new(),
            max_depth: u32::try_from(settings.max_depth).ok(),
            max_pages: usize::try_from(settings.max_pages).ok(),
            max_workers: settings.max_workers.max(1) as usize,
            ingest_pdf: settings.ingest_pdf,
            skip_get_params: settings.skip_get_params,
            skip_extensions: settings.skip_extension_list(),
            follow_robots_txt: settings.follow_robots_txt,
            page_timeout: Duration::from_secs(settings.clamped_page_timeout()),
            stall_timeout: Duration::from_secs(settings.stall_timeout.max(1)),
            use_rich_fetch: settings.use_rich_fetch,
            rich_fetch_fallback: settings.rich_fetch_fallback,
            render_wait: Duration::from_secs(3),
            user_agent: settings.user_agent.clone(),
            notify_interval: Duration::from_millis(settings.notify_interval_ms),
        }
    }

    /// Returns true if an item at `depth` may be submitted
    pub fn depth_permits(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }
}

impl Default for CrawlConfiguration {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
