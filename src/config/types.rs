use serde::Deserialize;

/// Browser-like user agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.12; rv:55.0) Gecko/20100101 Firefox/55.0";

/// Suffixes skipped when no `skip-extensions` setting is given
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".ico", ".zip", ".ods", ".odt",
    ".xls", ".p7m", ".rar", ".mp3", ".xml", ".7z", ".exe",
];

/// Lower bound of the per-page timeout, in seconds
pub const MIN_PAGE_TIMEOUT: u64 = 5;

/// Upper bound of the per-page timeout, in seconds
pub const MAX_PAGE_TIMEOUT: u64 = 300;

/// Main settings structure for Burrow
///
/// Mirrors the user-facing configuration surface. Every field has a default,
/// so an empty TOML document is a valid settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Record linked PDF documents as scraped pages
    pub ingest_pdf: bool,

    /// Drop discovered URLs that carry GET parameters
    pub skip_get_params: bool,

    /// Prefer the rendering fetch strategy when a backend is available
    pub use_rich_fetch: bool,

    /// Retry pages without links through the rendering fetch strategy
    pub rich_fetch_fallback: bool,

    /// Honor robots.txt directives
    pub follow_robots_txt: bool,

    /// Maximum hops from a seed URL (-1 = unlimited)
    pub max_depth: i64,

    /// Maximum number of pages to visit (-1 = unlimited)
    pub max_pages: i64,

    /// Comma-separated extra domains that are crawled recursively
    pub allowed_extra_roots: String,

    /// Number of concurrent fetch workers
    pub max_workers: u32,

    /// Chunk size handed to the ingestion service
    pub chunk_size: u32,

    /// Chunk overlap handed to the ingestion service
    pub chunk_overlap: u32,

    /// Comma-separated URL suffixes that are never fetched
    pub skip_extensions: String,

    /// Per-page fetch timeout (seconds, clamped to [5, 300])
    pub page_timeout: u64,

    /// Seconds the engine waits for any in-flight page before giving up
    pub stall_timeout: u64,

    /// Minimum milliseconds between two progress notifications
    pub notify_interval_ms: u64,

    /// User agent sent with every request and matched against robots.txt
    pub user_agent: String,

    /// Command run by the scheduler (empty = no scheduled run)
    pub scheduled_command: String,

    /// UTC hour of the scheduled run
    pub schedule_hour: u32,

    /// UTC minute of the scheduled run
    pub schedule_minute: u32,

    /// Ingestion service settings
    pub ingest: IngestSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ingest_pdf: false,
            skip_get_params: false,
            use_rich_fetch: false,
            rich_fetch_fallback: false,
            follow_robots_txt: false,
            max_depth: -1,
            max_pages: -1,
            allowed_extra_roots: String::new(),
            max_workers: 1,
            chunk_size: 512,
            chunk_overlap: 128,
            skip_extensions: String::new(),
            page_timeout: 30,
            stall_timeout: 10,
            notify_interval_ms: 500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scheduled_command: String::new(),
            schedule_hour: 3,
            schedule_minute: 0,
            ingest: IngestSettings::default(),
        }
    }
}

impl Settings {
    /// Returns the extra root domains as a list of trimmed entries
    pub fn extra_roots(&self) -> Vec<String> {
        split_list(&self.allowed_extra_roots)
    }

    /// Returns the skip extensions, lowercased and dot-prefixed
    ///
    /// Falls back to [`DEFAULT_SKIP_EXTENSIONS`] when the setting is empty.
    pub fn skip_extension_list(&self) -> Vec<String> {
        let configured = split_list(&self.skip_extensions);
        if configured.is_empty() {
            return DEFAULT_SKIP_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect();
        }

        configured
            .into_iter()
            .map(|ext| {
                let ext = ext.to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect()
    }

    /// Returns the page timeout clamped to [`MIN_PAGE_TIMEOUT`, `MAX_PAGE_TIMEOUT`]
    pub fn clamped_page_timeout(&self) -> u64 {
        self.page_timeout.clamp(MIN_PAGE_TIMEOUT, MAX_PAGE_TIMEOUT)
    }

    /// Returns the scheduled command, if one is configured
    pub fn scheduled_command(&self) -> Option<&str> {
        let command = self.scheduled_command.trim();
        (!command.is_empty()).then_some(command)
    }
}

/// Ingestion service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IngestSettings {
    /// Endpoint receiving ingestion requests (no ingestion when unset)
    pub endpoint: Option<String>,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
