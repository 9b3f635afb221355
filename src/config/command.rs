use crate::url::{clean, domain_of, is_valid, with_protocol};

/// Word that introduces a crawl command
pub const DEFAULT_PREFIX: &str = "burrow";

/// Separator between seed URLs and fetch-only domains
const ALLOW_FLAG: &str = "--allow";

/// A parsed crawl command
///
/// `<prefix> <url1> [url2 ...] [--allow <domain1> [domain2 ...]]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlCommand {
    /// Seed URLs (with protocol); their domains become root domains
    pub seeds: Vec<String>,

    /// Domains whose pages are recorded but never recursed into
    pub allowed: Vec<String>,

    /// Tokens that were dropped because they are not valid URLs or domains
    pub rejected: Vec<String>,

    /// The command text as received
    pub text: String,
}

impl CrawlCommand {
    /// Creates a command directly from seed URLs and allowed domains
    pub fn new(seeds: Vec<String>, allowed: Vec<String>) -> Self {
        let mut text = format!("{} {}", DEFAULT_PREFIX, seeds.join(" "));
        if !allowed.is_empty() {
            text.push_str(&format!(" {} {}", ALLOW_FLAG, allowed.join(" ")));
        }

        Self {
            seeds,
            allowed,
            rejected: Vec::new(),
            text,
        }
    }

    /// Returns true if no seed survived parsing
    pub fn has_no_seeds(&self) -> bool {
        self.seeds.is_empty()
    }
}

/// Parses a crawl command
///
/// Returns `None` if the text does not start with `prefix`. Malformed tokens
/// are dropped with a warning and listed in [`CrawlCommand::rejected`]; they
/// never make the whole command fail.
///
/// # Examples
///
/// ```
/// use burrow::config::parse_command;
///
/// let cmd = parse_command("burrow example.com/docs --allow www.other.org", "burrow").unwrap();
/// assert_eq!(cmd.seeds, vec!["https://example.com/docs"]);
/// assert_eq!(cmd.allowed, vec!["other.org"]);
/// ```
pub fn parse_command(text: &str, prefix: &str) -> Option<CrawlCommand> {
    let mut tokens = text.split_whitespace();
    if tokens.next()? != prefix {
        return None;
    }

    let mut command = CrawlCommand {
        text: text.trim().to_string(),
        ..CrawlCommand::default()
    };
    let mut after_allow = false;

    for token in tokens {
        if token == ALLOW_FLAG {
            after_allow = true;
            continue;
        }

        let cleaned = clean(token);
        if !is_valid(&cleaned) {
            tracing::warn!("Ignoring invalid URL or domain in command: {}", token);
            command.rejected.push(token.to_string());
            continue;
        }

        if after_allow {
            let domain = domain_of(&cleaned);
            if !command.allowed.contains(&domain) {
                command.allowed.push(domain);
            }
        } else {
            let seed = with_protocol(&cleaned);
            if !command.seeds.contains(&seed) {
                command.seeds.push(seed);
            }
        }
    }

    Some(command)
}
