//! Automation and bot detection from the User-Agent header.
//!
//! Two rules, both must hold for a client to count as human:
//! - no automation signature (crawlers, command-line tools, HTTP libraries,
//!   headless browsers)
//! - the string is plausibly a mainstream browser (longer than a bare token and
//!   carrying the `Mozilla` compatibility prefix)

use regex::RegexSet;
use std::sync::LazyLock;

/// Shortest User-Agent length that can belong to a real browser.
const MIN_PLAUSIBLE_LENGTH: usize = 10;

/// Compatibility token sent by every mainstream browser.
const BROWSER_TOKEN: &str = "Mozilla";

static AUTOMATION_SIGNATURES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        // Crawlers
        r"(?i)bot",
        r"(?i)crawler",
        r"(?i)crawling",
        r"(?i)spider",
        r"(?i)scraper",
        // Command-line tools
        r"(?i)curl",
        r"(?i)wget",
        // HTTP client libraries
        r"(?i)python",
        r"(?i)java",
        r"(?i)go-http",
        r"(?i)axios",
        r"(?i)fetch",
        // Headless and driven browsers
        r"(?i)headless",
        r"(?i)phantomjs",
        r"(?i)puppeteer",
        r"(?i)playwright",
        r"(?i)selenium",
    ])
    .expect("automation signature patterns are valid")
});

/// Returns true if the User-Agent matches any known automation signature.
pub fn matches_automation_signature(user_agent: &str) -> bool {
    AUTOMATION_SIGNATURES.is_match(user_agent)
}

/// Returns true if the User-Agent looks like a mainstream browser.
pub fn is_plausible_browser(user_agent: &str) -> bool {
    user_agent.len() > MIN_PLAUSIBLE_LENGTH && user_agent.contains(BROWSER_TOKEN)
}

/// Security check: no automation signature and a plausible browser string.
pub fn is_human_client(user_agent: &str) -> bool {
    !matches_automation_signature(user_agent) && is_plausible_browser(user_agent)
}
