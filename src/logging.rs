//! Logging init: structured events to stderr, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,docpull=debug";

/// Install the global subscriber. Safe to call twice; the second call is a no-op.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .try_init();
}

/// Shorten a URL for log lines
pub fn truncate_for_log(url: &str) -> &str {
    match url.char_indices().nth(crate::constants::LOG_URL_MAX_CHARS) {
        Some((idx, _)) => &url[..idx],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_url() {
        assert_eq!(truncate_for_log("https://example.com/a.pdf"), "https://example.com/a.pdf");
    }

    #[test]
    fn test_truncate_long_url() {
        let url = format!("https://example.com/{}", "é".repeat(200));
        let short = truncate_for_log(&url);
        assert_eq!(short.chars().count(), 100);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
