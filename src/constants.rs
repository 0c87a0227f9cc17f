/// Constants used throughout docpull
/// Policy values that are fixed at build time live here, not in settings.toml

/// URL schemes the fetcher is allowed to follow
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Hosts that are never fetched, compared case-insensitively
pub const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "0.0.0.0",
    "::1",
    "169.254.169.254", // cloud metadata endpoint
];

/// Maximum accepted URL length in characters
pub const MAX_URL_LENGTH: usize = 2048;

/// Extensions the service can extract, in the order advertised by `GET /`
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".csv", ".txt"];

/// Default maximum download size (50 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Default wall-clock budget for one download, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default redirect hop limit
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Buffer size used when streaming a response body to scratch storage
pub const STREAM_CHUNK_SIZE: usize = 8 * 1024;

/// Prefix of scratch files, handy when cleaning up a crashed host by hand
pub const SCRATCH_PREFIX: &str = "docpull-";

/// How much of a URL is echoed into logs
pub const LOG_URL_MAX_CHARS: usize = 100;

/// Hosts whose DNS-pinned HTTP client is kept for reuse
pub const PINNED_CLIENT_CACHE: usize = 64;

/// Largest inflated `word/document.xml` a DOCX may carry (4x the default download cap)
pub const MAX_DOCX_PART_SIZE: u64 = 4 * DEFAULT_MAX_FILE_SIZE;
