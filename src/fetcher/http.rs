use crate::config::FetchConfig;
use crate::constants::PINNED_CLIENT_CACHE;
use crate::error::FetchError;
use crate::fetcher::{Fetcher, ScratchFile};
use crate::models::{FetchedPayload, FormatTag, ValidatedUrl};
use crate::utils;
use crate::validator::UrlPolicy;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};

/// HTTP(S) fetcher with a byte cap, a wall-clock deadline and SSRF checks on
/// every redirect hop
pub struct HttpFetcher {
    config: FetchConfig,
    policy: Arc<UrlPolicy>,
    client: reqwest::Client,
    pinned: Mutex<HashMap<String, PinnedClient>>,
}

/// Client whose DNS for one host is fixed to addresses that passed the policy
struct PinnedClient {
    addrs: Vec<SocketAddr>,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig, policy: Arc<UrlPolicy>) -> Result<Self, FetchError> {
        let client = Self::client_builder(&config)
            .build()
            .map_err(|e| FetchError::Transport {
                detail: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            config,
            policy,
            client,
            pinned: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Redirects are followed by `download`, one checked hop at a time
    fn client_builder(config: &FetchConfig) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("docpull/", env!("CARGO_PKG_VERSION")))
    }

    /// Pick the client for one hop, resolving and vetting the host first when
    /// DNS checks are on
    async fn client_for(&self, url: &ValidatedUrl) -> Result<reqwest::Client, FetchError> {
        if !self.config.resolve_dns {
            return Ok(self.client.clone());
        }
        let addrs = self.policy.verify_resolved(url).await?;
        if url.host().parse::<IpAddr>().is_ok() {
            return Ok(self.client.clone());
        }
        self.pinned_client(url.host(), &addrs)
    }

    /// Reuse the pinned client for `host` while it resolves to the same set
    fn pinned_client(&self, host: &str, addrs: &[SocketAddr]) -> Result<reqwest::Client, FetchError> {
        let mut key = addrs.to_vec();
        key.sort();

        let mut pinned = self.pinned.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = pinned.get(host) {
            if entry.addrs == key {
                return Ok(entry.client.clone());
            }
        }

        let client = Self::client_builder(&self.config)
            .resolve_to_addrs(host, addrs)
            .build()
            .map_err(|e| FetchError::Transport {
                detail: format!("Failed to build HTTP client: {}", e),
            })?;

        if pinned.len() >= PINNED_CLIENT_CACHE && !pinned.contains_key(host) {
            tracing::debug!("pinned client cache full, clearing {} entries", pinned.len());
            pinned.clear();
        }
        pinned.insert(
            host.to_string(),
            PinnedClient {
                addrs: key,
                client: client.clone(),
            },
        );
        Ok(client)
    }

    /// Resolve a `Location` against the current hop and run it through the policy
    fn next_hop(&self, current: &ValidatedUrl, location: &str) -> Result<ValidatedUrl, FetchError> {
        let next = current
            .as_url()
            .join(location)
            .map_err(|e| FetchError::Transport {
                detail: format!("invalid redirect location: {}", e),
            })?;
        self.policy.validate(next.as_str()).map_err(|reason| {
            tracing::warn!("redirect from {} refused: {}", current, reason);
            FetchError::Blocked(reason)
        })
    }

    async fn download(&self, url: &ValidatedUrl) -> Result<FetchedPayload, FetchError> {
        let mut current = url.clone();
        let mut hops = 0usize;
        let mut response = loop {
            let client = self.client_for(&current).await?;
            let response = client
                .get(current.as_url().clone())
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            if !response.status().is_redirection() {
                break response;
            }
            let location = match response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
                Some(location) => location,
                None => break response,
            };
            if hops >= self.config.max_redirects {
                tracing::warn!("GET {} exceeded {} redirects", url, self.config.max_redirects);
                return Err(FetchError::Transport {
                    detail: format!("too many redirects (max {})", self.config.max_redirects),
                });
            }
            current = self.next_hop(&current, location)?;
            hops += 1;
            tracing::debug!("following redirect {} to {}", hops, current);
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("GET {} returned HTTP {}", current, status.as_u16());
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
            });
        }

        let max = self.config.max_file_size;
        if let Some(declared) = response.content_length() {
            if declared > max {
                tracing::warn!("Content-Length {} exceeds limit {}", declared, max);
                return Err(FetchError::PayloadTooLarge { limit: max });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let declared_extension = utils::declared_extension(url.as_url(), content_type.as_deref());

        let suffix = declared_extension
            .as_deref()
            .and_then(FormatTag::from_extension)
            .map(|f| f.extension());
        let mut scratch = ScratchFile::create(&self.config.scratch_dir(), suffix)?;

        // Content-Length can be missing or wrong, so the cap is enforced per chunk
        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    scratch.discard();
                    return Err(self.transport_error(e));
                }
            };
            if scratch.written() + chunk.len() as u64 > max {
                tracing::warn!(
                    "download of {} exceeded {} bytes, aborting",
                    url,
                    max
                );
                scratch.discard();
                return Err(FetchError::PayloadTooLarge { limit: max });
            }
            if let Err(e) = scratch.write(&chunk).await {
                scratch.discard();
                return Err(e.into());
            }
        }

        let (bytes, path) = scratch.finish().await?;
        tracing::info!(
            "Downloaded file: {} bytes, extension: {}",
            bytes.len(),
            declared_extension.as_deref().unwrap_or("none")
        );

        Ok(FetchedPayload::new(bytes, declared_extension, content_type, path))
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            return FetchError::Timeout {
                secs: self.config.request_timeout_secs,
            };
        }
        tracing::error!("Download error: {}", err);
        FetchError::Transport {
            detail: err.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<FetchedPayload, FetchError> {
        // Dropping the download future on timeout also drops its scratch file
        match tokio::time::timeout(self.config.timeout(), self.download(url)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("GET {} timed out", url);
                Err(FetchError::Timeout {
                    secs: self.config.request_timeout_secs,
                })
            }
        }
    }
}
