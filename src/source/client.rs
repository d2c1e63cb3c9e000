//! HTTP client for the upstream listings.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::source::{DocumentSource, FetchError, SourceKind};
use crate::utils::{fmt_duration, log_if_slow};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const TIZ_REFERER: &str = "https://cyclingtiz.live/";
const SLOW_FETCH: Duration = Duration::from_secs(5);

/// Fetches raw listing documents. Responses are gzip-decoded transparently.
pub struct SourceClient {
    http: reqwest::Client,
    tiz_url: Url,
    schedule_url: Url,
}

impl SourceClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.fetch_timeout)
            .gzip(true)
            .build()
            .context("Failed to build reqwest client")?;

        let tiz_url = Url::parse(&config.tiz_url).context("Invalid TIZ_URL")?;
        let mut schedule_url = Url::parse(&config.schedule_url).context("Invalid SCHEDULE_URL")?;
        if let Some(timezone) = config.timezone.as_deref().filter(|tz| !tz.is_empty()) {
            schedule_url
                .query_pairs_mut()
                .append_pair("timezone", timezone);
        }

        Ok(Self {
            http,
            tiz_url,
            schedule_url,
        })
    }

    pub fn url(&self, kind: SourceKind) -> &Url {
        match kind {
            SourceKind::Tiz => &self.tiz_url,
            SourceKind::Schedule => &self.schedule_url,
        }
    }
}

/// Per-source request headers.
fn request_headers(kind: SourceKind) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match kind {
        SourceKind::Tiz => {
            headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
            headers.insert(
                header::ACCEPT_LANGUAGE,
                HeaderValue::from_static("en-US,en;q=0.9"),
            );
            headers.insert(
                "x-requested-with",
                HeaderValue::from_static("XMLHttpRequest"),
            );
            headers.insert(header::REFERER, HeaderValue::from_static(TIZ_REFERER));
        }
        SourceKind::Schedule => {
            headers.insert(
                header::ACCEPT_LANGUAGE,
                HeaderValue::from_static("en-US,en;q=0.5"),
            );
        }
    }
    headers
}

#[async_trait]
impl DocumentSource for SourceClient {
    async fn fetch(&self, kind: SourceKind) -> Result<String, FetchError> {
        let url = self.url(kind);
        let started = Instant::now();
        debug!(source = %kind, %url, "Fetching upstream document");

        let response = self
            .http
            .get(url.clone())
            .headers(request_headers(kind))
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        log_if_slow(started, SLOW_FETCH, "upstream fetch");
        debug!(
            source = %kind,
            bytes = body.len(),
            duration = fmt_duration(started.elapsed()),
            "Fetched upstream document"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Figment;
    use figment::providers::Serialized;

    fn config(timezone: Option<&str>) -> Config {
        let mut figment = Figment::new();
        if let Some(tz) = timezone {
            figment = figment.merge(Serialized::default("timezone", tz));
        }
        Config::from_figment(figment).unwrap()
    }

    #[test]
    fn timezone_is_appended_to_schedule_url() {
        let client = SourceClient::new(&config(Some("Europe/Paris"))).unwrap();
        let url = client.url(SourceKind::Schedule).as_str();
        assert!(url.starts_with("https://www.procyclingstats.com/races.php?filter=Filter"));
        assert!(url.ends_with("&timezone=Europe%2FParis"));
    }

    #[test]
    fn tiz_url_untouched() {
        let client = SourceClient::new(&config(Some("UTC"))).unwrap();
        assert_eq!(
            client.url(SourceKind::Tiz).as_str(),
            "https://cyclingtiz.live/sys-parse.php?file=db/races.txt"
        );
    }

    #[test]
    fn tiz_requests_carry_referer() {
        let headers = request_headers(SourceKind::Tiz);
        assert_eq!(headers[header::REFERER], TIZ_REFERER);
        assert!(!request_headers(SourceKind::Schedule).contains_key(header::REFERER));
    }
}
