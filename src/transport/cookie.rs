//! Per-domain HTTP cookie store.
//!
//! Cookies are grouped by second-level domain (`www.example.com` and
//! `olap.example.com` share `example.com`). Within a domain a cookie is keyed
//! by its name. Each domain map is independently lockable, and a cookie is
//! cloned out whole so readers never see a value paired with another write's
//! path or expiry.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use dashmap::DashMap;
use reqwest::Url;

/// A stored cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub value: String,
    pub path: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |expires| expires > now)
    }

    fn matches_path(&self, request_path: &str) -> bool {
        match self.path.as_deref() {
            None | Some("/") => true,
            Some(path) => request_path.starts_with(path),
        }
    }
}

/// Thread-safe cookie jar shared by every request of a connection.
#[derive(Debug, Default)]
pub struct CookieJar {
    domains: DashMap<String, Arc<DashMap<String, Cookie>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store every `Set-Cookie` header value received from `url`.
    pub fn store_cookies<'a>(&self, url: &Url, headers: impl IntoIterator<Item = &'a str>) {
        let Some(domain) = domain_key(url) else {
            return;
        };

        for header in headers {
            let Some((name, cookie)) = parse_set_cookie(header) else {
                continue;
            };
            tracing::debug!(domain = %domain, cookie = %name, "Saving cookie");
            let cookies = Arc::clone(self.domains.entry(domain.clone()).or_default().value());
            cookies.insert(name, cookie);
        }
    }

    /// `Cookie` header value for a request to `url`, if any cookie applies.
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.cookie_header_at(url, Utc::now())
    }

    /// Same as [`cookie_header`](Self::cookie_header) with an explicit clock.
    pub fn cookie_header_at(&self, url: &Url, now: DateTime<Utc>) -> Option<String> {
        let domain = domain_key(url)?;
        let cookies = Arc::clone(self.domains.get(&domain)?.value());

        let pairs: Vec<String> = cookies
            .iter()
            .filter(|entry| entry.value().is_live(now) && entry.value().matches_path(url.path()))
            .map(|entry| format!("{}={}", entry.key(), entry.value().value))
            .collect();

        if pairs.is_empty() {
            return None;
        }
        tracing::debug!(domain = %domain, count = pairs.len(), "Using cookies");
        Some(pairs.join("; "))
    }

    /// Look up a stored cookie.
    pub fn get(&self, domain: &str, name: &str) -> Option<Cookie> {
        let cookies = Arc::clone(self.domains.get(domain)?.value());
        let cookie = cookies.get(name)?.clone();
        Some(cookie)
    }

    /// Number of stored cookies across all domains.
    pub fn len(&self) -> usize {
        self.domains.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.domains.clear();
    }
}

impl fmt::Display for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut domains: Vec<(String, Vec<String>)> = self
            .domains
            .iter()
            .map(|entry| {
                let mut names: Vec<String> =
                    entry.value().iter().map(|c| c.key().clone()).collect();
                names.sort();
                (entry.key().clone(), names)
            })
            .collect();
        domains.sort();

        for (domain, names) in domains {
            writeln!(f, "{domain}: {}", names.join(", "))?;
        }
        Ok(())
    }
}

/// Second-level domain of a URL's host.
///
/// IP addresses and single-label hosts are used as-is.
fn domain_key(url: &Url) -> Option<String> {
    let Some(domain) = url.domain() else {
        return url.host_str().map(str::to_string);
    };
    if domain.matches('.').count() >= 2 {
        if let Some((_, rest)) = domain.split_once('.') {
            return Some(rest.to_ascii_lowercase());
        }
    }
    Some(domain.to_ascii_lowercase())
}

fn parse_set_cookie(header: &str) -> Option<(String, Cookie)> {
    let mut tokens = header.split(';');
    let (name, value) = tokens.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = Cookie {
        value: value.trim().to_string(),
        path: None,
        expires: None,
    };

    for token in tokens {
        let (key, val) = match token.split_once('=') {
            Some((k, v)) => (k.trim().to_ascii_lowercase(), v.trim()),
            None => (token.trim().to_ascii_lowercase(), ""),
        };
        match key.as_str() {
            "path" => cookie.path = Some(val.to_string()),
            "expires" => match parse_expires(val) {
                Some(expires) => cookie.expires = Some(expires),
                None => {
                    tracing::warn!(cookie = %name, expires = %val, "Dropping cookie with unparseable expiry");
                    return None;
                }
            },
            _ => {}
        }
    }

    Some((name.to_string(), cookie))
}

/// Netscape (`Wed, 09-Jun-2021 10:18:14 GMT`) or RFC 2822 dates.
fn parse_expires(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim().trim_end_matches("GMT").trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%a, %d-%b-%Y %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc2822(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
