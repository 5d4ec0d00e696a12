//! Browser-exported cookie jars (the Netscape `cookies.txt` format).

use crate::error::{ArchiveError, Result};
use log::{debug, warn};
use std::{
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};
use url::Url;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds, 0 for a session cookie.
    pub expires: u64,
    pub name: String,
    pub value: String,
}

impl Cookie {
    fn parse(line: &str) -> Option<Cookie> {
        let line = line.strip_prefix(HTTP_ONLY_PREFIX).unwrap_or(line);
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            return None;
        }
        Some(Cookie {
            domain: fields[0].trim_start_matches('.').to_lowercase(),
            include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
            path: fields[2].to_string(),
            secure: fields[3].eq_ignore_ascii_case("TRUE"),
            expires: fields[4].parse().ok()?,
            name: fields[5].to_string(),
            value: fields[6].trim_end_matches('\r').to_string(),
        })
    }

    fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        let domain_ok = host == self.domain
            || (self.include_subdomains && host.ends_with(&format!(".{}", self.domain)));
        let secure_ok = !self.secure || url.scheme() == "https";

        domain_ok && secure_ok && url.path().starts_with(&self.path)
    }

    fn expired(&self, now: u64) -> bool {
        self.expires != 0 && self.expires <= now
    }
}

#[derive(Debug, Default, Clone)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ArchiveError::io(path, e))?;
        let jar = Self::parse(&text, unix_now());
        debug!("Loaded {} cookies from {}", jar.len(), path.display());
        Ok(jar)
    }

    /// Parses jar text, dropping cookies already expired at `now`.
    pub fn parse(text: &str, now: u64) -> Self {
        let mut cookies = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || (trimmed.starts_with('#') && !trimmed.starts_with(HTTP_ONLY_PREFIX))
            {
                continue;
            }
            match Cookie::parse(line) {
                Some(cookie) if cookie.expired(now) => {
                    debug!("Dropping expired cookie {}", cookie.name)
                }
                Some(cookie) => cookies.push(cookie),
                None => warn!("Skipping malformed cookie line {}", number + 1),
            }
        }
        CookieJar { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for a `Cookie` request header, if any cookie applies to `url`.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.matches(url))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
