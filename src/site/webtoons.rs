use super::{selector, Site};
use crate::{
    cookies::CookieJar,
    download::Downloader,
    error::{ArchiveError, Result},
    models::{Comic, Episode},
};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER};
use scraper::Html;
use std::path::Path;
use url::Url;

/// Query suffix the viewer puts on every panel URL to get a downscaled image.
pub const LOW_QUALITY_SUFFIX: &str = "?type=q90";

const TITLE_DELIMITER: char = '|';

#[derive(Debug)]
pub struct Webtoons {
    downloader: Downloader,
    cookies: CookieJar,
    quality: String,
}

impl Webtoons {
    pub fn new(downloader: Downloader, cookies: CookieJar, quality: &str) -> Self {
        Webtoons {
            downloader,
            cookies,
            quality: quality.to_string(),
        }
    }

    pub fn handles(url: &Url) -> bool {
        url.host_str()
            .map(|h| h == "webtoons.com" || h.ends_with(".webtoons.com"))
            .unwrap_or(false)
    }

    fn page_headers(&self, url: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = self.cookies.header_for(url) {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(e) => warn!("Not sending cookies to {}: {}", url, e),
            }
        }
        headers
    }

    fn image_headers(episode: &Episode) -> HeaderMap {
        let mut headers = HeaderMap::new();
        // the image host refuses requests without a site referer
        if let Ok(value) = HeaderValue::from_str(episode.source_url.as_str()) {
            headers.insert(REFERER, value);
        }
        headers
    }
}

impl Site for Webtoons {
    fn name(&self) -> &'static str {
        "webtoons"
    }

    async fn fetch_document(&self, url: &Url) -> Result<Html> {
        let body = self
            .downloader
            .fetch_text(url, self.page_headers(url))
            .await?;
        Ok(Html::parse_document(&body))
    }

    fn extract_comic(&self, url: &Url, document: &Html) -> Result<Comic> {
        parse_comic(url, document)
    }

    fn extract_episode(&self, url: &Url, document: &Html) -> Result<Episode> {
        parse_episode(url, document, &self.quality)
    }

    async fn download_asset(&self, episode: &Episode, url: &Url, destination: &Path) -> Result<()> {
        self.downloader
            .download(url, destination, Self::image_headers(episode))
            .await
    }
}

fn document_title(url: &Url, document: &Html) -> Result<String> {
    let title = document
        .select(&selector("title")?)
        .next()
        .ok_or_else(|| ArchiveError::malformed(url, "no title element"))?;
    Ok(title.text().collect())
}

/// Splits `"<episode> | <comic>"` into its two trimmed halves.
fn split_title(url: &Url, title: &str) -> Result<(String, String)> {
    let mut parts = title.split(TITLE_DELIMITER);
    let episode = parts.next().unwrap_or_default().trim().to_string();
    let comic = parts
        .next()
        .ok_or_else(|| {
            ArchiveError::malformed(url, format!("title {:?} has no '{}'", title, TITLE_DELIMITER))
        })?
        .trim()
        .to_string();
    Ok((episode, comic))
}

/// Episode title, comic title and panel URLs of a viewer page.
pub fn parse_episode(url: &Url, document: &Html, quality: &str) -> Result<Episode> {
    let (title, comic_title) = split_title(url, &document_title(url, document)?)?;

    let mut images = Vec::new();
    for img in document.select(&selector("img._images")?) {
        let raw = img
            .value()
            .attr("data-url")
            .ok_or_else(|| ArchiveError::malformed(url, "panel without data-url"))?;
        let panel = raw.trim().replace(LOW_QUALITY_SUFFIX, quality);
        let panel = url
            .join(&panel)
            .map_err(|e| ArchiveError::malformed(url, format!("panel url {:?}: {}", panel, e)))?;
        images.push(panel);
    }
    debug!("\"{}\" has {} panels", &title, images.len());

    Ok(Episode::new(title, comic_title, url.clone(), images))
}

/// Comic title and listed episodes of a list page, oldest first.
pub fn parse_comic(url: &Url, document: &Html) -> Result<Comic> {
    let og_title = document
        .select(&selector(r#"meta[property="og:title"]"#)?)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let title = match og_title {
        Some(t) => t,
        None => split_title(url, &document_title(url, document)?)?.0,
    };

    let subject = selector("span.subj span, span.subj")?;
    let mut episodes = Vec::new();
    for item in document.select(&selector("#_listUl > li")?) {
        let href = item
            .select(&selector("a")?)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| ArchiveError::malformed(url, "episode entry without a link"))?;
        let link = url
            .join(href)
            .map_err(|e| ArchiveError::malformed(url, format!("episode link {:?}: {}", href, e)))?;
        let name: String = item
            .select(&subject)
            .next()
            .map(|s| s.text().collect::<String>().trim().to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| episode_number(&link).map(|no| format!("Episode {}", no)))
            .ok_or_else(|| ArchiveError::malformed(url, format!("episode {} has no name", link)))?;
        episodes.push(Episode::new(name, &title, link, vec![]));
    }
    if episodes.is_empty() {
        return Err(ArchiveError::malformed(url, "no episodes listed"));
    }
    // newest first on the site
    episodes.reverse();

    Ok(Comic::new(title, episodes))
}

fn episode_number(link: &Url) -> Option<String> {
    link.query_pairs()
        .find(|(k, _)| k == "episode_no")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}
