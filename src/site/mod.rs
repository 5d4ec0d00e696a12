pub mod webtoons;

use crate::{
    cookies::CookieJar,
    download::Downloader,
    error::{ArchiveError, Result},
    models::{Comic, Episode},
};
use scraper::{Html, Selector};
use std::path::Path;
use url::Url;

pub use webtoons::Webtoons;

/// What a supported comic site has to provide. One implementation per site.
#[allow(async_fn_in_trait)]
pub trait Site {
    fn name(&self) -> &'static str;

    async fn fetch_document(&self, url: &Url) -> Result<Html>;

    /// Reads a comic's title and its listed episodes, in publication order.
    fn extract_comic(&self, url: &Url, document: &Html) -> Result<Comic>;

    fn extract_episode(&self, url: &Url, document: &Html) -> Result<Episode>;

    async fn download_asset(&self, episode: &Episode, url: &Url, destination: &Path)
        -> Result<()>;
}

/// Picks the site implementation that handles `url`.
pub fn select(
    url: &Url,
    downloader: Downloader,
    cookies: CookieJar,
    quality: &str,
) -> Result<Webtoons> {
    if Webtoons::handles(url) {
        Ok(Webtoons::new(downloader, cookies, quality))
    } else {
        Err(ArchiveError::UnsupportedSite(url.to_string()))
    }
}

pub(crate) fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ArchiveError::malformed(css, format!("bad selector: {}", e)))
}
