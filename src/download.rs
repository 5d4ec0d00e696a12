use crate::{
    configuration::{Context, Settings},
    error::{ArchiveError, Result},
    storage::{ensure_parent, Storage},
};
use futures::StreamExt;
use log::{debug, info};
use reqwest::{header::HeaderMap, Client, Response};
use std::{path::Path, time::Duration};
use tokio::{fs::File, io::AsyncWriteExt};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Single-shot HTTP transfers. Nothing is retried; the caller decides what a failure means.
#[derive(Debug)]
pub struct Downloader {
    client: Client,
    storage: Storage,
}

impl Downloader {
    pub fn new(settings: &Settings, ctx: &Context) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, Storage::new(ctx.dry_run)))
    }

    pub fn with_client(client: Client, storage: Storage) -> Self {
        Downloader { client, storage }
    }

    async fn get(&self, url: &Url, headers: HeaderMap) -> Result<Response> {
        self.client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| ArchiveError::network(url, e))
    }

    /// Fetches a page body. Reads happen in dry-run mode too.
    pub async fn fetch_text(&self, url: &Url, headers: HeaderMap) -> Result<String> {
        debug!("Fetching {}", url);
        let res = self.get(url, headers).await?;
        res.text().await.map_err(|e| ArchiveError::network(url, e))
    }

    /// Streams `url` into `destination`. A failed transfer may leave a truncated file behind.
    pub async fn download(&self, url: &Url, destination: &Path, headers: HeaderMap) -> Result<()> {
        if self.storage.is_dry_run() {
            info!("[dry-run] download {} to {}", url, destination.display());
            return Ok(());
        }

        let res = self.get(url, headers).await?;
        ensure_parent(destination).await?;
        let mut file = File::create(destination)
            .await
            .map_err(|e| ArchiveError::io(destination, e))?;

        let mut written = 0;
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ArchiveError::network(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| ArchiveError::io(destination, e))?;
            written += chunk.len();
        }
        file.flush()
            .await
            .map_err(|e| ArchiveError::io(destination, e))?;

        debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(())
    }
}
