use crate::{
    configuration::{Context, Settings},
    cookies::CookieJar,
    download::Downloader,
    models::{sanitize_name, Cli, Command, Episode, Images, PageArgs},
    page::{ImageStyle, IndexEntry, NavigationLinks, RenderRequest, Template},
    panels::guess_panel_files,
    site::{self, Site},
    storage::Storage,
};
use anyhow::{bail, Context as _};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use url::Url;

pub const INDEX_PAGE: &str = "index.html";

pub async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let ctx = Context::new(&settings, cli.dry_run);
    if ctx.dry_run {
        info!("Dry run, nothing will be downloaded or written");
    }
    let quality = cli.quality.unwrap_or_else(|| settings.quality.clone());

    match cli.command {
        Command::Episode { url } => {
            let url = Url::parse(&url)?;
            let site = open_site(&url, &settings, &ctx, &quality)?;
            let page = archive_episode(&site, &ctx, &url).await?;
            info!("Finished! {}", page.display());
        }
        Command::Comic { url } => {
            let url = Url::parse(&url)?;
            let site = open_site(&url, &settings, &ctx, &quality)?;
            let index = archive_comic(&site, &ctx, &url).await?;
            info!("Finished! {}", index.display());
        }
        Command::Page(args) => render_directory(&args, &settings, &ctx).await?,
    }

    Ok(())
}

fn open_site(
    url: &Url,
    settings: &Settings,
    ctx: &Context,
    quality: &str,
) -> anyhow::Result<site::Webtoons> {
    info!("Output Directory: {}", ctx.base_directory.display());
    let cookies = match settings.cookie_path() {
        Some(path) => CookieJar::load(&path)?,
        None => {
            debug!("No cookie file configured");
            CookieJar::default()
        }
    };
    let downloader = Downloader::new(settings, ctx)?;
    let site = site::select(url, downloader, cookies, quality)?;
    debug!("Using {} for {}", site.name(), url);
    Ok(site)
}

/// Downloads one episode into `<base>/<comic>/<episode>/` and writes its page there.
pub async fn archive_episode<S: Site>(site: &S, ctx: &Context, url: &Url) -> anyhow::Result<PathBuf> {
    let storage = Storage::new(ctx.dry_run);
    let document = site.fetch_document(url).await?;
    let episode = site.extract_episode(url, &document)?;
    info!("Checking Episode: {} ({})", episode.title, episode.comic_title);

    let episode_dir = ctx
        .base_directory
        .join(sanitize_name(&episode.comic_title))
        .join(&episode.local_name);
    let episode = download_episode(site, &storage, episode, &episode_dir).await?;

    let html = Template::local()?.render(&RenderRequest {
        title: episode.title.clone(),
        stylesheet: None,
        images: local_files(&episode),
        navigation: None,
    })?;
    let page = episode_dir.join(INDEX_PAGE);
    storage.write(&page, html.as_bytes()).await?;
    Ok(page)
}

/// Archives every episode listed on a comic page, oldest first, linking them
/// with Prev/Top/Next and a table of contents. A failed episode is logged and
/// skipped; the run still reports failure at the end.
///
/// Folders and pages are named `NNN - <episode>` by list position, so repeated
/// titles stay apart and sort in publication order.
pub async fn archive_comic<S: Site>(site: &S, ctx: &Context, url: &Url) -> anyhow::Result<PathBuf> {
    let storage = Storage::new(ctx.dry_run);
    let document = site.fetch_document(url).await?;
    let comic = site.extract_comic(url, &document)?;
    info!(
        "Checking Comic: {} ({} episodes)",
        comic.title,
        comic.episodes.len()
    );

    let comic_dir = ctx.base_directory.join(&comic.local_name);
    storage.create_dir_all(&comic_dir).await?;

    let template = Template::local()?;
    let folders: Vec<String> = comic
        .episodes
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{:03} - {}", i + 1, e.local_name))
        .collect();
    let pages: Vec<String> = folders.iter().map(|f| format!("{}.html", f)).collect();

    let mut failed = 0;
    for (i, listed) in comic.episodes.iter().enumerate() {
        let page = comic_dir.join(&pages[i]);
        if page.exists() {
            debug!("Episode {} exists, skipping", &pages[i]);
            continue;
        }

        let navigation = NavigationLinks::new(
            i.checked_sub(1).map(|p| pages[p].clone()),
            Some(INDEX_PAGE.to_string()),
            pages.get(i + 1).cloned(),
        );
        if let Err(e) = archive_listed_episode(
            site,
            &storage,
            &template,
            listed,
            &comic_dir,
            &folders[i],
            navigation,
        )
        .await
        {
            error!("Error archiving episode {}: {:#}", listed.title, e);
            failed += 1;
        }
    }

    let entries: Vec<IndexEntry> = comic
        .episodes
        .iter()
        .zip(&pages)
        .map(|(e, page)| IndexEntry {
            title: e.title.clone(),
            href: page.clone(),
        })
        .collect();
    let index = comic_dir.join(INDEX_PAGE);
    storage
        .write(
            &index,
            template
                .render_index(&comic.title, None, &entries)?
                .as_bytes(),
        )
        .await?;

    if failed > 0 {
        bail!("{} of {} episodes failed", failed, comic.episodes.len());
    }
    Ok(index)
}

async fn archive_listed_episode<S: Site>(
    site: &S,
    storage: &Storage,
    template: &Template,
    listed: &Episode,
    comic_dir: &Path,
    folder: &str,
    navigation: NavigationLinks,
) -> anyhow::Result<()> {
    let document = site.fetch_document(&listed.source_url).await?;
    let episode = site.extract_episode(&listed.source_url, &document)?;
    let episode = download_episode(site, storage, episode, &comic_dir.join(folder)).await?;

    let html = template.render(&RenderRequest {
        title: episode.title.clone(),
        stylesheet: None,
        images: ImageStyle::Subfolder.sources(Path::new(folder), &local_files(&episode))?,
        navigation: Some(navigation),
    })?;
    storage
        .write(&comic_dir.join(format!("{}.html", folder)), html.as_bytes())
        .await?;
    Ok(())
}

/// Fetches every panel of `episode` into `dir`, stopping at the first failure.
/// Panels already written stay on disk.
async fn download_episode<S: Site>(
    site: &S,
    storage: &Storage,
    episode: Episode,
    dir: &Path,
) -> anyhow::Result<Episode> {
    if episode.images().is_empty() {
        warn!("\"{}\" has no panels", episode.title);
    }
    storage.create_dir_all(dir).await?;

    let mut files = Vec::with_capacity(episode.images().len());
    for (i, url) in episode.remote_images().iter().enumerate() {
        let name = panel_file_name(i + 1, url);
        debug!("Getting page #{}: {}", i + 1, url);
        site.download_asset(&episode, url, &dir.join(&name))
            .await
            .with_context(|| format!("downloading panel {} of \"{}\"", i + 1, episode.title))?;
        files.push(PathBuf::from(name));
    }

    info!("Downloaded {} panels of \"{}\"", files.len(), episode.title);
    Ok(episode.with_local_images(files))
}

/// `001.jpg`, `002.png`, ... keeping the remote extension.
fn panel_file_name(position: usize, url: &Url) -> String {
    let ext = url
        .path_segments()
        .and_then(|mut s| s.next_back())
        .and_then(|name| Path::new(name).extension())
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "jpg".to_string());
    format!("{:03}.{}", position, ext)
}

fn local_files(episode: &Episode) -> Vec<String> {
    match episode.images() {
        Images::Local(paths) => paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
        Images::Remote(_) => Vec::new(),
    }
}

/// Writes a viewer page for a directory of already downloaded panels.
pub async fn render_directory(args: &PageArgs, settings: &Settings, ctx: &Context) -> anyhow::Result<()> {
    let template_path = args
        .template
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.template));
    let template = Template::load(&template_path)?;

    let files = guess_panel_files(&args.dir)?;
    info!("Found {} panels in {}", files.len(), args.dir.display());

    let style: ImageStyle = args.image_style.into();
    let html = template.render(&RenderRequest {
        title: args.title.clone(),
        stylesheet: Some(
            args.style
                .clone()
                .unwrap_or_else(|| settings.stylesheet.clone()),
        ),
        images: style.sources(&args.dir, &files)?,
        navigation: None,
    })?;

    Storage::new(ctx.dry_run)
        .write(&args.outfile, html.as_bytes())
        .await?;
    Ok(())
}
