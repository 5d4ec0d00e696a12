use std::path::PathBuf;
use url::Url;

/// The images of an episode, either still on the site or already on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Images {
    Remote(Vec<Url>),
    Local(Vec<PathBuf>),
}

impl Images {
    pub fn len(&self) -> usize {
        match self {
            Images::Remote(urls) => urls.len(),
            Images::Local(paths) => paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub local_name: String,
    pub comic_title: String,
    pub source_url: Url,
    images: Images,
}

impl Episode {
    pub fn new(
        title: impl Into<String>,
        comic_title: impl Into<String>,
        source_url: Url,
        images: Vec<Url>,
    ) -> Self {
        let title = title.into();
        Episode {
            local_name: sanitize_name(&title),
            title,
            comic_title: comic_title.into(),
            source_url,
            images: Images::Remote(images),
        }
    }

    pub fn images(&self) -> &Images {
        &self.images
    }

    pub fn remote_images(&self) -> &[Url] {
        match &self.images {
            Images::Remote(urls) => urls,
            Images::Local(_) => &[],
        }
    }

    /// Swaps the remote list for the files it was downloaded to.
    pub fn with_local_images(self, paths: Vec<PathBuf>) -> Self {
        Episode {
            images: Images::Local(paths),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comic {
    pub title: String,
    pub local_name: String,
    pub episodes: Vec<Episode>,
}

impl Comic {
    pub fn new(title: impl Into<String>, episodes: Vec<Episode>) -> Self {
        let title = title.into();
        Comic {
            local_name: sanitize_name(&title),
            title,
            episodes,
        }
    }
}

pub fn sanitize_name(s: &str) -> String {
    // names end up in hrefs, where '#' and '%' are not literal
    s.replace([':', '/', '\\', '?', '*', '"', '<', '>', '|', '#', '%'], "")
        .trim()
        // Keep this last to remove duplicate spaces
        .replace("  ", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn sanitize_strips_path_characters() {
        assert_eq!("Ep. 1 The Start", sanitize_name("Ep. 1: The Start"));
        assert_eq!("AB", sanitize_name("A/B"));
        assert_eq!("What now", sanitize_name(" What now? "));
    }

    #[test]
    fn sanitize_strips_url_syntax() {
        assert_eq!("Ep. 1", sanitize_name("Ep. #1"));
        assert_eq!("100 Done", sanitize_name("100% Done"));
    }

    #[test]
    fn episode_local_name_is_sanitized() {
        let ep = Episode::new("Ep. 3: Home/Away", "Comic", url("https://example.com/e3"), vec![]);
        assert_eq!("Ep. 3 HomeAway", ep.local_name);
        assert_eq!("Ep. 3: Home/Away", ep.title);
    }

    #[test]
    fn local_images_replace_remote_ones() {
        let ep = Episode::new(
            "Ep. 1",
            "Comic",
            url("https://example.com/e1"),
            vec![url("https://img.example.com/1.jpg"), url("https://img.example.com/2.jpg")],
        );
        assert_eq!(2, ep.remote_images().len());

        let ep = ep.with_local_images(vec![PathBuf::from("001.jpg"), PathBuf::from("002.jpg")]);
        assert!(ep.remote_images().is_empty());
        assert_eq!(
            &Images::Local(vec![PathBuf::from("001.jpg"), PathBuf::from("002.jpg")]),
            ep.images()
        );
        assert_eq!(2, ep.images().len());
    }
}
