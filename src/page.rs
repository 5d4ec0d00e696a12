//! Viewer pages: an HTML template filled with a title, a stylesheet and the
//! panel images wrapped in Prev/Top/Next links.

use crate::error::{ArchiveError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Variables every page template has to use.
pub const REQUIRED_VARIABLES: [&str; 2] = ["title", "images"];

const LOCAL_TEMPLATE: &str = include_str!("../templates/local.html");

/// Prev/Top/Next targets. A missing target still renders, as a hidden link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationLinks {
    pub prev: Option<String>,
    pub top: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
struct NavLink<'a> {
    label: &'static str,
    href: Option<&'a str>,
}

impl NavigationLinks {
    pub fn new(prev: Option<String>, top: Option<String>, next: Option<String>) -> Self {
        NavigationLinks { prev, top, next }
    }

    fn links(&self) -> [NavLink<'_>; 3] {
        [
            NavLink { label: "Prev", href: self.prev.as_deref() },
            NavLink { label: "Top", href: self.top.as_deref() },
            NavLink { label: "Next", href: self.next.as_deref() },
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub title: String,
    pub stylesheet: Option<String>,
    pub images: Vec<String>,
    pub navigation: Option<NavigationLinks>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub title: String,
    pub href: String,
}

/// How an `<img>` refers to its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStyle {
    /// The file name as found.
    Original,
    /// A base64 `data:` URI of the file contents.
    Inlined,
    /// `<folder>/<file>`, for pages sitting next to the episode folder.
    Subfolder,
}

impl ImageStyle {
    pub fn source(&self, folder: &Path, file: &str) -> Result<String> {
        match self {
            ImageStyle::Original => Ok(file.to_string()),
            ImageStyle::Subfolder => Ok(format!(
                "{}/{}",
                folder.to_string_lossy().trim_end_matches('/'),
                file
            )),
            ImageStyle::Inlined => {
                let path = folder.join(file);
                let bytes = fs::read(&path).map_err(|e| ArchiveError::io(&path, e))?;
                Ok(format!(
                    "data:{};base64,{}",
                    mime_from_path(file),
                    BASE64.encode(bytes)
                ))
            }
        }
    }

    pub fn sources(&self, folder: &Path, files: &[String]) -> Result<Vec<String>> {
        files.iter().map(|f| self.source(folder, f)).collect()
    }
}

fn mime_from_path(file: &str) -> &'static str {
    let ext = Path::new(file)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[derive(Debug)]
pub struct Template {
    env: Environment<'static>,
    name: String,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ArchiveError::TemplateNotFound(PathBuf::from(path)),
            _ => ArchiveError::io(path, e),
        })?;
        Self::parse(path.display().to_string(), source)
    }

    /// The built-in template for archived copies, styles inlined.
    pub fn local() -> Result<Self> {
        Self::parse("local.html", LOCAL_TEMPLATE.to_string())
    }

    pub fn parse(name: impl Into<String>, source: String) -> Result<Self> {
        let name = name.into();
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        // user templates need not end in .html
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template_owned(name.clone(), source)
            .map_err(|e| ArchiveError::MalformedTemplate {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        let used = env
            .get_template(&name)
            .map_err(|e| ArchiveError::MalformedTemplate {
                name: name.clone(),
                reason: e.to_string(),
            })?
            .undeclared_variables(false);
        if let Some(missing) = REQUIRED_VARIABLES.iter().find(|v| !used.contains(**v)) {
            return Err(ArchiveError::MalformedTemplate {
                reason: format!("never uses `{}`", missing),
                name,
            });
        }

        Ok(Template { env, name })
    }

    /// An episode page: the panels in order, framed by navigation when given.
    pub fn render(&self, request: &RenderRequest) -> Result<String> {
        self.render_with(context! {
            title => &request.title,
            stylesheet => request.stylesheet.as_deref().unwrap_or_default(),
            images => &request.images,
            navigation => request.navigation.as_ref().map(NavigationLinks::links),
        })
    }

    /// A table of contents linking each episode page.
    pub fn render_index(
        &self,
        title: &str,
        stylesheet: Option<&str>,
        entries: &[IndexEntry],
    ) -> Result<String> {
        self.render_with(context! {
            title => title,
            stylesheet => stylesheet.unwrap_or_default(),
            images => Vec::<String>::new(),
            episodes => entries,
        })
    }

    fn render_with(&self, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(&self.name)
            .and_then(|t| t.render(ctx))
            .map_err(|source| ArchiveError::Render {
                name: self.name.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn site_template() -> Template {
        Template::load(Path::new("templates/template.html")).unwrap()
    }

    fn select<'a>(doc: &'a Html, css: &str) -> Vec<scraper::ElementRef<'a>> {
        doc.select(&Selector::parse(css).unwrap()).collect()
    }

    #[test]
    fn images_in_order_without_navigation() {
        let html = site_template().render(&RenderRequest {
            title: "Episode 1".into(),
            stylesheet: Some("main.css".into()),
            images: vec!["1.jpg".into(), "2.jpg".into()],
            navigation: None,
        })
        .unwrap();
        let doc = Html::parse_document(&html);

        let srcs: Vec<&str> = select(&doc, "body img")
            .iter()
            .map(|i| i.value().attr("src").unwrap())
            .collect();
        assert_eq!(vec!["1.jpg", "2.jpg"], srcs);
        assert!(select(&doc, "div.paginate").is_empty());
        assert!(select(&doc, "a").is_empty());
    }

    #[test]
    fn absent_links_are_hidden_not_omitted() {
        let html = site_template().render(&RenderRequest {
            title: "Episode 1".into(),
            stylesheet: None,
            images: vec!["1.jpg".into()],
            navigation: Some(NavigationLinks::new(
                None,
                Some("idx.html".into()),
                Some("e2.html".into()),
            )),
        })
        .unwrap();
        let doc = Html::parse_document(&html);

        let turners = select(&doc, "div.paginate");
        assert_eq!(2, turners.len());
        for turner in turners {
            let links: Vec<_> = turner
                .select(&Selector::parse("a").unwrap())
                .collect();
            assert_eq!(3, links.len());

            assert_eq!("Prev", links[0].text().collect::<String>());
            assert_eq!(Some("visibility: hidden"), links[0].value().attr("style"));
            assert_eq!(None, links[0].value().attr("href"));

            assert_eq!("Top", links[1].text().collect::<String>());
            assert_eq!(Some("idx.html"), links[1].value().attr("href"));
            assert_eq!(None, links[1].value().attr("style"));

            assert_eq!("Next", links[2].text().collect::<String>());
            assert_eq!(Some("e2.html"), links[2].value().attr("href"));
        }

        // prev/top/next wrap the panels
        let body_children: Vec<&str> = select(&doc, "body > *")
            .iter()
            .map(|e| e.value().name())
            .collect();
        assert_eq!(vec!["div", "img", "div"], body_children);
    }

    #[test]
    fn title_and_stylesheet_are_set() {
        let html = site_template().render(&RenderRequest {
            title: "Tom & Jerry <3".into(),
            stylesheet: Some("../style/main.css".into()),
            ..Default::default()
        })
        .unwrap();
        let doc = Html::parse_document(&html);

        let title = select(&doc, "title")[0].text().collect::<String>();
        assert_eq!("Tom & Jerry <3", title);
        assert!(html.contains("<title>Tom &amp; Jerry &lt;3</title>"));
        let link = select(&doc, r#"link[rel="stylesheet"]"#);
        assert_eq!(Some("../style/main.css"), link[0].value().attr("href"));
    }

    #[test]
    fn single_line_template_keeps_its_markup() {
        let template = Template::parse(
            "inline.html",
            "<!DOCTYPE html><html><head><title>{{ title }}</title></head>\
             <body>{% for src in images %}<img src=\"{{ src }}\">{% endfor %}</body></html>"
                .into(),
        )
        .unwrap();
        let html = template
            .render(&RenderRequest {
                title: "T".into(),
                images: vec!["1.jpg".into()],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            r#"<!DOCTYPE html><html><head><title>T</title></head><body><img src="1.jpg"></body></html>"#,
            html
        );
    }

    #[test]
    fn values_are_not_expanded_twice() {
        let html = site_template()
            .render(&RenderRequest {
                title: "a {{ stylesheet }} b".into(),
                stylesheet: Some("main.css".into()),
                ..Default::default()
            })
            .unwrap();

        assert!(html.contains("<title>a {{ stylesheet }} b</title>"));
    }

    #[test]
    fn hrefs_and_sources_are_escaped() {
        let html = site_template()
            .render(&RenderRequest {
                title: "t".into(),
                images: vec![r#"x".jpg"#.into()],
                navigation: Some(NavigationLinks::new(Some("a&b.html".into()), None, None)),
                ..Default::default()
            })
            .unwrap();

        assert!(html.contains(r#"<img src="x&quot;.jpg">"#));
        assert!(html.contains(r#"<a href="a&amp;b.html">Prev</a>"#));
    }

    #[test]
    fn local_template_has_no_stylesheet_link() {
        let html = Template::local()
            .unwrap()
            .render(&RenderRequest {
                title: "Ep. 2".into(),
                stylesheet: Some("ignored.css".into()),
                images: vec!["001.jpg".into()],
                navigation: None,
            })
            .unwrap();
        let doc = Html::parse_document(&html);

        assert!(select(&doc, "link").is_empty());
        assert_eq!(1, select(&doc, "style").len());
        assert_eq!(1, select(&doc, "img").len());
        assert!(!html.contains("ignored.css"));
    }

    #[test]
    fn missing_template_file() {
        let err = Template::load(Path::new("templates/nope.html")).unwrap_err();
        assert!(matches!(err, ArchiveError::TemplateNotFound(p) if p == Path::new("templates/nope.html")));
    }

    #[test]
    fn template_without_images() {
        let err = Template::parse("broken", "<title>{{ title }}</title>".into()).unwrap_err();
        assert!(
            matches!(err, ArchiveError::MalformedTemplate { ref reason, .. } if reason.contains("images"))
        );
    }

    #[test]
    fn template_syntax_error() {
        let err = Template::parse("broken", "{% for src in images %}{{ title }}".into()).unwrap_err();
        assert!(matches!(err, ArchiveError::MalformedTemplate { .. }));
    }

    #[test]
    fn index_lists_episodes() {
        let html = Template::local()
            .unwrap()
            .render_index(
                "Tower of God",
                None,
                &[
                    IndexEntry { title: "Ep. 1".into(), href: "Ep. 1.html".into() },
                    IndexEntry { title: "Ep. 2".into(), href: "Ep. 2.html".into() },
                ],
            )
            .unwrap();
        let doc = Html::parse_document(&html);

        assert_eq!("Tower of God", select(&doc, "h1")[0].text().collect::<String>());
        let hrefs: Vec<&str> = select(&doc, "ul.episodes a")
            .iter()
            .map(|a| a.value().attr("href").unwrap())
            .collect();
        assert_eq!(vec!["Ep. 1.html", "Ep. 2.html"], hrefs);
    }

    #[test]
    fn image_styles() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("001.png"), [1u8, 2, 3]).unwrap();

        assert_eq!(
            "001.png",
            ImageStyle::Original.source(tmp.path(), "001.png").unwrap()
        );
        assert_eq!(
            "Ep. 1/001.png",
            ImageStyle::Subfolder.source(Path::new("Ep. 1/"), "001.png").unwrap()
        );
        assert_eq!(
            "data:image/png;base64,AQID",
            ImageStyle::Inlined.source(tmp.path(), "001.png").unwrap()
        );
        assert!(matches!(
            ImageStyle::Inlined.source(tmp.path(), "002.png").unwrap_err(),
            ArchiveError::Io { .. }
        ));
    }
}
