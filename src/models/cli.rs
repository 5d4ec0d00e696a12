use crate::page::ImageStyle;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[command(author, version, about = "Archive webtoons and build simple viewer pages")]
pub struct Cli {
    #[arg(short, long, default_value = "webtoons.json")]
    pub config_file: String,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log what would be downloaded or written without doing it
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Replacement for the low-resolution image suffix, overrides the settings file
    #[arg(short, long, global = true)]
    pub quality: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download one episode and render its page
    Episode { url: String },

    /// Download every episode listed on a comic page
    Comic { url: String },

    /// Render a page for a directory of panel images
    Page(PageArgs),
}

#[derive(clap::Args, Debug)]
pub struct PageArgs {
    /// page title
    #[arg(short, long, default_value = "title")]
    pub title: String,

    /// the style sheet, defaults to the settings file value
    #[arg(short, long)]
    pub style: Option<String>,

    /// outfile name
    #[arg(short, long, default_value = "index.html")]
    pub outfile: PathBuf,

    /// template file, defaults to the settings file value
    #[arg(long)]
    pub template: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = StyleArg::Original)]
    pub image_style: StyleArg,

    /// the directory of the episode
    pub dir: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    Original,
    Inlined,
    Subfolder,
}

impl From<StyleArg> for ImageStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Original => ImageStyle::Original,
            StyleArg::Inlined => ImageStyle::Inlined,
            StyleArg::Subfolder => ImageStyle::Subfolder,
        }
    }
}

impl Cli {
    pub fn new() -> Self {
        Cli::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clap_test() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn page_defaults() {
        let cli = Cli::try_parse_from(["webtoon-archiver", "page", "ep1"]).unwrap();
        assert_eq!("webtoons.json", cli.config_file);
        assert!(!cli.dry_run);
        match cli.command {
            Command::Page(args) => {
                assert_eq!("title", args.title);
                assert_eq!(PathBuf::from("index.html"), args.outfile);
                assert_eq!(PathBuf::from("ep1"), args.dir);
                assert_eq!(StyleArg::Original, args.image_style);
                assert!(args.style.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "webtoon-archiver",
            "episode",
            "https://www.webtoons.com/en/x/viewer?title_no=1&episode_no=2",
            "-n",
            "-v",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Episode { .. }));
    }
}
