use config::{Config, ConfigError};
use resolve_path::PathResolveExt;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub output_directory: String,
    #[serde(default)]
    pub cookie_file: Option<String>,
    pub quality: String,
    pub template: String,
    pub stylesheet: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Settings {
    /// Loads `config_file` on top of the defaults. A missing file is not an error.
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("output_directory", ".")?
            .set_default("quality", "")?
            .set_default("template", "templates/template.html")?
            .set_default("stylesheet", "main.css")?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("timeout_secs", 60_i64)?
            .add_source(config::File::with_name(config_file).required(false))
            .build()?;
        builder.try_deserialize()
    }

    pub fn cookie_path(&self) -> Option<PathBuf> {
        self.cookie_file
            .as_ref()
            .map(|f| f.resolve().into_owned())
    }
}

/// Run-wide flags, built once at startup and handed to every component.
#[derive(Debug, Clone)]
pub struct Context {
    pub dry_run: bool,
    pub base_directory: PathBuf,
}

impl Context {
    pub fn new(settings: &Settings, dry_run: bool) -> Self {
        Context {
            dry_run,
            base_directory: settings.output_directory.resolve().into_owned(),
        }
    }
}
