pub mod cli;
pub mod comic;

pub use cli::{Cli, Command, PageArgs};
pub use comic::{sanitize_name, Comic, Episode, Images};
