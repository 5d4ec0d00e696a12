use env_logger::{Builder, Env, Target};
use log::error;
use std::process;
use webtoon_archiver::{run, Cli, Settings};

#[tokio::main]
async fn main() {
    // Parse Args
    let args = Cli::new();

    // Init logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.target(Target::Stdout);
    builder.init();

    // Parse Settings
    let settings = match Settings::new(&args.config_file) {
        Ok(s) => s,
        Err(e) => {
            error!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    // Run
    if let Err(e) = run(args, settings).await {
        error!("Application error: {:#}", e);
        process::exit(1);
    }
}
