use clap::Parser;
use directories::ProjectDirs;
use purrview::{logging, App, Config, ConfigLoadError, GraphicsMode, HttpApiClient, ImageProtocol};
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

const APP_NAME: &str = "purrview";

/// Vote on, favorite and browse cat pictures from your terminal.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// The base URL of the backend server.
    #[clap(long, env = "PURRVIEW_SERVER_URL")]
    server_url: Option<String>,

    /// The image protocol to use.
    #[clap(long)]
    image_protocol: Option<ImageProtocol>,

    /// The path to the configuration file.
    #[clap(short, long)]
    config_file: Option<PathBuf>,

    /// The file logs are written to.
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// List the key bindings in use and exit.
    #[clap(long)]
    list_bindings: bool,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

fn load_config(config_file_path: Option<&Path>) -> Result<Config, ConfigLoadError> {
    if let Some(path) = config_file_path {
        return Config::load(path);
    }
    let configs_path: PathBuf = match env::var("XDG_CONFIG_HOME") {
        Ok(path) => Path::new(&path).join(APP_NAME),
        Err(_) => {
            let Some(project_dirs) = project_dirs() else {
                return Ok(Default::default());
            };
            project_dirs.config_dir().into()
        }
    };
    match Config::load(&configs_path.join("config.yaml")) {
        Err(ConfigLoadError::NotFound) => Ok(Default::default()),
        other => other,
    }
}

fn log_file_path(cli: &Cli, config: &Config) -> Option<PathBuf> {
    cli.log_file
        .clone()
        .or_else(|| config.logging.path.clone())
        .or_else(|| project_dirs().map(|dirs| dirs.cache_dir().join("purrview.log")))
}

fn list_bindings(config: &Config) {
    for (name, bindings) in config.bindings.iter() {
        let bindings = bindings.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        println!("{name}: {bindings}");
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config_file.as_deref())?;
    if cli.list_bindings {
        list_bindings(&config);
        return Ok(());
    }
    if let Some(path) = log_file_path(&cli, &config) {
        logging::init(&path, &config.logging.level)?;
    }

    let server_url = cli.server_url.as_deref().unwrap_or(&config.server.url);
    let client = HttpApiClient::new(server_url, config.server.timeout())?;
    let protocol = cli.image_protocol.as_ref().unwrap_or(&config.defaults.image_protocol);
    let graphics_mode = GraphicsMode::from(protocol);
    tracing::info!("Using server {server_url} and graphics mode {graphics_mode:?}");

    let app = App::new(Arc::new(client), config, graphics_mode)?;
    app.run()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
