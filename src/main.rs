use clap::{Parser, Subcommand};
use image_browse::config::{self, Overrides, ServerConfig};
use image_browse::{output, scan, server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-browse")]
#[command(about = "Browse a directory of images in the browser")]
#[command(long_about = "\
Browse a directory of images in the browser

Every .jpg, .jpeg, .png, .gif and .bmp file under the directory is listed
newest first on paginated gallery pages, with thumbnails rendered on request.
Requests outside the gallery prefix are forwarded to a reverse proxy upstream.

Routes (default prefix /gallery):

  /gallery/                 gallery page (?page=N)
  /gallery/thumb/?id=N      JPEG thumbnail
  /gallery/image/?id=N      original file
  /gallery/refresh/         rescan the directory (manual refresh only)
  everything else           reverse proxy

Run 'image-browse gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Image directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Listen port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Reverse proxy upstream; empty disables the proxy
    #[arg(long, global = true)]
    rproxy: Option<String>,

    /// Rebuild the index on filesystem changes instead of on /refresh/
    #[arg(long, global = true)]
    watch: bool,

    /// Images per gallery page
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Thumbnail edge length in pixels
    #[arg(long, global = true)]
    thumb_size: Option<u32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the gallery (the default)
    Serve,
    /// Build the index once and print it
    Scan,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            root: self.dir.clone(),
            port: self.port,
            upstream: self.rproxy.clone(),
            page_size: self.page_size,
            thumb_size: self.thumb_size,
            watch: self.watch,
        }
    }

    fn load_config(&self) -> Result<ServerConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ServerConfig::default(),
        };
        config.apply(self.overrides());
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("image_browse=info")),
        )
        .init();

    match cli.command.as_ref().unwrap_or(&Command::Serve) {
        Command::Serve => {
            let config = cli.load_config()?;
            server::run(config).await?;
        }
        Command::Scan => {
            let config = cli.load_config()?;
            let root = config::resolve_root(&config.gallery.root)?;
            let index = tokio::task::spawn_blocking(move || scan::build(&root)).await?;
            output::print_index(&index, config.gallery.page_size);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
