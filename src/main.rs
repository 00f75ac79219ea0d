use clap::{Parser, Subcommand};
use folio::config::{self, SiteConfig};
use folio::content::{CachedStore, ContentStore, MemoryStore, SanityClient, client};
use folio::output;
use folio::server::{self, AppState, Route};
use folio::sort::SortOrder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Where content comes from: the live store, or a dataset export.
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Serve from a dataset export (NDJSON or JSON array) instead of the live store
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio site server backed by a headless content store")]
#[command(long_about = "\
Portfolio site server backed by a headless content store

Pages, projects and site settings are authored in a hosted dataset and
fetched per request. Nothing is generated ahead of time.

Routes:

  /                    Site description and featured projects (?sort=newest|oldest|alpha|random)
  /{slug}              A page: body, images, contact details
  /project/{slug}      A project: date, description, image grid, tags, lightbox
  /tag/{tag}           Every project carrying the tag
  /_healthz            Liveness probe

Configuration is read from folio.toml (see 'folio gen-config'). The store
token may be supplied through FOLIO_SANITY_TOKEN instead of the file.")]
#[command(version = env!("FOLIO_VERSION"))]
struct Cli {
    /// Config file
    #[arg(long, default_value = "folio.toml", global = true)]
    config: PathBuf,

    /// Log fetches and requests (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve(SourceArgs),
    /// Fetch settings, navigation and featured projects and print an inventory
    Check(SourceArgs),
    /// Render one route to stdout
    Render {
        /// Route path, e.g. / or /project/tidal
        path: String,
        /// Sort order for the home page
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config;

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Serve(source) => {
            let site_config = config::load_config(&config_path)?;
            let (store, label) = open_store(&site_config, source.export.as_deref())?;
            output::print_serve_banner(
                &site_config.server.host,
                site_config.server.port,
                &label,
                site_config.server.revalidate_secs,
            );
            server::run_server(AppState::new(store, site_config)).await?;
        }
        Command::Check(source) => {
            let site_config = config::load_config(&config_path)?;
            let (store, label) = open_store(&site_config, source.export.as_deref())?;
            let (settings, nav_pages, featured, description) = tokio::try_join!(
                store.site_settings(),
                store.nav_pages(),
                store.featured_projects(),
                store.site_description(),
            )?;
            let state = AppState::new(store, site_config);
            let nav = folio::nav::assemble_nav(&nav_pages, &state.config.site.nav_priority);
            output::print_check_output(
                &output::Inventory {
                    source: &label,
                    settings: settings.as_ref(),
                    description: description.as_ref(),
                    nav: &nav,
                    featured: &featured,
                },
                &state.images,
            );
        }
        Command::Render { path, sort, source } => {
            let route = Route::parse(&path).ok_or_else(|| format!("not a site route: {path}"))?;
            let site_config = config::load_config(&config_path)?;
            let (store, _) = open_store(&site_config, source.export.as_deref())?;
            let state = AppState::new(store, site_config);
            let html = server::render_route(&state, &route, sort).await?;
            println!("{}", html.into_string());
        }
    }

    Ok(())
}

/// `--verbose` wins; otherwise `RUST_LOG`, defaulting to warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("folio=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the content store, wrapped in the revalidation cache. Returns a
/// label describing the source for CLI output.
fn open_store(
    config: &SiteConfig,
    export: Option<&Path>,
) -> Result<(Arc<dyn ContentStore>, String), Box<dyn std::error::Error>> {
    let window = Duration::from_secs(config.server.revalidate_secs);
    match export {
        Some(path) => {
            let store = MemoryStore::from_export(path)?;
            let label = format!("export {}", path.display());
            Ok((Arc::new(CachedStore::new(store, window)), label))
        }
        None => {
            if config.content.project_id.is_empty() {
                return Err(config::ConfigError::Validation(
                    "content.project_id is required to query the live store (or pass --export FILE)".into(),
                )
                .into());
            }
            let store = SanityClient::new(&config.content)?;
            Ok((Arc::new(CachedStore::new(store, window)), client::query_endpoint(&config.content)))
        }
    }
}
