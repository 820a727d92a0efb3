mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cinescout_search::{QueryController, SearchSettings, SearchState};
use cinescout_tmdb::{MovieCatalog, TmdbClient};
use cinescout_trending::{AppwriteStore, TrendingAggregator, TrendingStore};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cinescout")]
#[command(about = "Search movies from the terminal; each stdin line replaces the query")]
struct Cli {
    /// Quiet period after the last line before it is searched.
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Number of entries on the trending rail.
    #[arg(long)]
    trending_limit: Option<usize>,
}

impl Cli {
    fn apply(&self, mut settings: SearchSettings) -> SearchSettings {
        if let Some(ms) = self.debounce_ms {
            settings.debounce = Duration::from_millis(ms);
        }
        if let Some(limit) = self.trending_limit {
            settings.trending_limit = limit;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cinescout_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout belongs to the rendered state.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = cli.apply(SearchSettings::from_config(&config));
    let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::from_config(&config)?);
    let store: Arc<dyn TrendingStore> = Arc::new(AppwriteStore::from_config(&config)?);
    let trending = Arc::new(TrendingAggregator::new(
        store,
        config.tmdb_image_base_url.clone(),
    ));

    tracing::info!(
        env = %config.env,
        debounce_ms = settings.debounce.as_millis(),
        trending_limit = settings.trending_limit,
        "cinescout starting"
    );

    let controller = QueryController::new(catalog, trending, settings);
    let mut states = controller.subscribe();
    let _driver = controller.mount();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                if let Some(line) = line.context("failed to read stdin")? {
                    controller.set_input(line);
                } else {
                    drain(&controller, &mut states, settings).await;
                    break;
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                print!("{}", render::render(&state));
            }
            () = &mut shutdown => break,
        }
    }

    Ok(())
}

/// After stdin closes, lets the last line settle and its fetch land before
/// printing the final state.
async fn drain(
    controller: &QueryController,
    states: &mut watch::Receiver<SearchState>,
    settings: SearchSettings,
) {
    let last = controller.snapshot().raw_input;
    let grace = settings.debounce + Duration::from_secs(15);
    let settled = tokio::time::timeout(
        grace,
        states.wait_for(|s| !s.loading && s.settled_query.as_deref() == Some(last.as_str())),
    )
    .await;

    match settled {
        Ok(Ok(state)) => print!("{}", render::render(&state)),
        Ok(Err(_)) => {}
        Err(_) => tracing::warn!(query = %last, "gave up waiting for the last search"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("received ctrl-c, shutting down");
}
