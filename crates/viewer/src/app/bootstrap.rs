use std::sync::Arc;

use goldhop_engine::{
    resolve_app_paths, AssetSource, DiskSpriteSource, LoopConfig, Scene, StartupError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::playback::{self, PlaybackConfig};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) sprites: Arc<dyn AssetSource>,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let paths = resolve_app_paths()?;
    let lookup = |name: &str| std::env::var(name).ok();
    let dataset_path =
        playback::resolve_dataset_path(std::env::args().nth(1), lookup, &paths.dataset_dir);
    let playback_config = PlaybackConfig::from_lookup(lookup);
    info!(
        root = %paths.root.display(),
        dataset = %dataset_path.display(),
        end_policy = ?playback_config.end_policy,
        mode = playback_config.mode.as_str(),
        advance_secs = playback_config.advance_interval_seconds,
        "playback_config"
    );

    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: playback::build_scene(dataset_path, playback_config),
        sprites: Arc::new(DiskSpriteSource::new(paths.asset_dir)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
