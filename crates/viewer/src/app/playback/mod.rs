//! Turns a recorded sequence of simulation iterations into animated
//! billboards: normalization, aggregation, jump animation, transfer markers
//! and the playback schedule that drives them.

use std::path::PathBuf;

use goldhop_engine::Scene;

mod aggregate;
mod animation;
mod config;
mod dataset;
mod model;
mod normalize;
mod scene_impl;
mod scheduler;
mod session;
mod sprites;
mod transfer;

pub(crate) use config::{resolve_dataset_path, PlaybackConfig};

use dataset::FileDatasetSource;
use scene_impl::PlaybackScene;
use session::PlaybackSession;

pub(crate) fn build_scene(dataset_path: PathBuf, config: PlaybackConfig) -> Box<dyn Scene> {
    let source = FileDatasetSource::new(dataset_path);
    Box::new(PlaybackScene::new(PlaybackSession::new(
        Box::new(source),
        config,
    )))
}
