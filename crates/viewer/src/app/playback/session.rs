//! One playback run at a time: the loaded dataset, its normalization range,
//! the scheduler, and the per-entity render sessions built from them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use goldhop_engine::{AssetLoader, FrameClock, SpriteImage, Vec3};
use tracing::{debug, info, warn};

use super::aggregate::{
    aggregate, elimination_pairs, lookahead, transfer_pairs, EntityKind, RenderableEntity,
    TransferPair,
};
use super::animation::{AnimationMode, AnimationState};
use super::config::PlaybackConfig;
use super::dataset::{validate_dataset, DatasetError, DatasetSource};
use super::model::{ActorId, IterationSnapshot, NormalizationRange};
use super::scheduler::{EndPolicy, PlaybackMode, PlaybackScheduler};
use super::sprites::{entity_sprite_key, SpriteBinding, MARKER_KEY};
use super::transfer::TransferInterpolator;

pub(crate) enum SessionState {
    AwaitingDataset,
    Playing(Box<PlaybackRun>),
    Failed(DatasetError),
}

/// Everything owned by one dataset. Dropped as a whole on restart.
pub(crate) struct PlaybackRun {
    generation: u64,
    snapshots: Vec<IterationSnapshot>,
    range: NormalizationRange,
    entities: HashMap<ActorId, EntitySession>,
    transfers: TransferInterpolator,
    marker: SpriteBinding,
}

impl PlaybackRun {
    fn new(snapshots: Vec<IterationSnapshot>, generation: u64) -> Self {
        let range = NormalizationRange::from_snapshots(&snapshots);
        Self {
            generation,
            snapshots,
            range,
            entities: HashMap::new(),
            transfers: TransferInterpolator::new(),
            marker: SpriteBinding::for_marker(),
        }
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn range(&self) -> NormalizationRange {
        self.range
    }

    #[cfg(test)]
    pub(crate) fn tracked_entity_count(&self) -> usize {
        self.entities.len()
    }
}

struct EntitySession {
    kind: EntityKind,
    animation: AnimationState,
    sprite: SpriteBinding,
}

impl EntitySession {
    fn new(kind: EntityKind, active_index: usize) -> Self {
        Self {
            kind,
            animation: AnimationState::new(active_index),
            sprite: SpriteBinding::for_entity(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlaybackPosition {
    pub iteration: usize,
    pub len: usize,
    pub terminal: bool,
    pub mode: PlaybackMode,
    pub end_policy: EndPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlaybackStatus {
    Awaiting,
    Failed(String),
    Playing(PlaybackPosition),
}

#[derive(Debug, Clone)]
pub(crate) struct EntityVisual {
    pub id: ActorId,
    pub kind: EntityKind,
    pub image: Option<Arc<SpriteImage>>,
    pub position: Vec3,
    pub scale: f32,
    pub resource: f64,
    pub robbed: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct MarkerVisual {
    pub pair: TransferPair,
    pub image: Option<Arc<SpriteImage>>,
    pub position: Vec3,
    pub scale: f32,
    pub progress: f32,
}

/// Raw stats of one entity for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InspectorRow {
    pub id: ActorId,
    pub kind: EntityKind,
    pub resource: f64,
    pub mode: AnimationMode,
    pub visual_x: f32,
    pub next_x: Option<f32>,
    pub source_of_transfer: Option<ActorId>,
    pub eliminated_target: Option<ActorId>,
}

#[derive(Debug, Clone)]
pub(crate) struct RenderFrame {
    pub status: PlaybackStatus,
    pub entities: Vec<EntityVisual>,
    pub markers: Vec<MarkerVisual>,
    pub eliminations: Vec<(ActorId, ActorId)>,
    pub inspector: Vec<InspectorRow>,
}

impl RenderFrame {
    fn status_only(status: PlaybackStatus) -> Self {
        Self {
            status,
            entities: Vec::new(),
            markers: Vec::new(),
            eliminations: Vec::new(),
            inspector: Vec::new(),
        }
    }
}

pub(crate) struct PlaybackSession {
    source: Box<dyn DatasetSource>,
    config: PlaybackConfig,
    scheduler: PlaybackScheduler,
    state: SessionState,
}

impl PlaybackSession {
    pub(crate) fn new(source: Box<dyn DatasetSource>, config: PlaybackConfig) -> Self {
        let scheduler = PlaybackScheduler::new(
            0,
            config.mode,
            config.end_policy,
            config.advance_interval_seconds,
        );
        Self {
            source,
            config,
            scheduler,
            state: SessionState::AwaitingDataset,
        }
    }

    pub(crate) fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &SessionState {
        &self.state
    }

    /// Fetches the first dataset. Later calls are no-ops; use
    /// [`PlaybackSession::restart`] for a new run.
    pub(crate) fn start(&mut self, assets: &mut AssetLoader) {
        if matches!(self.state, SessionState::AwaitingDataset) {
            self.load_run(assets.generation());
        }
    }

    /// Discards the current run and its in-flight sprite loads, then fetches
    /// a fresh dataset.
    pub(crate) fn restart(&mut self, assets: &mut AssetLoader) {
        self.state = SessionState::AwaitingDataset;
        let generation = assets.begin_generation();
        info!(generation, "playback_restarted");
        self.load_run(generation);
    }

    fn load_run(&mut self, generation: u64) {
        let fetched = self
            .source
            .fetch()
            .and_then(|snapshots| validate_dataset(&snapshots).map(|()| snapshots));
        self.state = match fetched {
            Ok(snapshots) => {
                self.scheduler.restart(snapshots.len());
                let run = PlaybackRun::new(snapshots, generation);
                info!(
                    source = %self.source.describe(),
                    snapshots = run.snapshots.len(),
                    min_x = run.range.min_x,
                    max_x = run.range.max_x,
                    degenerate = run.range.is_degenerate(),
                    generation = run.generation,
                    "dataset_loaded"
                );
                SessionState::Playing(Box::new(run))
            }
            Err(error) => {
                self.scheduler.restart(0);
                warn!(source = %self.source.describe(), error = %error, "dataset_rejected");
                SessionState::Failed(error)
            }
        };
    }

    pub(crate) fn status(&self) -> PlaybackStatus {
        match &self.state {
            SessionState::AwaitingDataset => PlaybackStatus::Awaiting,
            SessionState::Failed(error) => PlaybackStatus::Failed(error.to_string()),
            SessionState::Playing(_) => PlaybackStatus::Playing(PlaybackPosition {
                iteration: self.scheduler.active_index(),
                len: self.scheduler.len(),
                terminal: self.scheduler.is_terminal(),
                mode: self.scheduler.mode(),
                end_policy: self.scheduler.end_policy(),
            }),
        }
    }

    /// Entities of the active iteration; empty unless playing.
    pub(crate) fn active_entities(&self) -> Vec<RenderableEntity> {
        match &self.state {
            SessionState::Playing(run) => run
                .snapshots
                .get(self.scheduler.active_index())
                .map(aggregate)
                .unwrap_or_default(),
            SessionState::AwaitingDataset | SessionState::Failed(_) => Vec::new(),
        }
    }

    /// Automatic driver, called once per fixed update.
    pub(crate) fn update(&mut self, dt_seconds: f32) {
        if !matches!(self.state, SessionState::Playing(_)) {
            return;
        }
        if let Some(iteration) = self.scheduler.tick(dt_seconds) {
            info!(iteration, driver = "auto", "playback_advanced");
        }
    }

    pub(crate) fn step_forward(&mut self) {
        if !matches!(self.state, SessionState::Playing(_)) {
            return;
        }
        if self.scheduler.advance() {
            info!(
                iteration = self.scheduler.active_index(),
                driver = "manual",
                "playback_advanced"
            );
        }
    }

    pub(crate) fn step_back(&mut self) {
        if !matches!(self.state, SessionState::Playing(_)) {
            return;
        }
        if self.scheduler.retreat() {
            info!(
                iteration = self.scheduler.active_index(),
                "playback_stepped_back"
            );
        }
    }

    /// Switches between the timer and manual stepping. The choice survives
    /// restarts.
    pub(crate) fn toggle_mode(&mut self) {
        let mode = self.scheduler.mode().toggled();
        self.scheduler.set_mode(mode);
        info!(mode = mode.as_str(), "playback_mode_changed");
    }

    /// Builds this frame's visuals. `target` is the visible horizontal range
    /// raw positions are normalized into; it is re-read every call.
    pub(crate) fn render_tick(
        &mut self,
        clock: &FrameClock,
        target: (f32, f32),
        assets: &mut AssetLoader,
    ) -> RenderFrame {
        let status = self.status();
        let SessionState::Playing(run) = &mut self.state else {
            return RenderFrame::status_only(status);
        };
        let run = &mut **run;
        let active = self.scheduler.active_index();
        let Some(snapshot) = run.snapshots.get(active) else {
            return RenderFrame::status_only(status);
        };

        let entities = aggregate(snapshot);
        let present: HashSet<ActorId> = entities.iter().map(|entity| entity.id).collect();
        let before = run.entities.len();
        run.entities.retain(|id, _| present.contains(id));
        if run.entities.len() != before {
            debug!(
                dropped = before - run.entities.len(),
                iteration = active,
                "entity_sessions_dropped"
            );
        }

        let params = self.config.animation_params();
        let now = clock.elapsed();
        let mut anchors: HashMap<ActorId, Vec3> = HashMap::with_capacity(entities.len());
        let mut visuals = Vec::with_capacity(entities.len());
        let mut inspector = Vec::with_capacity(entities.len());

        for entity in &entities {
            let session = run
                .entities
                .entry(entity.id)
                .or_insert_with(|| EntitySession::new(entity.kind, active));
            if session.kind != entity.kind {
                *session = EntitySession::new(entity.kind, active);
            }

            let frame = session.animation.tick(active, now, entity.id as f32, &params);
            let key = entity_sprite_key(entity.kind, frame.mode, frame.frame_index);
            let image = session.sprite.want(&key, assets);

            let visual_x = run.range.to_visual(entity.position, target);
            let position = Vec3::new(
                visual_x,
                self.config.baseline_for(entity.kind) + frame.vertical_offset,
                0.0,
            );
            if entity.kind == EntityKind::Ordinary {
                anchors.insert(entity.id, position);
            }

            visuals.push(EntityVisual {
                id: entity.id,
                kind: entity.kind,
                image,
                position,
                scale: self.config.scale_for(entity.kind),
                resource: entity.resource,
                robbed: entity.robbed,
            });
            inspector.push(InspectorRow {
                id: entity.id,
                kind: entity.kind,
                resource: entity.resource,
                mode: frame.mode,
                visual_x,
                next_x: lookahead(&run.snapshots, active, entity.id)
                    .map(|x| run.range.to_visual(x, target)),
                source_of_transfer: entity.source_of_transfer,
                eliminated_target: entity.eliminated_target,
            });
        }

        let pairs = transfer_pairs(&entities);
        let animations = run
            .transfers
            .tick(
                active,
                &pairs,
                |id: ActorId| anchors.get(&id).copied(),
                clock.delta(),
                self.config.transfer_speed,
            )
            .to_vec();
        let marker_image = if animations.is_empty() {
            None
        } else {
            run.marker.want(MARKER_KEY, assets)
        };
        let markers = animations
            .iter()
            .map(|animation| MarkerVisual {
                pair: animation.pair,
                image: marker_image.clone(),
                position: animation.position(),
                scale: self.config.marker_scale,
                progress: animation.progress,
            })
            .collect();

        RenderFrame {
            status,
            entities: visuals,
            markers,
            eliminations: elimination_pairs(&entities),
            inspector,
        }
    }
}
