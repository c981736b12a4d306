//! Sprite keys and the per-entity binding between a wanted sprite and the
//! image currently shown.

use std::sync::Arc;

use goldhop_engine::{AssetHandle, AssetLoader, AssetPoll, SpriteImage};

use super::aggregate::EntityKind;
use super::animation::AnimationMode;

pub(crate) const IDLE_FRAME: &str = "idle_1";
/// Takeoff, rise, apex, fall, landing, recover.
pub(crate) const JUMP_FRAMES: [&str; 6] = ["jump_1", "jump_2", "jump_3", "jump_4", "jump_5", "jump_6"];
pub(crate) const MARKER_KEY: &str = "gold/gold_1";
pub(crate) const BACKDROP_KEY: &str = "scenery/backdrop";

const MARKER_PLACEHOLDER_COLOR: [u8; 4] = [240, 196, 32, 255];

fn sprite_family(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Ordinary | EntityKind::Group => "dino",
        EntityKind::Guardian => "guardian",
    }
}

pub(crate) fn entity_sprite_key(kind: EntityKind, mode: AnimationMode, frame_index: usize) -> String {
    let frame = match mode {
        AnimationMode::Idle => IDLE_FRAME,
        AnimationMode::Jumping => JUMP_FRAMES
            .get(frame_index)
            .copied()
            .unwrap_or(JUMP_FRAMES[JUMP_FRAMES.len() - 1]),
    };
    format!("{}/{frame}", sprite_family(kind))
}

fn placeholder_color(kind: EntityKind) -> [u8; 4] {
    match kind {
        EntityKind::Ordinary => [88, 176, 92, 255],
        EntityKind::Group => [64, 148, 168, 255],
        EntityKind::Guardian => [196, 64, 56, 255],
    }
}

/// Keeps the last resolved image on screen while a new key loads. A failed
/// load binds the placeholder, if any, and is never retried within the same
/// asset generation.
#[derive(Debug)]
pub(crate) struct SpriteBinding {
    bound: Option<Arc<SpriteImage>>,
    bound_key: Option<String>,
    pending: Option<AssetHandle>,
    placeholder: Option<Arc<SpriteImage>>,
}

impl SpriteBinding {
    pub(crate) fn new(placeholder: Option<SpriteImage>) -> Self {
        Self {
            bound: None,
            bound_key: None,
            pending: None,
            placeholder: placeholder.map(Arc::new),
        }
    }

    pub(crate) fn for_entity(kind: EntityKind) -> Self {
        Self::new(Some(SpriteImage::solid(16, 16, placeholder_color(kind))))
    }

    pub(crate) fn for_marker() -> Self {
        Self::new(Some(SpriteImage::solid(16, 16, MARKER_PLACEHOLDER_COLOR)))
    }

    pub(crate) fn without_placeholder() -> Self {
        Self::new(None)
    }

    pub(crate) fn bound_key(&self) -> Option<&str> {
        self.bound_key.as_deref()
    }

    /// Image to draw this frame for `key`. `None` until the first load for
    /// this binding resolves.
    pub(crate) fn want(&mut self, key: &str, assets: &mut AssetLoader) -> Option<Arc<SpriteImage>> {
        let settled = self.pending.is_none() && self.bound_key.as_deref() == Some(key);
        if !settled {
            let waiting_for_key = self
                .pending
                .as_ref()
                .is_some_and(|handle| handle.key() == key);
            if !waiting_for_key {
                self.pending = Some(assets.request(key));
            }
        }

        if let Some(handle) = self.pending.take() {
            match assets.poll(&handle) {
                AssetPoll::Pending => self.pending = Some(handle),
                AssetPoll::Ready(image) => {
                    self.bound = Some(image);
                    self.bound_key = Some(key.to_string());
                }
                AssetPoll::Failed(_) => {
                    self.bound = self.placeholder.clone();
                    self.bound_key = Some(key.to_string());
                }
                AssetPoll::Stale => self.pending = Some(assets.request(key)),
            }
        }
        self.bound.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use goldhop_engine::{AssetLoadError, AssetSource};

    use super::*;

    struct MapSource {
        images: HashMap<String, SpriteImage>,
    }

    impl AssetSource for MapSource {
        fn load(&self, key: &str) -> Result<SpriteImage, AssetLoadError> {
            self.images
                .get(key)
                .cloned()
                .ok_or_else(|| AssetLoadError::NotFound {
                    key: key.to_string(),
                })
        }
    }

    fn loader(keys: &[(&str, [u8; 4])]) -> AssetLoader {
        let images = keys
            .iter()
            .map(|(key, color)| (key.to_string(), SpriteImage::solid(2, 2, *color)))
            .collect();
        AssetLoader::spawn(Arc::new(MapSource { images })).expect("loader")
    }

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn keys_follow_kind_and_frame() {
        assert_eq!(
            entity_sprite_key(EntityKind::Ordinary, AnimationMode::Idle, 3),
            "dino/idle_1"
        );
        assert_eq!(
            entity_sprite_key(EntityKind::Group, AnimationMode::Jumping, 2),
            "dino/jump_3"
        );
        assert_eq!(
            entity_sprite_key(EntityKind::Guardian, AnimationMode::Jumping, 99),
            "guardian/jump_6"
        );
    }

    #[test]
    fn nothing_is_drawn_until_the_first_load_resolves() {
        let mut assets = loader(&[("dino/idle_1", [1, 2, 3, 255])]);
        let mut binding = SpriteBinding::for_entity(EntityKind::Ordinary);
        assert!(binding.want("dino/idle_1", &mut assets).is_none());

        assets.pump_blocking(WAIT);
        let image = binding.want("dino/idle_1", &mut assets).expect("bound");
        assert_eq!(image.pixel(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(binding.bound_key(), Some("dino/idle_1"));
    }

    #[test]
    fn previous_image_stays_while_next_frame_loads() {
        let mut assets = loader(&[("dino/idle_1", [1, 0, 0, 255]), ("dino/jump_1", [0, 1, 0, 255])]);
        let mut binding = SpriteBinding::for_entity(EntityKind::Ordinary);
        binding.want("dino/idle_1", &mut assets);
        assets.pump_blocking(WAIT);
        binding.want("dino/idle_1", &mut assets);

        let during = binding.want("dino/jump_1", &mut assets).expect("previous image");
        assert_eq!(during.pixel(0, 0), Some([1, 0, 0, 255]));

        assets.pump_blocking(WAIT);
        let after = binding.want("dino/jump_1", &mut assets).expect("new image");
        assert_eq!(after.pixel(0, 0), Some([0, 1, 0, 255]));
    }

    #[test]
    fn failed_load_binds_the_placeholder() {
        let mut assets = loader(&[]);
        let mut binding = SpriteBinding::for_marker();
        binding.want(MARKER_KEY, &mut assets);
        assets.pump_blocking(WAIT);

        let image = binding.want(MARKER_KEY, &mut assets).expect("placeholder");
        assert_eq!(image.width(), 16);
        assert_eq!(image.pixel(8, 8), Some(MARKER_PLACEHOLDER_COLOR));
    }

    #[test]
    fn failed_load_without_placeholder_draws_nothing() {
        let mut assets = loader(&[]);
        let mut binding = SpriteBinding::without_placeholder();
        binding.want(BACKDROP_KEY, &mut assets);
        assets.pump_blocking(WAIT);
        assert!(binding.want(BACKDROP_KEY, &mut assets).is_none());
    }

    #[test]
    fn stale_handle_is_requested_again_in_the_new_generation() {
        let mut assets = loader(&[("dino/idle_1", [9, 9, 9, 255])]);
        let mut binding = SpriteBinding::for_entity(EntityKind::Ordinary);
        binding.want("dino/idle_1", &mut assets);
        assets.begin_generation();

        assert!(binding.want("dino/idle_1", &mut assets).is_none());
        assets.pump_blocking(WAIT);
        assert!(binding.want("dino/idle_1", &mut assets).is_some());
    }
}
