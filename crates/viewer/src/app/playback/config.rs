use std::path::{Path, PathBuf};

use tracing::warn;

use super::aggregate::EntityKind;
use super::animation::AnimationParams;
use super::scheduler::{EndPolicy, PlaybackMode};
use super::sprites::JUMP_FRAMES;

pub(crate) const DATASET_ENV_VAR: &str = "GOLDHOP_DATASET";
pub(crate) const END_POLICY_ENV_VAR: &str = "GOLDHOP_END_POLICY";
pub(crate) const PLAYBACK_ENV_VAR: &str = "GOLDHOP_PLAYBACK";
pub(crate) const ADVANCE_SECS_ENV_VAR: &str = "GOLDHOP_ADVANCE_SECS";
pub(crate) const DEFAULT_DATASET_FILE: &str = "demo.json";
pub(crate) const DEFAULT_ADVANCE_SECONDS: f32 = 3.0;

/// Policy values for one playback. All times are seconds, all sizes world
/// units.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlaybackConfig {
    pub advance_interval_seconds: f32,
    pub end_policy: EndPolicy,
    pub mode: PlaybackMode,
    pub jump_duration_seconds: f32,
    pub jump_amplitude: f32,
    pub idle_amplitude: f32,
    pub idle_frequency: f32,
    pub transfer_speed: f32,
    pub marker_scale: f32,
    pub actor_scale: f32,
    pub group_scale: f32,
    pub guardian_scale: f32,
    pub horizontal_margin: f32,
    pub ground_y: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            advance_interval_seconds: DEFAULT_ADVANCE_SECONDS,
            end_policy: EndPolicy::Halt,
            mode: PlaybackMode::Automatic,
            jump_duration_seconds: 0.6,
            jump_amplitude: 1.0,
            idle_amplitude: 0.2,
            idle_frequency: 5.0,
            transfer_speed: 2.0,
            marker_scale: 0.75,
            actor_scale: 2.0,
            group_scale: 3.0,
            guardian_scale: 3.5,
            horizontal_margin: 1.0,
            ground_y: -1.5,
        }
    }
}

impl PlaybackConfig {
    /// Applies overrides from `lookup`; invalid values are logged and the
    /// default is kept.
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(END_POLICY_ENV_VAR) {
            match parse_end_policy(&raw) {
                Some(policy) => config.end_policy = policy,
                None => warn_invalid(END_POLICY_ENV_VAR, &raw, "halt|wrap"),
            }
        }
        if let Some(raw) = lookup(PLAYBACK_ENV_VAR) {
            match parse_mode(&raw) {
                Some(mode) => config.mode = mode,
                None => warn_invalid(PLAYBACK_ENV_VAR, &raw, "auto|manual"),
            }
        }
        if let Some(raw) = lookup(ADVANCE_SECS_ENV_VAR) {
            match parse_positive_seconds(&raw) {
                Some(seconds) => config.advance_interval_seconds = seconds,
                None => warn_invalid(ADVANCE_SECS_ENV_VAR, &raw, "positive number"),
            }
        }
        config
    }

    pub(crate) fn animation_params(&self) -> AnimationParams {
        AnimationParams {
            jump_duration: self.jump_duration_seconds,
            jump_amplitude: self.jump_amplitude,
            idle_amplitude: self.idle_amplitude,
            idle_frequency: self.idle_frequency,
            jump_frame_count: JUMP_FRAMES.len(),
        }
    }

    pub(crate) fn scale_for(&self, kind: EntityKind) -> f32 {
        match kind {
            EntityKind::Ordinary => self.actor_scale,
            EntityKind::Group => self.group_scale,
            EntityKind::Guardian => self.guardian_scale,
        }
    }

    /// Height of an entity's centre when it is at rest.
    pub(crate) fn baseline_for(&self, kind: EntityKind) -> f32 {
        self.ground_y + self.scale_for(kind) * 0.5
    }
}

/// CLI argument, then `GOLDHOP_DATASET`, then the bundled demo dataset.
pub(crate) fn resolve_dataset_path<F>(cli_arg: Option<String>, lookup: F, dataset_dir: &Path) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    cli_arg
        .filter(|arg| !arg.trim().is_empty())
        .or_else(|| lookup(DATASET_ENV_VAR).filter(|value| !value.trim().is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| dataset_dir.join(DEFAULT_DATASET_FILE))
}

fn parse_end_policy(raw: &str) -> Option<EndPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "halt" => Some(EndPolicy::Halt),
        "wrap" => Some(EndPolicy::Wrap),
        _ => None,
    }
}

fn parse_mode(raw: &str) -> Option<PlaybackMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "auto" | "automatic" => Some(PlaybackMode::Automatic),
        "manual" => Some(PlaybackMode::Manual),
        _ => None,
    }
}

fn parse_positive_seconds(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
}

fn warn_invalid(var: &'static str, value: &str, expected: &'static str) {
    warn!(var, value, expected, "config_value_invalid");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_halt_in_automatic_mode() {
        let config = PlaybackConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, PlaybackConfig::default());
        assert_eq!(config.end_policy, EndPolicy::Halt);
        assert_eq!(config.mode, PlaybackMode::Automatic);
        assert_eq!(config.advance_interval_seconds, 3.0);
    }

    #[test]
    fn valid_overrides_apply() {
        let config = PlaybackConfig::from_lookup(lookup_from(&[
            (END_POLICY_ENV_VAR, " Wrap "),
            (PLAYBACK_ENV_VAR, "manual"),
            (ADVANCE_SECS_ENV_VAR, "0.5"),
        ]));
        assert_eq!(config.end_policy, EndPolicy::Wrap);
        assert_eq!(config.mode, PlaybackMode::Manual);
        assert_eq!(config.advance_interval_seconds, 0.5);
    }

    #[test]
    fn invalid_overrides_keep_defaults() {
        let config = PlaybackConfig::from_lookup(lookup_from(&[
            (END_POLICY_ENV_VAR, "loop"),
            (PLAYBACK_ENV_VAR, ""),
            (ADVANCE_SECS_ENV_VAR, "-2"),
        ]));
        assert_eq!(config, PlaybackConfig::default());

        let config = PlaybackConfig::from_lookup(lookup_from(&[(ADVANCE_SECS_ENV_VAR, "NaN")]));
        assert_eq!(config.advance_interval_seconds, 3.0);
    }

    #[test]
    fn animation_params_use_every_jump_frame() {
        let params = PlaybackConfig::default().animation_params();
        assert_eq!(params.jump_frame_count, JUMP_FRAMES.len());
        assert_eq!(params.jump_duration, 0.6);
    }

    #[test]
    fn larger_kinds_rest_higher() {
        let config = PlaybackConfig::default();
        assert!(config.baseline_for(EntityKind::Guardian) > config.baseline_for(EntityKind::Group));
        assert!(config.baseline_for(EntityKind::Group) > config.baseline_for(EntityKind::Ordinary));
        assert_eq!(config.baseline_for(EntityKind::Ordinary), -0.5);
    }

    #[test]
    fn dataset_path_prefers_cli_then_env_then_default() {
        let dir = Path::new("/data");
        let env = lookup_from(&[(DATASET_ENV_VAR, "/env/run.json")]);
        assert_eq!(
            resolve_dataset_path(Some("cli.json".to_string()), &env, dir),
            PathBuf::from("cli.json")
        );
        assert_eq!(
            resolve_dataset_path(None, &env, dir),
            PathBuf::from("/env/run.json")
        );
        assert_eq!(
            resolve_dataset_path(Some("  ".to_string()), lookup_from(&[]), dir),
            dir.join(DEFAULT_DATASET_FILE)
        );
    }
}
