//! Per-entity jump animation.
//!
//! An entity idles until the active iteration index differs from the last
//! index it saw. It then jumps for a fixed duration: the vertical offset
//! follows `sin(pi * progress)` and the jump frames are spread evenly over the
//! duration. A new index change mid-jump restarts the jump from frame 0.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimationMode {
    Idle,
    Jumping,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AnimationParams {
    pub jump_duration: f32,
    pub jump_amplitude: f32,
    pub idle_amplitude: f32,
    pub idle_frequency: f32,
    pub jump_frame_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AnimationState {
    mode: AnimationMode,
    frame_index: usize,
    jump_start: f32,
    last_seen_index: usize,
}

/// Result of one tick. `frame_changed` is set whenever the sprite that
/// should be shown differs from the previous tick's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AnimationFrame {
    pub mode: AnimationMode,
    pub frame_index: usize,
    pub vertical_offset: f32,
    pub frame_changed: bool,
}

impl AnimationState {
    /// Entities first seen mid-playback start idle at the current index.
    pub(crate) fn new(active_index: usize) -> Self {
        Self {
            mode: AnimationMode::Idle,
            frame_index: 0,
            jump_start: 0.0,
            last_seen_index: active_index,
        }
    }

    /// `now` is seconds since playback started; `phase` desynchronises the
    /// idle bob between entities.
    pub(crate) fn tick(
        &mut self,
        active_index: usize,
        now: f32,
        phase: f32,
        params: &AnimationParams,
    ) -> AnimationFrame {
        let mut frame_changed = false;
        if active_index != self.last_seen_index {
            self.last_seen_index = active_index;
            frame_changed = self.mode == AnimationMode::Idle || self.frame_index != 0;
            self.mode = AnimationMode::Jumping;
            self.jump_start = now;
            self.frame_index = 0;
        }

        let vertical_offset = match self.mode {
            AnimationMode::Jumping => {
                let progress = jump_progress(now - self.jump_start, params.jump_duration);
                if progress >= 1.0 {
                    self.mode = AnimationMode::Idle;
                    self.frame_index = 0;
                    frame_changed = true;
                    idle_offset(now, phase, params)
                } else {
                    let frame_index = jump_frame_index(progress, params.jump_frame_count);
                    if frame_index != self.frame_index {
                        self.frame_index = frame_index;
                        frame_changed = true;
                    }
                    (PI * progress).sin() * params.jump_amplitude
                }
            }
            AnimationMode::Idle => idle_offset(now, phase, params),
        };

        AnimationFrame {
            mode: self.mode,
            frame_index: self.frame_index,
            vertical_offset,
            frame_changed,
        }
    }
}

/// `min(elapsed / duration, 1)`, never negative. A non-positive duration
/// completes immediately.
pub(crate) fn jump_progress(elapsed: f32, duration: f32) -> f32 {
    if !(duration > 0.0) {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

pub(crate) fn jump_frame_index(progress: f32, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let index = (progress.clamp(0.0, 1.0) * frame_count as f32).floor() as usize;
    index.min(frame_count - 1)
}

fn idle_offset(now: f32, phase: f32, params: &AnimationParams) -> f32 {
    (now * params.idle_frequency + phase).sin() * params.idle_amplitude
}
