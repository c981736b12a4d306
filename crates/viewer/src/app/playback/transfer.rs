use std::collections::HashSet;

use goldhop_engine::Vec3;
use tracing::warn;

use super::aggregate::TransferPair;
use super::model::ActorId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransferAnimation {
    pub pair: TransferPair,
    pub start: Vec3,
    pub end: Vec3,
    pub progress: f32,
}

impl TransferAnimation {
    pub(crate) fn position(&self) -> Vec3 {
        self.start.lerp(self.end, self.progress)
    }
}

/// Marker animations for the transfers of the active iteration.
///
/// Progress only grows while the iteration stays the same and is reset to 0
/// when the iteration changes. A pair whose source or destination is missing
/// from the iteration is skipped and logged once.
#[derive(Debug, Default)]
pub(crate) struct TransferInterpolator {
    iteration: Option<usize>,
    active: Vec<TransferAnimation>,
    warned_missing: HashSet<(usize, TransferPair)>,
}

impl TransferInterpolator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn active(&self) -> &[TransferAnimation] {
        &self.active
    }

    pub(crate) fn reset(&mut self) {
        self.iteration = None;
        self.active.clear();
        self.warned_missing.clear();
    }

    /// Advances every marker by `dt * speed`. Endpoints are re-resolved each
    /// tick so markers follow their actors.
    pub(crate) fn tick<F>(
        &mut self,
        iteration: usize,
        pairs: &[TransferPair],
        resolve: F,
        dt: f32,
        speed: f32,
    ) -> &[TransferAnimation]
    where
        F: Fn(ActorId) -> Option<Vec3>,
    {
        let step = if dt.is_finite() && speed.is_finite() {
            (dt * speed).max(0.0)
        } else {
            0.0
        };
        let iteration_changed = self.iteration != Some(iteration);
        if iteration_changed {
            self.iteration = Some(iteration);
            self.active.clear();
        }

        let mut next = Vec::with_capacity(pairs.len());
        for pair in pairs {
            if next.iter().any(|anim: &TransferAnimation| anim.pair == *pair) {
                continue;
            }
            let (Some(start), Some(end)) = (resolve(pair.source), resolve(pair.destination)) else {
                if self.warned_missing.insert((iteration, *pair)) {
                    warn!(
                        iteration,
                        source = pair.source,
                        destination = pair.destination,
                        "transfer_reference_missing"
                    );
                }
                continue;
            };
            let progress = self
                .active
                .iter()
                .find(|anim| anim.pair == *pair)
                .map(|anim| (anim.progress + step).min(1.0))
                .unwrap_or(0.0);
            next.push(TransferAnimation {
                pair: *pair,
                start,
                end,
                progress,
            });
        }
        self.active = next;
        &self.active
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SPEED: f32 = 2.0;

    fn pair(source: ActorId, destination: ActorId) -> TransferPair {
        TransferPair {
            source,
            destination,
        }
    }

    fn positions() -> HashMap<ActorId, Vec3> {
        HashMap::from([
            (1, Vec3::new(-4.0, -1.5, 0.0)),
            (2, Vec3::new(4.0, -1.5, 0.0)),
            (3, Vec3::new(0.0, -1.5, 0.0)),
        ])
    }

    #[test]
    fn new_pair_starts_at_source_and_reaches_destination() {
        let lookup = positions();
        let resolve = |id: ActorId| lookup.get(&id).copied();
        let mut transfers = TransferInterpolator::new();

        let first = transfers.tick(0, &[pair(1, 2)], resolve, 0.1, SPEED)[0];
        assert_eq!(first.progress, 0.0);
        assert_eq!(first.position(), Vec3::new(-4.0, -1.5, 0.0));

        let half = transfers.tick(0, &[pair(1, 2)], resolve, 0.25, SPEED)[0];
        assert!((half.progress - 0.5).abs() < 1e-6);
        assert_eq!(half.position(), Vec3::new(0.0, -1.5, 0.0));

        let done = transfers.tick(0, &[pair(1, 2)], resolve, 5.0, SPEED)[0];
        assert_eq!(done.progress, 1.0);
        assert_eq!(done.position(), Vec3::new(4.0, -1.5, 0.0));
    }

    #[test]
    fn progress_never_decreases_within_an_iteration() {
        let lookup = positions();
        let resolve = |id: ActorId| lookup.get(&id).copied();
        let mut transfers = TransferInterpolator::new();
        let mut last = 0.0;
        for dt in [0.0, 0.016, 0.1, -0.5, f32::NAN, 0.033, 1.0] {
            let progress = transfers.tick(3, &[pair(1, 2)], resolve, dt, SPEED)[0].progress;
            assert!(progress >= last);
            assert!(progress <= 1.0);
            last = progress;
        }
    }

    #[test]
    fn iteration_change_resets_progress() {
        let lookup = positions();
        let resolve = |id: ActorId| lookup.get(&id).copied();
        let mut transfers = TransferInterpolator::new();
        transfers.tick(0, &[pair(1, 2)], resolve, 0.0, SPEED);
        transfers.tick(0, &[pair(1, 2)], resolve, 0.3, SPEED);

        let after = transfers.tick(1, &[pair(1, 2)], resolve, 0.3, SPEED)[0];
        assert_eq!(after.progress, 0.0);
    }

    #[test]
    fn missing_reference_skips_only_that_pair() {
        let lookup = positions();
        let resolve = |id: ActorId| lookup.get(&id).copied();
        let mut transfers = TransferInterpolator::new();

        let active = transfers.tick(1, &[pair(7, 1), pair(3, 2)], resolve, 0.1, SPEED);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].pair, pair(3, 2));

        transfers.tick(1, &[pair(7, 1), pair(3, 2)], resolve, 0.1, SPEED);
        assert_eq!(transfers.warned_missing.len(), 1);
    }

    #[test]
    fn vanished_pair_is_dropped_and_restarts_if_it_returns() {
        let lookup = positions();
        let resolve = |id: ActorId| lookup.get(&id).copied();
        let mut transfers = TransferInterpolator::new();
        transfers.tick(0, &[pair(1, 2)], resolve, 0.0, SPEED);
        transfers.tick(0, &[pair(1, 2)], resolve, 0.2, SPEED);

        assert!(transfers.tick(0, &[], resolve, 0.2, SPEED).is_empty());
        let back = transfers.tick(0, &[pair(1, 2)], resolve, 0.2, SPEED)[0];
        assert_eq!(back.progress, 0.0);
    }

    #[test]
    fn endpoints_follow_moving_actors() {
        let mut lookup = positions();
        let mut transfers = TransferInterpolator::new();
        transfers.tick(0, &[pair(1, 2)], |id: ActorId| lookup.get(&id).copied(), 0.0, SPEED);

        lookup.insert(2, Vec3::new(6.0, -1.5, 0.0));
        let moved = transfers.tick(0, &[pair(1, 2)], |id: ActorId| lookup.get(&id).copied(), 0.0, SPEED)[0];
        assert_eq!(moved.end, Vec3::new(6.0, -1.5, 0.0));
    }
}
