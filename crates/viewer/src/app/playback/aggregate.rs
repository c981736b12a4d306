use super::model::{Actor, ActorId, IterationSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum EntityKind {
    Ordinary,
    Group,
    Guardian,
}

impl EntityKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EntityKind::Ordinary => "actor",
            EntityKind::Group => "group",
            EntityKind::Guardian => "guardian",
        }
    }
}

/// Uniform view of any actor kind for one iteration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderableEntity {
    pub id: ActorId,
    pub kind: EntityKind,
    pub resource: f64,
    pub position: f64,
    pub source_of_transfer: Option<ActorId>,
    pub eliminated_target: Option<ActorId>,
    pub robbed: bool,
}

impl RenderableEntity {
    fn from_actor(actor: &Actor, kind: EntityKind) -> Self {
        let source_of_transfer = match kind {
            EntityKind::Ordinary => actor.source_of_transfer,
            EntityKind::Group | EntityKind::Guardian => None,
        };
        let eliminated_target = match kind {
            EntityKind::Guardian => actor.eliminated_target,
            EntityKind::Ordinary | EntityKind::Group => None,
        };
        Self {
            id: actor.id,
            kind,
            resource: actor.resource,
            position: actor.position,
            source_of_transfer,
            eliminated_target,
            robbed: actor.robbed,
        }
    }
}

/// Resource movement shown for one iteration: a marker travels from
/// `source` to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TransferPair {
    pub source: ActorId,
    pub destination: ActorId,
}

/// Actors, then groups, then the guardian, each in dataset order. Only
/// ordinary actors keep a transfer source; only the guardian keeps an
/// elimination target.
pub(crate) fn aggregate(snapshot: &IterationSnapshot) -> Vec<RenderableEntity> {
    let actors = snapshot
        .actors
        .iter()
        .map(|actor| RenderableEntity::from_actor(actor, EntityKind::Ordinary));
    let groups = snapshot
        .groups
        .iter()
        .map(|actor| RenderableEntity::from_actor(actor, EntityKind::Group));
    let guardian = snapshot
        .guardian
        .iter()
        .map(|actor| RenderableEntity::from_actor(actor, EntityKind::Guardian));
    actors.chain(groups).chain(guardian).collect()
}

/// Position of `id` in the snapshot after `current`, if it is still there.
pub(crate) fn lookahead(
    snapshots: &[IterationSnapshot],
    current: usize,
    id: ActorId,
) -> Option<f64> {
    let next = snapshots.get(current.checked_add(1)?)?;
    next.all_actors()
        .find(|actor| actor.id == id)
        .map(|actor| actor.position)
}

pub(crate) fn transfer_pairs(entities: &[RenderableEntity]) -> Vec<TransferPair> {
    entities
        .iter()
        .filter_map(|entity| {
            entity.source_of_transfer.map(|source| TransferPair {
                source,
                destination: entity.id,
            })
        })
        .collect()
}

/// `(guardian, eliminated group)` pairs. Display only.
pub(crate) fn elimination_pairs(entities: &[RenderableEntity]) -> Vec<(ActorId, ActorId)> {
    entities
        .iter()
        .filter_map(|entity| entity.eliminated_target.map(|target| (entity.id, target)))
        .collect()
}
