use serde::{Deserialize, Deserializer};

pub(crate) type ActorId = i64;

/// One actor as recorded for one iteration. Field names follow the wire
/// format; the upstream simulation service's names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Actor {
    pub id: ActorId,
    #[serde(default, alias = "ouro")]
    pub resource: f64,
    #[serde(alias = "posicaox")]
    pub position: f64,
    #[serde(
        default,
        alias = "idCriaturaRoubada",
        deserialize_with = "optional_actor_ref"
    )]
    pub source_of_transfer: Option<ActorId>,
    #[serde(default, deserialize_with = "optional_actor_ref")]
    pub eliminated_target: Option<ActorId>,
    #[serde(default, alias = "foiRoubado")]
    pub robbed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IterationSnapshot {
    #[serde(alias = "iteracao")]
    pub index: u64,
    #[serde(alias = "criaturas")]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub groups: Vec<Actor>,
    #[serde(default)]
    pub guardian: Option<Actor>,
}

impl IterationSnapshot {
    /// Actors, then groups, then the guardian.
    pub(crate) fn all_actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors
            .iter()
            .chain(self.groups.iter())
            .chain(self.guardian.iter())
    }
}

/// Negative ids and `null` are the upstream "no transfer" sentinels.
fn optional_actor_ref<'de, D>(deserializer: D) -> Result<Option<ActorId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<ActorId>::deserialize(deserializer)?;
    Ok(raw.filter(|id| *id >= 0))
}

/// Horizontal extent of every position in a dataset. Computed once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct NormalizationRange {
    pub min_x: f64,
    pub max_x: f64,
}

impl NormalizationRange {
    /// A dataset without any positions yields the degenerate `(0, 0)` range.
    pub(crate) fn from_snapshots(snapshots: &[IterationSnapshot]) -> Self {
        let mut positions = snapshots
            .iter()
            .flat_map(IterationSnapshot::all_actors)
            .map(|actor| actor.position);
        let Some(first) = positions.next() else {
            return Self {
                min_x: 0.0,
                max_x: 0.0,
            };
        };
        positions.fold(
            Self {
                min_x: first,
                max_x: first,
            },
            |range, x| Self {
                min_x: range.min_x.min(x),
                max_x: range.max_x.max(x),
            },
        )
    }

    pub(crate) fn is_degenerate(&self) -> bool {
        self.min_x == self.max_x
    }
}
