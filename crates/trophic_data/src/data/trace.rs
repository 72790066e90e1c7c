use super::species::Energy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// Energy held by every species at the end of one feeding round.
pub struct RoundEnergies {
    pub index: usize,
    /// Keyed by species id; ordered so serialized traces are byte-stable.
    pub energies: BTreeMap<String, Energy>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
/// Round-by-round record of one simulation run.
pub struct SimulationTrace {
    pub rounds: Vec<RoundEnergies>,
    pub converged: bool,
    /// First round of the stable state, if a fixed point was reached.
    pub converged_at_round: Option<usize>,
}

impl SimulationTrace {
    /// The stable round when converged, otherwise the last simulated round.
    #[must_use]
    pub fn final_round(&self) -> Option<&RoundEnergies> {
        match self.converged_at_round {
            Some(r) => self.rounds.get(r),
            None => self.rounds.last(),
        }
    }

    /// Index of the last round recorded.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.rounds.last().map_or(0, |r| r.index)
    }

    /// Energy of `id` in the final round.
    #[must_use]
    pub fn final_energy(&self, id: &str) -> Option<Energy> {
        self.final_round().and_then(|r| r.energies.get(id).copied())
    }
}
