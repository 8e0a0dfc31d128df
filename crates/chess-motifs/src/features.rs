//! Per-game aggregate of detector output.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::motif::Motif;
use crate::occurrence::MotifOccurrence;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFeatures {
    /// Full-move number of the final position.
    pub num_moves: u32,
    pub occurrences: BTreeMap<Motif, Vec<MotifOccurrence>>,
}

impl GameFeatures {
    pub fn new(num_moves: u32) -> Self {
        Self {
            num_moves,
            occurrences: BTreeMap::new(),
        }
    }

    /// Append occurrences for `motif`. Empty batches leave no entry.
    pub fn insert(&mut self, motif: Motif, occurrences: Vec<MotifOccurrence>) {
        if occurrences.is_empty() {
            return;
        }
        self.occurrences.entry(motif).or_default().extend(occurrences);
    }

    pub fn occurrences_of(&self, motif: Motif) -> &[MotifOccurrence] {
        self.occurrences
            .get(&motif)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Motifs with at least one stored occurrence.
    pub fn found(&self) -> BTreeSet<Motif> {
        self.occurrences
            .iter()
            .filter(|(_, occs)| !occs.is_empty())
            .map(|(motif, _)| *motif)
            .collect()
    }

    /// Presence of any motif, attack-derived ones included. This is the
    /// value a store writes into the `has_<motif>` flag column.
    pub fn has_motif(&self, motif: Motif) -> bool {
        self.motif_count(motif) > 0
    }

    /// Count with the same grouping the fact-table SQL uses: one per
    /// `(ply, attacker)` group for forks, one per ply for double checks and
    /// one per row otherwise.
    pub fn motif_count(&self, motif: Motif) -> usize {
        let attacks = self.occurrences_of(Motif::Attack);
        match motif {
            Motif::Fork => {
                let from_attacks = fork_groups(attacks.iter());
                if from_attacks > 0 {
                    from_attacks
                } else {
                    fork_groups(self.occurrences_of(Motif::Fork).iter())
                }
            }
            Motif::DiscoveredAttack => attacks.iter().filter(|o| o.is_discovered).count(),
            Motif::Checkmate => attacks.iter().filter(|o| o.is_mate).count(),
            Motif::DiscoveredCheck => attacks
                .iter()
                .filter(|o| o.is_discovered && o.targets_king())
                .count(),
            Motif::DoubleCheck => {
                let mut per_ply: BTreeMap<u32, usize> = BTreeMap::new();
                for occ in attacks.iter().filter(|o| o.targets_king()) {
                    *per_ply.entry(occ.ply).or_default() += 1;
                }
                per_ply.values().filter(|&&n| n >= 2).count()
            }
            _ => self.occurrences_of(motif).len(),
        }
    }
}

/// Number of `(ply, attacker)` groups of direct attacks with two or more targets.
fn fork_groups<'a>(occurrences: impl Iterator<Item = &'a MotifOccurrence>) -> usize {
    let mut sizes: BTreeMap<(u32, &str), usize> = BTreeMap::new();
    for occ in occurrences.filter(|o| !o.is_discovered) {
        if let Some(attacker) = occ.attacker.as_deref() {
            *sizes.entry((occ.ply, attacker)).or_default() += 1;
        }
    }
    sizes.values().filter(|&&n| n >= 2).count()
}

/// Plies at which `motif` fires, derived the same way as [`GameFeatures::motif_count`].
pub fn motif_plies(features: &GameFeatures, motif: Motif) -> HashSet<u32> {
    let attacks = features.occurrences_of(Motif::Attack);
    match motif {
        Motif::Fork | Motif::DoubleCheck => {
            let mut groups: BTreeMap<(u32, String), usize> = BTreeMap::new();
            for occ in attacks {
                let key = if motif == Motif::Fork {
                    if occ.is_discovered {
                        continue;
                    }
                    match occ.attacker.as_deref() {
                        Some(a) => (occ.ply, a.to_string()),
                        None => continue,
                    }
                } else {
                    if !occ.targets_king() {
                        continue;
                    }
                    (occ.ply, String::new())
                };
                *groups.entry(key).or_default() += 1;
            }
            groups
                .into_iter()
                .filter(|(_, n)| *n >= 2)
                .map(|((ply, _), _)| ply)
                .collect()
        }
        Motif::DiscoveredAttack => attacks.iter().filter(|o| o.is_discovered).map(|o| o.ply).collect(),
        Motif::Checkmate => attacks.iter().filter(|o| o.is_mate).map(|o| o.ply).collect(),
        Motif::DiscoveredCheck => attacks
            .iter()
            .filter(|o| o.is_discovered && o.targets_king())
            .map(|o| o.ply)
            .collect(),
        _ => features.occurrences_of(motif).iter().map(|o| o.ply).collect(),
    }
}
