//! The score context contract.
//!
//! A score context is built for one logical feature, populated by a single
//! walk over its members ([`walk`]) and then asked for owners and points.
//! Contexts are single use and never stored.

use std::collections::BTreeMap;

use crate::board::{Board, Feature, FeatureKind, Meeple};
use crate::core::{FeatureId, MeepleId, PlayerId, PointCategory, ScoringError};

/// Rule switches declared by capabilities in `configure_rules`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoringRules {
    /// A city may feed at most one farm per player in a batched pass.
    pub dedupe_cities: bool,
    /// Besieged cities count twice for farms.
    pub besiege_tracking: bool,
}

impl ScoringRules {
    /// Combine switches from several capabilities.
    #[must_use]
    pub fn merge(self, other: ScoringRules) -> Self {
        Self {
            dedupe_cities: self.dedupe_cities || other.dedupe_cities,
            besiege_tracking: self.besiege_tracking || other.besiege_tracking,
        }
    }
}

#[derive(Clone, Debug)]
struct OwnerEntry {
    strength: u32,
    sample: MeepleId,
}

/// Follower strength per player on one logical feature.
///
/// ```
/// use rust_cloister::board::{Meeple, MeepleKind};
/// use rust_cloister::core::{MeepleId, PlayerId};
/// use rust_cloister::scoring::OwnerTally;
///
/// let meeple = |id, player, kind| Meeple {
///     id: MeepleId::new(id),
///     player: PlayerId::new(player),
///     kind,
///     feature: None,
///     position: None,
/// };
///
/// let mut tally = OwnerTally::default();
/// tally.record(&meeple(0, 0, MeepleKind::Follower));
/// tally.record(&meeple(1, 1, MeepleKind::Follower));
/// tally.record(&meeple(2, 1, MeepleKind::Pig));
///
/// // Pigs never count, so this is a tie.
/// assert_eq!(tally.major_owners(), vec![PlayerId::new(0), PlayerId::new(1)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct OwnerTally {
    entries: BTreeMap<PlayerId, OwnerEntry>,
}

impl OwnerTally {
    /// Count a meeple by its strength. Figures of strength 0 are ignored.
    pub fn record(&mut self, meeple: &Meeple) {
        self.record_with_strength(meeple.player, meeple.id, meeple.kind.strength());
    }

    /// Count a figure with an explicit strength (barns count 1 on a barn
    /// context).
    pub fn record_with_strength(&mut self, player: PlayerId, meeple: MeepleId, strength: u32) {
        if strength == 0 {
            return;
        }
        self.entries
            .entry(player)
            .or_insert(OwnerEntry { strength: 0, sample: meeple })
            .strength += strength;
    }

    /// Players sharing the highest strength, in player order. Empty if no
    /// follower was recorded.
    #[must_use]
    pub fn major_owners(&self) -> Vec<PlayerId> {
        let Some(max) = self.entries.values().map(|e| e.strength).max() else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|(_, e)| e.strength == max)
            .map(|(&player, _)| player)
            .collect()
    }

    #[must_use]
    pub fn strength(&self, player: PlayerId) -> u32 {
        self.entries.get(&player).map_or(0, |e| e.strength)
    }

    /// First follower of `player` met during the walk.
    #[must_use]
    pub fn sample(&self, player: PlayerId) -> Option<MeepleId> {
        self.entries.get(&player).map(|e| e.sample)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Players with at least one follower.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.entries.keys().copied()
    }
}

/// A context accumulating facts about one logical feature.
pub trait ScoreContext {
    /// Master of the logical feature being scored.
    fn master(&self) -> FeatureId;

    /// Category points are booked under.
    fn category(&self) -> PointCategory;

    /// Account for one member of the logical feature.
    fn visit(&mut self, board: &Board, feature: &Feature);

    fn owners(&self) -> &OwnerTally;

    /// Players with the maximum follower strength.
    fn major_owners(&self) -> Vec<PlayerId> {
        self.owners().major_owners()
    }

    /// A follower of `player` standing on the feature.
    fn sample_follower(&self, player: PlayerId) -> Option<MeepleId> {
        self.owners().sample(player)
    }
}

/// A context for a feature that can be completed and scored on its own.
pub trait CompletableScoreContext: ScoreContext {
    fn is_completed(&self) -> bool;

    /// Points for each majority owner. For features scored incomplete at
    /// the end of the game this is the reduced value.
    fn points(&self) -> u32;
}

/// Visit every member of the context's logical feature exactly once.
pub fn walk<C: ScoreContext + ?Sized>(board: &Board, context: &mut C) {
    for feature in board.members(context.master()) {
        context.visit(board, feature);
    }
}

/// Resolve `id` to its master, checking it exists and has one of `kinds`.
pub(crate) fn master_of(board: &Board, id: FeatureId, kinds: &[FeatureKind]) -> Result<FeatureId, ScoringError> {
    let feature = board.feature(id).ok_or(ScoringError::UnknownFeature(id))?;
    if !kinds.contains(&feature.kind) {
        return Err(ScoringError::WrongKind {
            feature: id,
            kind: feature.kind,
        });
    }
    Ok(board.master(id))
}

/// Record the meeple standing on `feature`, if any.
pub(crate) fn record_meeple(owners: &mut OwnerTally, board: &Board, feature: &Feature) {
    if let Some(meeple) = feature.meeple.and_then(|m| board.meeple(m)) {
        owners.record(meeple);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MeepleKind;

    fn meeple(id: u32, player: u8, kind: MeepleKind) -> Meeple {
        Meeple {
            id: MeepleId::new(id),
            player: PlayerId::new(player),
            kind,
            feature: None,
            position: None,
        }
    }

    #[test]
    fn test_empty_tally_has_no_owners() {
        assert!(OwnerTally::default().major_owners().is_empty());
    }

    #[test]
    fn test_large_follower_wins() {
        let mut tally = OwnerTally::default();
        tally.record(&meeple(0, 0, MeepleKind::Follower));
        tally.record(&meeple(1, 0, MeepleKind::Follower));
        tally.record(&meeple(2, 1, MeepleKind::LargeFollower));
        tally.record(&meeple(3, 2, MeepleKind::LargeFollower));
        tally.record(&meeple(4, 2, MeepleKind::Follower));

        assert_eq!(tally.major_owners(), vec![PlayerId::new(2)]);
        assert_eq!(tally.strength(PlayerId::new(0)), 2);
        assert_eq!(tally.sample(PlayerId::new(2)), Some(MeepleId::new(3)));
    }

    #[test]
    fn test_pig_alone_owns_nothing() {
        let mut tally = OwnerTally::default();
        tally.record(&meeple(0, 0, MeepleKind::Pig));
        tally.record(&meeple(1, 0, MeepleKind::Barn));
        assert!(tally.is_empty());
    }

    #[test]
    fn test_rules_merge() {
        let dedupe = ScoringRules { dedupe_cities: true, ..Default::default() };
        let siege = ScoringRules { besiege_tracking: true, ..Default::default() };
        assert_eq!(
            dedupe.merge(siege),
            ScoringRules { dedupe_cities: true, besiege_tracking: true }
        );
    }
}
