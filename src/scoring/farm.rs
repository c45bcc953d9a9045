//! Farm scoring.
//!
//! Farms never complete. They are scored at the end of the game, or early
//! when a barn joins them, for the completed cities and castles they touch.
//!
//! ## Per-city value
//!
//! A farm pays `base + pig_herds` per completed city, plus one if the player
//! has a pig on the farm. `base` is 3, or 1 for farms scored because a barn
//! was connected to them. Castles pay one more than a city.
//!
//! ## Closed form and iteration
//!
//! Without a batch, without the duplicate-suppression rule and without
//! besieged neighbours, the total is
//! `per_city * cities + (per_city + 1) * castles`. Otherwise each adjoining
//! city is visited: besieged cities count twice, and inside a batch a city
//! already scored for the player (tracked by [`ScoredCities`]) is skipped.
//! Both paths must agree whenever the closed form applies.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};

use super::city::CityScoreContext;
use super::context::{master_of, walk, CompletableScoreContext, OwnerTally, ScoreContext, ScoringRules};
use crate::board::{Board, Feature, FeatureKind, MeepleKind};
use crate::core::{FeatureId, PlayerId, PointCategory, ScoringError};

/// Per-city base value for farms.
pub const FARM_POINTS_PER_CITY: u32 = 3;
/// Per-city base value for farms scored because of a barn connection.
pub const BARN_CONNECTED_POINTS_PER_CITY: u32 = 1;
/// Barn value of an adjoining completed city.
pub const BARN_POINTS_PER_CITY: u32 = 4;
/// Barn value of an adjoining castle.
pub const BARN_POINTS_PER_CASTLE: u32 = 5;

/// City contexts shared by the farms of one batched pass, keyed by master.
#[derive(Clone, Debug, Default)]
pub struct CityCache {
    cities: FxHashMap<FeatureId, CityScoreContext>,
}

impl CityCache {
    #[must_use]
    pub fn get(&self, master: FeatureId) -> Option<&CityScoreContext> {
        self.cities.get(&master)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Context for the city with master `master`, walking it on first use.
    fn resolve(&mut self, board: &Board, master: FeatureId) -> Option<&CityScoreContext> {
        if !self.cities.contains_key(&master) {
            let context = CityScoreContext::new(board, master).ok()?;
            self.cities.insert(master, context);
        }
        self.cities.get(&master)
    }
}

/// Cities (and castles) already paid out to each player during one batched
/// farm pass.
#[derive(Clone, Debug, Default)]
pub struct ScoredCities {
    by_player: FxHashMap<PlayerId, FxHashSet<FeatureId>>,
}

impl ScoredCities {
    /// Mark `master` as scored for `player`. Returns `false` if it already
    /// was.
    pub fn insert(&mut self, player: PlayerId, master: FeatureId) -> bool {
        self.by_player.entry(player).or_default().insert(master)
    }

    #[must_use]
    pub fn contains(&self, player: PlayerId, master: FeatureId) -> bool {
        self.by_player.get(&player).is_some_and(|s| s.contains(&master))
    }

    /// Number of cities and castles scored for `player`.
    #[must_use]
    pub fn count(&self, player: PlayerId) -> usize {
        self.by_player.get(&player).map_or(0, FxHashSet::len)
    }
}

/// Scratch state of one batched farm pass.
#[derive(Clone, Debug, Default)]
pub struct FarmBatch {
    pub cities: CityCache,
    pub scored: ScoredCities,
}

#[derive(Clone, Debug)]
pub struct FarmScoreContext {
    master: FeatureId,
    owners: OwnerTally,
    barns: OwnerTally,
    pigs: BTreeSet<PlayerId>,
    pig_herds: u32,
    /// Adjoining completed cities, master to besieged.
    cities: BTreeMap<FeatureId, bool>,
    castles: BTreeSet<FeatureId>,
    rules: ScoringRules,
    cache: CityCache,
}

impl FarmScoreContext {
    pub fn new(board: &Board, id: FeatureId, rules: ScoringRules) -> Result<Self, ScoringError> {
        Self::with_cache(board, id, rules, CityCache::default())
    }

    /// Build the context reusing city contexts from an earlier farm of the
    /// same pass. Take the cache back with [`FarmScoreContext::into_cache`].
    pub fn with_cache(
        board: &Board,
        id: FeatureId,
        rules: ScoringRules,
        cache: CityCache,
    ) -> Result<Self, ScoringError> {
        let master = master_of(board, id, &[FeatureKind::Farm])?;
        let mut context = Self {
            master,
            owners: OwnerTally::default(),
            barns: OwnerTally::default(),
            pigs: BTreeSet::new(),
            pig_herds: 0,
            cities: BTreeMap::new(),
            castles: BTreeSet::new(),
            rules,
            cache,
        };
        walk(board, &mut context);
        Ok(context)
    }

    #[must_use]
    pub fn into_cache(self) -> CityCache {
        self.cache
    }

    /// Number of adjoining completed cities.
    #[must_use]
    pub fn city_count(&self) -> u32 {
        self.cities.len() as u32
    }

    #[must_use]
    pub fn castle_count(&self) -> u32 {
        self.castles.len() as u32
    }

    #[must_use]
    pub fn pig_herds(&self) -> u32 {
        self.pig_herds
    }

    #[must_use]
    pub fn has_pig(&self, player: PlayerId) -> bool {
        self.pigs.contains(&player)
    }

    /// Players with barns on this farm.
    #[must_use]
    pub fn barns(&self) -> &OwnerTally {
        &self.barns
    }

    fn any_besieged(&self) -> bool {
        self.cities.values().any(|&besieged| besieged)
    }

    /// Value of one adjoining city for `player`.
    #[must_use]
    pub fn points_per_city(&self, player: PlayerId) -> u32 {
        self.per_city(player, FARM_POINTS_PER_CITY)
    }

    fn per_city(&self, player: PlayerId, base: u32) -> u32 {
        base + self.pig_herds + u32::from(self.has_pig(player))
    }

    /// Farm points for `player`. Pass the pass's [`ScoredCities`] when
    /// scoring in a batch.
    #[must_use]
    pub fn points(&self, player: PlayerId, scored: Option<&mut ScoredCities>) -> u32 {
        self.player_points(player, self.per_city(player, FARM_POINTS_PER_CITY), scored)
    }

    /// Farm points for `player` when a barn was connected to the farm.
    #[must_use]
    pub fn points_when_barn_connected(&self, player: PlayerId, scored: Option<&mut ScoredCities>) -> u32 {
        self.player_points(player, self.per_city(player, BARN_CONNECTED_POINTS_PER_CITY), scored)
    }

    fn player_points(&self, player: PlayerId, per_city: u32, mut scored: Option<&mut ScoredCities>) -> u32 {
        if scored.is_none() && !self.rules.dedupe_cities && !self.any_besieged() {
            return per_city * self.city_count() + (per_city + 1) * self.castle_count();
        }

        let mut fresh = |master: FeatureId| scored.as_deref_mut().map_or(true, |s| s.insert(player, master));
        let mut points = 0;
        for (&master, &besieged) in &self.cities {
            if !fresh(master) {
                continue;
            }
            points += if besieged { 2 * per_city } else { per_city };
        }
        for &castle in &self.castles {
            if fresh(castle) {
                points += per_city + 1;
            }
        }
        points
    }

    /// Points a barn on this farm earns at the end of the game.
    #[must_use]
    pub fn barn_points(&self, player: PlayerId, mut scored: Option<&mut ScoredCities>) -> u32 {
        if scored.is_none() && !self.rules.dedupe_cities && !self.any_besieged() {
            return BARN_POINTS_PER_CITY * self.city_count() + BARN_POINTS_PER_CASTLE * self.castle_count();
        }

        let mut fresh = |master: FeatureId| scored.as_deref_mut().map_or(true, |s| s.insert(player, master));
        let mut points = 0;
        for (&master, &besieged) in &self.cities {
            if fresh(master) {
                points += if besieged { 2 * BARN_POINTS_PER_CITY } else { BARN_POINTS_PER_CITY };
            }
        }
        for &castle in &self.castles {
            if fresh(castle) {
                points += BARN_POINTS_PER_CASTLE;
            }
        }
        points
    }
}

impl ScoreContext for FarmScoreContext {
    fn master(&self) -> FeatureId {
        self.master
    }

    fn category(&self) -> PointCategory {
        PointCategory::Farm
    }

    fn visit(&mut self, board: &Board, feature: &Feature) {
        for &adjoining in &feature.adjoining_cities {
            let Some(city) = board.feature(adjoining) else {
                continue;
            };
            let master = board.master(adjoining);
            match city.kind {
                FeatureKind::City => {
                    if let Some(context) = self.cache.resolve(board, master) {
                        if context.is_completed() {
                            let besieged = self.rules.besiege_tracking && context.is_besieged();
                            self.cities.insert(master, besieged);
                        }
                    }
                }
                FeatureKind::Castle => {
                    self.castles.insert(master);
                }
                _ => {}
            }
        }

        if feature.pig_herd {
            self.pig_herds += 1;
        }

        if let Some(meeple) = feature.meeple.and_then(|m| board.meeple(m)) {
            match meeple.kind {
                MeepleKind::Pig => {
                    self.pigs.insert(meeple.player);
                }
                MeepleKind::Barn => self.barns.record_with_strength(meeple.player, meeple.id, 1),
                MeepleKind::Follower | MeepleKind::LargeFollower => self.owners.record(meeple),
            }
        }
    }

    fn owners(&self) -> &OwnerTally {
        &self.owners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::standard;
    use crate::core::{Position, Rotation};

    /// Two separate cities north and south of a shared field, both closed
    /// by caps. Returns the board and the farm between them.
    fn two_cities(north_besieged: bool) -> (Board, FeatureId) {
        let mut board = Board::new();
        let graph = board.graph_mut();
        graph.place(&standard::city_caps_opposite(), Position::new(0, 0), Rotation::R0).unwrap();
        let north = if north_besieged { standard::city_cap_besieged() } else { standard::city_cap() };
        graph.place(&north, Position::new(0, -1), Rotation::R180).unwrap();
        graph.place(&standard::city_cap(), Position::new(0, 1), Rotation::R0).unwrap();
        if north_besieged {
            let city = graph.tile_at(Position::new(0, -1)).unwrap().features[0];
            graph.feature_mut(city).unwrap().besieged = true;
        }
        let farm = graph.tile_at(Position::new(0, 0)).unwrap().features[2];
        (board, farm)
    }

    #[test]
    fn test_two_completed_cities() {
        let (board, farm) = two_cities(false);
        let context = FarmScoreContext::new(&board, farm, ScoringRules::default()).unwrap();

        assert_eq!(context.city_count(), 2);
        assert_eq!(context.points(PlayerId::new(0), None), 6);
        assert_eq!(context.points_when_barn_connected(PlayerId::new(0), None), 2);
        assert_eq!(context.barn_points(PlayerId::new(0), None), 8);
    }

    #[test]
    fn test_besieged_city_counts_twice() {
        let (board, farm) = two_cities(true);
        let rules = ScoringRules { besiege_tracking: true, ..Default::default() };
        let context = FarmScoreContext::new(&board, farm, rules).unwrap();

        assert_eq!(context.points(PlayerId::new(0), None), 9);
        assert_eq!(context.barn_points(PlayerId::new(0), None), 12);

        // Without tracking the flag is inert.
        let context = FarmScoreContext::new(&board, farm, ScoringRules::default()).unwrap();
        assert_eq!(context.points(PlayerId::new(0), None), 6);
    }

    #[test]
    fn test_incomplete_city_ignored() {
        let mut board = Board::new();
        board.graph_mut().place(&standard::city_cap(), Position::new(0, 0), Rotation::R0).unwrap();
        let farm = board.tile_at(Position::new(0, 0)).unwrap().features[1];

        let context = FarmScoreContext::new(&board, farm, ScoringRules::default()).unwrap();
        assert_eq!(context.city_count(), 0);
        assert_eq!(context.points(PlayerId::new(0), None), 0);
    }

    #[test]
    fn test_single_castle() {
        let mut board = Board::new();
        board.graph_mut().place(&standard::city_cap(), Position::new(0, 0), Rotation::R0).unwrap();
        board.graph_mut().place(&standard::city_cap(), Position::new(0, -1), Rotation::R180).unwrap();
        let city = board.tile_at(Position::new(0, 0)).unwrap().features[0];
        let farm = board.tile_at(Position::new(0, 0)).unwrap().features[1];
        board.graph_mut().retag(city, FeatureKind::Castle);

        let context = FarmScoreContext::new(&board, farm, ScoringRules::default()).unwrap();
        assert_eq!(context.castle_count(), 1);
        assert_eq!(context.points(PlayerId::new(0), None), 4);
        assert_eq!(context.barn_points(PlayerId::new(0), None), 5);
    }

    #[test]
    fn test_pig_and_pig_herd() {
        let (mut board, farm) = two_cities(false);
        let pig = board.add_meeple(PlayerId::new(1), MeepleKind::Pig);
        board.deploy(pig, farm).unwrap();
        board.graph_mut().feature_mut(farm).unwrap().pig_herd = true;

        let context = FarmScoreContext::new(&board, farm, ScoringRules::default()).unwrap();
        assert!(context.has_pig(PlayerId::new(1)));
        assert_eq!(context.pig_herds(), 1);
        // (3 + 1 herd + 1 pig) * 2
        assert_eq!(context.points(PlayerId::new(1), None), 10);
        // (3 + 1 herd) * 2
        assert_eq!(context.points(PlayerId::new(0), None), 8);
    }

    #[test]
    fn test_batch_skips_scored_cities() {
        let (board, farm) = two_cities(false);
        let context = FarmScoreContext::new(&board, farm, ScoringRules::default()).unwrap();
        let mut scored = ScoredCities::default();
        let player = PlayerId::new(0);

        assert_eq!(context.points(player, Some(&mut scored)), 6);
        assert_eq!(scored.count(player), 2);
        assert_eq!(context.points(player, Some(&mut scored)), 0);
        // Other players are unaffected.
        assert_eq!(context.points(PlayerId::new(1), Some(&mut scored)), 6);
    }

    #[test]
    fn test_cache_reused_across_farms() {
        let (board, farm) = two_cities(false);
        let context = FarmScoreContext::new(&board, farm, ScoringRules::default()).unwrap();
        let cache = context.into_cache();
        assert_eq!(cache.len(), 2);

        let context = FarmScoreContext::with_cache(&board, farm, ScoringRules::default(), cache).unwrap();
        assert_eq!(context.points(PlayerId::new(0), None), 6);
        assert_eq!(context.into_cache().len(), 2);
    }
}
