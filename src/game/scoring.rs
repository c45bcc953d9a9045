//! Scoring operations of [`Game`].

use std::collections::BTreeSet;

use tracing::{info, warn};

use super::Game;
use crate::board::FeatureKind;
use crate::capabilities::{Award, BarnCapability, Bonus, CastleCapability, GameView, Reactions, ScoredFeature};
use crate::core::{FeatureId, PlayerId, PointCategory, Position, ScoringError};
use crate::events::GameEvent;
use crate::scoring::{
    BarnScoreContext, CastleScoreContext, CityScoreContext, CloisterScoreContext, CompletableScoreContext, FarmBatch,
    FarmScoreContext, RoadScoreContext, ScoreContext,
};

impl Game {
    /// Book `points` for `player` on the feature described by `context`.
    ///
    /// Capability bonuses are added on top and the whole is reported in one
    /// `Scored` event. `player` must have a follower on the feature.
    pub fn score_feature<C: ScoreContext + ?Sized>(
        &mut self,
        points: u32,
        context: &C,
        player: PlayerId,
    ) -> Result<(), ScoringError> {
        self.book_feature(points, context, player)?;
        self.flush();
        Ok(())
    }

    /// Score a completable feature for each of its majority owners. A
    /// feature nobody owns scores nothing and fires nothing.
    pub fn score_completable_feature<C: CompletableScoreContext + ?Sized>(
        &mut self,
        context: &C,
    ) -> Result<(), ScoringError> {
        self.book_completable(context)?;
        self.flush();
        Ok(())
    }

    /// Score the completed road, city, cloister or castle containing `id`,
    /// fire `FeatureCompleted` and send its meeples home.
    pub fn score_completed_feature(&mut self, id: FeatureId) -> Result<(), ScoringError> {
        let kind = self.board.feature(id).ok_or(ScoringError::UnknownFeature(id))?.kind;
        let master = self.board.master(id);
        if self.scored.contains(&master) {
            return Err(ScoringError::AlreadyScored(master));
        }
        let context = self.completable_context(master)?;
        if !context.is_completed() {
            return Err(ScoringError::NotCompleted(master));
        }

        self.book_completable(context.as_ref())?;
        self.scored.insert(master);

        let resources = match kind {
            FeatureKind::City => CityScoreContext::new(&self.board, master)?.resources(),
            _ => [0; 3],
        };
        let positions: BTreeSet<Position> = self.board.members(master).map(|f| f.position).collect();
        info!(feature = %master, ?kind, points = context.points(), "feature completed");
        self.emit(GameEvent::FeatureCompleted {
            master,
            kind,
            positions: positions.into_iter().collect(),
            points: context.points(),
            resources,
            player: self.turn_player,
        });
        self.return_meeples_on(master);
        self.flush();
        Ok(())
    }

    /// End-of-game scoring.
    ///
    /// Scores every unscored road, city, cloister and castle at its reduced
    /// value, then farms, then barns, then lets capabilities hand out their
    /// final awards, and fires `GameOver`. A second call does nothing.
    pub fn final_scoring(&mut self) -> Result<(), ScoringError> {
        if self.over {
            return Ok(());
        }
        self.final_scoring = true;
        info!("final scoring");

        let mut farms = Vec::new();
        for master in self.board.graph().logical_features() {
            if self.scored.contains(&master) {
                continue;
            }
            let kind = self.board.feature(master).map(|f| f.kind);
            if kind == Some(FeatureKind::Farm) {
                farms.push(master);
                continue;
            }
            let context = self.completable_context(master)?;
            self.book_completable(context.as_ref())?;
            self.scored.insert(master);
        }
        self.score_farms(&farms)?;
        self.score_barns()?;

        let mut reactions = Reactions::default();
        let view = GameView {
            board: &self.board,
            turn_player: self.turn_player,
            player_count: self.scores.player_count(),
            rules: self.rules,
            final_scoring: true,
        };
        for capability in self.capabilities.iter_mut() {
            capability.final_scoring(&view, &mut reactions);
        }
        self.apply(reactions);

        self.emit(GameEvent::GameOver);
        self.over = true;
        self.flush();
        Ok(())
    }

    // === Internals: queue events, never flush ===

    /// Context for a feature that scores on its own.
    pub(super) fn completable_context(&self, id: FeatureId) -> Result<Box<dyn CompletableScoreContext>, ScoringError> {
        let feature = self.board.feature(id).ok_or(ScoringError::UnknownFeature(id))?;
        Ok(match feature.kind {
            FeatureKind::Road => Box::new(RoadScoreContext::new(&self.board, id)?),
            FeatureKind::City => Box::new(CityScoreContext::new(&self.board, id)?),
            FeatureKind::Cloister => Box::new(CloisterScoreContext::new(&self.board, id)?),
            FeatureKind::Castle => {
                let captured = self
                    .capabilities
                    .find::<CastleCapability>()
                    .and_then(|c| c.captured(self.board.master(id)));
                Box::new(CastleScoreContext::new(&self.board, id, captured)?)
            }
            FeatureKind::Farm => return Err(ScoringError::WrongKind { feature: id, kind: feature.kind }),
        })
    }

    pub(super) fn book_feature<C: ScoreContext + ?Sized>(
        &mut self,
        points: u32,
        context: &C,
        player: PlayerId,
    ) -> Result<(), ScoringError> {
        let feature = context.master();
        let follower = context
            .sample_follower(player)
            .ok_or(ScoringError::NotAnOwner { feature, player })?;
        let category = context.category();

        let bonuses: Vec<Bonus> = match self.board.meeple(follower) {
            Some(meeple) => {
                let view = self.view();
                let scored = ScoredFeature {
                    feature,
                    player,
                    points,
                    follower: meeple,
                };
                self.capabilities
                    .iter()
                    .filter_map(|c| c.score_bonus(&view, &scored))
                    .collect()
            }
            None => Vec::new(),
        };

        self.add_points(player, points, category);
        let mut label = points.to_string();
        let mut total = points;
        for bonus in bonuses {
            self.add_points(player, bonus.points, bonus.category);
            label.push_str(&format!(" + {}", bonus.points));
            total += bonus.points;
        }

        info!(%feature, %player, points = total, %label, "feature scored");
        self.emit(GameEvent::Scored {
            feature,
            player,
            points: total,
            category,
            label,
            follower: Some(follower),
            final_scoring: self.final_scoring,
        });
        Ok(())
    }

    pub(super) fn book_completable<C: CompletableScoreContext + ?Sized>(
        &mut self,
        context: &C,
    ) -> Result<(), ScoringError> {
        let points = context.points();
        for player in context.major_owners() {
            self.book_feature(points, context, player)?;
        }
        Ok(())
    }

    fn add_points(&mut self, player: PlayerId, points: u32, category: PointCategory) {
        match self.scores.get_mut(player) {
            Some(score) => score.add(points, category),
            None => warn!(%player, points, "points for an unknown player dropped"),
        }
    }

    /// Farms at the end of the game, each majority owner at their own rate.
    /// With duplicate suppression the farms share one batch.
    fn score_farms(&mut self, farms: &[FeatureId]) -> Result<(), ScoringError> {
        let dedupe = self.rules.dedupe_cities;
        let mut batch = FarmBatch::default();
        for &farm in farms {
            let context =
                FarmScoreContext::with_cache(&self.board, farm, self.rules, std::mem::take(&mut batch.cities))?;
            for player in context.major_owners() {
                let points = context.points(player, dedupe.then_some(&mut batch.scored));
                self.book_feature(points, &context, player)?;
            }
            batch.cities = context.into_cache();
        }
        Ok(())
    }

    /// Every barn holder scores the barn value of each farm with a barn.
    fn score_barns(&mut self) -> Result<(), ScoringError> {
        let Some(barns) = self.capabilities.find::<BarnCapability>() else {
            return Ok(());
        };
        let farms = barns.barn_farms(&self.board);
        let dedupe = self.rules.dedupe_cities;
        let mut batch = FarmBatch::default();
        for farm in farms {
            let context =
                BarnScoreContext::with_cache(&self.board, farm, self.rules, std::mem::take(&mut batch.cities))?;
            let holders: Vec<PlayerId> = context.owners().players().collect();
            for player in holders {
                let points = context.points(player, dedupe.then_some(&mut batch.scored));
                self.book_feature(points, &context, player)?;
            }
            batch.cities = context.into_cache();
        }
        Ok(())
    }

    /// Followers on farms joined to a barn score at the barn-connected rate
    /// and go home. Farms share one batch so no city pays twice.
    fn score_barn_connected(&mut self, farms: &[FeatureId]) {
        let mut batch = FarmBatch::default();
        for &farm in farms {
            let context =
                match FarmScoreContext::with_cache(&self.board, farm, self.rules, std::mem::take(&mut batch.cities)) {
                    Ok(context) => context,
                    Err(err) => {
                        warn!(%farm, %err, "barn-connected farm skipped");
                        continue;
                    }
                };
            for player in context.major_owners() {
                let points = context.points_when_barn_connected(player, Some(&mut batch.scored));
                if let Err(err) = self.book_feature(points, &context, player) {
                    warn!(%farm, %player, %err, "barn-connected score dropped");
                }
            }
            batch.cities = context.into_cache();
            self.return_meeples_on(farm);
        }
    }

    /// Apply the side effects a capability hook asked for.
    pub(super) fn apply(&mut self, reactions: Reactions) {
        let Reactions {
            awards,
            events,
            barn_connected,
        } = reactions;
        for award in awards {
            self.apply_award(award);
        }
        if !barn_connected.is_empty() {
            self.score_barn_connected(&barn_connected);
        }
        self.pending.extend(events);
    }

    fn apply_award(&mut self, award: Award) {
        let Some(feature) = award.feature else {
            self.add_points(award.player, award.points, award.category);
            self.emit(GameEvent::PointsAwarded {
                player: award.player,
                points: award.points,
                category: award.category,
            });
            return;
        };

        let result = match award.category {
            PointCategory::Castle => self.award_castle(feature, &award),
            PointCategory::Barn => BarnScoreContext::new(&self.board, feature, self.rules)
                .and_then(|context| self.book_feature(award.points, &context, award.player)),
            _ => self
                .any_context(feature)
                .and_then(|context| self.book_feature(award.points, context.as_ref(), award.player)),
        };
        if let Err(err) = result {
            warn!(?award, %err, "award dropped");
        }
    }

    /// A castle scores once, for the value it captured.
    fn award_castle(&mut self, castle: FeatureId, award: &Award) -> Result<(), ScoringError> {
        let master = self.board.master(castle);
        if self.scored.contains(&master) {
            return Err(ScoringError::AlreadyScored(master));
        }
        let context = CastleScoreContext::new(&self.board, castle, Some(award.points))?;
        self.book_feature(award.points, &context, award.player)?;
        self.scored.insert(master);
        self.return_meeples_on(master);
        Ok(())
    }

    fn any_context(&self, id: FeatureId) -> Result<Box<dyn ScoreContext>, ScoringError> {
        let feature = self.board.feature(id).ok_or(ScoringError::UnknownFeature(id))?;
        Ok(match feature.kind {
            FeatureKind::Road => Box::new(RoadScoreContext::new(&self.board, id)?),
            FeatureKind::City => Box::new(CityScoreContext::new(&self.board, id)?),
            FeatureKind::Cloister => Box::new(CloisterScoreContext::new(&self.board, id)?),
            FeatureKind::Farm => Box::new(FarmScoreContext::new(&self.board, id, self.rules)?),
            FeatureKind::Castle => Box::new(CastleScoreContext::new(&self.board, id, None)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::board::MeepleKind;
    use crate::capabilities::{CapabilityId, FairyCapability};
    use crate::core::{FeatureId, GameConfig, PlayerId, PointCategory, Position, Rotation, ScoringError};
    use crate::events::GameEvent;
    use crate::scoring::{CityScoreContext, RoadScoreContext};
    use crate::Game;

    fn started(config: GameConfig) -> Game {
        let mut game = Game::new(config);
        game.start();
        game
    }

    fn recorder(game: &mut Game) -> Rc<RefCell<Vec<GameEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        game.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    /// Two city caps facing each other: a finished two-tile city.
    fn closed_city(game: &mut Game) -> FeatureId {
        game.place_tile("city-cap", Position::new(0, 0), Rotation::R0).unwrap();
        let placement = game.place_tile("city-cap", Position::new(0, -1), Rotation::R180).unwrap();
        placement.completed[0]
    }

    #[test]
    fn test_completed_city_scores_and_returns_follower() {
        let mut game = started(GameConfig::new(2));
        game.place_tile("city-cap", Position::new(0, 0), Rotation::R0).unwrap();
        let city = game.board().tile_at(Position::new(0, 0)).unwrap().features[0];
        let follower = game.deploy(PlayerId::new(1), MeepleKind::Follower, city).unwrap();
        game.place_tile("city-cap", Position::new(0, -1), Rotation::R180).unwrap();

        let events = recorder(&mut game);
        game.score_completed_feature(city).unwrap();

        let p1 = game.score(PlayerId::new(1)).unwrap();
        assert_eq!(p1.in_category(PointCategory::City), 4);
        assert!(!game.board().meeple(follower).unwrap().is_deployed());

        let names: Vec<_> = events.borrow().iter().map(GameEvent::name).collect();
        assert_eq!(names, vec!["scored", "feature-completed", "meeple-returned"]);
    }

    #[test]
    fn test_already_scored_and_not_completed() {
        let mut game = started(GameConfig::new(2));
        let city = closed_city(&mut game);
        game.score_completed_feature(city).unwrap();
        assert!(matches!(
            game.score_completed_feature(city),
            Err(ScoringError::AlreadyScored(_))
        ));

        let road = {
            game.place_tile("road-end", Position::new(-1, 0), Rotation::R90).unwrap();
            game.board().tile_at(Position::new(-1, 0)).unwrap().features[0]
        };
        assert!(matches!(
            game.score_completed_feature(road),
            Err(ScoringError::NotCompleted(_))
        ));
    }

    #[test]
    fn test_unowned_feature_is_a_no_op() {
        let mut game = started(GameConfig::new(2));
        let city = closed_city(&mut game);
        let events = recorder(&mut game);

        let context = CityScoreContext::new(game.board(), city).unwrap();
        game.score_completable_feature(&context).unwrap();

        assert!(events.borrow().is_empty());
        assert_eq!(game.score(PlayerId::new(0)).unwrap().total(), 0);
    }

    #[test]
    fn test_scoring_for_non_owner_rejected() {
        let mut game = started(GameConfig::new(2));
        let city = closed_city(&mut game);
        let context = CityScoreContext::new(game.board(), city).unwrap();
        assert!(matches!(
            game.score_feature(4, &context, PlayerId::new(0)),
            Err(ScoringError::NotAnOwner { .. })
        ));
    }

    #[test]
    fn test_fairy_bonus_label() {
        let mut game = started(GameConfig::new(2).with_capability(CapabilityId::Fairy));
        game.place_tile("road-straight", Position::new(0, 0), Rotation::R0).unwrap();
        let road = game.board().tile_at(Position::new(0, 0)).unwrap().features[0];
        game.deploy(PlayerId::new(0), MeepleKind::Follower, road).unwrap();
        game.capability_mut::<FairyCapability>().unwrap().set_position(Position::new(0, 0));

        let events = recorder(&mut game);
        let context = RoadScoreContext::new(game.board(), road).unwrap();
        game.score_feature(1, &context, PlayerId::new(0)).unwrap();

        let events = events.borrow();
        let GameEvent::Scored { label, points, .. } = &events[0] else {
            panic!("expected a scored event, got {:?}", events[0]);
        };
        assert_eq!(label, "1 + 3");
        assert_eq!(*points, 4);
        let score = game.score(PlayerId::new(0)).unwrap();
        assert_eq!(score.total(), 4);
        assert_eq!(score.in_category(PointCategory::Fairy), 3);
    }
}
