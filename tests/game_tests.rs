//! Game orchestration integration tests.
//!
//! These tests drive whole turns through [`Game`] and check event order,
//! majority ties, copies and configuration loading.

use std::cell::RefCell;
use std::rc::Rc;

use rust_cloister::board::TileRegistry;
use rust_cloister::capabilities::{CapabilityId, FairyCapability};
use rust_cloister::core::{
    FeatureId, GameConfig, PlacementError, PlayerId, PointCategory, Position, Rotation, ScoringError,
};
use rust_cloister::scoring::RoadScoreContext;
use rust_cloister::{Game, GameEvent, MeepleKind};

fn started(config: GameConfig) -> Game {
    let mut game = Game::new(config);
    game.start();
    game
}

fn feature_at(game: &Game, position: Position, index: usize) -> FeatureId {
    game.board().tile_at(position).unwrap().features[index]
}

fn points(game: &Game, player: u8, category: PointCategory) -> u32 {
    game.score(PlayerId::new(player)).unwrap().in_category(category)
}

fn record_names(game: &mut Game) -> Rc<RefCell<Vec<&'static str>>> {
    let names = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&names);
    game.subscribe(move |event: &GameEvent| sink.borrow_mut().push(event.name()));
    names
}

/// Two road ends joined by a curve. The first end is held with `first`,
/// the second with a follower of player 1. Returns the road.
fn contested_road(game: &mut Game, first: MeepleKind) -> FeatureId {
    game.place_tile("road-end", Position::new(0, 0), Rotation::R0).unwrap();
    let road = feature_at(game, Position::new(0, 0), 0);
    game.deploy(PlayerId::new(0), first, road).unwrap();
    game.place_tile("field", Position::new(1, 0), Rotation::R0).unwrap();
    game.place_tile("road-end", Position::new(1, 1), Rotation::R90).unwrap();
    game.deploy(PlayerId::new(1), MeepleKind::Follower, feature_at(game, Position::new(1, 1), 0))
        .unwrap();
    road
}

#[test]
fn test_tied_majority_both_score() {
    let mut game = started(GameConfig::new(3));
    let road = contested_road(&mut game, MeepleKind::Follower);
    let names = record_names(&mut game);

    let placement = game.place_tile("road-curve", Position::new(0, 1), Rotation::R180).unwrap();
    assert_eq!(placement.completed, vec![game.board().master(road)]);
    game.score_completed_feature(road).unwrap();

    assert_eq!(points(&game, 0, PointCategory::Road), 3);
    assert_eq!(points(&game, 1, PointCategory::Road), 3);
    assert_eq!(points(&game, 2, PointCategory::Road), 0);
    assert_eq!(
        *names.borrow(),
        vec![
            "tile-placed",
            "scored",
            "scored",
            "feature-completed",
            "meeple-returned",
            "meeple-returned"
        ]
    );
    assert!(game.board().meeples().all(|m| !m.is_deployed()));
}

#[test]
fn test_large_follower_takes_the_road() {
    let mut game = started(GameConfig::new(2));
    let road = contested_road(&mut game, MeepleKind::LargeFollower);
    game.place_tile("road-curve", Position::new(0, 1), Rotation::R180).unwrap();
    game.score_completed_feature(road).unwrap();

    assert_eq!(points(&game, 0, PointCategory::Road), 3);
    assert_eq!(points(&game, 1, PointCategory::Road), 0);
}

#[test]
fn test_completed_feature_scores_once() {
    let mut game = started(GameConfig::new(2));
    let road = contested_road(&mut game, MeepleKind::Follower);
    game.place_tile("road-curve", Position::new(0, 1), Rotation::R180).unwrap();
    game.score_completed_feature(road).unwrap();

    assert!(game.is_scored(road));
    assert!(matches!(
        game.score_completed_feature(road),
        Err(ScoringError::AlreadyScored(_))
    ));

    game.final_scoring().unwrap();
    assert_eq!(points(&game, 0, PointCategory::Road), 3);
}

#[test]
fn test_score_feature_requires_a_follower() {
    let mut game = started(GameConfig::new(2));
    let road = contested_road(&mut game, MeepleKind::Follower);
    let context = RoadScoreContext::new(game.board(), road).unwrap();
    let names = record_names(&mut game);

    assert!(matches!(
        game.score_feature(5, &context, PlayerId::new(1)),
        Err(ScoringError::NotAnOwner { .. })
    ));
    game.score_feature(5, &context, PlayerId::new(0)).unwrap();

    assert_eq!(points(&game, 0, PointCategory::Road), 5);
    assert_eq!(points(&game, 1, PointCategory::Road), 0);
    assert_eq!(*names.borrow(), vec!["scored"]);
}

#[test]
fn test_unsubscribed_listener_stops_hearing() {
    let mut game = started(GameConfig::new(2));
    let names = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&names);
    let id = game.subscribe(move |event: &GameEvent| sink.borrow_mut().push(event.name()));

    game.next_turn();
    assert!(game.unsubscribe(id));
    game.next_turn();

    assert_eq!(*names.borrow(), vec!["player-activated"]);
    assert_eq!(game.turn_player(), PlayerId::new(0));
    assert!(!game.unsubscribe(id));
}

#[test]
fn test_copy_is_independent() {
    let mut game = started(GameConfig::new(2).with_capability(CapabilityId::Fairy));
    game.place_tile("field", Position::new(0, 0), Rotation::R0).unwrap();
    game.move_fairy(Position::new(0, 0)).unwrap();
    let names = record_names(&mut game);

    let mut copy = game.copy();
    copy.place_tile("field", Position::new(1, 0), Rotation::R0).unwrap();
    copy.move_fairy(Position::new(1, 0)).unwrap();
    copy.deploy(PlayerId::new(1), MeepleKind::Follower, feature_at(&copy, Position::new(1, 0), 0))
        .unwrap();

    assert_eq!(game.board().graph().tile_count(), 1);
    assert_eq!(game.board().meeples().count(), 0);
    assert_eq!(
        game.capability::<FairyCapability>().unwrap().position(),
        Some(Position::new(0, 0))
    );
    assert!(names.borrow().is_empty());
    assert_eq!(copy.board().graph().tile_count(), 2);
}

#[test]
fn test_config_from_json() {
    let config = GameConfig::from_json(
        r#"{"player_count": 3, "expansions": ["princess-and-dragon"], "fairy_points": 5}"#,
    )
    .unwrap();
    let mut game = started(config);

    assert_eq!(game.player_count(), 3);
    assert!(game.has_capability(CapabilityId::Dragon));
    assert_eq!(game.capability::<FairyCapability>().unwrap().points(), 5);

    game.next_turn();
    game.next_turn();
    game.next_turn();
    assert_eq!(game.turn_player(), PlayerId::new(0));
}

#[test]
fn test_custom_tile_set() {
    let tiles = TileRegistry::from_json(
        r#"[
            {"name": "monastery", "features": [{"kind": "cloister"}]},
            {"name": "meadow", "features": []}
        ]"#,
    )
    .unwrap();
    let mut game = Game::new(GameConfig::new(1)).with_tiles(tiles);
    game.start();

    game.place_tile("monastery", Position::new(0, 0), Rotation::R0).unwrap();
    assert!(matches!(
        game.place_tile("city-cap", Position::new(1, 0), Rotation::R0),
        Err(PlacementError::UnknownDefinition(_))
    ));

    let cloister = feature_at(&game, Position::new(0, 0), 0);
    game.deploy(PlayerId::new(0), MeepleKind::Follower, cloister).unwrap();
    let mut completed = Vec::new();
    for (x, y) in [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)] {
        let placement = game.place_tile("meadow", Position::new(x, y), Rotation::R0).unwrap();
        completed.extend(placement.completed);
    }
    assert_eq!(completed, vec![cloister]);
    game.score_completed_feature(cloister).unwrap();
    assert_eq!(points(&game, 0, PointCategory::Cloister), 9);
}
