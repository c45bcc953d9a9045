//! Scoring integration tests.
//!
//! Features are built with real placements through [`Game`] and scored the
//! way a match scores them: on completion or in the final pass.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use rust_cloister::capabilities::CapabilityId;
use rust_cloister::core::{Expansion, FeatureId, GameConfig, PlayerId, PointCategory, Position, Rotation};
use rust_cloister::scoring::{CompletableScoreContext, FarmScoreContext, RoadScoreContext, ScoredCities};
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

/// Two cities closed by caps, north and south of a shared field.
/// Returns the shared farm.
fn two_cities(game: &mut Game, north: &str) -> FeatureId {
    game.place_tile("city-caps-opposite", Position::new(0, 0), Rotation::R0).unwrap();
    game.place_tile(north, Position::new(0, -1), Rotation::R180).unwrap();
    game.place_tile("city-cap", Position::new(0, 1), Rotation::R0).unwrap();
    feature_at(game, Position::new(0, 0), 2)
}

#[test]
fn test_four_tile_city_with_pennant_scores_ten() {
    let mut game = started(GameConfig::new(2));
    game.place_tile("city-corner-pennant", Position::new(0, 0), Rotation::R90).unwrap();
    let city = feature_at(&game, Position::new(0, 0), 0);
    let knight = game.deploy(PlayerId::new(1), MeepleKind::Follower, city).unwrap();
    game.place_tile("city-corner", Position::new(1, 0), Rotation::R180).unwrap();
    game.place_tile("city-corner", Position::new(1, 1), Rotation::R270).unwrap();
    let placement = game.place_tile("city-corner", Position::new(0, 1), Rotation::R0).unwrap();

    assert_eq!(placement.completed.len(), 1);
    game.score_completed_feature(placement.completed[0]).unwrap();

    assert_eq!(points(&game, 1, PointCategory::City), 10);
    assert_eq!(points(&game, 0, PointCategory::City), 0);
    assert!(!game.board().meeple(knight).unwrap().is_deployed());
}

#[test]
fn test_incomplete_city_scores_half_at_the_end() {
    let mut game = started(GameConfig::new(2));
    game.place_tile("city-tube-pennant", Position::new(0, 0), Rotation::R0).unwrap();
    let city = feature_at(&game, Position::new(0, 0), 0);
    game.deploy(PlayerId::new(0), MeepleKind::Follower, city).unwrap();
    for y in 1..4 {
        game.place_tile("city-tube", Position::new(0, y), Rotation::R0).unwrap();
    }
    assert!(!game.board().is_completed(city));

    game.final_scoring().unwrap();

    // (2 * 4 tiles + 2 * 1 pennant) / 2
    assert_eq!(points(&game, 0, PointCategory::City), 5);
    assert!(game.is_over());
}

#[test]
fn test_incomplete_road_and_cloister_at_the_end() {
    let mut game = started(GameConfig::new(2));
    game.place_tile("cloister-road", Position::new(0, 0), Rotation::R0).unwrap();
    let cloister = feature_at(&game, Position::new(0, 0), 0);
    let road = feature_at(&game, Position::new(0, 0), 1);
    game.deploy(PlayerId::new(0), MeepleKind::Follower, cloister).unwrap();
    game.deploy(PlayerId::new(1), MeepleKind::Follower, road).unwrap();
    game.place_tile("road-straight", Position::new(0, 1), Rotation::R0).unwrap();
    game.place_tile("field", Position::new(1, 0), Rotation::R0).unwrap();

    let context = RoadScoreContext::new(game.board(), road).unwrap();
    assert!(!context.is_completed());
    assert_eq!(context.points(), 2);

    game.final_scoring().unwrap();

    assert_eq!(points(&game, 0, PointCategory::Cloister), 3);
    assert_eq!(points(&game, 1, PointCategory::Road), 2);
}

#[test]
fn test_farm_scores_completed_cities() {
    let mut game = started(GameConfig::new(2));
    let farm = two_cities(&mut game, "city-cap");
    game.deploy(PlayerId::new(0), MeepleKind::Follower, farm).unwrap();

    game.final_scoring().unwrap();

    assert_eq!(points(&game, 0, PointCategory::Farm), 6);
}

#[test]
fn test_besieged_city_counts_twice_for_farms() {
    let mut game = started(GameConfig::new(2).with_expansion(Expansion::Besieged));
    let farm = two_cities(&mut game, "city-cap-besieged");
    game.deploy(PlayerId::new(0), MeepleKind::Follower, farm).unwrap();

    game.final_scoring().unwrap();

    assert_eq!(points(&game, 0, PointCategory::Farm), 9);
}

#[test]
fn test_besieged_flag_ignored_without_siege() {
    let mut game = started(GameConfig::new(2));
    let farm = two_cities(&mut game, "city-cap-besieged");
    game.deploy(PlayerId::new(0), MeepleKind::Follower, farm).unwrap();

    game.final_scoring().unwrap();

    assert_eq!(points(&game, 0, PointCategory::Farm), 6);
}

#[test]
fn test_farm_next_to_castle_scores_four() {
    let mut game = started(GameConfig::new(2).with_expansion(Expansion::BridgesCastlesAndBazaars));
    game.place_tile("city-cap", Position::new(0, 0), Rotation::R0).unwrap();
    let city = feature_at(&game, Position::new(0, 0), 0);
    game.deploy(PlayerId::new(1), MeepleKind::Follower, city).unwrap();
    game.place_tile("city-cap", Position::new(0, -1), Rotation::R180).unwrap();
    game.build_castle(city).unwrap();
    let farm = feature_at(&game, Position::new(0, 0), 1);
    game.deploy(PlayerId::new(0), MeepleKind::Follower, farm).unwrap();

    game.final_scoring().unwrap();

    assert_eq!(points(&game, 0, PointCategory::Farm), 4);
    // Nothing completed near the castle, so it is worth nothing.
    assert_eq!(points(&game, 1, PointCategory::Castle), 0);
}

/// Two farms on either side of one city, both held by the same player.
fn city_between_farms(game: &mut Game) {
    game.place_tile("city-cap", Position::new(0, 0), Rotation::R0).unwrap();
    game.place_tile("city-cap", Position::new(0, -1), Rotation::R180).unwrap();
    let south = feature_at(game, Position::new(0, 0), 1);
    let north = feature_at(game, Position::new(0, -1), 1);
    game.deploy(PlayerId::new(0), MeepleKind::Follower, south).unwrap();
    game.deploy(PlayerId::new(0), MeepleKind::Follower, north).unwrap();
}

#[test]
fn test_city_pays_each_farm_without_cathars() {
    let mut game = started(GameConfig::new(2));
    city_between_farms(&mut game);

    game.final_scoring().unwrap();

    assert_eq!(points(&game, 0, PointCategory::Farm), 6);
}

#[test]
fn test_cathars_city_pays_once_per_player() {
    let mut game = started(GameConfig::new(2).with_expansion(Expansion::Cathars));
    assert!(game.rules().dedupe_cities);
    city_between_farms(&mut game);

    game.final_scoring().unwrap();

    assert_eq!(points(&game, 0, PointCategory::Farm), 3);
}

#[test]
fn test_final_scoring_events() {
    let mut game = started(GameConfig::new(2));
    let farm = two_cities(&mut game, "city-cap");
    game.deploy(PlayerId::new(1), MeepleKind::Follower, farm).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    game.subscribe(move |event: &GameEvent| sink.borrow_mut().push(event.clone()));
    game.final_scoring().unwrap();
    game.final_scoring().unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        GameEvent::Scored { points: 6, category: PointCategory::Farm, final_scoring: true, .. }
    ));
    assert_eq!(events[1], GameEvent::GameOver);
    assert!(game.is_final_scoring());
}

/// A farm along a row of city caps; `closed[i]` closes the city of cap `i`.
fn farm_row(closed: &[bool], pig_herd: bool, pig: bool) -> (Game, FeatureId) {
    let mut game = started(GameConfig::new(2).with_capability(CapabilityId::PigHerd));
    for (x, &close) in closed.iter().enumerate() {
        let x = x as i32;
        game.place_tile("city-cap", Position::new(x, 0), Rotation::R0).unwrap();
        if close {
            game.place_tile("city-cap", Position::new(x, -1), Rotation::R180).unwrap();
        }
    }
    if pig_herd {
        game.place_tile("field-pig-herd", Position::new(-1, 0), Rotation::R0).unwrap();
    }
    let farm = feature_at(&game, Position::new(0, 0), 1);
    if pig {
        game.deploy(PlayerId::new(0), MeepleKind::Pig, farm).unwrap();
    }
    (game, farm)
}

proptest! {
    #[test]
    fn closed_form_matches_city_by_city(
        closed in proptest::collection::vec(any::<bool>(), 1..6),
        pig_herd in any::<bool>(),
        pig in any::<bool>(),
    ) {
        let (game, farm) = farm_row(&closed, pig_herd, pig);
        let context = FarmScoreContext::new(game.board(), farm, game.rules()).unwrap();
        let player = PlayerId::new(0);

        let closed_form = context.points(player, None);
        let iterated = context.points(player, Some(&mut ScoredCities::default()));
        prop_assert_eq!(closed_form, iterated);

        let cities = closed.iter().filter(|&&c| c).count() as u32;
        let per_city = 3 + u32::from(pig_herd) + u32::from(pig);
        prop_assert_eq!(context.city_count(), cities);
        prop_assert_eq!(closed_form, per_city * cities);
        // The other player never has the pig.
        prop_assert_eq!(context.points(PlayerId::new(1), None), (3 + u32::from(pig_herd)) * cities);
    }
}
