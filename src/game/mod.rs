//! Game orchestration.
//!
//! [`Game`] owns the board, the scores, the capabilities and the event
//! queue. Every public operation follows the same shape: validate, mutate,
//! queue events, then flush the queue. Flushing hands each event to the
//! capabilities (in registration order), then to bus subscribers, then
//! applies whatever the capabilities reacted with, which may queue more
//! events. Internal helpers only queue; the public entry point flushes once.
//!
//! ```
//! use rust_cloister::core::{GameConfig, Position, Rotation};
//! use rust_cloister::Game;
//!
//! let mut game = Game::new(GameConfig::new(2));
//! game.start();
//!
//! game.place_tile("city-cap", Position::new(0, 0), Rotation::R0).unwrap();
//! let placement = game.place_tile("city-cap", Position::new(0, -1), Rotation::R180).unwrap();
//!
//! assert_eq!(placement.completed.len(), 1);
//! ```

mod actions;
mod scoring;

use std::collections::VecDeque;
use std::sync::Arc;

use im::HashSet as ImHashSet;
use tracing::{debug, info, warn};

use crate::board::{standard, Board, TileDefinition, TileRegistry};
use crate::capabilities::{self, Capability, CapabilityId, CapabilityRegistry, GameView, Reactions};
use crate::core::{DefinitionError, FeatureId, GameConfig, PlayerId, PlayerMap, PlayerScore, SnapshotError};
use crate::events::{EventBus, GameEvent, SubscriberId};
use crate::scoring::ScoringRules;
use crate::snapshot::{self, Element};

/// One game in progress.
///
/// Not `Clone`: use [`Game::copy`], which leaves event subscribers behind.
#[derive(Debug)]
pub struct Game {
    // === Setup ===
    config: GameConfig,
    tiles: Arc<TileRegistry>,
    capabilities: CapabilityRegistry,
    rules: ScoringRules,
    started: bool,

    // === Play ===
    board: Board,
    scores: PlayerMap<PlayerScore>,
    turn_player: PlayerId,
    /// Masters already scored as completed features.
    scored: ImHashSet<FeatureId>,
    final_scoring: bool,
    over: bool,

    // === Events ===
    pending: VecDeque<GameEvent>,
    bus: EventBus,
}

impl Game {
    /// A game over the standard tile set. Panics if `config` has no players.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let scores = PlayerMap::with_default(config.player_count);
        Self {
            config,
            tiles: Arc::new(standard::registry()),
            capabilities: CapabilityRegistry::new(),
            rules: ScoringRules::default(),
            started: false,
            board: Board::new(),
            scores,
            turn_player: PlayerId::new(0),
            scored: ImHashSet::new(),
            final_scoring: false,
            over: false,
            pending: VecDeque::new(),
            bus: EventBus::new(),
        }
    }

    /// Replace the tile set.
    #[must_use]
    pub fn with_tiles(mut self, tiles: TileRegistry) -> Self {
        self.tiles = Arc::new(tiles);
        self
    }

    /// Add one tile definition to this game's tile set.
    pub fn register_tile(&mut self, definition: TileDefinition) -> Result<(), DefinitionError> {
        Arc::make_mut(&mut self.tiles).register(definition)
    }

    /// Instantiate the requested capabilities and let them see every seat.
    ///
    /// A capability that fails to construct is logged and left out. Calling
    /// `start` twice does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        for id in self.config.requested_capabilities() {
            match capabilities::create(id, &self.config) {
                Ok(capability) => {
                    self.capabilities.insert(capability);
                }
                Err(err) => warn!(capability = ?id, %err, "capability skipped"),
            }
        }

        let player_count = self.scores.player_count();
        for capability in self.capabilities.iter_mut() {
            for player in PlayerId::all(player_count) {
                capability.init_player(player);
            }
        }
        self.rules = self.capabilities.iter().fold(ScoringRules::default(), |rules, capability| {
            let mut requested = ScoringRules::default();
            capability.configure_rules(&mut requested);
            rules.merge(requested)
        });

        self.started = true;
        info!(
            players = player_count,
            capabilities = ?self.capabilities.ids(),
            rules = ?self.rules,
            "game started"
        );
    }

    /// Deep copy for speculative play. Subscribers stay with the original.
    #[must_use]
    pub fn copy(&self) -> Game {
        Game {
            config: self.config.clone(),
            tiles: Arc::clone(&self.tiles),
            capabilities: self.capabilities.clone(),
            rules: self.rules,
            started: self.started,
            board: self.board.clone(),
            scores: self.scores.clone(),
            turn_player: self.turn_player,
            scored: self.scored.clone(),
            final_scoring: self.final_scoring,
            over: self.over,
            pending: self.pending.clone(),
            bus: EventBus::new(),
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn tiles(&self) -> &TileRegistry {
        &self.tiles
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.scores.player_count()
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> Option<&PlayerScore> {
        self.scores.get(player)
    }

    #[must_use]
    pub fn scores(&self) -> &PlayerMap<PlayerScore> {
        &self.scores
    }

    #[must_use]
    pub fn turn_player(&self) -> PlayerId {
        self.turn_player
    }

    #[must_use]
    pub fn rules(&self) -> ScoringRules {
        self.rules
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Is the end-of-game scoring pass running or done?
    #[must_use]
    pub fn is_final_scoring(&self) -> bool {
        self.final_scoring
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Has the logical feature containing `id` been scored as completed?
    #[must_use]
    pub fn is_scored(&self, id: FeatureId) -> bool {
        self.board.feature(id).is_some() && self.scored.contains(&self.board.master(id))
    }

    // === Capabilities ===

    #[must_use]
    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    #[must_use]
    pub fn has_capability(&self, id: CapabilityId) -> bool {
        self.capabilities.contains(id)
    }

    /// Typed capability lookup; `None` if the capability is not active.
    #[must_use]
    pub fn capability<T: Capability + 'static>(&self) -> Option<&T> {
        self.capabilities.find::<T>()
    }

    pub fn capability_mut<T: Capability + 'static>(&mut self) -> Option<&mut T> {
        self.capabilities.find_mut::<T>()
    }

    // === Events ===

    /// Register a listener for every event fired from now on.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Hand the turn to `player`.
    pub fn set_turn_player(&mut self, player: PlayerId) {
        self.turn_player = player;
        self.emit(GameEvent::PlayerActivated { player });
        self.flush();
    }

    /// Hand the turn to the next seat.
    pub fn next_turn(&mut self) {
        let next = self.turn_player.next(self.player_count());
        self.set_turn_player(next);
    }

    fn view(&self) -> GameView<'_> {
        GameView {
            board: &self.board,
            turn_player: self.turn_player,
            player_count: self.scores.player_count(),
            rules: self.rules,
            final_scoring: self.final_scoring,
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Deliver queued events until the queue is empty.
    fn flush(&mut self) {
        while let Some(event) = self.pending.pop_front() {
            debug!(event = event.name(), "dispatching event");
            let mut reactions = Reactions::default();
            let view = GameView {
                board: &self.board,
                turn_player: self.turn_player,
                player_count: self.scores.player_count(),
                rules: self.rules,
                final_scoring: self.final_scoring,
            };
            for capability in self.capabilities.iter_mut() {
                capability.on_event(&event, &view, &mut reactions);
            }
            self.bus.publish(&event);
            self.apply(reactions);
        }
    }

    // === Snapshots ===

    /// Save every capability's state under one [`snapshot::ROOT`] element.
    #[must_use]
    pub fn save_capabilities(&self) -> Element {
        self.capabilities
            .iter()
            .fold(Element::new(snapshot::ROOT), |root, capability| root.with_child(capability.save()))
    }

    /// Restore capability state saved by [`Game::save_capabilities`].
    /// Elements of capabilities not active in this game are ignored.
    pub fn load_capabilities(&mut self, root: &Element) -> Result<(), SnapshotError> {
        let mut reactions = Reactions::default();
        for element in &root.children {
            let Some(capability) = CapabilityId::from_name(&element.name).and_then(|id| self.capabilities.get_mut(id))
            else {
                debug!(element = %element.name, "no active capability for snapshot element");
                continue;
            };
            capability.load(element, &mut reactions)?;
        }
        self.apply(reactions);
        self.flush();
        Ok(())
    }
}
