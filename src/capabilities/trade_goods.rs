//! Trade goods: wine, grain and cloth tokens collected from cities.
//!
//! Completing a city hands its tokens to the player whose turn it is. At the
//! end of the game every player holding the most tokens of a kind (at least
//! one) earns [`TRADE_GOODS_POINTS`].

use std::any::Any;
use std::collections::BTreeMap;

use super::{Award, Capability, CapabilityId, GameView, Reactions};
use crate::board::{Feature, FeatureKind, TradeResource};
use crate::core::{DefinitionError, PlayerId, PointCategory, SnapshotError};
use crate::events::GameEvent;
use crate::snapshot::Element;

/// Points for leading in one kind of trade good.
pub const TRADE_GOODS_POINTS: u32 = 10;

#[derive(Clone, Debug, Default)]
pub struct TradeGoodsCapability {
    tokens: BTreeMap<PlayerId, [u32; 3]>,
}

impl TradeGoodsCapability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens of `resource` held by `player`.
    #[must_use]
    pub fn tokens(&self, player: PlayerId, resource: TradeResource) -> u32 {
        self.tokens.get(&player).map_or(0, |t| t[resource.slot()])
    }

    pub fn add_tokens(&mut self, player: PlayerId, resource: TradeResource, count: u32) {
        self.tokens.entry(player).or_default()[resource.slot()] += count;
    }
}

impl Capability for TradeGoodsCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::TradeGoods
    }

    fn init_feature(&self, feature: &mut Feature) -> Result<(), DefinitionError> {
        if feature.kind == FeatureKind::City {
            if let Some(resource) = feature.attributes.text("resource")? {
                feature.trade_resource = Some(resource.parse()?);
            }
        }
        Ok(())
    }

    fn init_player(&mut self, player: PlayerId) {
        self.tokens.entry(player).or_default();
    }

    fn on_event(&mut self, event: &GameEvent, _view: &GameView<'_>, _reactions: &mut Reactions) {
        if let GameEvent::FeatureCompleted {
            kind: FeatureKind::City,
            resources,
            player,
            ..
        } = event
        {
            for resource in TradeResource::ALL {
                let count = resources[resource.slot()];
                if count > 0 {
                    self.add_tokens(*player, resource, count);
                }
            }
        }
    }

    fn final_scoring(&mut self, _view: &GameView<'_>, reactions: &mut Reactions) {
        for resource in TradeResource::ALL {
            let most = self
                .tokens
                .values()
                .map(|t| t[resource.slot()])
                .max()
                .unwrap_or(0)
                .max(1);
            for (&player, tokens) in &self.tokens {
                if tokens[resource.slot()] == most {
                    reactions.award(Award {
                        player,
                        points: TRADE_GOODS_POINTS,
                        category: PointCategory::TradeGoods,
                        feature: None,
                    });
                }
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Capability> {
        Box::new(self.clone())
    }

    fn save(&self) -> Element {
        let mut element = Element::new(self.id().name());
        for (player, tokens) in &self.tokens {
            let mut child = Element::new("player").with_attr("index", player.0);
            for resource in TradeResource::ALL {
                child.set_attr(resource.name(), tokens[resource.slot()]);
            }
            element.push_child(child);
        }
        element
    }

    fn load(&mut self, element: &Element, _reactions: &mut Reactions) -> Result<(), SnapshotError> {
        for child in element.children_named("player") {
            let index: u8 = child.parse("index")?;
            let player = PlayerId::new(index);
            if !self.tokens.is_empty() && !self.tokens.contains_key(&player) {
                return Err(SnapshotError::UnknownPlayer(index));
            }
            let mut tokens = [0; 3];
            for resource in TradeResource::ALL {
                tokens[resource.slot()] = child.parse(resource.name())?;
            }
            self.tokens.insert(player, tokens);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
