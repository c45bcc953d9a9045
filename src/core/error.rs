//! Error types.
//!
//! Each concern has its own error enum; [`Error`] wraps all of them for
//! callers that just want `?` to work across the crate.

use thiserror::Error;

use super::entity::{FeatureId, MeepleId};
use super::geometry::{Position, Side};
use super::player::PlayerId;
use crate::board::FeatureKind;
use crate::capabilities::CapabilityId;

/// Malformed tile-definition data.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("tile definition `{0}` is registered twice")]
    Duplicate(String),
    #[error("attribute `{key}` must be {expected}")]
    InvalidAttribute { key: String, expected: &'static str },
    #[error("unknown trade resource `{0}`")]
    UnknownResource(String),
    #[error("feature {feature} references missing feature index {index}")]
    InvalidFeatureIndex { feature: usize, index: usize },
    #[error("failed to parse tile definitions: {0}")]
    Json(#[from] serde_json::Error),
}

/// A tile placement rejected before the graph was touched.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("the game has not been started")]
    NotStarted,
    #[error("unknown tile definition `{0}`")]
    UnknownDefinition(String),
    #[error("position {0} is already occupied")]
    Occupied(Position),
    #[error("position {0} has no placed neighbour")]
    NoNeighbour(Position),
    #[error("{side:?} edge of the tile at {position} does not match its neighbour")]
    EdgeMismatch { position: Position, side: Side },
    #[error("tile `{definition}` rejected: {source}")]
    Rejected {
        definition: String,
        #[source]
        source: DefinitionError,
    },
}

/// Meeple deployment failures.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("unknown feature {0}")]
    UnknownFeature(FeatureId),
    #[error("feature {0} already holds a meeple")]
    Occupied(FeatureId),
    #[error("unknown meeple {0}")]
    UnknownMeeple(MeepleId),
    #[error("meeple {0} is not deployed")]
    NotDeployed(MeepleId),
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
}

/// Scoring precondition violations.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("unknown feature {0}")]
    UnknownFeature(FeatureId),
    #[error("{player} has no follower on feature {feature}")]
    NotAnOwner { feature: FeatureId, player: PlayerId },
    #[error("feature {0} has already been scored")]
    AlreadyScored(FeatureId),
    #[error("feature {0} is not completed")]
    NotCompleted(FeatureId),
    #[error("feature {feature} of kind {kind:?} cannot be scored this way")]
    WrongKind { feature: FeatureId, kind: FeatureKind },
    #[error("city {feature} cannot become a castle: {reason}")]
    NotACastleCandidate { feature: FeatureId, reason: &'static str },
}

/// Capability construction and capability-specific move failures.
///
/// A capability that fails to construct is left out of the game.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("invalid configuration for {capability:?}: {reason}")]
    InvalidConfig {
        capability: CapabilityId,
        reason: String,
    },
    #[error("capability {0:?} is not active in this game")]
    Missing(CapabilityId),
    #[error("illegal {capability:?} move: {reason}")]
    IllegalMove {
        capability: CapabilityId,
        reason: String,
    },
}

/// Snapshot encoding and decoding failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("element `{element}` is missing attribute `{attribute}`")]
    MissingAttribute { element: String, attribute: String },
    #[error("element `{element}` has invalid `{attribute}` value `{value}`")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("snapshot references unknown player index {0}")]
    UnknownPlayer(u8),
    #[error("binary snapshot encoding failed: {0}")]
    Binary(#[from] bincode::Error),
    #[error("JSON snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any error raised by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Deploy(#[from] DeployError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PlacementError::Occupied(Position::new(1, -2));
        assert_eq!(err.to_string(), "position [1,-2] is already occupied");

        let err = ScoringError::NotAnOwner {
            feature: FeatureId::new(4),
            player: PlayerId::new(1),
        };
        assert_eq!(err.to_string(), "Player 1 has no follower on feature Feature(4)");
    }

    #[test]
    fn test_wrapping() {
        let err: Error = ScoringError::AlreadyScored(FeatureId::new(2)).into();
        assert!(matches!(err, Error::Scoring(ScoringError::AlreadyScored(_))));
        assert_eq!(err.to_string(), "feature Feature(2) has already been scored");
    }
}
