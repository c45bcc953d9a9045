//! A small standard tile set.
//!
//! Each function returns one definition in its unrotated orientation. The
//! set covers every edge combination the base game needs and a few
//! expansion variants (pennants, trade goods, volcano, pig herd, siege).
//! [`registry`] bundles all of them.

use tracing::warn;

use super::definition::{FeatureSpec, TileDefinition};
use super::registry::TileRegistry;
use super::attributes::AttributeValue;
use crate::core::FarmEdge::*;
use crate::core::{FarmEdge, Side};

const ALL_EDGES: [FarmEdge; 8] = FarmEdge::ALL;

/// City on the northern side, field elsewhere.
#[must_use]
pub fn city_cap() -> TileDefinition {
    TileDefinition::new("city-cap")
        .with_feature(FeatureSpec::city(&[Side::North]))
        .with_feature(
            FeatureSpec::farm(&[EastNorth, EastSouth, SouthEast, SouthWest, WestSouth, WestNorth])
                .touching(&[0]),
        )
}

/// [`city_cap`] with a pennant.
#[must_use]
pub fn city_cap_pennant() -> TileDefinition {
    with_city_attr(
        TileDefinition {
            name: "city-cap-pennant".to_string(),
            ..city_cap()
        },
        "pennant", 1,
    )
}

/// City cap carrying a trade good (`wine`, `grain` or `cloth`).
#[must_use]
pub fn city_cap_goods(resource: &str) -> TileDefinition {
    with_city_attr(
        TileDefinition {
            name: format!("city-cap-{resource}"),
            ..city_cap()
        },
        "resource", resource,
    )
}

/// City cap whose city is besieged.
#[must_use]
pub fn city_cap_besieged() -> TileDefinition {
    with_city_attr(
        TileDefinition {
            name: "city-cap-besieged".to_string(),
            ..city_cap()
        },
        "besieged", true,
    )
}

/// City across the northern and eastern sides.
#[must_use]
pub fn city_corner() -> TileDefinition {
    TileDefinition::new("city-corner")
        .with_feature(FeatureSpec::city(&[Side::North, Side::East]))
        .with_feature(FeatureSpec::farm(&[SouthEast, SouthWest, WestSouth, WestNorth]).touching(&[0]))
}

/// [`city_corner`] with a pennant.
#[must_use]
pub fn city_corner_pennant() -> TileDefinition {
    with_city_attr(
        TileDefinition {
            name: "city-corner-pennant".to_string(),
            ..city_corner()
        },
        "pennant", 1,
    )
}

/// City running north to south, a field on each side.
#[must_use]
pub fn city_tube() -> TileDefinition {
    TileDefinition::new("city-tube")
        .with_feature(FeatureSpec::city(&[Side::North, Side::South]))
        .with_feature(FeatureSpec::farm(&[EastNorth, EastSouth]).touching(&[0]))
        .with_feature(FeatureSpec::farm(&[WestSouth, WestNorth]).touching(&[0]))
}

/// [`city_tube`] with a pennant.
#[must_use]
pub fn city_tube_pennant() -> TileDefinition {
    with_city_attr(
        TileDefinition {
            name: "city-tube-pennant".to_string(),
            ..city_tube()
        },
        "pennant", 1,
    )
}

/// Two separate city caps (north and south) with a field between them
/// touching both.
#[must_use]
pub fn city_caps_opposite() -> TileDefinition {
    TileDefinition::new("city-caps-opposite")
        .with_feature(FeatureSpec::city(&[Side::North]))
        .with_feature(FeatureSpec::city(&[Side::South]))
        .with_feature(FeatureSpec::farm(&[EastNorth, EastSouth, WestSouth, WestNorth]).touching(&[0, 1]))
}

/// Road running north to south, splitting the field.
#[must_use]
pub fn road_straight() -> TileDefinition {
    TileDefinition::new("road-straight")
        .with_feature(FeatureSpec::road(&[Side::North, Side::South]))
        .with_feature(FeatureSpec::farm(&[NorthWest, SouthWest, WestSouth, WestNorth]))
        .with_feature(FeatureSpec::farm(&[NorthEast, EastNorth, EastSouth, SouthEast]))
}

/// Road ending on this tile, leaving through the southern side.
#[must_use]
pub fn road_end() -> TileDefinition {
    TileDefinition::new("road-end")
        .with_feature(FeatureSpec::road(&[Side::South]))
        .with_feature(FeatureSpec::farm(&ALL_EDGES))
}

/// Road curving from the southern to the western side.
#[must_use]
pub fn road_curve() -> TileDefinition {
    TileDefinition::new("road-curve")
        .with_feature(FeatureSpec::road(&[Side::South, Side::West]))
        .with_feature(FeatureSpec::farm(&[SouthWest, WestSouth]))
        .with_feature(FeatureSpec::farm(&[WestNorth, NorthWest, NorthEast, EastNorth, EastSouth, SouthEast]))
}

/// Plain field.
#[must_use]
pub fn field() -> TileDefinition {
    TileDefinition::new("field").with_feature(FeatureSpec::farm(&ALL_EDGES))
}

/// Field with a pig herd.
#[must_use]
pub fn field_pig_herd() -> TileDefinition {
    TileDefinition::new("field-pig-herd").with_feature(FeatureSpec::farm(&ALL_EDGES).with_attr("pig-herd", true))
}

/// Field with a volcano, where the dragon appears.
#[must_use]
pub fn volcano() -> TileDefinition {
    TileDefinition::new("volcano")
        .with_feature(FeatureSpec::farm(&ALL_EDGES))
        .with_attr("volcano", true)
}

/// Field whose placement sets the dragon moving.
#[must_use]
pub fn dragon_field() -> TileDefinition {
    TileDefinition::new("dragon-field")
        .with_feature(FeatureSpec::farm(&ALL_EDGES))
        .with_attr("dragon", true)
}

/// Field hosting a festival.
#[must_use]
pub fn festival_field() -> TileDefinition {
    TileDefinition::new("festival-field")
        .with_feature(FeatureSpec::farm(&ALL_EDGES))
        .with_attr("festival", true)
}

/// Cloister in a field.
#[must_use]
pub fn cloister() -> TileDefinition {
    TileDefinition::new("cloister")
        .with_feature(FeatureSpec::cloister())
        .with_feature(FeatureSpec::farm(&ALL_EDGES))
}

/// Cloister with a road leaving south.
#[must_use]
pub fn cloister_road() -> TileDefinition {
    TileDefinition::new("cloister-road")
        .with_feature(FeatureSpec::cloister())
        .with_feature(FeatureSpec::road(&[Side::South]))
        .with_feature(FeatureSpec::farm(&ALL_EDGES))
}

/// Every tile of the standard set.
#[must_use]
pub fn all() -> Vec<TileDefinition> {
    vec![
        city_cap(),
        city_cap_pennant(),
        city_cap_goods("wine"),
        city_cap_goods("grain"),
        city_cap_goods("cloth"),
        city_cap_besieged(),
        city_corner(),
        city_corner_pennant(),
        city_tube(),
        city_tube_pennant(),
        city_caps_opposite(),
        road_straight(),
        road_end(),
        road_curve(),
        field(),
        field_pig_herd(),
        volcano(),
        dragon_field(),
        festival_field(),
        cloister(),
        cloister_road(),
    ]
}

/// Registry holding [`all`] standard tiles.
#[must_use]
pub fn registry() -> TileRegistry {
    let mut registry = TileRegistry::new();
    for definition in all() {
        if let Err(err) = registry.register(definition) {
            warn!(%err, "standard tile skipped");
        }
    }
    registry
}

/// Put an attribute on the first feature, the city of every city tile here.
fn with_city_attr(mut tile: TileDefinition, key: &str, value: impl Into<AttributeValue>) -> TileDefinition {
    if let Some(city) = tile.features.first_mut() {
        city.attributes = std::mem::take(&mut city.attributes).with(key, value);
    }
    tile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::EdgeKind;
    use crate::core::Rotation;

    #[test]
    fn test_names_unique() {
        let tiles = all();
        let registry = registry();
        assert_eq!(registry.len(), tiles.len());
    }

    #[test]
    fn test_edges() {
        assert_eq!(city_cap().edge(Side::North, Rotation::R0), EdgeKind::City);
        assert_eq!(city_cap().edge(Side::South, Rotation::R0), EdgeKind::Field);
        assert_eq!(cloister_road().edge(Side::South, Rotation::R0), EdgeKind::Road);
        assert_eq!(city_corner().edge(Side::South, Rotation::R90), EdgeKind::City);
    }

    #[test]
    fn test_variants_carry_attributes() {
        let wine = city_cap_goods("wine");
        assert_eq!(wine.features[0].attributes.text("resource").unwrap(), Some("wine"));
        assert_eq!(city_tube_pennant().features[0].attributes.int("pennant").unwrap(), Some(1));
        assert!(volcano().attributes.flag("volcano").unwrap());
    }

    #[test]
    fn test_farm_edges_partition_tiles() {
        // Farms of a tile never share a half-edge.
        for tile in all() {
            let mut seen = Vec::new();
            for spec in &tile.features {
                for edge in &spec.farm_edges {
                    assert!(!seen.contains(edge), "{} repeats {:?}", tile.name, edge);
                    seen.push(*edge);
                }
            }
        }
    }
}
