use geojson::{Feature, GeoJson, Value};
use serde_json::Value as JsonValue;

use crate::error::LoadError;
use crate::geopoint::GeoPoint;
use crate::model::{
    ConnectorKind, ConnectorSpan, NetworkSegment, Room, SegmentProperties, Structure, TravelMode,
};
use crate::store::MemoryStore;

/// Loads a campus bundle: one GeoJSON FeatureCollection where each
/// feature's `kind` property says whether it is a structure footprint, a
/// room, an indoor corridor network, or an outdoor path. This is the
/// same data the administrative layer persists, exported flat.
pub fn load_campus(raw: &str) -> Result<MemoryStore, LoadError> {
    let geojson: GeoJson = raw.parse().map_err(LoadError::Parse)?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(LoadError::NotAFeatureCollection);
    };

    let mut store = MemoryStore::new();

    for feature in collection.features {
        match prop_str(&feature, "kind") {
            Some("structure") => store.add_structure(parse_structure(&feature)?),
            Some("room") => store.add_room(parse_room(&feature)?),
            Some("indoor") => {
                let structure = prop_u64(&feature, "structureId")
                    .ok_or(LoadError::MissingField("structureId"))?;
                let floor =
                    prop_i64(&feature, "floor").ok_or(LoadError::MissingField("floor"))? as i32;
                store.add_indoor_segment(structure, floor, parse_segment(&feature)?);
            }
            Some("outdoor") => store.add_outdoor_segment(parse_segment(&feature)?),
            other => {
                tracing::warn!(kind = ?other, "skipping feature with unknown kind");
            }
        }
    }

    tracing::info!(
        indoor = store.indoor_count(),
        outdoor = store.outdoor_count(),
        "campus bundle loaded"
    );

    Ok(store)
}

fn parse_structure(feature: &Feature) -> Result<Structure, LoadError> {
    let footprint = match geometry_value(feature) {
        Some(Value::Polygon(rings)) => rings.first().map(|ring| ring_points(ring)),
        _ => None,
    };

    let centroid = prop_point(feature, "centroid")
        .or_else(|| footprint.as_deref().and_then(crate::model::ring_centroid))
        .ok_or(LoadError::MissingField("centroid"))?;

    Ok(Structure {
        id: prop_u64(feature, "id").ok_or(LoadError::MissingField("id"))?,
        name: prop_str(feature, "name").unwrap_or_default().to_string(),
        footprint,
        centroid,
        floors: prop_i32_array(feature, "floors"),
    })
}

fn parse_room(feature: &Feature) -> Result<Room, LoadError> {
    let (footprint, centroid) = match geometry_value(feature) {
        Some(Value::Point(p)) => (None, Some(GeoPoint::new(p[0], p[1]))),
        Some(Value::Polygon(rings)) => (rings.first().map(|ring| ring_points(ring)), None),
        _ => (None, None),
    };

    Ok(Room {
        id: prop_u64(feature, "id").ok_or(LoadError::MissingField("id"))?,
        structure_id: prop_u64(feature, "structureId")
            .ok_or(LoadError::MissingField("structureId"))?,
        floor: prop_i64(feature, "floor").ok_or(LoadError::MissingField("floor"))? as i32,
        name: prop_str(feature, "name").unwrap_or_default().to_string(),
        footprint,
        centroid: centroid.or_else(|| prop_point(feature, "centroid")),
        searchable: prop_bool(feature, "isSearchable").unwrap_or(true),
    })
}

fn parse_segment(feature: &Feature) -> Result<NetworkSegment, LoadError> {
    let lines = match geometry_value(feature) {
        Some(Value::MultiLineString(lines)) => {
            lines.iter().map(|line| ring_points(line)).collect()
        }
        Some(Value::LineString(line)) => vec![ring_points(line)],
        _ => return Err(LoadError::UnsupportedGeometry),
    };

    let connector = match (prop_i64(feature, "fromFloor"), prop_i64(feature, "toFloor")) {
        (Some(from), Some(to)) => {
            let kind = match prop_str(feature, "connectorType") {
                Some("stairs") => ConnectorKind::Stairs,
                _ => ConnectorKind::LevelPassage,
            };
            Some(ConnectorSpan {
                from_floor: from as i32,
                to_floor: to as i32,
                kind,
            })
        }
        _ => None,
    };

    let mode = match prop_str(feature, "mode") {
        Some("driving") => Some(TravelMode::Driving),
        Some("walking") => Some(TravelMode::Walking),
        _ => None,
    };

    Ok(NetworkSegment {
        id: prop_u64(feature, "id").ok_or(LoadError::MissingField("id"))?,
        name: prop_str(feature, "name").map(str::to_string),
        lines,
        properties: SegmentProperties {
            is_door: prop_bool(feature, "isDoor").unwrap_or(false),
            is_main_entrance: prop_bool(feature, "isMainEntrance").unwrap_or(false),
            is_stairs: prop_bool(feature, "isStairs").unwrap_or(false),
            is_bathroom: prop_bool(feature, "isBathroom").unwrap_or(false),
            mode,
            connector,
        },
    })
}

fn geometry_value(feature: &Feature) -> Option<&Value> {
    feature.geometry.as_ref().map(|g| &g.value)
}

fn ring_points(ring: &[Vec<f64>]) -> Vec<GeoPoint> {
    ring.iter()
        .filter(|p| p.len() >= 2)
        .map(|p| GeoPoint::new(p[0], p[1]))
        .collect()
}

fn prop(feature: &Feature, key: &str) -> Option<JsonValue> {
    feature.properties.as_ref()?.get(key).cloned()
}

fn prop_str<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature.properties.as_ref()?.get(key)?.as_str()
}

fn prop_u64(feature: &Feature, key: &str) -> Option<u64> {
    prop(feature, key)?.as_u64()
}

fn prop_i64(feature: &Feature, key: &str) -> Option<i64> {
    prop(feature, key)?.as_i64()
}

fn prop_bool(feature: &Feature, key: &str) -> Option<bool> {
    prop(feature, key)?.as_bool()
}

fn prop_point(feature: &Feature, key: &str) -> Option<GeoPoint> {
    let value = prop(feature, key)?;
    let pair = value.as_array()?;
    Some(GeoPoint::new(pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
}

fn prop_i32_array(feature: &Feature, key: &str) -> Vec<i32> {
    prop(feature, key)
        .and_then(|value| {
            value.as_array().map(|floors| {
                floors
                    .iter()
                    .filter_map(|f| f.as_i64().map(|f| f as i32))
                    .collect()
            })
        })
        .unwrap_or_default()
}
