use crate::activity::Activity;
use crate::geometry::{BoundingBox, bounding_box, simplify_track};
use geo::LineString;
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value, feature::Id};

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("activity has no activity id")]
    MissingActivityId,
}

/// Schema-shaped record handed to the GeoJSON writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityFeature {
    pub geometry: LineString,
    pub activity_id: String,
    pub name: Option<String>,
    pub sport: Option<String>,
    pub start_time: Option<String>,
    pub total_meters: Option<f64>,
    pub total_seconds: Option<f64>,
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

/// Geometry is the simplified track, and the bounding box is taken from that
/// simplified geometry rather than the raw samples.
pub fn assemble(activity: &Activity) -> Result<ActivityFeature, FeatureError> {
    let activity_id = activity
        .activity_id
        .ok_or(FeatureError::MissingActivityId)?;

    let geometry = simplify_track(&activity.line_string());
    let BoundingBox { min, max } = bounding_box(Some(&geometry));

    Ok(ActivityFeature {
        geometry,
        activity_id: activity_id.to_string(),
        name: activity.name.clone(),
        sport: activity.sport.clone(),
        start_time: activity.start_time.clone(),
        total_meters: activity.total_meters,
        total_seconds: activity.total_seconds,
        min_lat: min.y,
        min_lon: min.x,
        max_lat: max.y,
        max_lon: max.x,
    })
}

impl From<ActivityFeature> for Feature {
    fn from(feature: ActivityFeature) -> Self {
        // a GeoJSON LineString needs two or more positions
        let geometry = (feature.geometry.0.len() >= 2).then(|| {
            let positions = feature
                .geometry
                .coords()
                .map(|c| vec![c.x, c.y])
                .collect();
            Geometry::new(Value::LineString(positions))
        });

        let mut properties = JsonObject::new();
        properties.insert("activityId".into(), feature.activity_id.clone().into());
        properties.insert("name".into(), optional(feature.name));
        properties.insert("sport".into(), optional(feature.sport));
        properties.insert("startTime".into(), optional(feature.start_time));
        properties.insert("totalMeters".into(), optional(feature.total_meters));
        properties.insert("totalSeconds".into(), optional(feature.total_seconds));
        properties.insert("minLat".into(), feature.min_lat.into());
        properties.insert("minLon".into(), feature.min_lon.into());
        properties.insert("maxLat".into(), feature.max_lat.into());
        properties.insert("maxLon".into(), feature.max_lon.into());

        Feature {
            bbox: None,
            geometry,
            id: Some(Id::String(feature.activity_id)),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

fn optional<T: Into<JsonValue>>(value: Option<T>) -> JsonValue {
    value.map_or(JsonValue::Null, Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Sample;

    fn marathon() -> Activity {
        let mut activity = Activity::new();
        activity.sport = Some("RUNNING".into());
        activity.start_time = Some("2012-03-04T12:59Z".into());
        activity.total_meters = Some(42_448.13);
        activity.total_seconds = Some(15_120.5);
        for i in 0..50 {
            let t = i as f64;
            // gentle curve so the simplified line keeps interior points
            activity.append_point(Sample::new(-92.29 + t * 1e-4, 34.74 + (t * 1e-4).powi(2) * 40.0));
        }
        activity
    }

    #[test]
    fn assembly_requires_an_activity_id() {
        assert!(matches!(
            assemble(&marathon()),
            Err(FeatureError::MissingActivityId)
        ));
    }

    #[test]
    fn assembled_feature_uses_simplified_geometry_and_summary_totals() {
        let mut activity = marathon();
        activity.activity_id = Some(155_155_867);
        activity.name = Some("2012 Little Rock Marathon".into());

        let feature = assemble(&activity).unwrap();
        let raw = activity.line_string();

        assert_eq!(feature.activity_id, "155155867");
        assert!(feature.geometry.0.len() < raw.0.len());
        assert_eq!(feature.geometry.0.first(), raw.0.first());
        assert_eq!(feature.geometry.0.last(), raw.0.last());
        assert_eq!(feature.total_meters, Some(42_448.13));
        assert_eq!(feature.total_seconds, Some(15_120.5));
        assert_eq!(feature.min_lon, -92.29);
        assert_eq!(feature.min_lat, 34.74);
        assert!(feature.max_lat > feature.min_lat && feature.max_lon > feature.min_lon);
    }

    #[test]
    fn empty_track_assembles_with_degenerate_bounds() {
        let mut activity = Activity::new();
        activity.activity_id = Some(7);

        let feature = assemble(&activity).unwrap();
        assert!(feature.geometry.0.is_empty());
        assert_eq!(
            (feature.min_lat, feature.min_lon, feature.max_lat, feature.max_lon),
            (0.0, 0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn tracks_shorter_than_a_line_have_null_geometry() {
        let mut activity = Activity::new();
        activity.activity_id = Some(8);

        let empty: Feature = assemble(&activity).unwrap().into();
        assert!(empty.geometry.is_none());

        activity.append_point(Sample::new(-92.29, 34.74));
        let single: Feature = assemble(&activity).unwrap().into();
        assert!(single.geometry.is_none());

        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["geometry"], JsonValue::Null);
        assert_eq!(json["properties"]["minLon"], -92.29);
    }

    #[test]
    fn geojson_feature_has_lon_lat_order_and_null_unknowns() {
        let mut activity = marathon();
        activity.activity_id = Some(42);
        activity.total_seconds = None;

        let feature: Feature = assemble(&activity).unwrap().into();
        let json = serde_json::to_value(&feature).unwrap();

        assert_eq!(json["id"], "42");
        assert_eq!(json["geometry"]["type"], "LineString");
        assert_eq!(json["geometry"]["coordinates"][0][0], -92.29);
        assert_eq!(json["geometry"]["coordinates"][0][1], 34.74);
        assert_eq!(json["properties"]["sport"], "RUNNING");
        assert_eq!(json["properties"]["name"], JsonValue::Null);
        assert_eq!(json["properties"]["totalSeconds"], JsonValue::Null);
        assert_eq!(json["properties"]["minLon"], -92.29);
    }
}
