//! Training Center XML (`.tcx`) flattening.
//!
//! The document is deserialized into plain node structs and then walked by
//! [`flatten`], which emits one [`Activity`] per leaf activity. Multi-sport
//! sessions are split into their legs, never merged.

use super::{ParseError, Parser};
use crate::activity::{Activity, Sample};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::error;

/// Lap `DistanceMeters` totals are scaled down by this factor before they land
/// in `total_meters`.
const LAP_DISTANCE_DIVISOR: f64 = 100.0;

#[derive(Debug, Default, Deserialize)]
#[serde(rename = "TrainingCenterDatabase")]
pub struct TrainingCenterDatabase {
    #[serde(rename = "Activities")]
    pub activities: Option<ActivityList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityList {
    #[serde(rename = "Activity", default)]
    pub activity: Vec<ActivityNode>,
    #[serde(rename = "MultiSportSession", default)]
    pub multi_sport_session: Vec<MultiSportSession>,
}

#[derive(Debug, Deserialize)]
pub struct MultiSportSession {
    #[serde(rename = "FirstSport")]
    pub first_sport: SportLeg,
    #[serde(rename = "NextSport", default)]
    pub next_sport: Vec<SportLeg>,
}

#[derive(Debug, Deserialize)]
pub struct SportLeg {
    #[serde(rename = "Activity")]
    pub activity: ActivityNode,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityNode {
    #[serde(rename = "@Sport")]
    pub sport: Option<String>,
    #[serde(rename = "Lap", default)]
    pub lap: Vec<Lap>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Lap {
    #[serde(rename = "@StartTime")]
    pub start_time: Option<String>,
    #[serde(rename = "TotalTimeSeconds")]
    pub total_time_seconds: Option<f64>,
    #[serde(rename = "DistanceMeters")]
    pub distance_meters: Option<f64>,
    #[serde(rename = "Track", default)]
    pub track: Vec<Track>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Track {
    #[serde(rename = "Trackpoint", default)]
    pub trackpoint: Vec<Trackpoint>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Trackpoint {
    #[serde(rename = "Time")]
    pub time: Option<String>,
    #[serde(rename = "Position")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Position {
    #[serde(rename = "LatitudeDegrees")]
    pub latitude_degrees: f64,
    #[serde(rename = "LongitudeDegrees")]
    pub longitude_degrees: f64,
}

/// Plain activities take precedence; multi-sport sessions are only walked when
/// there are none.
pub fn flatten(database: &TrainingCenterDatabase) -> Vec<Activity> {
    let Some(list) = &database.activities else {
        return Vec::new();
    };

    if !list.activity.is_empty() {
        return list.activity.iter().map(flatten_activity).collect();
    }

    list.multi_sport_session
        .iter()
        .flat_map(|session| {
            std::iter::once(&session.first_sport)
                .chain(&session.next_sport)
                .map(|leg| flatten_activity(&leg.activity))
        })
        .collect()
}

fn flatten_activity(node: &ActivityNode) -> Activity {
    let mut activity = Activity::new();
    let mut distance = 0.0;
    let mut seconds = 0.0;

    for lap in &node.lap {
        distance += lap.distance_meters.unwrap_or(0.0);
        seconds += lap.total_time_seconds.unwrap_or(0.0);
        activity.set_start_time_if_unset(lap.start_time.as_deref().and_then(parse_time));

        for trackpoint in lap.track.iter().flat_map(|track| &track.trackpoint) {
            if let Some(position) = trackpoint.position {
                let epoch_millis = trackpoint
                    .time
                    .as_deref()
                    .and_then(parse_time)
                    .map(|t| t.timestamp_millis());
                activity.append_point(Sample::with_time(
                    position.longitude_degrees,
                    position.latitude_degrees,
                    epoch_millis,
                ));
            }
        }
    }

    activity.set_summary(
        node.sport.as_deref().map(str::to_ascii_uppercase),
        Some(distance / LAP_DISTANCE_DIVISOR),
        Some(seconds),
    );
    activity
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Unmarshal failures are logged and produce no activities.
pub fn parse_tcx(bytes: &[u8]) -> Vec<Activity> {
    match quick_xml::de::from_reader::<_, TrainingCenterDatabase>(bytes) {
        Ok(database) => flatten(&database),
        Err(e) => {
            error!("TCX parse error: {}", e);
            Vec::new()
        }
    }
}

pub struct TcxParser;

impl Parser for TcxParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Activity>, ParseError> {
        Ok(parse_tcx(bytes))
    }

    fn name(&self) -> &'static str {
        "TCX Parser"
    }
}
