use chrono::{DateTime, Utc};
use geo::{Coord, LineString, Point};

/// Minute-precision UTC timestamp, e.g. `2012-04-23T18:25Z`.
const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

pub fn format_start_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format(START_TIME_FORMAT).to_string()
}

/// One recorded position. `epoch_millis` is only known for XML trackpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub point: Point,
    pub epoch_millis: Option<i64>,
}

impl Sample {
    pub fn new(lon: f64, lat: f64) -> Self {
        Sample {
            point: Point::new(lon, lat),
            epoch_millis: None,
        }
    }

    pub fn with_time(lon: f64, lat: f64, epoch_millis: Option<i64>) -> Self {
        Sample {
            point: Point::new(lon, lat),
            epoch_millis,
        }
    }

    /// (0, 0) is what devices report when they have no fix.
    pub fn is_sentinel(&self) -> bool {
        self.point.x() == 0.0 && self.point.y() == 0.0
    }
}

/// Canonical activity accumulated by the parsers.
///
/// Unknown values stay `None` so consumers can tell "unknown" apart from zero.
/// `total_meters` and `total_seconds` come from device or lap summaries and are
/// never derived from `track`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub activity_id: Option<i64>,
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub sport: Option<String>,
    pub total_meters: Option<f64>,
    pub total_seconds: Option<f64>,
    pub track: Vec<Sample>,
}

impl Activity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_start_time_if_unset(&mut self, timestamp: Option<DateTime<Utc>>) {
        if self.start_time.is_none() {
            self.set_start_time(timestamp);
        }
    }

    pub fn set_start_time(&mut self, timestamp: Option<DateTime<Utc>>) {
        if let Some(timestamp) = timestamp {
            self.start_time = Some(format_start_time(timestamp));
        }
    }

    /// Appends in arrival order. Sentinel positions are dropped.
    pub fn append_point(&mut self, sample: Sample) {
        if !sample.is_sentinel() {
            self.track.push(sample);
        }
    }

    pub fn set_summary(
        &mut self,
        sport: Option<String>,
        total_meters: Option<f64>,
        total_seconds: Option<f64>,
    ) {
        if let Some(sport) = sport {
            self.sport = Some(sport);
        }
        if let Some(meters) = total_meters.filter(|m| m.is_finite()) {
            self.total_meters = Some(meters);
        }
        if let Some(seconds) = total_seconds.filter(|s| s.is_finite()) {
            self.total_seconds = Some(seconds);
        }
    }

    /// The track as a plain (lon, lat) line, dropping timestamps.
    pub fn line_string(&self) -> LineString {
        self.track
            .iter()
            .map(|sample| Coord::from(sample.point))
            .collect()
    }
}
