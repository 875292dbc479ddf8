use super::{ParseError, Parser, is_fit};
use crate::activity::{Activity, Sample};
use chrono::{DateTime, Utc};
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use tracing::debug;

const SEMICIRCLES_PER_HALF_TURN: f64 = 2_147_483_648.0;

pub fn semicircles_to_degrees(semicircles: i32) -> f64 {
    semicircles as f64 * (180.0 / SEMICIRCLES_PER_HALF_TURN)
}

pub fn degrees_to_semicircles(degrees: f64) -> i32 {
    (degrees * (SEMICIRCLES_PER_HALF_TURN / 180.0)).round() as i32
}

/// `record` message: one GPS sample, raw semicircles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionRecord {
    pub lat: Option<i32>,
    pub lon: Option<i32>,
}

/// `activity` message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityEventRecord {
    pub event: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// `session` message: the device's own summary of the recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummaryRecord {
    pub sport: Option<String>,
    pub total_distance: Option<f64>,
    pub total_timer_time: Option<f64>,
    pub start_time: Option<DateTime<Utc>>,
}

/// Receives decoded messages in file order.
pub trait RecordListener {
    fn on_position(&mut self, record: PositionRecord);

    fn on_activity_event(&mut self, record: ActivityEventRecord);

    fn on_session_summary(&mut self, record: SessionSummaryRecord);
}

/// Builds a single-session [`Activity`] from the decoded message stream.
#[derive(Debug, Default)]
pub struct ActivityListener {
    activity: Activity,
}

impl ActivityListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Activity {
        self.activity
    }
}

impl RecordListener for ActivityListener {
    fn on_position(&mut self, record: PositionRecord) {
        if let (Some(lat), Some(lon)) = (record.lat, record.lon) {
            self.activity.append_point(Sample::new(
                semicircles_to_degrees(lon),
                semicircles_to_degrees(lat),
            ));
        }
    }

    fn on_activity_event(&mut self, record: ActivityEventRecord) {
        if record.event.as_deref() == Some("activity") {
            self.activity.set_start_time_if_unset(record.timestamp);
        }
    }

    fn on_session_summary(&mut self, record: SessionSummaryRecord) {
        // the session is written last and wins over the activity message
        self.activity.set_start_time(record.start_time);
        self.activity.set_summary(
            record.sport.map(|sport| sport.to_ascii_uppercase()),
            record.total_distance,
            record.total_timer_time,
        );
    }
}

/// Decodes `bytes` completely, then replays the messages the listener cares
/// about. A decode error means no callback has run.
pub fn broadcast<L: RecordListener>(bytes: &[u8], listener: &mut L) -> Result<(), ParseError> {
    let records = fitparser::from_bytes(bytes)?;
    debug!("decoded {} FIT messages", records.len());

    for record in &records {
        match record.kind() {
            MesgNum::Record => listener.on_position(position_record(record)),
            MesgNum::Activity => listener.on_activity_event(activity_event_record(record)),
            MesgNum::Session => listener.on_session_summary(session_summary_record(record)),
            _ => {}
        }
    }

    Ok(())
}

pub fn decode_fit(bytes: &[u8]) -> Result<Activity, ParseError> {
    if !is_fit(bytes) {
        return Err(ParseError::NotFit);
    }
    let mut listener = ActivityListener::new();
    broadcast(bytes, &mut listener)?;
    Ok(listener.finish())
}

pub struct FitParser;

impl Parser for FitParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Activity>, ParseError> {
        decode_fit(bytes).map(|activity| vec![activity])
    }

    fn name(&self) -> &'static str {
        "FIT Parser"
    }
}

fn position_record(record: &FitDataRecord) -> PositionRecord {
    let mut position = PositionRecord::default();

    for field in record.fields() {
        match field.name() {
            "position_lat" => position.lat = extract_semicircles(field.value()),
            "position_long" => position.lon = extract_semicircles(field.value()),
            _ => {} // ignore other fields
        }
    }

    position
}

fn activity_event_record(record: &FitDataRecord) -> ActivityEventRecord {
    let mut event = ActivityEventRecord::default();

    for field in record.fields() {
        match field.name() {
            "event" => event.event = extract_string(field.value()),
            "timestamp" => event.timestamp = extract_timestamp(field.value()),
            _ => {}
        }
    }

    event
}

fn session_summary_record(record: &FitDataRecord) -> SessionSummaryRecord {
    let mut session = SessionSummaryRecord::default();

    for field in record.fields() {
        match field.name() {
            "sport" => session.sport = extract_string(field.value()),
            "total_distance" => session.total_distance = extract_number(field.value()),
            "total_timer_time" => session.total_timer_time = extract_number(field.value()),
            "start_time" => session.start_time = extract_timestamp(field.value()),
            _ => {}
        }
    }

    session
}

fn extract_semicircles(value: &Value) -> Option<i32> {
    match value {
        Value::SInt32(v) => Some(*v),
        Value::UInt32(v) => i32::try_from(*v).ok(),
        Value::SInt64(v) => i32::try_from(*v).ok(),
        Value::Float64(v) => Some(*v as i32),
        _ => None,
    }
}

fn extract_number(value: &Value) -> Option<f64> {
    match value {
        Value::SInt32(v) => Some(*v as f64),
        Value::UInt32(v) => Some(*v as f64),
        Value::SInt16(v) => Some(*v as f64),
        Value::UInt16(v) => Some(*v as f64),
        Value::SInt8(v) => Some(*v as f64),
        Value::UInt8(v) => Some(*v as f64),
        Value::Float32(v) => Some(*v as f64),
        Value::Float64(v) => Some(*v),
        _ => None,
    }
}

fn extract_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn extract_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Timestamp(t) => Some(t.with_timezone(&Utc)),
        _ => None,
    }
}
