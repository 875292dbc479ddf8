//! Hand-assembled FIT files for decoder tests.

use super::fit::degrees_to_semicircles;
use chrono::{DateTime, TimeZone, Utc};

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
const FIT_EPOCH_OFFSET: i64 = 631_065_600;

const ENUM: u8 = 0x00;
const SINT32: u8 = 0x85;
const UINT32: u8 = 0x86;

const MESG_FILE_ID: u16 = 0;
const MESG_SESSION: u16 = 18;
const MESG_RECORD: u16 = 20;
const MESG_ACTIVITY: u16 = 34;

const FIELD_TIMESTAMP: u8 = 253;

/// Session totals as stored on disk: centimeters and milliseconds.
pub const TOTAL_DISTANCE_CM: u32 = 123_450;
pub const TOTAL_TIMER_MS: u32 = 456_000;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

pub fn fit_crc(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |crc, &byte| {
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        let crc = ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[(byte >> 4) as usize]
    })
}

pub fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2012, 3, 4, 12, 59, 58).unwrap()
}

pub fn activity_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2012, 3, 4, 17, 12, 0).unwrap()
}

pub fn track_point(i: u32) -> (f64, f64) {
    let t = i as f64;
    (-92.2896 + t * 0.00013, 34.7465 + t * 0.0001)
}

fn fit_time(timestamp: DateTime<Utc>) -> [u8; 4] {
    ((timestamp.timestamp() - FIT_EPOCH_OFFSET) as u32).to_le_bytes()
}

#[derive(Default)]
pub struct FitFileBuilder {
    data: Vec<u8>,
}

impl FitFileBuilder {
    /// `fields` are (field number, size, base type).
    pub fn define(&mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> &mut Self {
        self.data.push(0x40 | local);
        self.data.extend_from_slice(&[0, 0]); // reserved, little endian
        self.data.extend_from_slice(&global.to_le_bytes());
        self.data.push(fields.len() as u8);
        for &(number, size, base_type) in fields {
            self.data.extend_from_slice(&[number, size, base_type]);
        }
        self
    }

    pub fn message(&mut self, local: u8, payload: &[u8]) -> &mut Self {
        self.data.push(local);
        self.data.extend_from_slice(payload);
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut file = vec![14u8, 0x10];
        file.extend_from_slice(&2093u16.to_le_bytes());
        file.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        file.extend_from_slice(b".FIT");
        let header_crc = fit_crc(&file);
        file.extend_from_slice(&header_crc.to_le_bytes());

        file.extend_from_slice(&self.data);
        let file_crc = fit_crc(&file);
        file.extend_from_slice(&file_crc.to_le_bytes());
        file
    }
}

/// A single-session running file with `positions` record messages. Every
/// record whose index is a multiple of `drop_lat_every` carries no latitude.
pub fn running_fit(positions: u32, drop_lat_every: u32) -> Vec<u8> {
    let mut builder = FitFileBuilder::default();

    builder
        .define(0, MESG_FILE_ID, &[(0, 1, ENUM)])
        .message(0, &[4]) // activity file
        .define(1, MESG_RECORD, &[(FIELD_TIMESTAMP, 4, UINT32), (0, 4, SINT32), (1, 4, SINT32)])
        .define(2, MESG_RECORD, &[(FIELD_TIMESTAMP, 4, UINT32), (1, 4, SINT32)]);

    for i in 0..positions {
        let timestamp = fit_time(session_start() + chrono::Duration::seconds(i as i64));
        let (lon, lat) = track_point(i);
        let lon = degrees_to_semicircles(lon).to_le_bytes();
        let lat = degrees_to_semicircles(lat).to_le_bytes();
        if i % drop_lat_every == 0 {
            builder.message(2, &[timestamp, lon].concat());
        } else {
            builder.message(1, &[timestamp, lat, lon].concat());
        }
    }

    let mut session = Vec::new();
    session.extend_from_slice(&fit_time(activity_end()));
    session.extend_from_slice(&fit_time(session_start()));
    session.push(1); // running
    session.extend_from_slice(&TOTAL_TIMER_MS.to_le_bytes());
    session.extend_from_slice(&TOTAL_DISTANCE_CM.to_le_bytes());

    let mut activity = fit_time(activity_end()).to_vec();
    activity.extend_from_slice(&[26, 1]); // event activity, stop

    builder
        .define(
            3,
            MESG_SESSION,
            &[
                (FIELD_TIMESTAMP, 4, UINT32),
                (2, 4, UINT32), // start_time
                (5, 1, ENUM),   // sport
                (8, 4, UINT32), // total_timer_time
                (9, 4, UINT32), // total_distance
            ],
        )
        .message(3, &session)
        .define(
            4,
            MESG_ACTIVITY,
            &[(FIELD_TIMESTAMP, 4, UINT32), (3, 1, ENUM), (4, 1, ENUM)],
        )
        .message(4, &activity);

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_matches_reference_check_value() {
        // CRC-16/ARC of "123456789"
        assert_eq!(fit_crc(b"123456789"), 0xBB3D);
    }
}
