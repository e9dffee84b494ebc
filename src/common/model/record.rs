use serde::{Deserialize, Serialize};
use std::fmt;

/// One input unit: a date, a location and the guessed sunset hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "hour")]
    pub requested_hour: u32,
}

impl Record {
    pub fn new(date: impl Into<String>, latitude: f64, longitude: f64, requested_hour: u32) -> Self {
        Self {
            date: date.into(),
            latitude,
            longitude,
            requested_hour,
        }
    }

    /// Resolves this record against a looked-up sunset hour.
    ///
    /// Returns `None` unless the hours agree exactly, so a [`ComputedRecord`]
    /// can only ever describe a match.
    pub fn resolve(self, sunset_hour: u32) -> Option<ComputedRecord> {
        (self.requested_hour == sunset_hour).then_some(ComputedRecord {
            record: self,
            sunset_hour,
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}, {:.2}) hour {}",
            self.date, self.latitude, self.longitude, self.requested_hour
        )
    }
}

/// A record whose requested hour matched the sunset hour.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedRecord {
    record: Record,
    sunset_hour: u32,
}

impl ComputedRecord {
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn date(&self) -> &str {
        &self.record.date
    }

    pub fn latitude(&self) -> f64 {
        self.record.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.record.longitude
    }

    pub fn hour(&self) -> u32 {
        self.record.requested_hour
    }

    pub fn sunset_hour(&self) -> u32 {
        self.sunset_hour
    }
}

impl fmt::Display for ComputedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Date: {} Lat: {:.2} Lng: {:.2} Guess Hour: {} Sunset Hour: {}",
            self.date(),
            self.latitude(),
            self.longitude(),
            self.hour(),
            self.sunset_hour
        )
    }
}
