use crate::common::model::{LookupConfig, Record};
use crate::errors::{LookupError, Result};
use crate::lookup::SunsetLookup;
use chrono::{NaiveTime, Timelike};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const SUNSET_TIME_FORMAT: &str = "%I:%M:%S %p";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    // The service sends `"results": ""` alongside error statuses.
    #[serde(default)]
    results: Value,
}

/// Sunset lookup backed by the sunrise-sunset.org JSON API.
///
/// One GET per record, no caching and no retries. Every request carries the
/// configured timeout; expiry surfaces as [`LookupError::Timeout`].
#[derive(Clone)]
pub struct HttpSunsetLookup {
    client: Client,
    endpoint: String,
}

impl HttpSunsetLookup {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .build()
            .map_err(LookupError::Request)?;

        Ok(HttpSunsetLookup {
            client,
            endpoint: format!("{}/json", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl SunsetLookup for HttpSunsetLookup {
    fn name(&self) -> &str {
        "sunrise-sunset.org"
    }

    async fn sunset_hour(&self, record: &Record) -> Result<u32> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", format!("{:.6}", record.latitude)),
                ("lng", format!("{:.6}", record.longitude)),
                ("date", record.date.clone()),
            ])
            .send()
            .await
            .map_err(LookupError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::InvalidStatus(status.as_u16()).into());
        }

        let body: ApiResponse = response.json().await.map_err(LookupError::from)?;
        if body.status != "OK" {
            return Err(LookupError::ApiStatus(body.status).into());
        }

        let sunset = body
            .results
            .get("sunset")
            .and_then(Value::as_str)
            .ok_or(LookupError::MissingField("results.sunset"))?;
        let hour = parse_sunset_hour(sunset)?;

        debug!("Sunset for {record} is {sunset} (hour {hour})");
        Ok(hour)
    }
}

/// Parses a 12-hour clock time such as `7:14:32 PM` into an hour 0-23.
///
/// The value is taken as-is; no timezone adjustment is applied. The hour may
/// have one or two digits, minutes and seconds must have exactly two.
pub fn parse_sunset_hour(value: &str) -> std::result::Result<u32, LookupError> {
    let trimmed = value.trim();
    let time = NaiveTime::parse_from_str(trimmed, SUNSET_TIME_FORMAT).map_err(|source| {
        LookupError::InvalidTime {
            value: value.to_string(),
            source,
        }
    })?;
    if !has_padded_minutes_and_seconds(trimmed) {
        return Err(LookupError::TimeLayout(value.to_string()));
    }
    Ok(time.hour())
}

// chrono's %M and %S also accept a single digit
fn has_padded_minutes_and_seconds(value: &str) -> bool {
    let clock = value.split_whitespace().next().unwrap_or_default();
    let fields: Vec<&str> = clock.split(':').collect();
    matches!(fields.as_slice(), [_, minutes, seconds] if minutes.len() == 2 && seconds.len() == 2)
}
