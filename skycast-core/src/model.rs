use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single weather observation for one location, as served by the
/// OpenWeather current-weather endpoint.
///
/// Field names follow the wire payload except where renamed for clarity
/// (`weather` → `conditions`, `main` → `measurements`). Temperatures are
/// Kelvin as delivered; conversion is a presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub coord: Coord,
    #[serde(rename = "weather")]
    pub conditions: Vec<Condition>,
    /// Origin of the measurement, e.g. "stations".
    pub base: String,
    #[serde(rename = "main")]
    pub measurements: Measurements,
    /// Visibility in meters.
    pub visibility: u32,
    pub wind: Wind,
    pub clouds: Clouds,
    /// Observation time as a unix timestamp.
    pub dt: i64,
    pub sys: Sys,
    /// OpenWeather location identifier.
    pub id: i64,
    /// Resolved location name; doubles as the cache key for the last lookup.
    pub name: String,
    /// Response code embedded in the payload.
    pub cod: i64,
}

impl WeatherSnapshot {
    pub fn observation_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }
}

/// Geographic coordinates of the observed location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

/// One observed weather condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    /// Condition group, e.g. "Drizzle".
    pub main: String,
    pub description: String,
    /// Icon code for the condition.
    pub icon: String,
}

/// Primary measurements of the observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Temperature in Kelvin.
    pub temp: f64,
    /// Atmospheric pressure in hPa.
    pub pressure: u32,
    /// Humidity percentage.
    pub humidity: u8,
    pub temp_min: f64,
    pub temp_max: f64,
}

/// Wind conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Wind speed in meters per second.
    pub speed: f64,
    /// Wind direction in degrees.
    pub deg: u16,
}

/// Cloud cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    /// Cloudiness percentage.
    pub all: u8,
}

/// Locale and system information attached to the observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    #[serde(rename = "type")]
    pub kind: Option<i64>,
    pub id: Option<i64>,
    /// ISO country code.
    pub country: String,
    /// Sunrise as a unix timestamp.
    pub sunrise: i64,
    /// Sunset as a unix timestamp.
    pub sunset: i64,
}

impl Sys {
    pub fn sunrise_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sunrise, 0)
    }

    pub fn sunset_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sunset, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON_PAYLOAD: &str = r#"{
        "coord": {"lon": -0.13, "lat": 51.51},
        "weather": [
            {"id": 300, "main": "Drizzle", "description": "light intensity drizzle", "icon": "09d"}
        ],
        "base": "stations",
        "main": {"temp": 280.32, "pressure": 1012, "humidity": 81, "temp_min": 279.15, "temp_max": 281.15},
        "visibility": 10000,
        "wind": {"speed": 4.1, "deg": 80},
        "clouds": {"all": 90},
        "dt": 1485789600,
        "sys": {"type": 1, "id": 5091, "country": "GB", "sunrise": 1485762037, "sunset": 1485794875},
        "id": 2643743,
        "name": "London",
        "cod": 200
    }"#;

    #[test]
    fn decodes_current_weather_payload() {
        let snapshot: WeatherSnapshot =
            serde_json::from_str(LONDON_PAYLOAD).expect("payload should decode");

        assert_eq!(snapshot.name, "London");
        assert_eq!(snapshot.cod, 200);
        assert_eq!(snapshot.conditions.len(), 1);
        assert_eq!(snapshot.conditions[0].main, "Drizzle");
        assert_eq!(snapshot.measurements.humidity, 81);
        assert_eq!(snapshot.sys.country, "GB");
        assert_eq!(snapshot.wind.deg, 80);
    }

    #[test]
    fn decodes_payload_without_sys_identifiers() {
        // Coordinate lookups over open water omit sys.type and sys.id.
        let payload = LONDON_PAYLOAD.replace(r#""type": 1, "id": 5091, "#, "");
        let snapshot: WeatherSnapshot =
            serde_json::from_str(&payload).expect("payload should decode");

        assert_eq!(snapshot.sys.kind, None);
        assert_eq!(snapshot.sys.id, None);
    }

    #[test]
    fn converts_unix_timestamps() {
        let snapshot: WeatherSnapshot =
            serde_json::from_str(LONDON_PAYLOAD).expect("payload should decode");

        let observed = snapshot.observation_time().expect("valid timestamp");
        assert_eq!(observed.timestamp(), 1485789600);
        assert!(snapshot.sys.sunrise_time().expect("valid sunrise") < observed);
        assert!(observed < snapshot.sys.sunset_time().expect("valid sunset"));
    }
}
