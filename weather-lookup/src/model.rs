use serde::{Deserialize, Serialize};

use crate::error::{InvalidCity, LookupError};

/// A city name that passed validation: trimmed and at least two characters long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery {
    name: String,
}

impl CityQuery {
    pub const MIN_LEN: usize = 2;

    pub fn parse(raw: Option<&str>) -> Result<Self, LookupError> {
        let name = raw.map(str::trim).unwrap_or_default();

        if name.is_empty() {
            return Err(LookupError::InvalidInput(InvalidCity::MissingCity));
        }
        if name.chars().count() < Self::MIN_LEN {
            return Err(LookupError::InvalidInput(InvalidCity::CityTooShort));
        }

        Ok(Self { name: name.to_owned() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for CityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// The subset of OpenWeather's current-weather body that the lookup reads.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamWeatherRecord {
    pub name: String,
    pub sys: OwSys,
    pub main: OwMain,
    pub weather: Vec<OwWeather>,
    pub wind: OwWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwSys {
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    /// Meters per second with `units=metric`.
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDetails {
    pub temperature: i64,
    pub feels_like: i64,
    pub humidity: u8,
    pub wind_speed_kmh: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub success: bool,
    pub city: String,
    pub country: String,
    pub message: String,
    pub details: WeatherDetails,
}
