//! The weather lookup transformer: city name in, localized summary out.

use std::sync::Arc;

use crate::{
    CityQuery, Config, LookupError, WeatherDetails, WeatherResult,
    model::UpstreamWeatherRecord,
    provider::{WeatherProvider, provider_from_config},
};

const MS_TO_KMH: f64 = 3.6;

/// Entry point shared by every route. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        Ok(Self::new(Arc::from(provider)))
    }

    /// Validate `city`, fetch its current weather and summarize it.
    ///
    /// Invalid input is rejected before any upstream call is made.
    pub async fn lookup(&self, city: Option<&str>) -> Result<WeatherResult, LookupError> {
        let query = CityQuery::parse(city)?;
        log::debug!("Looking up current weather for '{query}'");

        let record = self.provider.current(&query).await?;
        summarize(&record)
    }
}

/// Reshape a provider record into the outward-facing result.
pub fn summarize(record: &UpstreamWeatherRecord) -> Result<WeatherResult, LookupError> {
    let condition = record
        .weather
        .first()
        .ok_or_else(|| LookupError::Unexpected("weather list is empty".to_string()))?;

    let details = WeatherDetails {
        temperature: round_to_int(record.main.temp),
        feels_like: round_to_int(record.main.feels_like),
        humidity: record.main.humidity,
        wind_speed_kmh: round_to_tenth(record.wind.speed * MS_TO_KMH),
        description: title_case(&condition.description),
        icon: condition.icon.clone(),
    };

    let message = compose_message(&record.name, &record.sys.country, &details);

    Ok(WeatherResult {
        success: true,
        city: record.name.clone(),
        country: record.sys.country.clone(),
        message,
        details,
    })
}

pub fn compose_message(city: &str, country: &str, details: &WeatherDetails) -> String {
    format!(
        "{city} ({country})'da hava sıcaklığı {}°C (hissedilen {}°C), nem oranı %{}, \
         rüzgar hızı {:.1} km/h ve hava durumu: {}.",
        details.temperature,
        details.feels_like,
        details.humidity,
        details.wind_speed_kmh,
        details.description,
    )
}

/// Upper-case the first cased character of every word and lower-case the rest.
///
/// A word starts after any character that is neither upper- nor lower-case,
/// so `"parçalı az bulutlu"` becomes `"Parçalı Az Bulutlu"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;

    for ch in text.chars() {
        let cased = ch.is_uppercase() || ch.is_lowercase();
        if cased && !prev_cased {
            out.extend(ch.to_uppercase());
        } else if cased {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev_cased = cased;
    }

    out
}

/// Round half to even, matching how the temperatures have always been reported.
fn round_to_int(value: f64) -> i64 {
    value.round_ties_even() as i64
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}
