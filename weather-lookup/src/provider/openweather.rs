use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{CityQuery, Config, LookupError, UpstreamWeatherRecord};

use super::WeatherProvider;

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    url: String,
    lang: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("url", &self.url)
            .field("lang", &self.lang)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key: config.api_key.clone(),
            url: config.current_weather_url(),
            lang: config.lang.clone(),
            http,
        })
    }

    async fn fetch_current(&self, city: &CityQuery) -> Result<UpstreamWeatherRecord, LookupError> {
        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("q", city.name()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound { city: city.name().to_owned() });
        }
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("OpenWeather rejected the API key: {}", truncate_body(&body));
            return Err(LookupError::UpstreamAuth);
        }
        if status != StatusCode::OK {
            log::warn!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            );
            return Err(LookupError::Upstream { status: status.as_u16() });
        }

        let parsed: UpstreamWeatherRecord = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &CityQuery) -> Result<UpstreamWeatherRecord, LookupError> {
        self.fetch_current(city).await.inspect_err(|err| {
            log::debug!("OpenWeather lookup for '{city}' failed: {err}");
        })
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, net::SocketAddr, time::Duration};
    use warp::{Filter, http::StatusCode as WarpStatus};

    const ISTANBUL_BODY: &str = r#"{
        "weather": [{"description": "parçalı bulutlu", "icon": "03d"}],
        "main": {"temp": 18.4, "feels_like": 17.2, "humidity": 63},
        "wind": {"speed": 5.1},
        "name": "İstanbul",
        "sys": {"country": "TR"}
    }"#;

    /// Serve a fake `/data/2.5/weather` that answers with a fixed status and body.
    fn spawn_upstream(status: u16, body: &'static str) -> SocketAddr {
        let route = warp::path!("data" / "2.5" / "weather").map(move || {
            let status = WarpStatus::from_u16(status).expect("valid status");
            warp::reply::with_status(body, status)
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn provider_for(addr: SocketAddr, timeout_secs: u64) -> OpenWeatherProvider {
        let mut cfg = Config::with_api_key("TEST_KEY");
        cfg.base_url = format!("http://{addr}");
        cfg.timeout_secs = timeout_secs;
        OpenWeatherProvider::from_config(&cfg).expect("provider should build")
    }

    fn city(name: &str) -> CityQuery {
        CityQuery::parse(Some(name)).expect("valid city")
    }

    #[tokio::test]
    async fn decodes_successful_response() {
        let addr = spawn_upstream(200, ISTANBUL_BODY);
        let record = provider_for(addr, 5).current(&city("Istanbul")).await.expect("ok");

        assert_eq!(record.name, "İstanbul");
        assert_eq!(record.main.temp, 18.4);
        assert_eq!(record.wind.speed, 5.1);
    }

    #[tokio::test]
    async fn sends_city_credential_units_and_language() {
        let route = warp::path!("data" / "2.5" / "weather")
            .and(warp::query::<HashMap<String, String>>())
            .map(|params: HashMap<String, String>| {
                let ok = params.get("q").map(String::as_str) == Some("Ankara")
                    && params.get("appid").map(String::as_str) == Some("TEST_KEY")
                    && params.get("units").map(String::as_str) == Some("metric")
                    && params.get("lang").map(String::as_str) == Some("tr");
                let status = if ok { WarpStatus::OK } else { WarpStatus::BAD_REQUEST };
                warp::reply::with_status(ISTANBUL_BODY, status)
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let result = provider_for(addr, 5).current(&city("  Ankara ")).await;
        assert!(result.is_ok(), "unexpected params, got {result:?}");
    }

    #[tokio::test]
    async fn not_found_names_the_city() {
        let addr = spawn_upstream(404, r#"{"cod":"404","message":"city not found"}"#);
        let err = provider_for(addr, 5).current(&city("Atlantis")).await.unwrap_err();

        assert_eq!(err.status_code(), 404);
        assert!(err.to_string().contains("Atlantis"));
    }

    #[tokio::test]
    async fn unauthorized_is_a_server_error() {
        let addr = spawn_upstream(401, r#"{"cod":401,"message":"Invalid API key"}"#);
        let err = provider_for(addr, 5).current(&city("Izmir")).await.unwrap_err();

        assert!(matches!(err, LookupError::UpstreamAuth));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn other_statuses_are_reported() {
        let addr = spawn_upstream(429, "slow down");
        let err = provider_for(addr, 5).current(&city("Bursa")).await.unwrap_err();

        assert!(matches!(err, LookupError::Upstream { status: 429 }));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn malformed_body_is_unexpected() {
        let addr = spawn_upstream(200, r#"{"name": "Konya"}"#);
        let err = provider_for(addr, 5).current(&city("Konya")).await.unwrap_err();

        assert!(matches!(err, LookupError::Unexpected(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let route = warp::path!("data" / "2.5" / "weather").then(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ISTANBUL_BODY
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let err = provider_for(addr, 1).current(&city("Trabzon")).await.unwrap_err();
        assert!(matches!(err, LookupError::Timeout), "got {err:?}");
        assert_eq!(err.status_code(), 504);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_connectivity_failure() {
        // Bind then drop so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let err = provider_for(addr, 5).current(&city("Antalya")).await.unwrap_err();
        assert!(matches!(err, LookupError::Connectivity), "got {err:?}");
        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "ş".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 200);
        assert_eq!(truncate_body("short"), "short");
    }
}
