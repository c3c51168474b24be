use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use warp::http::StatusCode;
use warp::path::FullPath;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use weather_lookup::{InvalidCity, LookupError, WeatherResult, WeatherService};

const AVAILABLE_ENDPOINTS: &[&str] = &["/", "/weather", "/weather/<city>"];
const EXAMPLE_PATH: &str = "/weather?city=Istanbul";

pub async fn run(address: SocketAddr, service: WeatherService) {
    log::info!("Weather API listening on http://{address}");
    log::info!("Usage: http://{address}/weather?city=Istanbul");
    log::info!("Versioned: http://{address}/api/v1/weather/Istanbul");

    warp::serve(routes(service)).run(address).await
}

/// Full filter tree: the API at the root, again under `/api/v1`, and the JSON
/// rejection handler.
pub fn routes(
    service: WeatherService,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let versioned = warp::path("api").and(warp::path("v1")).and(api(service.clone()));

    api(service).or(versioned).recover(rejection)
}

fn api(service: WeatherService) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let home_route = warp::path::end().and(warp::get()).map(home);

    let openapi_route = warp::path!("swagger.json").and(warp::get()).map(openapi);

    let city_param = warp::query::raw()
        .or(warp::any().map(String::new))
        .unify()
        .map(|raw: String| first_city(&raw));

    let query_route = warp::path!("weather")
        .and(no_trailing_slash())
        .and(warp::get())
        .and(city_param)
        .and(with_service(service.clone()))
        .then(weather_by_query);

    let path_route = warp::path!("weather" / String)
        .and(warp::get())
        .and(with_service(service))
        .then(weather_by_path);

    home_route.or(openapi_route).or(query_route).or(path_route)
}

/// `path!` accepts `/weather/` as `/weather`; an empty city segment is not a route.
fn no_trailing_slash() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::path::full()
        .and_then(|full: FullPath| async move {
            if full.as_str().ends_with('/') {
                Err(warp::reject::not_found())
            } else {
                Ok(())
            }
        })
        .untuple_one()
}

fn with_service(
    service: WeatherService,
) -> impl Filter<Extract = (WeatherService,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// First `city` value of a raw query string; later repeats are ignored.
fn first_city(raw_query: &str) -> Option<String> {
    raw_query
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| *key == "city")
        .map(|(_, value)| {
            let value = value.replace('+', " ");
            match urlencoding::decode(&value) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => String::new(),
            }
        })
}

fn home() -> impl Reply {
    warp::reply::json(&serde_json::json!({
        "message": "Hava Durumu API'sine hoş geldiniz!",
        "kullanim": {
            "endpoint": "/weather",
            "method": "GET",
            "parametre": "city (şehir ismi)",
            "ornek": EXAMPLE_PATH,
        },
        "endpoints": {
            "/weather?city=<city>": "GET - Hava durumu sorgulama",
            "/weather/<city>": "GET - Şehir adı path üzerinden",
            "/swagger.json": "GET - API dokümantasyonu (OpenAPI)",
            "/api/v1/...": "Aynı uç noktalar, sürümlü önek ile",
        },
    }))
}

/// Static OpenAPI description of the weather endpoints.
fn openapi() -> impl Reply {
    let error_schema = serde_json::json!({
        "type": "object",
        "properties": {
            "error": {"type": "string", "example": "Lütfen geçerli bir şehir ismi giriniz."},
        },
    });
    let responses = serde_json::json!({
        "200": {
            "description": "Güncel hava durumu",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/WeatherResponse"}}},
        },
        "400": {"description": "Geçersiz parametre", "content": {"application/json": {"schema": error_schema}}},
        "404": {"description": "Şehir bulunamadı", "content": {"application/json": {"schema": error_schema}}},
        "500": {"description": "Sunucu hatası", "content": {"application/json": {"schema": error_schema}}},
        "503": {"description": "Bağlantı sorunu", "content": {"application/json": {"schema": error_schema}}},
        "504": {"description": "Servis yanıt vermiyor", "content": {"application/json": {"schema": error_schema}}},
    });

    warp::reply::json(&serde_json::json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Hava Durumu API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "OpenWeather verileriyle şehirlerin güncel hava durumu.",
        },
        "paths": {
            "/weather": {
                "get": {
                    "summary": "Şehir için güncel hava durumu bilgilerini getir",
                    "parameters": [{
                        "name": "city", "in": "query", "required": true,
                        "schema": {"type": "string"}, "example": "Istanbul",
                    }],
                    "responses": responses,
                },
            },
            "/weather/{city}": {
                "get": {
                    "summary": "URL path'i ile şehir hava durumu",
                    "parameters": [{
                        "name": "city", "in": "path", "required": true,
                        "schema": {"type": "string"}, "example": "Ankara",
                    }],
                    "responses": responses,
                },
            },
        },
        "components": {
            "schemas": {
                "WeatherDetails": {
                    "type": "object",
                    "properties": {
                        "temperature": {"type": "integer", "example": 18},
                        "feels_like": {"type": "integer", "example": 17},
                        "humidity": {"type": "integer", "example": 63},
                        "wind_speed_kmh": {"type": "number", "example": 18.4},
                        "description": {"type": "string", "example": "Parçalı Bulutlu"},
                        "icon": {"type": "string", "example": "03d"},
                    },
                },
                "WeatherResponse": {
                    "type": "object",
                    "properties": {
                        "success": {"type": "boolean", "example": true},
                        "city": {"type": "string", "example": "İstanbul"},
                        "country": {"type": "string", "example": "TR"},
                        "message": {"type": "string"},
                        "details": {"$ref": "#/components/schemas/WeatherDetails"},
                    },
                },
            },
        },
    }))
}

async fn weather_by_query(city: Option<String>, service: WeatherService) -> Response {
    respond(service.lookup(city.as_deref()).await)
}

async fn weather_by_path(raw_city: String, service: WeatherService) -> Response {
    // Path segments arrive percent-encoded ("%C4%B0zmir").
    let result = match urlencoding::decode(&raw_city) {
        Ok(city) => service.lookup(Some(city.as_ref())).await,
        Err(_) => Err(LookupError::InvalidInput(InvalidCity::MissingCity)),
    };
    respond(result)
}

fn respond(result: Result<WeatherResult, LookupError>) -> Response {
    match result {
        Ok(weather) => warp::reply::json(&weather).into_response(),
        Err(err) => lookup_error(&err),
    }
}

#[derive(Serialize)]
struct ErrorMessage {
    error: String,
    #[serde(rename = "ornek", skip_serializing_if = "Option::is_none")]
    example: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_endpoints: Option<&'static [&'static str]>,
}

impl ErrorMessage {
    fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), example: None, available_endpoints: None }
    }

    fn into_response(self, code: StatusCode) -> Response {
        warp::reply::with_status(warp::reply::json(&self), code).into_response()
    }
}

fn lookup_error(err: &LookupError) -> Response {
    let code = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_client_error() {
        log::debug!("Lookup rejected ({code}): {err}");
    } else {
        log::warn!("Lookup failed ({code}): {err}");
    }

    let mut body = ErrorMessage::new(err.to_string());
    if matches!(err, LookupError::InvalidInput(InvalidCity::MissingCity)) {
        body.example = Some(EXAMPLE_PATH);
    }
    body.into_response(code)
}

pub async fn rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if err.is_not_found() {
        let body = ErrorMessage {
            available_endpoints: Some(AVAILABLE_ENDPOINTS),
            ..ErrorMessage::new("Endpoint bulunamadı.")
        };
        return Ok(body.into_response(StatusCode::NOT_FOUND));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(ErrorMessage::new("Bu metod desteklenmiyor.").into_response(StatusCode::METHOD_NOT_ALLOWED));
    }

    log::error!("Error: {:?}", err);

    Ok(ErrorMessage::new("Sunucu hatası oluştu.").into_response(StatusCode::INTERNAL_SERVER_ERROR))
}
