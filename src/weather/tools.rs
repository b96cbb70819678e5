use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

/// Per-request timeout for the geocode and weather sub-calls.
const TOOL_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The model is allowed to re-try after seeing this message.
    #[error("{0}")]
    Retryable(String),
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn execute(&self, params: Value) -> Result<Value, ToolError>;
}

/// Resolve a location description to coordinates.
///
/// Without an API key this runs in offline mode and returns deterministic
/// coordinates keyed by well-known city names.
pub struct GeocodeTool {
    pub http: reqwest::Client,
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl GeocodeTool {
    fn stub_coordinates(location: &str) -> (f64, f64) {
        let lower = location.to_lowercase();
        if lower.contains("bangkok") {
            (13.7563, 100.5018)
        } else if lower.contains("london") {
            (51.5074, -0.1278)
        } else if lower.contains("new york") {
            (40.7128, -74.0060)
        } else {
            (51.1, -0.1)
        }
    }
}

#[async_trait]
impl Tool for GeocodeTool {
    fn name(&self) -> &str {
        "get_lat_lng"
    }

    fn description(&self) -> &str {
        "Get the latitude and longitude of a location (city, address, etc)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_description": {
                    "type": "string",
                    "description": "A description of a location"
                }
            },
            "required": ["location_description"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let location = params["location_description"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing location_description"))?;

        let Some(api_key) = &self.api_key else {
            info!("Using offline geocode data for: {}", location);
            let (lat, lng) = Self::stub_coordinates(location);
            return Ok(json!({"lat": lat, "lng": lng}));
        };

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", location), ("api_key", api_key.as_str())])
            .timeout(TOOL_HTTP_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!("Geocode API call failed: {}", e);
                ToolError::Retryable(format!("Error getting location coordinates: {}", e))
            })?;

        let data: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Retryable(format!("Error getting location coordinates: {}", e)))?;

        match data.as_array().and_then(|results| results.first()) {
            Some(first) => {
                let lat = parse_coordinate(&first["lat"])?;
                let lng = parse_coordinate(&first["lon"])?;
                Ok(json!({"lat": lat, "lng": lng}))
            }
            None => Err(ToolError::Retryable(format!(
                "Could not find coordinates for location: {}",
                location
            ))),
        }
    }
}

/// The geocode API returns coordinates as JSON strings.
fn parse_coordinate(value: &Value) -> Result<f64, ToolError> {
    if let Some(n) = value.as_f64() {
        return Ok(n);
    }
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ToolError::Fatal(anyhow::anyhow!("malformed coordinate: {}", value)))
}

/// Fetch current conditions for a coordinate pair.
///
/// Without an API key this runs in offline mode, picking a reading by
/// latitude band.
pub struct RealtimeWeatherTool {
    pub http: reqwest::Client,
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl RealtimeWeatherTool {
    fn stub_reading(lat: f64) -> Value {
        let (temperature, description) = if lat > 40.0 {
            ("15 °C", "Partly Cloudy")
        } else if lat > 30.0 {
            ("21 °C", "Sunny")
        } else {
            ("32 °C", "Hot and Humid")
        };

        json!({
            "temperature": temperature,
            "description": description,
            "humidity": "50%",
            "windSpeed": "3 m/s",
        })
    }
}

#[async_trait]
impl Tool for RealtimeWeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather at a latitude/longitude."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "lat": {"type": "number", "description": "Latitude of the location"},
                "lng": {"type": "number", "description": "Longitude of the location"}
            },
            "required": ["lat", "lng"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let lat = params["lat"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("missing lat"))?;
        let lng = params["lng"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("missing lng"))?;

        let Some(api_key) = &self.api_key else {
            info!("Using offline weather data for coordinates: {}, {}", lat, lng);
            return Ok(Self::stub_reading(lat));
        };

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("apikey", api_key.as_str()),
                ("location", &format!("{},{}", lat, lng)),
                ("units", "metric"),
            ])
            .timeout(TOOL_HTTP_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!("Weather API call failed: {}", e);
                ToolError::Retryable(format!("Error getting weather data: {}", e))
            })?;

        let data: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Retryable(format!("Error getting weather data: {}", e)))?;

        let values = &data["data"]["values"];
        let apparent = values["temperatureApparent"]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("weather response missing temperatureApparent"))?;
        let code = values["weatherCode"].as_u64().unwrap_or(0);

        Ok(json!({
            "temperature": format!("{:.1}°C", apparent),
            "description": describe_weather_code(code),
            "humidity": format!("{}%", values["humidity"].as_f64().unwrap_or(0.0)),
            "windSpeed": format!("{} m/s", values["windSpeed"].as_f64().unwrap_or(0.0)),
            "weatherCode": code,
        }))
    }
}

/// Tomorrow.io weather-code lookup.
/// https://docs.tomorrow.io/reference/data-layers-weather-codes
pub fn describe_weather_code(code: u64) -> &'static str {
    match code {
        1000 => "Clear, Sunny",
        1100 => "Mostly Clear",
        1101 => "Partly Cloudy",
        1102 => "Mostly Cloudy",
        1001 => "Cloudy",
        2000 => "Fog",
        2100 => "Light Fog",
        4000 => "Drizzle",
        4001 => "Rain",
        4200 => "Light Rain",
        4201 => "Heavy Rain",
        5000 => "Snow",
        5001 => "Flurries",
        5100 => "Light Snow",
        5101 => "Heavy Snow",
        6000 => "Freezing Drizzle",
        6001 => "Freezing Rain",
        6200 => "Light Freezing Rain",
        6201 => "Heavy Freezing Rain",
        7000 => "Ice Pellets",
        7101 => "Heavy Ice Pellets",
        7102 => "Light Ice Pellets",
        8000 => "Thunderstorm",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_geocode() -> GeocodeTool {
        GeocodeTool {
            http: reqwest::Client::new(),
            api_key: None,
            endpoint: "http://unused.invalid".to_string(),
        }
    }

    fn offline_weather() -> RealtimeWeatherTool {
        RealtimeWeatherTool {
            http: reqwest::Client::new(),
            api_key: None,
            endpoint: "http://unused.invalid".to_string(),
        }
    }

    #[tokio::test]
    async fn offline_geocode_knows_some_cities() {
        let tool = offline_geocode();

        let bangkok = tool
            .execute(json!({"location_description": "Bangkok, Thailand"}))
            .await
            .unwrap();
        assert_eq!(bangkok["lat"], 13.7563);
        assert_eq!(bangkok["lng"], 100.5018);

        let somewhere = tool
            .execute(json!({"location_description": "Ulan Bator"}))
            .await
            .unwrap();
        assert_eq!(somewhere["lat"], 51.1);
        assert_eq!(somewhere["lng"], -0.1);
    }

    #[tokio::test]
    async fn offline_weather_varies_by_latitude_band() {
        let tool = offline_weather();

        let north = tool.execute(json!({"lat": 45.0, "lng": 0.0})).await.unwrap();
        assert_eq!(north["temperature"], "15 °C");
        assert_eq!(north["description"], "Partly Cloudy");

        let mid = tool.execute(json!({"lat": 35.0, "lng": 0.0})).await.unwrap();
        assert_eq!(mid["temperature"], "21 °C");
        assert_eq!(mid["description"], "Sunny");

        let tropical = tool.execute(json!({"lat": 10.0, "lng": 0.0})).await.unwrap();
        assert_eq!(tropical["temperature"], "32 °C");
        assert_eq!(tropical["description"], "Hot and Humid");
    }

    #[test]
    fn weather_codes_map_to_descriptions() {
        assert_eq!(describe_weather_code(1000), "Clear, Sunny");
        assert_eq!(describe_weather_code(8000), "Thunderstorm");
        assert_eq!(describe_weather_code(9999), "Unknown");
    }

    #[test]
    fn coordinates_parse_from_strings_and_numbers() {
        assert_eq!(parse_coordinate(&json!("51.5074")).unwrap(), 51.5074);
        assert_eq!(parse_coordinate(&json!(-0.1278)).unwrap(), -0.1278);
        assert!(parse_coordinate(&json!(null)).is_err());
    }

    #[tokio::test]
    async fn real_geocode_empty_result_is_retryable() {
        let addr = crate::llm::gateway::test_support::serve_once(
            crate::llm::gateway::test_support::http_response("200 OK", "[]"),
        )
        .await;

        let tool = GeocodeTool {
            http: reqwest::Client::new(),
            api_key: Some("key".to_string()),
            endpoint: format!("http://{}/search", addr),
        };

        let err = tool
            .execute(json!({"location_description": "Atlantis"}))
            .await
            .unwrap_err();
        match err {
            ToolError::Retryable(msg) => assert!(msg.contains("Atlantis")),
            other => panic!("expected retryable error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn real_weather_formats_apparent_temperature() {
        let body = r#"{"data":{"values":{"temperatureApparent":18.26,"weatherCode":1101,"humidity":61,"windSpeed":4.2}}}"#;
        let addr = crate::llm::gateway::test_support::serve_once(
            crate::llm::gateway::test_support::http_response("200 OK", body),
        )
        .await;

        let tool = RealtimeWeatherTool {
            http: reqwest::Client::new(),
            api_key: Some("key".to_string()),
            endpoint: format!("http://{}/realtime", addr),
        };

        let reading = tool.execute(json!({"lat": 51.5, "lng": -0.1})).await.unwrap();
        assert_eq!(reading["temperature"], "18.3°C");
        assert_eq!(reading["description"], "Partly Cloudy");
        assert_eq!(reading["weatherCode"], 1101);
    }
}
