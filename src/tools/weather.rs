//! Weather tool.
//!
//! Uses OpenWeatherMap when a key is configured, otherwise the keyless wttr.in
//! one-line format. API documentation: <https://openweathermap.org/current>

use async_trait::async_trait;
use serde::Deserialize;

use super::{param_or, Tool};
use crate::config::{Config, ProviderConfig};
use crate::error::ChatError;
use crate::models::Params;
use crate::utils::HttpClient;

pub const DEFAULT_LOCATION: &str = "New York";

const FOLLOW_UP: &str = "Is there anything else you'd like to know about the weather?";

#[derive(Debug, Clone)]
pub struct WeatherTool {
    client: HttpClient,
    api_key: Option<String>,
    providers: ProviderConfig,
}

impl WeatherTool {
    pub fn new(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            api_key: config.api_keys.weather_key().map(str::to_string),
            providers: config.providers.clone(),
        }
    }

    async fn fetch(&self, location: &str) -> Result<String, ChatError> {
        match &self.api_key {
            Some(key) => self.fetch_openweathermap(location, key).await,
            None => self.fetch_wttr(location).await,
        }
    }

    async fn fetch_openweathermap(&self, location: &str, key: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .client()
            .get(&self.providers.openweathermap_url)
            .query(&[("q", location), ("appid", key), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                "OpenWeatherMap returned status {} for {}",
                response.status(),
                location
            );
            return Ok(format!(
                "Sorry, I couldn't get weather information for {}",
                location
            ));
        }

        let data: OwmResponse = response.json().await?;
        let description = data
            .weather
            .first()
            .map(|w| w.description.as_str())
            .unwrap_or("no description");

        Ok(format!(
            "🌤️ Weather in {}: {}°C, {}, Humidity: {}%",
            location, data.main.temp, description, data.main.humidity
        ))
    }

    async fn fetch_wttr(&self, location: &str) -> Result<String, ChatError> {
        let url = format!(
            "{}/{}",
            self.providers.wttr_url.trim_end_matches('/'),
            urlencoding::encode(location)
        );

        let response = self
            .client
            .client()
            .get(&url)
            .query(&[("format", "3")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(format!(
                "Sorry, I couldn't get weather information for {}. Try checking a weather app!",
                location
            ));
        }

        let text = response.text().await?;
        Ok(format!("🌤️ {}", text.trim()))
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn id(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get current weather for a location"
    }

    fn follow_up(&self) -> Option<&str> {
        Some(FOLLOW_UP)
    }

    async fn invoke(&self, params: &Params) -> Result<String, ChatError> {
        let location = param_or(params, "location", DEFAULT_LOCATION);

        match self.fetch(location).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::warn!("Weather lookup failed for {}: {}", location, e);
                Ok("Sorry, I'm having trouble getting weather data right now. Try asking me something else!".to_string())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    description: String,
}
