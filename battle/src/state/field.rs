//! Global field state

use std::collections::BTreeSet;

use deduce_protocol::to_id;
use serde::Serialize;

use crate::inference::ClassId;

/// Turns a move-started weather lasts without a rock
pub const WEATHER_TURNS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Rain,
    Sun,
    Sand,
    Hail,
}

impl Weather {
    /// Parse a `-weather` name ("RainDance", "SunnyDay", "Sandstorm", "Hail")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match to_id(s).as_str() {
            "raindance" | "rain" => Some(Weather::Rain),
            "sunnyday" | "sun" => Some(Weather::Sun),
            "sandstorm" | "sand" => Some(Weather::Sand),
            "hail" => Some(Weather::Hail),
            _ => None,
        }
    }

    /// Id used in dex rows
    pub fn as_id(&self) -> &'static str {
        match self {
            Weather::Rain => "raindance",
            Weather::Sun => "sunnyday",
            Weather::Sand => "sandstorm",
            Weather::Hail => "hail",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherState {
    pub weather: Weather,
    /// Started by an ability: lasts until replaced
    pub permanent: bool,
    /// Upkeeps seen since the weather started
    pub upkeeps: u32,
    /// Item held by the pokemon whose move started the weather
    pub source_item: Option<ClassId>,
}

/// Global field conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub weather: Option<WeatherState>,
    /// Trick Room, Gravity and other `-fieldstart` effects, by id
    pub conditions: BTreeSet<String>,
}

impl FieldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weather(&self) -> Option<Weather> {
        self.weather.as_ref().map(|w| w.weather)
    }

    pub fn start_weather(&mut self, weather: Weather, permanent: bool, source_item: Option<ClassId>) {
        self.weather = Some(WeatherState {
            weather,
            permanent,
            upkeeps: 0,
            source_item,
        });
    }

    pub fn clear_weather(&mut self) {
        self.weather = None;
    }

    pub fn start_condition(&mut self, condition: &str) {
        self.conditions.insert(field_id(condition));
    }

    pub fn end_condition(&mut self, condition: &str) {
        self.conditions.remove(&field_id(condition));
    }

    pub fn has_condition(&self, id: &str) -> bool {
        self.conditions.contains(id)
    }
}

fn field_id(condition: &str) -> String {
    to_id(condition.strip_prefix("move: ").unwrap_or(condition))
}
