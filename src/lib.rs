//! Race engineer: pick a track, weather and race length, then ask a
//! generative-language model for a car setup, a race strategy and a track
//! guide.
//!
//! The library half holds everything that is not tied to the DOM so it can be
//! exercised natively; `main.rs` wires it into a Yew application.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod catalog;
pub mod config;
pub mod gateway;
pub mod gemini;
pub mod logging;
pub mod orchestrator;
pub mod selection;
pub mod slot;
pub mod utils;
pub mod view;

/// Which primary payload the user is asking for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    #[default]
    #[serde(rename = "Car Setup")]
    Setup,
    #[serde(rename = "Race Strategy")]
    Strategy,
}

impl QueryKind {
    pub const ALL: [QueryKind; 2] = [QueryKind::Setup, QueryKind::Strategy];

    /// Identifier used by the select input and the prompts.
    pub fn id(self) -> &'static str {
        match self {
            QueryKind::Setup => "Car Setup",
            QueryKind::Strategy => "Race Strategy",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A setup value as returned by the model: usually a number, sometimes a
/// string such as `"50 / 50"` or `"-3.50°"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetupValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for SetupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupValue::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            SetupValue::Number(n) => write!(f, "{}", n),
            SetupValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aerodynamics {
    pub front_wing: SetupValue,
    pub rear_wing: SetupValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transmission {
    pub differential_adjustment_on_throttle: SetupValue,
    pub differential_adjustment_off_throttle: SetupValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionGeometry {
    pub front_camber: SetupValue,
    pub rear_camber: SetupValue,
    pub front_toe: SetupValue,
    pub rear_toe: SetupValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suspension {
    pub front_suspension: SetupValue,
    pub rear_suspension: SetupValue,
    pub front_anti_roll_bar: SetupValue,
    pub rear_anti_roll_bar: SetupValue,
    pub front_ride_height: SetupValue,
    pub rear_ride_height: SetupValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brakes {
    pub brake_pressure: SetupValue,
    pub front_brake_bias: SetupValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tyres {
    pub front_right_tyre_pressure: SetupValue,
    pub front_left_tyre_pressure: SetupValue,
    pub rear_right_tyre_pressure: SetupValue,
    pub rear_left_tyre_pressure: SetupValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarSetup {
    pub track: String,
    pub condition: String,
    pub setup_name: String,
    pub aerodynamics: Aerodynamics,
    pub transmission: Transmission,
    pub suspension_geometry: SuspensionGeometry,
    pub suspension: Suspension,
    pub brakes: Brakes,
    pub tyres: Tyres,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyStint {
    pub tyre: String,
    pub laps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit_window: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceStrategy {
    pub track: String,
    pub race_length: String,
    pub weather: String,
    pub strategy_name: String,
    pub stints: Vec<StrategyStint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackGuide {
    pub track: String,
    pub track_guide: String,
}

/// Explicit rejection reported by the remote service (quota, refusal, bad
/// input). Not a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Either the payload that was asked for or an explicit remote rejection.
///
/// Untagged so that `{"error": "..."}` and the payload object both decode
/// from the model's JSON without a discriminator field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Rejected(ApiError),
    Data(T),
}

impl<T> Reply<T> {
    pub fn rejected(message: impl Into<String>) -> Self {
        Reply::Rejected(ApiError {
            error: message.into(),
        })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Rejected(err) => Reply::Rejected(err),
            Reply::Data(data) => Reply::Data(f(data)),
        }
    }
}

/// Primary payload held by the primary slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryData {
    Setup(CarSetup),
    Strategy(RaceStrategy),
}

impl PrimaryData {
    pub fn kind(&self) -> QueryKind {
        match self {
            PrimaryData::Setup(_) => QueryKind::Setup,
            PrimaryData::Strategy(_) => QueryKind::Strategy,
        }
    }
}
