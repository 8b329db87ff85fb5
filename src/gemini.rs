//! Gateway backed by the Google Generative Language `generateContent` REST
//! endpoint, called with the browser's `fetch`.
//!
//! Prompt text, request bodies and response decoding are plain functions so
//! they can be tested without a browser; only [`post_json`] touches web APIs.

use crate::config::{gemini_api_key, API_MODEL_TEXT, GEMINI_ENDPOINT};
use crate::gateway::{Gateway, GatewayError, GatewayResult, PrimaryRequest};
use crate::utils::{strip_json_fence, tidy_free_text};
use crate::{ApiError, CarSetup, PrimaryData, QueryKind, RaceStrategy, Reply, TrackGuide};
use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const SETUP_SHAPE: &str = r#"{
  "track": string, "condition": string, "setupName": string,
  "aerodynamics": { "frontWing": number, "rearWing": number },
  "transmission": { "differentialAdjustmentOnThrottle": number, "differentialAdjustmentOffThrottle": number },
  "suspensionGeometry": { "frontCamber": number, "rearCamber": number, "frontToe": number, "rearToe": number },
  "suspension": { "frontSuspension": number, "rearSuspension": number, "frontAntiRollBar": number,
                  "rearAntiRollBar": number, "frontRideHeight": number, "rearRideHeight": number },
  "brakes": { "brakePressure": number, "frontBrakeBias": number },
  "tyres": { "frontRightTyrePressure": number, "frontLeftTyrePressure": number,
             "rearRightTyrePressure": number, "rearLeftTyrePressure": number },
  "notes": string
}"#;

const STRATEGY_SHAPE: &str = r#"{
  "track": string, "raceLength": string, "weather": string, "strategyName": string,
  "stints": [ { "tyre": string, "laps": string, "pitWindow": string } ],
  "notes": string
}"#;

const GUIDE_SHAPE: &str = r#"{ "track": string, "trackGuide": string }"#;

const REFUSAL_RULE: &str =
    r#"If you cannot answer, respond with {"error": "<short reason>"} instead."#;

/// Prompt for a setup or strategy query.
pub fn build_primary_prompt(request: &PrimaryRequest) -> String {
    let notes = tidy_free_text(&request.free_text);
    let notes_line = if notes.is_empty() {
        String::from("The driver has no extra requests.")
    } else {
        format!("Extra requests from the driver: {}", notes)
    };

    match request.query_kind {
        QueryKind::Setup => format!(
            "You are an expert F1 24 race engineer. Produce a car setup for {track} in {weather} \
             conditions. {notes_line}\n\
             Use the \"track\" value \"{track}\" and \"condition\" value \"{weather}\" verbatim.\n\
             Respond with JSON only, matching this shape:\n{shape}\n{refusal}",
            track = request.track_id,
            weather = request.weather,
            notes_line = notes_line,
            shape = SETUP_SHAPE,
            refusal = REFUSAL_RULE,
        ),
        QueryKind::Strategy => format!(
            "You are an expert F1 24 strategist. Plan a race strategy for {track}, {length} race \
             distance, {weather} conditions. {notes_line}\n\
             Use the \"track\" value \"{track}\", \"raceLength\" value \"{length}\" and \
             \"weather\" value \"{weather}\" verbatim.\n\
             Respond with JSON only, matching this shape:\n{shape}\n{refusal}",
            track = request.track_id,
            length = request.race_length,
            weather = request.weather,
            notes_line = notes_line,
            shape = STRATEGY_SHAPE,
            refusal = REFUSAL_RULE,
        ),
    }
}

/// Prompt for the descriptive track guide.
pub fn build_guide_prompt(track_id: &str) -> String {
    format!(
        "You are an expert F1 24 driving coach. Write a concise corner-by-corner guide to \
         {track}: braking points, gears, racing line, overtaking spots and common mistakes. \
         Plain prose, no Markdown.\n\
         Use the \"track\" value \"{track}\" verbatim.\n\
         Respond with JSON only, matching this shape:\n{shape}\n{refusal}",
        track = track_id,
        shape = GUIDE_SHAPE,
        refusal = REFUSAL_RULE,
    )
}

/// `generateContent` request body asking for a JSON answer.
pub fn generate_content_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseMimeType": "application/json" }
    })
}

/// Pull the answer text out of a successful `generateContent` response.
///
/// A prompt blocked by the service's safety filters is a remote rejection,
/// not a transport failure.
pub fn extract_candidate_text(response: &Value) -> Result<Reply<String>, GatewayError> {
    if let Some(reason) = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Ok(Reply::rejected(format!(
            "The request was blocked by the AI service ({})",
            reason
        )));
    }

    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| GatewayError::Malformed("no candidate content".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(GatewayError::Malformed("empty candidate text".to_string()));
    }
    Ok(Reply::Data(text))
}

/// Rejection for a non-2xx HTTP status (quota, invalid key, bad request).
pub fn rejection_from_status(status: u16, body: &Value) -> ApiError {
    let error = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("The AI service returned HTTP {}", status));
    ApiError { error }
}

/// Decode the model's JSON answer, tolerating a Markdown fence around it.
pub fn decode_reply<T: DeserializeOwned>(text: &str) -> GatewayResult<T> {
    serde_json::from_str(strip_json_fence(text)).map_err(|err| GatewayError::Malformed(err.to_string()))
}

pub fn decode_primary(kind: QueryKind, text: &str) -> GatewayResult<PrimaryData> {
    match kind {
        QueryKind::Setup => Ok(decode_reply::<CarSetup>(text)?.map(PrimaryData::Setup)),
        QueryKind::Strategy => Ok(decode_reply::<RaceStrategy>(text)?.map(PrimaryData::Strategy)),
    }
}

/// Gateway that talks to the Gemini API from the browser.
#[derive(Debug, Clone)]
pub struct GeminiGateway {
    api_key: Option<String>,
    model: String,
}

impl GeminiGateway {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
        }
    }

    /// Gateway using the build-time API key and the configured model.
    pub fn from_config() -> Self {
        if gemini_api_key().is_none() {
            warn!("GEMINI_API_KEY was not set at build time; remote queries will fail");
        }
        Self::new(gemini_api_key().map(str::to_string), API_MODEL_TEXT)
    }

    fn url(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            format!(
                "{}/{}:generateContent?key={}",
                GEMINI_ENDPOINT, self.model, key
            )
        })
    }

    async fn generate(&self, prompt: &str) -> GatewayResult<String> {
        let url = self.url().ok_or(GatewayError::NotConfigured)?;
        let body = generate_content_body(prompt).to_string();

        debug!("POST generateContent ({} prompt chars) to model {}", prompt.len(), self.model);
        let (status, json) = post_json(&url, &body).await?;
        if !(200..300).contains(&status) {
            let rejection = rejection_from_status(status, &json);
            warn!("AI service answered HTTP {}: {}", status, rejection.error);
            return Ok(Reply::Rejected(rejection));
        }
        extract_candidate_text(&json)
    }
}

impl Gateway for GeminiGateway {
    fn fetch_primary_data(&self, request: PrimaryRequest) -> LocalBoxFuture<'static, GatewayResult<PrimaryData>> {
        let gateway = self.clone();
        async move {
            let prompt = build_primary_prompt(&request);
            match gateway.generate(&prompt).await? {
                Reply::Rejected(err) => Ok(Reply::Rejected(err)),
                Reply::Data(text) => decode_primary(request.query_kind, &text),
            }
        }
        .boxed_local()
    }

    fn fetch_track_guide(&self, track_id: String) -> LocalBoxFuture<'static, GatewayResult<TrackGuide>> {
        let gateway = self.clone();
        async move {
            let prompt = build_guide_prompt(&track_id);
            match gateway.generate(&prompt).await? {
                Reply::Rejected(err) => Ok(Reply::Rejected(err)),
                Reply::Data(text) => decode_reply::<TrackGuide>(&text),
            }
        }
        .boxed_local()
    }
}

/// POST a JSON body and return the status plus the decoded JSON response.
async fn post_json(url: &str, body: &str) -> Result<(u16, Value), GatewayError> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &opts).map_err(transport_error)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(transport_error)?;

    let window = gloo_utils::window();
    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport_error)?;
    let response: Response = response_value
        .dyn_into()
        .map_err(|_| GatewayError::Malformed("fetch did not yield a Response".to_string()))?;

    let status = response.status();
    let json_promise = response
        .json()
        .map_err(|_| GatewayError::Malformed("response body already consumed".to_string()))?;
    let json = JsFuture::from(json_promise)
        .await
        .map_err(|_| GatewayError::Malformed(format!("HTTP {} body is not JSON", status)))?;
    let value = serde_wasm_bindgen::from_value::<Value>(json)
        .map_err(|err| GatewayError::Malformed(err.to_string()))?;

    Ok((status, value))
}

/// Message of a rejected JS promise (usually a `TypeError: Failed to fetch`).
fn transport_error(value: JsValue) -> GatewayError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_default();
    GatewayError::Transport(message)
}
