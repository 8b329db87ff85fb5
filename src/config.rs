//! Application-level configuration constants.

// Remote model
pub const API_MODEL_TEXT: &str = "gemini-2.5-flash-preview-04-17";
pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// API key baked in at build time (`GEMINI_API_KEY=... trunk build`).
pub fn gemini_api_key() -> Option<&'static str> {
    option_env!("GEMINI_API_KEY").filter(|key| !key.trim().is_empty())
}

// UI Behavior
pub const DEBOUNCE_MS: u32 = 500;
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

// User-facing fallback messages
pub const MISSING_TRACK_MESSAGE: &str = "Selected track details could not be found.";
pub const DEFAULT_PRIMARY_ERROR: &str = "An unexpected error occurred.";
pub const DEFAULT_GUIDE_ERROR: &str = "An unexpected error occurred while fetching track guide.";

// Prompt shaping
pub const FREE_TEXT_MAX_CHARS: usize = 500;
