// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod preferences;

pub use http::HttpPredictionService;
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, ScopedPreferences};
