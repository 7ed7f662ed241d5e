//! Client for the hosted Gemini streaming generation API.
mod core;
pub use self::core::{DEFAULT_API_HOSTNAME, DEFAULT_MODEL, EndpointError, stream_generate};
