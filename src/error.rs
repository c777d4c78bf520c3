use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while binding, dispatching or patching.
///
/// Most of these are logged and swallowed at the JavaScript boundary rather than thrown,
/// so they are mainly visible through [`tracing`] output and the host-independent APIs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// `window` or `document` is missing, for example outside a browser.
	#[error("DOM is not available")]
	DomUnavailable,

	#[error("Target element not found: {0}")]
	TargetNotFound(String),

	#[error("Unknown swap method: {0}")]
	UnknownSwapMethod(String),

	/// The named global transport function doesn't exist or isn't callable.
	#[error("{0} function is not available.")]
	TransportUnavailable(String),

	#[error("Invalid JSON in params: {0}")]
	InvalidParams(#[source] serde_json::Error),

	#[error("Params must be a JSON object")]
	ParamsNotAnObject,

	#[error("Could not serialize request descriptor: {0}")]
	Serialize(#[source] serde_json::Error),

	#[error("Invalid request descriptor: {0}")]
	InvalidDescriptor(#[source] serde_json::Error),

	#[error("Invalid options: {0}")]
	InvalidOptions(#[source] serde_json::Error),

	#[error("No handler found for event: {event_type}, element: {element_id}")]
	NoHandler { event_type: String, element_id: String },

	/// A routed handler failed.
	#[error("Handler failed: {0}")]
	Handler(String),

	/// Wraps a JavaScript exception.
	#[error("JavaScript error: {0}")]
	Js(String),
}

impl From<JsValue> for Error {
	fn from(value: JsValue) -> Self {
		value.as_string().map_or_else(|| Self::Js(format!("{:?}", value)), Self::Js)
	}
}

impl From<Error> for JsValue {
	fn from(error: Error) -> Self {
		Self::from(error.to_string())
	}
}
