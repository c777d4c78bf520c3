use crate::Error;
use serde::Deserialize;

/// Which elements a patch re-enables and whose indicators it hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetScope {
	/// Every element in the document carrying a disable flag or an indicator, whether it issued a request or not.
	Document,
	/// Only elements this runtime disabled and indicators it revealed since the last patch.
	InFlight,
}

impl Default for ResetScope {
	fn default() -> Self {
		Self::Document
	}
}

/// Runtime configuration.
///
/// Deserializes from camelCase JSON with every field optional, for example
/// `{"attributePrefix": "hx-", "resetScope": "inFlight"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
	/// Prepended to each attribute name, so `trigger` is read from `data-trigger` by default.
	pub attribute_prefix: String,
	/// Name of the global function requests are handed to, unless a Rust transport is set.
	pub transport: String,
	/// Name of the global function the transport calls with responses. [`None`] keeps it private.
	pub patch_entry: Option<String>,
	/// Class removed from an indicator while its request is running.
	pub hidden_class: String,
	pub reset_scope: ResetScope,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			attribute_prefix: "data-".to_owned(),
			transport: "handleEvent".to_owned(),
			patch_entry: Some("updateDOM".to_owned()),
			hidden_class: "hidden".to_owned(),
			reset_scope: ResetScope::default(),
		}
	}
}

impl Options {
	/// # Errors
	///
	/// Iff `json` isn't a valid (partial) options object.
	pub fn from_json(json: &str) -> Result<Self, Error> {
		serde_json::from_str(json).map_err(Error::InvalidOptions)
	}

	/// The full attribute name for `name`, for example `data-trigger`.
	#[must_use]
	pub fn attribute(&self, name: &str) -> String {
		format!("{}{}", self.attribute_prefix, name)
	}

	/// A selector matching every element that has the attribute `name`.
	#[must_use]
	pub fn presence_selector(&self, name: &str) -> String {
		format!("[{}]", self.attribute(name))
	}
}
