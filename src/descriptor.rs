use crate::{params::Params, Error};
use serde::{Deserialize, Serialize};

/// What the transport receives for each fired request, serialized as JSON.
///
/// Missing `url`, `target` and `swap` attributes are omitted from the JSON rather than sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
	pub event_type: String,
	#[serde(rename = "elementID", default)]
	pub element_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub swap: Option<String>,
	#[serde(default)]
	pub params: Params,
}

impl RequestDescriptor {
	/// # Errors
	///
	/// Iff serialization fails, which can't happen for descriptors built from attributes.
	pub fn to_json(&self) -> Result<String, Error> {
		serde_json::to_string(self).map_err(Error::Serialize)
	}

	/// # Errors
	///
	/// Iff `json` isn't a valid descriptor.
	pub fn from_json(json: &str) -> Result<Self, Error> {
		serde_json::from_str(json).map_err(Error::InvalidDescriptor)
	}

	/// Returns the named parameter iff it is a string.
	#[must_use]
	pub fn param_str(&self, name: &str) -> Option<&str> {
		self.params.get(name).and_then(serde_json::Value::as_str)
	}
}
