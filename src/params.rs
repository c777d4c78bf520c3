use crate::Error;
use serde_json::{Map, Value};

/// Request parameters as sent to the transport.
pub type Params = Map<String, Value>;

/// Parses a JSON parameter declaration, which must be an object.
///
/// # Errors
///
/// [`Error::InvalidParams`] for malformed JSON, [`Error::ParamsNotAnObject`] for any other JSON value.
pub fn parse(raw: &str) -> Result<Params, Error> {
	match serde_json::from_str(raw).map_err(Error::InvalidParams)? {
		Value::Object(params) => Ok(params),
		_ => Err(Error::ParamsNotAnObject),
	}
}

/// Merges form fields into `params` as strings.
///
/// Form values overwrite declared parameters of the same name, and later entries overwrite earlier ones.
pub fn merge_form(params: &mut Params, entries: impl IntoIterator<Item = (String, String)>) {
	for (name, value) in entries {
		params.insert(name, Value::String(value));
	}
}
