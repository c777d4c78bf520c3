//! Turns a triggered element into a [`RequestDescriptor`].
//!
//! Timing is applied separately through [`TimerManager`](`crate::timers::TimerManager`),
//! and firing the request is up to the host (see [`Runtime`](`crate::Runtime`) for the browser).

use crate::{
	config::{TriggerConfig, TriggerSource},
	descriptor::RequestDescriptor,
	params::{self, Params},
};
use tracing::{error, instrument, trace};

/// A user decision gate for `confirm` prompts.
pub trait Confirm {
	/// Returns `true` iff the user accepts `message`.
	fn confirm(&self, message: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
	fn confirm(&self, message: &str) -> bool {
		self(message)
	}
}

/// Runs the confirmation gate and assembles the request descriptor.
///
/// Returns [`None`] iff the user declined the confirmation prompt, in which case nothing else happens.
/// Malformed JSON params are logged and replaced with an empty set. Form fields override declared params.
#[instrument(skip(source, config, confirm))]
pub fn prepare(event_type: &str, source: &impl TriggerSource, config: &TriggerConfig, confirm: &dyn Confirm) -> Option<RequestDescriptor> {
	if let Some(message) = &config.confirm {
		if !confirm.confirm(message) {
			trace!("Confirmation declined.");
			return None;
		}
	}

	let mut params = match config.params.as_deref().map(params::parse) {
		None => Params::new(),
		Some(Ok(params)) => params,
		Some(Err(error)) => {
			error!("{}", error);
			Params::new()
		}
	};

	if let Some(entries) = source.form_entries() {
		trace!("Merging {} form entries.", entries.len());
		params::merge_form(&mut params, entries);
	}

	Some(RequestDescriptor {
		event_type: event_type.to_owned(),
		element_id: source.element_id(),
		url: config.url.clone(),
		target: config.target.clone(),
		swap: config.swap.clone(),
		params,
	})
}
