//! Serving requests in Rust instead of a global JavaScript function.
//!
//! ```
//! use trigger_dom::{router::EventRouter, RequestDescriptor};
//!
//! let mut router = EventRouter::new();
//! router.on("submit", "todo-form", |request: &RequestDescriptor| {
//! 	assert_eq!(request.param_str("title"), Some("Buy milk"));
//! 	Ok(())
//! });
//!
//! router
//! 	.publish_json(r#"{"eventType":"submit","elementID":"todo-form","params":{"title":"Buy milk"}}"#)
//! 	.unwrap();
//! ```

use crate::{descriptor::RequestDescriptor, web::Transport, Error};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use tracing::{instrument, trace};
use web_sys::AbortSignal;

type Handler = Box<dyn Fn(&RequestDescriptor) -> Result<(), Error>>;

/// Routes requests to handlers by event type and element id.
///
/// Use it as the [`Transport`] of a [`Runtime`](`crate::Runtime`) to handle requests in Rust.
/// Handlers usually finish by calling [`Runtime::update_dom`](`crate::Runtime::update_dom`) or the global patch entry point.
#[derive(Default)]
pub struct EventRouter {
	handlers: HashMap<String, HashMap<String, Handler>>,
}

impl EventRouter {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for `event_type` on the element with id `element_id`, replacing any previous one.
	pub fn on(
		&mut self,
		event_type: impl Into<String>,
		element_id: impl Into<String>,
		handler: impl 'static + Fn(&RequestDescriptor) -> Result<(), Error>,
	) -> &mut Self {
		self.handlers.entry(event_type.into()).or_default().insert(element_id.into(), Box::new(handler));
		self
	}

	/// Removes the handler for `event_type` on `element_id`. Returns whether there was one.
	pub fn off(&mut self, event_type: &str, element_id: &str) -> bool {
		self.handlers.get_mut(event_type).and_then(|handlers| handlers.remove(element_id)).is_some()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.handlers.values().map(HashMap::len).sum()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Calls the handler registered for the descriptor's event type and element id.
	///
	/// # Errors
	///
	/// [`Error::NoHandler`] iff there is no matching handler, otherwise whatever the handler returns.
	#[instrument(skip(self, request), fields(event_type = %request.event_type, element_id = %request.element_id))]
	pub fn publish(&self, request: &RequestDescriptor) -> Result<(), Error> {
		let handler = self
			.handlers
			.get(&request.event_type)
			.and_then(|handlers| handlers.get(&request.element_id))
			.ok_or_else(|| Error::NoHandler {
				event_type: request.event_type.clone(),
				element_id: request.element_id.clone(),
			})?;
		trace!("Calling handler.");
		handler(request)
	}

	/// Decodes a serialized descriptor and [`publish`](`EventRouter::publish`)es it.
	///
	/// # Errors
	///
	/// [`Error::InvalidDescriptor`] iff `payload` doesn't decode, otherwise as [`publish`](`EventRouter::publish`).
	pub fn publish_json(&self, payload: &str) -> Result<(), Error> {
		self.publish(&RequestDescriptor::from_json(payload)?)
	}
}

impl Transport for EventRouter {
	fn send(&self, payload: &str, _signal: &AbortSignal) -> Result<(), Error> {
		self.publish_json(payload)
	}
}

impl Debug for EventRouter {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let mut routes = f.debug_map();
		for (event_type, handlers) in &self.handlers {
			routes.entry(event_type, &handlers.keys().collect::<Vec<_>>());
		}
		routes.finish()
	}
}
