//! Browser implementations of the host capabilities.

use crate::{config::TriggerSource, dispatch::Confirm, timers::Scheduler, Error};
use core::fmt::{self, Debug, Formatter};
use js_sys::{Array, Function, Reflect};
use std::convert::TryFrom;
use tracing::{error, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{AbortSignal, Element, FormData, HtmlFormElement, Window};

/// Hands serialized request descriptors to whatever performs the actual exchange.
///
/// The transport is expected to eventually report the response through
/// [`Runtime::update_dom`](`crate::Runtime::update_dom`) (or the global patch entry point),
/// and should abandon the request once `signal` is aborted.
pub trait Transport {
	/// # Errors
	///
	/// Iff the request couldn't be handed off. Failures are logged by the caller, requests are never retried.
	fn send(&self, payload: &str, signal: &AbortSignal) -> Result<(), Error>;
}

/// Calls a global JavaScript function as `name(payload, signal)`.
///
/// The function is looked up on each request, so it may be defined after the runtime is installed.
#[derive(Debug, Clone)]
pub struct WindowTransport {
	window: Window,
	name: String,
}

impl WindowTransport {
	#[must_use]
	pub fn new(window: Window, name: impl Into<String>) -> Self {
		Self { window, name: name.into() }
	}
}

impl Transport for WindowTransport {
	fn send(&self, payload: &str, signal: &AbortSignal) -> Result<(), Error> {
		let function = Reflect::get(&self.window, &JsValue::from_str(&self.name))?
			.dyn_into::<Function>()
			.map_err(|_| Error::TransportUnavailable(self.name.clone()))?;
		function.call2(&self.window, &JsValue::from_str(payload), signal)?;
		Ok(())
	}
}

/// `setTimeout`/`setInterval` on a [`Window`].
#[derive(Debug, Clone)]
pub struct WebScheduler {
	window: Window,
}

/// A cancellable browser timer. Keeps its callback alive until cancelled or dropped.
pub struct WebTimer {
	id: i32,
	repeating: bool,
	_callback: Closure<dyn FnMut()>,
}

impl Debug for WebTimer {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebTimer").field("id", &self.id).field("repeating", &self.repeating).finish()
	}
}

impl WebScheduler {
	/// # Errors
	///
	/// Iff there is no `window`.
	pub fn new() -> Result<Self, Error> {
		Ok(Self::for_window(web_sys::window().ok_or(Error::DomUnavailable)?))
	}

	#[must_use]
	pub fn for_window(window: Window) -> Self {
		Self { window }
	}
}

fn millis(value: u32) -> i32 {
	i32::try_from(value).unwrap_or(i32::MAX)
}

impl Scheduler for WebScheduler {
	type Handle = WebTimer;

	fn defer(&self, delay: u32, task: Box<dyn FnOnce()>) -> Result<(), Error> {
		let callback = Closure::once_into_js(move || task());
		self.window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis(delay))?;
		Ok(())
	}

	fn timeout(&self, delay: u32, task: Box<dyn FnOnce()>) -> Result<Self::Handle, Error> {
		let mut task = Some(task);
		let callback = Closure::wrap(Box::new(move || {
			if let Some(task) = task.take() {
				task()
			}
		}) as Box<dyn FnMut()>);
		let id = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), millis(delay))?;
		Ok(WebTimer {
			id,
			repeating: false,
			_callback: callback,
		})
	}

	fn interval(&self, period: u32, task: Box<dyn FnMut()>) -> Result<Self::Handle, Error> {
		let callback = Closure::wrap(task);
		let id = self.window.set_interval_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), millis(period))?;
		Ok(WebTimer {
			id,
			repeating: true,
			_callback: callback,
		})
	}

	fn cancel(&self, handle: Self::Handle) {
		trace!("Clearing timer {}.", handle.id);
		if handle.repeating {
			self.window.clear_interval_with_handle(handle.id);
		} else {
			self.window.clear_timeout_with_handle(handle.id);
		}
	}
}

/// Blocking `window.confirm(message)`. Declines if the dialog can't be shown.
#[derive(Debug, Clone)]
pub struct WindowConfirm {
	window: Window,
}

impl WindowConfirm {
	#[must_use]
	pub fn new(window: Window) -> Self {
		Self { window }
	}
}

impl Confirm for WindowConfirm {
	fn confirm(&self, message: &str) -> bool {
		self.window.confirm_with_message(message).unwrap_or_else(|error| {
			error!("Confirmation dialog failed: {:?}", error);
			false
		})
	}
}

/// Reads a trigger declaration from the prefixed attributes of a [`web_sys::Element`].
#[derive(Debug)]
pub struct ElementSource<'a> {
	element: &'a Element,
	prefix: &'a str,
}

impl<'a> ElementSource<'a> {
	#[must_use]
	pub fn new(element: &'a Element, prefix: &'a str) -> Self {
		Self { element, prefix }
	}
}

impl TriggerSource for ElementSource<'_> {
	fn attribute(&self, name: &str) -> Option<String> {
		self.element.get_attribute(&format!("{}{}", self.prefix, name))
	}

	fn element_id(&self) -> String {
		self.element.id()
	}

	fn form_entries(&self) -> Option<Vec<(String, String)>> {
		let form = self.element.dyn_ref::<HtmlFormElement>()?;
		let form_data = match FormData::new_with_form(form) {
			Ok(form_data) => form_data,
			Err(error) => {
				error!("Could not read form data: {:?}", error);
				return Some(Vec::new());
			}
		};

		let entries = match js_sys::try_iter(&form_data) {
			Ok(Some(entries)) => entries,
			Ok(None) | Err(_) => {
				error!("Form data is not iterable.");
				return Some(Vec::new());
			}
		};

		let mut fields = Vec::new();
		for entry in entries {
			let entry = match entry {
				Ok(entry) => Array::from(&entry),
				Err(error) => {
					error!("Failed to iterate form data: {:?}", error);
					break;
				}
			};
			match (entry.get(0).as_string(), entry.get(1).as_string()) {
				(Some(name), Some(value)) => fields.push((name, value)),
				(name, _) => warn!("Skipping non-text form field {:?}.", name),
			}
		}
		Some(fields)
	}
}
