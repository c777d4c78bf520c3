use crate::{
	config::{parse_triggers, TriggerConfig},
	dispatch::{self, Confirm},
	options::{Options, ResetScope},
	timers::{Arm, Scheduler, TimerManager},
	web::{ElementSource, Transport, WebScheduler, WindowConfirm, WindowTransport},
	Error,
};
use core::{
	fmt::{self, Debug, Formatter},
	mem,
};
use js_sys::{Function, Object, Reflect, WeakSet};
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use web_sys::{AbortController, Document, Element, Event, Window};

/// Configures and installs a [`Runtime`].
///
/// Unless overridden, requests go to the global function named by [`Options::transport`],
/// confirmations use `window.confirm` and timers use `setTimeout`/`setInterval`.
pub struct RuntimeBuilder<S: Scheduler = WebScheduler> {
	options: Options,
	scheduler: S,
	confirm: Option<Rc<dyn Confirm>>,
	transport: Option<Rc<dyn Transport>>,
}

impl RuntimeBuilder<WebScheduler> {
	/// # Errors
	///
	/// Iff there is no `window`.
	pub fn new() -> Result<Self, Error> {
		Ok(Self {
			options: Options::default(),
			scheduler: WebScheduler::new()?,
			confirm: None,
			transport: None,
		})
	}
}

impl<S: Scheduler + Clone + 'static> RuntimeBuilder<S> {
	#[must_use]
	pub fn options(mut self, options: Options) -> Self {
		self.options = options;
		self
	}

	/// Replaces the timer source, for example with a [`ManualScheduler`](`crate::timers::ManualScheduler`).
	#[must_use]
	pub fn scheduler<T: Scheduler + Clone + 'static>(self, scheduler: T) -> RuntimeBuilder<T> {
		RuntimeBuilder {
			options: self.options,
			scheduler,
			confirm: self.confirm,
			transport: self.transport,
		}
	}

	#[must_use]
	pub fn confirm(mut self, confirm: impl 'static + Confirm) -> Self {
		self.confirm = Some(Rc::new(confirm));
		self
	}

	/// Sends requests to a Rust [`Transport`] instead of a global JavaScript function.
	#[must_use]
	pub fn transport(mut self, transport: impl 'static + Transport) -> Self {
		self.transport = Some(Rc::new(transport));
		self
	}

	/// Binds all current trigger elements, exposes the patch entry point (if configured)
	/// and then fires `load` for every element that declares it.
	///
	/// # Errors
	///
	/// Iff there is no `window` or `document`, or the patch entry point can't be assigned.
	#[instrument(skip(self))]
	pub fn install(self) -> Result<Runtime<S>, Error> {
		let Self {
			options,
			scheduler,
			confirm,
			transport,
		} = self;
		let window = web_sys::window().ok_or(Error::DomUnavailable)?;
		let document = window.document().ok_or(Error::DomUnavailable)?;
		let confirm = confirm.unwrap_or_else(|| Rc::new(WindowConfirm::new(window.clone())) as Rc<dyn Confirm>);
		let transport = transport.unwrap_or_else(|| Rc::new(WindowTransport::new(window.clone(), options.transport.clone())) as Rc<dyn Transport>);

		let inner = Rc::new_cyclic(|this: &Weak<Inner<S>>| {
			let listener = {
				let this = this.clone();
				Closure::wrap(Box::new(move |event: Event| {
					let span = trace_span!("listener", event_type = %event.type_());
					let _enter = span.enter();
					match this.upgrade() {
						Some(inner) => inner.handle_event(&event),
						None => warn!("Ignoring event: runtime was dropped."),
					}
				}) as Box<dyn Fn(Event)>)
				.into_js_value()
				.unchecked_into::<Function>()
			};

			let patch_entry = options.patch_entry.as_ref().map(|_| {
				let this = this.clone();
				Closure::wrap(Box::new(move |target: JsValue, content: JsValue, swap: JsValue, push_url: JsValue| match this.upgrade() {
					Some(inner) => inner.update_dom(
						&target.as_string().unwrap_or_default(),
						&content.as_string().unwrap_or_default(),
						&swap.as_string().unwrap_or_default(),
						push_url.as_string().as_deref(),
					),
					None => error!("Ignoring response: runtime was dropped."),
				}) as Box<dyn Fn(JsValue, JsValue, JsValue, JsValue)>)
				.into_js_value()
				.unchecked_into::<Function>()
			});

			Inner {
				this: this.clone(),
				window,
				document,
				timers: RefCell::new(TimerManager::new(scheduler.clone())),
				scheduler,
				confirm,
				transport,
				bound: WeakSet::new(),
				in_flight: RefCell::default(),
				listener,
				patch_entry,
				options,
			}
		});

		if let (Some(name), Some(entry)) = (&inner.options.patch_entry, &inner.patch_entry) {
			Reflect::set(&inner.window, &JsValue::from_str(name), entry)?;
		}

		inner.bind();
		inner.fire_load_triggers();
		Ok(Runtime(inner))
	}
}

impl<S: Scheduler> Debug for RuntimeBuilder<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RuntimeBuilder")
			.field("options", &self.options)
			.field("confirm", &self.confirm.is_some())
			.field("transport", &self.transport.is_some())
			.finish_non_exhaustive()
	}
}

/// Binds `trigger` declarations in the document to requests and applies the responses.
///
/// # Lifetime
///
/// Event listeners and the patch entry point call back into the runtime through weak references.
/// Once it is dropped they only log, and the patch entry point is removed from `window` if it is still the runtime's own.
/// Running intervals and pending debounce timers are cancelled on drop.
pub struct Runtime<S: Scheduler = WebScheduler>(Rc<Inner<S>>);

impl Runtime<WebScheduler> {
	/// # Errors
	///
	/// Iff there is no `window`.
	pub fn builder() -> Result<RuntimeBuilder, Error> {
		RuntimeBuilder::new()
	}
}

impl<S: Scheduler + Clone + 'static> Runtime<S> {
	/// Binds every trigger element not yet bound by this runtime. Already bound elements are skipped.
	pub fn bind(&self) {
		self.0.bind();
	}

	/// Dispatches `event_type` for `element` without a DOM event, as done for `load` at installation.
	pub fn fire_now(&self, element: &Element, event_type: &str) {
		self.0.dispatch(event_type, element, None);
	}

	/// Applies a response. This is what the patch entry point calls.
	///
	/// Failures are logged, never returned.
	pub fn update_dom(&self, target_selector: &str, content: &str, swap_method: &str, push_url: Option<&str>) {
		self.0.update_dom(target_selector, content, swap_method, push_url);
	}

	/// Stops polling for the element with id `element_id`. Returns whether an interval was running.
	pub fn cancel_interval(&self, element_id: &str) -> bool {
		self.0.timers.borrow_mut().cancel_interval(element_id)
	}

	/// Number of disabled elements and revealed indicators the next patch will reset.
	///
	/// Always `0` unless [`Options::reset_scope`] is [`ResetScope::InFlight`].
	#[must_use]
	pub fn in_flight_len(&self) -> usize {
		let in_flight = self.0.in_flight.borrow();
		in_flight.disabled.len() + in_flight.indicators.len()
	}

	#[must_use]
	pub fn options(&self) -> &Options {
		&self.0.options
	}
}

impl<S: Scheduler> Debug for Runtime<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Runtime").field(&self.0).finish()
	}
}

#[derive(Default)]
pub(crate) struct InFlight {
	pub disabled: Vec<Element>,
	pub indicators: Vec<Element>,
}

fn record(elements: &mut Vec<Element>, element: &Element) {
	if !elements.contains(element) {
		elements.push(element.clone());
	}
}

pub(crate) struct Inner<S: Scheduler> {
	this: Weak<Self>,
	pub window: Window,
	pub document: Document,
	pub options: Options,
	scheduler: S,
	timers: RefCell<TimerManager<S>>,
	confirm: Rc<dyn Confirm>,
	transport: Rc<dyn Transport>,
	bound: WeakSet,
	pub in_flight: RefCell<InFlight>,
	/// Never freed, so listeners that outlive the runtime still reach `this` and only log.
	listener: Function,
	patch_entry: Option<Function>,
}

impl<S: Scheduler + Clone + 'static> Inner<S> {
	pub fn query_all(&self, selector: &str) -> Vec<Element> {
		let list = match self.document.query_selector_all(selector) {
			Ok(list) => list,
			Err(error) => {
				error!("Invalid selector {:?}: {:?}", selector, error);
				return Vec::new();
			}
		};
		(0..list.length()).filter_map(|i| list.get(i)).filter_map(|node| node.dyn_into::<Element>().ok()).collect()
	}

	#[instrument(skip(self))]
	pub fn bind(&self) {
		let trigger_attribute = self.options.attribute("trigger");
		let mut newly_bound = 0_usize;
		for element in self.query_all(&self.options.presence_selector("trigger")) {
			let object: &Object = element.unchecked_ref();
			if self.bound.has(object) {
				continue;
			}

			let declaration = element.get_attribute(&trigger_attribute).unwrap_or_default();
			for trigger in parse_triggers(&declaration) {
				if let Err(error) = element.add_event_listener_with_callback(&trigger, &self.listener) {
					error!("Failed to add event listener {:?}: {:?}", trigger, error);
				}
			}
			self.bound.add(object);
			newly_bound += 1;
		}
		trace!("Bound {} new element(s).", newly_bound);
	}

	fn fire_load_triggers(&self) {
		for element in self.query_all(&self.options.presence_selector("trigger")) {
			let config = TriggerConfig::read(&ElementSource::new(&element, &self.options.attribute_prefix));
			if config.has_trigger("load") {
				self.dispatch("load", &element, None);
			}
		}
	}

	fn handle_event(&self, event: &Event) {
		match event.current_target().and_then(|target| target.dyn_into::<Element>().ok()) {
			Some(element) => self.dispatch(&event.type_(), &element, Some(event)),
			None => warn!("Event {:?} has no element as current target.", event.type_()),
		}
	}

	/// `event` is [`None`] iff this dispatch doesn't stem from a DOM event.
	#[instrument(skip(self, element, event))]
	fn dispatch(&self, event_type: &str, element: &Element, event: Option<&Event>) {
		let source = ElementSource::new(element, &self.options.attribute_prefix);
		let config = TriggerConfig::read(&source);

		if config.prevent_default {
			if let Some(event) = event {
				event.prevent_default();
			}
		}

		let descriptor = match dispatch::prepare(event_type, &source, &config, &*self.confirm) {
			Some(descriptor) => descriptor,
			None => return,
		};
		let payload = match descriptor.to_json() {
			Ok(payload) => payload,
			Err(error) => return error!("{}", error),
		};
		#[cfg(feature = "dangerous-logging")]
		trace!("Request payload: {}", payload);

		let task = self.request_task(element.clone(), &config, payload);
		let armed = self.timers.borrow_mut().schedule(&descriptor.element_id, config.policy(), Rc::clone(&task));
		match armed {
			Ok(Arm::Now) => task(),
			Ok(Arm::Later) => (),
			Err(error) => error!("Could not schedule request for element {:?}: {}", descriptor.element_id, error),
		}
	}

	fn request_task(&self, element: Element, config: &TriggerConfig, payload: String) -> Rc<dyn Fn()> {
		let this = self.this.clone();
		let disable = config.disable;
		let indicator = config.indicator.clone();
		let timeout = config.timeout;
		Rc::new(move || match this.upgrade() {
			Some(inner) => inner.send_request(&element, disable, indicator.as_deref(), timeout, &payload),
			None => warn!("Dropping request: runtime was dropped."),
		})
	}

	#[instrument(skip(self, element, payload))]
	fn send_request(&self, element: &Element, disable: bool, indicator: Option<&str>, timeout: u32, payload: &str) {
		let track = self.options.reset_scope == ResetScope::InFlight;
		if disable {
			set_disabled(element, true);
			if track {
				record(&mut self.in_flight.borrow_mut().disabled, element);
			}
		}

		if let Some(selector) = indicator {
			match self.document.query_selector(selector) {
				Ok(Some(indicator)) => {
					if let Err(error) = indicator.class_list().remove_1(&self.options.hidden_class) {
						error!("Could not reveal indicator {:?}: {:?}", selector, error);
					}
					if track {
						record(&mut self.in_flight.borrow_mut().indicators, &indicator);
					}
				}
				Ok(None) => warn!("Indicator not found: {}", selector),
				Err(error) => error!("Invalid indicator selector {:?}: {:?}", selector, error),
			}
		}

		let controller = match AbortController::new() {
			Ok(controller) => controller,
			Err(error) => return error!("Could not create AbortController: {:?}", error),
		};
		if timeout > 0 {
			let abort = controller.clone();
			if let Err(error) = self.scheduler.defer(timeout, Box::new(move || abort.abort())) {
				error!("Could not arm request timeout: {}", error);
			}
		}

		if let Err(error) = self.transport.send(payload, &controller.signal()) {
			error!("{}", error);
		}
	}

	/// Clears what the last patch or request left behind; see [`ResetScope`](`crate::ResetScope`).
	pub fn take_in_flight(&self) -> InFlight {
		mem::take(&mut *self.in_flight.borrow_mut())
	}
}

impl<S: Scheduler> Drop for Inner<S> {
	fn drop(&mut self) {
		if let (Some(name), Some(entry)) = (&self.options.patch_entry, &self.patch_entry) {
			let key = JsValue::from_str(name);
			let entry: &JsValue = entry.as_ref();
			if Reflect::get(&self.window, &key).map_or(false, |current| &current == entry) {
				if let Err(error) = Reflect::delete_property(self.window.unchecked_ref::<Object>(), &key) {
					error!("Could not remove {}: {:?}", name, error);
				}
			}
		}
	}
}

impl<S: Scheduler> Debug for Inner<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Inner")
			.field("options", &self.options)
			.field("timers", &self.timers)
			.finish_non_exhaustive()
	}
}

/// Sets the `disabled` property, which works for any element the way plain assignment would.
pub(crate) fn set_disabled(element: &Element, disabled: bool) {
	if let Err(error) = Reflect::set(element, &JsValue::from_str("disabled"), &JsValue::from_bool(disabled)) {
		error!("Could not set `disabled` to {}: {:?}", disabled, error);
	}
}

thread_local! {
	static INSTALLED: RefCell<Option<Runtime>> = RefCell::new(None);
}

/// Installs a [`Runtime`] with the default browser capabilities for this thread.
///
/// `options` is an optional JSON string, see [`Options`].
/// If the document is still loading, installation waits for `DOMContentLoaded`.
/// Repeated calls after a successful installation are ignored with a warning.
///
/// # Errors
///
/// Iff the options are invalid or the DOM isn't available.
#[wasm_bindgen(js_name = installTriggers)]
pub fn install_triggers(options: Option<String>) -> Result<(), JsValue> {
	#[cfg(feature = "console-log")]
	{
		static LOGGING: std::sync::Once = std::sync::Once::new();
		LOGGING.call_once(|| {
			console_error_panic_hook::set_once();
			if let Err(error) = tracing_wasm::try_set_as_global_default() {
				warn!("Keeping the existing tracing subscriber: {}", error);
			}
		});
	}

	let options = options.as_deref().map(Options::from_json).transpose()?.unwrap_or_default();
	let document = web_sys::window().and_then(|window| window.document()).ok_or(Error::DomUnavailable)?;
	if document.ready_state() == "loading" {
		trace!("Deferring installation until DOMContentLoaded.");
		let install = Closure::once_into_js(move || {
			if let Err(error) = install_default(options) {
				error!("{}", error);
			}
		});
		document.add_event_listener_with_callback("DOMContentLoaded", install.unchecked_ref())?;
		Ok(())
	} else {
		install_default(options).map_err(Into::into)
	}
}

fn install_default(options: Options) -> Result<(), Error> {
	if INSTALLED.with(|installed| installed.borrow().is_some()) {
		warn!("Triggers are already installed. Ignoring.");
		return Ok(());
	}
	let runtime = RuntimeBuilder::new()?.options(options).install()?;
	INSTALLED.with(|installed| *installed.borrow_mut() = Some(runtime));
	Ok(())
}
