use crate::{
	options::ResetScope,
	runtime::{set_disabled, Inner},
	swap::SwapMethod,
	timers::Scheduler,
	Error,
};
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::JsValue;
use web_sys::Element;

/// Applies `content` to `target` according to `method`.
///
/// # Errors
///
/// Iff `insertAdjacentHTML` throws, for example when inserting beside the document element.
pub fn apply_swap(target: &Element, content: &str, method: SwapMethod) -> Result<(), Error> {
	match method {
		SwapMethod::InnerHtml => target.set_inner_html(content),
		SwapMethod::OuterHtml => target.set_outer_html(content),
		SwapMethod::Class => target.set_class_name(content),
		SwapMethod::BeforeBegin | SwapMethod::AfterBegin | SwapMethod::BeforeEnd | SwapMethod::AfterEnd => {
			target.insert_adjacent_html(method.name(), content)?;
		}
	}
	Ok(())
}

impl<S: Scheduler + Clone + 'static> Inner<S> {
	#[instrument(skip(self, content))]
	pub(crate) fn update_dom(&self, target_selector: &str, content: &str, swap_method: &str, push_url: Option<&str>) {
		#[cfg(feature = "dangerous-logging")]
		trace!("Response content: {}", content);

		let target = match self.document.query_selector(target_selector) {
			Ok(Some(target)) => target,
			Ok(None) => return error!("{}", Error::TargetNotFound(target_selector.to_owned())),
			Err(error) => return error!("Invalid target selector {:?}: {:?}", target_selector, error),
		};

		match swap_method.parse() {
			Ok(method) => {
				if let Err(error) = apply_swap(&target, content, method) {
					error!("Could not swap {} into {}: {}", method, target_selector, error);
				}
			}
			Err(error) => error!("{}", error),
		}

		if let Some(url) = push_url.filter(|url| !url.is_empty()) {
			if let Err(error) = self.push_url(url) {
				error!("Could not push history entry {:?}: {}", url, error);
			}
		}

		self.reset_ui();
		self.bind();
	}

	fn push_url(&self, url: &str) -> Result<(), Error> {
		self.window.history()?.push_state_with_url(&JsValue::NULL, "", Some(url))?;
		trace!("Pushed history entry.");
		Ok(())
	}

	/// Re-enables disabled elements and hides indicators, in the configured [`ResetScope`].
	fn reset_ui(&self) {
		let in_flight = self.take_in_flight();
		match self.options.reset_scope {
			ResetScope::Document => {
				for element in self.query_all(&self.options.presence_selector("disable")) {
					set_disabled(&element, false);
				}

				let indicator_attribute = self.options.attribute("indicator");
				for element in self.query_all(&self.options.presence_selector("indicator")) {
					let selector = element.get_attribute(&indicator_attribute).unwrap_or_default();
					match self.document.query_selector(&selector) {
						Ok(Some(indicator)) => self.hide(&indicator),
						Ok(None) => warn!("Indicator not found: {}", selector),
						Err(error) => error!("Invalid indicator selector {:?}: {:?}", selector, error),
					}
				}
			}
			ResetScope::InFlight => {
				for element in &in_flight.disabled {
					set_disabled(element, false);
				}
				for indicator in &in_flight.indicators {
					self.hide(indicator);
				}
			}
		}
	}

	fn hide(&self, indicator: &Element) {
		if let Err(error) = indicator.class_list().add_1(&self.options.hidden_class) {
			error!("Could not hide indicator: {:?}", error);
		}
	}
}
