//! Per-element trigger configuration, read from (by default `data-`) attributes.

/// Read access to one element's trigger declaration.
///
/// Attribute names are passed without prefix, for example `"debounce"` for `data-debounce`.
pub trait TriggerSource {
	fn attribute(&self, name: &str) -> Option<String>;

	/// The element's `id`, or an empty string if it has none.
	fn element_id(&self) -> String;

	/// `Some` with the element's form data entries (in document order) iff the element is a form.
	fn form_entries(&self) -> Option<Vec<(String, String)>>;
}

/// Which of the timing modes applies to one dispatch.
///
/// Durations are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingPolicy {
	/// Replaces any pending debounce timer for the same element and fires once the element is quiet.
	Debounce(u32),
	/// Replaces any running interval for the same element, fires immediately and then repeatedly.
	Interval(u32),
	/// Fires once after the given delay. `Delay(0)` still goes through the timer queue.
	Delay(u32),
}

/// Everything the dispatcher reads from a triggering element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerConfig {
	pub triggers: Vec<String>,
	pub url: Option<String>,
	pub target: Option<String>,
	pub swap: Option<String>,
	pub delay: u32,
	pub timeout: u32,
	pub debounce: u32,
	pub interval: u32,
	pub confirm: Option<String>,
	pub prevent_default: bool,
	pub disable: bool,
	pub indicator: Option<String>,
	pub params: Option<String>,
}

impl TriggerConfig {
	#[must_use]
	pub fn read(source: &impl TriggerSource) -> Self {
		let millis = |name: &str| source.attribute(name).as_deref().map_or(0, parse_millis);
		let non_empty = |name: &str| source.attribute(name).filter(|value| !value.is_empty());
		Self {
			triggers: source.attribute("trigger").as_deref().map(parse_triggers).unwrap_or_default(),
			url: source.attribute("url"),
			target: source.attribute("target"),
			swap: source.attribute("swap"),
			delay: millis("delay"),
			timeout: millis("timeout"),
			debounce: millis("debounce"),
			interval: millis("interval"),
			confirm: non_empty("confirm"),
			prevent_default: source.attribute("prevent-default").is_some(),
			disable: source.attribute("disable").is_some(),
			indicator: non_empty("indicator"),
			params: non_empty("params"),
		}
	}

	/// Debounce wins over interval, which wins over plain delay.
	#[must_use]
	pub fn policy(&self) -> TimingPolicy {
		if self.debounce > 0 {
			TimingPolicy::Debounce(self.debounce)
		} else if self.interval > 0 {
			TimingPolicy::Interval(self.interval)
		} else {
			TimingPolicy::Delay(self.delay)
		}
	}

	#[must_use]
	pub fn has_trigger(&self, name: &str) -> bool {
		self.triggers.iter().any(|trigger| trigger == name)
	}
}

/// Splits a trigger declaration into event names.
#[must_use]
pub fn parse_triggers(declaration: &str) -> Vec<String> {
	declaration.split_whitespace().map(str::to_owned).collect()
}

/// Parses a millisecond count the way `parseInt(value) || 0` would, clamped to `u32`.
///
/// Leading whitespace and a sign are accepted and parsing stops at the first non-digit,
/// so `"250ms"` is `250`. Unparseable and negative values are `0`, huge ones saturate.
#[must_use]
pub fn parse_millis(value: &str) -> u32 {
	let value = value.trim_start();
	let (negative, digits) = match value.as_bytes().first() {
		Some(b'-') => (true, &value[1..]),
		Some(b'+') => (false, &value[1..]),
		_ => (false, value),
	};

	let mut millis = 0_u32;
	for digit in digits.bytes().take_while(u8::is_ascii_digit) {
		millis = millis.saturating_mul(10).saturating_add(u32::from(digit - b'0'));
	}

	if negative {
		0
	} else {
		millis
	}
}
