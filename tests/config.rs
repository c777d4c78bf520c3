use fake_source_::FakeElement;

use trigger_dom::{
	config::{parse_millis, parse_triggers},
	TimingPolicy, TriggerConfig,
};

#[test]
fn millis_follow_parse_int() {
	assert_eq!(parse_millis("250"), 250);
	assert_eq!(parse_millis("  42ms"), 42);
	assert_eq!(parse_millis("+7"), 7);
	assert_eq!(parse_millis("1e3"), 1);
	assert_eq!(parse_millis("0x10"), 0);
	assert_eq!(parse_millis("abc"), 0);
	assert_eq!(parse_millis(""), 0);
	assert_eq!(parse_millis("-"), 0);
}

#[test]
fn negative_millis_clamp_and_huge_ones_saturate() {
	assert_eq!(parse_millis("-500"), 0);
	assert_eq!(parse_millis("99999999999999"), u32::MAX);
}

#[test]
fn triggers_split_on_any_whitespace() {
	assert_eq!(parse_triggers("click  keyup\tload"), vec!["click", "keyup", "load"]);
	assert!(parse_triggers("   ").is_empty());
}

#[test]
fn absent_fields_default() {
	let config = TriggerConfig::read(&FakeElement::new("a").with("trigger", "click"));
	assert_eq!(
		config,
		TriggerConfig {
			triggers: vec!["click".to_owned()],
			..TriggerConfig::default()
		}
	);
	assert_eq!(config.policy(), TimingPolicy::Delay(0));
}

#[test]
fn flags_are_presence_only() {
	let config = TriggerConfig::read(&FakeElement::new("a").with("trigger", "submit").with("prevent-default", "").with("disable", "false"));
	assert!(config.prevent_default);
	assert!(config.disable);
}

#[test]
fn empty_strings_count_as_unset_where_truthiness_matters() {
	let element = FakeElement::new("a")
		.with("trigger", "click")
		.with("url", "")
		.with("confirm", "")
		.with("indicator", "")
		.with("params", "");
	let config = TriggerConfig::read(&element);
	assert_eq!(config.url.as_deref(), Some(""));
	assert_eq!(config.confirm, None);
	assert_eq!(config.indicator, None);
	assert_eq!(config.params, None);
}

#[test]
fn debounce_beats_interval_beats_delay() {
	let element = FakeElement::new("a").with("trigger", "keyup").with("delay", "5").with("interval", "1000");
	assert_eq!(TriggerConfig::read(&element).policy(), TimingPolicy::Interval(1000));

	let element = element.with("debounce", "300");
	assert_eq!(TriggerConfig::read(&element).policy(), TimingPolicy::Debounce(300));

	let element = FakeElement::new("a").with("trigger", "keyup").with("delay", "5").with("interval", "nope");
	assert_eq!(TriggerConfig::read(&element).policy(), TimingPolicy::Delay(5));
}

#[test]
fn load_is_found_among_other_triggers() {
	let config = TriggerConfig::read(&FakeElement::new("a").with("trigger", "click load"));
	assert!(config.has_trigger("load"));
	assert!(!config.has_trigger("loa"));
}
