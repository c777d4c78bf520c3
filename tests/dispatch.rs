use fake_source_::FakeElement;

use serde_json::json;
use std::cell::RefCell;
use trigger_dom::{dispatch::prepare, TriggerConfig};

fn accept(_: &str) -> bool {
	true
}

fn decline(_: &str) -> bool {
	false
}

#[test]
fn form_values_override_declared_params() {
	let form = FakeElement::new("todo-form")
		.with("trigger", "submit")
		.with("params", r#"{"a": "1", "b": 2}"#)
		.form(&[("a", "2"), ("title", "Buy milk")]);
	let config = TriggerConfig::read(&form);

	let request = prepare("submit", &form, &config, &accept).unwrap();
	assert_eq!(request.params.get("a"), Some(&json!("2")));
	assert_eq!(request.params.get("b"), Some(&json!(2)));
	assert_eq!(request.param_str("title"), Some("Buy milk"));
}

#[test]
fn later_form_entries_win() {
	let form = FakeElement::new("f").with("trigger", "submit").form(&[("tag", "a"), ("tag", "b")]);
	let request = prepare("submit", &form, &TriggerConfig::read(&form), &accept).unwrap();
	assert_eq!(request.param_str("tag"), Some("b"));
}

#[test]
fn malformed_params_fall_back_to_empty() {
	let element = FakeElement::new("a").with("trigger", "click").with("params", "{nope");
	let request = prepare("click", &element, &TriggerConfig::read(&element), &accept).unwrap();
	assert!(request.params.is_empty());
}

#[test]
fn non_object_params_fall_back_to_empty() {
	let element = FakeElement::new("a").with("trigger", "click").with("params", "[1, 2]");
	let request = prepare("click", &element, &TriggerConfig::read(&element), &accept).unwrap();
	assert!(request.params.is_empty());
}

#[test]
fn declined_confirmation_aborts() {
	let element = FakeElement::new("delete").with("trigger", "click").with("confirm", "Really delete?");
	assert_eq!(prepare("click", &element, &TriggerConfig::read(&element), &decline), None);
}

#[test]
fn confirmation_sees_the_configured_message() {
	let asked = RefCell::new(Vec::new());
	let confirm = |message: &str| {
		asked.borrow_mut().push(message.to_owned());
		true
	};

	let element = FakeElement::new("delete").with("trigger", "click").with("confirm", "Really delete?");
	assert!(prepare("click", &element, &TriggerConfig::read(&element), &confirm).is_some());
	assert_eq!(*asked.borrow(), vec!["Really delete?".to_owned()]);
}

#[test]
fn no_prompt_without_confirm_attribute() {
	let element = FakeElement::new("a").with("trigger", "click");
	let confirm = |_: &str| -> bool { panic!("Unexpected confirmation prompt") };
	assert!(prepare("click", &element, &TriggerConfig::read(&element), &confirm).is_some());
}

#[test]
fn descriptor_carries_element_configuration() {
	let element = FakeElement::new("search")
		.with("trigger", "keyup")
		.with("url", "/search")
		.with("target", "#results")
		.with("swap", "innerHTML")
		.with("params", r#"{"page": 1}"#);
	let request = prepare("keyup", &element, &TriggerConfig::read(&element), &accept).unwrap();

	assert_eq!(request.event_type, "keyup");
	assert_eq!(request.element_id, "search");
	assert_eq!(request.url.as_deref(), Some("/search"));
	assert_eq!(request.target.as_deref(), Some("#results"));
	assert_eq!(request.swap.as_deref(), Some("innerHTML"));
	assert_eq!(request.params.get("page"), Some(&json!(1)));
}
