#![doc(html_root_url = "https://docs.rs/trigger-dom/0.1.0")]
#![warn(clippy::pedantic)]

//! Declarative event bindings for the DOM.
//!
//! Elements declare `data-trigger="click submit …"` plus request configuration in further `data-` attributes.
//! A [`Runtime`] binds them, applies the debounce/interval/delay timing, hands a JSON [`RequestDescriptor`] to a
//! transport and patches responses back into the document with one of the [`SwapMethod`]s.
//!
//! The attribute parsing, timing and routing parts don't touch the DOM and work on any target.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod descriptor;
pub mod dispatch;
mod error;
pub mod options;
pub mod params;
pub mod patch;
pub mod router;
mod runtime;
pub mod swap;
pub mod timers;
pub mod web;

pub use config::{TimingPolicy, TriggerConfig};
pub use descriptor::RequestDescriptor;
pub use error::Error;
pub use options::{Options, ResetScope};
pub use runtime::{install_triggers, Runtime, RuntimeBuilder};
pub use swap::SwapMethod;
