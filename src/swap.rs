use crate::Error;
use core::{fmt, str::FromStr};

/// How response content is applied to the target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapMethod {
	/// `innerHTML`
	InnerHtml,
	/// `outerHTML`
	OuterHtml,
	/// `beforebegin`
	BeforeBegin,
	/// `afterbegin`
	AfterBegin,
	/// `beforeend`
	BeforeEnd,
	/// `afterend`
	AfterEnd,
	/// `class`: The content becomes the target's literal class list.
	Class,
}

impl SwapMethod {
	pub const ALL: [Self; 7] = [
		Self::InnerHtml,
		Self::OuterHtml,
		Self::BeforeBegin,
		Self::AfterBegin,
		Self::BeforeEnd,
		Self::AfterEnd,
		Self::Class,
	];

	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::InnerHtml => "innerHTML",
			Self::OuterHtml => "outerHTML",
			Self::BeforeBegin => "beforebegin",
			Self::AfterBegin => "afterbegin",
			Self::BeforeEnd => "beforeend",
			Self::AfterEnd => "afterend",
			Self::Class => "class",
		}
	}

	/// The `insertAdjacentHTML` position, for the four adjacent insertion methods.
	#[must_use]
	pub fn adjacent_position(self) -> Option<&'static str> {
		match self {
			Self::BeforeBegin | Self::AfterBegin | Self::BeforeEnd | Self::AfterEnd => Some(self.name()),
			Self::InnerHtml | Self::OuterHtml | Self::Class => None,
		}
	}
}

impl FromStr for SwapMethod {
	type Err = Error;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.copied()
			.find(|method| method.name() == name)
			.ok_or_else(|| Error::UnknownSwapMethod(name.to_owned()))
	}
}

impl fmt::Display for SwapMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
