use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

/// Release version; builds carry no git metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared look of every binary's help output.
pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}
