//! Derive macros for the configuration types

mod config;
mod enums;

use proc_macro::TokenStream;

/// Implement `Display` for a struct with named fields, writing one `  name: value` line per
/// field after a leading newline.
///
/// Field attributes: `#[cfg_display(debug_fmt)]` formats the field with `Debug`,
/// `#[cfg_display(skip)]` leaves it out.
#[proc_macro_derive(ConfigDisplay, attributes(cfg_display))]
pub fn config_display(input: TokenStream) -> TokenStream {
    config::config_display(input)
}

/// Implement `Display` for a fieldless enum using the variant names, plus a `to_str` method.
#[proc_macro_derive(EnumDisplay)]
pub fn enum_display(input: TokenStream) -> TokenStream {
    enums::enum_display(input)
}

/// Implement `FromStr` for a fieldless enum, matching variant names case-insensitively.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str(input: TokenStream) -> TokenStream {
    enums::enum_from_str(input)
}

/// Add an `ALL` constant listing every variant in declaration order.
#[proc_macro_derive(EnumAll)]
pub fn enum_all(input: TokenStream) -> TokenStream {
    enums::enum_all(input)
}

/// Implement `clap::ValueEnum` on top of `EnumAll` and `EnumDisplay`. Each variant also accepts
/// its all-lowercase name on the command line.
#[proc_macro_derive(CustomValueEnum)]
pub fn custom_value_enum(input: TokenStream) -> TokenStream {
    enums::custom_value_enum(input)
}
