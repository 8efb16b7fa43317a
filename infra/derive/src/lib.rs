#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros shared by the Scholar infrastructure and feature crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! scholar-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! The generated code refers to `::thiserror`, so consumers must depend on it directly.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring a crate's error enum.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug` and `thiserror::Error` unless already derived.
/// * **Context**: a companion `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>`
///   and to `Result<T, Source>` for every variant that wraps a source error.
/// * **Conversions**: `From<Source>` for each variant with a `source` field (or a field
///   marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Internal fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
/// * **Formatting**: a module-level `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Every variant uses named fields.
/// 3. A variant with a source field must also declare `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[scholar_derive::scholar_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Reading snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn scholar_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(&input).into()
}
