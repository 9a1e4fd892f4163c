#![forbid(unsafe_code)]

//! Allow-list HTML sanitizer.
//!
//! Untrusted markup is parsed into a DOM tree, walked in document order and reduced to the
//! elements and attributes the active configuration allows. The checks are namespace aware
//! (HTML, SVG, MathML), reject DOM-clobbering names and drop markup that would re-parse into
//! something different (mXSS).
//!
//! Use a [`Sanitizer`] directly, or the free functions below which share a thread-local default
//! instance.
//!
//! ```
//! let clean = preen::sanitize(r#"<img src=x onerror=alert(1)><b>ok</b>"#).unwrap();
//! assert_eq!(clean, r#"<img src="x"><b>ok</b>"#);
//! ```

pub mod allowlist;
mod attribute;
pub mod config;
mod document;
pub mod dom;
mod element;
pub mod error;
pub mod hooks;
mod namespace;
mod patterns;
pub mod sanitizer;
pub mod trusted_types;
mod walker;

use std::cell::RefCell;
use std::rc::Rc;

pub use attribute::NAMED_PROPS_PREFIX;
pub use config::{Config, CustomElementHandling, NameCheck, ParserMediaType, SanitizeOptions};
pub use error::{Error, HookError, Result};
pub use hooks::{
    AttributeHookEvent, ElementHookEvent, Hook, HookKind, HookPoint, HookRegistry, HookResult,
};
pub use markup5ever_rcdom::Handle;
pub use patterns::default_allowed_uri_regex;
pub use sanitizer::{Dirty, Removed, Sanitized, Sanitizer};
pub use trusted_types::{TrustedHtml, TrustedType, TrustedTypesPolicy};

thread_local! {
    static DEFAULT: RefCell<Sanitizer> = RefCell::new(Sanitizer::new());
}

/// Runs `f` against this thread's default sanitizer.
///
/// Hooks run while the default sanitizer is borrowed, so a hook calling back into these free
/// functions gets [`Error::DefaultBusy`].
pub fn with_default<R>(f: impl FnOnce(&mut Sanitizer) -> R) -> Result<R> {
    DEFAULT.with(|s| {
        let mut sanitizer = s.try_borrow_mut().map_err(|_| Error::DefaultBusy)?;
        Ok(f(&mut *sanitizer))
    })
}

pub fn sanitize(dirty: &str) -> Result<String> {
    with_default(|s| s.sanitize_str(dirty))?
}

pub fn sanitize_with(dirty: &str, options: &SanitizeOptions) -> Result<String> {
    with_default(|s| s.sanitize_with(dirty, options))?
}

pub fn sanitize_dirty(dirty: Dirty<'_>, options: Option<&SanitizeOptions>) -> Result<Sanitized> {
    with_default(|s| s.sanitize(dirty, options))?
}

pub fn set_config(options: &SanitizeOptions) -> Result<()> {
    with_default(|s| s.set_config(options))?
}

pub fn clear_config() -> Result<()> {
    with_default(Sanitizer::clear_config)
}

pub fn config() -> Result<Option<Rc<Config>>> {
    with_default(|s| s.config())
}

pub fn is_valid_attribute(tag: &str, attr: &str, value: &str) -> Result<bool> {
    with_default(|s| s.is_valid_attribute(tag, attr, value))
}

pub fn add_hook(point: HookPoint, hook: Hook) -> Result<()> {
    with_default(|s| s.add_hook(point, hook))?
}

pub fn remove_hook(point: HookPoint) -> Result<Option<Hook>> {
    with_default(|s| s.remove_hook(point))
}

pub fn remove_hooks(point: HookPoint) -> Result<()> {
    with_default(|s| s.remove_hooks(point))
}

pub fn remove_all_hooks() -> Result<()> {
    with_default(Sanitizer::remove_all_hooks)
}

/// Removal log of the default sanitizer's last call.
pub fn removed() -> Result<Vec<Removed>> {
    with_default(|s| s.removed().to_vec())
}

#[cfg(test)]
mod tests;
