//! Trusted Types modelling.
//!
//! There is no browser enforcement here; the policy is a pair of string transforms applied to
//! typed sinks and to the final markup when a trusted result is requested. The default policy is
//! a passthrough.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};

type Transform = Rc<dyn Fn(&str) -> String>;

/// Markup produced by a policy's `create_html`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Default)]
pub struct TrustedTypesPolicy {
    name: String,
    create_html: Option<Transform>,
    create_script_url: Option<Transform>,
}

impl TrustedTypesPolicy {
    /// A policy with no capabilities; add them with the `with_*` builders.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            create_html: None,
            create_script_url: None,
        }
    }

    /// The engine's own policy: both capabilities return their input unchanged.
    pub fn passthrough() -> Self {
        Self::new("preen")
            .with_create_html(str::to_string)
            .with_create_script_url(str::to_string)
    }

    pub fn with_create_html(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.create_html = Some(Rc::new(f));
        self
    }

    pub fn with_create_script_url(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.create_script_url = Some(Rc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.create_html.is_none() {
            return Err(Error::MissingCreateHtml);
        }
        if self.create_script_url.is_none() {
            return Err(Error::MissingCreateScriptUrl);
        }
        Ok(())
    }

    pub fn create_html(&self, input: &str) -> TrustedHtml {
        TrustedHtml(match &self.create_html {
            Some(f) => f(input),
            None => input.to_string(),
        })
    }

    pub fn create_script_url(&self, input: &str) -> String {
        match &self.create_script_url {
            Some(f) => f(input),
            None => input.to_string(),
        }
    }

    pub(crate) fn apply(&self, ty: TrustedType, input: &str) -> String {
        match ty {
            TrustedType::Html => self.create_html(input).into_string(),
            TrustedType::ScriptUrl => self.create_script_url(input),
        }
    }
}

impl fmt::Debug for TrustedTypesPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedTypesPolicy")
            .field("name", &self.name)
            .field("create_html", &self.create_html.is_some())
            .field("create_script_url", &self.create_script_url.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustedType {
    Html,
    ScriptUrl,
}

/// Sink type for an un-namespaced attribute, by lowercase tag and attribute name.
pub fn attribute_type(tag: &str, attr: &str) -> Option<TrustedType> {
    match (tag, attr) {
        ("iframe", "srcdoc") => Some(TrustedType::Html),
        ("script", "src" | "href") | ("embed", "src") | ("object", "data" | "codebase") => {
            Some(TrustedType::ScriptUrl)
        }
        _ => None,
    }
}
