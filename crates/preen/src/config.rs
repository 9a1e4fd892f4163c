//! Options and the resolved, immutable [`Config`].
//!
//! Options are a JSON object keyed by the upper-case names users already know
//! (`ALLOWED_TAGS`, `FORBID_ATTR`, ...) plus a few programmatic extras JSON cannot carry.
//! Keys are read leniently: an absent or mistyped key falls back to its default and unknown
//! keys are ignored.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::allowlist::{
    self, HTML_ATTRS, HTML_NAMESPACE, HTML_TAGS, MATHML_ATTRS, MATHML_TAGS, SVG_ATTRS,
    SVG_FILTER_TAGS, SVG_TAGS, TEXT_TAGS, XML_ATTRS,
};
use crate::error::{Error, Result};
use crate::patterns::default_allowed_uri_regex;
use crate::trusted_types::TrustedTypesPolicy;

/// Tag-name or attribute-name check for custom elements.
#[derive(Clone)]
pub enum NameCheck {
    Pattern(Regex),
    Predicate(Rc<dyn Fn(&str) -> bool>),
}

impl NameCheck {
    pub fn predicate(f: impl Fn(&str) -> bool + 'static) -> Self {
        NameCheck::Predicate(Rc::new(f))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameCheck::Pattern(re) => re.is_match(name),
            NameCheck::Predicate(f) => f(name),
        }
    }
}

impl PartialEq for NameCheck {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NameCheck::Pattern(a), NameCheck::Pattern(b)) => a.as_str() == b.as_str(),
            (NameCheck::Predicate(a), NameCheck::Predicate(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for NameCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameCheck::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            NameCheck::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// User-facing options for one sanitize call or for [`crate::Sanitizer::set_config`].
#[derive(Clone, Default)]
pub struct SanitizeOptions {
    value: Value,
    tag_name_check: Option<NameCheck>,
    attribute_name_check: Option<NameCheck>,
    trusted_types_policy: Option<Rc<TrustedTypesPolicy>>,
    allowed_uri_regexp: Option<Regex>,
}

impl SanitizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Sets one JSON key, turning the options into an object if needed.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.value.is_object() {
            self.value = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.value {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn with_tag_name_check(mut self, check: NameCheck) -> Self {
        self.tag_name_check = Some(check);
        self
    }

    pub fn with_attribute_name_check(mut self, check: NameCheck) -> Self {
        self.attribute_name_check = Some(check);
        self
    }

    pub fn with_trusted_types_policy(mut self, policy: TrustedTypesPolicy) -> Self {
        self.trusted_types_policy = Some(Rc::new(policy));
        self
    }

    pub fn with_allowed_uri_regexp(mut self, re: Regex) -> Self {
        self.allowed_uri_regexp = Some(re);
        self
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    fn object(&self) -> Option<&Map<String, Value>> {
        self.value.as_object()
    }
}

impl From<Value> for SanitizeOptions {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl PartialEq for SanitizeOptions {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.tag_name_check == other.tag_name_check
            && self.attribute_name_check == other.attribute_name_check
            && match (&self.trusted_types_policy, &other.trusted_types_policy) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
            && self.allowed_uri_regexp.as_ref().map(Regex::as_str)
                == other.allowed_uri_regexp.as_ref().map(Regex::as_str)
    }
}

impl fmt::Debug for SanitizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizeOptions")
            .field("value", &self.value)
            .field("tag_name_check", &self.tag_name_check)
            .field("attribute_name_check", &self.attribute_name_check)
            .field("trusted_types_policy", &self.trusted_types_policy)
            .field(
                "allowed_uri_regexp",
                &self.allowed_uri_regexp.as_ref().map(Regex::as_str),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserMediaType {
    #[default]
    Html,
    Xhtml,
}

impl ParserMediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParserMediaType::Html => "text/html",
            ParserMediaType::Xhtml => "application/xhtml+xml",
        }
    }

    /// Names are case-insensitive in HTML and preserved verbatim in XHTML.
    pub fn transform_case(self, name: &str) -> String {
        match self {
            ParserMediaType::Html => name.to_ascii_lowercase(),
            ParserMediaType::Xhtml => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomElementHandling {
    pub tag_name_check: Option<NameCheck>,
    pub attribute_name_check: Option<NameCheck>,
    pub allow_customized_built_in_elements: bool,
}

impl CustomElementHandling {
    pub fn tag_name_ok(&self, name: &str) -> bool {
        self.tag_name_check.as_ref().is_some_and(|c| c.matches(name))
    }

    pub fn attribute_name_ok(&self, name: &str) -> bool {
        self.attribute_name_check
            .as_ref()
            .is_some_and(|c| c.matches(name))
    }
}

/// Resolved configuration. Shared as `Rc<Config>` and never mutated after resolution.
#[derive(Debug, Clone)]
pub struct Config {
    pub allowed_tags: HashSet<String>,
    pub allowed_attr: HashSet<String>,
    pub allowed_namespaces: HashSet<String>,
    pub forbid_tags: HashSet<String>,
    pub forbid_attr: HashSet<String>,
    pub forbid_contents: HashSet<String>,
    pub uri_safe_attr: HashSet<String>,
    pub data_uri_tags: HashSet<String>,
    pub html_integration_points: HashSet<String>,
    pub mathml_text_integration_points: HashSet<String>,
    pub custom_elements: CustomElementHandling,
    pub allow_aria_attr: bool,
    pub allow_data_attr: bool,
    pub allow_unknown_protocols: bool,
    pub allow_self_close_in_attr: bool,
    pub safe_for_templates: bool,
    pub safe_for_xml: bool,
    pub whole_document: bool,
    pub return_dom: bool,
    pub return_dom_fragment: bool,
    pub return_trusted_type: bool,
    pub force_body: bool,
    pub sanitize_dom: bool,
    pub sanitize_named_props: bool,
    pub keep_content: bool,
    pub in_place: bool,
    pub allowed_uri_regexp: Regex,
    pub namespace: String,
    pub parser_media_type: ParserMediaType,
    pub trusted_types: Rc<TrustedTypesPolicy>,
}

fn bool_opt(cfg: Option<&Map<String, Value>>, key: &str, default: bool) -> bool {
    cfg.and_then(|o| o.get(key))
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}

fn str_opt<'a>(cfg: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a str> {
    cfg.and_then(|o| o.get(key)).and_then(|v| v.as_str())
}

/// `Some` only when the key holds an array; non-string members are skipped.
fn string_list(
    cfg: Option<&Map<String, Value>>,
    key: &str,
    transform: impl Fn(&str) -> String,
) -> Option<Vec<String>> {
    cfg.and_then(|o| o.get(key))
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|x| x.as_str())
                .map(&transform)
                .collect()
        })
}

fn compile_pattern(option: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern { option, source })
}

fn name_check(
    handling: Option<&Map<String, Value>>,
    key: &str,
    option: &'static str,
) -> Result<Option<NameCheck>> {
    match str_opt(handling, key) {
        Some(pattern) => Ok(Some(NameCheck::Pattern(compile_pattern(option, pattern)?))),
        None => Ok(None),
    }
}

impl Config {
    /// Resolves options against the defaults.
    pub fn resolve(options: &SanitizeOptions) -> Result<Config> {
        let cfg = options.object();

        let parser_media_type = match str_opt(cfg, "PARSER_MEDIA_TYPE") {
            Some("application/xhtml+xml") => ParserMediaType::Xhtml,
            _ => ParserMediaType::Html,
        };
        let case = |s: &str| parser_media_type.transform_case(s);

        let mut allowed_tags = string_list(cfg, "ALLOWED_TAGS", case)
            .map(|v| v.into_iter().collect())
            .unwrap_or_else(|| allowlist::default_allowed_tags().clone());
        let mut allowed_attr = string_list(cfg, "ALLOWED_ATTR", case)
            .map(|v| v.into_iter().collect())
            .unwrap_or_else(|| allowlist::default_allowed_attr().clone());
        let allowed_namespaces = string_list(cfg, "ALLOWED_NAMESPACES", str::to_string)
            .map(|v| v.into_iter().collect())
            .unwrap_or_else(|| allowlist::default_allowed_namespaces().clone());

        let mut uri_safe_attr = allowlist::default_uri_safe_attr().clone();
        uri_safe_attr.extend(string_list(cfg, "ADD_URI_SAFE_ATTR", case).unwrap_or_default());

        let mut data_uri_tags = allowlist::default_data_uri_tags().clone();
        data_uri_tags.extend(string_list(cfg, "ADD_DATA_URI_TAGS", case).unwrap_or_default());

        let forbid_contents = string_list(cfg, "FORBID_CONTENTS", case)
            .map(|v| v.into_iter().collect())
            .unwrap_or_else(|| allowlist::default_forbid_contents().clone());
        let mut forbid_tags: HashSet<String> = string_list(cfg, "FORBID_TAGS", case)
            .unwrap_or_default()
            .into_iter()
            .collect();
        let forbid_attr: HashSet<String> = string_list(cfg, "FORBID_ATTR", case)
            .unwrap_or_default()
            .into_iter()
            .collect();

        let safe_for_templates = bool_opt(cfg, "SAFE_FOR_TEMPLATES", false);
        let return_dom_fragment = bool_opt(cfg, "RETURN_DOM_FRAGMENT", false);
        let whole_document = bool_opt(cfg, "WHOLE_DOCUMENT", false);
        let keep_content = bool_opt(cfg, "KEEP_CONTENT", true);

        let allowed_uri_regexp = match (&options.allowed_uri_regexp, str_opt(cfg, "ALLOWED_URI_REGEXP")) {
            (Some(re), _) => re.clone(),
            (None, Some(pattern)) => {
                compile_pattern("ALLOWED_URI_REGEXP", &format!("(?i){pattern}"))?
            }
            (None, None) => default_allowed_uri_regex().clone(),
        };

        let handling = cfg
            .and_then(|o| o.get("CUSTOM_ELEMENT_HANDLING"))
            .and_then(|v| v.as_object());
        let custom_elements = CustomElementHandling {
            tag_name_check: match &options.tag_name_check {
                Some(check) => Some(check.clone()),
                None => name_check(handling, "tagNameCheck", "CUSTOM_ELEMENT_HANDLING.tagNameCheck")?,
            },
            attribute_name_check: match &options.attribute_name_check {
                Some(check) => Some(check.clone()),
                None => name_check(
                    handling,
                    "attributeNameCheck",
                    "CUSTOM_ELEMENT_HANDLING.attributeNameCheck",
                )?,
            },
            allow_customized_built_in_elements: bool_opt(
                handling,
                "allowCustomizedBuiltInElements",
                false,
            ),
        };

        if let Some(profiles) = cfg
            .and_then(|o| o.get("USE_PROFILES"))
            .and_then(|v| v.as_object())
        {
            let on = |key: &str| profiles.get(key).and_then(|v| v.as_bool()) == Some(true);
            allowed_tags = allowlist::set_of(&[TEXT_TAGS]);
            allowed_attr = HashSet::new();
            if on("html") {
                allowed_tags.extend(allowlist::set_of(&[HTML_TAGS]));
                allowed_attr.extend(allowlist::set_of(&[HTML_ATTRS]));
            }
            if on("svg") {
                allowed_tags.extend(allowlist::set_of(&[SVG_TAGS]));
                allowed_attr.extend(allowlist::set_of(&[SVG_ATTRS, XML_ATTRS]));
            }
            if on("svgFilters") {
                allowed_tags.extend(allowlist::set_of(&[SVG_FILTER_TAGS]));
                allowed_attr.extend(allowlist::set_of(&[SVG_ATTRS, XML_ATTRS]));
            }
            if on("mathMl") {
                allowed_tags.extend(allowlist::set_of(&[MATHML_TAGS]));
                allowed_attr.extend(allowlist::set_of(&[MATHML_ATTRS, XML_ATTRS]));
            }
        }

        allowed_tags.extend(string_list(cfg, "ADD_TAGS", case).unwrap_or_default());
        allowed_attr.extend(string_list(cfg, "ADD_ATTR", case).unwrap_or_default());

        if keep_content {
            allowed_tags.insert("#text".to_string());
        }
        if whole_document {
            for t in ["html", "head", "body"] {
                allowed_tags.insert(t.to_string());
            }
        }
        if allowed_tags.contains("table") {
            allowed_tags.insert("tbody".to_string());
            forbid_tags.remove("tbody");
        }

        let trusted_types = match &options.trusted_types_policy {
            Some(policy) => {
                policy.validate()?;
                policy.clone()
            }
            None => Rc::new(TrustedTypesPolicy::passthrough()),
        };

        let html_integration_points = string_list(cfg, "HTML_INTEGRATION_POINTS", |s| {
            s.to_ascii_lowercase()
        })
        .map(|v| v.into_iter().collect())
        .unwrap_or_else(|| allowlist::default_html_integration_points().clone());
        let mathml_text_integration_points =
            string_list(cfg, "MATHML_TEXT_INTEGRATION_POINTS", |s| s.to_ascii_lowercase())
                .map(|v| v.into_iter().collect())
                .unwrap_or_else(|| allowlist::default_mathml_text_integration_points().clone());

        let resolved = Config {
            allowed_tags,
            allowed_attr,
            allowed_namespaces,
            forbid_tags,
            forbid_attr,
            forbid_contents,
            uri_safe_attr,
            data_uri_tags,
            html_integration_points,
            mathml_text_integration_points,
            custom_elements,
            allow_aria_attr: bool_opt(cfg, "ALLOW_ARIA_ATTR", true),
            allow_data_attr: bool_opt(cfg, "ALLOW_DATA_ATTR", true) && !safe_for_templates,
            allow_unknown_protocols: bool_opt(cfg, "ALLOW_UNKNOWN_PROTOCOLS", false),
            allow_self_close_in_attr: bool_opt(cfg, "ALLOW_SELF_CLOSE_IN_ATTR", true),
            safe_for_templates,
            safe_for_xml: bool_opt(cfg, "SAFE_FOR_XML", true),
            whole_document,
            return_dom: bool_opt(cfg, "RETURN_DOM", false) || return_dom_fragment,
            return_dom_fragment,
            return_trusted_type: bool_opt(cfg, "RETURN_TRUSTED_TYPE", false),
            force_body: bool_opt(cfg, "FORCE_BODY", false),
            sanitize_dom: bool_opt(cfg, "SANITIZE_DOM", true),
            sanitize_named_props: bool_opt(cfg, "SANITIZE_NAMED_PROPS", false),
            keep_content,
            in_place: bool_opt(cfg, "IN_PLACE", false),
            allowed_uri_regexp,
            namespace: str_opt(cfg, "NAMESPACE")
                .filter(|ns| !ns.is_empty())
                .unwrap_or(HTML_NAMESPACE)
                .to_string(),
            parser_media_type,
            trusted_types,
        };

        tracing::debug!(
            allowed_tags = resolved.allowed_tags.len(),
            allowed_attr = resolved.allowed_attr.len(),
            forbid_tags = resolved.forbid_tags.len(),
            forbid_attr = resolved.forbid_attr.len(),
            namespace = %resolved.namespace,
            parser_media_type = resolved.parser_media_type.as_str(),
            "resolved sanitizer configuration"
        );
        Ok(resolved)
    }

    pub fn is_html_namespace(&self) -> bool {
        self.namespace == HTML_NAMESPACE
    }

    pub fn is_xhtml(&self) -> bool {
        self.parser_media_type == ParserMediaType::Xhtml
    }

    pub fn transform_case(&self, name: &str) -> String {
        self.parser_media_type.transform_case(name)
    }

    pub fn tag_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag) && !self.forbid_tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(v: Value) -> Config {
        Config::resolve(&SanitizeOptions::from_value(v)).unwrap()
    }

    #[test]
    fn defaults_follow_the_documented_table() {
        let cfg = resolve(json!({}));
        assert!(cfg.allow_aria_attr && cfg.allow_data_attr && cfg.safe_for_xml);
        assert!(cfg.sanitize_dom && cfg.keep_content && cfg.allow_self_close_in_attr);
        assert!(!cfg.allow_unknown_protocols && !cfg.safe_for_templates && !cfg.in_place);
        assert!(!cfg.return_dom && !cfg.whole_document && !cfg.force_body);
        assert_eq!(cfg.namespace, HTML_NAMESPACE);
        assert_eq!(cfg.parser_media_type, ParserMediaType::Html);
        assert!(cfg.forbid_tags.is_empty());
    }

    #[test]
    fn mistyped_keys_fall_back_to_defaults() {
        let cfg = resolve(json!({
            "KEEP_CONTENT": "no",
            "ALLOWED_TAGS": "b",
            "PARSER_MEDIA_TYPE": "text/plain",
            "SOMETHING_ELSE": 1
        }));
        assert!(cfg.keep_content);
        assert!(cfg.allowed_tags.contains("div"));
        assert_eq!(cfg.parser_media_type, ParserMediaType::Html);
    }

    #[test]
    fn derived_flags_are_applied() {
        let cfg = resolve(json!({
            "SAFE_FOR_TEMPLATES": true,
            "ALLOW_DATA_ATTR": true,
            "RETURN_DOM_FRAGMENT": true,
            "WHOLE_DOCUMENT": true
        }));
        assert!(!cfg.allow_data_attr);
        assert!(cfg.return_dom);
        for t in ["html", "head", "body"] {
            assert!(cfg.allowed_tags.contains(t));
        }
    }

    #[test]
    fn table_implies_tbody_even_when_forbidden() {
        let cfg = resolve(json!({"ALLOWED_TAGS": ["TABLE"], "FORBID_TAGS": ["tbody"]}));
        assert!(cfg.allowed_tags.contains("table"));
        assert!(cfg.tag_allowed("tbody"));
        assert!(cfg.allowed_tags.contains("#text"));
    }

    #[test]
    fn profiles_ignore_explicit_lists() {
        let cfg = resolve(json!({
            "USE_PROFILES": {"svg": true},
            "ALLOWED_TAGS": ["p"],
            "ADD_TAGS": ["foo"]
        }));
        assert!(cfg.allowed_tags.contains("svg"));
        assert!(cfg.allowed_tags.contains("foo"));
        assert!(!cfg.allowed_tags.contains("p"));
        assert!(cfg.allowed_attr.contains("xlink:href"));
        assert!(!cfg.allowed_attr.contains("colspan"));
    }

    #[test]
    fn xhtml_keeps_option_case() {
        let cfg = resolve(json!({
            "PARSER_MEDIA_TYPE": "application/xhtml+xml",
            "ADD_TAGS": ["myElement"]
        }));
        assert!(cfg.allowed_tags.contains("myElement"));
        assert!(!cfg.allowed_tags.contains("myelement"));
    }

    #[test]
    fn invalid_patterns_are_configuration_errors() {
        let err = Config::resolve(&SanitizeOptions::from_value(json!({
            "ALLOWED_URI_REGEXP": "(unclosed"
        })))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPattern {
                option: "ALLOWED_URI_REGEXP",
                ..
            }
        ));

        let err = Config::resolve(&SanitizeOptions::from_value(json!({
            "CUSTOM_ELEMENT_HANDLING": {"tagNameCheck": "["}
        })))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn uri_regexp_string_is_case_insensitive() {
        let cfg = resolve(json!({"ALLOWED_URI_REGEXP": "^https:"}));
        assert!(cfg.allowed_uri_regexp.is_match("HTTPS://x"));
        assert!(!cfg.allowed_uri_regexp.is_match("http://x"));
    }

    #[test]
    fn option_equality_covers_programmatic_extras() {
        let check = NameCheck::predicate(|n| n.starts_with("x-"));
        let a = SanitizeOptions::new().with_tag_name_check(check.clone());
        let b = SanitizeOptions::new().with_tag_name_check(check);
        let c = SanitizeOptions::new().with_tag_name_check(NameCheck::predicate(|_| true));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            SanitizeOptions::new().with("KEEP_CONTENT", false),
            SanitizeOptions::from_value(json!({"KEEP_CONTENT": false}))
        );
    }
}
