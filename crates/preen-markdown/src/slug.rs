//! Heading anchors in the style of GitHub: lowercase, punctuation stripped, spaces to dashes,
//! and a `-N` suffix on repeats.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<[!/a-z].*?>").expect("valid regex"))
}

fn punctuation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r##"[\x{2000}-\x{206F}\x{2E00}-\x{2E7F}\\'!"#$%&()*+,./:;<=>?@\[\]^`{|}~]"##)
            .expect("valid regex")
    })
}

/// Hands out unique slugs for one document.
#[derive(Debug, Default)]
pub(crate) struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn slug(&mut self, text: &str) -> String {
        let base = serialize(text);
        let mut slug = base.clone();
        let mut repeats = 0;
        if let Some(&count) = self.seen.get(&base) {
            repeats = count;
            loop {
                repeats += 1;
                slug = format!("{base}-{repeats}");
                if !self.seen.contains_key(&slug) {
                    break;
                }
            }
        }
        self.seen.insert(base, repeats);
        self.seen.insert(slug.clone(), 0);
        slug
    }
}

fn serialize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let untagged = tag_regex().replace_all(lowered.trim(), "");
    punctuation_regex()
        .replace_all(&untagged, "")
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}
