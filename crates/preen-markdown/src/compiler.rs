use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::slug::Slugger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkdownOptions {
    /// Tables, strikethrough, task lists and footnotes.
    pub gfm: bool,
    /// Single newlines become `<br>`.
    pub breaks: bool,
    /// Report bad input as an error paragraph instead of failing.
    pub silent: bool,
    /// Curly quotes, dashes and ellipses.
    pub smartypants: bool,
    /// Give headings an `id` slugged from their text.
    pub header_ids: bool,
    /// Prepended to every heading id.
    pub header_prefix: String,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            breaks: false,
            silent: false,
            smartypants: false,
            header_ids: false,
            header_prefix: String::new(),
        }
    }
}

type Extension = Box<dyn Fn(&str) -> String>;
type EventWalker = Box<dyn Fn(&mut Event<'_>)>;

/// Deterministic Markdown to HTML. The output is untrusted markup.
#[derive(Default)]
pub struct MarkdownCompiler {
    options: MarkdownOptions,
    preprocess: Vec<Extension>,
    walkers: Vec<EventWalker>,
    postprocess: Vec<Extension>,
}

impl std::fmt::Debug for MarkdownCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownCompiler")
            .field("options", &self.options)
            .field("preprocess", &self.preprocess.len())
            .field("walkers", &self.walkers.len())
            .field("postprocess", &self.postprocess.len())
            .finish()
    }
}

impl MarkdownCompiler {
    pub fn new(options: MarkdownOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Adds a source rewrite run before parsing, after those already registered.
    pub fn with_preprocess(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.preprocess.push(Box::new(f));
        self
    }

    /// Adds a visitor that may rewrite each parsed event before rendering. Visitors run in
    /// registration order on every event, after `breaks` and before heading ids are assigned.
    pub fn with_walk_events(mut self, f: impl Fn(&mut Event<'_>) + 'static) -> Self {
        self.walkers.push(Box::new(f));
        self
    }

    /// Adds an HTML rewrite run on the rendered output.
    pub fn with_postprocess(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.postprocess.push(Box::new(f));
        self
    }

    pub fn compile(&self, markdown: &str) -> String {
        self.render(markdown, false)
    }

    /// Compiles a snippet without wrapping it in a paragraph. Block syntax still renders.
    pub fn compile_inline(&self, markdown: &str) -> String {
        self.render(markdown, true)
    }

    fn render(&self, markdown: &str, inline: bool) -> String {
        let mut source = markdown.to_string();
        for f in &self.preprocess {
            source = f(&source);
        }

        let mut events = self.events(&source);
        if inline {
            events.retain(|ev| {
                !matches!(ev, Event::Start(Tag::Paragraph) | Event::End(TagEnd::Paragraph))
            });
        }
        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());

        for f in &self.postprocess {
            out = f(&out);
        }
        tracing::trace!(input = markdown.len(), output = out.len(), inline, "compiled markdown");
        out
    }

    fn events<'s>(&self, source: &'s str) -> Vec<Event<'s>> {
        let mut parser_options = Options::empty();
        if self.options.gfm {
            parser_options |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES;
        }
        if self.options.smartypants {
            parser_options |= Options::ENABLE_SMART_PUNCTUATION;
        }

        let mut events: Vec<Event<'s>> = Parser::new_ext(source, parser_options).collect();
        for event in &mut events {
            if self.options.breaks && matches!(event, Event::SoftBreak) {
                *event = Event::HardBreak;
            }
            for walk in &self.walkers {
                walk(event);
            }
        }
        if self.options.header_ids {
            self.assign_heading_ids(&mut events);
        }
        events
    }

    /// Headings without an explicit id get `header_prefix` plus a slug of their plain text.
    fn assign_heading_ids(&self, events: &mut [Event<'_>]) {
        let mut slugger = Slugger::default();
        let mut open: Option<(usize, String)> = None;
        for i in 0..events.len() {
            if let Event::End(TagEnd::Heading(_)) = events[i] {
                if let Some((start, text)) = open.take() {
                    let slug = format!("{}{}", self.options.header_prefix, slugger.slug(&text));
                    if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                        *id = Some(slug.into());
                    }
                }
                continue;
            }
            match &events[i] {
                Event::Start(Tag::Heading { id: None, .. }) => open = Some((i, String::new())),
                Event::Text(t) | Event::Code(t) | Event::InlineHtml(t) => {
                    if let Some((_, text)) = &mut open {
                        text.push_str(t);
                    }
                }
                _ => {}
            }
        }
    }

    /// Compiles loosely typed input. Anything but a string is an input error, or an escaped
    /// error report in silent mode.
    pub fn compile_value(&self, input: &Value) -> Result<String> {
        let kind = match input {
            Value::String(s) => return Ok(self.compile(s)),
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        let err = Error::NotAString { kind };
        if self.options.silent {
            tracing::debug!(error = %err, "markdown input rejected");
            return Ok(format!(
                "<p>An error occurred:</p>\n<pre>{}</pre>\n",
                escape_html(&err.to_string())
            ));
        }
        Err(err)
    }
}

/// Escapes text for use inside an element or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
