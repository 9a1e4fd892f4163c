//! Default vocabularies.
//!
//! Every name is stored lowercase. Per-configuration sets are built by cloning these, never by
//! mutating them.

use std::collections::HashSet;
use std::sync::OnceLock;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

pub const HTML_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "area", "article", "aside", "audio", "b", "bdi", "bdo",
    "big", "blink", "blockquote", "body", "br", "button", "canvas", "caption", "center", "cite",
    "code", "col", "colgroup", "content", "data", "datalist", "dd", "decorator", "del",
    "details", "dfn", "dialog", "dir", "div", "dl", "dt", "element", "em", "fieldset",
    "figcaption", "figure", "font", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hgroup", "hr", "html", "i", "img", "input", "ins", "kbd", "label", "legend", "li",
    "main", "map", "mark", "marquee", "menu", "menuitem", "meter", "nav", "nobr", "ol",
    "optgroup", "option", "output", "p", "picture", "pre", "progress", "q", "rp", "rt", "ruby",
    "s", "samp", "section", "select", "shadow", "small", "source", "spacer", "span", "strike",
    "strong", "style", "sub", "summary", "sup", "table", "tbody", "td", "template", "textarea",
    "tfoot", "th", "thead", "time", "tr", "track", "tt", "u", "ul", "var", "video", "wbr",
];

pub const SVG_TAGS: &[&str] = &[
    "svg", "a", "altglyph", "altglyphdef", "altglyphitem", "animatecolor", "animatemotion",
    "animatetransform", "circle", "clippath", "defs", "desc", "ellipse", "filter", "font", "g",
    "glyph", "glyphref", "hkern", "image", "line", "lineargradient", "marker", "mask", "metadata",
    "mpath", "path", "pattern", "polygon", "polyline", "radialgradient", "rect", "stop", "style",
    "switch", "symbol", "text", "textpath", "title", "tref", "tspan", "view", "vkern",
];

pub const SVG_FILTER_TAGS: &[&str] = &[
    "feblend", "fecolormatrix", "fecomponenttransfer", "fecomposite", "feconvolvematrix",
    "fediffuselighting", "fedisplacementmap", "fedistantlight", "fedropshadow", "feflood",
    "fefunca", "fefuncb", "fefuncg", "fefuncr", "fegaussianblur", "feimage", "femerge",
    "femergenode", "femorphology", "feoffset", "fepointlight", "fespecularlighting",
    "fespotlight", "fetile", "feturbulence",
];

/// SVG elements that exist in the namespace but are never allowed by default. They still count
/// as "SVG" for namespace validation.
pub const SVG_DISALLOWED_TAGS: &[&str] = &[
    "animate", "color-profile", "cursor", "discard", "font-face", "font-face-format",
    "font-face-name", "font-face-src", "font-face-uri", "foreignobject", "hatch", "hatchpath",
    "mesh", "meshgradient", "meshpatch", "meshrow", "missing-glyph", "script", "set",
    "solidcolor", "unknown", "use",
];

pub const MATHML_TAGS: &[&str] = &[
    "math", "menclose", "merror", "mfenced", "mfrac", "mglyph", "mi", "mlabeledtr",
    "mmultiscripts", "mn", "mo", "mover", "mpadded", "mphantom", "mroot", "mrow", "ms", "mspace",
    "msqrt", "mstyle", "msub", "msup", "msubsup", "mtable", "mtd", "mtext", "mtr", "munder",
    "munderover", "mprescripts",
];

pub const MATHML_DISALLOWED_TAGS: &[&str] = &[
    "maction", "maligngroup", "malignmark", "mlongdiv", "mscarries", "mscarry", "msgroup",
    "mstack", "msline", "msrow", "semantics", "annotation", "annotation-xml", "mprescripts",
    "none",
];

pub const TEXT_TAGS: &[&str] = &["#text"];

pub const HTML_ATTRS: &[&str] = &[
    "accept", "action", "align", "alt", "autocapitalize", "autocomplete",
    "autopictureinpicture", "autoplay", "background", "bgcolor", "border", "capture",
    "cellpadding", "cellspacing", "checked", "cite", "class", "clear", "color", "cols",
    "colspan", "controls", "controlslist", "coords", "crossorigin", "datetime", "decoding",
    "default", "dir", "disabled", "disablepictureinpicture", "disableremoteplayback", "download",
    "draggable", "enctype", "enterkeyhint", "face", "for", "headers", "height", "hidden", "high",
    "href", "hreflang", "id", "inputmode", "integrity", "ismap", "kind", "label", "lang", "list",
    "loading", "loop", "low", "max", "maxlength", "media", "method", "min", "minlength",
    "multiple", "muted", "name", "nonce", "noshade", "novalidate", "nowrap", "open", "optimum",
    "pattern", "placeholder", "playsinline", "popover", "popovertarget", "popovertargetaction",
    "poster", "preload", "pubdate", "radiogroup", "readonly", "rel", "required", "rev",
    "reversed", "role", "rows", "rowspan", "spellcheck", "scope", "selected", "shape", "size",
    "sizes", "span", "srclang", "start", "src", "srcset", "step", "style", "summary", "tabindex",
    "title", "translate", "type", "usemap", "valign", "value", "width", "wrap", "xmlns", "slot",
];

pub const SVG_ATTRS: &[&str] = &[
    "accent-height", "accumulate", "additive", "alignment-baseline", "amplitude", "ascent",
    "attributename", "attributetype", "azimuth", "basefrequency", "baseline-shift", "begin",
    "bias", "by", "class", "clip", "clippathunits", "clip-path", "clip-rule", "color",
    "color-interpolation", "color-interpolation-filters", "color-profile", "color-rendering",
    "cx", "cy", "d", "dx", "dy", "diffuseconstant", "direction", "display", "divisor", "dur",
    "edgemode", "elevation", "end", "exponent", "fill", "fill-opacity", "fill-rule", "filter",
    "filterunits", "flood-color", "flood-opacity", "font-family", "font-size",
    "font-size-adjust", "font-stretch", "font-style", "font-variant", "font-weight", "fx", "fy",
    "g1", "g2", "glyph-name", "glyphref", "gradientunits", "gradienttransform", "height", "href",
    "id", "image-rendering", "in", "in2", "intercept", "k", "k1", "k2", "k3", "k4", "kerning",
    "keypoints", "keysplines", "keytimes", "lang", "lengthadjust", "letter-spacing",
    "kernelmatrix", "kernelunitlength", "lighting-color", "local", "marker-end", "marker-mid",
    "marker-start", "markerheight", "markerunits", "markerwidth", "maskcontentunits",
    "maskunits", "max", "mask", "media", "method", "mode", "min", "name", "numoctaves", "offset",
    "operator", "opacity", "order", "orient", "orientation", "origin", "overflow",
    "paint-order", "path", "pathlength", "patterncontentunits", "patterntransform",
    "patternunits", "points", "preservealpha", "preserveaspectratio", "primitiveunits", "r",
    "rx", "ry", "radius", "refx", "refy", "repeatcount", "repeatdur", "restart", "result",
    "rotate", "scale", "seed", "shape-rendering", "slope", "specularconstant",
    "specularexponent", "spreadmethod", "startoffset", "stddeviation", "stitchtiles",
    "stop-color", "stop-opacity", "stroke-dasharray", "stroke-dashoffset", "stroke-linecap",
    "stroke-linejoin", "stroke-miterlimit", "stroke-opacity", "stroke", "stroke-width", "style",
    "surfacescale", "systemlanguage", "tabindex", "tablevalues", "targetx", "targety",
    "transform", "transform-origin", "text-anchor", "text-decoration", "text-rendering",
    "textlength", "type", "u1", "u2", "unicode", "values", "viewbox", "visibility", "version",
    "vert-adv-y", "vert-origin-x", "vert-origin-y", "width", "word-spacing", "wrap",
    "writing-mode", "xchannelselector", "ychannelselector", "x", "x1", "x2", "xmlns", "y", "y1",
    "y2", "z", "zoomandpan",
];

pub const MATHML_ATTRS: &[&str] = &[
    "accent", "accentunder", "align", "bevelled", "close", "columnsalign", "columnlines",
    "columnspan", "denomalign", "depth", "dir", "display", "displaystyle", "encoding", "fence",
    "frame", "height", "href", "id", "largeop", "length", "linethickness", "lspace", "lquote",
    "mathbackground", "mathcolor", "mathsize", "mathvariant", "maxsize", "minsize",
    "movablelimits", "notation", "numalign", "open", "rowalign", "rowlines", "rowspacing",
    "rowspan", "rspace", "rquote", "scriptlevel", "scriptminsize", "scriptsizemultiplier",
    "selection", "separator", "separators", "stretchy", "subscriptshift", "supscriptshift",
    "symmetric", "voffset", "width", "xmlns",
];

pub const XML_ATTRS: &[&str] = &["xlink:href", "xml:id", "xlink:title", "xml:space", "xmlns:xlink"];

/// Attributes whose values are never URIs, so they skip URI validation.
pub const URI_SAFE_ATTRS: &[&str] = &[
    "alt", "class", "for", "id", "label", "name", "pattern", "placeholder", "role", "summary",
    "title", "value", "style", "xmlns",
];

pub const DATA_URI_TAGS: &[&str] = &["audio", "video", "img", "source", "image", "track"];

/// Tags whose content is dropped along with the tag even when content is kept otherwise.
pub const FORBID_CONTENTS: &[&str] = &[
    "annotation-xml", "audio", "colgroup", "desc", "foreignobject", "head", "iframe", "math",
    "mi", "mn", "mo", "ms", "mtext", "noembed", "noframes", "noscript", "plaintext", "script",
    "style", "svg", "template", "thead", "title", "video", "xmp",
];

pub const MATHML_TEXT_INTEGRATION_POINTS: &[&str] = &["mi", "mo", "mn", "ms", "mtext"];

pub const HTML_INTEGRATION_POINTS: &[&str] = &["foreignobject", "desc", "title", "annotation-xml"];

/// Tags shared by the HTML and SVG vocabularies.
pub const COMMON_SVG_AND_HTML_ELEMENTS: &[&str] = &["title", "style", "font", "a", "script"];

/// Members of `HTMLFormElement` the walker relies on. A named form control with one of these
/// names shadows the member in a browser.
pub const FORM_SHADOWED_MEMBERS: &[&str] = &[
    "nodeName", "textContent", "removeChild", "attributes", "removeAttribute", "setAttribute",
    "namespaceURI", "insertBefore", "hasChildNodes",
];

/// Form-associated elements that register named properties on their form.
pub const FORM_NAMED_CONTROLS: &[&str] = &[
    "button", "fieldset", "input", "object", "output", "select", "textarea", "img",
];

/// Property names present on `document` or an `HTMLFormElement`. `id`/`name` values that
/// collide with one of these would clobber the built-in.
pub const DOCUMENT_AND_FORM_PROPERTIES: &[&str] = &[
    // document
    "activeElement", "adoptNode", "alinkColor", "all", "anchors", "append", "applets", "bgColor",
    "body", "captureEvents", "caretRangeFromPoint", "characterSet", "charset", "childElementCount",
    "children", "clear", "close", "compatMode", "contentType", "cookie", "createAttribute",
    "createComment", "createDocumentFragment", "createElement", "createElementNS",
    "createEvent", "createNodeIterator", "createRange", "createTextNode", "createTreeWalker",
    "currentScript", "defaultView", "designMode", "dir", "doctype", "documentElement",
    "documentURI", "domain", "elementFromPoint", "embeds", "evaluate", "execCommand",
    "exitFullscreen", "fgColor", "firstElementChild", "fonts", "forms", "fullscreenElement",
    "getElementById", "getElementsByClassName", "getElementsByName", "getElementsByTagName",
    "getSelection", "hasFocus", "head", "hidden", "images", "implementation", "importNode",
    "inputEncoding", "lastElementChild", "lastModified", "linkColor", "links", "location",
    "open", "plugins", "prepend", "querySelector", "querySelectorAll", "readyState",
    "referrer", "releaseEvents", "scripts", "scrollingElement", "styleSheets", "title", "URL",
    "visibilityState", "vlinkColor", "write", "writeln",
    // HTMLFormElement
    "acceptCharset", "action", "autocomplete", "checkValidity", "elements", "encoding",
    "enctype", "length", "method", "name", "noValidate", "reportValidity", "requestSubmit",
    "reset", "submit", "target",
    // Node / Element members shared by both
    "appendChild", "attributes", "childNodes", "cloneNode", "firstChild", "getAttribute",
    "hasAttribute", "hasChildNodes", "id", "innerHTML", "insertBefore", "lastChild",
    "namespaceURI", "nextSibling", "nodeName", "nodeType", "nodeValue", "ownerDocument",
    "parentElement", "parentNode", "previousSibling", "removeAttribute", "removeChild",
    "replaceChild", "setAttribute", "textContent", "addEventListener", "removeEventListener",
    "dispatchEvent",
    // inherited from Object.prototype
    "__proto__", "constructor", "hasOwnProperty", "isPrototypeOf", "propertyIsEnumerable",
    "toLocaleString", "toString", "valueOf",
];

/// Builds a lowercase set from one or more tables.
pub fn set_of(tables: &[&[&str]]) -> HashSet<String> {
    tables
        .iter()
        .flat_map(|t| t.iter())
        .map(|s| s.to_ascii_lowercase())
        .collect()
}

macro_rules! lazy_set {
    ($(#[$meta:meta])* $name:ident => [$($table:expr),+ $(,)?]) => {
        $(#[$meta])*
        pub fn $name() -> &'static HashSet<String> {
            static SET: OnceLock<HashSet<String>> = OnceLock::new();
            SET.get_or_init(|| set_of(&[$($table),+]))
        }
    };
}

lazy_set!(
    /// HTML + SVG + SVG filters + MathML + `#text`.
    default_allowed_tags => [HTML_TAGS, SVG_TAGS, SVG_FILTER_TAGS, MATHML_TAGS, TEXT_TAGS]
);
lazy_set!(default_allowed_attr => [HTML_ATTRS, SVG_ATTRS, MATHML_ATTRS, XML_ATTRS]);
lazy_set!(default_uri_safe_attr => [URI_SAFE_ATTRS]);
lazy_set!(default_data_uri_tags => [DATA_URI_TAGS]);
lazy_set!(default_forbid_contents => [FORBID_CONTENTS]);
lazy_set!(all_svg_tags => [SVG_TAGS, SVG_FILTER_TAGS, SVG_DISALLOWED_TAGS]);
lazy_set!(all_mathml_tags => [MATHML_TAGS, MATHML_DISALLOWED_TAGS]);
lazy_set!(common_svg_and_html_elements => [COMMON_SVG_AND_HTML_ELEMENTS]);
lazy_set!(default_html_integration_points => [HTML_INTEGRATION_POINTS]);
lazy_set!(default_mathml_text_integration_points => [MATHML_TEXT_INTEGRATION_POINTS]);
lazy_set!(form_named_controls => [FORM_NAMED_CONTROLS]);

/// Case-sensitive: property lookup on `document` is case-sensitive.
pub fn document_and_form_properties() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| DOCUMENT_AND_FORM_PROPERTIES.iter().copied().collect())
}

/// Case-sensitive, like named-property lookup on a form.
pub fn form_shadowed_members() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| FORM_SHADOWED_MEMBERS.iter().copied().collect())
}

pub fn default_allowed_namespaces() -> &'static HashSet<String> {
    static SET: OnceLock<HashSet<String>> = OnceLock::new();
    SET.get_or_init(|| {
        [HTML_NAMESPACE, SVG_NAMESPACE, MATHML_NAMESPACE]
            .iter()
            .map(|s| s.to_string())
            .collect()
    })
}
