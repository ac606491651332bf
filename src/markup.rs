//! Wiki markup to plain text.
//!
//! The cleanup runs in a fixed order because later patterns rely on earlier
//! ones having fired: inter-language links are cut before rendering, entities
//! are decoded before `<ref>` and comment blocks can be seen, and comments go
//! before bare URLs so that `<!-- http://foo.com/-->` does not lose its
//! terminator to the URL pattern.

use lazy_static::lazy_static;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

lazy_static! {
    static ref LANG_LINK: Regex = Regex::new(r"\[\[[a-z\-]+:[^\]]+\]\]").expect("valid regex");
    static ref REF: Regex = Regex::new(r"(?s)<ref(?:\s(?:[^>]*[^/>])?)?>.*?</ref>").expect("valid regex");
    static ref HTML_COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").expect("valid regex");
    static ref URL: Regex = Regex::new(r"https?://[^\s<]+").expect("valid regex");
    static ref TEMPLATE: Regex = Regex::new(r"\{\{[^{}]*\}\}").expect("valid regex");
    static ref HTML_TAG: Regex = Regex::new(r"<[^!][^>]*>").expect("valid regex");
    static ref ENTITY: Regex =
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").expect("valid regex");

    // Renderer patterns
    static ref MEDIA_LINK: Regex = Regex::new(
        r"\[\[(?i:file|image|category):[^\[\]]*(?:\[\[[^\[\]]*\]\][^\[\]]*)*\]\]"
    )
    .expect("valid regex");
    static ref INTERNAL_LINK: Regex =
        Regex::new(r"\[\[(?:[^\[\]|]*\|)?([^\[\]]*)\]\]").expect("valid regex");
    static ref EXTERNAL_LINK: Regex =
        Regex::new(r"\[(?:https?:)?//[^\s\]]+(?:\s+([^\]]*))?\]").expect("valid regex");
    static ref EMPHASIS: Regex = Regex::new(r"'{2,}").expect("valid regex");
    static ref HEADING: Regex =
        Regex::new(r"(?m)^[ \t]*=+[ \t]*(.*?)[ \t]*=+[ \t]*$").expect("valid regex");
    static ref LIST_MARKER: Regex = Regex::new(r"(?m)^[*#:;]+[ \t]*").expect("valid regex");
    static ref TABLE_ROW: Regex =
        Regex::new(r"(?m)^[ \t]*(?:\{\||\|\}|\|-|\|\+).*$").expect("valid regex");
    static ref TABLE_CELL: Regex = Regex::new(r"(?m)^[ \t]*[|!]|\|\||!!").expect("valid regex");
    static ref RULE: Regex = Regex::new(r"(?m)^-{4,}").expect("valid regex");
    static ref MAGIC_WORD: Regex = Regex::new(r"__[A-Z]+__").expect("valid regex");
}

/// Renders wiki markup to plain text.
///
/// A renderer only has to deal with wiki syntax. HTML tags, comments, bare
/// URLs and leftover templates are removed by [`MarkupStripper`] afterwards.
pub trait MarkupRenderer: Send + Sync {
    fn render(&self, markup: &str) -> String;
}

/// Regex based MediaWiki renderer. Images and titles render as nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct WikiTextRenderer;

impl MarkupRenderer for WikiTextRenderer {
    fn render(&self, markup: &str) -> String {
        let text = MEDIA_LINK.replace_all(markup, " ");
        let text = INTERNAL_LINK.replace_all(&text, "${1}");
        let text = EXTERNAL_LINK.replace_all(&text, "${1}");
        let text = EMPHASIS.replace_all(&text, "");
        let text = HEADING.replace_all(&text, "${1}");
        let text = TABLE_ROW.replace_all(&text, " ");
        let text = TABLE_CELL.replace_all(&text, " ");
        let text = LIST_MARKER.replace_all(&text, "");
        let text = RULE.replace_all(&text, " ");
        MAGIC_WORD.replace_all(&text, " ").into_owned()
    }
}

pub struct MarkupStripper {
    renderer: Box<dyn MarkupRenderer>,
}

impl MarkupStripper {
    pub fn new() -> Self {
        Self::with_renderer(WikiTextRenderer)
    }

    pub fn with_renderer<R: MarkupRenderer + 'static>(renderer: R) -> Self {
        Self {
            renderer: Box::new(renderer),
        }
    }

    /// Convert raw markup to plain text. Never fails; text that matches no
    /// pattern passes through unchanged.
    pub fn strip(&self, markup: &str) -> String {
        let text = LANG_LINK.replace_all(markup, " ");
        let text = self.renderer.render(&text);

        // Some entities arrive double encoded (`&amp;nbsp;`)
        let text = unescape_html(&unescape_html(&text));

        let text = REF.replace_all(&text, " ");
        let text = HTML_COMMENT.replace_all(&text, " ");
        let text = URL.replace_all(&text, " ");
        let text = strip_templates(&text);
        HTML_TAG.replace_all(&text, " ").into_owned()
    }
}

impl Default for MarkupStripper {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove `{{...}}` blocks innermost first until none are left.
fn strip_templates(text: &str) -> String {
    let mut text = text.to_string();
    while TEMPLATE.is_match(&text) {
        text = TEMPLATE.replace_all(&text, " ").into_owned();
    }
    text
}

/// Decode named and numeric character references. Unknown names and invalid
/// code points are left verbatim.
pub fn unescape_html(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            resolve_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_html5_entity(name).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_strip_link_ref_url_comment() {
        let stripper = MarkupStripper::new();
        let plain = stripper.strip("[[en:Foo]]Hello <ref>cite</ref> world http://x.com <!--c-->");
        assert_eq!(words(&plain), vec!["Hello", "world"]);
    }

    #[test]
    fn test_ref_attributes_may_contain_slashes() {
        let stripper = MarkupStripper::new();
        let plain = stripper.strip("Hello <ref name=\"NYT/2004\">cite</ref> world");
        assert_eq!(words(&plain), vec!["Hello", "world"]);

        let plain = stripper.strip("a <ref >one</ref> b <ref name=\"x\"/> c <ref>two</ref> d");
        assert_eq!(words(&plain), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_comment_before_url() {
        let stripper = MarkupStripper::new();
        let plain = stripper.strip("a <!-- http://foo.com/--> b");
        assert_eq!(words(&plain), vec!["a", "b"]);
    }

    #[test]
    fn test_escaped_markup_is_stripped_after_decoding() {
        let stripper = MarkupStripper::new();
        let plain = stripper.strip("x &lt;ref name=\"a\"&gt;cite&lt;/ref&gt; y&amp;nbsp;z");
        assert!(plain.contains("y\u{a0}z"));
        assert_eq!(words(&plain), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_nested_templates() {
        let stripper = MarkupStripper::new();
        let plain = stripper.strip("before {{Infobox|a={{small|b}}|c=d}} after");
        assert_eq!(words(&plain), vec!["before", "after"]);
    }

    #[test]
    fn test_render_wiki_syntax() {
        let renderer = WikiTextRenderer;
        let plain = renderer.render(
            "== History ==\n'''Cats''' are [[Felidae|felids]] and [[mammal]]s.\n[[File:Cat.jpg|thumb|A [[cat]]]]\n* see [http://x.org the site]",
        );
        assert_eq!(
            words(&plain),
            vec!["History", "Cats", "are", "felids", "and", "mammals.", "see", "the", "site"]
        );
    }

    #[test]
    fn test_html_tags_except_bang_forms() {
        let stripper = MarkupStripper::new();
        assert_eq!(words(&stripper.strip("a<br/>b <span class=\"x\">c</span>")), vec!["a", "b", "c"]);
        assert!(stripper.strip("<!DOCTYPE html>").contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_unescape_unknown_entities_untouched() {
        assert_eq!(unescape_html("AT&T &bogus; &#65;&#x42;&amp;"), "AT&T &bogus; AB&");
        assert_eq!(unescape_html("&#1114112;"), "&#1114112;");
    }

    #[test]
    fn test_plain_text_passes_through() {
        let stripper = MarkupStripper::new();
        assert_eq!(stripper.strip("The Cat sat."), "The Cat sat.");
    }
}
