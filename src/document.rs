use serde::{Deserialize, Serialize};

const BODY_OPEN: &str = "<text xml:space=\"preserve\">";
const BODY_CLOSE: &str = "</text>";

/// Document is one page record pulled out of a dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub raw_text: String,
}

impl Document {
    pub fn new(id: String, title: String, raw_text: String) -> Self {
        Self {
            id,
            title,
            raw_text,
        }
    }

    /// Parse one `<page>` record.
    ///
    /// Returns `None` when the record carries no `<id>`; such records cannot be
    /// attributed to an article and are skipped by the caller. Missing `title`
    /// or body fields resolve to empty strings.
    pub fn parse(record: &str) -> Option<Self> {
        let id = parse_tag(record, "id").trim().to_string();
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id,
            title: parse_tag(record, "title").to_string(),
            raw_text: parse_body(record).to_string(),
        })
    }

    /// Get the full indexable markup (title, newline, body)
    pub fn indexable_text(&self) -> String {
        format!("{}\n{}", self.title, self.raw_text)
    }
}

/// Text between the first `<tag>` and the first `</tag>` after it.
///
/// This is a plain substring scan, not an XML parse: nested or repeated tags
/// are not interpreted. Any missing marker yields an empty string.
pub fn parse_tag<'a>(record: &'a str, tag: &str) -> &'a str {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    between(record, &open, &close)
}

/// Body text bounded by the preserve-whitespace text tag.
///
/// Newer dumps put extra attributes on the text tag
/// (`<text bytes="42" xml:space="preserve">`), so after the exact form misses
/// we fall back to the first `<text ...>` open tag. A self-closing text tag
/// has no body.
pub fn parse_body(record: &str) -> &str {
    if record.contains(BODY_OPEN) {
        return between(record, BODY_OPEN, BODY_CLOSE);
    }

    let Some(start) = find_text_open(record) else {
        return "";
    };
    let Some(gt) = record[start..].find('>') else {
        return "";
    };
    let tag_end = start + gt;
    if record[..tag_end].ends_with('/') {
        return "";
    }

    let body_start = tag_end + 1;
    match record[body_start..].find(BODY_CLOSE) {
        Some(len) => &record[body_start..body_start + len],
        None => "",
    }
}

fn find_text_open(record: &str) -> Option<usize> {
    record.match_indices("<text").map(|(i, _)| i).find(|&i| {
        record[i + 5..]
            .chars()
            .next()
            .map_or(false, |c| c == '>' || c.is_whitespace())
    })
}

fn between<'a>(record: &'a str, open: &str, close: &str) -> &'a str {
    let Some(start) = record.find(open) else {
        return "";
    };
    let start = start + open.len();
    match record[start..].find(close) {
        Some(len) => &record[start..start + len],
        None => "",
    }
}
