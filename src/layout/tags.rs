//! Splits tagged markup such as `"<b>bold</b> and <a href='x'>linked</a>"` into
//! [StyledRun]s.
//!
//! The markup is deliberately forgiving: anything that doesn't form a balanced
//! open/close pair is kept as literal text instead of failing.

use crate::layout::config::FlowConfig;
use crate::units::Pt;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::collections::BTreeMap;

/// Pseudo-tag carrying a tab character. Reserved; styles can't be registered under it.
pub const TAB_TAG: &str = "TTAGS";

/// Pseudo-tag carrying a paragraph-fill marker
pub const PARAGRAPH_TAG: &str = "PPARG";

/// Tag of the style every flow falls back to
pub const DEFAULT_TAG: &str = "DEFAULT";

/// Attributes given on an opening tag, e.g. `href` in `<a href="https://…">`.
/// Keys are lower-cased.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.into().to_ascii_lowercase(), value.into());
    }

    /// Target of the run when it is drawn as a link (`href`)
    pub fn link(&self) -> Option<&str> {
        self.get("href").filter(|href| !href.is_empty())
    }

    /// How far the run is raised above the baseline (`ypos`, in points)
    pub fn vertical_offset(&self) -> Pt {
        self.get("ypos")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .map(Pt)
            .unwrap_or_default()
    }

    /// Width the run asks to occupy (`size`, in points). A following paragraph-fill
    /// marker pads the line out to this width.
    pub fn requested_size(&self) -> Option<Pt> {
        self.get("size")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .map(Pt)
    }

    /// Layer `inner` on top of these attributes, inner values winning
    fn overlaid(&self, inner: &Attributes) -> Attributes {
        let mut merged = self.clone();
        for (k, v) in inner.0.iter() {
            merged.0.insert(k.clone(), v.clone());
        }
        merged
    }
}

/// A maximal stretch of text sharing one tag and one attribute set
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StyledRun {
    pub text: String,
    /// Upper-cased tag name, empty for untagged text
    pub tag: String,
    pub attributes: Attributes,
}

impl StyledRun {
    pub fn new<T: Into<String>, G: Into<String>>(text: T, tag: G) -> StyledRun {
        StyledRun {
            text: text.into(),
            tag: tag.into(),
            attributes: Attributes::default(),
        }
    }

    pub fn is_paragraph_fill(&self) -> bool {
        self.tag == PARAGRAPH_TAG
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Text(&'a str),
    Tag(&'a str),
}

#[derive(Debug, Clone)]
struct OpenTag {
    name: String,
    attributes: Attributes,
}

/// Turns markup into [StyledRun]s
///
/// ```
/// use pdf_flow::layout::TagParser;
///
/// let runs = TagParser::default().parse("<h1>A</h1>B");
/// assert_eq!(runs.len(), 2);
/// assert_eq!((runs[0].text.as_str(), runs[0].tag.as_str()), ("A", "H1"));
/// assert_eq!((runs[1].text.as_str(), runs[1].tag.as_str()), ("B", ""));
/// ```
#[derive(Debug, Clone)]
pub struct TagParser {
    max_tag_len: usize,
    paragraph_marker: String,
}

impl Default for TagParser {
    fn default() -> Self {
        TagParser::new(&FlowConfig::default())
    }
}

impl TagParser {
    pub fn new(config: &FlowConfig) -> TagParser {
        TagParser {
            max_tag_len: config.max_tag_len,
            paragraph_marker: config.paragraph_marker.clone(),
        }
    }

    pub fn parse(&self, markup: &str) -> Vec<StyledRun> {
        let markup = markup.replace('\r', "");
        let tokens = tokenize(&markup);

        let mut stack: Vec<OpenTag> = Vec::new();
        let mut runs: Vec<StyledRun> = Vec::new();

        for (ti, token) in tokens.iter().enumerate() {
            let literal = match *token {
                Token::Text(text) => text,
                Token::Tag(raw) => {
                    if let Some(open) = self.opening_tag(raw) {
                        let already_open = stack.iter().any(|t| t.name == open.name);
                        if !already_open && self.closes_later(&tokens[ti + 1..], &open.name) {
                            stack.push(open);
                            continue;
                        }
                        log::debug!("treating unbalanced tag {raw:?} as text");
                    } else if let Some(name) = self.closing_tag(raw) {
                        if let Some(pos) = stack.iter().rposition(|t| t.name == name) {
                            stack.truncate(pos);
                            continue;
                        }
                        log::debug!("treating unmatched closing tag {raw:?} as text");
                    }
                    raw
                }
            };

            let (tag, attributes) = match stack.last() {
                Some(top) => (
                    top.name.clone(),
                    stack
                        .iter()
                        .fold(Attributes::default(), |acc, t| acc.overlaid(&t.attributes)),
                ),
                None => (String::new(), Attributes::default()),
            };
            self.push_text(&mut runs, literal, &tag, &attributes);
        }

        let mut runs = merge_runs(runs);
        for run in runs.iter_mut() {
            if run.text.contains('&') {
                run.text = decode_entities(&run.text);
            }
        }
        runs
    }

    /// Emits `text` with tabs and paragraph markers split out into their own
    /// reserved runs
    fn push_text(
        &self,
        runs: &mut Vec<StyledRun>,
        text: &str,
        tag: &str,
        attributes: &Attributes,
    ) {
        let marker = self.paragraph_marker.as_str();
        let mut rest = text;
        while !rest.is_empty() {
            let tab = rest.find('\t');
            let paragraph = if marker.is_empty() { None } else { rest.find(marker) };

            let (at, reserved, skip) = match (tab, paragraph) {
                (Some(t), Some(p)) if p < t => (p, PARAGRAPH_TAG, marker.len()),
                (Some(t), _) => (t, TAB_TAG, 1),
                (None, Some(p)) => (p, PARAGRAPH_TAG, marker.len()),
                (None, None) => (rest.len(), "", 0),
            };

            if at > 0 {
                runs.push(StyledRun {
                    text: rest[..at].to_string(),
                    tag: tag.to_string(),
                    attributes: attributes.clone(),
                });
            }
            if skip == 0 {
                break;
            }
            runs.push(StyledRun::new("\t", reserved));
            rest = &rest[at + skip..];
        }
    }

    /// Parses `<name attr="value" …>`, returning `None` if `raw` isn't shaped
    /// like an opening tag
    fn opening_tag(&self, raw: &str) -> Option<OpenTag> {
        let inner = raw.strip_prefix('<')?.strip_suffix('>')?;
        let name_len = inner
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(inner.len());
        if name_len == 0 || name_len > self.max_tag_len {
            return None;
        }
        let (name, rest) = inner.split_at(name_len);
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }

        Some(OpenTag {
            name: name.to_ascii_uppercase(),
            attributes: parse_attributes(rest),
        })
    }

    /// Parses `</name>`, returning the upper-cased name
    fn closing_tag(&self, raw: &str) -> Option<String> {
        let name = raw.strip_prefix("</")?.strip_suffix('>')?;
        let valid = !name.is_empty()
            && name.len() <= self.max_tag_len
            && name.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| name.to_ascii_uppercase())
    }

    fn closes_later(&self, tokens: &[Token<'_>], name: &str) -> bool {
        tokens.iter().any(|token| match token {
            Token::Tag(raw) => self.closing_tag(raw).as_deref() == Some(name),
            Token::Text(_) => false,
        })
    }
}

/// Splits markup on every shortest `<…>` span that doesn't cross a newline
fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut search = 0;

    while let Some(offset) = markup[search..].find('<') {
        let open = search + offset;
        let close = markup[open..]
            .find(['>', '\n'])
            .map(|i| open + i)
            .filter(|&i| markup.as_bytes()[i] == b'>');

        match close {
            Some(close) => {
                if open > text_start {
                    tokens.push(Token::Text(&markup[text_start..open]));
                }
                tokens.push(Token::Tag(&markup[open..=close]));
                text_start = close + 1;
                search = close + 1;
            }
            None => search = open + 1,
        }
    }

    if text_start < markup.len() {
        tokens.push(Token::Text(&markup[text_start..]));
    }
    tokens
}

/// Collects `key="value"` and `key='value'` pairs, ignoring anything else
fn parse_attributes(s: &str) -> Attributes {
    let mut attributes = Attributes::default();
    let mut rest = s;

    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].split_whitespace().last().unwrap_or_default();
        let after = &rest[eq + 1..];
        let quote = match after.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                rest = after;
                continue;
            }
        };
        let body = &after[1..];
        let Some(end) = body.find(quote) else {
            break;
        };
        if !key.is_empty() {
            attributes.insert(key, &body[..end]);
        }
        rest = &body[end + 1..];
    }

    attributes
}

/// Decodes character references (`&amp;`, `&eacute;`, `&#65;`) one at a time.
/// Anything that isn't a terminated, known reference stays as written.
fn decode_entities(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let entity = candidate
            .find(';')
            .filter(|&end| {
                end > 1
                    && candidate[1..end]
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '#')
            })
            .and_then(|end| {
                unescape_with(&candidate[..=end], resolve_html5_entity)
                    .ok()
                    .map(|value| (end, value))
            });

        match entity {
            Some((end, value)) => {
                decoded.push_str(&value);
                rest = &candidate[end + 1..];
            }
            None => {
                log::trace!("keeping unknown entity in {candidate:?} verbatim");
                decoded.push('&');
                rest = &candidate[1..];
            }
        }
    }

    decoded.push_str(rest);
    decoded
}

/// Concatenates neighbouring runs that share a tag and attributes
fn merge_runs(runs: Vec<StyledRun>) -> Vec<StyledRun> {
    let mut merged: Vec<StyledRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.tag == run.tag && last.attributes == run.attributes => {
                last.text.push_str(&run.text);
            }
            _ => merged.push(run),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(markup: &str) -> Vec<(String, String)> {
        TagParser::default()
            .parse(markup)
            .into_iter()
            .map(|r| (r.text, r.tag))
            .collect()
    }

    fn pair(text: &str, tag: &str) -> (String, String) {
        (text.to_string(), tag.to_string())
    }

    #[test]
    fn balanced_tags_produce_runs() {
        assert_eq!(parse("<h1>A</h1>B"), vec![pair("A", "H1"), pair("B", "")]);
    }

    #[test]
    fn unclosed_tag_is_literal() {
        assert_eq!(parse("<h1>A"), vec![pair("<h1>A", "")]);
    }

    #[test]
    fn unmatched_closing_tag_is_literal() {
        assert_eq!(parse("A</b>B"), vec![pair("A</b>B", "")]);
    }

    #[test]
    fn tag_names_are_case_insensitive() {
        assert_eq!(parse("<B>x</b>"), vec![pair("x", "B")]);
    }

    #[test]
    fn nested_tags_report_innermost() {
        assert_eq!(
            parse("<b>bold <i>both</i> bold</b>"),
            vec![pair("bold ", "B"), pair("both", "I"), pair(" bold", "B")]
        );
    }

    #[test]
    fn already_open_tag_is_literal() {
        assert_eq!(parse("<b>x<b>y</b>"), vec![pair("x<b>y", "B")]);
    }

    #[test]
    fn closing_an_outer_tag_closes_inner_ones() {
        assert_eq!(
            parse("<a><b>x</a>y</b>"),
            vec![pair("x", "B"), pair("y</b>", "")]
        );
    }

    #[test]
    fn overly_long_tag_names_are_text() {
        let parser = TagParser::new(&FlowConfig::default().with_max_tag_len(3));
        let runs: Vec<_> = parser
            .parse("<abcd>x</abcd><abc>y</abc>")
            .into_iter()
            .map(|r| (r.text, r.tag))
            .collect();
        assert_eq!(runs, vec![pair("<abcd>x</abcd>", ""), pair("y", "ABC")]);
    }

    #[test]
    fn tags_do_not_span_newlines() {
        assert_eq!(parse("a <b\n> c"), vec![pair("a <b\n> c", "")]);
    }

    #[test]
    fn attributes_are_captured_and_inherited() {
        let runs = TagParser::default()
            .parse(r#"<a href="https://example.com" ypos='2'>go <b size="40">now</b></a>"#);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].attributes.link(), Some("https://example.com"));
        assert_eq!(runs[0].attributes.vertical_offset(), Pt(2.0));
        assert_eq!(runs[1].tag, "B");
        assert_eq!(runs[1].attributes.link(), Some("https://example.com"));
        assert_eq!(runs[1].attributes.requested_size(), Some(Pt(40.0)));
    }

    #[test]
    fn tabs_and_paragraph_markers_become_reserved_runs() {
        assert_eq!(
            parse("<b>a\tb</b>~~~c\r\n"),
            vec![
                pair("a", "B"),
                pair("\t", TAB_TAG),
                pair("b", "B"),
                pair("\t", PARAGRAPH_TAG),
                pair("c\n", ""),
            ]
        );
    }

    #[test]
    fn neighbouring_runs_are_merged() {
        assert_eq!(parse("<b>a</b><b>b</b>"), vec![pair("ab", "B")]);
        assert_eq!(parse("\t\t"), vec![pair("\t\t", TAB_TAG)]);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(parse("a &amp; b &lt;c&gt;"), vec![pair("a & b <c>", "")]);
        assert_eq!(parse("fish & chips"), vec![pair("fish & chips", "")]);
        assert_eq!(parse("a &amp; b & c"), vec![pair("a & b & c", "")]);
        assert_eq!(
            parse("Caf&eacute; &amp; bar&nbsp;x &#65;&#x42;"),
            vec![pair("Caf\u{e9} & bar\u{a0}x AB", "")]
        );
        assert_eq!(parse("&bogus; &amp"), vec![pair("&bogus; &amp", "")]);
    }

    #[test]
    fn empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("<b></b>").is_empty());
    }
}
