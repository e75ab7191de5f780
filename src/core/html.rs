// src/core/html.rs
//! Tolerant, case-insensitive HTML slicing.
//!
//! No DOM is built. Elements are located by scanning for openers and, where
//! nesting matters (`div`, `span`, `table`), by counting same-name openers
//! and closers until the matching close tag. Attribute values are read
//! straight out of the opener text, quoted or not.
//!
//! `to_lower` only folds ASCII, so byte offsets computed on the lowered copy
//! are valid on the input.

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

pub fn inner_after_open_tag(block: &str) -> String {
    if let Some(oe) = opener_end(block, 0) {
        if let Some(cs) = block.rfind('<') {
            if cs >= oe {
                return block[oe..cs].to_string();
            }
        }
    }
    s!()
}

/// Offset just past the `>` closing the opener that starts at `from`.
/// A `>` inside a quoted attribute value does not count.
pub fn opener_end(s: &str, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut quote: Option<u8> = None;
    let mut prev = 0u8;

    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'>' => return Some(i + 1),
            None if (b == b'"' || b == b'\'') && prev == b'=' => quote = Some(b),
            None => {}
        }
        if !b.is_ascii_whitespace() {
            prev = b;
        }
    }
    None
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    normalize_ws(&strip_tags_raw(s.as_ref()))
}

/// Drop `<…>` runs, keep everything else byte for byte (no whitespace folding).
pub fn strip_tags_raw(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/* ---------- element lookup ---------- */

/// Next `<tag …>` opener at or after `from`, with a tag-name boundary
/// (so `<a` never matches `<abbr`). Returns `(start, end_of_opener)`.
pub fn find_open_tag_ci(s: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    let needle = join!("<", &to_lower(tag));
    open_tag_in(s, &lc, &needle, from)
}

fn open_tag_in(s: &str, lc: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    loop {
        let start = lc.get(pos..)?.find(needle)? + pos;
        let after = start + needle.len();
        match lc.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {
                return Some((start, opener_end(s, after)?));
            }
            Some(_) => pos = after,
            None => return None,
        }
    }
}

/// Full `<tag …>…</tag>` block whose opener starts at `start`. Nested
/// same-name elements are counted, so the matching close is returned.
pub fn balanced_block_ci(s: &str, tag: &str, start: usize) -> Option<(usize, usize)> {
    balanced_in(s, &to_lower(s), &to_lower(tag), start)
}

fn balanced_in(s: &str, lc: &str, tl: &str, start: usize) -> Option<(usize, usize)> {
    let open = join!("<", tl);
    let close = join!("</", tl);

    let first_end = opener_end(s, start)?;
    if s[start..first_end].ends_with("/>") {
        return Some((start, first_end));
    }

    let mut depth = 1usize;
    let mut pos = first_end;
    loop {
        let next_close = close_tag_in(lc, &close, pos)?;
        match open_tag_in(s, lc, &open, pos) {
            Some((o, oe)) if o < next_close => {
                depth += 1;
                pos = oe;
            }
            _ => {
                let gt = s[next_close..].find('>')? + next_close + 1;
                depth -= 1;
                if depth == 0 {
                    return Some((start, gt));
                }
                pos = gt;
            }
        }
    }
}

/// Next `</tag` at or after `from` followed by `>` or whitespace
/// (so `</a` never matches `</abbr>`).
fn close_tag_in(lc: &str, needle: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let at = lc.get(pos..)?.find(needle)? + pos;
        let after = at + needle.len();
        match lc.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' => return Some(at),
            Some(_) => pos = after,
            None => return None,
        }
    }
}

/// First `<tag>` element at/after `from` whose opener text satisfies `pred`.
pub fn find_element_ci<F>(s: &str, tag: &str, from: usize, pred: F) -> Option<(usize, usize)>
where
    F: Fn(&str) -> bool,
{
    let lc = to_lower(s);
    let tl = to_lower(tag);
    let needle = join!("<", &tl);
    let mut pos = from;
    while let Some((start, open_end)) = open_tag_in(s, &lc, &needle, pos) {
        if pred(&s[start..open_end]) {
            return balanced_in(s, &lc, &tl, start);
        }
        pos = open_end;
    }
    None
}

pub fn element_by_id<'a>(s: &'a str, tag: &str, id: &str) -> Option<&'a str> {
    find_element_ci(s, tag, 0, |open| attr_value(open, "id") == Some(id)).map(|(a, b)| &s[a..b])
}

pub fn element_by_class<'a>(s: &'a str, tag: &str, class: &str) -> Option<&'a str> {
    find_element_ci(s, tag, 0, |open| has_class(open, class)).map(|(a, b)| &s[a..b])
}

/// All top-level `<tag>` blocks inside `s`, in document order.
pub fn elements_ci<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = to_lower(s);
    let tl = to_lower(tag);
    let needle = join!("<", &tl);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((start, open_end)) = open_tag_in(s, &lc, &needle, pos) {
        match balanced_in(s, &lc, &tl, start) {
            Some((_, end)) => {
                out.push(&s[start..end]);
                pos = end;
            }
            None => pos = open_end,
        }
    }
    out
}

/// Direct-ish children of an element: top-level `<tag>` blocks of its inner markup.
pub fn children_ci<'a>(block: &'a str, tag: &str) -> Vec<&'a str> {
    let Some(open_end) = opener_end(block, 0) else { return Vec::new() };
    let close = block.rfind('<').filter(|&c| c >= open_end).unwrap_or(block.len());
    elements_ci(&block[open_end..close], tag)
}

/* ---------- attributes ---------- */

/// Value of attribute `name` in an opener like `<td class="x" id=y>`.
pub fn attr_value<'a>(opener: &'a str, name: &str) -> Option<&'a str> {
    let lc = to_lower(opener);
    let needle = to_lower(name);
    let mut pos = 0usize;

    while let Some(rel) = lc[pos..].find(&needle) {
        let at = pos + rel;
        pos = at + needle.len();

        let boundary = at > 0 && lc.as_bytes()[at - 1].is_ascii_whitespace();
        if !boundary {
            continue;
        }
        let Some(val) = opener[pos..].trim_start().strip_prefix('=') else { continue };
        let val = val.trim_start();

        let (quote, start_off) = match val.as_bytes().first() {
            Some(b'"') => (Some('"'), 1),
            Some(b'\'') => (Some('\''), 1),
            _ => (None, 0),
        };
        let end = match quote {
            Some(q) => val[start_off..].find(q).map(|e| start_off + e),
            None => val.find(|c: char| c.is_ascii_whitespace() || c == '>'),
        }
        .unwrap_or(val.len());
        return Some(&val[start_off..end]);
    }
    None
}

pub fn has_class(opener: &str, class: &str) -> bool {
    attr_value(opener, "class")
        .map(|v| v.split_ascii_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

pub fn opener(block: &str) -> &str {
    opener_end(block, 0).map(|e| &block[..e]).unwrap_or(block)
}

/* ---------- text ---------- */

/// Visible text of an element, entities decoded, whitespace folded.
pub fn text_of(block: &str) -> String {
    strip_tags(normalize_entities(&inner_after_open_tag(block)))
}

/// Text before the element's first child tag (its first text node).
pub fn leading_text(block: &str) -> String {
    let inner = inner_after_open_tag(block);
    let head = inner.find('<').map(|i| &inner[..i]).unwrap_or(&inner);
    normalize_ws(&normalize_entities(head))
}

/// Does any `<a>` inside `s` have visible text containing `needle`?
pub fn has_anchor_containing(s: &str, needle: &str) -> bool {
    elements_ci(s, "a").iter().any(|a| text_of(a).contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_tag_respects_name_boundary() {
        let doc = r#"<abbr>x</abbr><A href="p">y</A>"#;
        let (s, e) = find_open_tag_ci(doc, "a", 0).unwrap();
        assert_eq!(&doc[s..e], r#"<A href="p">"#);
    }

    #[test]
    fn balanced_block_skips_nested_same_tag() {
        let doc = r#"<div id="outer"><div>inner</div> tail</div><div>next</div>"#;
        let (s, e) = balanced_block_ci(doc, "div", 0).unwrap();
        assert_eq!(&doc[s..e], r#"<div id="outer"><div>inner</div> tail</div>"#);
    }

    #[test]
    fn attr_value_quoted_unquoted_and_boundary() {
        assert_eq!(attr_value(r#"<td class="a b" id=x>"#, "id"), Some("x"));
        assert_eq!(attr_value(r#"<td class='a b'>"#, "class"), Some("a b"));
        assert_eq!(attr_value(r#"<td data-id="7">"#, "id"), None);
        assert_eq!(attr_value(r#"<span ID = "death-ability-3">"#, "id"), Some("death-ability-3"));
    }

    #[test]
    fn class_match_is_token_based() {
        assert!(has_class(r#"<span class="fight wipe">"#, "wipe"));
        assert!(!has_class(r#"<span class="wiped">"#, "wipe"));
    }

    #[test]
    fn element_lookup_by_id_and_class() {
        let doc = r#"<div id="a"><p class="x y">Hi&nbsp;there</p></div>"#;
        let p = element_by_class(doc, "p", "y").unwrap();
        assert_eq!(text_of(p), "Hi there");
        assert!(element_by_id(doc, "div", "b").is_none());
    }

    #[test]
    fn rows_and_cells() {
        let table = r#"<table><tr><td>1</td><td><table><tr><td>n</td></tr></table></td></tr><tr><td>2</td></tr></table>"#;
        let rows = children_ci(table, "tr");
        assert_eq!(rows.len(), 2);
        let cells = children_ci(rows[0], "td");
        assert_eq!(cells.len(), 2);
        assert_eq!(text_of(cells[0]), "1");
    }

    #[test]
    fn close_tag_respects_name_boundary() {
        let doc = r#"<a href="x"><abbr>DRG</abbr> Aya Brea</a><a>next</a>"#;
        let (s, e) = balanced_block_ci(doc, "a", 0).unwrap();
        assert_eq!(&doc[s..e], r#"<a href="x"><abbr>DRG</abbr> Aya Brea</a>"#);
        assert!(has_anchor_containing(doc, "Aya Brea"));

        let doc = "<P>one<pre>two</pre> three</P><p>four</p>";
        let (s, e) = balanced_block_ci(doc, "p", 0).unwrap();
        assert_eq!(&doc[s..e], "<P>one<pre>two</pre> three</P>");
    }

    #[test]
    fn quoted_gt_does_not_end_opener() {
        let doc = r#"<div title="a>b" id="boss">Name<span>x</span></div>"#;
        assert_eq!(opener_end(doc, 0), Some(doc.find("Name").unwrap()));
        let div = element_by_id(doc, "div", "boss").unwrap();
        assert_eq!(leading_text(div), "Name");
        assert_eq!(opener(div), r#"<div title="a>b" id="boss">"#);
    }

    #[test]
    fn leading_text_stops_at_first_child() {
        let div = r#"<div id="b">  The Queen Savage <span>(Savage)</span></div>"#;
        assert_eq!(leading_text(div), "The Queen Savage");
    }
}
