//! Top-level block scanner for single-file components.
//!
//! Only the outermost elements are interpreted. `<template>` content runs to
//! the matching `</template>` (nested templates are counted); every other
//! block is raw text up to its first end tag.

use std::collections::BTreeMap;

use super::{
    AttrValue, BlockKind, Position, SfcBlock, SfcErrorKind, SfcParseError, SfcParseResult,
    SourceLocation,
};

/// Parse a component into its blocks.
///
/// # Examples
/// ```
/// use vuefs_core::sfc::parse_sfc;
///
/// let src = "<script setup>\nconst a = 1\n</script>\n";
/// let result = parse_sfc(src);
/// let block = result.descriptor.script_setup.unwrap();
/// assert_eq!(block.content, "\nconst a = 1\n");
/// assert_eq!(&src[block.loc.range()], block.content);
/// ```
pub fn parse_sfc(source: &str) -> SfcParseResult {
    Parser::new(source).run()
}

struct OpenTag {
    attrs: BTreeMap<String, AttrValue>,
    /// Offset just past the closing `>`.
    end: usize,
    self_closing: bool,
}

struct Parser<'a> {
    src: &'a str,
    line_starts: Vec<usize>,
    result: SfcParseResult,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            src,
            line_starts,
            result: SfcParseResult::default(),
        }
    }

    fn run(mut self) -> SfcParseResult {
        let src = self.src;
        let mut pos = 0;

        while let Some(rel) = src[pos..].find('<') {
            let lt = pos + rel;
            let rest = &src[lt..];

            if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(end) => {
                        pos = lt + end + 3;
                        continue;
                    }
                    None => {
                        self.error(SfcErrorKind::UnterminatedComment, lt);
                        break;
                    }
                }
            }

            // Stray end tag at the top level.
            if rest.starts_with("</") {
                match rest.find('>') {
                    Some(gt) => {
                        pos = lt + gt + 1;
                        continue;
                    }
                    None => break,
                }
            }

            let name_len = tag_name_len(&rest[1..]);
            if name_len == 0 {
                pos = lt + 1;
                continue;
            }
            let name = &rest[1..1 + name_len];

            let Some(open) = scan_open_tag(src, lt + 1 + name_len) else {
                self.error(SfcErrorKind::UnterminatedTag(name.to_string()), lt);
                break;
            };

            let content_start = open.end;
            let (content_end, next) = if open.self_closing {
                (content_start, content_start)
            } else {
                let close = if name == "template" {
                    find_template_end(src, content_start)
                } else {
                    find_raw_end(src, content_start, name)
                };
                match close {
                    Some((close_lt, close_gt)) => (close_lt, close_gt + 1),
                    None => {
                        // Unclosed blocks run to end of input.
                        self.error(SfcErrorKind::MissingEndTag(name.to_string()), lt);
                        (src.len(), src.len())
                    }
                }
            };

            self.add_block(name, open.attrs, content_start, content_end, lt);
            pos = next;
        }

        self.result
    }

    fn add_block(
        &mut self,
        name: &str,
        attrs: BTreeMap<String, AttrValue>,
        start: usize,
        end: usize,
        tag_offset: usize,
    ) {
        let kind = match name {
            "template" => BlockKind::Template,
            "script" if attrs.contains_key("setup") => BlockKind::ScriptSetup,
            "script" => BlockKind::Script,
            "style" => BlockKind::Style,
            other => BlockKind::Custom(other.to_string()),
        };

        let content = &self.src[start..end];
        if kind != BlockKind::Template && content.trim().is_empty() && !attrs.contains_key("src") {
            return;
        }

        let block = SfcBlock {
            kind,
            attrs,
            content: content.to_string(),
            loc: SourceLocation {
                start: self.position(start),
                end: self.position(end),
            },
        };

        let (slot, label) = match block.kind {
            BlockKind::Template => (&mut self.result.descriptor.template, "template"),
            BlockKind::Script => (&mut self.result.descriptor.script, "script"),
            BlockKind::ScriptSetup => (&mut self.result.descriptor.script_setup, "script setup"),
            BlockKind::Style => {
                self.result.descriptor.styles.push(block);
                return;
            }
            BlockKind::Custom(_) => {
                self.result.descriptor.custom_blocks.push(block);
                return;
            }
        };

        if slot.is_some() {
            self.error(SfcErrorKind::DuplicateBlock(label.to_string()), tag_offset);
        } else {
            *slot = Some(block);
        }
    }

    fn error(&mut self, kind: SfcErrorKind, offset: usize) {
        let position = self.position(offset);
        self.result.errors.push(SfcParseError { kind, position });
    }

    fn position(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&s| s <= offset);
        let line_start = self.line_starts[line - 1];
        Position {
            offset,
            line,
            column: self.src[line_start..offset].chars().count() + 1,
        }
    }
}

fn tag_name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        return 0;
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
        .count()
}

fn is_tag_boundary(byte: Option<&u8>) -> bool {
    match byte {
        None => true,
        Some(b) => matches!(b, b'>' | b'/') || b.is_ascii_whitespace(),
    }
}

/// Parse attributes from just after the tag name up to and including `>`.
fn scan_open_tag(src: &str, from: usize) -> Option<OpenTag> {
    let bytes = src.as_bytes();
    let mut attrs = BTreeMap::new();
    let mut i = from;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                return Some(OpenTag {
                    attrs,
                    end: i + 1,
                    self_closing: false,
                })
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(OpenTag {
                    attrs,
                    end: i + 2,
                    self_closing: true,
                })
            }
            b'/' | b'=' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let name = &src[name_start..i];

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let value = if bytes.get(j) == Some(&b'=') {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match bytes.get(j)? {
                quote @ (b'"' | b'\'') => {
                    let close = src[j + 1..].find(*quote as char)? + j + 1;
                    let value = &src[j + 1..close];
                    i = close + 1;
                    AttrValue::Value(value.to_string())
                }
                _ => {
                    let start = j;
                    while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                        j += 1;
                    }
                    i = j;
                    AttrValue::Value(src[start..j].to_string())
                }
            }
        } else {
            AttrValue::Flag
        };

        attrs.entry(name.to_string()).or_insert(value);
    }
}

/// Find `</name` followed by a tag boundary; returns offsets of its `<` and `>`.
fn find_raw_end(src: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let mut i = from;
    while let Some(rel) = src[i..].find("</") {
        let lt = i + rel;
        let after = lt + 2 + name.len();
        if src[lt + 2..].starts_with(name) && is_tag_boundary(src.as_bytes().get(after)) {
            let gt = src[after..].find('>')? + after;
            return Some((lt, gt));
        }
        i = lt + 2;
    }
    None
}

/// Like [`find_raw_end`] for `template`, skipping nested `<template>` pairs.
fn find_template_end(src: &str, from: usize) -> Option<(usize, usize)> {
    const OPEN: &str = "<template";
    const CLOSE: &str = "</template";

    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = from;

    while let Some(rel) = src[i..].find('<') {
        let lt = i + rel;
        let rest = &src[lt..];

        if rest.starts_with("<!--") {
            i = lt + rest.find("-->")? + 3;
        } else if rest.starts_with(CLOSE) && is_tag_boundary(bytes.get(lt + CLOSE.len())) {
            let gt = rest.find('>')? + lt;
            if depth == 0 {
                return Some((lt, gt));
            }
            depth -= 1;
            i = gt + 1;
        } else if rest.starts_with(OPEN) && is_tag_boundary(bytes.get(lt + OPEN.len())) {
            let open = scan_open_tag(src, lt + OPEN.len())?;
            if !open.self_closing {
                depth += 1;
            }
            i = open.end;
        } else {
            i = lt + 1;
        }
    }
    None
}
