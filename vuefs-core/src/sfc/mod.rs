//! Vue single-file component parsing.
//!
//! Splits a component into its top-level blocks (`<template>`, `<script>`,
//! `<script setup>`, `<style>`, custom blocks) with exact byte offsets, so
//! callers can slice or splice block content without touching anything else.

mod parser;

use std::collections::BTreeMap;

use thiserror::Error;

pub use parser::parse_sfc;

/// Kind of a top-level block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Template,
    Script,
    ScriptSetup,
    Style,
    /// Any other top-level element, e.g. `<i18n>` or `<docs>`.
    Custom(String),
}

/// A point in the source. `offset` is a byte offset, `line` and `column`
/// are 1-based, and `column` counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// Half-open span `[start, end)` of a block's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }
}

/// Value of a tag attribute. `<script setup>` gives `setup: Flag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Flag,
    Value(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Flag => None,
            AttrValue::Value(v) => Some(v),
        }
    }
}

/// One top-level block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcBlock {
    pub kind: BlockKind,
    pub attrs: BTreeMap<String, AttrValue>,
    /// Text between the opening tag's `>` and the closing tag's `<`.
    pub content: String,
    pub loc: SourceLocation,
}

impl SfcBlock {
    /// `lang` attribute, e.g. `ts`.
    pub fn lang(&self) -> Option<&str> {
        self.attrs.get("lang").and_then(AttrValue::as_str)
    }

    /// `src` attribute for externally sourced blocks.
    pub fn src(&self) -> Option<&str> {
        self.attrs.get("src").and_then(AttrValue::as_str)
    }
}

/// All blocks of a component, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcDescriptor {
    pub template: Option<SfcBlock>,
    pub script: Option<SfcBlock>,
    pub script_setup: Option<SfcBlock>,
    pub styles: Vec<SfcBlock>,
    pub custom_blocks: Vec<SfcBlock>,
}

impl SfcDescriptor {
    /// Every block in document order.
    pub fn blocks(&self) -> Vec<&SfcBlock> {
        let mut blocks: Vec<&SfcBlock> = self
            .template
            .iter()
            .chain(self.script.iter())
            .chain(self.script_setup.iter())
            .chain(self.styles.iter())
            .chain(self.custom_blocks.iter())
            .collect();
        blocks.sort_by_key(|b| b.loc.start.offset);
        blocks
    }
}

/// Recoverable problem found while parsing. Parsing never fails outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {}:{}", .position.line, .position.column)]
pub struct SfcParseError {
    pub kind: SfcErrorKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SfcErrorKind {
    #[error("a component can contain only one <{0}> element")]
    DuplicateBlock(String),
    #[error("element <{0}> is missing its end tag")]
    MissingEndTag(String),
    #[error("unterminated opening tag <{0}")]
    UnterminatedTag(String),
    #[error("unterminated comment")]
    UnterminatedComment,
}

/// Descriptor plus the errors collected on the way.
#[derive(Debug, Clone, Default)]
pub struct SfcParseResult {
    pub descriptor: SfcDescriptor,
    pub errors: Vec<SfcParseError>,
}
