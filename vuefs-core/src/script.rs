//! Script block extraction and splicing.
//!
//! The component format puts a newline right after the opening `<script>`
//! tag. That newline is not part of the script text: extraction removes it
//! once and splicing puts it back, so an unmodified read/write cycle
//! reproduces the document byte-for-byte.

use crate::sfc::{parse_sfc, SfcBlock, SfcDescriptor, SfcParseResult};

/// The block that backs the virtual script file: `<script setup>` when
/// present, otherwise `<script>`.
pub fn select_script(descriptor: &SfcDescriptor) -> Option<&SfcBlock> {
    descriptor
        .script_setup
        .as_ref()
        .or(descriptor.script.as_ref())
}

fn parse_logged(document: &str) -> SfcParseResult {
    let result = parse_sfc(document);
    for error in &result.errors {
        tracing::warn!("component parse: {}", error);
    }
    result
}

/// Script text of a component, or `None` if it has no script block.
pub fn extract_script(document: &str) -> Option<String> {
    let result = parse_logged(document);
    let block = select_script(&result.descriptor)?;
    let content = block.content.as_str();
    Some(content.strip_prefix('\n').unwrap_or(content).to_string())
}

/// Replace the script text of a component, leaving every byte outside the
/// script block untouched. `None` if the component has no script block.
pub fn splice_script(document: &str, script: &str) -> Option<String> {
    let result = parse_logged(document);
    let range = select_script(&result.descriptor)?.loc.range();

    let mut spliced = String::with_capacity(document.len() - range.len() + script.len() + 1);
    spliced.push_str(&document[..range.start]);
    spliced.push('\n');
    spliced.push_str(script);
    spliced.push_str(&document[range.end..]);
    Some(spliced)
}
