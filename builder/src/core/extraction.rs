//! Recover game files from free-form Implement output.
//!
//! Models rarely agree on how to label code blocks, so several labeled-block
//! conventions are scanned in a fixed order, followed by a fallback that
//! infers the file from the fence language tag.
//!
//! Labeled matches are merged in scan order, so a later block for the same
//! file (a corrected draft, or a block in a later convention) replaces the
//! earlier one. The language-tag fallback only fills files still missing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::types::{CanonicalFile, GameFiles};

/// Labeled-block conventions, in scan order.
///
/// Each pattern captures the filename and the fenced body.
static LABELED_BLOCKS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // ### index.html
        labeled(r"#{2,3}\s*(index\.html|style\.css|game\.js)\s*\n"),
        // --- index.html ---
        labeled(r"---\s*(index\.html|style\.css|game\.js)\s*---\s*\n"),
        // **index.html**
        labeled(r"\*\*\s*(index\.html|style\.css|game\.js)\s*\*\*\s*\n"),
        // FILE: index.html
        labeled(r"FILE:\s*(index\.html|style\.css|game\.js)\s*\n"),
    ]
});

/// Language-tag fallbacks, tried in order for files still missing.
static TAGGED_BLOCKS: LazyLock<[(CanonicalFile, Regex); 4]> = LazyLock::new(|| {
    [
        (CanonicalFile::IndexHtml, tagged("html")),
        (CanonicalFile::StyleCss, tagged("css")),
        (CanonicalFile::GameJs, tagged("javascript")),
        (CanonicalFile::GameJs, tagged("js")),
    ]
});

fn labeled(header: &str) -> Regex {
    Regex::new(&format!(r"(?is){header}```[a-zA-Z]*\n(.*?)```"))
        .expect("labeled block pattern should compile")
}

fn tagged(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)```{tag}\n(.*?)```")).expect("tagged block pattern should compile")
}

/// Extract up to three canonical files from `response`.
///
/// Never fails: a response with no recognizable blocks yields an empty set.
/// Bodies are trimmed; empty blocks are kept as empty strings.
pub fn extract_files(response: &str) -> GameFiles {
    let text = normalize_newlines(response);
    let mut files = GameFiles::new();

    for (convention, pattern) in LABELED_BLOCKS.iter().enumerate() {
        for caps in pattern.captures_iter(&text) {
            let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let Some(file) = CanonicalFile::from_name(name.as_str()) else {
                continue;
            };
            if files.contains(file) {
                debug!(%file, convention, "later labeled block replaces earlier one");
            } else {
                debug!(%file, convention, "extracted labeled block");
            }
            files.insert(file, body.as_str().trim().to_string());
        }
    }

    for (file, pattern) in TAGGED_BLOCKS.iter() {
        if files.contains(*file) {
            continue;
        }
        if let Some(body) = pattern.captures(&text).and_then(|caps| caps.get(1)) {
            debug!(%file, "extracted block by language tag");
            files.insert_if_absent(*file, body.as_str().trim().to_string());
        }
    }

    files
}

fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "Here is the game.\n\n\
### index.html\n```html\n<!DOCTYPE html>\n<html></html>\n```\n\n\
### style.css\n```css\nbody { margin: 0; }\n```\n\n\
### game.js\n```javascript\nconst canvas = document.getElementById('c');\n```\n";

    #[test]
    fn extracts_all_three_hash_labeled_blocks() {
        let files = extract_files(FULL_RESPONSE);

        assert!(files.is_complete());
        assert_eq!(
            files.get(CanonicalFile::IndexHtml),
            Some("<!DOCTYPE html>\n<html></html>")
        );
        assert_eq!(files.get(CanonicalFile::StyleCss), Some("body { margin: 0; }"));
        assert_eq!(
            files.get(CanonicalFile::GameJs),
            Some("const canvas = document.getElementById('c');")
        );
    }

    #[test]
    fn no_recognizable_blocks_yields_empty_set() {
        let files = extract_files("I could not write the game, sorry.\n```\nplain\n```");
        assert!(files.is_empty());
    }

    #[test]
    fn accepts_every_labeling_convention() {
        let response = "--- index.html ---\n```html\n<html></html>\n```\n\
**style.css**\n```css\nh1 {}\n```\n\
FILE: game.js\n```js\nlet x = 1;\n```\n";
        let files = extract_files(response);

        assert_eq!(files.get(CanonicalFile::IndexHtml), Some("<html></html>"));
        assert_eq!(files.get(CanonicalFile::StyleCss), Some("h1 {}"));
        assert_eq!(files.get(CanonicalFile::GameJs), Some("let x = 1;"));
    }

    #[test]
    fn label_matching_is_case_insensitive() {
        let files = extract_files("## GAME.JS\n```\nrun();\n```\n");
        assert_eq!(files.get(CanonicalFile::GameJs), Some("run();"));
    }

    #[test]
    fn later_convention_replaces_earlier_one() {
        let response = "### game.js\n```js\nfirst();\n```\n\
FILE: game.js\n```js\nsecond();\n```\n";
        let files = extract_files(response);
        assert_eq!(files.get(CanonicalFile::GameJs), Some("second();"));
    }

    #[test]
    fn corrected_block_replaces_draft_within_a_convention() {
        let response = "### game.js\n```js\ndraft();\n```\nFixed version:\n\
### game.js\n```js\nfinal();\n```\n";
        let files = extract_files(response);
        assert_eq!(files.get(CanonicalFile::GameJs), Some("final();"));
    }

    #[test]
    fn falls_back_to_language_tags_for_missing_files() {
        let response = "### index.html\n```html\n<html></html>\n```\n\
Some css:\n```css\np {}\n```\nAnd script:\n```js\nstart();\n```\n";
        let files = extract_files(response);

        assert!(files.is_complete());
        assert_eq!(files.get(CanonicalFile::StyleCss), Some("p {}"));
        assert_eq!(files.get(CanonicalFile::GameJs), Some("start();"));
    }

    #[test]
    fn javascript_tag_is_preferred_over_js_tag() {
        let response = "```js\nshort();\n```\n```javascript\nlong();\n```\n";
        let files = extract_files(response);
        assert_eq!(files.get(CanonicalFile::GameJs), Some("long();"));
    }

    #[test]
    fn fallback_does_not_override_labeled_block() {
        let response = "```html\n<p>stray</p>\n```\n### index.html\n```html\n<main></main>\n```\n";
        let files = extract_files(response);
        assert_eq!(files.get(CanonicalFile::IndexHtml), Some("<main></main>"));
    }

    #[test]
    fn empty_block_is_kept_as_empty_string() {
        let files = extract_files("### style.css\n```css\n```\n");
        assert_eq!(files.get(CanonicalFile::StyleCss), Some(""));
    }

    #[test]
    fn single_labeled_block_is_incomplete() {
        let files = extract_files("### index.html\n```html\n<html></html>\n```\n");
        assert_eq!(files.len(), 1);
        assert!(!files.is_complete());
    }

    #[test]
    fn handles_crlf_line_endings() {
        let files = extract_files(&FULL_RESPONSE.replace('\n', "\r\n"));
        assert!(files.is_complete());
    }

    #[test]
    fn extraction_is_deterministic() {
        assert_eq!(extract_files(FULL_RESPONSE), extract_files(FULL_RESPONSE));
    }
}
