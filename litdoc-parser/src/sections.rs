//! Comment/code sectionizer
//!
//! Splits a source file into an ordered sequence of sections, each one a
//! run of comment lines followed by a run of code lines. The pass is
//! line-oriented and single-forward: a line is a comment line exactly when
//! the language's comment matcher accepts it and its comment filter does
//! not, everything else (hashbangs and interpolation lines included) is
//! code. Concatenating all `code_text` fields in order reproduces the code
//! lines of the input byte for byte, and likewise `docs_text` for the
//! symbol-stripped comment lines.

use crate::languages::Language;

/// One comment-run/code-run pair, in file order.
///
/// `docs_html` and `code_html` stay `None` until the highlighting stage
/// fills them; they are never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Accumulated comment content, symbol stripped, newline-joined.
    pub docs_text: String,
    /// Accumulated code lines, newline-joined.
    pub code_text: String,
    /// Rendered form of `docs_text`.
    pub docs_html: Option<String>,
    /// Highlighted form of `code_text`.
    pub code_html: Option<String>,
}

impl Section {
    fn from_text(docs_text: String, code_text: String) -> Self {
        Section {
            docs_text,
            code_text,
            docs_html: None,
            code_html: None,
        }
    }
}

/// Split `source` into ordered sections using `language`'s comment patterns.
///
/// A section is sealed when a comment line appears after at least one code
/// line, and once more, unconditionally, at end of input. The result is
/// therefore never empty: a file with no comments yields one all-code
/// section, a file with only comments yields one all-docs section, and an
/// empty file yields one section with both fields empty.
pub fn sectionize(language: &Language, source: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut has_code = false;
    let mut docs_text = String::new();
    let mut code_text = String::new();

    // split_inclusive keeps each line's own newline out of the picture while
    // letting a trailing final newline end the loop without minting a
    // phantom empty line, which is what keeps reconstruction byte-exact.
    for piece in source.split_inclusive('\n') {
        let line = piece.strip_suffix('\n').unwrap_or(piece);
        if language.is_comment(line) {
            if has_code {
                sections.push(Section::from_text(
                    std::mem::take(&mut docs_text),
                    std::mem::take(&mut code_text),
                ));
                has_code = false;
            }
            docs_text.push_str(&language.strip_comment(line));
            docs_text.push('\n');
        } else {
            has_code = true;
            code_text.push_str(line);
            code_text.push('\n');
        }
    }

    sections.push(Section::from_text(docs_text, code_text));
    sections
}
