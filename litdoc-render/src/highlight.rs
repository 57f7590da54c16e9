//! Batch highlighter bridge
//!
//! All of a file's code fragments go through the external highlighter as a
//! single request: the fragments are joined with the language's divider
//! token (a synthetic same-language comment line), the blob is piped
//! through `pygmentize`, and the per-fragment HTML is recovered by
//! splitting the single output on the highlighted form of the divider.
//! One spawn per file keeps cross-fragment lexer state intact (a string or
//! comment spanning a section boundary highlights correctly) and bounds
//! process overhead to O(1) regardless of section count.
//!
//! The round-trip invariant: after stripping the highlighter's whole-blob
//! wrapper and splitting on the divider pattern, the fragment count must
//! equal the section count. A mismatch is a hard error, never a silent
//! misalignment.

use crate::markdown;
use litdoc_parser::languages::Language;
use litdoc_parser::sections::Section;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Fixed wrapper Pygments puts around the entire highlighted blob.
const WRAPPER_START: &str = "<div class=\"highlight\"><pre>";
const WRAPPER_END: &str = "</pre></div>";

/// Failure in the highlighting stage. All variants are fatal for the file
/// being processed; none may degrade into empty or misaligned HTML.
#[derive(Debug)]
pub enum HighlightError {
    /// The highlighter process could not be started or awaited.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// Writing the combined blob to the highlighter's stdin failed.
    Stdin {
        program: String,
        source: std::io::Error,
    },
    /// The highlighter exited without producing any output.
    NoOutput {
        program: String,
        status: Option<i32>,
        stderr: String,
    },
    /// Splitting the highlighted output did not recover one fragment per
    /// section.
    DividerMismatch { expected: usize, found: usize },
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::Spawn { program, source } => {
                write!(f, "failed to run highlighter '{}': {}", program, source)
            }
            HighlightError::Stdin { program, source } => {
                write!(f, "failed to write to highlighter '{}': {}", program, source)
            }
            HighlightError::NoOutput {
                program,
                status,
                stderr,
            } => {
                write!(f, "highlighter '{}' produced no output", program)?;
                if let Some(code) = status {
                    write!(f, " (exit status {})", code)?;
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim_end())?;
                }
                Ok(())
            }
            HighlightError::DividerMismatch { expected, found } => write!(
                f,
                "divider round trip failed: expected {} fragments, found {} \
                 (a source line shaped like the divider token, or a change in \
                 the highlighter's comment span class, splits the output wrong)",
                expected, found
            ),
        }
    }
}

impl std::error::Error for HighlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighlightError::Spawn { source, .. } | HighlightError::Stdin { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Strip one occurrence each of the whole-blob wrapper prefix and suffix.
fn strip_wrapper(output: &str) -> &str {
    let start = output
        .find(WRAPPER_START)
        .map(|i| i + WRAPPER_START.len())
        .unwrap_or(0);
    let end = output.rfind(WRAPPER_END).unwrap_or(output.len());
    if end < start {
        return "";
    }
    &output[start..end]
}

/// Recover per-section fragments from the highlighter's combined output.
///
/// Pure function so the round trip is testable without a subprocess: strips
/// the wrapper, splits on the language's divider pattern, and enforces the
/// count invariant.
pub fn split_fragments<'a>(
    language: &Language,
    output: &'a str,
    expected: usize,
) -> Result<Vec<&'a str>, HighlightError> {
    let body = strip_wrapper(output);
    let fragments: Vec<&str> = language.divider_html().split(body).collect();
    if fragments.len() != expected {
        return Err(HighlightError::DividerMismatch {
            expected,
            found: fragments.len(),
        });
    }
    Ok(fragments)
}

/// Handle on the external highlighter program.
#[derive(Debug, Clone)]
pub struct Highlighter {
    program: PathBuf,
}

impl Highlighter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Highlighter {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Fill in `docs_html` and `code_html` for every section.
    ///
    /// One subprocess round trip for all the code; comments render locally
    /// through [`markdown::to_html`]. The future resolves once every
    /// section is populated.
    pub async fn highlight(
        &self,
        language: &Language,
        sections: &mut [Section],
    ) -> Result<(), HighlightError> {
        let blob: String = sections
            .iter()
            .map(|s| s.code_text.as_str())
            .collect::<Vec<_>>()
            .join(language.divider_text());

        let output = self.run(language, &blob).await?;
        let fragments = split_fragments(language, &output, sections.len())?;

        for (section, fragment) in sections.iter_mut().zip(fragments) {
            // Rewrap so each section is independently a complete block.
            section.code_html = Some(format!("{}{}{}", WRAPPER_START, fragment, WRAPPER_END));
            section.docs_html = Some(markdown::to_html(&section.docs_text));
        }
        Ok(())
    }

    /// Probe the divider round trip with two tiny fragments.
    ///
    /// Separates "this highlighter emits a divider span class the registry
    /// does not match" from per-file content collisions before any real
    /// file is processed.
    pub async fn self_check(&self, language: &Language) -> Result<(), HighlightError> {
        let blob = format!("a{}b", language.divider_text());
        let output = self.run(language, &blob).await?;
        split_fragments(language, &output, 2).map(|_| ())
    }

    /// One full subprocess round trip: blob in on stdin, highlighted HTML
    /// out on stdout. stderr is a diagnostic only unless stdout is empty.
    async fn run(&self, language: &Language, blob: &str) -> Result<String, HighlightError> {
        let mut child = Command::new(&self.program)
            .arg("-l")
            .arg(language.name())
            .arg("-f")
            .arg("html")
            .arg("-O")
            .arg("encoding=utf-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HighlightError::Spawn {
                program: self.program_name(),
                source,
            })?;

        let mut stdin = child.stdin.take().expect("stdin was requested piped");
        // Feed stdin while draining stdout, so a blob larger than the pipe
        // buffer cannot deadlock against the highlighter's own writes.
        let feed = async {
            stdin.write_all(blob.as_bytes()).await?;
            stdin.shutdown().await?;
            drop(stdin);
            Ok::<(), std::io::Error>(())
        };
        let (fed, collected) = tokio::join!(feed, child.wait_with_output());

        fed.map_err(|source| HighlightError::Stdin {
            program: self.program_name(),
            source,
        })?;
        let output = collected.map_err(|source| HighlightError::Spawn {
            program: self.program_name(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.is_empty() {
            log::warn!("{}: {}", self.program_name(), stderr.trim_end());
        }
        if output.stdout.is_empty() {
            return Err(HighlightError::NoOutput {
                program: self.program_name(),
                status: output.status.code(),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
