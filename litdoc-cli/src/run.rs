//! The sequential per-file driver.
//!
//! A `RunConfig` is built once per invocation and threaded through
//! discovery, the per-file pipeline and output writing; there is no
//! process-wide run state. Files are processed strictly one at a time:
//! read, sectionize, one highlighter round trip, assemble, write, and only
//! then the next file. At most one external process is alive at any point.

use litdoc_parser::languages::{Language, LanguageRegistry};
use litdoc_parser::sections::sectionize;
use litdoc_render::highlight::{HighlightError, Highlighter};
use litdoc_render::page::{self, PageContext, SourceLink};
use std::collections::VecDeque;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Everything one invocation needs, constructed once in `main`.
#[derive(Debug)]
pub struct RunConfig {
    /// Files and directories to process, as given on the command line.
    pub paths: Vec<PathBuf>,
    /// Output root directory.
    pub output: PathBuf,
    /// Mirror the input directory structure under the output root; when
    /// off, all pages land flat in the output root.
    pub mirror_dirs: bool,
    /// Highlighter program name, resolved on PATH before any file work.
    pub highlighter: String,
    /// Language table in use for this run.
    pub registry: LanguageRegistry,
}

/// Totals reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub pages: usize,
    pub skipped: usize,
}

/// A failure that aborts the run. Unsupported extensions are not errors;
/// they are skipped during discovery.
#[derive(Debug)]
pub enum RunError {
    /// The highlighter program is not on PATH.
    MissingHighlighter { program: String },
    /// A language failed the divider self check against this highlighter.
    SelfCheck {
        language: String,
        source: HighlightError,
    },
    /// Reading a source file or directory failed.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Highlighting one source file failed.
    Highlight {
        path: PathBuf,
        source: HighlightError,
    },
    /// Writing an output file or directory failed.
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::MissingHighlighter { program } => write!(
                f,
                "highlighter '{}' not found on PATH (is Pygments installed?)",
                program
            ),
            RunError::SelfCheck { language, source } => {
                write!(f, "divider self check failed for '{}': {}", language, source)
            }
            RunError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            RunError::Highlight { path, source } => {
                write!(f, "failed to highlight {}: {}", path.display(), source)
            }
            RunError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Read { source, .. } | RunError::Write { source, .. } => Some(source),
            RunError::Highlight { source, .. } | RunError::SelfCheck { source, .. } => {
                Some(source)
            }
            RunError::MissingHighlighter { .. } => None,
        }
    }
}

/// Compute the output path for one source file.
///
/// Mirror mode reproduces the source path under the output root with the
/// extension replaced by `.html`; root and parent components are dropped
/// so the output can never escape the root. Flat mode keeps only the file
/// name.
fn destination(config: &RunConfig, source: &Path) -> PathBuf {
    let relative: PathBuf = if config.mirror_dirs {
        source
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect()
    } else {
        source.file_name().map(PathBuf::from).unwrap_or_default()
    };
    config.output.join(relative).with_extension("html")
}

/// Href from the directory containing `from` to `target`, with `/`
/// separators regardless of platform.
fn href_from(from: &Path, target: &Path) -> String {
    let base = from.parent().unwrap_or_else(|| Path::new(""));
    let relative = pathdiff::diff_paths(target, base).unwrap_or_else(|| target.to_path_buf());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand the configured paths into the ordered source list.
///
/// A queue seeded with the sorted input paths; a directory expands into
/// its immediate children (sorted), appended to the back, so expansion
/// repeats for nested directories. Files with unsupported extensions are
/// skipped and counted. Discovery completes before any page renders so
/// every page's jump-to menu sees the full source list.
async fn discover<'a>(
    config: &'a RunConfig,
) -> Result<(Vec<(PathBuf, &'a Language)>, usize), RunError> {
    let mut queue: VecDeque<PathBuf> = {
        let mut paths = config.paths.clone();
        paths.sort();
        paths.into()
    };
    let mut sources = Vec::new();
    let mut skipped = 0;

    while let Some(path) = queue.pop_front() {
        let read_err = |source| RunError::Read {
            path: path.clone(),
            source,
        };
        let metadata = fs::metadata(&path).await.map_err(read_err)?;
        if metadata.is_dir() {
            let mut children = Vec::new();
            let mut entries = fs::read_dir(&path).await.map_err(read_err)?;
            while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
                children.push(entry.path());
            }
            children.sort();
            queue.extend(children);
        } else if let Some(language) = config.registry.for_path(&path) {
            sources.push((path, language));
        } else {
            log::debug!("skipping {} (unsupported extension)", path.display());
            skipped += 1;
        }
    }
    Ok((sources, skipped))
}

/// Languages that need a pre-run divider self check: one per distinct
/// (lexer name, divider pattern) pair. Two extensions sharing a lexer but
/// registered with different divider span classes probe separately.
fn self_check_targets<'a>(sources: &[(PathBuf, &'a Language)]) -> Vec<&'a Language> {
    let mut keys: Vec<(&str, &str)> = Vec::new();
    let mut targets = Vec::new();
    for (_, language) in sources {
        let key = (language.name(), language.divider_html().as_str());
        if !keys.contains(&key) {
            keys.push(key);
            targets.push(*language);
        }
    }
    targets
}

/// Execute one full run: resolve the highlighter, discover sources, then
/// process them strictly in sequence.
pub async fn run(config: &RunConfig) -> Result<RunSummary, RunError> {
    let program = which::which(&config.highlighter).map_err(|_| RunError::MissingHighlighter {
        program: config.highlighter.clone(),
    })?;
    let highlighter = Highlighter::new(program);

    fs::create_dir_all(&config.output)
        .await
        .map_err(|source| RunError::Write {
            path: config.output.clone(),
            source,
        })?;
    let stylesheet_path = config.output.join(page::STYLESHEET_NAME);
    fs::write(&stylesheet_path, page::STYLESHEET)
        .await
        .map_err(|source| RunError::Write {
            path: stylesheet_path.clone(),
            source,
        })?;

    let (sources, skipped) = discover(config).await?;

    // Probe the divider round trip once per distinct lexer/pattern pair
    // before any real file goes through, so a highlighter whose comment
    // span class the registry does not match fails up front with a clear
    // message.
    for language in self_check_targets(&sources) {
        highlighter
            .self_check(language)
            .await
            .map_err(|source| RunError::SelfCheck {
                language: language.name().to_string(),
                source,
            })?;
    }

    let destinations: Vec<PathBuf> = sources
        .iter()
        .map(|(path, _)| destination(config, path))
        .collect();

    let mut pages = 0;
    for ((source, language), dest) in sources.iter().zip(&destinations) {
        let text = fs::read_to_string(source)
            .await
            .map_err(|source_err| RunError::Read {
                path: source.clone(),
                source: source_err,
            })?;

        let mut sections = sectionize(language, &text);
        highlighter
            .highlight(language, &mut sections)
            .await
            .map_err(|source_err| RunError::Highlight {
                path: source.clone(),
                source: source_err,
            })?;

        let links: Vec<SourceLink> = sources
            .iter()
            .zip(&destinations)
            .map(|((other, _), other_dest)| SourceLink {
                label: other.display().to_string(),
                href: href_from(dest, other_dest),
            })
            .collect();
        let title = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        let html = page::render(&PageContext {
            title: &title,
            sections: &sections,
            sources: &links,
            stylesheet_href: &href_from(dest, &stylesheet_path),
        });

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source_err| RunError::Write {
                    path: parent.to_path_buf(),
                    source: source_err,
                })?;
        }
        fs::write(dest, html)
            .await
            .map_err(|source_err| RunError::Write {
                path: dest.clone(),
                source: source_err,
            })?;
        println!("litdoc: {} -> {}", source.display(), dest.display());
        pages += 1;
    }

    Ok(RunSummary { pages, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mirror_dirs: bool) -> RunConfig {
        RunConfig {
            paths: vec![],
            output: PathBuf::from("docs"),
            mirror_dirs,
            highlighter: "pygmentize".to_string(),
            registry: LanguageRegistry::with_defaults(),
        }
    }

    #[test]
    fn test_flat_destination_keeps_only_the_file_name() {
        let dest = destination(&config(false), Path::new("src/deep/module.py"));
        assert_eq!(dest, PathBuf::from("docs/module.html"));
    }

    #[test]
    fn test_mirror_destination_reproduces_the_path() {
        let dest = destination(&config(true), Path::new("src/deep/module.py"));
        assert_eq!(dest, PathBuf::from("docs/src/deep/module.html"));
    }

    #[test]
    fn test_mirror_destination_cannot_escape_the_output_root() {
        let dest = destination(&config(true), Path::new("../outside/module.py"));
        assert_eq!(dest, PathBuf::from("docs/outside/module.html"));
        let dest = destination(&config(true), Path::new("/abs/module.py"));
        assert_eq!(dest, PathBuf::from("docs/abs/module.html"));
    }

    #[test]
    fn test_self_check_targets_dedupe_on_name_and_pattern() {
        let plain = Language::new("python", "#");
        let custom = Language::with_divider_class("python", "#", "cm");
        let sources = vec![
            (PathBuf::from("a.py"), &plain),
            (PathBuf::from("b.py"), &plain),
            (PathBuf::from("c.zpy"), &custom),
        ];

        let targets = self_check_targets(&sources);
        // Same lexer name, but the divider class override means both
        // patterns must be probed; the duplicate registration must not.
        assert_eq!(targets.len(), 2);
        assert_ne!(
            targets[0].divider_html().as_str(),
            targets[1].divider_html().as_str()
        );
    }

    #[test]
    fn test_href_between_sibling_pages() {
        assert_eq!(
            href_from(Path::new("docs/a.html"), Path::new("docs/b.html")),
            "b.html"
        );
    }

    #[test]
    fn test_href_climbs_out_of_subdirectories() {
        assert_eq!(
            href_from(Path::new("docs/sub/a.html"), Path::new("docs/litdoc.css")),
            "../litdoc.css"
        );
        assert_eq!(
            href_from(Path::new("docs/a.html"), Path::new("docs/sub/b.html")),
            "sub/b.html"
        );
    }
}
