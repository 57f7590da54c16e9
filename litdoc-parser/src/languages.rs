//! Language registry
//!
//! Maps file extensions to language descriptors: the lexer name handed to the
//! external highlighter, the comment-line symbol, and the patterns derived
//! from that symbol (comment matcher, comment filter, divider token, divider
//! HTML pattern). The default table ships as an embedded JSON resource;
//! custom tables can be loaded from a file with the same shape.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

/// Class attribute pattern expected on the highlighted divider span.
///
/// Pygments wraps a comment line as `<span class="c">…</span>` or
/// `<span class="c1">…</span>` depending on the lexer, so the default
/// pattern accepts both. The pattern is a regex snippet and can be
/// overridden per language via the `divider_class` field of the table.
pub const DEFAULT_DIVIDER_CLASS: &str = "c1?";

/// One entry of a language table file: the highlighter lexer name and the
/// comment symbol, with an optional override for the divider span class.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSpec {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub divider_class: Option<String>,
}

/// A language descriptor with all patterns derived from its comment symbol.
///
/// Descriptors are immutable: every field is a deterministic function of
/// `(name, symbol, divider class)` fixed at construction time.
#[derive(Debug, Clone)]
pub struct Language {
    name: String,
    symbol: String,
    comment_matcher: Regex,
    comment_filter: Regex,
    divider_text: String,
    divider_html: Regex,
}

impl Language {
    /// Build a descriptor with the default divider span class.
    pub fn new(name: &str, symbol: &str) -> Self {
        Self::with_divider_class(name, symbol, DEFAULT_DIVIDER_CLASS)
    }

    /// Build a descriptor expecting `divider_class` (a regex snippet) as the
    /// class attribute of the highlighted divider span.
    pub fn with_divider_class(name: &str, symbol: &str, divider_class: &str) -> Self {
        let sym = regex::escape(symbol);
        // Leading whitespace, the symbol, then at most one space of padding.
        let comment_matcher =
            Regex::new(&format!(r"^\s*{}\s?", sym)).expect("comment matcher derivation is valid");
        // Hashbangs and string interpolations look like comments but are code.
        let comment_filter = Regex::new(&format!(r"(^#!/)|(^\s*{}\{{)", sym))
            .expect("comment filter derivation is valid");
        let divider_text = format!("\n{}DIVIDER\n", symbol);
        let divider_html = Regex::new(&format!(
            r#"\n*<span class="{}">{}DIVIDER</span>\n*"#,
            divider_class, sym
        ))
        .expect("divider pattern derivation is valid");
        Language {
            name: name.to_string(),
            symbol: symbol.to_string(),
            comment_matcher,
            comment_filter,
            divider_text,
            divider_html,
        }
    }

    /// Lexer identifier passed to the external highlighter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The literal comment-line prefix, e.g. `#`, `//`, `--`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether `line` is a comment line: it starts with the comment symbol
    /// and is not one of the filtered forms (hashbang, interpolation).
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_matcher.is_match(line) && !self.comment_filter.is_match(line)
    }

    /// Strip the matched comment prefix from a comment line.
    pub fn strip_comment<'a>(&self, line: &'a str) -> std::borrow::Cow<'a, str> {
        self.comment_matcher.replace(line, "")
    }

    /// The synthetic comment line inserted between code fragments before
    /// they are handed to the highlighter as one blob.
    pub fn divider_text(&self) -> &str {
        &self.divider_text
    }

    /// Pattern matching the highlighted form of [`divider_text`]; splitting
    /// the highlighter output on it recovers the per-fragment HTML.
    ///
    /// [`divider_text`]: Language::divider_text
    pub fn divider_html(&self) -> &Regex {
        &self.divider_html
    }
}

/// Error loading a language table.
#[derive(Debug)]
pub enum RegistryError {
    /// The table file is not valid JSON of the expected shape
    InvalidTable(String),
    /// An entry declares an empty comment symbol
    EmptySymbol(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidTable(msg) => write!(f, "invalid language table: {}", msg),
            RegistryError::EmptySymbol(ext) => {
                write!(f, "language table entry '{}' has an empty comment symbol", ext)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::InvalidTable(err.to_string())
    }
}

/// Registry of supported languages, keyed by file extension.
#[derive(Debug)]
pub struct LanguageRegistry {
    by_extension: HashMap<String, Language>,
}

impl LanguageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        LanguageRegistry {
            by_extension: HashMap::new(),
        }
    }

    /// Register a language for `extension` (leading dot ignored).
    ///
    /// An existing entry for the same extension is replaced.
    pub fn register(&mut self, extension: &str, language: Language) {
        self.by_extension
            .insert(extension.trim_start_matches('.').to_string(), language);
    }

    /// Build a registry from a JSON table mapping extensions to
    /// [`LanguageSpec`] entries.
    pub fn from_json(table: &str) -> Result<Self, RegistryError> {
        let specs: BTreeMap<String, LanguageSpec> = serde_json::from_str(table)?;
        let mut registry = Self::new();
        for (extension, spec) in specs {
            if spec.symbol.is_empty() {
                return Err(RegistryError::EmptySymbol(extension));
            }
            let class = spec.divider_class.as_deref().unwrap_or(DEFAULT_DIVIDER_CLASS);
            registry.register(
                &extension,
                Language::with_divider_class(&spec.name, &spec.symbol, class),
            );
        }
        Ok(registry)
    }

    /// Build the registry from the embedded default table.
    pub fn with_defaults() -> Self {
        Self::from_json(include_str!("../resources/languages.json"))
            .expect("embedded language table is valid")
    }

    /// Look up a language by file extension, with or without a leading dot.
    ///
    /// `None` means the extension is unsupported; callers skip such files
    /// rather than treating this as an error.
    pub fn for_extension(&self, extension: &str) -> Option<&Language> {
        self.by_extension.get(extension.trim_start_matches('.'))
    }

    /// Look up the language for a path by its extension.
    pub fn for_path(&self, path: &Path) -> Option<&Language> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.for_extension(ext))
    }

    /// All registered extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<_> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

static DEFAULTS: Lazy<LanguageRegistry> = Lazy::new(LanguageRegistry::with_defaults);

/// Shared registry built from the embedded default table.
pub fn defaults() -> &'static LanguageRegistry {
    &DEFAULTS
}
