//! litdoc-render — HTML production for litdoc
//!
//! Three stages live here: the batch highlighter bridge (one external
//! `pygmentize` round trip per file, recovered per section via divider
//! markers), the markdown renderer for comment text, and the page assembler
//! that binds highlighted sections into the final two-column page.

pub mod highlight;
pub mod markdown;
pub mod page;

pub use highlight::{HighlightError, Highlighter};
pub use page::{PageContext, SourceLink};
