//! Markdown rendering for comment text (comrak)

use comrak::{markdown_to_html, ComrakOptions};

/// Render a section's comment text to an HTML fragment.
pub fn to_html(text: &str) -> String {
    markdown_to_html(text, &default_comrak_options())
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options
}
