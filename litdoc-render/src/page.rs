//! Page assembly
//!
//! Binds highlighted sections into the final two-column page. This is a
//! plain substitution function over a typed context record: text fields
//! are HTML-escaped on the way in, the sections' pre-rendered HTML fields
//! are inserted verbatim, and nothing here evaluates anything.

use litdoc_parser::sections::Section;

/// Shared stylesheet, written once per run next to the generated pages.
pub const STYLESHEET: &str = include_str!("../css/litdoc.css");

/// Name the stylesheet is written under in the output root.
pub const STYLESHEET_NAME: &str = "litdoc.css";

/// A link to another generated page, for the jump-to menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    /// Display label, usually the source path.
    pub label: String,
    /// Href relative to the page being rendered.
    pub href: String,
}

/// Everything the page template binds against.
#[derive(Debug)]
pub struct PageContext<'a> {
    /// Page title, usually the source file name.
    pub title: &'a str,
    /// Highlighted sections, in file order.
    pub sections: &'a [Section],
    /// All pages of this run; the jump-to menu renders only when there is
    /// more than one.
    pub sources: &'a [SourceLink],
    /// Href of the shared stylesheet, relative to this page.
    pub stylesheet_href: &'a str,
}

/// Escape text for interpolation into HTML content or attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render a complete HTML page for one source file.
pub fn render(context: &PageContext<'_>) -> String {
    let title = escape(context.title);
    let mut page = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{stylesheet}\">\n\
         </head>\n\
         <body>\n\
         <div id=\"container\">\n",
        title = title,
        stylesheet = escape(context.stylesheet_href),
    );

    if context.sources.len() > 1 {
        page.push_str("<div id=\"jump_to\">Jump To &hellip;\n<div id=\"jump_wrapper\">\n<div id=\"jump_page\">\n");
        for source in context.sources {
            page.push_str(&format!(
                "<a class=\"source\" href=\"{}\">{}</a>\n",
                escape(&source.href),
                escape(&source.label),
            ));
        }
        page.push_str("</div>\n</div>\n</div>\n");
    }

    page.push_str(&format!(
        "<table cellpadding=\"0\" cellspacing=\"0\">\n\
         <thead>\n\
         <tr>\n\
         <th class=\"docs\"><h1>{}</h1></th>\n\
         <th class=\"code\"></th>\n\
         </tr>\n\
         </thead>\n\
         <tbody>\n",
        title,
    ));

    for (index, section) in context.sections.iter().enumerate() {
        let number = index + 1;
        page.push_str(&format!(
            "<tr id=\"section-{number}\">\n\
             <td class=\"docs\">\n\
             <div class=\"pilwrap\"><a class=\"pilcrow\" href=\"#section-{number}\">&#182;</a></div>\n\
             {docs}\n\
             </td>\n\
             <td class=\"code\">\n\
             {code}\n\
             </td>\n\
             </tr>\n",
            number = number,
            docs = section.docs_html.as_deref().unwrap_or(""),
            code = section.code_html.as_deref().unwrap_or(""),
        ));
    }

    page.push_str("</tbody>\n</table>\n</div>\n</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(docs: &str, code: &str) -> Section {
        Section {
            docs_text: String::new(),
            code_text: String::new(),
            docs_html: Some(docs.to_string()),
            code_html: Some(code.to_string()),
        }
    }

    #[test]
    fn test_title_is_escaped() {
        let sections = [section("<p>d</p>", "<pre>c</pre>")];
        let page = render(&PageContext {
            title: "a<b>.py",
            sections: &sections,
            sources: &[],
            stylesheet_href: "litdoc.css",
        });
        assert!(page.contains("<title>a&lt;b&gt;.py</title>"));
        assert!(page.contains("<h1>a&lt;b&gt;.py</h1>"));
    }

    #[test]
    fn test_section_html_is_inserted_verbatim() {
        let sections = [section("<p>docs</p>", "<div class=\"highlight\"><pre>x</pre></div>")];
        let page = render(&PageContext {
            title: "x.py",
            sections: &sections,
            sources: &[],
            stylesheet_href: "litdoc.css",
        });
        assert!(page.contains("<p>docs</p>"));
        assert!(page.contains("<div class=\"highlight\"><pre>x</pre></div>"));
    }

    #[test]
    fn test_sections_are_numbered_in_order() {
        let sections = [section("a", "1"), section("b", "2"), section("c", "3")];
        let page = render(&PageContext {
            title: "x.py",
            sections: &sections,
            sources: &[],
            stylesheet_href: "litdoc.css",
        });
        let first = page.find("id=\"section-1\"").unwrap();
        let second = page.find("id=\"section-2\"").unwrap();
        let third = page.find("id=\"section-3\"").unwrap();
        assert!(first < second && second < third);
        assert!(page.contains("href=\"#section-2\""));
    }

    #[test]
    fn test_jump_to_menu_needs_more_than_one_source() {
        let sections = [section("", "")];
        let one = [SourceLink {
            label: "a.py".to_string(),
            href: "a.html".to_string(),
        }];
        let two = [
            one[0].clone(),
            SourceLink {
                label: "b.py".to_string(),
                href: "b.html".to_string(),
            },
        ];

        let single = render(&PageContext {
            title: "a.py",
            sections: &sections,
            sources: &one,
            stylesheet_href: "litdoc.css",
        });
        assert!(!single.contains("jump_to"));

        let multi = render(&PageContext {
            title: "a.py",
            sections: &sections,
            sources: &two,
            stylesheet_href: "litdoc.css",
        });
        assert!(multi.contains("jump_to"));
        assert!(multi.contains("href=\"a.html\""));
        assert!(multi.contains("href=\"b.html\""));
    }

    #[test]
    fn test_stylesheet_href_is_linked() {
        let sections = [section("", "")];
        let page = render(&PageContext {
            title: "a.py",
            sections: &sections,
            sources: &[],
            stylesheet_href: "../litdoc.css",
        });
        assert!(page.contains("<link rel=\"stylesheet\" href=\"../litdoc.css\">"));
    }

    #[test]
    fn test_stylesheet_resource_is_embedded() {
        assert!(STYLESHEET.contains(".highlight"));
        assert!(STYLESHEET.contains("td.docs"));
    }
}
