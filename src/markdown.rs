//! Markdown rendering for plan fields.
//!
//! Generated plan text is markdown-flavored and often embeds TeX math
//! (`$x^2$`, `$$\frac{a}{b}$$`). Two profiles turn it into HTML:
//!
//! | Profile | Used by | Math | Styling |
//! |---|---|---|---|
//! | Interactive ([`render`]) | on-screen view, PDF capture | `math-inline` / `math-display` spans typeset by KaTeX in the page | page stylesheet |
//! | Static ([`render_static`]) | Word export | passed through as literal `$…$` text | inline `style` attributes |
//!
//! Both profiles escape raw HTML coming from the generator instead of passing
//! it through. Rendering never fails: empty input renders as nothing, unmatched
//! math delimiters stay literal text, and if the parser itself panics the field
//! degrades to its raw text in a plain paragraph. One bad field never takes
//! the rest of the document down with it.

use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html as md_html};
use std::panic::{self, UnwindSafe};

const P_STYLE: &str = "margin:0 0 10px 0;";
const LIST_STYLE: &str = "margin:0 0 10px 20px;padding:0;";
const LI_STYLE: &str = "margin-bottom:4px;";
const CODE_STYLE: &str = "font-family:Consolas,monospace;background-color:#f1f5f9;";

/// Render a field for the on-screen view.
///
/// With `math_enabled`, `$…$` and `$$…$$` become math spans; without it the
/// parser never looks for math and dollar signs are ordinary text.
pub fn render(text: &str, math_enabled: bool) -> Markup {
    if text.is_empty() {
        return PreEscaped(String::new());
    }
    let html = render_guarded(text, raw_paragraph, move |t| {
        interactive_html(t, math_enabled)
    });
    PreEscaped(html)
}

/// Render a field as self-contained, inline-styled HTML for the Word export.
pub fn render_static(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    render_guarded(text, raw_paragraph_styled, static_html)
}

/// Run `render_fn`, falling back to `fallback(text)` if it panics.
fn render_guarded<F>(text: &str, fallback: fn(&str) -> String, render_fn: F) -> String
where
    F: FnOnce(&str) -> String + UnwindSafe,
{
    let owned = text.to_string();
    match panic::catch_unwind(move || render_fn(&owned)) {
        Ok(html) => html,
        Err(_) => {
            tracing::warn!(len = text.len(), "markdown rendering failed, showing raw text");
            fallback(text)
        }
    }
}

fn raw_paragraph(text: &str) -> String {
    html! { p.md-raw { (text) } }.into_string()
}

fn raw_paragraph_styled(text: &str) -> String {
    html! { p style=(P_STYLE) { (text) } }.into_string()
}

fn base_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Raw HTML from the generator is shown as text, never interpreted.
fn neutralize_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    }
}

fn interactive_html(text: &str, math_enabled: bool) -> String {
    let mut options = base_options();
    if math_enabled {
        options.insert(Options::ENABLE_MATH);
    }
    // Escaped HTML blocks still get a paragraph so they flow like other blocks.
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Start(Tag::HtmlBlock) => Event::Html(CowStr::Borrowed("<p>")),
        Event::End(TagEnd::HtmlBlock) => Event::Html(CowStr::Borrowed("</p>\n")),
        other => neutralize_html(other),
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    md_html::push_html(&mut out, parser);
    out
}

fn static_html(text: &str) -> String {
    // Math is parsed only so it can be re-emitted verbatim; otherwise `*` and
    // `_` inside TeX would be read as emphasis.
    let mut options = base_options();
    options.insert(Options::ENABLE_MATH);
    let events = Parser::new_ext(text, options).map(|event| match neutralize_html(event) {
        Event::InlineMath(tex) => Event::Text(CowStr::from(format!("${tex}$"))),
        Event::DisplayMath(tex) => Event::Text(CowStr::from(format!("$${tex}$$"))),
        Event::Start(Tag::Paragraph) => open_tag("p", P_STYLE),
        Event::End(TagEnd::Paragraph) => close_tag("p"),
        Event::Start(Tag::HtmlBlock) => open_tag("p", P_STYLE),
        Event::End(TagEnd::HtmlBlock) => close_tag("p"),
        Event::Start(Tag::List(None)) => open_tag("ul", LIST_STYLE),
        Event::Start(Tag::List(Some(1))) => open_tag("ol", LIST_STYLE),
        Event::Start(Tag::List(Some(start))) => Event::Html(CowStr::from(format!(
            "<ol start=\"{start}\" style=\"{LIST_STYLE}\">"
        ))),
        Event::End(TagEnd::List(true)) => close_tag("ol"),
        Event::End(TagEnd::List(false)) => close_tag("ul"),
        Event::Start(Tag::Item) => open_tag("li", LI_STYLE),
        Event::End(TagEnd::Item) => close_tag("li"),
        Event::Code(code) => Event::Html(CowStr::from(
            html! { code style=(CODE_STYLE) { (code.as_ref()) } }.into_string(),
        )),
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 2);
    md_html::push_html(&mut out, events);
    out
}

fn open_tag(name: &str, style: &str) -> Event<'static> {
    Event::Html(CowStr::from(format!("<{name} style=\"{style}\">")))
}

fn close_tag(name: &str) -> Event<'static> {
    Event::Html(CowStr::from(format!("</{name}>")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render("", true).into_string(), "");
        assert_eq!(render("", false).into_string(), "");
        assert_eq!(render_static(""), "");
    }

    #[test]
    fn bold_without_math() {
        let html = render("**bold**", false).into_string();
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("math"));
    }

    #[test]
    fn paragraphs_lists_and_code() {
        let html = render("Intro\n\n- one\n- two\n\nUse `f(x)`", false).into_string();
        assert!(html.contains("<p>Intro</p>"));
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<code>f(x)</code>"));
    }

    #[test]
    fn inline_math_becomes_math_span() {
        let html = render("Solve $x^2 = 9$ now", true).into_string();
        assert!(html.contains("math-inline"));
        assert!(html.contains("x^2 = 9"));
    }

    #[test]
    fn display_math_becomes_display_span() {
        let html = render("$$\\frac{a}{b}$$", true).into_string();
        assert!(html.contains("math-display"));
    }

    #[test]
    fn math_disabled_leaves_dollars_as_text() {
        let html = render("Costs $5 and $6", false).into_string();
        assert!(!html.contains("math-inline"));
        assert!(html.contains("$5"));
    }

    #[test]
    fn unmatched_math_delimiter_stays_literal() {
        let html = render("Price is $5 per item", true).into_string();
        assert!(html.contains("$5 per item"));
        assert!(!html.contains("math-inline"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render("<script>alert('x')</script>", true).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));

        let html = render_static("hi <b onclick=\"x\">there</b>");
        assert!(!html.contains("<b onclick"));
    }

    #[test]
    fn html_block_is_escaped_inside_paragraph() {
        let html = render("<!-- c -->", true).into_string();
        assert!(html.starts_with("<p>&lt;!-- c --&gt;"));
        assert!(html.trim_end().ends_with("</p>"));

        let html = render_static("<div>\nnote\n</div>\n\nAfter");
        assert!(html.starts_with(&format!("<p style=\"{P_STYLE}\">&lt;div&gt;")));
        assert!(html.contains("&lt;/div&gt;"));
        assert!(html.contains(&format!("<p style=\"{P_STYLE}\">After</p>")));
        assert!(!html.contains("<div>"));
    }

    #[test]
    fn static_profile_comment_block_is_styled_paragraph() {
        let html = render_static("<!-- c -->");
        assert!(html.starts_with(&format!("<p style=\"{P_STYLE}\">&lt;!-- c --&gt;")));
        assert!(html.trim_end().ends_with("</p>"));
    }

    #[test]
    fn static_profile_inlines_styles() {
        let html = render_static("Para\n\n- a\n- b");
        assert!(html.contains(&format!("<p style=\"{P_STYLE}\">Para</p>")));
        assert!(html.contains(&format!("<ul style=\"{LIST_STYLE}\">")));
        assert!(html.contains(&format!("<li style=\"{LI_STYLE}\">a</li>")));
        assert!(html.contains("</ul>"));
    }

    #[test]
    fn static_profile_ordered_list_keeps_start() {
        let html = render_static("3. three\n4. four");
        assert!(html.contains("<ol start=\"3\""));
        assert!(html.contains("</ol>"));
    }

    #[test]
    fn static_profile_passes_math_through_literally() {
        let html = render_static("Expand $a*b*c$ and $$x_1 + x_2$$");
        assert!(html.contains("$a*b*c$"));
        assert!(html.contains("$$x_1 + x_2$$"));
        assert!(!html.contains("<em>"));
        assert!(!html.contains("math-inline"));
    }

    #[test]
    fn static_profile_escapes_inline_code() {
        let html = render_static("Type `a < b`");
        assert!(html.contains("a &lt; b"));
        assert!(html.contains("<code style="));
    }

    #[test]
    fn static_profile_emphasis() {
        let html = render_static("**Key** idea");
        assert!(html.contains("<strong>Key</strong>"));
    }

    #[test]
    fn panicking_renderer_falls_back_to_raw_text() {
        let html = render_guarded("**x** < y", raw_paragraph, |_| panic!("parser bug"));
        assert_eq!(html, "<p class=\"md-raw\">**x** &lt; y</p>");
    }

    #[test]
    fn styled_fallback_keeps_inline_style() {
        let html = render_guarded("a & b", raw_paragraph_styled, |_| panic!("parser bug"));
        assert_eq!(html, format!("<p style=\"{P_STYLE}\">a &amp; b</p>"));
    }
}
