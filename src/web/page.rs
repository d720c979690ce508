//! HTML rendering for the single-page form.

use std::fmt::Write as _;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::prompt::{Tone, ToneSelection};
use crate::session::SessionState;

/// One-shot banner shown above the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Input problem; nothing was sent.
    Warning(String),
    /// Provider failure.
    Error(String),
}

/// Everything needed to render the page for one session.
#[derive(Debug)]
pub struct PageView<'a> {
    /// Session record; its response is displayed when present.
    pub state: &'a SessionState,
    /// Enquiry to pre-fill the text area with.
    pub enquiry: &'a str,
    /// Currently selected tone.
    pub tone: &'a ToneSelection,
    /// Banner for this render only.
    pub notice: Option<&'a Notice>,
}

const STYLE: &str = r#"
body { font-family: 'Inter', sans-serif; margin: 0 auto; max-width: 1200px; padding: 1.5rem; color: #1a202c; }
.hero { background: linear-gradient(135deg, #0f2027, #203a43, #2c5364); padding: 2rem; border-radius: 16px; color: #fff; text-align: center; }
.columns { display: flex; gap: 2rem; margin-top: 1.5rem; }
.columns > section { flex: 1; }
textarea { width: 100%; height: 200px; }
button { width: 100%; padding: 0.6rem; margin-top: 0.6rem; }
.response-card { border: 1px solid #e2e8f0; border-radius: 14px; padding: 1.8rem 2rem; line-height: 1.7; }
.warning { background: #fffbeb; color: #92400e; padding: 0.8rem; border-radius: 8px; }
.error { background: #fef2f2; color: #991b1b; padding: 0.8rem; border-radius: 8px; }
.info { background: #eff6ff; color: #1e40af; padding: 0.8rem; border-radius: 8px; }
"#;

/// Render the full page.
pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Lead Response Assistant</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body>");
    html.push_str(
        "<div class=\"hero\"><h1>Lead Response Assistant</h1>\
         <p>Draft replies that acknowledge, ask, and suggest without guessing.</p></div>",
    );
    html.push_str("<div class=\"columns\"><section><h2>Customer Enquiry</h2>");
    html.push_str("<form method=\"post\" action=\"/generate\">");
    html.push_str("<label for=\"enquiry\">Paste the customer message below:</label>");
    let _ = write!(
        html,
        "<textarea id=\"enquiry\" name=\"enquiry\" placeholder=\"e.g. Hi, I am getting damp patches on my bedroom wall after rains. What should I do?\">{}</textarea>",
        escape_html(view.enquiry)
    );
    html.push_str(&tone_select(view.tone));
    html.push_str("<button type=\"submit\">Generate Response</button></form></section>");

    html.push_str("<section><h2>Drafted Reply</h2>");
    match view.notice {
        Some(Notice::Warning(text)) => {
            let _ = write!(html, "<div class=\"warning\">{}</div>", escape_html(text));
        }
        Some(Notice::Error(text)) => {
            let _ = write!(html, "<div class=\"error\">{}</div>", escape_html(text));
        }
        None => {}
    }
    match &view.state.last_response {
        Some(draft) => {
            let _ = write!(
                html,
                "<div class=\"response-card\">{}</div>",
                render_markdown(draft)
            );
            let _ = write!(
                html,
                "<details><summary>Copy-friendly plain text</summary><pre>{}</pre></details>",
                escape_html(draft)
            );
            html.push_str("<form method=\"post\" action=\"/regenerate\">");
            html.push_str(&tone_select(view.tone));
            html.push_str("<button type=\"submit\">Regenerate</button></form>");
        }
        None => html.push_str(
            "<div class=\"info\">Enter a customer enquiry on the left and click \
             <strong>Generate Response</strong>.</div>",
        ),
    }
    html.push_str("</section></div></body></html>");
    html
}

fn tone_select(selected: &ToneSelection) -> String {
    let mut html = String::from("<label>Response Tone <select name=\"tone\">");
    for tone in Tone::ALL {
        let marker = if *selected == ToneSelection::Known(tone) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            "<option value=\"{label}\"{marker}>{label}</option>",
            label = escape_html(tone.label())
        );
    }
    html.push_str("</select></label>");
    html
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Render a draft's Markdown to HTML.
///
/// Raw HTML in the draft is shown as text, and links whose scheme is not
/// `http`, `https` or `mailto` point nowhere.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len());
    html::push_html(&mut out, events);
    out
}

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    let lower = dest.trim_start().to_ascii_lowercase();
    let has_scheme = lower
        .split_once(':')
        .is_some_and(|(scheme, _)| !scheme.contains(['/', '?', '#']));
    let allowed = ["http:", "https:", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme));
    if has_scheme && !allowed {
        return CowStr::Borrowed("#");
    }
    dest
}
