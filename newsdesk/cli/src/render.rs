//! HTML rendering for the web surface
//!
//! Every piece of feed text and model output passes through `html_escape`
//! before it reaches the page; nothing upstream escapes anything.

use html_escape::{encode_double_quoted_attribute, encode_text};
use newsdesk_core::{Article, DigestReport, PromptStyle};

const STYLE: &str = "body{font-family:sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:1rem}\
pre{white-space:pre-wrap;word-wrap:break-word;overflow-x:auto;background:#f6f6f6;padding:1rem}\
.error{color:#a00}";

/// Form values to pre-select
pub struct FormState<'a> {
    /// Known categories
    pub categories: &'a [String],
    /// Selected category
    pub category: &'a str,
    /// Articles per feed
    pub count: usize,
    /// Selected style
    pub style: PromptStyle,
    /// Whether the prompt-only box is ticked
    pub prompt_only: bool,
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        encode_text(title)
    )
}

fn form(state: &FormState<'_>) -> String {
    let categories: String = state
        .categories
        .iter()
        .map(|c| {
            let selected = if c == state.category { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{selected}>{}</option>",
                encode_double_quoted_attribute(c),
                encode_text(c)
            )
        })
        .collect();

    let styles: String = PromptStyle::ALL
        .iter()
        .map(|s| {
            let selected = if *s == state.style { " selected" } else { "" };
            format!("<option value=\"{}\"{selected}>{}</option>", s.as_str(), s.label())
        })
        .collect();

    let checked = if state.prompt_only { " checked" } else { "" };

    format!(
        "<form action=\"/digest\" method=\"get\">\n\
         <label>Select news category: <select name=\"category\">{categories}</select></label>\n\
         <label>Enter number of articles per feed: \
         <input type=\"number\" name=\"count\" min=\"1\" step=\"1\" value=\"{}\"></label>\n\
         <label>Select prompt type: <select name=\"style\">{styles}</select></label>\n\
         <label><input type=\"checkbox\" name=\"prompt_only\" value=\"true\"{checked}> \
         Show the prompt only</label>\n\
         <p><button type=\"submit\">Fetch Articles</button></p>\n</form>",
        state.count
    )
}

/// Landing page with the digest form
pub fn index(state: &FormState<'_>) -> String {
    page(
        "Interactive News Fetcher",
        &format!(
            "<h1>Interactive News Fetcher</h1>\n{}\n<p>Click 'Fetch Articles' to view news.</p>",
            form(state)
        ),
    )
}

fn article_list(articles: &[Article]) -> String {
    let items: String = articles
        .iter()
        .map(|a| {
            format!(
                "<li><a href=\"{}\">{}</a> <small>{} &middot; {}</small><p>{}</p></li>\n",
                encode_double_quoted_attribute(&a.link),
                encode_text(&a.title),
                encode_text(&a.source),
                encode_text(&a.published),
                encode_text(&a.summary)
            )
        })
        .collect();
    format!("<ul>\n{items}</ul>")
}

/// Result page for a completed run
pub fn digest(state: &FormState<'_>, report: &DigestReport) -> String {
    let mut body = format!("<h1>Interactive News Fetcher</h1>\n{}\n", form(state));

    if let Some(ref headline) = report.headline {
        body.push_str(&format!("<h2>{}</h2>\n", encode_text(headline)));
    }
    match report.post {
        Some(ref post) => {
            body.push_str("<h2>Generated Social Media Post</h2>\n");
            body.push_str(&format!("<pre id=\"post\">{}</pre>\n", encode_text(post)));
        }
        None => {
            body.push_str("<h2>Prompt</h2>\n");
        }
    }
    body.push_str(&format!(
        "<details><summary>Prompt sent</summary><pre>{}</pre></details>\n",
        encode_text(&report.prompt)
    ));
    body.push_str(&format!(
        "<h2>Articles ({})</h2>\n{}",
        report.articles.len(),
        article_list(&report.articles)
    ));

    page("Generated Social Media Post", &body)
}

/// Page explaining why a run stopped
pub fn error(state: &FormState<'_>, message: &str) -> String {
    page(
        "Interactive News Fetcher",
        &format!(
            "<h1>Interactive News Fetcher</h1>\n{}\n<p class=\"error\">{}</p>",
            form(state),
            encode_text(message)
        ),
    )
}
