//! Server-rendered HTML for the dashboard.

use std::fmt::Write as _;

/// Outcome message shown above a form
#[derive(Debug, Clone)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// Sidebar entries: (path, label)
const MENU: [(&str, &str); 3] = [
    ("/models", "List Models"),
    ("/query", "Query Models"),
    ("/superset", "Create Superset Document"),
];

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;display:flex;min-height:100vh;color:#1f2933}\
nav{width:15rem;background:#f0f2f6;padding:1.5rem}\
nav h2{font-size:1rem;margin-top:0}\
nav a{display:block;padding:.4rem .6rem;border-radius:.3rem;color:inherit;text-decoration:none}\
nav a.active{background:#dbe4f0;font-weight:600}\
main{flex:1;padding:2rem 3rem;max-width:50rem}\
h1{color:#1c64f2;font-style:italic}\
label{display:block;margin-top:1rem;font-weight:600}\
input[type=text],select{width:100%;padding:.4rem;margin-top:.3rem}\
button{margin-top:1.2rem;padding:.5rem 1.2rem}\
.banner{padding:.8rem 1rem;border-radius:.3rem;margin:1rem 0}\
.success{background:#def7ec;color:#03543f}\
.error{background:#fde8e8;color:#9b1c1c}";

/// Escape text for use in element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_banner(banner: Option<&Banner>) -> String {
    match banner {
        Some(Banner::Success(text)) => {
            format!("<div class=\"banner success\">{}</div>", escape_html(text))
        }
        Some(Banner::Error(text)) => {
            format!("<div class=\"banner error\">{}</div>", escape_html(text))
        }
        None => String::new(),
    }
}

/// Wrap `body` in the page shell with the sidebar menu, highlighting `active`
pub fn layout(active: &str, body: &str) -> String {
    let mut nav = String::new();
    for (path, label) in MENU {
        let class = if path == active { " class=\"active\"" } else { "" };
        let _ = write!(nav, "<a href=\"{}\"{}>{}</a>", path, class, label);
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Language Model Interaction</title><style>{}</style></head>\
         <body><nav><h2>Options</h2>{}</nav><main>\
         <h1>Language Model Interaction</h1>{}</main></body></html>",
        STYLE, nav, body
    )
}

pub fn models_page(models: &[String]) -> String {
    let mut body = String::from("<h2>Installed Language Models</h2>");
    if models.is_empty() {
        body.push_str("<p>No models installed. Pull one with <code>ollama pull &lt;model&gt;</code>.</p>");
    } else {
        body.push_str("<ol>");
        for model in models {
            let _ = write!(body, "<li>{}</li>", escape_html(model));
        }
        body.push_str("</ol>");
    }
    layout("/models", &body)
}

pub fn query_page(banner: Option<&Banner>) -> String {
    let body = format!(
        "<h2>Query Language Models</h2>{}\
         <form method=\"post\" action=\"/query\">\
         <label for=\"question\">Enter your question</label>\
         <input type=\"text\" id=\"question\" name=\"question\" required>\
         <label for=\"output_file\">Enter output file name</label>\
         <input type=\"text\" id=\"output_file\" name=\"output_file\" required>\
         <button type=\"submit\">Query</button></form>",
        render_banner(banner)
    );
    layout("/query", &body)
}

pub fn superset_page(models: &[String], banner: Option<&Banner>) -> String {
    let mut options = String::new();
    for model in models {
        let escaped = escape_html(model);
        let _ = write!(options, "<option value=\"{}\">{}</option>", escaped, escaped);
    }

    let body = format!(
        "<h2>Create Superset Document</h2>{}\
         <form method=\"post\" action=\"/superset\" enctype=\"multipart/form-data\">\
         <label for=\"responses_file\">Upload responses file</label>\
         <input type=\"file\" id=\"responses_file\" name=\"responses_file\" required>\
         <label for=\"model\">Select a model</label>\
         <select id=\"model\" name=\"model\">{}</select>\
         <label for=\"output_file\">Enter output file name</label>\
         <input type=\"text\" id=\"output_file\" name=\"output_file\" required>\
         <button type=\"submit\">Create</button></form>",
        render_banner(banner),
        options
    );
    layout("/superset", &body)
}

/// Page for a failure outside any form
pub fn error_page(message: &str) -> String {
    layout("", &render_banner(Some(&Banner::Error(message.to_string()))))
}
