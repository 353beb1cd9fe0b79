//! Server-rendered form page.
//!
//! One page, three sections: basic information (range inputs), optional
//! house details (free text, collapsed) and location (drop-downs filled from
//! the training table). Submitted values are echoed back into the form.

use std::fmt::Write;

use crate::config::UiConfig;
use crate::domain::RawListing;
use crate::services::CategoryOptions;

/// Range input: field, label, min, max, default
const SLIDERS: [(&str, &str, i64, i64, i64); 3] = [
    ("rooms", "🛏️ Rooms", 1, 5, 3),
    ("bathroom", "🚿 Bathrooms", 1, 5, 2),
    ("car", "🚗 Car Spaces", 0, 5, 1),
];

const OPTIONAL_FIELDS: [(&str, &str); 4] = [
    ("landsize", "📐 Land Size (m²)"),
    ("buildingarea", "🏗️ Building Area (m²)"),
    ("yearbuilt", "📅 Year Built"),
    ("building_age", "⏳ Building Age"),
];

const SELECTS: [(&str, &str); 4] = [
    ("suburb", "🏘️ Suburb"),
    ("type", "🏠 Property Type"),
    ("councilarea", "🏛️ Council Area"),
    ("regionname", "🌏 Region Name"),
];

const STYLE: &str = "\
body{font-family:sans-serif;max-width:960px;margin:0 auto;padding:1rem}\
h1{text-align:center;color:#2E86C1}.subtitle{text-align:center;font-size:16px}\
.row{display:flex;gap:1rem;flex-wrap:wrap}.row>label{flex:1;min-width:180px;display:flex;flex-direction:column}\
.result{text-align:center;color:#27AE60}.error{text-align:center;color:#C0392B}\
button{margin:1.5rem auto;display:block;padding:.6rem 1.4rem;font-size:1rem}";

/// What to show under the button
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Estimate(String),
    Error(String),
}

pub fn render_page(
    ui: &UiConfig,
    options: &CategoryOptions,
    form: &RawListing,
    outcome: Option<&Outcome>,
) -> String {
    let title = escape_html(&ui.title);
    let mut html = String::with_capacity(16 * 1024);

    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><style>{STYLE}</style></head><body>\
         <h1>🏡 {title}</h1>\
         <p class=\"subtitle\">Predict housing prices based on property details and location 📍</p>\
         <form method=\"post\" action=\"/\">"
    );

    html.push_str("<h2>Basic Information</h2><div class=\"row\">");
    for (name, label, min, max, default) in SLIDERS {
        let value = slider_value(form.field(name), min, max, default);
        let _ = write!(
            html,
            "<label>{label}<input type=\"range\" id=\"{name}\" name=\"{name}\" \
             min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" \
             oninput=\"this.nextElementSibling.value=this.value\"><output>{value}</output></label>"
        );
    }
    html.push_str("</div>");

    let any_optional = OPTIONAL_FIELDS
        .iter()
        .any(|(name, _)| form.field(name).is_some_and(|v| !v.trim().is_empty()));
    let _ = write!(
        html,
        "<details{}><summary>🔧 More House Details (optional)</summary><div class=\"row\">",
        if any_optional { " open" } else { "" }
    );
    for (name, label) in OPTIONAL_FIELDS {
        let value = escape_html(form.field(name).unwrap_or(""));
        let _ = write!(
            html,
            "<label>{label}<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\"></label>"
        );
    }
    html.push_str("</div></details>");

    html.push_str("<h2>Location Information</h2><div class=\"row\">");
    for (name, label) in SELECTS {
        let selected = form.field(name).map(str::trim).unwrap_or("");
        let _ = write!(
            html,
            "<label>{label}<select id=\"{name}\" name=\"{name}\"><option value=\"\"></option>"
        );
        for value in options.get(name).map(Vec::as_slice).unwrap_or(&[]) {
            let escaped = escape_html(value);
            let mark = if value == selected { " selected" } else { "" };
            let _ = write!(html, "<option value=\"{escaped}\"{mark}>{escaped}</option>");
        }
        html.push_str("</select></label>");
    }
    html.push_str("</div>");

    html.push_str("<button type=\"submit\">🔮 Predict Price</button></form>");

    match outcome {
        Some(Outcome::Estimate(formatted)) => {
            let _ = write!(
                html,
                "<h2 class=\"result\">💰 Estimated Price: {}</h2>",
                escape_html(formatted)
            );
        }
        Some(Outcome::Error(message)) => {
            let _ = write!(html, "<p class=\"error\">{}</p>", escape_html(message));
        }
        None => {}
    }

    html.push_str("</body></html>");
    html
}

/// Submitted slider value clamped to its range, or the default when unusable
fn slider_value(raw: Option<&str>, min: i64, max: i64, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| (v.round() as i64).clamp(min, max))
        .unwrap_or(default)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
