//! Deterministic, offline HTML rendering of a [`Report`].
//! Same report, identical bytes. No external assets.

use super::cards::{Card, CardBody, Table};
use super::{AnnotatedImage, Report};

/// Element id used as the scroll target for a freshly rendered report.
pub const RESULTS_CONTAINER_ID: &str = "results__container";

const MINIMAL_CSS: &str = "body{font-family:sans-serif;margin:2rem}\
.results__card,.error__card{border:1px solid #ccc;border-radius:6px;margin:1rem 0;padding:1rem}\
.error__card{border-color:#d33;color:#a00;background:#fff4f4}\
.annotated-img__container img{max-width:100%}\
table{border-collapse:collapse;border:2px solid darkgray}\
th,td{border:1px solid darkgray;padding:.25rem .5rem;text-align:left}";

/// Render a full standalone page.
pub fn render_page(report: &Report) -> String {
    let mut w = Html::new();
    w.push("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    w.push("<title>Election Results Sheet</title><style>");
    w.push(MINIMAL_CSS);
    w.push("</style></head><body>");
    w.push(render_fragment(report));
    w.push("</body></html>");
    w.finish()
}

/// Render only the results container (image slot and data slot).
pub fn render_fragment(report: &Report) -> String {
    let mut w = Html::new();
    write_results_container(&mut w, report);
    w.finish()
}

struct Html {
    buf: String,
}

impl Html {
    fn new() -> Self {
        Self {
            buf: String::with_capacity(8 * 1024),
        }
    }

    fn push<S: AsRef<str>>(&mut self, s: S) {
        self.buf.push_str(s.as_ref());
    }

    fn text(&mut self, s: &str) {
        self.buf.push_str(&esc(s));
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn write_results_container(w: &mut Html, report: &Report) {
    w.push("<section id=\"");
    w.push(RESULTS_CONTAINER_ID);
    w.push("\" class=\"results__wrapper\">");

    w.push("<div class=\"annotated-img__container\">");
    if let Some(image) = &report.annotated_image {
        write_image(w, image);
    }
    w.push("</div>");

    w.push("<div class=\"results-data__container\">");
    for card in &report.cards {
        write_card(w, card);
    }
    w.push("</div></section>");
}

fn write_image(w: &mut Html, image: &AnnotatedImage) {
    w.push("<img src=\"");
    w.text(&image.src);
    w.push("\" alt=\"");
    w.text(&image.alt);
    w.push("\">");
}

fn write_card(w: &mut Html, card: &Card) {
    match card {
        Card::Results { title, body } => {
            w.push("<div class=\"results__card\"><div class=\"results__card--header\"><h3>");
            w.text(title);
            w.push("</h3></div><div class=\"results__card--body\">");
            match body {
                CardBody::Text(text) => {
                    w.push("<div>");
                    w.text(text);
                    w.push("</div>");
                }
                CardBody::Table(table) => write_table(w, table),
            }
            w.push("</div></div>");
        }
        Card::Error { message } => {
            w.push("<div class=\"error__card\">");
            w.text(message);
            w.push("</div>");
        }
    }
}

fn write_table(w: &mut Html, table: &Table) {
    w.push("<table><thead><tr>");
    for header in &table.headers {
        w.push("<th>");
        w.text(header);
        w.push("</th>");
    }
    w.push("</tr></thead><tbody>");
    for row in &table.rows {
        w.push("<tr>");
        for cell in row.cells() {
            w.push("<td>");
            w.text(&cell);
            w.push("</td>");
        }
        w.push("</tr>");
    }
    w.push("</tbody></table>");
}

fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
