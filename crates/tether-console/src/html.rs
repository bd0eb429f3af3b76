// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML console page.
//!
//! Three tables (pages, providers, features). Rows alternate between the
//! `odd` and `even` classes, starting over with `odd` in every table.

use std::fmt::Write;

use tether_publisher::Publisher;

struct RowClass {
    even: bool,
}

impl RowClass {
    fn new() -> Self {
        Self { even: false }
    }

    fn next(&mut self) -> &'static str {
        let class = if self.even { "even" } else { "odd" };
        self.even = !self.even;
        class
    }
}

/// Render a content-type list as `[ a,b ]`; empty lists render as `[  ]`.
pub fn content_list(types: &[String]) -> String {
    format!("[ {} ]", types.join(","))
}

/// Minimal escaping for text placed inside element content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn section_heading(out: &mut String, heading: &str) {
    let _ = writeln!(
        out,
        "<br/><p class=\"statline ui-state-highlight\">{}</p>",
        escape(heading)
    );
}

fn table_head(out: &mut String, columns: &[&str]) {
    out.push_str("<table class=\"nicetable\"><thead><tr>");
    for column in columns {
        let _ = write!(out, "<th class=\"header\">{column}</th>");
    }
    out.push_str("</tr></thead>\n");
}

fn row(out: &mut String, class: &str, cells: &[&str]) {
    let _ = write!(out, "<tr class=\"{class} ui-state-default\">");
    for cell in cells {
        let _ = write!(out, "<td>{}</td>", escape(cell));
    }
    out.push_str("</tr>\n");
}

pub fn render_pages(out: &mut String, publisher: &Publisher) {
    section_heading(out, "Pages:");
    table_head(out, &["Class", "Path", "Verb", "Accept Types", "Response Types"]);
    let mut rows = RowClass::new();
    for (name, descriptors) in publisher.endpoint_views() {
        for d in descriptors {
            row(
                out,
                rows.next(),
                &[
                    name.as_str(),
                    d.path(),
                    &d.verb().to_string(),
                    &content_list(d.accept_types()),
                    &content_list(d.response_types()),
                ],
            );
        }
    }
    out.push_str("</table>\n");
}

pub fn render_providers(out: &mut String, publisher: &Publisher) {
    section_heading(out, "Providers:");
    table_head(out, &["Class", "Interfaces"]);
    let mut rows = RowClass::new();
    for provider in publisher.provider_instances() {
        let decl = provider.declaration();
        row(out, rows.next(), &[decl.name(), &decl.interfaces().join(", ")]);
    }
    out.push_str("</table>\n");
}

pub fn render_features(out: &mut String, publisher: &Publisher) {
    section_heading(out, "Features:");
    table_head(out, &["Class"]);
    let mut rows = RowClass::new();
    for feature in publisher.feature_instances() {
        row(out, rows.next(), &[feature.declaration().name()]);
    }
    out.push_str("</table>\n");
}

/// The whole console page.
pub fn render_page(publisher: &Publisher, title: &str) -> String {
    let title = escape(title);
    let mut out = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head><body>\n<h1>{title}</h1>\n"
    );
    let _ = writeln!(
        out,
        "<p class=\"statline\">Mounted at {}</p>",
        escape(publisher.path())
    );
    render_pages(&mut out, publisher);
    render_providers(&mut out, publisher);
    render_features(&mut out, publisher);
    out.push_str("</body></html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tether_core::{MethodDecl, TypeDecl};
    use tether_test_utils::{FlakySource, MockService, RecordingDispatcher};

    fn active() -> (Arc<FlakySource>, Arc<Publisher>) {
        let source = Arc::new(FlakySource::new());
        let publisher =
            Publisher::builder(source.clone(), Arc::new(RecordingDispatcher::new())).build();
        publisher.activate().unwrap();
        (source, publisher)
    }

    fn classes(html: &str) -> Vec<&str> {
        html.match_indices("<tr class=\"")
            .map(|(i, m)| {
                let rest = &html[i + m.len()..];
                &rest[..rest.find(' ').unwrap_or(rest.len())]
            })
            .collect()
    }

    #[test]
    fn content_list_format() {
        assert_eq!(content_list(&[]), "[  ]");
        assert_eq!(
            content_list(&["a/b".to_string(), "c/d".to_string()]),
            "[ a/b,c/d ]"
        );
    }

    #[test]
    fn escape_markup() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn page_rows_carry_every_column() {
        let (source, publisher) = active();
        let decl = TypeDecl::new("app.Users").path("/users").method(
            MethodDecl::new("create")
                .post()
                .consumes(["application/json"])
                .produces(["application/json", "text/plain"]),
        );
        source.register(MockService::new(decl).into_arc());

        let mut out = String::new();
        render_pages(&mut out, &publisher);
        assert!(out.contains(
            "<tr class=\"odd ui-state-default\"><td>app.Users</td><td>/users</td><td>POST</td>\
             <td>[ application/json ]</td><td>[ application/json,text/plain ]</td></tr>"
        ));
    }

    #[test]
    fn row_classes_restart_per_table() {
        let (source, publisher) = active();
        let decl = TypeDecl::new("app.Users")
            .path("/users")
            .method(MethodDecl::new("a").get())
            .method(MethodDecl::new("b").post())
            .method(MethodDecl::new("c").put());
        source.register(MockService::new(decl).into_arc());
        source.register(MockService::provider("app.P1").into_arc());
        source.register(MockService::provider("app.P2").into_arc());
        source.register(MockService::feature("app.F1").into_arc());

        let html = render_page(&publisher, "Tether");
        assert_eq!(
            classes(&html),
            vec!["odd", "even", "odd", "odd", "even", "odd"]
        );
    }

    #[test]
    fn page_has_title_and_sections() {
        let (_, publisher) = active();
        let html = render_page(&publisher, "Tether <dev>");
        assert!(html.contains("<title>Tether &lt;dev&gt;</title>"));
        assert!(html.contains("Pages:"));
        assert!(html.contains("Providers:"));
        assert!(html.contains("Features:"));
        assert!(html.contains("Mounted at /services"));
    }
}
