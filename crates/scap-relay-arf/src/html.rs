//! HTML rendering of a decoded report.
//!
//! The HTML view is derived lazily at retrieval time from the decoded
//! structure; nothing HTML-shaped is ever persisted.

use scap_relay_core::models::ParsedReport;

use crate::{parser, ParseResult};

/// Decode an archive and render the rule table as a standalone HTML page.
pub fn render_html(data: &[u8]) -> ParseResult<String> {
    let report = parser::decode(data)?;
    Ok(render_parsed(&report))
}

/// Render an already-decoded report.
pub fn render_parsed(report: &ParsedReport) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Compliance report ");
    push_escaped(&mut out, &report.digest);
    out.push_str("</title>\n</head>\n<body>\n");

    out.push_str("<h1>Compliance report</h1>\n");
    out.push_str("<p>Digest: <code>");
    push_escaped(&mut out, &report.digest);
    out.push_str("</code></p>\n");

    out.push_str(&format!(
        "<p>Passed: {} &middot; Failed: {} &middot; Other: {}</p>\n",
        report.metrics.passed, report.metrics.failed, report.metrics.othered
    ));

    out.push_str("<table border=\"1\">\n<tr><th>Rule</th><th>Result</th><th>Severity</th><th>Title</th></tr>\n");
    for log in &report.logs {
        out.push_str("<tr><td>");
        push_escaped(&mut out, &log.source);
        out.push_str("</td><td>");
        push_escaped(&mut out, log.result.as_str());
        out.push_str("</td><td>");
        push_escaped(&mut out, &log.severity);
        out.push_str("</td><td>");
        push_escaped(&mut out, &log.title);
        out.push_str("</td></tr>\n");
    }
    out.push_str("</table>\n</body>\n</html>\n");

    out
}

/// Entity-escape untrusted text into the output buffer. Checklist content
/// is client-supplied and must never reach the page unescaped.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}
