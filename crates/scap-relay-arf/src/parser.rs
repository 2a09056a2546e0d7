//! Archive decoding into the structured report summary.

use scap_relay_core::content_digest;
use scap_relay_core::models::{ParsedReport, ReportMetrics, RuleResult, RuleStatus};

use crate::{container, xccdf, ParseError, ParseResult};

/// Decode raw ARF archive bytes into a [`ParsedReport`].
///
/// The digest is computed from the raw input bytes before any decode
/// work, so it matches the stored artifact regardless of compression.
/// Rules evaluated as `notapplicable` or `notselected` are skipped
/// entirely; everything else enters the ordered log with sanitized text
/// and is counted into the metrics.
pub fn decode(data: &[u8]) -> ParseResult<ParsedReport> {
    let digest = content_digest(data);

    let xml = container::decompress(data)?;
    let doc = xccdf::extract(&xml)?;

    if !doc.saw_test_result {
        return Err(ParseError::MissingElement("TestResult"));
    }

    let mut logs = Vec::new();
    let mut metrics = ReportMetrics::default();

    for evaluation in doc.evaluations {
        let status = RuleStatus::parse(&evaluation.result);
        if status.is_excluded() {
            continue;
        }
        metrics.record(&status);

        // A result can reference a rule the benchmark half does not
        // define (tailored content); the log entry then carries the
        // evaluation data alone.
        let def = doc.rules.get(&evaluation.idref);

        let severity = match def {
            Some(d) if !d.severity.is_empty() => d.severity.clone(),
            _ => evaluation.severity.clone(),
        };

        logs.push(RuleResult {
            source: evaluation.idref,
            result: status,
            title: def.map(|d| d.title.clone()).unwrap_or_default(),
            description: def.map(|d| d.description.clone()).unwrap_or_default(),
            rationale: def.map(|d| d.rationale.clone()).unwrap_or_default(),
            references: def.map(|d| d.references.clone()).unwrap_or_default(),
            fixes: def.map(|d| d.fixes.clone()).unwrap_or_default(),
            severity,
        });
    }

    tracing::debug!(
        digest = %digest,
        rules = logs.len(),
        passed = metrics.passed,
        failed = metrics.failed,
        othered = metrics.othered,
        "Decoded report archive"
    );

    Ok(ParsedReport {
        digest,
        logs,
        metrics,
    })
}
