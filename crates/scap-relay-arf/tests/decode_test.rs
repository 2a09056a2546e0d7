//! End-to-end decode tests over a representative ARF document.

use std::io::Write;

use scap_relay_arf::{decode, ParseError};
use scap_relay_core::content_digest;
use scap_relay_core::models::RuleStatus;

/// An ARF asset-report-collection: the report request carries the
/// benchmark definition, the report carries the test result.
const ARF_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<arf:asset-report-collection xmlns:arf="http://scap.nist.gov/schema/asset-reporting-format/1.1">
  <arf:report-requests>
    <arf:report-request id="collection1">
      <arf:content>
        <ds:data-stream-collection xmlns:ds="http://scap.nist.gov/schema/scap/source/1.2">
          <xccdf:Benchmark xmlns:xccdf="http://checklists.nist.gov/xccdf/1.2" id="bench1">
            <xccdf:Group id="g1">
              <xccdf:title>Access control</xccdf:title>
              <xccdf:Rule id="xccdf_rule_root_login" severity="high">
                <xccdf:title>Disable root login</xccdf:title>
                <xccdf:description>Remote root login must be disabled.</xccdf:description>
                <xccdf:rationale>Root access cannot be attributed.</xccdf:rationale>
                <xccdf:reference href="http://example.com/cce">CCE-27100-7</xccdf:reference>
                <xccdf:fix system="urn:xccdf:fix:script:sh" id="fix_root">echo PermitRootLogin no</xccdf:fix>
              </xccdf:Rule>
              <xccdf:Rule id="xccdf_rule_empty_passwords" severity="high">
                <xccdf:title>No empty passwords</xccdf:title>
                <xccdf:description>Empty passwords must not be allowed.</xccdf:description>
                <xccdf:rationale>Trivially guessable.</xccdf:rationale>
              </xccdf:Rule>
              <xccdf:Rule id="xccdf_rule_gdm_banner" severity="low">
                <xccdf:title>GDM login banner</xccdf:title>
                <xccdf:description>Only applies to graphical targets.</xccdf:description>
              </xccdf:Rule>
            </xccdf:Group>
          </xccdf:Benchmark>
        </ds:data-stream-collection>
      </arf:content>
    </arf:report-request>
  </arf:report-requests>
  <arf:reports>
    <arf:report id="report1">
      <arf:content>
        <xccdf:TestResult xmlns:xccdf="http://checklists.nist.gov/xccdf/1.2" id="tr1">
          <xccdf:rule-result idref="xccdf_rule_root_login" severity="high">
            <xccdf:result>pass</xccdf:result>
          </xccdf:rule-result>
          <xccdf:rule-result idref="xccdf_rule_empty_passwords" severity="high">
            <xccdf:result>fail</xccdf:result>
          </xccdf:rule-result>
          <xccdf:rule-result idref="xccdf_rule_gdm_banner" severity="low">
            <xccdf:result>notapplicable</xccdf:result>
          </xccdf:rule-result>
        </xccdf:TestResult>
      </arf:content>
    </arf:report>
  </arf:reports>
</arf:asset-report-collection>"#;

#[test]
fn test_metrics_and_log_exclude_notapplicable() {
    let report = decode(ARF_SAMPLE.as_bytes()).unwrap();

    assert_eq!(report.metrics.passed, 1);
    assert_eq!(report.metrics.failed, 1);
    assert_eq!(report.metrics.othered, 0);
    assert_eq!(report.logs.len(), 2);
    assert_eq!(report.metrics.total(), report.logs.len() as u32);
}

#[test]
fn test_log_entries_join_benchmark_detail() {
    let report = decode(ARF_SAMPLE.as_bytes()).unwrap();

    let first = &report.logs[0];
    assert_eq!(first.source, "xccdf_rule_root_login");
    assert_eq!(first.result, RuleStatus::Pass);
    assert_eq!(first.title, "Disable root login");
    assert_eq!(first.rationale, "Root access cannot be attributed.");
    assert_eq!(first.severity, "high");
    assert_eq!(first.references[0].title, "CCE-27100-7");
    assert_eq!(first.fixes[0].id, "fix_root");

    let second = &report.logs[1];
    assert_eq!(second.result, RuleStatus::Fail);
    assert_eq!(second.title, "No empty passwords");
}

#[test]
fn test_digest_matches_raw_input_bytes() {
    let report = decode(ARF_SAMPLE.as_bytes()).unwrap();
    assert_eq!(report.digest, content_digest(ARF_SAMPLE.as_bytes()));
}

#[test]
fn test_bzip2_compressed_archive_decodes() {
    let compressed = bzip2_encode(ARF_SAMPLE.as_bytes());

    let report = decode(&compressed).unwrap();
    assert_eq!(report.logs.len(), 2);
    // Digest covers the raw (compressed) input, not the decompressed XML.
    assert_eq!(report.digest, content_digest(&compressed));
    assert_ne!(report.digest, content_digest(ARF_SAMPLE.as_bytes()));
}

#[test]
fn test_unlisted_status_counts_as_othered() {
    let xml = ARF_SAMPLE.replace(
        "<xccdf:result>fail</xccdf:result>",
        "<xccdf:result>error</xccdf:result>",
    );
    let report = decode(xml.as_bytes()).unwrap();

    assert_eq!(report.metrics.passed, 1);
    assert_eq!(report.metrics.failed, 0);
    assert_eq!(report.metrics.othered, 1);
    assert_eq!(
        report.logs[1].result,
        RuleStatus::Other("error".to_string())
    );
}

#[test]
fn test_invalid_bytes_sanitized_not_fatal() {
    // Splice a lone latin-1 byte into a rule title.
    let xml = ARF_SAMPLE.replace("Disable root login", "Disable root login f\u{FFFD}r");
    let mut bytes = xml.into_bytes();
    let needle = "f\u{FFFD}r".as_bytes().to_vec();
    let pos = bytes
        .windows(needle.len())
        .position(|w| w == needle.as_slice())
        .unwrap();
    bytes.splice(pos..pos + needle.len(), b"f\xFCr".iter().copied());

    let report = decode(&bytes).unwrap();
    assert_eq!(report.logs[0].title, "Disable root login f\u{FFFD}r");
}

#[test]
fn test_archive_without_test_result_is_missing_element() {
    let xml = r#"<?xml version="1.0"?>
<arf:asset-report-collection xmlns:arf="http://scap.nist.gov/schema/asset-reporting-format/1.1">
  <arf:report-requests/>
  <arf:reports/>
</arf:asset-report-collection>"#;

    let result = decode(xml.as_bytes());
    assert!(matches!(result, Err(ParseError::MissingElement("TestResult"))));
}

fn bzip2_encode(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
