//! Decoded form of an ARF archive.
//!
//! `ParsedReport` is a transient decode result: it is produced on demand
//! from a live upload body or a stored archive and is never persisted as
//! its own artifact. JSON is the downstream exchange format.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Outcome of evaluating one checklist rule.
///
/// The listed variants are the statuses the relay classifies; anything
/// else an archive carries (error, unknown, notchecked, informational)
/// lands in `Other` and counts toward the `othered` metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    Pass,
    Fail,
    Fixed,
    NotApplicable,
    NotSelected,
    Other(String),
}

impl RuleStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "pass" => RuleStatus::Pass,
            "fail" => RuleStatus::Fail,
            "fixed" => RuleStatus::Fixed,
            "notapplicable" => RuleStatus::NotApplicable,
            "notselected" => RuleStatus::NotSelected,
            other => RuleStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleStatus::Pass => "pass",
            RuleStatus::Fail => "fail",
            RuleStatus::Fixed => "fixed",
            RuleStatus::NotApplicable => "notapplicable",
            RuleStatus::NotSelected => "notselected",
            RuleStatus::Other(s) => s,
        }
    }

    /// Statuses that never enter the ordered log or the metrics.
    pub fn is_excluded(&self) -> bool {
        matches!(self, RuleStatus::NotApplicable | RuleStatus::NotSelected)
    }
}

impl Serialize for RuleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RuleStatus::parse(&s))
    }
}

/// A reference attached to a benchmark rule (e.g. an NIST control id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub href: String,
    pub title: String,
}

/// A remediation snippet attached to a benchmark rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixEntry {
    pub id: String,
    pub system: String,
    pub text: String,
}

/// One evaluated rule: its outcome plus the benchmark definition detail.
/// Every text field has been sanitized to valid displayable UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Rule identifier.
    pub source: String,
    pub result: RuleStatus,
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub references: Vec<ReferenceEntry>,
    pub fixes: Vec<FixEntry>,
    pub severity: String,
}

/// Aggregate counts over the non-excluded rule results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub passed: u32,
    pub failed: u32,
    pub othered: u32,
}

impl ReportMetrics {
    /// Classify one non-excluded status into the matching counter.
    pub fn record(&mut self, status: &RuleStatus) {
        match status {
            RuleStatus::Pass | RuleStatus::Fixed => self.passed += 1,
            RuleStatus::Fail => self.failed += 1,
            _ => self.othered += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.othered
    }
}

/// Structured summary of a decoded ARF archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedReport {
    /// Digest of the raw input bytes, independent of decode detail.
    pub digest: String,
    /// Ordered log of non-excluded rule results.
    pub logs: Vec<RuleResult>,
    pub metrics: ReportMetrics,
}
