//! XCCDF extraction from an ARF document.
//!
//! One event-driven pass over the XML pulls out the two parts the relay
//! cares about: the benchmark's `Rule` definitions (carried inside the
//! report-request datastream) and the `TestResult` rule evaluations.
//! Namespace prefixes vary between producers, so elements are matched by
//! local name.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use scap_relay_core::models::{FixEntry, ReferenceEntry};

use crate::sanitize::sanitize_xml_text;
use crate::{ParseError, ParseResult};

/// A benchmark rule definition.
#[derive(Debug, Default, Clone)]
pub struct RuleDef {
    pub id: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub references: Vec<ReferenceEntry>,
    pub fixes: Vec<FixEntry>,
}

/// One `rule-result` from the test result, in document order.
#[derive(Debug, Default, Clone)]
pub struct RuleEvaluation {
    pub idref: String,
    pub severity: String,
    pub result: String,
}

/// The extracted halves of an ARF document.
#[derive(Debug, Default)]
pub struct ArfDocument {
    pub rules: HashMap<String, RuleDef>,
    pub evaluations: Vec<RuleEvaluation>,
    pub saw_test_result: bool,
}

/// Which text node the parser is currently filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Title,
    Description,
    Rationale,
    Reference,
    Fix,
    Result,
}

pub fn extract(xml: &[u8]) -> ParseResult<ArfDocument> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut doc = ArfDocument::default();

    let mut rule: Option<RuleDef> = None;
    let mut eval: Option<RuleEvaluation> = None;
    let mut pending_reference: Option<ReferenceEntry> = None;
    let mut pending_fix: Option<FixEntry> = None;
    let mut field = Field::None;

    loop {
        match reader.read_event_into(&mut buf) {
            Err(e) => return Err(ParseError::MalformedDocument(e.to_string())),
            Ok(Event::Eof) => break,

            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"TestResult" => doc.saw_test_result = true,
                b"Rule" => {
                    let mut def = RuleDef::default();
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"id" => def.id = sanitize_xml_text(&attr.value),
                            b"severity" => def.severity = sanitize_xml_text(&attr.value),
                            _ => {}
                        }
                    }
                    rule = Some(def);
                }
                b"rule-result" => {
                    let mut ev = RuleEvaluation::default();
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"idref" => ev.idref = sanitize_xml_text(&attr.value),
                            b"severity" => ev.severity = sanitize_xml_text(&attr.value),
                            _ => {}
                        }
                    }
                    eval = Some(ev);
                }
                b"title" if rule.is_some() => field = Field::Title,
                b"description" if rule.is_some() => field = Field::Description,
                b"rationale" if rule.is_some() => field = Field::Rationale,
                b"reference" if rule.is_some() => {
                    let mut entry = ReferenceEntry {
                        href: String::new(),
                        title: String::new(),
                    };
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"href" {
                            entry.href = sanitize_xml_text(&attr.value);
                        }
                    }
                    pending_reference = Some(entry);
                    field = Field::Reference;
                }
                b"fix" if rule.is_some() => {
                    let mut entry = FixEntry {
                        id: String::new(),
                        system: String::new(),
                        text: String::new(),
                    };
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"id" => entry.id = sanitize_xml_text(&attr.value),
                            b"system" => entry.system = sanitize_xml_text(&attr.value),
                            _ => {}
                        }
                    }
                    pending_fix = Some(entry);
                    field = Field::Fix;
                }
                b"result" if eval.is_some() => field = Field::Result,
                _ => {}
            },

            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"reference" if rule.is_some() => {
                    let mut entry = ReferenceEntry {
                        href: String::new(),
                        title: String::new(),
                    };
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"href" {
                            entry.href = sanitize_xml_text(&attr.value);
                        }
                    }
                    if let Some(def) = rule.as_mut() {
                        def.references.push(entry);
                    }
                }
                b"fix" if rule.is_some() => {
                    let mut entry = FixEntry {
                        id: String::new(),
                        system: String::new(),
                        text: String::new(),
                    };
                    for attr in e.attributes().flatten() {
                        match attr.key.local_name().as_ref() {
                            b"id" => entry.id = sanitize_xml_text(&attr.value),
                            b"system" => entry.system = sanitize_xml_text(&attr.value),
                            _ => {}
                        }
                    }
                    if let Some(def) = rule.as_mut() {
                        def.fixes.push(entry);
                    }
                }
                _ => {}
            },

            Ok(Event::Text(t)) => {
                let text = sanitize_xml_text(&t);
                append_text(
                    field,
                    &text,
                    &mut rule,
                    &mut eval,
                    &mut pending_reference,
                    &mut pending_fix,
                );
            }
            Ok(Event::CData(t)) => {
                let text = sanitize_xml_text(&t);
                append_text(
                    field,
                    &text,
                    &mut rule,
                    &mut eval,
                    &mut pending_reference,
                    &mut pending_fix,
                );
            }

            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"Rule" => {
                    if let Some(def) = rule.take() {
                        doc.rules.insert(def.id.clone(), def);
                    }
                    field = Field::None;
                }
                b"rule-result" => {
                    if let Some(ev) = eval.take() {
                        doc.evaluations.push(ev);
                    }
                    field = Field::None;
                }
                b"reference" if field == Field::Reference => {
                    if let (Some(entry), Some(def)) = (pending_reference.take(), rule.as_mut()) {
                        def.references.push(entry);
                    }
                    field = Field::None;
                }
                b"fix" if field == Field::Fix => {
                    if let (Some(entry), Some(def)) = (pending_fix.take(), rule.as_mut()) {
                        def.fixes.push(entry);
                    }
                    field = Field::None;
                }
                b"title" if field == Field::Title => field = Field::None,
                b"description" if field == Field::Description => field = Field::None,
                b"rationale" if field == Field::Rationale => field = Field::None,
                b"result" if field == Field::Result => field = Field::None,
                _ => {}
            },

            Ok(_) => {}
        }
        buf.clear();
    }

    Ok(doc)
}

/// Route accumulated text into whichever field is currently open. Text
/// nodes split by nested markup are joined with single spaces.
fn append_text(
    field: Field,
    text: &str,
    rule: &mut Option<RuleDef>,
    eval: &mut Option<RuleEvaluation>,
    pending_reference: &mut Option<ReferenceEntry>,
    pending_fix: &mut Option<FixEntry>,
) {
    if text.is_empty() {
        return;
    }
    match field {
        Field::Title => {
            if let Some(def) = rule.as_mut() {
                push_joined(&mut def.title, text);
            }
        }
        Field::Description => {
            if let Some(def) = rule.as_mut() {
                push_joined(&mut def.description, text);
            }
        }
        Field::Rationale => {
            if let Some(def) = rule.as_mut() {
                push_joined(&mut def.rationale, text);
            }
        }
        Field::Reference => {
            if let Some(entry) = pending_reference.as_mut() {
                push_joined(&mut entry.title, text);
            }
        }
        Field::Fix => {
            if let Some(entry) = pending_fix.as_mut() {
                push_joined(&mut entry.text, text);
            }
        }
        Field::Result => {
            if let Some(ev) = eval.as_mut() {
                push_joined(&mut ev.result, text);
            }
        }
        Field::None => {}
    }
}

fn push_joined(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}
