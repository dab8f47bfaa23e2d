//! Turtle emission for lifted governance profiles.
//!
//! The vocabulary here mirrors the governance reference spreadsheet: each
//! row label maps to one `sagegov:` predicate, a fixed subset of rows is
//! boolean-valued, and access levels / identifiability risks are
//! canonicalized to named terms instead of repeating free text.

use super::Profile;
use std::collections::HashMap;

/// Row label to predicate, in emission order.
const PROPERTY_ORDER: [(&str, &str); 16] = [
    ("Identifiability risks", "sagegov:identifiabilityRisk"),
    ("Access Level", "sagegov:accessLevel"),
    ("Description", "dct:description"),
    ("Capabilities", "sagegov:capabilities"),
    ("Examples", "sagegov:example"),
    ("Downloadable data", "sagegov:downloadable"),
    ("Redistribution", "sagegov:redistribution"),
    ("Affiliation Requirement", "sagegov:affiliationRequirement"),
    ("Synapse Account", "sagegov:synapseAccountRequirement"),
    ("Human Subjects Training", "sagegov:humanSubjectsTraining"),
    ("Data Access Request", "sagegov:dataAccessRequest"),
    (
        "Data Use Certificate Signed by Signing Official",
        "sagegov:dataUseCertificate",
    ),
    (
        "General description of research objectives (posted)",
        "sagegov:researchObjectiveRequirement",
    ),
    ("Proof of IRB approval", "sagegov:irbApproval"),
    (
        "Technical environment security standards",
        "sagegov:securityRequirements",
    ),
    ("Approval Process", "sagegov:approvalProcess"),
];

/// Row labels whose values are yes/no facts, emitted as xsd booleans.
const BOOLEAN_FIELDS: [&str; 9] = [
    "Downloadable data",
    "Redistribution",
    "Affiliation Requirement",
    "Synapse Account",
    "Human Subjects Training",
    "Data Access Request",
    "Data Use Certificate Signed by Signing Official",
    "General description of research objectives (posted)",
    "Proof of IRB approval",
];

/// Canonical access level terms: (term, spreadsheet label, comment).
const ACCESS_LEVELS: [(&str, &str, &str); 5] = [
    (
        "AnonymousOrOpen",
        "Anonymous / Open",
        "Data is usable without registration or affiliation.",
    ),
    (
        "Registered",
        "Registered",
        "Data usage requires a Synapse account but not additional governance approvals.",
    ),
    (
        "RestrictedLimited",
        "Restricted / Limited",
        "Data usage limited by contributor-defined contract terms.",
    ),
    (
        "Controlled",
        "Controlled",
        "Data potentially re-identifiable and subject to access review.",
    ),
    (
        "Enclave",
        "Enclave",
        "Sensitive data that must remain inside a secure compute enclave.",
    ),
];

/// Canonical identifiability risk terms: (term, spreadsheet label, comment).
const IDENTIFIABILITY_RISKS: [(&str, &str, &str); 3] = [
    (
        "LowIdentifiabilityRisk",
        "Low",
        "Data has low likelihood of re-identification.",
    ),
    (
        "SomeIdentifiabilityRisk",
        "Some risks",
        "Data could, in certain contexts, be used to re-identify individuals.",
    ),
    (
        "HighIdentifiabilityRisk",
        "High",
        "Data is likely to re-identify individuals if misused.",
    ),
];

/// Free-text access level values that did not canonicalize still get kept,
/// under this predicate, next to the canonical term.
const ACCESS_LEVEL_NOTE_PRED: &str = "sagegov:accessLevelNote";

/// Cell values ending in this marker carry a contributor-exception footnote.
const EXCEPTION_MARKER: &str = "**";

const PREFIX_BLOCK: &str = "\
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
@prefix dct: <http://purl.org/dc/terms/> .
@prefix sagegov: <https://synapse.org/synbiont/governance/> .";

const CLASS_BLOCK: &str = "\
sagegov:AccessProfile rdf:type owl:Class ;
  rdfs:label \"Sage governance access profile\" ;
  rdfs:comment \"Profiles derived from the Sage governance reference spreadsheet.\" .

sagegov:AccessLevel rdf:type owl:Class ;
  rdfs:label \"Access level\" ;
  rdfs:comment \"Permitted usage tiers for Synapse data.\" .

sagegov:IdentifiabilityRisk rdf:type owl:Class ;
  rdfs:label \"Identifiability risk\" ;
  rdfs:comment \"Relative likelihood that data could be used to re-identify individuals.\" .";

/// Quote a string as a Turtle literal, escaping the characters Turtle
/// cannot carry raw inside a double-quoted literal.
pub(crate) fn literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.trim().chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Parse a yes/no cell, tolerating case, single-letter forms, and trailing
/// footnote asterisks. Anything else is not a boolean.
pub(crate) fn normalize_bool(value: &str) -> Option<bool> {
    let collapsed = value.trim().trim_end_matches('*').trim();
    match collapsed.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

fn lookup_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub(crate) fn access_level_term(value: &str) -> Option<&'static str> {
    let key = lookup_key(value);
    ACCESS_LEVELS
        .iter()
        .find(|(_, label, _)| lookup_key(label) == key)
        .map(|(term, _, _)| *term)
}

pub(crate) fn identifiability_risk_term(value: &str) -> Option<&'static str> {
    let key = lookup_key(value);
    IDENTIFIABILITY_RISKS
        .iter()
        .find(|(_, label, _)| lookup_key(label) == key)
        .map(|(term, _, _)| *term)
}

fn is_reserved(identifier: &str) -> bool {
    ACCESS_LEVELS.iter().any(|(term, _, _)| *term == identifier)
        || IDENTIFIABILITY_RISKS
            .iter()
            .any(|(term, _, _)| *term == identifier)
}

/// Derive a CamelCase local name from a profile label. Slashes read as
/// alternatives ("A / B" becomes "AOrB"), all-caps words keep their case,
/// names colliding with vocabulary terms get a "Profile" suffix, and
/// repeated names get a numeric suffix.
pub(crate) fn camel_case_identifier(value: &str, seen: &mut HashMap<String, usize>) -> String {
    let safe = value.replace('/', " Or ");
    let parts: Vec<&str> = safe
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|p| !p.is_empty())
        .collect();

    let mut base = if parts.is_empty() {
        "Profile".to_string()
    } else {
        parts
            .iter()
            .map(|p| {
                let all_caps = p.chars().any(|c| c.is_ascii_alphabetic())
                    && *p == p.to_ascii_uppercase();
                if all_caps {
                    (*p).to_string()
                } else {
                    let mut chars = p.chars();
                    match chars.next() {
                        Some(first) => {
                            first.to_ascii_uppercase().to_string()
                                + &chars.as_str().to_ascii_lowercase()
                        }
                        None => String::new(),
                    }
                }
            })
            .collect()
    };

    if is_reserved(&base) {
        base.push_str("Profile");
    }
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        base = format!("Profile{}", base);
    }

    let count = *seen.get(&base).unwrap_or(&0);
    if count > 0 {
        let id = format!("{}{}", base, count + 1);
        seen.insert(base, count + 1);
        id
    } else {
        seen.insert(base.clone(), 1);
        base
    }
}

fn term_defs_block(class: &str, defs: &[(&str, &str, &str)]) -> String {
    defs.iter()
        .map(|(term, label, comment)| {
            format!(
                "sagegov:{}\n  rdfs:subClassOf sagegov:{} ;\n  skos:prefLabel {} ;\n  rdfs:comment {} .",
                term,
                class,
                literal(label),
                literal(comment)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn profile_block(
    profile: &Profile,
    seen: &mut HashMap<String, usize>,
    source_note: &str,
) -> Option<String> {
    let mut names = profile.names.clone();
    if names.is_empty() {
        // Columns without a "Data Type" row fall back to their access level.
        if let Some(level) = profile.values("Access Level").first() {
            names.push(level.clone());
        }
    }
    let pref_label = names.first()?.clone();
    let alt_labels: Vec<&String> = names.iter().skip(1).filter(|n| **n != pref_label).collect();

    let node_id = camel_case_identifier(&pref_label, seen);
    let mut lines = vec![
        format!("sagegov:{} rdf:type sagegov:AccessProfile ;", node_id),
        format!("  skos:prefLabel {} ;", literal(&pref_label)),
    ];
    for alt in alt_labels {
        lines.push(format!("  skos:altLabel {} ;", literal(alt)));
    }

    for (label, predicate) in PROPERTY_ORDER {
        let values = profile.values(label);
        if values.is_empty() {
            continue;
        }
        if label == "Access Level" {
            // First canonicalizable value becomes the term; the others are
            // kept verbatim as notes so no spreadsheet text is lost.
            let canonical = values
                .iter()
                .enumerate()
                .find_map(|(idx, v)| access_level_term(v).map(|term| (idx, term)));
            match canonical {
                Some((canonical_idx, term)) => {
                    lines.push(format!("  {} sagegov:{} ;", predicate, term));
                    for (idx, value) in values.iter().enumerate() {
                        if idx != canonical_idx {
                            lines.push(format!(
                                "  {} {} ;",
                                ACCESS_LEVEL_NOTE_PRED,
                                literal(value)
                            ));
                        }
                    }
                }
                None => {
                    for value in values {
                        lines.push(format!("  {} {} ;", predicate, literal(value)));
                    }
                }
            }
            continue;
        }
        if label == "Identifiability risks" {
            for value in values {
                match identifiability_risk_term(value) {
                    Some(term) => lines.push(format!("  {} sagegov:{} ;", predicate, term)),
                    None => lines.push(format!("  {} {} ;", predicate, literal(value))),
                }
            }
            continue;
        }
        let boolean_field = BOOLEAN_FIELDS.contains(&label);
        for value in values {
            let object = match normalize_bool(value) {
                Some(b) if boolean_field => b.to_string(),
                _ => literal(value),
            };
            lines.push(format!("  {} {} ;", predicate, object));
            if value.trim_end().ends_with(EXCEPTION_MARKER) {
                lines.push("  sagegov:allowsException true ;".to_string());
            }
        }
    }

    lines.push(format!("  dct:source {} .", literal(source_note)));
    Some(lines.join("\n"))
}

/// Serialize lifted profiles as a self-contained Turtle module: prefixes,
/// class and term scaffolding, then one subject per profile.
pub fn build_turtle(profiles: &[Profile], source_note: &str) -> String {
    let mut blocks = vec![
        PREFIX_BLOCK.to_string(),
        CLASS_BLOCK.to_string(),
        term_defs_block("AccessLevel", &ACCESS_LEVELS),
        term_defs_block("IdentifiabilityRisk", &IDENTIFIABILITY_RISKS),
    ];
    let mut seen = HashMap::new();
    for profile in profiles {
        if let Some(block) = profile_block(profile, &mut seen, source_note) {
            blocks.push(block);
        }
    }
    blocks.join("\n\n") + "\n"
}
