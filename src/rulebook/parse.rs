//! Suricata rule book parsers
//!
//! Handles the three text formats found in a rule book directory:
//! `.rules` files, `sid-msg.map` style files and `classification.config`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

static RULE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(alert|drop|reject)\s+(\w+)\s+(\S+)\s+(\S+)\s+->\s+(\S+)\s+(\S+)\s*\((.*)\)")
        .expect("rule header pattern is valid")
});

static OPTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+):?\s*"?([^"]+?)"?;"#).expect("rule option pattern is valid"));

const HEADER_FIELDS: [&str; 6] = [
    "action",
    "protocol",
    "src_ip",
    "src_port",
    "dest_ip",
    "dest_port",
];

/// One rule, header fields first, then its options in rule order.
///
/// Serialized flat so a rule reads as a single JSON object, e.g.
/// `{"action":"alert","protocol":"tcp",...,"msg":"...","sid":"1000001"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuricataRule {
    pub action: String,
    pub protocol: String,
    pub src_ip: String,
    pub src_port: String,
    pub dest_ip: String,
    pub dest_port: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl SuricataRule {
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

/// Parse a single rule line. Returns `None` for anything that is not an
/// `alert`, `drop` or `reject` rule.
pub fn parse_rule(line: &str) -> Option<SuricataRule> {
    let caps = RULE_REGEX.captures(line)?;

    let mut options = Map::new();
    for option in OPTION_REGEX.captures_iter(&caps[7]) {
        let key = &option[1];
        // header fields always come from the rule header
        if HEADER_FIELDS.contains(&key) {
            continue;
        }
        options.insert(key.to_string(), Value::String(option[2].to_string()));
    }

    Some(SuricataRule {
        action: caps[1].to_string(),
        protocol: caps[2].to_string(),
        src_ip: caps[3].to_string(),
        src_port: caps[4].to_string(),
        dest_ip: caps[5].to_string(),
        dest_port: caps[6].to_string(),
        options,
    })
}

/// Parse the contents of a `.rules` file, skipping blanks, comments and
/// lines that are not rules
pub fn parse_rules(text: &str) -> Vec<SuricataRule> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_rule)
        .collect()
}

/// `"{sid} {description}"` per line
pub fn parse_sid_map(text: &str) -> BTreeMap<String, String> {
    text.lines().filter_map(split_pair).collect()
}

/// `"{name} {definition}"` per line, `#` comments skipped
pub fn parse_classification_config(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter(|line| !line.trim().starts_with('#'))
        .filter_map(split_pair)
        .collect()
}

/// Split a trimmed line on its first whitespace run
fn split_pair(line: &str) -> Option<(String, String)> {
    let (key, rest) = line.trim().split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    if key.is_empty() || rest.is_empty() {
        return None;
    }
    Some((key.to_string(), rest.to_string()))
}
