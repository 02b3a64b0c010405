//! Pattern summary over a parsed rule set

use super::parse::SuricataRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[cfg(feature = "colored-output")]
use colored::Colorize;

/// Occurrence counts of each header value and option key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub actions: BTreeMap<String, u64>,
    pub protocols: BTreeMap<String, u64>,
    pub src_ips: BTreeMap<String, u64>,
    pub src_ports: BTreeMap<String, u64>,
    pub dest_ips: BTreeMap<String, u64>,
    pub dest_ports: BTreeMap<String, u64>,
    pub options: BTreeMap<String, u64>,
}

pub fn analyze_rules(rules: &[SuricataRule]) -> PatternSummary {
    let mut summary = PatternSummary::default();

    for rule in rules {
        bump(&mut summary.actions, &rule.action);
        bump(&mut summary.protocols, &rule.protocol);
        bump(&mut summary.src_ips, &rule.src_ip);
        bump(&mut summary.src_ports, &rule.src_port);
        bump(&mut summary.dest_ips, &rule.dest_ip);
        bump(&mut summary.dest_ports, &rule.dest_port);

        for key in rule.options.keys() {
            bump(&mut summary.options, key);
        }
    }

    summary
}

fn bump(counts: &mut BTreeMap<String, u64>, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}

impl PatternSummary {
    /// Human-readable report, one section per dimension
    pub fn render(&self) -> String {
        let sections = [
            ("Common Actions:", &self.actions),
            ("Common Protocols:", &self.protocols),
            ("Common Source IPs:", &self.src_ips),
            ("Common Source Ports:", &self.src_ports),
            ("Common Destination IPs:", &self.dest_ips),
            ("Common Destination Ports:", &self.dest_ports),
            ("Common Rule Options:", &self.options),
        ];

        let mut out = String::new();
        for (title, counts) in sections {
            let _ = writeln!(out, "\n{}", heading(title));
            for (value, count) in counts {
                let _ = writeln!(out, "  {}: {}", value, count);
            }
        }
        out
    }
}

#[cfg(feature = "colored-output")]
fn heading(title: &str) -> String {
    title.bold().cyan().to_string()
}

#[cfg(not(feature = "colored-output"))]
fn heading(title: &str) -> String {
    title.to_string()
}
