//! Reference extraction: find relative image targets in markdown text.
//!
//! Only the `![alt](target)` image syntax is recognised — this is not a
//! markdown parser. A target already carrying a network location
//! (`https://…`) is left alone; everything else is treated as a relative
//! filesystem reference to be uploaded and rewritten.
//!
//! ## Known limitation
//!
//! The pattern is non-greedy and line-local. Alt text containing a literal
//! `]`, or targets containing a literal `)`, mis-parse: the match stops at
//! the first closing bracket. This is long-standing observable behaviour
//! that downstream documents depend on; do not tighten the pattern without
//! an explicit compatibility decision.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(?:.*?)\]\((?P<target>.*?)\)").unwrap());

/// Collect the distinct relative image targets from `text`, in order of
/// first appearance.
///
/// Repeated identical targets collapse to a single entry; each is uploaded
/// once and substituted everywhere.
pub fn extract_relative_targets(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for caps in RE_IMAGE.captures_iter(text) {
        let target = &caps["target"];
        if is_remote(target) {
            continue;
        }
        if seen.insert(target.to_string()) {
            targets.push(target.to_string());
        }
    }

    targets
}

/// A target is remote when it parses as a URL with a host component.
///
/// This is a bare netloc check, not full URL validation: plain relative
/// paths fail to parse and count as local, `https://…` counts as remote,
/// and host-less schemes (`file:///…`, `data:…`) count as local and will
/// surface later as missing files.
fn is_remote(target: &str) -> bool {
    url::Url::parse(target)
        .map(|u| u.has_host())
        .unwrap_or(false)
}
