//! Best-effort recovery of the declaration an annotation belongs to.

use once_cell::sync::Lazy;
use regex::Regex;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (?:export\s+)?(?:default\s+)?
        (?:pub(?:\([^)]*\))?\s+)?
        (?:static\s+)?(?:async\s+)?(?:abstract\s+)?(?:unsafe\s+)?
        (?:function\*?|class|const|let|var|interface|type|enum|struct|trait|fn|def|mod|impl)
        \s+
        ([A-Za-z_$][\w$]*)",
    )
    .expect("declaration pattern is valid")
});

static OWNER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*\.\s*$").expect("owner pattern is valid"));

/// Name declared on `line`, if it looks like a declaration
pub(crate) fn declared_name(line: &str) -> Option<&str> {
    DECLARATION
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| *name != "__mm")
}

/// Lines that may sit between a doc block and its declaration
pub(crate) fn is_attribute_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("#[") || trimmed.starts_with('@')
}

/// First declaration within `lookahead` non-blank lines
pub(crate) fn entity_after<'a>(lines: &[&'a str], lookahead: usize) -> Option<&'a str> {
    let mut seen = 0;
    for &line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_attribute_line(line) {
            continue;
        }
        if trimmed.starts_with("/*") || trimmed.starts_with("//") {
            return None;
        }
        if let Some(name) = declared_name(line) {
            return Some(name);
        }
        seen += 1;
        if seen >= lookahead {
            return None;
        }
    }
    None
}

/// Receiver names that refer to the enclosing declaration
const SELF_RECEIVERS: &[&str] = &["this", "self"];

/// Owner of an `__mm` object. `prefix` is the text before `__mm` on its own
/// line: `Owner.` wins, then a declaration on that line, then the nearest
/// declaration in the preceding window. `this.` and `self.` defer to the
/// window.
pub(crate) fn entity_before<'a>(
    prefix: &'a str,
    preceding: &[&'a str],
    window: usize,
) -> Option<&'a str> {
    if let Some(owner) = OWNER_PREFIX
        .captures(prefix)
        .and_then(|caps| caps.get(1))
        .filter(|owner| !SELF_RECEIVERS.contains(&owner.as_str()))
    {
        return Some(owner.as_str());
    }

    if let Some(name) = declared_name(prefix) {
        return Some(name);
    }

    preceding
        .iter()
        .rev()
        .take(window)
        .find_map(|line| declared_name(*line))
}
