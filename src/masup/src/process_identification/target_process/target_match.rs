use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A detection pattern compiled once when the catalog is loaded.
///
/// Matching is anchored at the start of the process name: `ida` matches `ida64`
/// but not `myida`. Patterns are never tested against the executable path.
#[derive(Clone)]
pub struct ToolPattern {
    source: String,
    regex: Regex,
}

impl ToolPattern {
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        // the raw pattern must stand on its own, or a stray `)` escapes the anchor group
        Regex::new(&source)?;
        let regex = Regex::new(&format!("^(?:{})", source))?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, process_name: &str) -> bool {
        self.regex.is_match(process_name)
    }
}

impl fmt::Debug for ToolPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ToolPattern").field(&self.source).finish()
    }
}

impl fmt::Display for ToolPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for ToolPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for ToolPattern {}

impl Hash for ToolPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl Serialize for ToolPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ida", "ida64", true)]
    #[case("ida", "ida", true)]
    #[case("ida", "myida", false)]
    #[case("x(32|64)dbg", "x64dbg.exe", true)]
    #[case("x(32|64)dbg", "x96dbg", false)]
    #[case("(?i)procmon", "Procmon64.exe", true)]
    #[case("wireshark|tshark", "tshark", true)]
    fn test_pattern_is_prefix_anchored(
        #[case] pattern: &str,
        #[case] process_name: &str,
        #[case] expected: bool,
    ) {
        let pattern = ToolPattern::new(pattern).unwrap();
        assert_eq!(pattern.is_match(process_name), expected);
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        // without the group, "a|b" would become "^a|b" and match "xb"
        let pattern = ToolPattern::new("ghidra|analyzeHeadless").unwrap();
        assert!(!pattern.is_match("run_analyzeHeadless"));
        assert!(pattern.is_match("analyzeHeadless"));
    }

    #[rstest]
    #[case("ida(")]
    #[case("ida)|(x")]
    #[case("[")]
    fn test_invalid_pattern_is_rejected(#[case] pattern: &str) {
        assert!(ToolPattern::new(pattern).is_err());
    }

    #[test]
    fn test_equality_uses_source() {
        assert_eq!(ToolPattern::new("ida").unwrap(), ToolPattern::new("ida").unwrap());
        assert_eq!(ToolPattern::new("ida").unwrap().to_string(), "ida");
    }
}
