// src/exam/rules.rs

use regex::Regex;

/// One named detection rule: a compiled pattern plus the confidence weight
/// it contributes when it matches.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pattern: Regex,
    pub weight: f64,
}

impl Rule {
    /// Patterns are compile-time literals; an invalid one is a programming
    /// error caught at process start.
    pub fn new(name: &'static str, pattern: &str, weight: f64) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("rule pattern must be valid"),
            weight,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// An ordered list of rules evaluated against a text. Keeping each detector
/// behind one of these makes confidence accumulation auditable and lets new
/// rules be added without touching control flow.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Names of all rules matching `text`, in rule order.
    pub fn matched(&self, text: &str) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| r.matches(text))
            .map(|r| r.name)
            .collect()
    }

    /// Whether any rule matches.
    pub fn any_match(&self, text: &str) -> bool {
        self.rules.iter().any(|r| r.matches(text))
    }

    /// Sum of weights of matching rules, with the matched rule names.
    pub fn accumulate(&self, text: &str) -> (f64, Vec<&'static str>) {
        let mut total = 0.0;
        let mut matched = Vec::new();
        for rule in &self.rules {
            if rule.matches(text) {
                total += rule.weight;
                matched.push(rule.name);
            }
        }
        (total, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_sums_matching_weights() {
        let set = RuleSet::new(vec![
            Rule::new("a", "foo", 0.15),
            Rule::new("b", "bar", 0.15),
            Rule::new("c", "baz", 0.15),
        ]);
        let (total, matched) = set.accumulate("foo and bar");
        assert!((total - 0.3).abs() < 1e-9);
        assert_eq!(matched, vec!["a", "b"]);
    }
}
