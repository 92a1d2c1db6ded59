//! Name predicates

use regex::Regex;

use crate::error::FinderError;

/// Character class a whole name must consist of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Alphabetic characters only
    Letters,
    /// ASCII digits only
    Digits,
    /// Alphabetic characters or digits
    LettersOrDigits,
    /// Neither letters nor digits (obfuscated names such as `$$` or `_`)
    Symbols,
    /// Lowercase letters only
    Lowercase,
    /// Uppercase letters only
    Uppercase,
}

impl CharClass {
    fn admits(self, c: char) -> bool {
        match self {
            CharClass::Letters => c.is_alphabetic(),
            CharClass::Digits => c.is_ascii_digit(),
            CharClass::LettersOrDigits => c.is_alphanumeric(),
            CharClass::Symbols => !c.is_alphanumeric(),
            CharClass::Lowercase => c.is_lowercase(),
            CharClass::Uppercase => c.is_uppercase(),
        }
    }
}

/// Predicate tree over a candidate member name
#[derive(Debug, Clone)]
pub enum NameCondition {
    /// Whole name equals the value
    Equals {
        /// Expected name
        value: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// Name starts with the prefix
    StartsWith {
        /// Required prefix
        prefix: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// Name ends with the suffix
    EndsWith {
        /// Required suffix
        suffix: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// Name contains the needle
    Contains {
        /// Required substring
        needle: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// Whole name matches the pattern
    Matches(Regex),
    /// Every character of a non-empty name belongs to the class
    Only(CharClass),
    /// All children hold
    And(Vec<NameCondition>),
    /// At least one child holds
    Or(Vec<NameCondition>),
    /// Child does not hold
    Not(Box<NameCondition>),
}

impl NameCondition {
    /// Exact, case-sensitive name
    pub fn equals(value: impl Into<String>) -> Self {
        NameCondition::Equals {
            value: value.into(),
            ignore_case: false,
        }
    }

    /// Exact name, ignoring case
    pub fn equals_ignore_case(value: impl Into<String>) -> Self {
        NameCondition::Equals {
            value: value.into(),
            ignore_case: true,
        }
    }

    /// Case-sensitive prefix
    pub fn starts_with(prefix: impl Into<String>) -> Self {
        NameCondition::StartsWith {
            prefix: prefix.into(),
            ignore_case: false,
        }
    }

    /// Case-sensitive suffix
    pub fn ends_with(suffix: impl Into<String>) -> Self {
        NameCondition::EndsWith {
            suffix: suffix.into(),
            ignore_case: false,
        }
    }

    /// Case-sensitive substring
    pub fn contains(needle: impl Into<String>) -> Self {
        NameCondition::Contains {
            needle: needle.into(),
            ignore_case: false,
        }
    }

    /// Whole-name regular expression.
    ///
    /// The pattern is anchored, so `"m[A-Z]\\w+"` matches `mCount` but not
    /// `xmCount`. Fails with [`FinderError::InvalidSpec`] on a malformed
    /// pattern.
    pub fn pattern(pattern: &str) -> Result<Self, FinderError> {
        Regex::new(&format!("^(?:{})$", pattern))
            .map(NameCondition::Matches)
            .map_err(|e| FinderError::invalid_spec(format!("bad name pattern {:?}: {}", pattern, e)))
    }

    /// Name made only of the given character class
    pub fn only(class: CharClass) -> Self {
        NameCondition::Only(class)
    }

    /// Switch a leaf string comparison to case-insensitive.
    ///
    /// Has no effect on patterns, character classes, or combinators.
    pub fn ignore_case(self) -> Self {
        match self {
            NameCondition::Equals { value, .. } => NameCondition::Equals {
                value,
                ignore_case: true,
            },
            NameCondition::StartsWith { prefix, .. } => NameCondition::StartsWith {
                prefix,
                ignore_case: true,
            },
            NameCondition::EndsWith { suffix, .. } => NameCondition::EndsWith {
                suffix,
                ignore_case: true,
            },
            NameCondition::Contains { needle, .. } => NameCondition::Contains {
                needle,
                ignore_case: true,
            },
            other => other,
        }
    }

    /// Conjunction, flattening nested `And`s
    pub fn and(self, other: NameCondition) -> Self {
        match self {
            NameCondition::And(mut children) => {
                children.push(other);
                NameCondition::And(children)
            }
            first => NameCondition::And(vec![first, other]),
        }
    }

    /// Disjunction, flattening nested `Or`s
    pub fn or(self, other: NameCondition) -> Self {
        match self {
            NameCondition::Or(mut children) => {
                children.push(other);
                NameCondition::Or(children)
            }
            first => NameCondition::Or(vec![first, other]),
        }
    }

    /// Negation
    pub fn negate(self) -> Self {
        NameCondition::Not(Box::new(self))
    }

    /// Evaluate against a candidate name
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameCondition::Equals { value, ignore_case } => {
                compare(name, value, *ignore_case, |n, v| n == v)
            }
            NameCondition::StartsWith {
                prefix,
                ignore_case,
            } => compare(name, prefix, *ignore_case, |n, p| n.starts_with(p)),
            NameCondition::EndsWith {
                suffix,
                ignore_case,
            } => compare(name, suffix, *ignore_case, |n, s| n.ends_with(s)),
            NameCondition::Contains {
                needle,
                ignore_case,
            } => compare(name, needle, *ignore_case, |n, s| n.contains(s)),
            NameCondition::Matches(re) => re.is_match(name),
            NameCondition::Only(class) => {
                !name.is_empty() && name.chars().all(|c| class.admits(c))
            }
            NameCondition::And(children) => children.iter().all(|c| c.matches(name)),
            NameCondition::Or(children) => children.iter().any(|c| c.matches(name)),
            NameCondition::Not(child) => !child.matches(name),
        }
    }
}

fn compare(name: &str, operand: &str, ignore_case: bool, op: impl Fn(&str, &str) -> bool) -> bool {
    if ignore_case {
        op(&name.to_lowercase(), &operand.to_lowercase())
    } else {
        op(name, operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_operators() {
        assert!(NameCondition::equals("count").matches("count"));
        assert!(!NameCondition::equals("count").matches("Count"));
        assert!(NameCondition::starts_with("m").matches("mCount"));
        assert!(NameCondition::ends_with("Count").matches("mCount"));
        assert!(NameCondition::contains("Cou").matches("mCount"));
        assert!(!NameCondition::contains("xyz").matches("mCount"));
    }

    #[test]
    fn test_ignore_case() {
        assert!(NameCondition::equals_ignore_case("COUNT").matches("count"));
        assert!(NameCondition::starts_with("MC").ignore_case().matches("mCount"));
        assert!(NameCondition::contains("OUN").ignore_case().matches("mCount"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let cond = NameCondition::pattern("m[A-Z]\\w+").unwrap();
        assert!(cond.matches("mCount"));
        assert!(!cond.matches("xmCount"));
        assert!(!cond.matches("count"));
    }

    #[test]
    fn test_bad_pattern_rejected_at_construction() {
        let err = NameCondition::pattern("(unclosed").unwrap_err();
        assert!(matches!(err, FinderError::InvalidSpec { .. }));
    }

    #[test]
    fn test_char_classes() {
        assert!(NameCondition::only(CharClass::Letters).matches("abc"));
        assert!(!NameCondition::only(CharClass::Letters).matches("a1"));
        assert!(NameCondition::only(CharClass::Digits).matches("042"));
        assert!(NameCondition::only(CharClass::Symbols).matches("$_"));
        assert!(!NameCondition::only(CharClass::Symbols).matches("a_"));
        assert!(NameCondition::only(CharClass::Lowercase).matches("abc"));
        assert!(NameCondition::only(CharClass::Uppercase).matches("ABC"));
        assert!(!NameCondition::only(CharClass::Letters).matches(""));
    }

    #[test]
    fn test_combinators() {
        let cond = NameCondition::starts_with("m")
            .and(NameCondition::ends_with("t"))
            .and(NameCondition::contains("x").negate());
        assert!(cond.matches("mCount"));
        assert!(!cond.matches("mxt"));
        match &cond {
            NameCondition::And(children) => assert_eq!(children.len(), 3),
            other => panic!("expected flattened And, got {:?}", other),
        }

        let either = NameCondition::equals("a").or(NameCondition::equals("b"));
        assert!(either.matches("a"));
        assert!(either.matches("b"));
        assert!(!either.matches("c"));
    }
}
