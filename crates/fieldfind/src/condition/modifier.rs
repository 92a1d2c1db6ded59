//! Modifier flags and rules

use std::fmt;

/// Member modifier flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    /// No modifiers
    pub const NONE: Self = Self(0x0000);
    /// public
    pub const PUBLIC: Self = Self(0x0001);
    /// private
    pub const PRIVATE: Self = Self(0x0002);
    /// protected
    pub const PROTECTED: Self = Self(0x0004);
    /// static
    pub const STATIC: Self = Self(0x0008);
    /// final
    pub const FINAL: Self = Self(0x0010);
    /// synchronized
    pub const SYNCHRONIZED: Self = Self(0x0020);
    /// volatile
    pub const VOLATILE: Self = Self(0x0040);
    /// transient
    pub const TRANSIENT: Self = Self(0x0080);
    /// native
    pub const NATIVE: Self = Self(0x0100);
    /// interface
    pub const INTERFACE: Self = Self(0x0200);
    /// abstract
    pub const ABSTRACT: Self = Self(0x0400);
    /// strictfp
    pub const STRICT: Self = Self(0x0800);
    /// Compiler-generated
    pub const SYNTHETIC: Self = Self(0x1000);

    const NAMED: [(Self, &'static str); 13] = [
        (Self::PUBLIC, "public"),
        (Self::PROTECTED, "protected"),
        (Self::PRIVATE, "private"),
        (Self::ABSTRACT, "abstract"),
        (Self::STATIC, "static"),
        (Self::FINAL, "final"),
        (Self::TRANSIENT, "transient"),
        (Self::VOLATILE, "volatile"),
        (Self::SYNCHRONIZED, "synchronized"),
        (Self::NATIVE, "native"),
        (Self::STRICT, "strictfp"),
        (Self::INTERFACE, "interface"),
        (Self::SYNTHETIC, "synthetic"),
    ];

    /// Create from raw bits
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Check if every flag of `other` is set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flag of `other` is set
    pub const fn intersects(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Check if no flag is set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Union of flags
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Difference (remove flags)
    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Parse a single flag name, or a hex / decimal bit value
    pub fn parse_flag(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "NONE" => return Some(Self::NONE),
            "STRICTFP" => return Some(Self::STRICT),
            _ => {}
        }
        if let Some((flag, _)) = Self::NAMED
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(&upper))
        {
            return Some(*flag);
        }
        if let Some(hex) = upper.strip_prefix("0X") {
            u16::from_str_radix(hex, 16).ok().map(Self::from_bits)
        } else {
            upper.parse::<u16>().ok().map(Self::from_bits)
        }
    }

    /// Parse combined flags from a pipe- or comma-separated string
    /// (e.g., `"PRIVATE|STATIC"`). The empty string parses to [`Modifiers::NONE`].
    pub fn parse(s: &str) -> Option<Self> {
        let mut result = Self::NONE;
        for part in s.split(['|', ',']) {
            if part.trim().is_empty() {
                continue;
            }
            result = result.union(Self::parse_flag(part)?);
        }
        Some(result)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in Self::NAMED.iter() {
            if self.contains(*flag) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Bitmask constraint over a member's modifiers.
///
/// All three masks must hold: every `all_of` flag set, at least one
/// `any_of` flag set (when non-empty), and no `none_of` flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierRule {
    all_of: Modifiers,
    any_of: Modifiers,
    none_of: Modifiers,
}

impl ModifierRule {
    /// Rule that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every flag in `flags`
    pub fn all_of(mut self, flags: Modifiers) -> Self {
        self.all_of = self.all_of.union(flags);
        self
    }

    /// Require at least one flag in `flags`
    pub fn any_of(mut self, flags: Modifiers) -> Self {
        self.any_of = self.any_of.union(flags);
        self
    }

    /// Forbid every flag in `flags`
    pub fn none_of(mut self, flags: Modifiers) -> Self {
        self.none_of = self.none_of.union(flags);
        self
    }

    /// Whether the rule constrains anything
    pub fn is_empty(&self) -> bool {
        self.all_of.is_empty() && self.any_of.is_empty() && self.none_of.is_empty()
    }

    /// Evaluate against a candidate's modifiers
    pub fn matches(&self, modifiers: Modifiers) -> bool {
        modifiers.contains(self.all_of)
            && (self.any_of.is_empty() || modifiers.intersects(self.any_of))
            && !modifiers.intersects(self.none_of)
    }
}
