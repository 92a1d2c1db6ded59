//! Stateless member predicates
//!
//! [`NameCondition`] is a predicate tree over a candidate's name and
//! [`ModifierRule`] a bitmask constraint over its [`Modifiers`]. Both are
//! pure: evaluation has no side effects and cannot fail. Malformed patterns
//! are rejected when the condition is built.

mod modifier;
mod name;

pub use modifier::{ModifierRule, Modifiers};
pub use name::{CharClass, NameCondition};
