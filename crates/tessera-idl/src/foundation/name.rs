//! Dotted, possibly generic-parameterized names parsed from source.
//!
//! A [`FullName`] is an ordered sequence of [`NamePart`]s:
//! `Outer(Text).Inner.someConst` has three parts, the first carrying one
//! generic argument (itself a `FullName`). A leading-dot form `.someConst`
//! marks a top-level constant reference.
//!
//! Capitalization is load-bearing: every part except the last must be
//! capitalized (it names a nested scope); the last part names a type when
//! capitalized and a value, constant, or annotation when lowercase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns true when the first character of `s` is uppercase.
pub fn is_capitalized(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_uppercase())
}

/// One segment of a dotted name: an identifier plus optional generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamePart {
    pub name: String,
    /// Generic type arguments, empty when none were written.
    pub type_args: Vec<FullName>,
}

impl NamePart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    pub fn with_args(name: impl Into<String>, type_args: Vec<FullName>) -> Self {
        Self {
            name: name.into(),
            type_args,
        }
    }
}

/// A dotted name as written in source, prior to resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullName {
    parts: Vec<NamePart>,
    /// Set for the leading-dot form `.name`, which always denotes a
    /// module-level constant.
    is_top_level_const: bool,
}

impl FullName {
    /// Creates a name from its parts. `parts` must be non-empty.
    pub fn new(parts: Vec<NamePart>) -> Self {
        debug_assert!(!parts.is_empty());
        Self {
            parts,
            is_top_level_const: false,
        }
    }

    /// Creates the leading-dot top-level constant form.
    pub fn top_level_const(name: impl Into<String>) -> Self {
        Self {
            parts: vec![NamePart::new(name)],
            is_top_level_const: true,
        }
    }

    /// Creates a simple single-segment name. Convenient in tests.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(vec![NamePart::new(name)])
    }

    pub fn parts(&self) -> &[NamePart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn part(&self, i: usize) -> &NamePart {
        &self.parts[i]
    }

    pub fn first(&self) -> &NamePart {
        &self.parts[0]
    }

    pub fn last(&self) -> &NamePart {
        self.parts.last().expect("FullName has at least one part")
    }

    pub fn is_top_level_const(&self) -> bool {
        self.is_top_level_const
    }

    /// A simple name is a single segment without the leading-dot form.
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1 && !self.is_top_level_const
    }

    /// True when any segment carries generic arguments.
    pub fn has_generic_args(&self) -> bool {
        self.parts.iter().any(|p| !p.type_args.is_empty())
    }

    /// Could this name reference a constant?
    ///
    /// Holds for the leading-dot form, and for any multi-segment name whose
    /// last segment is lowercase and carries no generic arguments.
    pub fn could_be_const_ref(&self) -> bool {
        let last = self.last();
        if !last.type_args.is_empty() || is_capitalized(&last.name) {
            return false;
        }
        self.is_top_level_const || self.parts.len() > 1
    }
}

impl fmt::Display for NamePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.type_args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_top_level_const {
            write!(f, ".")?;
        }
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_ref_predicate() {
        assert!(FullName::top_level_const("kFoo").could_be_const_ref());
        assert!(
            FullName::new(vec![NamePart::new("Outer"), NamePart::new("kFoo")])
                .could_be_const_ref()
        );
        // A simple lowercase name is an enumerant or field, not a const ref.
        assert!(!FullName::simple("kFoo").could_be_const_ref());
        // Capitalized terminal segment names a type.
        assert!(
            !FullName::new(vec![NamePart::new("Outer"), NamePart::new("Inner")])
                .could_be_const_ref()
        );
        // Generic arguments rule out a const ref.
        assert!(!FullName::new(vec![
            NamePart::new("Outer"),
            NamePart::with_args("foo", vec![FullName::simple("Int32")]),
        ])
        .could_be_const_ref());
    }

    #[test]
    fn display_round_trips_structure() {
        let name = FullName::new(vec![
            NamePart::with_args(
                "Map",
                vec![FullName::simple("Text"), FullName::simple("Int64")],
            ),
            NamePart::new("Entry"),
        ]);
        assert_eq!(name.to_string(), "Map(Text, Int64).Entry");
        assert_eq!(FullName::top_level_const("kMax").to_string(), ".kMax");
    }

    #[test]
    fn structural_equality() {
        let a = FullName::new(vec![NamePart::new("A"), NamePart::new("b")]);
        let b = FullName::new(vec![NamePart::new("A"), NamePart::new("b")]);
        assert_eq!(a, b);
        assert_ne!(a, FullName::top_level_const("b"));
    }
}
