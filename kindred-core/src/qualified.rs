//! Registrant-qualified extension names.

use std::fmt;

/// The identity of an extension: who contributed it and under what name.
///
/// Rendered as `registrant~name`, which is also how extension views appear
/// in request paths (`/changes/42/reviewnotes~stats`). Two registrants can
/// both contribute a `stats` extension without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    registrant: String,
    name: String,
}

impl QualifiedName {
    /// Separator between registrant and name.
    pub const SEPARATOR: char = '~';

    /// Registrant used for extensions shipped with the application itself.
    pub const CORE: &'static str = "core";

    /// Qualify `name` with `registrant`.
    pub fn new(registrant: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            registrant: registrant.into(),
            name: name.into(),
        }
    }

    /// Qualify `name` with the core registrant.
    pub fn core(name: impl Into<String>) -> Self {
        Self::new(Self::CORE, name)
    }

    /// Parse `registrant~name`. Both halves must be non-empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (registrant, name) = raw.split_once(Self::SEPARATOR)?;
        if registrant.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(registrant, name))
    }

    /// Who contributed the extension.
    pub fn registrant(&self) -> &str {
        &self.registrant
    }

    /// The short name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.registrant, Self::SEPARATOR, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name = QualifiedName::parse("reviewnotes~stats").unwrap();
        assert_eq!(name.registrant(), "reviewnotes");
        assert_eq!(name.name(), "stats");
        assert_eq!(name.to_string(), "reviewnotes~stats");

        assert_eq!(QualifiedName::core("labels").to_string(), "core~labels");
    }

    #[test]
    fn test_parse_rejects_unqualified() {
        assert!(QualifiedName::parse("stats").is_none());
        assert!(QualifiedName::parse("~stats").is_none());
        assert!(QualifiedName::parse("plugin~").is_none());
    }
}
