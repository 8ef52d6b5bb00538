use crate::domain_name::DomainName;
use crate::errors::DomainError;
use std::fmt;

/// Scope of names routed to one script: either the root (every name) or a
/// suffix matched on label boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneName {
    Root,
    Suffix(DomainName),
}

impl ZoneName {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed == "." {
            return Ok(ZoneName::Root);
        }
        DomainName::parse(trimmed).map(ZoneName::Suffix)
    }

    pub fn contains(&self, name: &DomainName) -> bool {
        match self {
            ZoneName::Root => true,
            ZoneName::Suffix(zone) => name.is_subdomain_of(zone),
        }
    }

    pub fn label_count(&self) -> usize {
        match self {
            ZoneName::Root => 0,
            ZoneName::Suffix(zone) => zone.label_count(),
        }
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneName::Root => f.write_str("."),
            ZoneName::Suffix(zone) => write!(f, "{}", zone),
        }
    }
}
