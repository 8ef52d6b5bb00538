use crate::errors::DomainError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const MAX_DOMAIN_LEN: usize = 253;
pub const MAX_LABEL_LEN: usize = 63;

/// A syntactically valid, lower-cased domain name without the trailing dot.
///
/// Accepts host-name style labels (`[a-z0-9_-]`, 1..=63 octets each) and at
/// most 253 octets in presentation form. One trailing dot is tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(Arc<str>);

impl DomainName {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let name = input.strip_suffix('.').unwrap_or(input);

        if name.is_empty() {
            return Err(DomainError::InvalidDomainName(
                "domain name is empty".to_string(),
            ));
        }
        if name.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "domain name exceeds {} octets ({} given)",
                MAX_DOMAIN_LEN,
                name.len()
            )));
        }

        for label in name.split('.') {
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName(format!(
                    "empty label in '{}'",
                    input
                )));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "label '{}' exceeds {} octets",
                    label, MAX_LABEL_LEN
                )));
            }
            if !label.bytes().all(is_label_byte) {
                return Err(DomainError::InvalidDomainName(format!(
                    "label '{}' contains invalid characters",
                    label
                )));
            }
        }

        Ok(Self(name.to_ascii_lowercase().into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn labels(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.0.split('.')
    }

    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// Builds a name from raw wire labels.
    ///
    /// Each label is checked on its own before joining, so a label that
    /// carries a `.` is rejected instead of being read back as two labels.
    pub fn from_labels<'a, I>(labels: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut name = String::with_capacity(64);
        for label in labels {
            if !label.iter().copied().all(is_label_byte) {
                return Err(DomainError::InvalidDomainName(format!(
                    "label '{}' contains invalid characters",
                    label.escape_ascii()
                )));
            }
            if !name.is_empty() {
                name.push('.');
            }
            label.iter().for_each(|&b| name.push(char::from(b)));
        }
        Self::parse(&name)
    }

    /// True if `self` equals `zone` or lies below it on a label boundary.
    pub fn is_subdomain_of(&self, zone: &DomainName) -> bool {
        let name = self.as_str();
        let zone = zone.as_str();
        name == zone
            || (name.len() > zone.len()
                && name.ends_with(zone)
                && name.as_bytes()[name.len() - zone.len() - 1] == b'.')
    }
}

fn is_label_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
