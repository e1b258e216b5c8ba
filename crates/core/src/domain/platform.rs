// Platform Info record

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::DomainError;
use super::value::{FieldValue, Record};

/// A named fact about the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostFact {
    Version,
    Uptime,
    Platform,
    Type,
    Release,
    Hostname,
    Arch,
    TotalMem,
    FreeMem,
    Endianness,
}

impl HostFact {
    /// Facts collected when no explicit list is configured
    pub const DEFAULTS: [HostFact; 7] = [
        HostFact::Version,
        HostFact::Uptime,
        HostFact::Platform,
        HostFact::Type,
        HostFact::Release,
        HostFact::Hostname,
        HostFact::Arch,
    ];

    pub const ALL: [HostFact; 10] = [
        HostFact::Version,
        HostFact::Uptime,
        HostFact::Platform,
        HostFact::Type,
        HostFact::Release,
        HostFact::Hostname,
        HostFact::Arch,
        HostFact::TotalMem,
        HostFact::FreeMem,
        HostFact::Endianness,
    ];

    /// Record key for this fact
    pub fn name(&self) -> &'static str {
        match self {
            HostFact::Version => "version",
            HostFact::Uptime => "uptime",
            HostFact::Platform => "platform",
            HostFact::Type => "type",
            HostFact::Release => "release",
            HostFact::Hostname => "hostname",
            HostFact::Arch => "arch",
            HostFact::TotalMem => "totalmem",
            HostFact::FreeMem => "freemem",
            HostFact::Endianness => "endianness",
        }
    }
}

impl fmt::Display for HostFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HostFact {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostFact::ALL
            .into_iter()
            .find(|fact| fact.name() == s)
            .ok_or_else(|| DomainError::UnknownFact(s.to_string()))
    }
}

/// Platform Info
///
/// Serializes flat: `{...facts, ...formatted}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformInfo {
    #[serde(flatten)]
    pub facts: Record,
    #[serde(flatten)]
    pub formatted: Record,
}

impl PlatformInfo {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.formatted.get(name).or_else(|| self.facts.get(name))
    }

    /// All keys in output order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.facts
            .keys()
            .chain(self.formatted.keys())
            .map(String::as_str)
    }
}
