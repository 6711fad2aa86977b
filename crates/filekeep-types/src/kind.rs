use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The family a [`StorageKey`](crate::StorageKey) belongs to.
///
/// Every kind maps to exactly one discriminator string and back. The
/// discriminator is the `kind` half of a serialized `kind:id` key and the
/// counter name used for identity allocation, so it must never change for an
/// existing kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum KeyKind {
    PortalNode,
    Cronjob,
    CronjobRun,
    Webhook,
    Route,
    Mapping,
    MappingNode,
    MappingException,
    Job,
    JobPayload,
}

impl KeyKind {
    /// Every registered kind, in declaration order.
    pub const ALL: [KeyKind; 10] = [
        Self::PortalNode,
        Self::Cronjob,
        Self::CronjobRun,
        Self::Webhook,
        Self::Route,
        Self::Mapping,
        Self::MappingNode,
        Self::MappingException,
        Self::Job,
        Self::JobPayload,
    ];

    /// The stable discriminator string for this kind.
    pub const fn discriminator(self) -> &'static str {
        match self {
            Self::PortalNode => "portal_node",
            Self::Cronjob => "cronjob",
            Self::CronjobRun => "cronjob_run",
            Self::Webhook => "webhook",
            Self::Route => "route",
            Self::Mapping => "mapping",
            Self::MappingNode => "mapping_node",
            Self::MappingException => "mapping_exception",
            Self::Job => "job",
            Self::JobPayload => "job_payload",
        }
    }

    /// Resolve a discriminator back to its kind.
    ///
    /// Returns `None` for anything not in the registry. Matching is exact and
    /// case-sensitive.
    pub fn from_discriminator(discriminator: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.discriminator() == discriminator)
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

impl FromStr for KeyKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_discriminator(s).ok_or_else(|| TypeError::UnsupportedKey(s.to_string()))
    }
}

impl From<KeyKind> for &'static str {
    fn from(kind: KeyKind) -> Self {
        kind.discriminator()
    }
}

impl TryFrom<String> for KeyKind {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
