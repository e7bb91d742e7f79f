//! Request channels and channel sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A channel of the request a parameter can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SourceKind {
    /// URL query string.
    Query = 1,
    /// `Authorization` header, keyed by scheme.
    Authorization = 2,
    /// Form or JSON body, whichever the content type selects.
    Body = 4,
    /// Uploaded files.
    Files = 8,
    /// Per-dispatch context bag.
    Context = 16,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Query,
        SourceKind::Authorization,
        SourceKind::Body,
        SourceKind::Files,
        SourceKind::Context,
    ];

    /// Default priority order in which channels are consulted.
    pub const DEFAULT_ORDER: [SourceKind; 5] = Self::ALL;

    fn bit(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Query => "query",
            SourceKind::Authorization => "authorization",
            SourceKind::Body => "body",
            SourceKind::Files => "files",
            SourceKind::Context => "context",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown source kind '{s}'"))
    }
}

/// Fixed-size flag set over [`SourceKind`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSet(u8);

impl SourceSet {
    pub const EMPTY: SourceSet = SourceSet(0);

    pub fn of(kinds: &[SourceKind]) -> Self {
        kinds.iter().fold(Self::EMPTY, |set, kind| set.with(*kind))
    }

    pub fn all() -> Self {
        Self::of(&SourceKind::ALL)
    }

    #[must_use]
    pub fn with(self, kind: SourceKind) -> Self {
        SourceSet(self.0 | kind.bit())
    }

    #[must_use]
    pub fn without(self, kind: SourceKind) -> Self {
        SourceSet(self.0 & !kind.bit())
    }

    pub fn contains(self, kind: SourceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[must_use]
    pub fn intersection(self, other: SourceSet) -> Self {
        SourceSet(self.0 & other.0)
    }

    #[must_use]
    pub fn union(self, other: SourceSet) -> Self {
        SourceSet(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members of the set, in the order given by `order`.
    pub fn iter_in<'a>(self, order: &'a [SourceKind]) -> impl Iterator<Item = SourceKind> + 'a {
        order.iter().copied().filter(move |kind| self.contains(*kind))
    }
}

impl From<SourceKind> for SourceSet {
    fn from(kind: SourceKind) -> Self {
        SourceSet::EMPTY.with(kind)
    }
}

impl FromIterator<SourceKind> for SourceSet {
    fn from_iter<I: IntoIterator<Item = SourceKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |set, kind| set.with(kind))
    }
}

impl fmt::Debug for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter_in(&SourceKind::ALL))
            .finish()
    }
}
