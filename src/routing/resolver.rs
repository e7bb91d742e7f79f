//! Source resolution.
//!
//! # Responsibilities
//! - Intersect a parameter's declared channels with the available ones
//! - Walk the intersection in priority order
//! - Return the first keyring holding the key
//!
//! # Design Decisions
//! - Priority is the request's source order, never the declaration order
//! - "Not found" is `None`, not an error

use crate::keyring::{ContextKeyring, Keyring, RequestSources};
use crate::param::{SourceKind, SourceSet, Value};

/// Keyring that holds a parameter.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub kind: SourceKind,
    pub keyring: &'a dyn Keyring,
}

impl<'a> Resolved<'a> {
    pub fn value(&self, name: &str) -> &'a Value {
        self.keyring.get_unchecked(name)
    }
}

/// Finds parameters across the request's keyrings.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    sources: &'a RequestSources,
    context: Option<&'a ContextKeyring>,
}

impl<'a> Resolver<'a> {
    /// Without a context bag the context channel is unavailable.
    pub fn new(sources: &'a RequestSources, context: Option<&'a ContextKeyring>) -> Self {
        Self { sources, context }
    }

    /// Channels of `declared` that this request can serve.
    pub fn intersect(&self, declared: SourceSet) -> SourceSet {
        let available = if self.context.is_some() {
            self.sources.available()
        } else {
            self.sources.available().without(SourceKind::Context)
        };
        declared.intersection(available)
    }

    fn keyring(&self, kind: SourceKind) -> Option<&'a dyn Keyring> {
        match kind {
            SourceKind::Context => self.context.map(|bag| bag as &dyn Keyring),
            other => self.sources.keyring(other),
        }
    }

    /// First keyring, in priority order, among `declared` channels that holds
    /// `name`.
    pub fn find(&self, name: &str, declared: SourceSet) -> Option<Resolved<'a>> {
        self.intersect(declared)
            .iter_in(self.sources.order())
            .find_map(|kind| {
                let keyring = self.keyring(kind)?;
                keyring.has_key(name).then_some(Resolved { kind, keyring })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::RequestSnapshot;

    fn form_request(query: &str, body: &str) -> RequestSources {
        RequestSources::from_snapshot(
            RequestSnapshot::new()
                .with_query(query)
                .with_content_type("application/x-www-form-urlencoded")
                .with_body(body),
        )
    }

    #[test]
    fn earlier_channel_wins() {
        let sources = form_request("k=query", "k=body");
        let resolver = Resolver::new(&sources, None);
        let declared = SourceSet::of(&[SourceKind::Body, SourceKind::Query]);

        for _ in 0..3 {
            let found = resolver.find("k", declared).unwrap();
            assert_eq!(found.kind, SourceKind::Query);
            assert_eq!(found.value("k"), &Value::from("query"));
        }

        let only_body = resolver.find("k", SourceSet::from(SourceKind::Body)).unwrap();
        assert_eq!(only_body.value("k"), &Value::from("body"));
    }

    #[test]
    fn reordered_sources_change_the_winner() {
        let sources = form_request("k=query", "k=body")
            .with_order(&[SourceKind::Body, SourceKind::Query, SourceKind::Context]);
        let resolver = Resolver::new(&sources, None);
        let found = resolver
            .find("k", SourceSet::of(&[SourceKind::Query, SourceKind::Body]))
            .unwrap();
        assert_eq!(found.kind, SourceKind::Body);
    }

    #[test]
    fn context_bag_is_consulted_last() {
        let sources = form_request("", "");
        let mut bag = ContextKeyring::new();
        bag.insert("user", "jane");

        let resolver = Resolver::new(&sources, Some(&bag));
        let found = resolver.find("user", SourceSet::all()).unwrap();
        assert_eq!(found.kind, SourceKind::Context);

        let without_bag = Resolver::new(&sources, None);
        assert!(without_bag.find("user", SourceSet::all()).is_none());
        assert!(without_bag.intersect(SourceSet::from(SourceKind::Context)).is_empty());
    }

    #[test]
    fn unavailable_channels_resolve_nothing() {
        let sources = RequestSources::from_snapshot(RequestSnapshot::new().with_query("k=1"));
        let resolver = Resolver::new(&sources, None);
        assert!(resolver.intersect(SourceSet::from(SourceKind::Body)).is_empty());
        assert!(resolver.find("k", SourceSet::from(SourceKind::Body)).is_none());
    }
}
