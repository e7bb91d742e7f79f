//! Per-request keyring selection.

use crate::keyring::authorization::AuthorizationKeyring;
use crate::keyring::files::FilesKeyring;
use crate::keyring::form::FormKeyring;
use crate::keyring::json::JsonKeyring;
use crate::keyring::query::QueryKeyring;
use crate::keyring::snapshot::{ContentKind, RequestSnapshot};
use crate::keyring::Keyring;
use crate::param::{SourceKind, SourceSet, Value};

/// The body keyring selected by content kind.
#[derive(Debug)]
pub enum BodyKeyring {
    Form(FormKeyring),
    Json(JsonKeyring),
}

impl Keyring for BodyKeyring {
    fn kind(&self) -> SourceKind {
        SourceKind::Body
    }

    fn has_key(&self, name: &str) -> bool {
        match self {
            BodyKeyring::Form(k) => k.has_key(name),
            BodyKeyring::Json(k) => k.has_key(name),
        }
    }

    fn get_unchecked(&self, name: &str) -> &Value {
        match self {
            BodyKeyring::Form(k) => k.get_unchecked(name),
            BodyKeyring::Json(k) => k.get_unchecked(name),
        }
    }
}

/// Live keyrings of one request, in priority order.
///
/// Query and authorization keyrings always exist. Body and files keyrings
/// exist only when the content type is a form or JSON. The context channel
/// belongs to the request context and is always available.
#[derive(Debug)]
pub struct RequestSources {
    order: Vec<SourceKind>,
    content_kind: ContentKind,
    query: QueryKeyring,
    authorization: AuthorizationKeyring,
    body: Option<BodyKeyring>,
    files: Option<FilesKeyring>,
}

impl RequestSources {
    pub fn from_snapshot(snapshot: RequestSnapshot) -> Self {
        let content_kind = snapshot.content_kind();
        let RequestSnapshot {
            query,
            authorization,
            body,
            form_fields,
            files,
            ..
        } = snapshot;

        let body = match content_kind {
            ContentKind::Multipart => Some(BodyKeyring::Form(FormKeyring::multipart(form_fields))),
            ContentKind::UrlEncoded => Some(BodyKeyring::Form(FormKeyring::url_encoded(body))),
            ContentKind::Json => Some(BodyKeyring::Json(JsonKeyring::new(body))),
            ContentKind::Other => None,
        };
        let files = content_kind.has_body().then(|| FilesKeyring::new(files));

        tracing::trace!(?content_kind, body = body.is_some(), "Request sources prepared");

        Self {
            order: SourceKind::DEFAULT_ORDER.to_vec(),
            content_kind,
            query: QueryKeyring::new(query),
            authorization: AuthorizationKeyring::new(authorization),
            body,
            files,
        }
    }

    /// Overrides the priority order. Channels left out are never consulted.
    pub fn with_order(mut self, order: &[SourceKind]) -> Self {
        self.order = order.to_vec();
        self
    }

    pub fn order(&self) -> &[SourceKind] {
        &self.order
    }

    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    /// Channels that can be consulted for this request.
    pub fn available(&self) -> SourceSet {
        let present = SourceSet::of(&[
            SourceKind::Query,
            SourceKind::Authorization,
            SourceKind::Context,
        ]);
        let present = if self.body.is_some() {
            present.with(SourceKind::Body)
        } else {
            present
        };
        let present = if self.files.is_some() {
            present.with(SourceKind::Files)
        } else {
            present
        };
        present.intersection(self.order.iter().copied().collect())
    }

    /// The request-owned keyring for `kind`. The context channel is not
    /// request-owned and yields `None`.
    pub fn keyring(&self, kind: SourceKind) -> Option<&dyn Keyring> {
        match kind {
            SourceKind::Query => Some(&self.query),
            SourceKind::Authorization => Some(&self.authorization),
            SourceKind::Body => self.body.as_ref().map(|k| k as &dyn Keyring),
            SourceKind::Files => self.files.as_ref().map(|k| k as &dyn Keyring),
            SourceKind::Context => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_body_without_known_content_type() {
        let sources = RequestSources::from_snapshot(RequestSnapshot::new().with_query("a=1"));
        let available = sources.available();
        assert!(available.contains(SourceKind::Query));
        assert!(available.contains(SourceKind::Authorization));
        assert!(available.contains(SourceKind::Context));
        assert!(!available.contains(SourceKind::Body));
        assert!(!available.contains(SourceKind::Files));
        assert!(sources.keyring(SourceKind::Body).is_none());
    }

    #[test]
    fn json_content_selects_json_body() {
        let sources = RequestSources::from_snapshot(
            RequestSnapshot::new()
                .with_content_type("application/json")
                .with_body(r#"{"a":1}"#),
        );
        assert!(sources.available().contains(SourceKind::Body));
        assert!(sources.available().contains(SourceKind::Files));

        let Some(body) = sources.keyring(SourceKind::Body) else {
            panic!("expected a body keyring");
        };
        assert!(body.has_key("a"));
        assert!(!body.has_key("b"));
    }

    #[test]
    fn order_limits_availability() {
        let sources = RequestSources::from_snapshot(RequestSnapshot::new())
            .with_order(&[SourceKind::Context, SourceKind::Query]);
        assert_eq!(
            sources.available(),
            SourceSet::of(&[SourceKind::Context, SourceKind::Query])
        );
    }
}
