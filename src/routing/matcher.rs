//! Path definitions and parameter matching.
//!
//! # Responsibilities
//! - Hold the sealed parameters of a path and its handler
//! - Decide whether a request satisfies every parameter
//! - Bind resolved values into [`Arguments`] for the handler
//!
//! # Design Decisions
//! - Parameters are checked in declaration order with AND semantics
//! - A failed parameter skips the path silently; it is not an error
//! - A list value that fails validation may still match through the element
//!   at the current pass index

use std::fmt;

use crate::error::{BoxError, PathError, PathResult};
use crate::keyring::RequestSources;
use crate::param::{ParameterBuilder, ParameterSpec, SourceKind, SourceSet, Value};
use crate::routing::context::RequestContext;
use crate::routing::resolver::Resolver;

/// Business logic invoked once a path matched.
pub trait PathHandler: Send + Sync {
    fn handle(&self, args: &Arguments<'_>, ctx: &mut RequestContext) -> Result<(), BoxError>;
}

impl<F> PathHandler for F
where
    F: Fn(&Arguments<'_>, &mut RequestContext) -> Result<(), BoxError> + Send + Sync,
{
    fn handle(&self, args: &Arguments<'_>, ctx: &mut RequestContext) -> Result<(), BoxError> {
        self(args, ctx)
    }
}

/// One resolved parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument<'a> {
    spec: &'a ParameterSpec,
    value: Value,
    source: Option<SourceKind>,
}

impl<'a> Argument<'a> {
    pub fn spec(&self) -> &'a ParameterSpec {
        self.spec
    }

    pub fn name(&self) -> &'a str {
        self.spec.name()
    }

    /// Final value; `Null` for an absent optional parameter.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Channel that supplied the value.
    pub fn source(&self) -> Option<SourceKind> {
        self.source
    }

    pub fn is_present(&self) -> bool {
        self.source.is_some()
    }
}

/// Named bag of resolved parameters handed to a handler.
#[derive(Debug)]
pub struct Arguments<'a> {
    args: Vec<Argument<'a>>,
    sources: &'a RequestSources,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(args: Vec<Argument<'a>>, sources: &'a RequestSources) -> Self {
        Self { args, sources }
    }

    pub fn get(&self, name: &str) -> Option<&Argument<'a>> {
        self.args.iter().find(|arg| arg.name() == name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).map(Argument::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument<'a>> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Looks up any key across the request channels, outside the declared
    /// parameters. The context bag is not consulted; handlers own it.
    pub fn lookup(&self, name: &str, declared: SourceSet) -> Option<(SourceKind, &'a Value)> {
        Resolver::new(self.sources, None)
            .find(name, declared)
            .map(|found| (found.kind, found.value(name)))
    }
}

/// A set of parameters and the handler to run when all of them match.
pub struct PathDefinition {
    name: String,
    params: Vec<ParameterSpec>,
    handler: Box<dyn PathHandler>,
}

impl fmt::Debug for PathDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathDefinition")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PathDefinition {
    /// Creates a path with a closure handler.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Arguments<'_>, &mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::with_handler(name, handler)
    }

    pub fn with_handler(name: impl Into<String>, handler: impl PathHandler + 'static) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            handler: Box::new(handler),
        }
    }

    /// Seals `param` and appends it to the declaration order.
    pub fn param(mut self, param: ParameterBuilder) -> PathResult<Self> {
        if self.params.iter().any(|p| p.name() == param.name()) {
            return Err(PathError::DuplicateParameter {
                path: self.name,
                name: param.name().to_string(),
            });
        }
        self.params.push(param.seal()?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub(crate) fn handler(&self) -> &dyn PathHandler {
        self.handler.as_ref()
    }

    /// Matches every parameter against the request. Returns the bound
    /// arguments, or `None` if this path does not apply.
    pub fn try_match(&self, resolver: &Resolver<'_>, run: u32) -> Option<Vec<Argument<'_>>> {
        let mut args = Vec::with_capacity(self.params.len());

        for spec in &self.params {
            let declared = resolver.intersect(spec.sources());
            if declared.is_empty() {
                tracing::debug!(path = %self.name, param = spec.name(), "No available source for parameter");
                return None;
            }

            let Some(found) = resolver.find(spec.name(), declared) else {
                if spec.is_optional() {
                    args.push(Argument {
                        spec,
                        value: Value::Null,
                        source: None,
                    });
                    continue;
                }
                tracing::debug!(path = %self.name, param = spec.name(), "Required parameter missing");
                return None;
            };

            let raw = found.value(spec.name());
            let value = match spec.comparison_type() {
                None => raw.clone(),
                Some(ty) => {
                    let candidate = if spec.is_valid(raw) {
                        raw
                    } else {
                        match raw.as_list().and_then(|items| items.get(run as usize)) {
                            Some(item) if spec.is_valid(item) => item,
                            _ => {
                                tracing::debug!(
                                    path = %self.name,
                                    param = spec.name(),
                                    expected = %ty,
                                    "Parameter failed validation"
                                );
                                return None;
                            }
                        }
                    };
                    spec.coerce(candidate)?
                }
            };

            if spec.comparison_value().is_some() && !spec.matches(&value).unwrap_or(false) {
                tracing::debug!(path = %self.name, param = spec.name(), "Parameter value differs");
                return None;
            }

            args.push(Argument {
                spec,
                value,
                source: Some(found.kind),
            });
        }

        Some(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::{ContextKeyring, RequestSnapshot};
    use crate::param::ComparisonType;

    fn noop(_: &Arguments<'_>, _: &mut RequestContext) -> Result<(), BoxError> {
        Ok(())
    }

    fn query(q: &str) -> RequestSources {
        RequestSources::from_snapshot(RequestSnapshot::new().with_query(q))
    }

    #[test]
    fn typed_parameter_is_coerced() {
        let path = PathDefinition::new("numbers", noop)
            .param(ParameterSpec::named("validNumber").comparison_type(ComparisonType::Integer))
            .unwrap();
        let sources = query("validNumber=2");
        let args = path.try_match(&Resolver::new(&sources, None), 0).unwrap();
        assert_eq!(args[0].value(), &Value::Int(2));
        assert_eq!(args[0].source(), Some(SourceKind::Query));
    }

    #[test]
    fn list_fallback_uses_run_index() {
        let path = PathDefinition::new("numbers", noop)
            .param(ParameterSpec::named("n").comparison_type(ComparisonType::Integer))
            .unwrap();

        let sources = query("n[]=anyvaluehere");
        let resolver = Resolver::new(&sources, None);
        assert!(path.try_match(&resolver, 0).is_none());
        assert!(path.try_match(&resolver, 5).is_none());

        let sources = query("n[]=x&n[]=7");
        let resolver = Resolver::new(&sources, None);
        assert!(path.try_match(&resolver, 0).is_none());
        let args = path.try_match(&resolver, 1).unwrap();
        assert_eq!(args[0].value(), &Value::Int(7));
    }

    #[test]
    fn optional_absent_binds_null() {
        let path = PathDefinition::new("p", noop)
            .param(ParameterSpec::named("page").comparison_type(ComparisonType::Integer).optional())
            .unwrap();
        let sources = query("");
        let args = path.try_match(&Resolver::new(&sources, None), 0).unwrap();
        assert_eq!(args[0].value(), &Value::Null);
        assert!(!args[0].is_present());
    }

    #[test]
    fn required_absent_fails() {
        let path = PathDefinition::new("p", noop)
            .param(ParameterSpec::named("page"))
            .unwrap();
        let sources = query("other=1");
        assert!(path.try_match(&Resolver::new(&sources, None), 0).is_none());
    }

    #[test]
    fn unavailable_source_fails_even_when_optional() {
        let path = PathDefinition::new("p", noop)
            .param(ParameterSpec::named("doc").sources(&[SourceKind::Body]).optional())
            .unwrap();
        let sources = query("doc=1");
        assert!(path.try_match(&Resolver::new(&sources, None), 0).is_none());
    }

    #[test]
    fn comparison_value_must_match() {
        let path = PathDefinition::new("p", noop)
            .param(ParameterSpec::expecting("action", "save"))
            .unwrap();

        let sources = query("action=save");
        assert!(path.try_match(&Resolver::new(&sources, None), 0).is_some());

        let sources = query("action=delete");
        assert!(path.try_match(&Resolver::new(&sources, None), 0).is_none());
    }

    #[test]
    fn context_bag_parameters() {
        let path = PathDefinition::new("p", noop)
            .param(ParameterSpec::named("user").sources(&[SourceKind::Context]))
            .unwrap();
        let sources = query("user=fromquery");
        let mut bag = ContextKeyring::new();
        assert!(path.try_match(&Resolver::new(&sources, Some(&bag)), 0).is_none());

        bag.insert("user", "jane");
        let args = path.try_match(&Resolver::new(&sources, Some(&bag)), 0).unwrap();
        assert_eq!(args[0].value(), &Value::from("jane"));
    }

    #[test]
    fn duplicate_parameters_rejected() {
        let err = PathDefinition::new("p", noop)
            .param(ParameterSpec::named("a"))
            .unwrap()
            .param(ParameterSpec::named("a"))
            .unwrap_err();
        assert_eq!(err.kind(), "DuplicateParameterError");
    }
}
