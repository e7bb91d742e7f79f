//! Path table and multi-pass dispatch.
//!
//! # Responsibilities
//! - Store path definitions in registration order
//! - Run the first handler-bearing pass over all paths
//! - Start another pass when a handler asks for it
//!
//! # Design Decisions
//! - The table is immutable once shared (thread-safe without locks)
//! - Passes are a loop, not recursion; depth does not grow with passes
//! - A handler error aborts every remaining pass
//! - Deterministic: same request and table always run the same handlers

use std::error::Error as StdError;
use std::sync::Arc;

use crate::error::{error_chain, ErrorDescriptor, PathError, PathResult};
use crate::keyring::RequestSources;
use crate::observability::metrics;
use crate::param::SourceKind;
use crate::routing::context::RequestContext;
use crate::routing::matcher::{Arguments, PathDefinition};
use crate::routing::resolver::Resolver;

/// Ordered collection of path definitions.
#[derive(Debug, Default)]
pub struct PathTable {
    paths: Vec<PathDefinition>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: PathDefinition) -> &mut Self {
        self.paths.push(path);
        self
    }

    pub fn with(mut self, path: PathDefinition) -> Self {
        self.paths.push(path);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathDefinition> {
        self.paths.iter()
    }

    pub fn get(&self, name: &str) -> Option<&PathDefinition> {
        self.paths.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Runtime knobs of the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Maximum passes per dispatch; `None` is unbounded.
    pub max_passes: Option<u32>,
    /// Channel priority order.
    pub source_order: Vec<SourceKind>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_passes: None,
            source_order: SourceKind::DEFAULT_ORDER.to_vec(),
        }
    }
}

/// Runs the paths of a table against one request.
#[derive(Debug)]
pub struct Dispatcher {
    table: Arc<PathTable>,
    sources: RequestSources,
    max_passes: Option<u32>,
}

impl Dispatcher {
    pub fn new(table: Arc<PathTable>, sources: RequestSources) -> Self {
        Self::with_settings(table, sources, &DispatchSettings::default())
    }

    pub fn with_settings(
        table: Arc<PathTable>,
        sources: RequestSources,
        settings: &DispatchSettings,
    ) -> Self {
        Self {
            table,
            sources: sources.with_order(&settings.source_order),
            max_passes: settings.max_passes,
        }
    }

    pub fn sources(&self) -> &RequestSources {
        &self.sources
    }

    /// Dispatches the request.
    ///
    /// Without a context this is a fresh dispatch starting at run 0. A
    /// supplied context continues at the next run with its bag intact.
    pub fn dispatch(&self, ctx: Option<RequestContext>) -> PathResult<RequestContext> {
        let mut ctx = match ctx {
            Some(mut ctx) => {
                ctx.advance_run();
                ctx
            }
            None => RequestContext::new(),
        };

        let mut passes = 0u32;
        loop {
            if let Some(limit) = self.max_passes {
                if passes >= limit {
                    tracing::warn!(limit, run = ctx.run(), "Pass limit exceeded");
                    return Err(PathError::PassLimit(limit));
                }
            }
            passes += 1;
            ctx.start_pass();
            metrics::record_pass();

            self.run_pass(&mut ctx)?;

            if !ctx.is_continuation_requested() {
                break;
            }
            ctx.advance_run();
        }

        tracing::debug!(
            passes = ctx.passes(),
            handled = ctx.handled().len(),
            "Dispatch finished"
        );
        Ok(ctx)
    }

    fn run_pass(&self, ctx: &mut RequestContext) -> PathResult<()> {
        let span = tracing::debug_span!("pass", run = ctx.run());
        let _guard = span.enter();

        for path in self.table.iter() {
            ctx.enter_path(path.name());

            let args = {
                let resolver = Resolver::new(&self.sources, Some(ctx.bag()));
                path.try_match(&resolver, ctx.run())
            };
            let Some(args) = args else {
                continue;
            };

            tracing::debug!(path = path.name(), args = args.len(), "Path matched");
            metrics::record_match(path.name());

            let args = Arguments::new(args, &self.sources);
            ctx.record_handled(path.name());
            if let Err(cause) = path.handler().handle(&args, ctx) {
                tracing::warn!(path = path.name(), error = %cause, "Handler failed");
                metrics::record_handler_error(path.name());
                return Err(PathError::Handler {
                    path: path.name().to_string(),
                    cause,
                });
            }

            if ctx.is_continuation_requested() {
                tracing::debug!(path = path.name(), "Another pass requested");
                break;
            }
        }
        Ok(())
    }

    /// Runs a fresh dispatch and reports a failure as an error chain.
    ///
    /// `on_chain` receives the chain innermost cause first; `describe`
    /// replaces the default per-error descriptor.
    pub fn dispatch_with_error_handling<F>(
        &self,
        on_chain: F,
        describe: Option<&dyn Fn(&(dyn StdError + 'static)) -> ErrorDescriptor>,
    ) -> Option<RequestContext>
    where
        F: FnOnce(Vec<ErrorDescriptor>),
    {
        match self.dispatch(None) {
            Ok(ctx) => Some(ctx),
            Err(err) => {
                tracing::error!(kind = err.kind(), error = %err, "Dispatch failed");
                on_chain(error_chain(&err, describe));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::keyring::RequestSnapshot;
    use crate::param::{ComparisonType, ParameterSpec, Value};

    fn sources(query: &str) -> RequestSources {
        RequestSources::from_snapshot(RequestSnapshot::new().with_query(query))
    }

    #[test]
    fn runs_matching_paths_in_order() {
        let table = PathTable::new()
            .with(
                PathDefinition::new("first", |_: &Arguments<'_>, _: &mut RequestContext| Ok(()))
                    .param(ParameterSpec::named("a"))
                    .unwrap(),
            )
            .with(
                PathDefinition::new("skipped", |_: &Arguments<'_>, _: &mut RequestContext| Ok(()))
                    .param(ParameterSpec::named("missing"))
                    .unwrap(),
            )
            .with(PathDefinition::new("always", |_: &Arguments<'_>, _: &mut RequestContext| Ok(())));

        let ctx = Dispatcher::new(Arc::new(table), sources("a=1"))
            .dispatch(None)
            .unwrap();
        let names: Vec<_> = ctx.handled().iter().map(|h| h.path.as_str()).collect();
        assert_eq!(names, ["first", "always"]);
        assert_eq!(ctx.passes(), 1);
        assert_eq!(ctx.current_path(), Some("always"));
    }

    #[test]
    fn continuation_starts_next_run() {
        let table = PathTable::new().with(
            PathDefinition::new("step", |args: &Arguments<'_>, ctx: &mut RequestContext| {
                let n = args.value("n").and_then(Value::as_f64).unwrap_or_default();
                let key = format!("seen{}", ctx.run());
                ctx.bag_mut().insert(key, n);
                if ctx.run() == 0 {
                    ctx.request_another_pass();
                }
                Ok(())
            })
            .param(ParameterSpec::named("n").comparison_type(ComparisonType::Integer))
            .unwrap(),
        );

        let ctx = Dispatcher::new(Arc::new(table), sources("n[]=4&n[]=9"))
            .dispatch(None)
            .unwrap();
        assert_eq!(ctx.run(), 1);
        assert_eq!(ctx.passes(), 2);
        assert_eq!(ctx.bag().get("seen0"), Some(&Value::Float(4.0)));
        assert_eq!(ctx.bag().get("seen1"), Some(&Value::Float(9.0)));
    }

    #[test]
    fn pass_limit_stops_endless_continuation() {
        let table = PathTable::new().with(PathDefinition::new(
            "loop",
            |_: &Arguments<'_>, ctx: &mut RequestContext| {
                ctx.request_another_pass();
                Ok(())
            },
        ));
        let settings = DispatchSettings {
            max_passes: Some(3),
            ..DispatchSettings::default()
        };

        let err = Dispatcher::with_settings(Arc::new(table), sources(""), &settings)
            .dispatch(None)
            .unwrap_err();
        assert_eq!(err.kind(), "PassLimitError");
    }

    #[test]
    fn handler_error_is_reported_as_chain() {
        let table = PathTable::new().with(PathDefinition::new(
            "broken",
            |_: &Arguments<'_>, _: &mut RequestContext| -> Result<(), BoxError> {
                Err("storage offline".into())
            },
        ));

        let mut reported = Vec::new();
        let ctx = Dispatcher::new(Arc::new(table), sources(""))
            .dispatch_with_error_handling(|chain| reported = chain, None);

        assert!(ctx.is_none());
        assert_eq!(reported.len(), 2);
        assert_eq!(reported[0].message, "storage offline");
        assert_eq!(reported[1].kind, "HandlerError");
    }
}
