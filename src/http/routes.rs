//! Paths served by the binary.
//!
//! - `login`: `Authorization: Bearer <token>` stores the caller in the context
//! - `search`: `q` (string) with optional `page` (integer); needs a caller
//! - `batch`: `id` (integer, list-aware) processed one element per pass
//! - `upload`: files sent under `document`

use crate::error::{BoxError, PathResult};
use crate::param::{ComparisonType, ParameterSpec, SourceKind, SourceSet, Value};
use crate::routing::{Arguments, PathDefinition, PathTable, RequestContext};

const REQUEST_SOURCES: [SourceKind; 2] = [SourceKind::Query, SourceKind::Body];

pub fn default_paths() -> PathResult<PathTable> {
    Ok(PathTable::new()
        .with(login()?)
        .with(search()?)
        .with(batch()?)
        .with(upload()?))
}

fn login() -> PathResult<PathDefinition> {
    PathDefinition::new("login", |args: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
        let token = args.value("Bearer").and_then(Value::as_str).unwrap_or_default();
        if token.is_empty() {
            return Err("empty bearer token".into());
        }
        ctx.bag_mut().insert("user", token);
        Ok(())
    })
    .param(ParameterSpec::named("Bearer").sources(&[SourceKind::Authorization]))
}

fn search() -> PathResult<PathDefinition> {
    PathDefinition::new("search", |args: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
        let query = args.value("q").cloned().unwrap_or_default();
        let page = match args.value("page") {
            Some(Value::Int(page)) => *page,
            _ => 1,
        };
        ctx.bag_mut().insert("query", query);
        ctx.bag_mut().insert("page", page);
        Ok(())
    })
    .param(
        ParameterSpec::named("q")
            .comparison_type(ComparisonType::String)
            .sources(&REQUEST_SOURCES),
    )?
    .param(
        ParameterSpec::named("page")
            .comparison_type(ComparisonType::Integer)
            .sources(&REQUEST_SOURCES)
            .optional()
            .null_tolerant(),
    )?
    .param(ParameterSpec::named("user").sources(&[SourceKind::Context]))
}

fn batch() -> PathResult<PathDefinition> {
    PathDefinition::new("batch", |args: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
        let id = args.value("id").cloned().unwrap_or_default();
        let key = format!("processed_{}", ctx.run());
        ctx.bag_mut().insert(key, id);

        let remaining = args
            .lookup("id", SourceSet::of(&REQUEST_SOURCES))
            .and_then(|(_, raw)| raw.as_list())
            .map_or(0, |items| items.len().saturating_sub(ctx.run() as usize + 1));
        if remaining > 0 {
            ctx.request_another_pass();
        }
        Ok(())
    })
    .param(
        ParameterSpec::named("id")
            .comparison_type(ComparisonType::Integer)
            .sources(&REQUEST_SOURCES),
    )
}

fn upload() -> PathResult<PathDefinition> {
    PathDefinition::new("upload", |args: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
        let document = args.value("document").cloned().unwrap_or_default();
        ctx.bag_mut().insert("document", document);
        Ok(())
    })
    .param(ParameterSpec::named("document").sources(&[SourceKind::Files]))
}
