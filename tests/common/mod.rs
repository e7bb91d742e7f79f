//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use http_path_handler::error::BoxError;
use http_path_handler::keyring::{RequestSnapshot, RequestSources};
use http_path_handler::param::Value;
use http_path_handler::routing::{Arguments, Dispatcher, PathDefinition, PathTable, RequestContext};

/// Handler that records the argument values it received into the context
/// bag, keyed `<path>.<param>`.
pub fn recording(path: &'static str) -> PathDefinition {
    PathDefinition::new(path, move |args: &Arguments<'_>, ctx: &mut RequestContext| -> Result<(), BoxError> {
        for arg in args.iter() {
            let key = format!("{path}.{}", arg.name());
            ctx.bag_mut().insert(key, arg.value().clone());
        }
        Ok(())
    })
}

pub fn query_request(query: &str) -> RequestSnapshot {
    RequestSnapshot::new().with_query(query)
}

pub fn form_request(query: &str, body: &str) -> RequestSnapshot {
    RequestSnapshot::new()
        .with_query(query)
        .with_content_type("application/x-www-form-urlencoded")
        .with_body(body)
}

pub fn json_request(body: &str) -> RequestSnapshot {
    RequestSnapshot::new()
        .with_content_type("application/json")
        .with_body(body)
}

pub fn dispatch(table: PathTable, snapshot: RequestSnapshot) -> RequestContext {
    Dispatcher::new(Arc::new(table), RequestSources::from_snapshot(snapshot))
        .dispatch(None)
        .expect("dispatch failed")
}

pub fn handled_names(ctx: &RequestContext) -> Vec<String> {
    ctx.handled().iter().map(|h| h.path.clone()).collect()
}

pub fn bag_value<'a>(ctx: &'a RequestContext, key: &str) -> Option<&'a Value> {
    ctx.bag().get(key)
}
