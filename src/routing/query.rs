//! Query string reconstruction from a path's parameters.

use std::collections::BTreeMap;

use url::form_urlencoded::byte_serialize;

use crate::param::types::scalar_to_string;
use crate::param::{ComparisonMode, ParameterSpec, Value};
use crate::routing::matcher::PathDefinition;

impl PathDefinition {
    /// Builds a `?a&b=c` query string that would select this path.
    ///
    /// Overrides supply values for type-only parameters and are emitted as
    /// their string form without coercion. A null override counts as absent.
    /// Parameters with a comparison value always emit that value.
    pub fn build_query(&self, overrides: Option<&BTreeMap<String, Value>>) -> String {
        self.build_query_excluding(overrides, &[])
    }

    /// Same as [`PathDefinition::build_query`], skipping `excluded` names.
    pub fn build_query_excluding(
        &self,
        overrides: Option<&BTreeMap<String, Value>>,
        excluded: &[&str],
    ) -> String {
        let parts: Vec<String> = self
            .params()
            .iter()
            .filter(|spec| !excluded.contains(&spec.name()))
            .filter_map(|spec| {
                let value = overrides.and_then(|o| o.get(spec.name()));
                query_part(spec, value)
            })
            .collect();

        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

/// Renders one parameter, or `None` when it is left out.
fn query_part(spec: &ParameterSpec, value: Option<&Value>) -> Option<String> {
    let value = value.filter(|v| !v.is_null());
    if spec.is_optional() && value.is_none() {
        return None;
    }

    let name: String = byte_serialize(spec.name().as_bytes()).collect();
    let text = match spec.mode() {
        ComparisonMode::NameOnly => None,
        ComparisonMode::ValueType => spec.comparison_value().and_then(scalar_to_string),
        ComparisonMode::TypeOnly => {
            let text = match value {
                None => Some(String::new()),
                Some(other) => scalar_to_string(other),
            };
            match text {
                Some(text) => Some(text),
                None if spec.is_optional() => return None,
                None => None,
            }
        }
    };

    Some(match text {
        Some(text) if !text.is_empty() => {
            let encoded: String = byte_serialize(text.as_bytes()).collect();
            format!("{name}={encoded}")
        }
        _ => name,
    })
}
