//! Parameter specifications.
//!
//! A [`ParameterBuilder`] collects the declaration of one named parameter and
//! is finalized by [`ParameterBuilder::seal`] into an immutable
//! [`ParameterSpec`]. Only sealed specs can validate, coerce or compare values,
//! and sealed specs have no mutators.
//!
//! ```
//! use http_path_handler::param::{ComparisonType, ParameterSpec, SourceKind};
//!
//! let page = ParameterSpec::named("page")
//!     .comparison_type(ComparisonType::Integer)
//!     .sources(&[SourceKind::Query, SourceKind::Body])
//!     .optional()
//!     .seal()
//!     .unwrap();
//!
//! assert!(page.is_valid(&"2".into()));
//! ```

use std::str::FromStr;

use crate::error::{PathError, PathResult};
use crate::param::source::{SourceKind, SourceSet};
use crate::param::types::{ComparisonMode, ComparisonType};
use crate::param::value::Value;

/// Mutable declaration of a parameter.
#[derive(Debug)]
#[must_use = "a parameter declaration does nothing until it is sealed"]
pub struct ParameterBuilder {
    name: String,
    comparison_value: Option<Value>,
    comparison_type: Option<ComparisonType>,
    sources: SourceSet,
    optional: bool,
    null_tolerant: bool,
    error: Option<PathError>,
}

/// Sealed, read-only parameter specification.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    name: String,
    comparison_value: Option<Value>,
    comparison_type: Option<ComparisonType>,
    mode: ComparisonMode,
    sources: SourceSet,
    optional: bool,
    null_tolerant: bool,
}

impl ParameterSpec {
    /// Declares a parameter matched by name only, read from the query string.
    pub fn named(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder {
            name: name.into(),
            comparison_value: None,
            comparison_type: None,
            sources: SourceSet::from(SourceKind::Query),
            optional: false,
            null_tolerant: false,
            error: None,
        }
    }

    /// Declares a parameter that must equal `value`; its comparison type is
    /// inferred from the value. A null value declares a name-only parameter.
    pub fn expecting(name: impl Into<String>, value: impl Into<Value>) -> ParameterBuilder {
        let value = value.into();
        let mut builder = Self::named(name);
        if !value.is_null() {
            builder.comparison_type = ComparisonType::of(&value);
            builder.comparison_value = Some(value);
        }
        builder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comparison_value(&self) -> Option<&Value> {
        self.comparison_value.as_ref()
    }

    pub fn comparison_type(&self) -> Option<ComparisonType> {
        self.comparison_type
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn sources(&self) -> SourceSet {
        self.sources
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_null_tolerant(&self) -> bool {
        self.null_tolerant
    }

    /// Validates `value` against the comparison type.
    ///
    /// Null-tolerant specs accept blank values (null, empty string, list of
    /// empty strings) unconditionally. Name-only specs accept everything.
    pub fn is_valid(&self, value: &Value) -> bool {
        if self.null_tolerant && value.is_blank() {
            return true;
        }
        match self.comparison_type {
            Some(ty) => ty.accepts(value),
            None => true,
        }
    }

    /// Coerces `value` to the comparison type without validating it first.
    /// Name-only specs return the value unchanged.
    pub fn try_convert(&self, value: &Value) -> Option<Value> {
        match self.comparison_type {
            Some(ty) => ty.try_convert(value),
            None => Some(value.clone()),
        }
    }

    /// Validates and coerces `value`, failing with a conversion error.
    pub fn convert(&self, value: &Value) -> PathResult<Value> {
        let conversion_error = || PathError::Conversion {
            name: self.name.clone(),
            kind: value.kind(),
            target: self.comparison_type.unwrap_or(ComparisonType::String),
        };

        if !self.is_valid(value) {
            return Err(conversion_error());
        }
        self.coerce(value).ok_or_else(conversion_error)
    }

    /// Coercion applied after validation. Blank values accepted through null
    /// tolerance keep their converted form when the type can hold them and
    /// become [`ParameterSpec::blank_value`] otherwise.
    pub(crate) fn coerce(&self, value: &Value) -> Option<Value> {
        if self.null_tolerant && value.is_blank() {
            let converted = match (self.comparison_type, value) {
                (_, Value::Null) => None,
                (Some(ty), v) => ty.try_convert(v),
                (None, v) => Some(v.clone()),
            };
            return Some(converted.unwrap_or_else(|| self.blank_value()));
        }
        self.try_convert(value)
    }

    /// Strict comparison against the stored comparison value.
    pub fn matches(&self, value: &Value) -> PathResult<bool> {
        match &self.comparison_value {
            Some(expected) if self.mode == ComparisonMode::ValueType => Ok(expected == value),
            _ => Err(PathError::WrongMode {
                name: self.name.clone(),
                mode: self.mode,
            }),
        }
    }

    /// Value bound for a blank input accepted through null tolerance.
    pub(crate) fn blank_value(&self) -> Value {
        match self.comparison_type {
            Some(ComparisonType::List) => Value::List(Vec::new()),
            _ => Value::Null,
        }
    }
}

impl ParameterBuilder {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares the comparison type. An existing comparison value is converted
    /// to the new type; if that is impossible, sealing fails.
    pub fn comparison_type(mut self, ty: ComparisonType) -> Self {
        if let Some(value) = &self.comparison_value {
            match ty.try_convert(value) {
                Some(converted) => self.comparison_value = Some(converted),
                None => {
                    self.record(PathError::Conversion {
                        name: self.name.clone(),
                        kind: value.kind(),
                        target: ty,
                    });
                    return self;
                }
            }
        }
        self.comparison_type = Some(ty);
        self
    }

    /// Declares the comparison type by name (`int`, `bool`, `array`, ...).
    pub fn comparison_type_name(self, name: &str) -> Self {
        match ComparisonType::from_str(name) {
            Ok(ty) => self.comparison_type(ty),
            Err(e) => {
                let mut this = self;
                this.record(e);
                this
            }
        }
    }

    /// Replaces the channels this parameter may be read from.
    pub fn sources(mut self, kinds: &[SourceKind]) -> Self {
        self.sources = SourceSet::of(kinds);
        self
    }

    /// Replaces the channels this parameter may be read from.
    pub fn source_set(mut self, sources: SourceSet) -> Self {
        self.sources = sources;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Accept null, empty strings and empty lists regardless of type.
    pub fn null_tolerant(mut self) -> Self {
        self.null_tolerant = true;
        self
    }

    fn record(&mut self, error: PathError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Finalizes the declaration.
    pub fn seal(self) -> PathResult<ParameterSpec> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mode = match (&self.comparison_value, self.comparison_type) {
            (Some(_), _) => ComparisonMode::ValueType,
            (None, Some(_)) => ComparisonMode::TypeOnly,
            (None, None) => ComparisonMode::NameOnly,
        };

        if mode != ComparisonMode::NameOnly && self.comparison_type.is_none() {
            return Err(PathError::SealedState {
                name: self.name,
                reason: "the comparison value has no supported comparison type".into(),
            });
        }

        if self.sources.is_empty() {
            return Err(PathError::SealedState {
                name: self.name,
                reason: "no source channel declared".into(),
            });
        }

        Ok(ParameterSpec {
            name: self.name,
            comparison_value: self.comparison_value,
            comparison_type: self.comparison_type,
            mode,
            sources: self.sources,
            optional: self.optional,
            null_tolerant: self.null_tolerant,
        })
    }
}
