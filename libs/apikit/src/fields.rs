//! Constrained request-field definitions.
//!
//! A [`FieldSpec`] couples a description with type constraints and validates
//! one JSON value, returning the normalized value or pydantic-style
//! [`ValidationErrorDetail`]s located at `["body", name]`.

use std::fmt;

use api_errors::ValidationErrorDetail;
use chrono::{DateTime, FixedOffset, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

const MIN_DESCRIPTION_LEN: usize = 3;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("valid email pattern")
});

/// A field definition that can never validate anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldDefinitionError {
    #[error("description must have at least 3 characters, got {0:?}")]
    DescriptionTooShort(String),

    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("min_length {min} is greater than max_length {max}")]
    InvalidLengthRange { min: usize, max: usize },

    #[error("multiple_of must not be 0")]
    ZeroMultipleOf,
}

/// Exclusive and inclusive bounds on an ordered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds<T> {
    pub gt: Option<T>,
    pub ge: Option<T>,
    pub lt: Option<T>,
    pub le: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            gt: None,
            ge: None,
            lt: None,
            le: None,
        }
    }
}

impl<T: PartialOrd + fmt::Display> Bounds<T> {
    fn check(&self, value: &T, loc: &Loc, ctx: impl Fn(&T) -> Value) -> Result<(), ValidationErrorDetail> {
        let checks = [
            (&self.gt, "greater_than", "gt", "greater than"),
            (&self.ge, "greater_than_equal", "ge", "greater than or equal to"),
            (&self.lt, "less_than", "lt", "less than"),
            (&self.le, "less_than_equal", "le", "less than or equal to"),
        ];

        for (bound, error_type, key, words) in checks {
            let Some(bound) = bound else { continue };
            let ok = match key {
                "gt" => value > bound,
                "ge" => value >= bound,
                "lt" => value < bound,
                _ => value <= bound,
            };
            if !ok {
                return Err(loc
                    .error(error_type, format!("Input should be {words} {bound}"))
                    .with_ctx(key, ctx(bound)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub strip_whitespace: bool,
    pub to_upper: bool,
    pub to_lower: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntConstraints {
    pub bounds: Bounds<i64>,
    pub multiple_of: Option<i64>,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    String(StringConstraints),
    Int(IntConstraints),
    Bool,
    Date(Bounds<NaiveDate>),
    DateTime(Bounds<DateTime<FixedOffset>>),
    Email,
}

/// A validated field definition. Build one with the `*Field` builders.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    description: String,
    strict: bool,
    nullable: bool,
    default: Option<Value>,
    kind: FieldKind,
}

struct Loc<'a>(&'a str);

impl Loc<'_> {
    fn error(&self, error_type: &str, msg: impl Into<String>) -> ValidationErrorDetail {
        ValidationErrorDetail::new(error_type, ["body", self.0], msg)
    }
}

impl FieldSpec {
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Validate a value that may be absent from the body; absent values take
    /// the default or fail with `missing`.
    pub fn validate_field(
        &self,
        name: &str,
        value: Option<&Value>,
    ) -> Result<Value, Vec<ValidationErrorDetail>> {
        match (value, &self.default) {
            (Some(v), _) => self.validate(name, v),
            (None, Some(default)) => Ok(default.clone()),
            (None, None) => Err(vec![Loc(name).error("missing", "Field required")]),
        }
    }

    /// Validate one present value and return its normalized form.
    pub fn validate(&self, name: &str, value: &Value) -> Result<Value, Vec<ValidationErrorDetail>> {
        let loc = Loc(name);
        if value.is_null() && self.nullable {
            return Ok(Value::Null);
        }

        let result = match &self.kind {
            FieldKind::String(c) => self.validate_string(c, value, &loc),
            FieldKind::Int(c) => self.validate_int(c, value, &loc),
            FieldKind::Bool => self.validate_bool(value, &loc),
            FieldKind::Date(bounds) => validate_date(bounds, value, &loc),
            FieldKind::DateTime(bounds) => validate_datetime(bounds, value, &loc),
            FieldKind::Email => validate_email(value, &loc),
        };
        result.map_err(|e| vec![e])
    }

    fn validate_string(
        &self,
        c: &StringConstraints,
        value: &Value,
        loc: &Loc,
    ) -> Result<Value, ValidationErrorDetail> {
        let Value::String(raw) = value else {
            return Err(loc.error("string_type", "Input should be a valid string"));
        };

        let mut s = if c.strip_whitespace {
            raw.trim().to_owned()
        } else {
            raw.clone()
        };
        if c.to_upper {
            s = s.to_uppercase();
        } else if c.to_lower {
            s = s.to_lowercase();
        }

        let len = s.chars().count();
        if let Some(min) = c.min_length.filter(|&min| len < min) {
            let unit = if min == 1 { "character" } else { "characters" };
            return Err(loc
                .error(
                    "string_too_short",
                    format!("String should have at least {min} {unit}"),
                )
                .with_ctx("min_length", min));
        }
        if let Some(max) = c.max_length.filter(|&max| len > max) {
            let unit = if max == 1 { "character" } else { "characters" };
            return Err(loc
                .error(
                    "string_too_long",
                    format!("String should have at most {max} {unit}"),
                )
                .with_ctx("max_length", max));
        }
        if let Some(pattern) = c.pattern.as_ref().filter(|p| !p.is_match(&s)) {
            return Err(loc
                .error(
                    "string_pattern_mismatch",
                    format!("String should match pattern '{}'", pattern.as_str()),
                )
                .with_ctx("pattern", pattern.as_str()));
        }

        Ok(Value::String(s))
    }

    fn validate_int(
        &self,
        c: &IntConstraints,
        value: &Value,
        loc: &Loc,
    ) -> Result<Value, ValidationErrorDetail> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                // Lax mode takes whole floats such as 3.0.
                n.as_f64()
                    .filter(|f| !self.strict && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) if !self.strict => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        let n = parsed.ok_or_else(|| loc.error("int_type", "Input should be a valid integer"))?;

        c.bounds.check(&n, loc, |b| Value::from(*b))?;
        if let Some(m) = c.multiple_of.filter(|&m| n.checked_rem(m).is_some_and(|r| r != 0)) {
            return Err(loc
                .error("multiple_of", format!("Input should be a multiple of {m}"))
                .with_ctx("multiple_of", m));
        }

        Ok(Value::from(n))
    }

    fn validate_bool(&self, value: &Value, loc: &Loc) -> Result<Value, ValidationErrorDetail> {
        match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) if !self.strict => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(loc.error("bool_type", "Input should be a valid boolean")),
            },
            _ => Err(loc.error("bool_type", "Input should be a valid boolean")),
        }
    }
}

fn validate_date(
    bounds: &Bounds<NaiveDate>,
    value: &Value,
    loc: &Loc,
) -> Result<Value, ValidationErrorDetail> {
    let date = value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            loc.error(
                "date_parsing",
                "Input should be a valid date in the format YYYY-MM-DD",
            )
        })?;

    bounds.check(&date, loc, |b| Value::from(b.to_string()))?;
    Ok(Value::from(date.to_string()))
}

fn validate_datetime(
    bounds: &Bounds<DateTime<FixedOffset>>,
    value: &Value,
    loc: &Loc,
) -> Result<Value, ValidationErrorDetail> {
    let dt = value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .ok_or_else(|| loc.error("datetime_parsing", "Input should be a valid datetime"))?;

    bounds.check(&dt, loc, |b| Value::from(b.to_rfc3339()))?;
    Ok(Value::from(dt.to_rfc3339()))
}

fn validate_email(value: &Value, loc: &Loc) -> Result<Value, ValidationErrorDetail> {
    let Value::String(s) = value else {
        return Err(loc.error("string_type", "Input should be a valid string"));
    };
    if !EMAIL_PATTERN.is_match(s) {
        return Err(loc.error(
            "value_error",
            "value is not a valid email address: An email address must have an @-sign and a valid domain.",
        ));
    }
    Ok(Value::String(s.clone()))
}

// -------- builders --------

#[derive(Debug, Clone)]
struct BaseField {
    description: String,
    strict: bool,
    nullable: bool,
    default: Option<Value>,
}

impl BaseField {
    fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            strict: true,
            nullable: false,
            default: None,
        }
    }

    fn finish(self, kind: FieldKind) -> Result<FieldSpec, FieldDefinitionError> {
        if self.description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(FieldDefinitionError::DescriptionTooShort(self.description));
        }
        Ok(FieldSpec {
            description: self.description,
            strict: self.strict,
            nullable: self.nullable,
            default: self.default,
            kind,
        })
    }
}

macro_rules! base_setters {
    ($builder:ty) => {
        impl $builder {
            /// Validate without coercions (default: on).
            pub fn strict(mut self, strict: bool) -> Self {
                self.base.strict = strict;
                self
            }

            /// Accept JSON `null`.
            pub fn nullable(mut self) -> Self {
                self.base.nullable = true;
                self
            }

            /// Value used when the field is absent; makes the field optional.
            pub fn default_value(mut self, value: impl Into<Value>) -> Self {
                self.base.default = Some(value.into());
                self
            }
        }
    };
}

#[derive(Debug, Clone)]
pub struct StringField {
    base: BaseField,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    strip_whitespace: bool,
    to_upper: bool,
    to_lower: bool,
}

base_setters!(StringField);

impl StringField {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            base: BaseField::new(description),
            min_length: None,
            max_length: None,
            pattern: None,
            strip_whitespace: false,
            to_upper: false,
            to_lower: false,
        }
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn strip_whitespace(mut self) -> Self {
        self.strip_whitespace = true;
        self
    }

    pub fn to_upper(mut self) -> Self {
        self.to_upper = true;
        self
    }

    pub fn to_lower(mut self) -> Self {
        self.to_lower = true;
        self
    }

    pub fn build(self) -> Result<FieldSpec, FieldDefinitionError> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(FieldDefinitionError::InvalidLengthRange { min, max });
            }
        }
        let pattern = self
            .pattern
            .map(|p| {
                Regex::new(&p).map_err(|e| FieldDefinitionError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        self.base.finish(FieldKind::String(StringConstraints {
            min_length: self.min_length,
            max_length: self.max_length,
            pattern,
            strip_whitespace: self.strip_whitespace,
            to_upper: self.to_upper,
            to_lower: self.to_lower,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct IntField {
    base: BaseField,
    constraints: IntConstraints,
}

base_setters!(IntField);

impl IntField {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            base: BaseField::new(description),
            constraints: IntConstraints::default(),
        }
    }

    pub fn gt(mut self, v: i64) -> Self {
        self.constraints.bounds.gt = Some(v);
        self
    }

    pub fn ge(mut self, v: i64) -> Self {
        self.constraints.bounds.ge = Some(v);
        self
    }

    pub fn lt(mut self, v: i64) -> Self {
        self.constraints.bounds.lt = Some(v);
        self
    }

    pub fn le(mut self, v: i64) -> Self {
        self.constraints.bounds.le = Some(v);
        self
    }

    pub fn multiple_of(mut self, v: i64) -> Self {
        self.constraints.multiple_of = Some(v);
        self
    }

    pub fn build(self) -> Result<FieldSpec, FieldDefinitionError> {
        if self.constraints.multiple_of == Some(0) {
            return Err(FieldDefinitionError::ZeroMultipleOf);
        }
        self.base.finish(FieldKind::Int(self.constraints))
    }
}

#[derive(Debug, Clone)]
pub struct BoolField {
    base: BaseField,
}

base_setters!(BoolField);

impl BoolField {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            base: BaseField::new(description),
        }
    }

    pub fn build(self) -> Result<FieldSpec, FieldDefinitionError> {
        self.base.finish(FieldKind::Bool)
    }
}

#[derive(Debug, Clone)]
pub struct DateField {
    base: BaseField,
    bounds: Bounds<NaiveDate>,
}

base_setters!(DateField);

impl DateField {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            base: BaseField::new(description),
            bounds: Bounds::default(),
        }
    }

    pub fn gt(mut self, v: NaiveDate) -> Self {
        self.bounds.gt = Some(v);
        self
    }

    pub fn ge(mut self, v: NaiveDate) -> Self {
        self.bounds.ge = Some(v);
        self
    }

    pub fn lt(mut self, v: NaiveDate) -> Self {
        self.bounds.lt = Some(v);
        self
    }

    pub fn le(mut self, v: NaiveDate) -> Self {
        self.bounds.le = Some(v);
        self
    }

    pub fn build(self) -> Result<FieldSpec, FieldDefinitionError> {
        self.base.finish(FieldKind::Date(self.bounds))
    }
}

#[derive(Debug, Clone)]
pub struct DateTimeField {
    base: BaseField,
    bounds: Bounds<DateTime<FixedOffset>>,
}

base_setters!(DateTimeField);

impl DateTimeField {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            base: BaseField::new(description),
            bounds: Bounds::default(),
        }
    }

    pub fn gt(mut self, v: DateTime<FixedOffset>) -> Self {
        self.bounds.gt = Some(v);
        self
    }

    pub fn ge(mut self, v: DateTime<FixedOffset>) -> Self {
        self.bounds.ge = Some(v);
        self
    }

    pub fn lt(mut self, v: DateTime<FixedOffset>) -> Self {
        self.bounds.lt = Some(v);
        self
    }

    pub fn le(mut self, v: DateTime<FixedOffset>) -> Self {
        self.bounds.le = Some(v);
        self
    }

    pub fn build(self) -> Result<FieldSpec, FieldDefinitionError> {
        self.base.finish(FieldKind::DateTime(self.bounds))
    }
}

#[derive(Debug, Clone)]
pub struct EmailField {
    base: BaseField,
}

base_setters!(EmailField);

impl EmailField {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            base: BaseField::new(description),
        }
    }

    pub fn build(self) -> Result<FieldSpec, FieldDefinitionError> {
        self.base.finish(FieldKind::Email)
    }
}

/// Named fields of a request body, validated together.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<(String, FieldSpec)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Validate a JSON object, collecting the errors of every field.
    /// Unknown keys are ignored.
    pub fn validate(&self, body: &Value) -> Result<Map<String, Value>, Vec<ValidationErrorDetail>> {
        let Some(object) = body.as_object() else {
            return Err(vec![ValidationErrorDetail::new(
                "model_attributes_type",
                ["body"],
                "Input should be a valid dictionary or object to extract fields from",
            )]);
        };

        let mut out = Map::new();
        let mut errors = Vec::new();
        for (name, spec) in &self.fields {
            match spec.validate_field(name, object.get(name)) {
                Ok(v) => {
                    out.insert(name.clone(), v);
                }
                Err(mut e) => errors.append(&mut e),
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }
}
