//! Argument normalization for values headed to the renderer.
//!
//! Every public setter runs its input through one of these before anything
//! is stored or emitted, so a malformed value fails locally and the
//! renderer never sees it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Three floats, in whatever unit the receiving event expects.
pub type Vector3 = [f64; 3];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SanitizeError {
    #[error("expected {expected} elements, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("not a finite number: {0}")]
    NotNumeric(String),
    #[error("expected a string, got {0}")]
    NotString(String),
    #[error("invalid color: {0}")]
    InvalidColor(String),
    #[error("color component {value} outside {range}")]
    ComponentOutOfRange { value: f64, range: &'static str },
    #[error("expected a scalar or a list, got {0}")]
    NotListLike(String),
    #[error("expected {expected} values, got {actual}")]
    TooFewValues { expected: usize, actual: usize },
}

// ── Numeric conversion ────────────────────────────────────────────────────────

/// Anything that can be read as a single number.
pub trait Numeric {
    fn to_f64(&self) -> Result<f64, SanitizeError>;
}

macro_rules! numeric_primitive {
    ($($t:ty),*) => {
        $(impl Numeric for $t {
            fn to_f64(&self) -> Result<f64, SanitizeError> {
                finite(*self as f64)
            }
        })*
    };
}

numeric_primitive!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl Numeric for str {
    fn to_f64(&self) -> Result<f64, SanitizeError> {
        self.trim()
            .parse::<f64>()
            .map_err(|_| SanitizeError::NotNumeric(self.to_string()))
            .and_then(finite)
    }
}

impl Numeric for String {
    fn to_f64(&self) -> Result<f64, SanitizeError> {
        self.as_str().to_f64()
    }
}

impl Numeric for Value {
    fn to_f64(&self) -> Result<f64, SanitizeError> {
        match self {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| SanitizeError::NotNumeric(n.to_string()))
                .and_then(finite),
            Value::String(s) => s.to_f64(),
            other => Err(SanitizeError::NotNumeric(other.to_string())),
        }
    }
}

impl<T: Numeric + ?Sized> Numeric for &T {
    fn to_f64(&self) -> Result<f64, SanitizeError> {
        (**self).to_f64()
    }
}

fn finite(x: f64) -> Result<f64, SanitizeError> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(SanitizeError::NotNumeric(x.to_string()))
    }
}

// ── Sanitizers ────────────────────────────────────────────────────────────────

/// Exactly three numeric-convertible elements.
pub fn sanitize_vector3<T: Numeric>(seq: &[T]) -> Result<Vector3, SanitizeError> {
    if seq.len() != 3 {
        return Err(SanitizeError::WrongLength {
            expected: 3,
            actual: seq.len(),
        });
    }
    Ok([seq[0].to_f64()?, seq[1].to_f64()?, seq[2].to_f64()?])
}

/// Vector3 from a dynamic JSON array.
pub fn sanitize_vector3_value(v: &Value) -> Result<Vector3, SanitizeError> {
    match v {
        Value::Array(items) => sanitize_vector3(items),
        other => Err(SanitizeError::NotListLike(other.to_string())),
    }
}

pub fn sanitize_float<T: Numeric + ?Sized>(x: &T) -> Result<f64, SanitizeError> {
    x.to_f64()
}

pub fn sanitize_string(v: &Value) -> Result<String, SanitizeError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        other => Err(SanitizeError::NotString(other.to_string())),
    }
}

/// Material names are plain strings; the renderer resolves them.
pub fn sanitize_material(v: &Value) -> Result<String, SanitizeError> {
    sanitize_string(v)
}

// ── Lists ─────────────────────────────────────────────────────────────────────

/// A single value to broadcast, or one value per object.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    /// Broadcast `One` to `n` copies. `Many` passes through unchanged.
    pub fn expand(self, n: usize) -> Vec<T> {
        match self {
            OneOrMany::One(x) => vec![x; n],
            OneOrMany::Many(v) => v,
        }
    }

    /// Like [`expand`](Self::expand) but requires at least `n` values.
    pub fn for_count(self, n: usize) -> Result<Vec<T>, SanitizeError> {
        let values = self.expand(n);
        if values.len() < n {
            return Err(SanitizeError::TooFewValues {
                expected: n,
                actual: values.len(),
            });
        }
        Ok(values)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(v: Vec<T>) -> Self {
        OneOrMany::Many(v)
    }
}

impl OneOrMany<Value> {
    /// Arrays pass through, scalars broadcast, objects and null are rejected.
    pub fn from_value(v: Value) -> Result<Self, SanitizeError> {
        match v {
            Value::Array(items) => Ok(OneOrMany::Many(items)),
            Value::Object(_) | Value::Null => Err(SanitizeError::NotListLike(v.to_string())),
            scalar => Ok(OneOrMany::One(scalar)),
        }
    }
}

pub fn sanitize_list<T: Clone>(x: OneOrMany<T>, n: usize) -> Vec<T> {
    x.expand(n)
}

// ── Hemisphere ────────────────────────────────────────────────────────────────

/// Which hemisphere(s) an atlas area call applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Full,
    Left,
    Right,
}

impl Side {
    pub fn suffix(self) -> &'static str {
        match self {
            Side::Full => "",
            Side::Left => "-lh",
            Side::Right => "-rh",
        }
    }
}

pub fn sanitize_side(acronym: &str, side: Side) -> String {
    format!("{acronym}{}", side.suffix())
}
