//! Declared parameters and constants, and the values they hold.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ComponentError, ComponentResult};

/// A parameter value. The declared default fixes the type; assigned values
/// are coerced into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Integer(_) => "integer",
            ParamValue::Real(_) => "real",
            ParamValue::Text(_) => "text",
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            ParamValue::Real(v) => Some(*v),
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Text(s) => s.trim().parse().ok(),
            ParamValue::Bool(_) => None,
        }
    }

    /// Convert `value` into the type of `self`.
    fn coerce(&self, value: ParamValue) -> Result<ParamValue, &'static str> {
        match (self, value) {
            (ParamValue::Real(_), v) => match v.as_real() {
                Some(r) if r.is_finite() => Ok(ParamValue::Real(r)),
                Some(_) => Err("value must be finite"),
                None => Err("expected a real number"),
            },
            (ParamValue::Integer(_), ParamValue::Integer(i)) => Ok(ParamValue::Integer(i)),
            (ParamValue::Integer(_), ParamValue::Real(r))
                if r.fract() == 0.0 && r.abs() < i64::MAX as f64 =>
            {
                Ok(ParamValue::Integer(r as i64))
            }
            (ParamValue::Integer(_), ParamValue::Text(s)) => s
                .trim()
                .parse()
                .map(ParamValue::Integer)
                .map_err(|_| "expected an integer"),
            (ParamValue::Integer(_), _) => Err("expected an integer"),
            (ParamValue::Bool(_), ParamValue::Bool(b)) => Ok(ParamValue::Bool(b)),
            (ParamValue::Bool(_), ParamValue::Integer(i @ (0 | 1))) => Ok(ParamValue::Bool(i == 1)),
            (ParamValue::Bool(_), ParamValue::Text(s)) => match s.trim() {
                "true" | "1" => Ok(ParamValue::Bool(true)),
                "false" | "0" => Ok(ParamValue::Bool(false)),
                _ => Err("expected true or false"),
            },
            (ParamValue::Bool(_), _) => Err("expected true or false"),
            (ParamValue::Text(_), ParamValue::Text(s)) => Ok(ParamValue::Text(s)),
            (ParamValue::Text(_), other) => Ok(ParamValue::Text(other.to_string())),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Real(r) => write!(f, "{r}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Parameter,
    /// Fixed for a run; only changed between runs.
    Constant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub kind: ParamKind,
    pub default: ParamValue,
    value: ParamValue,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        kind: ParamKind,
        default: ParamValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            unit: unit.into(),
            kind,
            value: default.clone(),
            default,
        }
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Assign, coercing into the declared type.
    pub fn assign(&mut self, value: impl Into<ParamValue>) -> ComponentResult<()> {
        let value = value.into();
        let shown = value.to_string();
        self.value = self
            .default
            .coerce(value)
            .map_err(|reason| ComponentError::InvalidParameterValue {
                name: self.name.clone(),
                value: shown,
                reason,
            })?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(default: f64) -> Parameter {
        Parameter::new("k", "Gain", "-", ParamKind::Parameter, default.into())
    }

    #[test]
    fn real_accepts_numbers_and_text() {
        let mut p = real(1.0);
        p.assign(3_i64).unwrap();
        assert_eq!(p.value(), &ParamValue::Real(3.0));
        p.assign(" 2.5e3 ").unwrap();
        assert_eq!(p.value(), &ParamValue::Real(2500.0));
        assert!(!p.is_default());
        p.reset();
        assert!(p.is_default());
    }

    #[test]
    fn wrong_type_is_rejected_and_value_kept() {
        let mut p = real(1.0);
        let err = p.assign("fast").unwrap_err();
        assert!(matches!(err, ComponentError::InvalidParameterValue { .. }));
        assert_eq!(p.value(), &ParamValue::Real(1.0));
        assert!(p.assign(f64::NAN).is_err());
        assert!(p.assign(true).is_err());
    }

    #[test]
    fn integer_and_bool_coercion() {
        let mut n = Parameter::new("n", "", "", ParamKind::Constant, 0_i64.into());
        n.assign(4.0).unwrap();
        assert_eq!(n.value(), &ParamValue::Integer(4));
        assert!(n.assign(4.5).is_err());

        let mut b = Parameter::new("b", "", "", ParamKind::Parameter, false.into());
        b.assign("true").unwrap();
        assert_eq!(b.value(), &ParamValue::Bool(true));
        b.assign(0_i64).unwrap();
        assert_eq!(b.value(), &ParamValue::Bool(false));
        assert!(b.assign(2_i64).is_err());
    }

    #[test]
    fn text_takes_anything() {
        let mut t = Parameter::new("file", "", "", ParamKind::Parameter, "".into());
        t.assign(1.5).unwrap();
        assert_eq!(t.value(), &ParamValue::Text("1.5".into()));
    }
}
