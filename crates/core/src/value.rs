//! Result values
//!
//! `Value` is the cell type of executor output rows. It serializes untagged,
//! so a row converts to plain JSON (`{"name": "Pesto", "servings": 4}`).

use crate::types::Ingredient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single output cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value
    Null,
    /// Integer (ids, servings, minutes, counts)
    Int(i64),
    /// Float (similarity scores)
    Float(f64),
    /// Text
    Text(String),
    /// List of strings (equipment, steps)
    List(Vec<String>),
    /// Ingredient lines
    Ingredients(Vec<Ingredient>),
}

impl Value {
    /// Integer content, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float content (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Text content, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:.4}", x),
            Value::Text(s) => f.write_str(s),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Ingredients(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|i| match &i.unit {
                        Some(unit) => format!("{} {} {}", i.amount, unit, i.item),
                        None => format!("{} {}", i.amount, i.item),
                    })
                    .collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
