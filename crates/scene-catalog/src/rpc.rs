//! Rational polynomial camera models from `.rpb` files.
//!
//! An `.rpb` file is a list of `key = value;` statements. Scalars are plain
//! numbers and the four polynomial term lists are parenthesised and
//! comma-separated:
//!
//! ```text
//! BEGIN_GROUP = IMAGE
//!     errBias = 1.0;
//!     lineOffset = 4999;
//!     ...
//!     lineNumCoef = (
//!         +1.0e-03,
//!         ...);
//! END_GROUP = IMAGE
//! ```

use std::collections::HashMap;

use serde_json::json;

use crate::error::ItemError;

/// Offsets and scales, in transform order.
const SCALAR_KEYS: [&str; 10] = [
    "lineOffset",
    "sampOffset",
    "latOffset",
    "longOffset",
    "heightOffset",
    "lineScale",
    "sampScale",
    "latScale",
    "longScale",
    "heightScale",
];

const TERM_KEYS: [&str; 4] = ["lineNumCoef", "lineDenCoef", "sampNumCoef", "sampDenCoef"];

const TERMS_PER_POLYNOMIAL: usize = 20;

/// Number of values in a complete model.
pub const COEFFICIENT_COUNT: usize = SCALAR_KEYS.len() + TERM_KEYS.len() * TERMS_PER_POLYNOMIAL;

#[derive(Debug, Clone, PartialEq)]
pub struct RpcModel {
    scalars: [f64; 10],
    terms: [Vec<f64>; 4],
}

enum Statement {
    Scalar(f64),
    List(Vec<f64>),
    Text,
}

impl RpcModel {
    pub fn parse(text: &str) -> Result<Self, ItemError> {
        let mut statements: HashMap<&str, Statement> = HashMap::new();
        for raw in text.split(';') {
            // Group markers share a statement with the key that follows them.
            let Some((key, value)) = raw.rsplit_once('=') else {
                continue;
            };
            let key = key.split_whitespace().last().unwrap_or_default();
            let value = value.trim();
            statements.insert(key, parse_value(key, value)?);
        }

        let mut scalars = [0.0; 10];
        for (slot, key) in scalars.iter_mut().zip(SCALAR_KEYS) {
            *slot = match statements.get(key) {
                Some(Statement::Scalar(v)) => *v,
                _ => return Err(ItemError::invalid(key, "missing RPC scalar")),
            };
        }

        let mut terms: [Vec<f64>; 4] = Default::default();
        for (slot, key) in terms.iter_mut().zip(TERM_KEYS) {
            match statements.remove(key) {
                Some(Statement::List(values)) if values.len() == TERMS_PER_POLYNOMIAL => *slot = values,
                Some(Statement::List(values)) => {
                    return Err(ItemError::invalid(
                        key,
                        format!("expected {} terms, found {}", TERMS_PER_POLYNOMIAL, values.len()),
                    ))
                }
                _ => return Err(ItemError::invalid(key, "missing RPC polynomial")),
            }
        }

        Ok(Self { scalars, terms })
    }

    pub fn height_offset(&self) -> f64 {
        self.scalars[4]
    }

    /// All 90 values: offsets and scales, then the four polynomials.
    pub fn coefficients(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(COEFFICIENT_COUNT);
        out.extend_from_slice(&self.scalars);
        for terms in &self.terms {
            out.extend_from_slice(terms);
        }
        out
    }

    /// The model as a serialized geodata transform.
    pub fn geodata_xform(&self) -> String {
        json!({
            "GeodataTransforms": [{
                "geodataTransform": "RPC",
                "geodataTransformArguments": { "coeff": self.coefficients() },
            }]
        })
        .to_string()
    }
}

fn parse_value(key: &str, value: &str) -> Result<Statement, ItemError> {
    if let Some(inner) = value.strip_prefix('(') {
        let inner = inner.trim_end().trim_end_matches(')');
        return inner
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| ItemError::invalid(key, format!("bad RPC term '{}'", v)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Statement::List);
    }
    Ok(value
        .parse::<f64>()
        .map(Statement::Scalar)
        .unwrap_or(Statement::Text))
}
