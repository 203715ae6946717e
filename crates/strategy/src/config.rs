use std::collections::HashMap;

use common::{Error, Result};

/// Typed view over `strategies.<Name>.params`.
///
/// Absent keys fall back to the strategy default; present keys of the wrong
/// type or out of range are configuration errors.
#[derive(Debug, Clone, Copy)]
pub struct StrategyParams<'a> {
    strategy: &'a str,
    params: &'a HashMap<String, toml::Value>,
}

impl<'a> StrategyParams<'a> {
    pub fn new(strategy: &'a str, params: &'a HashMap<String, toml::Value>) -> Self {
        Self { strategy, params }
    }

    /// Any finite number. Integers are accepted for float parameters.
    pub fn f64(&self, key: &str, default: f64) -> Result<f64> {
        let value = match self.params.get(key) {
            None => return Ok(default),
            Some(v) => v
                .as_float()
                .or_else(|| v.as_integer().map(|i| i as f64))
                .ok_or_else(|| self.invalid(key, "a number"))?,
        };
        if !value.is_finite() {
            return Err(self.invalid(key, "a finite number"));
        }
        Ok(value)
    }

    /// A number strictly greater than zero.
    pub fn positive_f64(&self, key: &str, default: f64) -> Result<f64> {
        let value = self.f64(key, default)?;
        if value <= 0.0 {
            return Err(self.invalid(key, "greater than zero"));
        }
        Ok(value)
    }

    /// A positive integer.
    pub fn usize(&self, key: &str, default: usize) -> Result<usize> {
        match self.params.get(key) {
            None => Ok(default),
            Some(v) => v
                .as_integer()
                .filter(|i| *i > 0)
                .map(|i| i as usize)
                .ok_or_else(|| self.invalid(key, "a positive integer")),
        }
    }

    fn invalid(&self, key: &str, expected: &str) -> Error {
        Error::Config(format!(
            "strategies.{}.params.{key} must be {expected}",
            self.strategy
        ))
    }
}
