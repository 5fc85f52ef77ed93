//! Block/key parameter store.
//!
//! Values are kept as strings, as an input-file reader would deliver them,
//! and parsed on access. The `get_or_add_*` accessors record their default
//! when a key is absent, so the store ends up holding the full effective
//! configuration.

use std::fmt;
use std::str::FromStr;

use grmhd_core::ParameterError;
use indexmap::IndexMap;

/// Typed key/value parameters grouped into named blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterInput {
    values: IndexMap<(String, String), String>,
}

impl ParameterInput {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `("block/key", value)` pairs.
    ///
    /// # Errors
    ///
    /// [`ParameterError::InvalidValue`] for a path without a `/`.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ParameterError> {
        let mut p = Self::new();
        for (path, value) in pairs {
            let Some((block, key)) = path.split_once('/') else {
                return Err(ParameterError::InvalidValue {
                    block: String::new(),
                    key: path.to_string(),
                    value: value.to_string(),
                    expected: "block/key path",
                });
            };
            p.set(block, key, value);
        }
        Ok(p)
    }

    /// Set `block/key`, replacing any previous value.
    pub fn set(&mut self, block: &str, key: &str, value: impl fmt::Display) {
        self.values
            .insert((block.to_string(), key.to_string()), value.to_string());
    }

    /// Whether `block/key` is present.
    pub fn contains(&self, block: &str, key: &str) -> bool {
        self.raw(block, key).is_some()
    }

    fn raw(&self, block: &str, key: &str) -> Option<&str> {
        self.values
            .get(&(block.to_string(), key.to_string()))
            .map(String::as_str)
    }

    fn parse<T: FromStr>(&self, block: &str, key: &str, expected: &'static str) -> Result<Option<T>, ParameterError> {
        match self.raw(block, key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ParameterError::InvalidValue {
                    block: block.to_string(),
                    key: key.to_string(),
                    value: raw.to_string(),
                    expected,
                }),
        }
    }

    fn get_or_add<T: FromStr + fmt::Display + Copy>(
        &mut self,
        block: &str,
        key: &str,
        default: T,
        expected: &'static str,
    ) -> Result<T, ParameterError> {
        match self.parse(block, key, expected)? {
            Some(v) => Ok(v),
            None => {
                self.set(block, key, default);
                Ok(default)
            }
        }
    }

    /// Required real value.
    ///
    /// # Errors
    ///
    /// [`ParameterError::MissingParameter`] if absent,
    /// [`ParameterError::InvalidValue`] if not a real number.
    pub fn get_real(&self, block: &str, key: &str) -> Result<f64, ParameterError> {
        self.parse(block, key, "real")?
            .ok_or_else(|| ParameterError::MissingParameter {
                block: block.to_string(),
                key: key.to_string(),
            })
    }

    /// Real value, recording `default` if absent.
    ///
    /// # Errors
    ///
    /// [`ParameterError::InvalidValue`] if present but not a real number.
    pub fn get_or_add_real(&mut self, block: &str, key: &str, default: f64) -> Result<f64, ParameterError> {
        self.get_or_add(block, key, default, "real")
    }

    /// Integer value, recording `default` if absent.
    ///
    /// # Errors
    ///
    /// [`ParameterError::InvalidValue`] if present but not an integer.
    pub fn get_or_add_int(&mut self, block: &str, key: &str, default: i64) -> Result<i64, ParameterError> {
        self.get_or_add(block, key, default, "integer")
    }

    /// Boolean value (`true`/`false`), recording `default` if absent.
    ///
    /// # Errors
    ///
    /// [`ParameterError::InvalidValue`] if present but not a boolean.
    pub fn get_or_add_bool(&mut self, block: &str, key: &str, default: bool) -> Result<bool, ParameterError> {
        self.get_or_add(block, key, default, "boolean")
    }

    /// String value, recording `default` if absent.
    pub fn get_or_add_string(&mut self, block: &str, key: &str, default: &str) -> String {
        match self.raw(block, key) {
            Some(v) => v.trim().to_string(),
            None => {
                self.set(block, key, default);
                default.to_string()
            }
        }
    }

    /// Every `(block, key, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.values
            .iter()
            .map(|((b, k), v)| (b.as_str(), k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_recorded() {
        let mut p = ParameterInput::new();
        assert_eq!(p.get_or_add_real("GRMHD", "cfl", 0.9).unwrap(), 0.9);
        assert!(p.contains("GRMHD", "cfl"));
        assert!(!p.get_or_add_bool("Packages", "GRHD", false).unwrap());
        assert_eq!(p.iter().count(), 2);
    }

    #[test]
    fn stored_values_win_over_defaults() {
        let mut p = ParameterInput::from_pairs([("GRMHD/gamma", "1.444"), ("Driver/max_polls", " 12 ")]).unwrap();
        assert_eq!(p.get_real("GRMHD", "gamma").unwrap(), 1.444);
        assert_eq!(p.get_or_add_int("Driver", "max_polls", 5).unwrap(), 12);
    }

    #[test]
    fn missing_and_malformed() {
        let mut p = ParameterInput::from_pairs([("GRMHD/gamma", "hot")]).unwrap();
        assert!(matches!(
            p.get_real("GRMHD", "gamma"),
            Err(ParameterError::InvalidValue { expected: "real", .. })
        ));
        assert_eq!(
            p.get_real("GRMHD", "cfl"),
            Err(ParameterError::MissingParameter {
                block: "GRMHD".into(),
                key: "cfl".into()
            })
        );
        p.set("Packages", "GRMHD", "yes");
        assert!(p.get_or_add_bool("Packages", "GRMHD", true).is_err());
        assert!(ParameterInput::from_pairs([("gamma", "1.4")]).is_err());
    }
}
