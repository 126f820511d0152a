//! Loadable compiler configuration

use crate::compiler::Compiler;
use crate::context::{AdditionalProperties, CompileContext};
use crate::descriptor::Descriptor;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Serializable form of the additional-properties policy
///
/// `"allow"`, `"deny"`, `"remove"`, or `{"schema": "<registered name>"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalPropertiesOption {
    #[default]
    Allow,
    Deny,
    Remove,
    Schema(String),
}

/// Default object-literal policy, as loaded from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub required_properties: bool,
    pub additional_properties: AdditionalPropertiesOption,
}

impl CompileOptions {
    /// Parse options from JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidOptions(e.to_string()))
    }

    /// Resolve into a compile context
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] if the additional-properties schema
    /// names a validator `compiler` does not know.
    pub fn to_context(&self, compiler: &Compiler) -> Result<CompileContext> {
        let additional_properties = match &self.additional_properties {
            AdditionalPropertiesOption::Allow => AdditionalProperties::Allow,
            AdditionalPropertiesOption::Deny => AdditionalProperties::Deny,
            AdditionalPropertiesOption::Remove => AdditionalProperties::Remove,
            AdditionalPropertiesOption::Schema(name) => {
                if !compiler.registry().contains(name) {
                    return Err(Error::InvalidOptions(format!(
                        "unknown additional properties schema: {name}"
                    )));
                }
                AdditionalProperties::Schema(Box::new(Descriptor::Name(name.clone())))
            }
        };
        Ok(CompileContext {
            required_properties: self.required_properties,
            additional_properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_missing() {
        let options = CompileOptions::from_json("{}").unwrap();
        assert_eq!(options, CompileOptions::default());
    }

    #[test]
    fn test_parse_policies() {
        let options =
            CompileOptions::from_json(r#"{"required_properties": true, "additional_properties": "remove"}"#)
                .unwrap();
        assert!(options.required_properties);
        assert_eq!(options.additional_properties, AdditionalPropertiesOption::Remove);

        let options =
            CompileOptions::from_json(r#"{"additional_properties": {"schema": "string"}}"#).unwrap();
        assert_eq!(
            options.additional_properties,
            AdditionalPropertiesOption::Schema("string".to_string())
        );
    }

    #[test]
    fn test_invalid_options() {
        let err = CompileOptions::from_json(r#"{"additional_properties": "sometimes"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));

        let options = CompileOptions {
            additional_properties: AdditionalPropertiesOption::Schema("nope".to_string()),
            ..CompileOptions::default()
        };
        assert!(options.to_context(&Compiler::new()).is_err());
    }
}
