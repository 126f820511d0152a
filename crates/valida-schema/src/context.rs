//! Compile context and scoped overrides

use crate::descriptor::Descriptor;

/// What an object literal does with keys it does not declare
#[derive(Debug, Clone, Default)]
pub enum AdditionalProperties {
    #[default]
    Allow,
    Deny,
    Remove,
    /// Every additional value must satisfy this descriptor
    Schema(Box<Descriptor>),
}

impl From<bool> for AdditionalProperties {
    fn from(allow: bool) -> Self {
        if allow {
            AdditionalProperties::Allow
        } else {
            AdditionalProperties::Deny
        }
    }
}

impl From<Descriptor> for AdditionalProperties {
    fn from(descriptor: Descriptor) -> Self {
        AdditionalProperties::Schema(Box::new(descriptor))
    }
}

/// Defaults applied while compiling object literals
///
/// Object validators capture these at compile time; changing the context
/// later never affects validators that were already built.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    /// Whether unprefixed property names are required
    pub required_properties: bool,
    pub additional_properties: AdditionalProperties,
}

/// Partial context layered on top of an enclosing one
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub required_properties: Option<bool>,
    pub additional_properties: Option<AdditionalProperties>,
}

impl ContextOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required_properties = Some(required);
        self
    }

    #[must_use]
    pub fn additional(mut self, additional: impl Into<AdditionalProperties>) -> Self {
        self.additional_properties = Some(additional.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required_properties.is_none() && self.additional_properties.is_none()
    }
}

impl CompileContext {
    /// Context with `overrides` applied; unset fields keep this context's value
    #[must_use]
    pub fn with_overrides(&self, overrides: &ContextOverrides) -> CompileContext {
        CompileContext {
            required_properties: overrides
                .required_properties
                .unwrap_or(self.required_properties),
            additional_properties: overrides
                .additional_properties
                .clone()
                .unwrap_or_else(|| self.additional_properties.clone()),
        }
    }
}
