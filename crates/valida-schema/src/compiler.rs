//! Descriptor compiler and the structural factory chain

use crate::builtins::BUILTINS;
use crate::context::{AdditionalProperties, CompileContext, ContextOverrides};
use crate::descriptor::Descriptor;
use crate::options::CompileOptions;
use crate::registry::Registry;
use crate::{Error, Result};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};
use valida_validation::{
    Additional, AllOf, AnyOf, ChainOf, Condition, DefaultValue, HeterogeneousSequence,
    HomogeneousSequence, Mapping, NonNullable, Nullable, Object, Pattern, Range, Type,
    ValidatorRef,
};
use valida_value::Value;

/// Structural factory: claims a descriptor shape or passes with `Ok(None)`
pub type Factory = Arc<dyn Fn(&Descriptor, &Scope<'_>) -> Result<Option<ValidatorRef>> + Send + Sync>;

/// Owns the named-validator registry and the factory chain
///
/// Registration and factory installation may happen concurrently with
/// compilation. Compiled validators are immutable and can be shared freely.
pub struct Compiler {
    registry: Registry,
    factories: RwLock<Vec<Factory>>,
    defaults: CompileContext,
}

impl Compiler {
    /// Compiler with the built-in names and structural factories
    #[must_use]
    pub fn new() -> Self {
        let registry = Registry::new();
        for (name, produce) in BUILTINS {
            registry.register_producer(*name, *produce);
        }
        Self {
            registry,
            factories: RwLock::new(structural_factories()),
            defaults: CompileContext::default(),
        }
    }

    /// Replace the context used when no overrides are given
    #[must_use]
    pub fn with_defaults(mut self, defaults: CompileContext) -> Self {
        self.defaults = defaults;
        self
    }

    /// Compiler whose default context comes from loaded options
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] if the options refer to an
    /// unknown additional-properties schema.
    pub fn from_options(options: &CompileOptions) -> Result<Self> {
        let compiler = Self::new();
        let defaults = options.to_context(&compiler)?;
        Ok(compiler.with_defaults(defaults))
    }

    #[must_use]
    pub fn defaults(&self) -> &CompileContext {
        &self.defaults
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bind `name` to a validator, replacing any previous binding
    pub fn register(&self, name: impl Into<String>, validator: ValidatorRef) {
        let name = name.into();
        debug!("Registering validator: {}", name);
        self.registry.register(name, validator);
    }

    /// Bind `name` to a producer instantiated on first use
    pub fn register_producer(&self, name: impl Into<String>, producer: fn() -> ValidatorRef) {
        let name = name.into();
        debug!("Registering validator producer: {}", name);
        self.registry.register_producer(name, producer);
    }

    /// Install a factory ahead of every existing one
    pub fn register_factory<F>(&self, factory: F) -> Factory
    where
        F: Fn(&Descriptor, &Scope<'_>) -> Result<Option<ValidatorRef>> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(factory);
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        factories.insert(0, Arc::clone(&factory));
        debug!("Installed factory, chain length now {}", factories.len());
        factory
    }

    /// Compile under the default context
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if no rule resolves the descriptor.
    pub fn compile(&self, descriptor: &Descriptor) -> Result<ValidatorRef> {
        self.root().compile(descriptor)
    }

    /// Compile with the object defaults overridden for this call only
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if no rule resolves the descriptor.
    pub fn compile_with(
        &self,
        descriptor: &Descriptor,
        required_properties: Option<bool>,
        additional_properties: Option<AdditionalProperties>,
    ) -> Result<ValidatorRef> {
        self.scope(&ContextOverrides {
            required_properties,
            additional_properties,
        })
        .compile(descriptor)
    }

    /// Scope using the default context
    #[must_use]
    pub fn root(&self) -> Scope<'_> {
        Scope {
            compiler: self,
            context: self.defaults.clone(),
        }
    }

    /// Scope with `overrides` layered onto the default context
    #[must_use]
    pub fn scope(&self, overrides: &ContextOverrides) -> Scope<'_> {
        self.root().scope(overrides)
    }

    fn factory_chain(&self) -> Vec<Factory> {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("registry", &self.registry)
            .field("factories", &self.factory_chain().len())
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// A compiler paired with the context in effect
///
/// Everything compiled through a scope, including nested descriptors,
/// sees its context. Scopes are immutable; [`Scope::scope`] derives a new
/// one for a nested block.
#[derive(Debug, Clone)]
pub struct Scope<'c> {
    compiler: &'c Compiler,
    context: CompileContext,
}

impl<'c> Scope<'c> {
    #[must_use]
    pub fn compiler(&self) -> &'c Compiler {
        self.compiler
    }

    #[must_use]
    pub fn context(&self) -> &CompileContext {
        &self.context
    }

    /// Derive a scope with `overrides` applied
    #[must_use]
    pub fn scope(&self, overrides: &ContextOverrides) -> Scope<'c> {
        if !overrides.is_empty() {
            trace!(?overrides, "Entering scoped compile context");
        }
        Scope {
            compiler: self.compiler,
            context: self.context.with_overrides(overrides),
        }
    }

    /// Resolve a descriptor to a validator
    ///
    /// Built validators pass through, producers are instantiated, names are
    /// looked up in the registry and anything else goes through the factory
    /// chain, most recently installed first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if nothing claims the descriptor.
    pub fn compile(&self, descriptor: &Descriptor) -> Result<ValidatorRef> {
        match descriptor {
            Descriptor::Validator(validator) => return Ok(Arc::clone(validator)),
            Descriptor::Producer(produce) => return Ok(produce()),
            Descriptor::Name(name) => {
                if let Some(validator) = self.compiler.registry.get(name) {
                    trace!("Resolved registered name: {}", name);
                    return Ok(validator);
                }
            }
            _ => {}
        }
        for factory in self.compiler.factory_chain() {
            if let Some(validator) = factory(descriptor, self)? {
                return Ok(validator);
            }
        }
        Err(Error::Schema(format!(
            "{descriptor} cannot be compiled into a validator"
        )))
    }

    fn compile_all(&self, descriptors: &[Descriptor]) -> Result<Vec<ValidatorRef>> {
        descriptors.iter().map(|d| self.compile(d)).collect()
    }

    fn compile_opt(&self, descriptor: Option<&Descriptor>) -> Result<Option<ValidatorRef>> {
        descriptor.map(|d| self.compile(d)).transpose()
    }

    /// Compile, then strip one level of nullable wrapping unless the
    /// descriptor was an already built validator
    fn compile_unwrapped(&self, descriptor: &Descriptor) -> Result<ValidatorRef> {
        let validator = self.compile(descriptor)?;
        if matches!(descriptor, Descriptor::Validator(_)) {
            Ok(validator)
        } else {
            Ok(Nullable::unwrap_nullability(validator))
        }
    }

    /// First branch accepting the value wins
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if any branch fails to compile.
    pub fn any_of(&self, descriptors: &[Descriptor]) -> Result<AnyOf> {
        Ok(AnyOf::new(self.compile_all(descriptors)?))
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if any branch fails to compile.
    pub fn all_of(&self, descriptors: &[Descriptor]) -> Result<AllOf> {
        Ok(AllOf::new(self.compile_all(descriptors)?))
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if any step fails to compile.
    pub fn chain_of(&self, descriptors: &[Descriptor]) -> Result<ChainOf> {
        Ok(ChainOf::new(self.compile_all(descriptors)?))
    }

    /// Nullable with a null default
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the inner descriptor fails to compile.
    pub fn nullable(&self, descriptor: &Descriptor) -> Result<Nullable> {
        self.nullable_with(descriptor, DefaultValue::default())
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the inner descriptor fails to compile.
    pub fn nullable_with(
        &self,
        descriptor: &Descriptor,
        default: impl Into<DefaultValue>,
    ) -> Result<Nullable> {
        let inner = self.compile_unwrapped(descriptor)?;
        Ok(Nullable::new(inner).with_default(default))
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the inner descriptor fails to compile.
    pub fn non_nullable(&self, descriptor: Option<&Descriptor>) -> Result<NonNullable> {
        let inner = descriptor.map(|d| self.compile_unwrapped(d)).transpose()?;
        Ok(NonNullable::new(inner))
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the inner descriptor fails to compile.
    pub fn range(
        &self,
        descriptor: Option<&Descriptor>,
        min: Option<Value>,
        max: Option<Value>,
    ) -> Result<Range> {
        Ok(Range::new(self.compile_opt(descriptor)?).bounds(min, max))
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the item descriptor fails to compile.
    pub fn sequence(
        &self,
        item: Option<&Descriptor>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Result<HomogeneousSequence> {
        let mut sequence = HomogeneousSequence::new(self.compile_opt(item)?);
        if let Some(min) = min_length {
            sequence = sequence.min_length(min);
        }
        if let Some(max) = max_length {
            sequence = sequence.max_length(max);
        }
        Ok(sequence)
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if any item descriptor fails to compile.
    pub fn tuple(&self, items: &[Descriptor]) -> Result<HeterogeneousSequence> {
        Ok(HeterogeneousSequence::new(self.compile_all(items)?))
    }

    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the key or value descriptor fails to compile.
    pub fn mapping(
        &self,
        key: Option<&Descriptor>,
        value: Option<&Descriptor>,
    ) -> Result<Mapping> {
        Ok(Mapping::new(self.compile_opt(key)?, self.compile_opt(value)?))
    }

    /// Object with explicit optional and required properties
    ///
    /// `additional` falls back to the scope's default policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if any property or additional-property
    /// descriptor fails to compile.
    pub fn object(
        &self,
        optional: &[(String, Descriptor)],
        required: &[(String, Descriptor)],
        additional: Option<&AdditionalProperties>,
    ) -> Result<Object> {
        let compile_props = |props: &[(String, Descriptor)]| {
            props
                .iter()
                .map(|(name, d)| self.compile(d).map(|validator| (name.clone(), validator)))
                .collect::<Result<Vec<_>>>()
        };
        let optional = compile_props(optional)?;
        let required = compile_props(required)?;
        let policy = match additional.unwrap_or(&self.context.additional_properties) {
            AdditionalProperties::Allow => Additional::Allow,
            AdditionalProperties::Deny => Additional::Deny,
            AdditionalProperties::Remove => Additional::Remove,
            AdditionalProperties::Schema(d) => Additional::Schema(self.compile(d)?),
        };
        Ok(Object::new(optional, required, policy))
    }
}

fn boxed<V: valida_validation::Validator + 'static>(validator: V) -> Option<ValidatorRef> {
    Some(Arc::new(validator))
}

fn nullable_name(descriptor: &Descriptor, scope: &Scope<'_>) -> Result<Option<ValidatorRef>> {
    match descriptor {
        Descriptor::Name(name) => match name.strip_prefix('?') {
            Some(rest) => Ok(boxed(scope.nullable(&Descriptor::from(rest))?)),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

fn non_nullable_name(descriptor: &Descriptor, scope: &Scope<'_>) -> Result<Option<ValidatorRef>> {
    match descriptor {
        Descriptor::Name(name) => match name.strip_prefix('+') {
            Some(rest) => Ok(boxed(scope.non_nullable(Some(&Descriptor::from(rest)))?)),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

fn condition(descriptor: &Descriptor, _scope: &Scope<'_>) -> Result<Option<ValidatorRef>> {
    match descriptor {
        Descriptor::Predicate { label, predicate } => {
            Ok(boxed(Condition::from_fn(label.clone(), Arc::clone(predicate))))
        }
        _ => Ok(None),
    }
}

fn type_check(descriptor: &Descriptor, _scope: &Scope<'_>) -> Result<Option<ValidatorRef>> {
    match descriptor {
        Descriptor::Type(class) => Ok(boxed(Type::new([*class]))),
        _ => Ok(None),
    }
}

fn pattern(descriptor: &Descriptor, _scope: &Scope<'_>) -> Result<Option<ValidatorRef>> {
    match descriptor {
        Descriptor::Pattern(regex) => Ok(boxed(Pattern::from_regex(regex.clone()))),
        _ => Ok(None),
    }
}

fn homogeneous_sequence(
    descriptor: &Descriptor,
    scope: &Scope<'_>,
) -> Result<Option<ValidatorRef>> {
    match descriptor {
        Descriptor::List(items) if items.len() <= 1 => {
            Ok(boxed(scope.sequence(items.first(), None, None)?))
        }
        _ => Ok(None),
    }
}

fn heterogeneous_sequence(
    descriptor: &Descriptor,
    scope: &Scope<'_>,
) -> Result<Option<ValidatorRef>> {
    match descriptor {
        Descriptor::Tuple(items) => Ok(boxed(scope.tuple(items)?)),
        _ => Ok(None),
    }
}

/// Object literal; `+name` is required, `?name` optional and a bare name
/// follows the scope's default
fn object_literal(descriptor: &Descriptor, scope: &Scope<'_>) -> Result<Option<ValidatorRef>> {
    let Descriptor::Object(properties) = descriptor else {
        return Ok(None);
    };
    let mut optional = Vec::new();
    let mut required = Vec::new();
    for (key, nested) in properties {
        if let Some(name) = key.strip_prefix('+') {
            required.push((name.to_string(), nested.clone()));
        } else if let Some(name) = key.strip_prefix('?') {
            optional.push((name.to_string(), nested.clone()));
        } else if scope.context().required_properties {
            required.push((key.clone(), nested.clone()));
        } else {
            optional.push((key.clone(), nested.clone()));
        }
    }
    Ok(boxed(scope.object(&optional, &required, None)?))
}

/// The built-in chain, highest priority first
fn structural_factories() -> Vec<Factory> {
    let chain: [Factory; 8] = [
        Arc::new(nullable_name),
        Arc::new(non_nullable_name),
        Arc::new(condition),
        Arc::new(type_check),
        Arc::new(pattern),
        Arc::new(homogeneous_sequence),
        Arc::new(heterogeneous_sequence),
        Arc::new(object_literal),
    ];
    Vec::from(chain)
}
