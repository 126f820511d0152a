//! Built-in named validators

use std::sync::Arc;
use valida_validation::{Text, Type, ValidatorRef};

/// Names registered by every new compiler, with their default instances
pub const BUILTINS: &[(&str, fn() -> ValidatorRef)] = &[
    ("boolean", boolean),
    ("integer", integer),
    ("number", number),
    ("string", string),
    ("date", date),
    ("datetime", datetime),
    ("time", time),
];

fn boolean() -> ValidatorRef {
    Arc::new(Type::boolean())
}

fn integer() -> ValidatorRef {
    Arc::new(Type::integer())
}

fn number() -> ValidatorRef {
    Arc::new(Type::number())
}

fn string() -> ValidatorRef {
    Arc::new(Text::new())
}

fn date() -> ValidatorRef {
    Arc::new(Type::date())
}

fn datetime() -> ValidatorRef {
    Arc::new(Type::datetime())
}

fn time() -> ValidatorRef {
    Arc::new(Type::time())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_match_instances() {
        for (name, produce) in BUILTINS {
            assert_eq!(produce().name(), Some(*name));
        }
    }
}
