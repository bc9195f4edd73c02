use std::fmt;
use tiny_passes::symtab::SymbolType;

/// A runtime value. The variant of a variable never changes: it is fixed by its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i16),
    Str(String),
}

impl Value {
    /// The value a variable of type `ty` holds before any assignment.
    /// Returns `None` for [`SymbolType::Void`].
    pub fn initial(ty: SymbolType) -> Option<Value> {
        match ty {
            SymbolType::Integer => Some(Value::Integer(0)),
            SymbolType::String => Some(Value::Str(String::new())),
            SymbolType::Void => None,
        }
    }

    /// Attempts to cast the `Value` into an `i16` or `None` if wrong type.
    pub fn cast_to_integer(&self) -> Option<i16> {
        match self {
            Value::Integer(val) => Some(*val),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(val) => write!(f, "{}", val),
            Value::Str(val) => write!(f, "{}", val),
        }
    }
}
