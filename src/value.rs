use std::fmt;

/// Represents evaluated/stored values within the interpreter.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    String_(String),
    Char(char),
    Void,
    Null,
}

impl Value {
    pub fn type_to_string(&self) -> String {
        match self {
            Self::Int(..) => String::from("Int"),
            Self::Double(..) => String::from("Double"),
            Self::Bool(..) => String::from("Boolean"),
            Self::String_(..) => String::from("String"),
            Self::Char(..) => String::from("Char"),
            Self::Void => String::from("Void"),
            Self::Null => String::from("Null"),
        }
    }

    /// Nonzero-integer truthiness: booleans are themselves, numbers compare
    /// against zero, everything else is false.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Double(d) => *d != 0.0,
            _ => false,
        }
    }

    fn as_double(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => write!(f, "{}", x),
            Self::Double(x) => write!(f, "{}", x),
            Self::Bool(x) => write!(f, "{}", x),
            Self::String_(x) => write!(f, "{}", x),
            Self::Char(x) => write!(f, "{}", x),
            Self::Void => write!(f, "void"),
            Self::Null => write!(f, "null"),
        }
    }
}

// Coercing arithmetic. Int-op-Int stays Int; any Double operand promotes
// both sides. Non-numeric operands collapse to the Int 0 sentinel so a pass
// can always finish.

pub fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x + y),
        _ => match (a.as_double(), b.as_double()) {
            (Some(x), Some(y)) => Value::Double(x + y),
            _ => Value::Int(0),
        },
    }
}

pub fn sub(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x - y),
        _ => match (a.as_double(), b.as_double()) {
            (Some(x), Some(y)) => Value::Double(x - y),
            _ => Value::Int(0),
        },
    }
}

pub fn mul(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x * y),
        _ => match (a.as_double(), b.as_double()) {
            (Some(x), Some(y)) => Value::Double(x * y),
            _ => Value::Int(0),
        },
    }
}

/// Division by zero yields the Int 0 sentinel instead of failing the run.
pub fn div(a: &Value, b: &Value) -> Value {
    if b.as_double() == Some(0.0) {
        return Value::Int(0);
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x / y),
        _ => match (a.as_double(), b.as_double()) {
            (Some(x), Some(y)) => Value::Double(x / y),
            _ => Value::Int(0),
        },
    }
}

/// Modulo follows the same leniency as division.
pub fn rem(a: &Value, b: &Value) -> Value {
    if b.as_double() == Some(0.0) {
        return Value::Int(0);
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x % y),
        _ => match (a.as_double(), b.as_double()) {
            (Some(x), Some(y)) => Value::Double(x % y),
            _ => Value::Int(0),
        },
    }
}

/// Equality. Mismatched numeric kinds coerce to Double first; booleans only
/// compare against booleans; strings and chars compare by content.
pub fn equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String_(x), Value::String_(y)) => x == y,
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::Null, Value::Null) => true,
        _ => match (a.as_double(), b.as_double()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Relational comparison is numeric only; anything else is false.
pub fn compare(a: &Value, b: &Value, op: fn(&f64, &f64) -> bool) -> bool {
    match (a.as_double(), b.as_double()) {
        (Some(x), Some(y)) => op(&x, &y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(add(&Value::Int(2), &Value::Int(3)), Value::Int(5));
        assert_eq!(mul(&Value::Int(2), &Value::Int(3)), Value::Int(6));
        assert_eq!(div(&Value::Int(7), &Value::Int(2)), Value::Int(3));
        assert_eq!(rem(&Value::Int(7), &Value::Int(2)), Value::Int(1));
    }

    #[test]
    fn double_operand_promotes_both_sides() {
        assert_eq!(add(&Value::Int(1), &Value::Double(0.5)), Value::Double(1.5));
        assert_eq!(div(&Value::Double(7.0), &Value::Int(2)), Value::Double(3.5));
    }

    #[test]
    fn division_by_zero_is_the_int_zero_sentinel() {
        assert_eq!(div(&Value::Int(5), &Value::Int(0)), Value::Int(0));
        assert_eq!(div(&Value::Double(5.0), &Value::Double(0.0)), Value::Int(0));
        assert_eq!(rem(&Value::Int(5), &Value::Int(0)), Value::Int(0));
    }

    #[test]
    fn non_numeric_arithmetic_collapses_to_zero() {
        let s = Value::String_(String::from("a"));
        assert_eq!(add(&s, &Value::Int(1)), Value::Int(0));
    }

    #[test]
    fn equality_coerces_numeric_kinds() {
        assert!(equals(&Value::Int(2), &Value::Double(2.0)));
        assert!(!equals(&Value::Bool(true), &Value::Int(1)));
        assert!(equals(&Value::Bool(true), &Value::Bool(true)));
        assert!(equals(
            &Value::String_(String::from("x")),
            &Value::String_(String::from("x"))
        ));
    }

    #[test]
    fn truthiness_is_nonzero() {
        assert!(Value::Int(2).truthy());
        assert!(!Value::Int(0).truthy());
        assert!(Value::Double(0.5).truthy());
        assert!(!Value::Null.truthy());
        assert!(!Value::String_(String::from("x")).truthy());
    }
}
