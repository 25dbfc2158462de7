use crate::error::ErrorType;
use crate::value::Value;

/// One name binding. `is_const` makes the binding reject `assign` but not
/// `define`: redefinition collapses in place, const or not.
struct Binding {
    name: String,
    value: Value,
    is_const: bool,
}

/// Stores variables for the whole run: one flat association list scanned
/// front to back. Bindings are never popped, so a name declared inside a
/// block stays visible afterwards.
pub struct Environment {
    bindings: Vec<Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Self { bindings: Vec::new() }
    }

    /// Declares a name. If the name is already bound, the value and const
    /// flag are overwritten in place, so there is never more than one live
    /// binding per name.
    pub fn define(&mut self, name: &str, value: Value, is_const: bool) {
        if let Some(binding) = self.bindings.iter_mut().find(|b| b.name == name) {
            binding.value = value;
            binding.is_const = is_const;
        } else {
            self.bindings.push(Binding {
                name: String::from(name),
                value,
                is_const,
            });
        }
    }

    /// Replaces the value of an existing, non-const binding. The write is
    /// rejected when the name is absent or bound const.
    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<(), ErrorType> {
        match self.bindings.iter_mut().find(|b| b.name == name) {
            Some(binding) if binding.is_const => Err(ErrorType::ConstAssignment {
                name: String::from(name),
                line,
            }),
            Some(binding) => {
                binding.value = value;
                Ok(())
            },
            None => Err(ErrorType::UndefinedVariable {
                name: String::from(name),
                line,
            }),
        }
    }

    /// Returns the first binding's value as an independently owned copy, so
    /// stored and returned values never alias.
    pub fn get(&self, name: &str, line: usize) -> Result<Value, ErrorType> {
        match self.bindings.iter().find(|b| b.name == name) {
            Some(binding) => Ok(binding.value.clone()),
            None => Err(ErrorType::UndefinedVariable {
                name: String::from(name),
                line,
            }),
        }
    }

}

#[cfg(test)]
mod tests {
    use crate::{error::ErrorType, value::Value};

    use super::Environment;

    #[test]
    fn define_then_get() {
        let mut env = Environment::new();
        env.define("a", Value::Int(5), false);
        assert_eq!(env.get("a", 1), Ok(Value::Int(5)));
    }

    #[test]
    fn redefinition_collapses_to_one_binding() {
        let mut env = Environment::new();
        env.define("a", Value::Int(1), false);
        env.define("a", Value::Int(2), false);
        assert_eq!(env.get("a", 1), Ok(Value::Int(2)));
    }

    #[test]
    fn define_overwrites_a_const_binding() {
        // `define` collapses even across const; only `assign` checks the flag.
        let mut env = Environment::new();
        env.define("a", Value::Int(1), true);
        env.define("a", Value::Int(2), false);
        assert_eq!(env.get("a", 1), Ok(Value::Int(2)));
        assert_eq!(env.assign("a", Value::Int(3), 1), Ok(()));
    }

    #[test]
    fn assign_rejects_const() {
        let mut env = Environment::new();
        env.define("a", Value::Int(1), true);
        assert_eq!(
            env.assign("a", Value::Int(2), 3),
            Err(ErrorType::ConstAssignment { name: String::from("a"), line: 3 })
        );
        // The binding is unchanged after the rejected write.
        assert_eq!(env.get("a", 1), Ok(Value::Int(1)));
    }

    #[test]
    fn assign_rejects_undefined() {
        let mut env = Environment::new();
        assert_eq!(
            env.assign("b", Value::Int(2), 7),
            Err(ErrorType::UndefinedVariable { name: String::from("b"), line: 7 })
        );
    }

    #[test]
    fn get_undefined() {
        let env = Environment::new();
        assert_eq!(
            env.get("b", 4),
            Err(ErrorType::UndefinedVariable { name: String::from("b"), line: 4 })
        );
    }

    #[test]
    fn get_returns_an_independent_copy() {
        let mut env = Environment::new();
        env.define("s", Value::String_(String::from("abc")), false);
        let mut copy = env.get("s", 1).unwrap();
        if let Value::String_(s) = &mut copy {
            s.push('!');
        }
        // The stored value must not observe the mutation.
        assert_eq!(env.get("s", 1), Ok(Value::String_(String::from("abc"))));
    }
}
