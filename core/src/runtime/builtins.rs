use super::err::EvalError;
use super::value::{NativeFunction, Value};

pub const BUILTINS: &[NativeFunction] = &[
    NativeFunction { name: "len", func: builtin_len },
    NativeFunction { name: "str", func: builtin_str },
    NativeFunction { name: "int", func: builtin_int },
    NativeFunction { name: "float", func: builtin_float },
];

pub fn lookup_builtin(name: &str) -> Option<Value> {
    BUILTINS.iter().find(|f| f.name == name).map(|f| Value::Function(*f))
}

fn single<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, EvalError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(EvalError::Arity {
            name: name.to_string(),
            expected: 1,
            found: args.len(),
        }),
    }
}

fn invalid(name: &str, message: String) -> EvalError {
    EvalError::InvalidArgument {
        name: name.to_string(),
        message,
    }
}

fn builtin_len(args: &[Value]) -> Result<Value, EvalError> {
    match single("len", args)? {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Int(items.len() as i64)),
        Value::Component(c) => Ok(Value::Int(c.children().len() as i64)),
        other => Err(invalid("len", format!("{} has no length", other.type_name()))),
    }
}

fn builtin_str(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(single("str", args)?.to_string()))
}

fn builtin_int(args: &[Value]) -> Result<Value, EvalError> {
    match single("int", args)? {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| invalid("int", format!("{:?}: {}", s, e))),
        other => Err(invalid("int", format!("cannot convert {}", other.type_name()))),
    }
}

fn builtin_float(args: &[Value]) -> Result<Value, EvalError> {
    match single("float", args)? {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| invalid("float", format!("{:?}: {}", s, e))),
        other => Err(invalid("float", format!("cannot convert {}", other.type_name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let int = lookup_builtin("int");
        let Some(Value::Function(int)) = int else {
            panic!("int is not a builtin");
        };
        assert_eq!(int.call(&[Value::Str(" 42 ".into())]), Ok(Value::Int(42)));
        assert!(int.call(&[Value::Str("x".into())]).is_err());
        assert!(matches!(int.call(&[]), Err(EvalError::Arity { expected: 1, found: 0, .. })));
    }

    #[test]
    fn len_counts_characters() {
        let Some(Value::Function(len)) = lookup_builtin("len") else {
            panic!("len is not a builtin");
        };
        assert_eq!(len.call(&[Value::Str("héllo".into())]), Ok(Value::Int(5)));
    }
}
