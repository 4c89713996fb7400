//! Debug implementation for Value

use std::fmt;

use super::*;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),

            Value::I32(n) => write!(f, "{}i32", n),
            Value::I64(n) => write!(f, "{}i64", n),
            Value::U32(n) => write!(f, "{}u32", n),
            Value::U64(n) => write!(f, "{}u64", n),

            Value::F32(n) => write!(f, "{}f32", n),
            Value::F64(n) => write!(f, "{}f64", n),

            Value::String(s) => write!(f, "{:?}", s.as_str()),
            Value::Bytes(b) => write!(f, "b{:?}", b.as_slice()),

            Value::Array(a) => {
                write!(f, "[")?;
                for (i, item) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }

            Value::Message(m) => write!(f, "{:?}", &**m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_scalars() {
        assert_eq!(format!("{:?}", Value::I32(42)), "42i32");
        assert_eq!(format!("{:?}", Value::Bool(true)), "true");
        assert_eq!(format!("{:?}", Value::string("hi")), "\"hi\"");
    }
}
