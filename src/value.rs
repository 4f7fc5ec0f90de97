use crate::ObjectRef;
use std::fmt;
use std::rc::Rc;

/// The kind of value a field declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `true` or `false`
    Bool,

    /// Signed integer
    Int,

    /// Unsigned integer
    UInt,

    /// Floating point number. Integer literals are widened into this kind
    Float,

    /// Quoted string
    Str,

    /// Unquoted identifier from a closed set
    Enum,

    /// Fixed size list of numbers (eg: a direction)
    Vector,

    /// A single, possibly absent, object reference
    Object,

    /// An ordered list of object references
    ObjectList,
}

impl ValueKind {
    /// Returns true if the kind holds object references
    pub fn is_object(self) -> bool {
        matches!(self, ValueKind::Object | ValueKind::ObjectList)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Enum => "enum",
            ValueKind::Vector => "vector",
            ValueKind::Object => "object",
            ValueKind::ObjectList => "object list",
        };
        f.write_str(name)
    }
}

/// A single parsed value. Exactly one variant is held at a time and a field
/// replaces its value wholesale on assignment.
#[derive(Clone)]
pub enum Value {
    /// A boolean
    Bool(bool),

    /// A signed integer
    Int(i64),

    /// An unsigned integer
    UInt(u64),

    /// A floating point number
    Float(f64),

    /// A string
    Str(String),

    /// The identifier of an enumeration variant
    Enum(String),

    /// Components of a fixed size vector
    Vector(Vec<f64>),

    /// A reference to another object, `None` when unset or `null`
    Object(Option<ObjectRef>),

    /// References to other objects in the order they were given
    ObjectList(Vec<ObjectRef>),
}

impl Value {
    /// The kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Enum(_) => ValueKind::Enum,
            Value::Vector(_) => ValueKind::Vector,
            Value::Object(_) => ValueKind::Object,
            Value::ObjectList(_) => ValueKind::ObjectList,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::UInt(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(x) => Some(x),
            _ => None,
        }
    }

    /// Returns the string of a `Str` or `Enum` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(x) | Value::Enum(x) => Some(x.as_str()),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(x) => Some(x.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(x) => x.as_ref(),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&[ObjectRef]> {
        match self {
            Value::ObjectList(x) => Some(x.as_slice()),
            _ => None,
        }
    }

    /// The object references held by this value, in order. Scalars hold none.
    pub fn objects(&self) -> &[ObjectRef] {
        match self {
            Value::Object(Some(x)) => std::slice::from_ref(x),
            Value::ObjectList(x) => x.as_slice(),
            _ => &[],
        }
    }
}

/// Object references compare by identity, everything else by value
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => match (a, b) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            },
            (Value::ObjectList(a), Value::ObjectList(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| Rc::ptr_eq(a, b))
            }
            _ => false,
        }
    }
}

struct ObjectDebug<'a>(&'a ObjectRef);

impl<'a> fmt::Debug for ObjectDebug<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(obj) if obj.name().is_empty() => write!(f, "{}", obj.type_name()),
            Ok(obj) => write!(f, "{} {:?}", obj.type_name(), obj.name()),
            Err(_) => f.write_str("<borrowed>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(x) => f.debug_tuple("Bool").field(x).finish(),
            Value::Int(x) => f.debug_tuple("Int").field(x).finish(),
            Value::UInt(x) => f.debug_tuple("UInt").field(x).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Str(x) => f.debug_tuple("Str").field(x).finish(),
            Value::Enum(x) => f.debug_tuple("Enum").field(x).finish(),
            Value::Vector(x) => f.debug_tuple("Vector").field(x).finish(),
            Value::Object(None) => f.write_str("Object(null)"),
            Value::Object(Some(x)) => f.debug_tuple("Object").field(&ObjectDebug(x)).finish(),
            Value::ObjectList(x) => f
                .debug_tuple("ObjectList")
                .field(&x.iter().map(ObjectDebug).collect::<Vec<_>>())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds() {
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(Value::Float(1.0).kind(), ValueKind::Float);
        assert_eq!(Value::Object(None).kind(), ValueKind::Object);
        assert_eq!(Value::ObjectList(Vec::new()).kind(), ValueKind::ObjectList);
        assert!(ValueKind::ObjectList.is_object());
        assert!(!ValueKind::Vector.is_object());
    }

    #[test]
    fn value_kind_display() {
        assert_eq!(ValueKind::UInt.to_string(), "uint");
        assert_eq!(ValueKind::ObjectList.to_string(), "object list");
    }

    #[test]
    fn value_equality_is_by_variant() {
        assert_eq!(Value::Int(1), Value::Int(1));
        assert_ne!(Value::Int(1), Value::UInt(1));
        assert_ne!(Value::Str(String::from("a")), Value::Enum(String::from("a")));
        assert_eq!(Value::Object(None), Value::Object(None));
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Enum(String::from("linear")).as_str(), Some("linear"));
        assert_eq!(Value::Vector(vec![1.0, 0.0]).as_vector(), Some(&[1.0, 0.0][..]));
        assert_eq!(Value::Int(3).as_f64(), None);
        assert!(Value::Bool(false).objects().is_empty());
    }
}
