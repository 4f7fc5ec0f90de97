//! Typed field slots embedded in objects.
//!
//! A concrete object stores each declared field as a [`Field`] (scalars,
//! strings, vectors and object references) or an [`EnumField`] and reads it
//! through the native accessor (`get`). The reader and writer only see the
//! object safe [`FieldSlot`] view.

use crate::{ObjectRef, Value, ValueError, ValueKind};
use std::convert::TryFrom;
use std::fmt;

/// Generic view of a typed field used to drive reading and writing
pub trait FieldSlot {
    /// The declared kind of the field
    fn kind(&self) -> ValueKind;

    /// A copy of the current value
    fn value(&self) -> Value;

    /// A copy of the value the field holds when it is not set
    fn default_value(&self) -> Value;

    /// Returns true once a value has been assigned, even if the assigned
    /// value equals the default
    fn was_set(&self) -> bool;

    /// Replace the current value and mark the field as set. The field is left
    /// untouched on error.
    fn assign(&mut self, value: Value) -> Result<(), ValueError>;

    /// Restore the default and clear the set flag
    fn reset(&mut self);

    /// The accepted identifiers of an enumeration field, empty for every
    /// other kind
    fn variants(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Native types that can be stored in a [`Field`]
pub trait FieldValue: Clone + fmt::Debug + 'static {
    /// The kind of value the type is declared as
    const KIND: ValueKind;

    /// Convert into the generic value representation
    fn to_value(&self) -> Value;

    /// Convert from the generic value representation
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

#[inline]
fn mismatch<T>(expected: ValueKind, value: &Value) -> Result<T, ValueError> {
    Err(ValueError::Kind {
        expected,
        got: value.kind(),
    })
}

impl FieldValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(x) => Ok(x),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(x) => Ok(x),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(x) => i32::try_from(x).map_err(|_| ValueError::Overflow(x.to_string())),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for u64 {
    const KIND: ValueKind = ValueKind::UInt;

    fn to_value(&self) -> Value {
        Value::UInt(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::UInt(x) => Ok(x),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for u32 {
    const KIND: ValueKind = ValueKind::UInt;

    fn to_value(&self) -> Value {
        Value::UInt(u64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::UInt(x) => u32::try_from(x).map_err(|_| ValueError::Overflow(x.to_string())),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(x),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(x as f32),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for String {
    const KIND: ValueKind = ValueKind::Str;

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(x) => Ok(x),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl<const N: usize> FieldValue for [f64; N] {
    const KIND: ValueKind = ValueKind::Vector;

    fn to_value(&self) -> Value {
        Value::Vector(self.to_vec())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Vector(x) => {
                let got = x.len();
                <[f64; N]>::try_from(x).map_err(|_| ValueError::Length { expected: N, got })
            }
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for Option<ObjectRef> {
    const KIND: ValueKind = ValueKind::Object;

    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Object(x) => Ok(x),
            x => mismatch(Self::KIND, &x),
        }
    }
}

impl FieldValue for Vec<ObjectRef> {
    const KIND: ValueKind = ValueKind::ObjectList;

    fn to_value(&self) -> Value {
        Value::ObjectList(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::ObjectList(x) => Ok(x),
            x => mismatch(Self::KIND, &x),
        }
    }
}

/// A typed field that remembers its default and whether it was explicitly
/// assigned.
///
/// ```
/// use objlit::Field;
///
/// let mut radius = Field::new(1.0);
/// assert!(!radius.was_set());
/// radius.set(1.0);
/// assert!(radius.was_set());
/// assert_eq!(*radius.get(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Field<T> {
    value: T,
    default: T,
    was_set: bool,
}

impl<T: FieldValue> Field<T> {
    /// Create an unset field holding the given default
    pub fn new(default: T) -> Self {
        Field {
            value: default.clone(),
            default,
            was_set: false,
        }
    }

    /// The current value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutable access to the current value. Marks the field as set.
    pub fn get_mut(&mut self) -> &mut T {
        self.was_set = true;
        &mut self.value
    }

    /// Assign a value and mark the field as set
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.was_set = true;
    }

    /// The value held while the field is unset
    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn was_set(&self) -> bool {
        self.was_set
    }

    pub fn reset(&mut self) {
        self.value = self.default.clone();
        self.was_set = false;
    }
}

impl<T: FieldValue + Default> Default for Field<T> {
    fn default() -> Self {
        Field::new(T::default())
    }
}

impl<T: FieldValue> FieldSlot for Field<T> {
    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn value(&self) -> Value {
        self.value.to_value()
    }

    fn default_value(&self) -> Value {
        self.default.to_value()
    }

    fn was_set(&self) -> bool {
        self.was_set
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        self.set(T::from_value(value)?);
        Ok(())
    }

    fn reset(&mut self) {
        Field::reset(self)
    }
}

/// An enumeration whose variants are written as bare identifiers
///
/// ```
/// use objlit::FieldEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Filter {
///     Nearest,
///     Linear,
/// }
///
/// impl FieldEnum for Filter {
///     const NAMES: &'static [&'static str] = &["nearest", "linear"];
///
///     fn name(self) -> &'static str {
///         Self::NAMES[self as usize]
///     }
///
///     fn from_name(name: &str) -> Option<Self> {
///         match name {
///             "nearest" => Some(Filter::Nearest),
///             "linear" => Some(Filter::Linear),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Filter::from_name("linear"), Some(Filter::Linear));
/// ```
pub trait FieldEnum: Copy + PartialEq + fmt::Debug + 'static {
    /// Identifiers of every variant
    const NAMES: &'static [&'static str];

    /// The identifier of this variant
    fn name(self) -> &'static str;

    /// The variant with the given identifier
    fn from_name(name: &str) -> Option<Self>;
}

/// A field restricted to the variants of a [`FieldEnum`]
#[derive(Debug, Clone, Copy)]
pub struct EnumField<E> {
    value: E,
    default: E,
    was_set: bool,
}

impl<E: FieldEnum> EnumField<E> {
    /// Create an unset field holding the given default
    pub fn new(default: E) -> Self {
        EnumField {
            value: default,
            default,
            was_set: false,
        }
    }

    /// The current variant
    pub fn get(&self) -> E {
        self.value
    }

    /// Assign a variant and mark the field as set
    pub fn set(&mut self, value: E) {
        self.value = value;
        self.was_set = true;
    }

    pub fn default_value(&self) -> E {
        self.default
    }

    pub fn was_set(&self) -> bool {
        self.was_set
    }

    pub fn reset(&mut self) {
        self.value = self.default;
        self.was_set = false;
    }
}

impl<E: FieldEnum + Default> Default for EnumField<E> {
    fn default() -> Self {
        EnumField::new(E::default())
    }
}

impl<E: FieldEnum> FieldSlot for EnumField<E> {
    fn kind(&self) -> ValueKind {
        ValueKind::Enum
    }

    fn value(&self) -> Value {
        Value::Enum(String::from(self.value.name()))
    }

    fn default_value(&self) -> Value {
        Value::Enum(String::from(self.default.name()))
    }

    fn was_set(&self) -> bool {
        self.was_set
    }

    fn assign(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Enum(x) => match E::from_name(&x) {
                Some(variant) => {
                    self.set(variant);
                    Ok(())
                }
                None => Err(ValueError::UnknownVariant {
                    variant: x,
                    expected: E::NAMES,
                }),
            },
            x => mismatch(ValueKind::Enum, &x),
        }
    }

    fn reset(&mut self) {
        EnumField::reset(self)
    }

    fn variants(&self) -> &'static [&'static str] {
        E::NAMES
    }
}
