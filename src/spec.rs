use crate::text::lexer::is_identifier;
use crate::{new_object, Object, ObjectRef, Value, ValueKind};
use std::fmt;

/// Creates a fresh, fully defaulted instance of a registered type
pub type Factory = fn() -> ObjectRef;

/// Static metadata of one declared field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: &'static str,
    kind: ValueKind,
    default: Value,
    variants: &'static [&'static str],
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: ValueKind, default: Value) -> Self {
        FieldSpec {
            name,
            kind,
            default,
            variants: &[],
        }
    }

    /// Set the identifiers accepted by an enumeration field
    pub fn with_variants(mut self, variants: &'static [&'static str]) -> Self {
        self.variants = variants;
        self
    }

    /// The identifiers accepted by an enumeration field
    pub fn variants(&self) -> &'static [&'static str] {
        self.variants
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The value of the field when it is not set
    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

/// Static metadata of a concrete object type: its name, how to create it, and
/// its fields in declaration order.
///
/// The field list is taken from a prototype created by the factory, so the
/// metadata can never drift from what the type actually declares.
///
/// ```
/// use objlit::{object_fields, Field, Object, ObjectSpec, ValueKind};
///
/// #[derive(Debug, Default)]
/// struct Sampler {
///     name: String,
///     anisotropy: Field<u32>,
///     lod_bias: Field<f64>,
/// }
///
/// impl Object for Sampler {
///     object_fields!("Sampler", name: name, fields: [anisotropy, lod_bias]);
/// }
///
/// let spec = ObjectSpec::of::<Sampler>();
/// assert_eq!(spec.type_name(), "Sampler");
/// let (index, field) = spec.field("lod_bias").unwrap();
/// assert_eq!(index, 1);
/// assert_eq!(field.kind(), ValueKind::Float);
/// ```
#[derive(Clone)]
pub struct ObjectSpec {
    type_name: &'static str,
    factory: Factory,
    fields: Vec<FieldSpec>,
}

fn create_default<T: Object + Default>() -> ObjectRef {
    new_object(T::default())
}

impl ObjectSpec {
    /// Describe the type produced by `factory`
    pub fn new(factory: Factory) -> Self {
        let prototype = factory();
        let prototype = prototype.borrow();
        let fields = prototype
            .fields()
            .map(|(name, slot)| {
                FieldSpec::new(name, slot.kind(), slot.default_value())
                    .with_variants(slot.variants())
            })
            .collect();

        ObjectSpec {
            type_name: prototype.type_name(),
            factory,
            fields,
        }
    }

    /// Describe a type constructed through its `Default` implementation
    pub fn of<T: Object + Default>() -> Self {
        ObjectSpec::new(create_default::<T>)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Create a fresh instance with every field unset
    pub fn create(&self) -> ObjectRef {
        (self.factory)()
    }

    /// The declared fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Find a field and its declaration index by name
    pub fn field(&self, name: &str) -> Option<(usize, &FieldSpec)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    /// The first type, field, or variant name that would not read back as the
    /// identifier it was written as
    pub(crate) fn invalid_name(&self) -> Option<&'static str> {
        std::iter::once(self.type_name)
            .chain(self.fields.iter().map(|x| x.name))
            .chain(self.fields.iter().flat_map(|x| x.variants.iter().copied()))
            .find(|x| !is_identifier(x))
    }

    /// The first field name that is declared more than once
    pub(crate) fn duplicate_field(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .enumerate()
            .find(|(i, x)| self.fields[..*i].iter().any(|y| y.name == x.name))
            .map(|(_, x)| x.name)
    }
}

impl fmt::Debug for ObjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSpec")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{object_fields, EnumField, Field, FieldEnum};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Filter {
        Nearest,
        Linear,
    }

    impl FieldEnum for Filter {
        const NAMES: &'static [&'static str] = &["nearest", "linear"];

        fn name(self) -> &'static str {
            Self::NAMES[self as usize]
        }

        fn from_name(name: &str) -> Option<Self> {
            Self::NAMES
                .iter()
                .position(|x| *x == name)
                .map(|i| [Filter::Nearest, Filter::Linear][i])
        }
    }

    #[derive(Debug)]
    struct Texture {
        name: String,
        path: Field<String>,
        filter: EnumField<Filter>,
        sampler: Field<Option<ObjectRef>>,
    }

    impl Default for Texture {
        fn default() -> Self {
            Texture {
                name: String::new(),
                path: Field::new(String::from("missing.png")),
                filter: EnumField::new(Filter::Linear),
                sampler: Field::default(),
            }
        }
    }

    impl Object for Texture {
        object_fields!("Texture", name: name, fields: [path, filter, sampler]);
    }

    #[derive(Debug, Default)]
    struct Twice {
        name: String,
        a: Field<i64>,
    }

    impl Object for Twice {
        object_fields!("Twice", name: name, fields: [a, a]);
    }

    #[test]
    fn spec_from_prototype() {
        let spec = ObjectSpec::of::<Texture>();
        assert_eq!(spec.type_name(), "Texture");

        let fields = spec.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name(), "path");
        assert_eq!(fields[0].kind(), ValueKind::Str);
        assert_eq!(
            fields[0].default_value(),
            &Value::Str(String::from("missing.png"))
        );
        assert_eq!(fields[1].kind(), ValueKind::Enum);
        assert_eq!(fields[1].default_value(), &Value::Enum(String::from("linear")));
        assert_eq!(fields[1].variants(), &["nearest", "linear"]);
        assert!(fields[0].variants().is_empty());
        assert_eq!(fields[2].kind(), ValueKind::Object);
        assert_eq!(fields[2].default_value(), &Value::Object(None));
        assert!(spec.duplicate_field().is_none());
        assert!(spec.invalid_name().is_none());
    }

    #[test]
    fn spec_creates_unset_objects() {
        let spec = ObjectSpec::of::<Texture>();
        let obj = spec.create();
        let obj = obj.borrow();
        assert_eq!(obj.type_name(), "Texture");
        assert!(obj.fields().all(|(_, slot)| !slot.was_set()));
        assert_eq!(Filter::from_name("nearest"), Some(Filter::Nearest));
    }

    #[test]
    fn spec_field_lookup() {
        let spec = ObjectSpec::of::<Texture>();
        assert_eq!(spec.field("sampler").map(|(i, _)| i), Some(2));
        assert!(spec.field("Sampler").is_none());
    }

    #[test]
    fn spec_detects_duplicate_fields() {
        let spec = ObjectSpec::of::<Twice>();
        assert_eq!(spec.duplicate_field(), Some("a"));
    }

    #[derive(Debug, Default)]
    struct Keyword {
        name: String,
        r#type: Field<String>,
    }

    impl Object for Keyword {
        object_fields!("Keyword", name: name, fields: [r#type]);
    }

    #[test]
    fn spec_detects_unwritable_names() {
        let spec = ObjectSpec::of::<Keyword>();
        assert_eq!(spec.invalid_name(), Some("r#type"));
    }
}
