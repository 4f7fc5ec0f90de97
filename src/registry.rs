use crate::{Error, ErrorKind, Object, ObjectRef, ObjectSpec};
use log::debug;
use std::collections::HashMap;

/// Maps type names to the specs used to instantiate them.
///
/// Populate the registry with every type before handing it to a
/// [`Reader`](crate::Reader); it is only read from afterwards.
///
/// ```
/// use objlit::{object_fields, Field, Object, Registry};
///
/// #[derive(Debug, Default)]
/// struct Sphere {
///     name: String,
///     radius: Field<f64>,
/// }
///
/// impl Object for Sphere {
///     object_fields!("Sphere", name: name, fields: [radius]);
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = Registry::new();
/// registry.register_type::<Sphere>()?;
/// assert!(registry.register_type::<Sphere>().is_err());
///
/// let (sphere, spec) = registry.create_object("Sphere")?;
/// assert_eq!(spec.fields().len(), 1);
/// assert_eq!(sphere.borrow().type_name(), "Sphere");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    specs: HashMap<&'static str, ObjectSpec>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a type. Registering the same type name twice is an error, as
    /// is a type that declares a field name twice or uses a name that cannot
    /// be written as a bare identifier.
    pub fn register(&mut self, spec: ObjectSpec) -> Result<(), Error> {
        if let Some(name) = spec.invalid_name() {
            return Err(Error::new(ErrorKind::InvalidName {
                type_name: String::from(spec.type_name()),
                name: String::from(name),
            }));
        }

        if let Some(field) = spec.duplicate_field() {
            return Err(Error::new(ErrorKind::DuplicateField {
                type_name: String::from(spec.type_name()),
                field: String::from(field),
            }));
        }

        if self.specs.contains_key(spec.type_name()) {
            return Err(Error::new(ErrorKind::DuplicateType {
                type_name: String::from(spec.type_name()),
            }));
        }

        debug!(
            "registered type {} with {} fields",
            spec.type_name(),
            spec.fields().len()
        );
        self.specs.insert(spec.type_name(), spec);
        Ok(())
    }

    /// Register a type constructed through its `Default` implementation
    pub fn register_type<T: Object + Default>(&mut self) -> Result<(), Error> {
        self.register(ObjectSpec::of::<T>())
    }

    /// Instantiate a registered type with every field at its default
    pub fn create_object(&self, type_name: &str) -> Result<(ObjectRef, &ObjectSpec), Error> {
        if self.specs.is_empty() {
            return Err(Error::new(ErrorKind::EmptyRegistry {
                position: Default::default(),
            }));
        }

        match self.specs.get(type_name) {
            Some(spec) => Ok((spec.create(), spec)),
            None => Err(Error::new(ErrorKind::UnknownType {
                type_name: String::from(type_name),
                position: Default::default(),
            })),
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&ObjectSpec> {
        self.specs.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.specs.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Registered type names in no particular order
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.specs.clear();
    }
}
