use crate::{FieldSlot, FinalizeError, Value};
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Shared handle to an object in a graph.
///
/// The same object may be referenced by several fields; it lives until the
/// last referencing field is dropped.
pub type ObjectRef = Rc<RefCell<dyn Object>>;

/// An entity that can be read from and written to the object-literal format.
///
/// Implementations list their fields in a declarative table, usually through
/// [`object_fields!`](crate::object_fields), and may override
/// [`finalize`](Object::finalize) to check invariants across fields.
pub trait Object: Any + fmt::Debug {
    /// The name the type is registered and written under
    fn type_name(&self) -> &'static str;

    /// The user assigned name, empty when not given
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Names of the declared fields in declaration order
    fn field_names(&self) -> &'static [&'static str];

    /// The field declared at `index`
    fn field(&self, index: usize) -> Option<&dyn FieldSlot>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn FieldSlot>;

    /// Invoked by the reader once this object's own fields are populated.
    /// Nested objects have been finalized already but must not be assumed
    /// to be valid beyond their own fields.
    fn finalize(&mut self) -> Result<(), FinalizeError> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn Object + 'a {
    /// Iterate over the declared fields as `(name, slot)` pairs
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &dyn FieldSlot)> + '_ {
        self.field_names()
            .iter()
            .enumerate()
            .filter_map(move |(i, name)| self.field(i).map(|slot| (*name, slot)))
    }

    /// Look up a field by its declared name
    pub fn field_by_name(&self, name: &str) -> Option<&dyn FieldSlot> {
        let index = self.field_names().iter().position(|x| *x == name)?;
        self.field(index)
    }

    pub fn field_by_name_mut(&mut self, name: &str) -> Option<&mut dyn FieldSlot> {
        let index = self.field_names().iter().position(|x| *x == name)?;
        self.field_mut(index)
    }

    /// The objects directly referenced by this object: object fields in
    /// declaration order, list fields in list order
    pub fn children(&self) -> Vec<ObjectRef> {
        let mut result = Vec::new();
        for (_, slot) in self.fields() {
            if slot.kind().is_object() {
                match slot.value() {
                    Value::Object(Some(x)) => result.push(x),
                    Value::ObjectList(xs) => result.extend(xs),
                    _ => {}
                }
            }
        }
        result
    }

    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: Object>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Wrap an object in a shared handle
pub fn new_object<T: Object>(object: T) -> ObjectRef {
    Rc::new(RefCell::new(object))
}

/// Borrow a shared object as its concrete type
///
/// ```
/// use objlit::{downcast, new_object, object_fields, Field, Object};
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
/// let obj = new_object(Sphere::default());
/// let sphere = downcast::<Sphere>(&obj).unwrap();
/// assert_eq!(*sphere.radius.get(), 0.0);
/// ```
pub fn downcast<T: Object>(object: &ObjectRef) -> Option<Ref<'_, T>> {
    Ref::filter_map(object.borrow(), |x| x.downcast_ref::<T>()).ok()
}

/// Mutably borrow a shared object as its concrete type
pub fn downcast_mut<T: Object>(object: &ObjectRef) -> Option<RefMut<'_, T>> {
    RefMut::filter_map(object.borrow_mut(), |x| x.downcast_mut::<T>()).ok()
}

/// Identity of a shared object, stable for as long as the object is alive
pub fn object_id(object: &ObjectRef) -> usize {
    Rc::as_ptr(object) as *const () as usize
}

/// Implements the field table of [`Object`] for a struct.
///
/// Expands to every required method except [`finalize`](Object::finalize),
/// which keeps its default unless written next to the macro invocation.
///
/// ```
/// use objlit::{object_fields, Field, FinalizeError, Object};
///
/// #[derive(Debug, Default)]
/// struct Camera {
///     label: String,
///     fov: Field<f64>,
///     near: Field<f64>,
///     far: Field<f64>,
/// }
///
/// impl Object for Camera {
///     object_fields!("Camera", name: label, fields: [fov, near, far]);
///
///     fn finalize(&mut self) -> Result<(), FinalizeError> {
///         if self.near.get() >= self.far.get() && self.far.was_set() {
///             return Err(FinalizeError::new("near plane must be closer than far plane"));
///         }
///         Ok(())
///     }
/// }
///
/// let camera = Camera::default();
/// assert_eq!(camera.field_names(), &["fov", "near", "far"]);
/// ```
#[macro_export]
macro_rules! object_fields {
    ($type_name:literal, name: $name:ident, fields: [$($field:ident),* $(,)?] $(,)?) => {
        fn type_name(&self) -> &'static str {
            $type_name
        }

        fn name(&self) -> &str {
            &self.$name
        }

        fn set_name(&mut self, name: ::std::string::String) {
            self.$name = name;
        }

        fn field_names(&self) -> &'static [&'static str] {
            &[$(stringify!($field)),*]
        }

        fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::FieldSlot> {
            let fields: &[&dyn $crate::FieldSlot] = &[$(&self.$field),*];
            fields.get(index).copied()
        }

        #[allow(unused_mut, unused_variables, unused_assignments)]
        fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn $crate::FieldSlot> {
            let mut i = 0usize;
            $(
                if i == index {
                    return ::std::option::Option::Some(&mut self.$field);
                }
                i += 1;
            )*
            ::std::option::Option::None
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;

    #[derive(Debug, Default)]
    struct Node {
        name: String,
        weight: Field<f64>,
        child: Field<Option<ObjectRef>>,
        items: Field<Vec<ObjectRef>>,
    }

    impl Object for Node {
        object_fields!("Node", name: name, fields: [weight, child, items]);
    }

    #[derive(Debug, Default)]
    struct Empty {
        name: String,
    }

    impl Object for Empty {
        object_fields!("Empty", name: name, fields: []);
    }

    #[test]
    fn field_table_follows_declaration_order() {
        let node = Node::default();
        let obj: &dyn Object = &node;
        let names: Vec<_> = obj.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["weight", "child", "items"]);
        assert!(obj.field(3).is_none());
        assert_eq!(
            obj.field_by_name("items").map(|x| x.kind()),
            Some(crate::ValueKind::ObjectList)
        );
    }

    #[test]
    fn field_mut_reaches_the_struct_field() {
        let mut node = Node::default();
        {
            let obj: &mut dyn Object = &mut node;
            obj.field_by_name_mut("weight")
                .unwrap()
                .assign(Value::Float(2.0))
                .unwrap();
        }
        assert_eq!(*node.weight.get(), 2.0);
        assert!(node.weight.was_set());
    }

    #[test]
    fn empty_field_table() {
        let mut empty = Empty::default();
        let obj: &mut dyn Object = &mut empty;
        assert!(obj.field_names().is_empty());
        assert!(obj.field_mut(0).is_none());
        obj.set_name(String::from("nothing"));
        assert_eq!(obj.name(), "nothing");
    }

    #[test]
    fn children_in_field_then_list_order() {
        let a = new_object(Empty::default());
        let b = new_object(Empty::default());
        let c = new_object(Empty::default());
        let mut node = Node::default();
        node.items.set(vec![b.clone(), c.clone()]);
        node.child.set(Some(a.clone()));

        let obj: &dyn Object = &node;
        let children = obj.children();
        assert_eq!(children.len(), 3);
        assert!(Rc::ptr_eq(&children[0], &a));
        assert!(Rc::ptr_eq(&children[1], &b));
        assert!(Rc::ptr_eq(&children[2], &c));
    }

    #[test]
    fn downcasting_shared_objects() {
        let obj = new_object(Node::default());
        assert!(downcast::<Empty>(&obj).is_none());
        downcast_mut::<Node>(&obj).unwrap().weight.set(4.0);
        assert_eq!(*downcast::<Node>(&obj).unwrap().weight.get(), 4.0);
        assert!(obj.borrow().is::<Node>());
    }

    #[test]
    fn object_ids_follow_identity() {
        let a = new_object(Empty::default());
        let b = a.clone();
        let c = new_object(Empty::default());
        assert_eq!(object_id(&a), object_id(&b));
        assert_ne!(object_id(&a), object_id(&c));
    }
}
