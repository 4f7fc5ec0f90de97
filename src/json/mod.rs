//! Renders object graphs as JSON
//!
//! Each object becomes a JSON object holding its type, its name (when it has
//! one), and its fields in declaration order. Nested objects and lists of
//! objects are rendered inline.
//!
//! ```
//! use objlit::{json::{self, JsonOptions}, object_fields, new_object, Field, Object};
//!
//! #[derive(Debug, Default)]
//! struct Foo {
//!     name: String,
//!     a: Field<i64>,
//!     b: Field<f64>,
//! }
//!
//! impl Object for Foo {
//!     object_fields!("Foo", name: name, fields: [a, b]);
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut foo = Foo::default();
//! foo.a.set(1);
//! let foo = new_object(foo);
//!
//! let options = JsonOptions::new().with_prettyprint(false).with_defaults(false);
//!
//! // These are the default options
//! assert_eq!(options, JsonOptions::default());
//!
//! let actual = json::to_json(&foo, options)?;
//! assert_eq!(actual, r#"{"type":"Foo","fields":{"a":1}}"#);
//!
//! let actual = json::to_json(&foo, options.with_defaults(true))?;
//! assert_eq!(actual, r#"{"type":"Foo","fields":{"a":1,"b":0.0}}"#);
//! # Ok(())
//! # }
//! ```

use crate::{object_id, Error, ErrorKind, Object, ObjectRef, Value};
use log::debug;
use serde::{
    ser::{Error as _, SerializeMap, SerializeSeq},
    Serialize, Serializer,
};
use std::cell::RefCell;

/// Customizes the JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Controls if the JSON should be pretty printed
    pretty: bool,

    /// Controls if fields that were never set are included
    defaults: bool,
}

impl JsonOptions {
    /// Creates the structure with default options
    pub fn new() -> Self {
        JsonOptions::default()
    }

    /// Sets if the JSON should be pretty printed or minified
    pub fn with_prettyprint(mut self, pretty: bool) -> JsonOptions {
        self.pretty = pretty;
        self
    }

    /// Sets if fields left at their default are included
    pub fn with_defaults(mut self, defaults: bool) -> JsonOptions {
        self.defaults = defaults;
        self
    }
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            defaults: false,
        }
    }
}

/// Output the JSON of an object graph to the given writer
pub fn to_json_writer<W>(writer: W, object: &ObjectRef, options: JsonOptions) -> Result<(), Error>
where
    W: std::io::Write,
{
    let ctx = JsonContext {
        options,
        ancestors: RefCell::new(Vec::new()),
        cycle: RefCell::new(None),
    };

    let ser = JsonObject { object, ctx: &ctx };
    let result = if options.pretty {
        serde_json::to_writer_pretty(writer, &ser)
    } else {
        serde_json::to_writer(writer, &ser)
    };

    match result {
        Ok(()) => {
            debug!("wrote {} graph as json", object.borrow().type_name());
            Ok(())
        }
        Err(e) => match ctx.cycle.into_inner() {
            Some(type_name) => Err(Error::new(ErrorKind::Cycle { type_name })),
            None => Err(Error::from(std::io::Error::from(e))),
        },
    }
}

/// Output the JSON of an object graph to a string
pub fn to_json(object: &ObjectRef, options: JsonOptions) -> Result<String, Error> {
    let mut out = Vec::new();
    to_json_writer(&mut out, object, options)?;
    String::from_utf8(out).map_err(|e| Error::from(e.utf8_error()))
}

struct JsonContext {
    options: JsonOptions,
    ancestors: RefCell<Vec<usize>>,
    cycle: RefCell<Option<String>>,
}

struct JsonObject<'a> {
    object: &'a ObjectRef,
    ctx: &'a JsonContext,
}

struct JsonFields<'a> {
    object: &'a dyn Object,
    ctx: &'a JsonContext,
}

struct JsonValue<'a> {
    value: &'a Value,
    ctx: &'a JsonContext,
}

impl<'a> Serialize for JsonObject<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let id = object_id(self.object);
        let obj = self.object.borrow();
        if self.ctx.ancestors.borrow().contains(&id) {
            let type_name = String::from(obj.type_name());
            *self.ctx.cycle.borrow_mut() = Some(type_name);
            return Err(S::Error::custom("object graph contains a cycle"));
        }

        self.ctx.ancestors.borrow_mut().push(id);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", obj.type_name())?;
        if !obj.name().is_empty() {
            map.serialize_entry("name", obj.name())?;
        }
        map.serialize_entry(
            "fields",
            &JsonFields {
                object: &*obj,
                ctx: self.ctx,
            },
        )?;
        self.ctx.ancestors.borrow_mut().pop();
        map.end()
    }
}

impl<'a> Serialize for JsonFields<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for (name, slot) in self.object.fields() {
            if !self.ctx.options.defaults && !slot.was_set() {
                continue;
            }

            let value = slot.value();
            map.serialize_entry(
                name,
                &JsonValue {
                    value: &value,
                    ctx: self.ctx,
                },
            )?;
        }
        map.end()
    }
}

impl<'a> Serialize for JsonValue<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value {
            Value::Bool(x) => serializer.serialize_bool(*x),
            Value::Int(x) => serializer.serialize_i64(*x),
            Value::UInt(x) => serializer.serialize_u64(*x),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(x) | Value::Enum(x) => serializer.serialize_str(x),
            Value::Vector(x) => x.serialize(serializer),
            Value::Object(None) => serializer.serialize_none(),
            Value::Object(Some(x)) => JsonObject {
                object: x,
                ctx: self.ctx,
            }
            .serialize(serializer),
            Value::ObjectList(xs) => {
                let mut seq = serializer.serialize_seq(Some(xs.len()))?;
                for x in xs {
                    seq.serialize_element(&JsonObject {
                        object: x,
                        ctx: self.ctx,
                    })?;
                }
                seq.end()
            }
        }
    }
}
