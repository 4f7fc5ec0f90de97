/*!

A typed object graph framework for human editable scene and configuration
files.

Concrete types declare their fields in a table. A [`Registry`] maps type names
to those declarations so that a [`Reader`] can build object graphs from text,
a [`TextWriter`] can write them back, and a [`Walker`] can visit them.

## Features

- ✔ Typed: every field has a declared kind and mismatches are reported with the
  offending line
- ✔ Shared: objects are reference counted and may be referenced by several
  fields
- ✔ Validated: objects check invariants across their fields once read
- ✔ Round trip: writing a graph and reading it back yields the same graph

## Quick Start

```rust
use objlit::{downcast, object_fields, Field, FinalizeError, Object, ObjectRef, Reader, Registry};

#[derive(Debug, Default)]
struct Light {
    name: String,
    intensity: Field<f64>,
    direction: Field<[f64; 3]>,
}

impl Object for Light {
    object_fields!("Light", name: name, fields: [intensity, direction]);

    fn finalize(&mut self) -> Result<(), FinalizeError> {
        if self.direction.get().iter().all(|x| *x == 0.0) {
            return Err(FinalizeError::new("direction must not be zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Scene {
    name: String,
    lights: Field<Vec<ObjectRef>>,
}

impl Object for Scene {
    object_fields!("Scene", name: name, fields: [lights]);
}

# fn main() -> Result<(), Box<dyn std::error::Error>> {
let mut registry = Registry::new();
registry.register_type::<Light>()?;
registry.register_type::<Scene>()?;

let data = r#"
    Scene "main" {
        ## key light
        lights: [
            Light "sun" { intensity: 1, direction: [0, -1, 0] },
        ]
    }
"#;

let scene = Reader::new(&registry).with_path("main.scene").read_str(data)?;
let lights = downcast::<Scene>(&scene).unwrap().lights.get().clone();
let sun = downcast::<Light>(&lights[0]).unwrap();
assert_eq!(*sun.intensity.get(), 1.0);

let err = Reader::new(&registry)
    .with_path("bad.scene")
    .read_str("Light { direction: [0, 0, 0] }")
    .unwrap_err();
assert_eq!(err.to_string(), "bad.scene:1: invalid Light: direction must not be zero");

let text = objlit::to_string(&scene)?;
assert!(text.starts_with("Scene \"main\" {\n  lights: [\n    Light \"sun\" {\n"));
# Ok(())
# }
```

## Text Format

```plain
Type "optional name" {
  flag: true
  count: -3
  ratio: 0.5
  label: "quoted \"text\""
  mode: identifier
  position: [1, 2, 3]
  child: Other { }
  nothing: null
  children: [ Other { }, Other { } ]
}
```

Fields may be separated by commas, and `#` starts a comment that runs to the
end of the line.

## JSON

With the `json` feature enabled, graphs can be rendered as JSON through the
[`json`] module.

*/

mod errors;
mod field;
mod object;
mod registry;
mod spec;
mod text;
mod value;
mod visitor;

#[cfg(feature = "json")]
pub mod json;

pub use self::errors::*;
pub use self::field::*;
pub use self::object::*;
pub use self::registry::Registry;
pub use self::spec::*;
pub use self::text::*;
pub use self::value::*;
pub use self::visitor::*;
