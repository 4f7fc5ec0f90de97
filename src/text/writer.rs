use crate::{object_id, Error, ErrorKind, ObjectRef, Traversal, Value, Walker};
use log::debug;
use std::collections::HashMap;
use std::io::Write;
use std::ops::Deref;

/// Write object graphs in the object-literal format.
///
/// Instantiated via `TextWriterBuilder`. The low level methods can be used to
/// emit a document by hand while [`write_object`](TextWriter::write_object)
/// walks an object graph.
///
/// ```
/// use objlit::TextWriterBuilder;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut out: Vec<u8> = Vec::new();
/// let mut writer = TextWriterBuilder::new().from_writer(&mut out);
/// writer.write_object_start("Light", "sun")?;
/// writer.write_field("intensity")?;
/// writer.write_f64(0.5)?;
/// writer.write_field("direction")?;
/// writer.write_vector(&[0.0, -1.0, 0.0])?;
/// writer.write_end()?;
/// assert_eq!(
///     std::str::from_utf8(&out).unwrap(),
///     "Light \"sun\" {\n  intensity: 0.5\n  direction: [0.0, -1.0, 0.0]\n}\n"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TextWriter<W> {
    writer: W,
    scratch: String,
    depth: Vec<DepthMode>,
    state: WriteState,
    indent_char: u8,
    indent_factor: u8,
    write_defaults: bool,
    write_addresses: bool,
    ids: HashMap<usize, usize>,
}

/// Construct a customized text writer
///
/// ```
/// use objlit::TextWriterBuilder;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut out: Vec<u8> = Vec::new();
/// let mut writer = TextWriterBuilder::new()
///     .indent_char(b'\t')
///     .indent_factor(1)
///     .from_writer(&mut out);
/// writer.write_object_start("Foo", "")?;
/// writer.write_field("a")?;
/// writer.write_i64(1)?;
/// writer.write_end()?;
/// assert_eq!(std::str::from_utf8(&out).unwrap(), "Foo {\n\ta: 1\n}\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TextWriterBuilder {
    indent_char: u8,
    indent_factor: u8,
    write_defaults: bool,
    write_addresses: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepthMode {
    Object,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Document,
    FirstField,
    Field,
    Value,
    FirstElement,
    Element,
}

impl<W> TextWriter<W>
where
    W: Write,
{
    /// Get inner writer, keeping ownership
    pub fn inner(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes this Writer, returning the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Returns true if the next write event would be a field name
    pub fn expecting_field(&self) -> bool {
        self.state == WriteState::Field || self.state == WriteState::FirstField
    }

    /// Write out the start of an object: its type, its name when not empty,
    /// and the opening brace
    pub fn write_object_start(&mut self, type_name: &str, name: &str) -> Result<(), Error> {
        self.write_preamble()?;
        self.writer.write_all(type_name.as_bytes())?;
        if !name.is_empty() {
            self.writer.write_all(b" ")?;
            self.write_escaped(name)?;
        }
        self.writer.write_all(b" {")?;
        self.depth.push(DepthMode::Object);
        self.state = WriteState::FirstField;
        Ok(())
    }

    /// Write a `#` comment after an object's opening brace
    pub fn write_comment(&mut self, comment: &str) -> Result<(), Error> {
        if self.state != WriteState::FirstField {
            return Err(misuse("comments may only follow an opening brace"));
        }

        self.writer.write_all(b" # ")?;
        self.writer.write_all(comment.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.state = WriteState::Field;
        Ok(())
    }

    /// Write out the start of a list of objects
    pub fn write_list_start(&mut self) -> Result<(), Error> {
        self.write_preamble()?;
        self.writer.write_all(b"[")?;
        self.depth.push(DepthMode::List);
        self.state = WriteState::FirstElement;
        Ok(())
    }

    /// Write the end of an object or list
    pub fn write_end(&mut self) -> Result<(), Error> {
        let old_state = self.state;
        let mode = match self.depth.pop() {
            Some(mode) => mode,
            None => return Err(misuse("no object or list to end")),
        };

        match (mode, old_state) {
            (DepthMode::Object, WriteState::FirstField) => self.writer.write_all(b" }")?,
            (DepthMode::Object, WriteState::Field) => {
                self.write_indent()?;
                self.writer.write_all(b"}")?;
            }
            (DepthMode::List, WriteState::FirstElement) => self.writer.write_all(b"]")?,
            (DepthMode::List, WriteState::Element) => {
                self.writer.write_all(b"\n")?;
                self.write_indent()?;
                self.writer.write_all(b"]")?;
            }
            _ => return Err(misuse("field is missing its value")),
        }

        self.write_epilogue()
    }

    /// Write a field name. The next write is the field's value.
    pub fn write_field(&mut self, name: &str) -> Result<(), Error> {
        match self.state {
            WriteState::FirstField => {
                self.writer.write_all(b"\n")?;
                self.write_indent()?;
            }
            WriteState::Field => self.write_indent()?,
            _ => return Err(misuse("a field name is only valid inside an object")),
        }

        self.writer.write_all(name.as_bytes())?;
        self.writer.write_all(b": ")?;
        self.state = WriteState::Value;
        Ok(())
    }

    /// Write a boolean
    ///
    /// ```
    /// use objlit::TextWriterBuilder;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut out: Vec<u8> = Vec::new();
    /// let mut writer = TextWriterBuilder::new().from_writer(&mut out);
    /// writer.write_object_start("Foo", "")?;
    /// writer.write_field("visible")?;
    /// writer.write_bool(true)?;
    /// writer.write_end()?;
    /// assert_eq!(&out, b"Foo {\n  visible: true\n}\n");
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_bool(&mut self, data: bool) -> Result<(), Error> {
        self.write_scalar_preamble()?;
        match data {
            true => self.writer.write_all(b"true")?,
            false => self.writer.write_all(b"false")?,
        };

        self.write_scalar_epilogue()
    }

    /// Write a signed integer.
    pub fn write_i64(&mut self, data: i64) -> Result<(), Error> {
        self.write_scalar_preamble()?;

        #[cfg(feature = "faster_writer")]
        {
            let mut buffer = itoa::Buffer::new();
            self.writer.write_all(buffer.format(data).as_bytes())?;
        }

        #[cfg(not(feature = "faster_writer"))]
        write!(self.writer, "{}", data)?;

        self.write_scalar_epilogue()
    }

    /// Write an unsigned integer.
    pub fn write_u64(&mut self, data: u64) -> Result<(), Error> {
        self.write_scalar_preamble()?;

        #[cfg(feature = "faster_writer")]
        {
            let mut buffer = itoa::Buffer::new();
            self.writer.write_all(buffer.format(data).as_bytes())?;
        }

        #[cfg(not(feature = "faster_writer"))]
        write!(self.writer, "{}", data)?;

        self.write_scalar_epilogue()
    }

    /// Write a floating point number.
    ///
    /// The shortest representation that reads back to the same number is
    /// used, and it always contains a decimal point or exponent so that it is
    /// never mistaken for an integer.
    ///
    /// ```
    /// use objlit::TextWriterBuilder;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut out: Vec<u8> = Vec::new();
    /// let mut writer = TextWriterBuilder::new().from_writer(&mut out);
    /// writer.write_object_start("Foo", "")?;
    /// writer.write_field("x")?;
    /// writer.write_f64(3.0)?;
    /// writer.write_end()?;
    /// assert_eq!(&out, b"Foo {\n  x: 3.0\n}\n");
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_f64(&mut self, data: f64) -> Result<(), Error> {
        self.write_scalar_preamble()?;
        write!(self.writer, "{:?}", data)?;
        self.write_scalar_epilogue()
    }

    /// Write a string encapsulated in quotes.
    ///
    /// Quotes, backslashes, and line breaks are escaped.
    ///
    /// ```
    /// use objlit::TextWriterBuilder;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut out: Vec<u8> = Vec::new();
    /// let mut writer = TextWriterBuilder::new().from_writer(&mut out);
    /// writer.write_object_start("Foo", "")?;
    /// writer.write_field("name")?;
    /// writer.write_quoted(r#"captain "joe" rogers"#)?;
    /// writer.write_end()?;
    /// assert_eq!(&out, b"Foo {\n  name: \"captain \\\"joe\\\" rogers\"\n}\n");
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_quoted(&mut self, data: &str) -> Result<(), Error> {
        self.write_scalar_preamble()?;
        self.write_escaped(data)?;
        self.write_scalar_epilogue()
    }

    /// Write a bare identifier such as an enum variant.
    ///
    /// The contents are not checked, so it is up to the caller to ensure that
    /// the data is a valid identifier.
    pub fn write_ident(&mut self, data: &str) -> Result<(), Error> {
        self.write_scalar_preamble()?;
        self.writer.write_all(data.as_bytes())?;
        self.write_scalar_epilogue()
    }

    /// Write a list of numbers on a single line
    pub fn write_vector(&mut self, data: &[f64]) -> Result<(), Error> {
        self.write_scalar_preamble()?;
        self.writer.write_all(b"[")?;
        for (i, x) in data.iter().enumerate() {
            if i != 0 {
                self.writer.write_all(b", ")?;
            }
            write!(self.writer, "{:?}", x)?;
        }
        self.writer.write_all(b"]")?;
        self.write_scalar_epilogue()
    }

    /// Write an absent object reference
    pub fn write_null(&mut self) -> Result<(), Error> {
        self.write_ident("null")
    }

    /// Write an object and every object reachable from it.
    ///
    /// Fields that were never set are skipped unless the writer was built
    /// with [`with_defaults`](TextWriterBuilder::with_defaults). Objects
    /// shared by several fields are written at every reference.
    pub fn write_object(&mut self, object: &ObjectRef) -> Result<(), Error> {
        if self.write_addresses {
            self.assign_ids(object);
        }

        let mut ancestors = Vec::new();
        self.write_object_core(object, &mut ancestors)?;
        debug!("wrote {} object graph", object.borrow().type_name());
        Ok(())
    }

    /// Number objects in the order they are first reached
    fn assign_ids(&mut self, root: &ObjectRef) {
        let ids = &mut self.ids;
        ids.clear();
        Walker::new().unique(true).walk(root, &mut |obj: &ObjectRef| {
            let next = ids.len();
            ids.entry(object_id(obj)).or_insert(next);
            Traversal::Continue
        });
    }

    fn write_object_core(
        &mut self,
        object: &ObjectRef,
        ancestors: &mut Vec<usize>,
    ) -> Result<(), Error> {
        let id = object_id(object);
        let obj = object.borrow();
        if ancestors.contains(&id) {
            return Err(Error::new(ErrorKind::Cycle {
                type_name: String::from(obj.type_name()),
            }));
        }

        ancestors.push(id);
        self.write_object_start(obj.type_name(), obj.name())?;
        if self.write_addresses {
            if let Some(seq) = self.ids.get(&id).copied() {
                self.write_comment(&format!("@{}", seq))?;
            }
        }

        for (name, slot) in obj.fields() {
            if !self.write_defaults && !slot.was_set() {
                continue;
            }

            self.write_field(name)?;
            self.write_value(&slot.value(), ancestors)?;
        }

        self.write_end()?;
        ancestors.pop();
        Ok(())
    }

    fn write_value(&mut self, value: &Value, ancestors: &mut Vec<usize>) -> Result<(), Error> {
        match value {
            Value::Bool(x) => self.write_bool(*x),
            Value::Int(x) => self.write_i64(*x),
            Value::UInt(x) => self.write_u64(*x),
            Value::Float(x) => self.write_f64(*x),
            Value::Str(x) => self.write_quoted(x),
            Value::Enum(x) => self.write_ident(x),
            Value::Vector(x) => self.write_vector(x),
            Value::Object(None) => self.write_null(),
            Value::Object(Some(x)) => self.write_object_core(x, ancestors),
            Value::ObjectList(xs) => {
                self.write_list_start()?;
                for x in xs {
                    self.write_object_core(x, ancestors)?;
                }
                self.write_end()
            }
        }
    }

    fn write_escaped(&mut self, data: &str) -> Result<(), Error> {
        let esc_buf = std::mem::take(&mut self.scratch);
        let esc = escape(data, esc_buf);
        self.writer.write_all(b"\"")?;
        self.writer.write_all(esc.as_bytes())?;
        self.writer.write_all(b"\"")?;
        self.scratch = esc.buffer();
        Ok(())
    }

    fn write_preamble(&mut self) -> Result<(), Error> {
        match self.state {
            WriteState::Document | WriteState::Value => {}
            WriteState::FirstElement => {
                self.writer.write_all(b"\n")?;
                self.write_indent()?;
            }
            WriteState::Element => {
                self.writer.write_all(b",\n")?;
                self.write_indent()?;
            }
            WriteState::FirstField | WriteState::Field => {
                return Err(misuse("expected a field name"));
            }
        }

        Ok(())
    }

    fn write_scalar_preamble(&mut self) -> Result<(), Error> {
        if self.state != WriteState::Value {
            return Err(misuse("a value is only valid after a field name"));
        }

        Ok(())
    }

    fn write_scalar_epilogue(&mut self) -> Result<(), Error> {
        self.writer.write_all(b"\n")?;
        self.state = WriteState::Field;
        Ok(())
    }

    /// Advance the state after an object or list has been closed
    fn write_epilogue(&mut self) -> Result<(), Error> {
        match self.depth.last() {
            Some(DepthMode::Object) => {
                self.writer.write_all(b"\n")?;
                self.state = WriteState::Field;
            }
            Some(DepthMode::List) => self.state = WriteState::Element,
            None => {
                self.writer.write_all(b"\n")?;
                self.state = WriteState::Document;
            }
        }

        Ok(())
    }

    /// Write the indent characters
    fn write_indent(&mut self) -> Result<(), Error> {
        for _ in 0..self.depth.len() * usize::from(self.indent_factor) {
            self.writer.write_all(&[self.indent_char])?;
        }

        Ok(())
    }
}

#[inline]
fn misuse(msg: &'static str) -> Error {
    Error::new(ErrorKind::WriterState { msg })
}

impl TextWriterBuilder {
    /// Construct a new TextWriterBuilder with default values
    pub fn new() -> TextWriterBuilder {
        TextWriterBuilder::default()
    }

    /// The character to indent line.
    ///
    /// The default is a space.
    pub fn indent_char(&mut self, indent_char: u8) -> &mut TextWriterBuilder {
        self.indent_char = indent_char;
        self
    }

    /// The number of indents per increased depth
    ///
    /// The default is 2
    pub fn indent_factor(&mut self, indent_factor: u8) -> &mut TextWriterBuilder {
        self.indent_factor = indent_factor;
        self
    }

    /// Write every field, including those left at their default
    ///
    /// The default is false
    pub fn with_defaults(&mut self, write_defaults: bool) -> &mut TextWriterBuilder {
        self.write_defaults = write_defaults;
        self
    }

    /// Annotate each object with a `# @N` comment holding its identity within
    /// the written graph. Shared objects carry the same number at every
    /// reference.
    ///
    /// The default is false
    pub fn with_addresses(&mut self, write_addresses: bool) -> &mut TextWriterBuilder {
        self.write_addresses = write_addresses;
        self
    }

    /// Construct a text writer from a builder and a writer.
    pub fn from_writer<R>(&self, writer: R) -> TextWriter<R>
    where
        R: Write,
    {
        TextWriter {
            writer,
            scratch: String::new(),
            depth: Vec::with_capacity(16),
            state: WriteState::Document,
            indent_char: self.indent_char,
            indent_factor: self.indent_factor,
            write_defaults: self.write_defaults,
            write_addresses: self.write_addresses,
            ids: HashMap::new(),
        }
    }

    /// Write an object graph into a string
    pub fn to_string(&self, object: &ObjectRef) -> Result<String, Error> {
        let mut out = Vec::new();
        self.from_writer(&mut out).write_object(object)?;
        String::from_utf8(out).map_err(|e| Error::from(e.utf8_error()))
    }
}

impl Default for TextWriterBuilder {
    fn default() -> Self {
        TextWriterBuilder {
            indent_char: b' ',
            indent_factor: 2,
            write_defaults: false,
            write_addresses: false,
        }
    }
}

/// Write an object graph with the default options
pub fn to_writer<W: Write>(writer: W, object: &ObjectRef) -> Result<(), Error> {
    TextWriterBuilder::new().from_writer(writer).write_object(object)
}

/// Write an object graph into a string with the default options
pub fn to_string(object: &ObjectRef) -> Result<String, Error> {
    TextWriterBuilder::new().to_string(object)
}

/// A cow that let's us reuse allocations
enum ReuseString<'a> {
    Owned(String),
    Borrowed((&'a str, String)),
}

impl<'a> ReuseString<'a> {
    fn buffer(self) -> String {
        match self {
            ReuseString::Owned(x) => x,
            ReuseString::Borrowed((_, x)) => x,
        }
    }
}

impl<'a> Deref for ReuseString<'a> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        match self {
            ReuseString::Owned(x) => x.as_str(),
            ReuseString::Borrowed((a, _)) => a,
        }
    }
}

#[inline]
fn needs_escape(c: char) -> bool {
    matches!(c, '\\' | '"' | '\n' | '\t' | '\r')
}

#[inline]
fn escape(data: &str, mut buffer: String) -> ReuseString<'_> {
    let i = match data.find(needs_escape) {
        Some(i) => i,
        None => return ReuseString::Borrowed((data, buffer)),
    };

    buffer.clear();
    buffer.push_str(&data[..i]);
    for c in data[i..].chars() {
        match c {
            '\\' => buffer.push_str("\\\\"),
            '"' => buffer.push_str("\\\""),
            '\n' => buffer.push_str("\\n"),
            '\t' => buffer.push_str("\\t"),
            '\r' => buffer.push_str("\\r"),
            c => buffer.push(c),
        }
    }

    ReuseString::Owned(buffer)
}
