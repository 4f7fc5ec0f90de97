use super::lexer::{LexError, LexErrorKind, Lexer, Token};
use crate::{
    Error, ErrorKind, FieldSpec, ObjectRef, ObjectSpec, Position, Registry, Value, ValueKind,
};
use log::{debug, trace};
use std::io::Read;
use std::path::Path;

/// Builds object graphs from the object-literal text format.
///
/// ```
/// use objlit::{downcast, object_fields, Field, Object, Reader, Registry};
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
///
/// let obj = Reader::new(&registry).read_str(r#"Sphere "ball" { radius: 2 }"#)?;
/// let sphere = downcast::<Sphere>(&obj).unwrap();
/// assert_eq!(sphere.name, "ball");
/// assert_eq!(*sphere.radius.get(), 2.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'r> {
    registry: &'r Registry,
    path: String,
}

impl<'r> Reader<'r> {
    /// Create a reader that instantiates types from the given registry
    pub fn new(registry: &'r Registry) -> Self {
        Reader {
            registry,
            path: String::new(),
        }
    }

    /// Set the path reported in diagnostics. The path is never opened.
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().display().to_string();
        self
    }

    /// The path reported in diagnostics
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read a document consisting of exactly one top level object
    pub fn read_str(&self, data: &str) -> Result<ObjectRef, Error> {
        let mut state = self.state(data);
        let obj = state.parse_top_level()?.ok_or_else(|| state.eof("an object"))?;
        match state.next()? {
            None => {
                debug!("read {} from {}", obj.borrow().type_name(), state.describe_path());
                Ok(obj)
            }
            Some(token) => Err(state.syntax(format!(
                "expected end of file after top level object, found {}",
                token
            ))),
        }
    }

    /// Read a document consisting of exactly one top level object
    pub fn read_slice(&self, data: &[u8]) -> Result<ObjectRef, Error> {
        self.read_str(std::str::from_utf8(data)?)
    }

    /// Read a document consisting of exactly one top level object from a stream
    pub fn read<R: Read>(&self, mut reader: R) -> Result<ObjectRef, Error> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.read_slice(&data)
    }

    /// Read every top level object of a document in order
    pub fn read_all_str(&self, data: &str) -> Result<Vec<ObjectRef>, Error> {
        let mut state = self.state(data);
        let mut result = Vec::new();
        while let Some(obj) = state.parse_top_level()? {
            result.push(obj);
        }

        debug!(
            "read {} top level objects from {}",
            result.len(),
            state.describe_path()
        );
        Ok(result)
    }

    fn state<'a>(&self, data: &'a str) -> ParserState<'a, 'r, '_> {
        ParserState {
            lexer: Lexer::new(data),
            registry: self.registry,
            path: &self.path,
        }
    }
}

struct ParserState<'a, 'r, 'p> {
    lexer: Lexer<'a>,
    registry: &'r Registry,
    path: &'p str,
}

impl<'a, 'r, 'p> ParserState<'a, 'r, 'p> {
    fn describe_path(&self) -> &str {
        if self.path.is_empty() {
            "<input>"
        } else {
            self.path
        }
    }

    fn position(&self) -> Position {
        self.position_at(self.lexer.line())
    }

    fn position_at(&self, line: usize) -> Position {
        Position {
            path: String::from(self.path),
            line,
        }
    }

    fn eof(&self, expected: &'static str) -> Error {
        Error::new(ErrorKind::Eof {
            expected,
            position: self.position(),
        })
    }

    fn syntax(&self, msg: String) -> Error {
        Error::new(ErrorKind::InvalidSyntax {
            msg,
            position: self.position(),
        })
    }

    fn mismatch(&self, field: &FieldSpec, got: ValueKind, line: usize) -> Error {
        Error::new(ErrorKind::TypeMismatch {
            field: String::from(field.name()),
            expected: field.kind(),
            got,
            position: self.position_at(line),
        })
    }

    fn invalid(&self, field: &FieldSpec, error: crate::ValueError, line: usize) -> Error {
        Error::new(ErrorKind::InvalidValue {
            field: String::from(field.name()),
            error,
            position: self.position_at(line),
        })
    }

    #[inline]
    fn next(&mut self) -> Result<Option<Token<'a>>, Error> {
        let path = self.path;
        self.lexer.next_token().map_err(|e| lex_error(path, e))
    }

    #[inline]
    fn peek(&mut self) -> Result<Option<&Token<'a>>, Error> {
        let path = self.path;
        self.lexer.peek().map_err(|e| lex_error(path, e))
    }

    /// Consume the next token, failing on end of input
    #[inline]
    fn expect_token(&mut self, expected: &'static str) -> Result<Token<'a>, Error> {
        self.next()?.ok_or_else(|| self.eof(expected))
    }

    fn parse_top_level(&mut self) -> Result<Option<ObjectRef>, Error> {
        match self.next()? {
            None => Ok(None),
            Some(Token::Ident(type_name)) => self.parse_object(type_name).map(Some),
            Some(token) => Err(self.syntax(format!("expected type name, found {}", token))),
        }
    }

    /// Parse the remainder of an object literal whose type name was just consumed
    fn parse_object(&mut self, type_name: &str) -> Result<ObjectRef, Error> {
        let line = self.lexer.line();
        let registry = self.registry;
        let (obj, spec) = registry
            .create_object(type_name)
            .map_err(|e| e.at(self.position_at(line)))?;
        trace!("line {}: instantiated {}", line, type_name);

        match self.expect_token("`{`")? {
            Token::Quoted(name) => {
                obj.borrow_mut().set_name(name.into_owned());
                match self.expect_token("`{`")? {
                    Token::Open => {}
                    token => return Err(self.syntax(format!("expected `{{`, found {}", token))),
                }
            }
            Token::Open => {}
            token => {
                return Err(self.syntax(format!(
                    "expected object name or `{{` after {}, found {}",
                    type_name, token
                )))
            }
        }

        loop {
            match self.expect_token("`}`")? {
                Token::Close => break,
                Token::Comma => continue,
                Token::Ident(field) => self.parse_field(&obj, spec, field)?,
                token => {
                    return Err(
                        self.syntax(format!("expected field name or `}}`, found {}", token))
                    )
                }
            }
        }

        let result = obj.borrow_mut().finalize();
        if let Err(error) = result {
            return Err(Error::new(ErrorKind::Finalize {
                type_name: String::from(type_name),
                error,
                position: self.position(),
            }));
        }

        Ok(obj)
    }

    fn parse_field(&mut self, obj: &ObjectRef, spec: &ObjectSpec, field: &str) -> Result<(), Error> {
        let line = self.lexer.line();
        let (index, field_spec) = match spec.field(field) {
            Some(x) => x,
            None => {
                return Err(Error::new(ErrorKind::UnknownField {
                    type_name: String::from(spec.type_name()),
                    field: String::from(field),
                    position: self.position_at(line),
                }))
            }
        };

        match self.expect_token("`:`")? {
            Token::Colon => {}
            token => {
                return Err(self.syntax(format!(
                    "expected `:` after field `{}`, found {}",
                    field, token
                )))
            }
        }

        let value = self.parse_value(field_spec)?;
        let mut obj = obj.borrow_mut();
        let slot = obj.field_mut(index).ok_or_else(|| {
            Error::new(ErrorKind::UnknownField {
                type_name: String::from(spec.type_name()),
                field: String::from(field),
                position: self.position_at(line),
            })
        })?;

        slot.assign(value)
            .map_err(|e| self.invalid(field_spec, e, line))
    }

    fn parse_value(&mut self, field: &FieldSpec) -> Result<Value, Error> {
        let token = self.expect_token("a value")?;
        let line = self.lexer.line();
        let expected = field.kind();
        match token {
            Token::Ident("true") | Token::Ident("false") => match expected {
                ValueKind::Bool => Ok(Value::Bool(token == Token::Ident("true"))),
                _ => Err(self.mismatch(field, ValueKind::Bool, line)),
            },
            Token::Ident("null") => match expected {
                ValueKind::Object => Ok(Value::Object(None)),
                _ => Err(self.mismatch(field, ValueKind::Object, line)),
            },
            Token::Ident(ident) => {
                let is_object = matches!(self.peek()?, Some(Token::Open) | Some(Token::Quoted(_)));
                if is_object {
                    match expected {
                        ValueKind::Object => Ok(Value::Object(Some(self.parse_object(ident)?))),
                        _ => Err(self.mismatch(field, ValueKind::Object, line)),
                    }
                } else {
                    match expected {
                        ValueKind::Enum => Ok(Value::Enum(String::from(ident))),
                        ValueKind::Float if is_float_keyword(ident) => {
                            Ok(Value::Float(self.parse_f64(field, ident, line)?))
                        }
                        _ => Err(self.mismatch(field, ValueKind::Enum, line)),
                    }
                }
            }
            Token::Integer(text) => match expected {
                ValueKind::Int => text
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| self.overflow(field, text, line)),
                ValueKind::UInt if text.starts_with('-') => {
                    Err(self.mismatch(field, ValueKind::Int, line))
                }
                ValueKind::UInt => text
                    .parse::<u64>()
                    .map(Value::UInt)
                    .map_err(|_| self.overflow(field, text, line)),
                ValueKind::Float => Ok(Value::Float(self.parse_f64(field, text, line)?)),
                _ => Err(self.mismatch(field, ValueKind::Int, line)),
            },
            Token::Float(text) => match expected {
                ValueKind::Float => Ok(Value::Float(self.parse_f64(field, text, line)?)),
                _ => Err(self.mismatch(field, ValueKind::Float, line)),
            },
            Token::Quoted(text) => match expected {
                ValueKind::Str => Ok(Value::Str(text.into_owned())),
                _ => Err(self.mismatch(field, ValueKind::Str, line)),
            },
            Token::ListOpen => self.parse_list(field, line),
            token => Err(self.syntax(format!(
                "expected a value for field `{}`, found {}",
                field.name(),
                token
            ))),
        }
    }

    fn overflow(&self, field: &FieldSpec, text: &str, line: usize) -> Error {
        self.invalid(field, crate::ValueError::Overflow(String::from(text)), line)
    }

    fn parse_f64(&self, field: &FieldSpec, text: &str, line: usize) -> Result<f64, Error> {
        text.parse::<f64>().map_err(|_| {
            let msg = format!("invalid number for field `{}`: {}", field.name(), text);
            self.syntax_at(msg, line)
        })
    }

    fn syntax_at(&self, msg: String, line: usize) -> Error {
        Error::new(ErrorKind::InvalidSyntax {
            msg,
            position: self.position_at(line),
        })
    }

    /// Parse the remainder of a list whose `[` was just consumed
    fn parse_list(&mut self, field: &FieldSpec, line: usize) -> Result<Value, Error> {
        let got = match self.peek()? {
            None => return Err(self.eof("`]`")),
            Some(Token::ListClose) => field.kind(),
            Some(Token::Integer(_)) | Some(Token::Float(_)) => ValueKind::Vector,
            Some(Token::Ident(x)) if is_float_keyword(x) => ValueKind::Vector,
            Some(_) => ValueKind::ObjectList,
        };

        match (field.kind(), got) {
            (ValueKind::ObjectList, ValueKind::ObjectList) => {
                let mut objects = Vec::new();
                self.parse_list_elements(|state| match state.expect_token("`]`")? {
                    Token::Ident(type_name) => {
                        objects.push(state.parse_object(type_name)?);
                        Ok(())
                    }
                    token => Err(state.syntax(format!("expected object, found {}", token))),
                })?;
                Ok(Value::ObjectList(objects))
            }
            (ValueKind::Vector, ValueKind::Vector) => {
                let mut components = Vec::new();
                self.parse_list_elements(|state| match state.expect_token("`]`")? {
                    Token::Ident(text) if !is_float_keyword(text) => {
                        Err(state.syntax(format!("expected number, found {}", text)))
                    }
                    Token::Integer(text) | Token::Float(text) | Token::Ident(text) => {
                        let line = state.lexer.line();
                        components.push(state.parse_f64(field, text, line)?);
                        Ok(())
                    }
                    token => Err(state.syntax(format!("expected number, found {}", token))),
                })?;
                Ok(Value::Vector(components))
            }
            (_, ValueKind::ObjectList) | (_, ValueKind::Vector) => {
                Err(self.mismatch(field, got, line))
            }
            _ => {
                // an empty list for a field that is not a list
                Err(self.mismatch(field, ValueKind::ObjectList, line))
            }
        }
    }

    /// Drive a comma separated list up to and including its `]`. A trailing
    /// comma is accepted.
    fn parse_list_elements<F>(&mut self, mut element: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> Result<(), Error>,
    {
        loop {
            match self.peek()? {
                None => return Err(self.eof("`]`")),
                Some(Token::ListClose) => {
                    self.next()?;
                    return Ok(());
                }
                Some(_) => element(self)?,
            }

            match self.expect_token("`]`")? {
                Token::Comma => {}
                Token::ListClose => return Ok(()),
                token => return Err(self.syntax(format!("expected `,` or `]`, found {}", token))),
            }
        }
    }
}

fn lex_error(path: &str, err: LexError) -> Error {
    let position = Position {
        path: String::from(path),
        line: err.line,
    };

    match err.kind {
        LexErrorKind::UnterminatedString => Error::new(ErrorKind::Eof {
            expected: "closing quote",
            position,
        }),
        kind => Error::new(ErrorKind::InvalidSyntax {
            msg: kind.to_string(),
            position,
        }),
    }
}

fn is_float_keyword(ident: &str) -> bool {
    matches!(ident, "inf" | "infinity" | "NaN" | "nan")
}
