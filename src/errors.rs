use crate::ValueKind;
use std::fmt;

/// Location of a diagnostic within the text being read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    /// Path supplied by the caller, only used for diagnostics
    pub path: String,

    /// 1-based line number
    pub line: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "line {}", self.line)
        } else {
            write!(f, "{}:{}", self.path, self.line)
        }
    }
}

/// An error that can occur when reading, writing, or registering objects
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume the error and return the specific type of error
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns where in the input the error occurred (if available)
    pub fn position(&self) -> Option<&Position> {
        self.0.position()
    }

    /// Returns the line that the error occurred on (if available)
    pub fn line(&self) -> Option<usize> {
        self.position().map(|x| x.line)
    }

    /// Relocate a positioned error. Errors without a position are unchanged.
    pub(crate) fn at(mut self, at: Position) -> Error {
        if let Some(position) = self.0.position_mut() {
            *position = at;
        }
        self
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// An object literal named a type that was never registered
    UnknownType {
        type_name: String,
        position: Position,
    },

    /// An object literal assigned a field its type does not declare
    UnknownField {
        type_name: String,
        field: String,
        position: Position,
    },

    /// The literal assigned to a field is not of the declared kind
    TypeMismatch {
        field: String,
        expected: ValueKind,
        got: ValueKind,
        position: Position,
    },

    /// The literal had the right kind but could not be stored in the field
    InvalidValue {
        field: String,
        error: ValueError,
        position: Position,
    },

    /// Unexpected end of input
    Eof {
        expected: &'static str,
        position: Position,
    },

    /// A token that the grammar does not allow at this point
    InvalidSyntax { msg: String, position: Position },

    /// An object's finalization hook rejected its fields
    Finalize {
        type_name: String,
        error: FinalizeError,
        position: Position,
    },

    /// A type name was registered twice
    DuplicateType { type_name: String },

    /// A type declared the same field name twice
    DuplicateField { type_name: String, field: String },

    /// An object was requested before any type was registered
    EmptyRegistry { position: Position },

    /// A type, field, or enum variant name that cannot be written as a bare
    /// identifier
    InvalidName { type_name: String, name: String },

    /// The object graph refers back to one of its ancestors
    Cycle { type_name: String },

    /// Text writer methods were called out of order
    WriterState { msg: &'static str },

    /// The input is not valid UTF-8
    Utf8(std::str::Utf8Error),

    /// An error occurred when performing IO.
    Io(std::io::Error),
}

impl ErrorKind {
    /// Returns where in the input the error occurred (if available)
    pub fn position(&self) -> Option<&Position> {
        match self {
            ErrorKind::UnknownType { position, .. } => Some(position),
            ErrorKind::UnknownField { position, .. } => Some(position),
            ErrorKind::TypeMismatch { position, .. } => Some(position),
            ErrorKind::InvalidValue { position, .. } => Some(position),
            ErrorKind::Eof { position, .. } => Some(position),
            ErrorKind::InvalidSyntax { position, .. } => Some(position),
            ErrorKind::Finalize { position, .. } => Some(position),
            ErrorKind::EmptyRegistry { position } => Some(position),
            _ => None,
        }
    }

    fn position_mut(&mut self) -> Option<&mut Position> {
        match self {
            ErrorKind::UnknownType { position, .. } => Some(position),
            ErrorKind::UnknownField { position, .. } => Some(position),
            ErrorKind::TypeMismatch { position, .. } => Some(position),
            ErrorKind::InvalidValue { position, .. } => Some(position),
            ErrorKind::Eof { position, .. } => Some(position),
            ErrorKind::InvalidSyntax { position, .. } => Some(position),
            ErrorKind::Finalize { position, .. } => Some(position),
            ErrorKind::EmptyRegistry { position } => Some(position),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::InvalidValue { ref error, .. } => Some(error),
            ErrorKind::Finalize { ref error, .. } => Some(error),
            ErrorKind::Utf8(ref err) => Some(err),
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::UnknownType {
                ref type_name,
                ref position,
            } => write!(f, "{}: unknown type: {}", position, type_name),
            ErrorKind::UnknownField {
                ref type_name,
                ref field,
                ref position,
            } => write!(
                f,
                "{}: unknown field `{}` for type {}",
                position, field, type_name
            ),
            ErrorKind::TypeMismatch {
                ref field,
                expected,
                got,
                ref position,
            } => write!(
                f,
                "{}: field `{}` expected {} but got {}",
                position, field, expected, got
            ),
            ErrorKind::InvalidValue {
                ref field,
                ref error,
                ref position,
            } => write!(
                f,
                "{}: invalid value for field `{}`: {}",
                position, field, error
            ),
            ErrorKind::Eof {
                expected,
                ref position,
            } => write!(
                f,
                "{}: unexpected end of file, expected {}",
                position, expected
            ),
            ErrorKind::InvalidSyntax {
                ref msg,
                ref position,
            } => write!(f, "{}: invalid syntax: {}", position, msg),
            ErrorKind::Finalize {
                ref type_name,
                ref error,
                ref position,
            } => write!(f, "{}: invalid {}: {}", position, type_name, error),
            ErrorKind::DuplicateType { ref type_name } => {
                write!(f, "type already registered: {}", type_name)
            }
            ErrorKind::DuplicateField {
                ref type_name,
                ref field,
            } => write!(f, "type {} declares field `{}` twice", type_name, field),
            ErrorKind::EmptyRegistry { ref position } => {
                if position.line != 0 {
                    write!(f, "{}: ", position)?;
                }
                write!(f, "no object types registered, populate the registry first")
            }
            ErrorKind::InvalidName {
                ref type_name,
                ref name,
            } => write!(
                f,
                "type {} declares `{}`, which is not a valid identifier",
                type_name, name
            ),
            ErrorKind::Cycle { ref type_name } => write!(
                f,
                "object graph contains a cycle through an object of type {}",
                type_name
            ),
            ErrorKind::WriterState { msg } => write!(f, "invalid writer state: {}", msg),
            ErrorKind::Utf8(ref e) => write!(f, "input is not valid utf-8: {}", e),
            ErrorKind::Io(ref e) => write!(f, "io error: {}", e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(error: std::str::Utf8Error) -> Self {
        Error::new(ErrorKind::Utf8(error))
    }
}

/// An error that can occur when assigning a value to a typed field
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    /// The value is not of the field's kind
    Kind { expected: ValueKind, got: ValueKind },

    /// The number does not fit in the field's native type
    Overflow(String),

    /// The identifier is not one of the enumeration's variants
    UnknownVariant {
        variant: String,
        expected: &'static [&'static str],
    },

    /// The vector has the wrong number of components
    Length { expected: usize, got: usize },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueError::Kind { expected, got } => write!(f, "expected {} but got {}", expected, got),
            ValueError::Overflow(x) => write!(f, "caused an overflow: {}", x),
            ValueError::UnknownVariant { variant, expected } => write!(
                f,
                "unknown variant `{}`, expected one of: {}",
                variant,
                expected.join(", ")
            ),
            ValueError::Length { expected, got } => write!(
                f,
                "expected {} components but got {}",
                expected, got
            ),
        }
    }
}

impl std::error::Error for ValueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// An error raised by an object's finalization hook when its fields violate an
/// invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeError {
    msg: String,
}

impl FinalizeError {
    /// Create a finalization error with the given description
    pub fn new<T: Into<String>>(msg: T) -> Self {
        FinalizeError { msg: msg.into() }
    }

    /// The description of the violated invariant
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for FinalizeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl std::error::Error for FinalizeError {}
