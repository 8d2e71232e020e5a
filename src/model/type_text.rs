//! Compact type notation used in descriptor files.
//!
//! ```text
//! type      := annotation* name type-args? ("[" "]")*
//! type-args := "<" argument ("," argument)* ">"
//! argument  := "?" (("extends" | "super") type)? | type
//! ```
//!
//! Primitive names (`int`, `boolean`, ...) become base types. Well-known
//! simple names such as `String`, `List` or `Optional` expand to their
//! platform classes. Any other name without a package is read as a type
//! variable. Leading annotations attach to the whole written type.

use super::annotation::AnnotationInfoModel;
use super::descriptor::{
    BaseType, TypeArgumentDescriptor, TypeDescriptor, TypeParameterDescriptor, Wildcard,
};
use super::error::DescriptorError;

const WELL_KNOWN: &[(&str, &str)] = &[
    ("Object", "java.lang.Object"),
    ("String", "java.lang.String"),
    ("CharSequence", "java.lang.CharSequence"),
    ("Character", "java.lang.Character"),
    ("Boolean", "java.lang.Boolean"),
    ("Byte", "java.lang.Byte"),
    ("Short", "java.lang.Short"),
    ("Integer", "java.lang.Integer"),
    ("Long", "java.lang.Long"),
    ("Float", "java.lang.Float"),
    ("Double", "java.lang.Double"),
    ("Number", "java.lang.Number"),
    ("Void", "java.lang.Void"),
    ("Iterable", "java.lang.Iterable"),
    ("Comparable", "java.lang.Comparable"),
    ("Collection", "java.util.Collection"),
    ("List", "java.util.List"),
    ("ArrayList", "java.util.ArrayList"),
    ("LinkedList", "java.util.LinkedList"),
    ("Set", "java.util.Set"),
    ("HashSet", "java.util.HashSet"),
    ("SortedSet", "java.util.SortedSet"),
    ("Map", "java.util.Map"),
    ("HashMap", "java.util.HashMap"),
    ("SortedMap", "java.util.SortedMap"),
    ("TreeMap", "java.util.TreeMap"),
    ("Optional", "java.util.Optional"),
    ("OptionalInt", "java.util.OptionalInt"),
    ("OptionalLong", "java.util.OptionalLong"),
    ("OptionalDouble", "java.util.OptionalDouble"),
    ("UUID", "java.util.UUID"),
    ("Date", "java.util.Date"),
    ("Instant", "java.time.Instant"),
    ("LocalDate", "java.time.LocalDate"),
    ("LocalTime", "java.time.LocalTime"),
    ("LocalDateTime", "java.time.LocalDateTime"),
    ("OffsetDateTime", "java.time.OffsetDateTime"),
    ("ZonedDateTime", "java.time.ZonedDateTime"),
    ("BigDecimal", "java.math.BigDecimal"),
    ("BigInteger", "java.math.BigInteger"),
];

/// Expands a well-known simple class name to its qualified name.
pub fn expand_well_known(name: &str) -> Option<&'static str> {
    WELL_KNOWN
        .iter()
        .find(|(simple, _)| *simple == name)
        .map(|(_, qualified)| *qualified)
}

pub fn parse_type(input: &str) -> Result<TypeDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(input);
    let ty = cursor.parse_type()?;
    cursor.finish()?;
    Ok(ty)
}

pub fn parse_type_argument(input: &str) -> Result<TypeArgumentDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(input);
    let argument = cursor.parse_argument()?;
    cursor.finish()?;
    Ok(argument)
}

pub fn parse_type_parameter(input: &str) -> Result<TypeParameterDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(input);
    let name = cursor
        .ident()
        .filter(|n| !n.contains('.'))
        .ok_or_else(|| cursor.error("expected a type parameter name"))?
        .to_string();
    let mut bounds = Vec::new();
    if cursor.keyword("extends") {
        bounds.push(cursor.parse_type()?);
        while cursor.eat('&') {
            bounds.push(cursor.parse_type()?);
        }
    }
    cursor.finish()?;
    Ok(TypeParameterDescriptor { name, bounds })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, message: &str) -> DescriptorError {
        DescriptorError::TypeSyntax {
            input: self.input.to_string(),
            message: format!("{message} at offset {}", self.pos),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            let valid = if i == 0 {
                c.is_alphabetic() || c == '_' || c == '$'
            } else {
                c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
            };
            if !valid {
                break;
            }
            end = i + c.len_utf8();
        }
        if end == 0 || rest[..end].ends_with('.') {
            None
        } else {
            Some(&rest[..end])
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let ident = self.peek_ident()?;
        self.pos += ident.len();
        Some(ident)
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        if self.peek_ident() == Some(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn finish(&mut self) -> Result<(), DescriptorError> {
        self.skip_ws();
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, DescriptorError> {
        let mut annotations = Vec::new();
        while self.eat('@') {
            let name = self
                .ident()
                .ok_or_else(|| self.error("expected an annotation name"))?;
            annotations.push(AnnotationInfoModel::new(name));
        }

        let name = self
            .ident()
            .ok_or_else(|| self.error("expected a type name"))?;

        let mut ty = if let Some(base) = BaseType::parse(name) {
            TypeDescriptor::Base {
                base,
                annotations: Vec::new(),
            }
        } else {
            let mut type_arguments = Vec::new();
            if self.eat('<') {
                loop {
                    type_arguments.push(self.parse_argument()?);
                    if self.eat(',') {
                        continue;
                    }
                    if self.eat('>') {
                        break;
                    }
                    return Err(self.error("expected `,` or `>`"));
                }
            }
            let qualified = if name.contains('.') {
                Some(name.to_string())
            } else {
                expand_well_known(name).map(str::to_string)
            };
            match qualified {
                Some(name) => TypeDescriptor::Class {
                    name,
                    type_arguments,
                    annotations: Vec::new(),
                },
                None if type_arguments.is_empty() => TypeDescriptor::TypeVariable {
                    name: name.to_string(),
                    annotations: Vec::new(),
                },
                None => {
                    return Err(self.error("type variables cannot take type arguments"));
                }
            }
        };

        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected `]`"));
            }
            ty = TypeDescriptor::Array {
                component: Box::new(ty),
                annotations: Vec::new(),
            };
        }

        *ty.annotations_mut() = annotations;
        Ok(ty)
    }

    fn parse_argument(&mut self) -> Result<TypeArgumentDescriptor, DescriptorError> {
        if self.eat('?') {
            if self.keyword("extends") {
                return Ok(TypeArgumentDescriptor {
                    wildcard: Wildcard::Extends,
                    bound: Some(self.parse_type()?),
                });
            }
            if self.keyword("super") {
                return Ok(TypeArgumentDescriptor {
                    wildcard: Wildcard::Super,
                    bound: Some(self.parse_type()?),
                });
            }
            return Ok(TypeArgumentDescriptor {
                wildcard: Wildcard::Any,
                bound: None,
            });
        }
        Ok(TypeArgumentDescriptor::exact(self.parse_type()?))
    }
}
