//! value expressions
//!
//! The expression model contains the following node kinds
//! - string literal (rendered quoted and escaped: `'text'`)
//! - integer literal
//! - boolean literal (`true`/`false`)
//! - variable reference (a parameter, resource or other symbol: `location`)
//! - function call (`name(arg0,arg1)`, no whitespace between arguments)
//! - property access (`base.member`; chains are nested property accesses)
//! - interpolated string (`'lit${expr}lit'`)
//!
//! Rendering is purely structural: a node only looks at itself and its own children.
use crate::error::ExpressionError;
use std::fmt::{Display, Formatter, Write};

/// All possible value expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    Variable(String),
    FunctionCall { name: String, args: Vec<Value> },
    PropertyAccess { base: Box<Value>, member: String },
    Interpolated(Template),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Value::Variable(name.into())
    }

    pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Value::FunctionCall {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Access `member` on this value
    ///
    /// `Value::variable("acct").member("properties").member("endpoint")` renders as `acct.properties.endpoint`
    pub fn member(self, member: impl Into<String>) -> Self {
        Value::PropertyAccess {
            base: Box::new(self),
            member: member.into(),
        }
    }

    /// Appends an argument to a function call
    ///
    /// Any other value is returned unchanged.
    pub fn with_argument(mut self, argument: Value) -> Self {
        if let Value::FunctionCall { args, .. } = &mut self {
            args.push(argument);
        }
        self
    }

    /// Parses a dotted path (`a.b.c`) into a property access chain
    ///
    /// The first segment becomes a variable reference. A first segment ending in `()` becomes an argument-less
    /// function call, so `resourceGroup().location` is accepted as well.
    pub fn path(path: &str) -> Result<Self, ExpressionError> {
        if path.trim().is_empty() {
            return Err(ExpressionError::EmptyPath);
        }

        let invalid = |segment: &str| ExpressionError::InvalidPathSegment {
            path: path.to_string(),
            segment: segment.to_string(),
        };

        let mut segments = path.split('.');
        let first = segments.next().ok_or(ExpressionError::EmptyPath)?;
        let mut value = match first.strip_suffix("()") {
            Some(function) if is_identifier(function) => Value::call(function, []),
            _ if is_identifier(first) => Value::variable(first),
            _ => return Err(invalid(first)),
        };

        for segment in segments {
            if !is_identifier(segment) {
                return Err(invalid(segment));
            }
            value = value.member(segment);
        }

        Ok(value)
    }

    /// The plain text behind a literal, or the rendered expression otherwise
    ///
    /// Used where a value has to seed a deterministic identifier.
    pub fn seed(&self) -> String {
        match self {
            Value::String(value) => value.clone(),
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(value) => write_string_literal(f, value),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Variable(name) => f.write_str(name),
            Value::FunctionCall { name, args } => {
                f.write_str(name)?;
                f.write_char('(')?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_char(')')
            }
            Value::PropertyAccess { base, member } => write!(f, "{base}.{member}"),
            Value::Interpolated(template) => Display::fmt(template, f),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<Template> for Value {
    fn from(value: Template) -> Self {
        Value::Interpolated(value)
    }
}

/// A well-formed interpolated string
///
/// Always holds exactly one more literal segment than expression segments. Build it with [InterpolatedString].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    literals: Vec<String>,
    expressions: Vec<Value>,
}

impl Template {
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn expressions(&self) -> &[Value] {
        &self.expressions
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('\'')?;
        write_escaped(f, &self.literals[0])?;
        for (expression, literal) in self.expressions.iter().zip(&self.literals[1..]) {
            write!(f, "${{{expression}}}")?;
            write_escaped(f, literal)?;
        }
        f.write_char('\'')
    }
}

/// Builder for interpolated strings
///
/// Literal and expression segments are collected separately and alternate on render, starting with a literal:
/// `literal[0] ${expression[0]} literal[1] ${expression[1]} ... literal[n]`.
///
/// ```
/// # use bicepgen::value::{InterpolatedString, Value};
/// let value = InterpolatedString::new()
///     .literal("Hello")
///     .expression(Value::call("world", []))
///     .build()
///     .unwrap();
/// assert_eq!(value.to_string(), "'Hello${world()}'");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterpolatedString {
    literals: Vec<String>,
    expressions: Vec<Value>,
}

impl InterpolatedString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, literal: impl Into<String>) -> Self {
        self.literals.push(literal.into());
        self
    }

    pub fn expression(mut self, expression: Value) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Builds the value, repairing or collapsing degenerate segment counts
    ///
    /// - no expressions: a plain string literal of all literals concatenated
    /// - no literals: the first expression on its own
    /// - as many literals as expressions: an empty trailing literal is appended
    /// - one more literal than expressions: an interpolated string
    ///
    /// Every other combination is an [ExpressionError::SegmentMismatch].
    pub fn build(self) -> Result<Value, ExpressionError> {
        let Self {
            mut literals,
            mut expressions,
        } = self;

        if expressions.is_empty() {
            return Ok(Value::String(literals.concat()));
        }

        if literals.is_empty() {
            if expressions.len() > 1 {
                tracing::debug!(
                    dropped = expressions.len() - 1,
                    "interpolated string without literals collapsed to its first expression"
                );
            }
            return Ok(expressions.swap_remove(0));
        }

        if literals.len() == expressions.len() {
            literals.push(String::new());
        }

        if literals.len() != expressions.len() + 1 {
            return Err(ExpressionError::SegmentMismatch {
                literals: literals.len(),
                expressions: expressions.len(),
            });
        }

        Ok(Value::Interpolated(Template {
            literals,
            expressions,
        }))
    }
}

/// Quotes and escapes `value` as a string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    // writing into a String does not fail
    let _ = write_string_literal(&mut out, value);
    out
}

fn write_string_literal(out: &mut impl Write, value: &str) -> std::fmt::Result {
    out.write_char('\'')?;
    write_escaped(out, value)?;
    out.write_char('\'')
}

fn write_escaped(out: &mut impl Write, value: &str) -> std::fmt::Result {
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '\'' => out.write_str("\\'")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '$' if chars.peek() == Some(&'{') => out.write_str("\\$")?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn literals() {
        assert_eq!(Value::string("test").to_string(), "'test'");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::variable("location").to_string(), "location");
    }

    #[test]
    fn escaping() {
        assert_eq!(
            Value::string("it's a \\ test").to_string(),
            r"'it\'s a \\ test'"
        );
        assert_eq!(Value::string("a\nb\tc").to_string(), r"'a\nb\tc'");
        assert_eq!(Value::string("${notAnExpr}").to_string(), r"'\${notAnExpr}'");
        assert_eq!(Value::string("cost: $5").to_string(), "'cost: $5'");
    }

    #[test]
    fn function_calls_have_no_spaces() {
        let call = Value::call("test", [Value::string("test1")]);
        assert_eq!(call.to_string(), "test('test1')");

        let nested = Value::call(
            "test",
            [
                Value::call("test1", [Value::string("test2"), Value::variable("test3")]),
                Value::string("test4"),
            ],
        );
        assert_eq!(nested.to_string(), "test(test1('test2',test3),'test4')");

        let appended = Value::call("resourceId", [Value::string("type")]).with_argument(Value::Integer(42));
        assert_eq!(appended.to_string(), "resourceId('type',42)");
    }

    #[test]
    fn property_access_chains() {
        let access = Value::variable("test").member("test1");
        assert_eq!(access.to_string(), "test.test1");

        let chain = Value::call("resourceGroup", []).member("properties").member("id");
        assert_eq!(chain.to_string(), "resourceGroup().properties.id");
    }

    #[test]
    fn path_parsing() {
        assert_eq!(
            Value::path("acct.properties.endpoint").unwrap(),
            Value::variable("acct").member("properties").member("endpoint")
        );
        assert_eq!(
            Value::path("resourceGroup().location").unwrap().to_string(),
            "resourceGroup().location"
        );
        assert_eq!(Value::path("single").unwrap(), Value::variable("single"));
        assert_eq!(Value::path(" "), Err(ExpressionError::EmptyPath));
        assert_eq!(
            Value::path("a..b"),
            Err(ExpressionError::InvalidPathSegment {
                path: "a..b".into(),
                segment: "".into()
            })
        );
        assert!(Value::path("a.b-c").is_err());
    }

    #[test]
    fn interpolation() {
        let value = InterpolatedString::new()
            .literal("Hello")
            .expression(Value::call("world", []))
            .build()
            .unwrap();
        assert_eq!(value.to_string(), "'Hello${world()}'");

        let value = InterpolatedString::new()
            .literal("")
            .expression(Value::variable("acct").member("id"))
            .literal("/dbs/")
            .expression(Value::variable("db").member("name"))
            .literal("")
            .build()
            .unwrap();
        assert_eq!(value.to_string(), "'${acct.id}/dbs/${db.name}'");
    }

    #[test]
    fn interpolation_escapes_literals_only() {
        let value = InterpolatedString::new()
            .literal("it's ")
            .expression(Value::string("quoted"))
            .literal("")
            .build()
            .unwrap();
        assert_eq!(value.to_string(), r"'it\'s ${'quoted'}'");
    }

    #[test]
    fn interpolation_collapses_to_literal() {
        let value = InterpolatedString::new()
            .literal("one")
            .literal("two")
            .literal("three")
            .build()
            .unwrap();
        assert_eq!(value, Value::string("onetwothree"));

        let empty = InterpolatedString::new().build().unwrap();
        assert_eq!(empty.to_string(), "''");
    }

    #[test]
    fn interpolation_collapses_to_expression() {
        let value = InterpolatedString::new()
            .expression(Value::variable("first"))
            .expression(Value::variable("second"))
            .build()
            .unwrap();
        assert_eq!(value, Value::variable("first"));
    }

    #[test]
    fn interpolation_repairs_trailing_expression() {
        let value = InterpolatedString::new()
            .literal("prefix-")
            .expression(Value::variable("suffix"))
            .build()
            .unwrap();

        let Value::Interpolated(template) = &value else {
            panic!("expected an interpolated string, got {value:?}");
        };
        assert_eq!(template.literals(), ["prefix-", ""]);
        assert_eq!(value.to_string(), "'prefix-${suffix}'");
    }

    #[test]
    fn interpolation_rejects_mismatch() {
        let result = InterpolatedString::new()
            .literal("a")
            .expression(Value::variable("b"))
            .expression(Value::variable("c"))
            .expression(Value::variable("d"))
            .build();
        assert_eq!(
            result,
            Err(ExpressionError::SegmentMismatch {
                literals: 1,
                expressions: 3
            })
        );

        let result = InterpolatedString::new()
            .literal("a")
            .literal("b")
            .literal("c")
            .expression(Value::variable("d"))
            .build();
        assert_eq!(
            result,
            Err(ExpressionError::SegmentMismatch {
                literals: 3,
                expressions: 1
            })
        );
    }

    #[test]
    fn seeds() {
        assert_eq!(Value::string("plain").seed(), "plain");
        assert_eq!(Value::variable("acct").member("name").seed(), "acct.name");
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("abc_123"));
        assert!(is_identifier("_x"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("abc-123"));
        assert!(!is_identifier(""));
    }
}
