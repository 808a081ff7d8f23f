//! Expression evaluator.
//!
//! Evaluates the token slices captured by the parser against a
//! [`Transaction`] scope. Reference primaries (`$this.width`,
//! `$Sidebar.width`, `$parent.children[0].h`) are collected into a
//! [`RefPath`] and delegated to a [`ReferenceResolver`]; everything else
//! is interpreted directly.

use std::fmt;
use std::sync::Arc;

use oxc_lex::{Token, TokenKind};
use oxc_util::{Location, Value};

use crate::error::EvalError;
use crate::transaction::Transaction;

/// One segment of a reference or variable path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// `.name`
    Name(String),
    /// `[index]`
    Index(usize),
}

/// A collected `$`-reference: base identifier plus trailing segments.
#[derive(Debug, Clone, PartialEq)]
pub struct RefPath {
    /// The identifier following `$`: `this`, `parent`, or a block id.
    pub base: String,
    /// Member and index accesses following the base.
    pub segments: Vec<PathSegment>,
}

impl fmt::Display for RefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.base)?;
        for segment in &self.segments {
            match segment {
                PathSegment::Name(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// The seam between expression evaluation and reference resolution.
///
/// Pass 1 of preprocessing installs a resolver that rejects every
/// reference; Pass 2 installs the block-registry resolver.
pub trait ReferenceResolver {
    /// Resolve a collected reference path to a value.
    fn resolve(&mut self, path: &RefPath, location: &Location) -> Result<Value, EvalError>;
}

/// A resolver that fails every reference with `UnresolvedReference`.
///
/// Used wherever `$`-references are not meaningful: template conditions,
/// `<set>` values, and Pass 1 property literalisation.
#[derive(Debug, Default)]
pub struct NullResolver;

impl ReferenceResolver for NullResolver {
    fn resolve(&mut self, path: &RefPath, location: &Location) -> Result<Value, EvalError> {
        Err(EvalError::UnresolvedReference {
            path: path.to_string(),
            location: location.clone(),
        })
    }
}

/// Returns true if the token slice contains a `$` reference marker.
pub fn contains_reference(tokens: &[Token]) -> bool {
    tokens.iter().any(|t| t.kind == TokenKind::Dollar)
}

/// Evaluate a captured token slice.
///
/// # Example
///
/// ```
/// use oxc_eval::{evaluate, NullResolver, Transaction};
/// use oxc_util::Value;
///
/// let tokens = oxc_lex::tokenize("10 + 20 * 2", "t.ox").unwrap();
/// let tokens = &tokens[..tokens.len() - 1]; // strip Eof
/// let txn = Transaction::new();
/// let value = evaluate(tokens, "t.ox", &txn, &mut NullResolver).unwrap();
/// assert_eq!(value, Value::Number(50.0));
/// ```
pub fn evaluate(
    tokens: &[Token],
    file: &str,
    txn: &Transaction,
    resolver: &mut dyn ReferenceResolver,
) -> Result<Value, EvalError> {
    Evaluator::new(tokens, file, txn, resolver).run()
}

/// Precedence-climbing evaluator over a token slice.
pub struct Evaluator<'a> {
    tokens: &'a [Token],
    pos: usize,
    file: Arc<str>,
    txn: &'a Transaction,
    resolver: &'a mut dyn ReferenceResolver,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator. Most callers use [`evaluate`] instead.
    pub fn new(
        tokens: &'a [Token],
        file: &str,
        txn: &'a Transaction,
        resolver: &'a mut dyn ReferenceResolver,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            file: Arc::from(file),
            txn,
            resolver,
        }
    }

    /// Evaluate the whole slice; trailing tokens are an error.
    pub fn run(mut self) -> Result<Value, EvalError> {
        let value = self.parse_or(true)?;
        if self.pos < self.tokens.len() {
            return Err(EvalError::UnexpectedToken {
                found: self.describe_current(),
                location: self.here(),
            });
        }
        Ok(value)
    }

    // =========================================================================
    // TOKEN HELPERS
    // =========================================================================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn kind(&self) -> Option<&TokenKind> {
        self.current().map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self
            .kind()
            .map(|k| std::mem::discriminant(k) == std::mem::discriminant(kind))
            .unwrap_or(false)
        {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Location of the current token, or of the end of the slice.
    fn here(&self) -> Location {
        match self.current() {
            Some(token) => token.location(&self.file),
            None => self
                .tokens
                .last()
                .map(|t| t.location(&self.file))
                .unwrap_or_else(|| Location::start_of(Arc::clone(&self.file))),
        }
    }

    fn describe_current(&self) -> String {
        match self.current() {
            Some(token) => format!("'{}'", token.raw),
            None => "end of expression".to_string(),
        }
    }

    fn end_of_input(&self) -> EvalError {
        EvalError::UnexpectedEnd {
            location: self.here(),
        }
    }

    // =========================================================================
    // PRECEDENCE LADDER
    // =========================================================================
    //
    // Each level takes `active`: when false, the structure is parsed but
    // nothing is evaluated. This is how `&&`/`||` short-circuit without
    // losing track of the token stream.

    fn parse_or(&mut self, active: bool) -> Result<Value, EvalError> {
        let mut value = self.parse_and(active)?;
        while self.eat(&TokenKind::OrOr) {
            let left_true = active && value.is_truthy();
            let right = self.parse_and(active && !left_true)?;
            if active {
                value = Value::Bool(left_true || right.is_truthy());
            }
        }
        Ok(value)
    }

    fn parse_and(&mut self, active: bool) -> Result<Value, EvalError> {
        let mut value = self.parse_equality(active)?;
        while self.eat(&TokenKind::AndAnd) {
            let left_true = active && value.is_truthy();
            let right = self.parse_equality(active && left_true)?;
            if active {
                value = Value::Bool(left_true && right.is_truthy());
            }
        }
        Ok(value)
    }

    fn parse_equality(&mut self, active: bool) -> Result<Value, EvalError> {
        let mut value = self.parse_comparison(active)?;
        loop {
            let negate = match self.kind() {
                Some(TokenKind::EqEq) => false,
                Some(TokenKind::NotEq) => true,
                _ => break,
            };
            self.bump();
            let right = self.parse_comparison(active)?;
            if active {
                let equal = value == right;
                value = Value::Bool(if negate { !equal } else { equal });
            }
        }
        Ok(value)
    }

    fn parse_comparison(&mut self, active: bool) -> Result<Value, EvalError> {
        let mut value = self.parse_additive(active)?;
        loop {
            let op = match self.kind() {
                Some(TokenKind::Lt) => "<",
                Some(TokenKind::LtEq) => "<=",
                Some(TokenKind::Gt) => ">",
                Some(TokenKind::GtEq) => ">=",
                _ => break,
            };
            let location = self.here();
            self.bump();
            let right = self.parse_additive(active)?;
            if active {
                let (l, r) = self.numeric_pair(op, &value, &right, &location)?;
                value = Value::Bool(match op {
                    "<" => l < r,
                    "<=" => l <= r,
                    ">" => l > r,
                    _ => l >= r,
                });
            }
        }
        Ok(value)
    }

    fn parse_additive(&mut self, active: bool) -> Result<Value, EvalError> {
        let mut value = self.parse_multiplicative(active)?;
        loop {
            let op = match self.kind() {
                Some(TokenKind::Plus) => "+",
                Some(TokenKind::Minus) => "-",
                _ => break,
            };
            let location = self.here();
            self.bump();
            let right = self.parse_multiplicative(active)?;
            if active {
                let (l, r) = self.numeric_pair(op, &value, &right, &location)?;
                value = Value::Number(if op == "+" { l + r } else { l - r });
            }
        }
        Ok(value)
    }

    fn parse_multiplicative(&mut self, active: bool) -> Result<Value, EvalError> {
        let mut value = self.parse_exponent(active)?;
        loop {
            let op = match self.kind() {
                Some(TokenKind::Star) => "*",
                Some(TokenKind::Slash) => "/",
                Some(TokenKind::Percent) => "%",
                _ => break,
            };
            let location = self.here();
            self.bump();
            let right = self.parse_exponent(active)?;
            if active {
                let (l, r) = self.numeric_pair(op, &value, &right, &location)?;
                value = match op {
                    "*" => Value::Number(l * r),
                    "/" => {
                        if r == 0.0 {
                            return Err(EvalError::DivisionByZero { location });
                        }
                        Value::Number(l / r)
                    }
                    _ => {
                        if r == 0.0 {
                            return Err(EvalError::DivisionByZero { location });
                        }
                        Value::Number(l % r)
                    }
                };
            }
        }
        Ok(value)
    }

    /// `**` is right-associative.
    fn parse_exponent(&mut self, active: bool) -> Result<Value, EvalError> {
        let base = self.parse_unary(active)?;
        if matches!(self.kind(), Some(TokenKind::StarStar)) {
            let location = self.here();
            self.bump();
            let exponent = self.parse_exponent(active)?;
            if active {
                let (l, r) = self.numeric_pair("**", &base, &exponent, &location)?;
                return Ok(Value::Number(l.powf(r)));
            }
        }
        Ok(base)
    }

    fn parse_unary(&mut self, active: bool) -> Result<Value, EvalError> {
        match self.kind() {
            Some(TokenKind::Minus) => {
                let location = self.here();
                self.bump();
                let value = self.parse_unary(active)?;
                if active {
                    match value.as_number() {
                        Some(n) => Ok(Value::Number(-n)),
                        None => Err(EvalError::InvalidOperandType {
                            op: "-".to_string(),
                            type_name: value.type_name().to_string(),
                            location,
                        }),
                    }
                } else {
                    Ok(Value::Null)
                }
            }
            Some(TokenKind::Bang) => {
                self.bump();
                let value = self.parse_unary(active)?;
                if active {
                    Ok(Value::Bool(!value.is_truthy()))
                } else {
                    Ok(Value::Null)
                }
            }
            _ => self.parse_primary(active),
        }
    }

    fn parse_primary(&mut self, active: bool) -> Result<Value, EvalError> {
        let token = match self.current() {
            Some(token) => token.clone(),
            None => return Err(self.end_of_input()),
        };
        let location = token.location(&self.file);

        match &token.kind {
            TokenKind::Number(n) => {
                self.bump();
                Ok(Value::Number(*n))
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(Value::Str(s.clone()))
            }
            TokenKind::Bool(b) => {
                self.bump();
                Ok(Value::Bool(*b))
            }
            TokenKind::Null => {
                self.bump();
                Ok(Value::Null)
            }
            TokenKind::LParen => {
                self.bump();
                let value = self.parse_or(active)?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(EvalError::UnexpectedToken {
                        found: self.describe_current(),
                        location: self.here(),
                    });
                }
                Ok(value)
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.bump();
                if matches!(self.kind(), Some(TokenKind::LParen)) {
                    self.parse_call(&name, active, location)
                } else {
                    self.parse_variable_path(&name, active, location)
                }
            }
            TokenKind::Dollar => {
                self.bump();
                self.parse_reference(active, location)
            }
            _ => Err(EvalError::UnexpectedToken {
                found: format!("'{}'", token.raw),
                location,
            }),
        }
    }

    /// Host function call: `name(arg, …)`.
    fn parse_call(
        &mut self,
        name: &str,
        active: bool,
        location: Location,
    ) -> Result<Value, EvalError> {
        self.bump(); // (
        let mut args = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                args.push(self.parse_or(active)?);
                if self.eat(&TokenKind::RParen) {
                    break;
                }
                if !self.eat(&TokenKind::Comma) {
                    return Err(EvalError::UnexpectedToken {
                        found: self.describe_current(),
                        location: self.here(),
                    });
                }
            }
        }
        if !active {
            return Ok(Value::Null);
        }
        match self.txn.function(name) {
            Some(function) => function(&args),
            None => Err(EvalError::UndefinedFunction {
                name: name.to_string(),
                location,
            }),
        }
    }

    /// Variable lookup followed by member/index accesses.
    fn parse_variable_path(
        &mut self,
        name: &str,
        active: bool,
        location: Location,
    ) -> Result<Value, EvalError> {
        let mut value = if active {
            match self.txn.variable(name) {
                Some(v) => v.clone(),
                None => {
                    return Err(EvalError::UndefinedVariable {
                        name: name.to_string(),
                        location,
                    })
                }
            }
        } else {
            Value::Null
        };

        while let Some(segment) = self.parse_path_segment()? {
            if active {
                value = self.apply_segment(value, &segment)?;
            }
        }
        Ok(value)
    }

    /// Collect a `$`-reference path and hand it to the resolver.
    fn parse_reference(&mut self, active: bool, location: Location) -> Result<Value, EvalError> {
        let base = match self.kind() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.bump();
                name
            }
            _ => {
                return Err(EvalError::UnexpectedToken {
                    found: self.describe_current(),
                    location: self.here(),
                })
            }
        };

        let mut segments = Vec::new();
        while let Some(segment) = self.parse_path_segment()? {
            segments.push(segment);
        }

        let path = RefPath { base, segments };
        if active {
            self.resolver.resolve(&path, &location)
        } else {
            Ok(Value::Null)
        }
    }

    /// Parse one `.name` or `[index]` segment, if present.
    fn parse_path_segment(&mut self) -> Result<Option<PathSegment>, EvalError> {
        match self.kind() {
            Some(TokenKind::Dot) => {
                self.bump();
                match self.kind() {
                    Some(TokenKind::Ident(name)) => {
                        let name = name.clone();
                        self.bump();
                        Ok(Some(PathSegment::Name(name)))
                    }
                    _ => Err(EvalError::UnexpectedToken {
                        found: self.describe_current(),
                        location: self.here(),
                    }),
                }
            }
            Some(TokenKind::LBracket) => {
                let location = self.here();
                self.bump();
                let index = match self.kind() {
                    Some(TokenKind::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => {
                        let index = *n as usize;
                        self.bump();
                        index
                    }
                    _ => {
                        return Err(EvalError::UnexpectedToken {
                            found: self.describe_current(),
                            location,
                        })
                    }
                };
                if !self.eat(&TokenKind::RBracket) {
                    return Err(EvalError::UnexpectedToken {
                        found: self.describe_current(),
                        location: self.here(),
                    });
                }
                Ok(Some(PathSegment::Index(index)))
            }
            _ => Ok(None),
        }
    }

    /// Apply one path segment to a value.
    fn apply_segment(&self, value: Value, segment: &PathSegment) -> Result<Value, EvalError> {
        access(&value, segment, &self.here())
    }

    fn numeric_pair(
        &self,
        op: &str,
        left: &Value,
        right: &Value,
        location: &Location,
    ) -> Result<(f64, f64), EvalError> {
        match (left.as_number(), right.as_number()) {
            (Some(l), Some(r)) => Ok((l, r)),
            _ => {
                let offender = if left.as_number().is_none() {
                    left
                } else {
                    right
                };
                Err(EvalError::InvalidOperandType {
                    op: op.to_string(),
                    type_name: offender.type_name().to_string(),
                    location: location.clone(),
                })
            }
        }
    }
}

/// Apply one path segment to a value, with the standard access semantics:
/// member access on null fails, missing object properties fail, and array
/// indexing is zero-based and bounds-checked.
pub fn access(value: &Value, segment: &PathSegment, location: &Location) -> Result<Value, EvalError> {
    match (value, segment) {
        (Value::Null, _) => Err(EvalError::NullMemberAccess {
            location: location.clone(),
        }),
        (Value::Object(map), PathSegment::Name(name)) => match map.get(name) {
            Some(v) => Ok(v.clone()),
            None => Err(EvalError::UndefinedProperty {
                name: name.clone(),
                location: location.clone(),
            }),
        },
        (Value::Array(items), PathSegment::Index(index)) => {
            if *index < items.len() {
                Ok(items[*index].clone())
            } else {
                Err(EvalError::IndexOutOfRange {
                    index: *index,
                    length: items.len(),
                    location: location.clone(),
                })
            }
        }
        (other, PathSegment::Name(_)) => Err(EvalError::InvalidOperandType {
            op: "member access".to_string(),
            type_name: other.type_name().to_string(),
            location: location.clone(),
        }),
        (other, PathSegment::Index(_)) => Err(EvalError::InvalidOperandType {
            op: "indexing".to_string(),
            type_name: other.type_name().to_string(),
            location: location.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn tokens(source: &str) -> Vec<Token> {
        let mut tokens = oxc_lex::tokenize(source, "eval.ox").unwrap();
        tokens.pop(); // Eof
        tokens
    }

    fn eval(source: &str) -> Result<Value, EvalError> {
        let txn = Transaction::new();
        evaluate(&tokens(source), "eval.ox", &txn, &mut NullResolver)
    }

    fn eval_with(source: &str, txn: &Transaction) -> Result<Value, EvalError> {
        evaluate(&tokens(source), "eval.ox", txn, &mut NullResolver)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("10 + 20 * 2").unwrap(), Value::Number(50.0));
        assert_eq!(eval("(10 + 20) * 2").unwrap(), Value::Number(60.0));
        assert_eq!(eval("10 - 4 - 3").unwrap(), Value::Number(3.0));
        assert_eq!(eval("20 / 4 / 5").unwrap(), Value::Number(1.0));
        assert_eq!(eval("7 % 4").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_exponent_right_associative() {
        assert_eq!(eval("2 ** 3").unwrap(), Value::Number(8.0));
        // 2 ** (3 ** 2) = 512, not (2 ** 3) ** 2 = 64
        assert_eq!(eval("2 ** 3 ** 2").unwrap(), Value::Number(512.0));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(eval("-3 + 5").unwrap(), Value::Number(2.0));
        assert_eq!(eval("!true").unwrap(), Value::Bool(false));
        assert_eq!(eval("!0").unwrap(), Value::Bool(true));
        assert_eq!(eval("!\"\"").unwrap(), Value::Bool(true));
        assert_eq!(eval("!null").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("1 < 2").unwrap(), Value::Bool(true));
        assert_eq!(eval("2 <= 2").unwrap(), Value::Bool(true));
        assert_eq!(eval("3 > 4").unwrap(), Value::Bool(false));
        assert_eq!(eval("4 >= 5").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_comparison_requires_numbers() {
        let err = eval("\"a\" < 2").unwrap_err();
        assert!(matches!(err, EvalError::InvalidOperandType { .. }));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(eval("1 == 1").unwrap(), Value::Bool(true));
        assert_eq!(eval("\"a\" == \"a\"").unwrap(), Value::Bool(true));
        assert_eq!(eval("\"a\" != \"b\"").unwrap(), Value::Bool(true));
        assert_eq!(eval("null == null").unwrap(), Value::Bool(true));
        assert_eq!(eval("1 == \"1\"").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            eval("1 / 0").unwrap_err(),
            EvalError::DivisionByZero { .. }
        ));
        assert!(matches!(
            eval("1 % 0").unwrap_err(),
            EvalError::DivisionByZero { .. }
        ));
    }

    #[test]
    fn test_arithmetic_type_errors() {
        assert!(matches!(
            eval("\"a\" + 1").unwrap_err(),
            EvalError::InvalidOperandType { .. }
        ));
        assert!(matches!(
            eval("-true").unwrap_err(),
            EvalError::InvalidOperandType { .. }
        ));
    }

    #[test]
    fn test_short_circuit_and() {
        // The undefined variable on the right is never evaluated.
        assert_eq!(eval("false && missing").unwrap(), Value::Bool(false));
        assert!(matches!(
            eval("true && missing").unwrap_err(),
            EvalError::UndefinedVariable { .. }
        ));
    }

    #[test]
    fn test_short_circuit_or() {
        assert_eq!(eval("true || missing").unwrap(), Value::Bool(true));
        assert!(matches!(
            eval("false || missing").unwrap_err(),
            EvalError::UndefinedVariable { .. }
        ));
    }

    #[test]
    fn test_variables_and_paths() {
        let mut txn = Transaction::new();
        txn.set_variable("n", Value::Number(4.0));
        txn.set_variable(
            "user",
            Value::Object(
                [
                    ("name".to_string(), Value::Str("ada".into())),
                    (
                        "tags".to_string(),
                        Value::Array(vec![Value::Str("x".into()), Value::Str("y".into())]),
                    ),
                ]
                .into_iter()
                .collect(),
            ),
        );

        assert_eq!(eval_with("n * 2", &txn).unwrap(), Value::Number(8.0));
        assert_eq!(
            eval_with("user.name", &txn).unwrap(),
            Value::Str("ada".into())
        );
        assert_eq!(
            eval_with("user.tags[1]", &txn).unwrap(),
            Value::Str("y".into())
        );
    }

    #[test]
    fn test_undefined_variable() {
        assert!(matches!(
            eval("nope").unwrap_err(),
            EvalError::UndefinedVariable { .. }
        ));
    }

    #[test]
    fn test_undefined_property() {
        let mut txn = Transaction::new();
        txn.set_variable("user", Value::Object(Default::default()));
        assert!(matches!(
            eval_with("user.ghost", &txn).unwrap_err(),
            EvalError::UndefinedProperty { .. }
        ));
    }

    #[test]
    fn test_null_member_access() {
        let mut txn = Transaction::new();
        txn.set_variable("nothing", Value::Null);
        assert!(matches!(
            eval_with("nothing.x", &txn).unwrap_err(),
            EvalError::NullMemberAccess { .. }
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut txn = Transaction::new();
        txn.set_variable("xs", Value::Array(vec![Value::Number(1.0)]));
        let err = eval_with("xs[3]", &txn).unwrap_err();
        assert!(matches!(
            err,
            EvalError::IndexOutOfRange {
                index: 3,
                length: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_reference_rejected_by_null_resolver() {
        let err = eval("$parent.width - 2").unwrap_err();
        match err {
            EvalError::UnresolvedReference { path, .. } => {
                assert_eq!(path, "$parent.width");
            }
            other => panic!("expected unresolved reference, got {other:?}"),
        }
    }

    #[test]
    fn test_reference_path_collection() {
        struct Capture(Option<RefPath>);
        impl ReferenceResolver for Capture {
            fn resolve(
                &mut self,
                path: &RefPath,
                _location: &Location,
            ) -> Result<Value, EvalError> {
                self.0 = Some(path.clone());
                Ok(Value::Number(7.0))
            }
        }

        let txn = Transaction::new();
        let mut capture = Capture(None);
        let value = evaluate(
            &tokens("$parent.children[2].width + 1"),
            "eval.ox",
            &txn,
            &mut capture,
        )
        .unwrap();
        assert_eq!(value, Value::Number(8.0));

        let path = capture.0.unwrap();
        assert_eq!(path.base, "parent");
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Name("children".into()),
                PathSegment::Index(2),
                PathSegment::Name("width".into()),
            ]
        );
        assert_eq!(path.to_string(), "$parent.children[2].width");
    }

    #[test]
    fn test_host_function_call() {
        let mut txn = Transaction::new();
        txn.add_function("max", |args: &[Value]| {
            let mut best = f64::MIN;
            for arg in args {
                if let Value::Number(n) = arg {
                    best = best.max(*n);
                }
            }
            Ok(Value::Number(best))
        });
        assert_eq!(
            eval_with("max(1, 9, 4) + 1", &txn).unwrap(),
            Value::Number(10.0)
        );
    }

    #[test]
    fn test_undefined_function() {
        assert!(matches!(
            eval("ghost(1)").unwrap_err(),
            EvalError::UndefinedFunction { .. }
        ));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(
            eval("1 2").unwrap_err(),
            EvalError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_empty_expression_rejected() {
        assert!(matches!(eval("").unwrap_err(), EvalError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_contains_reference() {
        assert!(contains_reference(&tokens("$this.w + 1")));
        assert!(!contains_reference(&tokens("1 + 2")));
    }
}
