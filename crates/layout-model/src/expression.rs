//! Expression-valued properties.
//!
//! Layout properties are either literal JSON values or expressions written in list form,
//! e.g. `["equals", ["dataModel", "Model.Field"], "yes"]`. The engine only needs the
//! parsed tree; evaluation lives behind a trait in the engine crate.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{ModelError, Result};

/// Functions known to the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprFunction {
    Equals,
    NotEquals,
    Not,
    And,
    Or,
    If,
    Concat,
    GreaterThan,
    GreaterThanEq,
    LessThan,
    LessThanEq,
    DataModel,
    Component,
    InstanceContext,
    FrontendSettings,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    StringLength,
    CommaContains,
    LowerCase,
    UpperCase,
    Round,
}

impl ExprFunction {
    pub const ALL: [ExprFunction; 24] = [
        Self::Equals,
        Self::NotEquals,
        Self::Not,
        Self::And,
        Self::Or,
        Self::If,
        Self::Concat,
        Self::GreaterThan,
        Self::GreaterThanEq,
        Self::LessThan,
        Self::LessThanEq,
        Self::DataModel,
        Self::Component,
        Self::InstanceContext,
        Self::FrontendSettings,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::StringLength,
        Self::CommaContains,
        Self::LowerCase,
        Self::UpperCase,
        Self::Round,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::If => "if",
            Self::Concat => "concat",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanEq => "greaterThanEq",
            Self::LessThan => "lessThan",
            Self::LessThanEq => "lessThanEq",
            Self::DataModel => "dataModel",
            Self::Component => "component",
            Self::InstanceContext => "instanceContext",
            Self::FrontendSettings => "frontendSettings",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::StringLength => "stringLength",
            Self::CommaContains => "commaContains",
            Self::LowerCase => "lowerCase",
            Self::UpperCase => "upperCase",
            Self::Round => "round",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Minimum and (optional) maximum number of arguments.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::Not
            | Self::DataModel
            | Self::Component
            | Self::InstanceContext
            | Self::FrontendSettings
            | Self::StringLength
            | Self::LowerCase
            | Self::UpperCase => (1, Some(1)),
            Self::Round => (1, Some(2)),
            Self::And | Self::Or => (1, None),
            Self::Concat => (0, None),
            Self::If => (2, Some(4)),
            Self::Equals
            | Self::NotEquals
            | Self::GreaterThan
            | Self::GreaterThanEq
            | Self::LessThan
            | Self::LessThanEq
            | Self::Contains
            | Self::NotContains
            | Self::StartsWith
            | Self::EndsWith
            | Self::CommaContains => (2, Some(2)),
        }
    }
}

impl fmt::Display for ExprFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A scalar literal (string, number, boolean or null).
    Value(Value),
    /// A function call with its arguments.
    Call {
        function: ExprFunction,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn call(function: ExprFunction, args: Vec<Expr>) -> Self {
        Self::Call { function, args }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// Returns true when `value` looks like a list-form expression: a non-empty array
    /// whose first element names a known function.
    pub fn is_expression(value: &Value) -> bool {
        match value {
            Value::Array(items) => items
                .first()
                .and_then(Value::as_str)
                .is_some_and(|name| ExprFunction::from_name(name).is_some()),
            _ => false,
        }
    }

    pub fn parse(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let Some((head, rest)) = items.split_first() else {
                    return Err(ModelError::invalid_expression("empty expression list"));
                };
                let name = head.as_str().ok_or_else(|| {
                    ModelError::invalid_expression(format!(
                        "function name must be a string, got {head}"
                    ))
                })?;
                let function = ExprFunction::from_name(name).ok_or_else(|| {
                    ModelError::invalid_expression(format!("unknown function '{name}'"))
                })?;
                let (min, max) = function.arity();
                if rest.len() < min || max.is_some_and(|max| rest.len() > max) {
                    return Err(ModelError::invalid_expression(format!(
                        "'{name}' does not accept {} argument(s)",
                        rest.len()
                    )));
                }
                if function == ExprFunction::If
                    && rest.len() > 2
                    && (rest.len() != 4 || rest[2].as_str() != Some("else"))
                {
                    return Err(ModelError::invalid_expression(
                        "'if' expects [condition, then] or [condition, then, \"else\", otherwise]",
                    ));
                }
                let args = rest.iter().map(Self::parse).collect::<Result<Vec<_>>>()?;
                Ok(Self::Call { function, args })
            }
            Value::Object(_) => Err(ModelError::invalid_expression(
                "objects are not valid expression arguments",
            )),
            scalar => Ok(Self::Value(scalar.clone())),
        }
    }

    /// Renders the expression back into its list form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Call { function, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(function.name().to_string()));
                items.extend(args.iter().map(Self::to_json));
                Value::Array(items)
            }
        }
    }
}

/// A component property that is either a literal or an expression awaiting evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Literal(Value),
    Expression(Expr),
}

impl PropertyValue {
    pub fn from_json(value: Value) -> Result<Self> {
        if Expr::is_expression(&value) {
            Ok(Self::Expression(Expr::parse(&value)?))
        } else {
            Ok(Self::Literal(value))
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Expression(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_literal().and_then(Value::as_bool)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_literal().and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Expression(expr) => expr.to_json(),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Literal(Value::Bool(value))
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}
