//! Expression evaluation.
//!
//! Evaluation is a trait so hosts can plug in their own implementation; the built-in
//! evaluator covers the list-form function set parsed by [`layout_model::Expr`].

use layout_model::record::value_as_string;
use layout_model::{Expr, ExprFunction};
use serde_json::Value;
use tracing::trace;

use crate::error::ExprError;
use crate::node::NodeRef;
use crate::sources::DataSources;

static NULL: Value = Value::Null;

/// What an expression is evaluated against: the node it belongs to and the data
/// sources of the form.
#[derive(Debug, Clone, Copy)]
pub struct ExprContext<'a> {
    pub node: NodeRef<'a>,
    pub sources: &'a DataSources,
}

impl<'a> ExprContext<'a> {
    pub fn new(node: NodeRef<'a>, sources: &'a DataSources) -> Self {
        Self { node, sources }
    }
}

pub trait ExpressionEvaluator {
    fn evaluate(&self, expr: &Expr, ctx: &ExprContext<'_>) -> Result<Value, ExprError>;
}

/// Evaluator for the built-in function set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEvaluator;

impl ExpressionEvaluator for BuiltinEvaluator {
    fn evaluate(&self, expr: &Expr, ctx: &ExprContext<'_>) -> Result<Value, ExprError> {
        match expr {
            Expr::Value(value) => Ok(value.clone()),
            Expr::Call { function, args } => {
                let value = self.call(*function, args, ctx)?;
                trace!(node = ctx.node.id(), %function, result = %value, "evaluated");
                Ok(value)
            }
        }
    }
}

impl BuiltinEvaluator {
    fn call(&self, function: ExprFunction, args: &[Expr], ctx: &ExprContext<'_>) -> Result<Value, ExprError> {
        // Lazily evaluated functions first.
        match function {
            ExprFunction::And => {
                for (position, arg) in args.iter().enumerate() {
                    if !as_bool(function, position, &self.evaluate(arg, ctx)?)? {
                        return Ok(Value::Bool(false));
                    }
                }
                return Ok(Value::Bool(true));
            }
            ExprFunction::Or => {
                for (position, arg) in args.iter().enumerate() {
                    if as_bool(function, position, &self.evaluate(arg, ctx)?)? {
                        return Ok(Value::Bool(true));
                    }
                }
                return Ok(Value::Bool(false));
            }
            ExprFunction::If => {
                let condition = as_bool(function, 0, &self.arg(args, 0, ctx)?)?;
                return if condition {
                    self.arg(args, 1, ctx)
                } else if args.len() == 4 {
                    self.arg(args, 3, ctx)
                } else {
                    Ok(Value::Null)
                };
            }
            _ => {}
        }

        let values = args
            .iter()
            .map(|arg| self.evaluate(arg, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        let value = |position: usize| values.get(position).unwrap_or(&NULL);
        let text = |position: usize| value_as_string(value(position));

        let result = match function {
            ExprFunction::Equals => Value::Bool(text(0) == text(1)),
            ExprFunction::NotEquals => Value::Bool(text(0) != text(1)),
            ExprFunction::Not => Value::Bool(!as_bool(function, 0, value(0))?),
            ExprFunction::Concat => Value::String(
                (0..values.len())
                    .map(|position| text(position).unwrap_or_default())
                    .collect(),
            ),
            ExprFunction::GreaterThan
            | ExprFunction::GreaterThanEq
            | ExprFunction::LessThan
            | ExprFunction::LessThanEq => {
                let left = as_number(function, 0, value(0))?;
                let right = as_number(function, 1, value(1))?;
                let (Some(left), Some(right)) = (left, right) else {
                    return Ok(Value::Bool(false));
                };
                Value::Bool(match function {
                    ExprFunction::GreaterThan => left > right,
                    ExprFunction::GreaterThanEq => left >= right,
                    ExprFunction::LessThan => left < right,
                    _ => left <= right,
                })
            }
            ExprFunction::DataModel => match text(0) {
                Some(path) => {
                    let path = ctx.node.transpose_data_model(&path);
                    ctx.sources.form_data.get(&path).cloned().unwrap_or(Value::Null)
                }
                None => Value::Null,
            },
            ExprFunction::Component => match text(0) {
                Some(id) => self.component_value(&id, ctx)?,
                None => Value::Null,
            },
            ExprFunction::InstanceContext => match text(0) {
                Some(key) => ctx
                    .sources
                    .instance_context
                    .get(&key)?
                    .map_or(Value::Null, |value| Value::String(value.to_string())),
                None => Value::Null,
            },
            ExprFunction::FrontendSettings => text(0)
                .and_then(|key| ctx.sources.application_settings.get(&key).cloned())
                .unwrap_or(Value::Null),
            ExprFunction::Contains => match (text(0), text(1)) {
                (Some(haystack), Some(needle)) => Value::Bool(haystack.contains(&needle)),
                _ => Value::Bool(false),
            },
            ExprFunction::NotContains => match (text(0), text(1)) {
                (Some(haystack), Some(needle)) => Value::Bool(!haystack.contains(&needle)),
                _ => Value::Bool(true),
            },
            ExprFunction::StartsWith => match (text(0), text(1)) {
                (Some(haystack), Some(prefix)) => Value::Bool(haystack.starts_with(&prefix)),
                _ => Value::Bool(false),
            },
            ExprFunction::EndsWith => match (text(0), text(1)) {
                (Some(haystack), Some(suffix)) => Value::Bool(haystack.ends_with(&suffix)),
                _ => Value::Bool(false),
            },
            ExprFunction::StringLength => {
                Value::from(text(0).map_or(0, |value| value.chars().count()))
            }
            ExprFunction::CommaContains => match (text(0), text(1)) {
                (Some(list), Some(item)) => {
                    let item = item.trim();
                    Value::Bool(list.split(',').any(|entry| entry.trim() == item))
                }
                _ => Value::Bool(false),
            },
            ExprFunction::LowerCase => text(0).map_or(Value::Null, |value| Value::String(value.to_lowercase())),
            ExprFunction::UpperCase => text(0).map_or(Value::Null, |value| Value::String(value.to_uppercase())),
            ExprFunction::Round => {
                let number = as_number(function, 0, value(0))?.unwrap_or(0.0);
                let decimals = match values.get(1) {
                    Some(value) => as_number(function, 1, value)?.map_or(0, |d| d.max(0.0) as usize),
                    None => 0,
                };
                Value::String(round(number, decimals))
            }
            ExprFunction::And | ExprFunction::Or | ExprFunction::If => unreachable!("handled above"),
        };
        Ok(result)
    }

    fn arg(&self, args: &[Expr], position: usize, ctx: &ExprContext<'_>) -> Result<Value, ExprError> {
        args.get(position)
            .map_or(Ok(Value::Null), |arg| self.evaluate(arg, ctx))
    }

    /// The value bound to the nearest component with `id`, or null when it is hidden or
    /// has no simple binding.
    fn component_value(&self, id: &str, ctx: &ExprContext<'_>) -> Result<Value, ExprError> {
        let target = ctx
            .node
            .closest_nearby(|item| item.has_id(id))
            .ok_or_else(|| ExprError::ComponentNotFound(id.to_string()))?;
        if target.is_hidden(&ctx.sources.hidden_fields) {
            return Ok(Value::Null);
        }
        Ok(target
            .item()
            .data_model_bindings
            .get("simpleBinding")
            .and_then(|binding| ctx.sources.form_data.get(binding))
            .cloned()
            .unwrap_or(Value::Null))
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{text}\""),
        other => other.to_string(),
    }
}

fn as_bool(function: ExprFunction, position: usize, value: &Value) -> Result<bool, ExprError> {
    let parsed = match value {
        Value::Null => Some(false),
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_f64() {
            Some(n) if n == 1.0 => Some(true),
            Some(n) if n == 0.0 => Some(false),
            _ => None,
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| ExprError::ArgumentType {
        function: function.to_string(),
        position,
        expected: "a boolean",
        found: describe(value),
    })
}

fn as_number(function: ExprFunction, position: usize, value: &Value) -> Result<Option<f64>, ExprError> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_f64(),
        Value::String(text) if text.trim().is_empty() => return Ok(None),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| ExprError::ArgumentType {
        function: function.to_string(),
        position,
        expected: "a number",
        found: describe(value),
    })
}

/// Rounds half away from zero and formats with exactly `decimals` places.
fn round(number: f64, decimals: usize) -> String {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let rounded = (number * factor).round() / factor;
    format!("{rounded:.decimals$}")
}
