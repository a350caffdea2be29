//! Token payloads: `<op>:<id>[,<id>...][:<decimals>]`
//!
//! The payload is persisted inside user text, so its shape never changes.
//! New operations may be added; existing ones keep their meaning.

use std::fmt;
use std::str::FromStr;

use easel_model::{format_number, ElementId, PropertyValue};

use super::CalcError;

/// Largest accepted fixed precision
pub const MAX_DECIMALS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sum,
    /// First value minus the rest
    Sub,
    Mul,
    /// First value divided by the rest
    Div,
    Avg,
    Min,
    Max,
    /// Number of referenced elements; values are not read
    Count,
    /// Value of a single element, verbatim
    Ref,
    /// Values joined without separator
    Concat,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::Div => "div",
            Operation::Avg => "avg",
            Operation::Min => "min",
            Operation::Max => "max",
            Operation::Count => "count",
            Operation::Ref => "ref",
            Operation::Concat => "concat",
        }
    }

    fn is_numeric(self) -> bool {
        !matches!(self, Operation::Count | Operation::Ref | Operation::Concat)
    }

    /// Whether evaluation needs the referenced values at all
    pub fn reads_values(self) -> bool {
        self != Operation::Count
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sum" => Operation::Sum,
            "sub" => Operation::Sub,
            "mul" => Operation::Mul,
            "div" => Operation::Div,
            "avg" => Operation::Avg,
            "min" => Operation::Min,
            "max" => Operation::Max,
            "count" => Operation::Count,
            "ref" => Operation::Ref,
            "concat" => Operation::Concat,
            other => return Err(CalcError::Parse(format!("unknown operation '{}'", other))),
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    pub op: Operation,
    pub ids: Vec<ElementId>,
    pub decimals: Option<usize>,
}

impl Calculation {
    pub fn parse(payload: &str) -> Result<Self, CalcError> {
        let mut fields = payload.split(':');
        let op: Operation = fields.next().unwrap_or_default().trim().parse()?;

        let ids: Vec<ElementId> = fields
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ElementId::from)
            .collect();
        if ids.is_empty() {
            return Err(CalcError::Parse(format!("{} needs at least one element id", op)));
        }

        let decimals = match fields.next() {
            None => None,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(d) if d <= MAX_DECIMALS => Some(d),
                _ => return Err(CalcError::Parse(format!("invalid decimals '{}'", raw))),
            },
        };

        if fields.next().is_some() {
            return Err(CalcError::Parse("too many ':' separated fields".to_string()));
        }
        if op == Operation::Ref && ids.len() != 1 {
            return Err(CalcError::Parse("ref takes exactly one element id".to_string()));
        }
        if decimals.is_some() && !op.is_numeric() {
            return Err(CalcError::Parse(format!("{} does not take decimals", op)));
        }

        Ok(Self { op, ids, decimals })
    }

    /// Apply the operation to values resolved in `ids` order
    pub fn apply(&self, values: &[PropertyValue]) -> Result<String, CalcError> {
        match self.op {
            Operation::Count => return Ok(self.ids.len().to_string()),
            Operation::Ref => {
                return values
                    .first()
                    .map(|v| v.to_string())
                    .ok_or_else(|| CalcError::Evaluation("missing value".to_string()))
            }
            Operation::Concat => return Ok(values.iter().map(|v| v.to_string()).collect()),
            _ => {}
        }

        let numbers = self.numbers(values)?;
        let (first, rest) = numbers
            .split_first()
            .ok_or_else(|| CalcError::Evaluation("missing value".to_string()))?;

        let result = match self.op {
            Operation::Sum => numbers.iter().sum(),
            Operation::Sub => rest.iter().fold(*first, |acc, n| acc - n),
            Operation::Mul => numbers.iter().product(),
            Operation::Div => {
                if rest.iter().any(|n| *n == 0.0) {
                    return Err(CalcError::Evaluation("division by zero".to_string()));
                }
                rest.iter().fold(*first, |acc, n| acc / n)
            }
            Operation::Avg => numbers.iter().sum::<f64>() / numbers.len() as f64,
            Operation::Min => rest.iter().copied().fold(*first, f64::min),
            Operation::Max => rest.iter().copied().fold(*first, f64::max),
            Operation::Count | Operation::Ref | Operation::Concat => {
                return Err(CalcError::Evaluation(format!("{} is not numeric", self.op)))
            }
        };

        Ok(self.format(result))
    }

    fn numbers(&self, values: &[PropertyValue]) -> Result<Vec<f64>, CalcError> {
        self.ids
            .iter()
            .zip(values)
            .map(|(id, value)| {
                value
                    .as_number()
                    .ok_or_else(|| CalcError::Evaluation(format!("{} is not a number", id)))
            })
            .collect()
    }

    fn format(&self, value: f64) -> String {
        match self.decimals {
            Some(decimals) => format!("{:.*}", decimals, value),
            None => format_number(value),
        }
    }
}
