use plexus_api_core::coercion::{expect_float, expect_int, expect_list, expect_text, to_float};
use plexus_api_core::{
    Argument, FunctionError, FunctionLibrary, NativeFunction, PortRange, Value, ValueType,
};

fn float(name: &str) -> Argument {
    Argument::new(name, ValueType::Float)
}

fn binary(name: &str, op: fn(f64, f64) -> Result<f64, FunctionError>) -> NativeFunction {
    NativeFunction::new(name, vec![float("v1"), float("v2")], move |_, args| {
        op(expect_float(args, 0)?, expect_float(args, 1)?).map(Value::Float)
    })
    .returns(ValueType::Float, PortRange::Single)
}

fn numbers(values: &[Value]) -> Result<Vec<f64>, FunctionError> {
    values
        .iter()
        .map(|v| {
            to_float(v).ok_or_else(|| FunctionError::invalid(0, format!("{v} is not a number")))
        })
        .collect()
}

/// Evenly spaced values from `start` to `end`, both included.
pub fn sample(amount: i64, start: f64, end: f64) -> Vec<f64> {
    match amount {
        i64::MIN..=0 => Vec::new(),
        1 => vec![start + (end - start) / 2.0],
        _ => {
            let step = (end - start) / (amount - 1) as f64;
            (0..amount).map(|i| start + step * i as f64).collect()
        }
    }
}

pub fn library() -> FunctionLibrary {
    FunctionLibrary::new("math")
        .with_function(
            NativeFunction::new("number", vec![float("number")], |_, args| {
                Ok(Value::Float(expect_float(args, 0)?))
            })
            .returns(ValueType::Float, PortRange::Single),
        )
        .with_function(binary("add", |a, b| Ok(a + b)))
        .with_function(binary("subtract", |a, b| Ok(a - b)))
        .with_function(binary("multiply", |a, b| Ok(a * b)))
        .with_function(binary("divide", |a, b| {
            if b == 0.0 {
                Err(FunctionError::failed("division by zero"))
            } else {
                Ok(a / b)
            }
        }))
        .with_function(
            NativeFunction::new("negate", vec![float("value")], |_, args| {
                Ok(Value::Float(-expect_float(args, 0)?))
            })
            .returns(ValueType::Float, PortRange::Single),
        )
        .with_function(
            NativeFunction::new("sum", vec![float("values").list()], |_, args| {
                Ok(Value::Float(numbers(expect_list(args, 0)?)?.iter().sum()))
            })
            .returns(ValueType::Float, PortRange::Single),
        )
        .with_function(
            NativeFunction::new("average", vec![float("values").list()], |_, args| {
                let values = numbers(expect_list(args, 0)?)?;
                if values.is_empty() {
                    return Ok(Value::Float(0.0));
                }
                Ok(Value::Float(values.iter().sum::<f64>() / values.len() as f64))
            })
            .returns(ValueType::Float, PortRange::Single),
        )
        .with_function(
            NativeFunction::new(
                "makeNumbers",
                vec![
                    Argument::new("string", ValueType::String).with_default(""),
                    Argument::new("separator", ValueType::String).with_default(" "),
                ],
                |_, args| {
                    let text = expect_text(args, 0)?;
                    let separator = expect_text(args, 1)?;
                    if text.trim().is_empty() {
                        return Ok(Value::List(Vec::new()));
                    }
                    let parts: Vec<&str> = if separator.is_empty() {
                        text.split_whitespace().collect()
                    } else {
                        text.split(separator.as_str()).collect()
                    };
                    parts
                        .into_iter()
                        .map(|part| {
                            part.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                                FunctionError::invalid(0, format!("'{part}' is not a number"))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::List)
                },
            )
            .returns(ValueType::Float, PortRange::List),
        )
        .with_function(
            NativeFunction::new(
                "sample",
                vec![
                    Argument::new("amount", ValueType::Int).with_default(10i64),
                    float("start"),
                    float("end").with_default(100.0),
                ],
                |_, args| {
                    let amount = expect_int(args, 0)?;
                    Ok(Value::floats(sample(
                        amount,
                        expect_float(args, 1)?,
                        expect_float(args, 2)?,
                    )))
                },
            )
            .returns(ValueType::Float, PortRange::List),
        )
}
