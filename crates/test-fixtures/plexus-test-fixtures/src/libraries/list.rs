use plexus_api_core::coercion::{expect_int, expect_list};
use plexus_api_core::{Argument, FunctionLibrary, NativeFunction, PortRange, Value, ValueType};

fn list(name: &str) -> Argument {
    Argument::new(name, ValueType::Any).list()
}

fn int(name: &str, default: i64) -> Argument {
    Argument::new(name, ValueType::Int).with_default(default)
}

pub fn library() -> FunctionLibrary {
    FunctionLibrary::new("list")
        .with_function(
            NativeFunction::new("count", vec![list("list")], |_, args| {
                Ok(Value::Int(expect_list(args, 0)?.len() as i64))
            })
            .returns(ValueType::Int, PortRange::Single),
        )
        .with_function(
            NativeFunction::new("first", vec![list("list")], |_, args| {
                Ok(expect_list(args, 0)?.first().cloned().unwrap_or_default())
            }),
        )
        .with_function(
            NativeFunction::new(
                "slice",
                vec![list("list"), int("start_index", 0), int("size", 1000)],
                |_, args| {
                    let items = expect_list(args, 0)?;
                    let start = expect_int(args, 1)?.max(0) as usize;
                    let size = expect_int(args, 2)?.max(0) as usize;
                    Ok(Value::List(items.iter().skip(start).take(size).cloned().collect()))
                },
            )
            .returns(ValueType::Any, PortRange::List),
        )
        .with_function(
            NativeFunction::new("reverse", vec![list("list")], |_, args| {
                Ok(Value::List(expect_list(args, 0)?.iter().rev().cloned().collect()))
            })
            .returns(ValueType::Any, PortRange::List),
        )
        .with_function(
            NativeFunction::new(
                "repeat",
                vec![Argument::new("value", ValueType::Any), int("amount", 1)],
                |_, args| {
                    let amount = expect_int(args, 1)?.max(0) as usize;
                    let value = args.first().cloned().unwrap_or_default();
                    Ok(Value::List(vec![value; amount]))
                },
            )
            .returns(ValueType::Any, PortRange::List),
        )
}
