use plexus_api_core::coercion::expect_text;
use plexus_api_core::{
    Argument, FunctionError, FunctionLibrary, NativeFunction, PortRange, Value, ValueType,
};

fn text(name: &str) -> Argument {
    Argument::new(name, ValueType::String)
}

pub fn library() -> FunctionLibrary {
    FunctionLibrary::new("string")
        .with_function(
            NativeFunction::new("string", vec![text("value")], |_, args| {
                Ok(Value::Text(expect_text(args, 0)?))
            })
            .returns(ValueType::String, PortRange::Single),
        )
        .with_function(
            NativeFunction::new(
                "makeStrings",
                vec![
                    text("string").with_default("Alpha;Beta;Gamma"),
                    text("sep").with_default(";"),
                ],
                |_, args| {
                    let string = expect_text(args, 0)?;
                    let sep = expect_text(args, 1)?;
                    let parts: Vec<Value> = if sep.is_empty() {
                        string.chars().map(|c| Value::Text(c.to_string())).collect()
                    } else {
                        string.split(sep.as_str()).map(Value::from).collect()
                    };
                    Ok(Value::List(parts))
                },
            )
            .returns(ValueType::String, PortRange::List),
        )
        .with_function(
            NativeFunction::new("length", vec![text("string")], |_, args| {
                Ok(Value::Int(expect_text(args, 0)?.chars().count() as i64))
            })
            .returns(ValueType::Int, PortRange::Single),
        )
        .with_function(
            NativeFunction::new(
                "changeCase",
                vec![text("value"), text("method").with_default("uppercase")],
                |_, args| {
                    let value = expect_text(args, 0)?;
                    match expect_text(args, 1)?.as_str() {
                        "uppercase" => Ok(Value::Text(value.to_uppercase())),
                        "lowercase" => Ok(Value::Text(value.to_lowercase())),
                        other => Err(FunctionError::invalid(1, format!("unknown case '{other}'"))),
                    }
                },
            )
            .returns(ValueType::String, PortRange::Single),
        )
}
