//! Functions that record what they did, so tests can count invocations.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use plexus_api_core::coercion::expect_float;
use plexus_api_core::{Argument, FunctionLibrary, NativeFunction, PortRange, Value, ValueType};

/// State shared between a test and the `side-effects` library.
#[derive(Debug, Default)]
pub struct SideEffects {
    counter: AtomicUsize,
    output: AtomicU64,
}

impl SideEffects {
    pub fn new() -> Arc<Self> {
        Arc::new(SideEffects::default())
    }

    /// Invocations of `increaseAndCount` and `setNumber` so far.
    pub fn counter(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Last value passed to `setNumber`.
    pub fn output(&self) -> f64 {
        f64::from_bits(self.output.load(Ordering::SeqCst))
    }

    pub fn reset(&self) {
        self.counter.store(0, Ordering::SeqCst);
        self.output.store(0f64.to_bits(), Ordering::SeqCst);
    }

    fn bump(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn library(effects: Arc<SideEffects>) -> FunctionLibrary {
    let counting = effects.clone();
    let setting = effects.clone();
    FunctionLibrary::new("side-effects")
        .with_function(
            NativeFunction::new(
                "increaseAndCount",
                vec![Argument::new("number", ValueType::Float)],
                move |_, args| {
                    counting.bump();
                    Ok(Value::Float(expect_float(args, 0)? + 1.0))
                },
            )
            .returns(ValueType::Float, PortRange::Single),
        )
        .with_function(NativeFunction::new(
            "setNumber",
            vec![Argument::new("number", ValueType::Float)],
            move |_, args| {
                let number = expect_float(args, 0)?;
                setting.bump();
                setting.output.store(number.to_bits(), Ordering::SeqCst);
                Ok(Value::Null)
            },
        ))
        .with_function(
            NativeFunction::new("getNumber", vec![], move |_, _| Ok(Value::Float(effects.output())))
                .returns(ValueType::Float, PortRange::Single),
        )
}
