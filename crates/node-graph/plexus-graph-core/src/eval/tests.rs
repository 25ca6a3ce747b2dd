//! Behavioural coverage for the evaluation pipeline.

use std::sync::Arc;

use super::*;
use crate::connection::Connection;
use crate::error::{GraphError, RenderError};
use crate::node::Node;
use crate::port::Port;
use crate::types::NodePath;
use plexus_api_core::{FunctionError, FunctionRepository, LookupError, PortRange, Value};
use plexus_test_fixtures::{repository, SideEffects};

fn node(repo: &FunctionRepository, function: &str, name: &str) -> Node {
    Node::for_function(repo, function)
        .expect("fixture function exists")
        .with_name(name)
}

fn number(repo: &FunctionRepository, name: &str, value: f64) -> Node {
    node(repo, "math/number", name)
        .with_input_value("number", value)
        .expect("number port")
}

fn numbers(repo: &FunctionRepository, name: &str, text: &str) -> Node {
    node(repo, "math/makeNumbers", name)
        .with_input_value("string", text)
        .expect("string port")
}

fn network(children: Vec<Node>, connections: &[(&str, &str, &str)]) -> Node {
    let mut net = Node::network("root");
    for child in children {
        net = net.with_child_added(child).expect("unique child");
    }
    for (output, input, port) in connections {
        net = net.connect(output, input, port).expect("valid connection");
    }
    net
}

fn floats(values: &[f64]) -> Value {
    Value::floats(values.iter().copied())
}

fn render_child(ctx: &mut NodeContext<'_>, net: &Node, child: &str) -> Result<Value, RenderError> {
    let child = net.child(child).expect("child exists").clone();
    ctx.render_child(net, &child)
}

// --- Single values -------------------------------------------------------

#[test]
fn it_should_render_a_single_value() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let value = ctx.render_node(&number(&repo, "number1", 5.0)).expect("render ok");
    assert_eq!(value, floats(&[5.0]));
}

#[test]
fn it_should_invoke_nodes_without_inputs_once() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo).with_frame(42.0);
    let frame = node(&repo, "core/frame", "frame1");
    assert_eq!(ctx.render_node(&frame).unwrap(), floats(&[42.0]));
}

#[test]
fn it_should_return_list_output_as_the_sequence() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let value = ctx.render_node(&numbers(&repo, "numbers1", "1 2 3")).unwrap();
    assert_eq!(value, floats(&[1.0, 2.0, 3.0]));
}

#[test]
fn it_should_drop_null_results() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![numbers(&repo, "threeNumbers", "1 2 3"), node(&repo, "test/makeNull", "makeNull")],
        &[("threeNumbers", "makeNull", "value")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(render_child(&mut ctx, &net, "makeNull").unwrap(), Value::List(vec![]));
}

// --- Broadcasting --------------------------------------------------------

#[test]
fn it_should_cycle_shorter_lists() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![
            numbers(&repo, "threeNumbers", "1 2 3"),
            numbers(&repo, "fiveNumbers", "100 200 300 400 500"),
            node(&repo, "math/add", "add"),
        ],
        &[("threeNumbers", "add", "v1"), ("fiveNumbers", "add", "v2")],
    );
    let mut ctx = NodeContext::new(&repo);
    let value = render_child(&mut ctx, &net, "add").unwrap();
    assert_eq!(value, floats(&[101.0, 202.0, 303.0, 401.0, 502.0]));
}

#[test]
fn it_should_reuse_literals_for_every_invocation() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let add = node(&repo, "math/add", "add1").with_input_value("v2", 100.0).unwrap();
    let net = network(
        vec![numbers(&repo, "makeNumbers1", "1 2 3"), add],
        &[("makeNumbers1", "add1", "v1")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(
        render_child(&mut ctx, &net, "add1").unwrap(),
        floats(&[101.0, 102.0, 103.0])
    );
}

#[test]
fn it_should_invoke_once_per_element() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![
            numbers(&repo, "makeNumbers1", "1 2 3"),
            node(&repo, "side-effects/increaseAndCount", "inc"),
        ],
        &[("makeNumbers1", "inc", "number")],
    );
    let mut ctx = NodeContext::new(&repo);
    render_child(&mut ctx, &net, "inc").unwrap();
    assert_eq!(effects.counter(), 3);
    assert_eq!(
        ctx.results(net.child("inc").unwrap()),
        Some(&floats(&[2.0, 3.0, 4.0]))
    );
}

#[test]
fn it_should_short_circuit_on_empty_upstream() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![
            numbers(&repo, "empty", ""),
            node(&repo, "side-effects/increaseAndCount", "inc"),
        ],
        &[("empty", "inc", "number")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(render_child(&mut ctx, &net, "inc").unwrap(), Value::List(vec![]));
    assert_eq!(effects.counter(), 0);
}

#[test]
fn it_should_hand_whole_lists_to_list_ports() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![numbers(&repo, "threeNumbers", "1 2 3"), node(&repo, "math/sum", "sum")],
        &[("threeNumbers", "sum", "values")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(render_child(&mut ctx, &net, "sum").unwrap(), floats(&[6.0]));
}

#[test]
fn it_should_invoke_list_ports_with_empty_upstream() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![numbers(&repo, "empty", ""), node(&repo, "math/sum", "sum")],
        &[("empty", "sum", "values")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(render_child(&mut ctx, &net, "sum").unwrap(), floats(&[0.0]));
}

#[test]
fn it_should_treat_list_port_literals_as_lists() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let sum = node(&repo, "math/sum", "sum");
    assert_eq!(ctx.render_node(&sum).unwrap(), floats(&[0.0]));
    let sum = sum.with_input_value("values", 3.0).unwrap();
    assert_eq!(ctx.render_node(&sum).unwrap(), floats(&[3.0]));
    let sum = sum.with_input_value("values", floats(&[1.0, 2.0])).unwrap();
    assert_eq!(ctx.render_node(&sum).unwrap(), floats(&[3.0]));
}

// --- Nested lists --------------------------------------------------------

fn nested_network(repo: &FunctionRepository, first: &str, second: &str) -> Node {
    let strings = |name: &str, text: &str| {
        node(repo, "string/makeStrings", name)
            .with_input_value("string", text)
            .unwrap()
    };
    let parse = |name: &str| {
        node(repo, "math/makeNumbers", name)
            .with_input_value("separator", ",")
            .unwrap()
    };
    let calculate = node(repo, "test/calculateMultipleArgs", "calculateMultiple")
        .with_input_value("v2", 6.0)
        .and_then(|n| n.with_input_value("v4", 7.0))
        .unwrap();
    network(
        vec![
            strings("makeStrings1", first),
            strings("makeStrings2", second),
            parse("makeNumbers1"),
            parse("makeNumbers2"),
            calculate,
        ],
        &[
            ("makeStrings1", "makeNumbers1", "string"),
            ("makeStrings2", "makeNumbers2", "string"),
            ("makeNumbers1", "calculateMultiple", "v1"),
            ("makeNumbers2", "calculateMultiple", "v3"),
        ],
    )
    .with_rendered_child("calculateMultiple")
    .unwrap()
}

#[test]
fn it_should_keep_one_list_per_upstream_invocation() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let strings = node(&repo, "string/makeStrings", "makeStrings")
        .with_input_value("string", "1,2;3,4;5,6")
        .unwrap();
    let parse = node(&repo, "math/makeNumbers", "makeNumbers")
        .with_input_value("separator", ",")
        .unwrap();
    let net = network(vec![strings, parse], &[("makeStrings", "makeNumbers", "string")])
        .with_rendered_child("makeNumbers")
        .unwrap();
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(
        ctx.render_network(&net).unwrap(),
        Value::List(vec![floats(&[1.0, 2.0]), floats(&[3.0, 4.0]), floats(&[5.0, 6.0])])
    );
}

#[test]
fn it_should_broadcast_flat_lists() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let value = ctx.render_network(&nested_network(&repo, "3,4", "2,3,4")).unwrap();
    assert_eq!(value, floats(&[22.0, 29.0, 34.0]));
}

#[test]
fn it_should_map_one_nesting_level() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let value = ctx.render_network(&nested_network(&repo, "3,4;1,8", "2,3,4")).unwrap();
    assert_eq!(
        value,
        Value::List(vec![floats(&[22.0, 29.0, 34.0]), floats(&[20.0, 33.0, 32.0])])
    );
}

#[test]
fn it_should_map_two_nesting_levels() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let value = ctx
        .render_network(&nested_network(&repo, "3,4;1,8", "1,2;2,3,4"))
        .unwrap();
    assert_eq!(
        value,
        Value::List(vec![
            Value::List(vec![floats(&[16.0, 23.0]), floats(&[22.0, 29.0, 34.0])]),
            Value::List(vec![floats(&[14.0, 27.0]), floats(&[20.0, 33.0, 32.0])]),
        ])
    );
}

#[test]
fn it_should_pass_nested_lists_to_list_ports_one_list_at_a_time() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let sample = |name: &str, amount: i64, start: f64, end: f64| {
        node(&repo, "math/sample", name)
            .with_input_value("amount", amount)
            .and_then(|n| n.with_input_value("start", start))
            .and_then(|n| n.with_input_value("end", end))
            .unwrap()
    };
    let net = network(
        vec![
            sample("sample1", 4, 3.0, 9.0),
            sample("sample2", 4, 9.0, 24.0),
            sample("sample3", 4, 0.0, 0.0),
        ],
        &[("sample1", "sample3", "start"), ("sample2", "sample3", "end")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(
        render_child(&mut ctx, &net, "sample3").unwrap(),
        Value::List(vec![
            floats(&[3.0, 5.0, 7.0, 9.0]),
            floats(&[5.0, 8.0, 11.0, 14.0]),
            floats(&[7.0, 11.0, 15.0, 19.0]),
            floats(&[9.0, 14.0, 19.0, 24.0]),
        ])
    );

    let slice = node(&repo, "list/slice", "slice")
        .with_input_value("start_index", 1i64)
        .unwrap();
    let net = net
        .with_child_added(slice)
        .and_then(|n| n.with_child_added(sample("sample4", 2, 2.0, 3.0)))
        .and_then(|n| n.connect("sample3", "slice", "list"))
        .and_then(|n| n.connect("sample4", "slice", "size"))
        .unwrap();
    assert_eq!(
        render_child(&mut ctx, &net, "slice").unwrap(),
        Value::List(vec![
            floats(&[5.0, 7.0]),
            floats(&[8.0, 11.0, 14.0]),
            floats(&[11.0, 15.0]),
            floats(&[14.0, 19.0, 24.0]),
        ])
    );
}

#[test]
fn it_should_map_scalar_functions_over_nested_words() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![
            node(&repo, "test/makeNestedWords", "words"),
            node(&repo, "string/changeCase", "upper"),
        ],
        &[("words", "upper", "value")],
    );
    let mut ctx = NodeContext::new(&repo);
    let value = render_child(&mut ctx, &net, "upper").unwrap();
    let row = |p: &str| {
        Value::List(
            ["A", "B", "C"]
                .iter()
                .map(|s| Value::Text(format!("{p}-{s}")))
                .collect(),
        )
    };
    assert_eq!(value, Value::List(vec![row("A"), row("B"), row("C")]));
}

// --- Memoization ---------------------------------------------------------

#[test]
fn it_should_render_shared_upstream_once() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![
            number(&repo, "number1", 42.0),
            node(&repo, "side-effects/increaseAndCount", "inc"),
            node(&repo, "math/add", "add"),
        ],
        &[("number1", "inc", "number"), ("inc", "add", "v1"), ("inc", "add", "v2")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(render_child(&mut ctx, &net, "add").unwrap(), floats(&[86.0]));
    assert_eq!(effects.counter(), 1);
}

#[test]
fn it_should_expose_results_of_the_last_render_only() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![
            number(&repo, "number1", 1.0),
            number(&repo, "number2", 2.0),
            node(&repo, "math/negate", "negate"),
        ],
        &[("number1", "negate", "value")],
    );
    let mut ctx = NodeContext::new(&repo);
    render_child(&mut ctx, &net, "negate").unwrap();
    assert_eq!(ctx.results(net.child("number1").unwrap()), Some(&floats(&[1.0])));
    assert_eq!(ctx.results(net.child("number2").unwrap()), None);
    let order: Vec<String> = ctx.results_map().keys().map(|p| p.to_string()).collect();
    assert_eq!(order, vec!["/number1", "/negate"]);

    render_child(&mut ctx, &net, "number2").unwrap();
    assert_eq!(ctx.results(net.child("number1").unwrap()), None);
    assert_eq!(ctx.results_map().len(), 1);
}

#[test]
fn it_should_not_reuse_results_across_calls() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let inc = node(&repo, "side-effects/increaseAndCount", "inc");
    let mut ctx = NodeContext::new(&repo);
    ctx.render_node(&inc).unwrap();
    ctx.render_node(&inc).unwrap();
    assert_eq!(effects.counter(), 2);
}

// --- Networks ------------------------------------------------------------

#[test]
fn it_should_render_empty_networks_as_empty() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let empty = Node::network("empty");
    assert_eq!(ctx.render_node(&empty).unwrap(), Value::List(vec![]));
    let err = ctx.render_network(&empty).unwrap_err();
    assert!(matches!(err, RenderError::NothingToRender { .. }));
}

#[test]
fn it_should_render_network_nodes_through_their_rendered_child() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![number(&repo, "number1", 3.0), node(&repo, "math/negate", "negate")],
        &[("number1", "negate", "value")],
    )
    .with_rendered_child("negate")
    .unwrap();
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(ctx.render_node(&net).unwrap(), floats(&[-3.0]));
    let inner = NodePath::parse("/root/negate");
    assert_eq!(ctx.results_at(&inner), Some(&floats(&[-3.0])));
    assert_eq!(ctx.results(&net), Some(&floats(&[-3.0])));
}

#[test]
fn it_should_reject_children_of_other_networks() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(vec![number(&repo, "number1", 3.0)], &[]);
    let stranger = number(&repo, "number9", 1.0);
    let mut ctx = NodeContext::new(&repo);
    let err = ctx.render_child(&net, &stranger).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Graph(GraphError::ChildNotFound { .. })
    ));
}

// --- Errors --------------------------------------------------------------

#[test]
fn it_should_report_unresolvable_functions() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::new(&repo);
    let ghost = Node::new("ghost").with_function("math/nope");
    match ctx.render_node(&ghost) {
        Err(RenderError::Resolution { path, function, source }) => {
            assert_eq!(path.to_string(), "/ghost");
            assert_eq!(function, "math/nope");
            assert!(matches!(source, LookupError::UnknownFunction { .. }));
        }
        other => panic!("expected resolution error, got {other:?}"),
    }
    let bare = Node::new("bare");
    assert!(matches!(
        ctx.render_node(&bare),
        Err(RenderError::MissingFunction { .. })
    ));
}

#[test]
fn it_should_check_arity_before_invoking() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let inc = node(&repo, "side-effects/increaseAndCount", "inc")
        .with_input(Port::float("extra", 0.0))
        .unwrap();
    let mut ctx = NodeContext::new(&repo);
    let err = ctx.render_node(&inc).unwrap_err();
    assert!(matches!(
        err,
        RenderError::ArityMismatch { expected: 1, found: 2, .. }
    ));
    assert_eq!(effects.counter(), 0);
}

#[test]
fn it_should_keep_upstream_results_when_a_node_fails() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![number(&repo, "number1", 4.0), node(&repo, "test/fail", "fail1")],
        &[("number1", "fail1", "value")],
    );
    let mut ctx = NodeContext::new(&repo);
    match render_child(&mut ctx, &net, "fail1") {
        Err(RenderError::Invocation { path, function, source }) => {
            assert_eq!(path, NodePath::parse("/fail1"));
            assert_eq!(function, "test/fail");
            assert!(matches!(source, FunctionError::Failed(_)));
        }
        other => panic!("expected invocation error, got {other:?}"),
    }
    assert_eq!(ctx.results_at(&NodePath::parse("/number1")), Some(&floats(&[4.0])));
    assert_eq!(ctx.results_at(&NodePath::parse("/fail1")), None);
}

#[test]
fn it_should_detect_cycles_in_unchecked_graphs() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut net = network(
        vec![node(&repo, "math/negate", "a"), node(&repo, "math/negate", "b")],
        &[("a", "b", "value")],
    );
    net.connections.push(Connection::new("b", "a", "value"));
    let mut ctx = NodeContext::new(&repo);
    let err = render_child(&mut ctx, &net, "b").unwrap_err();
    assert!(matches!(err, RenderError::Cycle { .. }));
}

// --- Context, overrides & clamping ---------------------------------------

#[test]
fn it_should_expose_data_to_functions() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let read = node(&repo, "test/readData", "read")
        .with_input_value("key", "seed")
        .unwrap();
    let mut ctx = NodeContext::new(&repo).with_data("seed", Value::Int(7));
    assert_eq!(ctx.render_node(&read).unwrap(), Value::List(vec![Value::Int(7)]));
}

#[test]
fn it_should_apply_port_overrides() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let net = network(
        vec![
            number(&repo, "number1", 5.0),
            number(&repo, "number3", 3.0),
            node(&repo, "math/add", "add"),
        ],
        &[("number1", "add", "v1"), ("number3", "add", "v2")],
    )
    .with_rendered_child("add")
    .unwrap();
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(ctx.render_network(&net).unwrap(), floats(&[8.0]));
    let mut ctx = NodeContext::new(&repo).with_override("number3.number", Value::Float(10.0));
    assert_eq!(ctx.render_network(&net).unwrap(), floats(&[15.0]));
}

#[test]
fn it_should_clamp_literal_and_connected_values() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let negate = node(&repo, "math/negate", "negate")
        .with_input_changed(
            "value",
            Port::float("value", 25.0).with_bounds(None, Some(10.0)),
        )
        .unwrap();
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(ctx.render_node(&negate).unwrap(), floats(&[-10.0]));

    let net = network(
        vec![number(&repo, "number1", 25.0), negate],
        &[("number1", "negate", "value")],
    );
    assert_eq!(render_child(&mut ctx, &net, "negate").unwrap(), floats(&[-10.0]));
}

#[test]
fn it_should_read_render_options_with_defaults() {
    let raw = r#"{ "overrides": { "number1.number": { "type": "float", "data": 2.0 } } }"#;
    let options: RenderOptions = serde_json::from_str(raw).expect("options parse");
    assert_eq!(options.frame, 1.0);
    assert!(options.data.is_empty());

    let effects = SideEffects::new();
    let repo = repository(&effects);
    let mut ctx = NodeContext::with_options(&repo, options);
    assert_eq!(ctx.frame(), 1.0);
    let net = network(vec![number(&repo, "number1", 9.0)], &[]);
    assert_eq!(render_child(&mut ctx, &net, "number1").unwrap(), floats(&[2.0]));
}

#[test]
fn it_should_keep_list_outputs_of_list_ports_flat() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let reverse = node(&repo, "list/reverse", "reverse");
    assert_eq!(reverse.output_range(), PortRange::List);
    let net = network(
        vec![numbers(&repo, "threeNumbers", "1 2 3"), reverse],
        &[("threeNumbers", "reverse", "list")],
    );
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(
        render_child(&mut ctx, &net, "reverse").unwrap(),
        floats(&[3.0, 2.0, 1.0])
    );
}

#[test]
fn it_should_share_repository_state_explicitly() {
    let effects = SideEffects::new();
    let repo = repository(&effects);
    let set = node(&repo, "side-effects/setNumber", "set")
        .with_input_value("number", 42.0)
        .unwrap();
    let mut ctx = NodeContext::new(&repo);
    assert_eq!(ctx.render_node(&set).unwrap(), Value::List(vec![]));
    assert_eq!(effects.output(), 42.0);
    let get = node(&repo, "side-effects/getNumber", "get");
    assert_eq!(ctx.render_node(&get).unwrap(), floats(&[42.0]));
    assert!(Arc::strong_count(&effects) > 1);
}
