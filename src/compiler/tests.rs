//! Unit tests for lowering.
//!
//! These tests run the lowering pass against the recording backend and cover:
//! - Arithmetic and comparison results
//! - Shadow and restore of `var` bindings, on success and on failure
//! - Calls, externs, redefinitions and prototype mismatches
//! - Determinism of the emitted operation sequence

use crate::{
    ast::{
        ast::Expr,
        declarations::{FunctionDef, Prototype, TopLevelItem},
    },
    errors::errors::ErrorImpl,
    parser::{expr::parse_expr, parser::Parser},
};

use super::{
    backend::Backend,
    compiler::Compiler,
    trace::{Op, SlotId, TraceBackend},
};

fn expression(source: &str) -> Expr {
    let mut parser = Parser::from_source(source, None);
    parse_expr(&mut parser).unwrap()
}

fn definition(source: &str) -> FunctionDef {
    let mut parser = Parser::from_source(source, None);
    match parser.next_top_level_item().unwrap() {
        TopLevelItem::Definition(function) => function,
        other => panic!("expected a definition, found {:?}", other),
    }
}

fn evaluate(source: &str) -> Option<f64> {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    compiler.lower_top_level_expr(expression(source)).unwrap();

    backend.returned_value("__anon_expr0")
}

/// Opens a body for a scratch function so expressions can be lowered directly.
fn open_scratch_function(compiler: &mut Compiler<'_, TraceBackend>) {
    let proto = Prototype::new("scratch", &[]);
    let function = compiler.backend.declare_function(&proto).unwrap();
    compiler.backend.begin_function_body(&function, &proto).unwrap();
}

#[test]
fn test_lower_arithmetic() {
    assert_eq!(evaluate("1+2*3"), Some(7.0));
    assert_eq!(evaluate("(1+2)*3"), Some(9.0));
}

#[test]
fn test_subtraction_is_left_associative() {
    assert_eq!(evaluate("8-4-2"), Some(2.0));
}

#[test]
fn test_less_than_yields_number() {
    assert_eq!(evaluate("1 < 2"), Some(1.0));
    assert_eq!(evaluate("2 < 1"), Some(0.0));
    assert_eq!(evaluate("(1 < 2) + (3 < 4)"), Some(2.0));
}

#[test]
fn test_less_than_emits_compare_then_convert() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    compiler.lower_top_level_expr(expression("1 < 2")).unwrap();

    let ops = backend.get_ops();
    let compare = ops
        .iter()
        .position(|op| matches!(op, Op::CompareLessThan { .. }))
        .unwrap();
    assert!(matches!(ops[compare + 1], Op::BoolToNumber { .. }));
}

#[test]
fn test_var_block_sees_earlier_bindings() {
    assert_eq!(evaluate("var x = 1, y = x+1 in x+y"), Some(3.0));
}

#[test]
fn test_var_without_initializer_is_zero() {
    assert_eq!(evaluate("var a in a + 5"), Some(5.0));
}

#[test]
fn test_var_initializer_sees_outer_binding() {
    // The inner x is initialised from the outer x before it shadows it
    assert_eq!(evaluate("var x = 2 in var x = x * 10 in x + 1"), Some(21.0));
    assert_eq!(evaluate("var x = 2 in (var x = 7 in x) + x"), Some(9.0));
}

#[test]
fn test_self_referential_initializer_without_outer_binding() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    let error = compiler
        .lower_top_level_expr(expression("var x = x in x"))
        .unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnknownVariable {
            name: "x".to_string()
        }
    );
}

#[test]
fn test_var_block_restores_environment() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    open_scratch_function(&mut compiler);

    let outer = compiler.backend.allocate_local("x").unwrap();
    compiler.bind_variable("x".to_string(), outer);

    compiler
        .lower_expr(&expression("var x = 1, y = x+1 in x+y"))
        .unwrap();

    assert_eq!(compiler.lookup_variable("x"), Some(&outer));
    assert_eq!(compiler.lookup_variable("y"), None);
}

#[test]
fn test_var_block_restores_environment_on_failure() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    open_scratch_function(&mut compiler);

    let outer = compiler.backend.allocate_local("a").unwrap();
    compiler.bind_variable("a".to_string(), outer);

    let error = compiler
        .lower_expr(&expression("var a = 1, b = 2 in a + missing"))
        .unwrap_err();
    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::UnknownVariable { .. }
    ));

    assert_eq!(compiler.lookup_variable("a"), Some(&outer));
    assert_eq!(compiler.lookup_variable("b"), None);
}

#[test]
fn test_failing_initializer_restores_earlier_bindings() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    open_scratch_function(&mut compiler);

    let result = compiler.lower_expr(&expression("var a = 1, b = nope in b"));

    assert!(result.is_err());
    assert!(compiler.environment_is_empty());
}

#[test]
fn test_duplicate_names_in_one_block_restore_in_reverse() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    open_scratch_function(&mut compiler);

    compiler
        .lower_expr(&expression("var x = 1, x = x + 1 in x"))
        .unwrap();

    assert!(compiler.environment_is_empty());
}

#[test]
fn test_environment_is_empty_after_top_level_constructs() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler
        .lower_function(&definition("def f(a b) var c = a in c * b"))
        .unwrap();
    assert!(compiler.environment_is_empty());

    compiler
        .lower_top_level_expr(expression("var x = 1, y = x+1 in x+y"))
        .unwrap();
    assert!(compiler.environment_is_empty());
}

#[test]
fn test_unknown_variable() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    let error = compiler.lower_top_level_expr(expression("q + 1")).unwrap_err();

    assert!(error.to_string().starts_with("unknown variable name"));
    assert!(error.is_lowering_error());
}

#[test]
fn test_left_operand_failure_skips_right() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    let result = compiler.lower_top_level_expr(expression("q + 2 * 3"));
    assert!(result.is_err());

    assert!(!backend
        .get_ops()
        .iter()
        .any(|op| matches!(op, Op::Constant { .. } | Op::Mul { .. })));
}

#[test]
fn test_invalid_binary_operator() {
    let mut parser = Parser::from_source("4 / 2", None);
    parser.install_binary_operator('/', 40);
    let expr = parse_expr(&mut parser).unwrap();

    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    let error = compiler.lower_top_level_expr(expr).unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::InvalidBinaryOperator { operator: '/' }
    );
    assert!(error.to_string().starts_with("invalid binary operator"));
}

#[test]
fn test_call_extern() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler
        .lower_prototype(&Prototype::new("sin", &["x"]))
        .unwrap();
    compiler
        .lower_top_level_expr(expression("sin(1) + 2"))
        .unwrap();

    assert!(backend
        .get_ops()
        .iter()
        .any(|op| matches!(
            op,
            Op::Call { function, args, .. } if function == "sin" && args.len() == 1
        )));
    // Call results are not folded
    assert_eq!(backend.returned_value("__anon_expr0"), None);
}

#[test]
fn test_call_unknown_function() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    let error = compiler.lower_top_level_expr(expression("f(1)")).unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnknownFunction {
            name: "f".to_string()
        }
    );
}

#[test]
fn test_call_argument_count_mismatch() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    compiler
        .lower_function(&definition("def add(a b) a + b"))
        .unwrap();

    let error = compiler
        .lower_top_level_expr(expression("add(1)"))
        .unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::IncorrectArgumentCount {
            function: "add".to_string(),
            expected: 2,
            received: 1,
        }
    );
}

#[test]
fn test_recursive_call() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler
        .lower_function(&definition("def f(n) f(n - 1)"))
        .unwrap();
    assert!(compiler.get_backend().has_body(&compiler.backend.lookup_function("f").unwrap()));
}

#[test]
fn test_extern_then_mismatched_def() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler.lower_prototype(&Prototype::new("f", &["a"])).unwrap();
    let error = compiler
        .lower_function(&definition("def f(a b) a + b"))
        .unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::PrototypeMismatch {
            function: "f".to_string(),
            expected: 1,
            received: 2,
        }
    );
    // The extern declaration survives
    assert!(compiler.backend.lookup_function("f").is_some());
}

#[test]
fn test_def_then_mismatched_extern() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler.lower_function(&definition("def g(x) x")).unwrap();
    let error = compiler
        .lower_prototype(&Prototype::new("g", &[]))
        .unwrap_err();

    assert!(matches!(
        error.get_internal_error(),
        ErrorImpl::PrototypeMismatch { .. }
    ));
}

#[test]
fn test_extern_then_def_uses_definition_names() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    let declared = compiler.lower_prototype(&Prototype::new("h", &["a"])).unwrap();
    let defined = compiler.lower_function(&definition("def h(z) z * 2")).unwrap();

    assert_eq!(declared, defined);
    assert!(backend
        .get_ops()
        .iter()
        .any(|op| matches!(op, Op::Param { name, .. } if name == "z")));
}

#[test]
fn test_redefinition() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler.lower_function(&definition("def k() 1")).unwrap();
    let error = compiler.lower_function(&definition("def k() 2")).unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::FunctionRedefinition {
            function: "k".to_string()
        }
    );
    assert_eq!(backend.returned_value("k"), Some(1.0));
}

#[test]
fn test_failed_body_discards_function() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    assert!(compiler.lower_function(&definition("def f(x) y")).is_err());
    assert!(compiler.backend.lookup_function("f").is_none());
    assert!(compiler.environment_is_empty());

    compiler.lower_function(&definition("def f(x) x")).unwrap();
    assert_eq!(backend.function_names(), vec!["f".to_string()]);
    assert!(backend
        .get_ops()
        .iter()
        .any(|op| matches!(op, Op::Discard { function } if function == "f")));
}

#[test]
fn test_parameters_are_stored_in_slots() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);
    compiler.lower_function(&definition("def id(x) x")).unwrap();

    let ops = backend.get_ops();
    assert!(matches!(&ops[0], Op::Declare { function, .. } if function == "id"));
    assert!(matches!(&ops[1], Op::BeginBody { function } if function == "id"));
    assert!(matches!(&ops[2], Op::Param { name, .. } if name == "x"));
    assert!(matches!(&ops[3], Op::Alloca { slot: SlotId(0), name } if name == "x"));
    assert!(matches!(&ops[4], Op::Store { slot: SlotId(0), .. }));
    assert!(matches!(&ops[5], Op::Load { slot: SlotId(0), .. }));
    assert!(matches!(&ops[6], Op::Return { function, .. } if function == "id"));
}

#[test]
fn test_top_level_expressions_get_fresh_names() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler.lower_top_level_expr(expression("1")).unwrap();
    compiler.lower_top_level_expr(expression("2")).unwrap();

    assert_eq!(backend.returned_value("__anon_expr0"), Some(1.0));
    assert_eq!(backend.returned_value("__anon_expr1"), Some(2.0));
}

#[test]
fn test_lowering_is_deterministic() {
    let function = definition("def f(a b) var c = a * b, d in c - d + (a < b)");

    let mut first = TraceBackend::new();
    Compiler::new(&mut first).lower_function(&function).unwrap();

    let mut second = TraceBackend::new();
    Compiler::new(&mut second).lower_function(&function).unwrap();

    assert_eq!(first.get_ops(), second.get_ops());
    assert!(!first.get_ops().is_empty());
}

#[test]
fn test_failed_body_keeps_extern_declaration() {
    let mut backend = TraceBackend::new();
    let mut compiler = Compiler::new(&mut backend);

    compiler.lower_prototype(&Prototype::new("f", &["x"])).unwrap();
    compiler.lower_function(&definition("def g(x) f(x)")).unwrap();
    assert!(compiler.lower_function(&definition("def f(x) y")).is_err());

    let f = compiler.backend.lookup_function("f").unwrap();
    assert!(!compiler.get_backend().has_body(&f));
    assert_eq!(compiler.get_backend().param_count(&f), 1);
    assert!(compiler.environment_is_empty());

    // The declaration can still be completed by a later definition
    compiler.lower_function(&definition("def f(x) x + 1")).unwrap();
    assert!(compiler.get_backend().has_body(&f));

    assert_eq!(backend.function_names(), vec!["f", "g"]);
    assert!(backend
        .get_ops()
        .iter()
        .any(|op| matches!(op, Op::DiscardBody { function } if function == "f")));
    assert!(!backend
        .get_ops()
        .iter()
        .any(|op| matches!(op, Op::Discard { .. })));
}
