//! Integration tests for the Monkey bytecode VM.
//!
//! Bytecode is assembled by hand with `code::make` (the compiler is an
//! external collaborator). Comments give the source each program stands for.
//!
//! Covers:
//! - stack discipline, last popped value, overflow and underflow
//! - arithmetic, strings, comparisons and prefix operators
//! - conditional jumps and globals
//! - arrays, hashes and indexing
//! - malformed bytecode
//! - agreement with the tree-walking evaluator

use monkey_ast::{Expression, InfixOperator};
use monkey_eval::eval;
use monkey_object::{Env, RuntimeError, Type, Value, FALSE, NULL, TRUE};
use monkey_vm::{make, Bytecode, Instructions, Opcode, Vm, VmConfig, VmError};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn op(opcode: Opcode) -> Vec<u8> {
    make(opcode, &[])
}

fn constant(index: usize) -> Vec<u8> {
    make(Opcode::Constant, &[index])
}

fn bytecode(constants: Vec<Value>, parts: Vec<Vec<u8>>) -> Bytecode {
    Bytecode::new(Instructions::concat(parts), constants)
}

/// Run to completion, panicking on failure.
fn run(constants: Vec<Value>, parts: Vec<Vec<u8>>) -> Vm {
    init_tracing();
    let mut vm = Vm::new(bytecode(constants, parts));
    if let Err(err) = vm.run() {
        panic!("vm error: {err}");
    }
    vm
}

fn run_err(constants: Vec<Value>, parts: Vec<Vec<u8>>) -> VmError {
    init_tracing();
    let mut vm = Vm::new(bytecode(constants, parts));
    match vm.run() {
        Ok(()) => panic!("expected an error, stack top is {:?}", vm.stack_top()),
        Err(err) => err,
    }
}

/// Run a program that ends in `OpPop` and return the popped value.
fn result(constants: Vec<Value>, parts: Vec<Vec<u8>>) -> Value {
    let vm = run(constants, parts);
    assert_eq!(vm.sp(), 0, "stack should be empty after the final pop");
    vm.last_popped_stack_elem().cloned().unwrap_or(NULL)
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Integer).collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// Stack discipline
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_add_leaves_empty_stack_and_last_popped() {
    // 1 + 2
    let vm = run(
        ints(&[1, 2, 3, 4]),
        vec![constant(0), constant(1), op(Opcode::Add), op(Opcode::Pop)],
    );
    assert_eq!(vm.sp(), 0);
    assert_eq!(vm.stack_top(), None);
    assert_eq!(vm.last_popped_stack_elem(), Some(&Value::Integer(3)));
}

#[test]
fn test_stack_top_without_pop() {
    let vm = run(ints(&[7, 8]), vec![constant(0), constant(1)]);
    assert_eq!(vm.sp(), 2);
    assert_eq!(vm.stack_top(), Some(&Value::Integer(8)));
}

#[test]
fn test_stack_overflow() {
    let code = bytecode(ints(&[1]), vec![constant(0), constant(0), constant(0)]);
    let mut vm = Vm::with_config(
        code,
        VmConfig {
            stack_size: 2,
            ..VmConfig::default()
        },
    );
    assert_eq!(vm.run(), Err(VmError::StackOverflow));
    // Everything pushed before the failing push is still there.
    assert_eq!(vm.sp(), 2);
    assert_eq!(vm.stack_top(), Some(&Value::Integer(1)));
}

#[test]
fn test_stack_underflow() {
    assert_eq!(run_err(vec![], vec![op(Opcode::Pop)]), VmError::StackUnderflow);
    assert_eq!(
        run_err(ints(&[1]), vec![constant(0), op(Opcode::Add)]),
        VmError::StackUnderflow
    );
}

#[test]
fn test_empty_program() {
    let vm = run(vec![], vec![]);
    assert_eq!(vm.sp(), 0);
}

// ══════════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_integer_arithmetic_operand_order() {
    // 5 - 2
    let sub = result(ints(&[5, 2]), vec![constant(0), constant(1), op(Opcode::Sub), op(Opcode::Pop)]);
    assert_eq!(sub, Value::Integer(3));
    // 10 / 3
    let div = result(ints(&[10, 3]), vec![constant(0), constant(1), op(Opcode::Div), op(Opcode::Pop)]);
    assert_eq!(div, Value::Integer(3));
    // 2 * 3
    let mul = result(ints(&[2, 3]), vec![constant(0), constant(1), op(Opcode::Mul), op(Opcode::Pop)]);
    assert_eq!(mul, Value::Integer(6));
}

#[test]
fn test_division_by_zero() {
    let err = run_err(ints(&[1, 0]), vec![constant(0), constant(1), op(Opcode::Div)]);
    assert_eq!(err, VmError::Runtime(RuntimeError::DivisionByZero));
    assert_eq!(err.to_string(), "division by zero");
}

#[test]
fn test_string_concatenation() {
    // "mon" + "key"
    let value = result(
        vec![Value::from("mon"), Value::from("key")],
        vec![constant(0), constant(1), op(Opcode::Add), op(Opcode::Pop)],
    );
    assert_eq!(value, Value::from("monkey"));
}

#[test]
fn test_type_mismatch() {
    // 1 + true
    let err = run_err(ints(&[1]), vec![constant(0), op(Opcode::True), op(Opcode::Add)]);
    assert_eq!(
        err,
        VmError::Runtime(RuntimeError::TypeMismatch {
            left: Type::Integer,
            op: "+",
            right: Type::Boolean,
        })
    );
    assert_eq!(err.to_string(), "type mismatch: INTEGER + BOOLEAN");
}

#[test]
fn test_comparisons() {
    let cases = vec![
        // 2 > 1
        (vec![constant(1), constant(0), op(Opcode::GreaterThan)], TRUE),
        // 1 > 2
        (vec![constant(0), constant(1), op(Opcode::GreaterThan)], FALSE),
        // 1 == 1
        (vec![constant(0), constant(0), op(Opcode::Equal)], TRUE),
        // 1 != 2
        (vec![constant(0), constant(1), op(Opcode::NotEqual)], TRUE),
        // true == false
        (vec![op(Opcode::True), op(Opcode::False), op(Opcode::Equal)], FALSE),
        // null == null
        (vec![op(Opcode::Null), op(Opcode::Null), op(Opcode::Equal)], TRUE),
        // 1 == true
        (vec![constant(0), op(Opcode::True), op(Opcode::Equal)], FALSE),
    ];
    for (mut parts, expected) in cases {
        parts.push(op(Opcode::Pop));
        assert_eq!(result(ints(&[1, 2]), parts), expected);
    }
}

#[test]
fn test_prefix_operators() {
    // -5
    let neg = result(ints(&[5]), vec![constant(0), op(Opcode::Minus), op(Opcode::Pop)]);
    assert_eq!(neg, Value::Integer(-5));
    // !0
    let not_zero = result(ints(&[0]), vec![constant(0), op(Opcode::Bang), op(Opcode::Pop)]);
    assert_eq!(not_zero, FALSE);
    // !null
    let not_null = result(vec![], vec![op(Opcode::Null), op(Opcode::Bang), op(Opcode::Pop)]);
    assert_eq!(not_null, TRUE);
    // -true
    let err = run_err(vec![], vec![op(Opcode::True), op(Opcode::Minus)]);
    assert_eq!(err.to_string(), "unknown operator: -BOOLEAN");
}

// ══════════════════════════════════════════════════════════════════════════════
// Control flow and globals
// ══════════════════════════════════════════════════════════════════════════════

/// `if (<condition>) { 10 } else { 20 }` with constants `[10, 20, ...]`.
fn conditional(condition: Vec<u8>) -> Vec<Vec<u8>> {
    let c = condition.len();
    vec![
        condition,
        make(Opcode::JumpNotTruthy, &[c + 9]),
        constant(0),
        make(Opcode::Jump, &[c + 12]),
        constant(1),
        op(Opcode::Pop),
    ]
}

#[test]
fn test_conditional_jumps() {
    let consts = || ints(&[10, 20, 0, 1]);
    assert_eq!(result(consts(), conditional(op(Opcode::True))), Value::Integer(10));
    assert_eq!(result(consts(), conditional(op(Opcode::False))), Value::Integer(20));
    assert_eq!(result(consts(), conditional(op(Opcode::Null))), Value::Integer(20));
    // Conditions treat non-positive integers as falsy.
    assert_eq!(result(consts(), conditional(constant(2))), Value::Integer(20));
    assert_eq!(result(consts(), conditional(constant(3))), Value::Integer(10));
}

#[test]
fn test_jump_out_of_range() {
    let err = run_err(vec![], vec![make(Opcode::Jump, &[100])]);
    assert_eq!(err, VmError::JumpOutOfRange(100));
}

#[test]
fn test_jump_to_end_halts() {
    let vm = run(ints(&[1]), vec![make(Opcode::Jump, &[6]), constant(0)]);
    assert_eq!(vm.sp(), 0);
}

#[test]
fn test_globals() {
    // let one = 1; let two = one + one; two
    let value = result(
        ints(&[1]),
        vec![
            constant(0),
            make(Opcode::SetGlobal, &[0]),
            make(Opcode::GetGlobal, &[0]),
            make(Opcode::GetGlobal, &[0]),
            op(Opcode::Add),
            make(Opcode::SetGlobal, &[1]),
            make(Opcode::GetGlobal, &[1]),
            op(Opcode::Pop),
        ],
    );
    assert_eq!(value, Value::Integer(2));
}

#[test]
fn test_unset_global_is_null() {
    let value = result(vec![], vec![make(Opcode::GetGlobal, &[9]), op(Opcode::Pop)]);
    assert_eq!(value, NULL);
}

#[test]
fn test_globals_persist_between_runs() {
    let first = run(ints(&[42]), vec![constant(0), make(Opcode::SetGlobal, &[3])]);
    let globals = first.into_globals();
    assert_eq!(globals[3], Value::Integer(42));

    let mut second = Vm::with_globals(
        bytecode(vec![], vec![make(Opcode::GetGlobal, &[3]), op(Opcode::Pop)]),
        globals,
    );
    assert_eq!(second.run(), Ok(()));
    assert_eq!(second.last_popped_stack_elem(), Some(&Value::Integer(42)));
}

#[test]
fn test_globals_persist_with_custom_config() {
    let first = run(ints(&[7]), vec![constant(0), make(Opcode::SetGlobal, &[1])]);
    let config = VmConfig {
        stack_size: 1,
        globals_size: 2,
    };

    let mut second = Vm::with_globals_and_config(
        bytecode(vec![], vec![make(Opcode::GetGlobal, &[1]), op(Opcode::Pop)]),
        first.into_globals(),
        config,
    );
    assert_eq!(second.run(), Ok(()));
    assert_eq!(second.last_popped_stack_elem(), Some(&Value::Integer(7)));
    assert_eq!(second.globals().len(), 2);

    // The custom stack limit applies to the continued run.
    let mut third = Vm::with_globals_and_config(
        bytecode(vec![], vec![make(Opcode::GetGlobal, &[1]), make(Opcode::GetGlobal, &[1])]),
        second.into_globals(),
        config,
    );
    assert_eq!(third.run(), Err(VmError::StackOverflow));
}

#[test]
fn test_global_out_of_range() {
    let code = bytecode(vec![], vec![make(Opcode::GetGlobal, &[5])]);
    let mut vm = Vm::with_config(
        code,
        VmConfig {
            globals_size: 4,
            ..VmConfig::default()
        },
    );
    assert_eq!(vm.run(), Err(VmError::GlobalOutOfRange(5)));
}

// ══════════════════════════════════════════════════════════════════════════════
// Arrays, hashes, indexing
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_array_literal() {
    // [1, 2 + 3]
    let value = result(
        ints(&[1, 2, 3]),
        vec![
            constant(0),
            constant(1),
            constant(2),
            op(Opcode::Add),
            make(Opcode::Array, &[2]),
            op(Opcode::Pop),
        ],
    );
    assert_eq!(value, Value::array(ints(&[1, 5])));

    let empty = result(vec![], vec![make(Opcode::Array, &[0]), op(Opcode::Pop)]);
    assert_eq!(empty, Value::array(vec![]));
}

#[test]
fn test_hash_literal_and_index() {
    // {"a": 1, 2: true}["a"]
    let consts = vec![Value::from("a"), Value::Integer(1), Value::Integer(2)];
    let value = result(
        consts,
        vec![
            constant(0),
            constant(1),
            constant(2),
            op(Opcode::True),
            make(Opcode::Hash, &[4]),
            constant(0),
            op(Opcode::Index),
            op(Opcode::Pop),
        ],
    );
    assert_eq!(value, Value::Integer(1));
}

#[test]
fn test_hash_display_order() {
    let value = result(
        vec![Value::from("k"), Value::Integer(2)],
        vec![
            constant(0),
            constant(1),
            constant(1),
            constant(0),
            make(Opcode::Hash, &[4]),
            op(Opcode::Pop),
        ],
    );
    assert_eq!(value.to_string(), "{2: k, k: 2}");
}

#[test]
fn test_hash_errors() {
    // {[]: 1}
    let err = run_err(
        ints(&[1]),
        vec![make(Opcode::Array, &[0]), constant(0), make(Opcode::Hash, &[2])],
    );
    assert_eq!(err.to_string(), "unhashable key: ARRAY");

    let err = run_err(ints(&[1]), vec![constant(0), make(Opcode::Hash, &[1])]);
    assert_eq!(err, VmError::OddHashOperand(1));
}

#[test]
fn test_index_expressions() {
    let array = || {
        vec![
            constant(0),
            constant(1),
            make(Opcode::Array, &[2]),
        ]
    };
    let consts = || ints(&[10, 20, 1, 5, -1]);

    let mut parts = array();
    parts.extend([constant(2), op(Opcode::Index), op(Opcode::Pop)]);
    assert_eq!(result(consts(), parts), Value::Integer(20));

    for out_of_range in [3, 4] {
        let mut parts = array();
        parts.extend([constant(out_of_range), op(Opcode::Index), op(Opcode::Pop)]);
        assert_eq!(result(consts(), parts), NULL);
    }

    // 1[0]
    let err = run_err(consts(), vec![constant(2), constant(0), op(Opcode::Index)]);
    assert_eq!(err.to_string(), "index operator not supported: INTEGER");
}

// ══════════════════════════════════════════════════════════════════════════════
// Malformed bytecode
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_unknown_opcode() {
    assert_eq!(run_err(vec![], vec![vec![255]]), VmError::UnknownOpcode(255));
}

#[test]
fn test_truncated_instruction() {
    let err = run_err(ints(&[1]), vec![vec![Opcode::Constant as u8, 0]]);
    assert_eq!(err, VmError::TruncatedInstruction { ip: 0 });
    assert_eq!(err.to_string(), "truncated instruction at 0");

    // The operand of the second instruction is cut short.
    let err = run_err(vec![], vec![op(Opcode::True), vec![Opcode::Jump as u8]]);
    assert_eq!(err, VmError::TruncatedInstruction { ip: 1 });
}

#[test]
fn test_constant_out_of_range() {
    assert_eq!(run_err(ints(&[1]), vec![constant(7)]), VmError::ConstantOutOfRange(7));
}

// ══════════════════════════════════════════════════════════════════════════════
// Agreement with the evaluator
// ══════════════════════════════════════════════════════════════════════════════

/// The display text of the VM's result, or of its error.
fn vm_outcome(constants: Vec<Value>, parts: Vec<Vec<u8>>) -> String {
    let mut vm = Vm::new(bytecode(constants, parts));
    match vm.run() {
        Ok(()) => vm
            .last_popped_stack_elem()
            .map(ToString::to_string)
            .unwrap_or_default(),
        Err(err) => format!("ERROR: {err}"),
    }
}

fn eval_outcome(expr: &Expression) -> String {
    eval(expr, &Env::new()).to_string()
}

#[test]
fn test_engines_agree() {
    use InfixOperator::{Asterisk, Gt, Minus, Plus};
    init_tracing();

    // (5 + 10 * 2) - 3
    let arithmetic = Expression::infix(
        Expression::infix(
            Expression::int(5),
            Plus,
            Expression::infix(Expression::int(10), Asterisk, Expression::int(2)),
        ),
        Minus,
        Expression::int(3),
    );
    let arithmetic_code = vec![
        constant(0),
        constant(1),
        constant(2),
        op(Opcode::Mul),
        op(Opcode::Add),
        constant(3),
        op(Opcode::Sub),
        op(Opcode::Pop),
    ];
    assert_eq!(
        vm_outcome(ints(&[5, 10, 2, 3]), arithmetic_code),
        eval_outcome(&arithmetic)
    );

    // "a" - "b"
    let strings = Expression::infix(Expression::string("a"), Minus, Expression::string("b"));
    let strings_code = vec![constant(0), constant(1), op(Opcode::Sub), op(Opcode::Pop)];
    let string_consts = vec![Value::from("a"), Value::from("b")];
    assert_eq!(vm_outcome(string_consts, strings_code), eval_outcome(&strings));
    assert_eq!(eval_outcome(&strings), "ERROR: unknown operator: STRING - STRING");

    // true > 1
    let mismatch = Expression::infix(Expression::bool(true), Gt, Expression::int(1));
    let mismatch_code = vec![op(Opcode::True), constant(0), op(Opcode::GreaterThan), op(Opcode::Pop)];
    assert_eq!(vm_outcome(ints(&[1]), mismatch_code), eval_outcome(&mismatch));
}
