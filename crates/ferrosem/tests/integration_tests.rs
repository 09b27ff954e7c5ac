//! End-to-end pipeline tests: build an AST by hand (there is no front-end in
//! this workspace), run [`ferrosem::analyze`], and inspect the checked HIR.

use ferrosem::ast::*;
use ferrosem::common::diagnostics::ErrorKind;
use ferrosem::hir::{BindingLink, ConstVariant, ExprKind, PatternKind, StmtKind};
use ferrosem::types::PrimitiveKind as TPrim;
use ferrosem::{analyze, AnalysisResult};
use ferrosem_common::Span;

fn sp() -> Span {
    Span::dummy()
}

fn lit_int(value: i64, suffix: Option<PrimitiveKind>) -> Expr {
    Expr::Literal { lit: Literal::Int { value, suffix }, span: sp() }
}

fn path(name: &str) -> Expr {
    Expr::Path { segments: vec![name.to_string()], span: sp() }
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call { callee: Box::new(path(name)), args, span: sp() }
}

fn let_stmt(name: &str, ty: Option<TypeNode>, init: Option<Expr>) -> Stmt {
    Stmt::Let {
        pattern: Pattern::Binding { name: name.to_string(), mutable: false, span: sp() },
        ty,
        init,
        span: sp(),
    }
}

fn block(stmts: Vec<Stmt>) -> Block {
    Block { stmts, final_expr: None, span: sp() }
}

fn main_fn(body: Block) -> Item {
    Item::Function(Function {
        name: "main".to_string(),
        self_param: None,
        params: Vec::new(),
        ret: None,
        body,
        span: sp(),
    })
}

fn program(items: Vec<Item>) -> Program {
    Program { items }
}

fn run(items: Vec<Item>) -> AnalysisResult {
    analyze(&program(items))
}

fn main_function_id(result: &AnalysisResult) -> ferrosem::hir::FunctionId {
    use ferrosem::hir::ItemRef;
    result
        .program
        .items
        .iter()
        .find_map(|item| match item {
            ItemRef::Function(fid) if result.program.arena.function(*fid).name == "main" => Some(*fid),
            _ => None,
        })
        .expect("program has a main function")
}

fn main_stmts(result: &AnalysisResult) -> Vec<ferrosem::hir::StmtId> {
    let fid = main_function_id(result);
    let body = result.program.arena.function(fid).body;
    match &result.program.arena.expr(body).kind {
        ExprKind::Block { stmts, .. } => stmts.clone(),
        _ => panic!("main's body is always a block"),
    }
}

#[test]
fn scenario_1_literal_arithmetic_folds_and_types_as_i32() {
    let result = run(vec![main_fn(block(vec![
        let_stmt("x", Some(TypeNode::Primitive(PrimitiveKind::I32)), Some(Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(lit_int(1, None)),
            rhs: Box::new(lit_int(2, None)),
            span: sp(),
        })),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]))]);

    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors);

    let stmts = main_stmts(&result);
    let StmtKind::Let { pattern, init, .. } = &result.program.arena.stmt(stmts[0]).kind else {
        panic!("expected a let statement");
    };
    let PatternKind::Binding(binding) = &result.program.arena.pat(*pattern).kind else {
        panic!("expected a binding pattern");
    };
    let BindingLink::Resolved(lid) = binding.local else {
        panic!("binding was never linked to a local");
    };
    let ty = result.program.arena.local(lid).type_annotation.resolved().expect("type resolved");
    assert_eq!(result.universe.primitive_kind(ty), Some(TPrim::I32));

    let init_info = result.program.arena.expr(init.unwrap()).info.clone().expect("checked");
    assert_eq!(init_info.const_value, Some(ConstVariant::IntConst(3)));
}

#[test]
fn scenario_2_unsuffixed_literal_defaults_to_i32() {
    let result = run(vec![main_fn(block(vec![
        let_stmt("x", None, Some(lit_int(1, None))),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]))]);

    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors);

    let stmts = main_stmts(&result);
    let StmtKind::Let { pattern, .. } = &result.program.arena.stmt(stmts[0]).kind else {
        panic!("expected a let statement");
    };
    let PatternKind::Binding(binding) = &result.program.arena.pat(*pattern).kind else {
        panic!("expected a binding pattern");
    };
    let BindingLink::Resolved(lid) = binding.local else {
        panic!("binding was never linked to a local");
    };
    let ty = result.program.arena.local(lid).type_annotation.resolved().expect("type resolved");
    assert_eq!(result.universe.primitive_kind(ty), Some(TPrim::I32));
}

#[test]
fn scenario_3_const_sized_array_uses_the_evaluated_length() {
    let const_n = Item::Const(ConstDef {
        name: "N".to_string(),
        ty: TypeNode::Primitive(PrimitiveKind::Usize),
        init: lit_int(4, None),
        span: sp(),
    });
    let main = main_fn(block(vec![
        let_stmt(
            "a",
            Some(TypeNode::Array(Box::new(TypeNode::Primitive(PrimitiveKind::I32)), Box::new(path("N")))),
            Some(Expr::ArrayRepeat { value: Box::new(lit_int(0, None)), count: Box::new(path("N")), span: sp() }),
        ),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]));

    let result = run(vec![const_n, main]);
    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors);

    let stmts = main_stmts(&result);
    let StmtKind::Let { pattern, .. } = &result.program.arena.stmt(stmts[0]).kind else {
        panic!("expected a let statement");
    };
    let PatternKind::Binding(binding) = &result.program.arena.pat(*pattern).kind else {
        panic!("expected a binding pattern");
    };
    let BindingLink::Resolved(lid) = binding.local else {
        panic!("binding was never linked to a local");
    };
    let ty = result.program.arena.local(lid).type_annotation.resolved().expect("type resolved");
    let (elem, len) = result.universe.array_parts(ty).expect("array type");
    assert_eq!(len, 4);
    assert_eq!(result.universe.primitive_kind(elem), Some(TPrim::I32));
}

#[test]
fn scenario_4_assigning_an_immutable_binding_is_rejected() {
    let result = run(vec![main_fn(block(vec![
        let_stmt("x", None, Some(lit_int(1, None))),
        Stmt::Expr(Expr::Assign { lhs: Box::new(path("x")), rhs: Box::new(lit_int(2, None)), span: sp() }),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]))]);

    assert!(result.has_errors());
    assert!(result.errors.iter().any(|e| e.kind == ErrorKind::MutabilityViolation));
}

#[test]
fn scenario_5_exit_outside_top_level_main_is_rejected() {
    let helper = Item::Function(Function {
        name: "f".to_string(),
        self_param: None,
        params: Vec::new(),
        ret: None,
        body: block(vec![Stmt::Expr(call("exit", vec![lit_int(0, None)]))]),
        span: sp(),
    });
    let main = main_fn(block(vec![Stmt::Expr(call("exit", vec![lit_int(0, None)]))]));

    let result = run(vec![helper, main]);
    assert!(result.has_errors());
    assert!(result.errors.iter().any(|e| e.kind == ErrorKind::InvalidMainShape));
}

#[test]
fn scenario_6_exit_must_be_the_final_statement_of_main() {
    let result = run(vec![main_fn(block(vec![
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
        let_stmt("x", None, Some(lit_int(1, None))),
    ]))]);

    assert!(result.has_errors());
    assert!(result.errors.iter().any(|e| e.kind == ErrorKind::InvalidMainShape));
}

#[test]
fn scenario_7_cyclic_consts_are_rejected_and_not_evaluated() {
    let const_a = Item::Const(ConstDef {
        name: "A".to_string(),
        ty: TypeNode::Primitive(PrimitiveKind::I32),
        init: path("B"),
        span: sp(),
    });
    let const_b = Item::Const(ConstDef {
        name: "B".to_string(),
        ty: TypeNode::Primitive(PrimitiveKind::I32),
        init: path("A"),
        span: sp(),
    });
    let main = main_fn(block(vec![Stmt::Expr(call("exit", vec![lit_int(0, None)]))]));

    let result = run(vec![const_a, const_b, main]);
    assert!(result.has_errors());
    assert!(result.errors.iter().any(|e| e.kind == ErrorKind::CyclicConst));
}

#[test]
fn scenario_8_loop_result_type_unifies_from_its_break_value() {
    let loop_expr = Expr::Loop {
        body: Block { stmts: vec![Stmt::Expr(Expr::Break { value: Some(Box::new(lit_int(3, None))), span: sp() })], final_expr: None, span: sp() },
        span: sp(),
    };
    let result = run(vec![main_fn(block(vec![
        Stmt::Expr(loop_expr),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]))]);

    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors);

    let stmts = main_stmts(&result);
    let StmtKind::Expr(loop_id) = &result.program.arena.stmt(stmts[0]).kind else {
        panic!("expected an expression statement");
    };
    let info = result.program.arena.expr(*loop_id).info.clone().expect("checked");
    assert_eq!(result.universe.primitive_kind(info.ty), Some(TPrim::I32));
}

#[test]
fn empty_array_literal_without_expectation_is_rejected() {
    let result = run(vec![main_fn(block(vec![
        Stmt::Expr(Expr::ArrayLiteral { elems: Vec::new(), span: sp() }),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]))]);

    assert!(result.has_errors());
    assert!(result.errors.iter().any(|e| e.kind == ErrorKind::TypeMismatch));
}

#[test]
fn empty_array_literal_with_expectation_succeeds() {
    let result = run(vec![main_fn(block(vec![
        let_stmt(
            "a",
            Some(TypeNode::Array(Box::new(TypeNode::Primitive(PrimitiveKind::I32)), Box::new(lit_int(0, Some(PrimitiveKind::Usize))))),
            Some(Expr::ArrayLiteral { elems: Vec::new(), span: sp() }),
        ),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]))]);

    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors);
}

#[test]
fn analysis_is_idempotent_across_independent_runs_of_the_same_program() {
    let build = || {
        vec![main_fn(block(vec![
            let_stmt("x", None, Some(lit_int(1, None))),
            Stmt::Expr(call("exit", vec![lit_int(0, None)])),
        ]))]
    };

    let first = run(build());
    let second = run(build());
    assert!(!first.has_errors() && !second.has_errors());

    let ty = |r: &AnalysisResult| {
        let stmts = main_stmts(r);
        let StmtKind::Let { pattern, .. } = &r.program.arena.stmt(stmts[0]).kind else {
            panic!("expected a let statement");
        };
        let PatternKind::Binding(binding) = &r.program.arena.pat(*pattern).kind else {
            panic!("expected a binding pattern");
        };
        let BindingLink::Resolved(lid) = binding.local else {
            panic!("binding was never linked to a local");
        };
        r.program.arena.local(lid).type_annotation.resolved().expect("type resolved")
    };
    assert_eq!(first.universe.primitive_kind(ty(&first)), second.universe.primitive_kind(ty(&second)));
}

#[test]
fn self_type_resolves_as_return_param_and_struct_literal() {
    let point_struct = Item::Struct(StructDef {
        name: "Point".to_string(),
        fields: vec![
            ("x".to_string(), TypeNode::Primitive(PrimitiveKind::I32)),
            ("y".to_string(), TypeNode::Primitive(PrimitiveKind::I32)),
        ],
        span: sp(),
    });
    let origin_fn = Function {
        name: "origin".to_string(),
        self_param: None,
        params: Vec::new(),
        ret: Some(TypeNode::Path(vec!["Self".to_string()])),
        body: Block {
            stmts: Vec::new(),
            final_expr: Some(Box::new(Expr::StructLiteral {
                path: vec!["Self".to_string()],
                fields: vec![("x".to_string(), lit_int(0, None)), ("y".to_string(), lit_int(0, None))],
                span: sp(),
            })),
            span: sp(),
        },
        span: sp(),
    };
    let identity_fn = Function {
        name: "identity".to_string(),
        self_param: None,
        params: vec![Param {
            pattern: Pattern::Binding { name: "p".to_string(), mutable: false, span: sp() },
            ty: TypeNode::Path(vec!["Self".to_string()]),
            span: sp(),
        }],
        ret: Some(TypeNode::Path(vec!["Self".to_string()])),
        body: Block { stmts: Vec::new(), final_expr: Some(Box::new(path("p"))), span: sp() },
        span: sp(),
    };
    let point_impl = Item::Impl(Impl {
        target: TypeNode::Path(vec!["Point".to_string()]),
        trait_ref: None,
        items: vec![AssocItem::Function(origin_fn), AssocItem::Function(identity_fn)],
        span: sp(),
    });
    let main = main_fn(block(vec![
        let_stmt(
            "p",
            Some(TypeNode::Path(vec!["Point".to_string()])),
            Some(Expr::Call {
                callee: Box::new(Expr::Path { segments: vec!["Point".to_string(), "origin".to_string()], span: sp() }),
                args: Vec::new(),
                span: sp(),
            }),
        ),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]));

    let result = run(vec![point_struct, point_impl, main]);
    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors);
}

#[test]
fn array_literal_unifies_placeholder_element_with_later_suffixed_element() {
    let result = run(vec![main_fn(block(vec![
        let_stmt(
            "a",
            None,
            Some(Expr::ArrayLiteral {
                elems: vec![lit_int(1, None), lit_int(2, Some(PrimitiveKind::I32))],
                span: sp(),
            }),
        ),
        Stmt::Expr(call("exit", vec![lit_int(0, None)])),
    ]))]);

    assert!(!result.has_errors(), "unexpected errors: {:?}", result.errors);

    let stmts = main_stmts(&result);
    let StmtKind::Let { pattern, .. } = &result.program.arena.stmt(stmts[0]).kind else {
        panic!("expected a let statement");
    };
    let PatternKind::Binding(binding) = &result.program.arena.pat(*pattern).kind else {
        panic!("expected a binding pattern");
    };
    let BindingLink::Resolved(lid) = binding.local else {
        panic!("binding was never linked to a local");
    };
    let ty = result.program.arena.local(lid).type_annotation.resolved().expect("type resolved");
    let (elem, len) = result.universe.array_parts(ty).expect("array type");
    assert_eq!(len, 2);
    assert_eq!(result.universe.primitive_kind(elem), Some(TPrim::I32));
}

#[test]
fn exit_in_a_nested_function_named_main_does_not_satisfy_top_level_main() {
    let nested_main = main_fn(block(vec![Stmt::Expr(call("exit", vec![lit_int(0, None)]))]));
    let helper = Item::Function(Function {
        name: "helper".to_string(),
        self_param: None,
        params: Vec::new(),
        ret: None,
        body: block(vec![Stmt::Item(nested_main)]),
        span: sp(),
    });
    // The real top-level `main` never calls `exit` at all.
    let main = main_fn(block(vec![let_stmt("x", None, Some(lit_int(1, None)))]));

    let result = run(vec![helper, main]);
    assert!(result.has_errors());
    let shape_errors = result.errors.iter().filter(|e| e.kind == ErrorKind::InvalidMainShape).count();
    assert_eq!(shape_errors, 2, "expected both the nested `main`'s misplaced exit and the real main's missing exit to be flagged: {:?}", result.errors);
}

#[test]
fn type_annotation_round_trips_through_type_query() {
    let ast = program(vec![main_fn(block(vec![Stmt::Expr(call("exit", vec![lit_int(0, None)]))]))]);
    let mut lowered = ferrosem::hir::lower_program(&ast);
    let universe = ferrosem::types::TypeUniverse::new();
    let mut diagnostics = ferrosem::common::diagnostics::DiagnosticSink::new();
    let globals = ferrosem::resolve::GlobalNames::default();

    use ferrosem::hir::ItemRef;
    let exit_fn = lowered
        .program
        .items
        .iter()
        .find_map(|item| match item {
            ItemRef::Function(fid) => Some(*fid),
            _ => None,
        })
        .expect("lowered program has a function");

    let tid = universe.primitive(TPrim::I32);
    let resolved = ferrosem::hir::TypeAnnotation::Resolved(tid);
    let mut service = ferrosem::check::QueryService::new(
        &mut lowered.program.arena,
        &universe,
        &lowered.impl_table,
        &globals,
        &mut diagnostics,
        exit_fn,
    );
    assert_eq!(service.type_query(&resolved, sp()), tid);
}
