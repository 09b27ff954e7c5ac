//! Registration of the builtin functions presented in the root scope.
//!
//! Builtins are synthesized as ordinary `Function` HIR nodes - a dummy empty
//! block body, `Span::dummy()` - so the rest of the pipeline (call
//! resolution, arity checking, the exit-check pass) treats them exactly like
//! user-defined functions. `exit`'s `FunctionId` is returned explicitly
//! because the exit-check pass needs to recognize calls to it by identity.

use ferrosem_common::Span;
use ferrosem_hir::{
    ExprData, ExprKind, Function, FunctionId, HirArena, Param, PatternData, PatternKind,
    TypeAnnotation,
};
use ferrosem_types::{PrimitiveKind, TypeUniverse};

use crate::scope::{Scopes, ValueDef};

pub struct Builtins {
    pub exit: FunctionId,
}

struct BuiltinSpec {
    name: &'static str,
    params: &'static [ferrosem_types::PrimitiveKind],
    param_is_ref: &'static [bool],
    ret: Option<ferrosem_types::PrimitiveKind>,
}

pub fn register(arena: &mut HirArena, universe: &TypeUniverse, scopes: &mut Scopes) -> Builtins {
    let specs = [
        BuiltinSpec { name: "print", params: &[PrimitiveKind::String], param_is_ref: &[true], ret: None },
        BuiltinSpec { name: "println", params: &[PrimitiveKind::String], param_is_ref: &[true], ret: None },
        BuiltinSpec { name: "printInt", params: &[PrimitiveKind::I32], param_is_ref: &[false], ret: None },
        BuiltinSpec {
            name: "printlnInt",
            params: &[PrimitiveKind::I32],
            param_is_ref: &[false],
            ret: None,
        },
        BuiltinSpec { name: "getString", params: &[], param_is_ref: &[], ret: Some(PrimitiveKind::String) },
        BuiltinSpec { name: "getInt", params: &[], param_is_ref: &[], ret: Some(PrimitiveKind::I32) },
        BuiltinSpec { name: "exit", params: &[PrimitiveKind::I32], param_is_ref: &[false], ret: None },
    ];

    let mut exit = None;
    for spec in specs {
        let body = arena.push_expr(ExprData {
            kind: ExprKind::Block { stmts: Vec::new(), final_expr: None },
            span: Span::dummy(),
            info: None,
            loop_break_ty: None,
        });
        let params = spec
            .params
            .iter()
            .zip(spec.param_is_ref)
            .map(|(&prim, &is_ref)| {
                let prim_ty = universe.primitive(prim);
                let ty = if is_ref { universe.reference(prim_ty, false) } else { prim_ty };
                let pattern =
                    arena.push_pat(PatternData { kind: PatternKind::Wildcard, span: Span::dummy() });
                Param { pattern, ty: TypeAnnotation::Resolved(ty), span: Span::dummy() }
            })
            .collect();
        let ret = spec.ret.map(|p| TypeAnnotation::Resolved(universe.primitive(p)));
        let id = arena.push_function(Function {
            name: spec.name.to_string(),
            params,
            ret,
            body,
            assoc_depth: 0,
            span: Span::dummy(),
        });
        scopes.define_item(spec.name, ValueDef::Function(id));
        if spec.name == "exit" {
            exit = Some(id);
        }
    }

    Builtins { exit: exit.expect("exit is always registered") }
}
