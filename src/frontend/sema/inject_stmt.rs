//! Injection statements

use super::Session;
use crate::frontend::ast::{Expr, Stmt, StmtKind};
use crate::util::diagnostic::ErrorCodeDefinition;
use crate::util::span::Span;

impl Session {
    /// `-> operand;`
    ///
    /// The operand must be a fragment or a reflection. A rejected operand
    /// yields a null statement after the diagnostic.
    pub fn injection_stmt(
        &mut self,
        operand: Expr,
        span: Span,
    ) -> Stmt {
        if operand.is_dependent() {
            return Stmt::new(StmtKind::Inject(operand), span);
        }
        let is_closure = operand
            .ty
            .as_record()
            .and_then(|r| self.ast.kind(r).record())
            .map(|r| r.closure)
            .unwrap_or(false);
        if is_closure || operand.ty.is_reflection() {
            return Stmt::new(StmtKind::Inject(operand.rvalue()), span);
        }
        let ty = self.ast.type_name(&operand.ty);
        self.diags.emit(
            ErrorCodeDefinition::invalid_injection_operand(&ty)
                .at(operand.span)
                .build(),
        );
        Stmt::new(StmtKind::Null, span)
    }
}
