//! Code generation hook
//!
//! Every declaration an injection creates at translation-unit scope is
//! handed to the consumer the moment it is created. Declarations built
//! directly through the session are the driver's to report.

use crate::frontend::ast::{AstContext, DeclId};
use std::cell::RefCell;
use std::rc::Rc;

/// Receiver of new top-level declarations
pub trait AstConsumer {
    fn handle_top_level_decl(
        &mut self,
        ast: &AstContext,
        decl: DeclId,
    );
}

/// Ignores everything
#[derive(Debug, Default)]
pub struct NullConsumer;

impl AstConsumer for NullConsumer {
    fn handle_top_level_decl(
        &mut self,
        _ast: &AstContext,
        _decl: DeclId,
    ) {
    }
}

/// Records declarations in arrival order; clones share the same record
#[derive(Debug, Default, Clone)]
pub struct RecordingConsumer {
    decls: Rc<RefCell<Vec<DeclId>>>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declarations received so far
    pub fn decls(&self) -> Vec<DeclId> {
        self.decls.borrow().clone()
    }
}

impl AstConsumer for RecordingConsumer {
    fn handle_top_level_decl(
        &mut self,
        _ast: &AstContext,
        decl: DeclId,
    ) {
        self.decls.borrow_mut().push(decl);
    }
}
