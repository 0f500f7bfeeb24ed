//! Return Rewriting
//!
//! Every `return` that belongs to the function being instrumented becomes
//! `{ <exit trace>; return ...; }`. The block wrapper keeps the pair valid
//! in positions that only admit a single statement, such as an unbraced
//! `if` branch. Local functions and lambdas are never entered: the former
//! are opaque statements, the latter live inside expression text.
//!
//! @module instrument/returns

use super::trace::{TraceKind, TraceSynthesizer};
use crate::syntax::{Block, Compound, Fragment, Statement};

pub struct ReturnRewriter<'a> {
    synth: &'a TraceSynthesizer,
    scope_path: &'a str,
    function_name: &'a str,
    rewritten: usize,
}

impl<'a> ReturnRewriter<'a> {
    pub fn new(synth: &'a TraceSynthesizer, scope_path: &'a str, function_name: &'a str) -> Self {
        Self {
            synth,
            scope_path,
            function_name,
            rewritten: 0,
        }
    }

    /// Number of returns rewritten so far
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    pub fn rewrite_block(&mut self, block: Block) -> Block {
        Block::new(
            block
                .statements
                .into_iter()
                .map(|statement| self.rewrite_statement(statement))
                .collect(),
        )
    }

    fn rewrite_statement(&mut self, statement: Statement) -> Statement {
        match statement {
            Statement::Block(block) => Statement::Block(self.rewrite_block(block)),
            Statement::Return(value) => {
                self.rewritten += 1;
                let exit = self
                    .synth
                    .make_trace(TraceKind::Exit, self.scope_path, self.function_name);
                Statement::Block(Block::new(vec![exit, Statement::Return(value)]))
            }
            Statement::Compound(compound) => Statement::Compound(self.rewrite_compound(compound)),
            Statement::Expression(_)
            | Statement::Local(_)
            | Statement::LocalFunction(_)
            | Statement::Other(_)
            | Statement::Trivia(_) => statement,
        }
    }

    fn rewrite_compound(&mut self, compound: Compound) -> Compound {
        let fragments = compound
            .fragments
            .into_iter()
            .map(|fragment| match fragment {
                Fragment::Statement(statement) => Fragment::Statement(self.rewrite_statement(statement)),
                Fragment::Text(_) | Fragment::Comment(_) | Fragment::Open | Fragment::Close => {
                    fragment
                }
            })
            .collect();
        Compound { fragments }
    }
}

/// Rewrite every return in `block`, returning the new block and the count
pub fn rewrite_returns(
    synth: &TraceSynthesizer,
    block: Block,
    scope_path: &str,
    function_name: &str,
) -> (Block, usize) {
    let mut rewriter = ReturnRewriter::new(synth, scope_path, function_name);
    let block = rewriter.rewrite_block(block);
    (block, rewriter.rewritten())
}
