//! Compile-time code injection frontend
//!
//! - [`ast`] - declaration arena, types, expressions and statements
//! - [`reflect`] - reflection values, queries and reification
//! - [`const_eval`] - constant evaluation of metaprograms
//! - [`sema`] - the [`Session`](sema::Session) builder: scopes, lookup,
//!   fragments and metaprograms
//! - [`inject`] - injection effects, declaration cloning and deferred
//!   definitions

pub mod ast;
pub mod const_eval;
pub mod inject;
pub mod reflect;
pub mod sema;
