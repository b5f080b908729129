//! Project scaffolding generators.
//!
//! A project opts into scaffolding by keeping a `plopfile.js` directly in its
//! root. The file exports a mapping from generator name to a sequence of
//! action templates; the runner resolves a named generator and executes its
//! rendered pipeline through the shared action interpreter.
//!
//! # Trust boundary
//!
//! Loading definitions evaluates `plopfile.js` with the project's own `node`.
//! That executes arbitrary code supplied by the project being operated on,
//! with this process's privileges. Scaffolding is run by the project owner,
//! so the file is trusted by construction and deliberately not sandboxed.

mod plopfile;
mod runner;

pub use plopfile::{
    load_definitions, parse_definitions, GeneratorDefinition, GeneratorDefinitions, GENERATOR_FILE,
};
pub use runner::{run_generator, run_named_generator, RunGeneratorRequest};

#[cfg(test)]
#[path = "runner_tests.rs"]
mod runner_tests;
