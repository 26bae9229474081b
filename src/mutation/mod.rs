//! Mutation Engine: derives "find/fix the bug" and refactor challenge
//! tasks from correct solutions by structured source edits.

mod chaos;
mod refactor;

pub use chaos::{create_chaos_task, mutate_solution, ChaosTask, Mutation, MutationKind};
pub use refactor::generate_refactor_task;
