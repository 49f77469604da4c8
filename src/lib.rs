//! Library for deterministic finite automata (DFAs) over arbitrary alphabets and their minimization.
//!
//! An [`Automaton`] owns a finite collection of named [`State`]s, exactly one of which is initial and
//! any number of which are accepting. Each state has precisely one outgoing transition for every
//! symbol of the alphabet, so the transition function is total. Symbols can be of any type that
//! supports equality and hashing (see [`Symbol`]), so besides characters one can use integers,
//! strings, vectors or structured values.
//!
//! States live in an arena inside the automaton and transitions refer to their targets by
//! [`StateId`]. Automata are usually built from a transition table with [`Automaton::define`], which
//! validates the table and refuses to produce anything that is not a well formed DFA. Afterwards
//! [`Automaton::check`] decides whether a word is accepted.
//!
//! The most important operation is [`Automaton::minimize`], which computes the unique minimal DFA
//! accepting the same language. It works in three stages:
//! - unreachable states are discarded (see [`Automaton::remove_unreachable`]),
//! - the remaining states are partitioned into equivalence classes by Moore's partition refinement
//!   algorithm (see [`minimization::partition_refinement::PartitionRefiner`]),
//! - every equivalence class becomes a state of the minimal automaton.
//!
//! [`minimization::Minimizer`] allows choosing how the new states are named and observing the
//! partitions as they are refined. [`render::TransitionTable`] renders an automaton as a table.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use moore_dfa::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        automaton::reachable::{MinimalRepresentatives, ReachableStates},
        math,
        math::Partition,
        minimization::{
            partition_refinement::{PartitionRefiner, Signature},
            BlockNaming, Minimizer,
        },
        render::TransitionTable,
        Automaton, AutomatonError, ErrorKind, State, StateId, Symbol,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

mod error;
pub use error::{AutomatonError, ErrorKind};

mod state;
pub use state::{State, StateId};

/// Defines the [`Automaton`] itself, its construction, validation and runs.
pub mod automaton;
pub use automaton::Automaton;

/// Contains the partition refinement algorithm and the construction of minimal automata.
pub mod minimization;

/// Tabular rendering of automata.
pub mod render;

/// Implements the generation of random automata and words.
#[cfg(feature = "random")]
pub mod random;

use std::{fmt::Debug, hash::Hash};

/// A symbol is anything that can label a transition. Two symbols are the same if they are equal,
/// so the type's `Eq` and `Hash` implementations determine the identity of a symbol. For composite
/// symbols like `Vec<T>` this means the order of the elements matters.
pub trait Symbol: Clone + Eq + Hash + Debug {}
impl<S: Clone + Eq + Hash + Debug> Symbol for S {}
