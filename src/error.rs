use thiserror::Error;

/// Coarse classification of [`AutomatonError`]s.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The automaton is not well formed: no states, a missing or ambiguous initial state,
    /// undefined transitions or transitions that point outside of the automaton.
    Structural,
    /// A symbol set disagrees with the alphabet, or an unknown symbol is queried.
    Alphabet,
    /// A word that can not be run, i.e. the empty word.
    Sequence,
}

/// Abstracts the errors that can occur while constructing, validating or running an [`crate::Automaton`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum AutomatonError {
    #[error("the automaton has no states")]
    NoStates,
    #[error("initial state `{0}` does not belong to the automaton")]
    InitialState(String),
    #[error("state `{0}` is flagged as initial, but `{1}` is the initial state")]
    MultipleInitial(String, String),
    #[error("state `{0}` is defined more than once")]
    DuplicateState(String),
    #[error("transitions of state `{0}` are not defined")]
    UndefinedTransitions(String),
    #[error("transition `{state}` --{symbol}--> `{target}` does not lead to a state of the automaton")]
    InvalidTarget {
        state: String,
        symbol: String,
        target: String,
    },
    #[error("state `{state}` has symbols {found}, but the alphabet is {expected}")]
    AlphabetMismatch {
        state: String,
        expected: String,
        found: String,
    },
    #[error("state `{state}` has more than one transition on symbol {symbol}")]
    DuplicateSymbol { state: String, symbol: String },
    #[error("symbol {symbol} is not known in state `{state}`")]
    UnknownSymbol { state: String, symbol: String },
    #[error("{0} states exceed the capacity of the state arena")]
    TooManyStates(usize),
    #[error("can not run the empty word, epsilon transitions do not exist in a DFA")]
    EmptySequence,
}

impl AutomatonError {
    /// Returns the [`ErrorKind`] that `self` belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AutomatonError::NoStates
            | AutomatonError::InitialState(_)
            | AutomatonError::MultipleInitial(..)
            | AutomatonError::DuplicateState(_)
            | AutomatonError::UndefinedTransitions(_)
            | AutomatonError::InvalidTarget { .. }
            | AutomatonError::TooManyStates(_) => ErrorKind::Structural,
            AutomatonError::AlphabetMismatch { .. }
            | AutomatonError::DuplicateSymbol { .. }
            | AutomatonError::UnknownSymbol { .. } => ErrorKind::Alphabet,
            AutomatonError::EmptySequence => ErrorKind::Sequence,
        }
    }
}
