use std::{borrow::Borrow, fmt::Debug};

use itertools::Itertools;

use crate::{math::Map, AutomatonError, Symbol};

/// Index of a [`State`] in the arena of the [`crate::Automaton`] that owns it. Transitions
/// refer to their targets through these indices, so the (generally cyclic) transition graph
/// never holds owning references.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) u32);

impl Debug for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<usize> for StateId {
    fn from(n: usize) -> Self {
        Self::from_usize(n)
    }
}

impl StateId {
    /// Creates the id of the state at position `n` in the arena.
    ///
    /// # Panics
    /// If `n` does not fit into a `u32`. Use [`StateId::try_from_usize`] for positions that
    /// have not been checked yet.
    pub fn from_usize(n: usize) -> Self {
        Self(u32::try_from(n).expect("automata with more than u32::MAX states are not supported"))
    }

    /// Creates the id of the state at position `n`, or `None` if `n` does not fit into a `u32`.
    pub fn try_from_usize(n: usize) -> Option<Self> {
        u32::try_from(n).ok().map(Self)
    }

    /// Returns the position in the arena.
    pub fn into_usize(self) -> usize {
        self.0 as usize
    }
}

/// A named state of a deterministic finite automaton. Once the owning automaton has been
/// validated, the transitions of a state form a total function from the alphabet to
/// [`StateId`]s of the same automaton.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct State<S: Symbol> {
    name: String,
    initial: bool,
    accepting: bool,
    transitions: Option<Map<S, StateId>>,
}

impl<S: Symbol> State<S> {
    /// Creates a new state that is neither initial nor accepting and has no transitions yet.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            initial: false,
            accepting: false,
            transitions: None,
        }
    }

    /// Sets the initial flag.
    pub fn with_initial(mut self, initial: bool) -> Self {
        self.initial = initial;
        self
    }

    /// Sets the accepting flag.
    pub fn with_accepting(mut self, accepting: bool) -> Self {
        self.accepting = accepting;
        self
    }

    /// Builder variant of [`State::set_transitions`].
    pub fn with_transitions<I: IntoIterator<Item = (S, StateId)>>(mut self, transitions: I) -> Self {
        self.set_transitions(transitions);
        self
    }

    /// The name of the state, unique within its automaton.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the initial state.
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Whether this state is accepting (final).
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub(crate) fn set_initial(&mut self, initial: bool) {
        self.initial = initial;
    }

    /// Returns the transition map, or `None` if it was never set.
    pub fn transitions(&self) -> Option<&Map<S, StateId>> {
        self.transitions.as_ref()
    }

    /// Iterates over the symbols for which this state has a transition.
    pub fn symbols(&self) -> impl Iterator<Item = &S> + '_ {
        self.transitions.iter().flat_map(|map| map.keys())
    }

    /// Replaces all outgoing transitions of this state.
    pub fn set_transitions<I: IntoIterator<Item = (S, StateId)>>(&mut self, transitions: I) {
        self.transitions = Some(transitions.into_iter().collect());
    }

    /// Returns the target of the transition on `symbol`.
    pub fn transition<B: Borrow<S>>(&self, symbol: B) -> Result<StateId, AutomatonError> {
        let symbol = symbol.borrow();
        self.transitions
            .as_ref()
            .ok_or_else(|| AutomatonError::UndefinedTransitions(self.name.clone()))?
            .get(symbol)
            .copied()
            .ok_or_else(|| AutomatonError::UnknownSymbol {
                state: self.name.clone(),
                symbol: format!("{symbol:?}"),
            })
    }

    /// Verifies that the transitions of this state are defined, that its symbols coincide with
    /// `expected_alphabet` (if given) and that every target lies in an arena of `arena_size` states.
    pub fn validate(
        &self,
        expected_alphabet: Option<&[S]>,
        arena_size: usize,
    ) -> Result<(), AutomatonError> {
        let transitions = self
            .transitions
            .as_ref()
            .ok_or_else(|| AutomatonError::UndefinedTransitions(self.name.clone()))?;

        if let Some(alphabet) = expected_alphabet {
            if transitions.len() != alphabet.len()
                || alphabet.iter().any(|sym| !transitions.contains_key(sym))
            {
                return Err(AutomatonError::AlphabetMismatch {
                    state: self.name.clone(),
                    expected: format!("{{{}}}", alphabet.iter().map(|s| format!("{s:?}")).join(", ")),
                    found: format!(
                        "{{{}}}",
                        transitions.keys().map(|s| format!("{s:?}")).join(", ")
                    ),
                });
            }
        }

        for (symbol, target) in transitions {
            if target.into_usize() >= arena_size {
                return Err(AutomatonError::InvalidTarget {
                    state: self.name.clone(),
                    symbol: format!("{symbol:?}"),
                    target: format!("{target:?}"),
                });
            }
        }
        Ok(())
    }

    /// Rewrites every transition target through `f`, used when the arena is compacted.
    pub(crate) fn remap_targets<F: Fn(StateId) -> StateId>(&mut self, f: F) {
        if let Some(transitions) = self.transitions.as_mut() {
            transitions.values_mut().for_each(|target| *target = f(*target));
        }
    }
}
