use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::debug;

use crate::{Automaton, StateId, Symbol};

/// Type alias for a minimal representative of a state which is its length-lexicographically minimal
/// access sequence (with respect to the order of the alphabet) and its state id.
pub type MinimalRepresentative<S> = (Vec<S>, StateId);

/// Iterates over the states that are reachable from some origin in breadth-first order, together
/// with the shortest word that reaches them. The origin itself is yielded first with the empty word.
#[derive(Debug, Clone)]
pub struct MinimalRepresentatives<'a, S: Symbol> {
    automaton: &'a Automaton<S>,
    seen: BitSet,
    queue: VecDeque<MinimalRepresentative<S>>,
}

impl<'a, S: Symbol> MinimalRepresentatives<'a, S> {
    /// Starts the search in `origin`.
    pub fn new(automaton: &'a Automaton<S>, origin: StateId) -> Self {
        let mut seen = BitSet::with_capacity(automaton.size());
        seen.insert(origin.into_usize());
        Self {
            automaton,
            seen,
            queue: VecDeque::from([(vec![], origin)]),
        }
    }
}

impl<'a, S: Symbol> Iterator for MinimalRepresentatives<'a, S> {
    type Item = MinimalRepresentative<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let (access, q) = self.queue.pop_front()?;
        for sym in self.automaton.alphabet() {
            if let Some(p) = self.automaton.successor(q, sym) {
                if self.seen.insert(p.into_usize()) {
                    let mut extended = access.clone();
                    extended.push(sym.clone());
                    self.queue.push_back((extended, p));
                }
            }
        }
        Some((access, q))
    }
}

/// Iterates over the ids of all states that are reachable from some origin, in breadth-first order
/// where successors are visited in the order of the alphabet.
/// Every state is yielded exactly once, the origin comes first.
#[derive(Debug, Clone)]
pub struct ReachableStates<'a, S: Symbol> {
    automaton: &'a Automaton<S>,
    seen: BitSet,
    queue: VecDeque<StateId>,
}

impl<'a, S: Symbol> ReachableStates<'a, S> {
    /// Starts the search in `origin`.
    pub fn new(automaton: &'a Automaton<S>, origin: StateId) -> Self {
        let mut seen = BitSet::with_capacity(automaton.size());
        seen.insert(origin.into_usize());
        Self {
            automaton,
            seen,
            queue: VecDeque::from([origin]),
        }
    }
}

impl<'a, S: Symbol> Iterator for ReachableStates<'a, S> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        let q = self.queue.pop_front()?;
        for sym in self.automaton.alphabet() {
            if let Some(p) = self.automaton.successor(q, sym) {
                if self.seen.insert(p.into_usize()) {
                    self.queue.push_back(p);
                }
            }
        }
        Some(q)
    }
}

impl<S: Symbol> Automaton<S> {
    /// Returns an iterator over the states reachable from the initial state.
    pub fn reachable_states(&self) -> ReachableStates<'_, S> {
        ReachableStates::new(self, self.initial())
    }

    /// Returns an iterator over the states reachable from `origin`.
    pub fn reachable_states_from(&self, origin: StateId) -> ReachableStates<'_, S> {
        ReachableStates::new(self, origin)
    }

    /// Returns an iterator over the minimal representatives of all reachable states, see
    /// [`MinimalRepresentatives`].
    pub fn minimal_representatives(&self) -> MinimalRepresentatives<'_, S> {
        MinimalRepresentatives::new(self, self.initial())
    }

    /// Returns true if every state is reachable from the initial state.
    pub fn is_accessible(&self) -> bool {
        self.reachable_states().count() == self.size()
    }

    /// Discards all states that can not be reached from the initial state. The retained states
    /// are stored in breadth-first order, so the initial state comes first. Transitions of retained
    /// states are only renumbered, they still lead to the same states.
    ///
    /// Returns the number of removed states.
    pub fn remove_unreachable(&mut self) -> usize {
        let order: Vec<StateId> = self.reachable_states().collect();
        let mut renumbering = vec![None; self.size()];
        for (new, old) in order.iter().enumerate() {
            renumbering[old.into_usize()] = Some(StateId::from_usize(new));
        }

        let states = order
            .iter()
            .map(|old| {
                let mut state = self.states()[old.into_usize()].clone();
                state.remap_targets(|target| {
                    renumbering[target.into_usize()]
                        .expect("successors of reachable states must be reachable")
                });
                state
            })
            .collect();

        let removed = self.size() - order.len();
        debug!("removing {removed} of {} states as unreachable", self.size());
        self.replace_states(states, StateId::from_usize(0));
        removed
    }
}
