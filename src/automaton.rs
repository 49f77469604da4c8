use std::{borrow::Borrow, cell::OnceCell};

use itertools::Itertools;
use tracing::{trace, warn};

use crate::{
    math::{Bijection, Set},
    AutomatonError, State, StateId, Symbol,
};

/// Breadth-first reachability and the removal of unreachable states.
pub mod reachable;

/// A deterministic finite automaton over symbols of type `S`.
///
/// The automaton owns its [`State`]s in an arena, transitions refer to their targets by
/// [`StateId`]. Exactly one state is initial and every state has a transition for each symbol
/// of the [`Automaton::alphabet`] and for no other symbol. These invariants are established by
/// [`Automaton::define`] and [`Automaton::from_states`], so every `Automaton` that can be observed
/// is well formed.
#[derive(Debug, Clone)]
pub struct Automaton<S: Symbol> {
    states: Vec<State<S>>,
    initial: StateId,
    alphabet: Vec<S>,
    finals: Vec<StateId>,
    names: OnceCell<Bijection<String, StateId>>,
}

impl<S: Symbol> Automaton<S> {
    /// Builds an automaton from a transition table that maps each state name to its outgoing
    /// transitions, given as pairs of symbol and target name. The state called `initial` becomes
    /// the initial state and all states whose names appear in `finals` are accepting.
    ///
    /// The alphabet is taken from the first row of the table, in the order in which the symbols
    /// appear there.
    ///
    /// # Example
    /// ```
    /// use moore_dfa::prelude::*;
    ///
    /// let dfa = Automaton::define(
    ///     [
    ///         ("even", [('a', "odd"), ('b', "even")]),
    ///         ("odd", [('a', "even"), ('b', "odd")]),
    ///     ],
    ///     "even",
    ///     ["even"],
    /// )
    /// .unwrap();
    /// assert_eq!(dfa.check("abba".chars()), Ok(true));
    /// assert_eq!(dfa.check("ab".chars()), Ok(false));
    /// ```
    pub fn define<T, N, R, M, F, Q>(table: T, initial: &str, finals: F) -> Result<Self, AutomatonError>
    where
        T: IntoIterator<Item = (N, R)>,
        N: Into<String>,
        R: IntoIterator<Item = (S, M)>,
        M: AsRef<str>,
        F: IntoIterator<Item = Q>,
        Q: AsRef<str>,
    {
        let rows: Vec<(String, Vec<(S, M)>)> = table
            .into_iter()
            .map(|(name, row)| (name.into(), row.into_iter().collect_vec()))
            .collect();
        if rows.is_empty() {
            return Err(AutomatonError::NoStates);
        }
        if StateId::try_from_usize(rows.len() - 1).is_none() {
            return Err(AutomatonError::TooManyStates(rows.len()));
        }

        let mut names = Bijection::new();
        for (i, (name, _)) in rows.iter().enumerate() {
            if names.contains_left(name) {
                return Err(AutomatonError::DuplicateState(name.clone()));
            }
            names.insert(name.clone(), StateId::from_usize(i));
        }

        let mut accepting = Set::default();
        for name in finals {
            match names.get_by_left(name.as_ref()) {
                Some(id) => {
                    accepting.insert(*id);
                }
                None => warn!("ignoring final state `{}` which is not in the table", name.as_ref()),
            }
        }

        let mut states = Vec::with_capacity(rows.len());
        for (name, row) in &rows {
            let mut transitions = Vec::with_capacity(row.len());
            let mut seen = Set::default();
            for (symbol, target) in row {
                if !seen.insert(symbol) {
                    return Err(AutomatonError::DuplicateSymbol {
                        state: name.clone(),
                        symbol: format!("{symbol:?}"),
                    });
                }
                let Some(id) = names.get_by_left(target.as_ref()) else {
                    return Err(AutomatonError::InvalidTarget {
                        state: name.clone(),
                        symbol: format!("{symbol:?}"),
                        target: target.as_ref().to_string(),
                    });
                };
                transitions.push((symbol.clone(), *id));
            }
            states.push(
                State::new(name.clone())
                    .with_initial(name == initial)
                    .with_accepting(accepting.contains(&StateId::from_usize(states.len())))
                    .with_transitions(transitions),
            );
        }

        let Some(&initial) = names.get_by_left(initial) else {
            return Err(AutomatonError::InitialState(initial.to_string()));
        };

        let alphabet = rows[0].1.iter().map(|(sym, _)| sym.clone()).unique().collect_vec();
        let automaton = Self::assemble(states, initial, alphabet, OnceCell::from(names));
        automaton.validate()?;
        trace!(
            "defined automaton with {} states over {} symbols",
            automaton.size(),
            automaton.alphabet.len()
        );
        Ok(automaton)
    }

    /// Assembles an automaton from states that were built by hand, where `initial` is the
    /// position of the initial state in `states`. The alphabet is derived from the first state.
    pub fn from_states(mut states: Vec<State<S>>, initial: StateId) -> Result<Self, AutomatonError> {
        let first = states.first().ok_or(AutomatonError::NoStates)?;
        first.validate(None, states.len())?;
        let alphabet = first.symbols().cloned().collect_vec();

        let Some(initial_name) = states.get(initial.into_usize()).map(|q| q.name().to_string()) else {
            return Err(AutomatonError::InitialState(format!("{initial:?}")));
        };
        if let Some(other) = states
            .iter()
            .enumerate()
            .find(|(i, q)| q.is_initial() && *i != initial.into_usize())
        {
            return Err(AutomatonError::MultipleInitial(
                other.1.name().to_string(),
                initial_name,
            ));
        }
        states[initial.into_usize()].set_initial(true);

        let automaton = Self::assemble(states, initial, alphabet, OnceCell::new());
        automaton.validate()?;
        Ok(automaton)
    }

    fn assemble(
        states: Vec<State<S>>,
        initial: StateId,
        alphabet: Vec<S>,
        names: OnceCell<Bijection<String, StateId>>,
    ) -> Self {
        let finals = states
            .iter()
            .enumerate()
            .filter(|(_, q)| q.is_accepting())
            .map(|(i, _)| StateId::from_usize(i))
            .collect();
        Self {
            states,
            initial,
            alphabet,
            finals,
            names,
        }
    }

    /// Checks that `self` is a well formed deterministic automaton: it has exactly one initial
    /// state, state names are unique, and every state has exactly one transition for each symbol
    /// of the alphabet that leads to a state of `self`. Rebuilds the index from names to states if
    /// it was dropped. Calling this repeatedly has no further effect.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        if self.states.is_empty() {
            return Err(AutomatonError::NoStates);
        }
        let initial = self
            .states
            .get(self.initial.into_usize())
            .ok_or_else(|| AutomatonError::InitialState(format!("{:?}", self.initial)))?;
        if !initial.is_initial() {
            return Err(AutomatonError::InitialState(initial.name().to_string()));
        }

        let mut seen = Set::default();
        for (i, state) in self.states.iter().enumerate() {
            if !seen.insert(state.name()) {
                return Err(AutomatonError::DuplicateState(state.name().to_string()));
            }
            if state.is_initial() && i != self.initial.into_usize() {
                return Err(AutomatonError::MultipleInitial(
                    state.name().to_string(),
                    initial.name().to_string(),
                ));
            }
            state.validate(Some(self.alphabet.as_slice()), self.states.len())?;
        }

        self.name_index();
        Ok(())
    }

    fn name_index(&self) -> &Bijection<String, StateId> {
        self.names.get_or_init(|| {
            self.states
                .iter()
                .enumerate()
                .map(|(i, q)| (q.name().to_string(), StateId::from_usize(i)))
                .collect()
        })
    }

    /// Runs `word` from the initial state and returns whether the reached state is accepting.
    /// Fails if `word` is empty or contains a symbol that is not part of the alphabet.
    pub fn check<W, B>(&self, word: W) -> Result<bool, AutomatonError>
    where
        W: IntoIterator<Item = B>,
        B: Borrow<S>,
    {
        let reached = self.run(word)?;
        let accepted = self.is_accepting(reached);
        trace!(
            "run ends in `{}`, word is {}",
            self.states[reached.into_usize()].name(),
            if accepted { "accepted" } else { "rejected" }
        );
        Ok(accepted)
    }

    /// Runs `word` from the initial state and returns the state that is reached.
    pub fn run<W, B>(&self, word: W) -> Result<StateId, AutomatonError>
    where
        W: IntoIterator<Item = B>,
        B: Borrow<S>,
    {
        let mut word = word.into_iter();
        let first = word.next().ok_or(AutomatonError::EmptySequence)?;
        let mut current = self.initial_state().transition(first)?;
        for symbol in word {
            current = self.states[current.into_usize()].transition(symbol)?;
        }
        Ok(current)
    }

    /// Returns the successor of `q` on `symbol`, if it exists.
    pub fn successor(&self, q: StateId, symbol: &S) -> Option<StateId> {
        self.state(q)?.transitions()?.get(symbol).copied()
    }

    /// All states in arena order.
    pub fn states(&self) -> &[State<S>] {
        &self.states
    }

    /// Iterates over the ids of all states in arena order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId::from_usize)
    }

    /// Gives the state with the given id.
    pub fn state(&self, id: StateId) -> Option<&State<S>> {
        self.states.get(id.into_usize())
    }

    /// Looks up a state by its name.
    pub fn state_by_name(&self, name: &str) -> Option<StateId> {
        self.name_index().get_by_left(name).copied()
    }

    /// The number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Id of the initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// The initial state.
    pub fn initial_state(&self) -> &State<S> {
        &self.states[self.initial.into_usize()]
    }

    /// The alphabet in its canonical order.
    pub fn alphabet(&self) -> &[S] {
        &self.alphabet
    }

    /// Ids of all accepting states, may be empty.
    pub fn finals(&self) -> &[StateId] {
        &self.finals
    }

    /// Names of all accepting states.
    pub fn final_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.finals
            .iter()
            .map(|q| self.states[q.into_usize()].name())
    }

    /// Whether `q` is an accepting state.
    pub fn is_accepting(&self, q: StateId) -> bool {
        self.state(q).map(State::is_accepting).unwrap_or(false)
    }

    /// Derives the transition table of `self` in the format that [`Automaton::define`] takes,
    /// rows in arena order and each row in alphabet order.
    pub fn to_table(&self) -> Vec<(String, Vec<(S, String)>)> {
        self.states
            .iter()
            .map(|q| {
                let row = self
                    .alphabet
                    .iter()
                    .filter_map(|sym| {
                        let target = q.transitions()?.get(sym)?;
                        Some((sym.clone(), self.states[target.into_usize()].name().to_string()))
                    })
                    .collect();
                (q.name().to_string(), row)
            })
            .collect()
    }

    /// Replaces the states of `self` by `states`, where `initial` points into the new arena.
    /// Used when the arena is compacted.
    pub(crate) fn replace_states(&mut self, states: Vec<State<S>>, initial: StateId) {
        self.finals = states
            .iter()
            .enumerate()
            .filter(|(_, q)| q.is_accepting())
            .map(|(i, _)| StateId::from_usize(i))
            .collect();
        self.states = states;
        self.initial = initial;
        self.names = OnceCell::new();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::prelude::*;

    /// Accepts all words over `{0, 1}` that contain `00`.
    pub fn contains_double_zero() -> Automaton<u8> {
        Automaton::define(
            [
                ("A", [(0, "B"), (1, "A")]),
                ("B", [(0, "C"), (1, "A")]),
                ("C", [(0, "C"), (1, "C")]),
            ],
            "A",
            ["C"],
        )
        .unwrap()
    }

    #[test_log::test]
    fn accepts_words_ending_in_final_state() {
        let dfa = contains_double_zero();
        assert_eq!(dfa.check([1u8, 1, 0, 0]), Ok(true));
        assert_eq!(dfa.check([1u8, 1]), Ok(false));
        assert_eq!(dfa.check(&[0u8, 1, 0]), Ok(false));
        assert_eq!(
            dfa.run([1u8, 0]).map(|q| dfa.state(q).unwrap().name().to_string()),
            Ok("B".to_string())
        );
    }

    #[test]
    fn empty_word_is_rejected_with_error() {
        let dfa = contains_double_zero();
        assert_eq!(dfa.check(Vec::<u8>::new()), Err(AutomatonError::EmptySequence));
        assert_eq!(
            dfa.check(Vec::<u8>::new()).unwrap_err().kind(),
            ErrorKind::Sequence
        );
    }

    #[test]
    fn unknown_symbol_aborts_check() {
        let dfa = contains_double_zero();
        assert_eq!(
            dfa.check([0u8, 7, 0]),
            Err(AutomatonError::UnknownSymbol {
                state: "B".into(),
                symbol: "7".into()
            })
        );
    }

    #[test]
    fn derived_components() {
        let dfa = contains_double_zero();
        assert_eq!(dfa.size(), 3);
        assert_eq!(dfa.alphabet(), &[0, 1]);
        assert_eq!(dfa.initial_state().name(), "A");
        assert_eq!(dfa.final_names().collect::<Vec<_>>(), vec!["C"]);
        assert_eq!(dfa.state_by_name("B"), Some(StateId::from_usize(1)));
        assert_eq!(dfa.state_by_name("Z"), None);
        assert!(dfa.is_accepting(StateId::from_usize(2)));
    }

    #[test]
    fn define_rejects_malformed_tables() {
        let missing_initial = Automaton::define([("A", [('a', "A")])], "X", ["A"]);
        assert_eq!(
            missing_initial.unwrap_err(),
            AutomatonError::InitialState("X".into())
        );

        let dangling = Automaton::define([("A", [('a', "B")])], "A", Vec::<&str>::new());
        assert!(matches!(
            dangling,
            Err(AutomatonError::InvalidTarget { ref target, .. }) if target == "B"
        ));

        let mismatch = Automaton::define(
            [("A", vec![('a', "A"), ('b', "B")]), ("B", vec![('a', "A")])],
            "A",
            Vec::<&str>::new(),
        );
        assert_eq!(mismatch.unwrap_err().kind(), ErrorKind::Alphabet);

        let duplicate = Automaton::define(
            [("A", [('a', "A")]), ("A", [('a', "A")])],
            "A",
            Vec::<&str>::new(),
        );
        assert_eq!(
            duplicate.unwrap_err(),
            AutomatonError::DuplicateState("A".into())
        );

        let repeated_symbol = Automaton::define(
            [("A", vec![('a', "A"), ('a', "B")]), ("B", vec![('a', "B")])],
            "A",
            ["A"],
        );
        assert_eq!(
            repeated_symbol.unwrap_err(),
            AutomatonError::DuplicateSymbol {
                state: "A".into(),
                symbol: "'a'".into()
            }
        );

        let repeated_later = Automaton::define(
            [("A", vec![('a', "B")]), ("B", vec![('a', "A"), ('a', "B")])],
            "A",
            Vec::<&str>::new(),
        );
        assert_eq!(repeated_later.unwrap_err().kind(), ErrorKind::Alphabet);

        let empty: Vec<(&str, Vec<(char, &str)>)> = vec![];
        assert_eq!(
            Automaton::define(empty, "A", Vec::<&str>::new()).unwrap_err(),
            AutomatonError::NoStates
        );
    }

    #[test]
    fn automaton_without_final_states_is_legal() {
        let dfa = Automaton::define([("A", [('a', "A")])], "A", Vec::<&str>::new()).unwrap();
        assert!(dfa.finals().is_empty());
        assert_eq!(dfa.check("aaa".chars()), Ok(false));
    }

    #[test]
    fn unknown_final_names_are_ignored() {
        let dfa = Automaton::define([("A", [('a', "A")])], "A", ["A", "ghost"]).unwrap();
        assert_eq!(dfa.finals(), &[StateId::from_usize(0)]);
    }

    #[test]
    fn validate_is_idempotent() {
        let dfa = contains_double_zero();
        assert!(dfa.validate().is_ok());
        let before = dfa.to_table();
        assert!(dfa.validate().is_ok());
        assert_eq!(before, dfa.to_table());
    }

    #[test]
    fn table_round_trip() {
        let dfa = contains_double_zero();
        let finals = dfa.final_names().map(str::to_string).collect::<Vec<_>>();
        let again = Automaton::define(dfa.to_table(), dfa.initial_state().name(), finals).unwrap();
        assert_eq!(again.to_table(), dfa.to_table());
        for word in [vec![0u8, 0], vec![1, 0, 1], vec![1, 0, 0, 1], vec![0]] {
            assert_eq!(dfa.check(&word), again.check(&word));
        }
    }

    #[test]
    fn from_hand_built_states() {
        let q = StateId::from_usize;
        let states = vec![
            State::new("p").with_transitions([('a', q(1))]),
            State::new("r")
                .with_accepting(true)
                .with_transitions([('a', q(0))]),
        ];
        let dfa = Automaton::from_states(states, q(0)).unwrap();
        assert!(dfa.initial_state().is_initial());
        assert_eq!(dfa.check("a".chars()), Ok(true));
        assert_eq!(dfa.check("aa".chars()), Ok(false));

        let undefined = vec![
            State::new("p").with_transitions([('a', q(1))]),
            State::new("r"),
        ];
        assert_eq!(
            Automaton::from_states(undefined, q(0)).unwrap_err(),
            AutomatonError::UndefinedTransitions("r".into())
        );

        let out_of_range = vec![State::new("p").with_transitions([('a', q(4))])];
        assert!(matches!(
            Automaton::from_states(out_of_range, q(0)),
            Err(AutomatonError::InvalidTarget { .. })
        ));

        let no_such_initial = vec![State::new("p").with_transitions([('a', q(0))])];
        assert_eq!(
            Automaton::from_states(no_such_initial, q(3))
                .unwrap_err()
                .kind(),
            ErrorKind::Structural
        );

        let two_initial = vec![
            State::new("p").with_transitions([('a', q(1))]),
            State::new("r")
                .with_initial(true)
                .with_transitions([('a', q(0))]),
        ];
        assert_eq!(
            Automaton::from_states(two_initial, q(0)).unwrap_err(),
            AutomatonError::MultipleInitial("r".into(), "p".into())
        );
    }

    #[test]
    fn composite_symbols() {
        let dfa = Automaton::define(
            [
                ("idle", [(vec![1, 2], "busy"), (vec![2, 1], "idle")]),
                ("busy", [(vec![1, 2], "busy"), (vec![2, 1], "idle")]),
            ],
            "idle",
            ["busy"],
        )
        .unwrap();
        assert_eq!(dfa.check([vec![2, 1], vec![1, 2]]), Ok(true));
        assert_eq!(dfa.check([vec![1, 2], vec![2, 1]]), Ok(false));
    }
}
