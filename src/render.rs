use std::fmt::Display;

use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::{Automaton, State, Symbol};

/// Renders the transition table of an [`Automaton`], with one row per state (sorted by name)
/// and one column per symbol. The initial state is marked with `->`, accepting states with `*`.
///
/// ```text
/// ╭───────┬─────┬─────╮
/// │ State │ '0' │ '1' │
/// ├───────┼─────┼─────┤
/// │ -> A  │ B   │ A   │
/// │    B  │ C   │ A   │
/// │    C* │ C   │ C   │
/// ╰───────┴─────┴─────╯
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TransitionTable<'a, S: Symbol> {
    automaton: &'a Automaton<S>,
    colored: bool,
}

impl<'a, S: Symbol> TransitionTable<'a, S> {
    /// Creates an uncolored table for `automaton`.
    pub fn new(automaton: &'a Automaton<S>) -> Self {
        Self {
            automaton,
            colored: false,
        }
    }

    /// Enables or disables highlighting of the initial and accepting states with ANSI colors.
    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    fn state_label(&self, state: &State<S>) -> String {
        let name = match (self.colored, state.is_initial(), state.is_accepting()) {
            (false, _, _) | (true, false, false) => state.name().to_string(),
            (true, true, _) => state.name().bold().to_string(),
            (true, false, true) => state.name().green().to_string(),
        };
        format!(
            "{}{}{}",
            if state.is_initial() { "-> " } else { "   " },
            name,
            if state.is_accepting() { "*" } else { "" }
        )
    }
}

impl<'a, S: Symbol> Display for TransitionTable<'a, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string())
                .chain(self.automaton.alphabet().iter().map(|s| format!("{:?}", s))),
        );
        for state in self.automaton.states().iter().sorted_by(|p, q| p.name().cmp(q.name())) {
            let mut row = vec![self.state_label(state)];
            for sym in self.automaton.alphabet() {
                row.push(
                    state
                        .transition(sym)
                        .ok()
                        .and_then(|target| self.automaton.state(target))
                        .map(|target| target.name().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            builder.push_record(row);
        }

        let mut table = builder.build();
        table.with(tabled::settings::Style::rounded());
        write!(f, "{table}")
    }
}

impl<S: Symbol> Automaton<S> {
    /// Returns a [`TransitionTable`] that renders `self`.
    pub fn transition_table(&self) -> TransitionTable<'_, S> {
        TransitionTable::new(self)
    }
}
