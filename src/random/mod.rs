use itertools::Itertools;
use tracing::trace;

use crate::prelude::*;

/// Returns the first `symbols` lowercase letters `a`, `b`, ... as alphabet.
pub fn alphabet_of_size(symbols: usize) -> Vec<char> {
    ('a'..).take(symbols).collect()
}

/// Generates a random automaton with `size` states named `s0`, `s1`, ... over an alphabet of
/// `symbols` letters (see [`alphabet_of_size`]). The initial state is `s0`, every transition
/// target is drawn uniformly and every state is accepting with probability 1/2. States that
/// are unreachable from `s0` are kept.
///
/// Panics if `size` is zero.
pub fn generate_random_dfa(symbols: usize, size: usize) -> Automaton<char> {
    assert!(size > 0, "an automaton needs at least one state");
    let alphabet = alphabet_of_size(symbols);
    let names = (0..size).map(|i| format!("s{i}")).collect_vec();

    let table = names
        .iter()
        .map(|name| {
            let row = alphabet
                .iter()
                .map(|sym| (*sym, names[fastrand::usize(..size)].as_str()))
                .collect_vec();
            (name.as_str(), row)
        })
        .collect_vec();
    let finals = names.iter().filter(|_| fastrand::bool()).collect_vec();
    trace!("generated random table {table:?} with final states {finals:?}");

    Automaton::define(table, &names[0], finals)
        .expect("randomly generated tables are always well formed")
}

/// Generate a random word over `alphabet` whose length is drawn uniformly from `min_len..=max_len`.
pub fn generate_random_word<S: Symbol>(alphabet: &[S], min_len: usize, max_len: usize) -> Vec<S> {
    if alphabet.is_empty() {
        return vec![];
    }
    let length = fastrand::usize(min_len..=max_len);
    (0..length)
        .map(|_| alphabet[fastrand::usize(..alphabet.len())].clone())
        .collect()
}

/// Enumerates all words over `alphabet` with a length between `1` and `max_len`, shorter words first.
pub fn all_words<S: Symbol>(alphabet: &[S], max_len: usize) -> impl Iterator<Item = Vec<S>> + '_ {
    (1..=max_len).flat_map(move |length| {
        std::iter::repeat(alphabet.iter().cloned())
            .take(length)
            .multi_cartesian_product()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_dfa_sized() {
        fastrand::seed(7);
        for size in 1..10 {
            let dfa = generate_random_dfa(3, size);
            assert_eq!(dfa.size(), size);
            assert_eq!(dfa.alphabet(), &['a', 'b', 'c']);
            assert_eq!(dfa.initial_state().name(), "s0");
            assert!(dfa.validate().is_ok());
        }
    }

    #[test]
    fn random_words() {
        fastrand::seed(7);
        let alphabet = alphabet_of_size(2);
        for _ in 0..20 {
            let word = generate_random_word(&alphabet, 1, 10);
            assert!((1..=10).contains(&word.len()));
            assert!(word.iter().all(|sym| alphabet.contains(sym)));
        }
        assert!(generate_random_word::<char>(&[], 3, 5).is_empty());
    }

    #[test]
    fn enumerates_all_words() {
        let words = all_words(&['a', 'b'], 3).collect_vec();
        assert_eq!(words.len(), 2 + 4 + 8);
        assert_eq!(words[0], vec!['a']);
        assert_eq!(words[2], vec!['a', 'a']);
        assert!(words.iter().all_unique());
    }
}
