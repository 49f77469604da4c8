use std::collections::BTreeSet;

use crate::{
    math::{Map, Partition},
    Automaton, StateId, Symbol,
};

/// The signature of a state with respect to a [`Partition`]: for each symbol of the alphabet (in
/// its canonical order) the position of the block that contains the successor on that symbol.
/// Two states with equal signatures can not be distinguished by one more step.
pub type Signature = Vec<Option<usize>>;

/// Maps every state to the position of its block in a [`Partition`].
#[derive(Debug, Clone)]
pub struct BlockIndex(Vec<Option<usize>>);

impl BlockIndex {
    /// Indexes `partition` for an automaton with `size` states.
    pub fn new(partition: &Partition<StateId>, size: usize) -> Self {
        let mut index = vec![None; size];
        for (i, block) in partition.iter().enumerate() {
            for q in block {
                if let Some(slot) = index.get_mut(q.into_usize()) {
                    *slot = Some(i);
                }
            }
        }
        Self(index)
    }

    /// Returns the position of the block containing `q`.
    pub fn block_of(&self, q: StateId) -> Option<usize> {
        self.0.get(q.into_usize()).copied().flatten()
    }
}

/// Computes the coarsest partition of the states of an automaton into classes of equivalent
/// states, using Moore's algorithm.
///
/// Starting from the partition that separates accepting from rejecting states, every round
/// splits each block according to the [`Signature`]s of its states. Blocks are never merged, so
/// after at most `size - 1` rounds a round leaves the partition unchanged, and then two states
/// share a block exactly if no word distinguishes them.
///
/// As an [`Iterator`], the refiner yields every intermediate partition, beginning with the initial
/// one and ending with the fixpoint, which is yielded once.
#[derive(Debug, Clone)]
pub struct PartitionRefiner<'a, S: Symbol> {
    automaton: &'a Automaton<S>,
    current: Partition<StateId>,
    done: bool,
}

impl<'a, S: Symbol> PartitionRefiner<'a, S> {
    /// Prepares the refinement of the states of `automaton`. All states take part, so unreachable
    /// states should be removed beforehand.
    pub fn new(automaton: &'a Automaton<S>) -> Self {
        Self {
            current: Self::initial_partition(automaton),
            automaton,
            done: false,
        }
    }

    /// The partition that separates rejecting from accepting states, empty blocks are dropped.
    pub fn initial_partition(automaton: &Automaton<S>) -> Partition<StateId> {
        let (accepting, rejecting): (Vec<_>, Vec<_>) =
            automaton.state_ids().partition(|q| automaton.is_accepting(*q));
        Partition::new([rejecting, accepting])
    }

    /// Computes the signature of `q` with respect to the partition indexed by `index`.
    pub fn signature(&self, q: StateId, index: &BlockIndex) -> Signature {
        self.automaton
            .alphabet()
            .iter()
            .map(|sym| {
                self.automaton
                    .successor(q, sym)
                    .and_then(|p| index.block_of(p))
            })
            .collect()
    }

    /// Performs one round of refinement on `partition`. Every block is split into groups of
    /// states with the same signature, the groups of a block appear in the order in which their
    /// first state appears in the block.
    pub fn refine(&self, partition: &Partition<StateId>) -> Partition<StateId> {
        let index = BlockIndex::new(partition, self.automaton.size());
        let mut refined: Vec<BTreeSet<StateId>> = Vec::with_capacity(partition.size());

        for block in partition {
            let mut groups: Map<Signature, usize> = Map::default();
            for &q in block {
                let signature = self.signature(q, &index);
                let position = *groups.entry(signature).or_insert_with(|| {
                    refined.push(BTreeSet::new());
                    refined.len() - 1
                });
                refined[position].insert(q);
            }
        }

        Partition::from(refined)
    }

    /// The partition that the next round of refinement starts from.
    pub fn current(&self) -> &Partition<StateId> {
        &self.current
    }

    /// Refines until the fixpoint is reached and returns it.
    pub fn converge(self) -> Partition<StateId> {
        self.converge_observed(|_, _| {})
    }

    /// Works like [`PartitionRefiner::converge`], but calls `observer` with the number of the
    /// round and the partition for each partition that is computed, the fixpoint included.
    pub fn converge_observed<F>(mut self, mut observer: F) -> Partition<StateId>
    where
        F: FnMut(usize, &Partition<StateId>),
    {
        let mut round = 0;
        loop {
            observer(round, &self.current);
            let refined = self.refine(&self.current);
            // blocks only ever split, so an equal number of blocks means an equal partition
            if refined.size() == self.current.size() {
                return self.current;
            }
            self.current = refined;
            round += 1;
        }
    }
}

impl<'a, S: Symbol> Iterator for PartitionRefiner<'a, S> {
    type Item = Partition<StateId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let refined = self.refine(&self.current);
        let previous = std::mem::replace(&mut self.current, refined);
        self.done = previous.size() == self.current.size();
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::prelude::*;

    /// The example DFA from the Wikipedia article on DFA minimization.
    pub fn wiki_dfa() -> Automaton<char> {
        Automaton::define(
            [
                ("a", [('0', "b"), ('1', "c")]),
                ("b", [('0', "a"), ('1', "d")]),
                ("c", [('0', "e"), ('1', "f")]),
                ("d", [('0', "e"), ('1', "f")]),
                ("e", [('0', "e"), ('1', "f")]),
                ("f", [('0', "f"), ('1', "f")]),
            ],
            "a",
            ["c", "d", "e"],
        )
        .unwrap()
    }

    fn named(dfa: &Automaton<char>, partition: &Partition<StateId>) -> Partition<String> {
        Partition::new(partition.iter().map(|block| {
            block
                .iter()
                .map(|q| dfa.state(*q).unwrap().name().to_string())
                .collect_vec()
        }))
    }

    fn expected(blocks: &[&[&str]]) -> Partition<String> {
        Partition::new(
            blocks
                .iter()
                .map(|block| block.iter().map(|name| name.to_string())),
        )
    }

    #[test]
    fn initial_partition_splits_by_acceptance() {
        let dfa = wiki_dfa();
        let initial = PartitionRefiner::initial_partition(&dfa);
        assert_eq!(
            named(&dfa, &initial),
            expected(&[&["a", "b", "f"], &["c", "d", "e"]])
        );

        let all_rejecting =
            Automaton::define([("x", [('0', "x")])], "x", Vec::<&str>::new()).unwrap();
        assert_eq!(PartitionRefiner::initial_partition(&all_rejecting).size(), 1);
    }

    #[test_log::test]
    fn refines_to_equivalence_classes() {
        let dfa = wiki_dfa();
        let fixpoint = PartitionRefiner::new(&dfa).converge();
        assert_eq!(
            named(&dfa, &fixpoint),
            expected(&[&["a", "b"], &["c", "d", "e"], &["f"]])
        );
    }

    #[test]
    fn iterator_ends_with_fixpoint() {
        let dfa = wiki_dfa();
        let rounds = PartitionRefiner::new(&dfa).collect_vec();
        assert!(rounds.len() <= dfa.size());
        assert_eq!(rounds.last(), Some(&PartitionRefiner::new(&dfa).converge()));
        for (before, after) in rounds.iter().tuple_windows() {
            assert!(before.size() <= after.size());
        }
        assert_ne!(rounds[rounds.len() - 2], rounds[rounds.len() - 1]);
    }

    #[test]
    fn fixpoint_is_stable_under_refinement() {
        let already_stable =
            Automaton::define([("p", [('x', "r")]), ("r", [('x', "r")])], "p", ["r"]).unwrap();
        assert_eq!(PartitionRefiner::new(&already_stable).count(), 1);

        for dfa in [wiki_dfa(), already_stable] {
            let refiner = PartitionRefiner::new(&dfa);
            let fixpoint = PartitionRefiner::new(&dfa).converge();
            let again = refiner.refine(&fixpoint);
            assert_eq!(again, fixpoint);
            assert_eq!(again.element_count(), dfa.size());
        }
    }

    #[test]
    fn observer_sees_every_round() {
        let dfa = wiki_dfa();
        let mut sizes = vec![];
        let fixpoint = PartitionRefiner::new(&dfa)
            .converge_observed(|round, partition| sizes.push((round, partition.size())));
        assert_eq!(sizes.first(), Some(&(0, 2)));
        assert_eq!(sizes.last().map(|(_, size)| *size), Some(fixpoint.size()));
        assert_eq!(sizes.len(), PartitionRefiner::new(&dfa).count());
    }

    #[test]
    fn signatures_follow_alphabet_order() {
        let dfa = wiki_dfa();
        let refiner = PartitionRefiner::new(&dfa);
        let index = BlockIndex::new(refiner.current(), dfa.size());
        let a = dfa.state_by_name("a").unwrap();
        let f = dfa.state_by_name("f").unwrap();
        // blocks: 0 = rejecting {a, b, f}, 1 = accepting {c, d, e}
        assert_eq!(refiner.signature(a, &index), vec![Some(0), Some(1)]);
        assert_eq!(refiner.signature(f, &index), vec![Some(0), Some(0)]);
    }
}
