/// Moore's partition refinement algorithm.
pub mod partition_refinement;

use itertools::Itertools;
use tracing::debug;

use crate::{math::Partition, Automaton, AutomatonError, StateId, Symbol};
use partition_refinement::{BlockIndex, PartitionRefiner};

/// Determines how the states of a minimized automaton are named.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlockNaming {
    /// States are called `m0`, `m1`, ... The block containing the initial state becomes `m0`,
    /// the remaining ones are numbered by the breadth-first order of their first member.
    #[default]
    Sequential,
    /// States are named by joining the names of their members (in breadth-first order) with the
    /// given separator. If this produces the same name for two states, minimization fails with
    /// [`AutomatonError::DuplicateState`].
    Joined(String),
}

impl BlockNaming {
    fn name<'a, I: IntoIterator<Item = &'a str>>(&self, position: usize, members: I) -> String {
        match self {
            BlockNaming::Sequential => format!("m{position}"),
            BlockNaming::Joined(separator) => members.into_iter().join(separator),
        }
    }
}

/// Observer that is called with the round number and the partition after each refinement round.
pub type RefinementObserver<'a> = Box<dyn FnMut(usize, &Partition<StateId>) + 'a>;

/// Configures and runs the minimization of an [`Automaton`], obtained through
/// [`Automaton::minimizer`].
pub struct Minimizer<'a, S: Symbol> {
    automaton: &'a Automaton<S>,
    naming: BlockNaming,
    observer: Option<RefinementObserver<'a>>,
}

impl<'a, S: Symbol> Minimizer<'a, S> {
    /// Creates a minimizer with [`BlockNaming::Sequential`] and no observer.
    pub fn new(automaton: &'a Automaton<S>) -> Self {
        Self {
            automaton,
            naming: BlockNaming::default(),
            observer: None,
        }
    }

    /// Sets the naming scheme for the states of the minimized automaton.
    pub fn naming(mut self, naming: BlockNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Registers `observer`, which is called once for every partition computed during refinement.
    pub fn on_refinement<F>(mut self, observer: F) -> Self
    where
        F: FnMut(usize, &Partition<StateId>) + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Computes the minimal automaton. The automaton this minimizer was created from is left
    /// untouched, unreachable states are removed from a copy.
    pub fn run(self) -> Result<Automaton<S>, AutomatonError> {
        let Self {
            automaton,
            naming,
            mut observer,
        } = self;

        let mut reachable = automaton.clone();
        reachable.remove_unreachable();

        let partition = PartitionRefiner::new(&reachable).converge_observed(|round, partition| {
            debug!("PI_{round}: {}", show_partition(&reachable, partition));
            if let Some(observer) = observer.as_mut() {
                observer(round, partition);
            }
        });
        debug!(
            "partition refinement converged with {} of {} states",
            partition.size(),
            reachable.size()
        );

        rebuild(&reachable, canonical(partition), &naming)
    }
}

impl<S: Symbol> Automaton<S> {
    /// Computes the unique minimal automaton that accepts the same language as `self`, with
    /// states named by [`BlockNaming::Sequential`]. Use [`Automaton::minimizer`] for more control.
    ///
    /// # Example
    /// ```
    /// use moore_dfa::prelude::*;
    ///
    /// let dfa = Automaton::define(
    ///     [
    ///         ("p", [('a', "q")]),
    ///         ("q", [('a', "r")]),
    ///         ("r", [('a', "q")]),
    ///     ],
    ///     "p",
    ///     ["q", "r"],
    /// )
    /// .unwrap();
    /// let minimal = dfa.minimize().unwrap();
    /// assert_eq!(minimal.size(), 2);
    /// ```
    pub fn minimize(&self) -> Result<Automaton<S>, AutomatonError> {
        self.minimizer().run()
    }

    /// Returns a [`Minimizer`] for `self`.
    pub fn minimizer(&self) -> Minimizer<'_, S> {
        Minimizer::new(self)
    }
}

/// Orders the blocks by their smallest member. In an automaton whose arena is in breadth-first
/// order, the block of the initial state comes first.
fn canonical(partition: Partition<StateId>) -> Partition<StateId> {
    let mut blocks = partition.into_blocks();
    blocks.sort_by_key(|block| block.first().copied());
    Partition::from(blocks)
}

fn show_partition<S: Symbol>(automaton: &Automaton<S>, partition: &Partition<StateId>) -> String {
    partition
        .iter()
        .map(|block| {
            format!(
                "{{{}}}",
                block
                    .iter()
                    .filter_map(|q| automaton.state(*q).map(|state| state.name()))
                    .join(", ")
            )
        })
        .join(" ")
}

/// Builds the quotient of `automaton` under `partition`, which must be a fixpoint of refinement.
fn rebuild<S: Symbol>(
    automaton: &Automaton<S>,
    partition: Partition<StateId>,
    naming: &BlockNaming,
) -> Result<Automaton<S>, AutomatonError> {
    let names = partition
        .iter()
        .enumerate()
        .map(|(position, block)| {
            naming.name(
                position,
                block
                    .iter()
                    .filter_map(|q| automaton.state(*q).map(|state| state.name())),
            )
        })
        .collect_vec();
    let index = BlockIndex::new(&partition, automaton.size());

    let table = partition.iter().zip(&names).map(|(block, name)| {
        let row = automaton
            .alphabet()
            .iter()
            .filter_map(|sym| {
                let representative = block.first()?;
                let target = automaton.successor(*representative, sym)?;
                Some((sym.clone(), names[index.block_of(target)?].clone()))
            })
            .collect_vec();
        (name.clone(), row)
    });

    let initial = index
        .block_of(automaton.initial())
        .map(|position| names[position].clone())
        .ok_or_else(|| AutomatonError::InitialState(automaton.initial_state().name().to_string()))?;
    let finals = automaton
        .finals()
        .iter()
        .filter_map(|q| index.block_of(*q))
        .unique()
        .map(|position| names[position].clone())
        .collect_vec();

    Automaton::define(table, &initial, finals)
}
