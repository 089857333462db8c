//! Per-mode FIFO queues of pending actions.

use crate::hash_map::{Action, Mode};
use std::collections::VecDeque;

/// One FIFO queue per mode; drain order is generation order.
#[derive(Clone, Debug, Default)]
pub struct ActionQueues {
    queues: [VecDeque<Action>; 4],
}

impl ActionQueues {
    /// Create four empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a generated action list to a mode's queue.
    pub fn enqueue<I>(&mut self, mode: Mode, actions: I)
    where
        I: IntoIterator<Item = Action>,
    {
        self.queues[mode.index()].extend(actions);
    }

    /// Remove the oldest pending action of a mode.
    #[inline]
    pub fn pop(&mut self, mode: Mode) -> Option<Action> {
        self.queues[mode.index()].pop_front()
    }

    /// Oldest pending action of a mode, without removing it.
    pub fn peek(&self, mode: Mode) -> Option<&Action> {
        self.queues[mode.index()].front()
    }

    /// Drop every pending action of a mode.
    pub fn clear(&mut self, mode: Mode) {
        self.queues[mode.index()].clear();
    }

    /// Drop every pending action of every mode.
    pub fn clear_all(&mut self) {
        self.queues.iter_mut().for_each(VecDeque::clear);
    }

    /// Number of pending actions of a mode.
    pub fn len(&self, mode: Mode) -> usize {
        self.queues[mode.index()].len()
    }

    /// Whether a mode has nothing pending.
    pub fn is_empty(&self, mode: Mode) -> bool {
        self.queues[mode.index()].is_empty()
    }

    /// Pending actions of a mode in drain order.
    pub fn pending(&self, mode: Mode) -> impl Iterator<Item = &Action> + '_ {
        self.queues[mode.index()].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queues_are_fifo_and_independent() {
        let mut queues = ActionQueues::new();
        queues.enqueue(
            Mode::Linear,
            [Action::DeleteFail { key: 1 }, Action::DeleteFail { key: 2 }],
        );
        queues.enqueue(Mode::Chain, [Action::DeleteFail { key: 3 }]);

        assert_eq!(queues.len(Mode::Linear), 2);
        assert_eq!(queues.len(Mode::Chain), 1);
        assert!(queues.is_empty(Mode::Quad));

        assert_eq!(queues.peek(Mode::Linear).map(Action::key), Some(1));
        assert_eq!(queues.pop(Mode::Linear).map(|a| a.key()), Some(1));
        assert_eq!(queues.pop(Mode::Linear).map(|a| a.key()), Some(2));
        assert_eq!(queues.pop(Mode::Linear), None);

        queues.clear(Mode::Chain);
        assert!(queues.is_empty(Mode::Chain));
    }

    #[test]
    fn clear_all_empties_every_mode() {
        let mut queues = ActionQueues::new();
        for mode in Mode::ALL {
            queues.enqueue(mode, [Action::DeleteFail { key: 0 }]);
        }
        assert_eq!(queues.pending(Mode::Double).count(), 1);

        queues.clear_all();
        assert!(Mode::ALL.iter().all(|&m| queues.is_empty(m)));
    }
}
