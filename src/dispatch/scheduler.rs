// Transitions différées, triées par échéance

use crate::instrument::{Color, Key, Note};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

/// State change applied when a scheduled task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Silence `note`
    NoteOff { note: Note },
    /// Put `key` back to the color it had when the task was created
    HighlightOff { key: Key, restore: Color },
}

/// One pending one-shot timer.
///
/// `seq` is the scheduling order; tasks due at the same instant fire in the
/// order they were scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub fire_at: Duration,
    pub seq: u64,
    pub transition: Transition,
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .cmp(&other.fire_at)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of pending tasks. Tasks are never cancelled or merged: every
/// scheduled task is returned exactly once by `pop_due`.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<ScheduledTask>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        now: Duration,
        delay: Duration,
        transition: Transition,
    ) -> ScheduledTask {
        let task = ScheduledTask {
            fire_at: now.saturating_add(delay),
            seq: self.next_seq,
            transition,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(task));
        task
    }

    /// Remove and return the earliest task due at or before `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledTask> {
        let due = self
            .queue
            .peek()
            .is_some_and(|Reverse(task)| task.fire_at <= now);
        if due {
            self.queue.pop().map(|Reverse(task)| task)
        } else {
            None
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(task)| task.fire_at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending tasks in firing order
    pub fn pending(&self) -> Vec<ScheduledTask> {
        let mut tasks: Vec<ScheduledTask> = self.queue.iter().map(|Reverse(t)| *t).collect();
        tasks.sort();
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_pop_due_respects_fire_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(250), Transition::NoteOff { note: 62 });

        assert!(scheduler.pop_due(ms(249)).is_none());
        let task = scheduler.pop_due(ms(250)).unwrap();
        assert_eq!(task.fire_at, ms(250));
        assert_eq!(task.transition, Transition::NoteOff { note: 62 });
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_earliest_task_fires_first() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(250), Transition::NoteOff { note: 60 });
        scheduler.schedule(ms(10), ms(100), Transition::NoteOff { note: 61 });

        assert_eq!(scheduler.next_deadline(), Some(ms(110)));
        let first = scheduler.pop_due(ms(1000)).unwrap();
        let second = scheduler.pop_due(ms(1000)).unwrap();
        assert_eq!(first.transition, Transition::NoteOff { note: 61 });
        assert_eq!(second.transition, Transition::NoteOff { note: 60 });
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut scheduler = Scheduler::new();
        for note in [64, 60, 62] {
            scheduler.schedule(ms(5), ms(5), Transition::NoteOff { note });
        }

        let fired: Vec<Transition> = std::iter::from_fn(|| scheduler.pop_due(ms(10)))
            .map(|t| t.transition)
            .collect();
        assert_eq!(
            fired,
            vec![
                Transition::NoteOff { note: 64 },
                Transition::NoteOff { note: 60 },
                Transition::NoteOff { note: 62 },
            ]
        );
    }

    #[test]
    fn test_identical_tasks_are_not_merged() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(250), Transition::NoteOff { note: 62 });
        scheduler.schedule(ms(0), ms(250), Transition::NoteOff { note: 62 });

        assert_eq!(scheduler.len(), 2);
        assert!(scheduler.pop_due(ms(250)).is_some());
        assert!(scheduler.pop_due(ms(250)).is_some());
        assert!(scheduler.pop_due(ms(250)).is_none());
    }

    #[test]
    fn test_pending_is_sorted() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(0), ms(300), Transition::NoteOff { note: 1 });
        scheduler.schedule(ms(0), ms(100), Transition::NoteOff { note: 2 });
        scheduler.schedule(ms(0), ms(200), Transition::NoteOff { note: 3 });

        let times: Vec<Duration> = scheduler.pending().iter().map(|t| t.fire_at).collect();
        assert_eq!(times, vec![ms(100), ms(200), ms(300)]);
        assert_eq!(scheduler.len(), 3);
    }
}
