use std::cell::RefCell;
use std::collections::VecDeque;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Hands work to the next turn of the host event loop.
///
/// Style activation goes through a scheduler so that registry updates
/// triggered by the same burst of DOM insertions land before any block is
/// enabled or disabled.
pub trait Scheduler {
    fn defer(&self, task: Task);
}

/// FIFO task queue for hosts that drive their own loop (tests, the CLI).
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Runs tasks until the queue is empty, including tasks queued by the
    /// tasks themselves. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // The borrow must end before the task runs; tasks may defer more work.
            let next = self.tasks.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        if ran > 0 {
            log::trace!("Task queue drained {ran} task(s)");
        }
        ran
    }
}

impl Scheduler for TaskQueue {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let queue = TaskQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = Rc::clone(&order);
            queue.defer(Box::new(move || order.borrow_mut().push(i)));
        }

        assert_eq!(queue.pending(), 3);
        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_tasks_queued_by_tasks_also_run() {
        let queue = Rc::new(TaskQueue::new());
        let hits = Rc::new(RefCell::new(0));

        let inner_queue = Rc::clone(&queue);
        let inner_hits = Rc::clone(&hits);
        queue.defer(Box::new(move || {
            *inner_hits.borrow_mut() += 1;
            let hits = Rc::clone(&inner_hits);
            inner_queue.defer(Box::new(move || *hits.borrow_mut() += 1));
        }));

        assert_eq!(queue.run_until_idle(), 2);
        assert_eq!(*hits.borrow(), 2);
    }
}
