use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type NextFn<T> = Rc<dyn Fn(&T)>;
type CompleteFn = Rc<dyn Fn()>;

struct Listener<T> {
    id: u64,
    next: NextFn<T>,
    complete: Option<CompleteFn>,
}

struct StreamState<T> {
    listeners: RefCell<Vec<Listener<T>>>,
    next_id: Cell<u64>,
    closed: Cell<bool>,
}

impl<T> StreamState<T> {
    fn is_registered(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|l| l.id == id)
    }

    fn detach(&self, id: u64) {
        self.listeners.borrow_mut().retain(|l| l.id != id);
    }
}

/// Multicast push stream with synchronous delivery.
///
/// Every component in the engine publishes its state changes through an
/// `EventStream`. Cloning the stream hands out another handle to the same
/// listener set, so a component can keep the emitting side private while
/// exposing a clone for subscription.
///
/// # Delivery guarantees
///
/// - `emit` returns only after every listener has run to completion.
/// - A listener added while an emission is in progress does not receive the
///   value being emitted; a listener removed mid-emission no longer does.
/// - Listeners may emit again (on this or any other stream) from inside
///   their callback.
/// - Values are never buffered: a late subscriber only sees future values.
///
/// # Examples
///
/// ```no_run
/// use engine::stream::EventStream;
///
/// let stream = EventStream::<u32>::new();
/// let sub = stream.subscribe(|value| println!("got {value}"));
/// stream.emit(&1);
/// sub.unsubscribe();
/// stream.emit(&2); // nobody listening
/// ```
pub struct EventStream<T> {
    state: Rc<StreamState<T>>,
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: 'static> EventStream<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(StreamState {
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                closed: Cell::new(false),
            }),
        }
    }

    /// Registers a listener for future values.
    pub fn subscribe(&self, next: impl Fn(&T) + 'static) -> Subscription {
        self.attach(Rc::new(next), None)
    }

    /// Registers a listener plus a callback invoked once when the stream
    /// completes. Subscribing to an already completed stream runs `complete`
    /// immediately.
    pub fn subscribe_with(
        &self,
        next: impl Fn(&T) + 'static,
        complete: impl Fn() + 'static,
    ) -> Subscription {
        self.attach(Rc::new(next), Some(Rc::new(complete)))
    }

    fn attach(&self, next: NextFn<T>, complete: Option<CompleteFn>) -> Subscription {
        if self.state.closed.get() {
            if let Some(complete) = complete {
                complete();
            }
            return Subscription::empty();
        }

        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        self.state
            .listeners
            .borrow_mut()
            .push(Listener { id, next, complete });

        let weak: Weak<StreamState<T>> = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                state.detach(id);
            }
        })
    }

    /// Delivers `value` to every current listener.
    pub fn emit(&self, value: &T) {
        if self.state.closed.get() {
            return;
        }

        // Snapshot so listeners can subscribe/unsubscribe while we iterate.
        let snapshot: Vec<(u64, NextFn<T>)> = self
            .state
            .listeners
            .borrow()
            .iter()
            .map(|l| (l.id, Rc::clone(&l.next)))
            .collect();

        for (id, next) in snapshot {
            if self.state.is_registered(id) {
                next(value);
            }
        }
    }

    /// Closes the stream. Completion callbacks run once, all listeners are
    /// released and later emissions are ignored.
    pub fn complete(&self) {
        if self.state.closed.replace(true) {
            return;
        }

        let listeners = std::mem::take(&mut *self.state.listeners.borrow_mut());
        for listener in listeners {
            if let Some(complete) = listener.complete {
                complete();
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.get()
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }
}

impl<T: 'static> Default for EventStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for an attached listener.
///
/// Dropping the handle detaches the listener. The same type wraps native
/// listener registrations (storage watches, DOM observers, navigation
/// listeners) so owners can tear everything down uniformly.
#[must_use = "dropping a Subscription detaches the listener immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription with nothing to detach.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    pub fn unsubscribe(mut self) {
        self.run_teardown();
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
