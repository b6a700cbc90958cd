//! Disposable change-notification handles.
//!
//! Every `connect_*` call in this crate returns a [`Subscription`]. Dropping
//! it (or calling [`Subscription::dispose`]) disconnects the callback, so an
//! owner that keeps its handles in a [`SubscriptionSet`] cannot leak them.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A connected callback. Disconnects on drop.
#[must_use = "dropping a Subscription disconnects it immediately"]
pub struct Subscription {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Creates a subscription that runs `disconnect` once when disposed.
    pub fn new(disconnect: impl FnOnce() + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    /// A subscription with nothing to disconnect.
    pub fn empty() -> Self {
        Self { disconnect: None }
    }

    pub fn dispose(mut self) {
        self.disconnect_now();
    }

    fn disconnect_now(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.disconnect_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.disconnect.is_some())
            .finish()
    }
}

/// Owns subscriptions and disposes all of them together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Disposes every subscription, in reverse connection order.
    pub fn clear(&mut self) {
        while let Some(subscription) = self.subscriptions.pop() {
            subscription.dispose();
        }
    }
}

impl Extend<Subscription> for SubscriptionSet {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.clear();
    }
}

type Slot<A> = Rc<dyn Fn(&A)>;

struct Slots<A: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Slot<A>)>,
}

/// A list of callbacks invoked with a borrowed argument.
///
/// Callbacks run with no internal borrow held, so they may connect, disconnect
/// or emit on the same signal.
pub(crate) struct Signal<A: ?Sized + 'static> {
    slots: Rc<RefCell<Slots<A>>>,
}

impl<A: ?Sized + 'static> Signal<A> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub(crate) fn connect(&self, callback: impl Fn(&A) + 'static) -> Subscription {
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, Rc::new(callback)));
            id
        };

        let weak: Weak<RefCell<Slots<A>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    pub(crate) fn emit(&self, arg: &A) {
        let callbacks: Vec<Slot<A>> = self
            .slots
            .borrow()
            .entries
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(arg);
        }
    }

    pub(crate) fn connection_count(&self) -> usize {
        self.slots.borrow().entries.len()
    }
}

impl<A: ?Sized + 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let subscription = Subscription::new(move || c.set(c.get() + 1));
        subscription.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_set_disposes_all_on_drop() {
        let count = Rc::new(Cell::new(0));
        {
            let mut set = SubscriptionSet::new();
            for _ in 0..3 {
                let c = Rc::clone(&count);
                set.push(Subscription::new(move || c.set(c.get() + 1)));
            }
            assert_eq!(set.len(), 3);
        }
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_signal_disconnects_on_drop() {
        let signal: Signal<str> = Signal::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        let subscription = signal.connect(move |v: &str| s.borrow_mut().push(v.to_string()));
        signal.emit("a");
        drop(subscription);
        signal.emit("b");

        assert_eq!(*seen.borrow(), vec!["a".to_string()]);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_callback_may_connect_during_emit() {
        let signal: Rc<Signal<()>> = Rc::new(Signal::new());
        let held = Rc::new(RefCell::new(Vec::new()));

        let (sig, h) = (Rc::clone(&signal), Rc::clone(&held));
        let _outer = signal.connect(move |_| {
            h.borrow_mut().push(sig.connect(|_| {}));
        });
        signal.emit(&());

        assert_eq!(signal.connection_count(), 2);
    }
}
