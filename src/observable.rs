//! Observable values - a value with subscribers
//!
//! Thin wrapper around `tokio::sync::watch` so page controllers and the
//! session can expose state without knowing who renders it. The owner
//! holds the `Observable` (single writer); readers either call `get()`
//! each frame or keep a `watch::Receiver` from `subscribe()` and check
//! `has_changed()`.

use tokio::sync::watch;

#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx }
    }

    /// Current value (cloned)
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and wake all subscribers
    ///
    /// Works with zero subscribers, unlike `watch::Sender::send`.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Set only if the value differs, so subscribers don't see no-op changes
    pub fn set_if_changed(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_latest_set() {
        let value = Observable::new(1);
        value.set(2);
        assert_eq!(value.get(), 2);
    }

    #[test]
    fn test_subscriber_sees_change() {
        let value = Observable::new(false);
        let mut rx = value.subscribe();
        assert!(!rx.has_changed().unwrap());

        value.set(true);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_set_if_changed_skips_equal_values() {
        let value = Observable::new(String::from("a"));
        let mut rx = value.subscribe();

        value.set_if_changed("a".to_string());
        assert!(!rx.has_changed().unwrap());

        value.set_if_changed("b".to_string());
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "b");
    }
}
