//! Item post-processing hooks
//!
//! Hooks decorate an item after the backend has projected a domain value onto
//! it, for example to attach an environment-specific href. They run once per
//! projected item, in registration order, and only during `query` and `store`.
//!
//! Hooks are registered while a [`CollectionService`](crate::service::CollectionService)
//! is being composed; once composed the service only hands out `&ItemHooks`.

use std::fmt;
use std::sync::Arc;

/// A single item hook
pub type ItemHook<I, V> = Arc<dyn Fn(&mut I, &V) + Send + Sync>;

/// Ordered list of item hooks
///
/// # Example
///
/// ```rust
/// use collection_service::hooks::ItemHooks;
///
/// let hooks = ItemHooks::<Vec<String>, u32>::new()
///     .with(|item, value| item.push(format!("first {value}")))
///     .with(|item, value| item.push(format!("second {value}")));
///
/// let mut item = Vec::new();
/// hooks.run(&mut item, &7);
/// assert_eq!(item, vec!["first 7", "second 7"]);
/// ```
pub struct ItemHooks<I, V> {
    hooks: Vec<ItemHook<I, V>>,
}

impl<I, V> ItemHooks<I, V> {
    /// Create an empty hook list
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Append a hook
    pub fn add<F>(&mut self, hook: F)
    where
        F: Fn(&mut I, &V) + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
    }

    /// Append a hook, builder style
    #[must_use]
    pub fn with<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut I, &V) + Send + Sync + 'static,
    {
        self.add(hook);
        self
    }

    /// Invoke every hook with the same item and value
    pub fn run(&self, item: &mut I, value: &V) {
        for hook in &self.hooks {
            hook(item, value);
        }
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<I, V> Default for ItemHooks<I, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, V> Clone for ItemHooks<I, V> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<I, V> fmt::Debug for ItemHooks<I, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_empty() {
        let hooks = ItemHooks::<String, ()>::default();
        assert!(hooks.is_empty());
        let mut item = String::from("untouched");
        hooks.run(&mut item, &());
        assert_eq!(item, "untouched");
    }

    #[test]
    fn test_run_in_registration_order() {
        let mut hooks = ItemHooks::<String, &str>::new();
        hooks.add(|item, value| item.push_str(&format!("a:{value};")));
        hooks.add(|item, value| item.push_str(&format!("b:{value};")));
        hooks.add(|item, _| item.push_str("c;"));
        assert_eq!(hooks.len(), 3);

        let mut item = String::new();
        hooks.run(&mut item, &"x");
        assert_eq!(item, "a:x;b:x;c;");
    }

    #[test]
    fn test_each_hook_runs_once_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let hooks = ItemHooks::<(), ()>::new().with(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        for _ in 0..4 {
            hooks.run(&mut (), &());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_clone_is_independent_list() {
        let original = ItemHooks::<String, ()>::new().with(|item, _| item.push('a'));
        let extended = original.clone().with(|item, _| item.push('b'));
        assert_eq!(original.len(), 1);
        assert_eq!(extended.len(), 2);
    }
}
