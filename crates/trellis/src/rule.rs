//! Composable boolean rules with change notification
//!
//! Rules live in a [`RuleGraph`] arena. Leaf rules are set directly; composite
//! rules (`and`, `or`, `not`) derive their validity from other rules. A
//! composite can only be built from rules that already exist, so rule ids are
//! allocated in dependency order and a sweep over the affected ids in
//! ascending order recomputes every composite after all of its inputs.
//!
//! When a leaf changes, every affected composite is recomputed once, and each
//! rule whose validity actually flipped notifies its listeners exactly once,
//! no matter how many paths connect it to the leaf.

use std::collections::BTreeSet;
use std::sync::Arc;

/// Identifier of a rule within its [`RuleGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

/// Observer notified when a rule changes state
pub trait RuleListener: Send + Sync {
    fn rule_changed(&self, rule: RuleId, valid: bool);
}

impl<F> RuleListener for F
where
    F: Fn(RuleId, bool) + Send + Sync,
{
    fn rule_changed(&self, rule: RuleId, valid: bool) {
        self(rule, valid)
    }
}

#[derive(Debug, Clone)]
enum RuleKind {
    Leaf,
    Constant,
    And(Vec<RuleId>),
    Or(Vec<RuleId>),
    Not(RuleId),
}

struct RuleNode {
    kind: RuleKind,
    valid: bool,
    /// Composites that read this rule
    dependents: Vec<RuleId>,
    listeners: Vec<Arc<dyn RuleListener>>,
}

/// Arena of rules and their dependency edges
#[derive(Default)]
pub struct RuleGraph {
    nodes: Vec<RuleNode>,
}

impl RuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a leaf rule whose validity is set with [`RuleGraph::set`]
    pub fn leaf(&mut self, valid: bool) -> RuleId {
        self.push(RuleKind::Leaf, valid)
    }

    /// Create a rule that never changes
    pub fn always(&mut self, valid: bool) -> RuleId {
        self.push(RuleKind::Constant, valid)
    }

    /// Valid when every input is valid (an empty conjunction is valid)
    pub fn and(&mut self, inputs: &[RuleId]) -> RuleId {
        self.composite(RuleKind::And(inputs.to_vec()))
    }

    /// Valid when any input is valid (an empty disjunction is invalid)
    pub fn or(&mut self, inputs: &[RuleId]) -> RuleId {
        self.composite(RuleKind::Or(inputs.to_vec()))
    }

    /// Valid when the input is invalid
    pub fn not(&mut self, input: RuleId) -> RuleId {
        self.composite(RuleKind::Not(input))
    }

    /// Is the rule valid?
    pub fn is_valid(&self, rule: RuleId) -> bool {
        self.node(rule).valid
    }

    /// Number of rules in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a listener that will be notified when the rule changes state.
    ///
    /// Listeners are compared by identity; adding the same listener twice
    /// registers it once.
    pub fn add_listener(&mut self, rule: RuleId, listener: Arc<dyn RuleListener>) {
        let listeners = &mut self.node_mut(rule).listeners;
        if !listeners.iter().any(|l| same_listener(l, &listener)) {
            listeners.push(listener);
        }
    }

    /// Remove a listener. Removing a listener that was never added is a no-op.
    pub fn remove_listener(&mut self, rule: RuleId, listener: &Arc<dyn RuleListener>) {
        self.node_mut(rule)
            .listeners
            .retain(|l| !same_listener(l, listener));
    }

    /// Set the validity of a leaf rule, notifying every rule that changed.
    ///
    /// Returns true if the leaf changed state.
    ///
    /// # Panics
    /// Panics if `rule` is not a leaf.
    pub fn set(&mut self, rule: RuleId, valid: bool) -> bool {
        assert!(
            matches!(self.node(rule).kind, RuleKind::Leaf),
            "only leaf rules can be set directly"
        );

        if self.node(rule).valid == valid {
            return false;
        }
        self.node_mut(rule).valid = valid;

        let mut changed = vec![rule];
        changed.extend(self.propagate(rule));

        // Notify after the whole graph is consistent
        let notifications: Vec<(Arc<dyn RuleListener>, RuleId, bool)> = changed
            .iter()
            .flat_map(|&id| {
                let node = self.node(id);
                node.listeners
                    .iter()
                    .map(move |l| (Arc::clone(l), id, node.valid))
            })
            .collect();

        for (listener, id, valid) in notifications {
            listener.rule_changed(id, valid);
        }

        true
    }

    /// Recompute every composite downstream of `origin`, returning those that flipped
    fn propagate(&mut self, origin: RuleId) -> Vec<RuleId> {
        let mut affected = BTreeSet::new();
        let mut pending = self.node(origin).dependents.clone();
        while let Some(id) = pending.pop() {
            if affected.insert(id) {
                pending.extend(self.node(id).dependents.iter().copied());
            }
        }

        let mut changed = Vec::new();
        for id in affected {
            let valid = self.evaluate(&self.node(id).kind);
            let node = self.node_mut(id);
            if node.valid != valid {
                node.valid = valid;
                changed.push(id);
            }
        }
        changed
    }

    fn evaluate(&self, kind: &RuleKind) -> bool {
        match kind {
            RuleKind::Leaf | RuleKind::Constant => unreachable!("leaves are never recomputed"),
            RuleKind::And(inputs) => inputs.iter().all(|&id| self.is_valid(id)),
            RuleKind::Or(inputs) => inputs.iter().any(|&id| self.is_valid(id)),
            RuleKind::Not(input) => !self.is_valid(*input),
        }
    }

    fn composite(&mut self, kind: RuleKind) -> RuleId {
        let valid = self.evaluate(&kind);
        let inputs: Vec<RuleId> = match &kind {
            RuleKind::And(inputs) | RuleKind::Or(inputs) => inputs.clone(),
            RuleKind::Not(input) => vec![*input],
            RuleKind::Leaf | RuleKind::Constant => Vec::new(),
        };

        let id = self.push(kind, valid);
        for input in inputs {
            let dependents = &mut self.node_mut(input).dependents;
            // `and(&[a, a])` must not list the composite twice
            if !dependents.contains(&id) {
                dependents.push(id);
            }
        }
        id
    }

    fn push(&mut self, kind: RuleKind, valid: bool) -> RuleId {
        let id = RuleId(self.nodes.len());
        self.nodes.push(RuleNode {
            kind,
            valid,
            dependents: Vec::new(),
            listeners: Vec::new(),
        });
        id
    }

    fn node(&self, rule: RuleId) -> &RuleNode {
        &self.nodes[rule.0]
    }

    fn node_mut(&mut self, rule: RuleId) -> &mut RuleNode {
        &mut self.nodes[rule.0]
    }
}

impl std::fmt::Debug for RuleGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleGraph")
            .field("rules", &self.nodes.len())
            .finish()
    }
}

fn same_listener(a: &Arc<dyn RuleListener>, b: &Arc<dyn RuleListener>) -> bool {
    // Compare data pointers only; vtable pointers for the same type may differ
    // between codegen units.
    std::ptr::eq(
        Arc::as_ptr(a) as *const u8,
        Arc::as_ptr(b) as *const u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(RuleId, bool)>>,
    }

    impl Recorder {
        fn seen(&self) -> Vec<(RuleId, bool)> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl RuleListener for Recorder {
        fn rule_changed(&self, rule: RuleId, valid: bool) {
            self.seen.lock().unwrap().push((rule, valid));
        }
    }

    #[test]
    fn test_leaf_notifies_once_per_transition() {
        let mut rules = RuleGraph::new();
        let leaf = rules.leaf(false);
        let recorder = Arc::new(Recorder::default());
        rules.add_listener(leaf, recorder.clone());

        assert!(rules.set(leaf, true));
        assert!(!rules.set(leaf, true));
        assert!(rules.set(leaf, false));

        assert_eq!(recorder.seen(), vec![(leaf, true), (leaf, false)]);
    }

    #[test]
    fn test_composites() {
        let mut rules = RuleGraph::new();
        let a = rules.leaf(true);
        let b = rules.leaf(false);
        let both = rules.and(&[a, b]);
        let either = rules.or(&[a, b]);
        let not_b = rules.not(b);

        assert!(!rules.is_valid(both));
        assert!(rules.is_valid(either));
        assert!(rules.is_valid(not_b));

        rules.set(b, true);
        assert!(rules.is_valid(both));
        assert!(!rules.is_valid(not_b));
    }

    #[test]
    fn test_empty_composites() {
        let mut rules = RuleGraph::new();
        let all = rules.and(&[]);
        let any = rules.or(&[]);
        assert!(rules.is_valid(all));
        assert!(!rules.is_valid(any));
    }

    #[test]
    fn test_diamond_notifies_each_composite_once() {
        let mut rules = RuleGraph::new();
        let leaf = rules.leaf(false);
        let left = rules.not(leaf);
        let right = rules.or(&[leaf]);
        let top = rules.or(&[left, right, leaf]);
        let bottom = rules.and(&[left, leaf]);

        let recorder = Arc::new(Recorder::default());
        for id in [leaf, left, right, top, bottom] {
            rules.add_listener(id, recorder.clone());
        }

        rules.set(leaf, true);

        // `top` stays valid (right takes over from left), `bottom` stays invalid
        let seen = recorder.seen();
        assert_eq!(seen, vec![(leaf, true), (left, false), (right, true)]);

        let top_recorder = Arc::new(Recorder::default());
        let diamond = rules.and(&[left, right]);
        let apex = rules.not(diamond);
        rules.add_listener(diamond, top_recorder.clone());
        rules.add_listener(apex, top_recorder.clone());

        rules.set(leaf, false);
        // diamond = !leaf && leaf is always false, so neither end flips
        assert!(top_recorder.seen().is_empty());
        assert!(rules.is_valid(top));
    }

    #[test]
    fn test_shared_input_reached_through_many_paths() {
        let mut rules = RuleGraph::new();
        let leaf = rules.leaf(false);
        let a = rules.or(&[leaf]);
        let b = rules.or(&[leaf]);
        let c = rules.and(&[leaf, leaf]);
        let joined = rules.and(&[a, b, c]);

        let recorder = Arc::new(Recorder::default());
        rules.add_listener(joined, recorder.clone());

        rules.set(leaf, true);
        rules.set(leaf, false);

        assert_eq!(recorder.seen(), vec![(joined, true), (joined, false)]);
    }

    #[test]
    fn test_deep_cascade() {
        let mut rules = RuleGraph::new();
        let leaf = rules.leaf(false);
        let mut current = leaf;
        for _ in 0..50 {
            current = rules.not(current);
        }

        let recorder = Arc::new(Recorder::default());
        rules.add_listener(current, recorder.clone());

        // 50 negations is the identity
        assert!(!rules.is_valid(current));
        rules.set(leaf, true);
        assert_eq!(recorder.seen(), vec![(current, true)]);
    }

    #[test]
    fn test_listener_registration_is_idempotent() {
        let mut rules = RuleGraph::new();
        let leaf = rules.leaf(false);
        let recorder = Arc::new(Recorder::default());
        let listener: Arc<dyn RuleListener> = recorder.clone();

        rules.add_listener(leaf, listener.clone());
        rules.add_listener(leaf, listener.clone());
        rules.set(leaf, true);
        assert_eq!(recorder.seen().len(), 1);

        rules.remove_listener(leaf, &listener);
        rules.remove_listener(leaf, &listener);
        rules.set(leaf, false);
        assert_eq!(recorder.seen().len(), 1);
    }

    #[test]
    fn test_closure_listener() {
        let mut rules = RuleGraph::new();
        let leaf = rules.leaf(true);
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        rules.add_listener(
            leaf,
            Arc::new(move |_: RuleId, _: bool| *counter.lock().unwrap() += 1),
        );

        rules.set(leaf, false);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    #[should_panic(expected = "only leaf rules")]
    fn test_setting_composite_panics() {
        let mut rules = RuleGraph::new();
        let leaf = rules.leaf(true);
        let not = rules.not(leaf);
        rules.set(not, true);
    }
}
