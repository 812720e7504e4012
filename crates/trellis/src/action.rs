//! Named commands enabled and disabled by rules

use crate::rule::{RuleGraph, RuleId, RuleListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Handler = Box<dyn Fn() + Send + Sync>;

/// A command that can only be triggered while its rule is valid
pub struct Action {
    name: String,
    enabled: AtomicBool,
    handler: Handler,
}

impl Action {
    /// Create an enabled action
    pub fn new(name: impl Into<String>, handler: impl Fn() + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            enabled: AtomicBool::new(true),
            handler: Box::new(handler),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Follow `rule`: take its current validity and track its changes
    pub fn bind(self: &Arc<Self>, rules: &mut RuleGraph, rule: RuleId) {
        self.enabled.store(rules.is_valid(rule), Ordering::Release);
        rules.add_listener(rule, self.clone());
    }

    /// Stop following `rule`. The action keeps its last enabled state.
    pub fn unbind(self: &Arc<Self>, rules: &mut RuleGraph, rule: RuleId) {
        let listener: Arc<dyn RuleListener> = self.clone();
        rules.remove_listener(rule, &listener);
    }

    /// Run the handler if the action is enabled. Returns whether it ran.
    pub fn trigger(&self) -> bool {
        if !self.is_enabled() {
            log::debug!("Action '{}' triggered while disabled", self.name);
            return false;
        }
        (self.handler)();
        true
    }
}

impl RuleListener for Action {
    fn rule_changed(&self, _rule: RuleId, valid: bool) {
        log::debug!(
            "Action '{}' {}",
            self.name,
            if valid { "enabled" } else { "disabled" }
        );
        self.enabled.store(valid, Ordering::Release);
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
