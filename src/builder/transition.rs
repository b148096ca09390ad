//! Builder for transition candidates.

use crate::builder::description::{ActionSpec, GuardSpec, TransitionSpec};
use crate::core::Event;

/// Builder for a transition candidate with a fluent API.
///
/// Without [`to`](Self::to) the candidate is a reaction: its actions run and
/// the machine stays where it is, without exit or entry actions.
pub struct TransitionBuilder<C> {
    spec: TransitionSpec<C>,
}

impl<C> TransitionBuilder<C> {
    pub fn new() -> Self {
        Self {
            spec: TransitionSpec::default(),
        }
    }

    /// Set the target state.
    pub fn to(mut self, target: impl Into<String>) -> Self {
        self.spec.target = Some(target.into());
        self
    }

    /// Set the guard. A later call replaces an earlier one.
    pub fn guard(mut self, guard: GuardSpec<C>) -> Self {
        self.spec.guard = Some(guard);
        self
    }

    /// Guard with an inline closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&C, &Event) -> bool + Send + Sync + 'static,
    {
        self.guard(GuardSpec::inline(predicate))
    }

    /// Append an action; actions run in the order added.
    pub fn action(mut self, action: ActionSpec<C>) -> Self {
        self.spec.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = ActionSpec<C>>) -> Self {
        self.spec.actions.extend(actions);
        self
    }

    pub fn build(self) -> TransitionSpec<C> {
        self.spec
    }
}

impl<C> Default for TransitionBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> From<TransitionBuilder<C>> for TransitionSpec<C> {
    fn from(builder: TransitionBuilder<C>) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{action, guard};

    #[test]
    fn reaction_has_no_target() {
        let spec: TransitionSpec<u32> = TransitionBuilder::new().action(action("bump")).build();

        assert!(spec.target.is_none());
        assert_eq!(spec.actions.len(), 1);
    }

    #[test]
    fn later_guard_replaces_earlier() {
        let spec: TransitionSpec<u32> = TransitionBuilder::new()
            .to("expert")
            .guard(guard("isEven"))
            .when(|count: &u32, _: &Event| *count > 10)
            .build();

        assert_eq!(spec.target.as_deref(), Some("expert"));
        assert!(matches!(spec.guard, Some(GuardSpec::Inline(_))));
    }

    #[test]
    fn actions_keep_order() {
        let spec: TransitionSpec<u32> = TransitionBuilder::new()
            .action(action("first"))
            .actions(vec![action("second"), action("third")])
            .build();

        let names: Vec<String> = spec
            .actions
            .iter()
            .map(|spec| match &spec.source {
                crate::builder::description::ActionSource::Named(name) => name.clone(),
                crate::builder::description::ActionSource::Inline { label, .. } => label.clone(),
            })
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }
}
