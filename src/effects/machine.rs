//! Runnable machine handle.

use crate::config::InterpreterConfig;
use crate::core::{Context, Environment, MachineDefinition, StateNode};
use crate::effects::interpreter::Interpreter;
use crate::effects::supervisor::CompletionSink;
use std::sync::Arc;

/// A validated machine, ready to be interpreted.
///
/// Cheap to clone; every instance started from it shares the same compiled
/// definition and nothing else.
pub struct Machine<C, Env> {
    definition: Arc<MachineDefinition<C, Env>>,
}

impl<C, Env> Machine<C, Env> {
    pub(crate) fn from_definition(definition: MachineDefinition<C, Env>) -> Self {
        Self {
            definition: Arc::new(definition),
        }
    }

    pub fn definition(&self) -> &MachineDefinition<C, Env> {
        &self.definition
    }

    pub fn id(&self) -> &str {
        self.definition.id()
    }

    pub fn initial_state(&self) -> &str {
        self.definition.state(self.definition.initial()).name()
    }

    pub fn state(&self, name: &str) -> Option<&StateNode<C, Env>> {
        self.definition.find(name)
    }

    /// State names in declaration order.
    pub fn state_names(&self) -> Vec<&str> {
        self.definition
            .states()
            .iter()
            .map(StateNode::name)
            .collect()
    }
}

impl<C: Context, Env: Environment> Machine<C, Env> {
    /// Create an unstarted interpreter whose actor outcomes go to `sink`.
    pub fn interpreter(&self, env: Env, sink: Arc<dyn CompletionSink>) -> Interpreter<C, Env> {
        self.interpreter_with(env, sink, InterpreterConfig::default())
    }

    pub fn interpreter_with(
        &self,
        env: Env,
        sink: Arc<dyn CompletionSink>,
        config: InterpreterConfig,
    ) -> Interpreter<C, Env> {
        Interpreter::new(self.clone(), env, sink, config)
    }
}

impl<C, Env> Clone for Machine<C, Env> {
    fn clone(&self) -> Self {
        Self {
            definition: Arc::clone(&self.definition),
        }
    }
}
