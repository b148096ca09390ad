//! Compiling descriptions into definitions.
//!
//! Every name is resolved exactly once, here. Problems are accumulated with
//! Stillwater's `Validation` rather than failing on the first one, so a
//! broken description reports all of its errors together.

use crate::builder::description::{
    ActionSource, ActionSpec, GuardSpec, InvocationSpec, MachineDescription, StateSpec,
    TransitionSpec,
};
use crate::builder::error::{ConstructionError, ConstructionFailed, ReferenceKind};
use crate::builder::registry::Registry;
use crate::core::{Action, Guard, Invocation, MachineDefinition, StateId, StateNode, Transition};
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Checked<T> = Validation<T, NonEmptyVec<ConstructionError>>;

/// Resolve and check a description against a registry.
pub fn compile<C, Env>(
    description: MachineDescription<C>,
    registry: &Registry<C, Env>,
) -> Result<MachineDefinition<C, Env>, ConstructionFailed> {
    let MachineDescription {
        id,
        initial,
        context,
        entry,
        states,
    } = description;

    let mut index = HashMap::new();
    let mut duplicates: Vec<Checked<()>> = Vec::new();
    for (state_id, state) in states.iter().enumerate() {
        if index.contains_key(&state.name) {
            duplicates.push(Validation::fail(ConstructionError::DuplicateState(
                state.name.clone(),
            )));
        } else {
            index.insert(state.name.clone(), state_id);
        }
    }

    let initial: Checked<StateId> = match initial {
        None => Validation::fail(ConstructionError::MissingInitialState),
        Some(name) => match index.get(&name) {
            Some(state_id) => Validation::success(*state_id),
            None => Validation::fail(ConstructionError::UnknownInitialState(name)),
        },
    };
    let entry = resolve_actions(entry, "machine entry", registry);
    let compiled: Vec<Checked<StateNode<C, Env>>> = states
        .into_iter()
        .map(|state| compile_state(state, &index, registry))
        .collect();

    let checked = Validation::all_vec(duplicates)
        .and(initial)
        .and(entry)
        .and(Validation::all_vec(compiled));

    match checked.into_result() {
        Ok((((_, initial), entry), states)) => Ok(MachineDefinition {
            id,
            initial,
            context,
            entry,
            states,
            index,
        }),
        Err(errors) => Err(ConstructionFailed::from(errors)),
    }
}

fn compile_state<C, Env>(
    state: StateSpec<C>,
    index: &HashMap<String, StateId>,
    registry: &Registry<C, Env>,
) -> Checked<StateNode<C, Env>> {
    let StateSpec {
        name,
        description,
        on,
        always,
        invoke,
        entry,
        exit,
    } = state;

    let on: Vec<Checked<(String, Vec<Transition<C>>)>> = on
        .into_iter()
        .map(|(kind, candidates)| {
            let location = format!("state '{name}', on '{kind}'");
            compile_candidates(candidates, &location, index, registry)
                .map(|transitions| (kind, transitions))
        })
        .collect();
    let always = compile_candidates(
        always,
        &format!("state '{name}', always"),
        index,
        registry,
    );
    let invoke: Vec<Checked<Invocation<C, Env>>> = invoke
        .into_iter()
        .enumerate()
        .map(|(position, spec)| {
            compile_invocation(spec, &format!("state '{name}', invoke[{position}]"), registry)
        })
        .collect();
    let entry = resolve_actions(entry, &format!("state '{name}', entry"), registry);
    let exit = resolve_actions(exit, &format!("state '{name}', exit"), registry);

    Validation::all_vec(on)
        .and(always)
        .and(Validation::all_vec(invoke))
        .and(entry)
        .and(exit)
        .map(|((((on, always), invoke), entry), exit)| StateNode {
            name,
            description,
            on: on.into_iter().collect(),
            always,
            invoke,
            entry,
            exit,
        })
}

fn compile_candidates<C, Env>(
    candidates: Vec<TransitionSpec<C>>,
    location: &str,
    index: &HashMap<String, StateId>,
    registry: &Registry<C, Env>,
) -> Checked<Vec<Transition<C>>> {
    let checked = candidates
        .into_iter()
        .enumerate()
        .map(|(position, spec)| {
            compile_transition(spec, &format!("{location}[{position}]"), index, registry)
        })
        .collect();
    Validation::all_vec(checked)
}

fn compile_transition<C, Env>(
    spec: TransitionSpec<C>,
    location: &str,
    index: &HashMap<String, StateId>,
    registry: &Registry<C, Env>,
) -> Checked<Transition<C>> {
    let TransitionSpec {
        target,
        guard,
        actions,
    } = spec;

    let target: Checked<Option<StateId>> = match target {
        None => Validation::success(None),
        Some(name) => match index.get(&name) {
            Some(state_id) => Validation::success(Some(*state_id)),
            None => Validation::fail(ConstructionError::UnknownState {
                target: name,
                location: location.to_string(),
            }),
        },
    };
    let guard = resolve_optional_guard(guard, location, registry);
    let actions = resolve_actions(actions, location, registry);

    target
        .and(guard)
        .and(actions)
        .map(|((target, guard), actions)| Transition {
            guard,
            target,
            actions,
        })
}

fn compile_invocation<C, Env>(
    spec: InvocationSpec<C>,
    location: &str,
    registry: &Registry<C, Env>,
) -> Checked<Invocation<C, Env>> {
    let InvocationSpec { actor, input } = spec;
    match registry.actor_logic(&actor) {
        Some(logic) => Validation::success(Invocation {
            actor,
            logic,
            input,
        }),
        None => Validation::fail(ConstructionError::UnknownReference {
            kind: ReferenceKind::Actor,
            name: actor,
            location: location.to_string(),
        }),
    }
}

fn resolve_actions<C, Env>(
    specs: Vec<ActionSpec<C>>,
    location: &str,
    registry: &Registry<C, Env>,
) -> Checked<Vec<Action<C>>> {
    let checked = specs
        .into_iter()
        .map(|spec| resolve_action(spec, location, registry))
        .collect();
    Validation::all_vec(checked)
}

fn resolve_action<C, Env>(
    spec: ActionSpec<C>,
    location: &str,
    registry: &Registry<C, Env>,
) -> Checked<Action<C>> {
    let ActionSpec {
        source,
        params,
        guard,
    } = spec;

    let action: Checked<Action<C>> = match source {
        ActionSource::Named(name) => match registry.action(&name) {
            Some(kind) => Validation::success(Action::new(name, kind)),
            None => Validation::fail(ConstructionError::UnknownReference {
                kind: ReferenceKind::Action,
                name,
                location: location.to_string(),
            }),
        },
        ActionSource::Inline { label, kind } => Validation::success(Action::new(label, kind)),
    };
    let guard = resolve_optional_guard(guard, location, registry);

    action.and(guard).map(|(action, guard)| {
        let action = action.with_params(params);
        match guard {
            Some(guard) => action.with_guard(guard),
            None => action,
        }
    })
}

fn resolve_optional_guard<C, Env>(
    guard: Option<GuardSpec<C>>,
    location: &str,
    registry: &Registry<C, Env>,
) -> Checked<Option<Guard<C>>> {
    match guard {
        Some(spec) => resolve_guard(spec, location, registry).map(Some),
        None => Validation::success(None),
    }
}

fn resolve_guard<C, Env>(
    spec: GuardSpec<C>,
    location: &str,
    registry: &Registry<C, Env>,
) -> Checked<Guard<C>> {
    match spec {
        GuardSpec::Named { name, params } => match registry.predicate(&name) {
            Some(predicate) => Validation::success(Guard::Predicate {
                name,
                predicate,
                params,
            }),
            None => Validation::fail(ConstructionError::UnknownReference {
                kind: ReferenceKind::Guard,
                name,
                location: location.to_string(),
            }),
        },
        GuardSpec::Inline(predicate) => Validation::success(Guard::Inline(predicate)),
        GuardSpec::And(children) => resolve_guards(children, location, registry).map(Guard::And),
        GuardSpec::Or(children) => resolve_guards(children, location, registry).map(Guard::Or),
        GuardSpec::Not(child) => {
            resolve_guard(*child, location, registry).map(|guard| Guard::Not(Box::new(guard)))
        }
    }
}

fn resolve_guards<C, Env>(
    children: Vec<GuardSpec<C>>,
    location: &str,
    registry: &Registry<C, Env>,
) -> Checked<Vec<Guard<C>>> {
    let checked = children
        .into_iter()
        .map(|child| resolve_guard(child, location, registry))
        .collect();
    Validation::all_vec(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{action, and, guard, invoke, not, transition, MachineBuilder, StateBuilder};
    use crate::core::Event;
    use serde_json::Value;

    fn registry() -> Registry<u32, ()> {
        Registry::new()
            .assign("bump", |n: &u32, _: &Event, _: &Value| Ok(n + 1))
            .guard("isEven", |n: &u32, _: &Event, _: &Value| Ok(n % 2 == 0))
    }

    fn errors(result: Result<MachineDefinition<u32, ()>, ConstructionFailed>) -> Vec<ConstructionError> {
        match result {
            Ok(_) => panic!("expected construction to fail"),
            Err(failed) => failed.errors,
        }
    }

    #[test]
    fn resolves_targets_to_state_ids() {
        let description = MachineBuilder::new("ids", 0)
            .initial("b")
            .state(StateBuilder::new("a"))
            .state(StateBuilder::new("b").on("back", transition().to("a")))
            .build();

        let definition = compile(description, &registry()).unwrap();

        assert_eq!(definition.initial(), 1);
        assert_eq!(definition.state_id("a"), Some(0));
        assert_eq!(definition.state(1).candidates("back")[0].target(), Some(0));
    }

    #[test]
    fn missing_initial_state() {
        let description = MachineBuilder::new("no initial", 0)
            .state(StateBuilder::new("a"))
            .build();

        assert_eq!(
            errors(compile(description, &registry())),
            vec![ConstructionError::MissingInitialState]
        );
    }

    #[test]
    fn unknown_initial_state() {
        let description = MachineBuilder::new("bad initial", 0)
            .initial("nowhere")
            .state(StateBuilder::new("a"))
            .build();

        assert_eq!(
            errors(compile(description, &registry())),
            vec![ConstructionError::UnknownInitialState("nowhere".to_string())]
        );
    }

    #[test]
    fn unknown_target_reports_location() {
        let description = MachineBuilder::new("bad target", 0)
            .initial("a")
            .state(StateBuilder::new("a").on("go", transition().to("a")).on("go", transition().to("b")))
            .build();

        assert_eq!(
            errors(compile(description, &registry())),
            vec![ConstructionError::UnknownState {
                target: "b".to_string(),
                location: "state 'a', on 'go'[1]".to_string(),
            }]
        );
    }

    #[test]
    fn unknown_names_in_nested_guards_and_actions() {
        let description = MachineBuilder::new("bad refs", 0)
            .initial("a")
            .entry(action("missingAction"))
            .state(
                StateBuilder::new("a").always(
                    transition()
                        .guard(and(vec![guard("isEven"), not(guard("isOdd"))]))
                        .action(action("bump")),
                ),
            )
            .build();

        assert_eq!(
            errors(compile(description, &registry())),
            vec![
                ConstructionError::UnknownReference {
                    kind: ReferenceKind::Action,
                    name: "missingAction".to_string(),
                    location: "machine entry".to_string(),
                },
                ConstructionError::UnknownReference {
                    kind: ReferenceKind::Guard,
                    name: "isOdd".to_string(),
                    location: "state 'a', always[0]".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unknown_actor() {
        let description = MachineBuilder::new("bad actor", 0)
            .initial("loading")
            .state(StateBuilder::new("loading").invoke(invoke("fetchLogic")))
            .build();

        assert_eq!(
            errors(compile(description, &registry())),
            vec![ConstructionError::UnknownReference {
                kind: ReferenceKind::Actor,
                name: "fetchLogic".to_string(),
                location: "state 'loading', invoke[0]".to_string(),
            }]
        );
    }

    #[test]
    fn accumulates_independent_errors() {
        let description = MachineBuilder::new("everything wrong", 0)
            .state(StateBuilder::new("a").on("go", transition().to("z")))
            .state(StateBuilder::new("a"))
            .build();

        let errors = errors(compile(description, &registry()));

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConstructionError::DuplicateState("a".to_string())));
        assert!(errors.contains(&ConstructionError::MissingInitialState));
        assert!(errors.iter().any(|error| matches!(
            error,
            ConstructionError::UnknownState { target, .. } if target == "z"
        )));
    }

    #[test]
    fn errors_follow_event_kind_order() {
        let description = || {
            MachineBuilder::new("scattered", 0)
                .initial("a")
                .state(
                    StateBuilder::new("a")
                        .on("zeta", transition().to("z"))
                        .on("alpha", transition().to("x"))
                        .on("mid", transition().to("y")),
                )
                .build()
        };

        for _ in 0..5 {
            let targets: Vec<String> = errors(compile(description(), &registry()))
                .into_iter()
                .filter_map(|error| match error {
                    ConstructionError::UnknownState { target, .. } => Some(target),
                    _ => None,
                })
                .collect();
            assert_eq!(targets, vec!["x", "y", "z"]);
        }
    }

    #[test]
    fn guarded_action_keeps_guard() {
        let description = MachineBuilder::new("guarded entry", 0)
            .initial("a")
            .entry(action("bump").when(guard("isEven")))
            .state(StateBuilder::new("a"))
            .build();

        let definition = compile(description, &registry()).unwrap();

        assert_eq!(definition.entry()[0].name(), "bump");
        assert!(definition.entry()[0].guard.is_some());
    }
}
