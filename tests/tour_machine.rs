//! End-to-end tests driving the tour machine.

use serde_json::{json, Value};
use statewise::builder::{
    action, and, assign, guard, invoke, transition, GuardSpec, MachineBuilder, Registry,
    StateBuilder,
};
use statewise::core::{Event, HandlerError};
use statewise::effects::{ActorLogic, Completion, Machine, Status};
use statewise::{InterpreterConfig, RuntimeError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

#[derive(Clone, PartialEq, Debug, Default)]
struct Tour {
    count: u32,
}

fn registry(fetch: ActorLogic<()>, greetings: Arc<Mutex<Vec<String>>>) -> Registry<Tour, ()> {
    Registry::new()
        .effect("greet", move |_: &Tour, _: &Event, params: &Value| {
            let message = params["message"].as_str().unwrap_or_default().to_string();
            greetings.lock().unwrap().push(message);
            Ok(())
        })
        .guard("todoIsCompleted", |_: &Tour, _: &Event, params: &Value| {
            params
                .pointer("/todo/completed")
                .and_then(Value::as_bool)
                .ok_or_else(|| HandlerError::new("params.todo.completed is missing"))
        })
        .actor("fetchLogic", fetch)
}

/// The tour, optionally rewarding a fetch result that arrives while the
/// todo is still removed.
fn tour_with(
    fetch: ActorLogic<()>,
    done_reward: Option<u32>,
    greetings: Arc<Mutex<Vec<String>>>,
) -> Machine<Tour, ()> {
    let mut removed = StateBuilder::new("todo removed")
        .description("Splendid! You have completed the tour.")
        .on(
            "todo.added",
            transition().action(assign(|ctx: &Tour, _: &Event| Tour {
                count: ctx.count + 1,
            })),
        )
        .always(
            transition()
                .to("expert")
                .guard(GuardSpec::inline(|ctx: &Tour, _| ctx.count >= 10)),
        )
        .invoke(invoke("fetchLogic").input(json!("a string")));
    if let Some(reward) = done_reward {
        removed = removed.on(
            "done",
            transition().action(assign(move |ctx: &Tour, _: &Event| Tour {
                count: ctx.count + reward,
            })),
        );
    }

    MachineBuilder::new("tour", Tour::default())
        .initial("start")
        .entry(
            action("greet")
                .with_params(json!({ "message": "Hello, World!" }))
                .when(and(vec![
                    guard("todoIsCompleted"),
                    GuardSpec::inline(|_: &Tour, _| false),
                ])),
        )
        .state(
            StateBuilder::new("start")
                .description("Let's get started. Add a todo first.")
                .on("todo.added", transition().to("todo added")),
        )
        .state(
            StateBuilder::new("todo added")
                .description("Great! Now let's complete that todo.")
                .on(
                    "todo.updated",
                    transition().to("todo completed").guard(
                        guard("todoIsCompleted")
                            .params_with(|_, event: &Event| json!({ "todo": event.get("todo") })),
                    ),
                ),
        )
        .state(
            StateBuilder::new("todo completed")
                .description("Wonderful! Now let's remove that todo.")
                .on("todo.removed", transition().to("todo removed")),
        )
        .state(removed)
        .state(StateBuilder::new("expert").description("Wow, you are a todo expert!!!"))
        .state(StateBuilder::new("got stuff").description("I got a bunch of todos"))
        .create(&registry(fetch, greetings))
        .unwrap()
}

fn tour(fetch: ActorLogic<()>) -> Machine<Tour, ()> {
    tour_with(fetch, None, Arc::default())
}

fn updated(completed: bool) -> Event {
    Event::with_data("todo.updated", json!({ "todo": { "completed": completed } }))
}

fn echo() -> ActorLogic<()> {
    ActorLogic::from_fn(|input, _| Ok(input))
}

#[tokio::test]
async fn end_to_end_tour() {
    let service = tour(echo()).spawn(());
    assert_eq!(service.snapshot().state, "start");

    service.send("todo.added").unwrap();
    service.flush().await;
    assert_eq!(service.snapshot().state, "todo added");

    service.send(updated(false)).unwrap();
    service.flush().await;
    assert_eq!(service.snapshot().state, "todo added");

    service.send(updated(true)).unwrap();
    service.flush().await;
    assert_eq!(service.snapshot().state, "todo completed");

    service.send("todo.removed").unwrap();
    service.flush().await;
    assert_eq!(service.snapshot().state, "todo removed");

    for _ in 0..9 {
        service.send("todo.added").unwrap();
    }
    service.flush().await;
    let snapshot = service.snapshot();
    assert_eq!(snapshot.state, "todo removed");
    assert_eq!(snapshot.context.count, 9);

    service.send("todo.added").unwrap();
    service.flush().await;
    let snapshot = service.snapshot();
    assert_eq!(snapshot.state, "expert");
    assert_eq!(snapshot.context.count, 10);
    assert_eq!(snapshot.status, Status::Running);
}

#[tokio::test]
async fn unhandled_event_in_start_is_ignored() {
    let service = tour(echo()).spawn(());
    let before = service.snapshot();

    service.send("todo.removed").unwrap();
    service.flush().await;

    assert_eq!(service.snapshot(), before);
}

#[test]
fn greeting_skipped_when_entry_guard_fails() {
    let greetings = Arc::new(Mutex::new(Vec::new()));
    let machine = tour_with(echo(), None, Arc::clone(&greetings));
    let (tx, _rx) = mpsc::unbounded_channel::<Completion>();
    let mut interpreter = machine.interpreter((), Arc::new(tx));

    let cycle = interpreter.start();

    assert!(greetings.lock().unwrap().is_empty());
    assert!(matches!(
        cycle.errors.as_slice(),
        [RuntimeError::GuardEvaluation { guard, event, .. }]
            if guard == "todoIsCompleted" && event == "machine.init"
    ));
    assert_eq!(interpreter.state(), "start");
    assert_eq!(interpreter.status(), Status::Running);
}

#[test]
fn introspection_lists_declared_states() {
    let machine = tour(echo());

    assert_eq!(machine.id(), "tour");
    assert_eq!(
        machine.state_names(),
        vec!["start", "todo added", "todo completed", "todo removed", "expert", "got stuff"]
    );
    assert_eq!(
        machine.state("expert").and_then(|state| state.description()),
        Some("Wow, you are a todo expert!!!")
    );
    assert!(machine.state("got stuff").unwrap().is_final());
}

fn walk_to_removed(interpreter: &mut statewise::effects::Interpreter<Tour, ()>) {
    interpreter.start();
    for event in [Event::new("todo.added"), updated(true), Event::new("todo.removed")] {
        interpreter.process(event).unwrap();
    }
    assert_eq!(interpreter.state(), "todo removed");
}

#[tokio::test]
async fn fetch_result_applied_while_state_active() {
    let machine = tour_with(echo(), Some(100), Arc::default());
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut interpreter = machine.interpreter((), Arc::new(tx));
    walk_to_removed(&mut interpreter);

    let completion = rx.recv().await.unwrap();
    assert_eq!(completion.outcome, Ok(json!("a string")));
    interpreter.deliver(completion).unwrap();

    assert_eq!(interpreter.context().count, 100);
    assert_eq!(interpreter.state(), "expert");
}

#[tokio::test]
async fn stale_fetch_result_is_discarded() {
    let machine = tour_with(echo(), Some(100), Arc::default());
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut interpreter = machine.interpreter((), Arc::new(tx));
    walk_to_removed(&mut interpreter);
    assert_eq!(interpreter.in_flight(), 1);

    let completion = rx.recv().await.unwrap();
    for _ in 0..10 {
        interpreter.process(Event::new("todo.added")).unwrap();
    }
    assert_eq!(interpreter.state(), "expert");
    assert_eq!(interpreter.in_flight(), 0);

    let cycle = interpreter.deliver(completion).unwrap();

    assert!(cycle.discarded);
    assert_eq!(interpreter.context().count, 10);
}

#[tokio::test]
async fn pending_fetch_cancelled_when_leaving_state() {
    let gate = Arc::new(Notify::new());
    let cancelled = Arc::new(Mutex::new(false));
    let released = Arc::clone(&gate);
    let flag = Arc::clone(&cancelled);
    let fetch = ActorLogic::from_async(move |input, _| {
        let gate = Arc::clone(&released);
        async move {
            gate.notified().await;
            Ok(input)
        }
    })
    .with_cancel(move || *flag.lock().unwrap() = true);
    let service = tour_with(fetch, Some(100), Arc::default()).spawn(());

    service.send("todo.added").unwrap();
    service.send(updated(true)).unwrap();
    service.send("todo.removed").unwrap();
    for _ in 0..10 {
        service.send("todo.added").unwrap();
    }
    service.flush().await;
    gate.notify_waiters();
    tokio::time::sleep(Duration::from_millis(20)).await;
    service.flush().await;

    let snapshot = service.snapshot();
    assert_eq!(snapshot.state, "expert");
    assert_eq!(snapshot.context.count, 10);
    assert!(*cancelled.lock().unwrap());
}

#[tokio::test]
async fn mutual_always_cycle_terminates() {
    let machine = MachineBuilder::new("ping-pong", Tour::default())
        .initial("ping")
        .state(StateBuilder::new("ping").always(transition().to("pong")))
        .state(StateBuilder::new("pong").always(transition().to("ping")))
        .create(&Registry::<Tour, ()>::new())
        .unwrap();

    let service = machine.spawn_with((), InterpreterConfig::default());

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        service.wait_for(|snapshot| snapshot.status == Status::Stopped),
    )
    .await
    .unwrap();
    assert!(matches!(
        snapshot.error,
        Some(RuntimeError::TransitionLoop { limit: 1000, .. })
    ));
    assert_eq!(snapshot.state, "ping");
}
