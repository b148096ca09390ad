//! Todo Tour
//!
//! This example walks through a small onboarding tour for a todo app.
//!
//! Key concepts:
//! - Named guards with params built from the event
//! - Targetless reactions feeding an always-transition
//! - An actor invoked on state entry, cancelled when the state is left
//! - A guarded machine entry action whose guard fails and is logged
//!
//! Run with: RUST_LOG=debug cargo run --example tour

use serde_json::{json, Value};
use statewise::builder::{
    action, and, assign, guard, invoke, transition, GuardSpec, MachineBuilder, Registry,
    StateBuilder,
};
use statewise::core::{Event, HandlerError};
use statewise::effects::{ActorError, ActorLogic, Snapshot};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, PartialEq, Debug, Default)]
struct Tour {
    count: u32,
}

// Stand-in for a network fetch
async fn fetch_todos(input: Value) -> Result<Value, ActorError> {
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(json!([
        { "id": 1, "title": input, "completed": false },
        { "id": 2, "title": "write the docs", "completed": true },
    ]))
}

fn registry() -> Registry<Tour, ()> {
    Registry::new()
        .effect("greet", |_: &Tour, _: &Event, params: &Value| {
            info!(message = %params["message"], "greeting");
            Ok(())
        })
        .guard("todoIsCompleted", |_: &Tour, _: &Event, params: &Value| {
            params
                .pointer("/todo/completed")
                .and_then(Value::as_bool)
                .ok_or_else(|| HandlerError::new("params.todo.completed is missing"))
        })
        .actor(
            "fetchLogic",
            ActorLogic::from_async(|input, _| fetch_todos(input))
                .with_cancel(|| info!("fetch cancelled")),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Todo Tour ===\n");

    let machine = MachineBuilder::new("tour", Tour::default())
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
        .state(
            StateBuilder::new("todo removed")
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
                .invoke(invoke("fetchLogic").input(json!("a string"))),
        )
        .state(StateBuilder::new("expert").description("Wow, you are a todo expert!!!"))
        .state(StateBuilder::new("got stuff").description("I got a bunch of todos"))
        .create(&registry())?;

    let tour = machine.spawn(());
    let describe = machine.clone();
    tour.subscribe(move |snapshot: &Snapshot<Tour>| {
        let note = describe
            .state(&snapshot.state)
            .and_then(|state| state.description())
            .unwrap_or_default();
        println!("  [{}] count={} {}", snapshot.state, snapshot.context.count, note);
    });

    println!("Adding a todo...");
    tour.send("todo.added")?;

    println!("Updating it, not completed yet...");
    tour.send(Event::with_data(
        "todo.updated",
        json!({ "todo": { "completed": false } }),
    ))?;

    println!("Completing it...");
    tour.send(Event::with_data(
        "todo.updated",
        json!({ "todo": { "completed": true } }),
    ))?;

    println!("Removing it...");
    tour.send("todo.removed")?;

    println!("Adding ten more...");
    for _ in 0..10 {
        tour.send("todo.added")?;
    }
    tour.flush().await;

    let snapshot = tour.snapshot();
    println!(
        "\nFinished in '{}' after {} additions",
        snapshot.state, snapshot.context.count
    );

    tour.stop();
    tour.flush().await;
    println!("Stopped: {:?}", tour.status());

    Ok(())
}
