//! Suspension with the pause sentinel and waiting on deferred values.

use catena::test_utils::{CallLog, Counter, plain, tag};
use catena::{Chain, Deferred, Latch, Outcome, SettleCallback, StepRef, StepResult, step};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn pause() -> StepRef {
    step::from_fn(|ctx, _args| Ok(ctx.pause()))
}

/// A step that hands back `deferred` instead of a value.
fn wait_on(deferred: Arc<dyn Deferred>) -> StepRef {
    step::from_fn(move |_ctx, _args| Ok(StepResult::Pending(Arc::clone(&deferred))))
}

fn suspended(outcome: Outcome) -> catena::Continuation {
    outcome
        .into_continuation()
        .expect("traversal should be suspended")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pause and continuations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn pause_is_transparent_once_resumed() {
    let plain = Chain::from_items([tag("a"), tag("b"), tag("c")]).unwrap();
    let paused = Chain::from_items([tag("a"), tag("b"), pause(), tag("c")]).unwrap();

    let expected = plain.call(json!(1), None).unwrap().into_value();
    let continuation = suspended(paused.call(json!(1), None).unwrap());
    assert_eq!(continuation.value(), json!("c1"));
    assert_eq!(continuation.args(), &[json!("c1")]);
    assert_eq!(continuation.run(None, None).unwrap().into_value(), expected);
}

#[test]
fn nodes_after_the_pause_wait_for_run() {
    let log = CallLog::new();
    let chain = Chain::from_items([
        log.step("after", json!("done")),
        pause(),
        log.step("before", json!("mid")),
    ])
    .unwrap();

    let continuation = suspended(chain.call(json!(0), None).unwrap());
    assert_eq!(log.names(), vec!["before"]);

    let outcome = continuation.run(None, None).unwrap();
    assert_eq!(outcome.value(), Some(&json!("done")));
    assert_eq!(log.names(), vec!["before", "after"]);
    assert_eq!(log.entries()[1].args, vec![json!("mid")]);
}

#[test]
fn run_substitutes_arguments_and_receiver() {
    let greet = step::from_fn(|ctx, args| {
        let name = ctx.context().and_then(|c| c["name"].as_str()).unwrap_or("nobody");
        Ok(json!(format!("{name}:{}", catena::test_utils::plain(&args[0]))).into())
    });
    let chain = Chain::from_items([greet, pause()]).unwrap();
    let continuation = suspended(chain.call(json!("x"), Some(json!({"name": "ann"}))).unwrap());

    let replayed = continuation.run(None, None).unwrap().into_value();
    assert_eq!(replayed, Some(json!("ann:x")));

    let substituted = continuation
        .run(Some(vec![json!("y")]), Some(json!({"name": "bo"})))
        .unwrap()
        .into_value();
    assert_eq!(substituted, Some(json!("bo:y")));
}

#[test]
fn continuations_can_be_run_again() {
    let runs = Counter::new();
    let chain = Chain::from_items([runs.step(json!("end")), pause()]).unwrap();
    let continuation = suspended(chain.call(Value::Null, None).unwrap());
    assert_eq!(runs.get(), 0);
    assert!(continuation.run(None, None).unwrap().is_done());
    assert!(continuation.clone().run(None, None).unwrap().is_done());
    assert_eq!(runs.get(), 2);

    runs.reset();
    continuation.run(None, None).unwrap();
    assert_eq!(runs.get(), 1);
}

#[test]
fn a_resumed_traversal_can_suspend_again() {
    let chain = Chain::from_items([tag("c"), pause(), tag("b"), pause(), tag("a")]).unwrap();
    let first = suspended(chain.call(json!(1), None).unwrap());
    assert_eq!(first.value(), json!("a1"));
    let second = suspended(first.run(None, None).unwrap());
    assert_eq!(second.value(), json!("ba1"));
    assert_eq!(
        second.run(None, None).unwrap().into_value(),
        Some(json!("cba1"))
    );
}

#[test]
fn pause_at_the_tail_resumes_to_the_captured_value() {
    let chain = Chain::from_items([pause(), tag("a")]).unwrap();
    let continuation = suspended(chain.call(json!(1), None).unwrap());
    assert!(continuation.resume_at().is_none());
    assert_eq!(
        continuation.run(None, None).unwrap().into_value(),
        Some(json!("a1"))
    );

    let chain = Chain::from_items([pause(), step::identity()]).unwrap();
    let continuation = suspended(chain.apply(vec![json!(1), json!(2)], None).unwrap());
    assert_eq!(continuation.value(), json!([1, 2]));
    assert_eq!(
        continuation.run(None, None).unwrap().into_value(),
        Some(json!([1, 2]))
    );
}

#[test]
fn predicates_can_be_suspended() {
    let falsey = Counter::new();
    let chain = Chain::from_items([
        step::predicate(|_| true),
        pause(),
        falsey.step(json!(false)),
    ])
    .unwrap();
    let continuation = suspended(chain.some(Value::Null, None).unwrap());
    assert_eq!(falsey.get(), 1);
    assert_eq!(
        continuation.run(None, None).unwrap().into_value(),
        Some(json!(true))
    );

    let chain = Chain::from_items([pause(), step::predicate(|_| true)]).unwrap();
    let continuation = suspended(chain.every(Value::Null, None).unwrap());
    assert_eq!(
        continuation.run(None, None).unwrap().into_value(),
        Some(json!(true))
    );
}

#[test]
fn distribute_resumes_with_the_original_argument() {
    let log = CallLog::new();
    let chain = Chain::from_items([log.step("after", Value::Null), pause(), log.step("before", json!(9))])
        .unwrap();
    let continuation = suspended(chain.distribute(json!("same"), None).unwrap());
    continuation.run(None, None).unwrap();
    assert!(log.entries().iter().all(|e| e.args == vec![json!("same")]));
}

#[test]
fn distribute_paused_at_the_tail_keeps_the_last_value() {
    let plain_run = Chain::new(tag("x")).distribute(json!(1), None).unwrap();
    let chain = Chain::from_items([pause(), tag("x")]).unwrap();
    let continuation = suspended(chain.distribute(json!(1), None).unwrap());
    assert_eq!(
        continuation.run(None, None).unwrap().into_value(),
        plain_run.into_value()
    );

    let chain = Chain::from_items([pause(), step::map_all(|args| json!(args.len()))]).unwrap();
    let continuation = suspended(chain.distribute_all(vec![json!(1), json!(2)], None).unwrap());
    assert_eq!(
        continuation.run(None, None).unwrap().into_value(),
        Some(json!(2))
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Deferred values
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn a_settled_deferred_is_consumed_in_place() {
    let latch: Arc<dyn Deferred> = Arc::new(Latch::settled(json!("v")));
    let chain = Chain::from_items([tag("a"), wait_on(latch)]).unwrap();
    assert_eq!(
        chain.call(json!(1), None).unwrap().into_value(),
        Some(json!("av"))
    );
}

#[test]
fn a_pending_deferred_parks_the_traversal() {
    let latch = Arc::new(Latch::new());
    let log = CallLog::new();
    let chain = Chain::from_items([
        log.step("after", json!("done")),
        wait_on(latch.clone()),
        log.step("before", json!(0)),
    ])
    .unwrap();

    let awaiting = chain
        .call(json!(1), None)
        .unwrap()
        .into_awaiting()
        .expect("traversal should be waiting");
    assert!(!awaiting.is_settled());
    assert_eq!(log.names(), vec!["before"]);

    assert!(latch.settle(json!("settled")));
    assert_eq!(log.names(), vec!["before", "after"]);
    assert_eq!(log.entries()[1].args, vec![json!("settled")]);

    let outcome = awaiting.try_take().expect("settled").unwrap();
    assert_eq!(outcome.into_value(), Some(json!("done")));
    assert!(awaiting.try_take().is_none());
}

#[test]
fn settling_twice_resumes_once() {
    let latch = Arc::new(Latch::new());
    let runs = Counter::new();
    let chain = Chain::from_items([runs.step(Value::Null), wait_on(latch.clone())]).unwrap();
    chain.call(Value::Null, None).unwrap();

    assert!(latch.settle(json!(1)));
    assert!(!latch.settle(json!(2)));
    assert_eq!(runs.get(), 1);
    assert_eq!(latch.value(), Some(json!(1)));
}

#[test]
fn a_deferred_at_the_tail_yields_the_settled_value() {
    let latch = Arc::new(Latch::new());
    let chain = Chain::new(wait_on(latch.clone()));
    let awaiting = chain.call(Value::Null, None).unwrap().into_awaiting().unwrap();
    latch.settle(json!(42));
    assert_eq!(
        awaiting.try_take().unwrap().unwrap().into_value(),
        Some(json!(42))
    );
}

#[test]
fn every_stops_on_a_settled_false() {
    let latch = Arc::new(Latch::new());
    let truthy = Counter::new();
    let chain = Chain::from_items([truthy.step(json!(true)), wait_on(latch.clone())]).unwrap();
    let awaiting = chain.every(Value::Null, None).unwrap().into_awaiting().unwrap();
    latch.settle(json!(false));
    assert_eq!(truthy.get(), 0);
    assert_eq!(
        awaiting.try_take().unwrap().unwrap().into_value(),
        Some(json!(false))
    );
}

#[test]
fn nested_waits_complete_the_outer_handle() {
    let first = Arc::new(Latch::new());
    let second = Arc::new(Latch::new());
    let chain = Chain::from_items([
        tag("c"),
        wait_on(second.clone()),
        tag("b"),
        wait_on(first.clone()),
    ])
    .unwrap();

    let awaiting = chain.call(Value::Null, None).unwrap().into_awaiting().unwrap();
    first.settle(json!(1));
    assert!(!awaiting.is_settled());
    second.settle(json!(2));
    assert_eq!(
        awaiting.try_take().unwrap().unwrap().into_value(),
        Some(json!("c2"))
    );
}

#[test]
fn a_resumed_traversal_can_pause() {
    let latch = Arc::new(Latch::new());
    let chain = Chain::from_items([tag("a"), pause(), wait_on(latch.clone())]).unwrap();
    let awaiting = chain.call(Value::Null, None).unwrap().into_awaiting().unwrap();
    latch.settle(json!(1));
    let continuation = suspended(awaiting.try_take().unwrap().unwrap());
    assert_eq!(continuation.value(), json!(1));
    assert_eq!(
        continuation.run(None, None).unwrap().into_value(),
        Some(json!("a1"))
    );
}

#[test]
fn a_long_run_of_pending_steps_stays_flat() {
    let latches: Arc<Mutex<Vec<Arc<Latch>>>> = Arc::default();
    let park = {
        let latches = Arc::clone(&latches);
        step::from_fn(move |_ctx, _args| {
            let latch = Arc::new(Latch::new());
            latches.lock().push(Arc::clone(&latch));
            Ok(StepResult::Pending(latch))
        })
    };
    let mut head = Chain::new(step::map(|v| json!(format!("z{}", plain(v)))));
    for _ in 0..100_000 {
        head = head.push(&park);
    }

    let awaiting = head.call(json!(0), None).unwrap().into_awaiting().unwrap();
    let mut settled: u64 = 0;
    loop {
        let next = latches.lock().pop();
        let Some(latch) = next else { break };
        assert!(!awaiting.is_settled());
        latch.settle(json!(settled));
        settled += 1;
    }

    assert_eq!(settled, 100_000);
    assert_eq!(
        awaiting.try_take().unwrap().unwrap().into_value(),
        Some(json!("z99999"))
    );
}

/// Reports settled but only calls back when fired.
#[derive(Default)]
struct Late {
    callback: Mutex<Option<SettleCallback>>,
}

impl Late {
    fn fire(&self, value: Value) {
        let callback = self.callback.lock().take();
        if let Some(callback) = callback {
            callback(value);
        }
    }
}

impl Deferred for Late {
    fn is_pending(&self) -> bool {
        false
    }

    fn on_settle(&self, callback: SettleCallback) {
        *self.callback.lock() = Some(callback);
    }
}

/// Reports pending but calls back straight away.
struct Eager(Value);

impl Deferred for Eager {
    fn is_pending(&self) -> bool {
        true
    }

    fn on_settle(&self, callback: SettleCallback) {
        callback(self.0.clone());
    }
}

#[test]
fn a_deferred_that_calls_back_later_parks_the_traversal() {
    let late = Arc::new(Late::default());
    let chain = Chain::from_items([tag("a"), wait_on(late.clone())]).unwrap();
    let awaiting = chain.call(json!(1), None).unwrap().into_awaiting().unwrap();
    assert!(!awaiting.is_settled());

    late.fire(json!("v"));
    assert_eq!(
        awaiting.try_take().unwrap().unwrap().into_value(),
        Some(json!("av"))
    );
}

#[test]
fn a_deferred_that_calls_back_at_once_is_consumed_in_place() {
    let chain = Chain::from_items([tag("a"), wait_on(Arc::new(Eager(json!("v"))))]).unwrap();
    let outcome = chain.call(json!(1), None).unwrap();
    assert!(outcome.is_done());
    assert_eq!(outcome.into_value(), Some(json!("av")));
}

#[tokio::test]
async fn awaiting_handles_are_futures() {
    let latch = Arc::new(Latch::new());
    let chain = Chain::from_items([tag("a"), wait_on(latch.clone())]).unwrap();
    let awaiting = chain.call(Value::Null, None).unwrap().into_awaiting().unwrap();

    let settle = Arc::clone(&latch);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        settle.settle(json!("late"));
    });

    let outcome = awaiting.await.unwrap();
    assert_eq!(outcome.into_value(), Some(json!("alate")));
}

#[tokio::test]
async fn spawned_futures_settle_deferred_values() {
    let deferred: Arc<dyn Deferred> = catena::deferred::spawn(async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        json!("from a task")
    });
    let chain = Chain::from_items([tag("> "), wait_on(deferred)]).unwrap();
    let outcome = match chain.call(Value::Null, None).unwrap() {
        Outcome::Awaiting(awaiting) => awaiting.await.unwrap(),
        other => other,
    };
    assert_eq!(outcome.into_value(), Some(json!("> from a task")));
}
