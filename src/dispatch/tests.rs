use std::collections::BTreeSet;
use std::sync::Arc;

use super::test_support::{ScriptedTransport, Step, unit_url};
use super::*;

fn units(count: usize) -> Vec<WorkUnit> {
    (0..count)
        .map(|index| WorkUnit::new(index, unit_url(index)))
        .collect()
}

fn concurrency(value: usize) -> Result<PositiveUsize, String> {
    PositiveUsize::try_from(value).map_err(|err| format!("Invalid concurrency: {}", err))
}

async fn drain(completions: &mut Completions) -> Vec<RequestOutcome> {
    let mut outcomes = Vec::new();
    while let Some(outcome) = completions.next().await {
        outcomes.push(outcome);
    }
    outcomes
}

fn jittered(index: usize) -> Step {
    let delay_ms = u64::try_from(index.wrapping_mul(7) % 13).unwrap_or(0).saturating_add(1);
    Step::Respond {
        delay_ms,
        status: 200,
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn in_flight_never_exceeds_concurrency() -> Result<(), String> {
    for limit in [1usize, 2, 8] {
        let transport = Arc::new(ScriptedTransport::new(jittered));
        let dispatcher = Dispatcher::new(Arc::clone(&transport), concurrency(limit)?);
        let mut completions = dispatcher.dispatch(units(40));
        let outcomes = drain(&mut completions).await;
        completions
            .finish()
            .await
            .map_err(|err| format!("Finish failed: {}", err))?;

        if outcomes.len() != 40 {
            return Err(format!("Expected 40 outcomes, got {}", outcomes.len()));
        }
        let peak = transport.peak_in_flight();
        if peak > limit {
            return Err(format!("Peak in flight {} exceeds limit {}", peak, limit));
        }
        if peak != limit {
            return Err(format!("Expected the pool to saturate at {}, saw {}", limit, peak));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn every_unit_completes_exactly_once() -> Result<(), String> {
    for limit in [1usize, 4, 16] {
        for count in [0usize, 1, 5, 64] {
            let transport = Arc::new(ScriptedTransport::new(jittered));
            let dispatcher = Dispatcher::new(Arc::clone(&transport), concurrency(limit)?);
            let mut completions = dispatcher.dispatch(units(count));
            if completions.submitted() != count {
                return Err(format!("Submitted {} != {}", completions.submitted(), count));
            }
            let outcomes = drain(&mut completions).await;
            completions
                .finish()
                .await
                .map_err(|err| format!("Finish failed: {}", err))?;

            let indices: BTreeSet<usize> = outcomes.iter().map(|outcome| outcome.index).collect();
            if outcomes.len() != count || indices.len() != count {
                return Err(format!(
                    "C={} N={}: {} outcomes, {} distinct indices",
                    limit,
                    count,
                    outcomes.len(),
                    indices.len()
                ));
            }
            if transport.calls() != count {
                return Err(format!("Expected {} calls, saw {}", count, transport.calls()));
            }
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn completions_arrive_out_of_order_with_resolved_urls() -> Result<(), String> {
    let transport = Arc::new(ScriptedTransport::from_steps(vec![
        Step::Respond {
            delay_ms: 50,
            status: 200,
        },
        Step::Respond {
            delay_ms: 10,
            status: 200,
        },
    ]));
    let dispatcher = Dispatcher::new(transport, concurrency(2)?);
    let mut completions = dispatcher.dispatch(units(2));
    let outcomes = drain(&mut completions).await;
    completions
        .finish()
        .await
        .map_err(|err| format!("Finish failed: {}", err))?;

    let order: Vec<usize> = outcomes.iter().map(|outcome| outcome.index).collect();
    if order != [1, 0] {
        return Err(format!("Expected completion order [1, 0], got {:?}", order));
    }
    for outcome in &outcomes {
        if outcome.url != unit_url(outcome.index) {
            return Err(format!("Unexpected url {}", outcome.url));
        }
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn elapsed_time_covers_only_the_call() -> Result<(), String> {
    let transport = ScriptedTransport::from_steps(vec![Step::Respond {
        delay_ms: 25,
        status: 204,
    }]);
    let outcome = execute_unit(&transport, WorkUnit::new(0, unit_url(0))).await;
    if outcome.status_code != 204 || outcome.transport_error {
        return Err(format!("Unexpected outcome {:?}", outcome));
    }
    if (outcome.elapsed_ms - 25.0).abs() > 1.0 {
        return Err(format!("Expected ~25ms, got {}", outcome.elapsed_ms));
    }
    if outcome.is_failure() {
        return Err("204 should not be a failure".to_owned());
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn non_success_status_is_reported_as_failure() -> Result<(), String> {
    let transport = ScriptedTransport::from_steps(vec![Step::Respond {
        delay_ms: 5,
        status: 503,
    }]);
    let outcome = execute_unit(&transport, WorkUnit::new(0, unit_url(0))).await;
    if outcome.status_code != 503 || outcome.transport_error || !outcome.is_failure() {
        return Err(format!("Unexpected outcome {:?}", outcome));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn transport_errors_and_panics_become_failure_outcomes() -> Result<(), String> {
    let transport = Arc::new(ScriptedTransport::from_steps(vec![
        Step::Refuse { delay_ms: 3 },
        Step::Panic,
        Step::Respond {
            delay_ms: 2,
            status: 200,
        },
    ]));
    let dispatcher = Dispatcher::new(transport, concurrency(3)?);
    let mut completions = dispatcher.dispatch(units(3));
    let mut outcomes = drain(&mut completions).await;
    completions
        .finish()
        .await
        .map_err(|err| format!("Finish failed: {}", err))?;
    outcomes.sort_by_key(|outcome| outcome.index);

    if outcomes.len() != 3 {
        return Err(format!("Expected 3 outcomes, got {}", outcomes.len()));
    }
    for outcome in outcomes.iter().take(2) {
        if !outcome.transport_error
            || outcome.status_code != TRANSPORT_FAILURE_STATUS
            || outcome.elapsed_ms != FAILURE_ELAPSED_MS
        {
            return Err(format!("Expected a failure outcome, got {:?}", outcome));
        }
    }
    match outcomes.get(2) {
        Some(outcome) if outcome.status_code == 200 && !outcome.is_failure() => Ok(()),
        other => Err(format!("Expected request 2 to succeed, got {:?}", other)),
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn finish_releases_pending_units_when_consumer_stops_early() -> Result<(), String> {
    let transport = Arc::new(ScriptedTransport::new(jittered));
    let dispatcher = Dispatcher::new(transport, concurrency(2)?);
    let mut completions = dispatcher.dispatch(units(10));
    if completions.next().await.is_none() {
        return Err("Expected at least one outcome".to_owned());
    }
    completions
        .finish()
        .await
        .map_err(|err| format!("Finish failed: {}", err))
}
