//! Recursive call visualizations.
//!
//! Every call appends one node to the call tree, pushes itself on the call
//! stack, waits a full beat in `computing`, recurses, then records its
//! result as `computed`, pops itself and waits a half beat.

use std::collections::HashMap;

use futures::future::BoxFuture;

use super::RecursionAlgorithm;
use crate::entities::{CallId, CallState, Point};
use crate::playback::{Beat, Cancelled, StepContext};

/// Position of the root call
const ROOT: Point = Point::new(400.0, 40.0);

/// Run `algorithm` for `input`, clamped to the algorithm's bounds
///
/// # Errors
///
/// Returns [`Cancelled`] as soon as the run is superseded.
pub async fn run(
    ctx: &StepContext,
    algorithm: RecursionAlgorithm,
    input: u32,
) -> Result<(), Cancelled> {
    let n = input.clamp(RecursionAlgorithm::MIN_INPUT, algorithm.max_input());
    tracing::info!(%algorithm, n, "Recursion started");

    let result = match algorithm {
        RecursionAlgorithm::Fibonacci => fibonacci(ctx, &mut HashMap::new(), n, ROOT, None).await?,
        RecursionAlgorithm::Factorial => factorial(ctx, n, ROOT, None).await?,
        RecursionAlgorithm::Hanoi => {
            let pegs = Pegs {
                from: 'A',
                to: 'C',
                via: 'B',
            };
            hanoi(ctx, &mut 0, n, pegs, ROOT, None).await?
        }
    };
    tracing::debug!(%algorithm, n, result, "Recursion finished");
    Ok(())
}

/// Create the call node, push it and wait a full beat
async fn enter(
    ctx: &StepContext,
    label: String,
    frame: String,
    at: Point,
    parent: Option<CallId>,
) -> Result<CallId, Cancelled> {
    let id = ctx.apply(|m| {
        let id = m.calls.add(label.clone(), at, parent);
        m.calls.set_state(id, CallState::Computing, None);
        m.call_stack.push(frame);
        m.order.push(label);
        id
    })?;
    ctx.pause(Beat::Full).await?;
    Ok(id)
}

/// Record the result, pop the frame and wait a half beat
async fn complete(ctx: &StepContext, id: CallId, result: u64) -> Result<u64, Cancelled> {
    ctx.apply(|m| {
        m.calls.set_state(id, CallState::Computed, Some(result));
        m.call_stack.pop();
    })?;
    ctx.pause(Beat::Half).await?;
    Ok(result)
}

/// Memoized Fibonacci; the memo is consulted after the base case
fn fibonacci<'a>(
    ctx: &'a StepContext,
    memo: &'a mut HashMap<u32, u64>,
    n: u32,
    at: Point,
    parent: Option<CallId>,
) -> BoxFuture<'a, Result<u64, Cancelled>> {
    Box::pin(async move {
        let id = enter(ctx, format!("fib({n})"), format!("fib({n})"), at, parent).await?;

        if n <= 1 {
            return complete(ctx, id, u64::from(n)).await;
        }
        if let Some(&known) = memo.get(&n) {
            return complete(ctx, id, known).await;
        }

        let spread = 60.0 / (at.y / 60.0);
        let below = at.y + 70.0;
        let left = fibonacci(ctx, memo, n - 1, Point::new(at.x - spread, below), Some(id)).await?;
        let right = fibonacci(ctx, memo, n - 2, Point::new(at.x + spread, below), Some(id)).await?;

        let result = left + right;
        memo.insert(n, result);
        complete(ctx, id, result).await
    })
}

fn factorial<'a>(
    ctx: &'a StepContext,
    n: u32,
    at: Point,
    parent: Option<CallId>,
) -> BoxFuture<'a, Result<u64, Cancelled>> {
    Box::pin(async move {
        let id = enter(ctx, format!("{n}!"), format!("factorial({n})"), at, parent).await?;
        if n <= 1 {
            return complete(ctx, id, 1).await;
        }
        let below = factorial(ctx, n - 1, Point::new(at.x, at.y + 80.0), Some(id)).await?;
        complete(ctx, id, u64::from(n) * below).await
    })
}

/// Peg names of one Hanoi call
#[derive(Clone, Copy)]
struct Pegs {
    from: char,
    to: char,
    via: char,
}

/// Tower of Hanoi; each call's result is the move count when it completes
fn hanoi<'a>(
    ctx: &'a StepContext,
    moves: &'a mut u64,
    n: u32,
    pegs: Pegs,
    at: Point,
    parent: Option<CallId>,
) -> BoxFuture<'a, Result<u64, Cancelled>> {
    Box::pin(async move {
        let Pegs { from, to, via } = pegs;
        let label = format!("H({n}, {from}→{to})");
        let frame = format!("hanoi({n}, {from}, {to})");
        let id = enter(ctx, label, frame, at, parent).await?;

        if n == 1 {
            *moves += 1;
            return complete(ctx, id, *moves).await;
        }

        let spread = 100.0 / (at.y / 50.0 + 1.0);
        let below = at.y + 70.0;
        let first = Pegs { from, to: via, via: to };
        hanoi(ctx, moves, n - 1, first, Point::new(at.x - spread, below), Some(id)).await?;
        *moves += 1;
        let second = Pegs { from: via, to, via: from };
        hanoi(ctx, moves, n - 1, second, Point::new(at.x + spread, below), Some(id)).await?;

        complete(ctx, id, *moves).await
    })
}
