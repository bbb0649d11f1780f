use sim_schema::Money;

/// The single sentinel signalling "this command did not succeed". The
/// failure reason lives in the [`ContextSnapshot`](crate::ContextSnapshot)
/// error record, never in the outcome itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failed;

/// Result of one dispatch: the command's cost on success.
pub type Outcome = Result<Money, Failed>;

/// Legacy wire encoding of the failure sentinel. Kept only at the encoding
/// boundary; in-process code uses [`Outcome`].
pub const FAILURE_SENTINEL: u32 = 0x8000_0000;

pub fn outcome_to_wire(outcome: Outcome) -> u32 {
    match outcome {
        Ok(cost) => cost.0 as i32 as u32,
        Err(Failed) => FAILURE_SENTINEL,
    }
}

pub fn outcome_from_wire(value: u32) -> Outcome {
    if value == FAILURE_SENTINEL {
        Err(Failed)
    } else {
        Ok(Money(value as i32 as i64))
    }
}
