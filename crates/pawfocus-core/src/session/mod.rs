mod clock;
mod machine;

pub use clock::{ClockToken, SessionClock};
pub use machine::{
    SessionMachine, SessionStatus, TickOutcome, Transition, DEFAULT_FAILURE_MESSAGE,
    VISIBILITY_LOST_MESSAGE,
};
