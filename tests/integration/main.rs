//! Integration tests driving the public `Engine` API end to end.

mod invariants;
mod replay;
mod session_flow;
