//! State change events and the dispatcher that routes them
//!
//! Mutations of the query state produce [`events::StateEvent`]s. The
//! dispatcher hands each event to its subscribers, which answer with the
//! fetch work it implies.

pub mod dispatcher;
pub mod events;
