//! Conversation state machine
//!
//! Pure transitions over the [`Session`] record: the runtime feeds in user
//! text and collaborator results, and executes the returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, OutboundPrompt};
pub use event::{Event, InboundContent, InboundMessage};
pub use state::{AuthToken, DialogueState, ListingRequest, Registration, Session};
pub use transition::transition;
