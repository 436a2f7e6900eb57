//! Domain model (ids, messages, tuples, activation state, events, errors).

pub mod errors;
pub mod events;
pub mod ids;
pub mod message;
pub mod state;
pub mod tuple;

pub use self::errors::SpoutError;
pub use self::events::{EventLevel, SpoutEvent, StopReason};
pub use self::ids::DeliveryId;
pub use self::message::{Command, CommandMessage, InboundMessage, TaskId};
pub use self::state::{ActivationState, DeactivateMode};
pub use self::tuple::{DEFAULT_STREAM, Emission, OutboundTuple};
