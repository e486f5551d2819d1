//! Live relay WebSocket handler and the tasks behind it.
//!
//! One client connection maps onto one backend session and four tasks:
//!
//! - **inbound router** - classifies client frames, feeds the ingress queue
//! - **session bridge** - drains the queue into the backend session
//! - **event receiver** - turns backend events into outbound messages
//! - **outbound dispatcher** - serializes messages onto the socket in order
//!
//! The bounded ingress queue is the backpressure point between router and
//! bridge; a shared cancellation token ties the lifetimes together.

pub mod handler;
pub mod ingress;
pub mod messages;
pub mod receiver;
pub mod registry;
pub mod router;
pub mod turn;

pub use handler::{live_handler, run_session};
pub use ingress::{AudioChunk, IngressItem, ingress_queue, session_bridge};
pub use messages::{ClientFrame, ClientMessage, OutboundRoute, ServerMessage};
pub use receiver::event_receiver;
pub use registry::{ClientHandle, ClientRegistry, LifecycleState};
pub use router::client_router;
pub use turn::{TurnState, TurnTracker};
