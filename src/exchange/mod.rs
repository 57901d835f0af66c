//! Peer-to-peer rule migration
//!
//! A [`RuleDistributer`] decides which rules leave and enter a population, a
//! [`RuleRouter`] decides which peers a batch goes to, and a [`RuleSocket`]
//! moves batches between addresses. Sockets own the address registry; routers
//! and distributers only hold weak handles back up the chain.

pub mod distributer;
pub mod message;
pub mod router;
pub mod socket;

pub use distributer::RuleDistributer;
pub use message::{MessageMetadata, MigratingRule, RuleMessage};
pub use router::{PeerRouter, RuleInbound, RuleRouter, Topology};
pub use socket::{InProcessSocket, RuleSocket};
