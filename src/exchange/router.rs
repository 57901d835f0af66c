use super::message::RuleMessage;
use super::socket::RuleSocket;
use crate::error::{LcsError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Receiving end of a peer: whatever merges arriving rules into a population
pub trait RuleInbound: Send + Sync {
    /// Returns the numerosity merged into the local population
    fn accept_rules(&self, message: &RuleMessage) -> Result<usize>;
}

/// Topology layer between a distributer and the transport
pub trait RuleRouter: Send + Sync {
    /// Fan `message` out to every peer; returns how many peers took delivery
    fn send_rules(&self, message: &RuleMessage) -> Result<usize>;

    /// Called by the socket once this router is registered at `address`
    fn set_router_socket(&self, socket: Weak<dyn RuleSocket>, address: &str);

    fn set_inbound(&self, inbound: Weak<dyn RuleInbound>);

    /// Inbound delivery from the socket
    fn receive_rules(&self, message: &RuleMessage) -> Result<()>;

    /// Called by the socket when `address` no longer routes to this router
    fn release_address(&self, _address: &str) {}

    /// First address this router is registered under
    fn local_address(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Every address on the socket except this router's own
    AllToAll,
    Explicit(Vec<String>),
}

#[derive(Default)]
struct RouterLink {
    socket: Option<Weak<dyn RuleSocket>>,
    addresses: Vec<String>,
}

/// Router that broadcasts to its topology's peers over one socket
pub struct PeerRouter {
    topology: Topology,
    link: RwLock<RouterLink>,
    inbound: RwLock<Option<Weak<dyn RuleInbound>>>,
}

impl PeerRouter {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            link: RwLock::new(RouterLink::default()),
            inbound: RwLock::new(None),
        }
    }

    pub fn all_to_all() -> Self {
        Self::new(Topology::AllToAll)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Addresses this router is registered under, in registration order
    pub fn addresses(&self) -> Vec<String> {
        self.link.read().unwrap_or_else(PoisonError::into_inner).addresses.clone()
    }

    fn socket(&self) -> Result<Arc<dyn RuleSocket>> {
        self.link
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .socket
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| LcsError::NotFound("Router is not attached to a live socket".to_string()))
    }

    /// Destinations for the next broadcast
    pub fn peers(&self) -> Result<Vec<String>> {
        match &self.topology {
            Topology::Explicit(peers) => Ok(peers.clone()),
            Topology::AllToAll => {
                let socket = self.socket()?;
                let own = self.addresses();
                Ok(socket
                    .addresses()
                    .into_iter()
                    .filter(|address| !own.contains(address))
                    .collect())
            }
        }
    }
}

impl RuleRouter for PeerRouter {
    fn send_rules(&self, message: &RuleMessage) -> Result<usize> {
        let socket = self.socket()?;
        let mut delivered = 0;
        let mut first_error = None;

        for peer in self.peers()? {
            match socket.send_rules(message, &peer) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    log::warn!("Delivery of {} rules to '{}' failed: {}", message.len(), peer, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(delivered),
        }
    }

    fn set_router_socket(&self, socket: Weak<dyn RuleSocket>, address: &str) {
        let mut link = self.link.write().unwrap_or_else(PoisonError::into_inner);
        let same_socket = link
            .socket
            .as_ref()
            .map_or(false, |current| Weak::ptr_eq(current, &socket));
        if !same_socket {
            link.addresses.clear();
            link.socket = Some(socket);
        }
        if !link.addresses.iter().any(|known| known == address) {
            link.addresses.push(address.to_string());
        }
    }

    fn release_address(&self, address: &str) {
        let mut link = self.link.write().unwrap_or_else(PoisonError::into_inner);
        link.addresses.retain(|known| known != address);
        log::debug!("Router released address '{}'", address);
    }

    fn set_inbound(&self, inbound: Weak<dyn RuleInbound>) {
        *self.inbound.write().unwrap_or_else(PoisonError::into_inner) = Some(inbound);
    }

    fn receive_rules(&self, message: &RuleMessage) -> Result<()> {
        let inbound = self
            .inbound
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| LcsError::NotFound("No distributer attached to router".to_string()))?;
        inbound.accept_rules(message)?;
        Ok(())
    }

    fn local_address(&self) -> Option<String> {
        self.link
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .addresses
            .first()
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionPolicy;
    use crate::exchange::message::MessageMetadata;
    use crate::exchange::socket::InProcessSocket;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingInbound {
        messages: Mutex<usize>,
    }

    impl RuleInbound for CountingInbound {
        fn accept_rules(&self, _message: &RuleMessage) -> Result<usize> {
            *self.messages.lock().unwrap() += 1;
            Ok(0)
        }
    }

    fn attach(socket: &Arc<InProcessSocket>, router: &Arc<PeerRouter>, address: &str) -> Arc<CountingInbound> {
        let inbound = Arc::new(CountingInbound::default());
        let as_inbound: Arc<dyn RuleInbound> = inbound.clone();
        router.set_inbound(Arc::downgrade(&as_inbound));
        let as_router: Arc<dyn RuleRouter> = router.clone();
        socket.set_rule_router(as_router, address).unwrap();
        inbound
    }

    fn message() -> RuleMessage {
        RuleMessage::new(Vec::new(), MessageMetadata::new("test", 0))
    }

    #[test]
    fn test_all_to_all_skips_self() {
        let socket = InProcessSocket::new(CollisionPolicy::FirstWriterWins, false);
        let routers: Vec<Arc<PeerRouter>> = (0..3).map(|_| Arc::new(PeerRouter::all_to_all())).collect();
        let inbounds: Vec<_> = routers
            .iter()
            .zip(["A", "B", "C"])
            .map(|(router, address)| attach(&socket, router, address))
            .collect();

        assert_eq!(routers[0].peers().unwrap(), vec!["B".to_string(), "C".to_string()]);
        assert_eq!(routers[0].send_rules(&message()).unwrap(), 2);
        assert_eq!(*inbounds[0].messages.lock().unwrap(), 0);
        assert_eq!(*inbounds[1].messages.lock().unwrap(), 1);
        assert_eq!(*inbounds[2].messages.lock().unwrap(), 1);
        assert_eq!(routers[1].local_address(), Some("B".to_string()));
    }

    #[test]
    fn test_explicit_topology_reports_missing_peer() {
        let socket = InProcessSocket::new(CollisionPolicy::FirstWriterWins, false);
        let sender = Arc::new(PeerRouter::new(Topology::Explicit(vec!["B".to_string(), "Z".to_string()])));
        let receiver = Arc::new(PeerRouter::all_to_all());
        let _sender_inbound = attach(&socket, &sender, "A");
        let receiver_inbound = attach(&socket, &receiver, "B");

        let result = sender.send_rules(&message());
        assert!(matches!(result, Err(LcsError::NotFound(_))));
        // The reachable peer still got its copy
        assert_eq!(*receiver_inbound.messages.lock().unwrap(), 1);
    }

    #[test]
    fn test_displaced_router_reaches_replacement() {
        let socket = InProcessSocket::new(CollisionPolicy::Replace, false);
        let old = Arc::new(PeerRouter::all_to_all());
        let new = Arc::new(PeerRouter::all_to_all());
        let _old_inbound = attach(&socket, &old, "A");
        let new_inbound = attach(&socket, &new, "A");

        assert_eq!(socket.addresses(), vec!["A".to_string()]);
        assert_eq!(old.local_address(), None);
        assert_eq!(new.local_address(), Some("A".to_string()));
        assert_eq!(old.peers().unwrap(), vec!["A".to_string()]);
        assert_eq!(new.peers().unwrap(), Vec::<String>::new());

        assert_eq!(old.send_rules(&message()).unwrap(), 1);
        assert_eq!(*new_inbound.messages.lock().unwrap(), 1);

        // Registering somewhere else starts from a clean address list
        let as_router: Arc<dyn RuleRouter> = old.clone();
        socket.set_rule_router(as_router, "B").unwrap();
        assert_eq!(old.addresses(), vec!["B".to_string()]);
    }

    #[test]
    fn test_detached_router() {
        let router = PeerRouter::all_to_all();
        assert!(matches!(router.send_rules(&message()), Err(LcsError::NotFound(_))));
        assert!(matches!(router.receive_rules(&message()), Err(LcsError::NotFound(_))));
        assert_eq!(router.local_address(), None);
    }
}
