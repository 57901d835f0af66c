use super::message::RuleMessage;
use super::router::RuleRouter;
use crate::config::CollisionPolicy;
use crate::error::{LcsError, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Address-keyed transport between routers
pub trait RuleSocket: Send + Sync {
    /// Register `router` under `address` and tell the router where it lives
    fn set_rule_router(&self, router: Arc<dyn RuleRouter>, address: &str) -> Result<()>;

    /// Deliver `message` to the router registered at `address`
    fn send_rules(&self, message: &RuleMessage, address: &str) -> Result<()>;

    /// Registered addresses, sorted
    fn addresses(&self) -> Vec<String>;

    /// Drop the registration at `address` and tell its router; returns whether one existed
    fn remove_address(&self, address: &str) -> bool;
}

fn same_router(a: &Arc<dyn RuleRouter>, b: &Arc<dyn RuleRouter>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

enum Registration {
    Unchanged,
    Registered { displaced: Option<Arc<dyn RuleRouter>> },
}

/// In-process hub: routers of every peer in this process share one registry
pub struct InProcessSocket {
    routers: RwLock<HashMap<String, Arc<dyn RuleRouter>>>,
    collision_policy: CollisionPolicy,
    allow_router_aliases: bool,
    this: Weak<InProcessSocket>,
}

impl InProcessSocket {
    pub fn new(collision_policy: CollisionPolicy, allow_router_aliases: bool) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            routers: RwLock::new(HashMap::new()),
            collision_policy,
            allow_router_aliases,
            this: this.clone(),
        })
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision_policy
    }

    pub fn len(&self) -> usize {
        self.routers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert under the write lock
    fn register(&self, router: &Arc<dyn RuleRouter>, address: &str) -> Result<Registration> {
        let mut routers = self.routers.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = routers.get(address) {
            if same_router(existing, router) {
                return Ok(Registration::Unchanged);
            }
        }

        if !self.allow_router_aliases {
            if let Some((other, _)) = routers
                .iter()
                .find(|(other, registered)| other.as_str() != address && same_router(registered, router))
            {
                return Err(LcsError::InvalidArgument(format!(
                    "Router already registered at '{}', cannot alias it as '{}'",
                    other, address
                )));
            }
        }

        if routers.contains_key(address) {
            match self.collision_policy {
                CollisionPolicy::FirstWriterWins => {
                    log::warn!("Address '{}' already taken, keeping the first router", address);
                    return Ok(Registration::Unchanged);
                }
                CollisionPolicy::Reject => {
                    return Err(LcsError::AddressInUse(address.to_string()));
                }
                CollisionPolicy::Replace => {
                    log::info!("Replacing router registered at '{}'", address);
                }
            }
        }

        let displaced = routers.insert(address.to_string(), Arc::clone(router));
        Ok(Registration::Registered { displaced })
    }
}

impl RuleSocket for InProcessSocket {
    fn set_rule_router(&self, router: Arc<dyn RuleRouter>, address: &str) -> Result<()> {
        if let Registration::Registered { displaced } = self.register(&router, address)? {
            if let Some(displaced) = displaced {
                displaced.release_address(address);
            }
            let socket: Weak<dyn RuleSocket> = self.this.clone();
            router.set_router_socket(socket, address);
            log::debug!("Router registered at '{}'", address);
        }
        Ok(())
    }

    fn send_rules(&self, message: &RuleMessage, address: &str) -> Result<()> {
        // Release the registry before handing over so the receiver may send or register
        let router = self
            .routers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
            .ok_or_else(|| LcsError::NotFound(format!("No router registered at '{}'", address)))?;
        router.receive_rules(message)
    }

    fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self
            .routers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        addresses.sort();
        addresses
    }

    fn remove_address(&self, address: &str) -> bool {
        let removed = self
            .routers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(address);
        match removed {
            Some(router) => {
                router.release_address(address);
                true
            }
            None => false,
        }
    }
}
