use log::info;
use std::ops::RangeInclusive;

/// Ports this node relays to. Owned by the ingestion worker.
#[derive(Debug, Clone)]
pub struct Peers {
    home_port: u16,
    admission: RangeInclusive<u16>,
    ports: Vec<u16>,
}

impl Peers {
    pub fn new(home_port: u16, admission: RangeInclusive<u16>) -> Peers {
        Peers {
            home_port,
            admission,
            ports: vec![],
        }
    }

    /// Adds a configured peer. Configured peers bypass the admission range and
    /// may include this node's own port.
    pub fn add_peer(&mut self, port: u16) {
        if !self.ports.contains(&port) {
            self.ports.push(port);
        }
    }

    pub fn evict_peer(&mut self, port: u16) {
        if let Some(idx) = self.ports.iter().position(|&p| p == port) {
            self.ports.remove(idx);
        }
    }

    pub fn is_admissible(&self, port: u16) -> bool {
        port != self.home_port && self.admission.contains(&port)
    }

    /// Admits `port` if it is new, in range and not this node. Returns whether
    /// it was added.
    pub fn admit(&mut self, port: u16) -> bool {
        if self.is_known(port) || !self.is_admissible(port) {
            return false;
        }
        info!("Added peer {port}");
        self.ports.push(port);
        true
    }

    pub fn is_known(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    pub fn get_peers(&self) -> &[u16] {
        self.ports.as_slice()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
