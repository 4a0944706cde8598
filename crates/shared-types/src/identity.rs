//! # Local Identity & Addressing
//!
//! Every participant generates an Ed25519 keypair at start-up and takes a
//! host address inside the subnet assigned by the orchestration environment.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::entities::{PeerHandle, PeerId};
use crate::errors::NetworkSetupError;

/// Keypair plus the peer id derived from it.
pub struct LocalIdentity {
    signing_key: SigningKey,
    peer_id: PeerId,
}

impl LocalIdentity {
    /// Generate a fresh identity from the OS random source.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Deterministic identity, for reproducible fleets.
    #[must_use]
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&seed))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let peer_id = PeerId::from_public_key(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            peer_id,
        }
    }

    #[must_use]
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    #[must_use]
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Dialable handle for this identity.
    #[must_use]
    pub fn handle(&self, addrs: Vec<SocketAddr>) -> PeerHandle {
        PeerHandle::new(self.peer_id, addrs)
    }
}

impl fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalIdentity")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

/// IPv4 subnet in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    network: Ipv4Addr,
    prefix: u8,
}

impl Subnet {
    /// Number of usable host addresses (network and broadcast excluded).
    #[must_use]
    pub fn capacity(&self) -> u64 {
        let size = 1u64 << (32 - u32::from(self.prefix));
        size.saturating_sub(2)
    }

    /// Host address `index` (0-based) inside the subnet.
    pub fn host(&self, index: u32) -> Result<Ipv4Addr, NetworkSetupError> {
        if u64::from(index) >= self.capacity() {
            return Err(NetworkSetupError::SubnetExhausted {
                subnet: self.to_string(),
                index,
            });
        }
        let base = u32::from(self.network);
        Ok(Ipv4Addr::from(base + index + 1))
    }

    #[must_use]
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let mask = mask(self.prefix);
        u32::from(ip) & mask == u32::from(self.network)
    }
}

fn mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

impl FromStr for Subnet {
    type Err = NetworkSetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkSetupError::InvalidSubnet(s.to_string());
        let (ip, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let ip: Ipv4Addr = ip.trim().parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.trim().parse().map_err(|_| invalid())?;
        // /31 and /32 leave no usable hosts
        if prefix > 30 {
            return Err(invalid());
        }
        Ok(Self {
            network: Ipv4Addr::from(u32::from(ip) & mask(prefix)),
            prefix,
        })
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_identity_is_stable() {
        let a = LocalIdentity::from_seed([7u8; 32]);
        let b = LocalIdentity::from_seed([7u8; 32]);
        let c = LocalIdentity::from_seed([8u8; 32]);
        assert_eq!(a.peer_id(), b.peer_id());
        assert_ne!(a.peer_id(), c.peer_id());
        assert_eq!(a.peer_id(), PeerId::from_public_key(&a.public_key()));
    }

    #[test]
    fn test_subnet_hosts() {
        let subnet: Subnet = "16.0.0.0/16".parse().unwrap();
        assert_eq!(subnet.host(0).unwrap(), Ipv4Addr::new(16, 0, 0, 1));
        assert_eq!(subnet.host(256).unwrap(), Ipv4Addr::new(16, 0, 1, 1));
        assert!(subnet.contains(Ipv4Addr::new(16, 0, 200, 9)));
        assert!(!subnet.contains(Ipv4Addr::new(17, 0, 0, 1)));
    }

    #[test]
    fn test_subnet_normalises_network_address() {
        let subnet: Subnet = "10.1.2.3/24".parse().unwrap();
        assert_eq!(subnet.to_string(), "10.1.2.0/24");
        assert_eq!(subnet.capacity(), 254);
    }

    #[test]
    fn test_subnet_exhaustion() {
        let subnet: Subnet = "192.168.0.0/30".parse().unwrap();
        assert!(subnet.host(1).is_ok());
        assert!(matches!(
            subnet.host(2),
            Err(NetworkSetupError::SubnetExhausted { index: 2, .. })
        ));
    }

    #[test]
    fn test_subnet_rejects_garbage() {
        assert!("16.0.0.0".parse::<Subnet>().is_err());
        assert!("16.0.0/16".parse::<Subnet>().is_err());
        assert!("16.0.0.0/32".parse::<Subnet>().is_err());
    }
}
