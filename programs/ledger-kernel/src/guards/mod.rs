// Authority gate for every mutating instruction
//
// Two ways to satisfy a record's stored authority:
//
// - Direct: the authority itself signed the enclosing transaction. Signature
//   verification belongs to the substrate; by the time a transaction reaches
//   the ledger its signer list is trusted, and a `Signer` can only be obtained
//   by looking an address up in that list.
// - Delegated: the authority is a derived address with no private key. The
//   invoking program proves its right to act as that address by presenting a
//   `ProxyAuthority` whose seeds re-derive it with the supplied offset. Proxy
//   capabilities are minted only by the invocation context, always under the
//   invoking program's own namespace, so a top-level caller cannot forge one.
//
// The gate fails closed: every mismatch is `Unauthorized`.

use std::collections::BTreeSet;

use tracing::debug;

use crate::address::Address;
use crate::errors::{KernelError, Result};

// ================================
// Direct Signers
// ================================

/// Proof that an address signed the current transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    address: Address,
}

impl Signer {
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Addresses whose signatures the substrate verified for this transaction
#[derive(Debug, Clone, Default)]
pub struct SignerSet {
    signers: BTreeSet<Address>,
}

impl SignerSet {
    pub fn new<I: IntoIterator<Item = Address>>(signers: I) -> Self {
        Self { signers: signers.into_iter().collect() }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    pub fn require(&self, address: &Address) -> Result<Signer> {
        if !self.contains(address) {
            debug!(signer = %address, "required signer missing");
            return Err(KernelError::Unauthorized);
        }
        Ok(Signer { address: *address })
    }
}

// ================================
// Delegated Authority
// ================================

/// Capability to act as the address derived from `(tag, controller)` under `program`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyAuthority {
    program: Address,
    tag: &'static [u8],
    controller: Address,
    offset: u8,
}

impl ProxyAuthority {
    pub(crate) fn new(program: Address, tag: &'static [u8], controller: Address, offset: u8) -> Self {
        Self { program, tag, controller, offset }
    }

    pub fn program(&self) -> &Address {
        &self.program
    }

    pub fn tag(&self) -> &'static [u8] {
        self.tag
    }

    pub fn controller(&self) -> &Address {
        &self.controller
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// The address this proxy speaks for
    ///
    /// Uses the supplied offset as-is; an offset whose hash lands on the curve
    /// does not resolve at all.
    pub fn resolve(&self) -> Result<Address> {
        Address::create_program_address(
            &[self.tag, self.controller.as_ref()],
            self.offset,
            &self.program,
        )
        .map_err(|_| KernelError::Unauthorized)
    }
}

// ================================
// Authorization
// ================================

pub enum Authority {
    Direct(Signer),
    Delegated(ProxyAuthority),
}

impl Authority {
    /// Address the authority claims to act as
    pub fn acting_as(&self) -> Result<Address> {
        match self {
            Authority::Direct(signer) => Ok(*signer.address()),
            Authority::Delegated(proxy) => {
                debug!(
                    program = %proxy.program(),
                    tag = %String::from_utf8_lossy(proxy.tag()),
                    controller = %proxy.controller(),
                    offset = proxy.offset(),
                    "resolving delegated authority"
                );
                proxy.resolve()
            }
        }
    }
}

/// Check that `authority` may act for a record whose stored authority is `expected`
pub fn authorize(expected: &Address, authority: &Authority) -> Result<()> {
    let acting_as = authority.acting_as()?;
    if acting_as != *expected {
        debug!(expected = %expected, acting_as = %acting_as, "authority rejected");
        return Err(KernelError::Unauthorized);
    }
    debug!(authority = %expected, "authority accepted");
    Ok(())
}
