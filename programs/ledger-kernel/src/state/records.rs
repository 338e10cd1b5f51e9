// Record kinds and their persisted layout
//
// Records form a closed set of tagged variants, one per program kind. The
// stored blob is an 8-byte kind discriminant followed by the borsh encoding of
// the kind's fields in a fixed order: authority first, then the payload, then
// any back-pointer or sequence. Dispatch always goes through the discriminant,
// never through the shape of the bytes.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::errors::{KernelError, Result};

/// Length of the leading kind discriminant
pub const DISCRIMINATOR_LEN: usize = 8;

/// Byte offset of the authority field inside every stored record
pub const AUTHORITY_OFFSET: usize = DISCRIMINATOR_LEN;

// ================================
// Record Kind
// ================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Counter,
    Blog,
    Post,
    Puppet,
    Master,
    Mint,
    TokenAccount,
}

impl RecordKind {
    pub const ALL: [RecordKind; 7] = [
        RecordKind::Counter,
        RecordKind::Blog,
        RecordKind::Post,
        RecordKind::Puppet,
        RecordKind::Master,
        RecordKind::Mint,
        RecordKind::TokenAccount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Counter => "Counter",
            RecordKind::Blog => "Blog",
            RecordKind::Post => "Post",
            RecordKind::Puppet => "Puppet",
            RecordKind::Master => "Master",
            RecordKind::Mint => "Mint",
            RecordKind::TokenAccount => "TokenAccount",
        }
    }

    /// First 8 bytes of `SHA-256("account:<Name>")`
    pub fn discriminator(self) -> [u8; DISCRIMINATOR_LEN] {
        let hash = Sha256::digest(format!("account:{}", self.name()).as_bytes());
        let mut discriminator = [0u8; DISCRIMINATOR_LEN];
        discriminator.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
        discriminator
    }

    pub fn from_discriminator(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.discriminator().as_slice() == bytes)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ================================
// Post Keying
// ================================

/// How a blog derives the address of its next post
///
/// `Title` keys posts by `(owner, title[..32])` and rejects duplicate titles.
/// `Sequence` keys posts by `(blog, post_count)` and never collides, but the
/// caller must know the current count to supply the right address.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PostKeying {
    #[default]
    Sequence,
    Title,
}

// ================================
// Record Payloads
// ================================

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Counter {
    pub authority: Address,
    pub data: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Blog {
    pub authority: Address,
    /// Fixed at creation so posts are never keyed two ways
    pub keying: PostKeying,
    /// Head of the post chain, `Address::NONE` while empty
    pub latest: Address,
    pub post_count: u64,
}

impl Blog {
    pub fn latest_post(&self) -> Option<Address> {
        (!self.latest.is_none()).then_some(self.latest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Post {
    pub authority: Address,
    pub blog: Address,
    pub title: String,
    pub content: String,
    pub timestamp: i64,
    /// Previous chain head, `Address::NONE` for the first post
    pub previous: Address,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Puppet {
    pub authority: Address,
    pub data: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Master {
    pub authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Mint {
    pub mint_authority: Address,
    pub supply: u64,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TokenAccount {
    pub owner: Address,
    pub mint: Address,
    pub amount: u64,
}

// ================================
// Tagged Record
// ================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Counter(Counter),
    Blog(Blog),
    Post(Post),
    Puppet(Puppet),
    Master(Master),
    Mint(Mint),
    TokenAccount(TokenAccount),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Counter(_) => RecordKind::Counter,
            Record::Blog(_) => RecordKind::Blog,
            Record::Post(_) => RecordKind::Post,
            Record::Puppet(_) => RecordKind::Puppet,
            Record::Master(_) => RecordKind::Master,
            Record::Mint(_) => RecordKind::Mint,
            Record::TokenAccount(_) => RecordKind::TokenAccount,
        }
    }

    pub fn authority(&self) -> &Address {
        match self {
            Record::Counter(r) => &r.authority,
            Record::Blog(r) => &r.authority,
            Record::Post(r) => &r.authority,
            Record::Puppet(r) => &r.authority,
            Record::Master(r) => &r.authority,
            Record::Mint(r) => &r.mint_authority,
            Record::TokenAccount(r) => &r.owner,
        }
    }

    /// Discriminant followed by the borsh body
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = self.kind().discriminator().to_vec();
        match self {
            Record::Counter(r) => r.serialize(&mut bytes)?,
            Record::Blog(r) => r.serialize(&mut bytes)?,
            Record::Post(r) => r.serialize(&mut bytes)?,
            Record::Puppet(r) => r.serialize(&mut bytes)?,
            Record::Master(r) => r.serialize(&mut bytes)?,
            Record::Mint(r) => r.serialize(&mut bytes)?,
            Record::TokenAccount(r) => r.serialize(&mut bytes)?,
        }
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Record> {
        if bytes.len() < DISCRIMINATOR_LEN {
            return Err(KernelError::Serialization("record shorter than discriminator".into()));
        }
        let (head, body) = bytes.split_at(DISCRIMINATOR_LEN);
        let kind = RecordKind::from_discriminator(head)
            .ok_or_else(|| KernelError::Serialization("unknown record discriminator".into()))?;

        let record = match kind {
            RecordKind::Counter => Record::Counter(Counter::try_from_slice(body)?),
            RecordKind::Blog => Record::Blog(Blog::try_from_slice(body)?),
            RecordKind::Post => Record::Post(Post::try_from_slice(body)?),
            RecordKind::Puppet => Record::Puppet(Puppet::try_from_slice(body)?),
            RecordKind::Master => Record::Master(Master::try_from_slice(body)?),
            RecordKind::Mint => Record::Mint(Mint::try_from_slice(body)?),
            RecordKind::TokenAccount => Record::TokenAccount(TokenAccount::try_from_slice(body)?),
        };
        Ok(record)
    }
}

// ================================
// Typed Access
// ================================

/// A payload type that maps onto exactly one record variant
pub trait RecordData: Clone + Sized {
    const KIND: RecordKind;

    fn authority(&self) -> &Address;

    fn into_record(self) -> Record;

    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! impl_record_data {
    ($ty:ident, $authority:ident) => {
        impl RecordData for $ty {
            const KIND: RecordKind = RecordKind::$ty;

            fn authority(&self) -> &Address {
                &self.$authority
            }

            fn into_record(self) -> Record {
                Record::$ty(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_record_data!(Counter, authority);
impl_record_data!(Blog, authority);
impl_record_data!(Post, authority);
impl_record_data!(Puppet, authority);
impl_record_data!(Master, authority);
impl_record_data!(Mint, mint_authority);
impl_record_data!(TokenAccount, owner);

// ================================
// Linked History
// ================================

/// The record tracking the tail of an append-only chain
pub trait LinkedHead {
    fn latest(&self) -> Address;

    fn count(&self) -> u64;

    /// Move the head to `address` and bump the count
    fn advance(&mut self, address: Address) -> Result<()>;
}

/// A record appended to a chain
pub trait LinkedEntry {
    fn link(&mut self, previous: Address, sequence: u64);
}

impl LinkedHead for Blog {
    fn latest(&self) -> Address {
        self.latest
    }

    fn count(&self) -> u64 {
        self.post_count
    }

    fn advance(&mut self, address: Address) -> Result<()> {
        self.post_count = self.post_count.checked_add(1).ok_or(KernelError::Overflow)?;
        self.latest = address;
        Ok(())
    }
}

impl LinkedEntry for Post {
    fn link(&mut self, previous: Address, sequence: u64) {
        self.previous = previous;
        self.sequence = sequence;
    }
}
