// Keyed record store with all-or-nothing transactions
//
// The committed store maps each address to one account entry (lamports, owning
// program, record bytes). Instructions never touch it directly: they run inside
// a StoreTransaction, an overlay of copied entries that is folded back into the
// store only when every instruction of the enclosing transaction succeeded.
// Dropping a transaction discards it, so a rejected instruction leaves no
// intermediate state behind.
//
// ACCESS DISCIPLINE: a transaction is opened with the list of accounts its
// instructions declared. Reading an undeclared account or writing one that was
// not declared writable is rejected, which gives whole-record locking without
// any field-level bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use borsh::{BorshDeserialize, BorshSerialize};
use tracing::debug;

use super::records::{LinkedEntry, LinkedHead, Record, RecordData, AUTHORITY_OFFSET};
use crate::address::{Address, ADDRESS_BYTES};
use crate::errors::{KernelError, Result};

// ================================
// Account Entries
// ================================

/// Everything stored at one address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountEntry {
    pub lamports: u64,
    /// Program that created the record; `Address::NONE` for plain identities
    pub owner: Address,
    /// Encoded record, empty when no record lives here
    pub data: Vec<u8>,
}

impl AccountEntry {
    pub fn has_record(&self) -> bool {
        !self.data.is_empty()
    }

    fn authority_bytes(&self) -> Option<&[u8]> {
        self.data.get(AUTHORITY_OFFSET..AUTHORITY_OFFSET + ADDRESS_BYTES)
    }
}

// ================================
// Account Declarations
// ================================

/// An account an instruction intends to touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(address: Address, is_signer: bool) -> Self {
        Self { address, is_signer, is_writable: true }
    }

    pub fn new_readonly(address: Address, is_signer: bool) -> Self {
        Self { address, is_signer, is_writable: false }
    }
}

/// Union of the accounts declared by a transaction's instructions
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    readable: BTreeSet<Address>,
    writable: BTreeSet<Address>,
}

impl AccessList {
    pub fn declare(&mut self, meta: &AccountMeta) {
        if meta.is_writable {
            self.writable.insert(meta.address);
        } else {
            self.readable.insert(meta.address);
        }
    }

    pub fn can_read(&self, address: &Address) -> bool {
        self.readable.contains(address) || self.writable.contains(address)
    }

    pub fn can_write(&self, address: &Address) -> bool {
        self.writable.contains(address)
    }
}

impl FromIterator<AccountMeta> for AccessList {
    fn from_iter<I: IntoIterator<Item = AccountMeta>>(iter: I) -> Self {
        let mut access = Self::default();
        for meta in iter {
            access.declare(&meta);
        }
        access
    }
}

// ================================
// Committed Store
// ================================

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    accounts: BTreeMap<Address, AccountEntry>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, address: &Address) -> Option<&AccountEntry> {
        self.accounts.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entry(address).is_some_and(AccountEntry::has_record)
    }

    pub fn lamports(&self, address: &Address) -> u64 {
        self.entry(address).map_or(0, |entry| entry.lamports)
    }

    pub fn read(&self, address: &Address) -> Result<Record> {
        decode_entry(address, self.entry(address))
    }

    pub fn read_as<T: RecordData>(&self, address: &Address) -> Result<T> {
        downcast(address, self.read(address)?)
    }

    /// Credit lamports from outside the ledger (airdrops, genesis funding)
    pub fn deposit(&mut self, address: &Address, lamports: u64) -> Result<u64> {
        let entry = self.accounts.entry(*address).or_default();
        entry.lamports = entry.lamports.checked_add(lamports).ok_or(KernelError::Overflow)?;
        Ok(entry.lamports)
    }

    /// Create a record in its own single-account transaction
    pub fn create<T: RecordData>(&mut self, owner: &Address, address: &Address, record: T) -> Result<T> {
        let mut tx = self.begin(AccessList::from_iter([AccountMeta::new(*address, false)]));
        let created = tx.create(owner, address, record)?;
        let changes = tx.into_changes();
        self.commit(changes);
        Ok(created)
    }

    /// Mutate a record's payload in its own single-account transaction
    pub fn update<T, F>(&mut self, owner: &Address, address: &Address, mutator: F) -> Result<T>
    where
        T: RecordData,
        F: FnOnce(&mut T) -> Result<()>,
    {
        let mut tx = self.begin(AccessList::from_iter([AccountMeta::new(*address, false)]));
        let updated = tx.update(owner, address, mutator)?;
        let changes = tx.into_changes();
        self.commit(changes);
        Ok(updated)
    }

    /// Records whose stored authority equals `authority`
    ///
    /// Matches on the raw authority bytes before decoding. The iterator is
    /// finite and can be restarted by calling again; order is unspecified.
    pub fn list_by_authority<'a>(
        &'a self,
        authority: &'a Address,
    ) -> impl Iterator<Item = (Address, Record)> + 'a {
        self.accounts
            .iter()
            .filter(move |(_, entry)| entry.authority_bytes() == Some(authority.to_bytes().as_slice()))
            .filter_map(|(address, entry)| {
                Record::decode(&entry.data).ok().map(|record| (*address, record))
            })
    }

    /// Typed variant of [`RecordStore::list_by_authority`]
    pub fn list_by_authority_as<'a, T: RecordData + 'a>(
        &'a self,
        authority: &'a Address,
    ) -> impl Iterator<Item = (Address, T)> + 'a {
        self.list_by_authority(authority)
            .filter_map(|(address, record)| T::from_record(record).map(|typed| (address, typed)))
    }

    pub fn begin(&self, access: AccessList) -> StoreTransaction<'_> {
        StoreTransaction {
            base: self,
            access,
            changes: BTreeMap::new(),
        }
    }

    pub fn commit(&mut self, changes: ChangeSet) {
        debug!(accounts = changes.len(), "committing change set");
        self.accounts.extend(changes.entries);
    }
}

fn decode_entry(address: &Address, entry: Option<&AccountEntry>) -> Result<Record> {
    match entry {
        Some(entry) if entry.has_record() => {
            Record::decode(&entry.data).map_err(|_| KernelError::InvalidRecordData(*address))
        }
        _ => Err(KernelError::NotFound(*address)),
    }
}

fn downcast<T: RecordData>(address: &Address, record: Record) -> Result<T> {
    T::from_record(record).ok_or(KernelError::KindMismatch {
        address: *address,
        expected: T::KIND,
    })
}

// ================================
// Change Set
// ================================

/// Entries written by a finished transaction, ready to commit
#[derive(Debug, Default)]
pub struct ChangeSet {
    entries: BTreeMap<Address, AccountEntry>,
}

impl ChangeSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ================================
// Store Transaction
// ================================

pub struct StoreTransaction<'s> {
    base: &'s RecordStore,
    access: AccessList,
    changes: BTreeMap<Address, AccountEntry>,
}

impl<'s> StoreTransaction<'s> {
    fn load(&self, address: &Address) -> Result<Option<&AccountEntry>> {
        if !self.access.can_read(address) {
            return Err(KernelError::AccountNotDeclared(*address));
        }
        Ok(self.changes.get(address).or_else(|| self.base.entry(address)))
    }

    fn load_mut(&mut self, address: &Address) -> Result<&mut AccountEntry> {
        if !self.access.can_write(address) {
            return Err(KernelError::AccountNotWritable(*address));
        }
        let base = self.base;
        Ok(self
            .changes
            .entry(*address)
            .or_insert_with(|| base.entry(address).cloned().unwrap_or_default()))
    }

    pub fn contains(&self, address: &Address) -> Result<bool> {
        Ok(self.load(address)?.is_some_and(AccountEntry::has_record))
    }

    pub fn lamports(&self, address: &Address) -> Result<u64> {
        Ok(self.load(address)?.map_or(0, |entry| entry.lamports))
    }

    pub fn read(&self, address: &Address) -> Result<Record> {
        decode_entry(address, self.load(address)?)
    }

    pub fn read_as<T: RecordData>(&self, address: &Address) -> Result<T> {
        downcast(address, self.read(address)?)
    }

    /// Insert a new record owned by `owner`; the address must be vacant
    pub fn create<T: RecordData>(&mut self, owner: &Address, address: &Address, record: T) -> Result<T> {
        let data = record.clone().into_record().encode()?;
        let entry = self.load_mut(address)?;
        if entry.has_record() {
            return Err(KernelError::AlreadyExists(*address));
        }
        entry.owner = *owner;
        entry.data = data;
        debug!(address = %address, kind = %T::KIND, "record staged for creation");
        Ok(record)
    }

    /// Apply `mutator` to the payload; the authority must come out unchanged
    pub fn update<T, F>(&mut self, owner: &Address, address: &Address, mutator: F) -> Result<T>
    where
        T: RecordData,
        F: FnOnce(&mut T) -> Result<()>,
    {
        self.write_record(owner, address, mutator, false)
    }

    /// Like `update`, but the mutator may replace the authority
    pub(crate) fn reassign<T, F>(&mut self, owner: &Address, address: &Address, mutator: F) -> Result<T>
    where
        T: RecordData,
        F: FnOnce(&mut T) -> Result<()>,
    {
        self.write_record(owner, address, mutator, true)
    }

    fn write_record<T, F>(
        &mut self,
        owner: &Address,
        address: &Address,
        mutator: F,
        authority_may_change: bool,
    ) -> Result<T>
    where
        T: RecordData,
        F: FnOnce(&mut T) -> Result<()>,
    {
        let stored_owner = match self.load(address)? {
            Some(entry) if entry.has_record() => entry.owner,
            _ => return Err(KernelError::NotFound(*address)),
        };
        let mut record: T = self.read_as(address)?;
        if stored_owner != *owner {
            return Err(KernelError::AccountOwnerMismatch(*address));
        }

        let authority = *record.authority();
        mutator(&mut record)?;
        if !authority_may_change && *record.authority() != authority {
            return Err(KernelError::Unauthorized);
        }

        let data = record.clone().into_record().encode()?;
        self.load_mut(address)?.data = data;
        Ok(record)
    }

    /// Append `entry` at `address` behind the chain head stored at `head`
    ///
    /// The entry's back-pointer and sequence are taken from the head before the
    /// append, and the head then points at the new entry.
    pub fn append_linked<H, E>(
        &mut self,
        owner: &Address,
        head: &Address,
        address: &Address,
        mut entry: E,
    ) -> Result<E>
    where
        H: RecordData + LinkedHead,
        E: RecordData + LinkedEntry,
    {
        let current: H = self.read_as(head)?;
        if self.contains(address)? {
            return Err(KernelError::AlreadyExists(*address));
        }

        entry.link(current.latest(), current.count());
        let created = self.create(owner, address, entry)?;
        self.update::<H, _>(owner, head, |h| h.advance(*address))?;
        Ok(created)
    }

    /// Move lamports between two declared-writable accounts
    pub fn transfer(&mut self, from: &Address, to: &Address, lamports: u64) -> Result<()> {
        let available = self.lamports(from)?;
        if available < lamports {
            return Err(KernelError::InsufficientFunds { requested: lamports, available });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .lamports(to)?
            .checked_add(lamports)
            .ok_or(KernelError::Overflow)?;

        self.load_mut(from)?.lamports = available - lamports;
        self.load_mut(to)?.lamports = credited;
        Ok(())
    }

    pub fn into_changes(self) -> ChangeSet {
        ChangeSet { entries: self.changes }
    }
}
