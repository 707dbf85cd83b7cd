//! Account-related types for the teller ledger
//!
//! This module defines the typed identifiers used throughout the ledger
//! (`AccountNumber`, `BranchId`), the amount type, and the plain balance
//! rows produced by a ledger snapshot.

use super::error::LedgerError;
use std::fmt;
use std::str::FromStr;

/// Signed balance amount in the smallest currency unit
pub type AccountAmount = i64;

/// Branch identifier
///
/// Occupies the high 32 bits of an [`AccountNumber`]. Branch ids are dense:
/// a bank with `n` branches uses ids `0..n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchId(u32);

impl BranchId {
    pub const fn new(id: u32) -> Self {
        BranchId(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Position of this branch in the bank's branch table
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identifier
///
/// A 64-bit value whose high [`AccountNumber::BRANCH_BITS`] bits hold the
/// owning [`BranchId`] and whose low [`AccountNumber::SEQUENCE_BITS`] bits hold
/// a per-branch sequence number. Every `u64` is a valid account number, so
/// decoding is total.
///
/// Account numbers are ordered numerically. Because the branch occupies the
/// high bits, accounts of a lower branch always sort before accounts of a
/// higher branch.
///
/// The textual form is `branch:sequence` (e.g. `2:17`). Parsing also accepts a
/// raw decimal value or a `0x`-prefixed hexadecimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountNumber(u64);

impl AccountNumber {
    pub const SEQUENCE_BITS: u32 = 32;
    pub const BRANCH_BITS: u32 = u64::BITS - Self::SEQUENCE_BITS;
    const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Encode a branch id and a per-branch sequence number
    pub const fn new(branch: BranchId, sequence: u32) -> Self {
        AccountNumber(((branch.0 as u64) << Self::SEQUENCE_BITS) | sequence as u64)
    }

    pub const fn from_raw(raw: u64) -> Self {
        AccountNumber(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Decode the owning branch from the high bits
    pub const fn branch(self) -> BranchId {
        BranchId((self.0 >> Self::SEQUENCE_BITS) as u32)
    }

    /// Decode the per-branch sequence number from the low bits
    pub const fn sequence(self) -> u32 {
        (self.0 & Self::SEQUENCE_MASK) as u32
    }

    /// Whether both accounts decode to the same branch
    pub const fn same_branch(self, other: AccountNumber) -> bool {
        self.branch().0 == other.branch().0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.branch(), self.sequence())
    }
}

impl FromStr for AccountNumber {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || LedgerError::invalid_account_number(s);

        if let Some((branch, sequence)) = trimmed.split_once(':') {
            let branch = branch.trim().parse::<u32>().map_err(|_| invalid())?;
            let sequence = sequence.trim().parse::<u32>().map_err(|_| invalid())?;
            return Ok(AccountNumber::new(BranchId(branch), sequence));
        }

        let raw = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };

        raw.map(AccountNumber).map_err(|_| invalid())
    }
}

/// Account balance as observed in a ledger snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalance {
    pub account: AccountNumber,
    pub balance: AccountAmount,
}

/// Branch aggregate balance as observed in a ledger snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchBalance {
    pub branch: BranchId,
    pub balance: AccountAmount,
}
