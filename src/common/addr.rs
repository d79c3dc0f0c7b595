//! Physical Address Decoding.
//!
//! This module maps flat byte addresses onto DRAM coordinates. Addresses are
//! decoded burst-granular: the low bits select the byte within a burst, then
//! column, bank, rank, and finally row, so that sequential traffic walks
//! columns within an open row before touching another bank.

/// A byte address decoded into DRAM coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodedAddr {
    pub rank: usize,
    pub bank: usize,
    pub row: u64,
    pub column: u64,
}

/// Decodes flat byte addresses into rank/bank/row/column coordinates.
///
/// Built once per subsystem from the memory specification geometry.
#[derive(Clone, Debug)]
pub struct AddressMapper {
    burst_bytes: u64,
    column_bursts: u64,
    banks: u64,
    ranks: u64,
}

impl AddressMapper {
    /// Creates a mapper for the given geometry.
    ///
    /// # Arguments
    ///
    /// * `burst_bytes` - Bytes transferred by one full burst.
    /// * `column_bursts` - Number of bursts in one row (columns / burst length).
    /// * `banks` - Banks per rank.
    /// * `ranks` - Ranks on the channel.
    pub fn new(burst_bytes: u64, column_bursts: u64, banks: u64, ranks: u64) -> Self {
        Self {
            burst_bytes: burst_bytes.max(1),
            column_bursts: column_bursts.max(1),
            banks: banks.max(1),
            ranks: ranks.max(1),
        }
    }

    /// Decodes a byte address into DRAM coordinates.
    pub fn decode(&self, addr: u64) -> DecodedAddr {
        let mut rest = addr / self.burst_bytes;

        let column = rest % self.column_bursts;
        rest /= self.column_bursts;

        let bank = (rest % self.banks) as usize;
        rest /= self.banks;

        let rank = (rest % self.ranks) as usize;
        rest /= self.ranks;

        DecodedAddr {
            rank,
            bank,
            row: rest,
            column,
        }
    }

    /// Byte distance between addresses one row apart, all other coordinates
    /// equal. Used by the row hammer initiator to step rows directly.
    pub fn row_stride_bytes(&self) -> u64 {
        self.burst_bytes * self.column_bursts * self.banks * self.ranks
    }
}
