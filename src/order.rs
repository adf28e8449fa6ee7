//! Resting-order record: a 32-byte hot struct plus a heap-owned cold record.
//!
//! The hot fields are everything the queue-walk loops touch; two orders fit
//! per cache line. The cold record holds context that is only read when an
//! order fills or is reported back, behind a single owning `Box`.

use std::marker::PhantomData;

use crate::types::{sat_sub, Id, Offset, Price, Queue, Side, SideId, Size, Time, NULL_ID};

/// Cold-path order context.
///
/// Allocated exactly once per order life and owned by its order; cloning an
/// order duplicates it, so two orders never alias a cold record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderInfo {
    /// Quantity the order was entered with.
    pub original_size: Size,
    /// Shown volume that was ahead of the order when it joined its level.
    pub original_queue: Queue,
    /// Position-effect tag, carried through unchanged.
    pub offset: Offset,
    /// Feed tick at which the order was created.
    pub time: Time,
}

/// A single resting order on side `S`.
///
/// # Memory Layout
///
/// | Field     | Type           | Offset | Size |
/// |-----------|----------------|--------|------|
/// | price     | i32            | 0      | 4    |
/// | size      | i32            | 4      | 4    |
/// | queue     | i32            | 8      | 4    |
/// | id        | u32            | 12     | 4    |
/// | cold      | Box<OrderInfo> | 16     | 8    |
/// | (padding) | -              | 24     | 8    |
/// | **Total** |                |        | 32   |
///
/// Identity is the `id` field alone: two records with the same id are the
/// same logical order at different lifecycle stages.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
#[repr(C, align(32))]
pub struct Order<S: Side> {
    /// Tick-indexed limit price (0 for market-style orders).
    pub price: Price,
    /// Remaining quantity. Never exceeds `original_size`.
    pub size: Size,
    /// Shown volume still ahead of this order at its level.
    pub queue: Queue,
    /// Unique order id; never zero for an order stored in a level.
    pub id: Id,
    /// Owning handle to the cold record. Never null while the order is live.
    pub cold: Box<OrderInfo>,
    side: PhantomData<S>,
}

// Two orders per cache line; the queue-walk loops depend on it.
const _: () = assert!(
    std::mem::size_of::<Order<crate::types::Bid>>() == 32,
    "Order must be exactly 32 bytes"
);

impl<S: Side> Order<S> {
    /// Create a limit-style order.
    ///
    /// `queue` starts at zero; the level assigns the real queue position
    /// when the order is inserted.
    pub fn limit(price: Price, size: Size, id: Id, time: Time, offset: Offset) -> Self {
        debug_assert!(id != NULL_ID, "order id 0 is reserved");
        Self {
            price,
            size,
            queue: 0,
            id,
            cold: Box::new(OrderInfo {
                original_size: size,
                original_queue: 0,
                offset,
                time,
            }),
            side: PhantomData,
        }
    }

    /// Create a market-style order: identical to [`Order::limit`] with no price.
    pub fn market(size: Size, id: Id, time: Time, offset: Offset) -> Self {
        Self::limit(0, size, id, time, offset)
    }

    /// Rebuild an order at a known queue position, e.g. when re-seeding a
    /// book from a snapshot.
    pub fn with_queue(
        price: Price,
        size: Size,
        queue: Queue,
        id: Id,
        time: Time,
        offset: Offset,
    ) -> Self {
        let mut order = Self::limit(price, size, id, time, offset);
        order.queue = queue;
        order.cold.original_queue = queue;
        order
    }

    /// The side this order rests on.
    #[inline]
    pub fn side(&self) -> SideId {
        S::ID
    }

    /// Quantity the order was entered with.
    #[inline]
    pub fn original_size(&self) -> Size {
        self.cold.original_size
    }

    /// Shown volume that was ahead of the order when it joined its level.
    #[inline]
    pub fn original_queue(&self) -> Queue {
        self.cold.original_queue
    }

    /// Position-effect tag.
    #[inline]
    pub fn offset(&self) -> Offset {
        self.cold.offset
    }

    /// Feed tick at which the order was created.
    #[inline]
    pub fn time(&self) -> Time {
        self.cold.time
    }

    /// Quantity already consumed from the original size.
    #[inline]
    pub fn filled(&self) -> Size {
        sat_sub(self.cold.original_size, self.size)
    }
}

impl<S: Side> PartialEq for Order<S> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S: Side> Eq for Order<S> {}
