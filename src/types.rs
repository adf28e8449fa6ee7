//! Scalar aliases and tag types shared across the book.
//!
//! Sides are zero-sized marker types ([`Bid`], [`Ask`]) so that level and
//! book code monomorphises per side; [`SideId`] is the matching runtime tag.

/// Tick-indexed price. Signed so that price differences are always safe to form.
pub type Price = i32;

/// Order quantity. Non-negative; every subtraction is clamped at zero.
pub type Size = i32;

/// Shown volume ahead of an order at the moment of reference.
pub type Queue = i32;

/// Monotonic tick counter, supplied by the feed.
pub type Time = u32;

/// Unique order identifier.
pub type Id = u32;

/// Reserved id value; no live order may carry it.
pub const NULL_ID: Id = 0;

/// Subtraction clamped at zero, for size and queue arithmetic.
#[inline]
pub const fn sat_sub(lhs: i32, rhs: i32) -> i32 {
    let d = lhs - rhs;
    if d < 0 {
        0
    } else {
        d
    }
}

/// Runtime side tag (bid = buy, ask = sell).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SideId {
    /// Buy side (bids)
    Bid = 0,
    /// Sell side (asks)
    Ask = 1,
}

impl SideId {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            SideId::Bid => SideId::Ask,
            SideId::Ask => SideId::Bid,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Bid {}
    impl Sealed for super::Ask {}
}

/// Compile-time side selector.
///
/// Book and level types take a side marker as a type parameter so that
/// per-side branches fold away inside the inner loops. [`Bid`] and [`Ask`]
/// are the only implementors.
pub trait Side: sealed::Sealed + Copy + Default + std::fmt::Debug + 'static {
    /// The opposite side's marker.
    type Opp: Side;

    /// Runtime tag for this side.
    const ID: SideId;

    /// Returns true when `lhs` is a more aggressive price than `rhs` on
    /// this side (bids: higher, asks: lower).
    fn better(lhs: Price, rhs: Price) -> bool;
}

/// Buy-side marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bid;

/// Sell-side marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ask;

impl Side for Bid {
    type Opp = Ask;
    const ID: SideId = SideId::Bid;

    #[inline]
    fn better(lhs: Price, rhs: Price) -> bool {
        lhs > rhs
    }
}

impl Side for Ask {
    type Opp = Bid;
    const ID: SideId = SideId::Ask;

    #[inline]
    fn better(lhs: Price, rhs: Price) -> bool {
        lhs < rhs
    }
}

/// Order type; determines routing behavior at the book boundary.
///
/// Only `Limit` orders rest. The other variants are consumed by the book's
/// transaction routine and never appear inside a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum OrderType {
    /// Rests in the book if not fully crossed (default)
    #[default]
    Limit = 0,
    /// Fill-and-kill: cross what is possible, drop the remainder
    Fak = 1,
    /// Fill-or-kill: all-or-nothing, touch nothing when short
    Fok = 2,
    /// No price bound; walks the opposite side until filled or dry
    Market = 3,
}

/// Position-effect tag, carried through unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Offset {
    #[default]
    Open = 0,
    CloseToday = 1,
    CloseYesterday = 2,
}
