//! Book container: two side-indexed level sequences with routing and lookup.
//!
//! Each side keeps its levels in a bounded sequence sorted **worst to
//! best** (asks descending, bids ascending), so the best level is always
//! at the back and top-of-book work never shifts the sequence.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::level::{Level, TradeResult};
use crate::order::Order;
use crate::types::{Ask, Bid, Id, Price, Side, Size};

/// Bounded, worst-to-best ordered run of levels for one side.
pub type LevelSeq<S, const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize> =
    SmallVec<[Level<S, SHOWN, MAX_ORDS>; MAX_LEVELS]>;

/// Level-lookup strategy, chosen at book construction.
///
/// Linear scans from the best level toward the worst and wins when
/// activity clusters near the top of book; binary is a plain lower-bound
/// over the sorted sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FindStrategy {
    #[default]
    Linear,
    Binary,
}

/// Why the book refused to store an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The level at the order's price already holds `MAX_ORDS` orders.
    LevelFull,
    /// The book holds `MAX_LEVELS` levels and the order's price is worse
    /// than every one of them.
    BookFull,
}

/// An order handed back to the caller untouched, with the reason.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejected<S: Side> {
    pub order: Order<S>,
    pub reason: RejectReason,
}

mod access {
    use super::{LevelSeq, Lob};
    use crate::types::{Ask, Bid, Side};

    /// Field selection per side. Crate-internal: reachable from outside
    /// only as the sealed supertrait of [`SideLevels`](super::SideLevels).
    pub trait SideAccess<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize>:
        Side
    {
        fn levels(
            book: &Lob<SHOWN, MAX_LEVELS, MAX_ORDS>,
        ) -> &LevelSeq<Self, SHOWN, MAX_LEVELS, MAX_ORDS>;

        fn levels_mut(
            book: &mut Lob<SHOWN, MAX_LEVELS, MAX_ORDS>,
        ) -> &mut LevelSeq<Self, SHOWN, MAX_LEVELS, MAX_ORDS>;
    }

    impl<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize>
        SideAccess<SHOWN, MAX_LEVELS, MAX_ORDS> for Ask
    {
        #[inline]
        fn levels(
            book: &Lob<SHOWN, MAX_LEVELS, MAX_ORDS>,
        ) -> &LevelSeq<Ask, SHOWN, MAX_LEVELS, MAX_ORDS> {
            &book.asks
        }

        #[inline]
        fn levels_mut(
            book: &mut Lob<SHOWN, MAX_LEVELS, MAX_ORDS>,
        ) -> &mut LevelSeq<Ask, SHOWN, MAX_LEVELS, MAX_ORDS> {
            &mut book.asks
        }
    }

    impl<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize>
        SideAccess<SHOWN, MAX_LEVELS, MAX_ORDS> for Bid
    {
        #[inline]
        fn levels(
            book: &Lob<SHOWN, MAX_LEVELS, MAX_ORDS>,
        ) -> &LevelSeq<Bid, SHOWN, MAX_LEVELS, MAX_ORDS> {
            &book.bids
        }

        #[inline]
        fn levels_mut(
            book: &mut Lob<SHOWN, MAX_LEVELS, MAX_ORDS>,
        ) -> &mut LevelSeq<Bid, SHOWN, MAX_LEVELS, MAX_ORDS> {
            &mut book.bids
        }
    }
}

/// Side selector accepted by every per-side book operation.
///
/// Implemented by [`Bid`] and [`Ask`] only; each call site monomorphises
/// to a direct field access.
pub trait SideLevels<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize>:
    access::SideAccess<SHOWN, MAX_LEVELS, MAX_ORDS>
{
}

impl<T, const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize>
    SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS> for T
where
    T: access::SideAccess<SHOWN, MAX_LEVELS, MAX_ORDS>,
{
}

/// A limit order book seen from one participant's perspective.
///
/// Holds at most `MAX_LEVELS` levels per side; a new level that improves
/// on the worst displaces it. All per-side operations are symmetric and
/// take the side marker as a type parameter.
pub struct Lob<const SHOWN: bool = true, const MAX_LEVELS: usize = 20, const MAX_ORDS: usize = 6> {
    /// Ask levels, worst (highest) to best (lowest).
    asks: LevelSeq<Ask, SHOWN, MAX_LEVELS, MAX_ORDS>,
    /// Bid levels, worst (lowest) to best (highest).
    bids: LevelSeq<Bid, SHOWN, MAX_LEVELS, MAX_ORDS>,
    strategy: FindStrategy,
}

impl<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize>
    Lob<SHOWN, MAX_LEVELS, MAX_ORDS>
{
    /// Create an empty book with linear level lookup.
    pub fn new() -> Self {
        Self::with_strategy(FindStrategy::Linear)
    }

    /// Create an empty book with the given lookup strategy.
    pub fn with_strategy(strategy: FindStrategy) -> Self {
        Self {
            asks: SmallVec::new(),
            bids: SmallVec::new(),
            strategy,
        }
    }

    #[inline]
    pub(crate) fn seq<S>(&self) -> &LevelSeq<S, SHOWN, MAX_LEVELS, MAX_ORDS>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        S::levels(self)
    }

    #[inline]
    pub(crate) fn seq_mut<S>(&mut self) -> &mut LevelSeq<S, SHOWN, MAX_LEVELS, MAX_ORDS>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        S::levels_mut(self)
    }

    // ========================================================================
    // Level lookup
    // ========================================================================

    /// Index of the level at `price`, by the configured strategy.
    fn level_index<S>(&self, price: Price) -> Option<usize>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let levels = self.seq::<S>();
        match self.strategy {
            FindStrategy::Linear => levels.iter().rposition(|lvl| lvl.price() == price),
            FindStrategy::Binary => levels
                .binary_search_by(|lvl| {
                    if lvl.price() == price {
                        Ordering::Equal
                    } else if S::better(price, lvl.price()) {
                        // lvl is worse than the target, so it sorts earlier
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    }
                })
                .ok(),
        }
    }

    /// The level resting at `price`, if any.
    pub fn find_level<S>(&self, price: Price) -> Option<&Level<S, SHOWN, MAX_ORDS>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.level_index::<S>(price).map(|at| &self.seq::<S>()[at])
    }

    /// Mutable access to the level resting at `price`, if any.
    pub fn find_level_mut<S>(&mut self, price: Price) -> Option<&mut Level<S, SHOWN, MAX_ORDS>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let at = self.level_index::<S>(price)?;
        Some(&mut self.seq_mut::<S>()[at])
    }

    /// Position at which a level at `price` keeps the worst-to-best order.
    fn insert_index<S>(&self, price: Price) -> usize
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        // Everything strictly worse than `price` stays in front of it.
        self.seq::<S>()
            .partition_point(|lvl| S::better(price, lvl.price()))
    }

    /// The level at `price`, created in sorted position when missing.
    ///
    /// Returns `None` when the book is full and `price` is worse than
    /// every resting level.
    fn level_at_mut<S>(&mut self, price: Price) -> Option<&mut Level<S, SHOWN, MAX_ORDS>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        if let Some(at) = self.level_index::<S>(price) {
            return Some(&mut self.seq_mut::<S>()[at]);
        }

        let mut at = self.insert_index::<S>(price);
        let levels = self.seq_mut::<S>();
        if levels.len() == MAX_LEVELS {
            if at == 0 {
                // The newcomer would itself be the worst level.
                return None;
            }
            levels.remove(0);
            at -= 1;
        }
        levels.insert(at, Level::new(price));
        Some(&mut levels[at])
    }

    // ========================================================================
    // Order management
    // ========================================================================

    /// Rest `order` at its price, creating the level when needed.
    ///
    /// # Errors
    ///
    /// On overflow the order comes back untouched with the reason; the
    /// book is unchanged except for a possibly displaced worst level.
    pub fn add_order<S>(&mut self, order: Order<S>) -> Result<(), Rejected<S>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let price = order.price;
        let Some(level) = self.level_at_mut::<S>(price) else {
            return Err(Rejected {
                order,
                reason: RejectReason::BookFull,
            });
        };
        level.add_order(order).map_err(|order| Rejected {
            order,
            reason: RejectReason::LevelFull,
        })
    }

    /// Route externally observed anonymous liquidity to a level, creating
    /// it when needed. Returns false when the book is full and `price` is
    /// worse than every resting level.
    pub fn add_liquidity<S>(&mut self, price: Price, delta: Size) -> bool
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        match self.level_at_mut::<S>(price) {
            Some(level) => {
                level.add_liquidity(delta);
                true
            }
            None => false,
        }
    }

    /// The resting order with `id` anywhere on side `S`, scanning best to
    /// worst.
    pub fn find_id<S>(&self, id: Id) -> Option<&Order<S>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.seq::<S>().iter().rev().find_map(|lvl| lvl.find_id(id))
    }

    /// Cancel by id at a known price. O(`MAX_ORDS`) after the level lookup.
    pub fn cancel_id_at<S>(&mut self, price: Price, id: Id) -> Option<Order<S>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let at = self.level_index::<S>(price)?;
        let levels = self.seq_mut::<S>();
        let order = levels[at].cancel_id(id)?;
        if levels[at].is_empty() {
            levels.remove(at);
        }
        Some(order)
    }

    /// Cancel by id anywhere on side `S`, scanning best to worst.
    pub fn cancel_id<S>(&mut self, id: Id) -> Option<Order<S>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let levels = self.seq_mut::<S>();
        for at in (0..levels.len()).rev() {
            if let Some(order) = levels[at].cancel_id(id) {
                if levels[at].is_empty() {
                    levels.remove(at);
                }
                return Some(order);
            }
        }
        None
    }

    /// Pull every one of our orders off side `S`, best level first.
    ///
    /// Levels that carried only our orders leave the book; levels with
    /// anonymous liquidity stay.
    pub fn cancel_all<S>(&mut self) -> Vec<Order<S>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let levels = self.seq_mut::<S>();
        let mut pulled = Vec::new();
        for at in (0..levels.len()).rev() {
            pulled.extend(levels[at].cancel_all());
        }
        levels.retain(|lvl| !lvl.is_empty());
        pulled
    }

    // ========================================================================
    // Fill procedures, routed per level
    // ========================================================================

    /// Apply an external print of `traded` units at `price`.
    ///
    /// Returns `None` when no level rests there. An emptied level leaves
    /// the book.
    pub fn reduce_front<S>(&mut self, price: Price, traded: Size) -> Option<TradeResult<S, MAX_ORDS>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let at = self.level_index::<S>(price)?;
        let levels = self.seq_mut::<S>();
        let result = levels[at].reduce_front(traded);
        if levels[at].is_empty() {
            levels.remove(at);
        }
        Some(result)
    }

    /// Aggress side `S` from the best level down until `target` units of
    /// our own orders are lifted, or the side runs dry.
    ///
    /// Per-level results compose into one: lifted orders stay in FIFO
    /// order within each level, best level first, and market volume sums.
    pub fn walk_until_lifted<S>(&mut self, target: Size) -> TradeResult<S, MAX_ORDS>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let mut out = TradeResult::default();
        let mut remaining = target;

        while remaining > 0 {
            let result = {
                let levels = self.seq_mut::<S>();
                let Some(best) = levels.last_mut() else { break };
                best.walk_until_lifted(remaining)
            };
            remaining -= result.our_volume();
            out.market_volume += result.market_volume;
            out.our_lifted.extend(result.our_lifted);

            let levels = self.seq_mut::<S>();
            if levels.last().is_some_and(|lvl| lvl.is_empty()) {
                levels.pop();
            } else {
                // Target reached inside a still-live level.
                break;
            }
        }
        out
    }

    // ========================================================================
    // Top-of-book access
    // ========================================================================

    /// Levels resting on side `S`, worst to best.
    #[inline]
    pub fn levels<S>(&self) -> &[Level<S, SHOWN, MAX_ORDS>]
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.seq::<S>()
    }

    /// Best (most aggressive) resting level on side `S`.
    #[inline]
    pub fn best<S>(&self) -> Option<&Level<S, SHOWN, MAX_ORDS>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.seq::<S>().last()
    }

    /// Worst resting level on side `S`.
    #[inline]
    pub fn worst<S>(&self) -> Option<&Level<S, SHOWN, MAX_ORDS>>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.seq::<S>().first()
    }

    /// Get the best bid price (highest buy price)
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.last().map(|lvl| lvl.price())
    }

    /// Get the best ask price (lowest sell price)
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.last().map(|lvl| lvl.price())
    }

    /// Calculate spread (best_ask - best_bid)
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask > bid => Some(ask - bid),
            _ => None,
        }
    }

    /// True when the best bid meets or passes the best ask. A book at
    /// rest never crosses; routing resolves any cross before returning.
    pub fn is_crossed(&self) -> bool {
        matches!(
            (self.best_bid(), self.best_ask()),
            (Some(bid), Some(ask)) if bid >= ask
        )
    }

    /// Number of levels resting on side `S`.
    pub fn level_count<S>(&self) -> usize
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.seq::<S>().len()
    }

    /// Number of our orders resting on side `S`.
    pub fn order_count<S>(&self) -> usize
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.seq::<S>().iter().map(|lvl| lvl.order_count()).sum()
    }

    /// True when neither side holds a level.
    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }
}

impl<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize> Default
    for Lob<SHOWN, MAX_LEVELS, MAX_ORDS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize> std::fmt::Debug
    for Lob<SHOWN, MAX_LEVELS, MAX_ORDS>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lob")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("strategy", &self.strategy)
            .finish()
    }
}
