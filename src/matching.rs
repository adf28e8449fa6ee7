//! Transaction routing: our own aggression expressed against the book.
//!
//! Implements the cross/rest procedure over [`Lob`]:
//! 1. CROSSING: consume displayed liquidity on the opposite side, best
//!    level first, while the price crosses
//! 2. RESTING: a limit order's remainder joins our side of the book
//!
//! From the book's perspective our aggression is a print, so each crossed
//! level is consumed through its `reduce_front` procedure; any of our own
//! orders resting on the opposite side that the sweep reaches come back in
//! the result.

use smallvec::SmallVec;

use crate::lob::{Lob, SideLevels};
use crate::order::Order;
use crate::types::{OrderType, Price, Side, Size};

/// Outcome of a [`Lob::transaction`].
#[derive(Clone, Debug, Default)]
pub struct Execution<S: Side, const MAX_ORDS: usize> {
    /// Our own orders that were resting on the opposite side and were
    /// lifted by the sweep, best level first, FIFO within each level.
    pub our_lifted: SmallVec<[Order<S::Opp>; MAX_ORDS]>,
    /// Total displayed volume consumed across levels.
    pub traded_volume: Size,
    /// Quantity that could not be crossed.
    pub remaining: Size,
    /// True when the remainder rested in the book (limit orders only).
    pub rested: bool,
}

/// True when an aggressing order at `order_price` on side `S` trades with
/// a resting opposite level at `level_price` (equal prices cross).
#[inline]
fn crosses<S: Side>(order_price: Price, level_price: Price) -> bool {
    !S::better(level_price, order_price)
}

impl<const SHOWN: bool, const MAX_LEVELS: usize, const MAX_ORDS: usize>
    Lob<SHOWN, MAX_LEVELS, MAX_ORDS>
{
    /// Displayed volume on the opposite side that `order` can cross.
    fn crossable_volume<S>(&self, order: &Order<S>, kind: OrderType) -> Size
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
        S::Opp: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        self.seq::<S::Opp>()
            .iter()
            .rev()
            .take_while(|lvl| kind == OrderType::Market || crosses::<S>(order.price, lvl.price()))
            .map(|lvl| lvl.size())
            .sum()
    }

    /// Execute our order against the book.
    ///
    /// Crossing consumes displayed opposite-side liquidity best-first; the
    /// price bound is ignored for `Market`. `Limit` rests any remainder on
    /// our side, `Fak` drops it, `Fok` executes in full or leaves the book
    /// untouched. The book is never left crossed.
    ///
    /// A remainder that cannot rest (book or level full) is reported via
    /// `remaining` with `rested == false`.
    pub fn transaction<S>(&mut self, order: Order<S>, kind: OrderType) -> Execution<S, MAX_ORDS>
    where
        S: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
        S::Opp: SideLevels<SHOWN, MAX_LEVELS, MAX_ORDS>,
    {
        let mut exec = Execution::default();
        let mut remaining = order.size;

        if kind == OrderType::Fok && self.crossable_volume(&order, kind) < order.size {
            // All-or-nothing and short of liquidity: touch nothing.
            exec.remaining = remaining;
            return exec;
        }

        while remaining > 0 {
            let Some(best) = self.seq::<S::Opp>().last() else {
                break;
            };
            if kind != OrderType::Market && !crosses::<S>(order.price, best.price()) {
                break;
            }
            let take = remaining.min(best.size());
            if take == 0 {
                // Nothing displayed to consume at the top of book.
                break;
            }

            let result = {
                let levels = self.seq_mut::<S::Opp>();
                let at = levels.len() - 1;
                let result = levels[at].reduce_front(take);
                if levels[at].is_empty() {
                    levels.remove(at);
                }
                result
            };
            remaining -= result.market_volume;
            exec.traded_volume += result.market_volume;
            exec.our_lifted.extend(result.our_lifted);
        }

        exec.remaining = remaining;
        if remaining > 0 && kind == OrderType::Limit {
            let mut rest = order;
            rest.size = remaining;
            exec.rested = self.add_order(rest).is_ok();
        }
        exec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ask, Bid, Id, Offset};

    type Book = Lob<true, 8, 6>;

    fn ord<S: Side>(price: Price, size: Size, id: Id) -> Order<S> {
        Order::limit(price, size, id, 0, Offset::Open)
    }

    /// Asks at (price, anonymous size) with no orders of ours resting.
    fn seed_asks(book: &mut Book, levels: &[(Price, Size)]) {
        for &(price, size) in levels {
            assert!(book.add_liquidity::<Ask>(price, size));
        }
    }

    #[test]
    fn test_limit_rests_when_nothing_crosses() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(102, 10)]);

        let exec = book.transaction(ord::<Bid>(100, 5, 1), OrderType::Limit);

        assert_eq!(exec.traded_volume, 0);
        assert_eq!(exec.remaining, 5);
        assert!(exec.rested);
        assert_eq!(book.best_bid(), Some(100));
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_limit_crosses_then_rests_remainder() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(102, 4), (101, 6)]);

        let exec = book.transaction(ord::<Bid>(102, 15, 1), OrderType::Limit);

        // Consumes 101 fully, then 102 fully, rests 5 at 102
        assert_eq!(exec.traded_volume, 10);
        assert_eq!(exec.remaining, 5);
        assert!(exec.rested);
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.best_bid(), Some(102));
        assert_eq!(book.find_level::<Bid>(102).unwrap().size(), 5);
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_limit_respects_price_bound() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(103, 5), (101, 5)]);

        let exec = book.transaction(ord::<Bid>(101, 8, 1), OrderType::Limit);

        // 101 crosses, 103 does not
        assert_eq!(exec.traded_volume, 5);
        assert_eq!(exec.remaining, 3);
        assert!(exec.rested);
        assert_eq!(book.best_ask(), Some(103));
    }

    #[test]
    fn test_partial_level_consumption() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(101, 10)]);

        let exec = book.transaction(ord::<Bid>(101, 4, 1), OrderType::Limit);

        assert_eq!(exec.traded_volume, 4);
        assert_eq!(exec.remaining, 0);
        assert!(!exec.rested);
        assert_eq!(book.find_level::<Ask>(101).unwrap().size(), 6);
    }

    #[test]
    fn test_sweep_lifts_our_resting_orders() {
        let mut book = Book::new();
        book.add_liquidity::<Ask>(101, 3);
        book.add_order(ord::<Ask>(101, 4, 9)).unwrap();

        let exec = book.transaction(ord::<Bid>(101, 7, 1), OrderType::Fak);

        // The sweep trades through the 3 anonymous ahead, then our 4
        assert_eq!(exec.traded_volume, 7);
        let lifted: Vec<(Id, Size)> = exec.our_lifted.iter().map(|o| (o.id, o.size)).collect();
        assert_eq!(lifted, vec![(9, 4)]);
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn test_fak_drops_remainder() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(101, 4)]);

        let exec = book.transaction(ord::<Bid>(102, 10, 1), OrderType::Fak);

        assert_eq!(exec.traded_volume, 4);
        assert_eq!(exec.remaining, 6);
        assert!(!exec.rested);
        assert_eq!(book.best_bid(), None);
    }

    #[test]
    fn test_fok_short_touches_nothing() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(101, 4), (102, 3)]);

        let exec = book.transaction(ord::<Bid>(102, 10, 1), OrderType::Fok);

        assert_eq!(exec.traded_volume, 0);
        assert_eq!(exec.remaining, 10);
        assert_eq!(book.find_level::<Ask>(101).unwrap().size(), 4);
        assert_eq!(book.find_level::<Ask>(102).unwrap().size(), 3);
    }

    #[test]
    fn test_fok_fills_exactly_when_possible() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(101, 4), (102, 3)]);

        let exec = book.transaction(ord::<Bid>(102, 7, 1), OrderType::Fok);

        assert_eq!(exec.traded_volume, 7);
        assert_eq!(exec.remaining, 0);
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn test_market_ignores_price_bound() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(105, 4), (101, 4)]);

        let exec = book.transaction(
            Order::<Bid>::market(6, 1, 0, Offset::Open),
            OrderType::Market,
        );

        assert_eq!(exec.traded_volume, 6);
        assert_eq!(exec.remaining, 0);
        assert_eq!(book.find_level::<Ask>(105).unwrap().size(), 2);
    }

    #[test]
    fn test_market_reports_unfilled_remainder() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(101, 4)]);

        let exec = book.transaction(
            Order::<Bid>::market(10, 1, 0, Offset::Open),
            OrderType::Market,
        );

        assert_eq!(exec.traded_volume, 4);
        assert_eq!(exec.remaining, 6);
        assert!(!exec.rested);
        assert!(book.is_empty());
    }

    #[test]
    fn test_rested_remainder_keeps_entered_size() {
        let mut book = Book::new();
        seed_asks(&mut book, &[(101, 4)]);

        book.transaction(ord::<Bid>(101, 10, 1), OrderType::Limit);

        let resting = book.find_id::<Bid>(1).unwrap();
        assert_eq!(resting.size, 6);
        assert_eq!(resting.original_size(), 10);
    }

    #[test]
    fn test_ask_aggression_is_symmetric() {
        let mut book = Book::new();
        assert!(book.add_liquidity::<Bid>(99, 5));
        book.add_order(ord::<Bid>(99, 2, 7)).unwrap();

        let exec = book.transaction(ord::<Ask>(99, 7, 1), OrderType::Fak);

        assert_eq!(exec.traded_volume, 7);
        let lifted: Vec<(Id, Size)> = exec.our_lifted.iter().map(|o| (o.id, o.size)).collect();
        assert_eq!(lifted, vec![(7, 2)]);
    }
}
