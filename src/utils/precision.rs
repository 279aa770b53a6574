// src/utils/precision.rs
use crate::types::Side;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Rounds a price to the NEAREST multiple of tick_size.
/// Example: price=100.16, tick=0.1 -> 100.2
pub fn normalize_price(price: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size.is_zero() {
        return price;
    }
    (price / tick_size).round() * tick_size
}

/// Aggressive limit price so the order crosses the book like a taker:
/// buys above the reference, sells below it, rounded to the pair tick.
pub fn limit_price(
    reference: f64,
    side: Side,
    slippage_pct: Decimal,
    tick_size: Decimal,
) -> Option<Decimal> {
    let reference = Decimal::from_f64(reference)?;
    let slippage = slippage_pct / Decimal::ONE_HUNDRED;
    let raw = match side {
        Side::Buy => reference * (Decimal::ONE + slippage),
        Side::Sell => reference * (Decimal::ONE - slippage),
    };
    Some(normalize_price(raw, tick_size).normalize())
}
