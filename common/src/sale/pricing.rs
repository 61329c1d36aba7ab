// Two-tier unit pricing.
//
// Tokens are priced at `rate_soft` until cumulative sales reach `soft_cap`,
// then at `rate`. A single purchase that crosses the boundary is split: the
// first `remaining_soft / rate_soft` units of payment buy exactly the
// remaining soft-tier tokens, the rest of the payment is priced at `rate`.

use crate::amount::Amount;

/// Tokens not yet sold at the discounted rate
pub fn remaining_soft_tokens(tokens_sold: Amount, soft_cap: Amount) -> Amount {
    soft_cap.saturating_sub(tokens_sold)
}

/// Token amount for `payment` given the sale's current `tokens_sold`.
///
/// Returns None on arithmetic overflow or when either rate is zero.
pub fn tiered_token_amount(
    payment: Amount,
    tokens_sold: Amount,
    soft_cap: Amount,
    rate_soft: Amount,
    rate: Amount,
) -> Option<Amount> {
    if rate_soft.is_zero() || rate.is_zero() {
        return None;
    }

    let remaining_soft = remaining_soft_tokens(tokens_sold, soft_cap);
    let soft_tokens = payment.checked_mul(rate_soft)?;
    if soft_tokens <= remaining_soft {
        return Some(soft_tokens);
    }

    // soft_tokens > remaining_soft >= remaining_soft_payment * rate_soft,
    // so payment > remaining_soft_payment
    let remaining_soft_payment = remaining_soft.checked_div(rate_soft)?;
    let normal_payment = payment.checked_sub(remaining_soft_payment)?;
    let normal_tokens = normal_payment.checked_mul(rate)?;
    remaining_soft.checked_add(normal_tokens)
}
