//! Contract-offer validation and the accept/reject decision.

use crate::ErrorCode;
use crate::types::{ContractOffer, OfferState};

/// Maximum message length in characters.
pub const MAX_OFFER_MESSAGE_CHARS: usize = 2000;

/// Percentages must both be positive and add up to 100.
///
/// # Errors
///
/// [`ErrorCode::InvalidContractOfferProfitRate`] otherwise.
pub const fn validate_profit_rates(author_profit: i32, offer_profit: i32) -> Result<(), ErrorCode> {
    if author_profit <= 0
        || offer_profit <= 0
        || !matches!(author_profit.checked_add(offer_profit), Some(100))
    {
        return Err(ErrorCode::InvalidContractOfferProfitRate);
    }
    Ok(())
}

/// Advance-payment range codes look like `50~100` (lower ≤ upper) or a
/// single figure such as `0`.
///
/// # Errors
///
/// [`ErrorCode::InvalidContractOffer`] for anything else.
pub fn validate_advance_range(range: &str) -> Result<(), ErrorCode> {
    let parse = |part: &str| part.trim().parse::<u32>().ok();
    let valid = match range.split_once('~') {
        Some((low, high)) => matches!((parse(low), parse(high)), (Some(l), Some(h)) if l <= h),
        None => parse(range).is_some(),
    };
    if valid {
        Ok(())
    } else {
        Err(ErrorCode::InvalidContractOffer)
    }
}

/// Full validation of an offer request.
///
/// # Errors
///
/// See [`validate_profit_rates`] and [`validate_advance_range`]; an empty or
/// oversized message is [`ErrorCode::InvalidContractOffer`].
pub fn validate_offer(
    author_profit: i32,
    offer_profit: i32,
    advance_range: &str,
    message: &str,
) -> Result<(), ErrorCode> {
    validate_profit_rates(author_profit, offer_profit)?;
    validate_advance_range(advance_range)?;
    let chars = message.trim().chars().count();
    if chars == 0 || chars > MAX_OFFER_MESSAGE_CHARS {
        return Err(ErrorCode::InvalidContractOffer);
    }
    Ok(())
}

/// Answer a pending offer; returns the new `author_accept_yn`.
///
/// # Errors
///
/// [`ErrorCode::ContractOfferNotPending`] when already answered.
pub const fn decide(offer: &ContractOffer, accept: bool) -> Result<bool, ErrorCode> {
    match offer.state() {
        OfferState::Pending => Ok(accept),
        OfferState::Accepted | OfferState::Rejected => Err(ErrorCode::ContractOfferNotPending),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_must_sum_to_one_hundred() {
        assert_eq!(
            validate_profit_rates(70, 40),
            Err(ErrorCode::InvalidContractOfferProfitRate)
        );
        assert_eq!(
            validate_profit_rates(100, 0),
            Err(ErrorCode::InvalidContractOfferProfitRate)
        );
        assert_eq!(validate_profit_rates(70, 30), Ok(()));
    }

    #[test]
    fn oversized_rates_are_rejected_not_overflowed() {
        assert_eq!(
            validate_profit_rates(1, i32::MAX),
            Err(ErrorCode::InvalidContractOfferProfitRate)
        );
        assert_eq!(
            validate_profit_rates(i32::MAX, i32::MAX),
            Err(ErrorCode::InvalidContractOfferProfitRate)
        );
    }

    #[test]
    fn advance_ranges() {
        assert!(validate_advance_range("50~100").is_ok());
        assert!(validate_advance_range("0").is_ok());
        assert!(validate_advance_range("100~50").is_err());
        assert!(validate_advance_range("lots").is_err());
        assert!(validate_advance_range("").is_err());
    }

    #[test]
    fn message_is_required() {
        assert!(validate_offer(70, 30, "50~100", "hi").is_ok());
        assert_eq!(
            validate_offer(70, 30, "50~100", "   "),
            Err(ErrorCode::InvalidContractOffer)
        );
    }
}
