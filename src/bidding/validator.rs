/// 입찰 폼 제출 전 검증
/// 서버 검증을 대신하지 않는다. 서버도 같은 규칙(현재가 초과, 최소 입찰가 이상)을 따로 검사해야 한다.
// region:    --- Imports
use super::model::{BidFormReading, BID_FORM_ID};
use crate::dom::Document;
use crate::flash::{FlashManager, Severity};
use crate::format::format_amount;
use indextree::NodeId;
use tracing::{info, warn};

// endregion: --- Imports

pub const NOT_ABOVE_CURRENT_MESSAGE: &str = "Ditt bud måste vara högre än nuvarande bud!";
pub const INVALID_AMOUNT_MESSAGE: &str = "Ange ett giltigt bud";

// region:    --- Verdict
/// 검증 결과
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BidVerdict {
    Accepted,
    InvalidAmount,
    NotAboveCurrent { current_bid: f64 },
    BelowMinimum { min_bid: f64 },
}

impl BidVerdict {
    pub fn allows_submission(&self) -> bool {
        matches!(self, BidVerdict::Accepted)
    }

    /// 사용자에게 보여줄 오류 문구
    pub fn message(&self) -> Option<String> {
        match self {
            BidVerdict::Accepted => None,
            BidVerdict::InvalidAmount => Some(INVALID_AMOUNT_MESSAGE.to_string()),
            BidVerdict::NotAboveCurrent { .. } => Some(NOT_ABOVE_CURRENT_MESSAGE.to_string()),
            BidVerdict::BelowMinimum { min_bid } => {
                Some(format!("Minsta bud är {} kr", format_amount(*min_bid)))
            }
        }
    }
}

/// 검증 순서: 현재가 이하 -> 최소 입찰가 미만 -> 통과
pub fn validate_bid(reading: &BidFormReading) -> BidVerdict {
    let Some(amount) = reading.amount else {
        return BidVerdict::InvalidAmount;
    };

    if amount <= reading.current_bid {
        return BidVerdict::NotAboveCurrent {
            current_bid: reading.current_bid,
        };
    }

    if amount < reading.min_bid {
        return BidVerdict::BelowMinimum {
            min_bid: reading.min_bid,
        };
    }

    BidVerdict::Accepted
}
// endregion: --- Verdict

// region:    --- Bid Form Guard
/// 제출 결과
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub default_prevented: bool,
    pub verdict: Option<BidVerdict>,
    pub notification: Option<NodeId>,
}

impl SubmitOutcome {
    pub fn passthrough() -> Self {
        Self {
            default_prevented: false,
            verdict: None,
            notification: None,
        }
    }
}

/// `#bid-form` 제출 가드
#[derive(Clone)]
pub struct BidFormGuard {
    doc: Document,
    form: NodeId,
    flash: FlashManager,
}

impl BidFormGuard {
    /// 입찰 폼이 없는 페이지라면 `None`
    pub fn attach(doc: Document, flash: FlashManager) -> Option<Self> {
        let form = doc.element_by_id(BID_FORM_ID)?;
        info!("{:<12} --> 입찰 폼 검증 등록", "BidForm");
        Some(Self { doc, form, flash })
    }

    pub fn form(&self) -> NodeId {
        self.form
    }

    pub fn on_submit(&self) -> SubmitOutcome {
        let reading = BidFormReading::read(&self.doc, self.form);
        let verdict = validate_bid(&reading);

        let notification = verdict.message().map(|message| {
            warn!(
                "{:<12} --> 입찰 제출 차단: {:?} ({:?})",
                "BidForm", verdict, reading
            );
            self.flash.notify(&message, Severity::Error)
        });

        SubmitOutcome {
            default_prevented: !verdict.allows_submission(),
            verdict: Some(verdict),
            notification,
        }
    }
}
// endregion: --- Bid Form Guard

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(amount: f64, current_bid: f64, min_bid: f64) -> BidFormReading {
        BidFormReading {
            amount: Some(amount),
            current_bid,
            min_bid,
        }
    }

    #[test]
    fn equal_to_current_is_rejected() {
        let verdict = validate_bid(&reading(100.0, 100.0, 0.0));
        assert_eq!(verdict, BidVerdict::NotAboveCurrent { current_bid: 100.0 });
        assert_eq!(verdict.message().as_deref(), Some(NOT_ABOVE_CURRENT_MESSAGE));
    }

    #[test]
    fn below_minimum_names_the_minimum() {
        let verdict = validate_bid(&reading(101.0, 100.0, 150.0));
        assert_eq!(verdict, BidVerdict::BelowMinimum { min_bid: 150.0 });
        assert_eq!(verdict.message().as_deref(), Some("Minsta bud är 150 kr"));
    }

    #[test]
    fn current_bid_check_comes_first() {
        let verdict = validate_bid(&reading(50.0, 100.0, 150.0));
        assert!(matches!(verdict, BidVerdict::NotAboveCurrent { .. }));
    }

    #[test]
    fn valid_bid_passes_without_message() {
        let verdict = validate_bid(&reading(200.0, 100.0, 150.0));
        assert_eq!(verdict, BidVerdict::Accepted);
        assert!(verdict.allows_submission());
        assert_eq!(verdict.message(), None);

        assert!(validate_bid(&reading(150.0, 100.0, 150.0)).allows_submission());
    }

    #[test]
    fn unreadable_amount_is_blocked() {
        let verdict = validate_bid(&BidFormReading {
            amount: None,
            current_bid: 0.0,
            min_bid: 0.0,
        });
        assert_eq!(verdict, BidVerdict::InvalidAmount);
        assert!(!verdict.allows_submission());
    }
}
