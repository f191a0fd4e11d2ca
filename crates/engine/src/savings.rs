//! Savings sweep rules.
//!
//! A [`SavingsTransfer`] describes how much of a credit is moved from the
//! spending balance to the savings balance. The same shape configures the
//! per-goal auto-transfer fed by allowance payments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Child, EngineError, MoneyCents, ResultEngine, util::impl_str_enum, util::parse_decimal};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsTransferType {
    None,
    FixedAmount,
    Percentage,
}

impl_str_enum!(SavingsTransferType, "savings transfer type", {
    None => "none",
    FixedAmount => "fixed_amount",
    Percentage => "percentage",
});

/// Configured transfer of part of a credit into savings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SavingsTransfer {
    #[default]
    None,
    FixedAmount(MoneyCents),
    /// Percentage in `0..=100`.
    Percentage(Decimal),
}

/// What produced the credit the transfer is computed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferTrigger {
    /// A scheduled allowance payment. Fixed transfers never exceed the
    /// allowance itself.
    Allowance,
    /// A manual credit (chores, gifts). Fixed transfers are not capped.
    ManualDeposit,
}

impl SavingsTransfer {
    pub fn kind(self) -> SavingsTransferType {
        match self {
            Self::None => SavingsTransferType::None,
            Self::FixedAmount(_) => SavingsTransferType::FixedAmount,
            Self::Percentage(_) => SavingsTransferType::Percentage,
        }
    }

    /// Builds a transfer from its API/storage parts, validating the range.
    pub fn from_parts(kind: &str, amount_minor: i64, percentage: &str) -> ResultEngine<Self> {
        let transfer = match SavingsTransferType::try_from(kind)? {
            SavingsTransferType::None => Self::None,
            SavingsTransferType::FixedAmount => Self::FixedAmount(MoneyCents::new(amount_minor)),
            SavingsTransferType::Percentage => {
                Self::Percentage(parse_decimal(percentage, "savings transfer percentage")?)
            }
        };
        transfer.validate()?;
        Ok(transfer)
    }

    /// Storage parts: `(type, fixed amount in cents, percentage as text)`.
    pub(crate) fn to_parts(self) -> (SavingsTransferType, i64, String) {
        match self {
            Self::None => (SavingsTransferType::None, 0, Decimal::ZERO.to_string()),
            Self::FixedAmount(amount) => {
                (SavingsTransferType::FixedAmount, amount.cents(), Decimal::ZERO.to_string())
            }
            Self::Percentage(percentage) => {
                (SavingsTransferType::Percentage, 0, percentage.to_string())
            }
        }
    }

    pub fn validate(self) -> ResultEngine<()> {
        match self {
            Self::None => Ok(()),
            Self::FixedAmount(amount) if amount.is_negative() => Err(EngineError::InvalidAmount(
                "savings transfer amount must be >= 0".to_string(),
            )),
            Self::Percentage(percentage)
                if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED =>
            {
                Err(EngineError::InvalidAmount(
                    "savings transfer percentage must be between 0 and 100".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Raw transfer for a credit of `credited`, before any balance clamp.
    pub fn amount_for(self, credited: MoneyCents, trigger: TransferTrigger) -> MoneyCents {
        if !credited.is_positive() {
            return MoneyCents::ZERO;
        }
        let amount = match self {
            Self::None => MoneyCents::ZERO,
            Self::FixedAmount(fixed) => match trigger {
                TransferTrigger::Allowance => fixed.min(credited),
                TransferTrigger::ManualDeposit => fixed,
            },
            Self::Percentage(percentage) => credited.percent(percentage),
        };
        amount.max(MoneyCents::ZERO)
    }
}

/// Clamps an automatic debit so it never pushes the spending balance below
/// zero unless the child may go into debt.
pub fn clamp_to_available(child: &Child, amount: MoneyCents) -> MoneyCents {
    if child.allow_debt {
        amount
    } else {
        amount.min(child.available_balance())
    }
}

/// Amount swept into savings after `credited` landed on `child`'s spending
/// balance. `child.current_balance` must already include the credit.
pub fn compute_transfer(child: &Child, credited: MoneyCents, trigger: TransferTrigger) -> MoneyCents {
    clamp_to_available(child, child.savings_transfer.amount_for(credited, trigger))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;

    fn child_with(transfer: SavingsTransfer, balance: i64) -> Child {
        let mut child = Child::new(
            Uuid::new_v4(),
            "Ben".to_string(),
            MoneyCents::new(10_00),
            Utc::now(),
        );
        child.savings_transfer = transfer;
        child.current_balance = MoneyCents::new(balance);
        child
    }

    #[test]
    fn none_transfers_nothing() {
        let child = child_with(SavingsTransfer::None, 10_00);
        let amount = compute_transfer(&child, MoneyCents::new(10_00), TransferTrigger::Allowance);
        assert_eq!(amount, MoneyCents::ZERO);
    }

    #[test]
    fn percentage_of_allowance() {
        let child = child_with(SavingsTransfer::Percentage(dec!(10)), 10_00);
        let amount = compute_transfer(&child, MoneyCents::new(10_00), TransferTrigger::Allowance);
        assert_eq!(amount, MoneyCents::new(1_00));
    }

    #[test]
    fn percentage_rounds_to_cents() {
        let child = child_with(SavingsTransfer::Percentage(dec!(15)), 10_00);
        // 15% of 3.33 = 0.4995 -> 0.50
        let amount = compute_transfer(&child, MoneyCents::new(3_33), TransferTrigger::Allowance);
        assert_eq!(amount, MoneyCents::new(50));
    }

    #[test]
    fn fixed_amount_is_capped_by_allowance() {
        let child = child_with(SavingsTransfer::FixedAmount(MoneyCents::new(15_00)), 50_00);
        let amount = compute_transfer(&child, MoneyCents::new(10_00), TransferTrigger::Allowance);
        assert_eq!(amount, MoneyCents::new(10_00));
    }

    #[test]
    fn fixed_amount_is_not_capped_after_manual_deposit() {
        let child = child_with(SavingsTransfer::FixedAmount(MoneyCents::new(15_00)), 50_00);
        let amount = compute_transfer(&child, MoneyCents::new(10_00), TransferTrigger::ManualDeposit);
        assert_eq!(amount, MoneyCents::new(15_00));
    }

    #[test]
    fn sweep_never_overdraws_without_debt() {
        let mut child = child_with(SavingsTransfer::FixedAmount(MoneyCents::new(15_00)), 4_00);
        let amount = compute_transfer(&child, MoneyCents::new(10_00), TransferTrigger::ManualDeposit);
        assert_eq!(amount, MoneyCents::new(4_00));

        child.current_balance = MoneyCents::new(-2_00);
        let amount = compute_transfer(&child, MoneyCents::new(10_00), TransferTrigger::ManualDeposit);
        assert_eq!(amount, MoneyCents::ZERO);

        child.allow_debt = true;
        let amount = compute_transfer(&child, MoneyCents::new(10_00), TransferTrigger::ManualDeposit);
        assert_eq!(amount, MoneyCents::new(15_00));
    }

    #[test]
    fn percentage_out_of_range_is_rejected() {
        assert!(SavingsTransfer::from_parts("percentage", 0, "100.5").is_err());
        assert!(SavingsTransfer::from_parts("percentage", 0, "-1").is_err());
        assert!(SavingsTransfer::from_parts("fixed_amount", -1, "0").is_err());
        assert_eq!(
            SavingsTransfer::from_parts("percentage", 0, "25").unwrap(),
            SavingsTransfer::Percentage(dec!(25))
        );
    }
}
