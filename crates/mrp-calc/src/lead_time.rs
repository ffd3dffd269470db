//! 提前期偏移

use mrp_core::{MrpError, Period, PlanningHorizon};

/// 提前期計算器（以期別為單位）
pub struct LeadTimeCalculator;

impl LeadTimeCalculator {
    /// 收貨期別 → 下達期別（向前推算提前期）
    ///
    /// 下達期別早於第 1 期時回傳 [`MrpError::PeriodOutOfHorizon`]。
    pub fn release_period(receipt_period: Period, lead_time: u32) -> mrp_core::Result<Period> {
        match receipt_period.checked_sub(lead_time) {
            Some(p) if p >= 1 => Ok(p),
            _ => Err(MrpError::PeriodOutOfHorizon(
                receipt_period.saturating_sub(lead_time),
            )),
        }
    }

    /// 下達期別 → 收貨期別（向後推算提前期），超出時界時失敗
    pub fn receipt_period(
        release_period: Period,
        lead_time: u32,
        horizon: &PlanningHorizon,
    ) -> mrp_core::Result<Period> {
        let receipt = release_period.saturating_add(lead_time);
        if horizon.contains(release_period) && horizon.contains(receipt) {
            Ok(receipt)
        } else {
            Err(MrpError::PeriodOutOfHorizon(receipt))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case(11, 2, Some(9))]
    #[case(11, 0, Some(11))]
    #[case(3, 2, Some(1))]
    #[case(2, 2, None)]
    #[case(1, 5, None)]
    fn test_release_period(#[case] receipt: Period, #[case] lead_time: u32, #[case] expected: Option<Period>) {
        assert_eq!(LeadTimeCalculator::release_period(receipt, lead_time).ok(), expected);
    }

    #[test]
    fn test_receipt_period_round_trip() {
        let horizon = PlanningHorizon::new(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap(), 12).unwrap();

        let release = LeadTimeCalculator::release_period(11, 3).unwrap();
        assert_eq!(LeadTimeCalculator::receipt_period(release, 3, &horizon).unwrap(), 11);
        assert!(LeadTimeCalculator::receipt_period(11, 2, &horizon)
            .unwrap_err()
            .is_out_of_horizon());
    }
}
