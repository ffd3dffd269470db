//! 計劃參數配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::{BucketSize, Capability, CapabilitySet, MrpError, PlanningHorizon, Result};

/// 成品 MPS 生產策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MpsPolicy {
    /// 追逐策略：每期生產量等於需求，現有庫存保留不動
    #[default]
    Chase,
    /// 淨額策略：成品與其他物料一樣做淨需求計算
    Net,
}

/// 系統計劃參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningParameters {
    /// 外購件最小採購批量（物料未設置最小訂購量時套用）
    pub minimum_purchase_lot: Decimal,
    /// 計劃時界期數
    pub horizon_periods: u32,
    /// 成品 MPS 策略
    pub mps_policy: MpsPolicy,
}

impl Default for PlanningParameters {
    fn default() -> Self {
        Self {
            minimum_purchase_lot: Decimal::from(10),
            horizon_periods: 12,
            mps_policy: MpsPolicy::Chase,
        }
    }
}

/// 單項參數修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterUpdate {
    MinimumPurchaseLot(Decimal),
    HorizonPeriods(u32),
    MpsPolicy(MpsPolicy),
}

impl PlanningParameters {
    /// 不套用最小採購批量的參數（純批對批）
    pub fn lot_for_lot() -> Self {
        Self {
            minimum_purchase_lot: Decimal::ZERO,
            ..Self::default()
        }
    }

    /// 建構器模式：設置 MPS 策略
    pub fn with_mps_policy(mut self, policy: MpsPolicy) -> Self {
        self.mps_policy = policy;
        self
    }

    /// 建構器模式：設置最小採購批量
    pub fn with_minimum_purchase_lot(mut self, lot: Decimal) -> Self {
        self.minimum_purchase_lot = lot;
        self
    }

    /// 以參數的期數建立計劃時界
    pub fn horizon(&self, start: NaiveDate, bucket: BucketSize) -> Result<PlanningHorizon> {
        PlanningHorizon::with_bucket(start, self.horizon_periods, bucket)
    }

    /// 修改參數（需要 `EditParameter` 權限）
    pub fn apply(&mut self, update: ParameterUpdate, capabilities: &CapabilitySet) -> Result<()> {
        capabilities.require(Capability::EditParameter)?;

        match update {
            ParameterUpdate::MinimumPurchaseLot(lot) => {
                if lot < Decimal::ZERO {
                    return Err(MrpError::InvalidParameter(format!("最小採購批量不可為負: {lot}")));
                }
                self.minimum_purchase_lot = lot;
            }
            ParameterUpdate::HorizonPeriods(periods) => {
                if periods == 0 {
                    return Err(MrpError::InvalidParameter("計劃時界至少需要 1 期".to_string()));
                }
                self.horizon_periods = periods;
            }
            ParameterUpdate::MpsPolicy(policy) => self.mps_policy = policy,
        }

        tracing::info!("計劃參數已更新: {:?}", self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn test_defaults() {
        let params = PlanningParameters::default();

        assert_eq!(params.minimum_purchase_lot, Decimal::from(10));
        assert_eq!(params.horizon_periods, 12);
        assert_eq!(params.mps_policy, MpsPolicy::Chase);
    }

    #[test]
    fn test_admin_can_edit() {
        let mut params = PlanningParameters::default();
        let admin = Role::Administrator.capabilities();

        params.apply(ParameterUpdate::HorizonPeriods(24), &admin).unwrap();
        assert_eq!(params.horizon_periods, 24);

        let err = params.apply(ParameterUpdate::HorizonPeriods(0), &admin).unwrap_err();
        assert!(matches!(err, MrpError::InvalidParameter(_)));
        assert_eq!(params.horizon_periods, 24);
    }

    #[test]
    fn test_operator_cannot_edit() {
        let mut params = PlanningParameters::default();
        let err = params
            .apply(ParameterUpdate::HorizonPeriods(5), &Role::Operator.capabilities())
            .unwrap_err();

        assert_eq!(err, MrpError::PermissionDenied(Capability::EditParameter));
        assert_eq!(params.horizon_periods, 12);
    }

    #[test]
    fn test_horizon_from_parameters() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();
        let horizon = PlanningParameters::default().horizon(start, BucketSize::Weekly).unwrap();

        assert_eq!(horizon.len(), 12);
        assert_eq!(horizon.date_of(2).unwrap(), NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: PlanningParameters = serde_json::from_str(r#"{"horizon_periods": 8}"#).unwrap();
        assert_eq!(params.horizon_periods, 8);
        assert_eq!(params.mps_policy, MpsPolicy::Chase);
    }
}
