//! 角色與權限集合

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{MrpError, Result};

/// 可授權的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// 編輯 MPS 需求
    EditMps,
    /// 執行 MRP 計算
    RunPlanning,
    /// 核准採購單
    ApproveOrder,
    /// 修改採購單
    EditOrder,
    /// 發送採購單給供應商
    SendOrder,
    /// 登記採購單收貨
    ReceiveOrder,
    /// 推進生產作業狀態
    AdvanceOperation,
    /// 修改系統參數
    EditParameter,
    /// 管理使用者
    ManageUsers,
    /// 檢視報表
    ViewReports,
}

/// 使用者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 生產主管
    Manager,
    /// 現場作業員
    Operator,
    /// 採購員
    Buyer,
    /// 系統管理員
    Administrator,
}

impl Role {
    /// 角色對應的權限集合
    pub fn capabilities(self) -> CapabilitySet {
        use Capability::*;

        let caps: &[Capability] = match self {
            Role::Manager => &[
                EditMps,
                RunPlanning,
                ApproveOrder,
                EditOrder,
                SendOrder,
                ReceiveOrder,
                AdvanceOperation,
                ViewReports,
            ],
            Role::Operator => &[AdvanceOperation],
            Role::Buyer => &[EditOrder, SendOrder, ReceiveOrder],
            Role::Administrator => &[
                EditMps,
                RunPlanning,
                ApproveOrder,
                EditOrder,
                SendOrder,
                ReceiveOrder,
                AdvanceOperation,
                EditParameter,
                ManageUsers,
                ViewReports,
            ],
        };
        caps.iter().copied().collect()
    }
}

/// 權限集合：工作流程只檢查集合成員，不檢查角色名稱
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// 空集合
    pub fn empty() -> Self {
        Self::default()
    }

    /// 建構器模式：加入權限
    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    /// 是否具備權限
    pub fn allows(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// 要求權限，缺少時回傳 [`MrpError::PermissionDenied`]
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.allows(capability) {
            Ok(())
        } else {
            Err(MrpError::PermissionDenied(capability))
        }
    }

    /// 所有權限
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Manager, Capability::ApproveOrder, true)]
    #[case(Role::Administrator, Capability::ApproveOrder, true)]
    #[case(Role::Buyer, Capability::ApproveOrder, false)]
    #[case(Role::Buyer, Capability::SendOrder, true)]
    #[case(Role::Operator, Capability::AdvanceOperation, true)]
    #[case(Role::Operator, Capability::EditOrder, false)]
    #[case(Role::Manager, Capability::EditParameter, false)]
    fn test_role_capabilities(#[case] role: Role, #[case] capability: Capability, #[case] allowed: bool) {
        assert_eq!(role.capabilities().allows(capability), allowed);
    }

    #[test]
    fn test_custom_set() {
        let caps = CapabilitySet::empty().with(Capability::ViewReports);

        assert!(caps.require(Capability::ViewReports).is_ok());
        assert_eq!(
            caps.require(Capability::RunPlanning),
            Err(MrpError::PermissionDenied(Capability::RunPlanning))
        );
    }
}
