//! 計劃時界（時間分桶）

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{MrpError, Period, Result};

/// 時間桶長度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BucketSize {
    /// 每日分桶
    #[default]
    Daily,
    /// 每週分桶
    Weekly,
}

impl BucketSize {
    fn days(self) -> i64 {
        match self {
            BucketSize::Daily => 1,
            BucketSize::Weekly => 7,
        }
    }
}

/// 計劃時界：期別 1..=N，每期綁定一個日期，期別連續且日期嚴格遞增
///
/// 建立後不可變，執行期間不能插入或移除期別。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningHorizon {
    start: NaiveDate,
    periods: u32,
    #[serde(default)]
    bucket: BucketSize,
}

impl PlanningHorizon {
    /// 以起始日期與期數建立每日時界
    pub fn new(start: NaiveDate, periods: u32) -> Result<Self> {
        Self::with_bucket(start, periods, BucketSize::Daily)
    }

    /// 以指定桶長建立時界
    pub fn with_bucket(start: NaiveDate, periods: u32, bucket: BucketSize) -> Result<Self> {
        if periods == 0 {
            return Err(MrpError::InvalidParameter("計劃時界至少需要 1 期".to_string()));
        }
        let horizon = Self {
            start,
            periods,
            bucket,
        };
        // 確認最後一期日期不會溢出
        horizon.validate()?;
        Ok(horizon)
    }

    /// 反序列化後的完整性檢查
    pub fn validate(&self) -> Result<()> {
        if self.periods == 0 {
            return Err(MrpError::InvalidParameter("計劃時界至少需要 1 期".to_string()));
        }
        self.offset_date(self.periods)
            .map(|_| ())
            .ok_or_else(|| MrpError::InvalidParameter(format!("計劃時界 {} 期日期溢出", self.periods)))
    }

    /// 期數 N
    pub fn len(&self) -> u32 {
        self.periods
    }

    /// 時界永遠至少有 1 期
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 桶長
    pub fn bucket(&self) -> BucketSize {
        self.bucket
    }

    /// 第 1 期日期
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// 所有期別
    pub fn periods(&self) -> impl Iterator<Item = Period> {
        1..=self.periods
    }

    /// 期別是否在時界內
    pub fn contains(&self, period: Period) -> bool {
        (1..=self.periods).contains(&period)
    }

    /// 期別 → 日期
    pub fn date_of(&self, period: Period) -> Result<NaiveDate> {
        if !self.contains(period) {
            return Err(MrpError::PeriodOutOfHorizon(period));
        }
        self.offset_date(period)
            .ok_or(MrpError::PeriodOutOfHorizon(period))
    }

    /// 日期 → 期別（週桶時回傳包含該日期的期別）
    pub fn period_of(&self, date: NaiveDate) -> Result<Period> {
        let offset = (date - self.start).num_days();
        if offset < 0 {
            return Err(MrpError::DateOutOfHorizon(date));
        }
        let period = offset / self.bucket.days() + 1;
        match u32::try_from(period) {
            Ok(p) if self.contains(p) => Ok(p),
            _ => Err(MrpError::DateOutOfHorizon(date)),
        }
    }

    /// 所有 (期別, 日期)
    pub fn dates(&self) -> Vec<(Period, NaiveDate)> {
        self.periods()
            .filter_map(|p| self.offset_date(p).map(|d| (p, d)))
            .collect()
    }

    fn offset_date(&self, period: Period) -> Option<NaiveDate> {
        let days = i64::from(period.checked_sub(1)?) * self.bucket.days();
        self.start.checked_add_signed(Duration::days(days))
    }
}
