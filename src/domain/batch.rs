// ==========================================
// 藻类养殖 ATP 系统 - 养殖批次领域模型
// ==========================================
// 对齐: lotes 表
// 用途: ATP 供给侧 (面积 × 单产)
// ==========================================

use crate::domain::types::BatchStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 湿重 → 干重换算系数
pub const DRY_WEIGHT_RATIO: f64 = 0.15;

// ==========================================
// Batch - 养殖批次 (Lote)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: i64,                          // 批次ID
    pub algae_type: String,                     // 藻种 (Gracilaria / Ulva / Pelillo ...)
    pub area_hectares: f64,                     // 养殖面积 (公顷)
    pub sowing_date: NaiveDate,                 // 播种日期
    pub estimated_harvest_date: Option<NaiveDate>, // 预计收获日期
    pub status: BatchStatus,                    // 批次状态
}

impl Batch {
    /// 该批次在目标日期前是否可作为供给
    ///
    /// - 已收获: 始终计入
    /// - 养殖中: 预计收获日期 <= 目标日期时计入（无预计日期则不计入）
    /// - 损失: 不计入
    pub fn supplies_by(&self, target_date: NaiveDate) -> bool {
        match self.status {
            BatchStatus::Harvested => true,
            BatchStatus::Active => self
                .estimated_harvest_date
                .map(|d| d <= target_date)
                .unwrap_or(false),
            BatchStatus::Lost => false,
        }
    }
}

// ==========================================
// NewBatch - 新建批次请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBatch {
    pub algae_type: String,
    pub area_hectares: f64,
    pub sowing_date: NaiveDate,
    pub estimated_harvest_date: Option<NaiveDate>,
    pub status: BatchStatus,
}

impl NewBatch {
    /// 创建养殖中的新批次（预计收获日期待定）
    pub fn new(algae_type: &str, area_hectares: f64, sowing_date: NaiveDate) -> Self {
        Self {
            algae_type: algae_type.to_string(),
            area_hectares,
            sowing_date,
            estimated_harvest_date: None,
            status: BatchStatus::Active,
        }
    }

    /// 设置预计收获日期
    pub fn with_estimated_harvest(mut self, date: NaiveDate) -> Self {
        self.estimated_harvest_date = Some(date);
        self
    }

    /// 设置批次状态
    pub fn with_status(mut self, status: BatchStatus) -> Self {
        self.status = status;
        self
    }
}

// ==========================================
// HarvestWeighing - 收获称重 (Pesaje)
// ==========================================
// 对齐: pesajes 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestWeighing {
    pub weighing_id: Option<i64>, // 入库前为 None
    pub batch_id: i64,
    pub wet_weight_kg: f64,
    pub dry_weight_kg: f64,
    pub weighing_date: NaiveDate,
    pub recorded_by: String,
}

impl HarvestWeighing {
    /// 由湿重生成称重记录（干重按 15% 自动换算）
    ///
    /// # 返回
    /// - None: 湿重非正或非有限值
    pub fn from_wet_weight(
        batch_id: i64,
        wet_weight_kg: f64,
        weighing_date: NaiveDate,
        recorded_by: &str,
    ) -> Option<Self> {
        if !wet_weight_kg.is_finite() || wet_weight_kg <= 0.0 {
            return None;
        }
        Some(Self {
            weighing_id: None,
            batch_id,
            wet_weight_kg,
            dry_weight_kg: wet_weight_kg * DRY_WEIGHT_RATIO,
            weighing_date,
            recorded_by: recorded_by.to_string(),
        })
    }
}
