// ==========================================
// 藻类养殖 ATP 系统 - 模拟结果展示
// ==========================================
// 职责: 将模拟结果转换为 { summary, color, data } 展示结构
// 规则: 缺口为 0 → green (立即交付); 否则 → warning (需要养殖)
// ==========================================

use crate::domain::simulation::SimulationResult;
use crate::domain::types::ResultColor;
use crate::i18n;
use serde::{Deserialize, Serialize};

/// 展示结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub summary: String,
    pub color: ResultColor,
    pub data: SimulationResult,
}

pub struct ResultPresenter;

impl ResultPresenter {
    /// 按当前语言生成展示结构
    pub fn present(result: &SimulationResult) -> SimulationSummary {
        Self::present_in(&i18n::current_locale(), result)
    }

    /// 按指定语言生成展示结构
    pub fn present_in(locale: &str, result: &SimulationResult) -> SimulationSummary {
        let color = Self::color_for(result);
        let days = format!("{:.1}", result.total_lead_time_days());

        let summary = match color {
            ResultColor::Green => i18n::t_with_args_in(
                locale,
                "simulation.immediate_delivery",
                &[
                    ("stock", &format!("{:.2}", result.projected_stock_tons())),
                    ("days", &days),
                ],
            ),
            ResultColor::Warning => i18n::t_with_args_in(
                locale,
                "simulation.requires_cultivation",
                &[
                    ("deficit", &format!("{:.2}", result.deficit_tons())),
                    ("days", &days),
                ],
            ),
        };

        SimulationSummary {
            summary,
            color,
            data: result.clone(),
        }
    }

    pub fn color_for(result: &SimulationResult) -> ResultColor {
        if result.deficit_tons() > 0.0 {
            ResultColor::Warning
        } else {
            ResultColor::Green
        }
    }
}
