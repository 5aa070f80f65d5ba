// ==========================================
// 需求预测与自动调拨系统 - 调拨建议引擎
// ==========================================
// 输入: GapRecord 表 + 最小富余阈值 T
// 输出: TransferSuggestion 序列 + 未满足缺口
// 规则（按商品独立处理，不跨商品调拨）:
// 1) 缺货: gap < 0；富余候选: gap > T；[0, T] 不参与
// 2) 缺货按 gap 升序（最严重优先），相同 gap 保持输入顺序
// 3) 每处理一个缺货，按“当前剩余富余”降序遍历候选
// 4) 调拨量 = min(仍需数量, 剩余富余)，直至满足或候选耗尽
// 红线: 任一富余仓调出总量不超过其原始 gap
// 说明: 贪心分配，不保证全局最优
// ==========================================

use crate::domain::inventory::GapRecord;
use crate::domain::transfer::{TransferPlan, TransferSuggestion, UnmetShortage};
use tracing::{debug, info, instrument};

/// 默认最小富余阈值（件）
pub const DEFAULT_MIN_SURPLUS_THRESHOLD: i64 = 10;

// ==========================================
// TransferSettings - 调拨参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct TransferSettings {
    pub min_surplus_threshold: i64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            min_surplus_threshold: DEFAULT_MIN_SURPLUS_THRESHOLD,
        }
    }
}

/// 单商品分配过程中的富余仓剩余量
#[derive(Debug)]
struct SurplusSlot<'a> {
    location_id: &'a str,
    remaining: i64,
}

// ==========================================
// TransferPlanner - 调拨建议引擎（无状态）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct TransferPlanner {
    settings: TransferSettings,
}

impl TransferPlanner {
    pub fn new(settings: TransferSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// 生成调拨方案
    ///
    /// 商品处理顺序为其在输入中首次出现的顺序；同一输入多次调用结果一致。
    #[instrument(skip(self, gaps), fields(
        gap_records = gaps.len(),
        threshold = self.settings.min_surplus_threshold
    ))]
    pub fn plan(&self, gaps: &[GapRecord]) -> TransferPlan {
        let mut items: Vec<&str> = Vec::new();
        for g in gaps {
            if !items.contains(&g.item_id.as_str()) {
                items.push(&g.item_id);
            }
        }

        let mut plan = TransferPlan::default();
        for item_id in items {
            let rows: Vec<&GapRecord> = gaps.iter().filter(|g| g.item_id == item_id).collect();
            self.plan_item(item_id, &rows, &mut plan);
        }

        info!(
            suggestions = plan.suggestions.len(),
            total_quantity = plan.total_quantity(),
            unmet = plan.unmet.len(),
            "调拨方案生成完成"
        );
        plan
    }

    /// 单商品分配（顺序执行，后续缺货依赖前序消耗）
    fn plan_item(&self, item_id: &str, rows: &[&GapRecord], plan: &mut TransferPlan) {
        let threshold = self.settings.min_surplus_threshold;

        let mut shortages: Vec<&GapRecord> = rows.iter().copied().filter(|g| g.gap < 0).collect();
        shortages.sort_by_key(|g| g.gap);

        let mut surplus: Vec<SurplusSlot<'_>> = rows
            .iter()
            .filter(|g| g.gap > threshold)
            .map(|g| SurplusSlot {
                location_id: g.location_id.as_str(),
                remaining: g.gap,
            })
            .collect();

        for shortage in shortages {
            let original_need = -shortage.gap;
            let mut needed = original_need;

            // 按当前剩余降序；sort_by 稳定，相同剩余保持输入顺序
            let mut order: Vec<usize> = (0..surplus.len()).collect();
            order.sort_by(|a, b| surplus[*b].remaining.cmp(&surplus[*a].remaining));

            for idx in order {
                if needed <= 0 {
                    break;
                }
                let slot = &mut surplus[idx];
                if slot.remaining <= 0 {
                    continue;
                }

                let quantity = needed.min(slot.remaining);
                plan.suggestions.push(TransferSuggestion {
                    item_id: item_id.to_string(),
                    from_location: slot.location_id.to_string(),
                    to_location: shortage.location_id.clone(),
                    quantity,
                });
                slot.remaining -= quantity;
                needed -= quantity;

                debug!(
                    item_id,
                    from = slot.location_id,
                    to = %shortage.location_id,
                    quantity,
                    remaining_surplus = slot.remaining,
                    "生成调拨建议"
                );
            }

            if needed > 0 {
                plan.unmet.push(UnmetShortage {
                    item_id: item_id.to_string(),
                    location_id: shortage.location_id.clone(),
                    original_need,
                    unmet_need: needed,
                });
            }
        }
    }
}
