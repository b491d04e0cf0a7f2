// ==========================================
// 混凝土库存台账 - 报表导出 API
// ==========================================
// 职责: 将报表快照渲染为 CSV（只读，不修改任何状态）
// 内容: 物料库存 + 状态、产能估算、最近 5 条流水
// ==========================================

use csv::WriterBuilder;

use crate::api::error::{ApiError, ApiResult};
use crate::api::stock_api::StockSnapshot;
use crate::config::plant_profile::NumberStyle;
use crate::domain::material::MATERIALS;
use crate::domain::transaction::TransactionType;
use crate::i18n::{format_quantity, t};

/// 报表中展示的最近流水条数
pub const REPORT_RECENT_EVENTS: usize = 5;

pub struct ReportApi {
    number_style: NumberStyle,
}

impl ReportApi {
    pub fn new(number_style: NumberStyle) -> Self {
        Self { number_style }
    }

    /// 渲染 CSV 报表
    pub fn render_csv(&self, snapshot: &StockSnapshot) -> ApiResult<String> {
        let style = self.number_style;
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

        let write_err = |e: csv::Error| ApiError::InternalError(format!("报表写入失败: {}", e));

        writer
            .write_record([
                t("report.title"),
                snapshot.generated_at.format("%Y-%m-%d %H:%M").to_string(),
            ])
            .map_err(write_err)?;

        // ===== 物料库存 =====
        writer
            .write_record([t("report.material"), t("report.stock_kg"), t("report.status")])
            .map_err(write_err)?;
        for m in MATERIALS {
            let status = if snapshot.capacity.is_low_stock(m) {
                t("report.low")
            } else {
                t("report.ok")
            };
            writer
                .write_record([
                    m.label().to_string(),
                    format_quantity(snapshot.ledger.quantity(m), style),
                    status,
                ])
                .map_err(write_err)?;
        }

        // ===== 产能估算 =====
        writer
            .write_record([
                t("report.loads"),
                snapshot.capacity.loads_possible.to_string(),
            ])
            .map_err(write_err)?;
        writer
            .write_record([
                t("report.volume"),
                format_quantity(snapshot.capacity.volume_possible_m3, style),
            ])
            .map_err(write_err)?;

        // ===== 最近流水 =====
        writer.write_record([t("report.recent")]).map_err(write_err)?;
        writer
            .write_record([t("report.date"), t("report.operation"), t("report.details")])
            .map_err(write_err)?;
        for tx in snapshot.log.iter().take(REPORT_RECENT_EVENTS) {
            let op = match tx.tx_type {
                TransactionType::ManualEntry => t("report.op_entry"),
                TransactionType::ScaleDeduction => t("report.op_scale"),
            };
            let details = if tx.details.is_empty() {
                "-".to_string()
            } else {
                tx.details.clone()
            };
            writer
                .write_record([tx.timestamp.format("%d/%m/%Y %H:%M").to_string(), op, details])
                .map_err(write_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ApiError::InternalError(format!("报表写入失败: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| ApiError::InternalError(e.to_string()))
    }
}
