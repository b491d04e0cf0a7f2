// ==========================================
// 集成测试辅助模块
// ==========================================
// 各测试文件通过 `mod helpers;` 引入，未使用的辅助函数不告警
// ==========================================

#![allow(dead_code)]

pub mod mock_extractor;
pub mod stock_test_helper;
