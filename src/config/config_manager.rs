// ==========================================
// 混凝土库存台账 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use chrono::Utc;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::config::plant_profile::PlantProfile;
use crate::extraction::ExtractionCredential;

/// 配置键
pub mod config_keys {
    /// 搅拌站配置（JSON）
    pub const PLANT_PROFILE: &str = "plant_profile";

    /// 识别服务凭证
    pub const EXTRACTION_API_KEY: &str = "extraction/api_key";
}

/// 识别服务凭证环境变量
pub const API_KEY_ENV: &str = "CONCRETE_STOCK_API_KEY";

// ==========================================
// ExtractionSettings - 识别服务设置
// ==========================================
// 构建时一次性读取，注入对账组件
#[derive(Debug, Clone, Default)]
pub struct ExtractionSettings {
    pub credential: Option<ExtractionCredential>,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT OR REPLACE INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// 读取搅拌站配置
    ///
    /// 配置不存在、无法解析或校验失败时使用默认配置（记录告警）
    pub fn load_plant_profile(&self) -> Result<PlantProfile, Box<dyn Error>> {
        let Some(raw) = self.get_global_config_value(config_keys::PLANT_PROFILE)? else {
            return Ok(PlantProfile::default());
        };

        let profile: PlantProfile = match serde_json::from_str(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "搅拌站配置无法解析，使用默认配置");
                return Ok(PlantProfile::default());
            }
        };

        if let Err(reason) = profile.validate() {
            warn!(%reason, "搅拌站配置不合法，使用默认配置");
            return Ok(PlantProfile::default());
        }

        Ok(profile)
    }

    /// 保存搅拌站配置（先校验）
    pub fn save_plant_profile(&self, profile: &PlantProfile) -> Result<(), Box<dyn Error>> {
        profile.validate()?;
        let raw = serde_json::to_string(profile)?;
        self.set_global_config_value(config_keys::PLANT_PROFILE, &raw)?;
        info!(fine_sand_target = ?profile.fine_sand_target, "搅拌站配置已保存");
        Ok(())
    }

    /// 读取识别服务设置
    ///
    /// 凭证来源（优先级）：环境变量 CONCRETE_STOCK_API_KEY > config_kv
    pub fn load_extraction_settings(&self) -> Result<ExtractionSettings, Box<dyn Error>> {
        let from_env = std::env::var(API_KEY_ENV)
            .ok()
            .and_then(ExtractionCredential::new);

        let credential = match from_env {
            Some(c) => Some(c),
            None => self
                .get_global_config_value(config_keys::EXTRACTION_API_KEY)?
                .and_then(ExtractionCredential::new),
        };

        if credential.is_none() {
            info!("识别服务凭证未配置，仅可使用无需凭证的识别器");
        }

        Ok(ExtractionSettings { credential })
    }
}
