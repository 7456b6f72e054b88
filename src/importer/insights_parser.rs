// ==========================================
// SAN 配置导入 - Storage Insights 解析器
// ==========================================
// 输入: 凭据 JSON {tenant_id, api_key, selected_systems?, import_options?, filters?}
// 协作者: InsightsClientFactory / InsightsClient（传输与鉴权在外部实现）
// 输出: import_type = storage 的 ParseResult
// 约定: 拉取失败 → 返回带一条 error 的空结果，而非 Err
// ==========================================

use crate::domain::parsed::{ParseResult, ParsedHost, ParsedPort, ParsedStorageSystem, ParsedVolume};
use crate::domain::types::{ImportType, PortUse};
use crate::importer::error::ImportResult;
use crate::importer::parser_trait::SanParser;
use crate::importer::wwpn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// 凭据 / 导入选项
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsCredentials {
    #[serde(deserialize_with = "string_or_number")]
    pub tenant_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub api_key: String,
    #[serde(default)]
    pub selected_systems: Option<Vec<String>>,
    #[serde(default)]
    pub import_options: InsightsImportOptions,
    #[serde(default)]
    pub filters: Option<Value>,
}

/// 租户 ID / API Key 允许以数字形式出现
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsImportOptions {
    pub import_storage_systems: bool,
    pub import_volumes: bool,
    pub import_hosts: bool,
    pub import_ports: bool,
    pub filters: Option<Value>,
}

impl Default for InsightsImportOptions {
    fn default() -> Self {
        Self {
            import_storage_systems: true,
            import_volumes: true,
            import_hosts: true,
            import_ports: true,
            filters: None,
        }
    }
}

/// 远端返回的数据形状
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsPayload {
    pub storage_systems: Vec<Value>,
    pub volumes_by_system: HashMap<String, Vec<Value>>,
    pub hosts_by_system: HashMap<String, Vec<Value>>,
    pub ports_by_system: HashMap<String, Vec<Value>>,
}

/// 进度回调 (current, total, message)
///
/// 在调用线程同步执行，不得阻塞
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

const PROGRESS_TOTAL: usize = 100;

// ==========================================
// 远端客户端协作者
// ==========================================
pub trait InsightsClient: Send {
    /// 拉取全部数据（客户端内部可并发分页）
    fn fetch_all(
        &self,
        system_ids: Option<&[String]>,
        options: &InsightsImportOptions,
        progress: Option<&ProgressCallback>,
    ) -> anyhow::Result<InsightsPayload>;
}

pub trait InsightsClientFactory: Send + Sync {
    fn connect(&self, credentials: &InsightsCredentials) -> anyhow::Result<Box<dyn InsightsClient>>;
}

// ==========================================
// 字段提取（按优先级回退）
// ==========================================
const SYSTEM_ID_KEYS: &[&str] = &["storage_system_id", "id", "system_id", "device_uuid", "uuid"];
const VOLUME_ID_KEYS: &[&str] = &["volume_id", "id", "vdisk_id", "uid", "unique_id"];
const HOST_ID_KEYS: &[&str] = &["host_id", "id", "uid", "unique_id"];
const PORT_ID_KEYS: &[&str] = &["port_id", "id", "uid", "wwpn"];

fn str_field(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn int_field(obj: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn bool_field(obj: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn wwpn_list(obj: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| match obj.get(*key) {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            Some(Value::String(s)) => Some(
                s.split([',', ' ', ';'])
                    .filter(|t| !t.trim().is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}

// ==========================================
// InsightsParser
// ==========================================
pub struct InsightsParser {
    clients: Arc<dyn InsightsClientFactory>,
    progress: Option<ProgressCallback>,
}

impl InsightsParser {
    pub fn new(clients: Arc<dyn InsightsClientFactory>) -> Self {
        Self {
            clients,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, current: usize, message: &str) {
        if let Some(progress) = &self.progress {
            progress(current, PROGRESS_TOTAL, message);
        }
    }

    fn fetch(&self, credentials: &InsightsCredentials) -> anyhow::Result<InsightsPayload> {
        let mut options = credentials.import_options.clone();
        if options.filters.is_none() {
            options.filters = credentials.filters.clone();
        }

        let client = self.clients.connect(credentials)?;
        client.fetch_all(
            credentials.selected_systems.as_deref(),
            &options,
            self.progress.as_ref(),
        )
    }

    fn map_payload(
        &self,
        payload: &InsightsPayload,
        credentials: &InsightsCredentials,
        result: &mut ParseResult,
    ) {
        let options = &credentials.import_options;
        let allowlist: Option<HashSet<&str>> = credentials
            .selected_systems
            .as_ref()
            .map(|ids| ids.iter().map(String::as_str).collect());

        // ===== 存储系统 =====
        let mut system_ids: Vec<String> = Vec::new();
        for (idx, obj) in payload.storage_systems.iter().enumerate() {
            if !obj.is_object() {
                result.add_warning(format!("存储系统 #{} 不是 JSON 对象，已跳过", idx));
                continue;
            }
            let Some(id) = str_field(obj, SYSTEM_ID_KEYS) else {
                result.add_error(format!("存储系统 #{} 缺少 ID，已跳过", idx));
                continue;
            };
            if let Some(allow) = &allowlist {
                if !allow.contains(id.as_str()) {
                    continue;
                }
            }
            system_ids.push(id.clone());

            if options.import_storage_systems {
                result.storage_systems.push(Self::map_system(obj, id));
            }
        }
        self.report(55, "存储系统映射完成");

        for system_id in &system_ids {
            if options.import_volumes {
                for obj in payload.volumes_by_system.get(system_id).into_iter().flatten() {
                    if let Some(volume) = Self::map_volume(obj, system_id, result) {
                        result.volumes.push(volume);
                    }
                }
            }
            if options.import_hosts {
                for obj in payload.hosts_by_system.get(system_id).into_iter().flatten() {
                    if let Some(host) = Self::map_host(obj, system_id, result) {
                        result.hosts.push(host);
                    }
                }
            }
        }
        self.report(75, "卷与主机映射完成");

        if options.import_ports {
            for system_id in &system_ids {
                for obj in payload.ports_by_system.get(system_id).into_iter().flatten() {
                    if let Some(port) = Self::map_port(obj, system_id, result) {
                        result.ports.push(port);
                    }
                }
            }
        }
    }

    fn map_system(obj: &Value, id: String) -> ParsedStorageSystem {
        ParsedStorageSystem {
            name: str_field(obj, &["name", "display_name", "storage_system_name"])
                .unwrap_or_else(|| id.clone()),
            storage_system_id: id,
            storage_type: str_field(obj, &["type", "storage_type", "system_type"]),
            vendor: str_field(obj, &["vendor", "manufacturer"]),
            model: str_field(obj, &["model"]),
            machine_type: str_field(obj, &["machine_type", "type_number"]),
            serial_number: str_field(obj, &["serial_number", "serial"]),
            firmware_version: str_field(obj, &["firmware", "firmware_version", "code_level"]),
            wwnn: str_field(obj, &["wwnn", "wwn"]).and_then(|w| wwpn::normalize(&w).ok()),
            ip_address: str_field(obj, &["ip_address", "ip", "management_ip"]),
            location: str_field(obj, &["location", "site"]),
            condition: str_field(obj, &["condition", "health"]),
            status: str_field(obj, &["status", "state"]),
            capacity_bytes: int_field(obj, &["capacity_bytes", "capacity", "total_capacity"]),
            used_capacity_bytes: int_field(obj, &["used_capacity_bytes", "used_capacity"]),
            available_capacity_bytes: int_field(
                obj,
                &["available_capacity_bytes", "available_capacity", "free_capacity"],
            ),
            volume_count: int_field(obj, &["volume_count", "volumes_count"]),
            host_count: int_field(obj, &["host_count", "hosts_count"]),
        }
    }

    fn map_volume(obj: &Value, system_id: &str, result: &mut ParseResult) -> Option<ParsedVolume> {
        if !obj.is_object() {
            result.add_warning(format!("系统 {} 的卷对象格式错误，已跳过", system_id));
            return None;
        }
        let Some(volume_id) = str_field(obj, VOLUME_ID_KEYS) else {
            result.add_error(format!("系统 {} 的卷缺少 ID，已跳过", system_id));
            return None;
        };
        Some(ParsedVolume {
            name: str_field(obj, &["name", "volume_name"]).unwrap_or_else(|| volume_id.clone()),
            storage_system_id: system_id.to_string(),
            pool_name: str_field(obj, &["pool_name", "pool", "mdisk_grp_name"]),
            capacity_bytes: int_field(obj, &["capacity_bytes", "capacity"]),
            used_capacity_bytes: int_field(obj, &["used_capacity_bytes", "used_capacity"]),
            thin_provisioned: bool_field(obj, &["thin_provisioned", "is_thin_provisioned", "thin"]),
            status: str_field(obj, &["status", "state"]),
            natural_key: str_field(obj, &["unique_id", "uid", "naa"]),
            volume_id,
        })
    }

    fn map_host(obj: &Value, system_id: &str, result: &mut ParseResult) -> Option<ParsedHost> {
        if !obj.is_object() {
            result.add_warning(format!("系统 {} 的主机对象格式错误，已跳过", system_id));
            return None;
        }
        let Some(host_id) = str_field(obj, HOST_ID_KEYS) else {
            result.add_error(format!("系统 {} 的主机缺少 ID，已跳过", system_id));
            return None;
        };
        let name = str_field(obj, &["name", "host_name"]).unwrap_or_else(|| host_id.clone());

        let mut wwpns = Vec::new();
        for raw in wwpn_list(obj, &["wwpns", "wwpn", "port_wwpns"]) {
            match wwpn::normalize(&raw) {
                Ok(w) => {
                    if !wwpns.contains(&w) {
                        wwpns.push(w);
                    }
                }
                Err(_) => result.add_warning(format!("主机 {}: 无效 WWPN '{}' 已丢弃", name, raw)),
            }
        }

        Some(ParsedHost {
            host_id,
            storage_system_id: system_id.to_string(),
            name,
            host_type: str_field(obj, &["host_type", "type", "os_type"]),
            wwpns,
            status: str_field(obj, &["status", "state"]),
            volume_count: int_field(obj, &["volume_count", "mapped_volume_count"]),
        })
    }

    fn map_port(obj: &Value, system_id: &str, result: &mut ParseResult) -> Option<ParsedPort> {
        if !obj.is_object() {
            result.add_warning(format!("系统 {} 的端口对象格式错误，已跳过", system_id));
            return None;
        }
        let Some(port_id) = str_field(obj, PORT_ID_KEYS) else {
            result.add_error(format!("系统 {} 的端口缺少 ID，已跳过", system_id));
            return None;
        };

        let wwpn = match str_field(obj, &["wwpn", "wwn"]) {
            Some(raw) => match wwpn::normalize(&raw) {
                Ok(w) => Some(w),
                Err(_) => {
                    result.add_warning(format!("端口 {}: 无效 WWPN '{}'", port_id, raw));
                    None
                }
            },
            None => None,
        };

        Some(ParsedPort {
            storage_system_id: system_id.to_string(),
            name: str_field(obj, &["name", "port_name"]),
            wwpn,
            port_type: str_field(obj, &["port_type", "type", "protocol"]),
            speed: str_field(obj, &["speed", "port_speed"]),
            status: str_field(obj, &["status", "state"]),
            location: str_field(obj, &["location", "node"]),
            use_type: str_field(obj, &["use", "role"]).and_then(|r| PortUse::parse(&r)),
            port_id,
        })
    }
}

impl SanParser for InsightsParser {
    fn name(&self) -> &'static str {
        "insights"
    }

    fn detect_format(&self, text: &str) -> bool {
        if !text.trim_start().starts_with('{') {
            return false;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map.contains_key("tenant_id") && map.contains_key("api_key"),
            _ => false,
        }
    }

    fn parse(&self, text: &str) -> ImportResult<ParseResult> {
        let mut result = ParseResult::new(ImportType::Storage);
        result.set_metadata("format", "insights_api");

        let credentials: InsightsCredentials = match serde_json::from_str(text) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "Storage Insights 凭据格式错误");
                result.add_error(format!("Storage Insights 凭据格式错误: {}", e));
                return Ok(result);
            }
        };
        result.set_metadata("tenant_id", credentials.tenant_id.clone());

        self.report(0, "连接 Storage Insights");
        let payload = match self.fetch(&credentials) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(tenant_id = %credentials.tenant_id, error = %e, "Storage Insights 拉取失败");
                result.add_error(format!("Storage Insights 拉取失败: {}", e));
                self.report(PROGRESS_TOTAL, "拉取失败");
                return Ok(result);
            }
        };
        self.report(30, "数据拉取完成");

        self.map_payload(&payload, &credentials, &mut result);
        self.report(PROGRESS_TOTAL, "映射完成");

        info!(summary = %result.summary(), "Storage Insights 解析完成");
        Ok(result)
    }
}
