// ==========================================
// SAN 配置导入 - Brocade 解析器
// ==========================================
// 支持:
//   1. SwitchSummary.csv   (Switch Name,Switch WWN,...)
//   2. FabricSummary.csv   (Fabric Name,Fabric Principal Switch,...)
//   3. AliasInfo.csv       (Alias Name / Alias Member(s))
//   4. ZoneInfo.csv        (Zone Name / Zone Member(s))
//   5. cfgshow CLI 文本    (Defined / Effective configuration)
//   6. 组合 CSV            (空行 + "Fabric Name," 分段)
// 顺序: 固定优先级，SwitchSummary 必须先于 FabricSummary
// ==========================================

use crate::domain::parsed::{ParseResult, ParsedAlias, ParsedFabric, ParsedSwitch, ParsedZone};
use crate::domain::types::{AliasKind, ImportType, PortUse, Vendor, ZoneKind};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::parser_trait::SanParser;
use crate::importer::wwpn::{self, WwpnPrefixLookup};
use csv::{ReaderBuilder, Trim};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 缺少 Fabric 名称时使用的合成名称
pub const DEFAULT_FABRIC_NAME: &str = "brocade_fabric";

const SWITCH_SUMMARY_MARKER: &str = "Switch Name,Switch WWN";
const FABRIC_SUMMARY_MARKER: &str = "Fabric Name,Fabric Principal Switch";
const COMBINED_SECTION_PREFIX: &str = "Fabric Name,";
const DEFINED_CONFIG_MARKER: &str = "Defined configuration:";
const EFFECTIVE_CONFIG_MARKER: &str = "Effective configuration:";

// ==========================================
// CSV 形态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CsvShape {
    FabricSummary,
    AliasInfo,
    ZoneInfo,
}

impl CsvShape {
    fn detect(text: &str) -> Option<Self> {
        if text.contains(FABRIC_SUMMARY_MARKER) {
            Some(CsvShape::FabricSummary)
        } else if text.contains("Alias Name") && text.contains("Alias Member") {
            Some(CsvShape::AliasInfo)
        } else if text.contains("Zone Name") && text.contains("Zone Member") {
            Some(CsvShape::ZoneInfo)
        } else {
            None
        }
    }
}

type CsvRow = HashMap<String, String>;

/// 读取 CSV 为行映射（表头 → 值），跳过全空行
fn read_csv_rows(text: &str) -> ImportResult<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // SAN Health 导出行长度不一致
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let mut row = HashMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row.insert(header.clone(), value.trim().to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// 取第一个非空列值（按候选表头顺序）
fn field<'a>(row: &'a CsvRow, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| row.get(*name))
        .map(|v| v.as_str())
        .find(|v| !v.is_empty())
}

fn fabric_of(row: &CsvRow) -> String {
    field(row, &["Fabric Name", "Fabric"])
        .unwrap_or(DEFAULT_FABRIC_NAME)
        .to_string()
}

/// 丢弃 header 行之前的内容（SwitchSummary 可出现在输入任意位置）
fn from_header_line<'a>(text: &'a str, marker: &str) -> &'a str {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.contains(marker) {
            return &text[offset..];
        }
        offset += line.len();
    }
    text
}

/// 截取到下一个空行为止
fn until_blank_line(text: &str) -> &str {
    let mut end = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() && end > 0 {
            break;
        }
        end += line.len();
    }
    &text[..end]
}

/// 组合 CSV 分段: 空行之后以 "Fabric Name," 开头的行开启新段
fn split_combined_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;
    let mut previous_blank = true;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if previous_blank && trimmed.starts_with(COMBINED_SECTION_PREFIX) {
            if let Some(begin) = start {
                sections.push(&text[begin..offset]);
            }
            start = Some(offset);
        }
        previous_blank = trimmed.is_empty();
        offset += line.len();
    }
    if let Some(begin) = start {
        sections.push(&text[begin..]);
    }
    sections
}

// ==========================================
// BrocadeParser
// ==========================================
pub struct BrocadeParser {
    prefixes: Arc<dyn WwpnPrefixLookup>,
}

impl BrocadeParser {
    pub fn new(prefixes: Arc<dyn WwpnPrefixLookup>) -> Self {
        Self { prefixes }
    }

    fn ensure_fabric(result: &mut ParseResult, name: &str) {
        if !result.fabrics.iter().any(|f| f.name == name) {
            result
                .fabrics
                .push(ParsedFabric::new(name.to_string(), Vendor::Brocade));
        }
    }

    // ===== 1. SwitchSummary =====
    fn parse_switch_summary(&self, text: &str) -> ImportResult<ParseResult> {
        let section = until_blank_line(from_header_line(text, SWITCH_SUMMARY_MARKER));
        let rows = read_csv_rows(section)?;
        let mut result = ParseResult::new(ImportType::San);

        for (idx, row) in rows.iter().enumerate() {
            let Some(name) = field(row, &["Switch Name"]) else {
                result.add_error(format!("SwitchSummary 第 {} 行缺少 Switch Name", idx + 1));
                continue;
            };

            let domain_id = match field(row, &["Domain ID", "Domain Id", "Domain"]) {
                Some(raw) => match raw.parse::<i32>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        result.add_warning(format!("交换机 {}: Domain ID '{}' 无效", name, raw));
                        None
                    }
                },
                None => None,
            };

            let wwnn = match field(row, &["Switch WWN"]) {
                Some(raw) => match wwpn::normalize(raw) {
                    Ok(w) => Some(w),
                    Err(_) => {
                        result.add_warning(format!("交换机 {}: Switch WWN '{}' 无效", name, raw));
                        None
                    }
                },
                None => None,
            };

            let is_active = field(row, &["Switch State", "State"])
                .map(|s| s.eq_ignore_ascii_case("online"))
                .unwrap_or(false);

            result.switches.push(ParsedSwitch {
                name: name.to_string(),
                wwnn,
                model: field(row, &["Model Number", "Model"]).map(str::to_string),
                serial_number: field(row, &["Serial Number", "Serial #"]).map(str::to_string),
                firmware_version: field(row, &["Firmware Version", "Fabric OS Version", "FOS Version"])
                    .map(str::to_string),
                ip_address: field(row, &["IP Address", "Switch IP Address"]).map(str::to_string),
                domain_id,
                fabric_name: field(row, &["Fabric Name"]).map(str::to_string),
                vendor: Some(Vendor::Brocade),
                is_active,
                location: field(row, &["Location", "Switch Location"]).map(str::to_string),
            });
        }

        result.set_metadata("format", "brocade_switch_summary");
        Ok(result)
    }

    // ===== 2. FabricSummary =====
    fn parse_fabric_summary(&self, text: &str) -> ImportResult<ParseResult> {
        let rows = read_csv_rows(text)?;
        let mut result = ParseResult::new(ImportType::San);

        for row in &rows {
            let Some(name) = field(row, &["Fabric Name"]) else {
                result.add_warning("FabricSummary 行缺少 Fabric Name，已跳过");
                continue;
            };
            let mut fabric = ParsedFabric::new(name.to_string(), Vendor::Brocade);
            fabric.zoneset_name = field(
                row,
                &["Effective Configuration", "Active Zone Config", "Zone Configuration"],
            )
            .map(str::to_string);
            fabric.notes = field(row, &["Fabric Principal Switch"])
                .map(|s| format!("Principal switch: {}", s));
            result.fabrics.push(fabric);
        }

        result.set_metadata("format", "brocade_fabric_summary");
        Ok(result)
    }

    // ===== 3. AliasInfo =====
    fn parse_alias_info(&self, text: &str) -> ImportResult<ParseResult> {
        let rows = read_csv_rows(text)?;
        let mut result = ParseResult::new(ImportType::San);

        for row in &rows {
            let Some(name) = field(row, &["Alias Name"]) else {
                result.add_warning("AliasInfo 行缺少 Alias Name，已跳过");
                continue;
            };
            let fabric_name = fabric_of(row);
            let members = field(row, &["Alias Member(s)", "Alias Members", "Alias Member"])
                .unwrap_or_default();
            let tokens = members.split(|c: char| c.is_whitespace() || c == ';');

            if let Some(alias) = self.build_alias(name, tokens, &fabric_name, &mut result) {
                Self::ensure_fabric(&mut result, &fabric_name);
                result.aliases.push(alias);
            }
        }

        result.set_metadata("format", "brocade_alias_info");
        Ok(result)
    }

    /// 无效 WWPN 告警并丢弃；一个有效 WWPN 都没有时记为错误
    fn build_alias<'a>(
        &self,
        name: &str,
        tokens: impl Iterator<Item = &'a str>,
        fabric_name: &str,
        result: &mut ParseResult,
    ) -> Option<ParsedAlias> {
        let mut wwpns: Vec<String> = Vec::new();
        for token in tokens.map(str::trim).filter(|t| !t.is_empty()) {
            match wwpn::normalize(token) {
                Ok(normalized) => {
                    if !wwpns.contains(&normalized) {
                        wwpns.push(normalized);
                    }
                }
                Err(_) => result.add_warning(format!("别名 {}: 无效 WWPN '{}' 已丢弃", name, token)),
            }
        }

        if wwpns.is_empty() {
            result.add_error(format!("别名 {} (fabric {}) 没有有效 WWPN", name, fabric_name));
            return None;
        }

        let use_type = wwpns
            .iter()
            .find_map(|w| wwpn::classify(w, self.prefixes.as_ref()));

        Some(ParsedAlias {
            name: name.to_string(),
            wwpns,
            alias_type: AliasKind::Fcalias,
            use_type,
            fabric_name: fabric_name.to_string(),
        })
    }

    // ===== 4. ZoneInfo =====
    fn parse_zone_info(&self, text: &str) -> ImportResult<ParseResult> {
        let rows = read_csv_rows(text)?;
        let mut result = ParseResult::new(ImportType::San);

        for row in &rows {
            let Some(name) = field(row, &["Zone Name"]) else {
                result.add_warning("ZoneInfo 行缺少 Zone Name，已跳过");
                continue;
            };
            let fabric_name = fabric_of(row);
            let members = field(row, &["Zone Member(s)", "Zone Members", "Zone Member"])
                .unwrap_or_default();
            let tokens = members.split([',', ';']);

            let zone = self.build_zone(name, tokens, &fabric_name);
            Self::ensure_fabric(&mut result, &fabric_name);
            result.zones.push(zone);
        }

        result.set_metadata("format", "brocade_zone_info");
        Ok(result)
    }

    /// 构造 zone
    ///
    /// - 形如 WWPN 的 token 归一化为裸 WWPN 成员，其余视为别名名称
    /// - 首个成员以 `00:` 开头（peer 伪成员）或名称含 peerzone/peer_ 时为 peer zone
    /// - peer zone 中可按前缀分类的 WWPN 成员写入 member_types
    fn build_zone<'a>(
        &self,
        name: &str,
        tokens: impl Iterator<Item = &'a str>,
        fabric_name: &str,
    ) -> ParsedZone {
        let raw: Vec<&str> = tokens.map(str::trim).filter(|t| !t.is_empty()).collect();

        let lower_name = name.to_lowercase();
        let has_pseudo_member = raw.first().is_some_and(|t| t.starts_with("00:"));
        let is_peer =
            has_pseudo_member || lower_name.contains("peerzone") || lower_name.contains("peer_");

        let mut members: Vec<String> = Vec::new();
        let mut member_types: BTreeMap<String, PortUse> = BTreeMap::new();
        for (idx, token) in raw.iter().enumerate() {
            if idx == 0 && has_pseudo_member {
                continue;
            }
            let member = if wwpn::looks_like_wwpn(token) {
                match wwpn::normalize(token) {
                    Ok(normalized) => {
                        if is_peer {
                            if let Some(use_type) = wwpn::classify(&normalized, self.prefixes.as_ref())
                            {
                                member_types.insert(normalized.clone(), use_type);
                            }
                        }
                        normalized
                    }
                    Err(_) => token.to_string(),
                }
            } else {
                token.to_string()
            };
            if !members.contains(&member) {
                members.push(member);
            }
        }

        ParsedZone {
            name: name.to_string(),
            members,
            zone_type: if is_peer { ZoneKind::Peer } else { ZoneKind::Standard },
            member_types,
            fabric_name: fabric_name.to_string(),
        }
    }

    // ===== 5. cfgshow =====
    fn parse_cfgshow(&self, text: &str) -> ParseResult {
        let mut result = ParseResult::new(ImportType::San);
        let mut state = CfgState::Idle;
        let mut current: Option<CfgEntry> = None;
        let mut defined: Vec<CfgEntry> = Vec::new();
        let mut effective_cfg: Option<String> = None;

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(DEFINED_CONFIG_MARKER) {
                defined.extend(current.take());
                state = CfgState::Defined;
                continue;
            }
            if line.starts_with(EFFECTIVE_CONFIG_MARKER) {
                defined.extend(current.take());
                state = CfgState::Effective;
                continue;
            }

            match state {
                CfgState::Idle => {}
                CfgState::Defined => {
                    if let Some(entry) = CfgEntry::start(line) {
                        defined.extend(current.replace(entry));
                    } else if let Some(entry) = current.as_mut() {
                        entry.push_members(line);
                    } else {
                        debug!(line = %line, "cfgshow: 忽略无归属行");
                    }
                }
                CfgState::Effective => {
                    if effective_cfg.is_none() {
                        if let Some(entry) = CfgEntry::start(line) {
                            if entry.kind == CfgKind::Cfg {
                                effective_cfg = Some(entry.name);
                            }
                        }
                    }
                }
            }
        }
        if state == CfgState::Defined {
            defined.extend(current.take());
        }

        let fabric_name = effective_cfg
            .clone()
            .or_else(|| {
                defined
                    .iter()
                    .find(|e| e.kind == CfgKind::Cfg)
                    .map(|e| e.name.clone())
            })
            .unwrap_or_else(|| DEFAULT_FABRIC_NAME.to_string());

        let mut fabric = ParsedFabric::new(fabric_name.clone(), Vendor::Brocade);
        fabric.zoneset_name = effective_cfg;
        result.fabrics.push(fabric);

        for entry in &defined {
            match entry.kind {
                CfgKind::Cfg => {}
                CfgKind::Alias => {
                    let tokens = entry.members.iter().map(String::as_str);
                    if let Some(alias) =
                        self.build_alias(&entry.name, tokens, &fabric_name, &mut result)
                    {
                        result.aliases.push(alias);
                    }
                }
                CfgKind::Zone => {
                    let tokens = entry.members.iter().map(String::as_str);
                    result
                        .zones
                        .push(self.build_zone(&entry.name, tokens, &fabric_name));
                }
            }
        }

        result.set_metadata("format", "brocade_cfgshow");
        result
    }

    // ===== 6. 组合 CSV =====
    fn parse_combined(&self, sections: &[&str]) -> ImportResult<ParseResult> {
        let mut shaped: Vec<(CsvShape, &str)> = Vec::new();
        let mut result = ParseResult::new(ImportType::San);

        for section in sections {
            match CsvShape::detect(section) {
                Some(shape) => shaped.push((shape, section)),
                None => {
                    let header = section.lines().next().unwrap_or_default();
                    result.add_warning(format!("组合 CSV: 无法识别的分段 '{}'", header));
                }
            }
        }
        // FabricSummary 优先合并，保留其 zoneset 信息
        shaped.sort_by_key(|(shape, _)| *shape);

        for (shape, section) in shaped {
            let part = match shape {
                CsvShape::FabricSummary => self.parse_fabric_summary(section)?,
                CsvShape::AliasInfo => self.parse_alias_info(section)?,
                CsvShape::ZoneInfo => self.parse_zone_info(section)?,
            };
            result.merge(part);
        }

        result.set_metadata("format", "brocade_combined_csv");
        result.set_metadata("sections", sections.len());
        Ok(result)
    }
}

// ==========================================
// cfgshow 状态机
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CfgState {
    Idle,
    Defined,
    Effective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CfgKind {
    Cfg,
    Zone,
    Alias,
}

#[derive(Debug)]
struct CfgEntry {
    kind: CfgKind,
    name: String,
    members: Vec<String>,
}

impl CfgEntry {
    /// `cfg:|zone:|alias: <name> [members...]`
    fn start(line: &str) -> Option<Self> {
        let (kind, rest) = if let Some(rest) = line.strip_prefix("cfg:") {
            (CfgKind::Cfg, rest)
        } else if let Some(rest) = line.strip_prefix("zone:") {
            (CfgKind::Zone, rest)
        } else if let Some(rest) = line.strip_prefix("alias:") {
            (CfgKind::Alias, rest)
        } else {
            return None;
        };

        let rest = rest.trim();
        let (name, tail) = match rest.split_once(char::is_whitespace) {
            Some((name, tail)) => (name, tail),
            None => (rest, ""),
        };
        if name.is_empty() {
            return None;
        }

        let mut entry = CfgEntry {
            kind,
            name: name.to_string(),
            members: Vec::new(),
        };
        entry.push_members(tail);
        Some(entry)
    }

    fn push_members(&mut self, line: &str) {
        self.members.extend(
            line.split(';')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        );
    }
}

impl SanParser for BrocadeParser {
    fn name(&self) -> &'static str {
        "brocade"
    }

    fn detect_format(&self, text: &str) -> bool {
        text.contains(SWITCH_SUMMARY_MARKER)
            || text.contains(FABRIC_SUMMARY_MARKER)
            || (text.contains("Alias Name") && text.contains("Alias Member"))
            || (text.contains("Zone Name") && text.contains("Zone Member"))
            || text.contains(DEFINED_CONFIG_MARKER)
            || text.contains(EFFECTIVE_CONFIG_MARKER)
    }

    fn parse(&self, text: &str) -> ImportResult<ParseResult> {
        if text.trim().is_empty() {
            return Err(ImportError::FormatUnsupported("Brocade 输入为空".to_string()));
        }

        let sections = split_combined_sections(text);
        let single_section = sections.len() <= 1;

        let mut result = if text.contains(SWITCH_SUMMARY_MARKER) {
            self.parse_switch_summary(text)?
        } else if let (true, Some(shape)) = (single_section, CsvShape::detect(text)) {
            match shape {
                CsvShape::FabricSummary => self.parse_fabric_summary(text)?,
                CsvShape::AliasInfo => self.parse_alias_info(text)?,
                CsvShape::ZoneInfo => self.parse_zone_info(text)?,
            }
        } else if text.contains(DEFINED_CONFIG_MARKER) || text.contains(EFFECTIVE_CONFIG_MARKER) {
            self.parse_cfgshow(text)
        } else if !single_section {
            self.parse_combined(&sections)?
        } else {
            warn!("Brocade 输入未匹配任何已知形态");
            return Err(ImportError::FormatUnsupported(
                "无法识别的 Brocade 导出格式".to_string(),
            ));
        };

        result.set_metadata("vendor", Vendor::Brocade.code());
        result.set_metadata("byte_size", text.len());
        info!(summary = %result.summary(), "Brocade 解析完成");
        Ok(result)
    }
}
