// ==========================================
// SAN 配置导入 - Cisco MDS 解析器
// ==========================================
// 支持: show tech-support 抓取 / running-config 明文
// 实现: 逐行状态机
//   - 分段: Idle / InSection(kind)，以 `show ...` 反引号标题行切分
//   - 块:   Idle / DeviceAliasDb / FcAlias / Zone / Zoneset
// 输出: 每个别名一条 ParsedAlias（含全部 WWPN）
// ==========================================

use crate::domain::parsed::{ParseResult, ParsedAlias, ParsedFabric, ParsedSwitch, ParsedZone};
use crate::domain::types::{AliasKind, ImportType, PortUse, Vendor, ZoneKind};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::parser_trait::SanParser;
use crate::importer::wwpn::{self, WwpnPrefixLookup};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

static PWWN_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pwwn\s+([0-9A-Fa-f:]+)(?:\s+\[([^\]]+)\])?").expect("pwwn member pattern")
});

static FCID_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^fcid\s+\S+\s+\[pwwn\s+([0-9A-Fa-f:]+)\](?:\s+\[([^\]]+)\])?")
        .expect("fcid member pattern")
});

static DEVICE_ALIAS_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"device-alias\s+name\s+(\S+)\s+pwwn\s+([0-9A-Fa-f:]+)")
        .expect("device-alias entry pattern")
});

static VSAN_INFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^vsan\s+(\d+)\s+information").expect("vsan info pattern"));

static VSAN_NAME_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"name:(\S+)\s+state:(\S+)").expect("vsan name/state pattern")
});

/// tech-support 模式标记
const TECH_SUPPORT_MARKER: &str = "show tech-support";

// ==========================================
// 分段类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Vsan,
    DeviceAlias,
    Fcalias,
    Zone,
    ZonesetActive,
    SwitchName,
    Version,
    SwitchWwn,
    Other,
}

impl SectionKind {
    fn from_header(name: &str) -> Self {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if name == "show vsan" {
            SectionKind::Vsan
        } else if name.starts_with("show device-alias database") {
            SectionKind::DeviceAlias
        } else if name.starts_with("show fcalias") {
            SectionKind::Fcalias
        } else if name.starts_with("show zoneset active") {
            SectionKind::ZonesetActive
        } else if name == "show zone" || name.starts_with("show zone vsan") {
            SectionKind::Zone
        } else if name == "show switchname" {
            SectionKind::SwitchName
        } else if name == "show version" {
            SectionKind::Version
        } else if name.starts_with("show wwn switch") {
            SectionKind::SwitchWwn
        } else {
            SectionKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SectionState {
    Idle,
    InSection(SectionKind),
}

/// 反引号标题行: `show vsan`
fn section_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.len() > 2 && trimmed.starts_with('`') && trimmed.ends_with('`') {
        Some(trimmed[1..trimmed.len() - 1].trim())
    } else {
        None
    }
}

/// 按标题行切分 tech-support 文本
fn split_sections(text: &str) -> Vec<(SectionKind, Vec<&str>)> {
    let mut sections: Vec<(SectionKind, Vec<&str>)> = Vec::new();
    let mut state = SectionState::Idle;

    for line in text.lines() {
        if let Some(header) = section_header(line) {
            let kind = SectionKind::from_header(header);
            state = SectionState::InSection(kind);
            if kind != SectionKind::Other {
                sections.push((kind, Vec::new()));
            }
            continue;
        }

        if let SectionState::InSection(kind) = state {
            if kind == SectionKind::Other {
                continue;
            }
            if let Some((_, lines)) = sections.last_mut() {
                lines.push(line);
            }
        }
    }

    sections
}

// ==========================================
// 成员行解析
// ==========================================
#[derive(Debug, Clone, PartialEq)]
enum MemberRef {
    Wwpn(String),  // 已归一化
    Alias(String), // device-alias / fcalias / 方括号别名
}

#[derive(Debug, Clone, PartialEq)]
struct MemberLine {
    member: MemberRef,
    tag: Option<PortUse>,
}

enum MemberParse {
    Member(MemberLine),
    InvalidWwpn(String),
    Unsupported,
}

/// 解析 zone / fcalias 成员行
///
/// 支持:
/// - `member pwwn <wwpn> [tag]`（running-config）
/// - `pwwn <wwpn> [alias] [tag]`（show zone）
/// - `* fcid 0x... [pwwn <wwpn>] [alias]`（show zoneset active）
/// - `device-alias <name> [tag]` / `fcalias name <name> vsan N`
fn parse_member_line(line: &str) -> MemberParse {
    let mut text = line.trim();
    if let Some(rest) = text.strip_prefix('*') {
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_prefix("member ") {
        text = rest.trim_start();
    }

    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    let tag = tokens.last().and_then(|t| PortUse::parse(t));
    if tag.is_some() {
        tokens.pop();
    }
    let body = tokens.join(" ");

    let captures = PWWN_MEMBER
        .captures(&body)
        .or_else(|| FCID_MEMBER.captures(&body));
    if let Some(caps) = captures {
        let raw_wwpn = &caps[1];
        if let Some(alias) = caps.get(2) {
            return MemberParse::Member(MemberLine {
                member: MemberRef::Alias(alias.as_str().trim().to_string()),
                tag,
            });
        }
        return match wwpn::normalize(raw_wwpn) {
            Ok(normalized) => MemberParse::Member(MemberLine {
                member: MemberRef::Wwpn(normalized),
                tag,
            }),
            Err(_) => MemberParse::InvalidWwpn(raw_wwpn.to_string()),
        };
    }

    match tokens.as_slice() {
        ["device-alias", name, ..] => MemberParse::Member(MemberLine {
            member: MemberRef::Alias((*name).to_string()),
            tag,
        }),
        ["fcalias", "name", name, ..] | ["fcalias", name, ..] => MemberParse::Member(MemberLine {
            member: MemberRef::Alias((*name).to_string()),
            tag,
        }),
        _ => MemberParse::Unsupported,
    }
}

/// 解析 `<name> vsan <N>` 尾部
fn parse_name_vsan(rest: &str) -> Option<(String, u32)> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let name = tokens.first()?;
    let vsan_pos = tokens.iter().position(|t| *t == "vsan")?;
    let vsan = tokens.get(vsan_pos + 1)?.parse::<u32>().ok()?;
    Some((name.to_string(), vsan))
}

fn vsan_fabric_name(vsan: u32) -> String {
    format!("vsan{}", vsan)
}

// ==========================================
// 扫描中间结构
// ==========================================
#[derive(Debug)]
struct VsanInfo {
    name: String,
    state: String,
}

#[derive(Debug)]
struct FcAliasDraft {
    name: String,
    vsan: u32,
    members: Vec<MemberRef>,
}

#[derive(Debug)]
struct ZoneDraft {
    name: String,
    vsan: u32,
    members: Vec<String>,
    member_types: BTreeMap<String, PortUse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    Idle,
    DeviceAliasDb,
    FcAlias,
    Zone,
    Zoneset,
}

/// 块扫描上下文
#[derive(Debug, Clone, Copy)]
struct BlockContext {
    zoneset_is_active: bool,     // zoneset 名是否直接视为生效配置
    collect_zoneset_zones: bool, // 是否从 zoneset 段采集 zone（缺少 show zone 段时）
}

#[derive(Default)]
struct CiscoScan {
    vsans: BTreeMap<u32, VsanInfo>,
    device_aliases: Vec<(String, String)>,
    fcaliases: Vec<FcAliasDraft>,
    zones: Vec<ZoneDraft>,
    defined_zonesets: HashMap<u32, String>,
    active_zonesets: HashMap<u32, String>,
    switch: Option<ParsedSwitch>,
    result: ParseResult,
}

impl CiscoScan {
    fn new() -> Self {
        Self {
            result: ParseResult::new(ImportType::San),
            ..Default::default()
        }
    }

    // ===== show vsan =====
    fn scan_vsan_section(&mut self, lines: &[&str]) {
        let mut current: Option<u32> = None;
        for line in lines {
            let trimmed = line.trim();
            if let Some(caps) = VSAN_INFO.captures(trimmed) {
                current = caps[1].parse::<u32>().ok();
                continue;
            }
            if let (Some(vsan), Some(caps)) = (current, VSAN_NAME_STATE.captures(trimmed)) {
                self.vsans.insert(
                    vsan,
                    VsanInfo {
                        name: caps[1].to_string(),
                        state: caps[2].to_lowercase(),
                    },
                );
                current = None;
            }
        }
    }

    // ===== 设备信息（show switchname / show version / show wwn switch）=====
    fn switch_mut(&mut self) -> &mut ParsedSwitch {
        self.switch.get_or_insert_with(|| ParsedSwitch {
            vendor: Some(Vendor::Cisco),
            is_active: true,
            ..Default::default()
        })
    }

    fn scan_switch_name(&mut self, lines: &[&str]) {
        if let Some(name) = lines.iter().map(|l| l.trim()).find(|l| !l.is_empty()) {
            self.switch_mut().name = name.to_string();
        }
    }

    fn scan_version(&mut self, lines: &[&str]) {
        for line in lines {
            let trimmed = line.trim();
            let lower = trimmed.to_lowercase();
            if lower.starts_with("cisco mds") && lower.contains("chassis") {
                let model = trimmed
                    .split_whitespace()
                    .skip(1)
                    .take(2)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.switch_mut().model = Some(model);
            } else if lower.starts_with("system:") || lower.starts_with("nxos:") {
                if let Some(version) = trimmed.split_whitespace().skip_while(|t| *t != "version").nth(1) {
                    self.switch_mut().firmware_version = Some(version.to_string());
                }
            } else if lower.starts_with("processor board id") {
                if let Some(serial) = trimmed.split_whitespace().last() {
                    self.switch_mut().serial_number = Some(serial.to_string());
                }
            }
        }
    }

    fn scan_switch_wwn(&mut self, lines: &[&str]) {
        for line in lines {
            if let Some(raw) = line.trim().strip_prefix("Switch WWN is") {
                match wwpn::normalize(raw.trim()) {
                    Ok(wwnn) => self.switch_mut().wwnn = Some(wwnn),
                    Err(_) => self
                        .result
                        .add_warning(format!("交换机 WWN 无法解析: {}", raw.trim())),
                }
            }
        }
    }

    // ===== 块状态机（device-alias / fcalias / zone / zoneset）=====
    fn scan_blocks(&mut self, lines: &[&str], ctx: BlockContext) {
        let mut state = BlockState::Idle;

        for raw_line in lines {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('!') {
                continue;
            }

            if line == "device-alias database" {
                state = BlockState::DeviceAliasDb;
                continue;
            }
            if line.starts_with("device-alias commit") {
                state = BlockState::Idle;
                continue;
            }
            if let Some(caps) = DEVICE_ALIAS_ENTRY.captures(line) {
                if line.starts_with("device-alias") {
                    self.add_device_alias(&caps[1], &caps[2]);
                    continue;
                }
            }
            if let Some(rest) = line.strip_prefix("fcalias name ") {
                // show zone 中缩进的 fcalias 行是 zone 成员，不是标题
                if raw_line.starts_with(char::is_whitespace) {
                    match state {
                        BlockState::Zone => {
                            self.add_zone_member(line, raw_line);
                            continue;
                        }
                        BlockState::Zoneset => continue,
                        _ => {}
                    }
                }
                state = match parse_name_vsan(rest) {
                    Some((name, vsan)) => {
                        self.fcaliases.push(FcAliasDraft {
                            name,
                            vsan,
                            members: Vec::new(),
                        });
                        BlockState::FcAlias
                    }
                    None => {
                        self.result
                            .add_warning(format!("无法解析 fcalias 标题行: {}", line));
                        BlockState::Idle
                    }
                };
                continue;
            }
            if let Some(rest) = line.strip_prefix("zoneset activate name ") {
                if let Some((name, vsan)) = parse_name_vsan(rest) {
                    self.active_zonesets.insert(vsan, name);
                }
                state = BlockState::Idle;
                continue;
            }
            if let Some(rest) = line.strip_prefix("zoneset name ") {
                if let Some((name, vsan)) = parse_name_vsan(rest) {
                    if ctx.zoneset_is_active {
                        self.active_zonesets.insert(vsan, name);
                    } else {
                        self.defined_zonesets.insert(vsan, name);
                    }
                }
                state = BlockState::Zoneset;
                continue;
            }
            if let Some(rest) = line.strip_prefix("zone name ") {
                // show zoneset active 内缩进的 zone 与 show zone 段重复
                if state == BlockState::Zoneset
                    && raw_line.starts_with(char::is_whitespace)
                    && !ctx.collect_zoneset_zones
                {
                    continue;
                }
                state = match parse_name_vsan(rest) {
                    Some((name, vsan)) => {
                        self.zones.push(ZoneDraft {
                            name,
                            vsan,
                            members: Vec::new(),
                            member_types: BTreeMap::new(),
                        });
                        BlockState::Zone
                    }
                    None => {
                        self.result
                            .add_warning(format!("无法解析 zone 标题行: {}", line));
                        BlockState::Idle
                    }
                };
                continue;
            }

            match state {
                BlockState::FcAlias => self.add_fcalias_member(line, raw_line),
                BlockState::Zone => self.add_zone_member(line, raw_line),
                BlockState::Zoneset | BlockState::DeviceAliasDb => {}
                BlockState::Idle => {}
            }

            // running-config 中非缩进的其他行结束当前块
            if !raw_line.starts_with(char::is_whitespace)
                && !line.starts_with("member ")
                && !line.starts_with("pwwn ")
                && !line.starts_with('*')
            {
                state = BlockState::Idle;
            }
        }
    }

    fn add_device_alias(&mut self, name: &str, raw_wwpn: &str) {
        match wwpn::normalize(raw_wwpn) {
            Ok(normalized) => self.device_aliases.push((name.to_string(), normalized)),
            Err(_) => self.result.add_error(format!(
                "device-alias {}: 无效 WWPN {}",
                name, raw_wwpn
            )),
        }
    }

    fn add_fcalias_member(&mut self, line: &str, raw_line: &str) {
        let Some(draft) = self.fcaliases.last_mut() else {
            return;
        };
        match parse_member_line(line) {
            MemberParse::Member(member) => draft.members.push(member.member),
            MemberParse::InvalidWwpn(raw) => self.result.add_error(format!(
                "fcalias {} (vsan {}): 无效 WWPN {}",
                draft.name, draft.vsan, raw
            )),
            MemberParse::Unsupported => {
                if raw_line.starts_with(char::is_whitespace) {
                    self.result.add_warning(format!(
                        "fcalias {}: 不支持的成员行 '{}'",
                        draft.name, line
                    ));
                }
            }
        }
    }

    fn add_zone_member(&mut self, line: &str, raw_line: &str) {
        let Some(zone) = self.zones.last_mut() else {
            return;
        };
        match parse_member_line(line) {
            MemberParse::Member(member) => {
                let token = match member.member {
                    MemberRef::Wwpn(w) => w,
                    MemberRef::Alias(a) => a,
                };
                if let Some(tag) = member.tag {
                    zone.member_types.insert(token.clone(), tag);
                }
                if !zone.members.contains(&token) {
                    zone.members.push(token);
                }
            }
            MemberParse::InvalidWwpn(raw) => self.result.add_error(format!(
                "zone {} (vsan {}): 无效 WWPN {}",
                zone.name, zone.vsan, raw
            )),
            MemberParse::Unsupported => {
                if raw_line.starts_with(char::is_whitespace) {
                    self.result.add_warning(format!(
                        "zone {}: 不支持的成员行 '{}'",
                        zone.name, line
                    ));
                }
            }
        }
    }

    // ===== 汇总为 ParseResult =====
    fn finish(mut self, prefixes: &dyn WwpnPrefixLookup) -> ParseResult {
        self.build_fabrics();
        let peer_tags = self.peer_tags_by_member();
        self.build_fcaliases(prefixes, &peer_tags);
        self.build_device_aliases(prefixes, &peer_tags);
        self.build_zones();

        if let Some(switch) = self.switch.take() {
            if switch.name.is_empty() {
                self.result
                    .add_warning("检测到交换机信息但缺少 show switchname，已忽略");
            } else {
                self.result.switches.push(switch);
            }
        }

        self.result
    }

    fn zoneset_for(&self, vsan: u32) -> Option<String> {
        self.active_zonesets
            .get(&vsan)
            .or_else(|| self.defined_zonesets.get(&vsan))
            .cloned()
    }

    fn build_fabrics(&mut self) {
        if !self.vsans.is_empty() {
            let mut fabrics = Vec::new();
            for (vsan, info) in &self.vsans {
                if info.state != "active" {
                    self.result.add_warning(format!(
                        "VSAN {} ({}) 状态为 {}，已跳过",
                        vsan, info.name, info.state
                    ));
                    continue;
                }
                let mut fabric = ParsedFabric::new(vsan_fabric_name(*vsan), Vendor::Cisco);
                fabric.vsan = Some(*vsan);
                fabric.zoneset_name = self.zoneset_for(*vsan);
                fabric.notes = Some(format!("VSAN name: {}", info.name));
                fabrics.push(fabric);
            }
            self.result.fabrics = fabrics;
            return;
        }

        // 无 show vsan 段: 由别名/zone 实际引用的 VSAN 合成
        let referenced: BTreeSet<u32> = self
            .fcaliases
            .iter()
            .map(|a| a.vsan)
            .chain(self.zones.iter().map(|z| z.vsan))
            .collect();
        for vsan in referenced {
            let mut fabric = ParsedFabric::new(vsan_fabric_name(vsan), Vendor::Cisco);
            fabric.vsan = Some(vsan);
            fabric.zoneset_name = self.zoneset_for(vsan);
            self.result.fabrics.push(fabric);
        }
    }

    /// peer zone 中成员标记（别名名称 → 用途），用于补全前缀无法分类的别名
    fn peer_tags_by_member(&self) -> HashMap<String, PortUse> {
        let mut tags = HashMap::new();
        for zone in &self.zones {
            for (member, tag) in &zone.member_types {
                tags.entry(member.clone()).or_insert(*tag);
            }
        }
        tags
    }

    fn resolve_use(
        wwpns: &[String],
        name: &str,
        prefixes: &dyn WwpnPrefixLookup,
        peer_tags: &HashMap<String, PortUse>,
    ) -> Option<PortUse> {
        wwpns
            .iter()
            .find_map(|w| wwpn::classify(w, prefixes))
            .or_else(|| peer_tags.get(name).copied())
    }

    fn build_fcaliases(
        &mut self,
        prefixes: &dyn WwpnPrefixLookup,
        peer_tags: &HashMap<String, PortUse>,
    ) {
        let device_alias_map: HashMap<&str, &str> = self
            .device_aliases
            .iter()
            .map(|(n, w)| (n.as_str(), w.as_str()))
            .collect();

        let mut aliases = Vec::new();
        for draft in &self.fcaliases {
            let mut wwpns: Vec<String> = Vec::new();
            for member in &draft.members {
                let resolved = match member {
                    MemberRef::Wwpn(w) => Some(w.clone()),
                    MemberRef::Alias(name) => {
                        let found = device_alias_map.get(name.as_str()).map(|w| w.to_string());
                        if found.is_none() {
                            self.result.add_warning(format!(
                                "fcalias {}: 引用的 device-alias {} 未定义",
                                draft.name, name
                            ));
                        }
                        found
                    }
                };
                if let Some(w) = resolved {
                    if !wwpns.contains(&w) {
                        wwpns.push(w);
                    }
                }
            }

            if wwpns.is_empty() {
                self.result
                    .add_warning(format!("fcalias {} 没有有效 WWPN，已跳过", draft.name));
                continue;
            }

            let use_type = Self::resolve_use(&wwpns, &draft.name, prefixes, peer_tags);
            aliases.push(ParsedAlias {
                name: draft.name.clone(),
                wwpns,
                alias_type: AliasKind::Fcalias,
                use_type,
                fabric_name: vsan_fabric_name(draft.vsan),
            });
        }
        self.result.aliases.extend(aliases);
    }

    fn build_device_aliases(
        &mut self,
        prefixes: &dyn WwpnPrefixLookup,
        peer_tags: &HashMap<String, PortUse>,
    ) {
        let single_fabric = match self.result.fabrics.as_slice() {
            [only] => Some(only.name.clone()),
            _ => None,
        };

        let mut unassigned = 0usize;
        let mut aliases = Vec::new();
        for (name, normalized) in &self.device_aliases {
            let wwpns = vec![normalized.clone()];
            let use_type = Self::resolve_use(&wwpns, name, prefixes, peer_tags);

            let vsans: BTreeSet<u32> = self
                .zones
                .iter()
                .filter(|z| z.members.iter().any(|m| m == name))
                .map(|z| z.vsan)
                .collect();

            let fabric_names: Vec<String> = if !vsans.is_empty() {
                vsans.into_iter().map(vsan_fabric_name).collect()
            } else if let Some(only) = &single_fabric {
                vec![only.clone()]
            } else {
                unassigned += 1;
                vec![String::new()]
            };

            for fabric_name in fabric_names {
                aliases.push(ParsedAlias {
                    name: name.clone(),
                    wwpns: wwpns.clone(),
                    alias_type: AliasKind::DeviceAlias,
                    use_type,
                    fabric_name,
                });
            }
        }

        if unassigned > 0 {
            self.result.add_warning(format!(
                "{} 个 device-alias 未被任何 zone 引用，无法确定所属 Fabric",
                unassigned
            ));
        }
        self.result.aliases.extend(aliases);
    }

    fn build_zones(&mut self) {
        for draft in std::mem::take(&mut self.zones) {
            if draft.members.is_empty() {
                self.result
                    .add_warning(format!("zone {} (vsan {}) 没有成员", draft.name, draft.vsan));
            }
            let zone_type = if draft.member_types.is_empty() {
                ZoneKind::Standard
            } else {
                ZoneKind::Peer
            };
            self.result.zones.push(ParsedZone {
                name: draft.name,
                members: draft.members,
                zone_type,
                member_types: draft.member_types,
                fabric_name: vsan_fabric_name(draft.vsan),
            });
        }
    }
}

// ==========================================
// CiscoParser
// ==========================================
pub struct CiscoParser {
    prefixes: Arc<dyn WwpnPrefixLookup>,
}

impl CiscoParser {
    pub fn new(prefixes: Arc<dyn WwpnPrefixLookup>) -> Self {
        Self { prefixes }
    }

    fn is_tech_support(text: &str) -> bool {
        text.contains(TECH_SUPPORT_MARKER) || text.lines().any(|l| section_header(l).is_some())
    }

    fn parse_tech_support(&self, text: &str) -> ParseResult {
        let sections = split_sections(text);
        let has_zone_section = sections.iter().any(|(k, _)| *k == SectionKind::Zone);
        debug!(sections = sections.len(), "tech-support 分段完成");

        let mut scan = CiscoScan::new();

        // 依赖顺序处理: vsan → device-alias → fcalias → zone → zoneset
        let order = [
            SectionKind::Vsan,
            SectionKind::DeviceAlias,
            SectionKind::Fcalias,
            SectionKind::Zone,
            SectionKind::ZonesetActive,
            SectionKind::SwitchName,
            SectionKind::Version,
            SectionKind::SwitchWwn,
        ];
        for kind in order {
            for (_, lines) in sections.iter().filter(|(k, _)| *k == kind) {
                match kind {
                    SectionKind::Vsan => scan.scan_vsan_section(lines),
                    SectionKind::DeviceAlias | SectionKind::Fcalias | SectionKind::Zone => {
                        scan.scan_blocks(
                            lines,
                            BlockContext {
                                zoneset_is_active: false,
                                collect_zoneset_zones: false,
                            },
                        )
                    }
                    SectionKind::ZonesetActive => scan.scan_blocks(
                        lines,
                        BlockContext {
                            zoneset_is_active: true,
                            collect_zoneset_zones: !has_zone_section,
                        },
                    ),
                    SectionKind::SwitchName => scan.scan_switch_name(lines),
                    SectionKind::Version => scan.scan_version(lines),
                    SectionKind::SwitchWwn => scan.scan_switch_wwn(lines),
                    SectionKind::Other => {}
                }
            }
        }

        let mut result = scan.finish(self.prefixes.as_ref());
        result.set_metadata("format", "cisco_tech_support");
        result.set_metadata("sections", sections.len());
        result
    }

    fn parse_running_config(&self, text: &str) -> ParseResult {
        let lines: Vec<&str> = text.lines().collect();
        let mut scan = CiscoScan::new();
        scan.scan_blocks(
            &lines,
            BlockContext {
                zoneset_is_active: false,
                collect_zoneset_zones: false,
            },
        );

        let mut result = scan.finish(self.prefixes.as_ref());
        result.set_metadata("format", "cisco_running_config");
        result
    }
}

impl SanParser for CiscoParser {
    fn name(&self) -> &'static str {
        "cisco"
    }

    fn detect_format(&self, text: &str) -> bool {
        text.contains(TECH_SUPPORT_MARKER)
            || text.contains("`show zone")
            || text.contains("`show vsan`")
            || text.contains("device-alias database")
            || text.contains("device-alias name ")
            || (text.contains("zone name ") && text.contains(" vsan "))
            || (text.contains("fcalias name ") && text.contains(" vsan "))
    }

    fn parse(&self, text: &str) -> ImportResult<ParseResult> {
        if text.trim().is_empty() {
            return Err(ImportError::FormatUnsupported("Cisco 输入为空".to_string()));
        }

        let mut result = if Self::is_tech_support(text) {
            self.parse_tech_support(text)
        } else {
            self.parse_running_config(text)
        };

        result.set_metadata("vendor", Vendor::Cisco.code());
        result.set_metadata("byte_size", text.len());
        info!(summary = %result.summary(), "Cisco 解析完成");
        Ok(result)
    }
}
