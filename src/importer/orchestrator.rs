// ==========================================
// SAN 配置导入 - 导入编排器
// ==========================================
// 职责: 整合导入流程，从原始文本到数据库
// 流程: 格式检测 → 解析 → 去重 → Fabric 过滤 → 冲突检测（预览）
//       → 事务化落库（Fabric → 别名 → Zone → 交换机 → 存储）
// 红线:
//   - preview 不产生任何持久化副作用
//   - commit 全部写入处于同一事务；单实体失败通过保存点局部回滚并记入 errors
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_PREVIEW_MEMBER_LIMIT, DEFAULT_RENAME_SUFFIX,
};
use crate::domain::inventory::{UpsertOutcome, ZoneMemberLink};
use crate::domain::parsed::{
    ParseResult, ParsedAlias, ParsedFabric, ParsedStorageSystem, ParsedSwitch, ParsedZone,
};
use crate::domain::types::{AliasKind, ImportType, PortUse, ZoneKind};
use crate::importer::conflict_handler::{ConflictHandler, ImportConflicts};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::insights_parser::InsightsClientFactory;
use crate::importer::registry::ParserRegistry;
use crate::importer::resolution::{ConflictResolution, ConflictResolutions};
use crate::importer::wwpn::{self, WwpnPrefixLookup};
use crate::repository::error::RepositoryResult;
use crate::repository::san_repo::{SanRepository, SanStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// 预览结果
// ==========================================

/// 预览中的 Zone（成员列表按配置截断）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePreview {
    pub name: String,
    pub fabric_name: String,
    pub zone_type: ZoneKind,
    pub members: Vec<String>,
    pub member_count: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub member_types: BTreeMap<String, PortUse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewCounts {
    pub fabrics: usize,
    pub aliases: usize,
    pub zones: usize,
    pub switches: usize,
    pub storage_systems: usize,
    pub volumes: usize,
    pub hosts: usize,
    pub ports: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSummary {
    pub parser: String,
    pub import_type: ImportType,
    pub fabrics: Vec<ParsedFabric>,
    pub aliases: Vec<ParsedAlias>,
    pub zones: Vec<ZonePreview>,
    pub switches: Vec<ParsedSwitch>,
    pub storage_systems: Vec<ParsedStorageSystem>,
    pub counts: PreviewCounts,
    pub conflicts: Option<ImportConflicts>, // None: 未执行冲突检测
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

// ==========================================
// 提交统计
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitStats {
    pub import_id: String,
    pub parser: String,
    pub import_type: ImportType,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    // 别名 + Zone
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub replaced: usize,
    pub renamed: usize,
    pub wwpn_aliases_created: usize, // zone 成员回退合成的 WWPN 别名

    pub fabrics_created: usize,
    pub fabrics_updated: usize,
    pub switches_created: usize,
    pub switches_updated: usize,

    pub storage_systems_created: usize,
    pub storage_systems_updated: usize,
    pub volumes_imported: usize,
    pub hosts_imported: usize,
    pub ports_imported: usize,

    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl CommitStats {
    fn new(parser: &str, import_type: ImportType) -> Self {
        Self {
            import_id: Uuid::new_v4().to_string(),
            parser: parser.to_string(),
            import_type,
            started_at: Utc::now(),
            finished_at: None,
            created: 0,
            updated: 0,
            skipped: 0,
            replaced: 0,
            renamed: 0,
            wwpn_aliases_created: 0,
            fabrics_created: 0,
            fabrics_updated: 0,
            switches_created: 0,
            switches_updated: 0,
            storage_systems_created: 0,
            storage_systems_updated: 0,
            volumes_imported: 0,
            hosts_imported: 0,
            ports_imported: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        if outcome.is_created() {
            self.created += 1;
        } else {
            self.updated += 1;
        }
    }
}

// ==========================================
// ImportOrchestrator
// ==========================================
pub struct ImportOrchestrator<R, C>
where
    R: SanRepository,
    C: ImportConfigReader,
{
    repo: R,
    config: C,
    registry: ParserRegistry,
    prefixes: Arc<dyn WwpnPrefixLookup>,
    conflict_handler: ConflictHandler,
}

impl<R, C> ImportOrchestrator<R, C>
where
    R: SanRepository,
    C: ImportConfigReader,
{
    /// 创建编排器
    ///
    /// # 参数
    /// - repo: 库存仓储
    /// - config: 配置读取器
    /// - registry: 解析器注册表（探测顺序已确定）
    /// - prefixes: 合成 WWPN 别名时使用的前缀表
    pub fn new(
        repo: R,
        config: C,
        registry: ParserRegistry,
        prefixes: Arc<dyn WwpnPrefixLookup>,
    ) -> Self {
        Self {
            repo,
            config,
            registry,
            prefixes,
            conflict_handler: ConflictHandler,
        }
    }

    /// 使用标准注册表创建编排器（前缀表从配置加载）
    pub fn with_standard_registry(
        repo: R,
        config: C,
        insights_clients: Option<Arc<dyn InsightsClientFactory>>,
    ) -> ImportResult<Self> {
        let table = config
            .load_wwpn_prefix_table()
            .map_err(|e| ImportError::Other(anyhow::anyhow!("加载 WWPN 前缀表失败: {}", e)))?;
        let prefixes: Arc<dyn WwpnPrefixLookup> = Arc::new(table);
        let registry = ParserRegistry::standard(prefixes.clone(), insights_clients);
        Ok(Self::new(repo, config, registry, prefixes))
    }

    /// 仅检测格式
    ///
    /// # 返回
    /// - Ok(name): 命中的解析器名称
    pub fn detect(&self, text: &str) -> ImportResult<&'static str> {
        Ok(self.registry.detect(text)?.name())
    }

    // ===== 配置读取（失败回退默认值）=====

    fn rename_suffix(&self) -> String {
        self.config.get_rename_suffix().unwrap_or_else(|e| {
            warn!(error = %e, "读取 rename 后缀失败，使用默认值");
            DEFAULT_RENAME_SUFFIX.to_string()
        })
    }

    fn preview_member_limit(&self) -> usize {
        self.config.get_preview_member_limit().unwrap_or_else(|e| {
            warn!(error = %e, "读取预览成员上限失败，使用默认值");
            DEFAULT_PREVIEW_MEMBER_LIMIT
        })
    }

    fn preview_check_conflicts(&self) -> bool {
        self.config.get_preview_check_conflicts().unwrap_or_else(|e| {
            warn!(error = %e, "读取冲突检测开关失败，默认开启");
            true
        })
    }

    /// 检测 + 解析
    fn parse(&self, text: &str) -> ImportResult<(&'static str, ParseResult)> {
        let parser = self.registry.detect(text)?;
        let parser_name = parser.name();
        let result = parser.parse(text)?;
        info!(parser = parser_name, summary = %result.summary(), "解析完成");
        Ok((parser_name, result))
    }

    /// 去重 + Fabric 过滤，警告写入 warnings
    fn prepare(
        &self,
        result: &ParseResult,
        warnings: &mut Vec<String>,
    ) -> (Vec<ParsedFabric>, Vec<ParsedAlias>) {
        let (aliases, removed) = self.conflict_handler.dedupe_aliases(&result.aliases);
        if removed > 0 {
            debug!(removed = removed, "批次内重复别名已移除");
            warnings.push(format!("已移除 {} 个重复别名（相同 Fabric 与名称）", removed));
        }

        let (fabrics, skipped) =
            self.conflict_handler
                .filter_fabrics(&result.fabrics, &aliases, &result.zones);
        if skipped > 0 {
            debug!(skipped = skipped, "无别名/zone 的 Fabric 已过滤");
            warnings.push(format!("已跳过 {} 个没有别名或 zone 的 Fabric", skipped));
        }

        (fabrics, aliases)
    }

    /// 冲突检测（同一客户范围内同名的别名 / Zone）
    pub fn detect_conflicts(
        &self,
        customer_id: i64,
        aliases: &[ParsedAlias],
        zones: &[ParsedZone],
    ) -> ImportResult<ImportConflicts> {
        let alias_names = distinct_names(aliases.iter().map(|a| a.name.as_str()));
        let zone_names = distinct_names(zones.iter().map(|z| z.name.as_str()));

        let existing_aliases = if alias_names.is_empty() {
            Vec::new()
        } else {
            self.repo.list_aliases_by_names(customer_id, &alias_names)?
        };
        let existing_zones = if zone_names.is_empty() {
            Vec::new()
        } else {
            self.repo.list_zones_by_names(customer_id, &zone_names)?
        };

        Ok(ImportConflicts {
            aliases: self
                .conflict_handler
                .detect_alias_conflicts(aliases, &existing_aliases),
            zones: self
                .conflict_handler
                .detect_zone_conflicts(zones, &existing_zones),
        })
    }

    /// 预览（dry-run）
    ///
    /// # 参数
    /// - text: 原始输入
    /// - customer_id: 客户范围（冲突检测使用）
    /// - check_conflicts: None 时取配置默认值
    ///
    /// # 返回
    /// - Ok(PreviewSummary): 过滤后的实体、计数、冲突、错误、警告
    /// - Err(FormatUnsupported): 无解析器匹配
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn preview(
        &self,
        text: &str,
        customer_id: i64,
        check_conflicts: Option<bool>,
    ) -> ImportResult<PreviewSummary> {
        let (parser_name, result) = self.parse(text)?;

        let mut warnings = result.warnings.clone();
        let (fabrics, aliases) = self.prepare(&result, &mut warnings);

        let check = check_conflicts.unwrap_or_else(|| self.preview_check_conflicts());
        let conflicts = if check {
            let conflicts = self.detect_conflicts(customer_id, &aliases, &result.zones)?;
            if !conflicts.is_empty() {
                info!(count = conflicts.len(), "检测到同名冲突");
            }
            Some(conflicts)
        } else {
            None
        };

        let limit = self.preview_member_limit();
        let zones: Vec<ZonePreview> = result
            .zones
            .iter()
            .map(|zone| ZonePreview {
                name: zone.name.clone(),
                fabric_name: zone.fabric_name.clone(),
                zone_type: zone.zone_type,
                members: zone.members.iter().take(limit).cloned().collect(),
                member_count: zone.members.len(),
                member_types: zone.member_types.clone(),
            })
            .collect();

        let counts = PreviewCounts {
            fabrics: fabrics.len(),
            aliases: aliases.len(),
            zones: zones.len(),
            switches: result.switches.len(),
            storage_systems: result.storage_systems.len(),
            volumes: result.volumes.len(),
            hosts: result.hosts.len(),
            ports: result.ports.len(),
        };

        info!(
            parser = parser_name,
            fabrics = counts.fabrics,
            aliases = counts.aliases,
            zones = counts.zones,
            errors = result.errors.len(),
            warnings = warnings.len(),
            "预览完成"
        );

        Ok(PreviewSummary {
            parser: parser_name.to_string(),
            import_type: result.import_type,
            fabrics,
            aliases,
            zones,
            switches: result.switches,
            storage_systems: result.storage_systems,
            counts,
            conflicts,
            errors: result.errors,
            warnings,
            metadata: result.metadata,
        })
    }

    /// 事务化提交
    ///
    /// # 参数
    /// - text: 原始输入
    /// - customer_id: 客户范围
    /// - target_fabric_id: 指定时所有实体导入该 Fabric，跳过 Fabric 创建/更新
    /// - resolutions: 按名称的冲突处理策略（未列出的名称为 reference）
    ///
    /// # 返回
    /// - Ok(CommitStats): 已提交；实体级失败在 errors 中
    /// - Err: 事务已整体回滚
    #[instrument(skip(self, text, resolutions), fields(bytes = text.len()))]
    pub fn commit(
        &self,
        text: &str,
        customer_id: i64,
        target_fabric_id: Option<i64>,
        resolutions: &ConflictResolutions,
    ) -> ImportResult<CommitStats> {
        let (parser_name, result) = self.parse(text)?;

        let mut stats = CommitStats::new(parser_name, result.import_type);
        info!(import_id = %stats.import_id, customer_id = customer_id, "开始提交导入");

        stats.errors.extend(result.errors.iter().cloned());
        stats.warnings.extend(result.warnings.iter().cloned());
        let (fabrics, aliases) = self.prepare(&result, &mut stats.warnings);
        let rename_suffix = self.rename_suffix();

        self.repo.in_transaction(|store| -> ImportResult<()> {
            let mut run = CommitRun::new(
                store,
                customer_id,
                self.prefixes.as_ref(),
                &self.conflict_handler,
                resolutions,
                rename_suffix,
                &mut stats,
            );

            run.resolve_fabrics(&fabrics, target_fabric_id)?;
            for alias in &aliases {
                run.import_alias(alias)?;
            }
            for zone in &result.zones {
                run.import_zone(zone)?;
            }
            for switch in &result.switches {
                run.import_switch(switch)?;
            }
            run.import_storage(&result)?;
            Ok(())
        })?;

        stats.finished_at = Some(Utc::now());
        info!(
            import_id = %stats.import_id,
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            replaced = stats.replaced,
            errors = stats.errors.len(),
            warnings = stats.warnings.len(),
            "导入提交完成"
        );
        Ok(stats)
    }
}

fn distinct_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// 生成不冲突的名称: base+suffix, base+suffix_1, base+suffix_2 …
fn unique_name<F>(base: &str, suffix: &str, mut exists: F) -> RepositoryResult<String>
where
    F: FnMut(&str) -> RepositoryResult<bool>,
{
    let mut candidate = format!("{}{}", base, suffix);
    let mut counter = 1;
    while exists(&candidate)? {
        candidate = format!("{}{}_{}", base, suffix, counter);
        counter += 1;
    }
    Ok(candidate)
}

/// 保存点内成功写入的别名 / zone
struct EntityWrite {
    name: String,
    outcome: UpsertOutcome,
    replaced: bool,
    fresh_rename: bool,
}

#[derive(Debug, Clone, Copy)]
enum EntityKind {
    Alias,
    Zone,
}

// ==========================================
// CommitRun - 单次提交的事务内状态
// ==========================================
struct CommitRun<'a> {
    store: &'a dyn SanStore,
    customer_id: i64,
    prefixes: &'a dyn WwpnPrefixLookup,
    handler: &'a ConflictHandler,
    resolutions: &'a ConflictResolutions,
    rename_suffix: String,
    stats: &'a mut CommitStats,

    target_fabric: Option<i64>,
    fabrics: Vec<(ParsedFabric, i64)>,

    // 别名索引（原名与改名后的名称都登记）
    fabric_aliases: HashMap<(i64, String), i64>,
    global_aliases: HashMap<String, i64>,

    // 本次已写入/已处理的名称（同名多 Fabric 时保持一致）
    written_aliases: HashSet<String>,
    alias_renames: HashMap<String, String>,
    replaced_aliases: HashSet<String>,
    written_zones: HashSet<String>,
    zone_renames: HashMap<String, String>,
    replaced_zones: HashSet<String>,

    savepoint_seq: usize,
}

impl<'a> CommitRun<'a> {
    fn new(
        store: &'a dyn SanStore,
        customer_id: i64,
        prefixes: &'a dyn WwpnPrefixLookup,
        handler: &'a ConflictHandler,
        resolutions: &'a ConflictResolutions,
        rename_suffix: String,
        stats: &'a mut CommitStats,
    ) -> Self {
        Self {
            store,
            customer_id,
            prefixes,
            handler,
            resolutions,
            rename_suffix,
            stats,
            target_fabric: None,
            fabrics: Vec::new(),
            fabric_aliases: HashMap::new(),
            global_aliases: HashMap::new(),
            written_aliases: HashSet::new(),
            alias_renames: HashMap::new(),
            replaced_aliases: HashSet::new(),
            written_zones: HashSet::new(),
            zone_renames: HashMap::new(),
            replaced_zones: HashSet::new(),
            savepoint_seq: 0,
        }
    }

    /// 在保存点内执行单实体写入
    ///
    /// # 返回
    /// - Ok(Some(T)): 成功并释放保存点
    /// - Ok(None): 实体失败，已回滚到保存点并记入 errors
    /// - Err: 保存点自身失败（事务整体中止）
    fn guarded<T, F>(&mut self, entity: &str, f: F) -> ImportResult<Option<T>>
    where
        F: FnOnce(&mut Self) -> ImportResult<T>,
    {
        self.savepoint_seq += 1;
        let savepoint = format!("sp_entity_{}", self.savepoint_seq);
        self.store.savepoint(&savepoint)?;

        match f(self) {
            Ok(value) => {
                self.store.release_savepoint(&savepoint)?;
                Ok(Some(value))
            }
            Err(e) => {
                self.store.rollback_to_savepoint(&savepoint)?;
                warn!(entity = %entity, error = %e, "实体导入失败，已回滚");
                self.stats.errors.push(format!("{}: {}", entity, e));
                Ok(None)
            }
        }
    }

    /// Fabric 名称 → fabric_id（显式目标优先，其次名称 / VSAN 等价）
    fn fabric_id_for(&self, name: &str) -> Option<i64> {
        if self.target_fabric.is_some() {
            return self.target_fabric;
        }
        if name.is_empty() {
            return None;
        }
        self.fabrics
            .iter()
            .find(|(fabric, _)| self.handler.fabric_matches(fabric, name))
            .map(|(_, id)| *id)
    }

    // ===== 步骤 1: Fabric =====

    fn resolve_fabrics(
        &mut self,
        fabrics: &[ParsedFabric],
        target_fabric_id: Option<i64>,
    ) -> ImportResult<()> {
        if let Some(fabric_id) = target_fabric_id {
            let record = self
                .store
                .find_fabric_by_id(self.customer_id, fabric_id)?
                .ok_or(ImportError::FabricNotFound { fabric_id })?;
            info!(fabric_id = fabric_id, fabric = %record.name, "导入到指定 Fabric");
            self.target_fabric = Some(record.fabric_id);
            return Ok(());
        }

        for fabric in fabrics {
            let entity = format!("Fabric {}", fabric.name);
            let outcome = self.guarded(&entity, |run| {
                Ok(run.store.get_or_create_fabric(run.customer_id, fabric)?)
            })?;

            if let Some(outcome) = outcome {
                if outcome.is_created() {
                    self.stats.fabrics_created += 1;
                } else {
                    self.stats.fabrics_updated += 1;
                }
                self.fabrics.push((fabric.clone(), outcome.id()));
            }
        }
        debug!(fabrics = self.fabrics.len(), "Fabric 解析完成");
        Ok(())
    }

    // ===== 步骤 2: 别名 =====

    /// # 返回
    /// (目标名称, 是否为本次新生成的改名)
    fn alias_rename_target(&self, name: &str, suffix: &str) -> ImportResult<(String, bool)> {
        if let Some(renamed) = self.alias_renames.get(name) {
            return Ok((renamed.clone(), false));
        }
        if self.written_aliases.contains(name)
            || !self.store.alias_name_exists(self.customer_id, name)?
        {
            return Ok((name.to_string(), false));
        }

        let store = self.store;
        let customer_id = self.customer_id;
        let renamed = unique_name(name, suffix, |candidate| {
            store.alias_name_exists(customer_id, candidate)
        })?;
        Ok((renamed, true))
    }

    fn import_alias(&mut self, parsed: &ParsedAlias) -> ImportResult<()> {
        let Some(fabric_id) = self.fabric_id_for(&parsed.fabric_name) else {
            self.stats.warnings.push(format!(
                "别名 {} 所属 Fabric '{}' 未导入，已跳过",
                parsed.name, parsed.fabric_name
            ));
            return Ok(());
        };

        let resolution = self.resolutions.for_alias(&parsed.name);
        if resolution == ConflictResolution::Skip {
            debug!(alias = %parsed.name, "按策略跳过别名");
            self.stats.skipped += 1;
            return Ok(());
        }

        let entity = format!("别名 {}", parsed.name);
        let written = self.guarded(&entity, |run| {
            let mut alias = parsed.clone();
            let mut replaced = false;
            let mut fresh_rename = false;

            match &resolution {
                ConflictResolution::Replace => {
                    if !run.replaced_aliases.contains(&alias.name) {
                        replaced = run.store.delete_aliases_by_name(run.customer_id, &alias.name)? > 0;
                    }
                }
                ConflictResolution::Rename { suffix } => {
                    let suffix = suffix.clone().unwrap_or_else(|| run.rename_suffix.clone());
                    (alias.name, fresh_rename) = run.alias_rename_target(&parsed.name, &suffix)?;
                }
                ConflictResolution::Skip | ConflictResolution::Reference => {}
            }

            let outcome = run.store.get_or_create_alias(fabric_id, &alias)?;
            Ok(EntityWrite {
                name: alias.name,
                outcome,
                replaced,
                fresh_rename,
            })
        })?;

        // 保存点回滚的实体不落账
        let Some(write) = written else {
            return Ok(());
        };
        self.settle(&parsed.name, &resolution, &write, EntityKind::Alias);

        let alias_id = write.outcome.id();
        self.written_aliases.insert(write.name.clone());
        self.fabric_aliases.insert((fabric_id, parsed.name.clone()), alias_id);
        self.fabric_aliases.insert((fabric_id, write.name.clone()), alias_id);
        self.global_aliases.entry(parsed.name.clone()).or_insert(alias_id);
        self.global_aliases.entry(write.name).or_insert(alias_id);
        Ok(())
    }

    /// 记录替换 / 改名 / 计数（仅在实体写入成功后调用）
    fn settle(
        &mut self,
        original: &str,
        resolution: &ConflictResolution,
        write: &EntityWrite,
        kind: EntityKind,
    ) {
        let (replaced_names, renames) = match kind {
            EntityKind::Alias => (&mut self.replaced_aliases, &mut self.alias_renames),
            EntityKind::Zone => (&mut self.replaced_zones, &mut self.zone_renames),
        };
        if matches!(resolution, ConflictResolution::Replace) {
            replaced_names.insert(original.to_string());
        }
        if write.fresh_rename {
            renames.insert(original.to_string(), write.name.clone());
            self.stats.renamed += 1;
        }

        if write.replaced {
            self.stats.replaced += 1;
        } else {
            self.stats.record(write.outcome);
        }
    }

    // ===== 步骤 3: Zone =====

    /// # 返回
    /// (目标名称, 是否为本次新生成的改名)
    fn zone_rename_target(&self, name: &str, suffix: &str) -> ImportResult<(String, bool)> {
        if let Some(renamed) = self.zone_renames.get(name) {
            return Ok((renamed.clone(), false));
        }
        if self.written_zones.contains(name)
            || !self.store.zone_name_exists(self.customer_id, name)?
        {
            return Ok((name.to_string(), false));
        }

        let store = self.store;
        let customer_id = self.customer_id;
        let renamed = unique_name(name, suffix, |candidate| {
            store.zone_name_exists(customer_id, candidate)
        })?;
        Ok((renamed, true))
    }

    /// 解析单个 zone 成员
    ///
    /// 顺序: Fabric 内别名索引 → 全局别名索引 / 已有库存 → WWPN 形态（查找或合成）
    ///
    /// # 返回
    /// - Some((alias_id, 合成的 WWPN)): 已解析
    /// - None: 无法解析
    fn resolve_member(
        &self,
        fabric_id: i64,
        zone: &ParsedZone,
        token: &str,
    ) -> ImportResult<Option<(i64, Option<String>)>> {
        if let Some(&id) = self.fabric_aliases.get(&(fabric_id, token.to_string())) {
            return Ok(Some((id, None)));
        }
        if let Some(&id) = self.global_aliases.get(token) {
            return Ok(Some((id, None)));
        }
        if let Some(record) = self.store.find_alias_by_name(self.customer_id, fabric_id, token)? {
            return Ok(Some((record.alias_id, None)));
        }

        if !wwpn::looks_like_wwpn(token) {
            return Ok(None);
        }
        let normalized = wwpn::normalize(token)?;
        if let Some(&id) = self.fabric_aliases.get(&(fabric_id, normalized.clone())) {
            return Ok(Some((id, None)));
        }
        if let Some(record) = self.store.find_alias_by_wwpn(fabric_id, &normalized)? {
            return Ok(Some((record.alias_id, None)));
        }

        let use_type = zone
            .member_types
            .get(token)
            .or_else(|| zone.member_types.get(&normalized))
            .copied()
            .or_else(|| wwpn::classify(&normalized, self.prefixes));
        let synthesized = ParsedAlias {
            name: normalized.clone(),
            wwpns: vec![normalized.clone()],
            alias_type: AliasKind::Wwpn,
            use_type,
            fabric_name: zone.fabric_name.clone(),
        };
        let outcome = self.store.get_or_create_alias(fabric_id, &synthesized)?;
        debug!(wwpn = %normalized, zone = %zone.name, "合成 WWPN 别名");
        Ok(Some((outcome.id(), Some(normalized))))
    }

    fn import_zone(&mut self, parsed: &ParsedZone) -> ImportResult<()> {
        let Some(fabric_id) = self.fabric_id_for(&parsed.fabric_name) else {
            self.stats.warnings.push(format!(
                "Zone {} 所属 Fabric '{}' 未导入，已跳过",
                parsed.name, parsed.fabric_name
            ));
            return Ok(());
        };

        let resolution = self.resolutions.for_zone(&parsed.name);
        if resolution == ConflictResolution::Skip {
            debug!(zone = %parsed.name, "按策略跳过 Zone");
            self.stats.skipped += 1;
            return Ok(());
        }

        let entity = format!("Zone {}", parsed.name);
        let written = self.guarded(&entity, |run| {
            let mut zone = parsed.clone();
            let mut replaced = false;
            let mut fresh_rename = false;

            match &resolution {
                ConflictResolution::Replace => {
                    if !run.replaced_zones.contains(&zone.name) {
                        replaced = run.store.delete_zones_by_name(run.customer_id, &zone.name)? > 0;
                    }
                }
                ConflictResolution::Rename { suffix } => {
                    let suffix = suffix.clone().unwrap_or_else(|| run.rename_suffix.clone());
                    (zone.name, fresh_rename) = run.zone_rename_target(&parsed.name, &suffix)?;
                }
                ConflictResolution::Skip | ConflictResolution::Reference => {}
            }

            let mut links = Vec::with_capacity(zone.members.len());
            let mut synthesized = Vec::new();
            let mut unresolved = Vec::new();
            for token in &zone.members {
                match run.resolve_member(fabric_id, &zone, token)? {
                    Some((alias_id, wwpn)) => {
                        links.push(ZoneMemberLink {
                            alias_id,
                            member_use: zone.member_types.get(token).copied(),
                        });
                        if let Some(wwpn) = wwpn {
                            synthesized.push((wwpn, alias_id));
                        }
                    }
                    None => unresolved.push(token.clone()),
                }
            }

            let outcome = run.store.get_or_create_zone(fabric_id, &zone, &links)?;
            let write = EntityWrite {
                name: zone.name,
                outcome,
                replaced,
                fresh_rename,
            };
            Ok((write, synthesized, unresolved))
        })?;

        let Some((write, synthesized, unresolved)) = written else {
            return Ok(());
        };
        self.settle(&parsed.name, &resolution, &write, EntityKind::Zone);

        for (wwpn, alias_id) in synthesized {
            if self.fabric_aliases.insert((fabric_id, wwpn), alias_id).is_none() {
                self.stats.wwpn_aliases_created += 1;
            }
        }
        for token in unresolved {
            self.stats.warnings.push(format!(
                "Zone {} 的成员 {} 无法解析，已从 zone 中移除",
                write.name, token
            ));
        }
        self.written_zones.insert(write.name);
        Ok(())
    }

    // ===== 步骤 4: 交换机 =====

    fn import_switch(&mut self, switch: &ParsedSwitch) -> ImportResult<()> {
        let fabric_id = match switch.fabric_name.as_deref() {
            Some(name) => self.fabric_id_for(name),
            None => self.target_fabric,
        };

        let entity = format!("交换机 {}", switch.name);
        let outcome = self.guarded(&entity, |run| {
            Ok(run.store.upsert_switch(run.customer_id, fabric_id, switch)?)
        })?;

        match outcome {
            Some(outcome) if outcome.is_created() => self.stats.switches_created += 1,
            Some(_) => self.stats.switches_updated += 1,
            None => {}
        }
        Ok(())
    }

    // ===== 步骤 5: 存储 =====

    fn import_storage(&mut self, result: &ParseResult) -> ImportResult<()> {
        if result.storage_systems.is_empty()
            && result.volumes.is_empty()
            && result.hosts.is_empty()
            && result.ports.is_empty()
        {
            return Ok(());
        }

        let mut storage_ids: HashMap<String, i64> = HashMap::new();
        for system in &result.storage_systems {
            let entity = format!("存储系统 {}", system.storage_system_id);
            let outcome = self.guarded(&entity, |run| {
                Ok(run.store.upsert_storage_system(run.customer_id, system)?)
            })?;
            if let Some(outcome) = outcome {
                if outcome.is_created() {
                    self.stats.storage_systems_created += 1;
                } else {
                    self.stats.storage_systems_updated += 1;
                }
                storage_ids.insert(system.storage_system_id.clone(), outcome.id());
            }
        }

        for volume in &result.volumes {
            let Some(&storage_id) = storage_ids.get(&volume.storage_system_id) else {
                self.warn_orphan("卷", &volume.volume_id, &volume.storage_system_id);
                continue;
            };
            let entity = format!("卷 {}", volume.volume_id);
            if self
                .guarded(&entity, |run| Ok(run.store.upsert_volume(storage_id, volume)?))?
                .is_some()
            {
                self.stats.volumes_imported += 1;
            }
        }

        for host in &result.hosts {
            let Some(&storage_id) = storage_ids.get(&host.storage_system_id) else {
                self.warn_orphan("主机", &host.name, &host.storage_system_id);
                continue;
            };
            let entity = format!("主机 {}", host.name);
            if self
                .guarded(&entity, |run| Ok(run.store.upsert_host(storage_id, host)?))?
                .is_some()
            {
                self.stats.hosts_imported += 1;
            }
        }

        for port in &result.ports {
            let Some(&storage_id) = storage_ids.get(&port.storage_system_id) else {
                self.warn_orphan("端口", &port.port_id, &port.storage_system_id);
                continue;
            };
            let entity = format!("端口 {}", port.port_id);
            if self
                .guarded(&entity, |run| Ok(run.store.upsert_port(storage_id, port)?))?
                .is_some()
            {
                self.stats.ports_imported += 1;
            }
        }

        info!(
            storage_systems = storage_ids.len(),
            volumes = self.stats.volumes_imported,
            hosts = self.stats.hosts_imported,
            ports = self.stats.ports_imported,
            "存储数据写入完成"
        );
        Ok(())
    }

    fn warn_orphan(&mut self, kind: &str, id: &str, storage_system_id: &str) {
        self.stats.warnings.push(format!(
            "{} {} 关联的存储系统 {} 不在本次导入中，已跳过",
            kind, id, storage_system_id
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name_appends_counter() {
        let taken = ["X_copy", "X_copy_1"];
        let name = unique_name("X", "_copy", |c| Ok(taken.contains(&c))).unwrap();
        assert_eq!(name, "X_copy_2");
    }

    #[test]
    fn test_unique_name_first_candidate() {
        let name = unique_name("X", "_dup", |_| Ok(false)).unwrap();
        assert_eq!(name, "X_dup");
    }

    #[test]
    fn test_distinct_names_keeps_order() {
        let names = distinct_names(["b", "a", "b", "c"].into_iter());
        assert_eq!(names, vec!["b", "a", "c"]);
    }
}
