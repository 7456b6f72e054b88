// ==========================================
// 导入提交集成测试
// ==========================================
// 测试目标: 编排器在固定解析结果上的落库语义
// 覆盖: 幂等、去重、rename/replace/skip、VSAN 等价、指定 Fabric、预览
// ==========================================

mod test_helpers;

use san_import::config::{config_keys, ConfigManager};
use san_import::domain::parsed::{ParseResult, ParsedAlias, ParsedFabric, ParsedZone};
use san_import::domain::types::{AliasKind, ImportType, PortUse, Vendor, ZoneKind};
use san_import::importer::{
    ConflictResolution, ConflictResolutions, ImportError, ImportOrchestrator, ImportResult,
    ParserRegistry, SanParser, WwpnPrefixTable,
};
use san_import::logging;
use san_import::repository::SqliteSanRepository;
use std::collections::BTreeMap;
use std::sync::Arc;
use test_helpers::{
    alias_names, alias_wwpns, count_rows, create_test_db, insert_fabric, insert_test_config,
    zone_member_names, CUSTOMER_ID,
};

const INPUT: &str = "FIXTURE";

// ==========================================
// 固定结果解析器
// ==========================================
struct FixtureParser {
    result: Arc<ParseResult>,
}

impl SanParser for FixtureParser {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn detect_format(&self, text: &str) -> bool {
        text.starts_with(INPUT)
    }

    fn parse(&self, _text: &str) -> ImportResult<ParseResult> {
        Ok((*self.result).clone())
    }
}

type FixtureImporter = ImportOrchestrator<SqliteSanRepository, ConfigManager>;

fn fixture_importer(db_path: &str, result: ParseResult) -> FixtureImporter {
    let result = Arc::new(result);
    let mut registry = ParserRegistry::new();
    registry.register("fixture", move || {
        Box::new(FixtureParser {
            result: result.clone(),
        }) as Box<dyn SanParser>
    });

    ImportOrchestrator::new(
        SqliteSanRepository::new(db_path).unwrap(),
        ConfigManager::new(db_path).unwrap(),
        registry,
        Arc::new(WwpnPrefixTable::with_defaults()),
    )
}

fn fabric(name: &str) -> ParsedFabric {
    ParsedFabric::new(name, Vendor::Brocade)
}

fn alias(name: &str, fabric: &str, wwpns: &[&str]) -> ParsedAlias {
    ParsedAlias {
        name: name.to_string(),
        wwpns: wwpns.iter().map(|w| w.to_string()).collect(),
        alias_type: AliasKind::Fcalias,
        use_type: None,
        fabric_name: fabric.to_string(),
    }
}

fn zone(name: &str, fabric: &str, members: &[&str]) -> ParsedZone {
    ParsedZone {
        name: name.to_string(),
        members: members.iter().map(|m| m.to_string()).collect(),
        zone_type: ZoneKind::Standard,
        member_types: BTreeMap::new(),
        fabric_name: fabric.to_string(),
    }
}

fn san_result(fabrics: Vec<ParsedFabric>, aliases: Vec<ParsedAlias>, zones: Vec<ParsedZone>) -> ParseResult {
    let mut result = ParseResult::new(ImportType::San);
    result.fabrics = fabrics;
    result.aliases = aliases;
    result.zones = zones;
    result
}

fn single_alias_result(name: &str, fabric_name: &str, wwpn: &str) -> ParseResult {
    san_result(
        vec![fabric(fabric_name)],
        vec![alias(name, fabric_name, &[wwpn])],
        vec![],
    )
}

fn alias_resolution(name: &str, resolution: ConflictResolution) -> ConflictResolutions {
    let mut resolutions = ConflictResolutions::default();
    resolutions.aliases.insert(name.to_string(), resolution);
    resolutions
}

const W1: &str = "10:00:00:00:c9:00:00:01";
const W2: &str = "10:00:00:00:c9:00:00:02";
const W3: &str = "50:06:01:60:00:00:00:03";

// ==========================================
// 幂等 / WWPN 整体替换
// ==========================================

#[test]
fn test_reimport_is_idempotent_and_replaces_wwpns() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let first = san_result(
        vec![fabric("FAB_A")],
        vec![alias("host_a", "FAB_A", &[W1, W2]), alias("array_a", "FAB_A", &[W3])],
        vec![zone("z1", "FAB_A", &["host_a", "array_a"])],
    );
    let importer = fixture_importer(&db_path, first.clone());
    let stats = importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();
    assert_eq!(stats.parser, "fixture");
    assert_eq!(stats.created, 3);
    assert_eq!(stats.fabrics_created, 1);

    let stats = importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();
    assert_eq!(stats.created, 0);
    assert_eq!(stats.updated, 3);
    assert_eq!(count_rows(&db_path, "alias"), 2);
    assert_eq!(count_rows(&db_path, "zone_member"), 2);
    assert_eq!(alias_wwpns(&db_path, "host_a"), vec![W1.to_string(), W2.to_string()]);

    // WWPN 列表变化: 整体替换，不追加
    let mut changed = first;
    changed.aliases[0].wwpns = vec![W2.to_string()];
    let importer = fixture_importer(&db_path, changed);
    importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();
    assert_eq!(alias_wwpns(&db_path, "host_a"), vec![W2.to_string()]);
    assert_eq!(count_rows(&db_path, "alias_wwpn"), 2);
}

// ==========================================
// 批次内去重
// ==========================================

#[test]
fn test_duplicate_alias_with_use_replaces_first_occurrence() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let mut tagged = alias("dup", "FAB_A", &[W3]);
    tagged.use_type = Some(PortUse::Target);
    let result = san_result(
        vec![fabric("FAB_A")],
        vec![
            alias("dup", "FAB_A", &[W1]),
            alias("other", "FAB_A", &[W2]),
            tagged,
            alias("dup", "FAB_A", &[W2]),
        ],
        vec![],
    );
    let importer = fixture_importer(&db_path, result);

    let summary = importer.preview(INPUT, CUSTOMER_ID, None).unwrap();
    assert_eq!(summary.aliases.len(), 2);
    assert_eq!(summary.aliases[0].name, "dup");
    assert_eq!(summary.aliases[0].use_type, Some(PortUse::Target));
    assert_eq!(summary.aliases[0].wwpns, vec![W3.to_string()]);
    assert!(summary
        .warnings
        .iter()
        .any(|w| w.contains("已移除 2 个重复别名")));

    let stats = importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();
    assert_eq!(stats.created, 2);
    assert_eq!(alias_wwpns(&db_path, "dup"), vec![W3.to_string()]);
}

#[test]
fn test_same_alias_name_in_two_fabrics_is_kept() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A"), fabric("FAB_B")],
        vec![alias("shared", "FAB_A", &[W1]), alias("shared", "FAB_B", &[W1])],
        vec![],
    );
    let importer = fixture_importer(&db_path, result);
    let stats = importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    assert_eq!(stats.created, 2);
    assert_eq!(stats.fabrics_created, 2);
    assert_eq!(count_rows(&db_path, "alias"), 2);
}

// ==========================================
// rename 策略
// ==========================================

#[test]
fn test_rename_generates_unique_names() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = fixture_importer(&db_path, single_alias_result("X", "FAB_A", W1));

    importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    let rename = alias_resolution("X", ConflictResolution::Rename { suffix: None });
    let stats = importer.commit(INPUT, CUSTOMER_ID, None, &rename).unwrap();
    assert_eq!(stats.renamed, 1);
    assert_eq!(stats.created, 1);

    let stats = importer.commit(INPUT, CUSTOMER_ID, None, &rename).unwrap();
    assert_eq!(stats.renamed, 1);

    assert_eq!(
        alias_names(&db_path),
        vec!["X".to_string(), "X_copy".to_string(), "X_copy_1".to_string()]
    );
}

#[test]
fn test_failed_rename_is_not_counted() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = fixture_importer(&db_path, single_alias_result("X", "FAB_A", W1));

    importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER block_x_copy BEFORE INSERT ON alias
         WHEN NEW.name = 'X_copy'
         BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
    )
    .unwrap();

    let rename = alias_resolution("X", ConflictResolution::Rename { suffix: None });
    let stats = importer.commit(INPUT, CUSTOMER_ID, None, &rename).unwrap();
    assert_eq!(stats.renamed, 0);
    assert_eq!(stats.created, 0);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].contains("别名 X"));
    assert_eq!(alias_names(&db_path), vec!["X".to_string()]);

    conn.execute_batch("DROP TRIGGER block_x_copy;").unwrap();
    let stats = importer.commit(INPUT, CUSTOMER_ID, None, &rename).unwrap();
    assert_eq!(stats.renamed, 1);
    assert_eq!(
        alias_names(&db_path),
        vec!["X".to_string(), "X_copy".to_string()]
    );
}

#[test]
fn test_rename_without_existing_name_keeps_name() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = fixture_importer(&db_path, single_alias_result("fresh", "FAB_A", W1));

    let rename = alias_resolution("fresh", ConflictResolution::Rename { suffix: None });
    let stats = importer.commit(INPUT, CUSTOMER_ID, None, &rename).unwrap();

    assert_eq!(stats.renamed, 0);
    assert_eq!(stats.created, 1);
    assert_eq!(alias_names(&db_path), vec!["fresh".to_string()]);
}

#[test]
fn test_rename_with_explicit_and_configured_suffix() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = fixture_importer(&db_path, single_alias_result("X", "FAB_A", W1));

    importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    let explicit = alias_resolution(
        "X",
        ConflictResolution::Rename {
            suffix: Some("_old".to_string()),
        },
    );
    importer.commit(INPUT, CUSTOMER_ID, None, &explicit).unwrap();

    insert_test_config(&db_path, config_keys::RENAME_SUFFIX, "_dup").unwrap();
    let configured = alias_resolution("X", ConflictResolution::Rename { suffix: None });
    importer.commit(INPUT, CUSTOMER_ID, None, &configured).unwrap();

    assert_eq!(
        alias_names(&db_path),
        vec!["X".to_string(), "X_dup".to_string(), "X_old".to_string()]
    );
}

#[test]
fn test_renamed_alias_is_used_as_zone_member() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![alias("X", "FAB_A", &[W1]), alias("array", "FAB_A", &[W3])],
        vec![zone("z_new", "FAB_A", &["X", "array"])],
    );
    fixture_importer(&db_path, single_alias_result("X", "FAB_OLD", W2))
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    let rename = alias_resolution("X", ConflictResolution::Rename { suffix: None });
    fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, None, &rename)
        .unwrap();

    assert_eq!(
        zone_member_names(&db_path, "z_new"),
        vec!["X_copy".to_string(), "array".to_string()]
    );
}

// ==========================================
// replace / skip
// ==========================================

#[test]
fn test_replace_deletes_existing_rows_across_fabrics() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    fixture_importer(&db_path, single_alias_result("X", "FAB_A", W1))
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    let replace = alias_resolution("X", ConflictResolution::Replace);
    let stats = fixture_importer(&db_path, single_alias_result("X", "FAB_B", W2))
        .commit(INPUT, CUSTOMER_ID, None, &replace)
        .unwrap();

    assert_eq!(stats.replaced, 1);
    assert_eq!(stats.created, 0);
    assert_eq!(alias_names(&db_path), vec!["X".to_string()]);
    assert_eq!(alias_wwpns(&db_path, "X"), vec![W2.to_string()]);
}

#[test]
fn test_replace_zone_without_existing_counts_created() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![alias("h", "FAB_A", &[W1])],
        vec![zone("z", "FAB_A", &["h"])],
    );
    let mut resolutions = ConflictResolutions::default();
    resolutions
        .zones
        .insert("z".to_string(), ConflictResolution::Replace);

    let stats = fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, None, &resolutions)
        .unwrap();
    assert_eq!(stats.replaced, 0);
    assert_eq!(stats.created, 2);
}

#[test]
fn test_skip_counts_and_leaves_entity_untouched() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![
            alias("a1", "FAB_A", &[W1]),
            alias("a2", "FAB_A", &[W2]),
            alias("a3", "FAB_A", &[W3]),
        ],
        vec![],
    );
    let skip = alias_resolution("a2", ConflictResolution::Skip);
    let stats = fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, None, &skip)
        .unwrap();

    assert_eq!(stats.created + stats.updated, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(alias_names(&db_path), vec!["a1".to_string(), "a3".to_string()]);
}

// ==========================================
// Fabric 解析
// ==========================================

#[test]
fn test_vsan_name_variants_resolve_to_same_fabric() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let mut vsan75 = ParsedFabric::new("vsan75", Vendor::Cisco);
    vsan75.vsan = Some(75);
    let mut vsan80 = ParsedFabric::new("vsan80", Vendor::Cisco);
    vsan80.vsan = Some(80);

    let result = san_result(
        vec![vsan75, vsan80],
        vec![alias("h", "vsan0075", &[W1])],
        vec![zone("z", "VSAN75", &["h"])],
    );
    let importer = fixture_importer(&db_path, result);

    let summary = importer.preview(INPUT, CUSTOMER_ID, Some(false)).unwrap();
    assert_eq!(summary.fabrics.len(), 1);
    assert_eq!(summary.fabrics[0].name, "vsan75");
    assert!(summary.warnings.iter().any(|w| w.contains("已跳过 1 个")));

    let stats = importer
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();
    assert_eq!(stats.fabrics_created, 1);
    assert_eq!(stats.created, 2);
    assert_eq!(count_rows(&db_path, "fabric"), 1);
    assert_eq!(zone_member_names(&db_path, "z"), vec!["h".to_string()]);
}

#[test]
fn test_explicit_target_fabric_skips_fabric_creation() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let fabric_id = insert_fabric(&db_path, CUSTOMER_ID, "EXISTING");

    let result = san_result(
        vec![fabric("FROM_FILE")],
        vec![alias("h", "FROM_FILE", &[W1])],
        vec![zone("z", "FROM_FILE", &["h"])],
    );
    let stats = fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, Some(fabric_id), &ConflictResolutions::default())
        .unwrap();

    assert_eq!(stats.fabrics_created, 0);
    assert_eq!(stats.fabrics_updated, 0);
    assert_eq!(stats.created, 2);
    assert_eq!(count_rows(&db_path, "fabric"), 1);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let alias_fabric: i64 = conn
        .query_row("SELECT fabric_id FROM alias WHERE name = 'h'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(alias_fabric, fabric_id);
}

#[test]
fn test_missing_target_fabric_rolls_back() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = fixture_importer(&db_path, single_alias_result("h", "FAB_A", W1));

    let err = importer
        .commit(INPUT, CUSTOMER_ID, Some(999), &ConflictResolutions::default())
        .unwrap_err();
    assert!(matches!(err, ImportError::FabricNotFound { fabric_id: 999 }));
    assert_eq!(count_rows(&db_path, "alias"), 0);

    // 其他客户的 Fabric 同样视为不存在
    let foreign = insert_fabric(&db_path, 2, "FOREIGN");
    let err = importer
        .commit(INPUT, CUSTOMER_ID, Some(foreign), &ConflictResolutions::default())
        .unwrap_err();
    assert!(matches!(err, ImportError::FabricNotFound { .. }));
    assert_eq!(count_rows(&db_path, "alias"), 0);
}

#[test]
fn test_alias_in_unimported_fabric_is_skipped_with_warning() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![alias("h", "FAB_A", &[W1]), alias("lost", "", &[W2])],
        vec![],
    );
    let stats = fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    assert_eq!(stats.created, 1);
    assert!(stats.warnings.iter().any(|w| w.contains("lost")));
}

// ==========================================
// Zone 成员解析
// ==========================================

#[test]
fn test_unresolvable_member_is_dropped_with_warning() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![alias("h", "FAB_A", &[W1])],
        vec![zone("z", "FAB_A", &["h", "ghost"])],
    );
    let stats = fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    assert_eq!(zone_member_names(&db_path, "z"), vec!["h".to_string()]);
    assert!(stats
        .warnings
        .iter()
        .any(|w| w.contains("ghost") && w.contains("无法解析")));
}

#[test]
fn test_raw_wwpn_member_reuses_alias_with_same_wwpn() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![alias("h", "FAB_A", &[W1])],
        vec![zone("z", "FAB_A", &[W1, W3])],
    );
    let stats = fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    // W1 已属于别名 h；W3 合成为 WWPN 别名
    assert_eq!(stats.wwpn_aliases_created, 1);
    assert_eq!(
        zone_member_names(&db_path, "z"),
        vec!["h".to_string(), W3.to_string()]
    );
}

// ==========================================
// 预览
// ==========================================

#[test]
fn test_preview_has_no_side_effects() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![alias("h", "FAB_A", &[W1])],
        vec![zone("z", "FAB_A", &["h", W3])],
    );
    let summary = fixture_importer(&db_path, result)
        .preview(INPUT, CUSTOMER_ID, None)
        .unwrap();

    assert_eq!(summary.counts.aliases, 1);
    assert_eq!(summary.counts.zones, 1);
    for table in ["fabric", "alias", "alias_wwpn", "zone", "zone_member"] {
        assert_eq!(count_rows(&db_path, table), 0, "table {}", table);
    }
}

#[test]
fn test_preview_truncates_zone_members() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let members: Vec<String> = (0..12).map(|i| format!("m{}", i)).collect();
    let member_refs: Vec<&str> = members.iter().map(String::as_str).collect();
    let result = san_result(vec![fabric("FAB_A")], vec![], vec![zone("big", "FAB_A", &member_refs)]);
    let importer = fixture_importer(&db_path, result);

    let summary = importer.preview(INPUT, CUSTOMER_ID, None).unwrap();
    assert_eq!(summary.zones[0].members.len(), 10);
    assert_eq!(summary.zones[0].member_count, 12);

    insert_test_config(&db_path, config_keys::PREVIEW_MEMBER_LIMIT, "3").unwrap();
    let summary = importer.preview(INPUT, CUSTOMER_ID, None).unwrap();
    assert_eq!(summary.zones[0].members, vec!["m0", "m1", "m2"]);
    assert_eq!(summary.zones[0].member_count, 12);
}

#[test]
fn test_preview_reports_conflicts() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let result = san_result(
        vec![fabric("FAB_A")],
        vec![alias("h", "FAB_A", &[W1])],
        vec![zone("z", "FAB_A", &["h"])],
    );
    fixture_importer(&db_path, result)
        .commit(INPUT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    let incoming = san_result(
        vec![fabric("FAB_B")],
        vec![alias("h", "FAB_B", &[W2]), alias("new", "FAB_B", &[W3])],
        vec![zone("z", "FAB_B", &["h", "new"])],
    );
    let importer = fixture_importer(&db_path, incoming);

    let conflicts = importer
        .preview(INPUT, CUSTOMER_ID, None)
        .unwrap()
        .conflicts
        .unwrap();
    assert_eq!(conflicts.aliases.len(), 1);
    assert_eq!(conflicts.aliases[0].name, "h");
    assert_eq!(conflicts.aliases[0].existing[0].fabric_name, "FAB_A");
    assert_eq!(conflicts.aliases[0].existing[0].wwpns, vec![W1.to_string()]);
    assert_eq!(conflicts.aliases[0].new_wwpns, vec![W2.to_string()]);
    assert_eq!(conflicts.zones.len(), 1);
    assert_eq!(conflicts.zones[0].existing[0].member_count, 1);
    assert_eq!(conflicts.zones[0].new_member_count, 2);

    // 其他客户不冲突
    let other = importer.preview(INPUT, 2, None).unwrap();
    assert!(other.conflicts.unwrap().is_empty());

    // 显式关闭 / 配置关闭
    assert!(importer
        .preview(INPUT, CUSTOMER_ID, Some(false))
        .unwrap()
        .conflicts
        .is_none());
    insert_test_config(&db_path, config_keys::PREVIEW_CHECK_CONFLICTS, "false").unwrap();
    assert!(importer
        .preview(INPUT, CUSTOMER_ID, None)
        .unwrap()
        .conflicts
        .is_none());
}

#[test]
fn test_unknown_input_is_rejected() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = fixture_importer(&db_path, ParseResult::new(ImportType::San));

    let err = importer.preview("something else", CUSTOMER_ID, None).unwrap_err();
    assert!(matches!(err, ImportError::FormatUnsupported(_)));
}
