// ==========================================
// Cisco 导入集成测试
// ==========================================
// 测试目标: tech-support / running-config 经注册表检测、预览、提交的完整流程
// ==========================================

mod test_helpers;

use rusqlite::{params, Connection};
use san_import::domain::types::ZoneKind;
use san_import::importer::ConflictResolutions;
use san_import::logging;
use test_helpers::{
    alias_names, count_rows, create_test_db, create_test_importer, zone_member_names, CUSTOMER_ID,
};

const TECH_SUPPORT: &str = include_str!("fixtures/cisco_tech_support.txt");
const RUNNING_CONFIG: &str = include_str!("fixtures/cisco_running_config.txt");

#[test]
fn test_detect_reports_cisco() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    assert_eq!(importer.detect(TECH_SUPPORT).unwrap(), "cisco");
    assert_eq!(importer.detect(RUNNING_CONFIG).unwrap(), "cisco");
}

#[test]
fn test_tech_support_preview() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let summary = importer.preview(TECH_SUPPORT, CUSTOMER_ID, None).unwrap();

    assert_eq!(summary.parser, "cisco");
    assert_eq!(
        summary.metadata.get("format").and_then(|v| v.as_str()),
        Some("cisco_tech_support")
    );

    // vsan1 没有别名/zone 被过滤；vsan99 非 active
    assert_eq!(summary.fabrics.len(), 1);
    assert_eq!(summary.fabrics[0].name, "vsan75");
    assert_eq!(summary.fabrics[0].zoneset_name.as_deref(), Some("ZS_PROD"));
    assert!(summary.warnings.iter().any(|w| w.contains("已跳过 1 个")));
    assert!(summary.warnings.iter().any(|w| w.contains("VSAN 99")));
    assert!(summary.warnings.iter().any(|w| w.contains("device-alias")));

    assert_eq!(summary.counts.aliases, 4);
    assert_eq!(summary.counts.zones, 3);

    let esx_zone = summary.zones.iter().find(|z| z.name == "z_esx").unwrap();
    assert_eq!(esx_zone.member_count, 2);
    assert_eq!(esx_zone.members[0], "esx_cluster");
    let esx_alias = summary
        .aliases
        .iter()
        .find(|a| a.name == "esx_cluster")
        .unwrap();
    assert_eq!(esx_alias.wwpns.len(), 2);
    assert!(!summary.warnings.iter().any(|w| w.contains("没有成员")));

    let peer = summary.zones.iter().find(|z| z.name == "z_peer").unwrap();
    assert_eq!(peer.zone_type, ZoneKind::Peer);
    assert_eq!(peer.member_types.len(), 2);

    let switch = &summary.switches[0];
    assert_eq!(switch.name, "mds-core-01");
    assert_eq!(switch.model.as_deref(), Some("MDS 9148S"));
    assert_eq!(switch.firmware_version.as_deref(), Some("8.4(2c)"));
    assert_eq!(switch.serial_number.as_deref(), Some("JAF1234ABCD"));
    assert_eq!(switch.wwnn.as_deref(), Some("20:00:00:de:fb:11:22:33"));

    // 空库无冲突
    assert!(summary.conflicts.unwrap().is_empty());

    // 预览无副作用
    assert_eq!(count_rows(&db_path, "fabric"), 0);
    assert_eq!(count_rows(&db_path, "alias"), 0);
}

#[test]
fn test_tech_support_commit_and_reimport() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);
    let resolutions = ConflictResolutions::default();

    let first = importer
        .commit(TECH_SUPPORT, CUSTOMER_ID, None, &resolutions)
        .unwrap();

    assert_eq!(first.fabrics_created, 1);
    assert_eq!(first.created, 6); // 3 别名 + 3 zone
    assert_eq!(first.wwpn_aliases_created, 2);
    assert_eq!(first.switches_created, 1);
    assert!(first.finished_at.is_some());
    assert!(first.warnings.iter().any(|w| w.contains("orphan_hba")));

    assert_eq!(count_rows(&db_path, "alias"), 5);
    assert_eq!(count_rows(&db_path, "zone"), 3);
    assert_eq!(
        zone_member_names(&db_path, "z_peer"),
        vec!["host1_hba0".to_string(), "50:06:01:60:3b:20:11:23".to_string()]
    );
    assert_eq!(
        zone_member_names(&db_path, "z_esx"),
        vec!["esx_cluster".to_string(), "50:0a:09:81:00:00:00:01".to_string()]
    );

    // 同一输入再导入: 全部更新，不产生重复
    let second = importer
        .commit(TECH_SUPPORT, CUSTOMER_ID, None, &resolutions)
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 6);
    assert_eq!(second.fabrics_updated, 1);
    assert_eq!(second.switches_updated, 1);
    assert_eq!(second.wwpn_aliases_created, 0);
    assert_ne!(first.import_id, second.import_id);

    assert_eq!(count_rows(&db_path, "alias"), 5);
    assert_eq!(count_rows(&db_path, "zone"), 3);
    assert_eq!(count_rows(&db_path, "switch"), 1);
}

#[test]
fn test_peer_zone_member_use_persisted() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    importer
        .commit(TECH_SUPPORT, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    let conn = Connection::open(&db_path).unwrap();
    let uses: Vec<Option<String>> = conn
        .prepare(
            "SELECT m.member_use FROM zone_member m JOIN zone z ON z.zone_id = m.zone_id
             WHERE z.name = ?1 ORDER BY m.position",
        )
        .unwrap()
        .query_map(params!["z_peer"], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(uses, vec![Some("init".to_string()), Some("target".to_string())]);
}

#[test]
fn test_running_config_zone_member_fallback() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_test_importer(&db_path);

    let stats = importer
        .commit(RUNNING_CONFIG, CUSTOMER_ID, None, &ConflictResolutions::default())
        .unwrap();

    assert_eq!(stats.wwpn_aliases_created, 1);
    assert_eq!(
        zone_member_names(&db_path, "z_raw"),
        vec!["10:00:00:00:c9:77:77:77".to_string(), "array_spa0".to_string()]
    );

    let conn = Connection::open(&db_path).unwrap();
    let (alias_type, use_type): (String, Option<String>) = conn
        .query_row(
            "SELECT alias_type, use_type FROM alias WHERE name = ?1",
            params!["10:00:00:00:c9:77:77:77"],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(alias_type, "wwpn");
    assert_eq!(use_type.as_deref(), Some("init"));

    let names = alias_names(&db_path);
    assert!(names.contains(&"esx_cluster".to_string()));
    assert!(names.contains(&"host1_hba0".to_string()));
}
