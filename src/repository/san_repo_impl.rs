// ==========================================
// SAN 配置导入 - 库存 Repository 实现
// ==========================================
// 职责: 实现 SanRepository / SanStore（使用 rusqlite）
// 事务: unchecked_transaction + 每实体 SAVEPOINT
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::inventory::{AliasRecord, FabricRecord, UpsertOutcome, ZoneMemberLink, ZoneRecord};
use crate::domain::parsed::{
    ParsedAlias, ParsedFabric, ParsedHost, ParsedPort, ParsedStorageSystem, ParsedSwitch,
    ParsedVolume, ParsedZone,
};
use crate::domain::types::{AliasKind, PortUse, Vendor, ZoneKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::san_repo::{SanRepository, SanStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

fn now() -> String {
    Utc::now().to_rfc3339()
}

const ALIAS_SELECT: &str = r#"
    SELECT a.alias_id, a.fabric_id, f.name, a.name, a.alias_type, a.use_type
    FROM alias a
    JOIN fabric f ON f.fabric_id = a.fabric_id
"#;

const FABRIC_SELECT: &str = r#"
    SELECT fabric_id, customer_id, name, zoneset_name, vsan, vendor
    FROM fabric
"#;

// 历史数据可能写入未知枚举值，读取时回退到默认值
fn map_alias_row(row: &Row) -> rusqlite::Result<AliasRecord> {
    let alias_type: String = row.get(4)?;
    let use_type: Option<String> = row.get(5)?;
    Ok(AliasRecord {
        alias_id: row.get(0)?,
        fabric_id: row.get(1)?,
        fabric_name: row.get(2)?,
        name: row.get(3)?,
        alias_type: AliasKind::parse(&alias_type).unwrap_or(AliasKind::Fcalias),
        use_type: use_type.as_deref().and_then(PortUse::parse),
        wwpns: Vec::new(),
    })
}

fn map_fabric_row(row: &Row) -> rusqlite::Result<FabricRecord> {
    let vendor: Option<String> = row.get(5)?;
    Ok(FabricRecord {
        fabric_id: row.get(0)?,
        customer_id: row.get(1)?,
        name: row.get(2)?,
        zoneset_name: row.get(3)?,
        vsan: row.get(4)?,
        vendor: vendor.as_deref().and_then(Vendor::from_code),
    })
}

fn load_alias_wwpns(conn: &Connection, alias_id: i64) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare_cached("SELECT wwpn FROM alias_wwpn WHERE alias_id = ?1 ORDER BY position")?;
    let rows = stmt.query_map(params![alias_id], |row| row.get::<_, String>(0))?;
    rows.collect()
}

fn with_wwpns(conn: &Connection, record: Option<AliasRecord>) -> RepositoryResult<Option<AliasRecord>> {
    match record {
        Some(mut record) => {
            record.wwpns = load_alias_wwpns(conn, record.alias_id)?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

fn validate_savepoint_name(name: &str) -> RepositoryResult<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RepositoryError::FieldValueError {
            field: "savepoint".to_string(),
            message: format!("非法保存点名称: {}", name),
        });
    }
    Ok(())
}

// ==========================================
// SqliteSanRepository
// ==========================================
pub struct SqliteSanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSanRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（需已建表，见 db::init_schema）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl SanRepository for SqliteSanRepository {
    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SanStore) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let store = SqliteStore { conn: &tx };
        match f(&store) {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "事务回滚失败");
                }
                Err(err)
            }
        }
    }

    fn list_aliases_by_names(
        &self,
        customer_id: i64,
        names: &[String],
    ) -> RepositoryResult<Vec<AliasRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE f.customer_id = ?1 AND a.name = ?2 ORDER BY a.alias_id",
            ALIAS_SELECT
        );
        let mut stmt = conn.prepare(&sql)?;

        let mut records = Vec::new();
        for name in names {
            let rows = stmt.query_map(params![customer_id, name], map_alias_row)?;
            for row in rows {
                let mut record = row?;
                record.wwpns = load_alias_wwpns(&conn, record.alias_id)?;
                records.push(record);
            }
        }
        Ok(records)
    }

    fn list_zones_by_names(
        &self,
        customer_id: i64,
        names: &[String],
    ) -> RepositoryResult<Vec<ZoneRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT z.zone_id, z.fabric_id, f.name, z.name, z.zone_type,
                   (SELECT COUNT(*) FROM zone_member m WHERE m.zone_id = z.zone_id)
            FROM zone z
            JOIN fabric f ON f.fabric_id = z.fabric_id
            WHERE f.customer_id = ?1 AND z.name = ?2
            ORDER BY z.zone_id
            "#,
        )?;

        let mut records = Vec::new();
        for name in names {
            let rows = stmt.query_map(params![customer_id, name], |row| {
                let zone_type: String = row.get(4)?;
                let member_count: i64 = row.get(5)?;
                Ok(ZoneRecord {
                    zone_id: row.get(0)?,
                    fabric_id: row.get(1)?,
                    fabric_name: row.get(2)?,
                    name: row.get(3)?,
                    zone_type: ZoneKind::parse(&zone_type).unwrap_or_default(),
                    member_count: member_count.max(0) as usize,
                })
            })?;
            for row in rows {
                records.push(row?);
            }
        }
        Ok(records)
    }

    fn find_fabric(&self, customer_id: i64, fabric_id: i64) -> RepositoryResult<Option<FabricRecord>> {
        let conn = self.get_conn()?;
        SqliteStore { conn: &*conn }.find_fabric_by_id(customer_id, fabric_id)
    }
}

// ==========================================
// SqliteStore - 事务内操作
// ==========================================
struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl SqliteStore<'_> {
    fn find_id(&self, sql: &str, params: impl rusqlite::Params) -> RepositoryResult<Option<i64>> {
        Ok(self
            .conn
            .query_row(sql, params, |row| row.get::<_, i64>(0))
            .optional()?)
    }

    fn replace_host_wwpns(&self, host_pk: i64, wwpns: &[String]) -> RepositoryResult<()> {
        self.conn
            .execute("DELETE FROM host_wwpn WHERE host_pk = ?1", params![host_pk])?;
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO host_wwpn (host_pk, position, wwpn) VALUES (?1, ?2, ?3)")?;
        for (position, wwpn) in wwpns.iter().enumerate() {
            stmt.execute(params![host_pk, position as i64, wwpn])?;
        }
        Ok(())
    }
}

impl SanStore for SqliteStore<'_> {
    fn find_fabric_by_id(
        &self,
        customer_id: i64,
        fabric_id: i64,
    ) -> RepositoryResult<Option<FabricRecord>> {
        let sql = format!("{} WHERE customer_id = ?1 AND fabric_id = ?2", FABRIC_SELECT);
        Ok(self
            .conn
            .query_row(&sql, params![customer_id, fabric_id], map_fabric_row)
            .optional()?)
    }

    fn get_or_create_fabric(
        &self,
        customer_id: i64,
        fabric: &ParsedFabric,
    ) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let existing = self.find_id(
            "SELECT fabric_id FROM fabric WHERE customer_id = ?1 AND name = ?2",
            params![customer_id, fabric.name],
        )?;

        match existing {
            Some(fabric_id) => {
                self.conn.execute(
                    r#"
                    UPDATE fabric
                    SET zoneset_name = COALESCE(?1, zoneset_name),
                        vsan = COALESCE(?2, vsan),
                        vendor = ?3,
                        exists_flag = ?4,
                        updated_at = ?5
                    WHERE fabric_id = ?6
                    "#,
                    params![
                        fabric.zoneset_name,
                        fabric.vsan,
                        fabric.vendor.code(),
                        fabric.exists,
                        now,
                        fabric_id
                    ],
                )?;
                Ok(UpsertOutcome::Updated(fabric_id))
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO fabric (customer_id, name, zoneset_name, vsan, vendor,
                                        exists_flag, notes, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                    "#,
                    params![
                        customer_id,
                        fabric.name,
                        fabric.zoneset_name,
                        fabric.vsan,
                        fabric.vendor.code(),
                        fabric.exists,
                        fabric.notes,
                        now
                    ],
                )?;
                Ok(UpsertOutcome::Created(self.conn.last_insert_rowid()))
            }
        }
    }

    fn alias_name_exists(&self, customer_id: i64, name: &str) -> RepositoryResult<bool> {
        let found = self.find_id(
            r#"
            SELECT a.alias_id FROM alias a
            JOIN fabric f ON f.fabric_id = a.fabric_id
            WHERE f.customer_id = ?1 AND a.name = ?2
            LIMIT 1
            "#,
            params![customer_id, name],
        )?;
        Ok(found.is_some())
    }

    fn delete_aliases_by_name(&self, customer_id: i64, name: &str) -> RepositoryResult<usize> {
        let deleted = self.conn.execute(
            r#"
            DELETE FROM alias
            WHERE name = ?2
              AND fabric_id IN (SELECT fabric_id FROM fabric WHERE customer_id = ?1)
            "#,
            params![customer_id, name],
        )?;
        debug!(customer_id, name, deleted, "删除同名别名");
        Ok(deleted)
    }

    fn get_or_create_alias(
        &self,
        fabric_id: i64,
        alias: &ParsedAlias,
    ) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let use_type = alias.use_type.map(|u| u.as_str());
        let existing = self.find_id(
            "SELECT alias_id FROM alias WHERE fabric_id = ?1 AND name = ?2",
            params![fabric_id, alias.name],
        )?;

        let outcome = match existing {
            Some(alias_id) => {
                self.conn.execute(
                    r#"
                    UPDATE alias
                    SET alias_type = ?1, use_type = COALESCE(?2, use_type), updated_at = ?3
                    WHERE alias_id = ?4
                    "#,
                    params![alias.alias_type.as_str(), use_type, now, alias_id],
                )?;
                UpsertOutcome::Updated(alias_id)
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO alias (fabric_id, name, alias_type, use_type, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                    "#,
                    params![fabric_id, alias.name, alias.alias_type.as_str(), use_type, now],
                )?;
                UpsertOutcome::Created(self.conn.last_insert_rowid())
            }
        };

        // WWPN 关联整体替换
        let alias_id = outcome.id();
        self.conn
            .execute("DELETE FROM alias_wwpn WHERE alias_id = ?1", params![alias_id])?;
        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO alias_wwpn (alias_id, position, wwpn) VALUES (?1, ?2, ?3)")?;
        for (position, wwpn) in alias.wwpns.iter().enumerate() {
            stmt.execute(params![alias_id, position as i64, wwpn])?;
        }

        Ok(outcome)
    }

    fn find_alias_by_name(
        &self,
        customer_id: i64,
        fabric_id: i64,
        name: &str,
    ) -> RepositoryResult<Option<AliasRecord>> {
        let sql = format!(
            "{} WHERE f.customer_id = ?1 AND a.name = ?2 ORDER BY (a.fabric_id = ?3) DESC, a.alias_id LIMIT 1",
            ALIAS_SELECT
        );
        let record = self
            .conn
            .query_row(&sql, params![customer_id, name, fabric_id], map_alias_row)
            .optional()?;
        with_wwpns(self.conn, record)
    }

    fn find_alias_by_wwpn(&self, fabric_id: i64, wwpn: &str) -> RepositoryResult<Option<AliasRecord>> {
        let sql = format!(
            "{} JOIN alias_wwpn w ON w.alias_id = a.alias_id \
             WHERE a.fabric_id = ?1 AND w.wwpn = ?2 ORDER BY w.position, a.alias_id LIMIT 1",
            ALIAS_SELECT
        );
        let record = self
            .conn
            .query_row(&sql, params![fabric_id, wwpn], map_alias_row)
            .optional()?;
        with_wwpns(self.conn, record)
    }

    fn zone_name_exists(&self, customer_id: i64, name: &str) -> RepositoryResult<bool> {
        let found = self.find_id(
            r#"
            SELECT z.zone_id FROM zone z
            JOIN fabric f ON f.fabric_id = z.fabric_id
            WHERE f.customer_id = ?1 AND z.name = ?2
            LIMIT 1
            "#,
            params![customer_id, name],
        )?;
        Ok(found.is_some())
    }

    fn delete_zones_by_name(&self, customer_id: i64, name: &str) -> RepositoryResult<usize> {
        let deleted = self.conn.execute(
            r#"
            DELETE FROM zone
            WHERE name = ?2
              AND fabric_id IN (SELECT fabric_id FROM fabric WHERE customer_id = ?1)
            "#,
            params![customer_id, name],
        )?;
        debug!(customer_id, name, deleted, "删除同名 zone");
        Ok(deleted)
    }

    fn get_or_create_zone(
        &self,
        fabric_id: i64,
        zone: &ParsedZone,
        members: &[ZoneMemberLink],
    ) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let existing = self.find_id(
            "SELECT zone_id FROM zone WHERE fabric_id = ?1 AND name = ?2",
            params![fabric_id, zone.name],
        )?;

        let outcome = match existing {
            Some(zone_id) => {
                self.conn.execute(
                    "UPDATE zone SET zone_type = ?1, updated_at = ?2 WHERE zone_id = ?3",
                    params![zone.zone_type.as_str(), now, zone_id],
                )?;
                UpsertOutcome::Updated(zone_id)
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO zone (fabric_id, name, zone_type, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?4)
                    "#,
                    params![fabric_id, zone.name, zone.zone_type.as_str(), now],
                )?;
                UpsertOutcome::Created(self.conn.last_insert_rowid())
            }
        };

        // 成员整体替换
        let zone_id = outcome.id();
        self.conn
            .execute("DELETE FROM zone_member WHERE zone_id = ?1", params![zone_id])?;
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO zone_member (zone_id, position, alias_id, member_use) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, member) in members.iter().enumerate() {
            stmt.execute(params![
                zone_id,
                position as i64,
                member.alias_id,
                member.member_use.map(|u| u.as_str())
            ])?;
        }

        Ok(outcome)
    }

    fn upsert_switch(
        &self,
        customer_id: i64,
        fabric_id: Option<i64>,
        switch: &ParsedSwitch,
    ) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let existing = match &switch.wwnn {
            Some(wwnn) => self.find_id(
                "SELECT switch_id FROM switch WHERE customer_id = ?1 AND wwnn = ?2",
                params![customer_id, wwnn],
            )?,
            None => self.find_id(
                "SELECT switch_id FROM switch WHERE customer_id = ?1 AND name = ?2",
                params![customer_id, switch.name],
            )?,
        };
        let vendor = switch.vendor.map(|v| v.code());

        match existing {
            Some(switch_id) => {
                self.conn.execute(
                    r#"
                    UPDATE switch
                    SET fabric_id = COALESCE(?1, fabric_id), name = ?2, wwnn = COALESCE(?3, wwnn),
                        model = ?4, serial_number = ?5, firmware_version = ?6, ip_address = ?7,
                        domain_id = ?8, vendor = ?9, is_active = ?10, location = ?11, updated_at = ?12
                    WHERE switch_id = ?13
                    "#,
                    params![
                        fabric_id,
                        switch.name,
                        switch.wwnn,
                        switch.model,
                        switch.serial_number,
                        switch.firmware_version,
                        switch.ip_address,
                        switch.domain_id,
                        vendor,
                        switch.is_active,
                        switch.location,
                        now,
                        switch_id
                    ],
                )?;
                Ok(UpsertOutcome::Updated(switch_id))
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO switch (customer_id, fabric_id, name, wwnn, model, serial_number,
                                        firmware_version, ip_address, domain_id, vendor, is_active,
                                        location, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
                    "#,
                    params![
                        customer_id,
                        fabric_id,
                        switch.name,
                        switch.wwnn,
                        switch.model,
                        switch.serial_number,
                        switch.firmware_version,
                        switch.ip_address,
                        switch.domain_id,
                        vendor,
                        switch.is_active,
                        switch.location,
                        now
                    ],
                )?;
                Ok(UpsertOutcome::Created(self.conn.last_insert_rowid()))
            }
        }
    }

    fn upsert_storage_system(
        &self,
        customer_id: i64,
        system: &ParsedStorageSystem,
    ) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let existing = self.find_id(
            "SELECT storage_id FROM storage_system WHERE customer_id = ?1 AND storage_system_id = ?2",
            params![customer_id, system.storage_system_id],
        )?;

        match existing {
            Some(storage_id) => {
                self.conn.execute(
                    r#"
                    UPDATE storage_system
                    SET name = ?1, storage_type = ?2, vendor = ?3, model = ?4, machine_type = ?5,
                        serial_number = ?6, firmware_version = ?7, wwnn = ?8, ip_address = ?9,
                        location = ?10, condition = ?11, status = ?12, capacity_bytes = ?13,
                        used_capacity_bytes = ?14, available_capacity_bytes = ?15,
                        volume_count = ?16, host_count = ?17, updated_at = ?18
                    WHERE storage_id = ?19
                    "#,
                    params![
                        system.name,
                        system.storage_type,
                        system.vendor,
                        system.model,
                        system.machine_type,
                        system.serial_number,
                        system.firmware_version,
                        system.wwnn,
                        system.ip_address,
                        system.location,
                        system.condition,
                        system.status,
                        system.capacity_bytes,
                        system.used_capacity_bytes,
                        system.available_capacity_bytes,
                        system.volume_count,
                        system.host_count,
                        now,
                        storage_id
                    ],
                )?;
                Ok(UpsertOutcome::Updated(storage_id))
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO storage_system (
                        customer_id, storage_system_id, name, storage_type, vendor, model,
                        machine_type, serial_number, firmware_version, wwnn, ip_address, location,
                        condition, status, capacity_bytes, used_capacity_bytes,
                        available_capacity_bytes, volume_count, host_count, created_at, updated_at
                    ) VALUES (
                        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                        ?17, ?18, ?19, ?20, ?20
                    )
                    "#,
                    params![
                        customer_id,
                        system.storage_system_id,
                        system.name,
                        system.storage_type,
                        system.vendor,
                        system.model,
                        system.machine_type,
                        system.serial_number,
                        system.firmware_version,
                        system.wwnn,
                        system.ip_address,
                        system.location,
                        system.condition,
                        system.status,
                        system.capacity_bytes,
                        system.used_capacity_bytes,
                        system.available_capacity_bytes,
                        system.volume_count,
                        system.host_count,
                        now
                    ],
                )?;
                Ok(UpsertOutcome::Created(self.conn.last_insert_rowid()))
            }
        }
    }

    fn upsert_volume(&self, storage_id: i64, volume: &ParsedVolume) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let existing = self.find_id(
            "SELECT volume_pk FROM volume WHERE storage_id = ?1 AND volume_id = ?2",
            params![storage_id, volume.volume_id],
        )?;

        match existing {
            Some(volume_pk) => {
                self.conn.execute(
                    r#"
                    UPDATE volume
                    SET name = ?1, pool_name = ?2, capacity_bytes = ?3, used_capacity_bytes = ?4,
                        thin_provisioned = ?5, status = ?6, natural_key = ?7, updated_at = ?8
                    WHERE volume_pk = ?9
                    "#,
                    params![
                        volume.name,
                        volume.pool_name,
                        volume.capacity_bytes,
                        volume.used_capacity_bytes,
                        volume.thin_provisioned,
                        volume.status,
                        volume.natural_key,
                        now,
                        volume_pk
                    ],
                )?;
                Ok(UpsertOutcome::Updated(volume_pk))
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO volume (storage_id, volume_id, name, pool_name, capacity_bytes,
                                        used_capacity_bytes, thin_provisioned, status, natural_key,
                                        updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        storage_id,
                        volume.volume_id,
                        volume.name,
                        volume.pool_name,
                        volume.capacity_bytes,
                        volume.used_capacity_bytes,
                        volume.thin_provisioned,
                        volume.status,
                        volume.natural_key,
                        now
                    ],
                )?;
                Ok(UpsertOutcome::Created(self.conn.last_insert_rowid()))
            }
        }
    }

    fn upsert_host(&self, storage_id: i64, host: &ParsedHost) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let existing = self.find_id(
            "SELECT host_pk FROM host WHERE storage_id = ?1 AND name = ?2",
            params![storage_id, host.name],
        )?;

        let outcome = match existing {
            Some(host_pk) => {
                self.conn.execute(
                    r#"
                    UPDATE host
                    SET host_id = ?1, host_type = ?2, status = ?3, volume_count = ?4, updated_at = ?5
                    WHERE host_pk = ?6
                    "#,
                    params![host.host_id, host.host_type, host.status, host.volume_count, now, host_pk],
                )?;
                UpsertOutcome::Updated(host_pk)
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO host (storage_id, host_id, name, host_type, status, volume_count, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        storage_id,
                        host.host_id,
                        host.name,
                        host.host_type,
                        host.status,
                        host.volume_count,
                        now
                    ],
                )?;
                UpsertOutcome::Created(self.conn.last_insert_rowid())
            }
        };

        self.replace_host_wwpns(outcome.id(), &host.wwpns)?;
        Ok(outcome)
    }

    fn upsert_port(&self, storage_id: i64, port: &ParsedPort) -> RepositoryResult<UpsertOutcome> {
        let now = now();
        let use_type = port.use_type.map(|u| u.as_str());
        let existing = self.find_id(
            "SELECT port_pk FROM storage_port WHERE storage_id = ?1 AND port_id = ?2",
            params![storage_id, port.port_id],
        )?;

        match existing {
            Some(port_pk) => {
                self.conn.execute(
                    r#"
                    UPDATE storage_port
                    SET name = ?1, wwpn = ?2, port_type = ?3, speed = ?4, status = ?5,
                        location = ?6, use_type = ?7, updated_at = ?8
                    WHERE port_pk = ?9
                    "#,
                    params![
                        port.name,
                        port.wwpn,
                        port.port_type,
                        port.speed,
                        port.status,
                        port.location,
                        use_type,
                        now,
                        port_pk
                    ],
                )?;
                Ok(UpsertOutcome::Updated(port_pk))
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO storage_port (storage_id, port_id, name, wwpn, port_type, speed,
                                              status, location, use_type, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        storage_id,
                        port.port_id,
                        port.name,
                        port.wwpn,
                        port.port_type,
                        port.speed,
                        port.status,
                        port.location,
                        use_type,
                        now
                    ],
                )?;
                Ok(UpsertOutcome::Created(self.conn.last_insert_rowid()))
            }
        }
    }

    fn savepoint(&self, name: &str) -> RepositoryResult<()> {
        validate_savepoint_name(name)?;
        self.conn.execute_batch(&format!("SAVEPOINT {}", name))?;
        Ok(())
    }

    fn release_savepoint(&self, name: &str) -> RepositoryResult<()> {
        validate_savepoint_name(name)?;
        self.conn.execute_batch(&format!("RELEASE SAVEPOINT {}", name))?;
        Ok(())
    }

    fn rollback_to_savepoint(&self, name: &str) -> RepositoryResult<()> {
        validate_savepoint_name(name)?;
        // ROLLBACK TO 不弹出保存点，随后需 RELEASE
        self.conn
            .execute_batch(&format!("ROLLBACK TO SAVEPOINT {0}; RELEASE SAVEPOINT {0}", name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::domain::types::{AliasKind, Vendor, ZoneKind};
    use std::collections::BTreeMap;

    fn repo() -> SqliteSanRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        SqliteSanRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn alias(name: &str, wwpns: &[&str]) -> ParsedAlias {
        ParsedAlias {
            name: name.to_string(),
            wwpns: wwpns.iter().map(|w| w.to_string()).collect(),
            alias_type: AliasKind::Fcalias,
            use_type: None,
            fabric_name: "FAB_A".to_string(),
        }
    }

    #[test]
    fn test_alias_get_or_create_replaces_wwpns() {
        let repo = repo();
        let record = repo
            .in_transaction(|store| -> RepositoryResult<_> {
                let fabric_id = store
                    .get_or_create_fabric(1, &ParsedFabric::new("FAB_A", Vendor::Brocade))?
                    .id();
                let first = store.get_or_create_alias(
                    fabric_id,
                    &alias("host1", &["10:00:00:00:c9:00:00:01", "10:00:00:00:c9:00:00:02"]),
                )?;
                let second =
                    store.get_or_create_alias(fabric_id, &alias("host1", &["10:00:00:00:c9:00:00:03"]))?;
                assert!(first.is_created());
                assert_eq!(second, UpsertOutcome::Updated(first.id()));
                store.find_alias_by_name(1, fabric_id, "host1")
            })
            .unwrap()
            .unwrap();

        assert_eq!(record.wwpns, vec!["10:00:00:00:c9:00:00:03".to_string()]);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let repo = repo();
        let result: RepositoryResult<()> = repo.in_transaction(|store| {
            store.get_or_create_fabric(1, &ParsedFabric::new("FAB_A", Vendor::Brocade))?;
            Err(RepositoryError::Other(anyhow::anyhow!("boom")))
        });
        assert!(result.is_err());

        let found = repo
            .in_transaction(|store| -> RepositoryResult<_> {
                store.get_or_create_fabric(1, &ParsedFabric::new("FAB_A", Vendor::Brocade))
            })
            .unwrap();
        assert!(found.is_created());
    }

    #[test]
    fn test_delete_alias_cascades_to_zone_members() {
        let repo = repo();
        repo.in_transaction(|store| -> RepositoryResult<()> {
            let fabric_id = store
                .get_or_create_fabric(1, &ParsedFabric::new("FAB_A", Vendor::Brocade))?
                .id();
            let alias_id = store
                .get_or_create_alias(fabric_id, &alias("host1", &["10:00:00:00:c9:00:00:01"]))?
                .id();
            let zone = ParsedZone {
                name: "z1".to_string(),
                members: vec!["host1".to_string()],
                zone_type: ZoneKind::Standard,
                member_types: BTreeMap::new(),
                fabric_name: "FAB_A".to_string(),
            };
            store.get_or_create_zone(
                fabric_id,
                &zone,
                &[ZoneMemberLink {
                    alias_id,
                    member_use: None,
                }],
            )?;
            assert_eq!(store.delete_aliases_by_name(1, "host1")?, 1);
            Ok(())
        })
        .unwrap();

        let zones = repo.list_zones_by_names(1, &["z1".to_string()]).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].member_count, 0);
    }

    #[test]
    fn test_savepoint_rollback_discards_partial_writes() {
        let repo = repo();
        repo.in_transaction(|store| -> RepositoryResult<()> {
            let fabric_id = store
                .get_or_create_fabric(1, &ParsedFabric::new("FAB_A", Vendor::Brocade))?
                .id();
            store.savepoint("sp_alias")?;
            store.get_or_create_alias(fabric_id, &alias("host1", &["10:00:00:00:c9:00:00:01"]))?;
            store.rollback_to_savepoint("sp_alias")?;
            assert!(!store.alias_name_exists(1, "host1")?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_invalid_savepoint_name_rejected() {
        assert!(validate_savepoint_name("sp; DROP TABLE alias").is_err());
        assert!(validate_savepoint_name("sp_alias_1").is_ok());
    }
}
