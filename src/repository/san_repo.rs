// ==========================================
// SAN 配置导入 - 库存 Repository Trait
// ==========================================
// 职责: 定义导入编排器依赖的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含冲突策略，只做 CRUD 与唯一性
// 实现者: SqliteSanRepository（使用 rusqlite）
// ==========================================

use crate::domain::inventory::{AliasRecord, FabricRecord, UpsertOutcome, ZoneMemberLink, ZoneRecord};
use crate::domain::parsed::{
    ParsedAlias, ParsedFabric, ParsedHost, ParsedPort, ParsedStorageSystem, ParsedSwitch,
    ParsedVolume, ParsedZone,
};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// SanStore - 事务内操作
// ==========================================
// 只能通过 SanRepository::in_transaction 获得
pub trait SanStore {
    // ===== Fabric =====

    /// 按 ID 查询客户下的 Fabric
    fn find_fabric_by_id(&self, customer_id: i64, fabric_id: i64)
        -> RepositoryResult<Option<FabricRecord>>;

    /// 按 (customer, name) get-or-create
    ///
    /// 已存在时刷新 zoneset_name / vsan / vendor
    fn get_or_create_fabric(
        &self,
        customer_id: i64,
        fabric: &ParsedFabric,
    ) -> RepositoryResult<UpsertOutcome>;

    // ===== 别名 =====

    /// 客户范围内是否存在同名别名
    fn alias_name_exists(&self, customer_id: i64, name: &str) -> RepositoryResult<bool>;

    /// 删除客户范围内所有同名别名（级联删除 WWPN 与 zone 成员）
    fn delete_aliases_by_name(&self, customer_id: i64, name: &str) -> RepositoryResult<usize>;

    /// 按 (fabric, name) get-or-create
    ///
    /// WWPN 列表整体替换为 alias.wwpns（保持顺序）
    fn get_or_create_alias(&self, fabric_id: i64, alias: &ParsedAlias)
        -> RepositoryResult<UpsertOutcome>;

    /// 按名称查找别名（客户范围；同 Fabric 优先）
    fn find_alias_by_name(
        &self,
        customer_id: i64,
        fabric_id: i64,
        name: &str,
    ) -> RepositoryResult<Option<AliasRecord>>;

    /// 按 WWPN 查找 Fabric 内的别名
    fn find_alias_by_wwpn(&self, fabric_id: i64, wwpn: &str) -> RepositoryResult<Option<AliasRecord>>;

    // ===== Zone =====

    fn zone_name_exists(&self, customer_id: i64, name: &str) -> RepositoryResult<bool>;

    fn delete_zones_by_name(&self, customer_id: i64, name: &str) -> RepositoryResult<usize>;

    /// 按 (fabric, name) get-or-create
    ///
    /// 成员列表整体替换为 members（保持顺序）
    fn get_or_create_zone(
        &self,
        fabric_id: i64,
        zone: &ParsedZone,
        members: &[ZoneMemberLink],
    ) -> RepositoryResult<UpsertOutcome>;

    // ===== 交换机 / 存储 =====

    /// 按 (customer, wwnn) upsert；wwnn 缺失时按 (customer, name)
    fn upsert_switch(
        &self,
        customer_id: i64,
        fabric_id: Option<i64>,
        switch: &ParsedSwitch,
    ) -> RepositoryResult<UpsertOutcome>;

    /// 按 (customer, storage_system_id) upsert
    fn upsert_storage_system(
        &self,
        customer_id: i64,
        system: &ParsedStorageSystem,
    ) -> RepositoryResult<UpsertOutcome>;

    /// 按 (storage, volume_id) upsert
    fn upsert_volume(&self, storage_id: i64, volume: &ParsedVolume) -> RepositoryResult<UpsertOutcome>;

    /// 按 (storage, name) upsert，WWPN 列表整体替换
    fn upsert_host(&self, storage_id: i64, host: &ParsedHost) -> RepositoryResult<UpsertOutcome>;

    /// 按 (storage, port_id) upsert
    fn upsert_port(&self, storage_id: i64, port: &ParsedPort) -> RepositoryResult<UpsertOutcome>;

    // ===== 保存点（单实体失败时局部回滚）=====

    fn savepoint(&self, name: &str) -> RepositoryResult<()>;

    fn release_savepoint(&self, name: &str) -> RepositoryResult<()>;

    fn rollback_to_savepoint(&self, name: &str) -> RepositoryResult<()>;
}

// ==========================================
// SanRepository - 事务边界 + 只读查询
// ==========================================
pub trait SanRepository: Send + Sync {
    /// 在单个事务中执行 f
    ///
    /// # 返回
    /// - f 返回 Ok: 提交
    /// - f 返回 Err: 回滚（全部写入撤销），原样返回错误
    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SanStore) -> Result<T, E>,
        E: From<RepositoryError>;

    /// 客户范围内按名称批量查询别名（冲突检测）
    fn list_aliases_by_names(
        &self,
        customer_id: i64,
        names: &[String],
    ) -> RepositoryResult<Vec<AliasRecord>>;

    /// 客户范围内按名称批量查询 Zone（冲突检测）
    fn list_zones_by_names(
        &self,
        customer_id: i64,
        names: &[String],
    ) -> RepositoryResult<Vec<ZoneRecord>>;

    fn find_fabric(&self, customer_id: i64, fabric_id: i64) -> RepositoryResult<Option<FabricRecord>>;
}
