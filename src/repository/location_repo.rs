// ==========================================
// 仓储作业核心 - 库位数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: (zone_id, location_code) 唯一；派生编码与编址同时写入
// ==========================================

use crate::domain::location::{Location, LocationAddressing, LocationCodes, RbsIndex};
use crate::domain::types::{LocationStatus, ZoneType};
use crate::engine::location_codec::LocationCodec;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const LOCATION_SELECT: &str = r#"
    SELECT l.location_id, l.zone_id, z.code, l.zone_type,
           l.rbs_row, l.rbs_bay, l.rbs_slot, l.custom_label,
           l.status, l.created_at, l.updated_at
    FROM location l
    JOIN zone z ON z.zone_id = l.zone_id
"#;

// ==========================================
// LocationRepository - 库位仓储
// ==========================================
pub struct LocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LocationRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新建库位
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 同库区内编码重复
    pub fn insert(&self, location: &Location) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_location(&conn, location)?;
        Ok(())
    }

    /// 批量新建库位（单事务，任一冲突整体回滚）
    pub fn batch_insert(&self, locations: &[Location]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for location in locations {
            insert_location(&tx, location)?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 更新库位状态
    pub fn update_status(
        &self,
        location_id: &str,
        status: LocationStatus,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE location SET status = ?1, updated_at = ?2 WHERE location_id = ?3",
            params![status.to_db_str(), updated_at, location_id],
        )?;
        ensure_affected(affected, location_id)
    }

    /// 更新库位编址（同时重写派生编码）
    ///
    /// # 并发控制
    /// 仅当库位仍处于 expected_status 时写入
    ///
    /// # 返回
    /// - Err(OptimisticLockFailure): 库位状态已被其他操作修改
    /// - Err(UniqueConstraintViolation): 新编码与已有库位重复
    pub fn update_addressing(
        &self,
        location_id: &str,
        expected_status: LocationStatus,
        addressing: &LocationAddressing,
        codes: &LocationCodes,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let (row, bay, slot) = rbs_columns(addressing);
        let affected = conn.execute(
            r#"UPDATE location SET
                zone_type = ?1, rbs_row = ?2, rbs_bay = ?3, rbs_slot = ?4, custom_label = ?5,
                location_code = ?6, absolute_code = ?7, display_code = ?8, updated_at = ?9
               WHERE location_id = ?10 AND status = ?11"#,
            params![
                addressing.zone_type().to_db_str(),
                row,
                bay,
                slot,
                addressing.custom_label(),
                codes.location_code,
                codes.absolute_code,
                codes.display_code,
                updated_at,
                location_id,
                expected_status.to_db_str(),
            ],
        )?;

        if affected == 0 {
            let actual: Option<String> = conn
                .query_row(
                    "SELECT status FROM location WHERE location_id = ?1",
                    params![location_id],
                    |r| r.get(0),
                )
                .optional()?;
            return match actual {
                Some(actual) => Err(RepositoryError::OptimisticLockFailure {
                    entity: "Location".to_string(),
                    id: location_id.to_string(),
                    expected: expected_status.to_db_str().to_string(),
                    actual,
                }),
                None => ensure_affected(0, location_id),
            };
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询
    pub fn find_by_id(&self, location_id: &str) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE l.location_id = ?1", LOCATION_SELECT),
                params![location_id],
                LocationRow::from_row,
            )
            .optional()?;
        row.map(LocationRow::into_location).transpose()
    }

    /// 按全局编码查询（如 GER-R01B02S03）
    pub fn find_by_absolute_code(&self, absolute_code: &str) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE l.absolute_code = ?1", LOCATION_SELECT),
                params![absolute_code],
                LocationRow::from_row,
            )
            .optional()?;
        row.map(LocationRow::into_location).transpose()
    }

    /// 查询库区下全部库位（按库区内编码排序）
    pub fn find_by_zone(&self, zone_id: &str) -> RepositoryResult<Vec<Location>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE l.zone_id = ?1 ORDER BY l.location_code ASC",
            LOCATION_SELECT
        ))?;
        let rows = stmt
            .query_map(params![zone_id], LocationRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(LocationRow::into_location).collect()
    }

    /// 库区内已占用的库位编码集合（批量建位冲突预检用）
    pub fn list_location_codes(&self, zone_id: &str) -> RepositoryResult<HashSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT location_code FROM location WHERE zone_id = ?1")?;
        let codes = stmt
            .query_map(params![zone_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(codes)
    }

    /// 库区下库位数量
    pub fn count_by_zone(&self, zone_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM location WHERE zone_id = ?1",
            params![zone_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn insert_location(conn: &Connection, location: &Location) -> rusqlite::Result<usize> {
    let codes = location.codes();
    let (row, bay, slot) = rbs_columns(&location.addressing);
    conn.execute(
        r#"INSERT INTO location (
            location_id, zone_id, zone_type, rbs_row, rbs_bay, rbs_slot, custom_label,
            location_code, absolute_code, display_code, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"#,
        params![
            location.location_id,
            location.zone_id,
            location.zone_type().to_db_str(),
            row,
            bay,
            slot,
            location.addressing.custom_label(),
            codes.location_code,
            codes.absolute_code,
            codes.display_code,
            location.status.to_db_str(),
            location.created_at,
            location.updated_at,
        ],
    )
}

fn rbs_columns(addressing: &LocationAddressing) -> (Option<u8>, Option<u8>, Option<u8>) {
    match addressing {
        LocationAddressing::Rbs { row, bay, slot } => {
            (Some(row.get()), Some(bay.get()), Some(slot.get()))
        }
        LocationAddressing::Custom { .. } => (None, None, None),
    }
}

fn ensure_affected(affected: usize, location_id: &str) -> RepositoryResult<()> {
    if affected == 0 {
        return Err(RepositoryError::NotFound {
            entity: "Location".to_string(),
            id: location_id.to_string(),
        });
    }
    Ok(())
}

// ==========================================
// LocationRow - 行映射
// ==========================================
struct LocationRow {
    location_id: String,
    zone_id: String,
    zone_code: String,
    zone_type: String,
    rbs_row: Option<i64>,
    rbs_bay: Option<i64>,
    rbs_slot: Option<i64>,
    custom_label: Option<String>,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl LocationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            location_id: row.get(0)?,
            zone_id: row.get(1)?,
            zone_code: row.get(2)?,
            zone_type: row.get(3)?,
            rbs_row: row.get(4)?,
            rbs_bay: row.get(5)?,
            rbs_slot: row.get(6)?,
            custom_label: row.get(7)?,
            status: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_location(self) -> RepositoryResult<Location> {
        let zone_type = ZoneType::from_db_str(&self.zone_type)
            .ok_or_else(|| field_error("zone_type", &self.zone_type))?;
        let status = LocationStatus::from_db_str(&self.status)
            .ok_or_else(|| field_error("status", &self.status))?;

        let addressing = match zone_type {
            ZoneType::Rbs => LocationAddressing::Rbs {
                row: rbs_index("rbs_row", self.rbs_row)?,
                bay: rbs_index("rbs_bay", self.rbs_bay)?,
                slot: rbs_index("rbs_slot", self.rbs_slot)?,
            },
            ZoneType::Custom => {
                let raw = self.custom_label.unwrap_or_default();
                let label = LocationCodec::normalize_custom_label(&raw)
                    .map_err(|e| field_error("custom_label", &e.to_string()))?;
                LocationAddressing::Custom { label }
            }
        };

        Ok(Location {
            location_id: self.location_id,
            zone_id: self.zone_id,
            zone_code: self.zone_code,
            addressing,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn rbs_index(field: &str, value: Option<i64>) -> RepositoryResult<RbsIndex> {
    value
        .and_then(|v| u32::try_from(v).ok())
        .and_then(RbsIndex::new)
        .ok_or_else(|| field_error(field, &format!("{:?}", value)))
}

fn field_error(field: &str, message: &str) -> RepositoryError {
    RepositoryError::FieldValueError {
        field: field.to_string(),
        message: message.to_string(),
    }
}
