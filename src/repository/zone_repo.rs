// ==========================================
// 仓储作业核心 - 库区数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: zone.code 唯一；名下有库位时删除失败（外键 RESTRICT）
// ==========================================

use crate::domain::types::{ZoneStatus, ZoneType};
use crate::domain::zone::Zone;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const ZONE_COLUMNS: &str = "zone_id, code, name, zone_type, status, created_at";

// ==========================================
// ZoneRepository - 库区仓储
// ==========================================
pub struct ZoneRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ZoneRepository {
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

    /// 新建库区
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 库区代码已存在
    pub fn insert(&self, zone: &Zone) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO zone (zone_id, code, name, zone_type, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                zone.zone_id,
                zone.code,
                zone.name,
                zone.zone_type.to_db_str(),
                zone.status.to_db_str(),
                zone.created_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, zone_id: &str) -> RepositoryResult<Option<Zone>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM zone WHERE zone_id = ?1", ZONE_COLUMNS),
                params![zone_id],
                ZoneRow::from_row,
            )
            .optional()?;
        row.map(ZoneRow::into_zone).transpose()
    }

    /// 按库区代码查询
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Zone>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM zone WHERE code = ?1", ZONE_COLUMNS),
                params![code],
                ZoneRow::from_row,
            )
            .optional()?;
        row.map(ZoneRow::into_zone).transpose()
    }

    /// 查询全部库区（按代码排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Zone>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM zone ORDER BY code ASC", ZONE_COLUMNS))?;
        let rows = stmt
            .query_map([], ZoneRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ZoneRow::into_zone).collect()
    }

    /// 更新库区状态
    pub fn update_status(&self, zone_id: &str, status: ZoneStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE zone SET status = ?1 WHERE zone_id = ?2",
            params![status.to_db_str(), zone_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Zone".to_string(),
                id: zone_id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除库区
    ///
    /// # 返回
    /// - Err(ForeignKeyViolation): 名下仍有库位
    pub fn delete(&self, zone_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM zone WHERE zone_id = ?1", params![zone_id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Zone".to_string(),
                id: zone_id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// ZoneRow - 行映射
// ==========================================
struct ZoneRow {
    zone_id: String,
    code: String,
    name: String,
    zone_type: String,
    status: String,
    created_at: NaiveDateTime,
}

impl ZoneRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            zone_id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            zone_type: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_zone(self) -> RepositoryResult<Zone> {
        let zone_type = ZoneType::from_db_str(&self.zone_type).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "zone_type".to_string(),
                message: self.zone_type.clone(),
            }
        })?;
        let status = ZoneStatus::from_db_str(&self.status).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: self.status.clone(),
            }
        })?;
        Ok(Zone {
            zone_id: self.zone_id,
            code: self.code,
            name: self.name,
            zone_type,
            status,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn setup() -> ZoneRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        ZoneRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn make_zone(id: &str, code: &str) -> Zone {
        Zone {
            zone_id: id.to_string(),
            code: code.to_string(),
            name: format!("库区{}", code),
            zone_type: ZoneType::Rbs,
            status: ZoneStatus::Active,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let repo = setup();
        repo.insert(&make_zone("z1", "GE")).unwrap();

        let found = repo.find_by_code("GE").unwrap().unwrap();
        assert_eq!(found.zone_id, "z1");
        assert_eq!(found.zone_type, ZoneType::Rbs);
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_code_is_unique_violation() {
        let repo = setup();
        repo.insert(&make_zone("z1", "GE")).unwrap();
        let err = repo.insert(&make_zone("z2", "GE")).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_update_status_and_delete() {
        let repo = setup();
        repo.insert(&make_zone("z1", "A")).unwrap();
        repo.update_status("z1", ZoneStatus::Inactive).unwrap();
        assert_eq!(repo.find_by_id("z1").unwrap().unwrap().status, ZoneStatus::Inactive);

        repo.delete("z1").unwrap();
        assert!(matches!(
            repo.delete("z1"),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
