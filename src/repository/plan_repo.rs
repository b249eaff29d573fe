// ==========================================
// 仓储作业核心 - 作业计划数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（状态流转由 PlanStateMachine 判定）
// 约束: 计划与明细同事务写入；明细按 seq_no 保序
// ==========================================

use crate::domain::plan::{Plan, PlanContainer};
use crate::domain::types::{ContainerStatus, PlanKind, PlanStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const PLAN_COLUMNS: &str =
    "plan_id, code, plan_kind, status, created_by, created_at, updated_at, revision";

// ==========================================
// PlanRepository - 作业计划仓储
// ==========================================
pub struct PlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRepository {
    /// 创建新的PlanRepository实例
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

    /// 创建计划（含明细）
    ///
    /// # 返回
    /// - `Ok(plan_id)`
    /// - Err(UniqueConstraintViolation): 计划编号重复或同一计划内箱号重复
    pub fn insert(&self, plan: &Plan) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"INSERT INTO plan (
                plan_id, code, plan_kind, status, created_by, created_at, updated_at, revision
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                plan.plan_id,
                plan.code,
                plan.kind.to_db_str(),
                plan.status.to_db_str(),
                plan.created_by,
                plan.created_at,
                plan.updated_at,
                plan.revision,
            ],
        )?;

        for (seq_no, container) in plan.containers.iter().enumerate() {
            tx.execute(
                r#"INSERT INTO plan_container (
                    container_id, plan_id, seq_no, container_ref, status
                ) VALUES (?, ?, ?, ?, ?)"#,
                params![
                    container.container_id,
                    plan.plan_id,
                    seq_no as i64,
                    container.container_ref,
                    container.status.to_db_str(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(plan.plan_id.clone())
    }

    /// 更新计划状态（带乐观锁检查）
    ///
    /// # 并发控制
    /// 仅当 revision 与读取快照一致时写入，成功后 revision + 1
    ///
    /// # 返回
    /// - `Ok(new_revision)`
    /// - Err(OptimisticLockFailure): 快照之后计划或其箱状态已被修改
    /// - Err(NotFound): plan_id 不存在
    pub fn update_status(
        &self,
        plan_id: &str,
        expected_revision: i64,
        status: PlanStatus,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"UPDATE plan SET status = ?1, updated_at = ?2, revision = revision + 1
               WHERE plan_id = ?3 AND revision = ?4"#,
            params![status.to_db_str(), updated_at, plan_id, expected_revision],
        )?;

        if affected == 0 {
            // 区分记录不存在与 revision 冲突
            let actual: Option<i64> = conn
                .query_row(
                    "SELECT revision FROM plan WHERE plan_id = ?1",
                    params![plan_id],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match actual {
                Some(actual) => RepositoryError::OptimisticLockFailure {
                    entity: "Plan".to_string(),
                    id: plan_id.to_string(),
                    expected: format!("revision={}", expected_revision),
                    actual: format!("revision={}", actual),
                },
                None => RepositoryError::NotFound {
                    entity: "Plan".to_string(),
                    id: plan_id.to_string(),
                },
            });
        }
        Ok(expected_revision + 1)
    }

    /// 更新计划内箱状态（带状态前置条件）
    ///
    /// # 并发控制
    /// 仅当箱仍为 from 且计划仍为 plan_status 时写入；
    /// 同事务内刷新计划 updated_at 并 revision + 1，使基于旧快照的计划级操作失效
    ///
    /// # 返回
    /// - `Ok(new_revision)`
    /// - Err(OptimisticLockFailure): 箱或计划状态已被其他操作修改
    /// - Err(NotFound): 计划内不存在该箱明细
    pub fn update_container_status(
        &self,
        plan_id: &str,
        container_id: &str,
        plan_status: PlanStatus,
        from: ContainerStatus,
        to: ContainerStatus,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let affected = tx.execute(
            r#"UPDATE plan_container SET status = ?1
               WHERE container_id = ?2 AND plan_id = ?3 AND status = ?4
                 AND EXISTS (SELECT 1 FROM plan WHERE plan_id = ?3 AND status = ?5)"#,
            params![
                to.to_db_str(),
                container_id,
                plan_id,
                from.to_db_str(),
                plan_status.to_db_str(),
            ],
        )?;

        if affected == 0 {
            let actual: Option<(String, String)> = tx
                .query_row(
                    r#"SELECT c.status, p.status FROM plan_container c
                       JOIN plan p ON p.plan_id = c.plan_id
                       WHERE c.container_id = ?1 AND c.plan_id = ?2"#,
                    params![container_id, plan_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            return Err(match actual {
                Some((container_status, current_plan_status)) => {
                    RepositoryError::OptimisticLockFailure {
                        entity: "PlanContainer".to_string(),
                        id: container_id.to_string(),
                        expected: format!("箱={} 计划={}", from, plan_status),
                        actual: format!("箱={} 计划={}", container_status, current_plan_status),
                    }
                }
                None => RepositoryError::NotFound {
                    entity: "PlanContainer".to_string(),
                    id: container_id.to_string(),
                },
            });
        }

        tx.execute(
            "UPDATE plan SET updated_at = ?1, revision = revision + 1 WHERE plan_id = ?2",
            params![updated_at, plan_id],
        )?;
        let revision: i64 = tx.query_row(
            "SELECT revision FROM plan WHERE plan_id = ?1",
            params![plan_id],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(revision)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询计划（含明细）
    pub fn find_by_id(&self, plan_id: &str) -> RepositoryResult<Option<Plan>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM plan WHERE plan_id = ?1", PLAN_COLUMNS),
                params![plan_id],
                PlanRow::from_row,
            )
            .optional()?;
        match row {
            Some(row) => Ok(Some(load_plan(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// 按计划编号查询（含明细）
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Plan>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM plan WHERE code = ?1", PLAN_COLUMNS),
                params![code],
                PlanRow::from_row,
            )
            .optional()?;
        match row {
            Some(row) => Ok(Some(load_plan(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// 查询全部计划（按创建时间倒序，含明细）
    pub fn list_all(&self) -> RepositoryResult<Vec<Plan>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM plan ORDER BY created_at DESC",
            PLAN_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], PlanRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(|row| load_plan(&conn, row)).collect()
    }
}

// ==========================================
// 行映射
// ==========================================

struct PlanRow {
    plan_id: String,
    code: String,
    plan_kind: String,
    status: String,
    created_by: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    revision: i64,
}

impl PlanRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            plan_id: row.get(0)?,
            code: row.get(1)?,
            plan_kind: row.get(2)?,
            status: row.get(3)?,
            created_by: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            revision: row.get(7)?,
        })
    }
}

fn load_plan(conn: &Connection, row: PlanRow) -> RepositoryResult<Plan> {
    let kind = PlanKind::from_db_str(&row.plan_kind)
        .ok_or_else(|| field_error("plan_kind", &row.plan_kind))?;
    let status =
        PlanStatus::from_db_str(&row.status).ok_or_else(|| field_error("status", &row.status))?;

    let mut stmt = conn.prepare(
        r#"SELECT container_id, plan_id, container_ref, status
           FROM plan_container WHERE plan_id = ?1 ORDER BY seq_no ASC"#,
    )?;
    let raw = stmt
        .query_map(params![row.plan_id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let containers = raw
        .into_iter()
        .map(|(container_id, plan_id, container_ref, status)| {
            let status = ContainerStatus::from_db_str(&status)
                .ok_or_else(|| field_error("plan_container.status", &status))?;
            Ok(PlanContainer {
                container_id,
                plan_id,
                container_ref,
                status,
            })
        })
        .collect::<RepositoryResult<Vec<_>>>()?;

    Ok(Plan {
        plan_id: row.plan_id,
        code: row.code,
        kind,
        status,
        containers,
        created_by: row.created_by,
        created_at: row.created_at,
        updated_at: row.updated_at,
        revision: row.revision,
    })
}

fn field_error(field: &str, value: &str) -> RepositoryError {
    RepositoryError::FieldValueError {
        field: field.to_string(),
        message: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn setup() -> PlanRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        PlanRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn make_plan(id: &str, code: &str, refs: &[&str]) -> Plan {
        let now = Utc::now().naive_utc();
        Plan {
            plan_id: id.to_string(),
            code: code.to_string(),
            kind: PlanKind::Receiving,
            status: PlanStatus::Pending,
            containers: refs
                .iter()
                .enumerate()
                .map(|(i, r)| PlanContainer {
                    container_id: format!("{}-c{}", id, i),
                    plan_id: id.to_string(),
                    container_ref: r.to_string(),
                    status: ContainerStatus::Waiting,
                })
                .collect(),
            created_by: "tester".to_string(),
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    #[test]
    fn test_insert_and_find_keeps_container_order() {
        let repo = setup();
        repo.insert(&make_plan("p1", "RCV-001", &["TEMU9876540", "MSCU6639870", "CSQU3054383"]))
            .unwrap();

        let plan = repo.find_by_id("p1").unwrap().unwrap();
        assert_eq!(plan.kind, PlanKind::Receiving);
        let refs: Vec<_> = plan.containers.iter().map(|c| c.container_ref.as_str()).collect();
        assert_eq!(refs, vec!["TEMU9876540", "MSCU6639870", "CSQU3054383"]);

        assert!(repo.find_by_code("RCV-001").unwrap().is_some());
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_container_rolls_back_plan() {
        let repo = setup();
        let err = repo
            .insert(&make_plan("p1", "RCV-001", &["MSCU6639870", "MSCU6639870"]))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
        assert!(repo.find_by_id("p1").unwrap().is_none());
    }

    #[test]
    fn test_update_statuses() {
        let repo = setup();
        repo.insert(&make_plan("p1", "RCV-001", &["MSCU6639870"])).unwrap();
        let now = Utc::now().naive_utc();

        let rev = repo.update_status("p1", 0, PlanStatus::InProgress, now).unwrap();
        assert_eq!(rev, 1);
        let rev = repo
            .update_container_status(
                "p1",
                "p1-c0",
                PlanStatus::InProgress,
                ContainerStatus::Waiting,
                ContainerStatus::Received,
                now,
            )
            .unwrap();
        assert_eq!(rev, 2);

        let plan = repo.find_by_id("p1").unwrap().unwrap();
        assert_eq!(plan.status, PlanStatus::InProgress);
        assert_eq!(plan.revision, 2);
        assert_eq!(plan.containers[0].status, ContainerStatus::Received);

        let err = repo
            .update_container_status(
                "p1",
                "nope",
                PlanStatus::InProgress,
                ContainerStatus::Waiting,
                ContainerStatus::Received,
                now,
            )
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_update_status_乐观锁冲突() {
        let repo = setup();
        repo.insert(&make_plan("p1", "RCV-001", &["MSCU6639870"])).unwrap();
        let now = Utc::now().naive_utc();

        repo.update_status("p1", 0, PlanStatus::InProgress, now).unwrap();

        // 基于 revision=0 的旧快照再次写入
        let err = repo
            .update_status("p1", 0, PlanStatus::Scheduled, now)
            .unwrap_err();
        match err {
            RepositoryError::OptimisticLockFailure { expected, actual, .. } => {
                assert_eq!(expected, "revision=0");
                assert_eq!(actual, "revision=1");
            }
            other => panic!("Expected OptimisticLockFailure, got {:?}", other),
        }
        assert_eq!(
            repo.find_by_id("p1").unwrap().unwrap().status,
            PlanStatus::InProgress
        );

        let err = repo
            .update_status("missing", 0, PlanStatus::Done, now)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_update_container_status_前置状态不符() {
        let repo = setup();
        repo.insert(&make_plan("p1", "RCV-001", &["MSCU6639870"])).unwrap();
        let now = Utc::now().naive_utc();
        repo.update_status("p1", 0, PlanStatus::InProgress, now).unwrap();

        repo.update_container_status(
            "p1",
            "p1-c0",
            PlanStatus::InProgress,
            ContainerStatus::Waiting,
            ContainerStatus::Received,
            now,
        )
        .unwrap();

        // 箱已离开 WAITING，第二次基于 WAITING 的写入被拒绝
        let err = repo
            .update_container_status(
                "p1",
                "p1-c0",
                PlanStatus::InProgress,
                ContainerStatus::Waiting,
                ContainerStatus::Rejected,
                now,
            )
            .unwrap_err();
        assert!(matches!(err, RepositoryError::OptimisticLockFailure { .. }));

        let plan = repo.find_by_id("p1").unwrap().unwrap();
        assert_eq!(plan.containers[0].status, ContainerStatus::Received);
        assert_eq!(plan.revision, 2);
    }
}
