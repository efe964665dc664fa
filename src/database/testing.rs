//! 测试用 SQLite 数据库
//!
//! 内存库只有一个连接, 所有操作在连接获取处排队;
//! 需要真实并发的测试使用文件库 (多连接)。

use crate::entities::{participant_entity as participants, prize_entity as prizes};
use crate::models::AuthContext;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

static FILE_DB_SEQ: AtomicU32 = AtomicU32::new(0);

/// 临时文件库, drop 时删除文件
pub struct FileDb {
    pub path: PathBuf,
    pub db: DatabaseConnection,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut name = self.path.clone().into_os_string();
            name.push(suffix);
            let _ = std::fs::remove_file(name);
        }
    }
}

pub async fn connect_file_db(path: &Path, max_connections: u32) -> DatabaseConnection {
    let mut options = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(options)
        .await
        .expect("connect file sqlite")
}

pub async fn setup_file_db(max_connections: u32) -> FileDb {
    let path = std::env::temp_dir().join(format!(
        "lucky_draw_test_{}_{}.db",
        std::process::id(),
        FILE_DB_SEQ.fetch_add(1, Ordering::SeqCst)
    ));
    let _ = std::fs::remove_file(&path);
    let db = connect_file_db(&path, max_connections).await;
    Migrator::up(&db, None).await.expect("run migrations");
    FileDb { path, db }
}

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn insert_prize(
    db: &DatabaseConnection,
    name: &str,
    quantity: i32,
    is_grand: bool,
) -> prizes::Model {
    let now = Utc::now();
    prizes::ActiveModel {
        name: Set(name.to_string()),
        color: Set(None),
        is_grand: Set(is_grand),
        quantity: Set(quantity),
        claimed_count: Set(0),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert prize")
}

pub async fn insert_participants(
    db: &DatabaseConnection,
    names: &[&str],
) -> Vec<participants::Model> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let model = participants::ActiveModel {
            name: Set(name.to_string()),
            is_winner: Set(false),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert participant");
        out.push(model);
    }
    out
}

pub fn admin() -> AuthContext {
    AuthContext::admin(1, "admin")
}

pub fn guest() -> AuthContext {
    AuthContext::guest()
}
