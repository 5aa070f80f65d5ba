// ==========================================
// 需求预测与自动调拨系统 - SQLite 连接初始化
// ==========================================
// 用途: 配置存储（config_kv）的连接打开与统一 PRAGMA
// ==========================================

use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 默认配置库文件名
pub const DEFAULT_CONFIG_DB_FILE: &str = "config.db";

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库（测试 / 无持久化配置时使用）
pub fn open_in_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 默认配置库路径: <系统数据目录>/demand-rebalancer/config.db
///
/// 无法获取系统数据目录时退回当前目录
pub fn default_config_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("demand-rebalancer"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DB_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_file_name() {
        let path = default_config_db_path();
        assert_eq!(path.file_name().and_then(|f| f.to_str()), Some(DEFAULT_CONFIG_DB_FILE));
    }

    #[test]
    fn test_in_memory_connection() {
        let conn = open_in_memory_connection().unwrap();
        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(fk, 1);
    }
}
