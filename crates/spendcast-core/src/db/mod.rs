//! Transaction store backed by a pooled (optionally SQLCipher-encrypted) SQLite file
//!
//! - `transactions` - Transaction CRUD and the forecast data source
//! - `stats` - Monthly income/expense totals

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

mod stats;
mod transactions;

pub use stats::MAX_STATS_MONTHS;


pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable holding the store passphrase
pub const DB_KEY_ENV: &str = "SPENDCAST_DB_KEY";

/// Connections kept by the pool
const POOL_SIZE: u32 = 10;

const SCHEMA: &str = r#"
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA temp_store = MEMORY;

    -- Dates are stored as supplied; the forecast filter drops rows it cannot parse
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY,
        uid TEXT NOT NULL,
        type TEXT NOT NULL,
        amount REAL NOT NULL,
        date TEXT NOT NULL,
        wallet_id TEXT,
        description TEXT,
        import_hash TEXT UNIQUE,                   -- NULL for manual entries
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_transactions_uid_type ON transactions(uid, type);
    CREATE INDEX IF NOT EXISTS idx_transactions_uid_date ON transactions(uid, date);
"#;

/// Build the `PRAGMA key` statement for a passphrase
///
/// The raw key is Argon2 over the passphrase with a fixed salt, so a store file
/// can be moved or restored anywhere and still open with the same passphrase.
fn sqlcipher_key_pragma(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this makes every existing encrypted store unreadable
    const STORE_SALT: &[u8; 16] = b"spendcast-salt-1";

    let salt = SaltString::encode_b64(STORE_SALT)
        .map_err(|e| Error::Encryption(format!("Bad key salt: {}", e)))?;
    let digest = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Key derivation failed: {}", e)))?
        .hash
        .ok_or_else(|| Error::Encryption("Key derivation produced no output".to_string()))?;

    Ok(format!("PRAGMA key = 'x\"{}\"';", hex::encode(digest.as_bytes())))
}

/// Fail early when the key does not decrypt the file
///
/// SQLCipher accepts any key at `PRAGMA key` time; the first real read is
/// where a mismatch shows up.
fn check_readable(conn: &Connection) -> Result<()> {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|_| ())
    .map_err(|e| {
        Error::Encryption(format!(
            "Cannot read database (wrong passphrase or not a spendcast store): {}",
            e
        ))
    })
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Pooled handle on the transaction store
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open an encrypted store using the passphrase in `SPENDCAST_DB_KEY`
    ///
    /// Fails when the variable is unset; `new_unencrypted()` is the explicit
    /// opt-out.
    pub fn new(path: &str) -> Result<Self> {
        let passphrase = std::env::var(DB_KEY_ENV).map_err(|_| {
            Error::Encryption(format!(
                "Set {} to the store passphrase, or pass --no-encrypt to use a plain SQLite file",
                DB_KEY_ENV
            ))
        })?;
        Self::new_with_key(path, Some(&passphrase))
    }

    /// Open a plain SQLite store
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a store, encrypted when a passphrase is given
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let manager = match passphrase {
            Some(passphrase) => {
                let key_pragma = sqlcipher_key_pragma(passphrase)?;
                manager.with_init(move |conn| conn.execute_batch(&key_pragma))
            }
            None => manager,
        };

        let pool = Pool::builder().max_size(POOL_SIZE).build(manager)?;
        let db = Self { pool };

        check_readable(&*db.conn()?)?;
        db.migrate()?;

        debug!(path, encrypted = passphrase.is_some(), "Opened transaction store");
        Ok(db)
    }

    /// Fresh throwaway store (for testing)
    ///
    /// Backed by a temp file because each pooled `:memory:` connection would
    /// see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT: AtomicU64 = AtomicU64::new(0);

        let path = std::env::temp_dir().join(format!(
            "spendcast_scratch_{}_{}.db",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Idempotent: every statement in `SCHEMA` is `IF NOT EXISTS`
    fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        info!("Transaction store schema ready");
        Ok(())
    }
}
