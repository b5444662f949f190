use crate::types::{AppError, RaterRef, Rating, Result, Role, Store, StoreRef, User};
use chrono::Utc;
use libsql::{params_from_iter, Builder, Connection, Database, Row, Value};
use uuid::Uuid;

/// Case-insensitive substring filters for the user listing, plus an exact
/// role match.
#[derive(Debug, Default)]
pub struct UserFilters {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Whitelisted sort columns for the user listing. Anything else is rejected
/// at the handler boundary rather than interpolated into SQL.
#[derive(Debug, Clone, Copy)]
pub enum UserSortKey {
    Name,
    Email,
    Address,
    Role,
    CreatedAt,
}

impl UserSortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "address" => Some(Self::Address),
            "role" => Some(Self::Role),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Address => "address",
            Self::Role => "role",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UserSort {
    pub key: UserSortKey,
    pub ascending: bool,
}

/// A store row with its rating aggregates computed in the same query.
#[derive(Debug)]
pub struct StoreAggregate {
    pub store: Store,
    pub average_rating: Option<f64>,
    pub total_ratings: i64,
}

/// A rating joined with its rater and store references.
#[derive(Debug)]
pub struct RatingDetail {
    pub rating: Rating,
    pub rater: RaterRef,
    pub store: StoreRef,
}

/// Database client over embedded SQLite (libsql).
pub struct DbClient {
    #[allow(dead_code)]
    db: Database,
    // Opened once and cloned on demand: for `:memory:` databases each fresh
    // `Database::connect()` would open a separate, empty database.
    conn: Connection,
}

impl DbClient {
    /// Opens (or creates) a file-backed database and initializes the schema.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    /// Opens an in-memory database (ephemeral, lost on drop).
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    pub fn connection(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                address TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS stores (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                address TEXT NOT NULL,
                image TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(id)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create stores table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS ratings (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                store_id TEXT NOT NULL,
                score INTEGER NOT NULL,
                comment TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id),
                FOREIGN KEY (store_id) REFERENCES stores(id)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create ratings table: {}", e)))?;

        Ok(())
    }

    // ============= User operations =============

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        address: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO users (id, name, email, address, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (id.as_str(), name, email, address, password_hash, role.as_str(), now, now),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create user: {}", e)))?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            address: address.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, name, email, address, password_hash, role, created_at, updated_at
                 FROM users WHERE email = ?",
                [email],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, name, email, address, password_hash, role, created_at, updated_at
                 FROM users WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Lists users matching the filters, optionally sorted by a whitelisted
    /// column (case-insensitive for text columns).
    pub async fn list_users(
        &self,
        filters: &UserFilters,
        sort: Option<UserSort>,
    ) -> Result<Vec<User>> {
        let conn = self.connection()?;

        let mut sql = String::from(
            "SELECT id, name, email, address, password_hash, role, created_at, updated_at
             FROM users WHERE 1=1",
        );
        let mut params: Vec<Value> = Vec::new();

        push_like(&mut sql, &mut params, "name", filters.name.as_deref());
        push_like(&mut sql, &mut params, "email", filters.email.as_deref());
        push_like(&mut sql, &mut params, "address", filters.address.as_deref());

        if let Some(role) = filters.role {
            sql.push_str(" AND role = ?");
            params.push(role.as_str().into());
        }

        match sort {
            Some(sort) => {
                let order = if sort.ascending { "ASC" } else { "DESC" };
                sql.push_str(&format!(
                    " ORDER BY {} COLLATE NOCASE {}",
                    sort.key.column(),
                    order
                ));
            }
            None => sql.push_str(" ORDER BY created_at DESC"),
        }

        let mut rows = conn
            .query(&sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            users.push(user_from_row(&row)?);
        }

        Ok(users)
    }

    /// Writes the full user row back (name, email, address, hash, role).
    pub async fn update_user(&self, user: &User) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "UPDATE users SET name = ?, email = ?, address = ?, password_hash = ?, role = ?, updated_at = ?
             WHERE id = ?",
            (
                user.name.as_str(),
                user.email.as_str(),
                user.address.as_str(),
                user.password_hash.as_str(),
                user.role.as_str(),
                now,
                user.id.as_str(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to update user: {}", e)))?;

        Ok(())
    }

    pub async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?",
            (password_hash, now, user_id),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to update password: {}", e)))?;

        Ok(())
    }

    pub async fn count_users(&self) -> Result<i64> {
        self.count("users").await
    }

    // ============= Store operations =============

    pub async fn create_store(
        &self,
        owner_id: &str,
        name: &str,
        email: &str,
        address: &str,
        image: Option<&str>,
    ) -> Result<Store> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO stores (id, owner_id, name, email, address, image, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (id.as_str(), owner_id, name, email, address, image, now, now),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create store: {}", e)))?;

        Ok(Store {
            id,
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            address: address.to_string(),
            image: image.map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_store_by_id(&self, id: &str) -> Result<Option<Store>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, owner_id, name, email, address, image, created_at, updated_at
                 FROM stores WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query store: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(store_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Lists stores matching the substring filters, each with its average
    /// rating and rating count computed in the same query.
    pub async fn list_stores(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Vec<StoreAggregate>> {
        let conn = self.connection()?;

        let mut sql = String::from(
            "SELECT s.id, s.owner_id, s.name, s.email, s.address, s.image,
                    s.created_at, s.updated_at,
                    (SELECT AVG(score) FROM ratings WHERE store_id = s.id) AS avg_score,
                    (SELECT COUNT(*) FROM ratings WHERE store_id = s.id) AS rating_count
             FROM stores s WHERE 1=1",
        );
        let mut params: Vec<Value> = Vec::new();

        push_like(&mut sql, &mut params, "s.name", name);
        push_like(&mut sql, &mut params, "s.email", email);
        push_like(&mut sql, &mut params, "s.address", address);

        sql.push_str(" ORDER BY s.created_at DESC");

        let mut rows = conn
            .query(&sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to list stores: {}", e)))?;

        let mut stores = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            stores.push(StoreAggregate {
                store: store_from_row(&row)?,
                average_rating: row.get(8).map_err(|e| AppError::Database(e.to_string()))?,
                total_ratings: row.get(9).map_err(|e| AppError::Database(e.to_string()))?,
            });
        }

        Ok(stores)
    }

    pub async fn stores_by_owner(&self, owner_id: &str) -> Result<Vec<Store>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, owner_id, name, email, address, image, created_at, updated_at
                 FROM stores WHERE owner_id = ? ORDER BY created_at DESC",
                [owner_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query stores: {}", e)))?;

        let mut stores = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            stores.push(store_from_row(&row)?);
        }

        Ok(stores)
    }

    /// Writes the full store row back (name, email, address, image).
    pub async fn update_store(&self, store: &Store) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "UPDATE stores SET name = ?, email = ?, address = ?, image = ?, updated_at = ?
             WHERE id = ?",
            (
                store.name.as_str(),
                store.email.as_str(),
                store.address.as_str(),
                store.image.as_deref(),
                now,
                store.id.as_str(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to update store: {}", e)))?;

        Ok(())
    }

    /// Deletes a store and all of its ratings. Ratings go first so a failed
    /// store delete never leaves orphan rows.
    pub async fn delete_store_with_ratings(&self, store_id: &str) -> Result<()> {
        let conn = self.connection()?;

        conn.execute("DELETE FROM ratings WHERE store_id = ?", [store_id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete store ratings: {}", e)))?;

        conn.execute("DELETE FROM stores WHERE id = ?", [store_id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete store: {}", e)))?;

        Ok(())
    }

    pub async fn count_stores(&self) -> Result<i64> {
        self.count("stores").await
    }

    // ============= Rating operations =============

    pub async fn create_rating(
        &self,
        user_id: &str,
        store_id: &str,
        score: i64,
        comment: Option<&str>,
    ) -> Result<Rating> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO ratings (id, user_id, store_id, score, comment, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (id.as_str(), user_id, store_id, score, comment, now, now),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create rating: {}", e)))?;

        Ok(Rating {
            id,
            user_id: user_id.to_string(),
            store_id: store_id.to_string(),
            score,
            comment: comment.map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_rating_by_id(&self, id: &str) -> Result<Option<Rating>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, user_id, store_id, score, comment, created_at, updated_at
                 FROM ratings WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query rating: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(rating_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_rating(&self, id: &str, score: i64, comment: Option<&str>) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "UPDATE ratings SET score = ?, comment = ?, updated_at = ? WHERE id = ?",
            (score, comment, now, id),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to update rating: {}", e)))?;

        Ok(())
    }

    /// Lists ratings with rater and store identity joined in, optionally
    /// filtered by store and/or rater.
    pub async fn list_ratings(
        &self,
        store_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<Vec<RatingDetail>> {
        let conn = self.connection()?;

        let mut sql = String::from(
            "SELECT r.id, r.user_id, r.store_id, r.score, r.comment, r.created_at, r.updated_at,
                    u.name, u.email, s.name
             FROM ratings r
             JOIN users u ON r.user_id = u.id
             JOIN stores s ON r.store_id = s.id
             WHERE 1=1",
        );
        let mut params: Vec<Value> = Vec::new();

        if let Some(store_id) = store_id {
            sql.push_str(" AND r.store_id = ?");
            params.push(store_id.into());
        }
        if let Some(user_id) = user_id {
            sql.push_str(" AND r.user_id = ?");
            params.push(user_id.into());
        }

        sql.push_str(" ORDER BY r.created_at DESC");

        let mut rows = conn
            .query(&sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to list ratings: {}", e)))?;

        let mut ratings = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let rating = rating_from_row(&row)?;
            let rater = RaterRef {
                id: rating.user_id.clone(),
                name: row.get(7).map_err(|e| AppError::Database(e.to_string()))?,
                email: row.get(8).map_err(|e| AppError::Database(e.to_string()))?,
            };
            let store = StoreRef {
                id: rating.store_id.clone(),
                name: row.get(9).map_err(|e| AppError::Database(e.to_string()))?,
            };

            ratings.push(RatingDetail {
                rating,
                rater,
                store,
            });
        }

        Ok(ratings)
    }

    /// Average score and rating count for one store. The average is `None`
    /// when the store has no ratings.
    pub async fn store_rating_stats(&self, store_id: &str) -> Result<(Option<f64>, i64)> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT AVG(score), COUNT(*) FROM ratings WHERE store_id = ?",
                [store_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query rating stats: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Database("Aggregate query returned no row".to_string()))?;

        let average: Option<f64> = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
        let count: i64 = row.get(1).map_err(|e| AppError::Database(e.to_string()))?;

        Ok((average, count))
    }

    /// Average score across all ratings of all stores owned by a user.
    pub async fn owner_average_rating(&self, owner_id: &str) -> Result<Option<f64>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT AVG(r.score) FROM ratings r
                 JOIN stores s ON r.store_id = s.id
                 WHERE s.owner_id = ?",
                [owner_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query owner rating: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Database("Aggregate query returned no row".to_string()))?;

        row.get(0).map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn count_ratings(&self) -> Result<i64> {
        self.count("ratings").await
    }

    // ============= Helpers =============

    async fn count(&self, table: &'static str) -> Result<i64> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM {}", table), ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count {}: {}", table, e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Database("Count query returned no row".to_string()))?;

        row.get(0).map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Appends a case-insensitive substring condition for `column` when a filter
/// value is present.
fn push_like(sql: &mut String, params: &mut Vec<Value>, column: &str, value: Option<&str>) {
    if let Some(value) = value {
        sql.push_str(&format!(" AND LOWER({}) LIKE ?", column));
        params.push(format!("%{}%", value.to_lowercase()).into());
    }
}

fn user_from_row(row: &Row) -> Result<User> {
    let role_str: String = row.get(5).map_err(|e| AppError::Database(e.to_string()))?;
    let role = Role::parse(&role_str)
        .ok_or_else(|| AppError::Database(format!("Unknown role in database: {}", role_str)))?;

    Ok(User {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        email: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        address: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        password_hash: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        role,
        created_at: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
        updated_at: row.get(7).map_err(|e| AppError::Database(e.to_string()))?,
    })
}

fn store_from_row(row: &Row) -> Result<Store> {
    Ok(Store {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        owner_id: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        name: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        email: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        address: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        image: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
        created_at: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
        updated_at: row.get(7).map_err(|e| AppError::Database(e.to_string()))?,
    })
}

fn rating_from_row(row: &Row) -> Result<Rating> {
    Ok(Rating {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        user_id: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        store_id: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        score: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        comment: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        created_at: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
        updated_at: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
    })
}
