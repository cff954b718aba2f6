//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Customers are addressed by their owning user in most of the API: a user
//! has at most one customer (`UNIQUE(user_id)`), and rentals are checked out
//! by user id.

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use vidly_core::Customer;

// =============================================================================
// Executor-Generic Queries
// =============================================================================

pub(crate) async fn fetch_by_user<'e, E>(executor: E, user_id: &str) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, user_id, name, email, address, city, province, zip, phone, is_gold
        FROM customers
        WHERE user_id = ?1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(customer)
}

pub(crate) async fn insert<'e, E>(executor: E, customer: &Customer) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO customers (
            id, user_id, name, email, address, city, province, zip, phone, is_gold
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.user_id)
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.address)
    .bind(&customer.city)
    .bind(&customer.province)
    .bind(&customer.zip)
    .bind(&customer.phone)
    .bind(customer.is_gold)
    .execute(executor)
    .await?;

    Ok(())
}

/// Sets the gold flag. Returns the number of rows matched.
pub(crate) async fn set_gold<'e, E>(executor: E, customer_id: &str, is_gold: bool) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE customers SET is_gold = ?2 WHERE id = ?1")
        .bind(customer_id)
        .bind(is_gold)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes a customer only if it belongs to `user_id`.
pub(crate) async fn delete_owned<'e, E>(executor: E, customer_id: &str, user_id: &str) -> DbResult<u64>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM customers WHERE id = ?1 AND user_id = ?2")
        .bind(customer_id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, user_id, name, email, address, city, province, zip, phone, is_gold
            FROM customers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by its own ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, user_id, name, email, address, city, province, zip, phone, is_gold
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets the customer owned by a user.
    pub async fn get_by_user(&self, user_id: &str) -> DbResult<Option<Customer>> {
        fetch_by_user(&self.pool, user_id).await
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - The user already has a customer
    /// * `Err(DbError::ForeignKeyViolation)` - The user doesn't exist
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(user_id = %customer.user_id, "Inserting customer");
        insert(&self.pool, customer).await?;
        Ok(customer.clone())
    }

    /// Overwrites the contact fields and gold flag of the customer owned by
    /// `customer.user_id`. The customer's own id is ignored.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - The stored customer after the update
    /// * `Ok(None)` - The user has no customer
    pub async fn update_for_user(&self, customer: &Customer) -> DbResult<Option<Customer>> {
        debug!(user_id = %customer.user_id, "Updating customer");

        let updated = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                address = ?4,
                city = ?5,
                province = ?6,
                zip = ?7,
                phone = ?8,
                is_gold = ?9
            WHERE user_id = ?1
            RETURNING id, user_id, name, email, address, city, province, zip, phone, is_gold
            "#,
        )
        .bind(&customer.user_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(&customer.province)
        .bind(&customer.zip)
        .bind(&customer.phone)
        .bind(customer.is_gold)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Counts customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use vidly_core::{new_id, User};

    async fn setup_user(db: &Database) -> User {
        let user = User {
            id: new_id(),
            name: "client1".to_string(),
            email: format!("{}@gmail.com", new_id()),
            password_hash: "hash".to_string(),
            is_admin: false,
        };
        db.users().insert(&user).await.unwrap()
    }

    #[tokio::test]
    async fn test_customer_by_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = setup_user(&db).await;
        let customer = Customer::new_for_user(&user.id, Some("client1".to_string()));
        db.customers().insert(&customer).await.unwrap();

        assert_eq!(
            db.customers().get_by_user(&user.id).await.unwrap(),
            Some(customer.clone())
        );
        assert_eq!(
            db.customers().get_by_id(&customer.id).await.unwrap(),
            Some(customer)
        );
        assert!(db.customers().get_by_user(&new_id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_one_customer_per_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = setup_user(&db).await;
        db.customers()
            .insert(&Customer::new_for_user(&user.id, None))
            .await
            .unwrap();

        let err = db
            .customers()
            .insert(&Customer::new_for_user(&user.id, None))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on("customers.user_id"));
    }

    #[tokio::test]
    async fn test_customer_requires_existing_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .customers()
            .insert(&Customer::new_for_user(new_id(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_for_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = setup_user(&db).await;
        let original = Customer::new_for_user(&user.id, None);
        db.customers().insert(&original).await.unwrap();

        let edit = Customer {
            id: new_id(),
            name: "Jane".to_string(),
            city: "Lyon".to_string(),
            is_gold: true,
            ..original.clone()
        };
        let updated = db.customers().update_for_user(&edit).await.unwrap().unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.name, "Jane");
        assert_eq!(updated.city, "Lyon");
        assert!(updated.is_gold);

        let stranger = Customer::new_for_user(new_id(), None);
        assert!(db.customers().update_for_user(&stranger).await.unwrap().is_none());
    }
}
