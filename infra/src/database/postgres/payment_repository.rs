//! PostgreSQL implementation of the PaymentRepository trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use sb_core::domain::entities::payment::{
    PaymentIntent, PaymentMethod, PaymentStatus, Subscription, SubscriptionStatus,
};
use sb_core::domain::entities::user::SubscriptionPlan;
use sb_core::errors::DomainError;
use sb_core::repositories::PaymentRepository;

use crate::database::db_error;

const METHOD_COLUMNS: &str =
    "id, user_id, provider_id, brand, last_four, exp_month, exp_year, is_default, created_at";
const SUBSCRIPTION_COLUMNS: &str =
    "id, user_id, plan, status, provider_id, current_period_end, created_at, updated_at";
const INTENT_COLUMNS: &str = "id, user_id, amount_cents, currency, description, status, subscription_id, provider_payment_id, created_at, updated_at";

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

fn read_error(e: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to read payment row: {}", e),
    }
}

fn parse_error(message: String) -> DomainError {
    DomainError::Internal { message }
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_method(row: &PgRow) -> Result<PaymentMethod, DomainError> {
        let exp_month: i32 = row.try_get("exp_month").map_err(read_error)?;
        Ok(PaymentMethod {
            id: row.try_get("id").map_err(read_error)?,
            user_id: row.try_get("user_id").map_err(read_error)?,
            provider_id: row.try_get("provider_id").map_err(read_error)?,
            brand: row.try_get("brand").map_err(read_error)?,
            last_four: row.try_get("last_four").map_err(read_error)?,
            exp_month: exp_month as u32,
            exp_year: row.try_get("exp_year").map_err(read_error)?,
            is_default: row.try_get("is_default").map_err(read_error)?,
            created_at: row.try_get("created_at").map_err(read_error)?,
        })
    }

    fn row_to_subscription(row: &PgRow) -> Result<Subscription, DomainError> {
        let plan: String = row.try_get("plan").map_err(read_error)?;
        let status: String = row.try_get("status").map_err(read_error)?;
        Ok(Subscription {
            id: row.try_get("id").map_err(read_error)?,
            user_id: row.try_get("user_id").map_err(read_error)?,
            plan: plan.parse::<SubscriptionPlan>().map_err(parse_error)?,
            status: status.parse::<SubscriptionStatus>().map_err(parse_error)?,
            provider_id: row.try_get("provider_id").map_err(read_error)?,
            current_period_end: row.try_get("current_period_end").map_err(read_error)?,
            created_at: row.try_get("created_at").map_err(read_error)?,
            updated_at: row.try_get("updated_at").map_err(read_error)?,
        })
    }

    fn row_to_intent(row: &PgRow) -> Result<PaymentIntent, DomainError> {
        let status: String = row.try_get("status").map_err(read_error)?;
        Ok(PaymentIntent {
            id: row.try_get("id").map_err(read_error)?,
            user_id: row.try_get("user_id").map_err(read_error)?,
            amount_cents: row.try_get("amount_cents").map_err(read_error)?,
            currency: row.try_get("currency").map_err(read_error)?,
            description: row.try_get("description").map_err(read_error)?,
            status: status.parse::<PaymentStatus>().map_err(parse_error)?,
            subscription_id: row.try_get("subscription_id").map_err(read_error)?,
            provider_payment_id: row.try_get("provider_payment_id").map_err(read_error)?,
            created_at: row.try_get("created_at").map_err(read_error)?,
            updated_at: row.try_get("updated_at").map_err(read_error)?,
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn create_method(&self, method: PaymentMethod) -> Result<PaymentMethod, DomainError> {
        let query = format!(
            "INSERT INTO payment_methods ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            METHOD_COLUMNS
        );
        sqlx::query(&query)
            .bind(method.id)
            .bind(method.user_id)
            .bind(&method.provider_id)
            .bind(&method.brand)
            .bind(&method.last_four)
            .bind(method.exp_month as i32)
            .bind(method.exp_year)
            .bind(method.is_default)
            .bind(method.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to save payment method"))?;
        Ok(method)
    }

    async fn list_methods(&self, user_id: Uuid) -> Result<Vec<PaymentMethod>, DomainError> {
        let query = format!(
            "SELECT {} FROM payment_methods WHERE user_id = $1 ORDER BY is_default DESC, created_at DESC",
            METHOD_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list payment methods"))?;
        rows.iter().map(Self::row_to_method).collect()
    }

    async fn find_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, DomainError> {
        let query = format!("SELECT {} FROM payment_methods WHERE id = $1", METHOD_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find payment method"))?;
        row.as_ref().map(Self::row_to_method).transpose()
    }

    async fn delete_method(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete payment method"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_default_method(&self, user_id: Uuid, method_id: Uuid) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let result = sqlx::query(
            "UPDATE payment_methods SET is_default = (id = $2) WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(method_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to set default payment method"))?;

        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM payment_methods WHERE id = $1 AND user_id = $2)",
        )
        .bind(method_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to check payment method"))?;

        if result.rows_affected() == 0 || !owned {
            // dropping the transaction rolls it back
            return Err(DomainError::not_found("Payment method"));
        }

        tx.commit().await.map_err(db_error("Failed to commit"))?;
        Ok(())
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        let query = format!(
            "INSERT INTO subscriptions ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            SUBSCRIPTION_COLUMNS
        );
        sqlx::query(&query)
            .bind(subscription.id)
            .bind(subscription.user_id)
            .bind(subscription.plan.as_str())
            .bind(subscription.status.as_str())
            .bind(&subscription.provider_id)
            .bind(subscription.current_period_end)
            .bind(subscription.created_at)
            .bind(subscription.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to save subscription"))?;
        Ok(subscription)
    }

    async fn update_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan = $2, status = $3, provider_id = $4, current_period_end = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.plan.as_str())
        .bind(subscription.status.as_str())
        .bind(&subscription.provider_id)
        .bind(subscription.current_period_end)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update subscription"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Subscription"));
        }
        Ok(subscription)
    }

    async fn find_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        let query = format!("SELECT {} FROM subscriptions WHERE id = $1", SUBSCRIPTION_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find subscription"))?;
        row.as_ref().map(Self::row_to_subscription).transpose()
    }

    async fn find_current_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DomainError> {
        let query = format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 AND status <> 'cancelled' ORDER BY created_at DESC LIMIT 1",
            SUBSCRIPTION_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find current subscription"))?;
        row.as_ref().map(Self::row_to_subscription).transpose()
    }

    async fn create_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError> {
        let query = format!(
            "INSERT INTO payment_intents ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            INTENT_COLUMNS
        );
        sqlx::query(&query)
            .bind(intent.id)
            .bind(intent.user_id)
            .bind(intent.amount_cents)
            .bind(&intent.currency)
            .bind(&intent.description)
            .bind(intent.status.as_str())
            .bind(intent.subscription_id)
            .bind(&intent.provider_payment_id)
            .bind(intent.created_at)
            .bind(intent.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to save payment intent"))?;
        Ok(intent)
    }

    async fn update_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError> {
        let result = sqlx::query(
            "UPDATE payment_intents SET status = $2, provider_payment_id = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(intent.id)
        .bind(intent.status.as_str())
        .bind(&intent.provider_payment_id)
        .bind(intent.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update payment intent"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Payment intent"));
        }
        Ok(intent)
    }

    async fn find_intent(&self, id: Uuid) -> Result<Option<PaymentIntent>, DomainError> {
        let query = format!("SELECT {} FROM payment_intents WHERE id = $1", INTENT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find payment intent"))?;
        row.as_ref().map(Self::row_to_intent).transpose()
    }

    async fn find_intent_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError> {
        let query = format!(
            "SELECT {} FROM payment_intents WHERE provider_payment_id = $1 LIMIT 1",
            INTENT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(provider_payment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find payment intent"))?;
        row.as_ref().map(Self::row_to_intent).transpose()
    }

    async fn list_intents(&self, user_id: Uuid) -> Result<Vec<PaymentIntent>, DomainError> {
        let query = format!(
            "SELECT {} FROM payment_intents WHERE user_id = $1 ORDER BY created_at DESC",
            INTENT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list payment intents"))?;
        rows.iter().map(Self::row_to_intent).collect()
    }

    async fn record_webhook_event(&self, event_id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO webhook_events (event_id) VALUES ($1) ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record webhook event"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn forget_webhook_event(&self, event_id: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM webhook_events WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to forget webhook event"))?;
        Ok(())
    }
}
