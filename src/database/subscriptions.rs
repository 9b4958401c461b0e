use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{PaymentRecord, PremiumPlan, Subscription, SubscriptionStatus};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_id, status, current_period_start, current_period_end, \
     stripe_subscription_id";

pub async fn list_plans(pool: &PgPool) -> Result<Vec<PremiumPlan>, DatabaseError> {
    let plans = sqlx::query_as::<_, PremiumPlan>(
        "SELECT id, name, price_monthly, price_yearly, features FROM premium_plans ORDER BY price_monthly ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(plans)
}

pub async fn find_plan(pool: &PgPool, plan_id: &str) -> Result<Option<PremiumPlan>, DatabaseError> {
    let plan = sqlx::query_as::<_, PremiumPlan>(
        "SELECT id, name, price_monthly, price_yearly, features FROM premium_plans WHERE id = $1",
    )
    .bind(plan_id)
    .fetch_optional(pool)
    .await?;
    Ok(plan)
}

/// The subscription granting premium right now, if any
pub async fn find_active(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Subscription>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM user_subscriptions
         WHERE user_id = $1 AND status = 'active' AND current_period_end >= $2
         ORDER BY current_period_end DESC
         LIMIT 1",
        SUBSCRIPTION_COLUMNS
    );
    let subscription = sqlx::query_as::<_, Subscription>(&sql)
        .bind(user_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;
    Ok(subscription)
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub plan_id: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub stripe_subscription_id: Option<String>,
}

/// Insert for a subscription, skipped when the Stripe subscription id is already stored
pub(crate) const INSERT_SUBSCRIPTION_SQL: &str = "INSERT INTO user_subscriptions
         (user_id, plan_id, status, current_period_start, current_period_end, stripe_subscription_id)
     VALUES ($1, $2, 'active', $3, $4, $5)
     ON CONFLICT (stripe_subscription_id) DO NOTHING
     RETURNING id, user_id, plan_id, status, current_period_start, current_period_end, stripe_subscription_id";

const INSERT_PAYMENT_SQL: &str = "INSERT INTO payment_history
         (user_id, amount, currency, payment_method, status, stripe_payment_intent_id)
     VALUES ($1, $2, $3, $4, $5, $6)";

/// Store a paid subscription and its payment in one transaction.
///
/// Returns `None` without writing anything when the Stripe subscription was
/// already recorded by an earlier delivery of the same event.
pub async fn activate(
    pool: &PgPool,
    new: &NewSubscription,
    payment: &PaymentRecord,
) -> Result<Option<Subscription>, DatabaseError> {
    let mut tx = pool.begin().await?;

    let subscription = sqlx::query_as::<_, Subscription>(INSERT_SUBSCRIPTION_SQL)
        .bind(new.user_id)
        .bind(&new.plan_id)
        .bind(new.current_period_start)
        .bind(new.current_period_end)
        .bind(&new.stripe_subscription_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(subscription) = subscription else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query(INSERT_PAYMENT_SQL)
        .bind(payment.user_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.payment_method)
        .bind(&payment.status)
        .bind(&payment.stripe_payment_intent_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(subscription))
}

/// Returns the number of subscriptions updated
pub async fn update_status_by_stripe_id(
    pool: &PgPool,
    stripe_subscription_id: &str,
    status: SubscriptionStatus,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE user_subscriptions SET status = $2, updated_at = now() WHERE stripe_subscription_id = $1",
    )
    .bind(stripe_subscription_id)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
