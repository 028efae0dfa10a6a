use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, IsolationLevel,
    TransactionTrait,
};
use tokio::time::{Instant, timeout_at};

use crate::{
    CatalogCache, DEFAULT_SEARCH_TTL, EngineError, InMemoryCatalogCache, ResultEngine, Transient,
};

mod categories;
mod history;
mod locks;
mod packages;
mod products;
mod purchase;
mod redeem;
mod users;

pub use history::LedgerAudit;

/// Upper bound of a unit of work when the caller does not pass a deadline.
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(10);

type UnitFuture<'c, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'c>>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    catalog_cache: Arc<dyn CatalogCache>,
    tx_timeout: Duration,
    search_ttl: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Round-trip to the store, used by health checks.
    pub async fn ping(&self) -> ResultEngine<()> {
        self.database.ping().await?;
        Ok(())
    }

    /// Open a unit of work. Postgres runs at READ COMMITTED; the row locks
    /// taken inside are what serialize conflicting writers.
    async fn begin_unit(&self) -> Result<DatabaseTransaction, DbErr> {
        match self.database.get_database_backend() {
            DbBackend::Postgres => {
                self.database
                    .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
                    .await
            }
            _ => self.database.begin().await,
        }
    }

    /// Run `work` inside one unit of work, committing on success.
    ///
    /// Errors and an elapsed deadline drop the transaction, which rolls it back.
    /// The deadline bounds the work, not the commit: once COMMIT is sent the
    /// outcome is reported as is, so a `DeadlineExceeded` always means nothing
    /// was written.
    pub(crate) async fn with_tx<T, F>(&self, deadline: Option<Instant>, work: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c Engine, &'c DatabaseTransaction) -> UnitFuture<'c, T> + Send,
    {
        let deadline = deadline.unwrap_or_else(|| Instant::now() + self.tx_timeout);
        let unit = async {
            let db_tx = self.begin_unit().await?;
            let value = work(self, &db_tx).await?;
            Ok::<_, EngineError>((db_tx, value))
        };

        let (db_tx, value) = match timeout_at(deadline, unit).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("unit of work aborted: deadline exceeded");
                return Err(EngineError::Transient(Transient::DeadlineExceeded));
            }
        };
        // The work may finish without yielding after the deadline has passed.
        if Instant::now() >= deadline {
            tracing::warn!("unit of work aborted before commit: deadline exceeded");
            return Err(EngineError::Transient(Transient::DeadlineExceeded));
        }
        db_tx.commit().await?;
        Ok(value)
    }

    /// Drop every cached search page. Failures only cost freshness.
    fn invalidate_search_cache(&self) {
        match self
            .catalog_cache
            .invalidate_prefix(crate::SEARCH_KEY_PREFIX)
        {
            Ok(dropped) => tracing::debug!(dropped, "search cache invalidated"),
            Err(err) => tracing::warn!(%err, "search cache invalidation failed"),
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    catalog_cache: Option<Arc<dyn CatalogCache>>,
    tx_timeout: Option<Duration>,
    search_ttl: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Cache used by product search. Defaults to an in-process cache.
    pub fn catalog_cache(mut self, cache: Arc<dyn CatalogCache>) -> EngineBuilder {
        self.catalog_cache = Some(cache);
        self
    }

    /// Timeout applied to units of work started without an explicit deadline.
    pub fn tx_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.tx_timeout = Some(timeout);
        self
    }

    pub fn search_ttl(mut self, ttl: Duration) -> EngineBuilder {
        self.search_ttl = Some(ttl);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let tx_timeout = self.tx_timeout.unwrap_or(DEFAULT_TX_TIMEOUT);
        if tx_timeout.is_zero() {
            return Err(EngineError::Validation(
                "transaction timeout must be > 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            catalog_cache: self
                .catalog_cache
                .unwrap_or_else(|| Arc::new(InMemoryCatalogCache::new())),
            tx_timeout,
            search_ttl: self.search_ttl.unwrap_or(DEFAULT_SEARCH_TTL),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};
    use uuid::Uuid;

    use super::*;
    use crate::{
        Money, NewCreditPackage, NewProduct, Pagination, PurchaseCmd, RedeemCmd, Resource,
    };

    struct Fixture {
        engine: Engine,
        user: Uuid,
        package: Uuid,
        product: Uuid,
    }

    async fn fixture() -> Fixture {
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        let user = engine.new_user("ann@example.com", "Ann").await.unwrap();
        let package = engine
            .new_credit_package(NewCreditPackage::new("Gold", Money::from_minor(25_00), 250))
            .await
            .unwrap();
        let product = engine
            .new_product(NewProduct::new("Mug", 100, 2).in_offer_pool(true))
            .await
            .unwrap();
        Fixture {
            engine,
            user,
            package,
            product,
        }
    }

    async fn assert_nothing_redeemed(f: &Fixture, balance: i64) {
        assert_eq!(f.engine.user(f.user).await.unwrap().point_balance, balance);
        assert_eq!(f.engine.product(f.product).await.unwrap().stock_quantity, 2);
        let redemptions = f
            .engine
            .redemptions_for_user(f.user, Pagination::default())
            .await
            .unwrap();
        assert_eq!(redemptions.total, 0);
    }

    #[tokio::test]
    async fn deadline_during_work_discards_applied_writes() {
        let f = fixture().await;
        f.engine
            .purchase_package(PurchaseCmd::new(f.user, f.package, Money::from_minor(25_00)))
            .await
            .unwrap();

        let cmd = RedeemCmd::new(f.user, f.product, 1);
        let deadline = Instant::now() + Duration::from_millis(200);
        let err = f
            .engine
            .with_tx(Some(deadline), |engine, db_tx| {
                Box::pin(async move {
                    let id = engine.apply_redemption(db_tx, cmd).await?;
                    // Balance, stock and history are written; the unit is still open.
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(id)
                })
            })
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::Transient(Transient::DeadlineExceeded));
        assert!(err.is_retryable());
        assert_nothing_redeemed(&f, 250).await;
    }

    #[tokio::test]
    async fn deadline_passed_when_work_returns_skips_commit() {
        let f = fixture().await;

        let cmd = PurchaseCmd::new(f.user, f.package, Money::from_minor(25_00));
        let deadline = Instant::now() + Duration::from_millis(50);
        let err = f
            .engine
            .with_tx(Some(deadline), |engine, db_tx| {
                Box::pin(async move {
                    let id = engine.apply_purchase(db_tx, cmd).await?;
                    // Blocks without yielding, so the timer never gets to fire.
                    std::thread::sleep(Duration::from_millis(100));
                    Ok(id)
                })
            })
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::Transient(Transient::DeadlineExceeded));
        assert_eq!(f.engine.user(f.user).await.unwrap().point_balance, 0);
        let purchases = f
            .engine
            .purchases_for_user(f.user, Pagination::default())
            .await
            .unwrap();
        assert_eq!(purchases.total, 0);
    }

    #[tokio::test]
    async fn work_finished_in_time_commits() {
        let f = fixture().await;

        let cmd = PurchaseCmd::new(f.user, f.package, Money::from_minor(25_00));
        let deadline = Instant::now() + Duration::from_secs(5);
        f.engine
            .with_tx(Some(deadline), |engine, db_tx| {
                Box::pin(engine.apply_purchase(db_tx, cmd))
            })
            .await
            .unwrap();
        assert_eq!(f.engine.user(f.user).await.unwrap().point_balance, 250);

        let missing = f
            .engine
            .with_tx(Some(deadline), |engine, db_tx| {
                Box::pin(async move { engine.lock_user(db_tx, Uuid::new_v4()).await.map(|_| ()) })
            })
            .await
            .unwrap_err();
        assert_eq!(missing, EngineError::NotFound(Resource::User));
    }
}
