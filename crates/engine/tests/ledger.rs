use std::{sync::Arc, time::Duration};

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tokio::time::Instant;
use uuid::Uuid;

use engine::{
    CacheError, CatalogCache, CategoryFilter, Conflict, CreditPackagePatch, Engine, EngineError,
    InMemoryCatalogCache, InvalidState, Money, NewCreditPackage, NewProduct, Pagination,
    ProductFilter, ProductPatch, ProductSummary, PurchaseCmd, RedeemCmd, Resource, Transient,
};
use migration::MigratorTrait;

async fn connect(url: &str) -> DatabaseConnection {
    // One connection: SQLite has no row locks, the pool serializes units of work.
    let mut options = ConnectOptions::new(url.to_string());
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(options).await.unwrap()
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = connect("sqlite::memory:").await;
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_cache(cache: Arc<dyn CatalogCache>) -> Engine {
    let db = connect("sqlite::memory:").await;
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .catalog_cache(cache)
        .build()
        .await
        .unwrap()
}

async fn engine_with_file_db() -> (Engine, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = connect(&url).await;
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .build()
        .await
        .unwrap();
    (engine, url, path)
}

fn money(value: &str) -> Money {
    value.parse().unwrap()
}

async fn new_user(engine: &Engine, email: &str) -> Uuid {
    engine.new_user(email, "Test User").await.unwrap()
}

async fn package(engine: &Engine, price: &str, points: i64) -> Uuid {
    engine
        .new_credit_package(NewCreditPackage::new("Starter", money(price), points))
        .await
        .unwrap()
}

async fn offered_product(engine: &Engine, name: &str, cost: i64, stock: i64) -> Uuid {
    engine
        .new_product(NewProduct::new(name, cost, stock).in_offer_pool(true))
        .await
        .unwrap()
}

/// Give `user` exactly `points` through a one-off package.
async fn fund(engine: &Engine, user: Uuid, points: i64) {
    let pkg = package(engine, "1.00", points).await;
    engine
        .purchase_package(PurchaseCmd::new(user, pkg, money("1.00")))
        .await
        .unwrap();
}

#[tokio::test]
async fn purchase_credits_reward_points_and_records_history() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "25.00", 250).await;

    let purchase_id = engine
        .purchase_package(PurchaseCmd::new(user, pkg, money("25.00")))
        .await
        .unwrap();

    assert_eq!(engine.user(user).await.unwrap().point_balance, 250);
    let history = engine
        .purchases_for_user(user, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    let row = &history.items[0];
    assert_eq!(row.id, purchase_id);
    assert_eq!(row.amount_paid, money("25.00"));
    assert_eq!(row.points_awarded, 250);
    assert_eq!(row.credit_package_id, pkg);
}

#[tokio::test]
async fn purchase_with_wrong_amount_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "25.00", 250).await;

    let err = engine
        .purchase_package(PurchaseCmd::new(user, pkg, money("24.99")))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::Conflict(Conflict::AmountMismatch));
    assert_eq!(engine.user(user).await.unwrap().point_balance, 0);
    let history = engine
        .purchases_for_user(user, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 0);
}

#[tokio::test]
async fn purchase_of_inactive_or_missing_package_fails() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "10.00", 100).await;
    engine
        .update_credit_package(pkg, CreditPackagePatch::default().is_active(false))
        .await
        .unwrap();

    let err = engine
        .purchase_package(PurchaseCmd::new(user, pkg, money("10.00")))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidState(InvalidState::PackageInactive));

    let err = engine
        .purchase_package(PurchaseCmd::new(user, Uuid::new_v4(), money("10.00")))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(Resource::CreditPackage));

    let active = package(&engine, "10.00", 100).await;
    let err = engine
        .purchase_package(PurchaseCmd::new(Uuid::new_v4(), active, money("10.00")))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(Resource::User));
}

#[tokio::test]
async fn non_positive_amount_is_a_validation_error() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "10.00", 100).await;

    let err = engine
        .purchase_package(PurchaseCmd::new(user, pkg, Money::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn redemption_deducts_points_and_stock_together() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    fund(&engine, user, 500).await;
    let product = offered_product(&engine, "Mug", 100, 5).await;

    let redemption_id = engine
        .redeem_product(RedeemCmd::new(user, product, 2))
        .await
        .unwrap();

    assert_eq!(engine.user(user).await.unwrap().point_balance, 300);
    assert_eq!(engine.product(product).await.unwrap().stock_quantity, 3);
    let history = engine
        .redemptions_for_user(user, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].id, redemption_id);
    assert_eq!(history.items[0].points_used, 200);
    assert_eq!(history.items[0].quantity, 2);
}

#[tokio::test]
async fn insufficient_points_leaves_everything_untouched() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    fund(&engine, user, 50).await;
    let product = offered_product(&engine, "Mug", 100, 3).await;

    let err = engine
        .redeem_product(RedeemCmd::new(user, product, 1))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::Conflict(Conflict::InsufficientPoints));
    assert_eq!(engine.user(user).await.unwrap().point_balance, 50);
    assert_eq!(engine.product(product).await.unwrap().stock_quantity, 3);
    let history = engine
        .redemptions_for_user(user, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 0);
}

#[tokio::test]
async fn redemption_checks_product_state_before_balance() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    fund(&engine, user, 1_000).await;

    let hidden = engine
        .new_product(NewProduct::new("Hidden", 100, 10))
        .await
        .unwrap();
    let err = engine
        .redeem_product(RedeemCmd::new(user, hidden, 1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidState(InvalidState::ProductNotOffered));

    let retired = offered_product(&engine, "Retired", 100, 10).await;
    engine
        .update_product(retired, ProductPatch::default().is_active(false))
        .await
        .unwrap();
    let err = engine
        .redeem_product(RedeemCmd::new(user, retired, 1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidState(InvalidState::ProductInactive));

    let scarce = offered_product(&engine, "Scarce", 100, 1).await;
    let err = engine
        .redeem_product(RedeemCmd::new(user, scarce, 2))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Conflict(Conflict::InsufficientStock));

    let err = engine
        .redeem_product(RedeemCmd::new(user, scarce, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .redeem_product(RedeemCmd::new(user, Uuid::new_v4(), 1))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(Resource::Product));

    assert_eq!(engine.user(user).await.unwrap().point_balance, 1_000);
}

#[tokio::test]
async fn concurrent_redemptions_of_last_unit_have_one_winner() {
    let (engine, _db) = engine_with_db().await;
    let engine = Arc::new(engine);
    let user = new_user(&engine, "alice@example.com").await;
    fund(&engine, user, 150).await;
    let product = offered_product(&engine, "Last one", 100, 1).await;

    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.redeem_product(RedeemCmd::new(user, product, 1)).await }
    });
    let second = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.redeem_product(RedeemCmd::new(user, product, 1)).await }
    });
    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(failure, EngineError::Conflict(Conflict::InsufficientStock));
    assert_eq!(engine.user(user).await.unwrap().point_balance, 50);
    assert_eq!(engine.product(product).await.unwrap().stock_quantity, 0);
}

#[tokio::test]
async fn concurrent_redemptions_never_oversell() {
    let (engine, _db) = engine_with_db().await;
    let engine = Arc::new(engine);
    let stock = 3;
    let callers = 8;
    let product = offered_product(&engine, "Limited", 10, stock).await;

    let mut handles = Vec::new();
    for i in 0..callers {
        let user = new_user(&engine, &format!("user{i}@example.com")).await;
        fund(&engine, user, 100).await;
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.redeem_product(RedeemCmd::new(user, product, 1)).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert_eq!(err, EngineError::Conflict(Conflict::InsufficientStock)),
        }
    }
    assert_eq!(succeeded, stock.min(callers));
    assert_eq!(engine.product(product).await.unwrap().stock_quantity, 0);
}

#[tokio::test]
async fn audit_matches_history_after_mixed_activity() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "25.00", 250).await;
    let product = offered_product(&engine, "Mug", 40, 10).await;

    for _ in 0..3 {
        engine
            .purchase_package(PurchaseCmd::new(user, pkg, money("25.00")))
            .await
            .unwrap();
    }
    engine
        .redeem_product(RedeemCmd::new(user, product, 4))
        .await
        .unwrap();
    let _ = engine
        .redeem_product(RedeemCmd::new(user, product, 100))
        .await
        .unwrap_err();

    let audit = engine.audit_user_ledger(user).await.unwrap();
    assert_eq!(audit.points_credited, 750);
    assert_eq!(audit.points_spent, 160);
    assert_eq!(audit.point_balance, 590);
    assert!(audit.consistent);
}

#[tokio::test]
async fn audit_flags_balance_drift() {
    let (engine, db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    fund(&engine, user, 100).await;

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE users SET point_balance = ? WHERE id = ?",
        vec![999_i64.into(), user.to_string().into()],
    ))
    .await
    .unwrap();

    let audit = engine.audit_user_ledger(user).await.unwrap();
    assert_eq!(audit.point_balance, 999);
    assert_eq!(audit.points_credited, 100);
    assert!(!audit.consistent);
}

#[tokio::test]
async fn idempotent_purchase_replay_credits_once() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "5.00", 50).await;

    let cmd = PurchaseCmd::new(user, pkg, money("5.00")).idempotency_key("order-1");
    let first = engine.purchase_package(cmd.clone()).await.unwrap();
    let replay = engine.purchase_package(cmd).await.unwrap();

    assert_eq!(first, replay);
    assert_eq!(engine.user(user).await.unwrap().point_balance, 50);

    let other = engine
        .purchase_package(PurchaseCmd::new(user, pkg, money("5.00")).idempotency_key("order-2"))
        .await
        .unwrap();
    assert_ne!(first, other);
    assert_eq!(engine.user(user).await.unwrap().point_balance, 100);
}

#[tokio::test]
async fn idempotent_redemption_replay_survives_empty_stock() {
    let (engine, _db) = engine_with_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    fund(&engine, user, 300).await;
    let product = offered_product(&engine, "Mug", 100, 1).await;

    let cmd = RedeemCmd::new(user, product, 1).idempotency_key("checkout-7");
    let first = engine.redeem_product(cmd.clone()).await.unwrap();
    let replay = engine.redeem_product(cmd).await.unwrap();

    assert_eq!(first, replay);
    assert_eq!(engine.user(user).await.unwrap().point_balance, 200);
    assert_eq!(engine.product(product).await.unwrap().stock_quantity, 0);
}

#[tokio::test]
async fn elapsed_deadline_rolls_back_the_purchase() {
    let (engine, url, path) = engine_with_file_db().await;
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "5.00", 50).await;

    let err = engine
        .purchase_package(PurchaseCmd::new(user, pkg, money("5.00")).deadline(Instant::now()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Transient(Transient::DeadlineExceeded));
    assert!(err.is_retryable());

    drop(engine);
    let db = connect(&url).await;
    let engine = Engine::builder().database(db).build().await.unwrap();
    assert_eq!(engine.user(user).await.unwrap().point_balance, 0);
    let history = engine
        .purchases_for_user(user, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 0);

    drop(engine);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    new_user(&engine, "alice@example.com").await;

    let err = engine
        .new_user(" Alice@Example.com ", "Alice again")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Conflict(Conflict::DuplicateEmail));
}

#[tokio::test]
async fn concurrent_registrations_with_one_email_have_one_winner() {
    let (engine, _db) = engine_with_db().await;
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .new_user("bob@example.com", &format!("Bob {i}"))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err, EngineError::Conflict(Conflict::DuplicateEmail)),
        }
    }
    assert_eq!(created, 1);

    // The failed inserts were rolled back; the store keeps serving writes.
    new_user(&engine, "carol@example.com").await;
}

#[tokio::test]
async fn redemption_by_unknown_user_leaves_stock_untouched() {
    let (engine, _db) = engine_with_db().await;
    let product = offered_product(&engine, "Mug", 100, 3).await;
    let ghost = Uuid::new_v4();

    let err = engine
        .redeem_product(RedeemCmd::new(ghost, product, 1))
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::NotFound(Resource::User));
    assert_eq!(engine.product(product).await.unwrap().stock_quantity, 3);
    let err = engine
        .redemptions_for_user(ghost, Pagination::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(Resource::User));
}

#[tokio::test]
async fn audits_interleaved_with_purchases_stay_consistent() {
    let (engine, _db) = engine_with_db().await;
    let engine = Arc::new(engine);
    let user = new_user(&engine, "alice@example.com").await;
    let pkg = package(&engine, "2.00", 20).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .purchase_package(PurchaseCmd::new(user, pkg, money("2.00")))
                .await
                .unwrap();
            engine.audit_user_ledger(user).await.unwrap()
        }));
    }

    for handle in handles {
        let audit = handle.await.unwrap();
        assert!(audit.consistent, "drift reported: {audit:?}");
        assert_eq!(audit.point_balance, audit.points_credited);
    }
    assert_eq!(engine.user(user).await.unwrap().point_balance, 200);
}

#[tokio::test]
async fn package_admin_validates_and_patches() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_credit_package(NewCreditPackage::new("  ", money("1.00"), 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine
        .new_credit_package(NewCreditPackage::new("Free", Money::ZERO, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let pkg = package(&engine, "10.00", 100).await;
    let err = engine
        .update_credit_package(pkg, CreditPackagePatch::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("no fields to update".to_string()));

    let updated = engine
        .update_credit_package(
            pkg,
            CreditPackagePatch::default()
                .price(money("12.50"))
                .reward_points(130),
        )
        .await
        .unwrap();
    assert_eq!(updated.price, money("12.50"));
    assert_eq!(updated.reward_points, 130);
    assert_eq!(updated.name, "Starter");

    let err = engine
        .update_credit_package(Uuid::new_v4(), CreditPackagePatch::default().name("x"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(Resource::CreditPackage));
}

#[tokio::test]
async fn package_listing_is_paginated_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(package(&engine, "1.00", 10).await);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let page = engine
        .credit_packages(Pagination::new(1, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, ids[2]);

    let last = engine
        .credit_packages(Pagination::new(2, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, ids[0]);
}

#[tokio::test]
async fn product_listing_filters_by_category_and_flags() {
    let (engine, _db) = engine_with_db().await;
    let gadgets = engine.new_category("Gadgets", "").await.unwrap();
    let in_gadgets = engine
        .new_product(
            NewProduct::new("Speaker", 300, 2)
                .category_id(gadgets)
                .in_offer_pool(true),
        )
        .await
        .unwrap();
    let loose = engine
        .new_product(NewProduct::new("Sticker", 5, 100))
        .await
        .unwrap();

    let by_category = engine
        .products(
            Pagination::default(),
            ProductFilter {
                category: CategoryFilter::Is(gadgets),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_category.total, 1);
    assert_eq!(by_category.items[0].id, in_gadgets);

    let uncategorized = engine
        .products(
            Pagination::default(),
            ProductFilter {
                category: CategoryFilter::Uncategorized,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(uncategorized.items[0].id, loose);

    let offered = engine
        .products(
            Pagination::default(),
            ProductFilter {
                is_in_offer_pool: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(offered.total, 1);

    let err = engine
        .new_product(NewProduct::new("Orphan", 1, 1).category_id(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound(Resource::Category));
}

#[tokio::test]
async fn products_by_category_lists_redeemable_cheapest_first() {
    let (engine, _db) = engine_with_db().await;
    let books = engine.new_category("Books", "Paper").await.unwrap();
    for (name, cost, offered) in [("Atlas", 400, true), ("Zine", 50, true), ("Draft", 10, false)] {
        engine
            .new_product(
                NewProduct::new(name, cost, 1)
                    .category_id(books)
                    .in_offer_pool(offered),
            )
            .await
            .unwrap();
    }

    let listed = engine
        .products_by_category(books, Pagination::default())
        .await
        .unwrap();
    let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Zine", "Atlas"]);
}

#[tokio::test]
async fn search_is_cached_until_a_product_changes() {
    let cache = Arc::new(InMemoryCatalogCache::new());
    let engine = engine_with_cache(cache.clone()).await;
    let user = new_user(&engine, "alice@example.com").await;
    fund(&engine, user, 1_000).await;
    let mug = offered_product(&engine, "Coffee Mug", 100, 5).await;
    offered_product(&engine, "Tea Cup", 80, 5).await;

    let hits = engine
        .search_products("MUG", Pagination::default())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, mug);
    assert_eq!(cache.len(), 1);

    // Redemptions only change stock; cached pages may stay.
    engine
        .redeem_product(RedeemCmd::new(user, mug, 1))
        .await
        .unwrap();
    assert_eq!(cache.len(), 1);

    engine
        .update_product(mug, ProductPatch::default().name("Travel Mug"))
        .await
        .unwrap();
    assert!(cache.is_empty());

    let hits = engine
        .search_products("mug", Pagination::default())
        .await
        .unwrap();
    assert_eq!(hits[0].name, "Travel Mug");
    assert_eq!(hits[0].stock_quantity, 4);

    engine.set_offer_status(mug, false).await.unwrap();
    assert!(cache.is_empty());
    let hits = engine
        .search_products("mug", Pagination::default())
        .await
        .unwrap();
    assert!(hits.is_empty());
    assert!(cache.is_empty());
}

#[derive(Debug)]
struct BrokenCache;

impl CatalogCache for BrokenCache {
    fn get(&self, _key: &str) -> Result<Option<Vec<ProductSummary>>, CacheError> {
        Err(CacheError::Unavailable("down".to_string()))
    }

    fn put(
        &self,
        _key: &str,
        _value: Vec<ProductSummary>,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("down".to_string()))
    }

    fn invalidate_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Err(CacheError::Unavailable("down".to_string()))
    }
}

#[tokio::test]
async fn cache_failures_never_fail_reads_or_writes() {
    let engine = engine_with_cache(Arc::new(BrokenCache)).await;
    let lamp = offered_product(&engine, "Desk Lamp", 200, 1).await;

    let hits = engine
        .search_products("lamp", Pagination::default())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let updated = engine
        .update_product(lamp, ProductPatch::default().point_cost(250))
        .await
        .unwrap();
    assert_eq!(updated.point_cost, 250);
}

#[tokio::test]
async fn blank_search_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .search_products("   ", Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn product_patch_validates_fields() {
    let (engine, _db) = engine_with_db().await;
    let product = offered_product(&engine, "Mug", 100, 5).await;

    let err = engine
        .update_product(product, ProductPatch::default().stock_quantity(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .update_product(product, ProductPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let unchanged = engine.product(product).await.unwrap();
    assert_eq!(unchanged.stock_quantity, 5);
}
