//! Points ledger: credit package purchases, product redemptions and the
//! catalog they run against.
//!
//! Every balance or stock mutation happens inside one unit of work that holds
//! the relevant row locks (catalog row first, then user row) and writes exactly
//! one history row.

pub use catalog_cache::{
    CacheError, CatalogCache, DEFAULT_SEARCH_TTL, InMemoryCatalogCache, SEARCH_KEY_PREFIX,
    search_key,
};
pub use categories::Category;
pub use commands::{
    CategoryFilter, CreditPackagePatch, NewCreditPackage, NewProduct, ProductFilter, ProductPatch,
    PurchaseCmd, RedeemCmd,
};
pub use credit_packages::CreditPackage;
pub use credit_purchases::CreditPurchase;
pub use error::{Conflict, EngineError, InvalidState, Resource, Transient};
pub use history::HistoryStatus;
pub use money::Money;
pub use ops::{DEFAULT_TX_TIMEOUT, Engine, EngineBuilder, LedgerAudit};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Paginated, Pagination};
pub use point_redemptions::PointRedemption;
pub use products::{Product, ProductSummary};
pub use users::User;

mod catalog_cache;
mod categories;
mod commands;
mod credit_packages;
mod credit_purchases;
mod error;
mod history;
mod money;
mod ops;
mod pagination;
mod point_redemptions;
mod products;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
