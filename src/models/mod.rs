//! Database entities. Every table except `tenants` carries a `tenant_id`.

pub mod account_payable;
pub mod account_receivable;
pub mod application;
pub mod buy;
pub mod cultivar;
pub mod customer;
pub mod discard;
pub mod enums;
pub mod farm;
pub mod fuel_tank;
pub mod harvest;
pub mod industry_sale;
pub mod machine;
pub mod maintenance;
pub mod planting;
pub mod plot;
pub mod product;
pub mod product_stock;
pub mod purchase;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod refuel;
pub mod sale_contract;
pub mod sale_contract_item;
pub mod sale_exit;
pub mod tenant;
pub mod transfer;
pub mod user;

pub use enums::{AccountStatus, PaymentTerm};
