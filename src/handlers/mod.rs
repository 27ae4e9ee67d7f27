pub mod applications;
pub mod auth;
pub mod common;
pub mod cultivars;
pub mod customers;
pub mod dashboard;
pub mod farms;
pub mod finance;
pub mod fuel;
pub mod machines;
pub mod maintenance;
pub mod products;
pub mod purchase_orders;
pub mod purchases;
pub mod sale_contracts;
pub mod sales;
pub mod seeds;
pub mod transfers;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        applications::ApplicationService, cultivars::CultivarService, customers::CustomerService,
        dashboard::DashboardService, farms::FarmService, finance::FinanceService,
        fuel::FuelService, machines::MachineService, maintenance::MaintenanceService,
        products::ProductService, purchase_orders::PurchaseOrderService,
        purchases::PurchaseService, sale_contracts::SaleContractService, sales::SaleService,
        seed_movements::SeedMovementService, transfers::TransferService, users::UserService,
    },
};

pub use crate::AppState;

/// Services shared by every HTTP handler.
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub farms: Arc<FarmService>,
    pub cultivars: Arc<CultivarService>,
    pub products: Arc<ProductService>,
    pub purchases: Arc<PurchaseService>,
    pub transfers: Arc<TransferService>,
    pub applications: Arc<ApplicationService>,
    pub machines: Arc<MachineService>,
    pub fuel: Arc<FuelService>,
    pub maintenance: Arc<MaintenanceService>,
    pub seed_movements: Arc<SeedMovementService>,
    pub sales: Arc<SaleService>,
    pub sale_contracts: Arc<SaleContractService>,
    pub purchase_orders: Arc<PurchaseOrderService>,
    pub finance: Arc<FinanceService>,
    pub dashboard: Arc<DashboardService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        Self {
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            farms: Arc::new(FarmService::new(db_pool.clone())),
            cultivars: Arc::new(CultivarService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool.clone())),
            purchases: Arc::new(PurchaseService::new(db_pool.clone(), event_sender.clone())),
            transfers: Arc::new(TransferService::new(db_pool.clone(), event_sender.clone())),
            applications: Arc::new(ApplicationService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            machines: Arc::new(MachineService::new(db_pool.clone())),
            fuel: Arc::new(FuelService::new(db_pool.clone(), event_sender.clone())),
            maintenance: Arc::new(MaintenanceService::new(db_pool.clone())),
            seed_movements: Arc::new(SeedMovementService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            sales: Arc::new(SaleService::new(db_pool.clone(), event_sender.clone())),
            sale_contracts: Arc::new(SaleContractService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            purchase_orders: Arc::new(PurchaseOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            finance: Arc::new(FinanceService::new(db_pool.clone(), event_sender)),
            dashboard: Arc::new(DashboardService::new(
                db_pool.clone(),
                config.low_stock_threshold,
            )),
            users: Arc::new(UserService::new(db_pool)),
        }
    }
}
