// Shared stock and fulfillment rules
pub mod stock;

// Registry
pub mod cultivars;
pub mod customers;
pub mod farms;

// Inputs
pub mod applications;
pub mod products;
pub mod purchases;
pub mod transfers;

// Machinery
pub mod fuel;
pub mod machines;
pub mod maintenance;

// Seeds
pub mod sales;
pub mod seed_movements;

// Commercial
pub mod purchase_orders;
pub mod sale_contracts;

// Financial
pub mod finance;

// Reporting and administration
pub mod dashboard;
pub mod users;
