// Registry entities
pub mod customer;
pub mod customer_division;
pub mod customer_shipping_address;
pub mod supplier;

// Lookup tables referenced by offers and articles
pub mod activity;
pub mod article_category;
pub mod critical_issue;
pub mod las_family;
pub mod las_work_line;
pub mod ls_resource;
pub mod machinery;
pub mod material;
pub mod order_type;
pub mod pallet_type;
pub mod seasonality;
pub mod sector;

// Commercial and production entities
pub mod article;
pub mod article_critical_issue;
pub mod article_instruction;
pub mod article_machinery;
pub mod article_material;
pub mod offer;
pub mod production_log;
pub mod production_order;

// Personnel and shop-floor portal
pub mod employee;
pub mod employee_contract;
pub mod employee_portal_token;
pub mod order_assignment;

// Back-office accounts
pub mod user;
