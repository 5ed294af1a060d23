//! One repository per resource. Handlers call straight into these; there is
//! no caching layer and no cross-repository coordination.

pub mod categories;
pub mod invoices;
pub mod orders;
pub mod stocks;
pub mod users;

pub use categories::CategoryRepo;
pub use invoices::{InvoiceRepo, OrderRef, PopulatedInvoice};
pub use orders::{OrderRepo, PopulatedOrder, UserRef};
pub use stocks::{CategoryRef, PopulatedStock, StockListQuery, StockRepo, StockSort};
pub use users::UserRepo;
