/// CSV export of ledgers and cashflows.
pub mod export;
/// CSV import of market prices.
pub mod import;
