//! Store Gateway (C1) implementations.

mod postgres;

pub use postgres::PostgresStoreGateway;
