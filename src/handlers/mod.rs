//! Resolver logic, independent of the GraphQL executor. Each handler gets the
//! shared state plus the resolved caller and enforces its own authorization.

pub mod accounts;
pub mod shipments;
