pub mod context;
pub mod schema;
pub mod types;

pub use context::GraphQLContext;
pub use schema::{Mutation, Query, Schema, create_schema};
