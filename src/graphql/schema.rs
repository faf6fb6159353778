//! GraphQL schema definition. Resolvers are thin; the work happens in
//! [`crate::handlers`].

use juniper::{EmptySubscription, ID, RootNode};

use super::context::GraphQLContext;
use super::types::{AddShipmentInput, AuthPayload, ShipmentConnection, ShipmentNode, UpdateShipmentInput, UserNode};
use crate::error::AppError;
use crate::handlers::{accounts, shipments};
use crate::models::Role;
use crate::query::{PaginationInput, ShipmentFilter, ShipmentSort};

pub struct Query;

#[juniper::graphql_object(context = GraphQLContext)]
impl Query {
    /// The authenticated caller, or null for anonymous requests.
    fn me(ctx: &GraphQLContext) -> Option<UserNode> {
        ctx.identity.clone().map(UserNode::from)
    }

    /// A single shipment by id. Requires authentication.
    async fn shipment(ctx: &GraphQLContext, id: ID) -> Result<Option<ShipmentNode>, AppError> {
        shipments::get(&ctx.state, ctx.identity(), &id).await
    }

    /// Filtered, sorted, paged shipments. Requires authentication.
    async fn shipments(
        ctx: &GraphQLContext,
        filter: Option<ShipmentFilter>,
        pagination: Option<PaginationInput>,
        sort: Option<ShipmentSort>,
    ) -> Result<ShipmentConnection, AppError> {
        shipments::list(
            &ctx.state,
            ctx.identity(),
            filter.as_ref(),
            pagination.as_ref(),
            sort.as_ref(),
        )
        .await
    }
}

pub struct Mutation;

#[juniper::graphql_object(context = GraphQLContext)]
impl Mutation {
    /// Creates an account. `role` defaults to employee.
    async fn register(
        ctx: &GraphQLContext,
        name: String,
        email: String,
        password: String,
        role: Option<Role>,
    ) -> Result<AuthPayload, AppError> {
        accounts::register(
            &ctx.state,
            name,
            &email,
            &password,
            role.unwrap_or(Role::Employee),
        )
        .await
    }

    async fn login(
        ctx: &GraphQLContext,
        email: String,
        password: String,
    ) -> Result<AuthPayload, AppError> {
        accounts::login(&ctx.state, &email, &password).await
    }

    /// Admin only.
    async fn add_shipment(
        ctx: &GraphQLContext,
        input: AddShipmentInput,
    ) -> Result<ShipmentNode, AppError> {
        shipments::add(&ctx.state, ctx.identity(), input).await
    }

    /// Admin only. Fields left out of `input` keep their stored values.
    async fn update_shipment(
        ctx: &GraphQLContext,
        id: ID,
        input: UpdateShipmentInput,
    ) -> Result<ShipmentNode, AppError> {
        shipments::update(&ctx.state, ctx.identity(), &id, input).await
    }

    /// Admin only. True when a record was removed.
    async fn delete_shipment(ctx: &GraphQLContext, id: ID) -> Result<bool, AppError> {
        shipments::delete(&ctx.state, ctx.identity(), &id).await
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<GraphQLContext>>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
