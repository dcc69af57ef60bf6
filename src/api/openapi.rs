//! OpenAPI documentation served at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, cart_handler, mpesa_handler, order_handler, product_handler, seed_handler,
};
use crate::domain::{
    AddToCart, CallbackItem, CallbackMetadata, CartItemResponse, CartResponse, CreateOrder,
    Credentials, MpesaCallback, MpesaPaymentRequest, MpesaPaymentResponse, OrderItemResponse,
    OrderResponse, OrderStatus, PaymentResponse, PaymentStatus, ProductInput, ProductResponse,
    RegisterUser, UpdateCartItem, UpdateOrderStatus, UserResponse, UserRole,
};
use crate::services::{LoginResponse, SeedReport};
use crate::types::PaginationMeta;

/// Every response is wrapped as `{code, message, data}`; schemas below describe `data`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Duka Storefront API",
        version = "0.1.0",
        description = "Catalog, cart, checkout and simulated M-Pesa payments. \
                       Responses use the envelope {code, message, data}."
    ),
    servers((url = "http://localhost:3000", description = "Local development server")),
    paths(
        auth_handler::register,
        auth_handler::authenticate,
        product_handler::search_products,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
        cart_handler::get_cart,
        cart_handler::add_to_cart,
        cart_handler::update_cart_item,
        cart_handler::remove_from_cart,
        cart_handler::clear_cart,
        order_handler::create_order,
        order_handler::list_orders,
        order_handler::get_order,
        order_handler::cancel_order,
        order_handler::update_order_status,
        mpesa_handler::initiate_stk_push,
        mpesa_handler::process_callback,
        seed_handler::seed_users,
        seed_handler::seed_products,
        seed_handler::seed_all,
    ),
    components(schemas(
        UserRole,
        RegisterUser,
        Credentials,
        UserResponse,
        LoginResponse,
        ProductInput,
        ProductResponse,
        PaginationMeta,
        AddToCart,
        UpdateCartItem,
        CartItemResponse,
        CartResponse,
        CreateOrder,
        UpdateOrderStatus,
        OrderStatus,
        OrderItemResponse,
        OrderResponse,
        PaymentStatus,
        PaymentResponse,
        MpesaPaymentRequest,
        MpesaPaymentResponse,
        MpesaCallback,
        CallbackMetadata,
        CallbackItem,
        SeedReport,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Products", description = "Catalog search and management"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "M-Pesa", description = "Payment initiation and webhook"),
        (name = "Seed", description = "Demo data")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /v1/api/authentication"))
                        .build(),
                ),
            );
        }
    }
}
