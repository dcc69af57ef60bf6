//! Domain layer - Core business entities and logic
//!
//! Storefront concepts independent of infrastructure: users, the catalog,
//! carts, orders and payments, plus the request/response shapes built from them.

pub mod cart;
pub mod money;
pub mod order;
pub mod password;
pub mod payment;
pub mod product;
pub mod user;

pub use cart::{AddToCart, Cart, CartItem, CartItemResponse, CartLine, CartResponse, UpdateCartItem};
pub use money::Money;
pub use order::{
    CreateOrder, Order, OrderItem, OrderItemResponse, OrderResponse, OrderStatus,
    UpdateOrderStatus,
};
pub use password::Password;
pub use payment::{
    CallbackItem, CallbackMetadata, MpesaCallback, MpesaPaymentRequest, MpesaPaymentResponse,
    Payment, PaymentResponse, PaymentStatus, StkPushRequest,
};
pub use product::{Product, ProductInput, ProductQuery, ProductResponse, SortDirection, SortField};
pub use user::{Credentials, RegisterUser, User, UserResponse, UserRole};
