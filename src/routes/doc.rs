use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{CartLine, DeliveryDetails},
    dto::{
        cart::{
            AddToCartRequest, ApplyCouponRequest, ApplyCouponResponse, CartView, DrawerRequest,
            OrderMessagePreview, UpdateQuantityRequest,
        },
        orders::{CheckoutRequest, CheckoutResponse},
        products::ProductList,
    },
    models::{Coupon, DiscountType, Order, OrderItem, Product},
    pricing::Totals,
    response::{ApiResponse, Meta},
    routes::{cart, health, orders, params, products},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::apply_coupon,
        cart::remove_coupon,
        cart::set_drawer,
        cart::order_message,
        orders::checkout
    ),
    components(
        schemas(
            Product,
            Coupon,
            DiscountType,
            Order,
            OrderItem,
            CartLine,
            DeliveryDetails,
            Totals,
            CartView,
            AddToCartRequest,
            UpdateQuantityRequest,
            ApplyCouponRequest,
            ApplyCouponResponse,
            DrawerRequest,
            OrderMessagePreview,
            CheckoutRequest,
            CheckoutResponse,
            ProductList,
            params::Pagination,
            params::ProductSortBy,
            params::SortOrder,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<ApplyCouponResponse>,
            ApiResponse<CheckoutResponse>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalogue endpoints"),
        (name = "Cart", description = "Cart, coupon and order message endpoints"),
        (name = "Orders", description = "Checkout endpoint"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
