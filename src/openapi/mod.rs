use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StorePulse API",
        description = r#"
# StorePulse retail API

A small retail-management service: product catalog, customer order ledger,
accounts with session tokens, and product feedback.

All dashboard numbers are derived, never stored. The status breakdown, top
product ranking, customer directory, and sales trend are recomputed from the
full order snapshot on every request.

## Authentication

Only `/api/auth/me` and `/api/auth/logout` require a token. Register or log
in to receive one, then send it as:

```
Authorization: Bearer <token>
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "orders", description = "Order ledger endpoints"),
        (name = "products", description = "Product catalog endpoints"),
        (name = "customers", description = "Derived customer directory"),
        (name = "analytics", description = "Derived dashboard report"),
        (name = "auth", description = "Accounts and sessions"),
        (name = "feedback", description = "Product feedback endpoints"),
        (name = "admin", description = "Administrative endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Derived data
        crate::handlers::customers::list_customers,
        crate::handlers::analytics::dashboard,

        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        crate::handlers::auth::logout,

        // Feedback
        crate::handlers::feedback::create_feedback,
        crate::handlers::feedback::product_feedback,

        // Admin & health
        crate::handlers::admin::seed,
        crate::handlers::health::root,
        crate::handlers::health::health,
    ),
    components(
        schemas(
            // Domain models
            crate::models::Order,
            crate::models::LineItem,
            crate::models::Product,
            crate::models::Feedback,
            crate::models::UserProfile,
            crate::models::UserRole,

            // Order types
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,
            crate::services::orders::LineItemInput,
            crate::services::orders::OrderListResponse,

            // Product types
            crate::services::products::CreateProductRequest,
            crate::services::products::UpdateProductRequest,
            crate::services::products::ProductListResponse,

            // Derived data types
            crate::services::analytics::DashboardReport,
            crate::services::analytics::DashboardStats,
            crate::services::analytics::StatusCount,
            crate::services::analytics::ProductSales,
            crate::services::analytics::CustomerSummary,
            crate::services::analytics::DailySales,
            crate::handlers::customers::CustomerListResponse,

            // Auth types
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::MeResponse,
            crate::handlers::auth::LogoutResponse,

            // Feedback types
            crate::services::feedback::CreateFeedbackRequest,
            crate::services::feedback::ProductFeedback,

            // Admin & health types
            crate::services::seed::SeedReport,
            crate::handlers::health::ServiceBanner,
            crate::handlers::health::HealthInfo,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
