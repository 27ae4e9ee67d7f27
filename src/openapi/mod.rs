use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agro ERP API",
        version = "0.3.0",
        description = r#"
# Agro ERP API

Back office of a seed-producing farm group: farms and plots, agricultural inputs,
machinery, seed stock, sale contracts, purchase orders and accounts receivable / payable.

## Authentication

Register a tenant with `POST /api/v1/auth/register` or log in with `POST /api/v1/auth/login`,
then send the access token on every request:

```
Authorization: Bearer <access-token>
```

Each route requires a permission of the form `<area>:<action>` granted by the user's role.

## Errors

```json
{
  "error": "Conflict",
  "message": "Conflict: sale has a paid receivable and can no longer change",
  "request_id": "0b5b0a9e-0c1e-4c6f-9a55-5d4f1a0b7e21",
  "timestamp": "2025-03-01T12:00:00Z"
}
```

## Pagination

List endpoints accept `page` (from 1) and `per_page`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Sign-up, login and the current user"),
        (name = "users", description = "User administration"),
        (name = "registry", description = "Customers, farms, plots and cultivars"),
        (name = "inputs", description = "Input products, purchases, transfers and applications"),
        (name = "machinery", description = "Machines, fuel and maintenance"),
        (name = "seeds", description = "Seed stock movements and sales"),
        (name = "commercial", description = "Sale contracts and purchase orders"),
        (name = "finance", description = "Accounts receivable and payable"),
        (name = "dashboard", description = "Tenant summary")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,
        crate::handlers::users::me,
        crate::handlers::users::create_user,

        // Registry
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::delete_customer,
        crate::handlers::farms::list_farms,
        crate::handlers::farms::create_farm,
        crate::handlers::farms::create_plot,
        crate::handlers::cultivars::list_cultivars,
        crate::handlers::cultivars::update_cultivar,

        // Inputs
        crate::handlers::products::get_product_stock,
        crate::handlers::purchases::create_purchase,
        crate::handlers::applications::create_application,

        // Machinery
        crate::handlers::fuel::supply_tank,
        crate::handlers::fuel::create_refuel,

        // Seeds
        crate::handlers::seeds::create_buy,
        crate::handlers::sales::list_sales,
        crate::handlers::sales::get_sale,
        crate::handlers::sales::create_sale,
        crate::handlers::sales::update_sale,
        crate::handlers::sales::delete_sale,

        // Commercial
        crate::handlers::sale_contracts::get_contract,
        crate::handlers::sale_contracts::create_contract,
        crate::handlers::purchase_orders::create_purchase_order,

        // Finance
        crate::handlers::finance::list_receivables,
        crate::handlers::finance::pay_receivable,

        // Dashboard
        crate::handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::ResponseMeta,
        )
    )
)]
pub struct ApiDocV1;

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
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_core_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Agro ERP API"));
        assert!(json.contains("/api/v1/sales/{id}"));
        assert!(json.contains("/api/v1/fuel-tanks/{id}/supply"));
        assert!(json.contains("bearer_auth"));
    }
}
