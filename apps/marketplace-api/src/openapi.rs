use utoipa::OpenApi;

/// Combined OpenAPI documentation for the marketplace API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace API",
        version = "0.1.0",
        description = "Contacts, bids and coupons over MongoDB with a shared listing grammar",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/contacts", api = domain_contacts::ApiDoc),
        (path = "/api/bids", api = domain_bids::ApiDoc),
        (path = "/api/coupons", api = domain_coupons::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_nested_under_api() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in ["/api/contacts", "/api/bids/{id}", "/api/coupons/apply", "/api/contacts/{id}/restore"] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {expected}: {paths:?}");
        }
    }
}
