use crate::routes::{admin, equipment, health, laboratory, reservation, root, user};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        user::me,
        laboratory::list_laboratories,
        laboratory::get_laboratory,
        laboratory::create_laboratory,
        laboratory::update_laboratory,
        laboratory::delete_laboratory,
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::list_time_slots,
        admin::create_equipment,
        admin::update_equipment,
        admin::delete_equipment,
        admin::create_time_slot,
        admin::deactivate_time_slot,
        reservation::list_reservations,
        reservation::create_reservation,
        reservation::review_reservation,
        reservation::cancel_reservation
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Users", description = "Authenticated user endpoints"),
        (name = "Laboratories", description = "Laboratory management"),
        (name = "Equipment", description = "Equipment browsing and availability"),
        (name = "Admin", description = "Equipment and time slot administration"),
        (name = "Reservations", description = "Reservation requests and review"),
    ),
    info(
        title = "Lab Reservation API",
        version = "1.0.0",
        description = "Laboratory equipment reservation API",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use crate::doc::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/v1/laboratories/{id}"));
        assert!(paths.contains_key("/api/v1/admin/time-slots/{id}"));
        assert!(paths.contains_key("/api/v1/reservations/{id}/review"));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("jwt"))
        );
    }
}
