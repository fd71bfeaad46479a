macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared across Vistoria services
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub mod images {
        pub const COLLECTION: &str = v1_path!("/images");
        pub const ITEM: &str = v1_path!("/images/{id}");
    }

    pub mod users {
        pub const CURRENT: &str = v1_path!("/users/me");
        pub const CURRENT_IMAGES: &str = v1_path!("/users/me/images");
        pub const IMAGES: &str = v1_path!("/users/{id}/images");
    }

    pub mod events {
        pub const INVALIDATIONS: &str = v1_path!("/events/invalidations");
    }
}

/// Paths of cached views that catalog mutations invalidate
pub mod views {
    pub const HOME: &str = "/";
    pub const PROFILE: &str = "/profile";
}

/// Helper utilities for working with route templates
pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Strip the version prefix so a route can be mounted on a nested router.
    pub fn relative(route: &str) -> &str {
        route.strip_prefix(super::v1::ROOT).unwrap_or(route)
    }
}
