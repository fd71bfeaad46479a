use std::{any::type_name_of_val, fmt, sync::Arc};

use vistoria_core::{
    catalog::ImageCatalogService,
    database::{ImageRepository, UserRepository},
    users::UserProvisioning,
};

use crate::infra::{config::Config, invalidation::InvalidationBus};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<ImageCatalogService>,
    pub users: Arc<UserProvisioning>,
    /// Kept for health probes.
    pub images: Arc<dyn ImageRepository>,
    pub invalidations: Arc<InvalidationBus>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("images", &type_name_of_val(self.images.as_ref()))
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        images: Arc<dyn ImageRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let invalidations = Arc::new(InvalidationBus::default());
        let catalog = ImageCatalogService::new(
            Arc::clone(&images),
            Arc::clone(&users),
            invalidations.clone(),
        )
        .with_max_page_size(config.catalog.max_page_size);

        Self {
            config,
            catalog: Arc::new(catalog),
            users: Arc::new(UserProvisioning::new(users)),
            images,
            invalidations,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
