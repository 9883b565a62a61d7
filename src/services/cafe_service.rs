use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::{
    AddCafeForm, Cafe, CafeListResponse, CafeProjection, RepositoryError, ServiceError,
    ServiceResult,
};
use crate::repositories::CafeRepository;

/// Service for managing cafe records
pub struct CafeService {
    repository: Arc<dyn CafeRepository>,
}

impl CafeService {
    /// Create a new CafeService
    pub fn new(repository: Arc<dyn CafeRepository>) -> Self {
        Self { repository }
    }

    /// List every cafe record
    #[instrument(skip(self))]
    pub async fn list_cafes(&self) -> ServiceResult<CafeListResponse> {
        info!("Listing all cafes");

        let cafes = self.repository.find_all().await?;

        info!("Found {} cafes", cafes.len());
        Ok(CafeListResponse { cafes })
    }

    /// Find cafes whose location exactly matches the given string
    #[instrument(skip(self), fields(location = %location))]
    pub async fn search_by_location(&self, location: &str) -> ServiceResult<Vec<Cafe>> {
        info!("Searching cafes by location");

        let cafes = self.repository.find_by_location(location).await?;

        info!("Found {} cafes matching location", cafes.len());
        Ok(cafes)
    }

    /// Pick one cafe uniformly at random and return its reduced projection
    #[instrument(skip(self))]
    pub async fn random_cafe(&self) -> ServiceResult<CafeProjection> {
        info!("Picking a random cafe");

        let cafes = self.repository.find_all().await?;

        match cafes.choose(&mut rand::thread_rng()) {
            Some(cafe) => Ok(cafe.to_projection()),
            None => {
                warn!("No cafes available for random pick");
                Err(ServiceError::NoCafesAvailable)
            }
        }
    }

    /// Create a new cafe from the submitted form
    #[instrument(skip(self, form))]
    pub async fn add_cafe(&self, form: AddCafeForm) -> ServiceResult<Cafe> {
        info!("Adding new cafe");

        let request = form.into_request()?;

        // Name is unique across all records
        if let Some(existing) = self.repository.find_by_name(&request.name).await? {
            warn!("Cafe name already taken by id {}", existing.id);
            return Err(ServiceError::DuplicateName { name: request.name });
        }

        let cafe = self.repository.insert(request).await?;

        info!("Cafe added with id {}", cafe.id);
        Ok(cafe)
    }

    /// Overwrite the coffee price of the cafe with the given id
    #[instrument(skip(self, new_price), fields(id = %id))]
    pub async fn update_price(&self, id: i64, new_price: Option<String>) -> ServiceResult<()> {
        info!("Updating coffee price");

        match self.repository.update_price(id, new_price).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(ServiceError::CafeNotFound { id }),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the cafe with the given id
    #[instrument(skip(self), fields(id = %id))]
    pub async fn report_closed(&self, id: i64) -> ServiceResult<()> {
        info!("Reporting cafe as closed");

        match self.repository.delete(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(ServiceError::CafeNotFound { id }),
            Err(e) => Err(e.into()),
        }
    }
}
