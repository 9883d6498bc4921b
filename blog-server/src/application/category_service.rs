use crate::data::category_repository::CategoryRepository;
use crate::domain::category::{
    Category, CreateCategoryRequest, UpdateCategoryRequest, DEFAULT_CATEGORY_COLOR,
};
use crate::domain::DomainError;
use std::sync::Arc;

pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepository + Send + Sync>,
}

impl CategoryService {
    pub fn new(category_repo: Arc<dyn CategoryRepository + Send + Sync>) -> Self {
        Self { category_repo }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.category_repo.list().await
    }

    pub async fn create_category(
        &self,
        req: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        if req.name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Category name is required".to_string(),
            ));
        }

        let color = req
            .color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());

        let category = self.category_repo.create(&req.name, &color).await?;

        tracing::info!("Category created: id={}, name={}", category.id, category.name);

        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> Result<Category, DomainError> {
        if let Some(name) = &req.name {
            if name.trim().is_empty() {
                return Err(DomainError::ValidationError(
                    "Category name cannot be empty".to_string(),
                ));
            }
        }

        let category = self.category_repo.update(id, req).await?;

        tracing::info!("Category updated: id={}", id);

        Ok(category)
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), DomainError> {
        self.category_repo.delete(id).await?;

        tracing::info!("Category deleted: id={}", id);

        Ok(())
    }
}
