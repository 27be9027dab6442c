use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::ServiceError;
use crate::models::Product;
use crate::store::Datastore;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(custom = "validate_price")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub count: u64,
}

fn default_in_stock() -> bool {
    true
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

/// CRUD over the product catalog.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<Datastore>,
}

impl ProductService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// All products in insertion order, optionally narrowed to one category.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<&str>,
    ) -> Result<ProductListResponse, ServiceError> {
        let mut products = self.store.products.list();
        if let Some(category) = category {
            products.retain(|p| p.category.as_deref() == Some(category));
        }
        let count = products.len() as u64;
        Ok(ProductListResponse { products, count })
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, ServiceError> {
        self.store
            .products
            .get(&product_id)
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<Product, ServiceError> {
        request.validate()?;

        let product = Product {
            id: Uuid::new_v4(),
            name: request.name,
            price: request.price,
            category: request.category,
            description: request.description,
            image_url: request.image_url,
            in_stock: request.in_stock,
        };

        self.store.products.insert(product.id, product.clone());
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, request), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<Product, ServiceError> {
        request.validate()?;

        let updated = self
            .store
            .products
            .update(&product_id, |product| {
                if let Some(name) = request.name {
                    product.name = name;
                }
                if let Some(price) = request.price {
                    product.price = price;
                }
                if let Some(category) = request.category {
                    product.category = Some(category);
                }
                if let Some(description) = request.description {
                    product.description = Some(description);
                }
                if let Some(image_url) = request.image_url {
                    product.image_url = Some(image_url);
                }
                if let Some(in_stock) = request.in_stock {
                    product.in_stock = in_stock;
                }
            })
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        info!(product_id = %product_id, "Product updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        if !self.store.products.remove(&product_id) {
            return Err(ServiceError::NotFound("Product not found".to_string()));
        }
        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }
}
