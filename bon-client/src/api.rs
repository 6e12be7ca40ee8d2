//! REST API surface
//!
//! One trait per resource so callers (and tests) only depend on what they
//! use. [`ApiClient`] implements all of them over an [`HttpClient`].

use async_trait::async_trait;
use shared::models::{
    AccessLevel, CreateOrderRequest, CreateOrderResponse, Drink, DrinkCreate, DrinkUpdate,
    Institution, InstitutionCreate, Order, UpdateOrderStatus, VerifyRequest, VerifyResponse,
};
use url::form_urlencoded;

use crate::http::{HttpClient, NetworkHttpClient};
use crate::{ClientConfig, ClientResult};

/// Menu endpoints (`/drink/*`)
#[async_trait]
pub trait MenuApi: Send + Sync {
    async fn list_drinks(&self) -> ClientResult<Vec<Drink>>;
    async fn create_drink(&self, drink: &DrinkCreate) -> ClientResult<Drink>;
    async fn update_drink(&self, id: &str, update: &DrinkUpdate) -> ClientResult<Drink>;
    async fn delete_drink(&self, id: &str) -> ClientResult<()>;
}

/// Order endpoints (`/order/*`)
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<CreateOrderResponse>;
    /// All orders, optionally scoped to one branch
    async fn list_orders(&self, institution_id: Option<&str>) -> ClientResult<Vec<Order>>;
    async fn get_order(&self, id: &str) -> ClientResult<Order>;
    async fn update_order(&self, id: &str, update: &UpdateOrderStatus) -> ClientResult<Order>;
    /// Forward the gateway redirect query verbatim for verification
    async fn verify_payment(&self, query: &str) -> ClientResult<()>;
}

/// Branch endpoints (`/institution/*`)
#[async_trait]
pub trait InstitutionApi: Send + Sync {
    async fn list_institutions(&self) -> ClientResult<Vec<Institution>>;
    async fn create_institution(&self, institution: &InstitutionCreate) -> ClientResult<Institution>;
    async fn delete_institution(&self, id: &str) -> ClientResult<()>;
}

/// Password gate (`/settings/verify`)
#[async_trait]
pub trait SettingsApi: Send + Sync {
    async fn verify_password(&self, level: AccessLevel, password: &str) -> ClientResult<VerifyResponse>;
}

/// API client for the ordering backend
#[derive(Debug, Clone)]
pub struct ApiClient<C = NetworkHttpClient> {
    http: C,
}

impl ApiClient<NetworkHttpClient> {
    /// Build a network client from configuration
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self::new(NetworkHttpClient::new(config)?))
    }
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &C {
        &self.http
    }
}

fn encode(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

#[async_trait]
impl<C: HttpClient> MenuApi for ApiClient<C> {
    async fn list_drinks(&self) -> ClientResult<Vec<Drink>> {
        self.http.get("drink/all").await
    }

    async fn create_drink(&self, drink: &DrinkCreate) -> ClientResult<Drink> {
        drink.validate()?;
        self.http.post("drink/create", drink).await
    }

    async fn update_drink(&self, id: &str, update: &DrinkUpdate) -> ClientResult<Drink> {
        update.validate()?;
        self.http.put(&format!("drink/{}", encode(id)), update).await
    }

    async fn delete_drink(&self, id: &str) -> ClientResult<()> {
        self.http.delete_ok(&format!("drink/{}", encode(id))).await
    }
}

#[async_trait]
impl<C: HttpClient> OrderApi for ApiClient<C> {
    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<CreateOrderResponse> {
        self.http.post("order/create", request).await
    }

    async fn list_orders(&self, institution_id: Option<&str>) -> ClientResult<Vec<Order>> {
        let path = match institution_id {
            Some(id) => format!("order/getAll?institutionId={}", encode(id)),
            None => "order/getAll".to_string(),
        };
        self.http.get(&path).await
    }

    async fn get_order(&self, id: &str) -> ClientResult<Order> {
        self.http.get(&format!("order/{}", encode(id))).await
    }

    async fn update_order(&self, id: &str, update: &UpdateOrderStatus) -> ClientResult<Order> {
        self.http.put(&format!("order/{}", encode(id)), update).await
    }

    async fn verify_payment(&self, query: &str) -> ClientResult<()> {
        let query = query.trim_start_matches('?');
        self.http
            .get_ok(&format!("order/paymob-callback?{query}"))
            .await
    }
}

#[async_trait]
impl<C: HttpClient> InstitutionApi for ApiClient<C> {
    async fn list_institutions(&self) -> ClientResult<Vec<Institution>> {
        self.http.get("institution/all").await
    }

    async fn create_institution(&self, institution: &InstitutionCreate) -> ClientResult<Institution> {
        institution.validate()?;
        self.http.post("institution/create", institution).await
    }

    async fn delete_institution(&self, id: &str) -> ClientResult<()> {
        self.http
            .delete_ok(&format!("institution/{}", encode(id)))
            .await
    }
}

#[async_trait]
impl<C: HttpClient> SettingsApi for ApiClient<C> {
    async fn verify_password(&self, level: AccessLevel, password: &str) -> ClientResult<VerifyResponse> {
        let request = VerifyRequest {
            password: password.to_string(),
            level,
        };
        self.http.post("settings/verify", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments_are_encoded() {
        assert_eq!(encode("65f1c0ab"), "65f1c0ab");
        assert_eq!(encode("a/b c"), "a%2Fb+c");
    }
}
