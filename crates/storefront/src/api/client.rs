//! POS API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Product detail responses are cached using
//! `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use pos_storefront_core::{BrandId, CompanyId, Money, ProductId, UserId};

use super::{ApiError, Envelope};
use crate::config::ApiConfig;
use crate::models::de;
use crate::models::{
    Brand, CatalogProduct, Company, CompanyCatalog, OrderHistory, OrderSummary, ProductPage,
};
use crate::services::checkout::{SaleOrder, SaleReceipt, SalesGateway};
use crate::services::reorder::CatalogSource;

/// Upper bound on logged response bodies.
const LOG_BODY_CHARS: usize = 500;

// =============================================================================
// PosApiClient
// =============================================================================

/// Client for the POS catalog and sales API.
///
/// Cheap to clone; clones share the HTTP connection pool and the product
/// cache.
#[derive(Clone)]
pub struct PosApiClient {
    inner: Arc<PosApiClientInner>,
}

struct PosApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, CatalogProduct>,
}

impl std::fmt::Debug for PosApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PosApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pos-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(PosApiClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Build an endpoint URL from path segments and query pairs.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and unwrap the response envelope.
    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "POS API returned non-success status"
            );
            let message = serde_json::from_str::<Envelope>(&body)
                .ok()
                .and_then(|envelope| envelope.msg)
                .unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "Failed to parse POS API response"
            );
            ApiError::Parse(e)
        })?;

        envelope.into_data(what)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments, query)?;
        debug!(url = %url, "GET");
        let data = self.send(self.inner.client.get(url), what).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn post<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
        what: &str,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.endpoint(segments, &[])?;
        debug!(url = %url, "POST");
        match self.send(self.inner.client.post(url).json(body), what).await {
            Ok(data) => Ok(Some(data)),
            // Mutations may legitimately answer without a payload
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    /// List companies shown on the home screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.get(&["company"], &[("limit", "20"), ("page", "1")], "Companies")
            .await
    }

    /// List the brands of a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn list_brands(&self, company_id: &CompanyId) -> Result<Vec<Brand>, ApiError> {
        self.get(
            &["brand"],
            &[("limit", "10"), ("page", "1"), ("company", company_id.as_str())],
            "Brands",
        )
        .await
    }

    /// A company's products grouped by brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn company_catalog(&self, company_id: &CompanyId) -> Result<CompanyCatalog, ApiError> {
        self.get(
            &["company", "companyProducts", company_id.as_str()],
            &[],
            "Company",
        )
        .await
    }

    /// Products of one brand.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(brand_id = %brand_id))]
    pub async fn brand_products(&self, brand_id: &BrandId) -> Result<Vec<CatalogProduct>, ApiError> {
        let page: ProductPage = self
            .get(
                &["product"],
                &[("limit", "10"), ("page", "1"), ("brand", brand_id.as_str())],
                "Products",
            )
            .await?;
        Ok(page.docs)
    }

    /// Default product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<CatalogProduct>, ApiError> {
        let page: ProductPage = self
            .get(&["product"], &[("limit", "20"), ("page", "1")], "Products")
            .await?;
        Ok(page.docs)
    }

    /// Search products by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<CatalogProduct>, ApiError> {
        let page: ProductPage = self
            .get(&["product"], &[("name", query)], "Products")
            .await?;
        Ok(page.docs)
    }

    /// Get a product with its variants.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<CatalogProduct, ApiError> {
        // Check cache
        if let Some(product) = self.inner.products.get(product_id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: CatalogProduct = self
            .get(&["product", product_id.as_str()], &[], "Product")
            .await?;

        // Cache the result
        self.inner
            .products
            .insert(product_id.clone(), product.clone())
            .await;

        Ok(product)
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Products on the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn liked_products(&self, user_id: &UserId) -> Result<Vec<CatalogProduct>, ApiError> {
        self.get(
            &["user", "likedProducts"],
            &[("userId", user_id.as_str())],
            "Liked products",
        )
        .await
    }

    /// Add a product to the wishlist, or remove it if already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn toggle_like(&self, user_id: &UserId, product_id: &ProductId) -> Result<(), ApiError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct LikeRequest<'a> {
            user_id: &'a UserId,
            product_id: &'a ProductId,
        }

        self.post(
            &["user", "likeUnlikeProducts"],
            &LikeRequest {
                user_id,
                product_id,
            },
            "Wishlist",
        )
        .await?;

        // The cached product carries a stale `isLiked`
        self.inner.products.invalidate(product_id).await;
        Ok(())
    }

    /// The user's past orders, newest first as returned by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn order_history(&self, user_id: &UserId) -> Result<Vec<OrderSummary>, ApiError> {
        let history: OrderHistory = self
            .get(
                &["user", "user-info"],
                &[("userId", user_id.as_str()), ("type", "orderHistory")],
                "Order history",
            )
            .await?;
        Ok(history.orders)
    }

    /// The user's remaining store credit.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_credit(&self, user_id: &UserId) -> Result<Money, ApiError> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Credit {
            #[serde(default, deserialize_with = "de::opt_money")]
            total_credit: Option<Money>,
        }

        let credit: Credit = self
            .get(
                &["user", "user-info"],
                &[("userId", user_id.as_str()), ("type", "userCredit")],
                "Credit",
            )
            .await?;
        Ok(credit.total_credit.unwrap_or(Money::ZERO))
    }
}

impl SalesGateway for PosApiClient {
    #[instrument(skip(self, order), fields(customer = %order.customer, lines = order.products.len()))]
    async fn create_sale(&self, order: &SaleOrder) -> Result<SaleReceipt, ApiError> {
        let data = self.post(&["sales", "create"], order, "Sale").await?;
        Ok(data
            .and_then(|data| serde_json::from_value(data).ok())
            .unwrap_or_default())
    }
}

impl CatalogSource for PosApiClient {
    async fn product(&self, id: &ProductId) -> Result<CatalogProduct, ApiError> {
        self.get_product(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> PosApiClient {
        PosApiClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments_under_base() {
        let client = client("https://pos.example/api/v1/");

        let url = client
            .endpoint(&["company", "companyProducts", "C1"], &[])
            .unwrap();
        assert_eq!(url.as_str(), "https://pos.example/api/v1/company/companyProducts/C1");
    }

    #[test]
    fn test_endpoint_encodes_query_and_segments() {
        let client = client("https://pos.example/api/v1/");

        let url = client
            .endpoint(&["product"], &[("name", "soap & shampoo")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://pos.example/api/v1/product?name=soap+%26+shampoo"
        );

        let url = client.endpoint(&["product", "a/b"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://pos.example/api/v1/product/a%2Fb");
    }

    #[test]
    fn test_endpoint_query_order_is_preserved() {
        let client = client("https://pos.example/api/v1/");

        let url = client
            .endpoint(
                &["user", "user-info"],
                &[("userId", "U1"), ("type", "orderHistory")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://pos.example/api/v1/user/user-info?userId=U1&type=orderHistory"
        );
    }
}
