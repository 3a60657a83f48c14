//! reqwest-based implementation of the backend API seams

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use super::dto::{BalanceDto, CountryDto, PollDto, PurchaseDto, QuoteDto, RefundDto, ServiceOfferDto};
use crate::auth::TokenProvider;
use crate::InfraError;
use nr_core::domain::value_objects::{
    Country, PollUpdate, PriceQuote, PurchaseReceipt, Refund, ServiceOffer,
};
use nr_core::errors::{FlowError, FlowResult};
use nr_core::services::purchase::{PurchaseRequest, RetryKind, VerificationApi, WalletApi};
use nr_shared::{ApiConfig, ApiErrorBody, Credits};

/// Client for the NumRelay backend verification and wallet APIs.
///
/// Transport failures on idempotent GETs are retried a bounded number of
/// times with a fixed delay; mutating requests are never retried here, the
/// flow layer owns that decision.
pub struct ApiClient<T: TokenProvider> {
    http: reqwest::Client,
    config: ApiConfig,
    token: Arc<T>,
}

impl<T: TokenProvider> ApiClient<T> {
    /// Build a client from configuration
    pub fn new(config: ApiConfig, token: Arc<T>) -> Result<Self, InfraError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn bearer(&self) -> FlowResult<String> {
        self.token.bearer_token().map_err(|err| {
            warn!(error = %err, event = "token_unavailable", "No bearer credential for request");
            FlowError::AuthExpired
        })
    }

    /// GET with bounded transport retry
    async fn get_json<D: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FlowResult<D> {
        let mut attempt = 0;
        loop {
            match self.try_get(path, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.config.max_transport_retries => {
                    attempt += 1;
                    warn!(
                        path = path,
                        attempt = attempt,
                        error = %err,
                        event = "transport_retry",
                        "Transport failure, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn try_get<D: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> FlowResult<D> {
        let token = self.bearer()?;
        debug!(path = path, event = "api_request", method = "GET", "API request");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn post_json<B: Serialize, D: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> FlowResult<D> {
        let token = self.bearer()?;
        debug!(path = path, event = "api_request", method = "POST", "API request");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

/// Decode a response, mapping non-2xx statuses onto the flow taxonomy
async fn decode<D: DeserializeOwned>(response: Response) -> FlowResult<D> {
    let status = response.status();
    if status.is_success() {
        return response.json::<D>().await.map_err(transport_error);
    }
    let body: ApiErrorBody = response.json().await.unwrap_or_default();
    Err(map_status(status, &body))
}

fn map_status(status: StatusCode, body: &ApiErrorBody) -> FlowError {
    match status.as_u16() {
        402 => FlowError::InsufficientBalance {
            required: Credits::ZERO,
            available: Credits::ZERO,
        },
        401 => FlowError::AuthExpired,
        503 => FlowError::ProviderUnavailable,
        other => FlowError::Api {
            status: other,
            detail: body
                .detail_or("The request could not be completed")
                .to_string(),
        },
    }
}

fn transport_error(err: reqwest::Error) -> FlowError {
    FlowError::Network {
        message: err.to_string(),
    }
}

fn quote_query(request: &PurchaseRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("country", request.country.clone()),
        ("service", request.service.clone()),
        ("capability", request.capability.as_str().to_string()),
    ];
    if let Some(carrier) = &request.carrier {
        query.push(("carrier", carrier.clone()));
    }
    if let Some(area_code) = &request.area_code {
        query.push(("area_code", area_code.clone()));
    }
    query
}

#[async_trait]
impl<T: TokenProvider> VerificationApi for ApiClient<T> {
    async fn list_countries(&self) -> FlowResult<Vec<Country>> {
        let countries: Vec<CountryDto> = self.get_json("countries", &[]).await?;
        Ok(countries.into_iter().map(Country::from).collect())
    }

    async fn list_services(&self, country: &str) -> FlowResult<Vec<ServiceOffer>> {
        let path = format!("countries/{}/services", country);
        let services: Vec<ServiceOfferDto> = self.get_json(&path, &[]).await?;
        Ok(services.into_iter().map(ServiceOffer::from).collect())
    }

    async fn quote_price(&self, request: &PurchaseRequest) -> FlowResult<PriceQuote> {
        let quote: QuoteDto = self.get_json("pricing", &quote_query(request)).await?;
        Ok(quote.into())
    }

    async fn create_verification(&self, request: &PurchaseRequest) -> FlowResult<PurchaseReceipt> {
        let purchase: PurchaseDto = self.post_json("verifications", request).await?;
        Ok(purchase.into())
    }

    async fn poll_verification(&self, id: &str) -> FlowResult<PollUpdate> {
        let path = format!("verifications/{}", id);
        // No transport retry: the polling loop tolerates a failed tick and
        // the next tick is already scheduled.
        let update: PollDto = self.try_get(&path, &[]).await?;
        Ok(update.into())
    }

    async fn cancel_verification(&self, id: &str) -> FlowResult<Refund> {
        let path = format!("verifications/{}/cancel", id);
        let refund: RefundDto = self.post_json(&path, &json!({})).await?;
        Ok(refund.into())
    }

    async fn retry_verification(&self, id: &str, kind: RetryKind) -> FlowResult<PurchaseReceipt> {
        let path = format!("verifications/{}/retry", id);
        let purchase: PurchaseDto = self
            .post_json(&path, &json!({ "retry_type": kind.as_str() }))
            .await?;
        Ok(purchase.into())
    }
}

#[async_trait]
impl<T: TokenProvider> WalletApi for ApiClient<T> {
    async fn balance(&self) -> FlowResult<Credits> {
        let balance: BalanceDto = self.get_json("wallet/balance", &[]).await?;
        Ok(balance.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn client() -> ApiClient<StaticTokenProvider> {
        ApiClient::new(
            ApiConfig::new("https://api.example.test/v1/"),
            Arc::new(StaticTokenProvider::new("tok")),
        )
        .unwrap()
    }

    #[test]
    fn urls_join_without_duplicate_slashes() {
        let client = client();
        assert_eq!(
            client.url("/countries"),
            "https://api.example.test/v1/countries"
        );
        assert_eq!(
            client.url("wallet/balance"),
            "https://api.example.test/v1/wallet/balance"
        );
    }

    #[test]
    fn payment_required_maps_to_insufficient_balance() {
        let err = map_status(StatusCode::PAYMENT_REQUIRED, &ApiErrorBody::default());
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
    }

    #[test]
    fn unauthorized_maps_to_auth_expired() {
        let err = map_status(StatusCode::UNAUTHORIZED, &ApiErrorBody::default());
        assert_eq!(err.error_code(), "AUTH_EXPIRED");
    }

    #[test]
    fn service_unavailable_maps_to_provider_unavailable() {
        let err = map_status(StatusCode::SERVICE_UNAVAILABLE, &ApiErrorBody::default());
        assert_eq!(err.error_code(), "PROVIDER_UNAVAILABLE");
    }

    #[test]
    fn other_statuses_carry_the_server_detail() {
        let body = ApiErrorBody {
            detail: "number pool exhausted".to_string(),
        };
        match map_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            FlowError::Api { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "number pool exhausted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_error_body_falls_back_to_a_generic_detail() {
        match map_status(StatusCode::BAD_REQUEST, &ApiErrorBody::default()) {
            FlowError::Api { detail, .. } => {
                assert_eq!(detail, "The request could not be completed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn quote_query_includes_optional_filters_only_when_set() {
        let request = PurchaseRequest {
            country: "US".to_string(),
            service: "telegram".to_string(),
            capability: nr_core::domain::entities::Capability::Voice,
            carrier: Some("tmo".to_string()),
            area_code: None,
        };
        let query = quote_query(&request);
        assert!(query.contains(&("carrier", "tmo".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "area_code"));
        assert!(query.contains(&("capability", "voice".to_string())));
    }
}
