//! Wire DTOs for the backend API
//!
//! Every optional field defaults at this boundary, so the domain layer
//! never sees missing data and never needs defensive optional-chaining.

use serde::Deserialize;

use nr_core::domain::value_objects::{
    Country, PollUpdate, PriceQuote, PurchaseReceipt, Refund, ServiceOffer,
};
use nr_shared::Credits;

#[derive(Debug, Deserialize)]
pub(super) struct CountryDto {
    pub code: String,
    pub name: String,
}

impl From<CountryDto> for Country {
    fn from(dto: CountryDto) -> Self {
        Country {
            code: dto.code,
            name: dto.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ServiceOfferDto {
    pub name: String,
    #[serde(default)]
    pub cost: f64,
}

impl From<ServiceOfferDto> for ServiceOffer {
    fn from(dto: ServiceOfferDto) -> Self {
        ServiceOffer {
            name: dto.name,
            cost: Credits(dto.cost),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteDto {
    #[serde(default)]
    pub base_price: f64,
    #[serde(default)]
    pub voice_premium: Option<f64>,
}

impl From<QuoteDto> for PriceQuote {
    fn from(dto: QuoteDto) -> Self {
        PriceQuote {
            base_price: Credits(dto.base_price),
            voice_premium: dto.voice_premium.map(Credits),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PurchaseDto {
    pub id: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub remaining_credits: f64,
}

impl From<PurchaseDto> for PurchaseReceipt {
    fn from(dto: PurchaseDto) -> Self {
        PurchaseReceipt {
            id: dto.id,
            phone_number: dto.phone_number,
            cost: Credits(dto.cost),
            status: dto.status,
            remaining_credits: Credits(dto.remaining_credits),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PollDto {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub transcription: Option<String>,
}

impl From<PollDto> for PollUpdate {
    fn from(dto: PollDto) -> Self {
        PollUpdate {
            status: dto.status,
            messages: dto.messages,
            transcription: dto.transcription,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RefundDto {
    #[serde(default)]
    pub refunded: f64,
}

impl From<RefundDto> for Refund {
    fn from(dto: RefundDto) -> Self {
        Refund {
            refunded: Credits(dto.refunded),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct BalanceDto {
    #[serde(default)]
    pub credits: f64,
}

impl From<BalanceDto> for Credits {
    fn from(dto: BalanceDto) -> Self {
        Credits(dto.credits)
    }
}
