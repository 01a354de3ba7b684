//! # Catalog API
//!
//! Fixed reference lists used by submission and ledger forms.

use axum::routing::get;
use axum::{Json, Router};
use fin_core::{
    PaymentMethod, CURRENCY_CODE, CURRENCY_SYMBOL, DEPARTMENTS, EXPENSE_CATEGORIES,
    INCOME_CATEGORIES,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Reference lists and currency.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub departments: Vec<String>,
    pub expense_categories: Vec<String>,
    pub income_categories: Vec<String>,
    pub payment_methods: Vec<PaymentMethod>,
    pub currency_code: String,
    pub currency_symbol: String,
}

impl CatalogResponse {
    fn current() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self {
            departments: owned(&DEPARTMENTS),
            expense_categories: owned(&EXPENSE_CATEGORIES),
            income_categories: owned(&INCOME_CATEGORIES),
            payment_methods: vec![
                PaymentMethod::BankTransfer,
                PaymentMethod::Pos,
                PaymentMethod::Cash,
            ],
            currency_code: CURRENCY_CODE.to_string(),
            currency_symbol: CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/catalog", get(catalog))
}

/// GET /v1/catalog: Departments, categories, payment methods, currency.
#[utoipa::path(
    get,
    path = "/v1/catalog",
    responses(
        (status = 200, description = "Reference lists", body = CatalogResponse),
    ),
    tag = "catalog"
)]
pub(crate) async fn catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse::current())
}
