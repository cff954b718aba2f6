//! `/api/customers`
//!
//! Single customers are addressed by their owning user's id.
//! `POST /change` runs a bulk reconciliation.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, AuthUser, Payload, ValidId};
use crate::AppState;
use vidly_core::validation::{optional_text, validate_id};
use vidly_core::{Customer, CustomerChange, CustomerRemoval, ReconcileSummary};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    /// Owning user id. Required on create and update; on update it must
    /// match the path id.
    pub user: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub is_gold: Option<bool>,
}

impl CustomerPayload {
    /// Applies the payload over a fresh customer. Absent fields take their
    /// defaults, including the `"customer"` name.
    fn into_customer(self, user_id: &str) -> Result<Customer, ApiError> {
        let mut customer = Customer::new_for_user(user_id, None);

        let name = optional_text("name", self.name.as_deref())?;
        if !name.is_empty() {
            customer.name = name;
        }
        customer.email = optional_text("email", self.email.as_deref())?;
        customer.address = optional_text("address", self.address.as_deref())?;
        customer.city = optional_text("city", self.city.as_deref())?;
        customer.province = optional_text("province", self.province.as_deref())?;
        customer.zip = optional_text("zip", self.zip.as_deref())?;
        customer.phone = optional_text("phone", self.phone.as_deref())?;
        customer.is_gold = self.is_gold.unwrap_or(false);

        Ok(customer)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReconcilePayload {
    #[serde(default)]
    pub changed: Vec<CustomerChange>,
    #[serde(default)]
    pub removed: Vec<CustomerRemoval>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/change", post(reconcile))
        .route("/{id}", get(fetch).put(update))
}

async fn list(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.db.customers().list().await?))
}

async fn fetch(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidId(user_id): ValidId,
) -> Result<Json<Customer>, ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::missing("customer"))?;
    Ok(Json(customer))
}

async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Payload(mut body): Payload<CustomerPayload>,
) -> Result<Json<Customer>, ApiError> {
    let user_id = body.user.take().unwrap_or_default();
    validate_id("user", &user_id)?;

    if state.db.users().get_by_id(&user_id).await?.is_none() {
        return Err(ApiError::bad_request("Invalid user."));
    }
    if state.db.customers().get_by_user(&user_id).await?.is_some() {
        return Err(ApiError::bad_request("Customer already exists for this user."));
    }

    let customer = body.into_customer(&user_id)?;
    let customer = state.db.customers().insert(&customer).await?;

    info!(customer_id = %customer.id, user_id = %user_id, "Customer created");
    Ok(Json(customer))
}

async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    ValidId(user_id): ValidId,
    Payload(mut body): Payload<CustomerPayload>,
) -> Result<Json<Customer>, ApiError> {
    let owner = body.user.take().unwrap_or_default();
    validate_id("user", &owner)?;
    if owner != user_id {
        return Err(ApiError::bad_request("Invalid user."));
    }

    let customer = body.into_customer(&user_id)?;
    let customer = state
        .db
        .customers()
        .update_for_user(&customer)
        .await?
        .ok_or_else(|| ApiError::missing("customer"))?;
    Ok(Json(customer))
}

async fn reconcile(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Payload(body): Payload<ReconcilePayload>,
) -> Result<Json<ReconcileSummary>, ApiError> {
    for change in &body.changed {
        validate_id("customerId", &change.customer_id)?;
    }
    for removal in &body.removed {
        validate_id("customerId", &removal.customer_id)?;
        validate_id("userId", &removal.user_id)?;
    }

    info!(
        admin = %admin.sub,
        changed = body.changed.len(),
        removed = body.removed.len(),
        "Reconciling customers"
    );
    let summary = state.db.reconciler().reconcile(&body.changed, &body.removed).await?;
    Ok(Json(summary))
}
