//! Handlers for the `/equipment` and `/equipment-loans` resources.
//!
//! Stock is only moved inside a transaction that holds the equipment row
//! lock: approval takes units out, return puts them back.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgConnection;
use studio_core::equipment::{
    check_availability, is_overdue, loan_transition, restock, validate_loan_request,
    validate_stock, EquipmentCondition, LoanAction, LoanStatus,
};
use studio_core::error::CoreError;
use studio_core::notification::{self, ENTITY_EQUIPMENT_LOAN};
use studio_core::roles::{has_any_role, LOAN_APPROVER_ROLES};
use studio_core::types::DbId;
use studio_db::models::equipment::{
    CreateEquipment, CreateEquipmentLoan, Equipment, EquipmentLoan, UpdateEquipment,
};
use studio_db::repositories::{
    EpisodeRepo, EquipmentLoanRepo, EquipmentRepo, NotificationRepo, UserRepo,
};
use studio_events::{names, PlatformEvent};

use crate::engine::notify::{linked, notify_user};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_role;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateEquipmentRequest {
    #[serde(flatten)]
    pub fields: UpdateEquipment,
    /// New total stock; the available count moves by the same delta.
    pub total_quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LoanQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnRequest {
    /// Condition of the returned units; also recorded on the equipment.
    pub condition: Option<String>,
}

fn equipment_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Equipment",
        id,
    })
}

fn loan_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "EquipmentLoan",
        id,
    })
}

fn parse_condition(value: &str) -> AppResult<EquipmentCondition> {
    EquipmentCondition::parse(value).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown equipment condition '{value}'"
        )))
    })
}

fn parse_loan_status(loan: &EquipmentLoan) -> AppResult<LoanStatus> {
    LoanStatus::parse(&loan.status).ok_or_else(|| {
        AppError::InternalError(format!(
            "Loan {} has unknown status '{}'",
            loan.id, loan.status
        ))
    })
}

async fn lock_loan(conn: &mut PgConnection, id: DbId) -> AppResult<EquipmentLoan> {
    EquipmentLoanRepo::lock(conn, id)
        .await?
        .ok_or_else(|| loan_not_found(id))
}

async fn lock_equipment(conn: &mut PgConnection, id: DbId) -> AppResult<Equipment> {
    EquipmentRepo::lock(conn, id)
        .await?
        .ok_or_else(|| equipment_not_found(id))
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// GET /api/v1/equipment
pub async fn list_equipment(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Equipment>>>> {
    let items = EquipmentRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse::new(items)))
}

/// POST /api/v1/equipment
pub async fn create_equipment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<DataResponse<Equipment>>)> {
    require_role(&auth, LOAN_APPROVER_ROLES)?;
    if input.code.trim().is_empty() || input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Equipment code and name are required".into(),
        )));
    }
    validate_stock(input.total_quantity, input.total_quantity)?;

    let equipment = EquipmentRepo::create(&state.pool, &input).await?;
    tracing::info!(
        user_id = auth.user_id,
        equipment_id = equipment.id,
        code = %equipment.code,
        "Equipment created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(equipment))))
}

/// GET /api/v1/equipment/{id}
pub async fn get_equipment(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Equipment>>> {
    let equipment = EquipmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| equipment_not_found(id))?;
    Ok(Json(DataResponse::new(equipment)))
}

/// PUT /api/v1/equipment/{id}
///
/// Lowering `total_quantity` below the units currently on loan fails with
/// a validation error.
pub async fn update_equipment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEquipmentRequest>,
) -> AppResult<Json<DataResponse<Equipment>>> {
    require_role(&auth, LOAN_APPROVER_ROLES)?;
    if let Some(condition) = &input.fields.condition {
        parse_condition(condition)?;
    }

    let mut tx = state.pool.begin().await?;
    let current = lock_equipment(&mut tx, id).await?;
    if let Some(new_total) = input.total_quantity {
        let new_available = current.available_quantity + (new_total - current.total_quantity);
        validate_stock(new_total, new_available)?;
        EquipmentRepo::set_stock(&mut tx, id, new_total, new_available).await?;
    }
    let equipment = EquipmentRepo::update(&mut tx, id, &input.fields)
        .await?
        .ok_or_else(|| equipment_not_found(id))?;
    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, equipment_id = id, "Equipment updated");
    Ok(Json(DataResponse::new(equipment)))
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

/// GET /api/v1/equipment-loans
///
/// Loan approvers see every loan; everyone else only their own.
pub async fn list_loans(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<LoanQuery>,
) -> AppResult<Json<DataResponse<Vec<EquipmentLoan>>>> {
    if let Some(status) = &params.status {
        LoanStatus::parse(status).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown loan status '{status}'"
            )))
        })?;
    }
    let borrower = if has_any_role(&auth.role, LOAN_APPROVER_ROLES) {
        None
    } else {
        Some(auth.user_id)
    };
    let loans = EquipmentLoanRepo::list(&state.pool, params.status.as_deref(), borrower).await?;
    Ok(Json(DataResponse::new(loans)))
}

/// GET /api/v1/equipment-loans/overdue
///
/// Approved loans whose due date has passed, oldest due date first.
pub async fn overdue_loans(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EquipmentLoan>>>> {
    require_role(&auth, LOAN_APPROVER_ROLES)?;
    let today = state.config.schedule.local_date(Utc::now());

    let mut loans =
        EquipmentLoanRepo::list(&state.pool, Some(LoanStatus::Approved.as_str()), None).await?;
    loans.retain(|loan| {
        LoanStatus::parse(&loan.status)
            .is_some_and(|status| is_overdue(status, loan.due_date, today))
    });
    loans.sort_by_key(|loan| (loan.due_date, loan.id));
    Ok(Json(DataResponse::new(loans)))
}

/// GET /api/v1/equipment-loans/mine
pub async fn my_loans(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EquipmentLoan>>>> {
    let loans = EquipmentLoanRepo::list(&state.pool, None, Some(auth.user_id)).await?;
    Ok(Json(DataResponse::new(loans)))
}

/// POST /api/v1/equipment-loans
///
/// Availability is checked again at approval; here it only rejects
/// requests that could never be met.
pub async fn create_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEquipmentLoan>,
) -> AppResult<(StatusCode, Json<DataResponse<EquipmentLoan>>)> {
    validate_loan_request(input.quantity, input.loan_date, input.due_date)?;

    let equipment = EquipmentRepo::find_by_id(&state.pool, input.equipment_id)
        .await?
        .ok_or_else(|| equipment_not_found(input.equipment_id))?;
    if !equipment.is_active {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Equipment '{}' is not available for loan",
            equipment.code
        ))));
    }
    check_availability(equipment.total_quantity, input.quantity)?;
    if let Some(episode_id) = input.episode_id {
        EpisodeRepo::find_by_id(&state.pool, episode_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Episode",
                id: episode_id,
            }))?;
    }

    let requester = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .map(|u| u.full_name)
        .unwrap_or_else(|| format!("User {}", auth.user_id));

    let mut tx = state.pool.begin().await?;
    let loan = EquipmentLoanRepo::create(&mut tx, auth.user_id, &input).await?;
    let content = notification::loan_requested(&equipment.name, loan.quantity, &requester);
    NotificationRepo::notify_roles(
        &mut tx,
        LOAN_APPROVER_ROLES,
        Some(auth.user_id),
        &linked(&content, ENTITY_EQUIPMENT_LOAN, loan.id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        loan_id = loan.id,
        equipment_id = equipment.id,
        quantity = loan.quantity,
        "Equipment loan requested"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(loan))))
}

/// POST /api/v1/equipment-loans/{id}/approve
pub async fn approve_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<Json<DataResponse<EquipmentLoan>>> {
    require_role(&auth, LOAN_APPROVER_ROLES)?;
    let input = body.map(|Json(b)| b).unwrap_or_default();

    let mut tx = state.pool.begin().await?;
    let loan = lock_loan(&mut tx, id).await?;
    let to = loan_transition(parse_loan_status(&loan)?, LoanAction::Approve)?;
    let equipment = lock_equipment(&mut tx, loan.equipment_id).await?;
    let remaining = check_availability(equipment.available_quantity, loan.quantity)?;
    EquipmentRepo::adjust_available(&mut tx, equipment.id, remaining).await?;
    let loan = EquipmentLoanRepo::record_decision(
        &mut tx,
        id,
        to.as_str(),
        auth.user_id,
        input.notes.as_deref(),
    )
    .await?;

    let content = notification::loan_decided(&equipment.name, loan.quantity, true);
    notify_user(
        &mut tx,
        Some(loan.borrower_id),
        auth.user_id,
        &linked(&content, ENTITY_EQUIPMENT_LOAN, loan.id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        loan_id = id,
        equipment_id = equipment.id,
        available = remaining,
        "Equipment loan approved"
    );
    state.event_bus.publish(
        PlatformEvent::new(names::LOAN_APPROVED)
            .with_source(names::ENTITY_EQUIPMENT_LOAN, id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "equipment_id": equipment.id,
                "quantity": loan.quantity,
                "available_quantity": remaining,
            })),
    );
    Ok(Json(DataResponse::new(loan)))
}

/// POST /api/v1/equipment-loans/{id}/reject
pub async fn reject_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<DecisionRequest>>,
) -> AppResult<Json<DataResponse<EquipmentLoan>>> {
    require_role(&auth, LOAN_APPROVER_ROLES)?;
    let input = body.map(|Json(b)| b).unwrap_or_default();

    let mut tx = state.pool.begin().await?;
    let loan = lock_loan(&mut tx, id).await?;
    let to = loan_transition(parse_loan_status(&loan)?, LoanAction::Reject)?;
    let loan = EquipmentLoanRepo::record_decision(
        &mut tx,
        id,
        to.as_str(),
        auth.user_id,
        input.notes.as_deref(),
    )
    .await?;

    let equipment_name = EquipmentRepo::find_by_id(&state.pool, loan.equipment_id)
        .await?
        .map(|e| e.name)
        .unwrap_or_default();
    let content = notification::loan_decided(&equipment_name, loan.quantity, false);
    notify_user(
        &mut tx,
        Some(loan.borrower_id),
        auth.user_id,
        &linked(&content, ENTITY_EQUIPMENT_LOAN, loan.id),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, loan_id = id, "Equipment loan rejected");
    Ok(Json(DataResponse::new(loan)))
}

/// POST /api/v1/equipment-loans/{id}/cancel
///
/// Only the borrower may withdraw a pending request.
pub async fn cancel_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EquipmentLoan>>> {
    let mut tx = state.pool.begin().await?;
    let loan = lock_loan(&mut tx, id).await?;
    if loan.borrower_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the borrower can cancel a loan request".into(),
        )));
    }
    let to = loan_transition(parse_loan_status(&loan)?, LoanAction::Cancel)?;
    let loan =
        EquipmentLoanRepo::record_decision(&mut tx, id, to.as_str(), auth.user_id, None).await?;
    tx.commit().await?;

    tracing::info!(user_id = auth.user_id, loan_id = id, "Equipment loan cancelled");
    Ok(Json(DataResponse::new(loan)))
}

/// POST /api/v1/equipment-loans/{id}/return
///
/// Recorded by a loan approver when the units are handed back.
pub async fn return_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ReturnRequest>>,
) -> AppResult<Json<DataResponse<EquipmentLoan>>> {
    require_role(&auth, LOAN_APPROVER_ROLES)?;
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let condition = input.condition.as_deref().map(parse_condition).transpose()?;

    let mut tx = state.pool.begin().await?;
    let loan = lock_loan(&mut tx, id).await?;
    loan_transition(parse_loan_status(&loan)?, LoanAction::Return)?;
    let equipment = lock_equipment(&mut tx, loan.equipment_id).await?;
    let available = restock(
        equipment.available_quantity,
        equipment.total_quantity,
        loan.quantity,
    );
    EquipmentRepo::adjust_available(&mut tx, equipment.id, available).await?;
    if let Some(condition) = condition {
        EquipmentRepo::set_condition(&mut tx, equipment.id, condition.as_str()).await?;
    }
    let loan =
        EquipmentLoanRepo::mark_returned(&mut tx, id, condition.map(|c| c.as_str())).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        loan_id = id,
        equipment_id = equipment.id,
        available,
        "Equipment loan returned"
    );
    state.event_bus.publish(
        PlatformEvent::new(names::LOAN_RETURNED)
            .with_source(names::ENTITY_EQUIPMENT_LOAN, id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "equipment_id": equipment.id,
                "quantity": loan.quantity,
                "condition": loan.return_condition,
                "available_quantity": available,
            })),
    );
    Ok(Json(DataResponse::new(loan)))
}
