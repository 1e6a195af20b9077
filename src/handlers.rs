use crate::calendar::{current_month, current_week_identifier, default_range, last_days};
use crate::errors::AppError;
use crate::models::{
    AttendanceRecord, CheckRequest, DeletedStudent, ExportDocument, Group, GroupsResponse,
    NewGroupRequest, NewStudentRequest, StatsQuery, StatsResponse, Student, WeekId, WeekQuery,
    WeekTable,
};
use crate::state::{AppData, AppState};
use crate::stats::{goal_status, ranked, DEFAULT_GOAL_RATE};
use crate::storage::persist_store;
use crate::workspace::Workspace;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate, Utc};
use tracing::info;

pub async fn list_groups(State(state): State<AppState>) -> Json<GroupsResponse> {
    let data = state.data.lock().await;
    Json(groups_response(&data.workspace))
}

pub async fn add_group(
    State(state): State<AppState>,
    Json(payload): Json<NewGroupRequest>,
) -> Result<(StatusCode, Json<Group>), AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    let group = workspace.add_group(
        store,
        &payload.name,
        &payload.schedule,
        payload.description.as_deref(),
    )?;
    persist_store(&state.data_path, store).await?;

    info!("added group {} ({})", group.id, group.name);
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn select_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GroupsResponse>, AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    if workspace.select_group(store, &id)? {
        persist_store(&state.data_path, store).await?;
    }
    Ok(Json(groups_response(workspace)))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GroupsResponse>, AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    workspace.delete_group(store, &id)?;
    persist_store(&state.data_path, store).await?;
    Ok(Json(groups_response(workspace)))
}

pub async fn list_students(State(state): State<AppState>) -> Json<Vec<Student>> {
    let data = state.data.lock().await;
    Json(data.workspace.roster().students().to_vec())
}

pub async fn add_student(
    State(state): State<AppState>,
    Json(payload): Json<NewStudentRequest>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    let student = workspace.add_student(store, &payload.korean_name, &payload.english_name)?;
    persist_store(&state.data_path, store).await?;

    info!("added student {} ({})", student.id, student.english_name);
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn toggle_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    let student = workspace.toggle_student(store, &id)?;
    persist_store(&state.data_path, store).await?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedStudent>, AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    let (student, removed_checks) = workspace.delete_student(store, &id)?;
    persist_store(&state.data_path, store).await?;

    info!("deleted student {id} with {removed_checks} checks");
    Ok(Json(DeletedStudent {
        student,
        removed_checks,
    }))
}

pub async fn get_week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekTable>, AppError> {
    let week = match query.week.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        Some(raw) => raw
            .parse::<WeekId>()
            .map_err(|err| AppError::bad_request(err.to_string()))?,
        None => current_week_identifier(today()),
    };

    let data = state.data.lock().await;
    let table = data
        .workspace
        .week_table(week)
        .ok_or_else(|| AppError::bad_request(format!("week {week} is outside the calendar")))?;
    Ok(Json(table))
}

pub async fn record_check(
    State(state): State<AppState>,
    Json(payload): Json<CheckRequest>,
) -> Result<Json<AttendanceRecord>, AppError> {
    let checked_by = payload
        .checked_by
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(state.teacher.as_str())
        .to_string();

    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    let record = workspace.record_check(
        store,
        &payload.student_id,
        payload.date,
        payload.completed,
        &checked_by,
        Utc::now(),
    )?;
    persist_store(&state.data_path, store).await?;
    Ok(Json(record))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let (start, end) = match query.preset.as_deref() {
        Some(preset) => {
            let (start, end) = preset_range(preset, today())?;
            (Some(start), Some(end))
        }
        None => (query.start, query.end),
    };

    let data = state.data.lock().await;
    let report = data.workspace.statistics(start, end)?;
    let ranking = ranked(&report.students);
    let goal = goal_status(
        report.overall.completion_rate,
        query.goal.unwrap_or(DEFAULT_GOAL_RATE),
    );

    Ok(Json(StatsResponse {
        report,
        ranking,
        goal,
    }))
}

pub async fn export(State(state): State<AppState>) -> impl IntoResponse {
    let data = state.data.lock().await;
    let document = data.workspace.export(Utc::now());
    let disposition = format!(
        "attachment; filename=\"homework_data_{}.json\"",
        document.export_date.date_naive()
    );
    ([(header::CONTENT_DISPOSITION, disposition)], Json(document))
}

pub async fn import(
    State(state): State<AppState>,
    Json(document): Json<ExportDocument>,
) -> Result<Json<GroupsResponse>, AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    workspace.restore(store, document)?;
    persist_store(&state.data_path, store).await?;
    Ok(Json(groups_response(workspace)))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<GroupsResponse>, AppError> {
    let mut data = state.data.lock().await;
    let AppData { store, workspace } = &mut *data;
    workspace.reset(store)?;
    persist_store(&state.data_path, store).await?;
    Ok(Json(groups_response(workspace)))
}

fn preset_range(preset: &str, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    match preset {
        "month" => Ok(current_month(today)),
        "last7" => Ok(last_days(today, 7)),
        "last30" => Ok(last_days(today, 30)),
        "default" => Ok(default_range(today)),
        other => Err(AppError::bad_request(format!("unknown range preset '{other}'"))),
    }
}

fn groups_response(workspace: &Workspace) -> GroupsResponse {
    GroupsResponse {
        current: workspace.groups().current_id().to_string(),
        groups: workspace.groups().groups().to_vec(),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
