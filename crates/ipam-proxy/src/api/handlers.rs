use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;

use crate::{
    api::routes::AppState,
    envelope::{Envelope, IpReply},
    error::ApiError,
    provider::SubnetRecord,
    request::{require_group, GroupSubnetQuery, IpRequest, NextIpRequest, SubnetQuery},
};

#[derive(Deserialize)]
pub struct NextIpQuery {
    mac: Option<String>,
    group: Option<String>,
}

#[derive(Deserialize)]
pub struct GroupQuery {
    group: Option<String>,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn next_ip(
    State(state): State<Arc<AppState>>,
    Path((address, prefix)): Path<(String, String)>,
    Query(query): Query<NextIpQuery>,
) -> Result<Envelope<IpAddr>, ApiError> {
    let req = NextIpRequest::parse(
        Some(&address),
        Some(&prefix),
        query.mac.as_deref(),
        query.group.as_deref(),
    )?;
    let ip = state.service.next_ip(&req).await?;
    Ok(Envelope::Data(ip))
}

pub async fn get_subnet(
    State(state): State<Arc<AppState>>,
    Path((address, prefix)): Path<(String, String)>,
    Query(query): Query<GroupQuery>,
) -> Result<Envelope<SubnetRecord>, ApiError> {
    let req = SubnetQuery::parse(Some(&address), Some(&prefix), query.group.as_deref())?;
    let subnet = state.service.get_subnet(&req).await?;
    Ok(Envelope::Data(subnet))
}

pub async fn list_groups(State(state): State<Arc<AppState>>) -> Envelope<()> {
    state.service.list_groups()
}

pub async fn get_group(State(state): State<Arc<AppState>>, Path(group): Path<String>) -> Envelope<()> {
    state.service.get_group(&group)
}

pub async fn group_subnets(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> Result<Envelope<Vec<SubnetRecord>>, ApiError> {
    let group = require_group(Some(&group))?;
    let subnets = state.service.group_subnets(&group).await?;
    Ok(Envelope::Data(subnets))
}

pub async fn check_ip(
    State(state): State<Arc<AppState>>,
    Path((address, prefix, ip)): Path<(String, String, String)>,
) -> Result<Json<IpReply>, ApiError> {
    let req = IpRequest::parse(Some(&address), Some(&prefix), Some(&ip), None)?;
    let reply = state.service.check_ip(&req).await?;
    Ok(Json(reply))
}

pub async fn add_ip(
    State(state): State<Arc<AppState>>,
    Path((address, prefix, ip)): Path<(String, String, String)>,
    Query(query): Query<GroupQuery>,
) -> Result<(StatusCode, Json<IpReply>), ApiError> {
    let req = IpRequest::parse(Some(&address), Some(&prefix), Some(&ip), query.group.as_deref())?;
    let reply = state.service.add_ip(&req).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn delete_ip(
    State(state): State<Arc<AppState>>,
    Path((address, prefix, ip)): Path<(String, String, String)>,
    Query(query): Query<GroupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let req = IpRequest::parse(Some(&address), Some(&prefix), Some(&ip), query.group.as_deref())?;
    state.service.delete_ip(&req).await?;
    Ok((StatusCode::NO_CONTENT, [(header::CONTENT_TYPE, "application/json")]))
}

pub async fn subnet_in_group(
    State(state): State<Arc<AppState>>,
    Path((group, address, prefix)): Path<(String, String, String)>,
) -> Result<Envelope<SubnetRecord>, ApiError> {
    let req = GroupSubnetQuery::parse(Some(&address), Some(&prefix), Some(&group))?;
    let subnet = state.service.subnet_in_group(&req).await?;
    Ok(Envelope::Data(subnet))
}
