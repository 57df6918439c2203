//! HTTP query surface for the telemetry history.
//!
//! Routes are declared with axum's type-safe router; every failure mode maps
//! to a structured `{"error": ...}` body with the matching status code.

use crate::context::SharedContext;
use crate::samples::{pico_player_id, DataType, HeartRateSample};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::error;
use serde::{Deserialize, Serialize};

/// Errors surfaced to HTTP clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Path segment named no known data type.
    InvalidDataType,
    /// `player_id` was not a comma-separated list of integers.
    InvalidPlayerFilter,
    /// The filters matched nothing.
    NoData(DataType),
    /// Anything unexpected; returned as a 500 with the error text.
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidDataType | ApiError::InvalidPlayerFilter => StatusCode::BAD_REQUEST,
            ApiError::NoData(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidDataType => "Invalid data type".to_string(),
            ApiError::InvalidPlayerFilter => "Invalid player_id format".to_string(),
            ApiError::NoData(data_type) => {
                format!("No {} data found", data_type.as_str().to_uppercase())
            }
            ApiError::Internal(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(message) = &self {
            error!("Internal error serving telemetry query: {}", message);
        }
        let body = Json(serde_json::json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

/// Query parameters accepted by `/api/{data_type}`. Timestamps are seconds.
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
    pub player_id: Option<String>,
}

/// Heart-rate responses flatten the device tag to the bare player id and
/// duplicate the timestamp under `Timestamp_UTC`.
#[derive(Debug, Serialize)]
pub struct HeartRateResponse {
    #[serde(rename = "rrData")]
    pub rr_data: Vec<i32>,
    #[serde(rename = "Pico_ID")]
    pub pico_id: u32,
    #[serde(rename = "Movesense_series")]
    pub movesense_series: u32,
    #[serde(rename = "Timestamp_ms")]
    pub timestamp_ms: u64,
    #[serde(rename = "average_bpm")]
    pub average_bpm: f64,
    #[serde(rename = "Timestamp_UTC")]
    pub timestamp_utc: u64,
}

impl HeartRateResponse {
    fn from_sample(sample: HeartRateSample) -> Result<Self, ApiError> {
        let pico_id = pico_player_id(&sample.pico_id).ok_or_else(|| {
            ApiError::Internal(format!("malformed device tag {:?}", sample.pico_id))
        })?;

        Ok(HeartRateResponse {
            rr_data: sample.rr_data,
            pico_id,
            movesense_series: sample.movesense_series,
            timestamp_ms: sample.timestamp_ms,
            average_bpm: sample.average_bpm,
            timestamp_utc: sample.timestamp_ms,
        })
    }
}

#[derive(Debug, Serialize)]
struct PlayersResponse<T> {
    players: Vec<T>,
}

/// Builds the API router over the shared simulation context.
pub fn router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/api/:data_type", get(get_data))
        .with_state(ctx)
}

fn parse_player_filter(raw: &str) -> Result<Vec<i64>, ApiError> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::InvalidPlayerFilter)
        })
        .collect()
}

/// `GET /api/{data_type}` with optional `start_timestamp`, `end_timestamp`
/// (inclusive seconds, applied only when both are present) and `player_id`
/// (comma-separated integers). GNSS and heart rate collapse to the single
/// most recent match; IMU and ECG return the full filtered list.
async fn get_data(
    Path(data_type): Path<String>,
    Query(params): Query<QueryParams>,
    State(ctx): State<SharedContext>,
) -> Result<Response, ApiError> {
    let data_type: DataType = data_type.parse().map_err(|_| ApiError::InvalidDataType)?;

    let players = params
        .player_id
        .as_deref()
        .map(parse_player_filter)
        .transpose()?;
    let players = players.as_deref();

    let range_ms = match (params.start_timestamp, params.end_timestamp) {
        (Some(start), Some(end)) => Some((start * 1000, end * 1000)),
        _ => None,
    };

    let ctx = ctx.read().await;
    let response = match data_type {
        DataType::Gnss => {
            let latest = ctx
                .gnss
                .latest(range_ms, players)
                .ok_or(ApiError::NoData(data_type))?;
            Json(latest).into_response()
        }
        DataType::HeartRate => {
            let latest = ctx
                .heart_rate
                .latest(range_ms, players)
                .ok_or(ApiError::NoData(data_type))?;
            Json(HeartRateResponse::from_sample(latest)?).into_response()
        }
        DataType::Imu => {
            let players = ctx.imu.filtered(range_ms, players);
            if players.is_empty() {
                return Err(ApiError::NoData(data_type));
            }
            Json(PlayersResponse { players }).into_response()
        }
        DataType::Ecg => {
            let players = ctx.ecg.filtered(range_ms, players);
            if players.is_empty() {
                return Err(ApiError::NoData(data_type));
            }
            Json(PlayersResponse { players }).into_response()
        }
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    async fn context_with_ticks(ticks: u32) -> SharedContext {
        let mut rng = StdRng::seed_from_u64(99);
        let mut ctx = SimContext::new(&mut rng);
        for _ in 0..ticks {
            ctx.advance_tick(&mut rng);
        }
        Arc::new(RwLock::new(ctx))
    }

    fn params(
        start: Option<i64>,
        end: Option<i64>,
        player_id: Option<&str>,
    ) -> Query<QueryParams> {
        Query(QueryParams {
            start_timestamp: start,
            end_timestamp: end,
            player_id: player_id.map(|s| s.to_string()),
        })
    }

    #[tokio::test]
    async fn test_unknown_data_type_is_bad_request() {
        let ctx = context_with_ticks(1).await;

        let result = get_data(Path("foo".to_string()), params(None, None, None), State(ctx)).await;

        assert_eq!(result.err(), Some(ApiError::InvalidDataType));
        assert_eq!(
            ApiError::InvalidDataType.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_malformed_player_filter_is_bad_request() {
        let ctx = context_with_ticks(1).await;

        let result = get_data(
            Path("gnss".to_string()),
            params(None, None, Some("1,two,3")),
            State(ctx),
        )
        .await;

        assert_eq!(result.err(), Some(ApiError::InvalidPlayerFilter));
        assert_eq!(
            ApiError::InvalidPlayerFilter.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_no_matching_player_is_not_found() {
        let ctx = context_with_ticks(3).await;

        let result = get_data(
            Path("imu".to_string()),
            params(None, None, Some("42")),
            State(ctx),
        )
        .await;

        let err = result.err().unwrap();
        assert_eq!(err, ApiError::NoData(DataType::Imu));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_range_is_not_found() {
        let ctx = context_with_ticks(3).await;

        let result = get_data(
            Path("ecg".to_string()),
            params(Some(100), Some(200), None),
            State(ctx),
        )
        .await;

        assert_eq!(result.err(), Some(ApiError::NoData(DataType::Ecg)));
    }

    #[tokio::test]
    async fn test_gnss_returns_ok_with_data() {
        let ctx = context_with_ticks(2).await;

        let response = get_data(Path("gnss".to_string()), params(None, None, None), State(ctx))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_half_open_range_is_ignored() {
        // Only one bound given: the range filter must not apply at all.
        let ctx = context_with_ticks(2).await;

        let response = get_data(
            Path("heart_rate".to_string()),
            params(Some(5000), None, None),
            State(ctx),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_case_insensitive_data_type() {
        let ctx = context_with_ticks(1).await;

        let response = get_data(Path("GNSS".to_string()), params(None, None, None), State(ctx))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_parse_player_filter() {
        assert_eq!(parse_player_filter("1,2,3"), Ok(vec![1, 2, 3]));
        assert_eq!(parse_player_filter(" 4 , 5 "), Ok(vec![4, 5]));
        assert_eq!(parse_player_filter("-1"), Ok(vec![-1]));
        assert_eq!(
            parse_player_filter("1,x"),
            Err(ApiError::InvalidPlayerFilter)
        );
        assert_eq!(parse_player_filter(""), Err(ApiError::InvalidPlayerFilter));
    }

    #[test]
    fn test_heart_rate_response_shape() {
        let sample = HeartRateSample {
            rr_data: vec![400, 410, 405, 395, 402],
            pico_id: "Pico_6".to_string(),
            movesense_series: 77,
            timestamp_ms: 4000,
            average_bpm: 147.5,
        };

        let response = HeartRateResponse::from_sample(sample).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["Pico_ID"], 6);
        assert_eq!(value["Timestamp_UTC"], 4000);
        assert_eq!(value["Timestamp_ms"], 4000);
        assert_eq!(value["average_bpm"], 147.5);
    }

    #[test]
    fn test_error_bodies() {
        assert_eq!(ApiError::InvalidDataType.message(), "Invalid data type");
        assert_eq!(
            ApiError::NoData(DataType::HeartRate).message(),
            "No HEART_RATE data found"
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
