use super::Arbiter;
use super::VoteOutcome;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PrRequest {
    pub proposer: String,
    pub description: String,
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub voter: String,
    pub vote: bool,
}

#[derive(Debug, Deserialize)]
pub struct TurnFailedRequest {
    pub player: String,
    #[serde(default = "unknown_reason")]
    pub reason: String,
}

fn unknown_reason() -> String {
    "unknown".to_string()
}

/// Health check and current state summary.
pub async fn index(arbiter: web::Data<Arbiter>) -> impl Responder {
    HttpResponse::Ok().json(arbiter.summary().await)
}

/// Proposal submission from a player. 400 on missing fields or an engine
/// rejection (wrong actor or wrong phase).
pub async fn submit_pr(
    arbiter: web::Data<Arbiter>,
    body: web::Json<PrRequest>,
) -> impl Responder {
    let request = body.into_inner();
    log::info!("pr request from {}: {}", request.proposer, request.branch);
    if request.proposer.is_empty() || request.description.is_empty() || request.branch.is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "missing required fields" }));
    }
    match arbiter
        .submit_proposal(&request.proposer, &request.description, &request.branch)
        .await
    {
        Ok(Some(id)) => HttpResponse::Ok()
            .json(serde_json::json!({ "status": "submitted", "proposal_id": id })),
        Ok(None) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": "invalid proposal" }))
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Vote submission against a specific proposal id. Resolves inline when
/// this vote completes the tally.
pub async fn submit_vote(
    arbiter: web::Data<Arbiter>,
    path: web::Path<u64>,
    body: web::Json<VoteRequest>,
) -> impl Responder {
    let proposal_id = path.into_inner();
    let request = body.into_inner();
    if request.voter.is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "voter and vote required" }));
    }
    match arbiter
        .submit_vote(proposal_id, &request.voter, request.vote)
        .await
    {
        Ok(VoteOutcome::Resolved(result)) => {
            HttpResponse::Ok().json(serde_json::json!({ "status": "voted", "result": result }))
        }
        Ok(VoteOutcome::Recorded) => HttpResponse::Ok()
            .json(serde_json::json!({ "status": "voted", "waiting_for_votes": true })),
        Ok(VoteOutcome::Rejected(reason)) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": reason }))
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

/// Explicit forfeiture: the player reports it could not produce a change,
/// and the turn advances unconditionally.
pub async fn turn_failed(
    arbiter: web::Data<Arbiter>,
    body: web::Json<TurnFailedRequest>,
) -> impl Responder {
    let request = body.into_inner();
    match arbiter.turn_failed(&request.player, &request.reason).await {
        Ok(next) => HttpResponse::Ok()
            .json(serde_json::json!({ "status": "acknowledged", "next_player": next })),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
