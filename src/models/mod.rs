// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Donation, DonationId, DonationStatus, Match, MatchId, MatchOutcome, MatchStatus, NewDonation, NewMatch,
    NewRequest, Request, RequestId, RequestStatus,
};
pub use requests::{CreateDonationRequest, CreateRequestRequest, ListMatchesQuery, RunMatchRequest};
pub use responses::{
    CreateDonationResponse, CreateRequestResponse, ErrorResponse, HealthResponse, ListMatchesResponse, MatchSummary,
};
