/// The signed-in admin, placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub email: String,
    // keys the per-session console state
    pub session_id: String,
    // unix seconds at which the session token stops being accepted
    pub expires_at: i64,
}
