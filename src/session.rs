use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};

use crate::error::Error;
use crate::model::mongodb::Id;

/// Header carrying the ID of the member the client is acting as.
pub const MEMBER_HEADER: &str = "X-Member-Id";

/// The per-request session: who the client says the current member is.
///
/// The client keeps track of its current member and sends it with every
/// request, so the server holds no session state. A missing header is an
/// anonymous session; a malformed one is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSession {
    member_id: Option<Id>,
}

impl MemberSession {
    pub fn anonymous() -> Self {
        Self { member_id: None }
    }

    pub fn for_member(member_id: Id) -> Self {
        Self {
            member_id: Some(member_id),
        }
    }

    /// The current member, if any.
    pub fn member_id(&self) -> Option<Id> {
        self.member_id
    }

    /// Parse the session from a raw header value.
    pub fn from_header(value: Option<&str>) -> Result<Self, Error> {
        match value.map(str::trim).filter(|value| !value.is_empty()) {
            None => Ok(Self::anonymous()),
            Some(value) => value
                .parse::<Id>()
                .map(Self::for_member)
                .map_err(|_| Error::validation(format!("Malformed {MEMBER_HEADER} header"))),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for MemberSession {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match Self::from_header(req.headers().get_one(MEMBER_HEADER)) {
            Ok(session) => Outcome::Success(session),
            Err(e) => Outcome::Error((Status::BadRequest, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header() {
        assert_eq!(MemberSession::from_header(None).unwrap(), MemberSession::anonymous());
        assert_eq!(MemberSession::from_header(Some(" ")).unwrap(), MemberSession::anonymous());

        let id = Id::new();
        let session = MemberSession::from_header(Some(&id.to_string())).unwrap();
        assert_eq!(session.member_id(), Some(id));

        assert!(matches!(
            MemberSession::from_header(Some("nobody")),
            Err(Error::Validation(_))
        ));
    }
}
