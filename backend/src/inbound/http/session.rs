//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie carries two values: the authenticated user id, written
//! by the identity provider's login flow, and the notification watermark,
//! which this service advances whenever a pilot opens the grouped view.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId, Watermark};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const WATERMARK_KEY: &str = "notification_watermark";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Fetch the current user id from the session, if present.
    ///
    /// A malformed id is treated as anonymous.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(id.and_then(|raw| match UserId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Highest comment id this session has seen; zero when unset or unreadable.
    pub fn watermark(&self) -> Watermark {
        match self.0.get::<Watermark>(WATERMARK_KEY) {
            Ok(value) => value.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "unreadable notification watermark; starting from zero");
                Watermark::default()
            }
        }
    }

    /// Store a new watermark, replacing whatever the session held.
    pub fn set_watermark(&self, watermark: Watermark) -> Result<(), Error> {
        self.0
            .insert(WATERMARK_KEY, watermark)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
