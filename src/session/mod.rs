mod dto;
pub mod extractors;
pub mod services;

pub(crate) use extractors::AuthSession;
pub(crate) use services::{Flash, FlashKind, Session, SessionKeys};
