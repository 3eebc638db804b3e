// Wire shapes for the auth backend. Unknown response keys are ignored.

use serde::{Deserialize, Serialize};

use super::{SessionToken, SignUpRecord};

#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignUpResponseDto {
    pub id: i64,
    pub email: String,
    pub message: String,
}

impl From<SignUpResponseDto> for SignUpRecord {
    fn from(dto: SignUpResponseDto) -> Self {
        Self {
            id: dto.id,
            email: dto.email,
            message: dto.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct TokenDto {
    pub access: String,
    pub refresh: String,
    pub user_id: String,
    pub stream_sdk_token: String,
}

impl From<TokenDto> for SessionToken {
    fn from(dto: TokenDto) -> Self {
        Self {
            user_id: dto.user_id,
            sdk_token: dto.stream_sdk_token.into(),
            access: dto.access.into(),
            refresh: dto.refresh.into(),
        }
    }
}
