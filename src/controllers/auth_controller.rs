use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::services::auth_service::AuthService;
use crate::utils::errors::AppError;

pub struct AuthController<'a> {
    auth: &'a AuthService,
}

impl<'a> AuthController<'a> {
    pub fn new(auth: &'a AuthService) -> Self {
        Self { auth }
    }

    pub fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let token = self.auth.login(&request.username, &request.password)?;

        Ok(LoginResponse { token })
    }
}
