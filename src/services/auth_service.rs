use bcrypt::{hash, verify, DEFAULT_COST};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::environment::UserSeed;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};

#[derive(Debug, Clone)]
struct UserAccount {
    password_hash: String,
    roles: Vec<String>,
}

/// Servicio de autenticación: directorio de usuarios y emisión de tokens
#[derive(Debug, Clone)]
pub struct AuthService {
    users: HashMap<String, UserAccount>,
    jwt: JwtConfig,
}

impl AuthService {
    /// Construir el directorio hasheando las contraseñas configuradas
    pub fn new(seeds: &[UserSeed], jwt: JwtConfig) -> Result<Self, AppError> {
        Self::with_cost(seeds, jwt, DEFAULT_COST)
    }

    pub fn with_cost(seeds: &[UserSeed], jwt: JwtConfig, cost: u32) -> Result<Self, AppError> {
        let mut users = HashMap::new();
        for seed in seeds {
            let password_hash = hash(&seed.password, cost)
                .map_err(|e| AppError::Internal(format!("Error hashing password: {}", e)))?;
            users.insert(
                seed.username.clone(),
                UserAccount {
                    password_hash,
                    roles: vec![seed.role.clone()],
                },
            );
        }

        info!("🔐 Directorio de usuarios cargado ({} usuarios)", users.len());
        Ok(Self { users, jwt })
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt
    }

    /// Validar credenciales y emitir un token
    pub fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let invalid = || AppError::Unauthorized("Credenciales inválidas".to_string());

        let account = self.users.get(username).ok_or_else(|| {
            warn!("🔒 Login con usuario desconocido: {}", username);
            invalid()
        })?;

        let valid = verify(password, &account.password_hash)
            .map_err(|e| AppError::Internal(format!("Error verifying password: {}", e)))?;

        if !valid {
            warn!("🔒 Contraseña incorrecta para {}", username);
            return Err(invalid());
        }

        info!("🔑 Token emitido para {}", username);
        generate_token(username, account.roles.clone(), &self.jwt)
    }
}
