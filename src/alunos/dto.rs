use serde::{Deserialize, Serialize};

use crate::alunos::repo_types::Aluno;

/// Request body for login. `senha` is the password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("senha", &"<redacted>")
            .finish()
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub id_aluno: i32,
    pub nome: String,
    pub email: String,
}

impl From<Aluno> for LoginResponse {
    fn from(a: Aluno) -> Self {
        Self {
            success: true,
            id_aluno: a.id_aluno,
            nome: a.nome,
            email: a.email,
        }
    }
}
