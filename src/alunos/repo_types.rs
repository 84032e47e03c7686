use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Student record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Aluno {
    pub id_aluno: i32,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub senha: Option<String>, // hash or legacy plaintext, never exposed in JSON
}
