use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::alunos::repo_types::Aluno;

/// Read access to student records.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Record whose email equals `email` exactly; email is unique.
    async fn find_unique_by_email(&self, email: &str) -> anyhow::Result<Option<Aluno>>;
    /// First record (lowest id) whose email equals `email` exactly.
    async fn find_first_by_email(&self, email: &str) -> anyhow::Result<Option<Aluno>>;
    /// First record (lowest id) whose name equals `nome` exactly.
    async fn find_first_by_name(&self, nome: &str) -> anyhow::Result<Option<Aluno>>;
}

#[derive(Clone)]
pub struct PgStudentStore {
    db: PgPool,
}

impl PgStudentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn find_unique_by_email(&self, email: &str) -> anyhow::Result<Option<Aluno>> {
        let aluno = sqlx::query_as::<_, Aluno>(
            r#"
            SELECT id_aluno, nome, email, senha
            FROM alunos
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find aluno by unique email")?;
        Ok(aluno)
    }

    async fn find_first_by_email(&self, email: &str) -> anyhow::Result<Option<Aluno>> {
        let aluno = sqlx::query_as::<_, Aluno>(
            r#"
            SELECT id_aluno, nome, email, senha
            FROM alunos
            WHERE email = $1
            ORDER BY id_aluno
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find first aluno by email")?;
        Ok(aluno)
    }

    async fn find_first_by_name(&self, nome: &str) -> anyhow::Result<Option<Aluno>> {
        let aluno = sqlx::query_as::<_, Aluno>(
            r#"
            SELECT id_aluno, nome, email, senha
            FROM alunos
            WHERE nome = $1
            ORDER BY id_aluno
            LIMIT 1
            "#,
        )
        .bind(nome)
        .fetch_optional(&self.db)
        .await
        .context("find first aluno by nome")?;
        Ok(aluno)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    /// In-memory store; rows are kept in id order.
    #[derive(Clone, Default)]
    pub struct MemoryStudentStore {
        rows: Vec<Aluno>,
    }

    impl MemoryStudentStore {
        pub fn with(mut rows: Vec<Aluno>) -> Self {
            rows.sort_by_key(|a| a.id_aluno);
            Self { rows }
        }
    }

    #[async_trait]
    impl StudentStore for MemoryStudentStore {
        async fn find_unique_by_email(&self, email: &str) -> anyhow::Result<Option<Aluno>> {
            Ok(self.rows.iter().find(|a| a.email == email).cloned())
        }

        async fn find_first_by_email(&self, email: &str) -> anyhow::Result<Option<Aluno>> {
            Ok(self.rows.iter().find(|a| a.email == email).cloned())
        }

        async fn find_first_by_name(&self, nome: &str) -> anyhow::Result<Option<Aluno>> {
            Ok(self.rows.iter().find(|a| a.nome == nome).cloned())
        }
    }

    /// Store whose every lookup fails, standing in for an unreachable database.
    #[derive(Clone)]
    pub struct FailingStudentStore(pub &'static str);

    #[async_trait]
    impl StudentStore for FailingStudentStore {
        async fn find_unique_by_email(&self, _email: &str) -> anyhow::Result<Option<Aluno>> {
            anyhow::bail!(self.0)
        }

        async fn find_first_by_email(&self, _email: &str) -> anyhow::Result<Option<Aluno>> {
            anyhow::bail!(self.0)
        }

        async fn find_first_by_name(&self, _nome: &str) -> anyhow::Result<Option<Aluno>> {
            anyhow::bail!(self.0)
        }
    }
}
