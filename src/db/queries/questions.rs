use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub struct NewQuestion<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match on the question text, ordered by id.
///
/// Matching happens here rather than in SQL: SQLite's `lower` only folds ASCII,
/// and `LIKE` would treat `%` and `_` in the term as wildcards.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let term = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&term))
        .collect())
}

pub async fn create_question(pool: &SqlitePool, question: NewQuestion<'_>) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question.question)
    .bind(question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Fails with [`sqlx::Error::RowNotFound`] when there is no question with this id.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let mut conn = pool.acquire().await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = get_all_questions(pool)
        .await?
        .iter()
        .map(|q| q.id)
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    let mut tx = pool.begin().await?;
    for id in existing_ids.difference(&new_ids) {
        sqlx::query(
            r#"
            DELETE FROM questions WHERE questions.id = ?1
            "#,
        )
        .bind(*id)
        .execute(&mut *tx)
        .await?;
    }
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::memory_pool;

    async fn insert(pool: &SqlitePool, question: &str, category: i64) -> i64 {
        create_question(
            pool,
            NewQuestion {
                question,
                answer: "answer",
                category,
                difficulty: 1,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let pool = memory_pool().await;
        let id = insert(&pool, "Who discovered penicillin?", 1).await;

        let question = get_question_by_id(&pool, id).await.unwrap();
        assert_eq!(question.question, "Who discovered penicillin?");
        assert_eq!(question.category, 1);
        assert_eq!(get_all_questions(&pool).await.unwrap(), vec![question]);
    }

    #[tokio::test]
    async fn filters_by_category() {
        let pool = memory_pool().await;
        insert(&pool, "What is the heaviest organ in the human body?", 1).await;
        insert(&pool, "What is the largest lake in Africa?", 3).await;
        insert(&pool, "Who discovered penicillin?", 1).await;

        let questions = get_questions_for_category(&pool, 1).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.category == 1));
        assert!(questions.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn search_ignores_case_and_wildcards() {
        let pool = memory_pool().await;
        insert(&pool, "In which royal palace would you find the Hall of Mirrors?", 3).await;
        insert(&pool, "What is 100% of nothing?", 1).await;
        insert(&pool, "Who sang ÉCLAIR ÜBER?", 5).await;

        let found = search_questions(&pool, "PALACE").await.unwrap();
        assert_eq!(found.len(), 1);
        let found = search_questions(&pool, "éclair über").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question, "Who sang ÉCLAIR ÜBER?");
        assert!(search_questions(&pool, "%").await.unwrap().len() == 1);
        assert!(search_questions(&pool, "_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_question_fails() {
        let pool = memory_pool().await;
        let id = insert(&pool, "Who discovered penicillin?", 1).await;

        delete_question(&pool, id).await.unwrap();
        assert!(matches!(
            delete_question(&pool, id).await,
            Err(sqlx::Error::RowNotFound)
        ));
        assert!(get_all_questions(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let pool = memory_pool().await;
        let first = insert(&pool, "first", 1).await;
        delete_question(&pool, first).await.unwrap();
        let second = insert(&pool, "second", 1).await;
        assert!(second > first);
    }

    #[tokio::test]
    async fn import_replaces_questions() {
        let pool = memory_pool().await;
        let stale = insert(&pool, "stale", 1).await;
        let kept = insert(&pool, "kept", 1).await;

        import_questions(
            &pool,
            vec![
                Question {
                    id: kept,
                    question: "kept and edited".to_owned(),
                    answer: "yes".to_owned(),
                    category: 2,
                    difficulty: 5,
                },
                Question {
                    id: 40,
                    question: "new".to_owned(),
                    answer: "no".to_owned(),
                    category: 6,
                    difficulty: 1,
                },
            ],
        )
        .await
        .unwrap();

        let questions = get_all_questions(&pool).await.unwrap();
        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![kept, 40]);
        assert!(!ids.contains(&stale));
        assert_eq!(questions[0].question, "kept and edited");
        assert_eq!(questions[0].category, 2);
    }
}
