use crate::api_error::ApiError;
use crate::db;
use crate::schema::{like, submission};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Queryable, Insertable)]
#[table_name = "like"]
pub struct Like {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub fingerprint: String,
    pub created_at: NaiveDateTime,
}

impl Like {
    /// Coarse anti-spam identity for de-duplicating likes, not a
    /// credential. Anonymous visitors hash to their network signals alone,
    /// so everyone behind one NAT with the same user agent shares a
    /// fingerprint.
    pub fn fingerprint(user_id: Option<Uuid>, ip: &str, user_agent: &str) -> String {
        let source = match user_id {
            Some(user_id) => format!("{}-{}-{}", user_id, ip, user_agent),
            None => format!("{}-{}", ip, user_agent),
        };

        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());

        base64::encode(&hasher.finalize())
    }

    /// Like or unlike in a single transaction. The unique key on
    /// (submission_id, fingerprint) turns a concurrent double-insert into a
    /// clean conflict instead of a duplicate row and a drifting counter;
    /// like_count only ever moves together with its like row.
    pub fn toggle(submission_id: Uuid, fingerprint: &str) -> Result<bool, ApiError> {
        let conn = db::connection()?;

        conn.transaction::<_, ApiError, _>(|| {
            let existing = like::table
                .filter(like::submission_id.eq(submission_id))
                .filter(like::fingerprint.eq(fingerprint))
                .first::<Like>(&conn)
                .optional()?;

            match existing {
                Some(existing) => {
                    diesel::delete(like::table.filter(like::id.eq(existing.id)))
                        .execute(&conn)?;
                    diesel::update(submission::table.filter(submission::id.eq(submission_id)))
                        .set(submission::like_count.eq(submission::like_count - 1))
                        .execute(&conn)?;

                    Ok(false)
                }
                None => {
                    let like = Like {
                        id: Uuid::new_v4(),
                        submission_id,
                        fingerprint: fingerprint.to_string(),
                        created_at: Utc::now().naive_utc(),
                    };

                    diesel::insert_into(like::table).values(like).execute(&conn)?;
                    diesel::update(submission::table.filter(submission::id.eq(submission_id)))
                        .set(submission::like_count.eq(submission::like_count + 1))
                        .execute(&conn)?;

                    Ok(true)
                }
            }
        })
    }

    /// Read-only companion to `toggle`, used to prime UI state.
    pub fn exists(submission_id: Uuid, fingerprint: &str) -> Result<bool, ApiError> {
        let conn = db::connection()?;

        let count: i64 = like::table
            .filter(like::submission_id.eq(submission_id))
            .filter(like::fingerprint.eq(fingerprint))
            .count()
            .get_result(&conn)?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP: &str = "203.0.113.7";
    const UA: &str = "Mozilla/5.0";

    #[test]
    fn fingerprint_is_stable_for_same_inputs() {
        let user_id = Uuid::new_v4();

        assert_eq!(
            Like::fingerprint(Some(user_id), IP, UA),
            Like::fingerprint(Some(user_id), IP, UA)
        );
    }

    #[test]
    fn fingerprint_differs_across_network_signals() {
        let anon = Like::fingerprint(None, IP, UA);

        assert_ne!(anon, Like::fingerprint(None, "198.51.100.9", UA));
        assert_ne!(anon, Like::fingerprint(None, IP, "curl/8.0"));
    }

    #[test]
    fn signed_in_fingerprint_differs_from_anonymous() {
        assert_ne!(
            Like::fingerprint(Some(Uuid::new_v4()), IP, UA),
            Like::fingerprint(None, IP, UA)
        );
    }

    #[test]
    fn fingerprint_differs_per_user_behind_same_nat() {
        assert_ne!(
            Like::fingerprint(Some(Uuid::new_v4()), IP, UA),
            Like::fingerprint(Some(Uuid::new_v4()), IP, UA)
        );
    }
}
