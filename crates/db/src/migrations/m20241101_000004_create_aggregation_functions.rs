//! Create the server-side aggregation procedures.
//!
//! `get_videos_with_votes` lists a shot's submissions with their vote count
//! and the viewer's vote flag; `get_shots_with_top_videos` pairs every shot
//! with its highest-voted submission.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE OR REPLACE FUNCTION get_videos_with_votes(
                    shot_id_input BIGINT,
                    viewer_id TEXT DEFAULT NULL
                )
                RETURNS TABLE (
                    id BIGINT,
                    shot_id BIGINT,
                    user_id TEXT,
                    user_email TEXT,
                    video_url TEXT,
                    storage_key TEXT,
                    description TEXT,
                    created_at TIMESTAMPTZ,
                    votes_count BIGINT,
                    has_voted BOOLEAN
                )
                LANGUAGE sql STABLE
                AS $$
                    SELECT
                        v.id,
                        v.shot_id,
                        v.user_id,
                        v.user_email,
                        v.video_url,
                        v.storage_key,
                        v.description,
                        v.created_at,
                        COUNT(vt.id) AS votes_count,
                        COALESCE(BOOL_OR(vt.user_id = viewer_id), FALSE) AS has_voted
                    FROM videos v
                    LEFT JOIN votes vt ON vt.video_id = v.id
                    WHERE v.shot_id = shot_id_input
                    GROUP BY v.id
                    ORDER BY votes_count DESC, v.created_at DESC;
                $$;
                ",
            )
            .await?;

        // Shots without submissions are kept with NULL top-video columns
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE OR REPLACE FUNCTION get_shots_with_top_videos()
                RETURNS TABLE (
                    id BIGINT,
                    title TEXT,
                    script_excerpt TEXT,
                    order_index INTEGER,
                    created_at TIMESTAMPTZ,
                    top_video_id BIGINT,
                    top_video_url TEXT,
                    top_video_user_id TEXT,
                    top_video_user_email TEXT,
                    top_video_votes BIGINT
                )
                LANGUAGE sql STABLE
                AS $$
                    SELECT
                        s.id,
                        s.title,
                        s.script_excerpt,
                        s.order_index,
                        s.created_at,
                        t.id,
                        t.video_url,
                        t.user_id,
                        t.user_email,
                        t.votes_count
                    FROM shots s
                    LEFT JOIN LATERAL (
                        SELECT v.id, v.video_url, v.user_id, v.user_email,
                               COUNT(vt.id) AS votes_count
                        FROM videos v
                        LEFT JOIN votes vt ON vt.video_id = v.id
                        WHERE v.shot_id = s.id
                        GROUP BY v.id
                        ORDER BY votes_count DESC, v.created_at ASC
                        LIMIT 1
                    ) t ON TRUE
                    ORDER BY s.order_index, s.id;
                $$;
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS get_shots_with_top_videos();")
            .await?;
        manager
            .get_connection()
            .execute_unprepared("DROP FUNCTION IF EXISTS get_videos_with_votes(BIGINT, TEXT);")
            .await?;
        Ok(())
    }
}
