//! Storage for recorded [`VoiceClip`] descriptors.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use cohort_shared::AudioFormat;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::VoiceClip;

impl Database {
    /// Persist a clip descriptor together with its encoded audio.
    pub fn insert_clip(&self, clip: &VoiceClip, data: &[u8]) -> Result<()> {
        self.conn().execute(
            "INSERT INTO voice_clips (id, uri, duration_secs, format, recorded_at, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                clip.id.to_string(),
                clip.uri,
                clip.duration_secs,
                format_str(clip.format),
                clip.recorded_at.to_rfc3339(),
                data,
            ],
        )?;
        Ok(())
    }

    /// Fetch a clip descriptor by id.
    pub fn get_clip(&self, id: Uuid) -> Result<VoiceClip> {
        self.conn()
            .query_row(
                "SELECT id, uri, duration_secs, format, recorded_at
                 FROM voice_clips WHERE id = ?1",
                params![id.to_string()],
                row_to_clip,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Fetch a clip's encoded audio by id.
    pub fn get_clip_data(&self, id: Uuid) -> Result<Vec<u8>> {
        self.conn()
            .query_row(
                "SELECT data FROM voice_clips WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Number of stored clips.  Used by tests and maintenance tooling.
    pub fn clip_count(&self) -> Result<u32> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM voice_clips", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn format_str(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Webm => "webm",
        AudioFormat::Mp4 => "mp4",
        AudioFormat::Wav => "wav",
    }
}

fn row_to_clip(row: &rusqlite::Row<'_>) -> rusqlite::Result<VoiceClip> {
    let id_str: String = row.get(0)?;
    let uri: String = row.get(1)?;
    let duration_secs: u32 = row.get(2)?;
    let format_str: String = row.get(3)?;
    let recorded_str: String = row.get(4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let format = match format_str.as_str() {
        "webm" => AudioFormat::Webm,
        "mp4" => AudioFormat::Mp4,
        "wav" => AudioFormat::Wav,
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown audio format: {other}").into(),
            ))
        }
    };

    let recorded_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&recorded_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(VoiceClip {
        id,
        uri,
        duration_secs,
        format,
        recorded_at,
    })
}
