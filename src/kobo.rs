//! Read-only access to a Kobo `KoboReader.sqlite` database.
//!
//! Sideloaded books are stored with a `file:///` volume id while store-bought books use an
//! opaque id, so the sideload filter is a simple `LIKE` on the id column.

use libsql::{Builder, Connection, Database, OpenFlags};
use std::path::Path;

use crate::error::DeviceError;
use crate::model::{Bookmark, Content, HighlightCounts};

const SIDELOADED_PATTERN: &str = "%file:///%";

pub struct KoboDatabase {
    _db: Database,
    conn: Connection,
}

impl KoboDatabase {
    pub async fn open(path: &Path) -> Result<Self, DeviceError> {
        if !path.exists() {
            return Err(DeviceError::NotFound(path.display().to_string()));
        }

        let db = Builder::new_local(path)
            .flags(OpenFlags::SQLITE_OPEN_READ_ONLY)
            .build()
            .await?;
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        tracing::info!(database_path = %path.display(), "opened device database");
        Ok(KoboDatabase { _db: db, conn })
    }

    /// Books on the device, most-read first.
    pub async fn list_content(&self, include_store_bought: bool) -> Result<Vec<Content>, DeviceError> {
        let query = if include_store_bought {
            r#"
            SELECT ContentID, Title, Attribution
            FROM content
            WHERE ContentType = 6 AND VolumeIndex = -1
            ORDER BY ___PercentRead DESC, Title ASC
            "#
        } else {
            r#"
            SELECT ContentID, Title, Attribution
            FROM content
            WHERE ContentType = 6 AND VolumeIndex = -1 AND ContentID LIKE ?
            ORDER BY ___PercentRead DESC, Title ASC
            "#
        };

        let mut rows = if include_store_bought {
            self.conn.query(query, ()).await?
        } else {
            self.conn.query(query, libsql::params![SIDELOADED_PATTERN]).await?
        };

        let mut content = Vec::new();
        while let Some(row) = rows.next().await? {
            content.push(Content {
                content_id: row.get::<Option<String>>(0)?.unwrap_or_default(),
                title: row.get::<Option<String>>(1)?.unwrap_or_default(),
                attribution: row.get::<Option<String>>(2)?.unwrap_or_default(),
            });
        }

        tracing::debug!(count = content.len(), include_store_bought, "listed device content");
        Ok(content)
    }

    pub async fn list_bookmarks(&self, include_store_bought: bool) -> Result<Vec<Bookmark>, DeviceError> {
        let query = if include_store_bought {
            r#"
            SELECT VolumeID, Text, Annotation, DateCreated, DateModified
            FROM Bookmark
            ORDER BY VolumeID ASC, ChapterProgress ASC
            "#
        } else {
            r#"
            SELECT VolumeID, Text, Annotation, DateCreated, DateModified
            FROM Bookmark
            WHERE VolumeID LIKE ?
            ORDER BY VolumeID ASC, ChapterProgress ASC
            "#
        };

        let mut rows = if include_store_bought {
            self.conn.query(query, ()).await?
        } else {
            self.conn.query(query, libsql::params![SIDELOADED_PATTERN]).await?
        };

        let mut bookmarks = Vec::new();
        while let Some(row) = rows.next().await? {
            bookmarks.push(Bookmark {
                volume_id: row.get::<Option<String>>(0)?.unwrap_or_default(),
                text: row.get::<Option<String>>(1)?.unwrap_or_default(),
                annotation: row.get::<Option<String>>(2)?.unwrap_or_default(),
                date_created: row.get::<Option<String>>(3)?.unwrap_or_default(),
                date_modified: row.get::<Option<String>>(4)?.unwrap_or_default(),
            });
        }

        tracing::debug!(count = bookmarks.len(), include_store_bought, "listed device bookmarks");
        Ok(bookmarks)
    }

    pub async fn count_bookmarks(&self) -> Result<HighlightCounts, DeviceError> {
        let query = r#"
            SELECT
                COUNT(*),
                SUM(CASE WHEN VolumeID LIKE ? THEN 1 ELSE 0 END)
            FROM Bookmark
        "#;

        let mut rows = self.conn.query(query, libsql::params![SIDELOADED_PATTERN]).await?;
        let (total, sideloaded) = match rows.next().await? {
            Some(row) => (
                row.get::<i64>(0)?,
                row.get::<Option<i64>>(1)?.unwrap_or_default(),
            ),
            None => (0, 0),
        };

        Ok(HighlightCounts {
            total,
            sideloaded,
            official: total - sideloaded,
        })
    }
}
