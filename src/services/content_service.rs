use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;

use crate::error::Result;
use crate::models::content::{Course, Meme};
use crate::repositories::ContentRepository;

pub const DASHBOARD_MEMES: i64 = 6;
pub const RELATED_COURSES: usize = 3;

#[derive(Debug, Clone)]
pub struct CourseDetail {
    pub course: Course,
    pub related: Vec<Course>,
}

#[derive(Debug)]
pub enum PdfLookup {
    CourseMissing,
    FileMissing(Course),
    Found { file: File, file_name: String, len: u64 },
}

#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentRepository>,
    media_root: PathBuf,
}

impl ContentService {
    pub fn new(content: Arc<dyn ContentRepository>, media_root: PathBuf) -> Self {
        Self {
            content,
            media_root,
        }
    }

    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.content.list_courses(None).await
    }

    pub async fn latest_memes(&self) -> Result<Vec<Meme>> {
        self.content.list_memes(Some(DASHBOARD_MEMES)).await
    }

    pub async fn memes(&self) -> Result<Vec<Meme>> {
        self.content.list_memes(None).await
    }

    pub async fn course_detail(&self, id: i64) -> Result<Option<CourseDetail>> {
        let Some(course) = self.content.find_course(id).await? else {
            return Ok(None);
        };
        let related = self
            .content
            .list_courses(Some(course.difficulty))
            .await?
            .into_iter()
            .filter(|c| c.id != course.id)
            .take(RELATED_COURSES)
            .collect();
        Ok(Some(CourseDetail { course, related }))
    }

    pub async fn open_pdf(&self, course_id: i64) -> Result<PdfLookup> {
        let Some(course) = self.content.find_course(course_id).await? else {
            return Ok(PdfLookup::CourseMissing);
        };
        let Some(relative) = course.pdf_file.as_deref().filter(|p| !p.trim().is_empty()) else {
            return Ok(PdfLookup::FileMissing(course));
        };
        let Some(path) = resolve_media_path(&self.media_root, relative).await else {
            tracing::info!(course_id, pdf = %relative, "course pdf not found on disk");
            return Ok(PdfLookup::FileMissing(course));
        };

        let file = File::open(&path).await?;
        let len = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "course.pdf".to_string());
        Ok(PdfLookup::Found {
            file,
            file_name,
            len,
        })
    }
}

/// Resolves `relative` under `root`. Absolute paths, `..` segments and symlinks that
/// leave the root all resolve to nothing, as do missing files and directories.
pub async fn resolve_media_path(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative.trim());
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    let root = tokio::fs::canonicalize(root).await.ok()?;
    let candidate = tokio::fs::canonicalize(root.join(relative)).await.ok()?;
    if !candidate.starts_with(&root) {
        return None;
    }
    let metadata = tokio::fs::metadata(&candidate).await.ok()?;
    metadata.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn paths_escaping_the_media_root_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        tokio::fs::create_dir_all(media.join("courses")).await.unwrap();
        tokio::fs::write(media.join("courses/a.pdf"), b"%PDF-1.4").await.unwrap();
        tokio::fs::write(dir.path().join("secret.pdf"), b"%PDF-1.4").await.unwrap();

        assert!(resolve_media_path(&media, "courses/a.pdf").await.is_some());
        assert!(resolve_media_path(&media, "../secret.pdf").await.is_none());
        let absolute = dir.path().join("secret.pdf");
        assert!(resolve_media_path(&media, absolute.to_str().unwrap()).await.is_none());
        assert!(resolve_media_path(&media, "courses").await.is_none());
        assert!(resolve_media_path(&media, "courses/missing.pdf").await.is_none());
    }
}
