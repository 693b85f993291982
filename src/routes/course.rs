use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::dto::site_dto::CourseDetailPage;
use crate::error::Result;
use crate::services::content_service::PdfLookup;
use crate::utils::flash::{Flash, Level};
use crate::AppState;

const COURSE_MISSING: &str = "The requested course does not exist.";
const PDF_MISSING: &str = "The PDF file for this course was not found.";

fn detail_path(id: i64) -> String {
    format!("/course/{}/", id)
}

pub async fn course_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flash: Flash,
) -> Result<Response> {
    let Some(detail) = state.content_service.course_detail(id).await? else {
        return Ok(flash.with(Level::Error, COURSE_MISSING).redirect("/"));
    };
    let has_pdf = detail.course.has_pdf();
    let pdf_url = has_pdf.then(|| format!("/course/{}/pdf/", id));

    Ok(flash.render(
        StatusCode::OK,
        "course_detail",
        CourseDetailPage {
            course: detail.course,
            has_pdf,
            pdf_url,
            related_courses: detail.related,
        },
    ))
}

pub async fn course_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flash: Flash,
) -> Result<Response> {
    match state.content_service.open_pdf(id).await? {
        PdfLookup::CourseMissing => Ok(flash.with(Level::Error, COURSE_MISSING).redirect("/")),
        PdfLookup::FileMissing(course) => {
            Ok(flash.with(Level::Error, PDF_MISSING).redirect(&detail_path(course.id)))
        }
        PdfLookup::Found {
            file,
            file_name,
            len,
        } => {
            let disposition = HeaderValue::from_str(&format!("inline; filename=\"{}\"", file_name))
                .unwrap_or_else(|_| HeaderValue::from_static("inline"));
            let body = Body::from_stream(ReaderStream::new(file));
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                    (header::CONTENT_DISPOSITION, disposition),
                    (header::CONTENT_LENGTH, HeaderValue::from(len)),
                ],
                body,
            )
                .into_response())
        }
    }
}
